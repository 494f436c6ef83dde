#![warn(missing_debug_implementations, missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]

//! Typed field profiles over the RLP codec.
//!
//! A [`Profile`] is an ordered list of named [`Kind`]s describing one
//! fixed-shape binary record. Fields are positional on the wire; the names
//! exist only for diagnostics. Each kind owns the conversion between a
//! domain-side [`Value`] and its RLP [`Item`], including shape validation,
//! and is stateless and reentrant.
//!
//! The layer knows nothing about transactions; any record with a fixed field
//! list can be described by a profile.

use alloy_primitives::U256;
use bytes::Bytes;
use meridian_rlp::Item;

/// A domain-side field value, before projection onto an RLP item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// An unsigned integer, at most 32 bytes wide.
    Number(U256),
    /// An opaque byte sequence.
    Bytes(Bytes),
    /// A byte sequence that may be absent.
    OptBytes(Option<Bytes>),
}

impl Value {
    /// Unwraps a numeric value.
    pub fn into_number(self, field: &'static str) -> Result<U256, Error> {
        match self {
            Self::Number(value) => Ok(value),
            other => Err(Error::value_mismatch(field, "numeric", &other)),
        }
    }

    /// Unwraps a byte-sequence value.
    pub fn into_bytes(self, field: &'static str) -> Result<Bytes, Error> {
        match self {
            Self::Bytes(value) => Ok(value),
            other => Err(Error::value_mismatch(field, "bytes", &other)),
        }
    }

    /// Unwraps an optional byte-sequence value.
    pub fn into_opt_bytes(self, field: &'static str) -> Result<Option<Bytes>, Error> {
        match self {
            Self::OptBytes(value) => Ok(value),
            other => Err(Error::value_mismatch(field, "optional bytes", &other)),
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "numeric",
            Self::Bytes(_) => "bytes",
            Self::OptBytes(_) => "optional bytes",
        }
    }
}

/// Conversion between a [`Value`] and its RLP [`Item`] for one field shape.
///
/// Implementations are stateless unit structs; a profile holds them by
/// static reference.
pub trait Kind: Sync + core::fmt::Debug {
    /// Projects a value onto an item, validating its shape.
    fn encode(&self, field: &'static str, value: &Value) -> Result<Item, Error>;
    /// Rebuilds a value from an item, validating its shape.
    fn decode(&self, field: &'static str, item: &Item) -> Result<Value, Error>;
}

/// Unsigned integer in minimal big-endian form, at most `max_bytes` wide.
///
/// The wire form never carries a leading zero byte; zero is the empty
/// string. Negative values cannot exist on the domain side by construction.
#[derive(Clone, Copy, Debug)]
pub struct NumericKind {
    /// Widest accepted representation, in bytes.
    pub max_bytes: usize,
}

impl Kind for NumericKind {
    fn encode(&self, field: &'static str, value: &Value) -> Result<Item, Error> {
        let Value::Number(number) = value else {
            return Err(Error::value_mismatch(field, "numeric", value));
        };
        let byte_len = (number.bit_len() + 7) / 8;
        if byte_len > self.max_bytes {
            return Err(Error::InvalidFieldShape {
                field,
                reason: format!("number needs {byte_len} bytes, at most {} allowed", self.max_bytes),
            });
        }
        Ok(Item::bytes(number.to_be_bytes_trimmed_vec()))
    }

    fn decode(&self, field: &'static str, item: &Item) -> Result<Value, Error> {
        let bytes = expect_bytes(field, item)?;
        if bytes.len() > self.max_bytes {
            return Err(Error::InvalidFieldShape {
                field,
                reason: format!("{} bytes exceed numeric width {}", bytes.len(), self.max_bytes),
            });
        }
        if bytes.first() == Some(&0) {
            return Err(Error::InvalidFieldShape {
                field,
                reason: "leading zero byte in numeric field".to_owned(),
            });
        }
        let number = U256::try_from_be_slice(bytes).ok_or_else(|| Error::InvalidFieldShape {
            field,
            reason: "numeric field wider than 32 bytes".to_owned(),
        })?;
        Ok(Value::Number(number))
    }
}

/// Opaque byte sequence, carried verbatim.
#[derive(Clone, Copy, Debug)]
pub struct BlobKind;

impl Kind for BlobKind {
    fn encode(&self, field: &'static str, value: &Value) -> Result<Item, Error> {
        let Value::Bytes(bytes) = value else {
            return Err(Error::value_mismatch(field, "bytes", value));
        };
        Ok(Item::bytes(bytes.clone()))
    }

    fn decode(&self, field: &'static str, item: &Item) -> Result<Value, Error> {
        Ok(Value::Bytes(expect_bytes(field, item)?.clone()))
    }
}

/// Byte sequence of exactly `len` bytes.
#[derive(Clone, Copy, Debug)]
pub struct FixedBlobKind {
    /// Required length in bytes.
    pub len: usize,
}

impl Kind for FixedBlobKind {
    fn encode(&self, field: &'static str, value: &Value) -> Result<Item, Error> {
        let Value::Bytes(bytes) = value else {
            return Err(Error::value_mismatch(field, "bytes", value));
        };
        check_len(field, bytes, self.len)?;
        Ok(Item::bytes(bytes.clone()))
    }

    fn decode(&self, field: &'static str, item: &Item) -> Result<Value, Error> {
        let bytes = expect_bytes(field, item)?;
        check_len(field, bytes, self.len)?;
        Ok(Value::Bytes(bytes.clone()))
    }
}

/// Byte sequence of exactly `len` bytes, or absent.
///
/// Absent and all-zero both fold to the empty string on the wire; the empty
/// string decodes to absent. The fold is deliberately lossy.
#[derive(Clone, Copy, Debug)]
pub struct OptionalFixedBlobKind {
    /// Required length in bytes when present.
    pub len: usize,
}

impl Kind for OptionalFixedBlobKind {
    fn encode(&self, field: &'static str, value: &Value) -> Result<Item, Error> {
        let Value::OptBytes(bytes) = value else {
            return Err(Error::value_mismatch(field, "optional bytes", value));
        };
        match bytes {
            None => Ok(Item::empty_bytes()),
            Some(bytes) => {
                // length holds even for values that fold to absent
                check_len(field, bytes, self.len)?;
                if bytes.iter().all(|&byte| byte == 0) {
                    Ok(Item::empty_bytes())
                } else {
                    Ok(Item::bytes(bytes.clone()))
                }
            }
        }
    }

    fn decode(&self, field: &'static str, item: &Item) -> Result<Value, Error> {
        let bytes = expect_bytes(field, item)?;
        if bytes.is_empty() {
            return Ok(Value::OptBytes(None));
        }
        check_len(field, bytes, self.len)?;
        Ok(Value::OptBytes(Some(bytes.clone())))
    }
}

/// One named, typed field of a profile.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    /// Diagnostic name; never on the wire.
    pub name: &'static str,
    /// Shape of the field.
    pub kind: &'static dyn Kind,
}

/// An ordered, fixed-shape record description.
#[derive(Clone, Copy, Debug)]
pub struct Profile {
    /// Diagnostic name of the record.
    pub name: &'static str,
    /// Fields in wire order. Order is part of the wire contract.
    pub fields: &'static [Field],
}

impl Profile {
    /// Builds the positional list item for `values`, one per field, in
    /// profile order.
    pub fn encode_object(&self, values: &[Value]) -> Result<Item, Error> {
        if values.len() != self.fields.len() {
            return Err(self.arity_mismatch(values.len()));
        }
        let items = self
            .fields
            .iter()
            .zip(values)
            .map(|(field, value)| field.kind.encode(field.name, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Item::List(items))
    }

    /// Rebuilds field values from a positional list item.
    pub fn decode_object(&self, item: &Item) -> Result<Vec<Value>, Error> {
        let items = item.as_list().ok_or_else(|| Error::SchemaMismatch {
            profile: self.name,
            reason: "expected a list item".to_owned(),
        })?;
        if items.len() != self.fields.len() {
            return Err(self.arity_mismatch(items.len()));
        }
        self.fields
            .iter()
            .zip(items)
            .map(|(field, item)| field.kind.decode(field.name, item))
            .collect()
    }

    fn arity_mismatch(&self, got: usize) -> Error {
        Error::SchemaMismatch {
            profile: self.name,
            reason: format!("expected {} fields, got {got}", self.fields.len()),
        }
    }
}

/// Validation failure raised by a profile or one of its kinds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The item's shape does not match the profile.
    #[error("schema mismatch in {profile}: {reason}")]
    SchemaMismatch {
        /// Profile being decoded.
        profile: &'static str,
        /// What did not line up.
        reason: String,
    },
    /// A single field failed its kind's validation.
    #[error("invalid shape for field {field}: {reason}")]
    InvalidFieldShape {
        /// Field that failed.
        field: &'static str,
        /// What the kind rejected.
        reason: String,
    },
}

impl Error {
    fn value_mismatch(field: &'static str, expected: &str, got: &Value) -> Self {
        Self::InvalidFieldShape {
            field,
            reason: format!("expected {expected} value, got {}", got.variant_name()),
        }
    }
}

fn expect_bytes<'a>(field: &'static str, item: &'a Item) -> Result<&'a Bytes, Error> {
    item.as_bytes().ok_or_else(|| Error::InvalidFieldShape {
        field,
        reason: "expected a byte string, got a list".to_owned(),
    })
}

fn check_len(field: &'static str, bytes: &Bytes, expected: usize) -> Result<(), Error> {
    if bytes.len() != expected {
        return Err(Error::InvalidFieldShape {
            field,
            reason: format!("expected {expected} bytes, got {}", bytes.len()),
        });
    }
    Ok(())
}
