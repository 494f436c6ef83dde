use alloy_primitives::{Bytes, U256};
use meridian_profile::{Error as ProfileError, Kind, NumericKind, Value};
use meridian_rlp::Item;

use crate::TransactionError;

/// Feature bit signalling that a second, gas-paying signature is required.
pub const FEATURE_DELEGATED: u32 = 1;

const FEATURES_KIND: NumericKind = NumericKind { max_bytes: 4 };

/// Forward-compatibility tail of a transaction body: a feature bitmask plus
/// uninterpreted future fields.
///
/// The wire form is the nested list `[features, ...unused]`, canonically
/// trimmed: trailing empty `unused` entries are stripped and the whole list
/// is omitted when nothing remains but a zero bitmask. Unknown entries
/// survive a round-trip verbatim but are never interpreted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reserved {
    /// Protocol feature bitmask.
    pub features: u32,
    /// Unknown future fields, preserved verbatim.
    pub unused: Vec<Bytes>,
}

impl Reserved {
    /// A reserved tail with only the delegation feature set.
    pub const fn delegated() -> Self {
        Self { features: FEATURE_DELEGATED, unused: Vec::new() }
    }

    /// Whether the delegation feature bit is set.
    pub const fn is_delegated(&self) -> bool {
        self.features & FEATURE_DELEGATED != 0
    }

    fn trimmed_unused(&self) -> &[Bytes] {
        let mut unused = self.unused.as_slice();
        while let Some((last, rest)) = unused.split_last() {
            if !last.is_empty() {
                break;
            }
            unused = rest;
        }
        unused
    }

    /// Builds the wire item, or `None` when the canonical form omits the
    /// tail entirely.
    pub(crate) fn to_item(&self) -> Option<Item> {
        let unused = self.trimmed_unused();
        if self.features == 0 && unused.is_empty() {
            return None;
        }
        let mut items = Vec::with_capacity(1 + unused.len());
        items.push(
            FEATURES_KIND
                .encode("features", &Value::Number(U256::from(self.features)))
                .expect("a u32 bitmask always fits four bytes"),
        );
        items.extend(unused.iter().map(|entry| Item::bytes(entry.0.clone())));
        Some(Item::List(items))
    }

    /// Rebuilds the tail from its wire item, rejecting any form the
    /// canonical trimming would not have produced.
    pub(crate) fn from_item(item: &Item) -> Result<Self, TransactionError> {
        let items = item.as_list().ok_or_else(|| ProfileError::SchemaMismatch {
            profile: "reserved",
            reason: "expected a list item".to_owned(),
        })?;
        let Some((features_item, unused_items)) = items.split_first() else {
            // an empty list should have been omitted
            return Err(TransactionError::UntrimmedReserved);
        };
        let features = FEATURES_KIND
            .decode("features", features_item)?
            .into_number("features")?;
        let features = u32::try_from(features).map_err(|_| ProfileError::InvalidFieldShape {
            field: "features",
            reason: "bitmask wider than 32 bits".to_owned(),
        })?;
        let unused = unused_items
            .iter()
            .map(|entry| {
                entry
                    .as_bytes()
                    .map(|bytes| Bytes(bytes.clone()))
                    .ok_or_else(|| ProfileError::InvalidFieldShape {
                        field: "unused",
                        reason: "expected a byte string, got a list".to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if unused.last().is_some_and(|entry| entry.is_empty()) {
            return Err(TransactionError::UntrimmedReserved);
        }
        if features == 0 && unused.is_empty() {
            return Err(TransactionError::UntrimmedReserved);
        }
        Ok(Self { features, unused })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_tail_is_omitted() {
        assert_eq!(Reserved::default().to_item(), None);
        // trailing empty entries trim down to nothing
        let padded = Reserved { features: 0, unused: vec![Bytes::new(), Bytes::new()] };
        assert_eq!(padded.to_item(), None);
    }

    #[test]
    fn delegated_tail_roundtrips() {
        let reserved = Reserved::delegated();
        let item = reserved.to_item().unwrap();
        assert_eq!(item.encoded().as_ref(), &[0xC1, 0x01]);
        assert_eq!(Reserved::from_item(&item).unwrap(), reserved);
        assert!(reserved.is_delegated());
    }

    #[test]
    fn unknown_entries_are_preserved_not_interpreted() {
        let reserved = Reserved {
            features: FEATURE_DELEGATED,
            unused: vec![Bytes::from_static(&[0x12, 0x34])],
        };
        let item = reserved.to_item().unwrap();
        assert_eq!(Reserved::from_item(&item).unwrap(), reserved);
        // inner empty entries are not trailing and therefore survive
        let inner = Reserved {
            features: 0,
            unused: vec![Bytes::new(), Bytes::from_static(&[0x01])],
        };
        let item = inner.to_item().unwrap();
        assert_eq!(Reserved::from_item(&item).unwrap(), inner);
    }

    #[test]
    fn untrimmed_forms_are_rejected() {
        assert_matches!(
            Reserved::from_item(&Item::List(vec![])),
            Err(TransactionError::UntrimmedReserved)
        );
        // features == 0 with no tail should have been omitted entirely
        assert_matches!(
            Reserved::from_item(&Item::List(vec![Item::empty_bytes()])),
            Err(TransactionError::UntrimmedReserved)
        );
        // trailing empty unused entry
        assert_matches!(
            Reserved::from_item(&Item::List(vec![
                Item::bytes(vec![0x01]),
                Item::empty_bytes(),
            ])),
            Err(TransactionError::UntrimmedReserved)
        );
    }
}
