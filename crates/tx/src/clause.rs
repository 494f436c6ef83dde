use alloy_primitives::{Address, Bytes, U256};
use meridian_profile::{
    BlobKind, Field, NumericKind, OptionalFixedBlobKind, Profile, Value,
};
use meridian_rlp::Item;

use crate::TransactionError;

/// Wire shape of a clause: `[to, value, data]`.
static CLAUSE_PROFILE: Profile = Profile {
    name: "clause",
    fields: &[
        Field { name: "to", kind: &OptionalFixedBlobKind { len: 20 } },
        Field { name: "value", kind: &NumericKind { max_bytes: 32 } },
        Field { name: "data", kind: &BlobKind },
    ],
};

/// One transfer-or-call instruction. A transaction bundles one or more
/// clauses and executes them atomically.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clause {
    /// Recipient; `None` creates a contract.
    pub to: Option<Address>,
    /// Amount of base currency transferred, in wei.
    pub value: U256,
    /// Call input or contract creation bytecode.
    pub data: Bytes,
}

impl Clause {
    /// Creates a transfer-or-call clause addressed to `to`.
    pub fn new(to: Address) -> Self {
        Self { to: Some(to), ..Default::default() }
    }

    /// Creates a contract-creation clause carrying `code`.
    pub fn create_contract(code: Bytes) -> Self {
        Self { to: None, value: U256::ZERO, data: code }
    }

    /// Sets the transferred value.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Sets the call data.
    pub fn with_data(mut self, data: Bytes) -> Self {
        self.data = data;
        self
    }

    /// Whether this clause creates a contract.
    pub const fn is_create(&self) -> bool {
        self.to.is_none()
    }

    pub(crate) fn to_item(&self) -> Item {
        CLAUSE_PROFILE
            .encode_object(&[
                Value::OptBytes(self.to.map(|to| bytes::Bytes::copy_from_slice(to.as_slice()))),
                Value::Number(self.value),
                Value::Bytes(self.data.0.clone()),
            ])
            .expect("clause field shapes are enforced by their types")
    }

    pub(crate) fn from_item(item: &Item) -> Result<Self, TransactionError> {
        let mut values = CLAUSE_PROFILE.decode_object(item)?.into_iter();
        let to = values
            .next()
            .expect("profile arity was checked")
            .into_opt_bytes("to")?
            .map(|to| Address::from_slice(&to));
        let value = values.next().expect("profile arity was checked").into_number("value")?;
        let data = values.next().expect("profile arity was checked").into_bytes("data")?;
        Ok(Self { to, value, data: data.into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, hex};

    #[test]
    fn transfer_clause_wire_shape() {
        let clause = Clause::new(address!("7567d83b7b8d80addcb281a71d54fc7b3364ffed"))
            .with_value(U256::from(10_000u64));
        let item = clause.to_item();
        assert_eq!(
            item.encoded().as_ref(),
            hex!("d9947567d83b7b8d80addcb281a71d54fc7b3364ffed82271080")
        );
        assert_eq!(Clause::from_item(&item).unwrap(), clause);
    }

    #[test]
    fn creation_clause_folds_to_empty_recipient() {
        let clause = Clause::create_contract(Bytes::from_static(&[0x60, 0x60]));
        assert!(clause.is_create());
        let item = clause.to_item();
        let round = Clause::from_item(&item).unwrap();
        assert_eq!(round, clause);
        // the zero address is indistinguishable from absent on the wire
        let zeroed = Clause::new(Address::ZERO);
        assert_eq!(Clause::from_item(&zeroed.to_item()).unwrap().to, None);
    }
}
