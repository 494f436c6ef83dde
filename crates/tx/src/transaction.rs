use alloy_primitives::{keccak256, Address, Bytes, B256, B64, U256};
use bytes::BufMut;
use meridian_profile::{
    Error as ProfileError, FixedBlobKind, Kind, NumericKind, OptionalFixedBlobKind, Value,
};
use meridian_rlp::Item;

use crate::{
    gas, Clause, Reserved, Signature, TransactionError, TransactionSigned, TxType,
};

// Body field shapes, in wire order. The two variants share everything but
// the fee fields.
const CHAIN_TAG: NumericKind = NumericKind { max_bytes: 1 };
const BLOCK_REF: FixedBlobKind = FixedBlobKind { len: 8 };
const EXPIRATION: NumericKind = NumericKind { max_bytes: 4 };
const GAS_PRICE_COEF: NumericKind = NumericKind { max_bytes: 1 };
const FEE_PER_GAS: NumericKind = NumericKind { max_bytes: 32 };
const GAS: NumericKind = NumericKind { max_bytes: 8 };
const DEPENDS_ON: OptionalFixedBlobKind = OptionalFixedBlobKind { len: 32 };
const NONCE: NumericKind = NumericKind { max_bytes: 8 };

const EXPECT_SHAPE: &str = "body field shapes are enforced by their types";

/// A legacy fee-model transaction body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxLegacy {
    /// Last byte of the genesis id, guarding against cross-chain replay.
    pub chain_tag: u8,
    /// First eight bytes of a recent block id, anchoring the transaction
    /// in time.
    pub block_ref: B64,
    /// Number of blocks after `block_ref` during which the transaction
    /// stays processable.
    pub expiration: u32,
    /// Instructions executed atomically, in order.
    pub clauses: Vec<Clause>,
    /// Fee bidding coefficient, 0 to 255.
    pub gas_price_coef: u8,
    /// Declared gas limit.
    pub gas: u64,
    /// Id of a transaction this one depends on, if any.
    pub depends_on: Option<B256>,
    /// Caller-chosen entropy, at most eight bytes on the wire.
    pub nonce: u64,
    /// Forward-compatibility tail.
    pub reserved: Reserved,
}

/// A dynamic fee-model transaction body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxDynamicFee {
    /// Last byte of the genesis id, guarding against cross-chain replay.
    pub chain_tag: u8,
    /// First eight bytes of a recent block id.
    pub block_ref: B64,
    /// Number of blocks after `block_ref` during which the transaction
    /// stays processable.
    pub expiration: u32,
    /// Instructions executed atomically, in order.
    pub clauses: Vec<Clause>,
    /// Maximum tip per unit of gas paid to the proposer.
    pub max_priority_fee_per_gas: U256,
    /// Absolute cap per unit of gas, base fee included.
    pub max_fee_per_gas: U256,
    /// Declared gas limit.
    pub gas: u64,
    /// Id of a transaction this one depends on, if any.
    pub depends_on: Option<B256>,
    /// Caller-chosen entropy, at most eight bytes on the wire.
    pub nonce: u64,
    /// Forward-compatibility tail.
    pub reserved: Reserved,
}

/// An unsigned transaction body, one of the two fee-model variants.
///
/// Which fee fields exist is a compile-time property of the variant; every
/// reader of fee fields matches exhaustively.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transaction {
    /// Legacy fee model.
    Legacy(TxLegacy),
    /// Dynamic fee model.
    DynamicFee(TxDynamicFee),
}

impl Transaction {
    /// Fee-model variant of this body.
    pub const fn tx_type(&self) -> TxType {
        match self {
            Self::Legacy(_) => TxType::Legacy,
            Self::DynamicFee(_) => TxType::DynamicFee,
        }
    }

    /// Chain tag the body is bound to.
    pub const fn chain_tag(&self) -> u8 {
        match self {
            Self::Legacy(tx) => tx.chain_tag,
            Self::DynamicFee(tx) => tx.chain_tag,
        }
    }

    /// Block reference anchoring the body.
    pub const fn block_ref(&self) -> B64 {
        match self {
            Self::Legacy(tx) => tx.block_ref,
            Self::DynamicFee(tx) => tx.block_ref,
        }
    }

    /// Expiration window in blocks.
    pub const fn expiration(&self) -> u32 {
        match self {
            Self::Legacy(tx) => tx.expiration,
            Self::DynamicFee(tx) => tx.expiration,
        }
    }

    /// The clause list.
    pub fn clauses(&self) -> &[Clause] {
        match self {
            Self::Legacy(tx) => &tx.clauses,
            Self::DynamicFee(tx) => &tx.clauses,
        }
    }

    /// Declared gas limit.
    pub const fn gas(&self) -> u64 {
        match self {
            Self::Legacy(tx) => tx.gas,
            Self::DynamicFee(tx) => tx.gas,
        }
    }

    /// Transaction this one depends on, if any.
    pub const fn depends_on(&self) -> Option<B256> {
        match self {
            Self::Legacy(tx) => tx.depends_on,
            Self::DynamicFee(tx) => tx.depends_on,
        }
    }

    /// Caller-chosen nonce.
    pub const fn nonce(&self) -> u64 {
        match self {
            Self::Legacy(tx) => tx.nonce,
            Self::DynamicFee(tx) => tx.nonce,
        }
    }

    /// The reserved tail.
    pub const fn reserved(&self) -> &Reserved {
        match self {
            Self::Legacy(tx) => &tx.reserved,
            Self::DynamicFee(tx) => &tx.reserved,
        }
    }

    /// Whether the body requires a gas-payer co-signature.
    pub const fn is_delegated(&self) -> bool {
        self.reserved().is_delegated()
    }

    /// Minimum gas this body must declare, under the active schedule.
    pub fn intrinsic_gas(&self) -> u64 {
        gas::intrinsic_gas(self.clauses())
    }

    /// Body fields as wire items, reserved tail included when present.
    pub(crate) fn field_items(&self) -> Vec<Item> {
        let mut items = vec![
            CHAIN_TAG
                .encode("chainTag", &Value::Number(U256::from(self.chain_tag())))
                .expect(EXPECT_SHAPE),
            BLOCK_REF
                .encode(
                    "blockRef",
                    &Value::Bytes(bytes::Bytes::copy_from_slice(self.block_ref().as_slice())),
                )
                .expect(EXPECT_SHAPE),
            EXPIRATION
                .encode("expiration", &Value::Number(U256::from(self.expiration())))
                .expect(EXPECT_SHAPE),
            Item::List(self.clauses().iter().map(Clause::to_item).collect()),
        ];
        match self {
            Self::Legacy(tx) => items.push(
                GAS_PRICE_COEF
                    .encode("gasPriceCoef", &Value::Number(U256::from(tx.gas_price_coef)))
                    .expect(EXPECT_SHAPE),
            ),
            Self::DynamicFee(tx) => {
                items.push(
                    FEE_PER_GAS
                        .encode("maxPriorityFeePerGas", &Value::Number(tx.max_priority_fee_per_gas))
                        .expect(EXPECT_SHAPE),
                );
                items.push(
                    FEE_PER_GAS
                        .encode("maxFeePerGas", &Value::Number(tx.max_fee_per_gas))
                        .expect(EXPECT_SHAPE),
                );
            }
        }
        items.push(
            GAS.encode("gas", &Value::Number(U256::from(self.gas()))).expect(EXPECT_SHAPE),
        );
        items.push(
            DEPENDS_ON
                .encode(
                    "dependsOn",
                    &Value::OptBytes(
                        self.depends_on()
                            .map(|id| bytes::Bytes::copy_from_slice(id.as_slice())),
                    ),
                )
                .expect(EXPECT_SHAPE),
        );
        items.push(
            NONCE.encode("nonce", &Value::Number(U256::from(self.nonce()))).expect(EXPECT_SHAPE),
        );
        if let Some(reserved) = self.reserved().to_item() {
            items.push(reserved);
        }
        items
    }

    /// Writes the unsigned envelope: the discriminator byte for dynamic-fee
    /// bodies, then the RLP body list.
    pub fn encode(&self, out: &mut dyn BufMut) {
        if let Some(prefix) = self.tx_type().envelope_prefix() {
            out.put_u8(prefix);
        }
        Item::List(self.field_items()).encode(out);
    }

    /// The unsigned envelope as a fresh buffer.
    pub fn encoded(&self) -> Bytes {
        let mut out = Vec::new();
        self.encode(&mut out);
        out.into()
    }

    /// Digest the sender actually signs: keccak256 of the unsigned
    /// envelope. A body must not change after this has been taken; the
    /// signing entry points consume the body to enforce that.
    pub fn signing_hash(&self) -> B256 {
        keccak256(self.encoded())
    }

    /// Digest a gas payer signs: the signing hash bound to the sender's
    /// address.
    pub fn delegation_signing_hash(&self, origin: Address) -> B256 {
        let mut preimage = [0u8; 52];
        preimage[..32].copy_from_slice(self.signing_hash().as_slice());
        preimage[32..].copy_from_slice(origin.as_slice());
        keccak256(preimage)
    }

    /// Signs the body with the sender key alone.
    ///
    /// Bodies carrying the delegation bit need [`Self::sign_delegated`];
    /// signing one here is a partial delegation set.
    pub fn sign(self, sender: &B256) -> Result<TransactionSigned, TransactionError> {
        meridian_crypto::validate_secret(sender)?;
        if self.is_delegated() {
            return Err(TransactionError::InvalidDelegation);
        }
        let signature = meridian_crypto::sign_hash(self.signing_hash(), sender)?;
        TransactionSigned::new(self, Signature::from_raw(signature), None)
    }

    /// Signs the body with the sender key and an independent gas-payer key.
    ///
    /// The body must carry the delegation feature bit; both signatures are
    /// attached or the operation fails.
    pub fn sign_delegated(
        self,
        sender: &B256,
        delegator: &B256,
    ) -> Result<TransactionSigned, TransactionError> {
        meridian_crypto::validate_secret(sender)?;
        meridian_crypto::validate_secret(delegator)?;
        if !self.is_delegated() {
            return Err(TransactionError::InvalidDelegation);
        }
        let signing_hash = self.signing_hash();
        let sender_signature = meridian_crypto::sign_hash(signing_hash, sender)?;
        let origin = meridian_crypto::secret_to_address(sender)?;
        let delegator_signature =
            meridian_crypto::sign_hash(self.delegation_signing_hash(origin), delegator)?;
        TransactionSigned::new(
            self,
            Signature::from_raw(sender_signature),
            Some(Signature::from_raw(delegator_signature)),
        )
    }

    /// Decodes an unsigned envelope.
    pub fn decode(buf: &[u8]) -> Result<Self, TransactionError> {
        let (tx_type, payload) = TxType::split(buf)?;
        let item = Item::decode(payload)?;
        let items = item.as_list().ok_or_else(|| ProfileError::SchemaMismatch {
            profile: "tx.body",
            reason: "envelope payload is not a list".to_owned(),
        })?;
        Self::from_field_items(tx_type, items)
    }

    /// Rebuilds a body from its wire items, reserved tail included.
    pub(crate) fn from_field_items(
        tx_type: TxType,
        items: &[Item],
    ) -> Result<Self, TransactionError> {
        let (profile_name, base) = match tx_type {
            TxType::Legacy => ("tx.legacy", 8),
            TxType::DynamicFee => ("tx.dynamic_fee", 9),
        };
        let (fields, reserved) = if items.len() == base {
            (items, Reserved::default())
        } else if items.len() == base + 1 {
            (&items[..base], Reserved::from_item(&items[base])?)
        } else {
            return Err(ProfileError::SchemaMismatch {
                profile: profile_name,
                reason: format!(
                    "expected {base} or {} fields, got {}",
                    base + 1,
                    items.len()
                ),
            }
            .into());
        };

        let chain_tag: u8 = decode_number(&CHAIN_TAG, "chainTag", &fields[0])?;
        let block_ref = BLOCK_REF
            .decode("blockRef", &fields[1])?
            .into_bytes("blockRef")
            .map(|bytes| B64::from_slice(&bytes))?;
        let expiration: u32 = decode_number(&EXPIRATION, "expiration", &fields[2])?;
        let clauses = fields[3]
            .as_list()
            .ok_or_else(|| ProfileError::InvalidFieldShape {
                field: "clauses",
                reason: "expected a list of clauses".to_owned(),
            })?
            .iter()
            .map(Clause::from_item)
            .collect::<Result<Vec<_>, _>>()?;

        match tx_type {
            TxType::Legacy => Ok(Self::Legacy(TxLegacy {
                chain_tag,
                block_ref,
                expiration,
                clauses,
                gas_price_coef: decode_number(&GAS_PRICE_COEF, "gasPriceCoef", &fields[4])?,
                gas: decode_number(&GAS, "gas", &fields[5])?,
                depends_on: decode_depends_on(&fields[6])?,
                nonce: decode_number(&NONCE, "nonce", &fields[7])?,
                reserved,
            })),
            TxType::DynamicFee => Ok(Self::DynamicFee(TxDynamicFee {
                chain_tag,
                block_ref,
                expiration,
                clauses,
                max_priority_fee_per_gas: FEE_PER_GAS
                    .decode("maxPriorityFeePerGas", &fields[4])?
                    .into_number("maxPriorityFeePerGas")?,
                max_fee_per_gas: FEE_PER_GAS
                    .decode("maxFeePerGas", &fields[5])?
                    .into_number("maxFeePerGas")?,
                gas: decode_number(&GAS, "gas", &fields[6])?,
                depends_on: decode_depends_on(&fields[7])?,
                nonce: decode_number(&NONCE, "nonce", &fields[8])?,
                reserved,
            })),
        }
    }
}

impl From<TxLegacy> for Transaction {
    fn from(tx: TxLegacy) -> Self {
        Self::Legacy(tx)
    }
}

impl From<TxDynamicFee> for Transaction {
    fn from(tx: TxDynamicFee) -> Self {
        Self::DynamicFee(tx)
    }
}

fn decode_number<T: TryFrom<U256>>(
    kind: &NumericKind,
    field: &'static str,
    item: &Item,
) -> Result<T, TransactionError> {
    let number = kind.decode(field, item)?.into_number(field)?;
    T::try_from(number).map_err(|_| {
        ProfileError::InvalidFieldShape { field, reason: "value out of range".to_owned() }.into()
    })
}

fn decode_depends_on(item: &Item) -> Result<Option<B256>, TransactionError> {
    Ok(DEPENDS_ON
        .decode("dependsOn", item)?
        .into_opt_bytes("dependsOn")?
        .map(|id| B256::from_slice(&id)))
}
