use std::sync::OnceLock;

use alloy_primitives::{keccak256, Address, Bytes, B256};
use bytes::BufMut;
use meridian_profile::Error as ProfileError;
use meridian_rlp::Item;

use crate::{Signature, Transaction, TransactionError, TxType, SIGNATURE_LENGTH};

/// Wire length of the combined sender and gas-payer signature blob.
pub const DELEGATED_SIGNATURE_LENGTH: usize = SIGNATURE_LENGTH * 2;

/// A fully signed transaction: a body plus its signature blob.
///
/// Construction goes through [`Self::new`], which enforces that the
/// signature set matches the body's delegation bit, so a value of this type
/// is always internally consistent. The signing hash and id are computed
/// lazily and cached; signer recovery runs on every call.
#[derive(Debug)]
pub struct TransactionSigned {
    /// The signed body.
    pub transaction: Transaction,
    /// The sender signature over the signing hash.
    pub signature: Signature,
    /// The gas-payer signature, present exactly when the body carries the
    /// delegation bit.
    pub delegator_signature: Option<Signature>,
    signing_hash: OnceLock<B256>,
    id: OnceLock<B256>,
}

impl Clone for TransactionSigned {
    fn clone(&self) -> Self {
        Self {
            transaction: self.transaction.clone(),
            signature: self.signature,
            delegator_signature: self.delegator_signature,
            signing_hash: self.signing_hash.clone(),
            id: self.id.clone(),
        }
    }
}

impl PartialEq for TransactionSigned {
    fn eq(&self, other: &Self) -> bool {
        self.transaction == other.transaction &&
            self.signature == other.signature &&
            self.delegator_signature == other.delegator_signature
    }
}

impl Eq for TransactionSigned {}

impl TransactionSigned {
    /// Binds a signature set to a body.
    ///
    /// A delegated body must come with a gas-payer signature and a
    /// non-delegated body must come without one.
    pub fn new(
        transaction: Transaction,
        signature: Signature,
        delegator_signature: Option<Signature>,
    ) -> Result<Self, TransactionError> {
        if transaction.is_delegated() != delegator_signature.is_some() {
            return Err(TransactionError::InvalidDelegation);
        }
        Ok(Self {
            transaction,
            signature,
            delegator_signature,
            signing_hash: OnceLock::new(),
            id: OnceLock::new(),
        })
    }

    /// Fee-model variant of the signed body.
    pub const fn tx_type(&self) -> TxType {
        self.transaction.tx_type()
    }

    /// Digest the sender signed, cached after the first call.
    pub fn signing_hash(&self) -> B256 {
        *self.signing_hash.get_or_init(|| self.transaction.signing_hash())
    }

    /// Unique identifier: keccak256 of the full signed envelope, cached
    /// after the first call.
    pub fn id(&self) -> B256 {
        *self.id.get_or_init(|| keccak256(self.encoded()))
    }

    /// Recovers the sender address from the signature.
    pub fn origin(&self) -> Result<Address, TransactionError> {
        Ok(meridian_crypto::recover_signer(self.signature.as_raw(), self.signing_hash())?)
    }

    /// Recovers the gas-payer address from the delegator signature, or
    /// `None` for a non-delegated transaction.
    pub fn delegator(&self) -> Result<Option<Address>, TransactionError> {
        let Some(signature) = &self.delegator_signature else {
            return Ok(None);
        };
        let hash = self.transaction.delegation_signing_hash(self.origin()?);
        Ok(Some(meridian_crypto::recover_signer(signature.as_raw(), hash)?))
    }

    /// The signature blob as it appears on the wire: the sender signature,
    /// with the gas-payer signature appended when delegated.
    fn signature_blob(&self) -> bytes::Bytes {
        match &self.delegator_signature {
            None => bytes::Bytes::copy_from_slice(self.signature.as_slice()),
            Some(delegator) => {
                let mut blob = Vec::with_capacity(DELEGATED_SIGNATURE_LENGTH);
                blob.extend_from_slice(self.signature.as_slice());
                blob.extend_from_slice(delegator.as_slice());
                blob.into()
            }
        }
    }

    /// Writes the signed envelope: the discriminator byte for dynamic-fee
    /// bodies, then the body fields with the signature blob appended as the
    /// final list item.
    pub fn encode(&self, out: &mut dyn BufMut) {
        if let Some(prefix) = self.tx_type().envelope_prefix() {
            out.put_u8(prefix);
        }
        let mut items = self.transaction.field_items();
        items.push(Item::Bytes(self.signature_blob()));
        Item::List(items).encode(out);
    }

    /// The signed envelope as a fresh buffer.
    pub fn encoded(&self) -> Bytes {
        let mut out = Vec::new();
        self.encode(&mut out);
        out.into()
    }

    /// Decodes a signed envelope, validating canonical form, field shapes,
    /// and the signature blob length against the delegation bit.
    pub fn decode(buf: &[u8]) -> Result<Self, TransactionError> {
        let (tx_type, payload) = TxType::split(buf)?;
        tracing::trace!(target: "meridian::tx", ?tx_type, len = buf.len(), "decoding signed envelope");
        let item = Item::decode(payload)?;
        let items = item.as_list().ok_or_else(|| ProfileError::SchemaMismatch {
            profile: "tx.signed",
            reason: "envelope payload is not a list".to_owned(),
        })?;
        let Some((signature_item, field_items)) = items.split_last() else {
            return Err(ProfileError::SchemaMismatch {
                profile: "tx.signed",
                reason: "envelope payload is empty".to_owned(),
            }
            .into());
        };
        let blob = signature_item.as_bytes().ok_or_else(|| ProfileError::InvalidFieldShape {
            field: "signature",
            reason: "expected a byte string".to_owned(),
        })?;

        let transaction = Transaction::from_field_items(tx_type, field_items)?;
        let (signature, delegator_signature) =
            match (transaction.is_delegated(), blob.len()) {
                (false, SIGNATURE_LENGTH) => (Signature::from_slice(blob)?, None),
                (true, DELEGATED_SIGNATURE_LENGTH) => (
                    Signature::from_slice(&blob[..SIGNATURE_LENGTH])?,
                    Some(Signature::from_slice(&blob[SIGNATURE_LENGTH..])?),
                ),
                (true, SIGNATURE_LENGTH) => return Err(TransactionError::InvalidDelegation),
                (_, got) => return Err(TransactionError::InvalidSignatureLength { got }),
            };
        Self::new(transaction, signature, delegator_signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;
    use assert_matches::assert_matches;

    const SIGNED_LEGACY: &[u8] = &hex!(
        "f8734a8800000000aabbccdd20dad9947567d83b7b8d80addcb281a71d54fc7b3364ffed8227108081808252088083bc614eb841294fc72692cd7020eb7f8dbb5b31223e9c47b44b7a1297bb9bc2bd6b0cd674761de79c1d726c238f017b7263c8075914f732629b226e6cf67f765a6ed20c27b100"
    );

    #[test]
    fn decode_reencode_is_identity() {
        let signed = TransactionSigned::decode(SIGNED_LEGACY).unwrap();
        assert_eq!(signed.encoded().as_ref(), SIGNED_LEGACY);
        assert_eq!(signed.tx_type(), TxType::Legacy);
        assert_eq!(signed.delegator_signature, None);
    }

    #[test]
    fn sixty_four_byte_blob_is_rejected_with_its_length() {
        // the pinned envelope with the final signature byte dropped
        let encoded = hex!(
            "f8724a8800000000aabbccdd20dad9947567d83b7b8d80addcb281a71d54fc7b3364ffed8227108081808252088083bc614eb840294fc72692cd7020eb7f8dbb5b31223e9c47b44b7a1297bb9bc2bd6b0cd674761de79c1d726c238f017b7263c8075914f732629b226e6cf67f765a6ed20c27b1"
        );
        assert_matches!(
            TransactionSigned::decode(&encoded),
            Err(TransactionError::InvalidSignatureLength { got: 64 })
        );
    }

    #[test]
    fn delegated_body_with_single_signature_is_rejected() {
        let encoded = hex!(
            "f8744a8800000000aabbccdd20dad9947567d83b7b8d80addcb281a71d54fc7b3364ffed82271080808252088083d0b1a5c101b841238b8118ca366cce3b776e19fa0722181bf1c2f732c291a5cdb134c909d4bfa15e5b5f8aa839fbd1ddd287d537ab631f4dbdf60e9d7f8620f75b1022915caf1f01"
        );
        assert_matches!(
            TransactionSigned::decode(&encoded),
            Err(TransactionError::InvalidDelegation)
        );
    }

    #[test]
    fn mismatched_signature_set_is_rejected_at_construction() {
        let signed = TransactionSigned::decode(SIGNED_LEGACY).unwrap();
        assert_matches!(
            TransactionSigned::new(
                signed.transaction.clone(),
                signed.signature,
                Some(signed.signature),
            ),
            Err(TransactionError::InvalidDelegation)
        );
    }

    #[test]
    fn trailing_bytes_after_envelope_are_rejected() {
        let mut encoded = SIGNED_LEGACY.to_vec();
        encoded.push(0x00);
        assert_matches!(
            TransactionSigned::decode(&encoded),
            Err(TransactionError::Encoding(meridian_rlp::Error::TrailingBytes))
        );
    }
}
