use alloy_primitives::hex;
use meridian_crypto::SIGNATURE_LENGTH;

use crate::TransactionError;

/// A raw 65-byte recoverable ECDSA signature: `r ‖ s ‖ recovery_id`.
///
/// The envelope codec carries one of these for the sender and, when fee
/// delegation is enabled, a second independent one for the gas payer.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Wraps an already-validated raw signature.
    pub const fn from_raw(raw: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(raw)
    }

    /// Parses a raw signature, rejecting any length but 65.
    pub fn from_slice(slice: &[u8]) -> Result<Self, TransactionError> {
        let raw: [u8; SIGNATURE_LENGTH] = slice
            .try_into()
            .map_err(|_| TransactionError::InvalidSignatureLength { got: slice.len() })?;
        Ok(Self(raw))
    }

    /// The raw signature bytes.
    pub const fn as_raw(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// The raw signature as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// The trailing recovery id byte.
    pub const fn recovery_id(&self) -> u8 {
        self.0[SIGNATURE_LENGTH - 1]
    }
}

impl core::fmt::Debug for Signature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Signature").field(&hex::encode_prefixed(self.0)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn length_is_enforced() {
        assert_matches!(
            Signature::from_slice(&[0u8; 64]),
            Err(TransactionError::InvalidSignatureLength { got: 64 })
        );
        assert_matches!(
            Signature::from_slice(&[0u8; 66]),
            Err(TransactionError::InvalidSignatureLength { got: 66 })
        );
        let sig = Signature::from_slice(&[7u8; 65]).unwrap();
        assert_eq!(sig.recovery_id(), 7);
    }
}
