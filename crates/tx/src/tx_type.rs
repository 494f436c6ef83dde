use crate::TransactionError;

/// Envelope discriminator of a dynamic-fee transaction.
///
/// Legacy envelopes start directly with an RLP list prefix (`>= 0xC0`), so
/// any value below that range is free for typed envelopes; this one is
/// reserved by the protocol and pins backward wire compatibility.
pub const DYNAMIC_FEE_TX_TYPE_ID: u8 = 0x51;

/// Fee-model variant of a transaction envelope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TxType {
    /// Legacy fee model, no discriminator byte on the wire.
    #[default]
    Legacy,
    /// Dynamic fee model, prefixed with [`DYNAMIC_FEE_TX_TYPE_ID`].
    DynamicFee,
}

impl TxType {
    /// The discriminator byte this type prepends to its envelope, if any.
    pub const fn envelope_prefix(&self) -> Option<u8> {
        match self {
            Self::Legacy => None,
            Self::DynamicFee => Some(DYNAMIC_FEE_TX_TYPE_ID),
        }
    }

    /// Peeks the discriminator of an envelope and returns the type together
    /// with the RLP payload that follows it.
    pub fn split(buf: &[u8]) -> Result<(Self, &[u8]), TransactionError> {
        match buf.first() {
            None => Err(meridian_rlp::Error::InputTooShort.into()),
            // an untyped envelope must open an RLP list
            Some(&byte) if byte >= 0xC0 => Ok((Self::Legacy, buf)),
            Some(&DYNAMIC_FEE_TX_TYPE_ID) => Ok((Self::DynamicFee, &buf[1..])),
            Some(&byte) => Err(TransactionError::UnsupportedTxType(byte)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn split_discriminates_envelopes() {
        assert_eq!(TxType::split(&[0xC0]).unwrap(), (TxType::Legacy, &[0xC0u8][..]));
        assert_eq!(TxType::split(&[0xF8, 0x0A]).unwrap(), (TxType::Legacy, &[0xF8u8, 0x0A][..]));
        assert_eq!(
            TxType::split(&[0x51, 0xC0]).unwrap(),
            (TxType::DynamicFee, &[0xC0u8][..])
        );
    }

    #[test]
    fn split_rejects_unknown_types() {
        assert_matches!(TxType::split(&[0x52, 0xC0]), Err(TransactionError::UnsupportedTxType(0x52)));
        assert_matches!(TxType::split(&[0x00]), Err(TransactionError::UnsupportedTxType(0x00)));
        assert_matches!(
            TxType::split(&[]),
            Err(TransactionError::Encoding(meridian_rlp::Error::InputTooShort))
        );
    }
}
