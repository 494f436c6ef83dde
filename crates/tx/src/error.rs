/// Failure raised while building, signing, encoding or decoding a
/// transaction.
///
/// Everything here is a local, deterministic validation failure surfaced
/// synchronously; nothing is transient or retryable. Decoding fails closed:
/// inputs that are ambiguous between malformed and merely unusual are
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    /// Non-canonical or truncated RLP.
    #[error(transparent)]
    Encoding(#[from] meridian_rlp::Error),
    /// A profile or field-shape violation.
    #[error(transparent)]
    Field(#[from] meridian_profile::Error),
    /// A curve-level failure: bad private key or unrecoverable signature.
    #[error(transparent)]
    Crypto(#[from] meridian_crypto::Error),
    /// The signature tail is neither one nor two raw signatures.
    #[error("invalid signature length: {got}")]
    InvalidSignatureLength {
        /// Length of the rejected signature tail.
        got: usize,
    },
    /// The delegation feature bit and the attached signatures disagree.
    #[error("partial delegation signature set")]
    InvalidDelegation,
    /// The envelope discriminator byte names no known transaction type.
    #[error("unsupported transaction type: {0:#04x}")]
    UnsupportedTxType(u8),
    /// A reserved tail that should have been trimmed or omitted.
    #[error("reserved fields not trimmed")]
    UntrimmedReserved,
}
