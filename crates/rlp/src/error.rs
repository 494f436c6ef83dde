/// Decoding failure. Every variant is a deterministic, non-retryable
/// rejection of a malformed or non-canonical input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input ended before the declared item did.
    #[error("input too short")]
    InputTooShort,
    /// A single byte below 0x80 was wrapped in a string header.
    #[error("non-canonical single byte encoding")]
    NonCanonicalSingleByte,
    /// A long-form length that the short form could express, or a length
    /// with leading zero bytes.
    #[error("non-canonical length encoding")]
    NonCanonicalSize,
    /// A child item crosses its enclosing list's payload boundary.
    #[error("list payload length mismatch")]
    ListLengthMismatch,
    /// Valid item followed by leftover input.
    #[error("trailing bytes after item")]
    TrailingBytes,
    /// Declared length does not fit the platform's address space.
    #[error("length overflow")]
    Overflow,
}
