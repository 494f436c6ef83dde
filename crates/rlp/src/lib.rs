#![warn(missing_debug_implementations, missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]

//! Canonical recursive-length-prefix (RLP) codec.
//!
//! RLP knows exactly one data shape: an [`Item`] is either an opaque byte
//! string or an ordered list of items. Integers, addresses and records are
//! projections onto it and live in higher layers.
//!
//! Decoding is strict: every non-minimal length form is rejected, so a given
//! item has exactly one accepted serialization.

use bytes::{BufMut, Bytes};

mod error;
pub use error::Error;

/// Offset added to the length of a short byte string.
const STRING_OFFSET: u8 = 0x80;
/// Offset added to the length-of-length of a long byte string.
const STRING_LEN_OFFSET: u8 = 0xB7;
/// Offset added to the payload length of a short list.
const LIST_OFFSET: u8 = 0xC0;
/// Offset added to the length-of-length of a long list.
const LIST_LEN_OFFSET: u8 = 0xF7;
/// Longest payload encodable with a single-byte length prefix.
const SHORT_PAYLOAD_MAX: usize = 55;

/// An RLP item: a byte string or an ordered list of items.
///
/// This is the complete data model of the codec. No other shape exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    /// An opaque byte string.
    Bytes(Bytes),
    /// An ordered sequence of items.
    List(Vec<Item>),
}

impl Item {
    /// Creates a byte-string item.
    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Creates a list item.
    pub fn list(items: impl Into<Vec<Item>>) -> Self {
        Self::List(items.into())
    }

    /// The empty byte string, `0x80` on the wire.
    pub const fn empty_bytes() -> Self {
        Self::Bytes(Bytes::new())
    }

    /// Returns the byte string if this item is one.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::List(_) => None,
        }
    }

    /// Returns the child items if this item is a list.
    pub fn as_list(&self) -> Option<&[Item]> {
        match self {
            Self::Bytes(_) => None,
            Self::List(items) => Some(items),
        }
    }

    /// Length of the encoded payload, excluding this item's own header.
    fn payload_length(&self) -> usize {
        match self {
            Self::Bytes(bytes) => bytes.len(),
            Self::List(items) => items.iter().map(Self::encoded_length).sum(),
        }
    }

    /// Total length of the canonical encoding of this item.
    pub fn encoded_length(&self) -> usize {
        let payload = self.payload_length();
        match self {
            // single bytes below 0x80 carry no header
            Self::Bytes(bytes) if bytes.len() == 1 && bytes[0] < STRING_OFFSET => 1,
            _ => payload + header_length(payload),
        }
    }

    /// Writes the canonical encoding of this item into `out`.
    ///
    /// The output length is known up front via [`Self::encoded_length`], so a
    /// caller can reserve once and encode in a single pass.
    pub fn encode(&self, out: &mut dyn BufMut) {
        match self {
            Self::Bytes(bytes) => {
                if bytes.len() == 1 && bytes[0] < STRING_OFFSET {
                    out.put_u8(bytes[0]);
                } else {
                    encode_header(bytes.len(), STRING_OFFSET, STRING_LEN_OFFSET, out);
                    out.put_slice(bytes);
                }
            }
            Self::List(items) => {
                encode_header(self.payload_length(), LIST_OFFSET, LIST_LEN_OFFSET, out);
                for item in items {
                    item.encode(out);
                }
            }
        }
    }

    /// Returns the canonical encoding of this item as a fresh buffer.
    pub fn encoded(&self) -> Bytes {
        let mut out = Vec::with_capacity(self.encoded_length());
        self.encode(&mut out);
        out.into()
    }

    /// Decodes exactly one item from `buf`.
    ///
    /// Fails if the input is truncated, is not in canonical (minimal-length)
    /// form, or carries trailing bytes after the item.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        let mut buf = buf;
        let item = Self::decode_one(&mut buf)?;
        if !buf.is_empty() {
            return Err(Error::TrailingBytes);
        }
        Ok(item)
    }

    /// Decodes one item from the front of `buf`, advancing it.
    fn decode_one(buf: &mut &[u8]) -> Result<Self, Error> {
        let (&first, rest) = buf.split_first().ok_or(Error::InputTooShort)?;
        *buf = rest;
        match first {
            0x00..=0x7F => Ok(Self::Bytes(Bytes::copy_from_slice(&[first]))),
            STRING_OFFSET..=STRING_LEN_OFFSET => {
                let len = (first - STRING_OFFSET) as usize;
                let payload = take(buf, len)?;
                if payload.len() == 1 && payload[0] < STRING_OFFSET {
                    // should have been encoded as the byte itself
                    return Err(Error::NonCanonicalSingleByte);
                }
                Ok(Self::Bytes(Bytes::copy_from_slice(payload)))
            }
            0xB8..=0xBF => {
                let len = decode_long_length(buf, first - STRING_LEN_OFFSET)?;
                let payload = take(buf, len)?;
                Ok(Self::Bytes(Bytes::copy_from_slice(payload)))
            }
            LIST_OFFSET..=LIST_LEN_OFFSET => {
                let len = (first - LIST_OFFSET) as usize;
                let payload = take(buf, len)?;
                Self::decode_list_payload(payload)
            }
            0xF8..=0xFF => {
                let len = decode_long_length(buf, first - LIST_LEN_OFFSET)?;
                let payload = take(buf, len)?;
                Self::decode_list_payload(payload)
            }
        }
    }

    /// Decodes the concatenated child items of a list payload.
    fn decode_list_payload(mut payload: &[u8]) -> Result<Self, Error> {
        let mut items = Vec::new();
        while !payload.is_empty() {
            // the whole payload was already taken from the input, so running
            // short here means a child crosses the list boundary
            let item = Self::decode_one(&mut payload).map_err(|err| match err {
                Error::InputTooShort => Error::ListLengthMismatch,
                other => other,
            })?;
            items.push(item);
        }
        Ok(Self::List(items))
    }
}

impl From<Bytes> for Item {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<Item>> for Item {
    fn from(items: Vec<Item>) -> Self {
        Self::List(items)
    }
}

/// Length of the header a payload of `len` bytes requires.
fn header_length(len: usize) -> usize {
    if len <= SHORT_PAYLOAD_MAX {
        1
    } else {
        1 + be_length_bytes(len)
    }
}

/// Number of bytes in the minimal big-endian representation of `len`.
fn be_length_bytes(len: usize) -> usize {
    (usize::BITS as usize - len.leading_zeros() as usize).div_ceil(8)
}

/// Writes a short or long form header for a payload of `len` bytes.
fn encode_header(len: usize, short_offset: u8, long_offset: u8, out: &mut dyn BufMut) {
    if len <= SHORT_PAYLOAD_MAX {
        out.put_u8(short_offset + len as u8);
    } else {
        let len_bytes = be_length_bytes(len);
        out.put_u8(long_offset + len_bytes as u8);
        out.put_slice(&len.to_be_bytes()[core::mem::size_of::<usize>() - len_bytes..]);
    }
}

/// Reads and validates a long-form length of `len_of_len` bytes.
fn decode_long_length(buf: &mut &[u8], len_of_len: u8) -> Result<usize, Error> {
    let len_bytes = take(buf, len_of_len as usize)?;
    if len_bytes[0] == 0 {
        return Err(Error::NonCanonicalSize);
    }
    if len_bytes.len() > core::mem::size_of::<usize>() {
        return Err(Error::Overflow);
    }
    let mut len = 0usize;
    for &byte in len_bytes {
        len = len << 8 | byte as usize;
    }
    if len <= SHORT_PAYLOAD_MAX {
        // the short form would have sufficed
        return Err(Error::NonCanonicalSize);
    }
    Ok(len)
}

/// Splits `n` bytes off the front of `buf`.
fn take<'a>(buf: &mut &'a [u8], n: usize) -> Result<&'a [u8], Error> {
    if buf.len() < n {
        return Err(Error::InputTooShort);
    }
    let (head, tail) = buf.split_at(n);
    *buf = tail;
    Ok(head)
}
