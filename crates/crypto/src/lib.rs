#![warn(missing_debug_implementations, missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]

//! secp256k1 signing, public-key recovery and address derivation.
//!
//! Signatures are deterministic (RFC 6979 nonces) and low-S normalized, and
//! are carried as raw 65-byte `r ‖ s ‖ recovery_id` sequences. The digest
//! used everywhere in the protocol is Keccak-256; key material is borrowed
//! for the duration of a call and never retained.

use alloy_primitives::{keccak256, Address, B256};
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey, SecretKey, SECP256K1,
};

/// Length of a raw recoverable signature: 32-byte r, 32-byte s, 1-byte
/// recovery id.
pub const SIGNATURE_LENGTH: usize = 65;

/// Curve-level failure. Deterministic and non-retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The private key is not a valid curve scalar.
    #[error("invalid private key")]
    InvalidPrivateKey,
    /// The signature does not recover to any public key for the given hash.
    #[error("signature recovery failed")]
    SignatureRecoveryFailed,
}

/// Checks that `secret` is a valid curve scalar without signing anything.
///
/// Signing entry points call this before any hashing so that a bad key is
/// reported ahead of all other failures.
pub fn validate_secret(secret: &B256) -> Result<(), Error> {
    SecretKey::from_slice(secret.as_slice()).map(|_| ()).map_err(|_| Error::InvalidPrivateKey)
}

/// Signs a 32-byte digest, returning the raw 65-byte recoverable signature.
pub fn sign_hash(hash: B256, secret: &B256) -> Result<[u8; SIGNATURE_LENGTH], Error> {
    let secret = SecretKey::from_slice(secret.as_slice()).map_err(|_| Error::InvalidPrivateKey)?;
    let message =
        Message::from_digest_slice(hash.as_slice()).map_err(|_| Error::InvalidPrivateKey)?;
    let signature = SECP256K1.sign_ecdsa_recoverable(&message, &secret);
    let (recovery_id, compact) = signature.serialize_compact();

    let mut raw = [0u8; SIGNATURE_LENGTH];
    raw[..64].copy_from_slice(&compact);
    raw[64] = recovery_id.to_i32() as u8;
    Ok(raw)
}

/// Recovers the signer's address from a raw signature over `hash`.
///
/// Never yields a placeholder address: any curve-level failure surfaces as
/// [`Error::SignatureRecoveryFailed`].
pub fn recover_signer(signature: &[u8; SIGNATURE_LENGTH], hash: B256) -> Result<Address, Error> {
    let recovery_id = RecoveryId::from_i32(signature[64] as i32)
        .map_err(|_| Error::SignatureRecoveryFailed)?;
    let signature = RecoverableSignature::from_compact(&signature[..64], recovery_id)
        .map_err(|_| Error::SignatureRecoveryFailed)?;
    let message =
        Message::from_digest_slice(hash.as_slice()).map_err(|_| Error::SignatureRecoveryFailed)?;
    let public = SECP256K1
        .recover_ecdsa(&message, &signature)
        .map_err(|_| Error::SignatureRecoveryFailed)?;
    Ok(public_key_to_address(public))
}

/// Converts a public key into an address by hashing the uncompressed point
/// with keccak256 and keeping the last 20 bytes.
pub fn public_key_to_address(public: PublicKey) -> Address {
    // strip the uncompressed-point tag byte
    let hash = keccak256(&public.serialize_uncompressed()[1..]);
    Address::from_slice(&hash[12..])
}

/// Derives the address controlled by `secret`.
pub fn secret_to_address(secret: &B256) -> Result<Address, Error> {
    let secret = SecretKey::from_slice(secret.as_slice()).map_err(|_| Error::InvalidPrivateKey)?;
    Ok(public_key_to_address(PublicKey::from_secret_key(SECP256K1, &secret)))
}
