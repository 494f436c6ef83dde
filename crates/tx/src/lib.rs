//! Transaction data model, signing, and envelope codec.
//!
//! A transaction is a list of clauses executed atomically, wrapped in a
//! replay-protected body. Two fee-model variants exist: the legacy
//! coefficient model and the dynamic fee-cap model, distinguished on the
//! wire by a leading discriminator byte. Bodies are signed over their
//! keccak256 digest, optionally co-signed by an independent gas payer, and
//! identified by the digest of the fully signed envelope.

#![doc(issue_tracker_base_url = "https://github.com/meridian-ledger/meridian-rs/issues/")]
#![warn(missing_debug_implementations, missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod builder;
mod clause;
mod error;
mod gas;
mod reserved;
mod signature;
mod signed;
mod transaction;
mod tx_type;

pub use builder::TransactionBuilder;
pub use clause::Clause;
pub use error::TransactionError;
pub use gas::{intrinsic_gas, GasSchedule, GAS_SCHEDULE};
pub use reserved::{Reserved, FEATURE_DELEGATED};
pub use signature::Signature;
pub use signed::{TransactionSigned, DELEGATED_SIGNATURE_LENGTH};
pub use transaction::{Transaction, TxDynamicFee, TxLegacy};
pub use tx_type::{TxType, DYNAMIC_FEE_TX_TYPE_ID};

pub use meridian_crypto::SIGNATURE_LENGTH;
