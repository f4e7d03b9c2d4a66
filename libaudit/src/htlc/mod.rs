//! Hashed time lock contracts.
//!
//! A token owned by an HTLC [`Script`] moves through a two-way state machine. Before the deadline the recipient can
//! *claim* it by publishing the preimage of the lock hash. From the deadline onwards the sender can *reclaim* it.
//! The validators in this module decide which transition a transfer is making and check the metadata each
//! transition must publish.

pub mod script;
mod validator;
mod verifier;

use crate::error::ReadError;
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub use script::{
    claim_key, lock_key, lock_value, script_audit_info, ClaimSignature, HashEncoding, HashFunction, HashInfo, Script,
    ScriptInfo,
};
pub use validator::{metadata_claim_key_check, metadata_lock_key_check, validate_transfer, verify_owner};
pub use verifier::{ScriptVerifier, ScriptVerifierDeserializer};

/// The transition a transfer out of an HTLC script is making.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OperationType {
    #[default]
    None,
    Claim,
    Reclaim,
}

impl Display for OperationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::None => write!(f, "None"),
            OperationType::Claim => write!(f, "Claim"),
            OperationType::Reclaim => write!(f, "Reclaim"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HtlcError {
    #[error("Owner is not a typed identity. {0}")]
    NotTyped(#[from] ReadError),
    #[error("Owner is a typed identity of type '{0}', not an HTLC script")]
    NotAScript(String),
    #[error("Invalid HTLC script: {0}")]
    InvalidScript(String),
    #[error("Invalid HTLC script audit info: {0}")]
    InvalidScriptInfo(String),
    #[error("Invalid claim signature: {0}")]
    InvalidClaimSignature(String),
    #[error("Hash function {0} is not supported")]
    UnsupportedHashFunction(HashFunction),
    #[error("Hash encoding {0} is not supported")]
    UnsupportedHashEncoding(HashEncoding),
    #[error("Claim is not addressed to the script recipient")]
    NotRecipient,
    #[error("Reclaim is not addressed to the script sender")]
    NotSender,
    #[error("Preimage does not hash to the lock hash")]
    HashMismatch,
    #[error("Transfer metadata is missing the entry '{0}'")]
    MissingMetadata(String),
    #[error("Transfer metadata entry '{0}' has the wrong value")]
    MetadataMismatch(String),
    #[error("Invalid HTLC transfer: {0}")]
    InvalidTransfer(String),
    #[error("No signature for input {0}")]
    MissingSignature(usize),
    #[error("Script deadline {0} has already passed")]
    Expired(DateTime<Utc>),
}
