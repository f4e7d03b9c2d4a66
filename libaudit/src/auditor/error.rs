use crate::crypto::{CommitmentError, SignatureError};
use crate::error::WriteError;
use crate::identity::MatchError;
use crate::token::CodecError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Issue,
    Transfer,
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Issue => write!(f, "issue"),
            ActionKind::Transfer => write!(f, "transfer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    #[error("Invalid auditor configuration. {0}")]
    Config(#[from] CommitmentError),
    #[error("Audit of tx [{0}] failed: no signer is configured")]
    MissingSigner(String),
    #[error("Audit of tx [{0}] failed: the token request has no actions")]
    EmptyRequest(String),
    #[error("Audit of tx [{0}] was cancelled")]
    Cancelled(String),
    #[error("Number of {kind} actions ({actions}) in tx [{tx_id}] does not match the number of provided metadata ({metadata})")]
    ActionCountMismatch { kind: ActionKind, tx_id: String, actions: usize, metadata: usize },
    #[error("Number of input groups ({inputs}) in tx [{tx_id}] does not match the number of provided metadata ({metadata})")]
    InputGroupCountMismatch { tx_id: String, inputs: usize, metadata: usize },
    #[error("Number of inputs ({inputs}) does not match the number of senders ({senders})")]
    InputCountMismatch { senders: usize, inputs: usize },
    #[error("Number of outputs ({outputs}) does not match the number of output metadata ({metadata})")]
    OutputCountMismatch { outputs: usize, metadata: usize },
    #[error("Issue cannot redeem tokens (output {index})")]
    IssueRedeem { index: usize },
    #[error("Issued output {index} must have at least one receiver")]
    NoReceivers { index: usize },
    #[error("Input {index} must have at least one sender")]
    NoSenders { index: usize },
    #[error("Output {index} has an invalid opening: {reason}")]
    InvalidOpening { index: usize, reason: String },
    #[error("Output {index} carries no opening")]
    MissingOpening { index: usize },
    #[error("Output {index} does not match the provided opening")]
    CommitmentMismatch { index: usize },
    #[error("Identity at index {index} is none, cannot inspect it")]
    NoneIdentity { index: usize },
    #[error("Audit info of the identity at index {index} is empty")]
    EmptyAuditInfo { index: usize },
    #[error("Identity at index {index} does not match the identity from metadata")]
    IdentityFromMetaMismatch { index: usize },
    #[error("Owner at index {index} does not match the provided audit info: {source}")]
    IdentityMismatch {
        index: usize,
        #[source]
        source: MatchError,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Failed inspecting output {index}: {source}")]
    Output {
        index: usize,
        #[source]
        source: Box<AuditError>,
    },
    #[error("Failed inspecting input {index}: {source}")]
    Input {
        index: usize,
        #[source]
        source: Box<AuditError>,
    },
    #[error("Audit of {kind} {index} in tx [{tx_id}] failed: {source}")]
    Action {
        kind: ActionKind,
        index: usize,
        tx_id: String,
        #[source]
        source: Box<AuditError>,
    },
    #[error("Could not encode token request [{tx_id}]: {source}")]
    Encode {
        tx_id: String,
        #[source]
        source: WriteError,
    },
    #[error("Could not sign token request [{tx_id}]: {source}")]
    Signer {
        tx_id: String,
        #[source]
        source: SignatureError,
    },
}

impl AuditError {
    pub fn in_action(self, kind: ActionKind, index: usize, tx_id: &str) -> Self {
        AuditError::Action { kind, index, tx_id: tx_id.to_string(), source: Box::new(self) }
    }

    pub fn in_output(self, index: usize) -> Self {
        AuditError::Output { index, source: Box::new(self) }
    }

    pub fn in_input(self, index: usize) -> Self {
        AuditError::Input { index, source: Box::new(self) }
    }

    /// Strips the action, output and input context off an error.
    pub fn root_cause(&self) -> &AuditError {
        match self {
            AuditError::Action { source, .. } | AuditError::Output { source, .. } | AuditError::Input { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}
