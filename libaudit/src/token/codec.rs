use crate::token::{IssueAction, TransferAction};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Could not deserialize issue action: {0}")]
    Issue(String),
    #[error("Could not deserialize transfer action: {0}")]
    Transfer(String),
    #[error("Could not serialize action: {0}")]
    Serialize(String),
}

/// Turns the serialized actions of a token request back into actions.
pub trait ActionDeserializer: Send + Sync {
    fn deserialize_issue(&self, raw: &[u8]) -> Result<IssueAction, CodecError>;
    fn deserialize_transfer(&self, raw: &[u8]) -> Result<TransferAction, CodecError>;
}

/// Actions encoded as JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonActionCodec;

impl JsonActionCodec {
    pub fn serialize_issue(&self, action: &IssueAction) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(action).map_err(|e| CodecError::Serialize(e.to_string()))
    }

    pub fn serialize_transfer(&self, action: &TransferAction) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(action).map_err(|e| CodecError::Serialize(e.to_string()))
    }
}

impl ActionDeserializer for JsonActionCodec {
    fn deserialize_issue(&self, raw: &[u8]) -> Result<IssueAction, CodecError> {
        serde_json::from_slice(raw).map_err(|e| CodecError::Issue(e.to_string()))
    }

    fn deserialize_transfer(&self, raw: &[u8]) -> Result<TransferAction, CodecError> {
        serde_json::from_slice(raw).map_err(|e| CodecError::Transfer(e.to_string()))
    }
}
