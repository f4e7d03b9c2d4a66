//! Audit info for plain, single-key identities.
//!
//! The audit info of a plain identity discloses the enrollment ID of the owner together with the public key that the
//! identity is built from. Matching succeeds when the identity is exactly that key.

use crate::crypto::keys::PublicKey;
use crate::identity::matcher::{AuditInfoMatcher, MatchError};
use crate::identity::Identity;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAuditInfo {
    pub enrollment_id: String,
    pub public_key: PublicKey,
}

impl KeyAuditInfo {
    pub fn new(enrollment_id: impl Into<String>, public_key: PublicKey) -> Self {
        Self { enrollment_id: enrollment_id.into(), public_key }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, MatchError> {
        serde_json::to_vec(self).map_err(|e| MatchError::InvalidAuditInfo(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MatchError> {
        serde_json::from_slice(bytes).map_err(|e| MatchError::InvalidAuditInfo(e.to_string()))
    }

    pub fn identity(&self) -> Identity {
        Identity::from(&self.public_key)
    }
}

/// Matches plain identities against [`KeyAuditInfo`].
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyAuditInfoMatcher;

impl AuditInfoMatcher for KeyAuditInfoMatcher {
    fn match_identity(&self, identity: &Identity, audit_info: &[u8]) -> Result<(), MatchError> {
        let info = KeyAuditInfo::from_bytes(audit_info)?;
        if info.identity() != *identity {
            return Err(MatchError::Mismatch(format!(
                "identity {identity} does not belong to enrollment ID {}",
                info.enrollment_id
            )));
        }
        Ok(())
    }
}
