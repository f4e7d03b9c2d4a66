pub mod matcher;
pub mod plain;
pub mod typed;

use crate::crypto::keys::PublicKey;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

pub use matcher::{AuditInfoMatcher, IdentityKind, MatchError, MatcherDispatch, MAX_IDENTITY_NESTING};
pub use plain::{KeyAuditInfo, KeyAuditInfoMatcher};
pub use typed::{wrap_with_type, TypedIdentity, HTLC_SCRIPT_TYPE, MULTISIG_TYPE};

/// The raw, serialized identity of a token owner or issuer.
///
/// The empty identity is the "none" identity. On an output it marks redeemed value, which has no owner to inspect.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(
    #[serde(serialize_with = "crate::helpers::to_hex", deserialize_with = "crate::helpers::from_hex")] Vec<u8>,
);

impl Identity {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn as_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl AsRef<[u8]> for Identity {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Identity {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Identity {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl From<&PublicKey> for Identity {
    fn from(value: &PublicKey) -> Self {
        Self(value.to_bytes().to_vec())
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            return write!(f, "<none>");
        }
        write!(f, "{}", self.as_hex())
    }
}

impl Debug for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity({self})")
    }
}
