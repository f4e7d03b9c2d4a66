//! The token data model seen by the auditor.
//!
//! A token is an owner identity together with a Pedersen commitment to its type, value and blinding factor. Actions
//! create tokens (issues) or move value between them (transfers). A [`TokenRequest`] bundles serialized actions with
//! their signatures and travels alongside a [`TokenRequestMetadata`] that discloses, for auditing, the openings and
//! audit info the actions hide.

mod codec;
mod request;

use crate::identity::Identity;
use curve25519_dalek::RistrettoPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub use codec::{ActionDeserializer, CodecError, JsonActionCodec};
pub use request::{
    AuditableIdentity, IssueMetadata, IssueOutputMetadata, TokenRequest, TokenRequestMetadata, TransferInputMetadata,
    TransferMetadata, TransferOutputMetadata,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub owner: Identity,
    #[serde(serialize_with = "crate::helpers::point_to_hex", deserialize_with = "crate::helpers::point_from_hex")]
    pub data: RistrettoPoint,
}

impl Token {
    pub fn new(owner: Identity, data: RistrettoPoint) -> Self {
        Self { owner, data }
    }

    /// A token with no owner has been redeemed: its value has left circulation.
    pub fn is_redeem(&self) -> bool {
        self.owner.is_none()
    }
}

/// The ledger location of a token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId {
    pub tx_id: String,
    pub index: u64,
}

impl TokenId {
    pub fn new(tx_id: impl Into<String>, index: u64) -> Self {
        Self { tx_id: tx_id.into(), index }
    }
}

impl Display for TokenId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.index)
    }
}

/// Free-form key/value metadata published with an action.
pub trait ActionMetadata {
    fn metadata(&self) -> &BTreeMap<String, Vec<u8>>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueAction {
    pub issuer: Identity,
    pub outputs: Vec<Token>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Vec<u8>>,
}

impl ActionMetadata for IssueAction {
    fn metadata(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.metadata
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAction {
    pub inputs: Vec<TokenId>,
    pub outputs: Vec<Token>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Vec<u8>>,
}

impl ActionMetadata for TransferAction {
    fn metadata(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.metadata
    }
}
