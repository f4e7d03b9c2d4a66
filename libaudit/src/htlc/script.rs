use crate::htlc::HtlcError;
use crate::identity::typed::{wrap_with_type, HTLC_SCRIPT_TYPE};
use crate::identity::Identity;
use base64::Engine;
use blake2::Blake2b512;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::fmt::{Display, Formatter};

const CLAIM_PREIMAGE_PREFIX: &str = "htlc.cpi.";
const LOCK_HASH_PREFIX: &str = "htlc.lh.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashFunction {
    #[default]
    Unspecified,
    Sha256,
    Sha512,
    Blake2b512,
}

impl HashFunction {
    fn digest(&self, preimage: &[u8]) -> Result<Vec<u8>, HtlcError> {
        match self {
            HashFunction::Unspecified => Err(HtlcError::UnsupportedHashFunction(*self)),
            HashFunction::Sha256 => Ok(Sha256::digest(preimage).to_vec()),
            HashFunction::Sha512 => Ok(Sha512::digest(preimage).to_vec()),
            HashFunction::Blake2b512 => Ok(Blake2b512::digest(preimage).to_vec()),
        }
    }
}

impl Display for HashFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HashFunction::Unspecified => write!(f, "Unspecified"),
            HashFunction::Sha256 => write!(f, "SHA-256"),
            HashFunction::Sha512 => write!(f, "SHA-512"),
            HashFunction::Blake2b512 => write!(f, "BLAKE2b-512"),
        }
    }
}

/// How a digest is rendered before it is compared with the lock hash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashEncoding {
    #[default]
    Unspecified,
    None,
    Hex,
    Base64,
}

impl HashEncoding {
    fn encode(&self, digest: Vec<u8>) -> Result<Vec<u8>, HtlcError> {
        match self {
            HashEncoding::Unspecified => Err(HtlcError::UnsupportedHashEncoding(*self)),
            HashEncoding::None => Ok(digest),
            HashEncoding::Hex => Ok(hex::encode(digest).into_bytes()),
            HashEncoding::Base64 => Ok(base64::engine::general_purpose::STANDARD.encode(digest).into_bytes()),
        }
    }
}

impl Display for HashEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HashEncoding::Unspecified => write!(f, "Unspecified"),
            HashEncoding::None => write!(f, "None"),
            HashEncoding::Hex => write!(f, "Hex"),
            HashEncoding::Base64 => write!(f, "Base64"),
        }
    }
}

/// The hash lock of a script: the lock `hash`, and how a preimage is turned into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashInfo {
    #[serde(serialize_with = "crate::helpers::to_hex", deserialize_with = "crate::helpers::from_hex")]
    pub hash: Vec<u8>,
    #[serde(default)]
    pub hash_func: HashFunction,
    #[serde(default)]
    pub hash_encoding: HashEncoding,
}

impl HashInfo {
    pub fn new(hash: Vec<u8>, hash_func: HashFunction, hash_encoding: HashEncoding) -> Self {
        Self { hash, hash_func, hash_encoding }
    }

    /// Builds the lock for `preimage`.
    pub fn lock(preimage: &[u8], hash_func: HashFunction, hash_encoding: HashEncoding) -> Result<Self, HtlcError> {
        let mut info = Self::new(Vec::new(), hash_func, hash_encoding);
        info.hash = info.image(preimage)?;
        Ok(info)
    }

    /// Hashes and encodes `preimage` the way this lock expects.
    pub fn image(&self, preimage: &[u8]) -> Result<Vec<u8>, HtlcError> {
        let digest = self.hash_func.digest(preimage)?;
        self.hash_encoding.encode(digest)
    }

    pub fn validate(&self) -> Result<(), HtlcError> {
        if self.hash.is_empty() {
            return Err(HtlcError::InvalidScript("the lock hash is empty".into()));
        }
        if self.hash_func == HashFunction::Unspecified {
            return Err(HtlcError::UnsupportedHashFunction(self.hash_func));
        }
        if self.hash_encoding == HashEncoding::Unspecified {
            return Err(HtlcError::UnsupportedHashEncoding(self.hash_encoding));
        }
        Ok(())
    }
}

/// A hashed time lock contract used as a token owner.
///
/// Before `deadline` the token can be claimed by `recipient` on presentation of a preimage of the lock hash. From
/// `deadline` onwards it can only be reclaimed by `sender`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub sender: Identity,
    pub recipient: Identity,
    pub deadline: DateTime<Utc>,
    pub hash_info: HashInfo,
}

impl Script {
    pub fn to_bytes(&self) -> Result<Vec<u8>, HtlcError> {
        serde_json::to_vec(self).map_err(|e| HtlcError::InvalidScript(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HtlcError> {
        serde_json::from_slice(bytes).map_err(|e| HtlcError::InvalidScript(e.to_string()))
    }

    /// Wraps the script in a typed identity so it can own tokens.
    pub fn to_identity(&self) -> Result<Identity, HtlcError> {
        wrap_with_type(HTLC_SCRIPT_TYPE, self.to_bytes()?).map_err(|e| HtlcError::InvalidScript(e.to_string()))
    }

    /// Checks that a newly locked script is well formed and still claimable at `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), HtlcError> {
        if self.sender.is_none() {
            return Err(HtlcError::InvalidScript("sender is not set".into()));
        }
        if self.recipient.is_none() {
            return Err(HtlcError::InvalidScript("recipient is not set".into()));
        }
        if self.deadline <= now {
            return Err(HtlcError::InvalidScript(format!("deadline {} has already passed", self.deadline)));
        }
        self.hash_info.validate()
    }
}

/// The signature a recipient presents to claim a script, together with the preimage unlocking it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSignature {
    #[serde(serialize_with = "crate::helpers::to_hex", deserialize_with = "crate::helpers::from_hex")]
    pub recipient_signature: Vec<u8>,
    #[serde(serialize_with = "crate::helpers::to_hex", deserialize_with = "crate::helpers::from_hex")]
    pub preimage: Vec<u8>,
}

impl ClaimSignature {
    pub fn to_bytes(&self) -> Result<Vec<u8>, HtlcError> {
        serde_json::to_vec(self).map_err(|e| HtlcError::InvalidClaimSignature(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HtlcError> {
        serde_json::from_slice(bytes).map_err(|e| HtlcError::InvalidClaimSignature(e.to_string()))
    }

    /// The message the recipient signs: the transaction message followed by the preimage.
    pub fn signed_message(message: &[u8], preimage: &[u8]) -> Vec<u8> {
        let mut result = Vec::with_capacity(message.len() + preimage.len());
        result.extend_from_slice(message);
        result.extend_from_slice(preimage);
        result
    }
}

/// Audit info of a script identity: the audit info of each party.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptInfo {
    #[serde(serialize_with = "crate::helpers::to_hex", deserialize_with = "crate::helpers::from_hex")]
    pub sender: Vec<u8>,
    #[serde(serialize_with = "crate::helpers::to_hex", deserialize_with = "crate::helpers::from_hex")]
    pub recipient: Vec<u8>,
}

impl ScriptInfo {
    pub fn to_bytes(&self) -> Result<Vec<u8>, HtlcError> {
        serde_json::to_vec(self).map_err(|e| HtlcError::InvalidScriptInfo(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HtlcError> {
        serde_json::from_slice(bytes).map_err(|e| HtlcError::InvalidScriptInfo(e.to_string()))
    }
}

/// Builds the audit info of a script identity from the audit info of its two parties.
pub fn script_audit_info(sender: Vec<u8>, recipient: Vec<u8>) -> Result<Vec<u8>, HtlcError> {
    ScriptInfo { sender, recipient }.to_bytes()
}

/// Metadata key under which a claim publishes the preimage of `image`.
pub fn claim_key(image: &[u8]) -> String {
    format!("{CLAIM_PREIMAGE_PREFIX}{}", hex::encode(image))
}

/// Metadata key announcing a new lock on `hash`.
pub fn lock_key(hash: &[u8]) -> String {
    format!("{LOCK_HASH_PREFIX}{}", hex::encode(hash))
}

pub fn lock_value(hash: &[u8]) -> Vec<u8> {
    hash.to_vec()
}
