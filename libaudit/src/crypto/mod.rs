pub mod commitment;
pub mod hashes;
pub mod keys;
pub mod schnorr;

use crate::identity::Identity;
use keys::PublicKey;
use thiserror::Error;

pub use commitment::{CommitmentError, PedersenParams, TokenDataOpening};
pub use schnorr::{SchnorrSignature, SchnorrSigner};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Signature has the wrong length. Expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("Malformed signature: {0}")]
    Malformed(&'static str),
    #[error("Signature verification failed")]
    VerificationFailed,
    #[error("Signature rejected: {0}")]
    Rejected(String),
    #[error("Could not deserialize a verifier from the identity: {0}")]
    InvalidIdentity(String),
    #[error("The signer could not produce a signature: {0}")]
    SignerUnavailable(String),
}

/// A key-holding collaborator that can sign messages on behalf of an identity.
pub trait Signer: Send + Sync {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignatureError>;
}

/// Verifies signatures for one identity.
pub trait Verifier: Send + Sync {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), SignatureError>;
}

/// Turns a raw identity into a [`Verifier`] for that identity.
pub trait VerifierDeserializer: Send + Sync {
    fn deserialize_verifier(&self, identity: &Identity) -> Result<Box<dyn Verifier>, SignatureError>;
}

/// Resolves plain identities whose raw bytes are a compressed Ristretto public key.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchnorrVerifierDeserializer;

impl VerifierDeserializer for SchnorrVerifierDeserializer {
    fn deserialize_verifier(&self, identity: &Identity) -> Result<Box<dyn Verifier>, SignatureError> {
        let key = PublicKey::from_slice(identity.as_bytes()).map_err(|e| SignatureError::InvalidIdentity(e.to_string()))?;
        Ok(Box::new(key))
    }
}
