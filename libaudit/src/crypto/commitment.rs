//! Pedersen commitments to token data.
//!
//! Token data is committed as `TokenData = H(type)·G₀ + value·G₁ + bf·G₂`, where `G₀, G₁, G₂` are the three public
//! Pedersen generators of the token management context and `bf` is the blinding factor. Auditing a token means
//! recomputing this sum from a disclosed opening and comparing it against the commitment found on the ledger.

use crate::crypto::hashes::hash_token_type;
use blake2::Blake2b512;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::traits::Identity;
use curve25519_dalek::Scalar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The number of generators used by the token data commitment: token type, value and blinding factor.
pub const GENERATOR_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitmentError {
    #[error("Expected {GENERATOR_COUNT} Pedersen generators, got {0}")]
    InvalidGeneratorCount(usize),
}

/// The opening of a token data commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDataOpening {
    pub token_type: String,
    #[serde(serialize_with = "crate::helpers::scalar_to_hex", deserialize_with = "crate::helpers::scalar_from_hex")]
    pub value: Scalar,
    #[serde(serialize_with = "crate::helpers::scalar_to_hex", deserialize_with = "crate::helpers::scalar_from_hex")]
    pub blinding_factor: Scalar,
}

impl TokenDataOpening {
    pub fn new(token_type: impl Into<String>, value: u64, blinding_factor: Scalar) -> Self {
        Self { token_type: token_type.into(), value: Scalar::from(value), blinding_factor }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// The three Pedersen generators used to commit to token data. The length is fixed by construction, so holding a
/// `PedersenParams` proves the generator count has already been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PedersenParams {
    generators: [RistrettoPoint; GENERATOR_COUNT],
}

impl PedersenParams {
    pub fn new(generators: [RistrettoPoint; GENERATOR_COUNT]) -> Self {
        Self { generators }
    }

    /// Deterministically derives a set of generators with no known discrete log relation between them, by hashing
    /// `label` and the generator index onto the group.
    pub fn from_label(label: &[u8]) -> Self {
        let generators = [0u8, 1, 2].map(|i| {
            let mut input = label.to_vec();
            input.extend_from_slice(b"/generator/");
            input.push(i);
            RistrettoPoint::hash_from_bytes::<Blake2b512>(&input)
        });
        Self { generators }
    }

    pub fn generators(&self) -> &[RistrettoPoint; GENERATOR_COUNT] {
        &self.generators
    }

    /// Computes `H(type)·G₀ + value·G₁ + bf·G₂`.
    pub fn commit(&self, token_type: &str, value: &Scalar, blinding_factor: &Scalar) -> RistrettoPoint {
        let vector = [hash_token_type(token_type), *value, *blinding_factor];
        commit(&vector, &self.generators)
    }

    pub fn commit_opening(&self, opening: &TokenDataOpening) -> RistrettoPoint {
        self.commit(&opening.token_type, &opening.value, &opening.blinding_factor)
    }

    /// Returns true if `commitment` is a commitment to `(token_type, value, blinding_factor)`.
    pub fn verify(&self, commitment: &RistrettoPoint, token_type: &str, value: &Scalar, blinding_factor: &Scalar) -> bool {
        self.commit(token_type, value, blinding_factor) == *commitment
    }
}

impl TryFrom<&[RistrettoPoint]> for PedersenParams {
    type Error = CommitmentError;

    fn try_from(value: &[RistrettoPoint]) -> Result<Self, Self::Error> {
        let generators: [RistrettoPoint; GENERATOR_COUNT] =
            value.try_into().map_err(|_| CommitmentError::InvalidGeneratorCount(value.len()))?;
        Ok(Self { generators })
    }
}

impl TryFrom<Vec<RistrettoPoint>> for PedersenParams {
    type Error = CommitmentError;

    fn try_from(value: Vec<RistrettoPoint>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

/// Verifies a token data commitment against a loose list of generators.
///
/// The generator count is checked before anything is computed, so a misconfigured list is always reported as an
/// error and never as a mismatch.
pub fn verify(
    commitment: &RistrettoPoint,
    token_type: &str,
    value: &Scalar,
    blinding_factor: &Scalar,
    generators: &[RistrettoPoint],
) -> Result<bool, CommitmentError> {
    let params = PedersenParams::try_from(generators)?;
    Ok(params.verify(commitment, token_type, value, blinding_factor))
}

fn commit(vector: &[Scalar], generators: &[RistrettoPoint]) -> RistrettoPoint {
    vector.iter().zip(generators).fold(RistrettoPoint::identity(), |acc, (s, g)| acc + g * s)
}
