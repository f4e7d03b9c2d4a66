use curve25519_dalek::constants::RISTRETTO_BASEPOINT_TABLE;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::Scalar;
use hex::FromHexError;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Zeroizing<Scalar>);

impl SecretKey {
    pub fn as_scalar(&self) -> &Scalar {
        &self.0
    }

    pub fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let mut scalar_bytes = Zeroizing::new([0u8; 64]);
        rng.fill_bytes(&mut scalar_bytes[..]);
        let s = Zeroizing::new(Scalar::from_bytes_mod_order_wide(&scalar_bytes));
        Self(s)
    }

    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        if hex.len() != 64 {
            return Err(KeyError::InvalidStringLength);
        }
        let mut canonical = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(hex.as_bytes(), &mut canonical[..])?;
        match Scalar::from_canonical_bytes(*canonical).into_option() {
            None => Err(KeyError::NonCanonicalScalar),
            Some(scalar) => Ok(Self::from(scalar)),
        }
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret(self)
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey")
    }
}

impl From<Scalar> for SecretKey {
    fn from(value: Scalar) -> Self {
        Self(Zeroizing::new(value))
    }
}

impl Serialize for SecretKey {
    /// Serializes the secret key as a hex-encoded string.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for SecretKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_str = Zeroizing::new(String::deserialize(deserializer)?);
        SecretKey::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

/// A public key on the Ristretto group. Doubles as the raw identity of a plain signing owner: the identity bytes are
/// the 32-byte compressed point.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    compressed_point: CompressedRistretto,
    point: RistrettoPoint,
}

impl PublicKey {
    pub fn as_point(&self) -> &RistrettoPoint {
        &self.point
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.compressed_point.to_bytes()
    }

    pub fn from_secret(secret_key: &SecretKey) -> Self {
        let point = secret_key.as_scalar() * RISTRETTO_BASEPOINT_TABLE;
        point.into()
    }

    pub fn keypair<R: CryptoRng + RngCore>(rng: &mut R) -> (SecretKey, Self) {
        let secret_key = SecretKey::random(rng);
        let public_key = Self::from_secret(&secret_key);
        (secret_key, public_key)
    }

    /// Parses a 32-byte compressed point.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let compressed_point = CompressedRistretto::from_slice(bytes).map_err(|_| KeyError::InvalidLength(bytes.len()))?;
        Self::try_from(compressed_point)
    }

    /// Tries to deserialize a hex string into a `PublicKey`. The hex string must represent a valid compressed
    /// Ristretto point.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        if hex.len() != 64 {
            return Err(KeyError::InvalidStringLength);
        }
        let mut compressed = [0u8; 32];
        hex::decode_to_slice(hex.as_bytes(), &mut compressed)?;
        Self::try_from(CompressedRistretto(compressed))
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.compressed_point.to_bytes())
    }
}

impl From<RistrettoPoint> for PublicKey {
    fn from(value: RistrettoPoint) -> Self {
        let compressed_point = value.compress();
        Self { compressed_point, point: value }
    }
}

impl TryFrom<CompressedRistretto> for PublicKey {
    type Error = KeyError;
    fn try_from(value: CompressedRistretto) -> Result<Self, Self::Error> {
        let point = value.decompress().ok_or(KeyError::InvalidPoint)?;
        Ok(Self { compressed_point: value, point })
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        PublicKey::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KeyError {
    #[error("Invalid point on curve")]
    InvalidPoint,
    #[error("Could not deserialize from hex: {0}")]
    HexDeserializationError(#[from] FromHexError),
    #[error("Invalid string length")]
    InvalidStringLength,
    #[error("Expected 32 bytes, got {0}")]
    InvalidLength(usize),
    #[error("Not a valid secret key")]
    NonCanonicalScalar,
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rng;

    #[test]
    fn test_keypair() {
        let (secret, public) = PublicKey::keypair(&mut rng());
        let public2 = PublicKey::from_secret(&secret);
        assert_eq!(public, public2);
        assert_eq!(PublicKey::from_slice(&public.to_bytes()).unwrap(), public);
    }

    #[test]
    fn test_hex_roundtrip() {
        let (secret, public) = PublicKey::keypair(&mut rng());
        let secret2 = SecretKey::from_hex(&secret.as_hex()).unwrap();
        let public2 = PublicKey::from_hex(&public.as_hex()).unwrap();
        assert_eq!(secret, secret2);
        assert_eq!(public, public2);
    }

    #[test]
    fn test_from_hex_errors() {
        let secret = SecretKey::from_hex(&"ff".repeat(32));
        assert!(matches!(secret, Err(KeyError::NonCanonicalScalar)), "IsErr: {}", secret.is_err());

        let secret = SecretKey::from_hex("ce89029949049c902fdd5f2bf1493977dd061e782c44fd6");
        assert!(matches!(secret, Err(KeyError::InvalidStringLength)));

        // Not a valid Ristretto encoding (high bit set)
        let public = PublicKey::from_hex(&"ff".repeat(32));
        assert!(matches!(public, Err(KeyError::InvalidPoint)), "Should fail: {public:?}");

        let public = PublicKey::from_hex(&format!("{}x", "0".repeat(63)));
        assert!(matches!(
            public,
            Err(KeyError::HexDeserializationError(FromHexError::InvalidHexCharacter { c: 'x', index: 63 }))
        ));

        assert!(matches!(PublicKey::from_slice(b"short"), Err(KeyError::InvalidLength(5))));
    }
}
