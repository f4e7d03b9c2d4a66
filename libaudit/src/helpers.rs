use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::Scalar;
use serde::{Deserialize, Deserializer, Serialize};

pub fn to_hex<S>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    hex::encode(bytes).serialize(s)
}

pub fn from_hex<'de, D>(de: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let hex_str = String::deserialize(de)?;
    hex::decode(hex_str).map_err(|e| serde::de::Error::custom(format!("Invalid hex string: {e}")))
}

/// Convert a Ristretto scalar to a (little-endian) hex string.
pub fn scalar_as_hex(s: &Scalar) -> String {
    hex::encode(s.to_bytes())
}

/// Parse a canonical little-endian hex scalar.
pub fn scalar_from_hex_str(hex_str: &str) -> Option<Scalar> {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(hex_str, &mut bytes).ok()?;
    Scalar::from_canonical_bytes(bytes).into_option()
}

/// Serialize a scalar as a hex string.
pub fn scalar_to_hex<S>(scalar: &Scalar, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    scalar_as_hex(scalar).serialize(s)
}

/// Deserialize a scalar from a hex string. Non-canonical encodings are rejected.
pub fn scalar_from_hex<'de, D>(de: D) -> Result<Scalar, D::Error>
where
    D: Deserializer<'de>,
{
    let hex_str = String::deserialize(de)?;
    scalar_from_hex_str(&hex_str).ok_or_else(|| serde::de::Error::custom("Invalid scalar value"))
}

/// Convert a Ristretto point to the hex string of its compressed form.
pub fn point_as_hex(p: &RistrettoPoint) -> String {
    hex::encode(p.compress().as_bytes())
}

pub fn point_from_hex_str(hex_str: &str) -> Option<RistrettoPoint> {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(hex_str, &mut bytes).ok()?;
    CompressedRistretto(bytes).decompress()
}

/// Serialize a Ristretto point as the hex string of its compressed form.
pub fn point_to_hex<S>(point: &RistrettoPoint, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    point_as_hex(point).serialize(s)
}

pub fn point_from_hex<'de, D>(de: D) -> Result<RistrettoPoint, D::Error>
where
    D: Deserializer<'de>,
{
    let hex_str = String::deserialize(de)?;
    point_from_hex_str(&hex_str).ok_or_else(|| serde::de::Error::custom("Invalid Ristretto point"))
}
