use crate::crypto::hashes::{Blake512, HashToScalar};
use crate::crypto::keys::{PublicKey, SecretKey};
use crate::crypto::{SignatureError, Signer, Verifier};
use curve25519_dalek::constants::RISTRETTO_BASEPOINT_TABLE;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::Scalar;
use rand::{CryptoRng, RngCore};
use std::sync::Mutex;
use zeroize::Zeroize;

pub const SIGNATURE_LEN: usize = 64;

/// A Schnorr signature `(R, s)` over the Ristretto group, with `s·G = R + e·P`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_snake_case)]
pub struct SchnorrSignature {
    R: RistrettoPoint,
    s: Scalar,
}

impl SchnorrSignature {
    #[allow(non_snake_case)]
    fn challenge<B: AsRef<[u8]>>(R: &RistrettoPoint, pubkey: &RistrettoPoint, msg: B) -> Scalar {
        let msg = msg.as_ref();
        let mut bytes = Vec::with_capacity(26 + 1 + 32 + 1 + 32 + 3 + 8 + msg.len());
        bytes.extend_from_slice(b"SchnorrSignature-challenge");
        bytes.extend_from_slice(b"R");
        bytes.extend_from_slice(R.compress().as_bytes());
        bytes.extend_from_slice(b"P");
        bytes.extend_from_slice(pubkey.compress().as_bytes());
        bytes.extend_from_slice(b"MSG");
        bytes.extend_from_slice(&(msg.len() as u64).to_le_bytes());
        bytes.extend_from_slice(msg);
        Blake512.hash_to_scalar(bytes)
    }

    #[allow(non_snake_case)]
    pub fn sign<B: AsRef<[u8]>, R: RngCore + CryptoRng>(secret: &SecretKey, msg: B, rng: &mut R) -> Self {
        let mut nonce = *SecretKey::random(rng).as_scalar();
        while nonce == Scalar::ZERO {
            nonce = *SecretKey::random(rng).as_scalar();
        }
        let R = &nonce * RISTRETTO_BASEPOINT_TABLE;
        let pubkey = secret.as_scalar() * RISTRETTO_BASEPOINT_TABLE;
        let e = Self::challenge(&R, &pubkey, msg);
        let s = nonce + (e * secret.as_scalar());
        nonce.zeroize();
        Self { R, s }
    }

    #[allow(non_snake_case)]
    pub fn verify<B: AsRef<[u8]>>(&self, public_key: &PublicKey, msg: B) -> bool {
        let e = Self::challenge(&self.R, public_key.as_point(), msg);
        let sG = &self.s * RISTRETTO_BASEPOINT_TABLE;
        let rhs = self.R + (public_key.as_point() * e);
        sG == rhs
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut result = [0u8; SIGNATURE_LEN];
        result[..32].copy_from_slice(self.R.compress().as_bytes());
        result[32..].copy_from_slice(self.s.as_bytes());
        result
    }

    #[allow(non_snake_case)]
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(SignatureError::InvalidLength { expected: SIGNATURE_LEN, actual: bytes.len() });
        }
        let R = CompressedRistretto::from_slice(&bytes[..32])
            .ok()
            .and_then(|c| c.decompress())
            .ok_or(SignatureError::Malformed("R is not a valid point"))?;
        let mut s_bytes = [0u8; 32];
        s_bytes.copy_from_slice(&bytes[32..]);
        let s = Scalar::from_canonical_bytes(s_bytes)
            .into_option()
            .ok_or(SignatureError::Malformed("s is not a canonical scalar"))?;
        Ok(Self { R, s })
    }
}

impl Verifier for PublicKey {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), SignatureError> {
        let sig = SchnorrSignature::from_slice(signature)?;
        match sig.verify(self, message) {
            true => Ok(()),
            false => Err(SignatureError::VerificationFailed),
        }
    }
}

/// A [`Signer`] that holds a Schnorr secret key in memory.
pub struct SchnorrSigner<R> {
    secret: SecretKey,
    public: PublicKey,
    rng: Mutex<R>,
}

impl<R: RngCore + CryptoRng> SchnorrSigner<R> {
    pub fn new(secret: SecretKey, rng: R) -> Self {
        let public = secret.public_key();
        Self { secret, public, rng: Mutex::new(rng) }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }
}

impl<R: RngCore + CryptoRng + Send> Signer for SchnorrSigner<R> {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let mut rng = self.rng.lock().map_err(|_| SignatureError::SignerUnavailable("rng lock poisoned".into()))?;
        let sig = SchnorrSignature::sign(&self.secret, message, &mut *rng);
        Ok(sig.to_bytes().to_vec())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{rng, SeedableRng};

    #[test]
    fn sign_and_verify() {
        let (secret, public) = PublicKey::keypair(&mut rng());
        let sig = SchnorrSignature::sign(&secret, b"hello", &mut rng());
        assert!(sig.verify(&public, b"hello"));
        assert!(!sig.verify(&public, b"hellO"));
        let (_, other) = PublicKey::keypair(&mut rng());
        assert!(!sig.verify(&other, b"hello"));
    }

    #[test]
    fn encoding() {
        let (secret, public) = PublicKey::keypair(&mut rng());
        let sig = SchnorrSignature::sign(&secret, b"msg", &mut rng());
        let bytes = sig.to_bytes();
        assert_eq!(SchnorrSignature::from_slice(&bytes).unwrap(), sig);
        assert!(Verifier::verify(&public, b"msg", &bytes).is_ok());

        let mut corrupted = bytes;
        corrupted[40] ^= 0x01;
        assert!(Verifier::verify(&public, b"msg", &corrupted).is_err());
        assert!(matches!(
            SchnorrSignature::from_slice(&bytes[..63]),
            Err(SignatureError::InvalidLength { expected: 64, actual: 63 })
        ));
    }

    #[test]
    fn signer_produces_verifiable_signatures() {
        let secret = SecretKey::random(&mut rng());
        let signer = SchnorrSigner::new(secret, StdRng::from_os_rng());
        let sig = signer.sign(b"endorse me").unwrap();
        assert_eq!(sig.len(), SIGNATURE_LEN);
        assert!(signer.public_key().verify(b"endorse me", &sig).is_ok());
    }
}
