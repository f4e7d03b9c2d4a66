use crate::codec::Readable;
use crate::crypto::{SignatureError, Verifier, VerifierDeserializer};
use crate::identity::typed::{TypedIdentity, MULTISIG_TYPE};
use crate::identity::{Identity, MAX_IDENTITY_NESTING};
use crate::multisig::{unwrap, MultiIdentity, MultiSignature, MultisigError};
use log::*;

/// Verifies a [`MultiSignature`]: every co-owner must sign, in co-owner order.
pub struct MultiVerifier {
    verifiers: Vec<Box<dyn Verifier>>,
}

impl MultiVerifier {
    pub fn new(verifiers: Vec<Box<dyn Verifier>>) -> Self {
        Self { verifiers }
    }

    /// Builds a verifier for a multisig identity, resolving each co-owner with `deserializer`.
    pub fn from_identity(identity: &Identity, deserializer: &dyn VerifierDeserializer) -> Result<Self, MultisigError> {
        let typed = TypedIdentity::unwrap(identity)?;
        if !typed.is_type(MULTISIG_TYPE) {
            return Err(MultisigError::NotMultisig(typed.identity_type));
        }
        let verifiers = MultiIdentity::decode(&typed.identity)?
            .identities
            .iter()
            .enumerate()
            .map(|(index, id)| {
                deserializer.deserialize_verifier(id).map_err(|source| MultisigError::Verifier { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(verifiers))
    }

    pub fn len(&self) -> usize {
        self.verifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verifiers.is_empty()
    }

    /// All-or-nothing: a single bad signature fails the whole bundle.
    pub fn verify_all(&self, message: &[u8], raw_signature: &[u8]) -> Result<(), MultisigError> {
        let sig = MultiSignature::from_bytes(raw_signature)?;
        if sig.signatures.len() != self.verifiers.len() {
            return Err(MultisigError::SignatureCountMismatch {
                expected: self.verifiers.len(),
                received: sig.signatures.len(),
            });
        }
        for (index, (verifier, signature)) in self.verifiers.iter().zip(sig.signatures.iter()).enumerate() {
            verifier.verify(message, signature).map_err(|source| MultisigError::InvalidSignature { index, source })?;
        }
        Ok(())
    }
}

impl Verifier for MultiVerifier {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), SignatureError> {
        self.verify_all(message, signature).map_err(|e| {
            debug!("Multisig verification failed: {e}");
            SignatureError::Rejected(e.to_string())
        })
    }
}

/// Resolves multisig identities into [`MultiVerifier`]s and delegates everything else to `inner`.
pub struct MultisigVerifierDeserializer<D> {
    inner: D,
}

impl<D: VerifierDeserializer> MultisigVerifierDeserializer<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<D: VerifierDeserializer> VerifierDeserializer for MultisigVerifierDeserializer<D> {
    fn deserialize_verifier(&self, identity: &Identity) -> Result<Box<dyn Verifier>, SignatureError> {
        AtDepth { outer: self, depth: 0 }.deserialize_verifier(identity)
    }
}

/// A [`MultisigVerifierDeserializer`] that has already unwrapped `depth` multisig layers.
struct AtDepth<'a, D> {
    outer: &'a MultisigVerifierDeserializer<D>,
    depth: usize,
}

impl<D: VerifierDeserializer> VerifierDeserializer for AtDepth<'_, D> {
    fn deserialize_verifier(&self, identity: &Identity) -> Result<Box<dyn Verifier>, SignatureError> {
        match unwrap(identity) {
            Ok(Some(_)) if self.depth >= MAX_IDENTITY_NESTING => Err(SignatureError::InvalidIdentity(format!(
                "multisig identity is nested more than {MAX_IDENTITY_NESTING} levels deep"
            ))),
            Ok(Some(_)) => {
                // Co-owners may themselves be multisig identities
                let next = AtDepth { outer: self.outer, depth: self.depth + 1 };
                let verifier = MultiVerifier::from_identity(identity, &next)
                    .map_err(|e| SignatureError::InvalidIdentity(e.to_string()))?;
                Ok(Box::new(verifier))
            }
            Ok(None) | Err(_) => self.outer.inner.deserialize_verifier(identity),
        }
    }
}
