use crate::crypto::{SignatureError, Verifier, VerifierDeserializer};
use crate::htlc::script::{ClaimSignature, HashInfo, Script};
use crate::htlc::HtlcError;
use crate::identity::typed::{TypedIdentity, HTLC_SCRIPT_TYPE};
use crate::identity::Identity;
use chrono::{DateTime, Utc};

/// Verifies signatures spending a script-owned token.
///
/// Before the deadline the signature must be a [`ClaimSignature`] whose preimage opens the lock and whose recipient
/// signature covers the message followed by the preimage. From the deadline onwards it must be a plain signature of
/// the sender.
pub struct ScriptVerifier {
    sender: Box<dyn Verifier>,
    recipient: Box<dyn Verifier>,
    deadline: DateTime<Utc>,
    hash_info: HashInfo,
}

impl ScriptVerifier {
    pub fn new(script: &Script, deserializer: &dyn VerifierDeserializer) -> Result<Self, SignatureError> {
        Ok(Self {
            sender: deserializer.deserialize_verifier(&script.sender)?,
            recipient: deserializer.deserialize_verifier(&script.recipient)?,
            deadline: script.deadline,
            hash_info: script.hash_info.clone(),
        })
    }

    pub fn verify_at(&self, message: &[u8], signature: &[u8], now: DateTime<Utc>) -> Result<(), SignatureError> {
        if now >= self.deadline {
            return self.sender.verify(message, signature);
        }
        let claim = ClaimSignature::from_bytes(signature).map_err(|e| SignatureError::Rejected(e.to_string()))?;
        let image = self.hash_info.image(&claim.preimage).map_err(|e| SignatureError::Rejected(e.to_string()))?;
        if image != self.hash_info.hash {
            return Err(SignatureError::Rejected(HtlcError::HashMismatch.to_string()));
        }
        let signed = ClaimSignature::signed_message(message, &claim.preimage);
        self.recipient.verify(&signed, &claim.recipient_signature)
    }
}

impl Verifier for ScriptVerifier {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), SignatureError> {
        self.verify_at(message, signature, Utc::now())
    }
}

/// Resolves HTLC script identities into [`ScriptVerifier`]s and delegates everything else to `inner`.
pub struct ScriptVerifierDeserializer<D> {
    inner: D,
}

impl<D: VerifierDeserializer> ScriptVerifierDeserializer<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<D: VerifierDeserializer> VerifierDeserializer for ScriptVerifierDeserializer<D> {
    fn deserialize_verifier(&self, identity: &Identity) -> Result<Box<dyn Verifier>, SignatureError> {
        match TypedIdentity::unwrap(identity) {
            Ok(typed) if typed.is_type(HTLC_SCRIPT_TYPE) => {
                let script =
                    Script::from_bytes(&typed.identity).map_err(|e| SignatureError::InvalidIdentity(e.to_string()))?;
                Ok(Box::new(ScriptVerifier::new(&script, &self.inner)?))
            }
            _ => self.inner.deserialize_verifier(identity),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::keys::PublicKey;
    use crate::crypto::{SchnorrSignature, SchnorrVerifierDeserializer};
    use crate::htlc::script::{HashEncoding, HashFunction};
    use chrono::TimeDelta;
    use rand::rng;

    #[test]
    fn claim_and_reclaim_signatures() {
        let (alice_secret, alice) = PublicKey::keypair(&mut rng());
        let (bob_secret, bob) = PublicKey::keypair(&mut rng());
        let script = Script {
            sender: Identity::from(&alice),
            recipient: Identity::from(&bob),
            deadline: Utc::now() + TimeDelta::hours(1),
            hash_info: HashInfo::lock(b"pre", HashFunction::Sha512, HashEncoding::Base64).unwrap(),
        };
        let deserializer = ScriptVerifierDeserializer::new(SchnorrVerifierDeserializer);
        let verifier = deserializer.deserialize_verifier(&script.to_identity().unwrap()).unwrap();
        let direct = ScriptVerifier::new(&script, &SchnorrVerifierDeserializer).unwrap();

        let msg = b"request";
        let signed = ClaimSignature::signed_message(msg, b"pre");
        let claim = ClaimSignature {
            recipient_signature: SchnorrSignature::sign(&bob_secret, &signed, &mut rng()).to_bytes().to_vec(),
            preimage: b"pre".to_vec(),
        };
        assert!(verifier.verify(msg, &claim.to_bytes().unwrap()).is_ok());

        let wrong = ClaimSignature { preimage: b"guess".to_vec(), ..claim.clone() };
        assert!(verifier.verify(msg, &wrong.to_bytes().unwrap()).is_err());

        let reclaim = SchnorrSignature::sign(&alice_secret, msg, &mut rng()).to_bytes();
        assert!(direct.verify_at(msg, &reclaim, Utc::now()).is_err());
        assert!(direct.verify_at(msg, &reclaim, script.deadline).is_ok());
        assert!(direct.verify_at(msg, &claim.to_bytes().unwrap(), script.deadline).is_err());
    }
}
