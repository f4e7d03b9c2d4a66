//! Locking value into an HTLC script and claiming or reclaiming it, as seen by the auditor and by the HTLC
//! transfer rules.

use super::audit_tests::{new_auditor, params, random_bf, Party};
use crate::auditor::{AuditError, CheckContext};
use crate::crypto::{SchnorrSignature, SchnorrVerifierDeserializer, TokenDataOpening, VerifierDeserializer};
use crate::htlc::{
    claim_key, lock_key, lock_value, script_audit_info, validate_transfer, ClaimSignature, HashEncoding,
    HashFunction, HashInfo, HtlcError, Script, ScriptVerifierDeserializer,
};
use crate::identity::MatchError;
use crate::token::{
    JsonActionCodec, Token, TokenId, TokenRequest, TokenRequestMetadata, TransferAction, TransferInputMetadata,
    TransferMetadata, TransferOutputMetadata,
};
use chrono::{DateTime, TimeDelta, Utc};
use rand::rng;
use std::collections::BTreeMap;

const PREIMAGE: &[u8] = b"swap secret";

struct Swap {
    alice: Party,
    bob: Party,
    script: Script,
    script_info: Vec<u8>,
    opening: TokenDataOpening,
    locked: Token,
}

impl Swap {
    fn new(deadline: DateTime<Utc>) -> Self {
        let alice = Party::new("alice");
        let bob = Party::new("bob");
        let script = Script {
            sender: alice.identity.clone(),
            recipient: bob.identity.clone(),
            deadline,
            hash_info: HashInfo::lock(PREIMAGE, HashFunction::Sha256, HashEncoding::Hex).unwrap(),
        };
        let script_info = script_audit_info(alice.audit_info.clone(), bob.audit_info.clone()).unwrap();
        let opening = TokenDataOpening::new("USD", 50, random_bf());
        let locked = Token::new(script.to_identity().unwrap(), params().commit_opening(&opening));
        Self { alice, bob, script, script_info, opening, locked }
    }

    /// Moves the locked token to `owner` with the same commitment.
    fn spend(&self, owner: &Party, metadata: BTreeMap<String, Vec<u8>>) -> (TransferAction, TransferMetadata) {
        let output = Token::new(owner.identity.clone(), self.locked.data);
        let action = TransferAction { inputs: vec![TokenId::new("lock-tx", 0)], outputs: vec![output], metadata };
        let md = TransferMetadata {
            inputs: vec![TransferInputMetadata {
                senders: vec![crate::token::AuditableIdentity::new(self.locked.owner.clone(), self.script_info.clone())],
            }],
            outputs: vec![TransferOutputMetadata {
                output_metadata: self.opening.to_bytes().unwrap(),
                output_audit_info: owner.audit_info.clone(),
                receivers: vec![owner.auditable()],
            }],
        };
        (action, md)
    }

    fn claim_signature(&self, message: &[u8]) -> Vec<u8> {
        let signed = ClaimSignature::signed_message(message, PREIMAGE);
        let sig = SchnorrSignature::sign(&self.bob.secret, &signed, &mut rng()).to_bytes().to_vec();
        ClaimSignature { recipient_signature: sig, preimage: PREIMAGE.to_vec() }.to_bytes().unwrap()
    }
}

fn audit(action: &TransferAction, md: &TransferMetadata, input: &Token) -> Result<(), AuditError> {
    let (auditor, _) = new_auditor();
    let raw = JsonActionCodec.serialize_transfer(action).unwrap();
    let request = TokenRequest { transfers: vec![raw], ..Default::default() };
    let metadata = TokenRequestMetadata { issues: vec![], transfers: vec![md.clone()] };
    auditor.check(&CheckContext::new(), &request, &metadata, &[vec![input.clone()]], "htlc-tx")
}

#[test]
fn lock_into_script() {
    let _ = env_logger::try_init();
    let now = Utc::now();
    let swap = Swap::new(now + TimeDelta::hours(1));
    let input = Token::new(swap.alice.identity.clone(), swap.locked.data);
    let hash = &swap.script.hash_info.hash;
    let action = TransferAction {
        inputs: vec![TokenId::new("funding-tx", 0)],
        outputs: vec![swap.locked.clone()],
        metadata: BTreeMap::from([(lock_key(hash), lock_value(hash))]),
    };
    let md = TransferMetadata {
        inputs: vec![TransferInputMetadata { senders: vec![swap.alice.auditable()] }],
        outputs: vec![TransferOutputMetadata {
            output_metadata: swap.opening.to_bytes().unwrap(),
            output_audit_info: swap.script_info.clone(),
            receivers: vec![swap.bob.auditable()],
        }],
    };
    audit(&action, &md, &input).unwrap();
    assert_eq!(validate_transfer(&action, &[input.clone()], &[vec![]], now).unwrap(), vec![lock_key(hash)]);

    // Script audit info that does not name the recipient cannot be inspected
    let mut bad = md.clone();
    bad.outputs[0].output_audit_info = script_audit_info(swap.alice.audit_info.clone(), vec![]).unwrap();
    let err = audit(&action, &bad, &input).unwrap_err();
    assert!(matches!(err.root_cause(), AuditError::IdentityMismatch { source: MatchError::NoRecipient, .. }));

    let unannounced = TransferAction { metadata: BTreeMap::new(), ..action };
    assert_eq!(
        validate_transfer(&unannounced, &[input], &[vec![]], now),
        Err(HtlcError::MissingMetadata(lock_key(hash)))
    );
}

#[test]
fn claim_before_deadline() {
    let now = Utc::now();
    let swap = Swap::new(now + TimeDelta::hours(1));
    let image = swap.script.hash_info.image(PREIMAGE).unwrap();
    let (action, md) = swap.spend(&swap.bob, BTreeMap::from([(claim_key(&image), PREIMAGE.to_vec())]));
    audit(&action, &md, &swap.locked).unwrap();

    let signature = swap.claim_signature(b"claim-request");
    let keys = validate_transfer(&action, &[swap.locked.clone()], &[signature.clone()], now).unwrap();
    assert_eq!(keys, vec![claim_key(&image)]);

    let verifier = ScriptVerifierDeserializer::new(SchnorrVerifierDeserializer)
        .deserialize_verifier(&swap.locked.owner)
        .unwrap();
    assert!(verifier.verify(b"claim-request", &signature).is_ok());
    assert!(verifier.verify(b"other-request", &signature).is_err());

    // Alice cannot take the token back before the deadline
    let (action, _) = swap.spend(&swap.alice, BTreeMap::new());
    assert_eq!(
        validate_transfer(&action, &[swap.locked.clone()], &[signature], now),
        Err(HtlcError::NotRecipient)
    );
}

#[test]
fn claim_with_a_wrong_preimage() {
    let now = Utc::now();
    let swap = Swap::new(now + TimeDelta::hours(1));
    let guess = b"not the secret";
    let image = swap.script.hash_info.image(guess).unwrap();
    let (action, _) = swap.spend(&swap.bob, BTreeMap::from([(claim_key(&image), guess.to_vec())]));

    let signed = ClaimSignature::signed_message(b"claim-request", guess);
    let sig = SchnorrSignature::sign(&swap.bob.secret, &signed, &mut rng()).to_bytes().to_vec();
    let signature = ClaimSignature { recipient_signature: sig, preimage: guess.to_vec() }.to_bytes().unwrap();

    assert_eq!(
        validate_transfer(&action, &[swap.locked.clone()], &[signature.clone()], now),
        Err(HtlcError::HashMismatch)
    );
    let verifier = ScriptVerifierDeserializer::new(SchnorrVerifierDeserializer)
        .deserialize_verifier(&swap.locked.owner)
        .unwrap();
    assert!(verifier.verify(b"claim-request", &signature).is_err());
}

#[test]
fn reclaim_after_deadline() {
    let swap = Swap::new(Utc::now() + TimeDelta::hours(1));
    let (action, md) = swap.spend(&swap.alice, BTreeMap::new());
    audit(&action, &md, &swap.locked).unwrap();

    let sig = SchnorrSignature::sign(&swap.alice.secret, b"reclaim", &mut rng()).to_bytes().to_vec();
    let keys = validate_transfer(&action, &[swap.locked.clone()], &[sig], swap.script.deadline).unwrap();
    assert!(keys.is_empty());

    let (action, _) = swap.spend(&swap.bob, BTreeMap::new());
    let claim = swap.claim_signature(b"late claim");
    assert_eq!(
        validate_transfer(&action, &[swap.locked.clone()], &[claim], swap.script.deadline),
        Err(HtlcError::NotSender)
    );
}
