use crate::htlc::script::{claim_key, lock_key, lock_value, ClaimSignature, Script};
use crate::htlc::{HtlcError, OperationType};
use crate::identity::typed::{TypedIdentity, HTLC_SCRIPT_TYPE};
use crate::identity::Identity;
use crate::token::{ActionMetadata, Token, TransferAction};
use chrono::{DateTime, Utc};
use log::*;

fn script_of(owner: &Identity) -> Result<Option<Script>, HtlcError> {
    let Ok(typed) = TypedIdentity::unwrap(owner) else {
        return Ok(None);
    };
    if !typed.is_type(HTLC_SCRIPT_TYPE) {
        return Ok(None);
    }
    Script::from_bytes(&typed.identity).map(Some)
}

/// Decides whether moving a token from the script `sender_raw_owner` to `output_raw_owner` at `now` is a claim or a
/// reclaim, and checks that the new owner is the party allowed to make that move.
///
/// Strictly before the deadline only the recipient may take the token. At or after the deadline only the sender may.
pub fn verify_owner(
    sender_raw_owner: &Identity,
    output_raw_owner: &Identity,
    now: DateTime<Utc>,
) -> Result<(Script, OperationType), HtlcError> {
    let typed = TypedIdentity::unwrap(sender_raw_owner)?;
    if !typed.is_type(HTLC_SCRIPT_TYPE) {
        return Err(HtlcError::NotAScript(typed.identity_type));
    }
    let script = Script::from_bytes(&typed.identity)?;
    if now < script.deadline {
        if script.recipient != *output_raw_owner {
            return Err(HtlcError::NotRecipient);
        }
        Ok((script, OperationType::Claim))
    } else {
        if script.sender != *output_raw_owner {
            return Err(HtlcError::NotSender);
        }
        Ok((script, OperationType::Reclaim))
    }
}

/// Checks that a claim carries a preimage that opens the script lock and published it under the claim key.
///
/// Returns the metadata key that was checked, or `None` for a reclaim, which publishes nothing.
pub fn metadata_claim_key_check<A: ActionMetadata + ?Sized>(
    action: &A,
    script: &Script,
    op: OperationType,
    signature: &[u8],
) -> Result<Option<String>, HtlcError> {
    if op == OperationType::Reclaim {
        return Ok(None);
    }
    let claim = ClaimSignature::from_bytes(signature)?;
    if claim.preimage.is_empty() {
        return Err(HtlcError::InvalidClaimSignature("the preimage is empty".into()));
    }
    if claim.recipient_signature.is_empty() {
        return Err(HtlcError::InvalidClaimSignature("the recipient signature is empty".into()));
    }
    let image = script.hash_info.image(&claim.preimage)?;
    if image != script.hash_info.hash {
        return Err(HtlcError::HashMismatch);
    }
    let key = claim_key(&image);
    let value = action.metadata().get(&key).ok_or_else(|| HtlcError::MissingMetadata(key.clone()))?;
    if *value != claim.preimage {
        return Err(HtlcError::MetadataMismatch(key));
    }
    Ok(Some(key))
}

/// Checks that locking a token into `script` announced the lock hash under the lock key.
pub fn metadata_lock_key_check<A: ActionMetadata + ?Sized>(action: &A, script: &Script) -> Result<String, HtlcError> {
    let key = lock_key(&script.hash_info.hash);
    let value = action.metadata().get(&key).ok_or_else(|| HtlcError::MissingMetadata(key.clone()))?;
    if *value != lock_value(&script.hash_info.hash) {
        return Err(HtlcError::MetadataMismatch(key));
    }
    Ok(key)
}

/// Validates the HTLC rules of a transfer and returns the metadata keys the rules consumed.
///
/// Spending a script-owned input must be a plain ownership change (one input, one output, same commitment) made by
/// the right party, and a claim must publish a preimage that opens the lock. Locking value into a script requires a well-formed,
/// unexpired script and an announcement of its lock hash. `signatures` holds one signature per input.
pub fn validate_transfer(
    action: &TransferAction,
    input_tokens: &[Token],
    signatures: &[Vec<u8>],
    now: DateTime<Utc>,
) -> Result<Vec<String>, HtlcError> {
    let mut keys = Vec::new();
    for (index, input) in input_tokens.iter().enumerate() {
        if script_of(&input.owner)?.is_none() {
            continue;
        }
        if input_tokens.len() != 1 || action.outputs.len() != 1 {
            return Err(HtlcError::InvalidTransfer("an HTLC script only transfers the ownership of a token".into()));
        }
        let output = &action.outputs[0];
        if input.data != output.data {
            return Err(HtlcError::InvalidTransfer("the output commitment differs from the input".into()));
        }
        let (script, op) = verify_owner(&input.owner, &output.owner, now)?;
        debug!("HTLC input {index} is a {op}");
        let signature = signatures.get(index).ok_or(HtlcError::MissingSignature(index))?;
        if let Some(key) = metadata_claim_key_check(action, &script, op, signature)? {
            keys.push(key);
        }
    }
    for output in &action.outputs {
        let Some(script) = script_of(&output.owner)? else {
            continue;
        };
        if script.deadline <= now {
            return Err(HtlcError::Expired(script.deadline));
        }
        script.validate(now)?;
        keys.push(metadata_lock_key_check(action, &script)?);
    }
    Ok(keys)
}
