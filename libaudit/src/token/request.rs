use crate::codec::{write_byte_list, write_bytes};
use crate::error::WriteError;
use crate::identity::Identity;
use serde::{Deserialize, Serialize};

const MESSAGE_DOMAIN: &[u8] = b"TokenRequest/v1";

/// Serialized actions and their signatures, as submitted for ordering.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    pub issues: Vec<Vec<u8>>,
    pub transfers: Vec<Vec<u8>>,
    #[serde(default)]
    pub signatures: Vec<Vec<u8>>,
    #[serde(default)]
    pub auditor_signatures: Vec<Vec<u8>>,
}

impl TokenRequest {
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty() && self.transfers.is_empty()
    }

    /// The canonical message signed by owners and endorsed by the auditor.
    ///
    /// Covers the serialized actions and the transaction anchor. Signatures are excluded so that adding them does not
    /// change what was signed.
    pub fn marshal_to_message_to_sign(&self, anchor: &str) -> Result<Vec<u8>, WriteError> {
        let mut message = MESSAGE_DOMAIN.to_vec();
        write_byte_list(&mut message, &self.issues, "issues")?;
        write_byte_list(&mut message, &self.transfers, "transfers")?;
        write_bytes(&mut message, anchor.as_bytes(), "anchor")?;
        Ok(message)
    }
}

/// An identity together with the audit info that ties it to an enrollment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditableIdentity {
    pub identity: Identity,
    #[serde(serialize_with = "crate::helpers::to_hex", deserialize_with = "crate::helpers::from_hex")]
    pub audit_info: Vec<u8>,
}

impl AuditableIdentity {
    pub fn new(identity: Identity, audit_info: Vec<u8>) -> Self {
        Self { identity, audit_info }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueOutputMetadata {
    /// The serialized opening of the output commitment.
    #[serde(serialize_with = "crate::helpers::to_hex", deserialize_with = "crate::helpers::from_hex")]
    pub output_metadata: Vec<u8>,
    pub receivers: Vec<AuditableIdentity>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueMetadata {
    pub issuer: AuditableIdentity,
    pub outputs: Vec<IssueOutputMetadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInputMetadata {
    pub senders: Vec<AuditableIdentity>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutputMetadata {
    #[serde(serialize_with = "crate::helpers::to_hex", deserialize_with = "crate::helpers::from_hex")]
    pub output_metadata: Vec<u8>,
    /// Audit info of the output owner.
    #[serde(serialize_with = "crate::helpers::to_hex", deserialize_with = "crate::helpers::from_hex")]
    pub output_audit_info: Vec<u8>,
    pub receivers: Vec<AuditableIdentity>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferMetadata {
    pub inputs: Vec<TransferInputMetadata>,
    pub outputs: Vec<TransferOutputMetadata>,
}

/// Audit disclosures for a [`TokenRequest`], one entry per action in the same order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequestMetadata {
    pub issues: Vec<IssueMetadata>,
    pub transfers: Vec<TransferMetadata>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn message_to_sign() {
        let req = TokenRequest { issues: vec![b"i".to_vec()], transfers: vec![b"t".to_vec()], ..Default::default() };
        let msg = req.marshal_to_message_to_sign("tx1").unwrap();
        assert!(msg.starts_with(MESSAGE_DOMAIN));
        assert_ne!(msg, req.marshal_to_message_to_sign("tx2").unwrap());

        let signed = TokenRequest { signatures: vec![vec![1; 64]], auditor_signatures: vec![vec![2; 64]], ..req.clone() };
        assert_eq!(signed.marshal_to_message_to_sign("tx1").unwrap(), msg);

        // Moving an action between lists changes the message
        let moved = TokenRequest { issues: vec![], transfers: vec![b"i".to_vec(), b"t".to_vec()], ..Default::default() };
        assert_ne!(moved.marshal_to_message_to_sign("tx1").unwrap(), msg);
        assert!(TokenRequest::default().is_empty());
    }

    #[test]
    fn oversized_request_is_not_signed() {
        let req = TokenRequest { transfers: vec![vec![]; crate::codec::MAX_LIST_LEN + 1], ..Default::default() };
        let err = req.marshal_to_message_to_sign("tx1").unwrap_err();
        assert_eq!(err.field(), "transfers");
    }
}
