//! Jointly owned (escrow) identities.
//!
//! A multisig identity is a typed identity tagged [`MULTISIG_TYPE`] whose payload lists the co-owner identities. The
//! matching audit info is a list of per co-owner audit info blobs in the same order, and a multisig signature is a
//! list of per co-owner signatures, again in the same order.

mod verifier;

use crate::codec::{read_byte_list, write_byte_list, Readable, Writable};
use crate::crypto::SignatureError;
use crate::error::{ReadError, WriteError};
use crate::identity::typed::{TypedIdentity, MULTISIG_TYPE};
use crate::identity::Identity;
use std::io::{Read, Write};
use thiserror::Error;

pub use verifier::{MultiVerifier, MultisigVerifierDeserializer};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultisigError {
    #[error("A multisig identity needs at least one co-owner")]
    NoIdentities,
    #[error("Multisig audit info needs at least one entry")]
    NoAuditInfo,
    #[error("Expected a multisig payload, found identity type '{0}'")]
    NotMultisig(String),
    #[error("Could not decode multisig data. {0}")]
    Decode(#[from] ReadError),
    #[error("Could not encode multisig data. {0}")]
    Encode(#[from] WriteError),
    #[error("Expected {expected} signatures, got {received}")]
    SignatureCountMismatch { expected: usize, received: usize },
    #[error("Signature of co-owner {index} is invalid: {source}")]
    InvalidSignature {
        index: usize,
        #[source]
        source: SignatureError,
    },
    #[error("Could not build a verifier for co-owner {index}: {source}")]
    Verifier {
        index: usize,
        #[source]
        source: SignatureError,
    },
}

/// The ordered co-owners of a multisig identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiIdentity {
    pub identities: Vec<Identity>,
}

impl MultiIdentity {
    pub fn new(identities: Vec<Identity>) -> Result<Self, MultisigError> {
        if identities.is_empty() {
            return Err(MultisigError::NoIdentities);
        }
        Ok(Self { identities })
    }

    /// Decodes the (untagged) payload of a multisig identity.
    pub fn decode(payload: &[u8]) -> Result<Self, MultisigError> {
        let result = Self::from_bytes(payload)?;
        if result.identities.is_empty() {
            return Err(MultisigError::NoIdentities);
        }
        Ok(result)
    }
}

impl Writable for MultiIdentity {
    fn write<W: Write>(&self, writer: &mut W) -> Result<(), WriteError> {
        write_byte_list(writer, &self.identities, "identities")
    }
}

impl Readable for MultiIdentity {
    fn read<R: Read>(reader: &mut R) -> Result<Self, ReadError> {
        let identities = read_byte_list(reader, "identities")?.into_iter().map(Identity::from).collect();
        Ok(Self { identities })
    }
}

/// One signature per co-owner, in co-owner order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultiSignature {
    pub signatures: Vec<Vec<u8>>,
}

impl MultiSignature {
    pub fn new(signatures: Vec<Vec<u8>>) -> Self {
        Self { signatures }
    }
}

impl Writable for MultiSignature {
    fn write<W: Write>(&self, writer: &mut W) -> Result<(), WriteError> {
        write_byte_list(writer, &self.signatures, "signatures")
    }
}

impl Readable for MultiSignature {
    fn read<R: Read>(reader: &mut R) -> Result<Self, ReadError> {
        Ok(Self { signatures: read_byte_list(reader, "signatures")? })
    }
}

/// Per co-owner audit info, in co-owner order.
#[derive(Clone, Debug, PartialEq, Eq)]
struct MultiAuditInfo {
    audit_infos: Vec<Vec<u8>>,
}

impl Writable for MultiAuditInfo {
    fn write<W: Write>(&self, writer: &mut W) -> Result<(), WriteError> {
        write_byte_list(writer, &self.audit_infos, "audit_infos")
    }
}

impl Readable for MultiAuditInfo {
    fn read<R: Read>(reader: &mut R) -> Result<Self, ReadError> {
        Ok(Self { audit_infos: read_byte_list(reader, "audit_infos")? })
    }
}

/// Builds a multisig identity owned jointly by `identities`.
pub fn wrap(identities: &[Identity]) -> Result<Identity, MultisigError> {
    let multi = MultiIdentity::new(identities.to_vec())?;
    Ok(TypedIdentity::new(MULTISIG_TYPE, multi.serialize()?).to_identity()?)
}

/// Splits a multisig identity into its co-owners.
///
/// Returns `Ok(None)` for a typed identity of any other type. Bytes that are not a typed identity at all are an error.
pub fn unwrap(identity: &Identity) -> Result<Option<Vec<Identity>>, MultisigError> {
    let typed = TypedIdentity::unwrap(identity)?;
    if !typed.is_type(MULTISIG_TYPE) {
        return Ok(None);
    }
    let multi = MultiIdentity::decode(&typed.identity)?;
    Ok(Some(multi.identities))
}

/// Bundles per co-owner audit info for a multisig identity.
pub fn wrap_audit_info<B: AsRef<[u8]>>(audit_infos: &[B]) -> Result<Vec<u8>, MultisigError> {
    if audit_infos.is_empty() {
        return Err(MultisigError::NoAuditInfo);
    }
    let info = MultiAuditInfo { audit_infos: audit_infos.iter().map(|a| a.as_ref().to_vec()).collect() };
    Ok(TypedIdentity::new(MULTISIG_TYPE, info.serialize()?).serialize()?)
}

pub fn unwrap_audit_info(raw: &[u8]) -> Result<Vec<Vec<u8>>, MultisigError> {
    let typed = TypedIdentity::from_bytes(raw)?;
    if !typed.is_type(MULTISIG_TYPE) {
        return Err(MultisigError::NotMultisig(typed.identity_type));
    }
    let info = MultiAuditInfo::from_bytes(&typed.identity)?;
    if info.audit_infos.is_empty() {
        return Err(MultisigError::NoAuditInfo);
    }
    Ok(info.audit_infos)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::identity::typed::{wrap_with_type, HTLC_SCRIPT_TYPE};

    fn ids() -> Vec<Identity> {
        vec![Identity::new(b"alice".to_vec()), Identity::new(b"bob".to_vec())]
    }

    #[test]
    fn wrap_then_unwrap() {
        let escrow = wrap(&ids()).unwrap();
        assert_eq!(unwrap(&escrow).unwrap(), Some(ids()));
    }

    #[test]
    fn other_types_are_not_multisig() {
        let htlc = wrap_with_type(HTLC_SCRIPT_TYPE, b"{}".to_vec()).unwrap();
        assert_eq!(unwrap(&htlc).unwrap(), None);
        assert!(matches!(unwrap(&Identity::new(b"plain".to_vec())), Err(MultisigError::Decode(_))));
    }

    #[test]
    fn empty_lists_are_rejected() {
        assert_eq!(wrap(&[]), Err(MultisigError::NoIdentities));
        assert_eq!(wrap_audit_info::<Vec<u8>>(&[]), Err(MultisigError::NoAuditInfo));
        let empty = wrap_with_type(MULTISIG_TYPE, MultiIdentity { identities: vec![] }.serialize().unwrap()).unwrap();
        assert_eq!(unwrap(&empty), Err(MultisigError::NoIdentities));
    }

    #[test]
    fn audit_info_bundles() {
        let infos = vec![b"info-a".to_vec(), b"info-b".to_vec()];
        let raw = wrap_audit_info(&infos).unwrap();
        assert_eq!(unwrap_audit_info(&raw).unwrap(), infos);

        let wrong = TypedIdentity::new(HTLC_SCRIPT_TYPE, b"x".to_vec()).serialize().unwrap();
        assert_eq!(unwrap_audit_info(&wrong), Err(MultisigError::NotMultisig("htlc".into())));
        assert!(matches!(unwrap_audit_info(b"rubbish"), Err(MultisigError::Decode(_))));
    }

    #[test]
    fn multi_signature_encoding() {
        let sig = MultiSignature::new(vec![vec![1; 64], vec![2; 64]]);
        assert_eq!(MultiSignature::from_bytes(&sig.serialize().unwrap()).unwrap(), sig);
    }
}
