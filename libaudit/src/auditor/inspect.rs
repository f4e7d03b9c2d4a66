use crate::crypto::TokenDataOpening;
use crate::identity::Identity;
use crate::token::Token;
use curve25519_dalek::RistrettoPoint;

/// An identity as seen by the auditor, with the audit info disclosed for it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InspectableIdentity {
    pub identity: Identity,
    /// The identity stated by the request metadata, when it states one. It must equal `identity`.
    pub identity_from_meta: Option<Identity>,
    pub audit_info: Vec<u8>,
}

impl InspectableIdentity {
    pub fn new(identity: Identity, audit_info: Vec<u8>) -> Self {
        Self { identity, identity_from_meta: None, audit_info }
    }

    pub fn with_identity_from_meta(mut self, identity: Identity) -> Self {
        self.identity_from_meta = Some(identity);
        self
    }
}

/// A token ready for inspection.
///
/// Outputs carry the disclosed opening of their commitment. Inputs do not: they were opened when they were created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InspectableToken {
    pub identity: InspectableIdentity,
    pub commitment: RistrettoPoint,
    pub opening: Option<TokenDataOpening>,
}

impl InspectableToken {
    pub fn output(token: &Token, owner_audit_info: Vec<u8>, opening: TokenDataOpening) -> Self {
        Self {
            identity: InspectableIdentity::new(token.owner.clone(), owner_audit_info),
            commitment: token.data,
            opening: Some(opening),
        }
    }

    pub fn input(token: &Token, owner_audit_info: Vec<u8>) -> Self {
        Self {
            identity: InspectableIdentity::new(token.owner.clone(), owner_audit_info),
            commitment: token.data,
            opening: None,
        }
    }

    pub fn is_redeem(&self) -> bool {
        self.identity.identity.is_none()
    }
}
