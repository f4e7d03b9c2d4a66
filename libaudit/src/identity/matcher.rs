use crate::htlc::script::{Script, ScriptInfo};
use crate::identity::typed::{TypedIdentity, HTLC_SCRIPT_TYPE, MULTISIG_TYPE};
use crate::identity::Identity;
use crate::multisig;
use log::*;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use thiserror::Error;

/// How many multisig or HTLC layers may wrap a plain identity.
pub const MAX_IDENTITY_NESTING: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("Audit info does not match the identity: {0}")]
    Mismatch(String),
    #[error("Malformed audit info: {0}")]
    InvalidAuditInfo(String),
    #[error("Malformed identity: {0}")]
    InvalidIdentity(String),
    #[error("Multisig identity has {identities} co-owners, but the audit info has {audit_infos} entries")]
    LengthMismatch { identities: usize, audit_infos: usize },
    #[error("HTLC audit info does not name a recipient")]
    NoRecipient,
    #[error("Co-owner {index} does not match: {source}")]
    CoOwner {
        index: usize,
        #[source]
        source: Box<MatchError>,
    },
    #[error("HTLC recipient does not match: {0}")]
    Recipient(#[source] Box<MatchError>),
    #[error("Identity is nested more than {0} levels deep")]
    TooDeep(usize),
}

/// Checks that an audit info blob genuinely describes an identity.
pub trait AuditInfoMatcher: Send + Sync {
    fn match_identity(&self, identity: &Identity, audit_info: &[u8]) -> Result<(), MatchError>;
}

/// The shape of an identity, decided by its type tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityKind {
    /// Anything that is not a typed multisig or HTLC identity.
    Plain,
    Multisig(Vec<Identity>),
    Htlc(Box<Script>),
}

impl IdentityKind {
    pub fn resolve(identity: &Identity) -> Result<Self, MatchError> {
        let Ok(typed) = TypedIdentity::unwrap(identity) else {
            return Ok(IdentityKind::Plain);
        };
        match typed.identity_type.as_str() {
            MULTISIG_TYPE => {
                let ids = multisig::MultiIdentity::decode(&typed.identity)
                    .map_err(|e| MatchError::InvalidIdentity(e.to_string()))?;
                Ok(IdentityKind::Multisig(ids.identities))
            }
            HTLC_SCRIPT_TYPE => {
                let script =
                    Script::from_bytes(&typed.identity).map_err(|e| MatchError::InvalidIdentity(e.to_string()))?;
                Ok(IdentityKind::Htlc(Box::new(script)))
            }
            _ => Ok(IdentityKind::Plain),
        }
    }
}

impl Display for IdentityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityKind::Plain => write!(f, "Plain"),
            IdentityKind::Multisig(ids) => write!(f, "Multisig({} co-owners)", ids.len()),
            IdentityKind::Htlc(_) => write!(f, "HTLC"),
        }
    }
}

/// Routes a match to the scheme the identity belongs to.
///
/// Multisig and HTLC identities are unwrapped and their components are matched recursively, so a multisig co-owner
/// can itself be any identity kind, up to [`MAX_IDENTITY_NESTING`] layers deep. Plain identities are handed to the
/// configured `plain` matcher.
#[derive(Clone)]
pub struct MatcherDispatch {
    plain: Arc<dyn AuditInfoMatcher>,
}

impl MatcherDispatch {
    pub fn new(plain: Arc<dyn AuditInfoMatcher>) -> Self {
        Self { plain }
    }

    /// Lists the plain identities that can ultimately spend a token owned by `identity`.
    pub fn recipients(&self, identity: &Identity) -> Result<Vec<Identity>, MatchError> {
        let mut result = Vec::new();
        self.collect_recipients(identity, 0, &mut result)?;
        Ok(result)
    }

    fn collect_recipients(&self, identity: &Identity, depth: usize, out: &mut Vec<Identity>) -> Result<(), MatchError> {
        match IdentityKind::resolve(identity)? {
            IdentityKind::Plain => out.push(identity.clone()),
            _ if depth >= MAX_IDENTITY_NESTING => return Err(MatchError::TooDeep(MAX_IDENTITY_NESTING)),
            IdentityKind::Multisig(ids) => {
                for id in &ids {
                    self.collect_recipients(id, depth + 1, out)?;
                }
            }
            IdentityKind::Htlc(script) => self.collect_recipients(&script.recipient, depth + 1, out)?,
        }
        Ok(())
    }

    /// `depth` counts the multisig and HTLC layers already unwrapped above `identity`.
    fn match_at(&self, identity: &Identity, audit_info: &[u8], depth: usize) -> Result<(), MatchError> {
        let kind = IdentityKind::resolve(identity)?;
        trace!("Matching audit info against {kind} identity at depth {depth}");
        match kind {
            IdentityKind::Plain => self.plain.match_identity(identity, audit_info),
            _ if depth >= MAX_IDENTITY_NESTING => Err(MatchError::TooDeep(MAX_IDENTITY_NESTING)),
            IdentityKind::Multisig(ids) => self.match_multisig(&ids, audit_info, depth),
            IdentityKind::Htlc(script) => self.match_script(&script, audit_info, depth),
        }
    }

    fn match_multisig(&self, identities: &[Identity], audit_info: &[u8], depth: usize) -> Result<(), MatchError> {
        let infos = multisig::unwrap_audit_info(audit_info).map_err(|e| MatchError::InvalidAuditInfo(e.to_string()))?;
        if identities.len() != infos.len() {
            return Err(MatchError::LengthMismatch { identities: identities.len(), audit_infos: infos.len() });
        }
        for (index, (id, info)) in identities.iter().zip(infos.iter()).enumerate() {
            self.match_at(id, info, depth + 1).map_err(|e| MatchError::CoOwner { index, source: Box::new(e) })?;
        }
        Ok(())
    }

    fn match_script(&self, script: &Script, audit_info: &[u8], depth: usize) -> Result<(), MatchError> {
        let info = ScriptInfo::from_bytes(audit_info).map_err(|e| MatchError::InvalidAuditInfo(e.to_string()))?;
        if info.recipient.is_empty() {
            return Err(MatchError::NoRecipient);
        }
        self.match_at(&script.recipient, &info.recipient, depth + 1).map_err(|e| MatchError::Recipient(Box::new(e)))
    }
}

impl AuditInfoMatcher for MatcherDispatch {
    fn match_identity(&self, identity: &Identity, audit_info: &[u8]) -> Result<(), MatchError> {
        self.match_at(identity, audit_info, 0)
    }
}
