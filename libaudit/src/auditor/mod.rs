//! The auditor de-obfuscates token requests.
//!
//! Given a token request and the metadata disclosed alongside it, [`Auditor::check`] recomputes every output
//! commitment from its disclosed opening and matches every issuer, owner and sender identity against its audit info.
//! [`Auditor::endorse`] then signs the request on the auditor's behalf.
//!
//! The auditor holds no mutable state, so one instance can check many requests concurrently.

mod context;
mod error;
mod inspect;

use crate::crypto::{PedersenParams, Signer, TokenDataOpening};
use crate::identity::AuditInfoMatcher;
use crate::token::{ActionDeserializer, IssueMetadata, Token, TokenRequest, TokenRequestMetadata, TransferMetadata};
use blake2::{Blake2b512, Digest};
use curve25519_dalek::RistrettoPoint;
use log::*;
use std::sync::Arc;

pub use context::CheckContext;
pub use error::{ActionKind, AuditError};
pub use inspect::{InspectableIdentity, InspectableToken};

/// Audit info extracted from the issue actions of a request: the outputs of each action, and each action's issuer.
pub type IssueAuditInfo = (Vec<Vec<InspectableToken>>, Vec<InspectableIdentity>);
/// Audit info extracted from the transfer actions of a request: the inputs and the outputs of each action.
pub type TransferAuditInfo = (Vec<Vec<InspectableToken>>, Vec<Vec<InspectableToken>>);

#[derive(Clone)]
pub struct Auditor {
    params: PedersenParams,
    matcher: Arc<dyn AuditInfoMatcher>,
    codec: Arc<dyn ActionDeserializer>,
    signer: Option<Arc<dyn Signer>>,
}

impl Auditor {
    pub fn new(params: PedersenParams, matcher: Arc<dyn AuditInfoMatcher>, codec: Arc<dyn ActionDeserializer>) -> Self {
        Self { params, matcher, codec, signer: None }
    }

    /// Builds an auditor from a loose list of generators, which must hold exactly three points.
    pub fn from_generators(
        generators: &[RistrettoPoint],
        matcher: Arc<dyn AuditInfoMatcher>,
        codec: Arc<dyn ActionDeserializer>,
    ) -> Result<Self, AuditError> {
        let params = PedersenParams::try_from(generators)?;
        Ok(Self::new(params, matcher, codec))
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn params(&self) -> &PedersenParams {
        &self.params
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    /// Audits a token request.
    ///
    /// `input_tokens` holds, for every transfer action, the cleartext tokens it spends. Every failure is returned
    /// wrapped with the kind and index of the offending action and with `tx_id`.
    pub fn check(
        &self,
        ctx: &CheckContext,
        request: &TokenRequest,
        metadata: &TokenRequestMetadata,
        input_tokens: &[Vec<Token>],
        tx_id: &str,
    ) -> Result<(), AuditError> {
        debug!("Get audit info for {} issues in tx [{tx_id}]", request.issues.len());
        let (issued, issuers) = self.get_audit_info_for_issues(ctx, &request.issues, &metadata.issues, tx_id)?;

        debug!("Check {} issuers in tx [{tx_id}]", issuers.len());
        for (k, issuer) in issuers.iter().enumerate() {
            ctx.ensure_active(tx_id)?;
            self.inspect_identity(issuer, k).map_err(|e| e.in_action(ActionKind::Issue, k, tx_id))?;
        }

        debug!("Check {} issue outputs in tx [{tx_id}]", issued.iter().map(Vec::len).sum::<usize>());
        for (k, outputs) in issued.iter().enumerate() {
            ctx.ensure_active(tx_id)?;
            self.inspect_outputs(outputs).map_err(|e| e.in_action(ActionKind::Issue, k, tx_id))?;
        }

        debug!("Get audit info for {} transfers in tx [{tx_id}]", request.transfers.len());
        let (inputs, transferred) =
            self.get_audit_info_for_transfers(ctx, &request.transfers, &metadata.transfers, input_tokens, tx_id)?;

        debug!("Check {} transfer outputs in tx [{tx_id}]", transferred.iter().map(Vec::len).sum::<usize>());
        for (k, outputs) in transferred.iter().enumerate() {
            ctx.ensure_active(tx_id)?;
            self.inspect_outputs(outputs).map_err(|e| e.in_action(ActionKind::Transfer, k, tx_id))?;
        }

        debug!("Check {} transfer inputs in tx [{tx_id}]", inputs.iter().map(Vec::len).sum::<usize>());
        for (k, spent) in inputs.iter().enumerate() {
            ctx.ensure_active(tx_id)?;
            self.inspect_inputs(spent).map_err(|e| e.in_action(ActionKind::Transfer, k, tx_id))?;
        }

        info!("Token request [{tx_id}] passed audit");
        Ok(())
    }

    /// Signs the request on behalf of the auditor.
    ///
    /// This is the auditor's attestation that the request is sound. Callers must only endorse a request that has
    /// passed [`Auditor::check`]; [`Auditor::check_and_endorse`] does both in one step.
    pub fn endorse(&self, request: &TokenRequest, tx_id: &str) -> Result<Vec<u8>, AuditError> {
        if request.is_empty() {
            return Err(AuditError::EmptyRequest(tx_id.to_string()));
        }
        let signer = self.signer.as_ref().ok_or_else(|| AuditError::MissingSigner(tx_id.to_string()))?;
        let message = request
            .marshal_to_message_to_sign(tx_id)
            .map_err(|source| AuditError::Encode { tx_id: tx_id.to_string(), source })?;
        let digest = Blake2b512::digest(&message);
        debug!("Endorse [{}][{tx_id}]", hex::encode(&digest[..8]));
        signer.sign(&message).map_err(|source| AuditError::Signer { tx_id: tx_id.to_string(), source })
    }

    pub fn check_and_endorse(
        &self,
        ctx: &CheckContext,
        request: &TokenRequest,
        metadata: &TokenRequestMetadata,
        input_tokens: &[Vec<Token>],
        tx_id: &str,
    ) -> Result<Vec<u8>, AuditError> {
        if !self.has_signer() {
            return Err(AuditError::MissingSigner(tx_id.to_string()));
        }
        self.check(ctx, request, metadata, input_tokens, tx_id)?;
        self.endorse(request, tx_id)
    }

    pub fn inspect_outputs(&self, outputs: &[InspectableToken]) -> Result<(), AuditError> {
        for (i, output) in outputs.iter().enumerate() {
            self.inspect_output(output, i).map_err(|e| e.in_output(i))?;
        }
        Ok(())
    }

    /// Checks the commitment of an output against its opening, then its owner unless the output is redeemed.
    pub fn inspect_output(&self, output: &InspectableToken, index: usize) -> Result<(), AuditError> {
        let opening = output.opening.as_ref().ok_or(AuditError::MissingOpening { index })?;
        if self.params.commit_opening(opening) != output.commitment {
            return Err(AuditError::CommitmentMismatch { index });
        }
        if !output.is_redeem() {
            self.inspect_identity(&output.identity, index)?;
        }
        Ok(())
    }

    /// Checks the owners of spent tokens. Their commitments were checked when they were created.
    pub fn inspect_inputs(&self, inputs: &[InspectableToken]) -> Result<(), AuditError> {
        for (i, input) in inputs.iter().enumerate() {
            if input.is_redeem() {
                continue;
            }
            self.inspect_identity(&input.identity, i).map_err(|e| e.in_input(i))?;
        }
        Ok(())
    }

    pub fn inspect_identity(&self, identity: &InspectableIdentity, index: usize) -> Result<(), AuditError> {
        if identity.identity.is_none() {
            return Err(AuditError::NoneIdentity { index });
        }
        if identity.audit_info.is_empty() {
            return Err(AuditError::EmptyAuditInfo { index });
        }
        if let Some(from_meta) = &identity.identity_from_meta {
            if !from_meta.is_none() && *from_meta != identity.identity {
                return Err(AuditError::IdentityFromMetaMismatch { index });
            }
        }
        self.matcher
            .match_identity(&identity.identity, &identity.audit_info)
            .map_err(|source| AuditError::IdentityMismatch { index, source })
    }

    pub fn get_audit_info_for_issues(
        &self,
        ctx: &CheckContext,
        issues: &[Vec<u8>],
        metadata: &[IssueMetadata],
        tx_id: &str,
    ) -> Result<IssueAuditInfo, AuditError> {
        if issues.len() != metadata.len() {
            return Err(AuditError::ActionCountMismatch {
                kind: ActionKind::Issue,
                tx_id: tx_id.to_string(),
                actions: issues.len(),
                metadata: metadata.len(),
            });
        }
        let mut outputs = Vec::with_capacity(issues.len());
        let mut issuers = Vec::with_capacity(issues.len());
        for (k, (raw, md)) in issues.iter().zip(metadata).enumerate() {
            ctx.ensure_active(tx_id)?;
            let (tokens, issuer) = self.issue_audit_info(raw, md).map_err(|e| e.in_action(ActionKind::Issue, k, tx_id))?;
            outputs.push(tokens);
            issuers.push(issuer);
        }
        Ok((outputs, issuers))
    }

    fn issue_audit_info(
        &self,
        raw: &[u8],
        md: &IssueMetadata,
    ) -> Result<(Vec<InspectableToken>, InspectableIdentity), AuditError> {
        let action = self.codec.deserialize_issue(raw)?;
        if action.outputs.len() != md.outputs.len() {
            return Err(AuditError::OutputCountMismatch { outputs: action.outputs.len(), metadata: md.outputs.len() });
        }
        let mut tokens = Vec::with_capacity(action.outputs.len());
        for (i, (output, output_md)) in action.outputs.iter().zip(&md.outputs).enumerate() {
            if output.is_redeem() {
                return Err(AuditError::IssueRedeem { index: i });
            }
            let receiver = output_md.receivers.first().ok_or(AuditError::NoReceivers { index: i })?;
            let opening = decode_opening(&output_md.output_metadata, i)?;
            tokens.push(InspectableToken::output(output, receiver.audit_info.clone(), opening));
        }
        let issuer = InspectableIdentity::new(action.issuer, md.issuer.audit_info.clone())
            .with_identity_from_meta(md.issuer.identity.clone());
        Ok((tokens, issuer))
    }

    pub fn get_audit_info_for_transfers(
        &self,
        ctx: &CheckContext,
        transfers: &[Vec<u8>],
        metadata: &[TransferMetadata],
        input_tokens: &[Vec<Token>],
        tx_id: &str,
    ) -> Result<TransferAuditInfo, AuditError> {
        if transfers.len() != metadata.len() {
            return Err(AuditError::ActionCountMismatch {
                kind: ActionKind::Transfer,
                tx_id: tx_id.to_string(),
                actions: transfers.len(),
                metadata: metadata.len(),
            });
        }
        if input_tokens.len() != metadata.len() {
            return Err(AuditError::InputGroupCountMismatch {
                tx_id: tx_id.to_string(),
                inputs: input_tokens.len(),
                metadata: metadata.len(),
            });
        }
        let mut inputs = Vec::with_capacity(transfers.len());
        let mut outputs = Vec::with_capacity(transfers.len());
        for (k, ((raw, md), spent)) in transfers.iter().zip(metadata).zip(input_tokens).enumerate() {
            ctx.ensure_active(tx_id)?;
            let (ins, outs) =
                self.transfer_audit_info(raw, md, spent).map_err(|e| e.in_action(ActionKind::Transfer, k, tx_id))?;
            inputs.push(ins);
            outputs.push(outs);
        }
        Ok((inputs, outputs))
    }

    fn transfer_audit_info(
        &self,
        raw: &[u8],
        md: &TransferMetadata,
        spent: &[Token],
    ) -> Result<(Vec<InspectableToken>, Vec<InspectableToken>), AuditError> {
        if md.inputs.len() != spent.len() {
            return Err(AuditError::InputCountMismatch { senders: md.inputs.len(), inputs: spent.len() });
        }
        let mut inputs = Vec::with_capacity(spent.len());
        for (i, (token, input_md)) in spent.iter().zip(&md.inputs).enumerate() {
            let sender = input_md.senders.first().ok_or(AuditError::NoSenders { index: i })?;
            inputs.push(InspectableToken::input(token, sender.audit_info.clone()));
        }

        let action = self.codec.deserialize_transfer(raw)?;
        if action.outputs.len() != md.outputs.len() {
            return Err(AuditError::OutputCountMismatch { outputs: action.outputs.len(), metadata: md.outputs.len() });
        }
        let mut outputs = Vec::with_capacity(action.outputs.len());
        for (i, (output, output_md)) in action.outputs.iter().zip(&md.outputs).enumerate() {
            let opening = decode_opening(&output_md.output_metadata, i)?;
            outputs.push(InspectableToken::output(output, output_md.output_audit_info.clone(), opening));
        }
        Ok((inputs, outputs))
    }
}

fn decode_opening(raw: &[u8], index: usize) -> Result<TokenDataOpening, AuditError> {
    TokenDataOpening::from_bytes(raw).map_err(|e| AuditError::InvalidOpening { index, reason: e.to_string() })
}
