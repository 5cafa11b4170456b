//! Quorum Signature Collector - core business logic.
//!
//! Solicits per-organization signatures over a signer boundary, records
//! outcomes into a `CollectionRound`, and re-evaluates the policy after
//! every response. No signer call may block past its per-call timeout, and
//! the whole round is bounded by a caller-supplied deadline.

use crate::domain::collector::{CollectionRound, CollectorState, SignerOutcome};
use crate::domain::envelope::MutationEnvelope;
use crate::errors::{QuorumError, QuorumResult};
use crate::ports::outbound::OrgSigner;
use shared_types::{MspId, OrgSignature, SignaturePolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Collector configuration.
#[derive(Clone, Debug)]
pub struct CollectorConfig {
    /// Per-signer call timeout.
    pub signer_timeout: Duration,
    /// Pause between passes over the still-missing signers.
    pub retry_backoff: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            signer_timeout: Duration::from_secs(5),
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Drives signature collection for mutation envelopes.
pub struct CollectorService<S: OrgSigner> {
    config: CollectorConfig,
    signer: Arc<S>,
}

impl<S: OrgSigner> CollectorService<S> {
    pub fn new(config: CollectorConfig, signer: Arc<S>) -> Self {
        Self { config, signer }
    }

    /// Solicit one organization's signature for the envelope.
    ///
    /// Eligibility is checked against the round's policy before the signer
    /// boundary is called: an organization with no standing cannot make the
    /// envelope more signed, so the call is refused outright.
    pub async fn request_signature(
        &self,
        envelope: &mut MutationEnvelope,
        round: &mut CollectionRound,
        msp_id: &MspId,
    ) -> QuorumResult<OrgSignature> {
        if !round.policy.covers(msp_id) {
            round.record(msp_id.clone(), SignerOutcome::Ineligible, envelope);
            return Err(QuorumError::PolicyIneligible {
                msp_id: msp_id.clone(),
            });
        }

        let payload = envelope
            .signing_bytes()
            .map_err(|e| QuorumError::Serialization(e.to_string()))?;

        let outcome = tokio::time::timeout(
            self.config.signer_timeout,
            self.signer.sign(msp_id, &payload),
        )
        .await;

        match outcome {
            Ok(Ok(signature)) => {
                envelope.record_signature(signature.clone());
                round.record(msp_id.clone(), SignerOutcome::Signed, envelope);
                debug!(
                    "[lw-02] {} signed envelope {} ({} signatures recorded)",
                    msp_id,
                    envelope.envelope_id,
                    envelope.signatures.len()
                );
                Ok(signature)
            }
            Ok(Err(err)) => {
                round.record(msp_id.clone(), SignerOutcome::Unavailable, envelope);
                warn!("[lw-02] signer for {msp_id} unreachable: {err}");
                Err(QuorumError::SignerUnavailable {
                    msp_id: msp_id.clone(),
                    reason: err.to_string(),
                })
            }
            Err(_) => {
                round.record(msp_id.clone(), SignerOutcome::Unavailable, envelope);
                warn!(
                    "[lw-02] signer for {msp_id} timed out after {:?}",
                    self.config.signer_timeout
                );
                Err(QuorumError::SignerUnavailable {
                    msp_id: msp_id.clone(),
                    reason: format!("timed out after {:?}", self.config.signer_timeout),
                })
            }
        }
    }

    /// Collect signatures from `signers` until the policy is satisfied or
    /// `deadline` passes.
    ///
    /// Unreachable signers are revisited on later passes with backoff;
    /// ineligible signers are skipped after the first refusal. Returns the
    /// satisfied round, or `TimedOut` with the outstanding count.
    pub async fn collect(
        &self,
        envelope: &mut MutationEnvelope,
        policy: SignaturePolicy,
        signers: &[MspId],
        deadline: Instant,
    ) -> QuorumResult<CollectionRound> {
        let required = policy.required();
        let mut round = CollectionRound::new(policy);
        info!(
            "[lw-02] collecting signatures for envelope {} ({} candidate signers, {} required)",
            envelope.envelope_id,
            signers.len(),
            required
        );

        loop {
            for msp_id in signers {
                if round.state == CollectorState::Satisfied {
                    break;
                }
                if Instant::now() >= deadline {
                    break;
                }
                match round.responded.get(msp_id) {
                    Some(SignerOutcome::Signed) | Some(SignerOutcome::Ineligible) => continue,
                    _ => {}
                }
                // Individual failures keep the round alive; only the
                // deadline ends it.
                let _ = self.request_signature(envelope, &mut round, msp_id).await;
            }

            if round.state == CollectorState::Satisfied {
                info!(
                    "[lw-02] envelope {} satisfied its policy ({} signatures)",
                    envelope.envelope_id,
                    envelope.signatures.len()
                );
                return Ok(round);
            }
            if Instant::now() >= deadline {
                round.time_out();
                let outstanding = round.outstanding(envelope);
                warn!(
                    "[lw-02] envelope {} timed out awaiting {} more signatures",
                    envelope.envelope_id, outstanding
                );
                return Err(QuorumError::TimedOut {
                    outstanding,
                    required,
                });
            }
            tokio::time::sleep(self.config.retry_backoff).await;
        }
    }
}
