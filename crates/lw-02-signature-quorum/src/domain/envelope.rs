//! Mutation envelope: a config delta plus the signatures gathered for it.

use lw_01_channel_config::ConfigDelta;
use serde::{Deserialize, Serialize};
use shared_types::{ChannelId, MspId, OrgSignature};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Lifecycle of a mutation envelope.
///
/// The envelope is exclusively owned by the initiating operation until
/// `Submitted`; thereafter it is logically owned by the ordering service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnvelopeStatus {
    /// Created; no signatures yet.
    Pending,
    /// At least one signature recorded.
    Signed,
    /// Handed to the ordering service.
    Submitted,
    /// Accepted by the orderer; the mutation is permanent.
    Committed,
    /// Refused by the orderer.
    Rejected,
}

/// Transaction-kind tag inside the signed header.
const CONFIG_UPDATE_TX: u8 = 2;

/// The header organizations sign together with the delta.
#[derive(Debug, Clone, Serialize)]
struct SigningHeader<'a> {
    channel_id: &'a ChannelId,
    tx_type: u8,
}

/// A pending channel-config mutation and its signatures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationEnvelope {
    /// Correlation id for logs and submissions.
    pub envelope_id: Uuid,
    pub channel_id: ChannelId,
    pub delta: ConfigDelta,
    /// One signature per organization; later signatures replace earlier ones.
    pub signatures: BTreeMap<MspId, OrgSignature>,
    pub status: EnvelopeStatus,
}

impl MutationEnvelope {
    pub fn new(delta: ConfigDelta) -> Self {
        Self {
            envelope_id: Uuid::new_v4(),
            channel_id: delta.channel_id.clone(),
            delta,
            signatures: BTreeMap::new(),
            status: EnvelopeStatus::Pending,
        }
    }

    /// The exact bytes organizations sign: header + delta, deterministically
    /// serialized. Signatures are over these bytes and nothing else.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        let header = SigningHeader {
            channel_id: &self.channel_id,
            tx_type: CONFIG_UPDATE_TX,
        };
        let mut bytes = bincode::serialize(&header)?;
        bytes.extend(bincode::serialize(&self.delta)?);
        Ok(bytes)
    }

    /// Record a signature, replacing any previous one from the same
    /// organization (last-write-wins).
    pub fn record_signature(&mut self, signature: OrgSignature) {
        self.signatures.insert(signature.msp_id.clone(), signature);
        if self.status == EnvelopeStatus::Pending {
            self.status = EnvelopeStatus::Signed;
        }
    }

    /// Distinct organizations that have signed.
    pub fn signer_set(&self) -> BTreeSet<MspId> {
        self.signatures.keys().cloned().collect()
    }
}
