//! Runtime configuration.

use lw_02_signature_quorum::CollectorConfig;
use lw_03_chaincode_lifecycle::LifecycleConfig;
use lw_04_submission::SubmissionConfig;
use std::time::Duration;

/// Tunables for the end-to-end workflows.
///
/// Every boundary interaction in a workflow is bounded either by one of the
/// per-subsystem timeouts or by a workflow-level budget here; nothing waits
/// forever.
#[derive(Clone, Debug)]
pub struct GovernorConfig {
    pub collector: CollectorConfig,
    pub lifecycle: LifecycleConfig,
    pub submission: SubmissionConfig,

    /// Total budget for one signature-collection round.
    pub collect_deadline: Duration,

    /// How many times a workflow restarts from a fresh fetch after a
    /// concurrency conflict before giving up.
    pub max_conflict_restarts: u32,

    /// Readiness polling: attempts and pause between them.
    pub readiness_attempts: u32,
    pub readiness_backoff: Duration,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            collector: CollectorConfig::default(),
            lifecycle: LifecycleConfig::default(),
            submission: SubmissionConfig::default(),
            collect_deadline: Duration::from_secs(30),
            max_conflict_restarts: 3,
            readiness_attempts: 5,
            readiness_backoff: Duration::from_millis(500),
        }
    }
}
