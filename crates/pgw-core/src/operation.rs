// ── Operation lifecycle types ──
//
// Every user-visible operation moves Idle → Submitting → Succeeded | Failed.
// Transitions are published on the controller's operation channel; "Idle"
// is simply the absence of an in-flight event.

use serde::Serialize;

/// Which operation an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    CreateProxy,
    ImportProxies,
    DeleteProxy,
    CheckProxy,
    HealthCheckAll,
    CreateMapping,
    DeleteMapping,
    Reconcile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OperationPhase {
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationEvent {
    pub operation: Operation,
    pub phase: OperationPhase,
}

/// Outcome of an operation guarded by a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationOutcome {
    Completed,
    /// The operator declined; nothing was sent.
    Cancelled,
}

/// Outcome of a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshOutcome {
    Refreshed,
    /// Another refresh was already in flight; this one did nothing.
    Skipped,
}

/// Aggregate result of checking every proxy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HealthCheckSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl HealthCheckSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}
