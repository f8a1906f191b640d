// ── Command API ──
//
// Every operator action can be expressed as a `Command` and dispatched
// through `Controller::execute`, which routes each variant to the
// matching controller operation.

pub mod requests;

use crate::import::ImportReport;
use crate::model::{EntityId, Mapping, Proxy};
use crate::operation::{HealthCheckSummary, OperationOutcome, RefreshOutcome};
use crate::sort::{MappingSortKey, ProxySortKey};

pub use requests::{
    CreateClientRequest, CreateMappingInput, CreateMappingRequest, CreateProxyRequest,
};

/// All operator actions against the gateway.
#[derive(Debug, Clone)]
pub enum Command {
    Refresh,

    // ── Proxy operations ─────────────────────────────────────────────
    CreateProxy(CreateProxyRequest),
    ImportProxies { text: String },
    DeleteProxy { id: EntityId },
    CheckProxy { id: EntityId },
    HealthCheckAll,

    // ── Mapping operations ───────────────────────────────────────────
    CreateMapping(CreateMappingInput),
    DeleteMapping { id: EntityId },
    Reconcile,

    // ── View operations ──────────────────────────────────────────────
    SortProxies(ProxySortKey),
    SortMappings(MappingSortKey),
}

impl Command {
    /// Stable name used in logs.
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::CreateProxy(_) => "create-proxy",
            Self::ImportProxies { .. } => "import-proxies",
            Self::DeleteProxy { .. } => "delete-proxy",
            Self::CheckProxy { .. } => "check-proxy",
            Self::HealthCheckAll => "health-check-all",
            Self::CreateMapping(_) => "create-mapping",
            Self::DeleteMapping { .. } => "delete-mapping",
            Self::Reconcile => "reconcile",
            Self::SortProxies(_) => "sort-proxies",
            Self::SortMappings(_) => "sort-mappings",
        }
    }
}

/// Result of a command execution.
#[derive(Debug)]
pub enum CommandResult {
    Ok,
    /// The operator declined the confirmation.
    Cancelled,
    Refreshed(RefreshOutcome),
    Proxy(Box<Proxy>),
    Checked(Option<Box<Proxy>>),
    Imported(ImportReport),
    HealthChecked(HealthCheckSummary),
    Mapping(Box<Mapping>),
}

impl From<OperationOutcome> for CommandResult {
    fn from(outcome: OperationOutcome) -> Self {
        match outcome {
            OperationOutcome::Completed => Self::Ok,
            OperationOutcome::Cancelled => Self::Cancelled,
        }
    }
}
