// pgw-core: State orchestration between pgw-api and consumers (CLI).

pub mod backend;
pub mod command;
pub mod config;
pub mod confirm;
pub mod controller;
pub mod convert;
pub mod error;
pub mod export;
pub mod import;
pub mod model;
pub mod notify;
pub mod operation;
pub mod prefs;
pub mod scheduler;
pub mod sort;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{Backend, HttpBackend};
pub use command::requests::*;
pub use command::{Command, CommandResult};
pub use config::{ControllerConfig, TlsVerification};
pub use confirm::{AlwaysConfirm, ConfirmGate, NeverConfirm};
pub use controller::Controller;
pub use error::{CoreError, ValidationError};
pub use import::ImportReport;
pub use notify::{Notification, NotificationQueue, Severity};
pub use operation::{
    HealthCheckSummary, Operation, OperationEvent, OperationOutcome, OperationPhase,
    RefreshOutcome,
};
pub use prefs::{FilePreferences, MemoryPreferences, PreferenceStore};
pub use scheduler::{ScheduledTask, Scheduler};
pub use sort::{MappingSortKey, ProxySortKey, TableSort};
pub use store::{DataStore, StoreSnapshot, StoreStats};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Client, EntityId, Mapping, MappingState, Proxy, ProxyStatus, ProxyType,
};
