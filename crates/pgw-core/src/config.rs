// ── Runtime connection configuration ──
//
// These types describe *where* the gateway lives and how the console
// paces its follow-up work. They never touch disk: the CLI builds a
// `ControllerConfig` and hands it in.

use std::time::Duration;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one gateway console session.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Gateway API base URL (e.g., `http://127.0.0.1:8080`).
    pub api_base: String,
    /// Reconciliation agent base URL; `reconcile` is joined onto it.
    pub agent_base: String,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// How often to perform a full refresh (seconds). 0 = never.
    pub refresh_interval_secs: u64,
    /// Delay before the health check that follows a single proxy creation.
    pub check_delay: Duration,
    /// Delay before the health check that follows each imported proxy.
    pub import_check_delay: Duration,
    /// Delay before the reconcile that follows a mapping change.
    pub reconcile_delay: Duration,
    /// How long a notification stays visible.
    pub notification_ttl: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8080".into(),
            agent_base: "http://127.0.0.1:9090/agent".into(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            refresh_interval_secs: 30,
            check_delay: Duration::from_millis(1000),
            import_check_delay: Duration::from_millis(500),
            reconcile_delay: Duration::from_millis(1000),
            notification_ttl: Duration::from_millis(3500),
        }
    }
}
