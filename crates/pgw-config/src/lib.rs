//! Configuration profiles for the `pgw` console.
//!
//! A TOML file of named gateway profiles, merged by figment with built-in
//! defaults and `PGW_`-prefixed environment variables, then translated to
//! `pgw_core::ControllerConfig`. Core never reads this file itself.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pgw_core::{ControllerConfig, TlsVerification};

/// Overrides the config file location when set.
pub const CONFIG_PATH_ENV: &str = "PGW_CONFIG";

pub const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named gateway profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// `--profile` wins, then `default_profile`, then `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }

    /// Comma-separated profile names, for diagnostics.
    pub fn profile_names(&self) -> String {
        self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// One gateway: its API, its reconciliation agent and pacing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Gateway API base URL.
    #[serde(default = "default_api")]
    pub api: String,

    /// Reconciliation agent base URL.
    #[serde(default = "default_agent")]
    pub agent: String,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Seconds between background refreshes in `watch`. 0 disables them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_delay_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_check_delay_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconcile_delay_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_ttl_ms: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api: default_api(),
            agent: default_agent(),
            ca_cert: None,
            insecure: None,
            timeout: None,
            refresh_interval: None,
            check_delay_ms: None,
            import_check_delay_ms: None,
            reconcile_delay_ms: None,
            notification_ttl_ms: None,
        }
    }
}

fn default_api() -> String {
    ControllerConfig::default().api_base
}
fn default_agent() -> String {
    ControllerConfig::default().agent_base
}

// ── Config file path ────────────────────────────────────────────────

/// `$PGW_CONFIG`, else the platform config dir.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("", "", "pgw").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("pgw");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`; a missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PGW_").ignore(&["config", "profile"]).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to core ─────────────────────────────────────────────

fn check_url(field: &str, raw: &str) -> Result<String, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_owned()),
        other => Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("unsupported scheme '{other}' (expected http or https)"),
        }),
    }
}

/// Build a `ControllerConfig` from a profile. Unset fields keep the
/// core defaults.
pub fn profile_to_controller_config(profile: &Profile) -> Result<ControllerConfig, ConfigError> {
    let defaults = ControllerConfig::default();

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let millis = |value: Option<u64>, fallback: Duration| {
        value.map_or(fallback, Duration::from_millis)
    };

    Ok(ControllerConfig {
        api_base: check_url("api", &profile.api)?,
        agent_base: check_url("agent", &profile.agent)?,
        tls,
        timeout: profile.timeout.map_or(defaults.timeout, Duration::from_secs),
        refresh_interval_secs: profile
            .refresh_interval
            .unwrap_or(defaults.refresh_interval_secs),
        check_delay: millis(profile.check_delay_ms, defaults.check_delay),
        import_check_delay: millis(profile.import_check_delay_ms, defaults.import_check_delay),
        reconcile_delay: millis(profile.reconcile_delay_ms, defaults.reconcile_delay),
        notification_ttl: millis(profile.notification_ttl_ms, defaults.notification_ttl),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.output, "table");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn loads_profiles_with_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lab"

[profiles.lab]
api = "http://10.0.0.2:8080"
reconcile_delay_ms = 250

[profiles.edge]
agent = "https://edge.example/agent"
insecure = true
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.active_profile_name(None), "lab");
        assert_eq!(cfg.active_profile_name(Some("edge")), "edge");
        assert_eq!(cfg.profile_names(), "edge, lab");

        let lab = cfg.profile("lab").unwrap();
        assert_eq!(lab.api, "http://10.0.0.2:8080");
        assert_eq!(lab.agent, "http://127.0.0.1:9090/agent");
        assert_eq!(lab.reconcile_delay_ms, Some(250));

        let edge = profile_to_controller_config(cfg.profile("edge").unwrap()).unwrap();
        assert_eq!(edge.api_base, "http://127.0.0.1:8080");
        assert_eq!(edge.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.profile("nope"),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api: "https://gw.example".into(),
                timeout: Some(5),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("ca_cert"));
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn profile_fields_override_core_defaults() {
        let profile = Profile {
            api: "http://gw:8080/".into(),
            ca_cert: Some(PathBuf::from("/etc/pgw/ca.pem")),
            timeout: Some(7),
            refresh_interval: Some(0),
            check_delay_ms: Some(10),
            notification_ttl_ms: Some(1000),
            ..Profile::default()
        };
        let cfg = profile_to_controller_config(&profile).unwrap();

        assert_eq!(cfg.api_base, "http://gw:8080");
        assert_eq!(cfg.tls, TlsVerification::CustomCa("/etc/pgw/ca.pem".into()));
        assert_eq!(cfg.timeout, Duration::from_secs(7));
        assert_eq!(cfg.refresh_interval_secs, 0);
        assert_eq!(cfg.check_delay, Duration::from_millis(10));
        assert_eq!(cfg.import_check_delay, Duration::from_millis(500));
        assert_eq!(cfg.reconcile_delay, Duration::from_millis(1000));
        assert_eq!(cfg.notification_ttl, Duration::from_millis(1000));
    }

    #[test]
    fn rejects_bad_urls() {
        let bad_scheme = Profile {
            agent: "ftp://gw/agent".into(),
            ..Profile::default()
        };
        let err = profile_to_controller_config(&bad_scheme).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "agent"));

        let garbage = Profile {
            api: "not a url".into(),
            ..Profile::default()
        };
        assert!(profile_to_controller_config(&garbage).is_err());
    }
}
