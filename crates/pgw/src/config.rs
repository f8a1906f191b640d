//! Profile resolution with CLI flag overrides.
//!
//! Core never sees these types -- it receives a pre-built `ControllerConfig`.

use std::time::Duration;

use pgw_config::{Config, Profile, profile_to_controller_config};
use pgw_core::{ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Pick the profile named by `--profile` or the config default.
///
/// An explicitly requested profile must exist. The implicit default may
/// be absent, in which case built-in defaults are used.
pub fn select_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let name = cfg.active_profile_name(global.profile.as_deref());
    match cfg.profiles.get(&name) {
        Some(profile) => Ok((name, profile.clone())),
        None if global.profile.is_some() => Err(CliError::ProfileNotFound {
            available: cfg.profile_names(),
            name,
        }),
        None => Ok((name, Profile::default())),
    }
}

/// Translate the selected profile plus global flags into a `ControllerConfig`.
///
/// Flags win over the profile; the profile wins over built-in defaults.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<ControllerConfig, CliError> {
    let (name, mut profile) = select_profile(global, cfg)?;
    tracing::debug!(profile = %name, "resolving profile");

    if let Some(ref api) = global.api {
        profile.api.clone_from(api);
    }
    if let Some(ref agent) = global.agent {
        profile.agent.clone_from(agent);
    }
    profile.timeout = global
        .timeout
        .or(profile.timeout)
        .or(Some(cfg.defaults.timeout));

    let mut controller = profile_to_controller_config(&profile)?;
    if global.insecure {
        controller.tls = TlsVerification::DangerAcceptInvalid;
    }
    Ok(controller)
}

/// Short-lived commands never refresh in the background.
pub fn for_oneshot(mut config: ControllerConfig) -> ControllerConfig {
    config.refresh_interval_secs = 0;
    config
}

/// `watch` keeps the profile's interval unless `--interval` is given; an
/// interval of 0 falls back to the core default.
pub fn for_watch(mut config: ControllerConfig, interval: Option<u64>) -> ControllerConfig {
    if let Some(secs) = interval {
        config.refresh_interval_secs = secs;
    }
    if config.refresh_interval_secs == 0 {
        config.refresh_interval_secs = ControllerConfig::default().refresh_interval_secs;
    }
    config
}

pub fn describe_timeout(config: &ControllerConfig) -> String {
    humantime::format_duration(Duration::from_secs(config.timeout.as_secs())).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["pgw"];
        argv.extend_from_slice(args);
        argv.push("status");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_lab() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                api: "http://lab:8080".into(),
                timeout: Some(12),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn missing_default_profile_uses_builtins() {
        let resolved = resolve(&global(&[]), &Config::default()).unwrap();
        assert_eq!(resolved.api_base, "http://127.0.0.1:8080");
        assert_eq!(resolved.timeout, Duration::from_secs(30));
    }

    #[test]
    fn explicit_unknown_profile_fails() {
        let err = resolve(&global(&["--profile", "nope"]), &config_with_lab()).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "lab"));
    }

    #[test]
    fn flags_override_profile() {
        let g = global(&["-p", "lab", "--agent", "http://other/agent", "--timeout", "3", "-k"]);
        let resolved = resolve(&g, &config_with_lab()).unwrap();
        assert_eq!(resolved.api_base, "http://lab:8080");
        assert_eq!(resolved.agent_base, "http://other/agent");
        assert_eq!(resolved.timeout, Duration::from_secs(3));
        assert_eq!(resolved.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(describe_timeout(&resolved), "3s");
    }

    #[test]
    fn watch_interval_never_zero() {
        let base = ControllerConfig {
            refresh_interval_secs: 0,
            ..ControllerConfig::default()
        };
        assert_eq!(for_watch(base.clone(), None).refresh_interval_secs, 30);
        assert_eq!(for_watch(base.clone(), Some(5)).refresh_interval_secs, 5);
        assert_eq!(for_oneshot(for_watch(base, Some(5))).refresh_interval_secs, 0);
    }
}
