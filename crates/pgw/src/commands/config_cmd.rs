//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Input;

use pgw_config::{self as config, Config, DEFAULT_PROFILE, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask for a value, or take `default` without asking when stdin is not
/// a terminal.
fn ask(prompt: &str, default: String, interactive: bool) -> Result<String, CliError> {
    if !interactive {
        return Ok(default);
    }
    Input::new()
        .with_prompt(prompt)
        .default(default)
        .interact_text()
        .map_err(prompt_err)
}

fn render_toml(cfg: &Config) -> Result<String, CliError> {
    toml::to_string_pretty(cfg).map_err(|e| CliError::Serialization(e.to_string()))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { name, set_default } => {
            let interactive = std::io::stdin().is_terminal();
            let mut cfg = config::load_config_or_default();
            let path = config::config_path();
            if interactive && !global.quiet {
                eprintln!("pgw configuration");
                eprintln!("   Config path: {}\n", path.display());
            }

            let name = match name {
                Some(n) => n,
                None => ask("Profile name", DEFAULT_PROFILE.into(), interactive)?,
            };
            let existing = cfg.profiles.get(&name).cloned().unwrap_or_default();

            let api = global.api.clone().map_or_else(
                || ask("Gateway API URL", existing.api.clone(), interactive),
                Ok,
            )?;
            let agent = global.agent.clone().map_or_else(
                || ask("Agent URL", existing.agent.clone(), interactive),
                Ok,
            )?;

            let profile = Profile {
                api,
                agent,
                insecure: global.insecure.then_some(true).or(existing.insecure),
                timeout: global.timeout.or(existing.timeout),
                ..existing
            };
            // Reject bad URLs before anything is written.
            config::profile_to_controller_config(&profile)?;

            cfg.profiles.insert(name.clone(), profile);
            let default_missing = !cfg
                .default_profile
                .as_ref()
                .is_some_and(|d| cfg.profiles.contains_key(d));
            if set_default || default_missing {
                cfg.default_profile = Some(name.clone());
            }
            let written = config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Profile '{name}' saved to {}", written.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| render_toml(c).unwrap_or_default(),
                |c| c.active_profile_name(global.profile.as_deref()),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let active = cfg.active_profile_name(global.profile.as_deref());
            for (name, profile) in &cfg.profiles {
                let marker = if *name == active { "*" } else { " " };
                println!("{marker} {name}\t{}", profile.api);
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: cfg.profile_names(),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}
