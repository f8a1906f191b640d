//! Shared helpers for command handlers.

use std::io::{IsTerminal, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast;

use pgw_core::{
    ConfirmGate, EntityId, FilePreferences, MemoryPreferences, Notification, PreferenceStore,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Confirmation ────────────────────────────────────────────────────

/// Confirmation gate backed by a terminal prompt, auto-approving on `--yes`.
pub struct PromptConfirm {
    yes: bool,
}

impl PromptConfirm {
    /// Refuses up front when a prompt would be needed but stdin is not a
    /// terminal.
    pub fn for_action(global: &GlobalOpts, action: &str) -> Result<Self, CliError> {
        if !global.yes && !std::io::stdin().is_terminal() {
            return Err(CliError::NonInteractiveRequiresYes {
                action: action.into(),
            });
        }
        Ok(Self { yes: global.yes })
    }
}

impl ConfirmGate for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.yes {
            return true;
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "confirmation prompt failed");
                false
            })
    }
}

// ── Preferences ─────────────────────────────────────────────────────

/// Table-order preferences in the platform data dir, or in memory when
/// no home directory can be determined.
pub fn preferences() -> Arc<dyn PreferenceStore> {
    match FilePreferences::default_location() {
        Some(prefs) => {
            tracing::debug!(path = %prefs.path().display(), "using preference file");
            Arc::new(prefs)
        }
        None => Arc::new(MemoryPreferences::new()),
    }
}

// ── Input ───────────────────────────────────────────────────────────

/// Read a file, or stdin when the path is absent or `-`.
pub fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(p) if p != Path::new("-") => Ok(std::fs::read_to_string(p)?),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

pub fn entity_id(raw: &str, field: &str) -> Result<EntityId, CliError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(EntityId::from(trimmed))
}

/// Write to `path`, or stdout when absent.
pub fn write_output(path: Option<&Path>, contents: &str, quiet: bool) -> Result<(), CliError> {
    match path {
        Some(p) => {
            std::fs::write(p, contents)?;
            if !quiet {
                eprintln!("Wrote {}", p.display());
            }
            Ok(())
        }
        None => {
            print!("{contents}");
            Ok(())
        }
    }
}

// ── Progress ────────────────────────────────────────────────────────

/// Spinner on stderr for long batch operations; hidden when quiet or
/// not attached to a terminal.
pub fn spinner(message: &str, global: &GlobalOpts) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.cyan} {msg}")
    {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

// ── Notifications ───────────────────────────────────────────────────

/// Everything broadcast since the last drain.
pub fn drain_notifications(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(note) => out.push(note),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "notification receiver lagged");
            }
            Err(_) => return out,
        }
    }
}
