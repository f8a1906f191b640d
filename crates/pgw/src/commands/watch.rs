//! `watch`: periodic refresh with live counters and notifications.

use tokio::sync::broadcast::error::RecvError;

use pgw_core::{Controller, ControllerConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::status::StatusView;
use super::util;

pub async fn run(config: ControllerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let controller = Controller::with_http(config, util::preferences())?;
    let mut notes = controller.notifications().subscribe();
    let mut snapshots = controller.store().subscribe();

    // A failed first load is already queued as a notification; the
    // timer keeps retrying.
    if let Err(e) = controller.start().await {
        tracing::warn!(error = %e, "initial load failed");
    }
    if !global.quiet {
        eprintln!(
            "Watching {} every {}s (Ctrl-C to stop)",
            controller.config().api_base,
            controller.config().refresh_interval_secs
        );
    }
    output::print_output(&StatusView::capture(&controller).summary(), global.quiet);
    snapshots.mark_unchanged();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                output::print_output(&StatusView::capture(&controller).summary(), global.quiet);
            }
            note = notes.recv() => match note {
                Ok(note) => output::print_notifications(&[note], color, global.quiet),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "notification receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    controller.shutdown().await;
    Ok(())
}
