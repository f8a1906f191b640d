//! Reconcile command handler.

use pgw_core::Controller;

use crate::error::CliError;

/// The outcome is reported through the session's notifications.
pub async fn handle(controller: &Controller) -> Result<(), CliError> {
    controller.reconcile().await?;
    Ok(())
}
