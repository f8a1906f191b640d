//! Command dispatch: bridges CLI args -> controller operations -> output.
//!
//! Every gateway-bound command runs in one session: load the store, run
//! the handler, wait for the follow-ups it scheduled, then print the
//! notifications collected along the way.

pub mod clients;
pub mod config_cmd;
pub mod mappings;
pub mod proxies;
pub mod reconcile;
pub mod status;
pub mod util;
pub mod watch;

use pgw_core::{Controller, ControllerConfig};

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Run a gateway-bound command to completion.
pub async fn dispatch(
    cmd: Command,
    controller_config: ControllerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Command::Watch(args) = cmd {
        let cfg = config::for_watch(controller_config, args.interval);
        return watch::run(cfg, global).await;
    }

    let controller =
        Controller::with_http(config::for_oneshot(controller_config), util::preferences())?;
    let mut notes = controller.notifications().subscribe();

    let result = async {
        controller.load().await?;
        route(cmd, &controller, global).await
    }
    .await;

    // Follow-ups (deferred checks and reconciles) finish before exit.
    controller.scheduler().drain().await;
    controller.shutdown().await;

    if result.is_ok() {
        let collected = util::drain_notifications(&mut notes);
        output::print_notifications(&collected, output::should_color(&global.color), global.quiet);
    }
    result
}

async fn route(cmd: Command, controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status | Command::Refresh => status::handle(controller, global),
        Command::Proxies(args) => proxies::handle(controller, args, global).await,
        Command::Mappings(args) => mappings::handle(controller, args, global).await,
        Command::Clients(args) => clients::handle(controller, args, global),
        Command::Reconcile => reconcile::handle(controller).await,
        // Handled before a session is opened.
        Command::Watch(_) | Command::Config(_) | Command::Completions(_) => Err(
            CliError::Internal("command does not use a gateway session".into()),
        ),
    }
}
