//! Client command handlers.

use std::sync::Arc;

use tabled::Tabled;

use pgw_core::{Client, Controller};

use crate::cli::{ClientsArgs, ClientsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "IP/CIDR")]
    ip_cidr: String,
    #[tabled(rename = "Note")]
    note: String,
    #[tabled(rename = "Enabled")]
    enabled: bool,
}

impl From<&Arc<Client>> for ClientRow {
    fn from(c: &Arc<Client>) -> Self {
        Self {
            id: c.id.to_string(),
            ip_cidr: c.ip_cidr.clone(),
            note: c.note.clone().unwrap_or_default(),
            enabled: c.enabled,
        }
    }
}

pub fn handle(
    controller: &Controller,
    args: ClientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ClientsCommand::List => {
            let clients = controller.store().clients();
            let out = output::render_list(
                &global.output,
                &clients,
                |c| ClientRow::from(c),
                |c| c.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
