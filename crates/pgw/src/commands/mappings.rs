//! Mapping command handlers.

use std::sync::Arc;

use tabled::Tabled;

use pgw_core::{Controller, CreateMappingInput, Mapping, MappingSortKey, OperationOutcome};

use crate::cli::{GlobalOpts, MappingColumn, MappingsArgs, MappingsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct MappingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Proxy")]
    proxy: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&Arc<Mapping>> for MappingRow {
    fn from(m: &Arc<Mapping>) -> Self {
        Self {
            id: m.id.to_string(),
            client: m.client_ip().unwrap_or("-").to_owned(),
            proxy: m.proxy_address().unwrap_or_else(|| "-".into()),
            protocol: m.protocol.clone().unwrap_or_default(),
            port: m.local_port.map(|p| p.to_string()).unwrap_or_default(),
            state: m.state.to_string(),
        }
    }
}

fn detail(m: &Mapping) -> String {
    [
        format!("ID:        {}", m.id),
        format!("Client:    {}", m.client_ip().unwrap_or("-")),
        format!(
            "Proxy:     {}",
            m.proxy_address().unwrap_or_else(|| "-".into())
        ),
        format!("Protocol:  {}", m.protocol.as_deref().unwrap_or("-")),
        format!(
            "Port:      {}",
            m.local_port.map_or_else(|| "-".into(), |p| p.to_string())
        ),
        format!("State:     {}", m.state),
    ]
    .join("\n")
}

fn print_table(mappings: &[Arc<Mapping>], global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(
        &global.output,
        mappings,
        |m| MappingRow::from(m),
        |m| m.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn sort_key(column: MappingColumn) -> MappingSortKey {
    match column {
        MappingColumn::Id => MappingSortKey::Id,
        MappingColumn::Client => MappingSortKey::Client,
        MappingColumn::Proxy => MappingSortKey::Proxy,
        MappingColumn::State => MappingSortKey::State,
        MappingColumn::Port => MappingSortKey::Port,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: MappingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        MappingsCommand::List => print_table(&controller.sorted_mappings(), global),

        MappingsCommand::Add { client_ip, proxy } => {
            let mapping = controller
                .create_mapping(CreateMappingInput {
                    client_ip,
                    proxy_id: proxy,
                })
                .await?;
            let out =
                output::render_single(&global.output, &mapping, detail, |m| m.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MappingsCommand::Delete { id } => {
            let id = util::entity_id(&id, "mapping id")?;
            if controller.store().mapping(&id).is_none() {
                return Err(CliError::NotFound {
                    resource_type: "mapping".into(),
                    identifier: id.into_inner(),
                    list_command: "mappings list".into(),
                });
            }
            let gate = util::PromptConfirm::for_action(global, "mappings delete")?;
            if controller.delete_mapping(&id, &gate).await? == OperationOutcome::Cancelled
                && !global.quiet
            {
                eprintln!("Cancelled");
            }
            Ok(())
        }

        MappingsCommand::Sort { column } => {
            let sort = controller.select_mapping_sort(sort_key(column));
            if !global.quiet {
                let direction = if sort.ascending { "ascending" } else { "descending" };
                eprintln!("Sorting mappings by {} ({direction})", sort.key);
            }
            print_table(&controller.sorted_mappings(), global)
        }

        MappingsCommand::Export { file } => {
            if let Some(csv) = controller.export_mappings_csv()? {
                util::write_output(file.as_deref(), &csv, global.quiet)?;
            }
            Ok(())
        }
    }
}
