//! Proxy command handlers.

use std::sync::Arc;

use chrono::SecondsFormat;
use secrecy::SecretString;
use tabled::Tabled;

use pgw_core::{
    Controller, CreateProxyRequest, EntityId, OperationOutcome, Proxy, ProxySortKey, ProxyType,
};

use crate::cli::{GlobalOpts, ProxiesArgs, ProxiesCommand, ProxyColumn, ProxyKind};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProxyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    proxy_type: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Latency")]
    latency: String,
    #[tabled(rename = "Exit IP")]
    exit_ip: String,
    #[tabled(rename = "Last Check")]
    last_checked: String,
}

impl From<&Arc<Proxy>> for ProxyRow {
    fn from(p: &Arc<Proxy>) -> Self {
        Self {
            id: p.id.to_string(),
            proxy_type: p.proxy_type.to_string(),
            address: p.address(),
            status: p.status.to_string(),
            latency: p.latency_ms.map(|l| format!("{l} ms")).unwrap_or_default(),
            exit_ip: p.exit_ip.clone().unwrap_or_default(),
            last_checked: p
                .last_checked_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default(),
        }
    }
}

fn detail(p: &Proxy) -> String {
    let mut lines = vec![
        format!("ID:          {}", p.id),
        format!("Label:       {}", p.label.as_deref().unwrap_or("-")),
        format!("Type:        {}", p.proxy_type),
        format!("Address:     {}", p.address()),
        format!("Enabled:     {}", p.enabled),
        format!("Status:      {}", p.status),
    ];
    if let Some(ref user) = p.username {
        lines.push(format!("Username:    {user}"));
    }
    if let Some(latency) = p.latency_ms {
        lines.push(format!("Latency:     {latency} ms"));
    }
    if let Some(ref exit) = p.exit_ip {
        lines.push(format!("Exit IP:     {exit}"));
    }
    if let Some(at) = p.last_checked_at {
        lines.push(format!(
            "Last check:  {}",
            at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }
    lines.join("\n")
}

fn print_table(proxies: &[Arc<Proxy>], global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(
        &global.output,
        proxies,
        |p| ProxyRow::from(p),
        |p| p.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn print_proxy(proxy: &Proxy, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, proxy, detail, |p| p.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn sort_key(column: ProxyColumn) -> ProxySortKey {
    match column {
        ProxyColumn::Id => ProxySortKey::Id,
        ProxyColumn::Type => ProxySortKey::Type,
        ProxyColumn::Address => ProxySortKey::Address,
        ProxyColumn::Status => ProxySortKey::Status,
        ProxyColumn::Latency => ProxySortKey::Latency,
        ProxyColumn::Exit => ProxySortKey::Exit,
        ProxyColumn::Last => ProxySortKey::Last,
    }
}

/// Fail early on an id the gateway does not know.
fn known_proxy(controller: &Controller, raw: &str) -> Result<EntityId, CliError> {
    let id = util::entity_id(raw, "proxy id")?;
    if controller.store().proxy(&id).is_none() {
        return Err(CliError::NotFound {
            resource_type: "proxy".into(),
            identifier: id.into_inner(),
            list_command: "proxies list".into(),
        });
    }
    Ok(id)
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    controller: &Controller,
    args: ProxiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ProxiesCommand::List => print_table(&controller.sorted_proxies(), global),

        ProxiesCommand::Available => print_table(&controller.sorted_available_proxies(), global),

        ProxiesCommand::Add {
            host,
            port,
            proxy_type,
            username,
            password,
            label,
            disabled,
        } => {
            let request = CreateProxyRequest {
                proxy_type: match proxy_type {
                    ProxyKind::Http => ProxyType::Http,
                    ProxyKind::Socks5 => ProxyType::Socks5,
                },
                host,
                port,
                username,
                password: password.map(SecretString::from),
                enabled: !disabled,
                label,
            };
            let proxy = controller.create_proxy(request).await?;
            print_proxy(&proxy, global)
        }

        ProxiesCommand::Import { file } => {
            let text = util::read_input(file.as_deref())?;
            let spinner = util::spinner("Importing proxies...", global);
            let report = controller.import_proxies(&text).await;
            spinner.finish_and_clear();

            let out = output::render_single(
                &global.output,
                &report,
                pgw_core::ImportReport::summary,
                |r| r.created.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProxiesCommand::Delete { id } => {
            let id = known_proxy(controller, &id)?;
            let gate = util::PromptConfirm::for_action(global, "proxies delete")?;
            if controller.delete_proxy(&id, &gate).await? == OperationOutcome::Cancelled
                && !global.quiet
            {
                eprintln!("Cancelled");
            }
            Ok(())
        }

        ProxiesCommand::Check { id } => {
            let id = known_proxy(controller, &id)?;
            let updated = controller.check_proxy(&id).await?;
            match updated.map(Arc::new).or_else(|| controller.store().proxy(&id)) {
                Some(proxy) => print_proxy(&proxy, global),
                None => Ok(()),
            }
        }

        ProxiesCommand::CheckAll => {
            let spinner = util::spinner("Checking proxies...", global);
            let summary = controller.health_check_all().await;
            spinner.finish_and_clear();

            let out = output::render_single(
                &global.output,
                &summary,
                |s| format!("{} succeeded, {} failed", s.succeeded, s.failed),
                |s| s.total().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProxiesCommand::Sort { column } => {
            let sort = controller.select_proxy_sort(sort_key(column));
            if !global.quiet {
                let direction = if sort.ascending { "ascending" } else { "descending" };
                eprintln!("Sorting proxies by {} ({direction})", sort.key);
            }
            print_table(&controller.sorted_proxies(), global)
        }

        ProxiesCommand::Export { file } => {
            if let Some(csv) = controller.export_proxies_csv()? {
                util::write_output(file.as_deref(), &csv, global.quiet)?;
            }
            Ok(())
        }
    }
}
