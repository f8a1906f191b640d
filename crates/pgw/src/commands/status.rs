//! Status command handler.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use pgw_core::{Controller, StoreStats};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
pub struct StatusView {
    pub api: String,
    pub agent: String,
    pub timeout: String,
    #[serde(flatten)]
    pub stats: StoreStats,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub last_reconciled: Option<DateTime<Utc>>,
}

impl StatusView {
    pub fn capture(controller: &Controller) -> Self {
        let cfg = controller.config();
        Self {
            api: cfg.api_base.clone(),
            agent: cfg.agent_base.clone(),
            timeout: config::describe_timeout(cfg),
            stats: controller.store().stats(),
            refreshed_at: controller.store().last_full_refresh(),
            last_reconciled: controller.last_reconciled(),
        }
    }

    /// One-line counter summary, also used by `watch`.
    pub fn summary(&self) -> String {
        format!(
            "{} proxies ({} ok), {} clients, {} active mappings",
            self.stats.proxies, self.stats.proxies_ok, self.stats.clients, self.stats.active_mappings
        )
    }
}

fn timestamp(t: Option<DateTime<Utc>>) -> String {
    t.map_or_else(
        || "-".into(),
        |t| t.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

fn detail(s: &StatusView) -> String {
    [
        format!("API:              {}", s.api),
        format!("Agent:            {}", s.agent),
        format!("Timeout:          {}", s.timeout),
        format!("Proxies:          {} ({} ok)", s.stats.proxies, s.stats.proxies_ok),
        format!("Clients:          {}", s.stats.clients),
        format!("Active mappings:  {}", s.stats.active_mappings),
        format!("Last refresh:     {}", timestamp(s.refreshed_at)),
        format!("Last reconcile:   {}", timestamp(s.last_reconciled)),
    ]
    .join("\n")
}

pub fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let view = StatusView::capture(controller);
    let out = output::render_single(&global.output, &view, detail, StatusView::summary)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
