// ── CSV export ──

use std::sync::Arc;

use chrono::SecondsFormat;

use crate::controller::Controller;
use crate::error::CoreError;
use crate::model::{Mapping, Proxy};

pub const PROXY_CSV_HEADERS: [&str; 8] = [
    "ID", "Type", "Host", "Port", "Status", "Latency", "Exit IP", "Last Check",
];
pub const MAPPING_CSV_HEADERS: [&str; 6] = [
    "ID", "Client IP", "Proxy Host", "Proxy Port", "State", "Local Port",
];

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, CoreError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("CSV export failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Internal(format!("CSV export failed: {e}")))
}

fn csv_error(e: csv::Error) -> CoreError {
    CoreError::Internal(format!("CSV export failed: {e}"))
}

/// Render proxies as CSV, header row first.
pub fn proxies_csv(proxies: &[Arc<Proxy>]) -> Result<String, CoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(PROXY_CSV_HEADERS).map_err(csv_error)?;

    for p in proxies {
        writer
            .write_record([
                p.id.to_string(),
                p.proxy_type.to_string(),
                p.host.clone(),
                p.port.to_string(),
                p.status.sort_text().to_owned(),
                p.latency_ms.map(|l| l.to_string()).unwrap_or_default(),
                p.exit_ip.clone().unwrap_or_default(),
                p.last_checked_at
                    .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                    .unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }
    finish(writer)
}

/// Render mappings as CSV, header row first.
pub fn mappings_csv(mappings: &[Arc<Mapping>]) -> Result<String, CoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(MAPPING_CSV_HEADERS).map_err(csv_error)?;

    for m in mappings {
        let proxy = m.proxy.as_ref();
        writer
            .write_record([
                m.id.to_string(),
                m.client
                    .as_ref()
                    .map(|c| c.ip_cidr.clone())
                    .unwrap_or_default(),
                proxy.map(|p| p.host.clone()).unwrap_or_default(),
                proxy.map(|p| p.port.to_string()).unwrap_or_default(),
                m.state.to_string(),
                m.local_port.map(|p| p.to_string()).unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }
    finish(writer)
}

impl Controller {
    /// CSV of every proxy in server order. `None` (with a warning) when
    /// there is nothing to export.
    pub fn export_proxies_csv(&self) -> Result<Option<String>, CoreError> {
        let proxies = self.store().proxies();
        if proxies.is_empty() {
            self.notifications().warning("No proxies to export");
            return Ok(None);
        }
        proxies_csv(&proxies).map(Some)
    }

    /// CSV of every mapping in server order.
    pub fn export_mappings_csv(&self) -> Result<Option<String>, CoreError> {
        let mappings = self.store().mappings();
        if mappings.is_empty() {
            self.notifications().warning("No mappings to export");
            return Ok(None);
        }
        mappings_csv(&mappings).map(Some)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::{Client, EntityId, MappingState, ProxyStatus, ProxyType};

    fn proxy() -> Proxy {
        Proxy {
            id: EntityId::from("p-1"),
            label: None,
            proxy_type: ProxyType::Socks5,
            host: "10.0.0.1".into(),
            port: 1080,
            username: None,
            password: None,
            enabled: true,
            status: ProxyStatus::Ok,
            latency_ms: Some(85),
            exit_ip: Some("203.0.113.7".into()),
            last_checked_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single(),
        }
    }

    #[test]
    fn proxy_rows() {
        let csv = proxies_csv(&[Arc::new(proxy())]).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "ID,Type,Host,Port,Status,Latency,Exit IP,Last Check");
        assert_eq!(
            lines[1],
            "p-1,socks5,10.0.0.1,1080,OK,85,203.0.113.7,2024-05-01T12:00:00Z"
        );
    }

    #[test]
    fn mapping_rows_leave_unknowns_blank() {
        let mapping = Mapping {
            id: EntityId::from("m-1"),
            client_id: None,
            proxy_id: None,
            client: Some(Client {
                id: EntityId::from("c-1"),
                ip_cidr: "192.168.1.5/32".into(),
                note: None,
                enabled: true,
            }),
            proxy: Some(proxy()),
            protocol: None,
            local_port: None,
            state: MappingState::Pending,
            last_applied_at: None,
        };
        let csv = mappings_csv(&[Arc::new(mapping)]).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "ID,Client IP,Proxy Host,Proxy Port,State,Local Port");
        assert_eq!(lines[1], "m-1,192.168.1.5/32,10.0.0.1,1080,PENDING,");
    }
}
