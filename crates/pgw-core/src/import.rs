// ── Bulk proxy import ──
//
// Parses `host:port:username:password` lines and creates one proxy per
// line. Lines are independent: a bad line or a failed create is counted
// as skipped and the rest keep going. Nothing is rolled back.

use secrecy::SecretString;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::command::CreateProxyRequest;
use crate::controller::Controller;
use crate::model::ProxyType;
use crate::operation::{Operation, OperationPhase};

/// Why a line was not submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineRejection {
    #[error("commented out")]
    Comment,
    #[error("expected host:port:username:password")]
    FieldCount,
    #[error("host is empty or contains whitespace")]
    Host,
    #[error("port is not a number between 1 and 65535")]
    Port,
}

/// Counts from one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub created: usize,
    pub skipped: usize,
}

impl ImportReport {
    /// "Imported N proxies", plus ", skipped M" when anything was skipped.
    pub fn summary(&self) -> String {
        if self.skipped > 0 {
            format!("Imported {} proxies, skipped {}", self.created, self.skipped)
        } else {
            format!("Imported {} proxies", self.created)
        }
    }
}

/// Trimmed, non-empty lines.
pub fn candidate_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

/// Parse one import line into an enabled HTTP proxy request.
pub fn parse_proxy_line(line: &str) -> Result<CreateProxyRequest, LineRejection> {
    let line = line.trim();
    if line.starts_with('#') {
        return Err(LineRejection::Comment);
    }

    let fields: Vec<&str> = line.split(':').collect();
    let [host, port, username, password] = fields.as_slice() else {
        return Err(LineRejection::FieldCount);
    };

    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(LineRejection::Host);
    }
    let port = parse_port(port).ok_or(LineRejection::Port)?;

    Ok(CreateProxyRequest {
        proxy_type: ProxyType::Http,
        host: (*host).to_owned(),
        port,
        username: Some((*username).to_owned()).filter(|u| !u.is_empty()),
        password: Some((*password).to_owned())
            .filter(|p| !p.is_empty())
            .map(SecretString::from),
        enabled: true,
        label: None,
    })
}

fn parse_port(raw: &str) -> Option<u16> {
    if raw.is_empty() || raw.len() > 5 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>()
        .ok()
        .filter(|p| (1..=65535).contains(p))
        .and_then(|p| u16::try_from(p).ok())
}

impl Controller {
    /// Import a pasted proxy list.
    ///
    /// Every created proxy gets a deferred health check. One summary
    /// notification is pushed and, if anything was created, the store is
    /// refreshed exactly once.
    pub async fn import_proxies(&self, text: &str) -> ImportReport {
        let lines = candidate_lines(text);
        if lines.is_empty() {
            self.notifications().warning("No proxies to import");
            return ImportReport::default();
        }

        self.emit(Operation::ImportProxies, OperationPhase::Submitting);
        let mut report = ImportReport::default();

        for (index, line) in lines.iter().enumerate() {
            let request = match parse_proxy_line(line) {
                Ok(r) => r,
                Err(reason) => {
                    debug!(line = index + 1, %reason, "skipping import line");
                    report.skipped += 1;
                    continue;
                }
            };

            match self.backend().create_proxy(&request).await {
                Ok(proxy) => {
                    report.created += 1;
                    self.schedule_health_check(proxy.id, self.config().import_check_delay);
                }
                Err(e) => {
                    warn!(line = index + 1, host = %request.host, error = %e, "import create failed");
                    report.skipped += 1;
                }
            }
        }

        info!(created = report.created, skipped = report.skipped, "import finished");
        if report.created > 0 {
            self.emit(Operation::ImportProxies, OperationPhase::Succeeded);
            self.notifications().success(report.summary());
            self.reload_after(Operation::ImportProxies).await;
        } else {
            self.emit(Operation::ImportProxies, OperationPhase::Failed);
            self.notifications().warning(report.summary());
        }
        report
    }
}
