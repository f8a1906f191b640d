// ── Orchestrated operations ──
//
// Each operation validates locally, submits to the backend, reports one
// notification, refreshes the store on success and schedules its
// follow-up. Follow-ups are never awaited by the triggering operation.

use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use super::Controller;
use crate::command::{CreateClientRequest, CreateMappingInput, CreateMappingRequest, CreateProxyRequest};
use crate::confirm::{ConfirmGate, DELETE_MAPPING_PROMPT, DELETE_PROXY_PROMPT};
use crate::error::{CoreError, ValidationError};
use crate::model::{EntityId, Mapping, Proxy, host_cidr, parse_client_ip};
use crate::operation::{HealthCheckSummary, Operation, OperationOutcome, OperationPhase};
use crate::scheduler::ScheduledTask;

impl Controller {
    // ── Proxies ──────────────────────────────────────────────────

    /// Create one proxy, then health-check it after the configured delay.
    pub async fn create_proxy(&self, request: CreateProxyRequest) -> Result<Proxy, CoreError> {
        if let Err(e) = request.validate() {
            return Err(self.reject(e));
        }

        self.emit(Operation::CreateProxy, OperationPhase::Submitting);
        match self.backend().create_proxy(&request).await {
            Ok(proxy) => {
                self.emit(Operation::CreateProxy, OperationPhase::Succeeded);
                info!(proxy = %proxy.id, address = %proxy.address(), "proxy created");
                self.notifications().success("Proxy created successfully");
                self.reload_after(Operation::CreateProxy).await;
                self.schedule_health_check(proxy.id.clone(), self.config().check_delay);
                Ok(proxy)
            }
            Err(e) => Err(self.fail(Operation::CreateProxy, "Failed to create proxy", e)),
        }
    }

    /// Delete a proxy after confirmation. Its mappings go with it
    /// server-side and disappear on the next refresh.
    pub async fn delete_proxy(
        &self,
        id: &EntityId,
        gate: &dyn ConfirmGate,
    ) -> Result<OperationOutcome, CoreError> {
        if !gate.confirm(DELETE_PROXY_PROMPT) {
            debug!(proxy = %id, "proxy deletion not confirmed");
            return Ok(OperationOutcome::Cancelled);
        }

        self.emit(Operation::DeleteProxy, OperationPhase::Submitting);
        match self.backend().delete_proxy(id).await {
            Ok(()) => {
                self.emit(Operation::DeleteProxy, OperationPhase::Succeeded);
                info!(proxy = %id, "proxy deleted");
                self.notifications().success("Proxy deleted successfully");
                self.reload_after(Operation::DeleteProxy).await;
                Ok(OperationOutcome::Completed)
            }
            Err(e) => Err(self.fail(Operation::DeleteProxy, "Failed to delete proxy", e)),
        }
    }

    /// Trigger one health check. Returns the updated proxy when the
    /// gateway sends it back.
    pub async fn check_proxy(&self, id: &EntityId) -> Result<Option<Proxy>, CoreError> {
        self.emit(Operation::CheckProxy, OperationPhase::Submitting);
        match self.backend().check_proxy(id).await {
            Ok(updated) => {
                self.emit(Operation::CheckProxy, OperationPhase::Succeeded);
                debug!(proxy = %id, "health check completed");
                self.notifications().success("Health check completed");
                self.reload_after(Operation::CheckProxy).await;
                Ok(updated)
            }
            Err(e) => Err(self.fail(Operation::CheckProxy, "Health check failed", e)),
        }
    }

    /// Check every known proxy concurrently.
    ///
    /// One failing check does not affect the others. Exactly one summary
    /// notification and one refresh follow the whole batch.
    pub async fn health_check_all(&self) -> HealthCheckSummary {
        let proxies = self.store().proxies();
        if proxies.is_empty() {
            self.notifications().warning("No proxies to check");
            return HealthCheckSummary::default();
        }

        self.emit(Operation::HealthCheckAll, OperationPhase::Submitting);
        let checks = proxies.iter().map(|proxy| {
            let backend = self.backend();
            let id = proxy.id.clone();
            async move {
                match backend.check_proxy(&id).await {
                    Ok(_) => true,
                    Err(e) => {
                        warn!(proxy = %id, error = %e, "health check failed");
                        false
                    }
                }
            }
        });
        let results = join_all(checks).await;

        let succeeded = results.iter().filter(|ok| **ok).count();
        let summary = HealthCheckSummary {
            succeeded,
            failed: results.len() - succeeded,
        };
        info!(succeeded = summary.succeeded, failed = summary.failed, "health checks finished");

        if summary.failed == 0 {
            self.emit(Operation::HealthCheckAll, OperationPhase::Succeeded);
            self.notifications().success("All health checks completed");
        } else {
            self.emit(Operation::HealthCheckAll, OperationPhase::Failed);
            self.notifications().warning(format!(
                "Health checks completed: {} succeeded, {} failed",
                summary.succeeded, summary.failed
            ));
        }
        self.reload_after(Operation::HealthCheckAll).await;
        summary
    }

    // ── Mappings ─────────────────────────────────────────────────

    /// Map a client address onto a proxy.
    ///
    /// The client is reused when one with the same `/32` already exists
    /// and created otherwise. A reconcile follows after the configured
    /// delay.
    pub async fn create_mapping(&self, input: CreateMappingInput) -> Result<Mapping, CoreError> {
        let ip = match parse_client_ip(&input.client_ip) {
            Ok(ip) => ip,
            Err(e) => return Err(self.reject(e)),
        };
        let proxy_id = input.proxy_id.trim();
        if proxy_id.is_empty() {
            return Err(self.reject(ValidationError::MissingField { field: "proxy" }));
        }
        let proxy_id = EntityId::from(proxy_id);

        self.emit(Operation::CreateMapping, OperationPhase::Submitting);
        let result = async {
            let client_id = match self.store().client_by_cidr(&host_cidr(ip)) {
                Some(existing) => {
                    debug!(client = %existing.id, %ip, "reusing existing client");
                    existing.id.clone()
                }
                None => {
                    let created = self
                        .backend()
                        .create_client(&CreateClientRequest {
                            ip_cidr: ip.to_string(),
                            enabled: true,
                        })
                        .await?;
                    debug!(client = %created.id, %ip, "client created");
                    created.id
                }
            };
            self.backend()
                .create_mapping(&CreateMappingRequest {
                    client_id,
                    proxy_id,
                })
                .await
        }
        .await;

        match result {
            Ok(mapping) => {
                self.emit(Operation::CreateMapping, OperationPhase::Succeeded);
                info!(mapping = %mapping.id, %ip, "mapping created");
                self.notifications().success("Mapping created successfully");
                self.reload_after(Operation::CreateMapping).await;
                self.schedule_reconcile(self.config().reconcile_delay);
                Ok(mapping)
            }
            Err(e) => Err(self.fail(Operation::CreateMapping, "Failed to create mapping", e)),
        }
    }

    /// Delete a mapping after confirmation, then reconcile after the
    /// configured delay.
    pub async fn delete_mapping(
        &self,
        id: &EntityId,
        gate: &dyn ConfirmGate,
    ) -> Result<OperationOutcome, CoreError> {
        if !gate.confirm(DELETE_MAPPING_PROMPT) {
            debug!(mapping = %id, "mapping deletion not confirmed");
            return Ok(OperationOutcome::Cancelled);
        }

        self.emit(Operation::DeleteMapping, OperationPhase::Submitting);
        match self.backend().delete_mapping(id).await {
            Ok(()) => {
                self.emit(Operation::DeleteMapping, OperationPhase::Succeeded);
                info!(mapping = %id, "mapping deleted");
                self.notifications().success("Mapping deleted successfully");
                self.reload_after(Operation::DeleteMapping).await;
                self.schedule_reconcile(self.config().reconcile_delay);
                Ok(OperationOutcome::Completed)
            }
            Err(e) => Err(self.fail(Operation::DeleteMapping, "Failed to delete mapping", e)),
        }
    }

    /// Ask the agent to apply mapping state to the network.
    pub async fn reconcile(&self) -> Result<(), CoreError> {
        self.emit(Operation::Reconcile, OperationPhase::Submitting);
        match self.backend().reconcile().await {
            Ok(()) => {
                self.emit(Operation::Reconcile, OperationPhase::Succeeded);
                self.mark_reconciled();
                info!("rules reconciled");
                self.notifications().success("Rules reconciled successfully");
                self.reload_after(Operation::Reconcile).await;
                Ok(())
            }
            Err(e) => Err(self.fail(Operation::Reconcile, "Failed to reconcile rules", e)),
        }
    }

    // ── Follow-ups ───────────────────────────────────────────────

    pub(crate) fn schedule_health_check(&self, id: EntityId, delay: Duration) -> ScheduledTask {
        let ctrl = self.clone();
        self.scheduler().schedule("health-check", delay, async move {
            let _ = ctrl.check_proxy(&id).await;
        })
    }

    pub(crate) fn schedule_reconcile(&self, delay: Duration) -> ScheduledTask {
        let ctrl = self.clone();
        self.scheduler().schedule("reconcile", delay, async move {
            let _ = ctrl.reconcile().await;
        })
    }

    // ── Reporting ────────────────────────────────────────────────

    /// Validation failure: warn the operator, nothing was sent.
    fn reject(&self, err: ValidationError) -> CoreError {
        debug!(error = %err, "input rejected");
        self.notifications().warning(err.to_string());
        CoreError::from(err)
    }

    /// Remote failure: mark the operation failed and tell the operator.
    fn fail(&self, operation: Operation, context: &str, err: CoreError) -> CoreError {
        self.emit(operation, OperationPhase::Failed);
        warn!(%operation, error = %err, "operation failed");
        self.notifications().danger(format!("{context}: {err}"));
        err
    }
}
