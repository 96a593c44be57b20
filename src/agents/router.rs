use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::errors::{RouterError, RouterResult};
use super::registry::{ConnectionId, ConnectionRegistry};
use crate::domain::incident::{workflow, CityReport, Envelope, ReportSummary};
use crate::domain::reporting::ReportGenerator;

/// Event Router hosting the incident workflow
///
/// Parses inbound frames, resolves the next stage and replies on the
/// originating connection only. Terminal stages call the report generator
/// and emit a `city_report` when it succeeds.
///
/// Handling is reactive: the connection task calls [`EventRouter::handle_text`]
/// once per frame and awaits it, which keeps replies in arrival order
/// within one connection while distinct connections run concurrently.
pub struct EventRouter {
    registry: Arc<ConnectionRegistry>,
    reporter: Arc<dyn ReportGenerator>,
}

impl EventRouter {
    pub fn new(registry: Arc<ConnectionRegistry>, reporter: Arc<dyn ReportGenerator>) -> Self {
        Self { registry, reporter }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn reporter(&self) -> &Arc<dyn ReportGenerator> {
        &self.reporter
    }

    /// Handle one inbound text frame from `conn`
    ///
    /// Never fails: every error is logged here and the connection stays
    /// open, except after a send failure, which unregisters it.
    pub async fn handle_text(&self, conn: ConnectionId, text: &str) {
        let result = match Envelope::parse(text) {
            Ok(envelope) => self.dispatch(conn, envelope).await,
            Err(e) => Err(RouterError::from(e)),
        };

        match result {
            Ok(()) => {}
            Err(RouterError::UnknownStage(stage)) => {
                debug!(conn_id = %conn, stage = %stage, "Ignoring envelope with unknown stage");
            }
            Err(RouterError::SendFailure(id)) => {
                warn!(conn_id = %id, "Send failed, dropping connection");
                self.registry.unregister(id).await;
            }
            Err(e) => {
                warn!(conn_id = %conn, error = %e, "Envelope handling failed");
            }
        }
    }

    /// Advance the workflow for one parsed envelope
    #[instrument(skip(self, envelope), fields(conn_id = %conn, stage = %envelope.stage()))]
    pub async fn dispatch(&self, conn: ConnectionId, envelope: Envelope) -> RouterResult<()> {
        let step = workflow::resolve(&envelope, Utc::now());

        if let Some(reply) = step.reply {
            debug!(reply = %reply.stage(), "Replying");
            self.send(conn, reply).await?;
        }

        if let Some(summary) = step.report {
            self.emit_report(conn, &summary).await?;
        }

        Ok(())
    }

    /// Generate a report for `summary` and send it as `city_report`
    ///
    /// No registry lock is held while the generator runs. Connections that
    /// are already closed are not reported to.
    async fn emit_report(&self, conn: ConnectionId, summary: &ReportSummary) -> RouterResult<()> {
        match self.registry.get(conn).await {
            Some(handle) if !handle.is_closed() => {}
            _ => return Err(RouterError::SendFailure(conn)),
        }

        let report = self.reporter.generate(summary).await?;
        info!(conn_id = %conn, chars = report.len(), "City report generated");
        self.send(conn, Envelope::CityReport(CityReport { report }))
            .await
    }

    /// Send on a single connection
    async fn send(&self, conn: ConnectionId, envelope: Envelope) -> RouterResult<()> {
        let handle = self
            .registry
            .get(conn)
            .await
            .ok_or(RouterError::SendFailure(conn))?;

        if handle.send(envelope) {
            Ok(())
        } else {
            Err(RouterError::SendFailure(conn))
        }
    }

    /// Fan an envelope out to every registered connection
    ///
    /// Used by the HTTP ingestion path to seed workflows. Connections whose
    /// send fails are pruned. Returns the number of successful deliveries.
    pub async fn broadcast(&self, envelope: Envelope) -> usize {
        let snapshot = self.registry.snapshot().await;
        info!(stage = %envelope.stage(), clients = snapshot.len(), "Broadcasting envelope");

        let mut delivered = 0;
        for handle in snapshot {
            if handle.send(envelope.clone()) {
                delivered += 1;
            } else {
                debug!(conn_id = %handle.id, "Broadcast target closed, unregistering");
                self.registry.unregister(handle.id).await;
            }
        }
        delivered
    }

    /// Drop every connection
    pub async fn shutdown(&self) {
        info!(clients = self.registry.len().await, "Router shutting down");
        self.registry.clear().await;
    }
}
