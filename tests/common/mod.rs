//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use incident_router::agents::{ConnectionId, ConnectionRegistry, EventRouter};
use incident_router::domain::incident::{Envelope, ReportSummary};
use incident_router::domain::reporting::{ReportGenerationError, ReportGenerator};

/// Report generator with a fixed outcome that records every call
pub struct ScriptedGenerator {
    fail: bool,
    calls: AtomicUsize,
    summaries: Mutex<Vec<ReportSummary>>,
}

impl ScriptedGenerator {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
            summaries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
            summaries: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn summaries(&self) -> Vec<ReportSummary> {
        self.summaries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportGenerator for ScriptedGenerator {
    async fn generate(&self, summary: &ReportSummary) -> Result<String, ReportGenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.summaries.lock().unwrap().push(summary.clone());

        if self.fail {
            Err(ReportGenerationError::Status {
                status: 500,
                body: "injected failure".to_string(),
            })
        } else {
            Ok(format!(
                "Report: {}",
                serde_json::to_string(summary).unwrap()
            ))
        }
    }
}

pub fn router_with(generator: Arc<ScriptedGenerator>) -> Arc<EventRouter> {
    Arc::new(EventRouter::new(
        Arc::new(ConnectionRegistry::new()),
        generator,
    ))
}

/// Register an in-memory connection and return its outbound queue
pub async fn connect(
    router: &EventRouter,
) -> (ConnectionId, mpsc::UnboundedReceiver<Envelope>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let id = router.registry().register(tx).await;
    (id, rx)
}

/// Everything currently queued for a connection
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Envelope>) -> Vec<Envelope> {
    let mut out = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        out.push(envelope);
    }
    out
}
