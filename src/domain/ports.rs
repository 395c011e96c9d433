use async_trait::async_trait;

use crate::domain::entities::{Credential, Order, ReportQuery};
use crate::domain::errors::TransportError;

/// Raw HTTP outcome handed back by a backend adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendReply {
    pub status: u16,
    // Canonical reason phrase for `status`, when one exists.
    pub reason: Option<String>,
    pub body: String,
}

impl BackendReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// Port for the point-of-sale backend. Use cases interpret replies; adapters only move bytes.
#[async_trait]
pub trait PosBackend: Send + Sync {
    async fn login(&self, credential: &Credential) -> Result<BackendReply, TransportError>;
    async fn create_order(
        &self,
        bearer: &str,
        order: &Order,
    ) -> Result<BackendReply, TransportError>;
    async fn fetch_report(
        &self,
        bearer: &str,
        query: &ReportQuery,
    ) -> Result<BackendReply, TransportError>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}

// Port for the operation status log. Never affects control flow.
pub trait StatusSink: Send + Sync {
    fn record(&self, message: &str, succeeded: bool);
}
