use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    BackendReply, Clock, Credential, Order, PosBackend, ReportQuery, StatusSink, TransportError,
};

// Adjustable time source for deterministic expiry tests.
pub(crate) struct ManualClock(AtomicU64);

impl ManualClock {
    pub(crate) fn new(now: u64) -> Self {
        Self(AtomicU64::new(now))
    }

    pub(crate) fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_secs(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub(crate) type ScriptedReply = Result<BackendReply, TransportError>;

pub(crate) fn reply(status: u16, body: &str) -> ScriptedReply {
    Ok(BackendReply {
        status,
        reason: None,
        body: body.to_string(),
    })
}

pub(crate) fn reply_with_reason(status: u16, reason: &str, body: &str) -> ScriptedReply {
    Ok(BackendReply {
        status,
        reason: Some(reason.to_string()),
        body: body.to_string(),
    })
}

pub(crate) fn login_ok(token: &str) -> ScriptedReply {
    reply(
        200,
        &format!(r#"{{"access_token":"{token}","token_type":"bearer"}}"#),
    )
}

// Backend double that replays queued replies and records every call.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    login_replies: Mutex<VecDeque<ScriptedReply>>,
    order_replies: Mutex<VecDeque<ScriptedReply>>,
    report_replies: Mutex<VecDeque<ScriptedReply>>,
    login_delay: Option<Duration>,
    login_calls: AtomicUsize,
    order_calls: AtomicUsize,
    report_calls: AtomicUsize,
    bearers: Mutex<Vec<String>>,
    usernames: Mutex<Vec<String>>,
    queries: Mutex<Vec<ReportQuery>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = Some(delay);
        self
    }

    pub(crate) fn push_login(&self, reply: ScriptedReply) {
        self.login_replies.lock().expect("script mutex poisoned").push_back(reply);
    }

    pub(crate) fn push_order(&self, reply: ScriptedReply) {
        self.order_replies.lock().expect("script mutex poisoned").push_back(reply);
    }

    pub(crate) fn push_report(&self, reply: ScriptedReply) {
        self.report_replies.lock().expect("script mutex poisoned").push_back(reply);
    }

    pub(crate) fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn order_calls(&self) -> usize {
        self.order_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn bearers(&self) -> Vec<String> {
        self.bearers.lock().expect("script mutex poisoned").clone()
    }

    pub(crate) fn usernames(&self) -> Vec<String> {
        self.usernames.lock().expect("script mutex poisoned").clone()
    }

    pub(crate) fn queries(&self) -> Vec<ReportQuery> {
        self.queries.lock().expect("script mutex poisoned").clone()
    }

    fn next(queue: &Mutex<VecDeque<ScriptedReply>>) -> ScriptedReply {
        queue
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted reply")))
    }
}

#[async_trait]
impl PosBackend for ScriptedBackend {
    async fn login(&self, credential: &Credential) -> Result<BackendReply, TransportError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.usernames
            .lock()
            .expect("script mutex poisoned")
            .push(credential.username.clone());
        if let Some(delay) = self.login_delay {
            tokio::time::sleep(delay).await;
        }
        Self::next(&self.login_replies)
    }

    async fn create_order(
        &self,
        bearer: &str,
        _order: &Order,
    ) -> Result<BackendReply, TransportError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        self.bearers
            .lock()
            .expect("script mutex poisoned")
            .push(bearer.to_string());
        Self::next(&self.order_replies)
    }

    async fn fetch_report(
        &self,
        bearer: &str,
        query: &ReportQuery,
    ) -> Result<BackendReply, TransportError> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        self.bearers
            .lock()
            .expect("script mutex poisoned")
            .push(bearer.to_string());
        self.queries.lock().expect("script mutex poisoned").push(*query);
        Self::next(&self.report_replies)
    }
}

// Status sink that keeps every record for assertions.
#[derive(Default)]
pub(crate) struct RecordingStatus {
    records: Mutex<Vec<(String, bool)>>,
}

impl RecordingStatus {
    pub(crate) fn records(&self) -> Vec<(String, bool)> {
        self.records.lock().expect("status mutex poisoned").clone()
    }

    pub(crate) fn failures(&self) -> usize {
        self.records().iter().filter(|(_, ok)| !ok).count()
    }
}

impl StatusSink for RecordingStatus {
    fn record(&self, message: &str, succeeded: bool) {
        self.records
            .lock()
            .expect("status mutex poisoned")
            .push((message.to_string(), succeeded));
    }
}
