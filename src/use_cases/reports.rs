use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::{
    ClientError, Failure, PosBackend, ReportPeriod, ReportQuery, ReportResult, StatusSink,
};
use crate::use_cases::auth::AuthClient;

/// Retrieves aggregate sales reports.
pub struct ReportClient {
    auth: Arc<AuthClient>,
    backend: Arc<dyn PosBackend>,
    status: Arc<dyn StatusSink>,
}

impl ReportClient {
    pub fn new(
        auth: Arc<AuthClient>,
        backend: Arc<dyn PosBackend>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            auth,
            backend,
            status,
        }
    }

    /// Fetch one report, authenticating first if the cached token lapsed.
    #[tracing::instrument(
        name = "fetch_report",
        skip_all,
        fields(period = %query.period, start = ?query.start_date, end = ?query.end_date)
    )]
    pub async fn fetch(&self, query: &ReportQuery) -> Result<ReportResult, ClientError> {
        validate(query)?;

        let token = self.auth.ensure_authenticated().await.inspect_err(|err| {
            self.status
                .record(&format!("Cannot fetch {} report: {err}", query.period), false);
        })?;

        self.status
            .record(&format!("Fetching {} sales report...", query.period), true);
        let reply = self
            .backend
            .fetch_report(token.value(), query)
            .await
            .map_err(|err| ClientError::ReportFetch(Failure::transport(&err)))
            .inspect_err(|err| self.record_failure(query.period, err))?;

        if !reply.is_success() {
            tracing::warn!(status = reply.status, "report request rejected.");
            tracing::debug!(body = %body_excerpt(&reply.body), "rejected report body.");
            let detail = reply.reason.unwrap_or_default();
            let err = ClientError::ReportFetch(Failure::status(reply.status, detail));
            self.record_failure(query.period, &err);
            return Err(err);
        }

        let value = serde_json::from_str::<serde_json::Value>(&reply.body)
            .map_err(|err| {
                ClientError::ReportFetch(Failure::status(
                    reply.status,
                    format!("malformed report body: {err}"),
                ))
            })
            .inspect_err(|err| self.record_failure(query.period, err))?;

        let Some(result) = ReportResult::from_json(value) else {
            let err = ClientError::UnrecognizedReport {
                period: query.period,
                body: reply.body,
            };
            self.record_failure(query.period, &err);
            return Err(err);
        };

        self.status.record(
            &format!(
                "{} sales report retrieved successfully. Total orders: {}",
                query.period,
                result.total_orders()
            ),
            true,
        );
        Ok(result)
    }

    pub async fn daily(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<ReportResult, ClientError> {
        self.fetch(&ranged(ReportPeriod::Daily, range)).await
    }

    pub async fn weekly(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<ReportResult, ClientError> {
        self.fetch(&ranged(ReportPeriod::Weekly, range)).await
    }

    pub async fn monthly(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<ReportResult, ClientError> {
        self.fetch(&ranged(ReportPeriod::Monthly, range)).await
    }

    fn record_failure(&self, period: ReportPeriod, err: &ClientError) {
        self.status
            .record(&format!("Error fetching {period} sales report: {err}"), false);
    }
}

fn ranged(period: ReportPeriod, range: Option<(NaiveDate, NaiveDate)>) -> ReportQuery {
    let query = ReportQuery::new(period);
    match range {
        Some((start, end)) => query.between(start, end),
        None => query,
    }
}

// Error bodies can be whole HTML pages or stack traces; log only the head.
const LOGGED_BODY_CHARS: usize = 512;

fn body_excerpt(body: &str) -> &str {
    match body.char_indices().nth(LOGGED_BODY_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

// A lone bound is allowed; the backend fills the other side with its default window.
fn validate(query: &ReportQuery) -> Result<(), ClientError> {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(ClientError::InvalidQuery(format!(
                "start_date {start} is after end_date {end}"
            )));
        }
    }
    Ok(())
}
