// Wiring for a ready-to-use client against one backend.

use std::sync::Arc;

use crate::domain::{
    AccessToken, ClientError, Clock, Order, PersistedOrder, PosBackend, ReportQuery,
    ReportResult, StatusSink,
};
use crate::frameworks::config::{ClientConfig, ConfigError};
use crate::interface_adapters::{Endpoints, HttpBackend, StatusLogger, SystemClock};
use crate::use_cases::{AuthClient, OrderClient, ReportClient};

/// Auth, order and report clients sharing one token cache.
pub struct PosClient {
    auth: Arc<AuthClient>,
    orders: OrderClient,
    reports: ReportClient,
}

impl PosClient {
    /// HTTP client with the system clock and the tracing status log.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::connect_with(config, Arc::new(SystemClock), Arc::new(StatusLogger))
    }

    /// HTTP client with an injected clock and status sink.
    pub fn connect_with(
        config: &ClientConfig,
        clock: Arc<dyn Clock>,
        status: Arc<dyn StatusSink>,
    ) -> Result<Self, ConfigError> {
        let endpoints = Endpoints::new(&config.base_url, &config.api_prefix).map_err(|err| {
            ConfigError::Invalid {
                name: "base_url",
                reason: err.to_string(),
            }
        })?;
        tracing::debug!(login_url = %endpoints.login_url(), "backend endpoints resolved.");
        let backend =
            HttpBackend::new(endpoints, config.request_timeout).map_err(ConfigError::HttpClient)?;
        Ok(Self::from_parts(config, Arc::new(backend), clock, status))
    }

    /// Assemble the clients over any backend implementation.
    pub fn from_parts(
        config: &ClientConfig,
        backend: Arc<dyn PosBackend>,
        clock: Arc<dyn Clock>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        let auth = Arc::new(
            AuthClient::new(backend.clone(), clock, status.clone(), config.credential())
                .with_ttl(config.token_ttl),
        );
        let orders = OrderClient::new(auth.clone(), backend.clone(), status.clone());
        let reports = ReportClient::new(auth.clone(), backend, status);
        Self {
            auth,
            orders,
            reports,
        }
    }

    pub fn auth(&self) -> &Arc<AuthClient> {
        &self.auth
    }

    pub fn orders(&self) -> &OrderClient {
        &self.orders
    }

    pub fn reports(&self) -> &ReportClient {
        &self.reports
    }

    pub async fn ensure_authenticated(&self) -> Result<AccessToken, ClientError> {
        self.auth.ensure_authenticated().await
    }

    pub async fn submit_order(&self, order: &Order) -> Result<PersistedOrder, ClientError> {
        self.orders.submit(order).await
    }

    pub async fn fetch_report(&self, query: &ReportQuery) -> Result<ReportResult, ClientError> {
        self.reports.fetch(query).await
    }
}
