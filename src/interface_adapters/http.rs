// reqwest adapter for the point-of-sale backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use url::Url;

use crate::domain::{
    BackendReply, Credential, Order, PosBackend, ReportPeriod, ReportQuery, TransportError,
};
use crate::interface_adapters::protocol::LoginForm;

/// Normalize an API prefix to `/segment` form with no trailing slash.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Fully resolved endpoint URLs for one backend deployment.
#[derive(Debug, Clone)]
pub struct Endpoints {
    login: Url,
    orders: Url,
    daily: Url,
    weekly: Url,
    monthly: Url,
}

impl Endpoints {
    pub fn new(base_url: &Url, api_prefix: &str) -> Result<Self, url::ParseError> {
        let root = format!(
            "{}{}",
            base_url.as_str().trim_end_matches('/'),
            normalize_prefix(api_prefix)
        );
        let report = |period: ReportPeriod| Url::parse(&format!("{root}/analytics/reports/{period}"));
        Ok(Self {
            login: Url::parse(&format!("{root}/auth/login"))?,
            orders: Url::parse(&format!("{root}/orders/"))?,
            daily: report(ReportPeriod::Daily)?,
            weekly: report(ReportPeriod::Weekly)?,
            monthly: report(ReportPeriod::Monthly)?,
        })
    }

    pub fn login_url(&self) -> &Url {
        &self.login
    }

    pub fn orders_url(&self) -> &Url {
        &self.orders
    }

    /// Report URL with the query's date bounds as query parameters.
    pub fn report_url(&self, query: &ReportQuery) -> Url {
        let mut url = match query.period {
            ReportPeriod::Daily => self.daily.clone(),
            ReportPeriod::Weekly => self.weekly.clone(),
            ReportPeriod::Monthly => self.monthly.clone(),
        };
        let pairs = query.query_pairs();
        // query_pairs_mut would leave a bare `?` behind when there is nothing to add.
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }
}

// Thin reqwest client for the backend endpoints.
#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpBackend {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoints })
    }
}

#[async_trait]
impl PosBackend for HttpBackend {
    async fn login(&self, credential: &Credential) -> Result<BackendReply, TransportError> {
        let form = LoginForm {
            username: &credential.username,
            password: &credential.password,
        };
        let res = self
            .http
            .post(self.endpoints.login.clone())
            .form(&form)
            .send()
            .await
            .map_err(transport_error)?;
        read_reply(res).await
    }

    async fn create_order(
        &self,
        bearer: &str,
        order: &Order,
    ) -> Result<BackendReply, TransportError> {
        let res = self
            .http
            .post(self.endpoints.orders.clone())
            .bearer_auth(bearer)
            .json(order)
            .send()
            .await
            .map_err(transport_error)?;
        read_reply(res).await
    }

    async fn fetch_report(
        &self,
        bearer: &str,
        query: &ReportQuery,
    ) -> Result<BackendReply, TransportError> {
        let url = self.endpoints.report_url(query);
        tracing::debug!(%url, "requesting report.");
        let res = self
            .http
            .get(url)
            .bearer_auth(bearer)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;
        read_reply(res).await
    }
}

// Keep status and raw body; interpretation happens in the use cases.
async fn read_reply(res: reqwest::Response) -> Result<BackendReply, TransportError> {
    let status = res.status();
    let body = res.text().await.map_err(transport_error)?;
    Ok(BackendReply {
        status: status.as_u16(),
        reason: status.canonical_reason().map(str::to_string),
        body,
    })
}

fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::timed_out(err.to_string())
    } else {
        TransportError::new(err.to_string())
    }
}
