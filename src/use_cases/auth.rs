use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::domain::{
    AccessToken, BackendReply, ClientError, Clock, Credential, Failure, PosBackend, StatusSink,
    TokenState, TransportError,
};

/// Client-side lifetime of a token: the backend issues for 60 minutes, we trust 59.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(59 * 60);

// Success body of the login endpoint.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

// Mutable auth state. `generation` advances once per completed login attempt.
// `last_failure` only holds failures of default-credential logins, the only
// outcome queued guard callers may share.
#[derive(Default)]
struct Session {
    tokens: TokenState,
    generation: u64,
    last_failure: Option<ClientError>,
}

/// Acquires, caches and refreshes the bearer token for one backend.
///
/// The token is only ever written here. Logins are serialized: concurrent
/// [`AuthClient::ensure_authenticated`] callers share one in-flight login
/// and all observe its outcome.
pub struct AuthClient {
    backend: Arc<dyn PosBackend>,
    clock: Arc<dyn Clock>,
    status: Arc<dyn StatusSink>,
    default_credential: Credential,
    ttl: Duration,
    session: Mutex<Session>,
    login_gate: Mutex<()>,
}

impl AuthClient {
    pub fn new(
        backend: Arc<dyn PosBackend>,
        clock: Arc<dyn Clock>,
        status: Arc<dyn StatusSink>,
        default_credential: Credential,
    ) -> Self {
        Self {
            backend,
            clock,
            status,
            default_credential,
            ttl: DEFAULT_TOKEN_TTL,
            session: Mutex::new(Session::default()),
            login_gate: Mutex::new(()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Exchange `credential` for a token and cache it.
    ///
    /// On failure the cached token is left untouched, so a token that is
    /// still valid keeps working.
    pub async fn login(&self, credential: &Credential) -> Result<AccessToken, ClientError> {
        let _gate = self.login_gate.lock().await;
        self.login_locked(credential, false).await
    }

    /// Return a valid token, logging in with the default credential only when needed.
    ///
    /// A cached token that is found expired is cleared before re-authenticating,
    /// so a failed re-login leaves no token behind.
    #[tracing::instrument(name = "ensure_authenticated", skip_all)]
    pub async fn ensure_authenticated(&self) -> Result<AccessToken, ClientError> {
        let observed = {
            let mut session = self.session.lock().await;
            let now = self.clock.now_epoch_seconds();
            if let Some(token) = session.tokens.valid_at(now) {
                return Ok(token.clone());
            }
            if session.tokens.current().is_some() {
                tracing::debug!("cached token expired.");
                session.tokens.clear();
            }
            session.generation
        };

        let _gate = self.login_gate.lock().await;

        // Another caller finished a login while we waited; share its outcome.
        {
            let session = self.session.lock().await;
            if session.generation != observed {
                let now = self.clock.now_epoch_seconds();
                if let Some(token) = session.tokens.valid_at(now) {
                    return Ok(token.clone());
                }
                if let Some(err) = &session.last_failure {
                    return Err(err.clone());
                }
            }
        }

        self.status
            .record("Token invalid or missing, authenticating...", false);
        let credential = self.default_credential.clone();
        self.login_locked(&credential, true).await
    }

    /// Drop the cached token. The next guarded operation logs in again.
    pub async fn logout(&self) {
        let mut session = self.session.lock().await;
        session.tokens.clear();
        tracing::info!("token cleared.");
    }

    /// Snapshot of the cached token, valid or not.
    pub async fn current_token(&self) -> Option<AccessToken> {
        self.session.lock().await.tokens.current().cloned()
    }

    /// Validity predicate against the injected clock.
    pub async fn is_authenticated(&self) -> bool {
        let now = self.clock.now_epoch_seconds();
        self.session.lock().await.tokens.is_valid(now)
    }

    // Caller must hold `login_gate`. `shared` marks a default-credential login
    // whose failure queued guard callers adopt.
    #[tracing::instrument(name = "login", skip_all, fields(username = %credential.username))]
    async fn login_locked(
        &self,
        credential: &Credential,
        shared: bool,
    ) -> Result<AccessToken, ClientError> {
        self.status
            .record(&format!("Attempting to login as {}...", credential.username), true);

        let outcome = token_from_reply(self.backend.login(credential).await);

        let mut session = self.session.lock().await;
        session.generation += 1;
        match outcome {
            Ok(value) => {
                let issued_at = self.clock.now_epoch_seconds();
                let token = session.tokens.set(value, issued_at, self.ttl).clone();
                session.last_failure = None;
                self.status.record(
                    &format!("Login successful. Token: {}...", token.preview()),
                    true,
                );
                Ok(token)
            }
            Err(err) => {
                session.last_failure = shared.then(|| err.clone());
                self.status.record(&format!("Login failed: {err}"), false);
                Err(err)
            }
        }
    }
}

fn token_from_reply(reply: Result<BackendReply, TransportError>) -> Result<String, ClientError> {
    let reply = reply.map_err(|err| ClientError::Authentication(Failure::transport(&err)))?;

    // Keep the raw body so callers can see why the backend refused.
    if !reply.is_success() {
        return Err(ClientError::Authentication(Failure::status(
            reply.status,
            reply.body,
        )));
    }

    let parsed = serde_json::from_str::<LoginResponse>(&reply.body).map_err(|err| {
        ClientError::Authentication(Failure::status(
            reply.status,
            format!("malformed login response: {err}"),
        ))
    })?;

    if parsed.access_token.is_empty() {
        return Err(ClientError::Authentication(Failure::status(
            reply.status,
            "login response carried an empty access_token",
        )));
    }
    if let Some(kind) = parsed.token_type.as_deref() {
        if !kind.eq_ignore_ascii_case("bearer") {
            tracing::warn!(token_type = %kind, "unexpected token type; sending as bearer.");
        }
    }

    Ok(parsed.access_token)
}
