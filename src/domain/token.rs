use std::fmt;
use std::time::Duration;

// Number of token characters that may appear in logs.
const PREVIEW_CHARS: usize = 20;

/// Bearer token issued by the backend plus the client-side expiry window.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    issued_at: u64,
    expires_at: u64,
}

impl AccessToken {
    /// Raw bearer value for the `Authorization` header.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Epoch seconds at which the token was stored.
    pub fn issued_at(&self) -> u64 {
        self.issued_at
    }

    /// Epoch seconds at which the client stops trusting the token.
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// True while the token has a value and `now` is before the expiry.
    pub fn is_valid_at(&self, now: u64) -> bool {
        !self.value.is_empty() && now < self.expires_at
    }

    /// Leading characters of the token, safe to log.
    pub fn preview(&self) -> &str {
        match self.value.char_indices().nth(PREVIEW_CHARS) {
            Some((idx, _)) => &self.value[..idx],
            None => &self.value,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &format_args!("{}...", self.preview()))
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Cached credential state owned by a single auth client.
///
/// Holds at most one token. No I/O happens here; callers supply the time.
#[derive(Debug, Default)]
pub struct TokenState {
    current: Option<AccessToken>,
}

impl TokenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly issued token expiring `ttl` after `issued_at`.
    pub fn set(&mut self, value: impl Into<String>, issued_at: u64, ttl: Duration) -> &AccessToken {
        // expires_at must stay strictly after issued_at.
        let expires_at = issued_at.saturating_add(ttl.as_secs().max(1));
        self.current.insert(AccessToken {
            value: value.into(),
            issued_at,
            expires_at,
        })
    }

    pub fn is_valid(&self, now: u64) -> bool {
        self.valid_at(now).is_some()
    }

    /// The cached token if it is still valid at `now`.
    pub fn valid_at(&self, now: u64) -> Option<&AccessToken> {
        self.current.as_ref().filter(|token| token.is_valid_at(now))
    }

    /// The cached token regardless of validity.
    pub fn current(&self) -> Option<&AccessToken> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
