use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::domain::Credential;
use crate::interface_adapters::http::normalize_prefix;
use crate::use_cases::DEFAULT_TOKEN_TTL;

// Runtime/client constants.

pub const DEFAULT_BASE_URL: &str = "http://localhost:8088";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Environment variable naming the optional TOML config file.
pub const CONFIG_PATH_VAR: &str = "POS_CLIENT_CONFIG";

const BASE_URL_VAR: &str = "POS_BASE_URL";
const API_PREFIX_VAR: &str = "POS_API_PREFIX";
const USERNAME_VAR: &str = "POS_USERNAME";
const PASSWORD_VAR: &str = "POS_PASSWORD";
const TOKEN_TTL_VAR: &str = "POS_TOKEN_TTL_SECS";
const REQUEST_TIMEOUT_VAR: &str = "POS_REQUEST_TIMEOUT_MS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing setting {0}")]
    Missing(&'static str),
    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Optional settings read from a TOML file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub api_prefix: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token_ttl_secs: Option<u64>,
    pub request_timeout_ms: Option<u64>,
}

impl FileConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Everything needed to talk to one backend deployment.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub api_prefix: String,
    pub username: String,
    pub password: String,
    pub token_ttl: Duration,
    pub request_timeout: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_prefix", &self.api_prefix)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Config with default prefix, token ttl and request timeout.
    pub fn new(base_url: Url, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            username: username.into(),
            password: password.into(),
            token_ttl: DEFAULT_TOKEN_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_api_prefix(mut self, prefix: &str) -> Self {
        self.api_prefix = normalize_prefix(prefix);
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Default credential used for automatic re-authentication.
    pub fn credential(&self) -> Credential {
        Credential::new(self.username.clone(), self.password.clone())
    }

    /// Load from an optional TOML file, then let `POS_*` environment variables override it.
    ///
    /// The file comes from `path`, else from `POS_CLIENT_CONFIG`, else is skipped.
    pub fn from_env(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from));
        let file = match path {
            Some(path) => FileConfig::load(&path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Merge defaults, file values and looked-up overrides, then validate.
    pub fn resolve(
        file: FileConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let pick = |var: &str, from_file: Option<String>| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .or(from_file)
        };

        let raw_base = pick(BASE_URL_VAR, file.base_url).unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let base_url = parse_base_url(&raw_base)?;

        let api_prefix = normalize_prefix(
            &pick(API_PREFIX_VAR, file.api_prefix).unwrap_or_else(|| DEFAULT_API_PREFIX.into()),
        );

        let username = pick(USERNAME_VAR, file.username)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(USERNAME_VAR))?;
        let password = pick(PASSWORD_VAR, file.password)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing(PASSWORD_VAR))?;

        let number = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let ttl_secs = match number(TOKEN_TTL_VAR) {
            Some(raw) => parse_number(TOKEN_TTL_VAR, &raw)?,
            None => file.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL.as_secs()),
        };
        let timeout_ms = match number(REQUEST_TIMEOUT_VAR) {
            Some(raw) => parse_number(REQUEST_TIMEOUT_VAR, &raw)?,
            None => file
                .request_timeout_ms
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT.as_millis() as u64),
        };
        if ttl_secs == 0 {
            return Err(invalid(TOKEN_TTL_VAR, "must be greater than zero"));
        }
        if timeout_ms == 0 {
            return Err(invalid(REQUEST_TIMEOUT_VAR, "must be greater than zero"));
        }

        Ok(Self {
            base_url,
            api_prefix,
            username,
            password,
            token_ttl: Duration::from_secs(ttl_secs),
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|err| invalid(BASE_URL_VAR, err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(BASE_URL_VAR, format!("unsupported scheme {}", url.scheme())));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(BASE_URL_VAR, "must not carry a query or fragment"));
    }
    Ok(url)
}

fn parse_number(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|err| invalid(name, format!("{raw:?}: {err}")))
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.into(),
    }
}
