//! Resolution of client configuration from explicit values and the environment.
//!
//! The environment is read in exactly one place, [`ClientConfig::from_env`].
//! Everything else in the crate works on already-resolved values.

/// Base URL used when neither an explicit value nor the environment supplies one.
pub const DEFAULT_BASE_URL: &str = "https://api.ncryptyr.com";

/// Environment variable overriding the base URL.
pub const BASE_URL_VAR: &str = "NCRYPTYR_BASE_URL";

/// Environment variable supplying a default API key.
pub const API_KEY_VAR: &str = "NCRYPTYR_API_KEY";

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = "ncryptyr-client";

/// Optional base URL and API key.
///
/// Blank values are treated as absent.
///
/// # Examples
///
/// ```
/// use ncryptyr_client::config::{ClientConfig, DEFAULT_BASE_URL};
///
/// let explicit = ClientConfig::default();
/// let env = ClientConfig::from_lookup(|var| match var {
///     "NCRYPTYR_API_KEY" => Some("from-env".to_string()),
///     _ => None,
/// });
///
/// let resolved = explicit.or(env);
/// assert_eq!(resolved.api_key.as_deref(), Some("from-env"));
/// assert_eq!(resolved.resolved_base_url(), DEFAULT_BASE_URL);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl ClientConfig {
    /// Reads `NCRYPTYR_BASE_URL` and `NCRYPTYR_API_KEY`.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            base_url: non_blank(lookup(BASE_URL_VAR)),
            api_key: non_blank(lookup(API_KEY_VAR)),
        }
    }

    /// Fills fields missing from `self` with those of `fallback`.
    pub fn or(self, fallback: ClientConfig) -> ClientConfig {
        ClientConfig {
            base_url: non_blank(self.base_url).or(fallback.base_url),
            api_key: non_blank(self.api_key).or(fallback.api_key),
        }
    }

    /// The base URL to use, falling back to [`DEFAULT_BASE_URL`].
    pub fn resolved_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
