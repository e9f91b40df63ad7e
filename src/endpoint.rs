//! Endpoint configuration: base URL, common headers and credentials.

use http::header::{AUTHORIZATION, USER_AGENT};
use http::{HeaderName, HeaderValue};
use url::Url;

use crate::request::{header_pair, Headers, RequestBuilder};
use crate::{Error, Result};

/// Header carrying an API key secret.
pub const API_KEY_HEADER: &str = "Api-Key";

/// Where requests go and which headers they start from.
///
/// Common headers go on every request. Auth headers go only on requests that
/// ask for them, and at most one authentication scheme is ever set.
#[derive(Debug, Clone)]
pub struct Endpoint {
    base_url: Url,
    common_headers: Headers,
    auth_headers: Headers,
}

impl Endpoint {
    /// Creates an endpoint with no headers and no credentials.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            common_headers: Headers::new(),
            auth_headers: Headers::new(),
        }
    }

    /// The base URL request paths are appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Headers applied to every request.
    pub fn common_headers(&self) -> &Headers {
        &self.common_headers
    }

    /// Headers applied only to requests that require auth.
    pub fn auth_headers(&self) -> &Headers {
        &self.auth_headers
    }

    /// Returns `true` once an authentication scheme has been set.
    pub fn has_auth(&self) -> bool {
        !self.auth_headers.is_empty()
    }

    /// Adds or overwrites a header sent with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn set_common_header(&mut self, name: &str, value: &str) -> Result<()> {
        let (name, value) = header_pair(name, value)?;
        self.common_headers.insert(name, value);
        Ok(())
    }

    pub(crate) fn insert_common_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.common_headers.insert(name, value);
    }

    /// Sets the `User-Agent` sent with every request.
    pub fn set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        self.set_common_header(USER_AGENT.as_str(), user_agent)
    }

    /// Authenticates with an API key secret.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an authentication scheme is already set;
    /// the existing scheme is kept.
    pub fn set_api_key(&mut self, secret: &str) -> Result<()> {
        self.set_auth(API_KEY_HEADER, secret)
    }

    /// Authenticates with a bearer access token.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an authentication scheme is already set;
    /// the existing scheme is kept.
    pub fn set_access_token(&mut self, access_token: &str) -> Result<()> {
        self.set_auth(AUTHORIZATION.as_str(), &format!("Bearer {}", access_token))
    }

    fn set_auth(&mut self, name: &str, value: &str) -> Result<()> {
        if self.has_auth() {
            return Err(Error::Configuration(
                "Authentication method is already set".to_string(),
            ));
        }
        let (name, mut value): (_, HeaderValue) = header_pair(name, value)?;
        value.set_sensitive(true);
        self.auth_headers.insert(name, value);
        Ok(())
    }

    /// Starts a request to `path`, seeded with a copy of the common headers.
    pub fn request(&self, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(path, &self.common_headers, &self.auth_headers)
    }
}
