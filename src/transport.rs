//! Sends request descriptors over HTTP.
//!
//! All transports share one `reqwest::Client` for the life of the process, so
//! every call draws from the same connection pool.

use http::header::CONTENT_TYPE;
use http::Method;
use std::sync::OnceLock;
use std::time::Instant;
use url::Url;

use crate::request::RequestDescriptor;
use crate::{Error, HttpResponse, Result};

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

fn shared_client() -> Result<reqwest::Client> {
    if let Some(client) = SHARED_CLIENT.get() {
        return Ok(client.clone());
    }
    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;
    Ok(SHARED_CLIENT.get_or_init(|| client).clone())
}

/// Performs HTTP calls against one base URL.
///
/// Holds no per-call state, so a single transport can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct Transport {
    http_client: reqwest::Client,
    base_url: Url,
}

impl Transport {
    /// Creates a transport for `base_url` on top of the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the shared client cannot be built.
    pub fn new(base_url: Url) -> Result<Self> {
        Ok(Self {
            http_client: shared_client()?,
            base_url,
        })
    }

    /// The base URL request paths are appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the full URL for a request: base URL, then path, then query.
    pub fn url_for(&self, request: &RequestDescriptor) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}{}", base, request.path()))?;

        if !request.query().is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in request.query() {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Sends a request and reads the whole response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when the call fails below HTTP. Failure
    /// statuses are not errors here; they come back as a normal response.
    pub async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse> {
        let url = self.url_for(request)?;
        let method: Method = request.method().clone();

        tracing::debug!(method = %method, url = %url, "Executing HTTP request");

        let start_time = Instant::now();
        let mut builder = self.http_client.request(method, url);

        // Content-Type belongs to the body, not to the header set.
        for (name, value) in request.headers() {
            if *name != CONTENT_TYPE {
                builder = builder.header(name, value);
            }
        }

        if let Some(body) = request.body() {
            builder = builder
                .header(CONTENT_TYPE, body.content_type())
                .body(body.content().clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let reason = response
            .extensions()
            .get::<hyper::ext::ReasonPhrase>()
            .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned());
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        tracing::debug!(
            status = status.as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "Received HTTP response"
        );

        let response = HttpResponse::new(status, headers, body);
        Ok(match reason {
            Some(reason) => response.with_reason(reason),
            None => response,
        })
    }
}
