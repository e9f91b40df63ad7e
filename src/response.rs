//! Transport-agnostic view of an HTTP response.
//!
//! The [`HttpResponse`] type keeps the status, headers and body bytes of one
//! call. Decoding the body, as text or as JSON, happens only when asked.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// A normalized HTTP response.
///
/// Success means exactly `200 OK`, `201 Created` or `204 No Content`; every
/// other status, including other 2xx codes, is a failure.
///
/// # Examples
///
/// ```
/// use ncryptyr_client::HttpResponse;
/// use http::{HeaderMap, StatusCode};
///
/// let response = HttpResponse::new(StatusCode::NOT_FOUND, HeaderMap::new(), "");
///
/// assert!(!response.is_success());
/// assert_eq!(response.reason(), Some("Not Found"));
/// assert_eq!(response.content_type(), None);
///
/// let response = response.with_reason("Encryption Key Missing");
/// assert_eq!(response.reason(), Some("Encryption Key Missing"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    reason: Option<String>,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    ///
    /// This is typically called by the transport after the body has been read.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            reason: None,
            headers,
            body: body.into(),
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Records the reason phrase the server sent on the status line.
    ///
    /// Blank phrases are ignored.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if !reason.trim().is_empty() {
            self.reason = Some(reason);
        }
        self
    }

    /// The reason phrase from the status line.
    ///
    /// Falls back to the canonical phrase for the status code, and is `None`
    /// only for codes without one when the server sent none.
    pub fn reason(&self) -> Option<&str> {
        self.reason
            .as_deref()
            .or_else(|| self.status.canonical_reason())
    }

    /// Returns `true` for `200`, `201` and `204`.
    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT
        )
    }

    /// Returns `true` for `204 No Content`.
    pub fn is_no_content(&self) -> bool {
        self.status == StatusCode::NO_CONTENT
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value by name, if present and valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// The `Content-Type` header, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE)?.to_str().ok()
    }

    /// The raw body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decodes the body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| {
            Error::ProtocolViolation(format!("Response body is not valid UTF-8: {}", e))
        })
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`] with the raw body if decoding fails.
    pub fn json<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(&self.body).map_err(|e| Error::DeserializationFailed {
            raw_response: String::from_utf8_lossy(&self.body).into_owned(),
            serde_error: e.to_string(),
            status: self.status,
        })
    }
}
