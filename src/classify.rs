//! Turns normalized responses into typed results or structured errors.
//!
//! Classification never retries and never logs. Every failure goes back to
//! the caller as an [`Error`].

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::content_type::media_type_matches;
use crate::{Error, HttpResponse, Result};

#[derive(Deserialize)]
struct ErrorContent {
    message: Option<String>,
}

/// Builds the structured error for a failed response.
///
/// The message is the body's JSON `message` field when there is a non-empty
/// one, otherwise the reason phrase, otherwise `HTTP <code>`. A body that
/// fails to parse is ignored so the status always decides the error kind.
pub fn failure(response: &HttpResponse) -> Error {
    let message = serde_json::from_slice::<ErrorContent>(response.body())
        .ok()
        .and_then(|content| content.message)
        .filter(|message| !message.is_empty())
        .or_else(|| response.reason().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", response.status().as_u16()));

    Error::from_status(response.status(), message)
}

/// Fails with the structured error unless the response is a success.
pub fn ensure_success(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(failure(response))
    }
}

fn ensure_content_type(response: &HttpResponse, expected: &str) -> Result<()> {
    match response.content_type() {
        Some(actual) if media_type_matches(expected, actual) => Ok(()),
        actual => Err(Error::ProtocolViolation(format!(
            "Expected content type {} and received {}",
            expected,
            actual.unwrap_or("none")
        ))),
    }
}

/// Classifies a response that must carry a JSON body of type `T`.
///
/// # Errors
///
/// - A structured error for any failure status.
/// - [`Error::ProtocolViolation`] when `expected_content_type` is set and does
///   not match, when the status is `204 No Content`, or when the body is `null`.
/// - [`Error::DeserializationFailed`] when the body does not decode as `T`.
pub fn json<T>(response: &HttpResponse, expected_content_type: Option<&str>) -> Result<T>
where
    T: DeserializeOwned,
{
    ensure_success(response)?;

    if let Some(expected) = expected_content_type {
        ensure_content_type(response, expected)?;
    }

    if response.is_no_content() {
        return Err(Error::ProtocolViolation(format!(
            "Expected response type {} and received no response",
            std::any::type_name::<T>()
        )));
    }

    let value: serde_json::Value = response.json()?;
    if value.is_null() {
        return Err(Error::ProtocolViolation(format!(
            "Expected response type {} and received null",
            std::any::type_name::<T>()
        )));
    }

    serde_json::from_value(value).map_err(|e| Error::DeserializationFailed {
        raw_response: String::from_utf8_lossy(response.body()).into_owned(),
        serde_error: e.to_string(),
        status: response.status(),
    })
}

/// Classifies a response to a command that returns nothing.
///
/// The body is never read. A content type is checked only when one is declared.
pub fn empty(response: &HttpResponse, expected_content_type: Option<&str>) -> Result<()> {
    ensure_success(response)?;

    if let Some(expected) = expected_content_type {
        ensure_content_type(response, expected)?;
    }

    Ok(())
}

/// Classifies a response whose body is opaque text.
pub fn text(response: &HttpResponse) -> Result<String> {
    ensure_success(response)?;
    response.text()
}
