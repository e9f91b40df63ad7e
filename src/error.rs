//! Error types for command-protocol calls.
//!
//! Failures fall into four groups: configuration mistakes made while building
//! a client or a request, transport failures below HTTP, protocol violations
//! where the server answered successfully but broke the media-type contract,
//! and the structured errors derived from a failure status code.

use http::StatusCode;

/// The main error type for Ncryptyr client calls.
///
/// # Examples
///
/// ```no_run
/// use ncryptyr_client::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().api_key("secret").build()?;
///
/// match client.describe_account(None).await {
///     Ok(account) => println!("Account: {}", account.id),
///     Err(Error::Forbidden { message }) => eprintln!("Denied: {}", message),
///     Err(e) if e.is_protocol_violation() => eprintln!("Server broke contract: {}", e),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The client or a request was configured inconsistently.
    ///
    /// Raised for a second authentication scheme on one client, for a request
    /// that sets both parameters and a body, and for invalid header names or values.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A network-level error occurred (connection refused, DNS lookup, TLS).
    ///
    /// This wraps the underlying `reqwest::Error` and never carries an HTTP status.
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The base URL or a request path did not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The command could not be serialized to JSON.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// A successful response broke the declared media-type contract.
    ///
    /// Content-type mismatches, a `204 No Content` where a body was declared,
    /// and a `null` body where a value was expected all end up here.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// A successful response body could not be deserialized into the expected type.
    ///
    /// This is a protocol violation that keeps the raw body for debugging.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The server answered `400 Bad Request`.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Message from the error body, or the reason phrase
        message: String,
    },

    /// The server answered `404 Not Found`.
    #[error("Not found: {message}")]
    NotFound {
        /// Message from the error body, or the reason phrase
        message: String,
    },

    /// The server answered `403 Forbidden`.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Message from the error body, or the reason phrase
        message: String,
    },

    /// The server answered `500 Internal Server Error`.
    #[error("Internal server error: {message}")]
    InternalError {
        /// Message from the error body, or the reason phrase
        message: String,
    },

    /// The server answered with any other failure status.
    #[error("HTTP error {status}: {message}")]
    Unclassified {
        /// The HTTP status code
        status: StatusCode,
        /// Message from the error body, or the reason phrase
        message: String,
    },
}

impl Error {
    /// Maps a failure status code and its resolved message to a structured error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ncryptyr_client::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::from_status(StatusCode::NOT_FOUND, "no such key");
    /// assert!(matches!(err, Error::NotFound { .. }));
    ///
    /// let err = Error::from_status(StatusCode::CONFLICT, "Conflict");
    /// assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    /// ```
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::BAD_REQUEST => Error::BadRequest { message },
            StatusCode::NOT_FOUND => Error::NotFound { message },
            StatusCode::FORBIDDEN => Error::Forbidden { message },
            StatusCode::INTERNAL_SERVER_ERROR => Error::InternalError { message },
            status => Error::Unclassified { status, message },
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::BadRequest { .. } => Some(StatusCode::BAD_REQUEST),
            Error::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Error::Forbidden { .. } => Some(StatusCode::FORBIDDEN),
            Error::InternalError { .. } => Some(StatusCode::INTERNAL_SERVER_ERROR),
            Error::Unclassified { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the resolved server message for structured errors.
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::BadRequest { message }
            | Error::NotFound { message }
            | Error::Forbidden { message }
            | Error::InternalError { message }
            | Error::Unclassified { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns `true` for errors derived from a failure status code.
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            Error::BadRequest { .. }
                | Error::NotFound { .. }
                | Error::Forbidden { .. }
                | Error::InternalError { .. }
                | Error::Unclassified { .. }
        )
    }

    /// Returns `true` when a successful response broke the media-type contract.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Error::ProtocolViolation(_) | Error::DeserializationFailed { .. }
        )
    }

    /// Returns `true` for mistakes made while configuring a client or request.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_) | Error::InvalidUrl(_) | Error::SerializationFailed(_)
        )
    }
}

/// A specialized `Result` type for Ncryptyr client calls.
///
/// This is a convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
