//! Request descriptors and the builders that assemble them.
//!
//! A request starts from [`Endpoint::request`](crate::endpoint::Endpoint::request),
//! which copies the endpoint's common headers. It then switches into a GET
//! builder that collects query parameters or a POST builder that carries either
//! parameters or a body, never both.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{Error, Result};

/// Named header mapping.
pub type Headers = HeaderMap;

/// Named parameter mapping. Ordered so query strings are deterministic.
pub type Parameters = BTreeMap<String, String>;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain";

/// Parses a header pair, reporting invalid input as a configuration error.
pub(crate) fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let name = HeaderName::try_from(name)
        .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
    let value = HeaderValue::try_from(value)
        .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
    Ok((name, value))
}

/// A request payload together with the content type it travels as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Serialized JSON.
    Json {
        content: Bytes,
        content_type: String,
    },
    /// Opaque UTF-8 text.
    Text {
        content: Bytes,
        content_type: String,
    },
}

impl Body {
    /// The payload as sent on the wire. Cloning it is cheap.
    pub fn content(&self) -> &Bytes {
        match self {
            Body::Json { content, .. } | Body::Text { content, .. } => content,
        }
    }

    /// The `Content-Type` the payload is sent with.
    pub fn content_type(&self) -> &str {
        match self {
            Body::Json { content_type, .. } | Body::Text { content_type, .. } => content_type,
        }
    }
}

/// An immutable, fully merged HTTP request ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    headers: Headers,
    query: Parameters,
    body: Option<Body>,
}

impl RequestDescriptor {
    /// The HTTP method, GET or POST.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request path, appended to the endpoint's base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Headers after the common, auth and per-call merge.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Query parameters. Empty for POST requests.
    pub fn query(&self) -> &Parameters {
        &self.query
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }
}

/// Builder for the method-independent part of a request.
///
/// Headers merge in a fixed order no matter how calls are chained: common
/// headers, then auth headers when [`require_auth`](Self::require_auth) is on,
/// then per-call overrides from [`with_header`](Self::with_header).
///
/// # Examples
///
/// ```
/// use ncryptyr_client::endpoint::Endpoint;
///
/// # fn example() -> Result<(), ncryptyr_client::Error> {
/// let mut endpoint = Endpoint::new("https://api.ncryptyr.com".parse()?);
/// endpoint.set_api_key("secret")?;
///
/// let request = endpoint
///     .request("/encrypt")
///     .require_auth(true)
///     .with_header("Encryption-Key", "KeyA")?
///     .post()
///     .with_text_body("hello", None)?
///     .build()?;
///
/// assert_eq!(request.headers()["api-key"], "secret");
/// assert_eq!(request.body().unwrap().content(), "hello");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    path: String,
    common_headers: Headers,
    auth_headers: Headers,
    auth_required: bool,
    overrides: Headers,
}

impl RequestBuilder {
    pub(crate) fn new(path: impl Into<String>, common_headers: &Headers, auth_headers: &Headers) -> Self {
        Self {
            path: path.into(),
            common_headers: common_headers.clone(),
            auth_headers: auth_headers.clone(),
            auth_required: false,
            overrides: HeaderMap::new(),
        }
    }

    /// Sets whether the endpoint's auth headers are merged into the request.
    pub fn require_auth(mut self, required: bool) -> Self {
        self.auth_required = required;
        self
    }

    /// Adds or overwrites one header for this request only.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = header_pair(name.as_ref(), value.as_ref())?;
        self.overrides.insert(name, value);
        Ok(self)
    }

    /// Switches into a GET request.
    pub fn get(self) -> GetRequestBuilder {
        GetRequestBuilder {
            request: self,
            parameters: Parameters::new(),
        }
    }

    /// Switches into a POST request.
    pub fn post(self) -> PostRequestBuilder {
        PostRequestBuilder {
            request: self,
            parameters: Parameters::new(),
            body: None,
        }
    }

    fn merged_headers(&self) -> Headers {
        let mut headers = self.common_headers.clone();
        if self.auth_required {
            for (name, value) in &self.auth_headers {
                headers.insert(name.clone(), value.clone());
            }
        }
        for (name, value) in &self.overrides {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    fn into_descriptor(self, method: Method, query: Parameters, body: Option<Body>) -> RequestDescriptor {
        RequestDescriptor {
            headers: self.merged_headers(),
            method,
            path: self.path,
            query,
            body,
        }
    }
}

/// Inserts a parameter pair, dropping it when either side is absent.
fn insert_parameter(parameters: &mut Parameters, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !name.is_empty() {
            parameters.insert(name.to_string(), value.trim().to_string());
        }
    }
}

/// Builder for a GET request carrying query parameters.
#[derive(Debug, Clone)]
pub struct GetRequestBuilder {
    request: RequestBuilder,
    parameters: Parameters,
}

impl GetRequestBuilder {
    /// Adds a query parameter.
    ///
    /// Pairs with an absent value or an empty name are dropped, not sent
    /// empty. Values are trimmed.
    pub fn with_parameter(mut self, name: &str, value: Option<&str>) -> Self {
        insert_parameter(&mut self.parameters, name, value);
        self
    }

    /// Finishes the request.
    pub fn build(self) -> RequestDescriptor {
        self.request.into_descriptor(Method::GET, self.parameters, None)
    }
}

/// Builder for a POST request carrying either parameters or a body.
#[derive(Debug, Clone)]
pub struct PostRequestBuilder {
    request: RequestBuilder,
    parameters: Parameters,
    body: Option<Body>,
}

impl PostRequestBuilder {
    /// Adds a parameter, sent as a JSON object body.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a body was already set.
    pub fn with_parameter(mut self, name: &str, value: Option<&str>) -> Result<Self> {
        if self.body.is_some() {
            return Err(Error::Configuration(
                "Body already set; parameters and body are mutually exclusive".to_string(),
            ));
        }
        insert_parameter(&mut self.parameters, name, value);
        Ok(self)
    }

    /// Serializes `body` as JSON and sends it with `content_type`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if parameters were already set, or a
    /// serialization error if `body` cannot be encoded.
    pub fn with_json_body<T>(mut self, body: &T, content_type: &str) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        self.ensure_no_parameters()?;
        let content =
            serde_json::to_vec(body).map_err(|e| Error::SerializationFailed(e.to_string()))?;
        self.body = Some(Body::Json {
            content: Bytes::from(content),
            content_type: content_type.to_string(),
        });
        Ok(self)
    }

    /// Sends `body` as opaque text, `text/plain` unless a content type is given.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if parameters were already set.
    pub fn with_text_body(mut self, body: impl Into<String>, content_type: Option<&str>) -> Result<Self> {
        self.ensure_no_parameters()?;
        let content: String = body.into();
        self.body = Some(Body::Text {
            content: Bytes::from(content),
            content_type: content_type.unwrap_or(TEXT).to_string(),
        });
        Ok(self)
    }

    fn ensure_no_parameters(&self) -> Result<()> {
        if self.parameters.is_empty() {
            Ok(())
        } else {
            Err(Error::Configuration(
                "Parameters already set; parameters and body are mutually exclusive".to_string(),
            ))
        }
    }

    /// Finishes the request.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the parameters cannot be encoded.
    pub fn build(self) -> Result<RequestDescriptor> {
        let body = if self.parameters.is_empty() {
            self.body
        } else {
            let content = serde_json::to_vec(&self.parameters)
                .map_err(|e| Error::SerializationFailed(e.to_string()))?;
            Some(Body::Json {
                content: Bytes::from(content),
                content_type: JSON.to_string(),
            })
        };
        Ok(self
            .request
            .into_descriptor(Method::POST, Parameters::new(), body))
    }
}
