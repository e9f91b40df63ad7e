//! # ncryptyr-client - A typed client for the Ncryptyr key-management service
//!
//! Every operation the service offers is a *command*: a JSON document POSTed
//! with a versioned vendor media type such as
//! `application/vnd.ncryptyr.create-encryption-key.v1+json`, answered by a
//! matching `-response` media type. This crate builds those requests, checks
//! that responses honour the declared media types, and turns failures into a
//! small set of structured errors.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ncryptyr_client::Client;
//! use ncryptyr_client::types::CreateEncryptionKeyCommand;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ncryptyr_client::Error> {
//!     // Base URL and API key from NCRYPTYR_BASE_URL / NCRYPTYR_API_KEY
//!     let client = Client::from_env()?;
//!
//!     let key = client
//!         .create_encryption_key(&CreateEncryptionKeyCommand {
//!             id: "orders".to_string(),
//!         })
//!         .await?;
//!     println!("Created {} key {}", key.key_type, key.id);
//!
//!     let ciphertext = client.encrypt("orders", "card 4111").await?;
//!     println!("Plaintext back: {}", client.decrypt(&ciphertext).await?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Layers
//!
//! - [`content_type`] - the registry of media types per operation
//! - [`endpoint`] and [`request`] - base URL, common and auth headers, and the
//!   builders producing immutable [`request::RequestDescriptor`]s
//! - [`transport`] - sends descriptors over one process-wide HTTP client
//! - [`classify`] - maps an [`HttpResponse`] to a typed value or an [`Error`]
//! - [`Client`] - drives the layers above for each command
//!
//! ## Error Handling
//!
//! ```no_run
//! use ncryptyr_client::{Client, Error};
//! use ncryptyr_client::types::DescribeEncryptionKeyCommand;
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::from_env()?;
//! let command = DescribeEncryptionKeyCommand { id: "orders".to_string() };
//! match client.describe_encryption_key(&command).await {
//!     Ok(key) => println!("Key created at {}", key.created_date),
//!     Err(Error::NotFound { message }) => eprintln!("No such key: {}", message),
//!     Err(Error::Transport(e)) => eprintln!("Network trouble: {}", e),
//!     Err(e) if e.is_protocol_violation() => eprintln!("Unexpected response: {}", e),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Nothing is retried. Retry policy belongs to the caller.

pub mod classify;
mod client;
pub mod config;
pub mod content_type;
pub mod endpoint;
mod error;
pub mod request;
mod response;
pub mod transport;
pub mod types;

pub use client::{Client, ClientBuilder, ENCRYPTION_KEY_HEADER};
pub use content_type::{MediaTypes, Operation};
pub use error::{Error, Result};
pub use response::HttpResponse;
