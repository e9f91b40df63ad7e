//! Versioned media types for every logical operation.
//!
//! Each command travels as a vendor media type such as
//! `application/vnd.ncryptyr.enroll.v1+json` and is answered with a matching
//! `-response` type. Operations that return nothing (the deletes) have no
//! response type.

use std::fmt;

/// The (request, response) media types of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaTypes {
    /// Content type sent with the command body.
    pub request: &'static str,
    /// Content type the server must answer with, or `None` when no body is expected.
    pub response: Option<&'static str>,
}

/// Every logical operation the service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Creates an account and its first API key.
    Enroll,
    /// Reads one account.
    DescribeAccount,
    /// Lists accounts.
    ListAccounts,
    /// Changes an account's contact.
    UpdateAccount,
    /// Removes an account.
    DeleteAccount,
    /// Issues an API key with its secret.
    CreateApiKey,
    /// Lists API keys.
    ListApiKeys,
    /// Revokes an API key.
    DeleteApiKey,
    /// Creates an encryption key.
    CreateEncryptionKey,
    /// Reads one encryption key.
    DescribeEncryptionKey,
    /// Exports key material.
    ExportEncryptionKey,
    /// Lists encryption keys.
    ListEncryptionKeys,
    /// Removes an encryption key.
    DeleteEncryptionKey,
}

impl Operation {
    /// All operations, in catalog order.
    pub const ALL: [Operation; 13] = [
        Operation::Enroll,
        Operation::DescribeAccount,
        Operation::ListAccounts,
        Operation::UpdateAccount,
        Operation::DeleteAccount,
        Operation::CreateApiKey,
        Operation::ListApiKeys,
        Operation::DeleteApiKey,
        Operation::CreateEncryptionKey,
        Operation::DescribeEncryptionKey,
        Operation::ExportEncryptionKey,
        Operation::ListEncryptionKeys,
        Operation::DeleteEncryptionKey,
    ];

    /// The logical name used inside the media type, e.g. `create-api-key`.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Enroll => "enroll",
            Operation::DescribeAccount => "describe-account",
            Operation::ListAccounts => "list-accounts",
            Operation::UpdateAccount => "update-account",
            Operation::DeleteAccount => "delete-account",
            Operation::CreateApiKey => "create-api-key",
            Operation::ListApiKeys => "list-api-keys",
            Operation::DeleteApiKey => "delete-api-key",
            Operation::CreateEncryptionKey => "create-encryption-key",
            Operation::DescribeEncryptionKey => "describe-encryption-key",
            Operation::ExportEncryptionKey => "export-encryption-key",
            Operation::ListEncryptionKeys => "list-encryption-keys",
            Operation::DeleteEncryptionKey => "delete-encryption-key",
        }
    }

    /// Finds an operation by its logical name.
    pub fn from_name(name: &str) -> Option<Operation> {
        Operation::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Whether the call must carry the client's credentials.
    ///
    /// Only enrollment runs before an account, and therefore a credential, exists.
    pub fn requires_auth(self) -> bool {
        !matches!(self, Operation::Enroll)
    }

    /// The media types registered for this operation.
    pub fn media_types(self) -> MediaTypes {
        use Operation::*;
        let (request, response) = match self {
            Enroll => (
                "application/vnd.ncryptyr.enroll.v1+json",
                Some("application/vnd.ncryptyr.enroll-response.v1+json"),
            ),
            DescribeAccount => (
                "application/vnd.ncryptyr.describe-account.v1+json",
                Some("application/vnd.ncryptyr.describe-account-response.v1+json"),
            ),
            ListAccounts => (
                "application/vnd.ncryptyr.list-accounts.v1+json",
                Some("application/vnd.ncryptyr.list-accounts-response.v1+json"),
            ),
            UpdateAccount => (
                "application/vnd.ncryptyr.update-account.v1+json",
                Some("application/vnd.ncryptyr.update-account-response.v1+json"),
            ),
            DeleteAccount => ("application/vnd.ncryptyr.delete-account.v1+json", None),
            CreateApiKey => (
                "application/vnd.ncryptyr.create-api-key.v1+json",
                Some("application/vnd.ncryptyr.create-api-key-response.v1+json"),
            ),
            ListApiKeys => (
                "application/vnd.ncryptyr.list-api-keys.v1+json",
                Some("application/vnd.ncryptyr.list-api-keys-response.v1+json"),
            ),
            DeleteApiKey => ("application/vnd.ncryptyr.delete-api-key.v1+json", None),
            CreateEncryptionKey => (
                "application/vnd.ncryptyr.create-encryption-key.v1+json",
                Some("application/vnd.ncryptyr.create-encryption-key-response.v1+json"),
            ),
            DescribeEncryptionKey => (
                "application/vnd.ncryptyr.describe-encryption-key.v1+json",
                Some("application/vnd.ncryptyr.describe-encryption-key-response.v1+json"),
            ),
            ExportEncryptionKey => (
                "application/vnd.ncryptyr.export-encryption-key.v1+json",
                Some("application/vnd.ncryptyr.export-encryption-key-response.v1+json"),
            ),
            ListEncryptionKeys => (
                "application/vnd.ncryptyr.list-encryption-keys.v1+json",
                Some("application/vnd.ncryptyr.list-encryption-keys-response.v1+json"),
            ),
            DeleteEncryptionKey => (
                "application/vnd.ncryptyr.delete-encryption-key.v1+json",
                None,
            ),
        };
        MediaTypes { request, response }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the media types registered for `operation`.
///
/// # Examples
///
/// ```
/// use ncryptyr_client::content_type::{lookup, Operation};
///
/// let types = lookup(Operation::DeleteApiKey);
/// assert_eq!(types.request, "application/vnd.ncryptyr.delete-api-key.v1+json");
/// assert!(types.response.is_none());
/// ```
pub fn lookup(operation: Operation) -> MediaTypes {
    operation.media_types()
}

/// Returns the media types registered under a logical operation name.
pub fn lookup_by_name(name: &str) -> Option<MediaTypes> {
    Operation::from_name(name).map(Operation::media_types)
}

/// Compares an expected response media type against the received `Content-Type`.
///
/// Only the essence before any `;` parameter is compared, trimmed and ASCII
/// case-insensitive, so `Application/JSON; charset=utf-8` matches
/// `application/json`.
pub fn media_type_matches(expected: &str, actual: &str) -> bool {
    essence(expected).eq_ignore_ascii_case(essence(actual))
}

fn essence(media_type: &str) -> &str {
    media_type
        .split_once(';')
        .map_or(media_type, |(essence, _)| essence)
        .trim()
}
