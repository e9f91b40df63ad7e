//! Command dispatcher and the Ncryptyr operation catalog.
//!
//! The [`Client`] type is the main entry point for calling the service.
//! Use [`ClientBuilder`] to configure and create clients.

use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::config::{ClientConfig, DEFAULT_USER_AGENT};
use crate::content_type::Operation;
use crate::endpoint::Endpoint;
use crate::request::{header_pair, Headers};
use crate::transport::Transport;
use crate::types::*;
use crate::{classify, Error, HttpResponse, Result};

/// Header naming the key an `encrypt` call uses.
pub const ENCRYPTION_KEY_HEADER: &str = "Encryption-Key";

const COMMAND_PATH: &str = "/";
const ENCRYPT_PATH: &str = "/encrypt";
const DECRYPT_PATH: &str = "/decrypt";

/// A client for the Ncryptyr key-management service.
///
/// Every command is a JSON POST to `/` whose media type names the operation.
/// Calls take `&self` and keep all request state local, so one client can
/// serve concurrent calls. Setting credentials needs `&mut self`.
///
/// # Examples
///
/// ```no_run
/// use ncryptyr_client::{Client, types::{Contact, EnrollCommand}};
///
/// # async fn example() -> Result<(), ncryptyr_client::Error> {
/// let mut client = Client::builder().build()?;
///
/// let enrolled = client
///     .enroll(&EnrollCommand {
///         id: "acme".to_string(),
///         contact: Contact {
///             name: "Acme Ops".to_string(),
///             email: "ops@acme.example".to_string(),
///         },
///     })
///     .await?;
/// client.set_api_key(&enrolled.api_key.secret)?;
///
/// let ciphertext = client.encrypt("master-key", "hello").await?;
/// let plaintext = client.decrypt(&ciphertext).await?;
/// assert_eq!(plaintext, "hello");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: Endpoint,
    transport: Transport,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Builds a client from `NCRYPTYR_BASE_URL` and `NCRYPTYR_API_KEY`.
    pub fn from_env() -> Result<Client> {
        ClientBuilder::new().build()
    }

    /// The endpoint configuration requests are built from.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The base URL of the service.
    pub fn base_url(&self) -> &Url {
        self.endpoint.base_url()
    }

    /// Authenticates later calls with an API key secret.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a credential is already set.
    pub fn set_api_key(&mut self, secret: &str) -> Result<()> {
        self.endpoint.set_api_key(secret)
    }

    /// Authenticates later calls with a bearer access token.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a credential is already set.
    pub fn set_access_token(&mut self, access_token: &str) -> Result<()> {
        self.endpoint.set_access_token(access_token)
    }

    /// Sends a command and deserializes its typed result.
    ///
    /// The command is serialized as `request_content_type`; when
    /// `expected_content_type` is given the response must carry it.
    pub async fn execute<C, R>(
        &self,
        command: &C,
        auth_required: bool,
        request_content_type: &str,
        expected_content_type: Option<&str>,
    ) -> Result<R>
    where
        C: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .send_json(command, auth_required, request_content_type)
            .await?;
        classify::json(&response, expected_content_type)
    }

    /// Sends a command that returns no body.
    pub async fn execute_void<C>(
        &self,
        command: &C,
        auth_required: bool,
        request_content_type: &str,
        expected_content_type: Option<&str>,
    ) -> Result<()>
    where
        C: Serialize + ?Sized,
    {
        let response = self
            .send_json(command, auth_required, request_content_type)
            .await?;
        classify::empty(&response, expected_content_type)
    }

    async fn send_json<C>(
        &self,
        command: &C,
        auth_required: bool,
        content_type: &str,
    ) -> Result<HttpResponse>
    where
        C: Serialize + ?Sized,
    {
        let request = self
            .endpoint
            .request(COMMAND_PATH)
            .require_auth(auth_required)
            .post()
            .with_json_body(command, content_type)?
            .build()?;

        self.transport.send(&request).await
    }

    /// Sends `command` as `operation`, using its registered media types and auth rule.
    pub async fn send_command<C, R>(&self, operation: Operation, command: &C) -> Result<R>
    where
        C: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let types = operation.media_types();
        tracing::debug!(operation = %operation, "Dispatching command");
        self.execute(command, operation.requires_auth(), types.request, types.response)
            .await
    }

    /// Sends a command registered without a response type.
    pub async fn send_void_command<C>(&self, operation: Operation, command: &C) -> Result<()>
    where
        C: Serialize + ?Sized,
    {
        let types = operation.media_types();
        tracing::debug!(operation = %operation, "Dispatching command");
        self.execute_void(command, operation.requires_auth(), types.request, types.response)
            .await
    }

    /// Encrypts `plaintext` with the key named `encryption_key_id`.
    ///
    /// The payload travels as opaque text; the returned ciphertext is opaque too.
    pub async fn encrypt(&self, encryption_key_id: &str, plaintext: &str) -> Result<String> {
        let request = self
            .endpoint
            .request(ENCRYPT_PATH)
            .with_header(ENCRYPTION_KEY_HEADER, encryption_key_id)?
            .require_auth(true)
            .post()
            .with_text_body(plaintext, None)?
            .build()?;

        let response = self.transport.send(&request).await?;
        classify::text(&response)
    }

    /// Decrypts ciphertext produced by [`encrypt`](Self::encrypt).
    pub async fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let request = self
            .endpoint
            .request(DECRYPT_PATH)
            .require_auth(true)
            .post()
            .with_text_body(ciphertext, None)?
            .build()?;

        let response = self.transport.send(&request).await?;
        classify::text(&response)
    }

    /// Creates an account. The only call that runs without credentials.
    pub async fn enroll(&self, command: &EnrollCommand) -> Result<EnrollCommandOutput> {
        self.send_command(Operation::Enroll, command).await
    }

    /// Describes the caller's account, or the one named by the command.
    pub async fn describe_account(&self, command: Option<&DescribeAccountCommand>) -> Result<Account> {
        let default = DescribeAccountCommand::default();
        self.send_command(Operation::DescribeAccount, command.unwrap_or(&default))
            .await
    }

    /// Lists the accounts visible to the caller.
    pub async fn list_accounts(
        &self,
        command: Option<&ListAccountsCommand>,
    ) -> Result<ListAccountsCommandOutput> {
        let default = ListAccountsCommand::default();
        self.send_command(Operation::ListAccounts, command.unwrap_or(&default))
            .await
    }

    /// Updates the contact details of an account.
    pub async fn update_account(&self, command: &UpdateAccountCommand) -> Result<Account> {
        self.send_command(Operation::UpdateAccount, command).await
    }

    /// Deletes an account.
    pub async fn delete_account(&self, command: &DeleteAccountCommand) -> Result<()> {
        self.send_void_command(Operation::DeleteAccount, command).await
    }

    /// Creates an API key. The secret is only ever returned here.
    pub async fn create_api_key(&self, command: &CreateApiKeyCommand) -> Result<ApiKeyWithSecret> {
        self.send_command(Operation::CreateApiKey, command).await
    }

    /// Lists API keys, without their secrets.
    pub async fn list_api_keys(&self, command: Option<&ListApiKeysCommand>) -> Result<Vec<ApiKey>> {
        let default = ListApiKeysCommand::default();
        self.send_command(Operation::ListApiKeys, command.unwrap_or(&default))
            .await
    }

    /// Deletes an API key.
    pub async fn delete_api_key(&self, command: &DeleteApiKeyCommand) -> Result<()> {
        self.send_void_command(Operation::DeleteApiKey, command).await
    }

    /// Creates an encryption key.
    pub async fn create_encryption_key(
        &self,
        command: &CreateEncryptionKeyCommand,
    ) -> Result<EncryptionKey> {
        self.send_command(Operation::CreateEncryptionKey, command).await
    }

    /// Describes one encryption key.
    pub async fn describe_encryption_key(
        &self,
        command: &DescribeEncryptionKeyCommand,
    ) -> Result<EncryptionKey> {
        self.send_command(Operation::DescribeEncryptionKey, command).await
    }

    /// Exports the key material of an encryption key.
    pub async fn export_encryption_key(
        &self,
        command: &ExportEncryptionKeyCommand,
    ) -> Result<EncryptionKeyExport> {
        self.send_command(Operation::ExportEncryptionKey, command).await
    }

    /// Lists encryption keys.
    pub async fn list_encryption_keys(
        &self,
        command: Option<&ListEncryptionKeysCommand>,
    ) -> Result<Vec<EncryptionKey>> {
        let default = ListEncryptionKeysCommand::default();
        self.send_command(Operation::ListEncryptionKeys, command.unwrap_or(&default))
            .await
    }

    /// Deletes an encryption key.
    pub async fn delete_encryption_key(&self, command: &DeleteEncryptionKeyCommand) -> Result<()> {
        self.send_void_command(Operation::DeleteEncryptionKey, command).await
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// Explicit values win over `NCRYPTYR_BASE_URL` and `NCRYPTYR_API_KEY`,
/// which win over the default base URL. An API key from the environment is
/// used only when no credential was given explicitly. Call
/// [`without_environment`](Self::without_environment) to ignore the
/// environment.
///
/// # Examples
///
/// ```no_run
/// use ncryptyr_client::ClientBuilder;
///
/// # fn example() -> Result<(), ncryptyr_client::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://api-stage.ncryptyr.com")
///     .api_key("secret")
///     .user_agent("my-app/1.0")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    config: ClientConfig,
    access_token: Option<String>,
    user_agent: String,
    default_headers: Headers,
    use_environment: bool,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            access_token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: Headers::new(),
            use_environment: true,
        }
    }

    /// Sets the base URL. Blank values are ignored.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Authenticates with an API key secret.
    pub fn api_key(mut self, secret: impl Into<String>) -> Self {
        self.config.api_key = Some(secret.into());
        self
    }

    /// Authenticates with a bearer access token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = header_pair(name.as_ref(), value.as_ref())?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Stops `NCRYPTYR_BASE_URL` and `NCRYPTYR_API_KEY` from filling unset values.
    pub fn without_environment(mut self) -> Self {
        self.use_environment = false;
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid, if both an API key and an
    /// access token were given, or if the HTTP client cannot be created.
    pub fn build(self) -> Result<Client> {
        self.build_with(ClientConfig::from_env)
    }

    fn build_with(self, environment: impl FnOnce() -> ClientConfig) -> Result<Client> {
        let explicit_api_key = self
            .config
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        let fallback = if self.use_environment {
            environment()
        } else {
            ClientConfig::default()
        };
        let mut config = self.config.or(fallback);

        if self.access_token.is_some() {
            if explicit_api_key {
                return Err(Error::Configuration(
                    "Only one of api_key and access_token may be set".to_string(),
                ));
            }
            config.api_key = None;
        }

        let base_url = Url::parse(config.resolved_base_url())?;
        let mut endpoint = Endpoint::new(base_url.clone());
        endpoint.set_user_agent(&self.user_agent)?;
        for (name, value) in self.default_headers {
            if let Some(name) = name {
                endpoint.insert_common_header(name, value);
            }
        }

        if let Some(api_key) = &config.api_key {
            endpoint.set_api_key(api_key)?;
        }
        if let Some(token) = &self.access_token {
            endpoint.set_access_token(token)?;
        }

        Ok(Client {
            endpoint,
            transport: Transport::new(base_url)?,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
