//! HTTP client for Azion's API.
//!
//! The [`Client`] type is the main entry point for making API calls.
//! Use [`ClientBuilder`] to configure and create clients.
//!
//! Every operation follows the same path: build a [`RequestMetadata`], execute
//! it to obtain a [`RawResponse`], then decode, hydrate or aggregate it.

use crate::{
    decode::{decode, decode_boolean},
    metadata::RequestMetadata,
    models::{hydrate, hydrate_many, Configuration, Origin, Token},
    multi_status::MultiStatus,
    payloads::{ConfigurationUpdate, NewConfiguration, NewOrigin, OriginUpdate, PurgeMethod, PurgeRequest},
    response::transport_error,
    Error, RawResponse, Result,
};
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// The production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.azion.net";

/// Environment variable read by [`ClientBuilder::token_from_env`].
pub const TOKEN_ENV_VAR: &str = "AZ_TOKEN";

const ACCEPT: &str = "application/json; version=1";
const USER_AGENT: &str = concat!("azion-rs/", env!("CARGO_PKG_VERSION"));

/// A client for Azion's content delivery API.
///
/// The client is designed to be reused across multiple requests. Cloning it is
/// cheap and clones share the same connection pool.
///
/// # Examples
///
/// ```no_run
/// use azion::{Client, NewConfiguration, PurgeMethod};
///
/// # async fn example() -> Result<(), azion::Error> {
/// let mut client = Client::builder().build()?;
///
/// let token = client.authorize("user@example.com", "secret").await?;
/// client.login(token.token);
///
/// let configuration = client
///     .create_configuration(&NewConfiguration::new(
///         "Dummy configuration",
///         "www.example.com",
///         "ww2.example.com",
///     ))
///     .await?;
/// println!("Created: {:?}", configuration);
///
/// let purge = client
///     .purge_url(["www.example.com/foo.jpg"], PurgeMethod::Delete)
///     .await?;
/// println!("Purged: {:?}", purge.succeeded_values());
/// println!("Rejected: {:?}", purge.failed_values());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Clone)]
struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Uses `token` for every subsequent request made through this client.
    ///
    /// Clones made before this call keep their previous token.
    pub fn login(&mut self, token: impl Into<String>) {
        Arc::make_mut(&mut self.inner).token = Some(token.into());
    }

    /// Returns `true` if the client has a token to authenticate with.
    pub fn is_authenticated(&self) -> bool {
        self.inner.token.is_some()
    }

    /// The base URL all request paths are appended to.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Executes a request and returns the materialized response.
    ///
    /// The status is not checked here. Pass the result to
    /// [`decode`](crate::decode()) or [`decode_boolean`](crate::decode_boolean).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use azion::{decode, metadata::RequestMetadata, Client};
    /// use http::{Method, StatusCode};
    ///
    /// # async fn example() -> Result<(), azion::Error> {
    /// let client = Client::builder().token("my-token").build()?;
    ///
    /// let metadata = RequestMetadata::new(Method::GET, "content_delivery/configurations");
    /// let response = client.execute::<()>(&metadata, None).await?;
    /// let payload = decode(Some(&response), StatusCode::OK)?;
    /// println!("{:?}", payload);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute<Req>(&self, metadata: &RequestMetadata, body: Option<&Req>) -> Result<RawResponse>
    where
        Req: Serialize,
    {
        let url = self.endpoint(metadata)?;

        tracing::debug!(
            method = %metadata.method,
            url = %url,
            "Executing HTTP request"
        );

        let mut request = self.inner.http_client.request(metadata.method.clone(), url);

        for (name, value) in &self.inner.default_headers {
            request = request.header(name, value);
        }

        if let Some((username, password)) = &metadata.basic_auth {
            request = request.basic_auth(username, Some(password));
        } else if let Some(token) = &self.inner.token {
            request = request.header(header::AUTHORIZATION, format!("token {}", token));
        }

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = body {
            let json = serde_json::to_value(body).map_err(|e| Error::SerializationFailed(e.to_string()))?;
            request = request.json(&json);
        }

        let start_time = Instant::now();
        let response = request.send().await.map_err(transport_error)?;
        let response = RawResponse::from_reqwest(response, start_time.elapsed()).await?;

        tracing::info!(
            method = %metadata.method,
            path = %metadata.path,
            status = response.status.as_u16(),
            latency_ms = response.latency.as_millis(),
            "Received HTTP response"
        );

        Ok(response)
    }

    /// Obtains a fresh token with a username and password.
    ///
    /// The returned token is not installed on the client, see [`Client::login`].
    pub async fn authorize(&self, username: &str, password: &str) -> Result<Token> {
        let metadata = RequestMetadata::new(Method::POST, "tokens").with_basic_auth(username, password);
        let token = self.fetch_one::<(), Token>(&metadata, None, StatusCode::CREATED).await?;
        token.ok_or_else(|| Error::malformed("Token", "empty token response"))
    }

    /// Retrieves a configuration.
    pub async fn get_configuration(&self, configuration_id: u64) -> Result<Option<Configuration>> {
        let metadata = RequestMetadata::new(Method::GET, configuration_path(configuration_id));
        self.fetch_one::<(), _>(&metadata, None, StatusCode::OK).await
    }

    /// Lists all configurations of the account.
    pub async fn list_configurations(&self) -> Result<Vec<Configuration>> {
        let metadata = RequestMetadata::new(Method::GET, "content_delivery/configurations");
        self.fetch_many(&metadata, StatusCode::OK).await
    }

    /// Creates a configuration.
    pub async fn create_configuration(&self, configuration: &NewConfiguration) -> Result<Option<Configuration>> {
        let metadata = RequestMetadata::new(Method::POST, "content_delivery/configurations");
        self.fetch_one(&metadata, Some(configuration), StatusCode::CREATED).await
    }

    /// Updates the given fields of a configuration, keeping the others.
    pub async fn partial_update_configuration(
        &self,
        configuration_id: u64,
        update: &ConfigurationUpdate,
    ) -> Result<Option<Configuration>> {
        let metadata = RequestMetadata::new(Method::PATCH, configuration_path(configuration_id));
        self.fetch_one(&metadata, Some(update), StatusCode::OK).await
    }

    /// Replaces a configuration. Fields left out are reset to their defaults.
    ///
    /// Consider [`Client::partial_update_configuration`] instead.
    pub async fn replace_configuration(
        &self,
        configuration_id: u64,
        update: &ConfigurationUpdate,
    ) -> Result<Option<Configuration>> {
        let metadata = RequestMetadata::new(Method::PUT, configuration_path(configuration_id));
        self.fetch_one(&metadata, Some(update), StatusCode::OK).await
    }

    /// Deletes a configuration. Returns `true` once the API confirms it.
    pub async fn delete_configuration(&self, configuration_id: u64) -> Result<bool> {
        let metadata = RequestMetadata::new(Method::DELETE, configuration_path(configuration_id));
        self.fetch_boolean::<()>(&metadata, None, StatusCode::NO_CONTENT).await
    }

    /// Lists the origins of a configuration.
    pub async fn list_origins(&self, configuration_id: u64) -> Result<Vec<Origin>> {
        let metadata = RequestMetadata::new(Method::GET, origins_path(configuration_id));
        self.fetch_many(&metadata, StatusCode::OK).await
    }

    /// Retrieves an origin of a configuration.
    pub async fn get_origin(&self, configuration_id: u64, origin_id: u64) -> Result<Option<Origin>> {
        let metadata = RequestMetadata::new(Method::GET, origin_path(configuration_id, origin_id));
        self.fetch_one::<(), _>(&metadata, None, StatusCode::OK).await
    }

    /// Adds an origin to a configuration.
    pub async fn create_origin(&self, configuration_id: u64, origin: &NewOrigin) -> Result<Option<Origin>> {
        let metadata = RequestMetadata::new(Method::POST, origins_path(configuration_id));
        self.fetch_one(&metadata, Some(origin), StatusCode::CREATED).await
    }

    /// Updates the given fields of an origin, keeping the others.
    pub async fn partial_update_origin(
        &self,
        configuration_id: u64,
        origin_id: u64,
        update: &OriginUpdate,
    ) -> Result<Option<Origin>> {
        let metadata = RequestMetadata::new(Method::PATCH, origin_path(configuration_id, origin_id));
        self.fetch_one(&metadata, Some(update), StatusCode::OK).await
    }

    /// Removes an origin from a configuration.
    pub async fn delete_origin(&self, configuration_id: u64, origin_id: u64) -> Result<bool> {
        let metadata = RequestMetadata::new(Method::DELETE, origin_path(configuration_id, origin_id));
        self.fetch_boolean::<()>(&metadata, None, StatusCode::NO_CONTENT).await
    }

    /// Purges the content of each URL.
    ///
    /// The API answers with a multi-status response: URLs of domains outside
    /// the account are reported as failed while the rest are purged.
    pub async fn purge_url<I, S>(&self, urls: I, method: PurgeMethod) -> Result<MultiStatus>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let metadata = RequestMetadata::new(Method::POST, "purge/url");
        let body = PurgeRequest {
            urls: urls.into_iter().map(Into::into).collect(),
            method,
        };

        let response = self.execute(&metadata, Some(&body)).await?;
        let payload = decode(Some(&response), StatusCode::MULTI_STATUS)?;
        MultiStatus::from_payload(payload, "urls")
    }

    /// Purges content by cache key (for example `www.example.com/@@cookie_name=foo`).
    pub async fn purge_cache_key<I, S>(&self, urls: I, method: PurgeMethod) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let metadata = RequestMetadata::new(Method::POST, "purge/cachekey");
        let body = PurgeRequest {
            urls: urls.into_iter().map(Into::into).collect(),
            method,
        };
        self.fetch_boolean(&metadata, Some(&body), StatusCode::CREATED).await
    }

    /// Purges every object matching a URL containing a wildcard (`*`).
    pub async fn purge_wildcard(&self, url: impl Into<String>, method: PurgeMethod) -> Result<bool> {
        let metadata = RequestMetadata::new(Method::POST, "purge/wildcard");
        let body = PurgeRequest {
            urls: vec![url.into()],
            method,
        };
        self.fetch_boolean(&metadata, Some(&body), StatusCode::CREATED).await
    }

    async fn fetch_one<Req, Res>(
        &self,
        metadata: &RequestMetadata,
        body: Option<&Req>,
        expected: StatusCode,
    ) -> Result<Option<Res>>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let response = self.execute(metadata, body).await?;
        hydrate(decode(Some(&response), expected)?)
    }

    async fn fetch_many<Res>(&self, metadata: &RequestMetadata, expected: StatusCode) -> Result<Vec<Res>>
    where
        Res: DeserializeOwned,
    {
        let response = self.execute::<()>(metadata, None).await?;
        hydrate_many(decode(Some(&response), expected)?)
    }

    async fn fetch_boolean<Req>(
        &self,
        metadata: &RequestMetadata,
        body: Option<&Req>,
        expected: StatusCode,
    ) -> Result<bool>
    where
        Req: Serialize,
    {
        let response = self.execute(metadata, body).await?;
        decode_boolean(Some(&response), expected)
    }

    fn endpoint(&self, metadata: &RequestMetadata) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::ConfigurationError(format!("Base URL cannot have a path: {}", self.inner.base_url)))?
            .pop_if_empty()
            .extend(metadata.segments());
        Ok(url)
    }
}

fn configuration_path(configuration_id: u64) -> String {
    format!("content_delivery/configurations/{}", configuration_id)
}

fn origins_path(configuration_id: u64) -> String {
    format!("{}/origins", configuration_path(configuration_id))
}

fn origin_path(configuration_id: u64, origin_id: u64) -> String {
    format!("{}/{}", origins_path(configuration_id), origin_id)
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use azion::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), azion::Error> {
/// let client = ClientBuilder::new()
///     .token_from_env()?
///     .timeout(Duration::from_secs(30))
///     .default_header("X-Request-Source", "deploy-script")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    default_headers: HeaderMap,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            default_headers: HeaderMap::new(),
            token: None,
            timeout: None,
        }
    }

    /// Sets the base URL for all requests. Defaults to [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Sets the token sent as `Authorization: token <token>`.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Reads the token from the [`TOKEN_ENV_VAR`] environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or empty.
    pub fn token_from_env(self) -> Result<Self> {
        match std::env::var(TOKEN_ENV_VAR) {
            Ok(token) if !token.trim().is_empty() => Ok(self.token(token.trim())),
            _ => Err(Error::ConfigurationError(format!(
                "{} is not set",
                TOKEN_ENV_VAR
            ))),
        }
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// Overrides the built-in header of the same name, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn build(self) -> Result<Client> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let http_client = reqwest::Client::builder().build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        default_headers.insert(header::ACCEPT_CHARSET, HeaderValue::from_static("utf-8"));
        default_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        for (name, value) in &self.default_headers {
            default_headers.insert(name.clone(), value.clone());
        }

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                default_headers,
                token: self.token,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
