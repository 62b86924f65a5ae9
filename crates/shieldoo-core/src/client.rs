//! HTTP client for the Shieldoo `cliapi`.
//!
//! Requests are described by [`ApiRequest`] and executed by a [`Transport`].
//! The production transport is [`HttpTransport`], which signs every call and
//! returns the trimmed response body. [`ShieldooClient`] layers typed JSON
//! encoding and decoding on top of any transport.

use crate::auth::RequestSigner;
use crate::config::ProviderConfig;
use crate::mockup::MockupTransport;
use crate::types::{Entity, Group};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("shieldoo-core/", env!("CARGO_PKG_VERSION"));

/// Header carrying the signed request token.
pub const AUTH_TOKEN_HEADER: &str = "AuthToken";

/// Path prefix of the command line API.
pub const API_PREFIX: &str = "cliapi";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A single call against the API.
///
/// At most one of id and name is set; the constructors enforce it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    entity: Entity,
    id: Option<String>,
    name: Option<String>,
    body: Option<Value>,
}

impl ApiRequest {
    /// `GET <entity>`
    #[must_use]
    pub fn list(entity: Entity) -> Self {
        Self {
            method: Method::GET,
            entity,
            id: None,
            name: None,
            body: None,
        }
    }

    /// `GET <entity>?name=<name>`
    #[must_use]
    pub fn get_by_name(entity: Entity, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::list(entity)
        }
    }

    /// `GET <entity>/<id>`
    #[must_use]
    pub fn get_by_id(entity: Entity, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::list(entity)
        }
    }

    /// `POST <entity>` with a JSON body.
    #[must_use]
    pub fn create(entity: Entity, body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::list(entity)
        }
    }

    /// `PUT <entity>/<id>` with a JSON body.
    #[must_use]
    pub fn update(entity: Entity, id: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::PUT,
            id: Some(id.into()),
            body: Some(body),
            ..Self::list(entity)
        }
    }

    /// `DELETE <entity>/<id>`
    #[must_use]
    pub fn delete(entity: Entity, id: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            id: Some(id.into()),
            ..Self::list(entity)
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Target entity.
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Entity id path segment, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Name filter, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// JSON payload, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Resolve the request URL against an API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the base URL cannot carry a path.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                Error::InvalidEndpoint(format!("{base} cannot be used as an API base URL"))
            })?;
            segments.pop_if_empty().push(API_PREFIX).push(self.entity.path());
            if let Some(id) = &self.id {
                segments.push(id);
            }
        }
        if let Some(name) = &self.name {
            url.query_pairs_mut().append_pair("name", name);
        }
        Ok(url)
    }
}

/// Executes API requests and returns the raw trimmed response body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for any non-200 status and a transport error
    /// when the call itself fails.
    async fn execute(&self, request: &ApiRequest) -> Result<String>;
}

/// Signed HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: Url,
    signer: RequestSigner,
}

impl HttpTransport {
    /// Create a transport for `base_url` signing with `signer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the HTTP client cannot be built.
    pub fn new(base_url: Url, signer: RequestSigner, timeout: Duration) -> Result<Self> {
        let http = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| {
                Error::ConfigError(format!("Failed to build Shieldoo HTTP client: {err}"))
            })?;

        Ok(Self {
            http,
            base_url,
            signer,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<String> {
        let url = request.url(&self.base_url)?;
        let token = self.signer.sign()?;

        let mut builder = self
            .http
            .request(request.method().clone(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTH_TOKEN_HEADER, token);
        if let Some(body) = request.body() {
            builder = builder.body(body.to_string());
        }

        info!(
            method = %request.method(),
            entity = %request.entity(),
            id = request.id(),
            name = request.name(),
            "Shieldoo request"
        );

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status != StatusCode::OK {
            return Err(Error::Api {
                status: status.to_string(),
                body: text,
            });
        }

        debug!(bytes = text.len(), "Shieldoo response");
        Ok(text.trim().to_string())
    }
}

/// Builder for [`ShieldooClient`].
pub struct ShieldooClientBuilder {
    base_url: Url,
    api_key: SecretString,
    timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
}

impl ShieldooClientBuilder {
    /// Create a builder for the given endpoint and API key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the endpoint is not a valid URL.
    pub fn new(endpoint: impl AsRef<str>, api_key: SecretString) -> Result<Self> {
        let base_url = Url::parse(endpoint.as_ref()).map_err(|err| {
            Error::ConfigError(format!(
                "Invalid Shieldoo endpoint `{}`: {err}",
                endpoint.as_ref()
            ))
        })?;
        Ok(Self::from_url(base_url, api_key))
    }

    /// Create a builder for an already parsed base URL.
    #[must_use]
    pub fn from_url(base_url: Url, api_key: SecretString) -> Self {
        Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            transport: None,
        }
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom transport instead of signed HTTP.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the signer or HTTP client cannot be created.
    pub fn build(self) -> Result<ShieldooClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let signer = RequestSigner::new(self.base_url.as_str(), self.api_key)?;
                Arc::new(HttpTransport::new(
                    self.base_url.clone(),
                    signer,
                    self.timeout,
                )?)
            }
        };

        Ok(ShieldooClient {
            base_url: self.base_url,
            transport,
        })
    }
}

/// Typed client for the Shieldoo API.
///
/// Holds only immutable configuration and is cheap to clone; clones share
/// the underlying transport.
#[derive(Clone)]
pub struct ShieldooClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ShieldooClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShieldooClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ShieldooClient {
    /// Construct a signed HTTP client directly from endpoint and key.
    ///
    /// # Errors
    ///
    /// See [`ShieldooClientBuilder::build`].
    pub fn new(endpoint: impl AsRef<str>, api_key: SecretString) -> Result<Self> {
        ShieldooClientBuilder::new(endpoint, api_key)?.build()
    }

    /// Construct a client from validated provider configuration.
    ///
    /// In test mode every call is answered by [`MockupTransport`] and no
    /// network traffic happens.
    ///
    /// # Errors
    ///
    /// See [`ShieldooClientBuilder::build`].
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let mut builder =
            ShieldooClientBuilder::from_url(config.parse_endpoint()?, config.api_key.clone())
                .with_timeout(config.timeout());
        if config.test_mode {
            warn!(endpoint = %config.endpoint, "test mode enabled, API calls are simulated");
            builder = builder.with_transport(Arc::new(MockupTransport));
        }
        builder.build()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Look up a single entity by name.
    ///
    /// The API answers name lookups with a list; a single-element list is
    /// unwrapped and an empty list is reported as [`Error::NotFound`].
    ///
    /// # Errors
    ///
    /// Propagates transport and API errors; returns [`Error::Decode`] when
    /// the body does not match `T` or holds more than one element.
    pub async fn get<T: DeserializeOwned>(&self, entity: Entity, name: &str) -> Result<T> {
        let raw = self
            .transport
            .execute(&ApiRequest::get_by_name(entity, name))
            .await?;
        decode_single(entity, name, &raw)
    }

    /// Fetch a single entity by id.
    ///
    /// # Errors
    ///
    /// See [`ShieldooClient::get`].
    pub async fn get_by_id<T: DeserializeOwned>(&self, entity: Entity, id: &str) -> Result<T> {
        let raw = self
            .transport
            .execute(&ApiRequest::get_by_id(entity, id))
            .await?;
        decode_single(entity, id, &raw)
    }

    /// List all entities of a kind.
    ///
    /// # Errors
    ///
    /// Propagates transport and API errors; returns [`Error::Decode`] when
    /// the body is not a list of `T`.
    pub async fn list<T: DeserializeOwned>(&self, entity: Entity) -> Result<Vec<T>> {
        let raw = self.transport.execute(&ApiRequest::list(entity)).await?;
        decode(entity, &raw)
    }

    /// Create an entity and return the server's view of it.
    ///
    /// # Errors
    ///
    /// Propagates transport, API and decode errors.
    pub async fn create<B, T>(&self, entity: Entity, payload: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(payload)?;
        let raw = self
            .transport
            .execute(&ApiRequest::create(entity, body))
            .await?;
        decode(entity, &raw)
    }

    /// Update an entity in place and return the server's view of it.
    ///
    /// # Errors
    ///
    /// Propagates transport, API and decode errors.
    pub async fn update<B, T>(&self, entity: Entity, id: &str, payload: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(payload)?;
        let raw = self
            .transport
            .execute(&ApiRequest::update(entity, id, body))
            .await?;
        decode(entity, &raw)
    }

    /// Delete an entity by id.
    ///
    /// # Errors
    ///
    /// Propagates transport and API errors.
    pub async fn delete(&self, entity: Entity, id: &str) -> Result<()> {
        self.transport
            .execute(&ApiRequest::delete(entity, id))
            .await
            .map(|_| ())
    }

    /// List all groups visible to the API key.
    ///
    /// # Errors
    ///
    /// See [`ShieldooClient::list`].
    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        self.list(Entity::Groups).await
    }
}

fn decode<T: DeserializeOwned>(entity: Entity, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|err| {
        Error::Decode(format!("Failed to parse {entity} response: {err}"))
    })
}

fn decode_single<T: DeserializeOwned>(entity: Entity, key: &str, raw: &str) -> Result<T> {
    let value: Value = decode(entity, raw)?;
    let value = match value {
        Value::Array(mut items) => match items.len() {
            0 => return Err(Error::NotFound(format!("{entity} `{key}`"))),
            1 => items.remove(0),
            n => {
                return Err(Error::Decode(format!(
                    "expected a single {entity} for `{key}`, got {n}"
                )))
            }
        },
        other => other,
    };
    T::deserialize(value)
        .map_err(|err| Error::Decode(format!("Failed to parse {entity} `{key}`: {err}")))
}
