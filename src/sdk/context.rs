//! Context - request construction and session authentication.
//!
//! A [`Context`] knows where a Splunk server lives and how to talk to it.
//! It turns a (namespace, resource, arguments) triple into an HTTP request,
//! signs it with the session key when one is set, and hands back the raw
//! response.

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Request, Response, Url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::sdk::args::{encode_form, encode_query, ArgumentSet};
use crate::sdk::atom;
use crate::sdk::namespace::{Namespace, ResourceName};
use crate::sdk::transport::{default_client, Transport};

/// Content type of POST bodies.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Protocol used to reach the server.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(Error::InvalidArgument(format!(
                "unsupported scheme '{}': expected http or https",
                other
            ))),
        }
    }
}

/// Transport lifecycle.
enum TransportState {
    Open {
        transport: Arc<dyn Transport>,
        owned: bool,
    },
    Disposed,
}

/// Connection to a Splunk server's management port.
///
/// Dropping a context disposes it. [`Context::dispose`] may also be called
/// explicitly; it is idempotent. Requests still in flight when the context
/// is disposed fail with [`Error::Disposed`].
pub struct Context {
    scheme: Scheme,
    host: String,
    port: u16,
    credential: RwLock<Option<String>>,
    transport: RwLock<TransportState>,
    shutdown: CancellationToken,
}

impl Context {
    /// Create a context with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `host` is empty or `port` is
    /// outside `0..=65535`.
    pub fn new<P>(scheme: Scheme, host: &str, port: P) -> Result<Self>
    where
        P: TryInto<u16> + Copy + fmt::Display,
    {
        let client = default_client()?;
        Self::with_transport(scheme, host, port, Arc::new(client), true)
    }

    /// Create a context over an injected transport.
    ///
    /// When `dispose_transport` is `false` the transport is left running on
    /// disposal so that it can be reused.
    pub fn with_transport<P>(
        scheme: Scheme,
        host: &str,
        port: P,
        transport: Arc<dyn Transport>,
        dispose_transport: bool,
    ) -> Result<Self>
    where
        P: TryInto<u16> + Copy + fmt::Display,
    {
        if host.trim().is_empty() {
            return Err(Error::InvalidArgument("host must not be empty".to_string()));
        }
        let port: u16 = port.try_into().map_err(|_| {
            Error::InvalidArgument(format!("port {} is outside 0..=65535", port))
        })?;

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
            credential: RwLock::new(None),
            transport: RwLock::new(TransportState::Open {
                transport,
                owned: dispose_transport,
            }),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the session key, if one has been set.
    pub fn credential(&self) -> Option<String> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Set or clear the session key. Applies to the next request.
    pub fn set_credential(&self, credential: Option<String>) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credential;
    }

    /// Check if the session key is set.
    pub fn is_authenticated(&self) -> bool {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Check if [`Context::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        matches!(
            *self.transport.read().unwrap_or_else(PoisonError::into_inner),
            TransportState::Disposed
        )
    }

    /// Release the transport. Safe to call more than once.
    pub fn dispose(&self) {
        let previous = std::mem::replace(
            &mut *self
                .transport
                .write()
                .unwrap_or_else(PoisonError::into_inner),
            TransportState::Disposed,
        );

        if let TransportState::Open { transport, owned } = previous {
            self.shutdown.cancel();
            if owned {
                transport.shutdown();
            }
            debug!("Disposed context for {}", self);
        }
    }

    /// Send a GET with all arguments in the query string.
    ///
    /// Returns once response headers are available; the body is not read.
    pub async fn get<'a, I>(
        &self,
        namespace: &Namespace,
        resource: &ResourceName,
        argument_sets: I,
    ) -> Result<Response>
    where
        I: IntoIterator<Item = &'a ArgumentSet>,
    {
        let url = self.service_url(namespace, resource, &encode_query(argument_sets))?;
        self.send(Request::new(Method::GET, url)).await
    }

    /// Send a POST with all arguments form-encoded in the body.
    ///
    /// Returns once response headers are available; the body is not read.
    pub async fn post<'a, I>(
        &self,
        namespace: &Namespace,
        resource: &ResourceName,
        argument_sets: I,
    ) -> Result<Response>
    where
        I: IntoIterator<Item = &'a ArgumentSet>,
    {
        let url = self.service_url(namespace, resource, "")?;
        let mut request = Request::new(Method::POST, url);
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        *request.body_mut() = Some(encode_form(argument_sets).into());
        self.send(request).await
    }

    /// GET a resource and read the full response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for a non-success status, carrying the
    /// server's message when the body has one.
    pub async fn get_document<'a, I>(
        &self,
        namespace: &Namespace,
        resource: &ResourceName,
        argument_sets: I,
    ) -> Result<String>
    where
        I: IntoIterator<Item = &'a ArgumentSet>,
    {
        let response = self.get(namespace, resource, argument_sets).await?;
        self.read_document(response).await
    }

    /// Log in and keep the returned session key as the credential.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let args = ArgumentSet::new()
            .with("username", username)
            .with("password", password);

        let response = self
            .post(&Namespace::services(), &ResourceName::login(), [&args])
            .await?;
        let body = self.read_document(response).await.map_err(|e| match e {
            Error::Api {
                status: 401,
                message,
                ..
            } => Error::Auth(message),
            other => other,
        })?;

        let session_key = atom::parse_session_key(&body)?;
        self.set_credential(Some(session_key));
        info!("Logged in to {} as {}", self, username);
        Ok(())
    }

    fn service_url(
        &self,
        namespace: &Namespace,
        resource: &ResourceName,
        query: &str,
    ) -> Result<Url> {
        let mut url = format!("{}/{}/{}", self, namespace, resource);
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        Url::parse(&url)
            .map_err(|e| Error::InvalidArgument(format!("invalid service URL {}: {}", url, e)))
    }

    fn transport(&self) -> Result<Arc<dyn Transport>> {
        match &*self.transport.read().unwrap_or_else(PoisonError::into_inner) {
            TransportState::Open { transport, .. } => Ok(Arc::clone(transport)),
            TransportState::Disposed => Err(Error::Disposed(self.to_string())),
        }
    }

    /// Attach the session key, if any.
    fn authorize(&self, request: &mut Request) -> Result<()> {
        let guard = self.credential.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(key) = guard.as_deref() {
            let mut value = HeaderValue::from_str(&format!("Splunk {}", key)).map_err(|_| {
                Error::InvalidArgument("session key contains invalid header characters".to_string())
            })?;
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Ok(())
    }

    async fn send(&self, mut request: Request) -> Result<Response> {
        let transport = self.transport()?;
        self.authorize(&mut request)?;

        debug!("{} {}", request.method(), request.url().path());

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(Error::Disposed(self.to_string())),
            result = transport.execute(request) => result,
        }
    }

    /// Read a response body, turning error statuses into [`Error::Api`].
    ///
    /// The read is abandoned with [`Error::Disposed`] if the context is
    /// disposed while the body is still arriving.
    async fn read_document(&self, response: Response) -> Result<String> {
        let status = response.status();

        let body = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(Error::Disposed(self.to_string())),
            body = response.text() => body,
        };

        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or("Unknown");
            let body = body.unwrap_or_default();
            let message = atom::parse_error_message(&body).unwrap_or(body);
            return Err(Error::api(status.as_u16(), status_text, message));
        }

        Ok(body?)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("authenticated", &self.is_authenticated())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.dispose();
    }
}
