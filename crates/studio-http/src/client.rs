//! HTTP request client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, instrument, trace};

use studio_core::error::{HttpError, ProtocolError, TransportError, ValidationError};
use studio_core::ops::Tracker;
use studio_core::request::extract_message;
use studio_core::{
    ApiUrl, Dispatch, Method, MultipartForm, RequestBody, RequestIntent, Response, Result,
    SessionStore,
};

/// Settings for an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: ApiUrl,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            user_agent: concat!("studio/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Client for the studio backend.
///
/// Cheap to clone. Clones share the connection pool and the session store,
/// so a login through one clone authenticates the others.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    base: ApiUrl,
    session: SessionStore,
}

impl ApiClient {
    /// Create a client reading credentials from `session`.
    pub fn new(config: ClientConfig, session: SessionStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base: config.base_url,
                session,
            }),
        })
    }

    /// Returns the API base URL this client targets.
    pub fn base_url(&self) -> &ApiUrl {
        &self.inner.base
    }

    /// The session store attached to this client.
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// A tracker driving operations through this client.
    pub fn tracker(&self) -> Tracker<ApiClient> {
        Tracker::new(self.clone())
    }

    /// Send a request intent and decode the success body.
    ///
    /// Attaches the bearer credential when a session exists. Never retries.
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn send(&self, request: RequestIntent) -> Result<Response> {
        let (method, path, body) = request.into_parts();
        let url = self.inner.base.endpoint(&path)?;
        debug!(%url, "Sending request");

        let mut builder = self.inner.http.request(http_method(method), url);

        if let Some(token) = self.inner.session.access_token() {
            builder = builder.bearer_auth(token.as_str());
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(&value).map_err(|e| ValidationError::Encoding {
                    reason: e.to_string(),
                })?;
                builder
                    .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                    .body(bytes)
            }
            // The transport sets the multipart content type and boundary.
            RequestBody::Multipart(form) => builder.multipart(multipart_form(form)?),
        };

        let response = builder.send().await.map_err(transport_error)?;
        decode_response(response).await
    }
}

#[async_trait]
impl Dispatch for ApiClient {
    async fn dispatch(&self, request: RequestIntent) -> Result<Response> {
        self.send(request).await
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn multipart_form(form: MultipartForm) -> Result<Form> {
    let (fields, files) = form.into_parts();

    let mut out = Form::new();
    for (name, value) in fields {
        out = out.text(name, value);
    }
    for file in files {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime) = file.mime {
            part = part
                .mime_str(&mime)
                .map_err(|e| ValidationError::Encoding {
                    reason: format!("invalid content type '{mime}': {e}"),
                })?;
        }
        out = out.part(file.field, part);
    }
    Ok(out)
}

/// Map a transport failure (no usable response) onto the network category.
pub(crate) fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Other {
            message: err.to_string(),
        }
    }
}

/// Decode a response per its content type, or turn it into an HTTP error.
async fn decode_response(response: reqwest::Response) -> Result<Response> {
    let status = response.status();
    trace!(status = %status, "Response received");

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = response.bytes().await.map_err(transport_error)?;

    if !status.is_success() {
        let message = serde_json::from_slice::<Value>(&bytes)
            .ok()
            .as_ref()
            .and_then(extract_message);
        debug!(status = status.as_u16(), ?message, "Request rejected");
        return Err(HttpError::new(status.as_u16(), message).into());
    }

    if bytes.is_empty() {
        return Ok(Response::Empty);
    }

    match content_type.as_deref() {
        Some(ct) if is_json(ct) => serde_json::from_slice(&bytes)
            .map(Response::Json)
            .map_err(|e| {
                ProtocolError::UnexpectedResponse {
                    message: format!("invalid JSON body: {e}"),
                }
                .into()
            }),
        _ => Ok(Response::Text(String::from_utf8_lossy(&bytes).into_owned())),
    }
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}
