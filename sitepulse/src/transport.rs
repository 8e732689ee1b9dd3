//! Snapshot transports: the HTTP status pull, and the pairing that retries a
//! failed pull over the WebSocket fallback within the same tick.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::types::{Session, Stats};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("agent answered {0}")]
    Status(StatusCode),
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("malformed reply: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("agent reported failure")]
    Unsuccessful,
    #[error("connection closed")]
    Closed,
    #[error("timed out")]
    Timeout,
    #[error("bad agent url: {0}")]
    Url(#[from] url::ParseError),
}

#[async_trait]
pub trait Transport: Send {
    fn name(&self) -> &'static str;
    async fn fetch(&mut self) -> Result<Stats, TransportError>;
}

/// `base` joined with an absolute endpoint path.
pub fn endpoint(base: &Url, path: &str) -> Result<Url, TransportError> {
    Ok(base.join(path)?)
}

fn authorized(req: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
    match token {
        Some(t) => req.bearer_auth(t),
        None => req,
    }
}

pub fn http_client() -> Result<reqwest::Client, TransportError> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Primary transport: authenticated GET of the stats endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base: &Url, token: Option<String>) -> Result<Self, TransportError> {
        Ok(Self {
            client,
            url: endpoint(base, "/api/stats")?,
            token,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&mut self) -> Result<Stats, TransportError> {
        let res = authorized(self.client.get(self.url.clone()), self.token.as_deref())
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(TransportError::Status(res.status()));
        }
        let body = res.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Fetch the fallback nonce and the dashboard settings.
pub async fn bootstrap(
    client: &reqwest::Client,
    base: &Url,
    token: Option<&str>,
) -> Result<Session, TransportError> {
    let res = authorized(client.get(endpoint(base, "/api/session")?), token)
        .send()
        .await?;
    if !res.status().is_success() {
        return Err(TransportError::Status(res.status()));
    }
    let body = res.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

pub struct FallbackTransport {
    primary: Box<dyn Transport>,
    secondary: Option<Box<dyn Transport>>,
}

impl FallbackTransport {
    pub fn new(primary: Box<dyn Transport>, secondary: Option<Box<dyn Transport>>) -> Self {
        Self { primary, secondary }
    }

    /// One attempt on each transport, primary first. `None` means the cycle is
    /// skipped; nothing is retried until the next call.
    pub async fn fetch_snapshot(&mut self) -> Option<Stats> {
        match self.primary.fetch().await {
            Ok(s) => return Some(s),
            Err(e) => debug!(transport = self.primary.name(), error = %e, "primary fetch failed"),
        }
        let secondary = self.secondary.as_mut()?;
        match secondary.fetch().await {
            Ok(s) => Some(s),
            Err(e) => {
                debug!(transport = secondary.name(), error = %e, "fallback fetch failed; skipping cycle");
                None
            }
        }
    }
}
