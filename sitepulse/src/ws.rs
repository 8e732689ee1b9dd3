//! WebSocket fallback transport: `get_stats` request, `{success, data}` reply.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::debug;
use url::Url;

use crate::transport::{Transport, TransportError, REQUEST_TIMEOUT};
use crate::types::{Envelope, Stats};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// `http(s)://host/...` becomes `ws(s)://host/ws?nonce=...`.
pub fn ws_url(base: &Url, nonce: &str) -> Result<Url, TransportError> {
    let mut url = base.join("/ws")?;
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    // http->ws and https->wss are both special-to-special, which set_scheme allows
    let _ = url.set_scheme(scheme);
    url.query_pairs_mut().clear().append_pair("nonce", nonce);
    Ok(url)
}

/// Connects lazily on first use and again after any failure.
pub struct WsTransport {
    url: Url,
    stream: Option<WsStream>,
}

impl WsTransport {
    pub fn new(url: Url) -> Self {
        Self { url, stream: None }
    }

    async fn request(&mut self) -> Result<Stats, TransportError> {
        if self.stream.is_none() {
            let (ws, _) = connect_async(self.url.as_str()).await?;
            debug!(url = %self.url, "fallback websocket connected");
            self.stream = Some(ws);
        }
        let ws = self.stream.as_mut().ok_or(TransportError::Closed)?;
        ws.send(Message::Text("get_stats".into())).await?;
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return decode(&text),
                Some(Ok(Message::Close(_))) | None => return Err(TransportError::Closed),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }
}

fn decode(text: &str) -> Result<Stats, TransportError> {
    let env: Envelope = serde_json::from_str(text)?;
    match env.data {
        Some(data) if env.success => Ok(serde_json::from_value(data)?),
        _ => Err(TransportError::Unsuccessful),
    }
}

#[async_trait]
impl Transport for WsTransport {
    fn name(&self) -> &'static str {
        "websocket"
    }

    async fn fetch(&mut self) -> Result<Stats, TransportError> {
        let res = match timeout(REQUEST_TIMEOUT, self.request()).await {
            Ok(r) => r,
            Err(_) => Err(TransportError::Timeout),
        };
        if res.is_err() {
            self.stream = None;
        }
        res
    }
}
