//! Watch stream for the hosted document store.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::{Stream, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, trace, warn};

use plaudit_core::error::{Error, InvalidInputError, TransportError};
use plaudit_core::{CollectionName, Result, Snapshot, StoreUrl};

/// Watch stream for the hosted document store.
///
/// The store pushes one Text frame per change, each carrying the full
/// current snapshot of the watched collection as JSON.
pub struct HttpWatch {
    inner: Pin<Box<dyn Stream<Item = Result<Snapshot>> + Send>>,
}

impl HttpWatch {
    pub(crate) fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Snapshot>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    pub async fn from_websocket(store: &StoreUrl, collection: &CollectionName) -> Result<Self> {
        let ws_url = build_ws_url(store, collection);
        info!(url = %ws_url, "Connecting to store watch");

        let (ws_stream, _) = connect_async(&ws_url).await.map_err(|e| {
            Error::Transport(TransportError::Connection {
                message: e.to_string(),
            })
        })?;

        debug!("WebSocket connected, listening for snapshots");

        let stream = async_stream::stream! {
            let (mut write, mut read) = ws_stream.split();

            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        yield parse_snapshot_frame(&text);
                    }
                    Ok(Message::Ping(data)) => {
                        trace!("Received ping");
                        if let Err(e) = futures_util::SinkExt::send(&mut write, Message::Pong(data)).await {
                            warn!(error = %e, "Failed to send pong");
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        info!(?frame, "WebSocket closed by server");
                        break;
                    }
                    Ok(Message::Binary(_)) => {
                        trace!("Ignoring binary message");
                    }
                    Ok(Message::Pong(_)) => {
                        trace!("Received pong");
                    }
                    Ok(Message::Frame(_)) => {
                        // Raw frame, ignore
                    }
                    Err(e) => {
                        error!(error = %e, "WebSocket error");
                        yield Err(Error::Transport(TransportError::Connection {
                            message: e.to_string(),
                        }));
                        break;
                    }
                }
            }
        };

        Ok(Self::new(stream))
    }
}

impl Stream for HttpWatch {
    type Item = Result<Snapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

fn build_ws_url(store: &StoreUrl, collection: &CollectionName) -> String {
    let base = store.as_str();
    let ws_base = base
        .replace("https://", "wss://")
        .replace("http://", "ws://");
    let ws_base = ws_base.trim_end_matches('/');

    format!("{}/v1/collections/{}/watch", ws_base, collection)
}

fn parse_snapshot_frame(text: &str) -> Result<Snapshot> {
    serde_json::from_str::<Snapshot>(text).map_err(|e| {
        Error::InvalidInput(InvalidInputError::Other {
            message: format!("malformed snapshot frame: {}", e),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_url_rewrites_scheme() {
        let store = StoreUrl::new("https://store.example.com").unwrap();
        let collection = CollectionName::new("testimonials").unwrap();
        assert_eq!(
            build_ws_url(&store, &collection),
            "wss://store.example.com/v1/collections/testimonials/watch"
        );
    }

    #[test]
    fn parse_valid_snapshot_frame() {
        let snapshot = parse_snapshot_frame(
            r#"{"docs": [{"id": "a1", "fields": {"name": "Ada", "comments": []}}]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.docs[0].id.as_str(), "a1");
    }

    #[test]
    fn parse_malformed_frame_fails() {
        assert!(parse_snapshot_frame("not json").is_err());
        assert!(parse_snapshot_frame(r#"{"docs": [{"id": ""}]}"#).is_err());
    }
}
