//! Live notification feed over a websocket.
//!
//! Two frame shapes are understood: plain JSON objects `{"event", "payload"}` and
//! Socket.IO text packets such as `42["notification",{...}]`. A `notification`
//! event marks every cached notification query stale and is rebroadcast to
//! subscribers.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;

use crate::api::keys;
use crate::cache::QueryCache;

pub const NOTIFICATION_EVENT: &str = "notification";

const EVENT_CAPACITY: usize = 64;

/// A named event with its opaque payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketEvent {
    pub name: String,
    pub payload: Value,
}

/// What a single text frame carried.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Event(SocketEvent),
    /// Engine.IO handshake; the client answers with a namespace connect.
    Open,
    /// Engine.IO heartbeat; the client answers with a pong.
    Ping,
    Other,
}

pub fn decode_frame(text: &str) -> Frame {
    let text = text.trim();
    if text.starts_with('{') {
        return decode_object(text);
    }
    if let Some(packet) = text.strip_prefix("42") {
        return decode_socket_io(packet);
    }
    if text == "2" {
        return Frame::Ping;
    }
    if text.starts_with('0') {
        return Frame::Open;
    }
    Frame::Other
}

fn decode_object(text: &str) -> Frame {
    let Ok(Value::Object(mut fields)) = serde_json::from_str::<Value>(text) else {
        return Frame::Other;
    };
    let Some(Value::String(name)) = fields.remove("event") else {
        return Frame::Other;
    };
    let payload = fields
        .remove("payload")
        .or_else(|| fields.remove("data"))
        .unwrap_or(Value::Null);
    Frame::Event(SocketEvent { name, payload })
}

fn decode_socket_io(packet: &str) -> Frame {
    // Optional namespace (`/ns,`) and ack id precede the array.
    let packet = match packet.strip_prefix('/') {
        Some(rest) => match rest.split_once(',') {
            Some((_, body)) => body,
            None => return Frame::Other,
        },
        None => packet,
    };
    let packet = packet.trim_start_matches(|c: char| c.is_ascii_digit());

    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(packet) else {
        return Frame::Other;
    };
    let mut items = items.into_iter();
    match items.next() {
        Some(Value::String(name)) => Frame::Event(SocketEvent {
            name,
            payload: items.next().unwrap_or(Value::Null),
        }),
        _ => Frame::Other,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("socket url must use ws:// or wss://, got {0}")]
    InvalidUrl(String),
    #[error("websocket failure: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Keeps the notification cache in step with server pushes.
pub struct NotificationFeed {
    cache: Arc<QueryCache>,
    events: broadcast::Sender<SocketEvent>,
}

impl NotificationFeed {
    pub fn new(cache: Arc<QueryCache>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { cache, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SocketEvent> {
        self.events.subscribe()
    }

    /// Apply one text frame. Returns the protocol reply to send back, if any.
    pub fn handle_frame(&self, text: &str) -> Option<&'static str> {
        match decode_frame(text) {
            Frame::Event(event) if event.name == NOTIFICATION_EVENT => {
                let stale = self.cache.invalidate(&keys::root(keys::NOTIFICATIONS));
                tracing::info!(stale, "notification pushed");
                let _ = self.events.send(event);
                None
            }
            Frame::Event(event) => {
                tracing::debug!(event = %event.name, "ignoring socket event");
                None
            }
            Frame::Open => Some("40"),
            Frame::Ping => Some("3"),
            Frame::Other => None,
        }
    }

    /// Connect to `url` and consume frames until the server closes the socket.
    pub async fn run(&self, url: &str) -> Result<(), FeedError> {
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(FeedError::InvalidUrl(url.to_string()));
        }

        let (mut socket, _) = tokio_tungstenite::connect_async(url).await?;
        tracing::info!(%url, "notification feed connected");

        while let Some(message) = socket.next().await {
            match message? {
                Message::Text(text) => {
                    if let Some(reply) = self.handle_frame(text.as_str()) {
                        socket.send(Message::text(reply)).await?;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }

        tracing::info!(%url, "notification feed closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn decodes_plain_json_events() {
        assert_eq!(
            decode_frame(r#"{"event":"notification","payload":{"id":4}}"#),
            Frame::Event(SocketEvent {
                name: "notification".to_string(),
                payload: json!({ "id": 4 }),
            })
        );
        assert_eq!(decode_frame(r#"{"payload":1}"#), Frame::Other);
        assert_eq!(decode_frame("{broken"), Frame::Other);
    }

    #[test]
    fn decodes_socket_io_packets() {
        let expected = Frame::Event(SocketEvent {
            name: "notification".to_string(),
            payload: json!({ "title": "New request" }),
        });
        assert_eq!(
            decode_frame(r#"42["notification",{"title":"New request"}]"#),
            expected
        );
        assert_eq!(
            decode_frame(r#"42/admin,17["notification",{"title":"New request"}]"#),
            expected
        );
        assert_eq!(decode_frame(r#"0{"sid":"abc","pingInterval":25000}"#), Frame::Open);
        assert_eq!(decode_frame("2"), Frame::Ping);
        assert_eq!(decode_frame("40"), Frame::Other);
    }

    #[test]
    fn notification_event_marks_the_list_stale() {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
        let list = keys::list(keys::NOTIFICATIONS, &json!({ "page": 1 }));
        let estates = keys::root(keys::ESTATES);
        cache.store(list.clone(), json!({ "data": [] }));
        cache.store(estates.clone(), json!([]));

        let feed = NotificationFeed::new(cache.clone());
        let mut events = feed.subscribe();
        assert_eq!(feed.handle_frame(r#"42["notification",{"id":9}]"#), None);

        assert_eq!(cache.is_stale(&list), Some(true));
        assert_eq!(cache.is_stale(&estates), Some(false));
        assert_eq!(events.try_recv().expect("event").payload, json!({ "id": 9 }));
    }

    #[test]
    fn answers_protocol_frames() {
        let feed = NotificationFeed::new(Arc::new(QueryCache::new(Duration::from_secs(1))));
        let mut events = feed.subscribe();
        assert_eq!(feed.handle_frame("0{}"), Some("40"));
        assert_eq!(feed.handle_frame("2"), Some("3"));
        assert_eq!(feed.handle_frame(r#"42["typing",{}]"#), None);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn rejects_non_websocket_urls() {
        let feed = NotificationFeed::new(Arc::new(QueryCache::new(Duration::from_secs(1))));
        assert!(matches!(
            feed.run("http://localhost:4000").await,
            Err(FeedError::InvalidUrl(_))
        ));
    }
}
