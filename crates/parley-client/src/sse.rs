//! Server-sent event parsing for the turn channel.

use eventsource_stream::Eventsource;
use futures_core::Stream;
use futures_util::StreamExt;
use std::pin::Pin;
use tokio_util::bytes::Bytes;

use crate::error::Error;

#[derive(Debug, Clone)]
pub struct SseEvent {
    pub event_type: Option<String>,
    pub data: String,
    pub id: Option<String>,
}

pub type SseStream = Pin<Box<dyn Stream<Item = Result<SseEvent, Error>> + Send>>;

pub fn parse_sse_stream<S, E>(byte_stream: S) -> SseStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + 'static,
{
    let event_stream = byte_stream
        .map(|result| result.map_err(|e| std::io::Error::other(e.to_string())))
        .eventsource()
        .map(|result| {
            result
                .map(|event| SseEvent {
                    event_type: if event.event.is_empty() {
                        None
                    } else {
                        Some(event.event)
                    },
                    data: event.data,
                    id: if event.id.is_empty() {
                        None
                    } else {
                        Some(event.id)
                    },
                })
                .map_err(|e| Error::Stream(e.to_string()))
        });

    Box::pin(event_stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    #[tokio::test]
    async fn parses_turn_event_with_id() {
        let sse_data = "id: t-1\nevent: turn\ndata: {\"round\": 1}\n\n";
        let byte_stream =
            stream::once(async move { Ok::<_, std::io::Error>(Bytes::from(sse_data)) });

        let mut sse_stream = parse_sse_stream(byte_stream);

        let event = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(event.event_type, Some("turn".to_string()));
        assert_eq!(event.id, Some("t-1".to_string()));
        assert_eq!(event.data, "{\"round\": 1}");
    }

    #[tokio::test]
    async fn parses_consecutive_events() {
        let sse_data = "event: turn\ndata: first\n\nevent: error\ndata: second\n\n";
        let byte_stream =
            stream::once(async move { Ok::<_, std::io::Error>(Bytes::from(sse_data)) });

        let mut sse_stream = parse_sse_stream(byte_stream);

        let event1 = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(event1.event_type, Some("turn".to_string()));
        assert_eq!(event1.data, "first");

        let event2 = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(event2.event_type, Some("error".to_string()));
        assert_eq!(event2.data, "second");
    }
}
