use std::pin::Pin;

use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures::{stream, Stream};
use futures_util::StreamExt;
use lumina_core::{Message, StreamEvent};
use tokio_util::sync::CancellationToken;

use crate::adapter::{ByteStream, ProviderAdapter};
use crate::error::LLMError;
use crate::openai_compat::{parse_sse_data, SseData};

pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Decode a provider byte stream into normalized events.
///
/// Emits `content` per text delta and `done` when the sentinel arrives, in
/// arrival order. A transport failure or cancellation yields one `error`.
/// `complete` with the aggregated text is always the last event, whether or
/// not the sentinel was seen.
///
/// A body that ends without a blank line still has its trailing `data:` lines
/// decoded.
pub fn relay_events(bytes: ByteStream, cancel: CancellationToken) -> EventStream {
    Box::pin(async_stream::stream! {
        // an extra blank line dispatches whatever the decoder still buffers;
        // a frame with no data lines is dropped by the decoder
        let terminator = stream::iter([Ok::<_, LLMError>(Bytes::from_static(b"\n\n"))]);
        let mut frames = bytes.chain(terminator).eventsource();
        let mut full_response = String::new();
        let mut deltas = 0usize;
        let mut sentinel_seen = false;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                frame = frames.next() => Some(frame),
            };

            let Some(frame) = next else {
                log::info!("Turn cancelled after {} deltas", deltas);
                yield StreamEvent::error(LLMError::Cancelled.to_string());
                break;
            };

            match frame {
                None => break,
                Some(Err(e)) => {
                    log::error!("Stream interrupted after {} deltas: {}", deltas, e);
                    yield StreamEvent::error(stream_error_message(e));
                    break;
                }
                Some(Ok(frame)) => {
                    for data in decode_frame(&frame.data) {
                        match data {
                            SseData::Delta(text) => {
                                deltas += 1;
                                full_response.push_str(&text);
                                yield StreamEvent::content(text);
                            }
                            SseData::Done => {
                                if !sentinel_seen {
                                    sentinel_seen = true;
                                    yield StreamEvent::done();
                                }
                            }
                            SseData::Ignored => {}
                        }
                    }
                }
            }
        }

        log::debug!(
            "Stream closed: {} deltas, {} chars, sentinel seen: {}",
            deltas,
            full_response.len(),
            sentinel_seen
        );
        yield StreamEvent::complete(full_response);
    })
}

/// Run a whole streaming turn against `adapter`.
///
/// A configuration error yields only an `error` event since no request was
/// made. Any other failure to start yields `error` followed by an empty
/// `complete`.
pub fn stream_turn(
    adapter: ProviderAdapter,
    history: Vec<Message>,
    system_prompt: String,
    cancel: CancellationToken,
) -> EventStream {
    Box::pin(async_stream::stream! {
        let started = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LLMError::Cancelled),
            result = adapter.stream_chat(&history, &system_prompt) => result,
        };

        match started {
            Ok(bytes) => {
                let mut events = relay_events(bytes, cancel);
                while let Some(event) = events.next().await {
                    yield event;
                }
            }
            Err(e) => {
                let reached_transport = !matches!(e, LLMError::Configuration(_));
                if reached_transport {
                    log::error!("Turn failed to start: {}", e);
                } else {
                    log::warn!("Turn rejected: {}", e);
                }
                yield StreamEvent::error(e.to_string());
                if reached_transport {
                    yield StreamEvent::complete(String::new());
                }
            }
        }
    })
}

// A frame normally carries one JSON payload. Providers that separate `data:`
// lines with a single newline end up with several payloads joined by '\n'.
fn decode_frame(data: &str) -> Vec<SseData> {
    match parse_sse_data(data) {
        SseData::Ignored if data.contains('\n') => data.lines().map(parse_sse_data).collect(),
        parsed => vec![parsed],
    }
}

fn stream_error_message(e: eventsource_stream::EventStreamError<LLMError>) -> String {
    match e {
        eventsource_stream::EventStreamError::Transport(inner) => inner.to_string(),
        other => other.to_string(),
    }
}
