//! Relay of upstream deltas as browser-facing events

use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::{Stream, StreamExt, stream};
use pivothire_core::HttpError;
use tracing::Instrument;

use crate::accumulator::ToolCallAccumulator;
use crate::provider::UpstreamStream;
use crate::types::StreamEvent;

/// Events of one chat turn, always ending with a single `done`
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Turn an upstream delta stream into the relayed event stream
///
/// The upstream is polled only as fast as the consumer pulls events and is
/// never polled again after it fails. Dropping the returned stream drops the
/// upstream with it.
pub fn relay_events(upstream: UpstreamStream, span: tracing::Span) -> EventStream {
    let relay = Relay {
        upstream: Some(upstream),
        accumulator: ToolCallAccumulator::new(),
        queue: VecDeque::new(),
        text_events: 0,
        tool_calls: 0,
        errors: 0,
        finished: false,
        span,
    };

    Box::pin(stream::unfold(relay, |mut relay| async move {
        let span = relay.span.clone();
        let event = relay.next_event().instrument(span).await?;
        Some((event, relay))
    }))
}

struct Relay {
    upstream: Option<UpstreamStream>,
    accumulator: ToolCallAccumulator,
    queue: VecDeque<StreamEvent>,
    text_events: usize,
    tool_calls: usize,
    errors: usize,
    finished: bool,
    span: tracing::Span,
}

impl Relay {
    async fn next_event(&mut self) -> Option<StreamEvent> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                self.record(&event);
                return Some(event);
            }

            if self.finished {
                return None;
            }

            let next = self.upstream.as_mut()?.next().await;

            match next {
                Some(Ok(delta)) => {
                    let events = self.accumulator.push(delta);
                    self.queue.extend(events);
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "upstream failed mid-turn; ending stream");
                    self.upstream = None;
                    self.queue.push_back(StreamEvent::error(e.client_message()));
                    self.queue.push_back(StreamEvent::Done);
                }
                None => {
                    self.upstream = None;
                    if self.accumulator.pending() > 0 {
                        tracing::debug!(
                            pending = self.accumulator.pending(),
                            "upstream ended without finishing its function call"
                        );
                    }
                    self.queue.push_back(StreamEvent::Done);
                }
            }
        }
    }

    fn record(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::Text { .. } => self.text_events += 1,
            StreamEvent::ToolCall { .. } => self.tool_calls += 1,
            StreamEvent::Error { .. } => self.errors += 1,
            StreamEvent::Done => {
                self.finished = true;
                self.queue.clear();
                tracing::info!(
                    text_events = self.text_events,
                    tool_call = self.tool_calls > 0,
                    errors = self.errors,
                    "chat turn finished"
                );
            }
        }
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        if !self.finished {
            self.span.in_scope(|| {
                tracing::debug!(text_events = self.text_events, "client cancelled chat turn before completion");
            });
        }
    }
}
