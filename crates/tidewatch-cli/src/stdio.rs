//! JSON-lines transport: signals in on stdin, plan commands and status out on
//! stdout.

use std::io::Write;

use tidewatch_middleware::{EventBus, Topic, TopicReceiver};
use tidewatch_types::{Event, EventPayload, SafetyError, Signal};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

pub const STDIN_SOURCE: &str = "tidewatch-cli::stdin";

/// Parse one input line.  Blank lines yield `Ok(None)`.
pub fn parse_signal_line(line: &str) -> Result<Option<Signal>, SafetyError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| SafetyError::Serialization(e.to_string()))
}

pub fn format_event(event: &Event) -> Result<String, SafetyError> {
    serde_json::to_string(event).map_err(|e| SafetyError::Serialization(e.to_string()))
}

/// Publish every well-formed line of `reader` to [`Topic::Signals`] until
/// EOF.  Returns the number of signals published.
pub async fn read_signals<R>(reader: R, bus: &EventBus) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut published = 0;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_signal_line(&line) {
                Ok(Some(signal)) => {
                    debug!(kind = signal.kind(), "signal received");
                    let event = Event::new(STDIN_SOURCE, EventPayload::Signal(signal));
                    match bus.publish_to(Topic::Signals, event) {
                        Ok(_) => published += 1,
                        Err(e) => warn!(error = %e, "signal dropped"),
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, %line, "skipping malformed signal line"),
            },
            Ok(None) => {
                info!(published, "signal input closed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "failed to read signal input");
                break;
            }
        }
    }
    published
}

/// Write every event received on `rx` to `out` as one JSON line.  Returns
/// the writer once the bus closes.
pub async fn forward_events<W: Write>(mut rx: TopicReceiver, mut out: W) -> W {
    let topic = rx.topic();
    loop {
        match rx.recv().await {
            Ok(event) => match format_event(&event) {
                Ok(line) => {
                    if let Err(e) = out.write_all(format!("{line}\n").as_bytes()).and_then(|_| out.flush()) {
                        warn!(?topic, error = %e, "failed to write event");
                    }
                }
                Err(e) => warn!(?topic, error = %e, "failed to encode event"),
            },
            Err(RecvError::Lagged(n)) => {
                warn!(?topic, lagged_by = n, "output lagged; events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
    out
}
