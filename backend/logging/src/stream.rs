//! Live Log Stream
//!
//! A `tracing` layer that formats each event as one line and fans it out over a
//! broadcast channel, so a server can push its logs to websocket clients.

use std::fmt::Write as _;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Handle to the broadcast side of the log stream.
#[derive(Clone)]
pub struct LogStream {
    tx: broadcast::Sender<String>,
}

impl LogStream {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn layer(&self) -> BroadcastLayer {
        BroadcastLayer {
            tx: self.tx.clone(),
        }
    }
}

/// Emits `[<rfc3339>] LEVEL: message key=value ...` for every event.
pub struct BroadcastLayer {
    tx: broadcast::Sender<String>,
}

impl<S: Subscriber> Layer<S> for BroadcastLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if self.tx.receiver_count() == 0 {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let line = format!(
            "[{}] {}: {}",
            Utc::now().to_rfc3339(),
            event.metadata().level(),
            visitor.finish()
        );
        let _ = self.tx.send(line);
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_events_reach_subscribers() {
        let stream = LogStream::new(8);
        let mut rx = stream.subscribe();
        let subscriber = tracing_subscriber::registry().with(stream.layer());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(room = "room-1", "created dispatch");
        });

        let line = rx.try_recv().unwrap();
        assert!(line.contains("INFO: created dispatch"));
        assert!(line.contains("room=room-1"));
    }

    #[test]
    fn test_no_subscribers_is_silent() {
        let stream = LogStream::new(8);
        let subscriber = tracing_subscriber::registry().with(stream.layer());

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("nobody listening");
        });

        let mut late = stream.subscribe();
        assert!(late.try_recv().is_err());
    }
}
