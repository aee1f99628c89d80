use chrono::{DateTime, Local};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A single timestamped line destined for the operator-facing log.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Local>,
    pub text: String,
}

impl LogEvent {
    fn now(text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            text: text.into(),
        }
    }
}

/// Everything the core reports to the presentation layer.
#[derive(Debug, Clone)]
pub enum ControlEvent {
    Log(LogEvent),
    StatusChanged { service: String, running: bool },
    BusyChanged { service: String, busy: bool },
}

/// Sending half of the event channel, shared by every component.
///
/// Events are stamped at emission, so timestamps are non-decreasing in the
/// order the receiver sees them. Sends are best-effort: once the receiver is
/// gone the core keeps working and events are dropped.
#[derive(Clone)]
pub struct EventSink {
    tx: UnboundedSender<ControlEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, UnboundedReceiver<ControlEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn log(&self, text: impl Into<String>) {
        let event = LogEvent::now(text);
        tracing::debug!(text = %event.text, "log event");
        let _ = self.tx.send(ControlEvent::Log(event));
    }

    pub fn status_changed(&self, service: &str, running: bool) {
        tracing::debug!(service, running, "status changed");
        let _ = self.tx.send(ControlEvent::StatusChanged {
            service: service.to_string(),
            running,
        });
    }

    pub fn busy_changed(&self, service: &str, busy: bool) {
        tracing::trace!(service, busy, "busy changed");
        let _ = self.tx.send(ControlEvent::BusyChanged {
            service: service.to_string(),
            busy,
        });
    }
}
