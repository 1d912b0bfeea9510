#![forbid(unsafe_code)]

//! `tracing` layer that forwards events to a browser-style console.
//!
//! Events are rendered as one line, `LEVEL target: message key=value ...`,
//! and handed to a [`ConsoleSink`] together with their severity. The WASM
//! build plugs in a sink backed by `console.*`; tests plug in a recorder.

use std::fmt::Write as FmtWrite;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Console method an event is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl From<&Level> for ConsoleLevel {
    fn from(level: &Level) -> Self {
        match *level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// Destination for formatted log lines.
pub trait ConsoleSink: Send + Sync + 'static {
    fn write_line(&self, level: ConsoleLevel, line: &str);
}

/// A tracing layer that writes every enabled event to a [`ConsoleSink`].
pub struct ConsoleLayer<W> {
    sink: W,
    max_level: Level,
}

impl<W: ConsoleSink> ConsoleLayer<W> {
    /// Forward events at `max_level` and more severe.
    pub fn new(sink: W, max_level: Level) -> Self {
        Self { sink, max_level }
    }

    pub fn max_level(&self) -> Level {
        self.max_level
    }
}

impl<S, W> Layer<S> for ConsoleLayer<W>
where
    S: Subscriber,
    W: ConsoleSink,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        *metadata.level() <= self.max_level
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Callsite interest is shared across subscribers; re-check here.
        if *metadata.level() > self.max_level {
            return;
        }
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let mut line = format!("{} {}", metadata.level(), metadata.target());
        if let Some(message) = visitor.message {
            let _ = write!(line, ": {message}");
        }
        if !visitor.fields.is_empty() {
            line.push(' ');
            line.push_str(&visitor.fields);
        }
        self.sink.write_line(metadata.level().into(), &line);
    }
}

/// Collects the message and renders the remaining fields as `key=value`.
#[derive(Default)]
struct LineVisitor {
    message: Option<String>,
    fields: String,
}

impl LineVisitor {
    fn push_field(&mut self, name: &str, value: &dyn core::fmt::Display) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn core::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.push_field(field.name(), &format_args!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.push_field(field.name(), &value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_field(field.name(), &value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_field(field.name(), &value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_field(field.name(), &value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push_field(field.name(), &value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push_field(field.name(), &value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(ConsoleLevel, String)>>>);

    impl ConsoleSink for Recorder {
        fn write_line(&self, level: ConsoleLevel, line: &str) {
            self.0.lock().unwrap().push((level, line.to_string()));
        }
    }

    fn capture(max_level: Level, f: impl FnOnce()) -> Vec<(ConsoleLevel, String)> {
        let recorder = Recorder::default();
        let subscriber =
            tracing_subscriber::registry().with(ConsoleLayer::new(recorder.clone(), max_level));
        tracing::subscriber::with_default(subscriber, f);
        let lines = recorder.0.lock().unwrap().clone();
        lines
    }

    #[test]
    fn formats_message_and_fields() {
        let lines = capture(Level::DEBUG, || {
            tracing::info!(target: "folio", open = true, links = 4_u64, "mobile menu toggled");
        });
        assert_eq!(
            lines,
            vec![(
                ConsoleLevel::Info,
                "INFO folio: mobile menu toggled open=true links=4".to_string()
            )]
        );
    }

    #[test]
    fn routes_levels_and_filters_verbose_events() {
        let lines = capture(Level::INFO, || {
            tracing::error!(target: "folio", "boom");
            tracing::warn!(target: "folio", "careful");
            tracing::debug!(target: "folio", "hidden");
            tracing::trace!(target: "folio", "hidden too");
        });
        let levels: Vec<ConsoleLevel> = lines.iter().map(|(level, _)| *level).collect();
        assert_eq!(levels, vec![ConsoleLevel::Error, ConsoleLevel::Warn]);
    }

    #[test]
    fn debug_fields_use_debug_formatting() {
        let lines = capture(Level::TRACE, || {
            let current: Option<usize> = Some(2);
            tracing::trace!(target: "folio", current = ?current, "active link changed");
        });
        assert_eq!(lines[0].0, ConsoleLevel::Debug);
        assert_eq!(
            lines[0].1,
            "TRACE folio: active link changed current=Some(2)"
        );
    }

    #[test]
    fn event_without_message() {
        let lines = capture(Level::INFO, || {
            tracing::info!(target: "folio", sender = "Ada");
        });
        assert_eq!(lines[0].1, "INFO folio sender=Ada");
    }
}
