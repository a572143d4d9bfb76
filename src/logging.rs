//! Console logging built on `tracing`.
//!
//! Engine code logs through the [`Log`] trait so the output backend can be
//! swapped in tests; the production [`Logger`] forwards to `tracing` events
//! rendered by the compact console formatter installed by
//! [`init_subscriber`]. Diagnostics go to stderr; stdout is reserved for
//! data output such as the `status` virtual tree.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::registry::LookupSpan;

/// Event target used to tag dry-run action messages.
const DRY_RUN_TARGET: &str = "rstow::dry_run";

/// Abstraction over logging backends.
pub trait Log: Send + Sync {
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed on console unless `--verbose`).
    fn debug(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
}

/// Production logger forwarding to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Logger;

impl Logger {
    /// Create a new logger.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Log for Logger {
    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }
}

/// Install the global console subscriber.
///
/// `verbose` lowers the level filter from INFO to DEBUG. Safe to call more
/// than once; later calls are no-ops.
pub fn init_subscriber(verbose: bool) {
    let filter = EnvFilter::new(if verbose { "debug" } else { "info" });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(ConsoleFormatter)
        .try_init();
}

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// Compact console format: a coloured severity prefix and the message.
struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = extractor.message;

        let level = *event.metadata().level();
        let target = event.metadata().target();

        match (level, target) {
            (tracing::Level::INFO, DRY_RUN_TARGET) => {
                writeln!(writer, "\x1b[33m[dry run]\x1b[0m {msg}")
            }
            (tracing::Level::ERROR, _) => writeln!(writer, "\x1b[31merror:\x1b[0m {msg}"),
            (tracing::Level::WARN, _) => writeln!(writer, "\x1b[33mwarning:\x1b[0m {msg}"),
            (tracing::Level::DEBUG, _) => writeln!(writer, "\x1b[2m{msg}\x1b[0m"),
            _ => writeln!(writer, "{msg}"),
        }
    }
}

/// In-memory log for unit tests; records `(level, message)` pairs.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: std::sync::Mutex<Vec<(&'static str, String)>>,
}

#[cfg(test)]
impl MemoryLog {
    /// Create an empty memory log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded `(level, message)` pairs, in order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        self.entries.lock().map_or_else(|_| Vec::new(), |g| g.clone())
    }

    /// Messages recorded at the given level.
    pub fn messages_at(&self, level: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    fn push(&self, level: &'static str, msg: &str) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push((level, msg.to_string()));
        }
    }
}

#[cfg(test)]
impl Log for MemoryLog {
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }

    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }

    fn info(&self, msg: &str) {
        self.push("info", msg);
    }

    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }

    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
}
