//! slog-based audit logging for review decisions.
//!
//! Request/response logging goes through `tracing`; this logger only records
//! status transitions so the decision trail can be shipped separately.

use slog::{o, Discard, Drain, Logger};
use slog_async::Async;
use slog_term::{FullFormat, TermDecorator};

/// Configuration for setting up the logger
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    async_buffer_size: usize,
    use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            async_buffer_size: 1024,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }
}

/// Sets up a terminal logger behind an async drain
pub fn setup_logger(config: LoggerConfig) -> Logger {
    let decorator = {
        let builder = TermDecorator::new().stderr();
        let builder = if config.use_color {
            builder.force_color()
        } else {
            builder
        };
        builder.build()
    };

    let drain = FullFormat::new(decorator).build().fuse();

    let drain = Async::new(drain)
        .chan_size(config.async_buffer_size)
        .build()
        .fuse();

    Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// Logger that drops every record.
pub fn discard_logger() -> Logger {
    Logger::root(Discard, o!())
}

/// Child logger tagged for review decisions.
pub fn audit_logger(base: &Logger) -> Logger {
    base.new(o!("component" => "review_audit"))
}
