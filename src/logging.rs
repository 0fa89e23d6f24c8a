//! Logging setup and the severity scale used by the server.
//!
//! Events go to stderr through `tracing-subscriber`; stdout carries the
//! protocol. The filter comes from `RUST_LOG`, defaulting to `ramlsp=info`.

use tower_lsp::lsp_types::MessageType;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "ramlsp=info";

/// Severity of a server message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Debug,
    /// Per-item detail, noisier than `Debug`.
    DebugDetail,
    /// One line per request or lifecycle step.
    DebugOverview,
    Warning,
    Error,
}

impl MessageSeverity {
    pub fn level(self) -> Level {
        match self {
            MessageSeverity::Debug => Level::DEBUG,
            MessageSeverity::DebugDetail => Level::TRACE,
            MessageSeverity::DebugOverview => Level::INFO,
            MessageSeverity::Warning => Level::WARN,
            MessageSeverity::Error => Level::ERROR,
        }
    }

    /// Message type used when the message is forwarded to the client.
    pub fn message_type(self) -> MessageType {
        match self {
            MessageSeverity::Debug | MessageSeverity::DebugDetail => MessageType::LOG,
            MessageSeverity::DebugOverview => MessageType::INFO,
            MessageSeverity::Warning => MessageType::WARNING,
            MessageSeverity::Error => MessageType::ERROR,
        }
    }
}

/// Emit `message` at the level matching `severity`.
pub fn log(severity: MessageSeverity, component: &str, message: &str) {
    match severity {
        MessageSeverity::DebugDetail => tracing::trace!(component, "{message}"),
        MessageSeverity::Debug => tracing::debug!(component, "{message}"),
        MessageSeverity::DebugOverview => tracing::info!(component, "{message}"),
        MessageSeverity::Warning => tracing::warn!(component, "{message}"),
        MessageSeverity::Error => tracing::error!(component, "{message}"),
    }
}

/// Install the stderr subscriber. Does nothing if one is already installed.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}
