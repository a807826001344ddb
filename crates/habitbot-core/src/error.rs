use std::fmt;
use thiserror::Error;

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What went wrong, independent of where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure or timeout talking to the bot platform. Retryable.
    Transport,
    /// The bot platform answered, but rejected the request.
    Api,
    /// An event the processor has no handler for.
    UnknownEventType,
    /// A message event whose metadata is missing or unusable.
    Meta,
    /// The habit-creation collaborator failed.
    DialogCommit,
    /// The dialog coordinator is gone or cannot take more input.
    DialogClosed,
    /// Persistent storage error.
    Storage,
    /// Configuration error.
    Config,
    /// Unrecoverable startup failure (bad token, unreachable platform).
    Startup,
    /// I/O error.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Transport => "transport error",
            Self::Api => "bot api error",
            Self::UnknownEventType => "unknown event type",
            Self::Meta => "unknown meta type",
            Self::DialogCommit => "habit commit failed",
            Self::DialogClosed => "dialog unavailable",
            Self::Storage => "storage error",
            Self::Config => "config error",
            Self::Startup => "startup error",
            Self::Io => "io error",
        };
        f.write_str(s)
    }
}

/// Top-level error type for habitbot.
///
/// Carries a [`ErrorKind`] for classification, a short context describing
/// the failed operation, and optionally the underlying cause. The cause's
/// message is kept in the rendered text.
#[derive(Debug, Error)]
#[error("{context}: {kind}{}", render_cause(.source))]
pub struct BotError {
    kind: ErrorKind,
    context: String,
    #[source]
    source: Option<Cause>,
}

fn render_cause(source: &Option<Cause>) -> String {
    match source {
        Some(cause) => format!(": {cause}"),
        None => String::new(),
    }
}

impl BotError {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
            source: None,
        }
    }

    /// Attach an underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Cause>,
    {
        self.source = Some(source.into());
        self
    }

    pub fn transport<E: Into<Cause>>(context: impl Into<String>, source: E) -> Self {
        Self::new(ErrorKind::Transport, context).with_source(source)
    }

    pub fn storage<E: Into<Cause>>(context: impl Into<String>, source: E) -> Self {
        Self::new(ErrorKind::Storage, context).with_source(source)
    }

    pub fn config(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, context)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Whether retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::Transport
    }
}

impl From<std::io::Error> for BotError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, "i/o failed").with_source(e)
    }
}

impl From<serde_json::Error> for BotError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(ErrorKind::Api, "malformed payload").with_source(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_cause() {
        let err = BotError::new(ErrorKind::UnknownEventType, "can't process message");
        assert_eq!(err.to_string(), "can't process message: unknown event type");
    }

    #[test]
    fn test_display_keeps_cause_text() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = BotError::transport("can't get events", io);
        assert_eq!(
            err.to_string(),
            "can't get events: transport error: connection refused"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(BotError::new(ErrorKind::Transport, "x").is_retryable());
        assert!(!BotError::new(ErrorKind::Api, "x").is_retryable());
        assert!(!BotError::new(ErrorKind::Meta, "x").is_retryable());
    }

    #[test]
    fn test_io_conversion_kind() {
        let err: BotError = std::io::Error::other("disk").into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
