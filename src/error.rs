//! Error types for semnav.

use thiserror::Error;

/// Errors surfaced to callers.
///
/// Navigation itself never fails: empty categories and unknown commands are
/// recovered inside the navigator with an announcement or a no-op.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No active tab.")]
    NoActiveTarget,

    #[error("Unknown target: {0}")]
    UnknownTarget(u32),

    #[error("Invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Malformed request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a best-effort side effect (focus, scroll, speech).
///
/// These are logged and swallowed; they never stop an announcement.
#[derive(Error, Debug)]
pub enum EffectError {
    #[error("node cannot be focused")]
    NotFocusable,

    #[error("node cannot be scrolled into view")]
    NotScrollable,

    #[error("speech synthesis unavailable: {0}")]
    Speech(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
