//! Error handling for Remixer
//!
//! Every failure is terminal for the invocation that produced it. Each
//! category carries one end-user message; the lower-level detail is meant
//! for the log only.

use thiserror::Error;

/// Result type alias for Remixer operations
pub type Result<T> = std::result::Result<T, RemixError>;

/// Why the offline renderer could not produce a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFailure {
    /// The output buffer could not be allocated or exceeds the sample limit
    ResourceExhausted,
    /// The graph contains a stage combination the renderer cannot execute
    UnsupportedGraph,
    /// Anything else
    Other,
}

impl RenderFailure {
    fn as_str(&self) -> &'static str {
        match self {
            RenderFailure::ResourceExhausted => "resource exhausted",
            RenderFailure::UnsupportedGraph => "unsupported graph",
            RenderFailure::Other => "render failed",
        }
    }
}

impl std::fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for Remixer operations
#[derive(Error, Debug)]
pub enum RemixError {
    // Input Errors
    #[error("Input too large: {size} bytes (maximum {limit} bytes)")]
    Oversize { size: u64, limit: u64 },

    #[error("Cannot decode audio: {reason}")]
    Decode {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid audio buffer: {reason}")]
    InvalidAudio { reason: String },

    #[error("Unknown effect: {name}")]
    UnknownEffect { name: String },

    // Processing Errors
    #[error("Render error ({kind}): {reason}")]
    Render { kind: RenderFailure, reason: String },

    #[error("WAV encoding failed: {reason}")]
    Encode { reason: String },

    #[error("Processing cancelled")]
    Cancelled,

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl RemixError {
    /// Shorthand for a decode error without an underlying source
    pub fn decode(reason: impl Into<String>) -> Self {
        RemixError::Decode {
            reason: reason.into(),
            source: None,
        }
    }

    /// Shorthand for a render error
    pub fn render(kind: RenderFailure, reason: impl Into<String>) -> Self {
        RemixError::Render {
            kind,
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            RemixError::Oversize { .. } => "OVERSIZE",
            RemixError::Decode { .. } => "DECODE_ERROR",
            RemixError::InvalidAudio { .. } => "INVALID_AUDIO",
            RemixError::UnknownEffect { .. } => "UNKNOWN_EFFECT",
            RemixError::Render { .. } => "RENDER_ERROR",
            RemixError::Encode { .. } => "ENCODE_ERROR",
            RemixError::Cancelled => "CANCELLED",
            RemixError::Io(_) => "IO_ERROR",
            RemixError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// True when the failure was caused by running out of memory
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(
            self,
            RemixError::Render {
                kind: RenderFailure::ResourceExhausted,
                ..
            }
        )
    }

    /// Get a user-facing message for this error
    ///
    /// Never includes the underlying diagnostic detail.
    pub fn friendly_message(&self) -> String {
        match self {
            RemixError::Oversize { limit, .. } => format!(
                "The file is too large. Maximum size is {} MB.",
                limit / (1024 * 1024)
            ),
            RemixError::Decode { .. } | RemixError::InvalidAudio { .. } => {
                "This file could not be read as audio. Try another file.".to_string()
            }
            RemixError::Render { .. } if self.is_resource_exhaustion() => {
                "Not enough memory to process this file. Try a smaller file.".to_string()
            }
            RemixError::Render { .. } | RemixError::Encode { .. } => {
                "Processing failed. Try another file.".to_string()
            }
            RemixError::UnknownEffect { name } => {
                format!("'{}' is not a known effect.", name)
            }
            RemixError::Cancelled => "Processing was cancelled.".to_string(),
            RemixError::Io(_) => "The file could not be read or written.".to_string(),
            RemixError::Config(_) => "The configuration file is invalid.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = RemixError::Oversize {
            size: 20,
            limit: 10,
        };
        assert_eq!(err.error_code(), "OVERSIZE");
        assert_eq!(RemixError::decode("bad header").error_code(), "DECODE_ERROR");
        assert_eq!(RemixError::Cancelled.error_code(), "CANCELLED");
    }

    #[test]
    fn test_resource_exhaustion_message() {
        let err = RemixError::render(RenderFailure::ResourceExhausted, "alloc failed");
        assert!(err.is_resource_exhaustion());
        assert!(err.friendly_message().contains("memory"));

        let other = RemixError::render(RenderFailure::Other, "boom");
        assert!(!other.is_resource_exhaustion());
        assert!(!other.friendly_message().contains("boom"));
    }

    #[test]
    fn test_oversize_message_mentions_limit() {
        let err = RemixError::Oversize {
            size: 200 * 1024 * 1024,
            limit: 150 * 1024 * 1024,
        };
        assert!(err.friendly_message().contains("150 MB"));
    }

    #[test]
    fn test_decode_detail_stays_out_of_friendly_message() {
        let err = RemixError::decode("unexpected EOF in frame 12");
        assert!(!err.friendly_message().contains("EOF"));
        assert!(err.to_string().contains("EOF"));
    }
}
