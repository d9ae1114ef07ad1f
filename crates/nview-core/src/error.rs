//! Error types and handling for nview-core operations.
//!
//! Most failures below the root of a fetch never surface as an [`Error`]:
//! the document client absorbs them into a partial [`Fetched`](crate::Fetched)
//! outcome. This type covers the failures that *do* need to be reported,
//! plus the per-request errors the retry loop carries into its diagnostics.
//!
//! ## Error Categories
//!
//! - **Network Errors**: transport failures, timeouts, unexpected HTTP statuses
//! - **Serialization Errors**: malformed API responses, invalid TOML/JSON
//! - **Configuration Errors**: missing credentials, unreadable config files
//! - **Render Errors**: a single block whose payload cannot be rendered
//!
//! ```rust
//! use nview_core::Error;
//!
//! let err = Error::Config("NOTION_TOKEN is not set".to_string());
//! assert_eq!(err.category(), "config");
//! ```

use thiserror::Error;

/// The main error type for nview-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed (config file access, output stream writes).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// Wraps the underlying `reqwest::Error`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a status the client does not handle specially.
    #[error("HTTP {status} from {url}")]
    Http {
        /// Status code returned by the server.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// Configuration is missing, invalid or inaccessible.
    ///
    /// Raised once, before any request is made, when the API token is absent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A block could not be rendered.
    ///
    /// Isolated to the one block; siblings and descendants still render.
    #[error("Failed to render block {block_id}: {reason}")]
    Render {
        /// Identifier of the offending block.
        block_id: String,
        /// What was wrong with its payload.
        reason: String,
    },

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Get the error category as a string identifier.
    ///
    /// Useful for grouping failures in logs.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) | Self::Http { .. } => "network",
            Self::Config(_) => "config",
            Self::Render { .. } => "render",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        let err = Error::Http {
            status: 502,
            url: "https://api.notion.com/v1/search".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 502 from https://api.notion.com/v1/search"
        );

        let err = Error::Render {
            block_id: "abc".to_string(),
            reason: "missing field `rich_text`".to_string(),
        };
        assert!(err.to_string().contains("abc"));
        assert!(err.to_string().contains("rich_text"));
    }

    #[test]
    fn test_error_categories() {
        let cases = vec![
            (Error::Io(io::Error::other("x")), "io"),
            (
                Error::Http {
                    status: 500,
                    url: String::new(),
                },
                "network",
            ),
            (Error::Config("x".to_string()), "config"),
            (
                Error::Render {
                    block_id: "b".to_string(),
                    reason: "r".to_string(),
                },
                "render",
            ),
            (Error::Serialization("x".to_string()), "serialization"),
        ];

        for (error, expected) in cases {
            assert_eq!(error.category(), expected);
        }
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let converted: Error = err.into();
        assert!(matches!(converted, Error::Serialization(_)));
    }

    #[test]
    fn test_error_size() {
        let error_size = std::mem::size_of::<Error>();
        assert!(error_size <= 64, "Error type too large: {error_size} bytes");
    }

    proptest! {
        #[test]
        fn test_config_error_with_arbitrary_messages(msg in r".{0,200}") {
            let error = Error::Config(msg.clone());
            prop_assert!(error.to_string().contains("Configuration error"));
            prop_assert!(error.to_string().contains(&msg));
        }
    }
}
