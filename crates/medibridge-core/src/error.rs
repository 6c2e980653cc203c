//! Error taxonomy shared by the normalizer, the stager and the upstream client.
//!
//! Every variant maps to one HTTP status so the server layer can render a
//! `{"detail": ...}` body without inspecting the error further.

use std::io;

/// Upstream bodies quoted in error details are cut to this many characters.
pub const DETAIL_BODY_LIMIT: usize = 1200;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Malformed payload, bad filename, non-PDF, non-share directory.
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    /// Request body above the configured upload limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Upstream answered, but not with the status we require.
    #[error("{endpoint} responded {status}. Body: {body}")]
    UpstreamRejected {
        endpoint: String,
        status: u32,
        body: String,
    },

    /// Transport failure (connect, timeout, reset). `detail` carries any
    /// partially received body when one exists.
    #[error("error calling {endpoint}: {detail}")]
    UpstreamUnreachable { endpoint: String, detail: String },

    /// Upstream answered with a body we could not interpret.
    #[error("invalid response from {endpoint}: {detail}")]
    UpstreamInvalid { endpoint: String, detail: String },

    #[error("{context}: {source}")]
    Filesystem {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("database error: {0}")]
    Database(String),

    #[error("{0}")]
    Internal(String),
}

impl BridgeError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        BridgeError::InvalidInput(msg.into())
    }

    pub fn filesystem(context: impl Into<String>, source: io::Error) -> Self {
        BridgeError::Filesystem {
            context: context.into(),
            source,
        }
    }

    /// HTTP status code this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            BridgeError::InvalidInput(_) => 400,
            BridgeError::NotFound(_) => 404,
            BridgeError::PayloadTooLarge(_) => 413,
            BridgeError::UpstreamRejected { .. }
            | BridgeError::UpstreamUnreachable { .. }
            | BridgeError::UpstreamInvalid { .. } => 502,
            BridgeError::Filesystem { .. } | BridgeError::Database(_) | BridgeError::Internal(_) => {
                500
            }
        }
    }
}

/// Truncate `body` to [`DETAIL_BODY_LIMIT`] characters (not bytes).
pub fn truncate_detail(body: &str) -> String {
    match body.char_indices().nth(DETAIL_BODY_LIMIT) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
