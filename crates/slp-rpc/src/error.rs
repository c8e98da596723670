//! Error types for node RPC operations.

/// Errors that can occur when talking to the node.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize or deserialize data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The node answered with a JSON-RPC error object.
    #[error("node error ({code}): {message}")]
    Node {
        /// The node's error code.
        code: i64,
        /// The node's error message, verbatim.
        message: String,
    },

    /// The node answered with something that is not a usable result.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// No async runtime could be entered for a blocking call.
    #[error("runtime error: {0}")]
    Runtime(String),
}
