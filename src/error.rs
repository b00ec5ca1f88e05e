//! The single error type threaded through the builder, loader, and runtime.
//! Every variant here is surfaced to the caller; failures the runtime
//! swallows or logs on its own (e.g. a send racing shutdown) never reach a
//! `Result` at all.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PetriNetError>;

#[derive(Debug, Error)]
pub enum PetriNetError {
    #[error("name `{0}` is already used by a place or transition")]
    DuplicateName(String),

    #[error("arc references unknown node `{0}`")]
    UnknownEndpoint(String),

    #[error("invalid arc from `{from}` to `{to}`: endpoints must be one place and one transition")]
    InvalidArc { from: String, to: String },

    #[error("arc weight must be at least 1, got {weight}")]
    InvalidWeight { weight: i64 },

    #[error("place `{name}` cannot start with a negative token count ({tokens})")]
    InvalidTokens { name: String, tokens: i64 },

    #[error("invalid JSON net description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read net description at {path}: {source}")]
    LoadIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write state-trace file at {path}: {source}")]
    TraceIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
