// ABOUTME: Error taxonomy for parley — model, interaction log, checkpoint, and config failures.
// ABOUTME: Library code returns these typed errors; the binary wraps them in anyhow at the edge.

use std::path::PathBuf;

use thiserror::Error;

/// A failed model invocation. Recovered locally by the session loop.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("network error talking to {provider}: {source}")]
    Network {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} rejected the credentials (HTTP {status}): {message}")]
    Auth {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} rate-limited the request: {message}")]
    RateLimited {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned HTTP {status}: {message}")]
    Http {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("malformed response from {provider}: {message}")]
    MalformedResponse {
        provider: &'static str,
        message: String,
    },

    #[error("checkpoint store failed: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Failure to append a block to the interaction log file.
///
/// `Corrupt` and `NotAnArray` mean the existing file was left untouched.
#[derive(Debug, Error)]
pub enum InteractionLogError {
    #[error("interaction log {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("interaction log {path} does not contain a JSON array")]
    NotAnArray { path: PathBuf },

    #[error("failed to serialize interaction log: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("i/o error on interaction log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a file-backed checkpoint store.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("i/o error on checkpoint {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("checkpoint {path} could not be decoded: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("checkpoint {path} could not be encoded: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("checkpoint {path} belongs to thread '{found}', not '{expected}'")]
    ThreadMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}

/// Startup configuration failure. Fatal before the session loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("provider '{provider}' requires the {var} environment variable")]
    MissingCredential { provider: String, var: &'static str },

    #[error("unknown LLM provider '{0}'. Expected: ollama, google_genai, gemini")]
    UnknownProvider(String),

    #[error("invalid model spec '{0}': expected provider:model")]
    InvalidModelSpec(String),

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
