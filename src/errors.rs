use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Domain and infrastructure errors surfaced by the catalogue, router and
/// codec. Per-request lookups map the NotFound variants to an
/// `error_message` response; everything else aborts the current phase.
#[derive(Error, Debug)]
pub enum Error {
    #[error("stop '{0}' does not exist in catalogue")]
    StopNotFound(String),

    #[error("route '{0}' does not exist in catalogue")]
    RouteNotFound(String),

    #[error("no distance recorded between stops '{from}' and '{to}'")]
    DistanceNotFound { from: String, to: String },

    #[error("first and last stops of circular route '{0}' must be equal")]
    CircleEndpointsMismatch(String),

    #[error("I/O error accessing '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode catalogue blob: {0}")]
    Schema(#[from] prost::DecodeError),

    #[error("unsupported catalogue blob schema version {found}, expected {expected}")]
    SchemaVersion { found: u32, expected: u32 },

    #[error("catalogue blob is inconsistent: {0}")]
    SchemaInvalid(String),

    #[error("JSON document error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for lookup failures that a stat request reports as
    /// `"not found"` instead of aborting the phase.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::StopNotFound(_) | Error::RouteNotFound(_) | Error::DistanceNotFound { .. }
        )
    }
}
