//! Import error types.
use thiserror::Error;

use tributary_core::error::FixedError;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("snapshot is not valid JSON: {0}")] Json(#[from] serde_json::Error),
    #[error("node with empty id")] EmptyNodeId,
    #[error("edge with empty endpoint: {from:?} -> {to:?}")] EmptyEdgeEndpoint { from: String, to: String },
    #[error("node {id}, field {field}: {source}")] InvalidFactor { id: String, field: &'static str, source: FixedError },
    #[error("edge {from} -> {to}: {source}")] InvalidEdgeWeight { from: String, to: String, source: FixedError },
}
