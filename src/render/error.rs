use std::path::PathBuf;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
