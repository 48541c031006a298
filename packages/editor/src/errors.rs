//! Error types for the editor

use thiserror::Error;
use vellum_model::{ModelError, Path};

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("no node at path {path}")]
    InvalidPath { path: Path },

    #[error("expected a text leaf at path {path}")]
    NotAText { path: Path },

    #[error("expected an element at path {path}")]
    NotAnElement { path: Path },

    #[error("offset {offset} out of bounds for text of {len} chars at {path}")]
    InvalidOffset { path: Path, offset: usize, len: usize },

    #[error("cannot merge node at {path} into its previous sibling")]
    InvalidMerge { path: Path },

    #[error("cannot split node at {path} at position {position}")]
    InvalidSplit { path: Path, position: usize },

    #[error("invalid property patch: {reason}")]
    InvalidPatch { reason: String },

    #[error("model violation: {0}")]
    Model(#[from] ModelError),

    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

impl EditorError {
    pub fn invalid_path(path: &Path) -> Self {
        EditorError::InvalidPath { path: path.clone() }
    }

    pub fn invalid_patch(reason: impl Into<String>) -> Self {
        EditorError::InvalidPatch {
            reason: reason.into(),
        }
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
