use thiserror::Error;

use vellum_model::ModelError;

pub type PasteResult<T> = Result<T, PasteError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PasteError {
    /// The converted fragment failed shape validation. Conversion always
    /// fills childless elements, so hitting this is a converter bug, not
    /// bad input.
    #[error("pasted fragment failed validation: {0}")]
    InvalidFragment(#[from] ModelError),
}
