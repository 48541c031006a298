//! Document model for the Vellum rich-text engine.
//!
//! Owns the node tree types, path/range addressing and the persisted JSON
//! schema. Everything here is pure data: mutation lives in `vellum-editor`,
//! projection in `vellum-render`.

pub mod node;
pub mod path;
pub mod range;
pub mod text;
pub mod validate;
pub mod walk;

pub use node::{Align, Element, ElementKind, Float, ImageSource, Node, LIST_KINDS, WRAP_KINDS};
pub use path::Path;
pub use range::{Decoration, Point, Range, Selection};
pub use text::{
    AdvancedHighlight, FontSize, Highlight, Mark, Marks, SearchAnnotation, Text,
};
pub use validate::{validate_document, validate_fragment, ModelError, ModelResult};
