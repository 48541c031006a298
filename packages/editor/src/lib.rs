//! # Vellum Editor
//!
//! Core document editing engine for Vellum.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: document tree (elements, text, …)    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: selection + commands + history      │
//! │  - Commands over the selection              │
//! │  - Invertible ops with batched undo         │
//! │  - Normalization after every batch          │
//! │  - Version counter for change observers     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ render / search: derived views              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is source of truth**: rendered output and search state
//!    are derived views
//! 2. **Every edit is an op**: commands decompose into invertible ops, so
//!    undo replays inverses instead of restoring snapshots
//! 3. **Commands are selection-relative**: without a selection they do
//!    nothing
//! 4. **The tree is always valid**: normalization repairs shape
//!    violations before a batch commits
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vellum_editor::{Editor, Mark};
//! use vellum_model::ElementKind;
//!
//! let mut editor = Editor::from_json(&saved)?;
//! editor.select_range(range);
//!
//! editor.toggle_mark(Mark::Bold)?;
//! editor.toggle_element(ElementKind::HeadingOne)?;
//! editor.set_link("https://example.com")?;
//!
//! editor.undo()?;
//! let json = editor.to_json()?;
//! ```

mod commands;
mod editor;
mod errors;
mod history;
mod normalize;
mod ops;
mod queries;
mod transforms;

pub use commands::{DraggableOptions, FieldQuery, SetPropertiesOptions};
pub use editor::Editor;
pub use errors::{EditorError, EditorResult};
pub use history::{Batch, History};
pub use ops::{transform_path, transform_point, Op, PropertyMap};
pub use transforms::{Edge, Target};

// Re-export common model types for convenience
pub use vellum_model::{
    Align, Element, ElementKind, Mark, Marks, Node, Path, Point, Range, Selection, Text,
};
