//! # Vellum Render
//!
//! Pure rendering of a document tree into a serializable virtual DOM.
//! No state lives here: callers pass the children of an editor (or any
//! fragment) plus the decorations to overlay, and get a [`VDocument`]
//! back. Re-rendering after every change is the intended usage.
//!
//! ```rust,ignore
//! use vellum_render::render_document;
//!
//! let vdoc = render_document(editor.children(), &decorations);
//! for node in vdoc.elements() {
//!     println!("{:?}", node.tag());
//! }
//! ```

pub mod render;
pub mod vdom;

pub use render::{render_document, render_element, render_with};
pub use vdom::{VDocument, VNode};
