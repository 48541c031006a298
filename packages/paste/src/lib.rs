//! # Vellum Paste
//!
//! Turns host markup from the clipboard into a document fragment:
//!
//! ```text
//! markup string ──► tolerant parse ──► dispatch tables ──► Vec<Node>
//! ```
//!
//! The whole pipeline is lenient on purpose. Clipboard markup comes from
//! arbitrary applications; when structure cannot be mapped it degrades to
//! keeping the text rather than failing the paste.
//!
//! ```rust,ignore
//! use vellum_paste::deserialize;
//!
//! let fragment = deserialize("<p>hello <b>world</b></p>")?;
//! editor.insert_fragment(fragment)?;
//! ```

pub mod convert;
pub mod error;
pub mod markup;

pub use convert::{deserialize, deserialize_tree};
pub use error::{PasteError, PasteResult};
pub use markup::MarkupNode;
