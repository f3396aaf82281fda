//! Shared UI primitives for rich-text editing.
//!
//! The crate owns the Leptos [`RichTextBody`] primitive: the editable surface a toolbar host
//! composes with. It binds DOM events to the headless reducer in `rich_text_core`, runs the
//! reducer's effects on the browser event loop, and exposes the stable `data-ui-*` DOM contract
//! consumed by shell CSS layers.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod rich_text;

pub use rich_text::{RichTextBody, RichTextBodyHandle};

/// Convenience imports for application crates embedding the editor.
pub mod prelude {
    pub use crate::{RichTextBody, RichTextBodyHandle};
    pub use rich_text_core::{CommandsPayload, EditorCommand, EditorConfig, LinkTarget};
}
