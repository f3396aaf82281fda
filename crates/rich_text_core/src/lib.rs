//! Headless editing engine for the editable rich-text surface.
//!
//! The crate owns every decision the surface makes: link classification, command dispatch,
//! model sync, the debounced commit, and the clickable-link affordance. It talks to the live
//! document only through the [`rich_text_contract::EditorHost`] seam and reports host work as
//! [`EditorEffect`] values, so the same reducer drives the browser surface and the in-memory
//! surface used by tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod classifier;
pub mod color;
pub mod command;
pub mod links;
pub mod model;
pub mod reducer;
pub mod sync;

pub use classifier::{classify_selection, link_target, LinkClassification};
pub use color::{rgb_to_hex, ColorParseError};
pub use command::{selection_commands, CommandRequest, EditorCommand, FORMAT_COMMANDS};
pub use links::{anchor_spec, attach_click_interception, link_markup, AffordanceToggle};
pub use model::{
    CommandsPayload, CommitTask, EditorConfig, EditorState, KeyInput, LinkTarget, Modifiers,
};
pub use reducer::{reduce_editor, DeferredStep, EditorAction, EditorEffect, EditorError};
pub use sync::{initialize_surface_from_model, remove_stray_line_break};
