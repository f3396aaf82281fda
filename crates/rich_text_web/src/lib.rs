//! Browser (`wasm32`) implementations of [`rich_text_contract`] host contracts.
//!
//! This crate wires the headless editor to a live document: the `contenteditable` surface and
//! selection provider, engine detection from the user agent (or a cargo feature override), and
//! the new-tab follower used for modifier-clicked links.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time engine selection and runtime user-agent detection.
pub mod engine;
pub mod link_follow;
pub mod surface;

pub use engine::{detect_engine, engine_capabilities, selected_engine_selection, EngineSelection};
pub use link_follow::NewTabLinkFollower;
pub use surface::WebSurface;
