//! Typed host contracts for the editable rich-text surface.
//!
//! This crate is the API-first boundary between the headless editor in `rich_text_core` and the
//! environment that owns the live document. It exposes the surface/selection traits, the engine
//! capability descriptor resolved once per environment, the link-following contract, and an
//! in-memory surface used by tests. Concrete browser adapters live in `rich_text_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod engine;
pub mod link_follow;
pub mod memory;
pub mod surface;

pub use engine::{EngineCapabilities, EngineProfile, LinkInsertion, SelectionStrategy};
pub use link_follow::{followable_href, FollowFuture, InertLinkFollower, LinkFollower};
pub use memory::MemorySurface;
pub use surface::{
    is_element_tag, AnchorSpec, EditorHost, EditorSurface, NodeHandle, NodeKind,
    SelectionPoints, SelectionProvider,
};
