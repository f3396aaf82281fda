//! Editable-surface and selection contracts.
//!
//! Node references handed out by a host are [`NodeHandle`] lookups into the live document. They
//! are only meaningful for the event that produced them: hosts may recycle handles between
//! events, so callers re-query instead of caching a handle across an event boundary.

use serde::{Deserialize, Serialize};

/// Opaque, event-scoped handle to a node inside the editable surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeHandle(pub u64);

/// Coarse node classification exposed by hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Element node (tag available through [`EditorSurface::tag_name`]).
    Element,
    /// Text node.
    Text,
    /// Any other node type (comments, fragments, documents).
    Other,
}

/// Anchor/focus points of the active selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPoints {
    /// Node where the selection started.
    pub anchor: NodeHandle,
    /// Node where the selection ends (the caret for collapsed selections).
    pub focus: NodeHandle,
    /// Whether anchor and focus are at the same position.
    pub is_collapsed: bool,
}

/// Attributes for an anchor element constructed node-by-node by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSpec {
    /// Link destination.
    pub href: String,
    /// Visible link text.
    pub text: String,
    /// Class applied to the anchor.
    pub class: String,
    /// Browsing-context target (for example `_blank`).
    pub target: String,
}

/// Query and mutation primitives of the editable region plus its native formatting facility.
pub trait EditorSurface {
    /// Returns the editable root element.
    fn root(&self) -> NodeHandle;

    /// Returns the node classification, or `None` for a stale handle.
    fn node_kind(&self, node: NodeHandle) -> Option<NodeKind>;

    /// Returns the upper-case tag name for element nodes.
    fn tag_name(&self, node: NodeHandle) -> Option<String>;

    /// Returns the parent node of `node`.
    fn parent_node(&self, node: NodeHandle) -> Option<NodeHandle>;

    /// Returns the parent of `node` when that parent is an element.
    fn parent_element(&self, node: NodeHandle) -> Option<NodeHandle>;

    /// Returns the direct children of `node` in document order.
    fn child_nodes(&self, node: NodeHandle) -> Vec<NodeHandle>;

    /// Returns the rendered text of `node` (`innerText` for elements, data for text nodes).
    fn visible_text(&self, node: NodeHandle) -> String;

    /// Reads an attribute from an element node.
    fn attribute(&self, node: NodeHandle, name: &str) -> Option<String>;

    /// Adds a class token to an element node.
    fn add_class(&mut self, node: NodeHandle, class: &str);

    /// Removes a class token from an element node.
    fn remove_class(&mut self, node: NodeHandle, class: &str);

    /// Returns every anchor element inside the surface in document order.
    fn query_anchors(&self) -> Vec<NodeHandle>;

    /// Serializes the surface content (`innerHTML`).
    fn inner_html(&self) -> String;

    /// Parses `html` and inserts it before the first child of the surface.
    fn insert_html_at_start(&mut self, html: &str);

    /// Detaches `node` from its parent.
    fn remove_node(&mut self, node: NodeHandle);

    /// Moves input focus to the surface.
    fn focus(&mut self);

    /// Turns on native editing for the surface.
    fn enable_design_mode(&mut self);

    /// Runs a native formatting command. The return value is advisory.
    fn exec_command(&mut self, command: &str, value: Option<&str>) -> bool;

    /// Reports whether a native formatting command is active for the selection.
    fn query_command_state(&self, command: &str) -> bool;

    /// Reads the current value of a native formatting command (for example `ForeColor`).
    fn query_command_value(&self, command: &str) -> Option<String>;

    /// Deletes the selection contents and inserts a new anchor at the selection point.
    fn insert_anchor_at_selection(&mut self, anchor: &AnchorSpec) -> Option<NodeHandle>;

    /// Attaches the modified-click interception listener to an anchor.
    fn attach_anchor_click_listener(&mut self, anchor: NodeHandle);

    /// Reports whether [`EditorSurface::attach_anchor_click_listener`] already ran for `anchor`.
    ///
    /// Hosts track this outside the markup so the serialized content stays free of editor state.
    fn has_anchor_click_listener(&self, anchor: NodeHandle) -> bool;
}

/// Native text-selection query facility.
pub trait SelectionProvider {
    /// Returns the active selection, or `None` when nothing is selected inside the surface.
    fn selection(&self) -> Option<SelectionPoints>;

    /// Returns the plain-text content of the active selection.
    fn selection_text(&self) -> String;
}

/// Combined host dependency injected into the editor.
pub trait EditorHost: EditorSurface + SelectionProvider {}

impl<T: EditorSurface + SelectionProvider + ?Sized> EditorHost for T {}

/// Returns whether `node` is an element with the given upper-case tag.
pub fn is_element_tag<S: EditorSurface + ?Sized>(surface: &S, node: NodeHandle, tag: &str) -> bool {
    surface
        .tag_name(node)
        .map(|name| name.eq_ignore_ascii_case(tag))
        .unwrap_or(false)
}
