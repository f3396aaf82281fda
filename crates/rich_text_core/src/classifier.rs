//! Decides whether the selection sits inside (or next to) a hyperlink and finds that anchor.
//!
//! No single selection API reports "the caret is in a link" consistently across engines, so the
//! classifier chains independent heuristics in a fixed priority order:
//!
//! 1. the focus node's parent element (or the anchor node's parent node) is an anchor;
//! 2. engine fallback: the anchor node's first child, or the focus node itself, is an anchor;
//! 3. ancestor walk upward from the focus point to the surface root;
//! 4. engine fallback: an anchor whose visible text equals the selected text.
//!
//! A miss is always preferred over a wrong hit, since editing a misidentified link rewrites
//! unrelated markup.

use rich_text_contract::{
    is_element_tag, EditorHost, EditorSurface, NodeHandle, SelectionPoints, SelectionStrategy,
};

use crate::model::LinkTarget;

const ANCHOR_TAG: &str = "A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Result of classifying the current selection.
pub struct LinkClassification {
    /// Whether the selection intersects a link.
    pub is_link: bool,
    /// The intersected anchor. Valid only for the current event.
    pub link_element: Option<NodeHandle>,
}

impl LinkClassification {
    /// Classification for a selection outside any link.
    pub const fn not_link() -> Self {
        Self {
            is_link: false,
            link_element: None,
        }
    }

    fn found(anchor: NodeHandle) -> Self {
        Self {
            is_link: true,
            link_element: Some(anchor),
        }
    }
}

/// Classifies the host's current selection.
pub fn classify_selection<H: EditorHost + ?Sized>(
    host: &H,
    strategy: SelectionStrategy,
) -> LinkClassification {
    let Some(points) = host.selection() else {
        return LinkClassification::not_link();
    };

    direct_parent_anchor(host, points)
        .or_else(|| {
            strategy
                .probe_anchor_children
                .then(|| probed_anchor(host, points))
                .flatten()
        })
        .or_else(|| ancestor_anchor(host, points))
        .or_else(|| {
            strategy
                .text_match_fallback
                .then(|| anchor_with_matching_text(host, points))
                .flatten()
        })
        .map(LinkClassification::found)
        .unwrap_or_else(LinkClassification::not_link)
}

/// Reads the host-facing snapshot of an anchor.
pub fn link_target<S: EditorSurface + ?Sized>(surface: &S, anchor: NodeHandle) -> LinkTarget {
    LinkTarget {
        href: surface.attribute(anchor, "href"),
        text: surface.visible_text(anchor),
    }
}

fn is_anchor<S: EditorSurface + ?Sized>(surface: &S, node: NodeHandle) -> bool {
    is_element_tag(surface, node, ANCHOR_TAG)
}

/// Parent of a selection point, or `None` when the point is the surface root itself.
fn parent_in_surface<H: EditorHost + ?Sized>(host: &H, node: NodeHandle) -> Option<NodeHandle> {
    if node == host.root() {
        return None;
    }
    host.parent_node(node)
}

fn direct_parent_anchor<H: EditorHost + ?Sized>(
    host: &H,
    points: SelectionPoints,
) -> Option<NodeHandle> {
    if points.focus == host.root() {
        return None;
    }
    host.parent_element(points.focus)
        .filter(|element| is_anchor(host, *element))
        .or_else(|| parent_in_surface(host, points.anchor).filter(|node| is_anchor(host, *node)))
}

fn probed_anchor<H: EditorHost + ?Sized>(host: &H, points: SelectionPoints) -> Option<NodeHandle> {
    host.child_nodes(points.anchor)
        .first()
        .copied()
        .filter(|child| is_anchor(host, *child))
        .or_else(|| Some(points.focus).filter(|focus| is_anchor(host, *focus)))
}

fn ancestor_anchor<H: EditorHost + ?Sized>(host: &H, points: SelectionPoints) -> Option<NodeHandle> {
    let root = host.root();
    if points.focus == root {
        return None;
    }
    let mut current = host
        .parent_element(points.focus)
        .or_else(|| parent_in_surface(host, points.anchor));

    while let Some(node) = current {
        if node == root {
            return None;
        }
        if is_anchor(host, node) {
            return Some(node);
        }
        current = host.parent_node(node);
    }
    None
}

fn anchor_with_matching_text<H: EditorHost + ?Sized>(
    host: &H,
    points: SelectionPoints,
) -> Option<NodeHandle> {
    let needle = if points.is_collapsed {
        host.visible_text(points.anchor)
    } else {
        host.selection_text()
    };
    if needle.trim().is_empty() {
        return None;
    }

    // First match in document order wins; duplicate link texts are ambiguous by nature.
    host.query_anchors()
        .into_iter()
        .find(|anchor| host.visible_text(*anchor) == needle)
}
