//! In-memory editable surface for headless tests and non-browser targets.

mod markup;

use std::collections::{BTreeMap, BTreeSet};

use crate::surface::{
    AnchorSpec, EditorSurface, NodeHandle, NodeKind, SelectionPoints, SelectionProvider,
};

use markup::{escape_attr, escape_text, is_void, parse_fragment, MarkupNode};

const ROOT: usize = 0;

const NATIVE_FORMAT_COMMANDS: &[&str] = &[
    "bold",
    "italic",
    "underline",
    "strikethrough",
    "justifyleft",
    "justifycenter",
    "justifyright",
    "justifyfull",
    "insertunorderedlist",
    "insertorderedlist",
];

#[derive(Debug, Clone)]
enum NodeData {
    Root,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct MemoryNode {
    data: NodeData,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Arena-backed document fragment implementing [`EditorSurface`] and [`SelectionProvider`].
///
/// Formatting commands only toggle a recorded "active" flag; `insertHTML` parses and inserts
/// markup after the focus node and moves the caret into the last inserted text node.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    nodes: Vec<MemoryNode>,
    selection: Option<SelectionPoints>,
    selection_text: String,
    active_commands: BTreeSet<String>,
    command_log: Vec<(String, Option<String>)>,
    fore_color: Option<String>,
    click_listeners: BTreeMap<usize, usize>,
    focused: bool,
    design_mode: bool,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self {
            nodes: vec![MemoryNode {
                data: NodeData::Root,
                parent: None,
                children: Vec::new(),
            }],
            selection: None,
            selection_text: String::new(),
            active_commands: BTreeSet::new(),
            command_log: Vec::new(),
            fore_color: Some("rgb(0, 0, 0)".to_string()),
            click_listeners: BTreeMap::new(),
            focused: false,
            design_mode: false,
        }
    }
}

impl MemorySurface {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a surface whose content is parsed from `html`.
    pub fn from_html(html: &str) -> Self {
        let mut surface = Self::default();
        let created = surface.build_fragment(html);
        surface.insert_children(ROOT, 0, &created);
        surface
    }

    /// Places a non-collapsed selection from `anchor` to `focus` covering `text`.
    pub fn select(&mut self, anchor: NodeHandle, focus: NodeHandle, text: &str) {
        self.selection = Some(SelectionPoints {
            anchor,
            focus,
            is_collapsed: text.is_empty(),
        });
        self.selection_text = text.to_string();
    }

    /// Places a collapsed caret inside `node`.
    pub fn collapse_into(&mut self, node: NodeHandle) {
        self.selection = Some(SelectionPoints {
            anchor: node,
            focus: node,
            is_collapsed: true,
        });
        self.selection_text.clear();
    }

    /// Removes any selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.selection_text.clear();
    }

    /// Returns attached elements with `tag` (case-insensitive) in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeHandle> {
        self.descendants(ROOT)
            .into_iter()
            .filter(|idx| {
                matches!(&self.nodes[*idx].data, NodeData::Element { tag: name, .. } if name.eq_ignore_ascii_case(tag))
            })
            .map(handle)
            .collect()
    }

    /// Returns the first attached text node whose data equals `text`.
    pub fn text_node(&self, text: &str) -> Option<NodeHandle> {
        self.descendants(ROOT)
            .into_iter()
            .find(|idx| matches!(&self.nodes[*idx].data, NodeData::Text(data) if data == text))
            .map(handle)
    }

    /// Number of click listeners attached to `anchor`.
    pub fn listener_count(&self, anchor: NodeHandle) -> usize {
        self.click_listeners
            .get(&(anchor.0 as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Overrides the value reported for `queryCommandValue("ForeColor")`.
    pub fn set_fore_color(&mut self, value: Option<&str>) {
        self.fore_color = value.map(str::to_string);
    }

    /// Forces a native command to report as active or inactive.
    pub fn set_command_state(&mut self, command: &str, active: bool) {
        let command = command.to_ascii_lowercase();
        if active {
            self.active_commands.insert(command);
        } else {
            self.active_commands.remove(&command);
        }
    }

    /// Native commands executed so far, with their values.
    pub fn command_log(&self) -> &[(String, Option<String>)] {
        &self.command_log
    }

    /// Whether [`EditorSurface::focus`] has been called.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Whether [`EditorSurface::enable_design_mode`] has been called.
    pub fn design_mode_enabled(&self) -> bool {
        self.design_mode
    }

    fn node(&self, node: NodeHandle) -> Option<&MemoryNode> {
        self.nodes.get(node.0 as usize)
    }

    fn is_attached(&self, idx: usize) -> bool {
        let mut current = Some(idx);
        while let Some(id) = current {
            if id == ROOT {
                return true;
            }
            current = self.nodes.get(id).and_then(|node| node.parent);
        }
        false
    }

    fn descendants(&self, idx: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[idx].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }
        out
    }

    fn push_node(&mut self, data: NodeData) -> usize {
        self.nodes.push(MemoryNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn build_fragment(&mut self, html: &str) -> Vec<usize> {
        parse_fragment(html)
            .into_iter()
            .map(|node| self.build_node(node))
            .collect()
    }

    fn build_node(&mut self, node: MarkupNode) -> usize {
        match node {
            MarkupNode::Text(text) => self.push_node(NodeData::Text(text)),
            MarkupNode::Element {
                tag,
                attrs,
                children,
            } => {
                let idx = self.push_node(NodeData::Element { tag, attrs });
                let built: Vec<usize> = children
                    .into_iter()
                    .map(|child| self.build_node(child))
                    .collect();
                self.insert_children(idx, 0, &built);
                idx
            }
        }
    }

    fn insert_children(&mut self, parent: usize, at: usize, children: &[usize]) {
        for (offset, child) in children.iter().enumerate() {
            self.nodes[*child].parent = Some(parent);
            let index = (at + offset).min(self.nodes[parent].children.len());
            self.nodes[parent].children.insert(index, *child);
        }
    }

    fn detach(&mut self, idx: usize) {
        if let Some(parent) = self.nodes[idx].parent.take() {
            self.nodes[parent].children.retain(|child| *child != idx);
        }
    }

    fn insertion_point(&self) -> (usize, usize) {
        let focus = self
            .selection
            .map(|points| points.focus.0 as usize)
            .filter(|idx| *idx != ROOT && self.is_attached(*idx));
        match focus.and_then(|idx| self.nodes[idx].parent.map(|parent| (parent, idx))) {
            Some((parent, idx)) => {
                let position = self.nodes[parent]
                    .children
                    .iter()
                    .position(|child| *child == idx)
                    .unwrap_or(self.nodes[parent].children.len());
                (parent, position + 1)
            }
            None => (ROOT, self.nodes[ROOT].children.len()),
        }
    }

    fn delete_selection_contents(&mut self) {
        let Some(points) = self.selection else {
            return;
        };
        if points.is_collapsed || points.anchor != points.focus || self.selection_text.is_empty() {
            return;
        }
        let selected = std::mem::take(&mut self.selection_text);
        if let Some(MemoryNode {
            data: NodeData::Text(data),
            ..
        }) = self.nodes.get_mut(points.focus.0 as usize)
        {
            *data = data.replacen(&selected, "", 1);
        }
        self.collapse_into(points.focus);
    }

    fn last_text_descendant(&self, roots: &[usize]) -> Option<usize> {
        roots.iter().rev().find_map(|idx| {
            if matches!(self.nodes[*idx].data, NodeData::Text(_)) {
                return Some(*idx);
            }
            self.descendants(*idx)
                .into_iter()
                .rev()
                .find(|child| matches!(self.nodes[*child].data, NodeData::Text(_)))
        })
    }

    fn serialize_children(&self, idx: usize, out: &mut String) {
        for child in &self.nodes[idx].children {
            self.serialize_node(*child, out);
        }
    }

    fn serialize_node(&self, idx: usize, out: &mut String) {
        match &self.nodes[idx].data {
            NodeData::Root => self.serialize_children(idx, out),
            NodeData::Text(text) => out.push_str(&escape_text(text)),
            NodeData::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if is_void(tag) {
                    return;
                }
                self.serialize_children(idx, out);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn attrs_mut(&mut self, node: NodeHandle) -> Option<&mut Vec<(String, String)>> {
        match self.nodes.get_mut(node.0 as usize).map(|node| &mut node.data) {
            Some(NodeData::Element { attrs, .. }) => Some(attrs),
            _ => None,
        }
    }

    fn update_class_list(&mut self, node: NodeHandle, class: &str, present: bool) {
        let Some(attrs) = self.attrs_mut(node) else {
            return;
        };
        let existing = attrs
            .iter()
            .position(|(name, _)| name == "class")
            .map(|idx| attrs[idx].1.clone());
        let mut tokens: Vec<String> = existing
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
            .filter(|token| *token != class)
            .map(str::to_string)
            .collect();
        if present {
            tokens.push(class.to_string());
        } else if existing.is_none() {
            return;
        }
        let value = tokens.join(" ");
        match attrs.iter_mut().find(|(name, _)| name == "class") {
            Some((_, current)) => *current = value,
            None => attrs.push(("class".to_string(), value)),
        }
    }
}

fn handle(idx: usize) -> NodeHandle {
    NodeHandle(idx as u64)
}

impl EditorSurface for MemorySurface {
    fn root(&self) -> NodeHandle {
        handle(ROOT)
    }

    fn node_kind(&self, node: NodeHandle) -> Option<NodeKind> {
        self.node(node).map(|node| match node.data {
            NodeData::Root | NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
        })
    }

    fn tag_name(&self, node: NodeHandle) -> Option<String> {
        match &self.node(node)?.data {
            NodeData::Root => Some("DIV".to_string()),
            NodeData::Element { tag, .. } => Some(tag.to_ascii_uppercase()),
            NodeData::Text(_) => None,
        }
    }

    fn parent_node(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.node(node)?.parent.map(handle)
    }

    fn parent_element(&self, node: NodeHandle) -> Option<NodeHandle> {
        let parent = self.node(node)?.parent?;
        match self.nodes[parent].data {
            NodeData::Root | NodeData::Element { .. } => Some(handle(parent)),
            NodeData::Text(_) => None,
        }
    }

    fn child_nodes(&self, node: NodeHandle) -> Vec<NodeHandle> {
        self.node(node)
            .map(|node| node.children.iter().copied().map(handle).collect())
            .unwrap_or_default()
    }

    fn visible_text(&self, node: NodeHandle) -> String {
        let Some(entry) = self.node(node) else {
            return String::new();
        };
        match &entry.data {
            NodeData::Text(text) => text.clone(),
            NodeData::Element { tag, .. } if tag == "br" => "\n".to_string(),
            NodeData::Root | NodeData::Element { .. } => entry
                .children
                .iter()
                .map(|child| self.visible_text(handle(*child)))
                .collect(),
        }
    }

    fn attribute(&self, node: NodeHandle, name: &str) -> Option<String> {
        match &self.node(node)?.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.clone()),
            _ => None,
        }
    }

    fn add_class(&mut self, node: NodeHandle, class: &str) {
        self.update_class_list(node, class, true);
    }

    fn remove_class(&mut self, node: NodeHandle, class: &str) {
        self.update_class_list(node, class, false);
    }

    fn query_anchors(&self) -> Vec<NodeHandle> {
        self.elements_by_tag("a")
    }

    fn inner_html(&self) -> String {
        let mut out = String::new();
        self.serialize_children(ROOT, &mut out);
        out
    }

    fn insert_html_at_start(&mut self, html: &str) {
        let created = self.build_fragment(html);
        self.insert_children(ROOT, 0, &created);
    }

    fn remove_node(&mut self, node: NodeHandle) {
        let idx = node.0 as usize;
        if idx != ROOT && idx < self.nodes.len() {
            self.detach(idx);
        }
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn enable_design_mode(&mut self) {
        self.design_mode = true;
    }

    fn exec_command(&mut self, command: &str, value: Option<&str>) -> bool {
        self.command_log
            .push((command.to_string(), value.map(str::to_string)));
        let command = command.to_ascii_lowercase();
        match (command.as_str(), value) {
            ("inserthtml", Some(html)) => {
                self.delete_selection_contents();
                let created = self.build_fragment(html);
                let (parent, at) = self.insertion_point();
                self.insert_children(parent, at, &created);
                if let Some(text) = self.last_text_descendant(&created) {
                    self.collapse_into(handle(text));
                }
                true
            }
            (name, _) if NATIVE_FORMAT_COMMANDS.contains(&name) => {
                if !self.active_commands.remove(name) {
                    self.active_commands.insert(name.to_string());
                }
                true
            }
            _ => false,
        }
    }

    fn query_command_state(&self, command: &str) -> bool {
        self.active_commands
            .contains(&command.to_ascii_lowercase())
    }

    fn query_command_value(&self, command: &str) -> Option<String> {
        if command.eq_ignore_ascii_case("forecolor") {
            self.fore_color.clone()
        } else {
            None
        }
    }

    fn insert_anchor_at_selection(&mut self, anchor: &AnchorSpec) -> Option<NodeHandle> {
        self.delete_selection_contents();
        let element = self.push_node(NodeData::Element {
            tag: "a".to_string(),
            attrs: vec![
                ("href".to_string(), anchor.href.clone()),
                ("target".to_string(), anchor.target.clone()),
                ("class".to_string(), anchor.class.clone()),
            ],
        });
        let text = self.push_node(NodeData::Text(anchor.text.clone()));
        self.insert_children(element, 0, &[text]);
        let (parent, at) = self.insertion_point();
        self.insert_children(parent, at, &[element]);
        self.collapse_into(handle(text));
        Some(handle(element))
    }

    fn attach_anchor_click_listener(&mut self, anchor: NodeHandle) {
        *self.click_listeners.entry(anchor.0 as usize).or_insert(0) += 1;
    }

    fn has_anchor_click_listener(&self, anchor: NodeHandle) -> bool {
        self.listener_count(anchor) > 0
    }
}

impl SelectionProvider for MemorySurface {
    fn selection(&self) -> Option<SelectionPoints> {
        self.selection
    }

    fn selection_text(&self) -> String {
        self.selection_text.clone()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn round_trips_markup_through_inner_html() {
        let html = r#"<p>one <b>two</b><br></p><a href="https://x.test" class="ui-rich-text-link">x</a>"#;
        assert_eq!(MemorySurface::from_html(html).inner_html(), html);
    }

    #[test]
    fn insert_html_lands_after_focus_and_moves_caret() {
        let mut surface = MemorySurface::from_html("hello");
        let text = surface.text_node("hello").expect("text");
        surface.collapse_into(text);

        assert!(surface.exec_command("insertHTML", Some("<a href=\"u\">t</a>")));

        assert_eq!(surface.inner_html(), "hello<a href=\"u\">t</a>");
        let caret = surface.selection().expect("caret").focus;
        assert_eq!(surface.visible_text(caret), "t");
    }

    #[test]
    fn class_tokens_are_added_once_and_removed() {
        let mut surface = MemorySurface::from_html("<a class=\"link\">x</a>");
        let anchor = surface.query_anchors()[0];

        surface.add_class(anchor, "hot");
        surface.add_class(anchor, "hot");
        assert_eq!(surface.attribute(anchor, "class").as_deref(), Some("link hot"));

        surface.remove_class(anchor, "hot");
        assert_eq!(surface.attribute(anchor, "class").as_deref(), Some("link"));
    }

    #[test]
    fn removing_a_class_from_an_element_without_one_adds_nothing() {
        let mut surface = MemorySurface::from_html("<b>x</b>");
        let bold = surface.elements_by_tag("b")[0];
        surface.remove_class(bold, "hot");
        assert_eq!(surface.inner_html(), "<b>x</b>");
    }

    #[test]
    fn listener_tracking_stays_out_of_markup() {
        let mut surface = MemorySurface::from_html("<a href=\"u\">x</a>");
        let anchor = surface.query_anchors()[0];
        assert!(!surface.has_anchor_click_listener(anchor));

        surface.attach_anchor_click_listener(anchor);

        assert!(surface.has_anchor_click_listener(anchor));
        assert_eq!(surface.inner_html(), "<a href=\"u\">x</a>");
    }

    #[test]
    fn unknown_commands_report_failure_and_leave_content() {
        let mut surface = MemorySurface::from_html("x");
        assert!(!surface.exec_command("frobnicate", None));
        assert_eq!(surface.inner_html(), "x");
        assert_eq!(surface.command_log().len(), 1);
    }
}
