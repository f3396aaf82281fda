//! `web-sys` implementation of the editable surface over a live `contenteditable` element.

use std::cell::RefCell;

use rich_text_contract::{
    AnchorSpec, EditorSurface, NodeHandle, NodeKind, SelectionPoints, SelectionProvider,
};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlDocument, HtmlElement, Node, Selection};

const ROOT_HANDLE: NodeHandle = NodeHandle(0);

/// Editable surface backed by a DOM element and its owning document.
///
/// Node handles index a registry that is reset by [`WebSurface::begin_event`]; handles from an
/// earlier event resolve to nothing or to an unrelated node.
pub struct WebSurface {
    root: HtmlElement,
    document: Option<HtmlDocument>,
    registry: RefCell<Vec<Node>>,
    anchor_click_listener: Option<js_sys::Function>,
    intercepted: Vec<Node>,
}

impl WebSurface {
    /// Wraps `root` as the editable region.
    pub fn new(root: HtmlElement) -> Self {
        let document = root
            .owner_document()
            .and_then(|document| document.dyn_into::<HtmlDocument>().ok());
        let root_node: Node = root.clone().into();
        Self {
            root,
            document,
            registry: RefCell::new(vec![root_node]),
            anchor_click_listener: None,
            intercepted: Vec::new(),
        }
    }

    /// Sets the JS callback attached to anchors by
    /// [`EditorSurface::attach_anchor_click_listener`].
    ///
    /// The caller keeps the backing closure alive for as long as the surface is mounted.
    pub fn set_anchor_click_listener(&mut self, listener: js_sys::Function) {
        self.anchor_click_listener = Some(listener);
    }

    /// Starts a new event scope, invalidating every handle except the root.
    pub fn begin_event(&self) {
        let mut registry = self.registry.borrow_mut();
        registry.truncate(1);
    }

    /// Returns the handle for `node`, registering it in the current event scope.
    pub fn handle_for(&self, node: &Node) -> NodeHandle {
        let mut registry = self.registry.borrow_mut();
        if let Some(idx) = registry.iter().position(|known| known.is_same_node(Some(node))) {
            return NodeHandle(idx as u64);
        }
        registry.push(node.clone());
        NodeHandle((registry.len() - 1) as u64)
    }

    /// Toggles whether the user can edit the surface.
    pub fn set_editable(&self, editable: bool) {
        self.root
            .set_content_editable(if editable { "true" } else { "false" });
    }

    fn node(&self, handle: NodeHandle) -> Option<Node> {
        self.registry.borrow().get(handle.0 as usize).cloned()
    }

    fn element(&self, handle: NodeHandle) -> Option<Element> {
        self.node(handle)?.dyn_into::<Element>().ok()
    }

    fn contains(&self, node: &Node) -> bool {
        self.root.contains(Some(node))
    }

    fn dom_selection(&self) -> Option<Selection> {
        let selection = web_sys::window()?.get_selection().ok().flatten()?;
        (selection.range_count() > 0).then_some(selection)
    }
}

impl EditorSurface for WebSurface {
    fn root(&self) -> NodeHandle {
        ROOT_HANDLE
    }

    fn node_kind(&self, node: NodeHandle) -> Option<NodeKind> {
        let node = self.node(node)?;
        Some(match node.node_type() {
            Node::ELEMENT_NODE => NodeKind::Element,
            Node::TEXT_NODE => NodeKind::Text,
            _ => NodeKind::Other,
        })
    }

    fn tag_name(&self, node: NodeHandle) -> Option<String> {
        self.element(node)
            .map(|element| element.tag_name().to_ascii_uppercase())
    }

    fn parent_node(&self, node: NodeHandle) -> Option<NodeHandle> {
        let parent = self.node(node)?.parent_node()?;
        Some(self.handle_for(&parent))
    }

    fn parent_element(&self, node: NodeHandle) -> Option<NodeHandle> {
        let parent = self.node(node)?.parent_element()?;
        Some(self.handle_for(&parent))
    }

    fn child_nodes(&self, node: NodeHandle) -> Vec<NodeHandle> {
        let Some(node) = self.node(node) else {
            return Vec::new();
        };
        let children = node.child_nodes();
        (0..children.length())
            .filter_map(|idx| children.get(idx))
            .map(|child| self.handle_for(&child))
            .collect()
    }

    fn visible_text(&self, node: NodeHandle) -> String {
        let Some(node) = self.node(node) else {
            return String::new();
        };
        match node.dyn_ref::<HtmlElement>() {
            Some(element) => element.inner_text(),
            None => node.text_content().unwrap_or_default(),
        }
    }

    fn attribute(&self, node: NodeHandle, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn add_class(&mut self, node: NodeHandle, class: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.class_list().add_1(class);
        }
    }

    fn remove_class(&mut self, node: NodeHandle, class: &str) {
        if let Some(element) = self.element(node) {
            let _ = element.class_list().remove_1(class);
        }
    }

    fn query_anchors(&self) -> Vec<NodeHandle> {
        let Ok(anchors) = self.root.query_selector_all("a") else {
            return Vec::new();
        };
        (0..anchors.length())
            .filter_map(|idx| anchors.get(idx))
            .map(|anchor| self.handle_for(&anchor))
            .collect()
    }

    fn inner_html(&self) -> String {
        self.root.inner_html()
    }

    fn insert_html_at_start(&mut self, html: &str) {
        let _ = self.root.insert_adjacent_html("afterbegin", html);
    }

    fn remove_node(&mut self, node: NodeHandle) {
        let Some(node) = self.node(node) else {
            return;
        };
        if let Some(parent) = node.parent_node() {
            let _ = parent.remove_child(&node);
        }
    }

    fn focus(&mut self) {
        let _ = self.root.focus();
    }

    fn enable_design_mode(&mut self) {
        self.root.set_content_editable("true");
    }

    fn exec_command(&mut self, command: &str, value: Option<&str>) -> bool {
        let Some(document) = self.document.as_ref() else {
            return false;
        };
        let result = match value {
            Some(value) => document.exec_command_with_show_ui_and_value(command, false, value),
            None => document.exec_command(command),
        };
        result.unwrap_or(false)
    }

    fn query_command_state(&self, command: &str) -> bool {
        self.document
            .as_ref()
            .and_then(|document| document.query_command_state(command).ok())
            .unwrap_or(false)
    }

    fn query_command_value(&self, command: &str) -> Option<String> {
        self.document
            .as_ref()?
            .query_command_value(command)
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn insert_anchor_at_selection(&mut self, anchor: &AnchorSpec) -> Option<NodeHandle> {
        let document = self.root.owner_document()?;
        let selection = self.dom_selection()?;
        let range = selection.get_range_at(0).ok()?;
        if !range
            .common_ancestor_container()
            .map(|container| self.contains(&container))
            .unwrap_or(false)
        {
            return None;
        }

        let element = document.create_element("a").ok()?;
        element.set_attribute("href", &anchor.href).ok()?;
        element.set_attribute("target", &anchor.target).ok()?;
        element.set_attribute("class", &anchor.class).ok()?;
        element.set_text_content(Some(&anchor.text));

        range.delete_contents().ok()?;
        range.insert_node(&element).ok()?;
        if let Some(text) = element.first_child() {
            let end = text.text_content().map(|text| text.encode_utf16().count()).unwrap_or(0);
            let _ = selection.collapse_with_offset(Some(&text), end as u32);
        }
        Some(self.handle_for(&element))
    }

    fn attach_anchor_click_listener(&mut self, anchor: NodeHandle) {
        let (Some(element), Some(listener)) = (self.element(anchor), &self.anchor_click_listener)
        else {
            return;
        };
        if element.add_event_listener_with_callback("click", listener).is_ok() {
            // Anchors dropped from the document by an edit no longer need tracking.
            self.intercepted.retain(Node::is_connected);
            self.intercepted.push(element.into());
        }
    }

    fn has_anchor_click_listener(&self, anchor: NodeHandle) -> bool {
        let Some(anchor) = self.node(anchor) else {
            return false;
        };
        self.intercepted
            .iter()
            .any(|known| known.is_same_node(Some(&anchor)))
    }
}

impl SelectionProvider for WebSurface {
    fn selection(&self) -> Option<SelectionPoints> {
        let selection = self.dom_selection()?;
        let anchor = selection.anchor_node()?;
        let focus = selection.focus_node()?;
        if !self.contains(&anchor) || !self.contains(&focus) {
            return None;
        }
        Some(SelectionPoints {
            anchor: self.handle_for(&anchor),
            focus: self.handle_for(&focus),
            is_collapsed: selection.is_collapsed(),
        })
    }

    fn selection_text(&self) -> String {
        self.dom_selection()
            .map(|selection| String::from(selection.to_string()))
            .unwrap_or_default()
    }
}
