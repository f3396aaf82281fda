//! Link lifecycle: markup construction, insertion strategies, click interception, and the
//! clickable affordance shown while a modifier key is held over a link.

use rich_text_contract::{
    followable_href, AnchorSpec, EditorHost, EditorSurface, LinkInsertion, NodeHandle,
};

use crate::{
    classifier::{classify_selection, link_target},
    command::INSERT_HTML_COMMAND,
    model::{EditorState, KeyInput, Modifiers},
    reducer::EditorEffect,
    sync::sync_model_from_surface,
};

const LINK_TARGET: &str = "_blank";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Direction of a clickable-affordance update.
pub enum AffordanceToggle {
    /// Show the affordance (key-down).
    Add,
    /// Hide the affordance (key-up).
    Remove,
}

/// Builds the anchor description for `url`, falling back to the URL as display text.
pub fn anchor_spec(url: &str, text: Option<&str>, class: &str) -> AnchorSpec {
    AnchorSpec {
        href: url.to_string(),
        text: text
            .filter(|text| !text.is_empty())
            .unwrap_or(url)
            .to_string(),
        class: class.to_string(),
        target: LINK_TARGET.to_string(),
    }
}

/// Renders `spec` as an HTML fragment, optionally padded with non-breaking spaces.
pub fn link_markup(spec: &AnchorSpec, pad_with_nbsp: bool) -> String {
    let anchor = format!(
        "<a class=\"{}\" href=\"{}\" target=\"{}\">{}</a>",
        escape_attr(&spec.class),
        escape_attr(&spec.href),
        escape_attr(&spec.target),
        escape_text(&spec.text),
    );
    if pad_with_nbsp {
        format!("&nbsp;{anchor}&nbsp;")
    } else {
        anchor
    }
}

/// Inserts a link at the selection using the engine's insertion strategy, then makes sure every
/// anchor carries the click interceptor.
pub(crate) fn insert_or_edit_link<H: EditorHost + ?Sized>(
    state: &EditorState,
    host: &mut H,
    url: &str,
    text: Option<&str>,
) {
    let spec = anchor_spec(url, text, &state.config.link_class);
    match state.capabilities.link_insertion {
        LinkInsertion::InsertHtml { pad_with_nbsp } => {
            let markup = link_markup(&spec, pad_with_nbsp && !state.link_editing);
            host.exec_command(INSERT_HTML_COMMAND, Some(&markup));
        }
        LinkInsertion::DirectNode => {
            host.insert_anchor_at_selection(&spec);
        }
    }
    attach_click_interception(host);
}

/// Attaches the modified-click interceptor to every anchor that does not carry it yet.
///
/// Returns the number of anchors that received a listener; repeated calls attach nothing new.
pub fn attach_click_interception<S: EditorSurface + ?Sized>(surface: &mut S) -> usize {
    let mut attached = 0;
    for anchor in surface.query_anchors() {
        if surface.has_anchor_click_listener(anchor) {
            continue;
        }
        surface.attach_anchor_click_listener(anchor);
        attached += 1;
    }
    attached
}

/// Shows or hides the clickable affordance on the element under the cursor.
pub(crate) fn toggle_clickable<H: EditorHost + ?Sized>(
    state: &mut EditorState,
    host: &mut H,
    key: &KeyInput,
    toggle: AffordanceToggle,
) {
    let Some(points) = host.selection() else {
        state.selected_link = None;
        return;
    };
    let classification = classify_selection(host, state.capabilities.selection);
    state.selected_link = classification
        .link_element
        .map(|anchor| link_target(host, anchor));

    let Some(element) = host.parent_node(points.focus) else {
        return;
    };
    if element == host.root() {
        return;
    }

    let clickable = &state.config.clickable_class;
    if classification.is_link && key.holds_link_modifier() {
        match toggle {
            AffordanceToggle::Add => host.add_class(element, clickable),
            AffordanceToggle::Remove => host.remove_class(element, clickable),
        }
    } else {
        host.remove_class(element, clickable);
    }
}

/// Handles a click on an intercepted anchor.
///
/// With Ctrl/Meta held, navigation inside the surface is suppressed and a followable destination
/// opens outside it instead.
pub(crate) fn anchor_clicked<H: EditorHost + ?Sized>(
    state: &mut EditorState,
    host: &mut H,
    anchor: NodeHandle,
    modifiers: Modifiers,
    effects: &mut Vec<EditorEffect>,
) {
    if !modifiers.follows_links() {
        return;
    }
    if let Some(href) = host.attribute(anchor, "href") {
        effects.push(EditorEffect::PreventDefault);
        if let Some(href) = followable_href(&href) {
            effects.push(EditorEffect::FollowLink(href.to_string()));
        }
    }
    host.remove_class(anchor, &state.config.clickable_class);
    sync_model_from_surface(state, host, effects);
}

fn escape_text(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rich_text_contract::{EngineProfile, MemorySurface, SelectionProvider};

    use super::*;
    use crate::model::DEFAULT_LINK_CLASS;

    #[test]
    fn markup_escapes_and_falls_back_to_url_text() {
        let spec = anchor_spec("https://x.test/?a=1&b=\"2\"", Some(""), DEFAULT_LINK_CLASS);
        assert_eq!(
            link_markup(&spec, false),
            "<a class=\"ui-rich-text-link\" href=\"https://x.test/?a=1&amp;b=&quot;2&quot;\" target=\"_blank\">https://x.test/?a=1&amp;b=\"2\"</a>"
        );
    }

    #[test]
    fn padded_markup_surrounds_anchor_with_nbsp() {
        let spec = anchor_spec("u", Some("t"), "c");
        let markup = link_markup(&spec, true);
        assert!(markup.starts_with("&nbsp;<a "));
        assert!(markup.ends_with("</a>&nbsp;"));
    }

    #[test]
    fn gecko_pads_new_links_but_not_edited_ones() {
        let mut state = EditorState::new(EngineProfile::Gecko.capabilities());
        let mut host = MemorySurface::new();

        insert_or_edit_link(&state, &mut host, "u", Some("t"));
        state.link_editing = true;
        insert_or_edit_link(&state, &mut host, "v", Some("w"));

        let values: Vec<String> = host
            .command_log()
            .iter()
            .filter_map(|(_, value)| value.clone())
            .collect();
        assert!(values[0].starts_with("&nbsp;"));
        assert!(!values[1].starts_with("&nbsp;"));
    }

    #[test]
    fn direct_node_strategy_builds_anchor_without_native_insert() {
        let state = EditorState::new(EngineProfile::Trident.capabilities());
        let mut host = MemorySurface::from_html("see ");
        let text = host.text_node("see ").expect("text");
        host.collapse_into(text);

        insert_or_edit_link(&state, &mut host, "https://x.test", Some("x"));

        assert!(host.command_log().is_empty());
        assert_eq!(
            host.inner_html(),
            "see <a href=\"https://x.test\" target=\"_blank\" class=\"ui-rich-text-link\">x</a>"
        );
    }

    #[test]
    fn interception_attaches_one_listener_per_anchor() {
        let mut host = MemorySurface::from_html("<a href=\"1\">a</a><p><a href=\"2\">b</a></p>");

        assert_eq!(attach_click_interception(&mut host), 2);
        assert_eq!(attach_click_interception(&mut host), 0);

        for anchor in host.query_anchors() {
            assert_eq!(host.listener_count(anchor), 1);
        }
    }

    #[test]
    fn modifier_over_link_toggles_affordance_on_focus_parent() {
        let mut state = EditorState::default();
        let mut host = MemorySurface::from_html("<a href=\"u\">x</a>");
        let anchor = host.query_anchors()[0];
        let text = host.text_node("x").expect("text");
        host.collapse_into(text);
        let ctrl = KeyInput::new(
            "Control",
            Modifiers {
                ctrl: true,
                meta: false,
            },
        );

        toggle_clickable(&mut state, &mut host, &ctrl, AffordanceToggle::Add);
        assert_eq!(host.attribute(anchor, "class").as_deref(), Some("ui-clickable"));

        toggle_clickable(&mut state, &mut host, &ctrl, AffordanceToggle::Remove);
        assert_eq!(host.attribute(anchor, "class").as_deref(), Some(""));
    }

    #[test]
    fn affordance_is_removed_once_modifier_is_released() {
        let mut state = EditorState::default();
        let mut host = MemorySurface::from_html("<a href=\"u\" class=\"ui-clickable\">x</a>");
        let anchor = host.query_anchors()[0];
        let text = host.text_node("x").expect("text");
        host.collapse_into(text);

        toggle_clickable(
            &mut state,
            &mut host,
            &KeyInput::new("a", Modifiers::default()),
            AffordanceToggle::Add,
        );

        assert_eq!(host.attribute(anchor, "class").as_deref(), Some(""));
        assert!(host.selection().is_some());
    }

    #[test]
    fn modified_click_opens_link_externally() {
        let mut state = EditorState::default();
        let mut host = MemorySurface::from_html("<a href=\"https://x.test\" class=\"ui-clickable\">x</a>");
        let anchor = host.query_anchors()[0];
        let mut effects = Vec::new();

        anchor_clicked(
            &mut state,
            &mut host,
            anchor,
            Modifiers {
                ctrl: false,
                meta: true,
            },
            &mut effects,
        );

        assert_eq!(
            effects,
            vec![
                EditorEffect::PreventDefault,
                EditorEffect::FollowLink("https://x.test".into()),
                EditorEffect::EmitValue("<a href=\"https://x.test\" class=\"\">x</a>".into()),
            ]
        );
    }

    #[test]
    fn script_href_is_blocked_but_not_followed() {
        let mut state = EditorState::default();
        let mut host = MemorySurface::from_html("<a href=\"javascript:void(0)\">x</a>");
        let anchor = host.query_anchors()[0];
        let mut effects = Vec::new();

        anchor_clicked(
            &mut state,
            &mut host,
            anchor,
            Modifiers {
                ctrl: true,
                meta: false,
            },
            &mut effects,
        );

        assert_eq!(effects[0], EditorEffect::PreventDefault);
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, EditorEffect::FollowLink(_))));
    }

    #[test]
    fn plain_click_keeps_default_behavior() {
        let mut state = EditorState::default();
        let mut host = MemorySurface::from_html("<a href=\"u\">x</a>");
        let anchor = host.query_anchors()[0];
        let mut effects = Vec::new();

        anchor_clicked(&mut state, &mut host, anchor, Modifiers::default(), &mut effects);

        assert!(effects.is_empty());
    }
}
