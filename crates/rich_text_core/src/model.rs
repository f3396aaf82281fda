//! Editor state, configuration, and the payload types exchanged with the host.

use rich_text_contract::EngineCapabilities;
use serde::{Deserialize, Serialize};

/// Delay between the last blur and the debounced `change` notification.
pub const DEFAULT_COMMIT_DEBOUNCE_MS: u32 = 200;
/// Class carried by every link the editor creates.
pub const DEFAULT_LINK_CLASS: &str = "ui-rich-text-link";
/// Class marking a link as followable while a modifier key is held.
pub const DEFAULT_CLICKABLE_CLASS: &str = "ui-clickable";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Tunables for an editor instance.
pub struct EditorConfig {
    /// Debounce window for `change` notifications, in milliseconds.
    pub commit_debounce_ms: u32,
    /// Class applied to inserted links.
    pub link_class: String,
    /// Clickable-affordance class toggled on links.
    pub clickable_class: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            commit_debounce_ms: DEFAULT_COMMIT_DEBOUNCE_MS,
            link_class: DEFAULT_LINK_CLASS.to_string(),
            clickable_class: DEFAULT_CLICKABLE_CLASS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Identifier of a scheduled debounced-commit task.
pub struct CommitTask(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Snapshot of the link the cursor intersects.
pub struct LinkTarget {
    /// `href` attribute of the anchor.
    pub href: Option<String>,
    /// Visible text of the anchor.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Payload of the `commands` notification.
pub struct CommandsPayload {
    /// Active formatting commands, in toolbar order.
    pub commands: Vec<String>,
    /// Foreground color of the selection as `#rrggbb`.
    #[serde(rename = "hexColor")]
    pub hex_color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Modifier keys held during a pointer or keyboard event.
pub struct Modifiers {
    /// Control key.
    pub ctrl: bool,
    /// Meta / Command key.
    pub meta: bool,
}

impl Modifiers {
    /// Whether a link-following modifier (Ctrl or Meta) is held.
    pub fn follows_links(self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Keyboard event data relevant to the editor.
pub struct KeyInput {
    /// `KeyboardEvent.key` value.
    pub key: String,
    /// Modifier keys held.
    pub modifiers: Modifiers,
}

impl KeyInput {
    /// Creates a key input.
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// Ctrl/Meta + L opens the host's link dialog.
    pub fn is_link_shortcut(&self) -> bool {
        self.key.eq_ignore_ascii_case("l") && self.modifiers.follows_links()
    }

    /// Whether the event keeps the clickable affordance alive.
    ///
    /// On key-down of Control itself `ctrlKey` may not be set yet, so the key name counts too.
    pub fn holds_link_modifier(&self) -> bool {
        self.modifiers.ctrl || self.key == "Control" || self.modifiers.meta
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Long-lived editor state. Node handles are never stored here.
pub struct EditorState {
    /// Capability descriptor resolved for the hosting engine.
    pub capabilities: EngineCapabilities,
    /// Tunables.
    pub config: EditorConfig,
    /// Authoritative HTML model value.
    pub model_value: String,
    /// Model value captured on the most recent focus.
    pub value_before_change: Option<String>,
    /// Link the cursor intersected at the last classification.
    pub selected_link: Option<LinkTarget>,
    /// Whether the host is editing an existing link.
    pub link_editing: bool,
    /// Whether the surface has been mounted.
    pub mounted: bool,
    /// Whether the surface holds input focus, as last reported by focus and blur events.
    pub focused: bool,
    /// Pending debounced commit, if any.
    pub pending_commit: Option<CommitTask>,
    next_task: u64,
}

impl EditorState {
    /// Creates state for an engine with the default configuration.
    pub fn new(capabilities: EngineCapabilities) -> Self {
        Self::with_config(capabilities, EditorConfig::default())
    }

    /// Creates state for an engine with explicit configuration.
    pub fn with_config(capabilities: EngineCapabilities, config: EditorConfig) -> Self {
        Self {
            capabilities,
            config,
            model_value: String::new(),
            value_before_change: None,
            selected_link: None,
            link_editing: false,
            mounted: false,
            focused: false,
            pending_commit: None,
            next_task: 0,
        }
    }

    pub(crate) fn next_commit_task(&mut self) -> CommitTask {
        self.next_task = self.next_task.saturating_add(1);
        CommitTask(self.next_task)
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EngineCapabilities::default())
    }
}
