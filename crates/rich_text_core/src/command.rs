//! Command dispatcher: formatting commands, the host payload format, and the active-command query.

use rich_text_contract::EditorHost;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    classifier::{classify_selection, link_target, LinkClassification},
    color::rgb_to_hex,
    links,
    model::{CommandsPayload, EditorState},
    reducer::EditorEffect,
    sync::{begin_change_window, sync_model_from_surface},
};

/// Native command name reported while the cursor is inside a link.
pub const CREATE_LINK_COMMAND: &str = "Createlink";
/// Native command used to insert markup.
pub const INSERT_HTML_COMMAND: &str = "InsertHTML";
/// Native query for the selection's foreground color.
pub const FORE_COLOR_QUERY: &str = "ForeColor";

/// Formatting commands whose state is reported to the toolbar, in display order.
pub const FORMAT_COMMANDS: [&str; 9] = [
    "bold",
    "italic",
    "underline",
    "justifyleft",
    "justifycenter",
    "justifyright",
    "justifyfull",
    "insertUnorderedList",
    CREATE_LINK_COMMAND,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A command executed against the editable surface.
pub enum EditorCommand {
    /// Native command without a value (for example `bold`).
    Plain(String),
    /// Native command with a value (for example `ForeColor` + `#ff0000`).
    Valued {
        /// Native command name.
        command: String,
        /// Command value.
        value: String,
    },
    /// Insert a new link, or replace the selected one.
    InsertLink {
        /// Link destination.
        url: String,
        /// Display text; the URL is shown when absent or empty.
        text: Option<String>,
    },
}

impl From<&str> for EditorCommand {
    fn from(command: &str) -> Self {
        Self::Plain(command.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// Command payload as sent by toolbar hosts: a bare name or `{ command, value }`.
///
/// Link insertion uses `{ "command": "InsertHTML", "value": { "urlLink", "urlLinkText" } }`.
pub enum CommandRequest {
    /// Bare command name.
    Plain(String),
    /// Command with a value.
    Structured {
        /// Native command name.
        command: String,
        /// Command value.
        #[serde(default)]
        value: Value,
    },
}

impl From<CommandRequest> for EditorCommand {
    fn from(request: CommandRequest) -> Self {
        match request {
            CommandRequest::Plain(command) => Self::Plain(command),
            CommandRequest::Structured { command, value } => {
                let link_url = value.get("urlLink").and_then(Value::as_str);
                match link_url {
                    Some(url) if command.eq_ignore_ascii_case(INSERT_HTML_COMMAND) => {
                        Self::InsertLink {
                            url: url.to_string(),
                            text: value
                                .get("urlLinkText")
                                .and_then(Value::as_str)
                                .map(str::to_string),
                        }
                    }
                    _ => Self::Valued {
                        command,
                        value: match value {
                            Value::String(raw) => raw,
                            Value::Null => String::new(),
                            other => other.to_string(),
                        },
                    },
                }
            }
        }
    }
}

/// Runs `command`, refocuses the surface, and re-syncs the model.
///
/// An unfocused surface opens its focus cycle before the command mutates it; the focus event
/// the host raises in response arrives after the command and keeps that snapshot.
///
/// Native failures are not surfaced: the model simply reflects whatever the host did.
pub(crate) fn execute_command<H: EditorHost + ?Sized>(
    state: &mut EditorState,
    host: &mut H,
    command: EditorCommand,
    effects: &mut Vec<EditorEffect>,
) {
    begin_change_window(state);
    host.focus();
    match command {
        EditorCommand::Plain(name) => {
            host.exec_command(&name, None);
        }
        EditorCommand::Valued { command, value } => {
            host.exec_command(&command, Some(&value));
        }
        EditorCommand::InsertLink { url, text } => {
            links::insert_or_edit_link(state, host, &url, text.as_deref());
        }
    }
    sync_model_from_surface(state, host, effects);
}

/// Collects the active command set and foreground color, classifying the selection on the way.
pub fn selection_commands<H: EditorHost + ?Sized>(
    state: &EditorState,
    host: &H,
) -> (CommandsPayload, LinkClassification) {
    let mut commands: Vec<String> = FORMAT_COMMANDS
        .iter()
        .filter(|command| host.query_command_state(command))
        .map(|command| command.to_string())
        .collect();

    let hex_color = if state.capabilities.reports_rgb_fore_color {
        host.query_command_value(FORE_COLOR_QUERY)
            .and_then(|raw| rgb_to_hex(&raw).ok())
    } else {
        None
    };

    let classification = classify_selection(host, state.capabilities.selection);
    if classification.is_link && !commands.iter().any(|command| command == CREATE_LINK_COMMAND) {
        commands.push(CREATE_LINK_COMMAND.to_string());
    }

    (
        CommandsPayload {
            commands,
            hex_color,
        },
        classification,
    )
}

/// Emits `selected-link` (always, even when empty) followed by `commands`.
pub(crate) fn emit_selection_commands<H: EditorHost + ?Sized>(
    state: &mut EditorState,
    host: &H,
    effects: &mut Vec<EditorEffect>,
) {
    let (payload, classification) = selection_commands(state, host);
    state.selected_link = classification
        .link_element
        .map(|anchor| link_target(host, anchor));
    effects.push(EditorEffect::EmitSelectedLink(state.selected_link.clone()));
    effects.push(EditorEffect::EmitCommands(payload));
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rich_text_contract::{EditorSurface, EngineProfile, MemorySurface};
    use serde_json::json;

    use super::*;

    #[test]
    fn plain_and_structured_requests_deserialize() {
        let plain: CommandRequest = serde_json::from_value(json!("bold")).expect("plain");
        assert_eq!(EditorCommand::from(plain), EditorCommand::Plain("bold".into()));

        let valued: CommandRequest =
            serde_json::from_value(json!({ "command": "ForeColor", "value": "#ff0000" }))
                .expect("valued");
        assert_eq!(
            EditorCommand::from(valued),
            EditorCommand::Valued {
                command: "ForeColor".into(),
                value: "#ff0000".into(),
            }
        );
    }

    #[test]
    fn insert_html_with_link_value_becomes_link_command() {
        let request: CommandRequest = serde_json::from_value(json!({
            "command": "InsertHTML",
            "value": { "urlLink": "https://x.test", "urlLinkText": "x" }
        }))
        .expect("link");
        assert_eq!(
            EditorCommand::from(request),
            EditorCommand::InsertLink {
                url: "https://x.test".into(),
                text: Some("x".into()),
            }
        );
    }

    #[test]
    fn plain_command_runs_natively_and_syncs_model() {
        let mut host = MemorySurface::from_html("x");
        let mut state = EditorState::default();
        let mut effects = Vec::new();

        execute_command(&mut state, &mut host, "bold".into(), &mut effects);

        assert!(host.is_focused());
        assert_eq!(
            host.command_log(),
            [("bold".to_string(), None::<String>)]
        );
        assert_eq!(state.model_value, host.inner_html());
        assert_eq!(effects, vec![EditorEffect::EmitValue("x".into())]);
    }

    #[test]
    fn unsupported_command_is_silently_ignored() {
        let mut host = MemorySurface::from_html("<p>x</p>");
        let mut state = EditorState::default();
        let mut effects = Vec::new();

        execute_command(&mut state, &mut host, "frobnicate".into(), &mut effects);

        assert_eq!(state.model_value, "<p>x</p>");
    }

    #[test]
    fn selection_commands_report_active_states_link_and_color() {
        let mut host = MemorySurface::from_html("<a href=\"u\">x</a>");
        let text = host.text_node("x").expect("text");
        host.collapse_into(text);
        host.set_command_state("bold", true);
        host.set_command_state("justifycenter", true);
        host.set_fore_color(Some("rgb(255, 0, 128)"));
        let state = EditorState::default();

        let (payload, classification) = selection_commands(&state, &host);

        assert_eq!(
            payload,
            CommandsPayload {
                commands: vec!["bold".into(), "justifycenter".into(), "Createlink".into()],
                hex_color: Some("#ff0080".into()),
            }
        );
        assert!(classification.is_link);
    }

    #[test]
    fn engines_without_rgb_colors_skip_conversion() {
        let host = MemorySurface::from_html("x");
        let state = EditorState::new(EngineProfile::Trident.capabilities());
        let (payload, _) = selection_commands(&state, &host);
        assert_eq!(payload.hex_color, None);
    }

    #[test]
    fn malformed_color_yields_no_hex() {
        let mut host = MemorySurface::from_html("x");
        host.set_fore_color(Some("transparent"));
        let (payload, _) = selection_commands(&EditorState::default(), &host);
        assert_eq!(payload.hex_color, None);
    }
}
