//! Editor actions, side-effect intents, and the transition function driving the surface.

use rich_text_contract::{EditorHost, NodeHandle};
use thiserror::Error;

use crate::{
    command::{emit_selection_commands, execute_command, EditorCommand},
    links::{anchor_clicked, attach_click_interception, toggle_clickable, AffordanceToggle},
    model::{CommandsPayload, CommitTask, EditorState, KeyInput, LinkTarget, Modifiers},
    sync::{
        begin_change_window, cancel_pending_commit, fire_commit, initialize_surface_from_model,
        remove_stray_line_break, schedule_commit_on_blur, sync_model_from_surface,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Work the host must run on a later tick of its event loop.
pub enum DeferredStep {
    /// Inject the bound model value into the freshly mounted surface.
    InitializeFromModel,
    /// Re-read the surface into the model.
    RefreshModel,
    /// Normalize the surface, re-sync, and re-classify the selection.
    RefreshSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Actions accepted by [`reduce_editor`].
pub enum EditorAction {
    /// The surface element exists; enable editing and schedule the initial injection.
    Mount,
    /// The host bound a new model value.
    SetModelValue(String),
    /// The host's link dialog started or stopped editing an existing link.
    SetLinkEditing(bool),
    /// The surface received focus.
    Focus,
    /// The surface lost focus.
    Blur,
    /// Pointer click inside the surface.
    Click,
    /// Key pressed inside the surface.
    KeyDown(KeyInput),
    /// Key released inside the surface.
    KeyUp(KeyInput),
    /// Content was pasted into the surface.
    Paste,
    /// An intercepted anchor was clicked.
    AnchorClicked {
        /// The clicked anchor.
        anchor: NodeHandle,
        /// Modifier keys held during the click.
        modifiers: Modifiers,
    },
    /// Execute a formatting command.
    ExecuteCommand(EditorCommand),
    /// Move input focus to the surface.
    FocusSurface,
    /// Force a deferred re-sync and re-classification (after external content injection).
    Update,
    /// A previously requested deferred step is due.
    Deferred(DeferredStep),
    /// The debounced-commit timer for `task` elapsed.
    CommitTimerElapsed {
        /// Task that elapsed.
        task: CommitTask,
    },
    /// The surface is being torn down.
    Unmount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Side-effect intents emitted by [`reduce_editor`], executed by the host in order.
pub enum EditorEffect {
    /// Notify `value` with the current model.
    EmitValue(String),
    /// Notify `change` (debounced commit) with the current model.
    EmitChange(String),
    /// Notify `commands` with the active command set.
    EmitCommands(CommandsPayload),
    /// Notify `selected-link`; emitted even when no link is selected.
    EmitSelectedLink(Option<LinkTarget>),
    /// Notify `shortcut-command`.
    EmitShortcutCommand,
    /// Cancel the default action of the triggering DOM event.
    PreventDefault,
    /// Run a step on a later tick.
    Defer(DeferredStep),
    /// Start a timer that reports [`EditorAction::CommitTimerElapsed`] after `delay_ms`.
    ScheduleCommit {
        /// Task identifier to report back.
        task: CommitTask,
        /// Delay in milliseconds.
        delay_ms: u32,
    },
    /// Cancel a previously scheduled commit timer.
    CancelCommit(CommitTask),
    /// Open a followed link destination outside the surface.
    FollowLink(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors for actions that arrive in the wrong lifecycle phase.
pub enum EditorError {
    /// The action needs the surface, which has not been mounted.
    #[error("editable surface is not mounted")]
    NotMounted,
    /// [`EditorAction::Mount`] arrived twice.
    #[error("editable surface is already mounted")]
    AlreadyMounted,
}

/// Applies an [`EditorAction`] to the editor state and the host surface, collecting the resulting
/// side effects.
///
/// Within one call, classification, dispatch, sync, and notification run in that order; every
/// surface mutation re-syncs the model before a notification is queued.
///
/// # Errors
///
/// Returns [`EditorError::NotMounted`] for surface actions before [`EditorAction::Mount`], and
/// [`EditorError::AlreadyMounted`] for a repeated mount.
pub fn reduce_editor<H: EditorHost + ?Sized>(
    state: &mut EditorState,
    host: &mut H,
    action: EditorAction,
) -> Result<Vec<EditorEffect>, EditorError> {
    let mut effects = Vec::new();
    match action {
        EditorAction::Mount => {
            if state.mounted {
                return Err(EditorError::AlreadyMounted);
            }
            host.enable_design_mode();
            state.mounted = true;
            effects.push(EditorEffect::Defer(DeferredStep::InitializeFromModel));
        }
        EditorAction::SetModelValue(value) => {
            state.model_value = value;
        }
        EditorAction::SetLinkEditing(editing) => {
            state.link_editing = editing;
        }
        EditorAction::CommitTimerElapsed { task } => {
            fire_commit(state, task, &mut effects);
        }
        EditorAction::Unmount => {
            cancel_pending_commit(state, &mut effects);
            state.mounted = false;
            state.focused = false;
            state.selected_link = None;
        }
        action => {
            if !state.mounted {
                return Err(EditorError::NotMounted);
            }
            reduce_mounted(state, host, action, &mut effects);
        }
    }
    Ok(effects)
}

fn reduce_mounted<H: EditorHost + ?Sized>(
    state: &mut EditorState,
    host: &mut H,
    action: EditorAction,
    effects: &mut Vec<EditorEffect>,
) {
    match action {
        EditorAction::Focus => begin_change_window(state),
        EditorAction::Blur => schedule_commit_on_blur(state, effects),
        EditorAction::Click => emit_selection_commands(state, host, effects),
        EditorAction::KeyDown(key) => {
            if key.is_link_shortcut() {
                effects.push(EditorEffect::PreventDefault);
                effects.push(EditorEffect::EmitShortcutCommand);
            }
            toggle_clickable(state, host, &key, AffordanceToggle::Add);
            sync_model_from_surface(state, host, effects);
        }
        EditorAction::KeyUp(key) => {
            toggle_clickable(state, host, &key, AffordanceToggle::Remove);
            remove_stray_line_break(host);
            sync_model_from_surface(state, host, effects);
            emit_selection_commands(state, host, effects);
        }
        EditorAction::Paste => {
            attach_click_interception(host);
            request_refresh(effects);
        }
        EditorAction::AnchorClicked { anchor, modifiers } => {
            anchor_clicked(state, host, anchor, modifiers, effects);
        }
        EditorAction::ExecuteCommand(command) => execute_command(state, host, command, effects),
        EditorAction::FocusSurface => host.focus(),
        EditorAction::Update => request_refresh(effects),
        EditorAction::Deferred(DeferredStep::InitializeFromModel) => {
            if initialize_surface_from_model(state, host) {
                attach_click_interception(host);
            }
        }
        EditorAction::Deferred(DeferredStep::RefreshModel) => {
            sync_model_from_surface(state, host, effects);
        }
        EditorAction::Deferred(DeferredStep::RefreshSelection) => {
            attach_click_interception(host);
            remove_stray_line_break(host);
            sync_model_from_surface(state, host, effects);
            emit_selection_commands(state, host, effects);
        }
        EditorAction::Mount
        | EditorAction::SetModelValue(_)
        | EditorAction::SetLinkEditing(_)
        | EditorAction::CommitTimerElapsed { .. }
        | EditorAction::Unmount => {}
    }
}

fn request_refresh(effects: &mut Vec<EditorEffect>) {
    effects.push(EditorEffect::Defer(DeferredStep::RefreshModel));
    effects.push(EditorEffect::Defer(DeferredStep::RefreshSelection));
}
