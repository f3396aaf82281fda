//! Model sync engine: surface-to-model copies, initial injection, and the debounced commit.

use rich_text_contract::{is_element_tag, EditorSurface};

use crate::{
    model::{CommitTask, EditorState},
    reducer::EditorEffect,
};

/// Copies the surface markup into the model and queues the `value` notification.
pub(crate) fn sync_model_from_surface<S: EditorSurface + ?Sized>(
    state: &mut EditorState,
    surface: &S,
    effects: &mut Vec<EditorEffect>,
) {
    state.model_value = surface.inner_html();
    effects.push(EditorEffect::EmitValue(state.model_value.clone()));
}

/// Inserts the model markup ahead of any existing surface content.
///
/// Returns `false` when the model is empty and nothing was inserted.
pub fn initialize_surface_from_model<S: EditorSurface + ?Sized>(
    state: &EditorState,
    surface: &mut S,
) -> bool {
    if state.model_value.is_empty() {
        return false;
    }
    surface.insert_html_at_start(&state.model_value);
    true
}

/// Removes the lone `<br>` some engines leave behind in an emptied surface.
///
/// Returns `true` when a line break was removed.
pub fn remove_stray_line_break<S: EditorSurface + ?Sized>(surface: &mut S) -> bool {
    let root = surface.root();
    if !surface.visible_text(root).trim().is_empty() {
        return false;
    }
    let children = surface.child_nodes(root);
    match children.as_slice() {
        [only] if is_element_tag(surface, *only, "BR") => {
            surface.remove_node(*only);
            true
        }
        _ => false,
    }
}

/// Opens a focus cycle and snapshots the model. A cycle that is already open keeps its snapshot.
pub(crate) fn begin_change_window(state: &mut EditorState) {
    if state.focused {
        return;
    }
    state.focused = true;
    state.value_before_change = Some(state.model_value.clone());
}

/// Schedules (or restarts) the debounced commit when the value changed during the focus cycle.
///
/// A commit that is still pending is restarted even when this cycle changed nothing, so rapid
/// focus/blur sequences coalesce into one notification.
pub(crate) fn schedule_commit_on_blur(state: &mut EditorState, effects: &mut Vec<EditorEffect>) {
    state.focused = false;
    let changed = state.value_before_change.as_deref() != Some(state.model_value.as_str());
    if !changed && state.pending_commit.is_none() {
        return;
    }

    if let Some(previous) = state.pending_commit.take() {
        effects.push(EditorEffect::CancelCommit(previous));
    }
    let task = state.next_commit_task();
    state.pending_commit = Some(task);
    effects.push(EditorEffect::ScheduleCommit {
        task,
        delay_ms: state.config.commit_debounce_ms,
    });
}

pub(crate) fn fire_commit(state: &mut EditorState, task: CommitTask, effects: &mut Vec<EditorEffect>) {
    if state.pending_commit != Some(task) {
        return;
    }
    state.pending_commit = None;
    effects.push(EditorEffect::EmitChange(state.model_value.clone()));
}

pub(crate) fn cancel_pending_commit(state: &mut EditorState, effects: &mut Vec<EditorEffect>) {
    if let Some(task) = state.pending_commit.take() {
        effects.push(EditorEffect::CancelCommit(task));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rich_text_contract::MemorySurface;

    use super::*;

    #[test]
    fn lone_line_break_is_removed() {
        let mut surface = MemorySurface::from_html("<br>");
        assert!(remove_stray_line_break(&mut surface));
        assert!(surface.child_nodes(surface.root()).is_empty());
    }

    #[test]
    fn line_break_next_to_content_is_kept() {
        let mut surface = MemorySurface::from_html("text<br>");
        assert!(!remove_stray_line_break(&mut surface));

        let mut surface = MemorySurface::from_html("<p><br></p>");
        assert!(!remove_stray_line_break(&mut surface));
        assert_eq!(surface.inner_html(), "<p><br></p>");
    }

    #[test]
    fn initialization_prepends_model_markup() {
        let mut surface = MemorySurface::from_html("<p>existing</p>");
        let mut state = EditorState::default();
        state.model_value = "<b>model</b>".to_string();

        assert!(initialize_surface_from_model(&state, &mut surface));
        assert_eq!(surface.inner_html(), "<b>model</b><p>existing</p>");
    }

    #[test]
    fn empty_model_leaves_surface_untouched() {
        let mut surface = MemorySurface::from_html("<p>existing</p>");
        assert!(!initialize_surface_from_model(
            &EditorState::default(),
            &mut surface
        ));
        assert_eq!(surface.inner_html(), "<p>existing</p>");
    }

    #[test]
    fn unchanged_blur_schedules_nothing() {
        let mut state = EditorState::default();
        let mut effects = Vec::new();
        begin_change_window(&mut state);
        schedule_commit_on_blur(&mut state, &mut effects);
        assert!(effects.is_empty());
        assert_eq!(state.pending_commit, None);
    }

    #[test]
    fn repeated_focus_keeps_the_first_snapshot() {
        let mut state = EditorState::default();
        begin_change_window(&mut state);
        state.model_value = "<b>x</b>".to_string();
        begin_change_window(&mut state);

        assert_eq!(state.value_before_change.as_deref(), Some(""));

        let mut effects = Vec::new();
        schedule_commit_on_blur(&mut state, &mut effects);
        assert!(!state.focused);
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn stale_commit_tasks_are_ignored() {
        let mut state = EditorState::default();
        let mut effects = Vec::new();
        begin_change_window(&mut state);
        state.model_value = "<b>x</b>".to_string();
        schedule_commit_on_blur(&mut state, &mut effects);
        let first = state.pending_commit.expect("pending");
        schedule_commit_on_blur(&mut state, &mut effects);

        effects.clear();
        fire_commit(&mut state, first, &mut effects);
        assert!(effects.is_empty());
        assert!(state.pending_commit.is_some());
    }
}
