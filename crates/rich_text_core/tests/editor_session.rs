use std::collections::VecDeque;

use pretty_assertions::assert_eq;
use rich_text_contract::{EditorSurface, EngineProfile, MemorySurface};
use rich_text_core::{
    reduce_editor, CommitTask, DeferredStep, EditorAction, EditorCommand, EditorEffect,
    EditorState, KeyInput, LinkTarget, Modifiers,
};

/// Drives the reducer the way the browser runtime does, with a virtual clock for timers.
struct Session {
    state: EditorState,
    host: MemorySurface,
    now_ms: u32,
    timers: Vec<(CommitTask, u32)>,
    deferred: VecDeque<DeferredStep>,
    emitted: Vec<EditorEffect>,
}

impl Session {
    fn mount(engine: EngineProfile, html: &str, model: &str) -> Self {
        let mut session = Self {
            state: EditorState::new(engine.capabilities()),
            host: MemorySurface::from_html(html),
            now_ms: 0,
            timers: Vec::new(),
            deferred: VecDeque::new(),
            emitted: Vec::new(),
        };
        session.dispatch(EditorAction::SetModelValue(model.to_string()));
        session.dispatch(EditorAction::Mount);
        session
    }

    fn dispatch(&mut self, action: EditorAction) {
        let effects = reduce_editor(&mut self.state, &mut self.host, action).expect("reduce");
        for effect in effects {
            match effect {
                EditorEffect::Defer(step) => self.deferred.push_back(step),
                EditorEffect::ScheduleCommit { task, delay_ms } => {
                    self.timers.push((task, self.now_ms + delay_ms));
                }
                EditorEffect::CancelCommit(task) => {
                    self.timers.retain(|(pending, _)| *pending != task);
                }
                other => self.emitted.push(other),
            }
        }
        while let Some(step) = self.deferred.pop_front() {
            self.dispatch(EditorAction::Deferred(step));
        }
    }

    fn advance_to(&mut self, now_ms: u32) {
        self.now_ms = now_ms;
        let (due, pending): (Vec<_>, Vec<_>) = self
            .timers
            .drain(..)
            .partition(|(_, deadline)| *deadline <= now_ms);
        self.timers = pending;
        for (task, _) in due {
            self.dispatch(EditorAction::CommitTimerElapsed { task });
        }
    }

    fn changes(&self) -> Vec<&str> {
        self.emitted
            .iter()
            .filter_map(|effect| match effect {
                EditorEffect::EmitChange(value) => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    fn last_selected_link(&self) -> Option<Option<LinkTarget>> {
        self.emitted.iter().rev().find_map(|effect| match effect {
            EditorEffect::EmitSelectedLink(link) => Some(link.clone()),
            _ => None,
        })
    }
}

fn insert_html(markup: &str) -> EditorAction {
    EditorAction::ExecuteCommand(EditorCommand::Valued {
        command: "InsertHTML".into(),
        value: markup.into(),
    })
}

#[test]
fn mount_injects_model_ahead_of_existing_content() {
    let session = Session::mount(EngineProfile::Blink, "<p>tail</p>", "<b>head</b>");
    assert_eq!(session.host.inner_html(), "<b>head</b><p>tail</p>");
    assert!(session.host.design_mode_enabled());
}

#[test]
fn model_tracks_surface_after_every_command() {
    let mut session = Session::mount(EngineProfile::Blink, "", "");

    for action in [
        insert_html("<p>one</p>"),
        EditorAction::ExecuteCommand("bold".into()),
        insert_html("<i>two</i>"),
        EditorAction::ExecuteCommand(EditorCommand::InsertLink {
            url: "https://x.test".into(),
            text: None,
        }),
    ] {
        session.dispatch(action);
        assert_eq!(session.state.model_value, session.host.inner_html());
    }
}

#[test]
fn rapid_blurs_coalesce_into_one_change() {
    let mut session = Session::mount(EngineProfile::Blink, "", "");

    session.dispatch(EditorAction::Focus);
    session.dispatch(insert_html("<b>x</b>"));
    session.dispatch(EditorAction::Blur);

    session.advance_to(100);
    session.dispatch(EditorAction::Focus);
    session.dispatch(EditorAction::Blur);

    session.advance_to(250);
    assert!(session.changes().is_empty());

    session.advance_to(300);
    assert_eq!(session.changes(), vec!["<b>x</b>"]);

    session.advance_to(1_000);
    assert_eq!(session.changes().len(), 1);
}

#[test]
fn focus_cycle_without_edits_commits_nothing() {
    let mut session = Session::mount(EngineProfile::Blink, "x", "");

    session.dispatch(EditorAction::Focus);
    session.dispatch(EditorAction::Blur);
    session.advance_to(500);

    assert!(session.changes().is_empty());
}

#[test]
fn inserted_link_is_classified_on_next_click() {
    let mut session = Session::mount(EngineProfile::Blink, "", "");

    session.dispatch(EditorAction::ExecuteCommand(EditorCommand::InsertLink {
        url: "https://x.test".into(),
        text: Some("x".into()),
    }));
    session.dispatch(EditorAction::Click);

    assert_eq!(
        session.last_selected_link(),
        Some(Some(LinkTarget {
            href: Some("https://x.test".into()),
            text: "x".into(),
        }))
    );
    let anchor = session.host.query_anchors()[0];
    assert_eq!(session.host.listener_count(anchor), 1);
}

#[test]
fn emptied_surface_loses_its_stray_line_break() {
    let mut session = Session::mount(EngineProfile::Gecko, "<br>", "");

    session.dispatch(EditorAction::KeyUp(KeyInput::new(
        "Backspace",
        Modifiers::default(),
    )));

    let root = session.host.root();
    assert!(session.host.child_nodes(root).is_empty());
    assert_eq!(session.state.model_value, "");
}

#[test]
fn missing_selection_reports_no_link() {
    let mut session = Session::mount(EngineProfile::Gecko, "<a href=\"u\">x</a>", "");
    session.host.clear_selection();

    session.dispatch(EditorAction::Click);

    assert_eq!(session.last_selected_link(), Some(None));
}

#[test]
fn repeated_updates_never_stack_click_listeners() {
    let mut session = Session::mount(EngineProfile::Blink, "", "<a href=\"1\">a</a>");

    session.dispatch(EditorAction::Paste);
    session.dispatch(EditorAction::Update);
    session.dispatch(EditorAction::Paste);

    for anchor in session.host.query_anchors() {
        assert_eq!(session.host.listener_count(anchor), 1);
    }
}

#[test]
fn reloaded_model_gets_click_interception() {
    let mut session = Session::mount(EngineProfile::Blink, "", "");
    session.dispatch(EditorAction::ExecuteCommand(EditorCommand::InsertLink {
        url: "https://x.test".into(),
        text: Some("x".into()),
    }));
    let saved = session.state.model_value.clone();
    assert!(!saved.contains("data-"));

    let reloaded = Session::mount(EngineProfile::Blink, "", &saved);

    assert_eq!(reloaded.host.inner_html(), saved);
    let anchor = reloaded.host.query_anchors()[0];
    assert_eq!(reloaded.host.listener_count(anchor), 1);
}

#[test]
fn pasted_anchor_gets_click_interception() {
    let mut session = Session::mount(EngineProfile::Blink, "x", "");
    let text = session.host.text_node("x").expect("text");
    session.host.collapse_into(text);

    // The browser inserts pasted markup after the paste handler returns.
    reduce_editor(&mut session.state, &mut session.host, EditorAction::Paste).expect("paste");
    session
        .host
        .exec_command("InsertHTML", Some("<a href=\"https://p.test\">p</a>"));
    session.dispatch(EditorAction::Deferred(DeferredStep::RefreshModel));
    session.dispatch(EditorAction::Deferred(DeferredStep::RefreshSelection));

    let anchor = session.host.query_anchors()[0];
    assert_eq!(session.host.listener_count(anchor), 1);
    assert_eq!(
        session.state.model_value,
        "x<a href=\"https://p.test\">p</a>"
    );
}
