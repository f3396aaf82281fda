//! Browser-side session container: owns the editor state and surface, queues re-entrant
//! dispatches, and executes reducer effects.

use std::{
    cell::RefCell,
    collections::{BTreeMap, VecDeque},
    rc::Rc,
    time::Duration,
};

use leptos::{
    logging, set_timeout, set_timeout_with_handle, spawn_local, Callable, Callback,
    leptos_dom::helpers::TimeoutHandle,
};
use rich_text_contract::LinkFollower;
use rich_text_core::{
    reduce_editor, CommandsPayload, CommitTask, EditorAction, EditorConfig, EditorEffect,
    EditorState, LinkTarget, Modifiers,
};
use rich_text_web::{engine_capabilities, NewTabLinkFollower, WebSurface};
use wasm_bindgen::{closure::Closure, JsCast};

#[derive(Clone, Copy, Default)]
/// Host notifications wired from component props.
pub(crate) struct BodyCallbacks {
    pub on_value: Option<Callback<String>>,
    pub on_change: Option<Callback<String>>,
    pub on_commands: Option<Callback<CommandsPayload>>,
    pub on_selected_link: Option<Callback<Option<LinkTarget>>>,
    pub on_shortcut_command: Option<Callback<()>>,
}

enum Pending {
    Action(EditorAction),
    AnchorClick {
        anchor: web_sys::Node,
        modifiers: Modifiers,
    },
}

struct Session {
    state: EditorState,
    surface: WebSurface,
    timers: BTreeMap<CommitTask, TimeoutHandle>,
    _anchor_click: Closure<dyn FnMut(web_sys::MouseEvent)>,
}

#[derive(Clone)]
/// Shared handle to one mounted editor session.
pub(crate) struct BodyRuntime {
    session: Rc<RefCell<Option<Session>>>,
    queue: Rc<RefCell<VecDeque<Pending>>>,
    callbacks: BodyCallbacks,
    config: EditorConfig,
}

impl BodyRuntime {
    pub fn new(callbacks: BodyCallbacks, config: EditorConfig) -> Self {
        Self {
            session: Rc::new(RefCell::new(None)),
            queue: Rc::new(RefCell::new(VecDeque::new())),
            callbacks,
            config,
        }
    }

    /// Takes ownership of the rendered root element and mounts the editor on it.
    pub fn mount(&self, root: web_sys::HtmlElement, model_value: String, link_editing: bool) {
        if self.session.borrow().is_some() {
            logging::debug_warn!("rich text body mounted twice; keeping the first session");
            return;
        }

        let runtime = self.clone();
        let anchor_click = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(
            move |ev: web_sys::MouseEvent| runtime.anchor_clicked(ev),
        );
        let mut surface = WebSurface::new(root);
        surface.set_anchor_click_listener(
            anchor_click
                .as_ref()
                .unchecked_ref::<js_sys::Function>()
                .clone(),
        );

        let capabilities = engine_capabilities();
        logging::log!(
            "rich text body mounted with {} engine profile",
            capabilities.engine.token()
        );
        *self.session.borrow_mut() = Some(Session {
            state: EditorState::with_config(capabilities, self.config.clone()),
            surface,
            timers: BTreeMap::new(),
            _anchor_click: anchor_click,
        });

        self.dispatch(EditorAction::SetModelValue(model_value), None);
        self.dispatch(EditorAction::SetLinkEditing(link_editing), None);
        self.dispatch(EditorAction::Mount, None);
    }

    /// Tears the session down, cancelling any pending commit timer.
    pub fn unmount(&self) {
        self.dispatch(EditorAction::Unmount, None);
        if let Ok(mut session) = self.session.try_borrow_mut() {
            if let Some(session) = session.take() {
                for (_, handle) in session.timers {
                    handle.clear();
                }
            }
        }
    }

    pub fn set_editable(&self, editable: bool) {
        if let Ok(session) = self.session.try_borrow() {
            if let Some(session) = session.as_ref() {
                session.surface.set_editable(editable);
            }
        }
    }

    /// Dispatches `action`; `event` is the DOM event that triggered it, if any.
    pub fn dispatch(&self, action: EditorAction, event: Option<&web_sys::Event>) {
        self.enqueue(Pending::Action(action), event);
    }

    fn anchor_clicked(&self, ev: web_sys::MouseEvent) {
        let Some(anchor) = ev
            .current_target()
            .and_then(|target| target.dyn_into::<web_sys::Node>().ok())
        else {
            return;
        };
        let modifiers = Modifiers {
            ctrl: ev.ctrl_key(),
            meta: ev.meta_key(),
        };
        self.enqueue(Pending::AnchorClick { anchor, modifiers }, Some(ev.as_ref()));
    }

    fn enqueue(&self, pending: Pending, event: Option<&web_sys::Event>) {
        self.queue.borrow_mut().push_back(pending);

        // Native calls such as `focus()` fire DOM events synchronously; those land in the queue
        // and are drained by the dispatch already in flight.
        let Ok(mut guard) = self.session.try_borrow_mut() else {
            return;
        };
        let Some(session) = guard.as_mut() else {
            self.queue.borrow_mut().clear();
            return;
        };

        let mut event = event;
        let mut effects = Vec::new();
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(pending) = next else {
                break;
            };
            session.surface.begin_event();
            let action = match pending {
                Pending::Action(action) => action,
                Pending::AnchorClick { anchor, modifiers } => EditorAction::AnchorClicked {
                    anchor: session.surface.handle_for(&anchor),
                    modifiers,
                },
            };
            let triggering_event = event.take();
            match reduce_editor(&mut session.state, &mut session.surface, action) {
                Ok(produced) => {
                    for effect in produced {
                        match effect {
                            EditorEffect::PreventDefault => {
                                if let Some(event) = triggering_event {
                                    event.prevent_default();
                                }
                            }
                            EditorEffect::CancelCommit(task) => {
                                if let Some(handle) = session.timers.remove(&task) {
                                    handle.clear();
                                }
                            }
                            EditorEffect::ScheduleCommit { task, delay_ms } => {
                                let runtime = self.clone();
                                match set_timeout_with_handle(
                                    move || {
                                        runtime.forget_timer(task);
                                        runtime.dispatch(
                                            EditorAction::CommitTimerElapsed { task },
                                            None,
                                        );
                                    },
                                    Duration::from_millis(u64::from(delay_ms)),
                                ) {
                                    Ok(handle) => {
                                        session.timers.insert(task, handle);
                                    }
                                    Err(err) => {
                                        logging::warn!("commit timer scheduling failed: {err:?}");
                                    }
                                }
                            }
                            other => effects.push(other),
                        }
                    }
                }
                Err(err) => logging::warn!("rich text reducer error: {err}"),
            }
        }
        drop(guard);

        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn forget_timer(&self, task: CommitTask) {
        if let Ok(mut session) = self.session.try_borrow_mut() {
            if let Some(session) = session.as_mut() {
                session.timers.remove(&task);
            }
        }
    }

    fn run_effect(&self, effect: EditorEffect) {
        let callbacks = self.callbacks;
        match effect {
            EditorEffect::EmitValue(value) => {
                if let Some(on_value) = callbacks.on_value {
                    on_value.call(value);
                }
            }
            EditorEffect::EmitChange(value) => {
                if let Some(on_change) = callbacks.on_change {
                    on_change.call(value);
                }
            }
            EditorEffect::EmitCommands(payload) => {
                if let Some(on_commands) = callbacks.on_commands {
                    on_commands.call(payload);
                }
            }
            EditorEffect::EmitSelectedLink(link) => {
                if let Some(on_selected_link) = callbacks.on_selected_link {
                    on_selected_link.call(link);
                }
            }
            EditorEffect::EmitShortcutCommand => {
                if let Some(on_shortcut_command) = callbacks.on_shortcut_command {
                    on_shortcut_command.call(());
                }
            }
            EditorEffect::Defer(step) => {
                let runtime = self.clone();
                set_timeout(
                    move || runtime.dispatch(EditorAction::Deferred(step), None),
                    Duration::ZERO,
                );
            }
            EditorEffect::FollowLink(href) => {
                spawn_local(async move {
                    if let Err(err) = NewTabLinkFollower.follow(&href).await {
                        logging::warn!("following link {href} failed: {err}");
                    }
                });
            }
            EditorEffect::PreventDefault
            | EditorEffect::ScheduleCommit { .. }
            | EditorEffect::CancelCommit(_) => {}
        }
    }
}
