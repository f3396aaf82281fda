//! Editable rich-text body primitive.

use leptos::ev::{Event, FocusEvent, KeyboardEvent, MouseEvent};
use leptos::*;
use rich_text_core::{
    CommandRequest, CommandsPayload, EditorAction, EditorCommand, EditorConfig, KeyInput,
    LinkTarget, Modifiers,
};

mod runtime;

use runtime::{BodyCallbacks, BodyRuntime};

#[derive(Clone)]
/// Imperative handle to a mounted [`RichTextBody`], handed out through `on_ready`.
pub struct RichTextBodyHandle {
    runtime: BodyRuntime,
}

impl RichTextBodyHandle {
    /// Moves input focus into the editable surface.
    pub fn focus(&self) {
        self.runtime.dispatch(EditorAction::FocusSurface, None);
    }

    /// Executes a formatting command against the current selection.
    pub fn execute_command(&self, command: impl Into<EditorCommand>) {
        self.runtime
            .dispatch(EditorAction::ExecuteCommand(command.into()), None);
    }

    /// Executes a toolbar payload (`"bold"` or `{ "command", "value" }`).
    ///
    /// # Errors
    ///
    /// Returns the decode error when `raw` is neither a command name nor a command object.
    pub fn execute_json(&self, raw: &str) -> Result<(), serde_json::Error> {
        let request = parse_command_request(raw)?;
        self.execute_command(request);
        Ok(())
    }

    /// Re-reads the surface and re-classifies the selection on the next tick.
    pub fn update(&self) {
        self.runtime.dispatch(EditorAction::Update, None);
    }
}

#[component]
/// Shared editable rich-text body.
///
/// Emits the model through `on_value` after every edit and through `on_change` once editing
/// settles after blur. Toolbar state arrives through `on_commands` and `on_selected_link`.
pub fn RichTextBody(
    #[prop(optional)] layout_class: Option<&'static str>,
    /// CSS height of the surface (for example `"12rem"`); unset lets content size it.
    #[prop(optional, into)]
    height: MaybeSignal<String>,
    #[prop(optional, into)] placeholder: MaybeSignal<String>,
    #[prop(optional, into)] readonly: MaybeSignal<bool>,
    /// Initial HTML injected on mount; later values update the bound model only.
    #[prop(optional, into)]
    model_value: MaybeSignal<String>,
    /// Whether the host link dialog is editing an existing link.
    #[prop(optional, into)]
    link_editing: MaybeSignal<bool>,
    #[prop(optional)] config: Option<EditorConfig>,
    #[prop(optional)] on_value: Option<Callback<String>>,
    #[prop(optional)] on_change: Option<Callback<String>>,
    #[prop(optional)] on_commands: Option<Callback<CommandsPayload>>,
    #[prop(optional)] on_selected_link: Option<Callback<Option<LinkTarget>>>,
    #[prop(optional)] on_shortcut_command: Option<Callback<()>>,
    #[prop(optional)] on_ready: Option<Callback<RichTextBodyHandle>>,
) -> impl IntoView {
    let runtime = BodyRuntime::new(
        BodyCallbacks {
            on_value,
            on_change,
            on_commands,
            on_selected_link,
            on_shortcut_command,
        },
        config.unwrap_or_default(),
    );
    let surface_ref = create_node_ref::<html::Div>();

    surface_ref.on_load({
        let runtime = runtime.clone();
        let model_value = model_value.clone();
        move |element| {
            let root: web_sys::HtmlElement = (*element).clone().into();
            runtime.mount(
                root,
                model_value.get_untracked(),
                link_editing.get_untracked(),
            );
            runtime.set_editable(!readonly.get_untracked());
            if let Some(on_ready) = on_ready {
                on_ready.call(RichTextBodyHandle {
                    runtime: runtime.clone(),
                });
            }
        }
    });

    on_cleanup({
        let runtime = runtime.clone();
        move || runtime.unmount()
    });

    create_effect({
        let runtime = runtime.clone();
        move |_| runtime.dispatch(EditorAction::SetModelValue(model_value.get()), None)
    });
    create_effect({
        let runtime = runtime.clone();
        move |_| runtime.dispatch(EditorAction::SetLinkEditing(link_editing.get()), None)
    });
    create_effect({
        let runtime = runtime.clone();
        move |_| runtime.set_editable(!readonly.get())
    });

    let on_focus = {
        let runtime = runtime.clone();
        move |_: FocusEvent| runtime.dispatch(EditorAction::Focus, None)
    };
    let on_blur = {
        let runtime = runtime.clone();
        move |_: FocusEvent| runtime.dispatch(EditorAction::Blur, None)
    };
    let on_click = {
        let runtime = runtime.clone();
        move |_: MouseEvent| runtime.dispatch(EditorAction::Click, None)
    };
    let on_keydown = {
        let runtime = runtime.clone();
        move |ev: KeyboardEvent| {
            runtime.dispatch(EditorAction::KeyDown(key_input(&ev)), Some(ev.as_ref()));
        }
    };
    let on_keyup = {
        let runtime = runtime.clone();
        move |ev: KeyboardEvent| {
            runtime.dispatch(EditorAction::KeyUp(key_input(&ev)), Some(ev.as_ref()));
        }
    };
    let on_paste = move |_: Event| runtime.dispatch(EditorAction::Paste, None);

    view! {
        <div
            class=merge_layout_class("ui-rich-text-body", layout_class)
            node_ref=surface_ref
            role="textbox"
            aria-multiline="true"
            aria-readonly=move || bool_token(readonly.get())
            aria-placeholder={
                let placeholder = placeholder.clone();
                move || placeholder.get()
            }
            data-placeholder=move || placeholder.get()
            style=move || surface_style(&height.get())
            data-ui-primitive="true"
            data-ui-kind="rich-text-body"
            on:focus=on_focus
            on:blur=on_blur
            on:click=on_click
            on:keydown=on_keydown
            on:keyup=on_keyup
            on:paste=on_paste
        ></div>
    }
}

fn key_input(ev: &KeyboardEvent) -> KeyInput {
    KeyInput::new(
        ev.key(),
        Modifiers {
            ctrl: ev.ctrl_key(),
            meta: ev.meta_key(),
        },
    )
}

fn parse_command_request(raw: &str) -> Result<CommandRequest, serde_json::Error> {
    serde_json::from_str(raw)
}

fn surface_style(height: &str) -> String {
    let height = height.trim();
    if height.is_empty() {
        String::new()
    } else {
        format!("height: {height}; overflow-y: auto;")
    }
}

fn merge_layout_class(base: &'static str, layout_class: Option<&'static str>) -> String {
    match layout_class {
        Some(layout_class) if !layout_class.is_empty() => format!("{base} {layout_class}"),
        _ => base.to_string(),
    }
}

fn bool_token(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
