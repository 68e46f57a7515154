mod autosave;
mod format;

pub(crate) use autosave::{Autosave, AutosaveAction, SaveState, AUTO_SAVE_TIMEOUT_MS};
pub(crate) use format::{image_markdown, link_markdown, table_markdown, Selection, TextEdit};

use crate::components::ui::{Button, ButtonSize, ButtonVariant, Checkbox, Spinner};
use crate::markdown::MarkdownView;
use crate::modal::ModalKind;
use crate::state::AppContext;
use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

const MARKDOWN_HELP_URL: &str = "https://github.github.com/gfm/";

/// One save dispatched by the editor.
#[derive(Clone)]
pub(crate) struct SaveRequest {
    pub content: String,
    pub generation: u64,
    pub done: SaveDone,
}

/// Completion handle for a [`SaveRequest`].
#[derive(Clone, Copy)]
pub(crate) struct SaveDone {
    driver: AutosaveHandle,
    generation: u64,
}

impl SaveDone {
    /// False once a newer save was dispatched or the page went away.
    pub fn is_current(&self) -> bool {
        self.driver
            .machine
            .try_with_untracked(|m| m.generation() == self.generation)
            .unwrap_or(false)
    }

    pub fn finish(self, ok: bool) {
        let outcome = self
            .driver
            .machine
            .try_update(|m| m.save_finished(self.generation, ok))
            .flatten();
        if let Some(action) = outcome {
            self.driver.apply(action);
        }
    }
}

/// Glue between the [`Autosave`] machine, the debounce timer and the save callback.
///
/// Owned by the page showing the document, so the save state and a pending
/// timer outlive the [`Editor`] when it is unmounted by a mode switch.
#[derive(Clone, Copy)]
pub(crate) struct AutosaveHandle {
    machine: RwSignal<Autosave>,
    timer: StoredValue<Option<i32>>,
    content: RwSignal<String>,
    on_save: Callback<SaveRequest>,
}

impl AutosaveHandle {
    /// Must be created under the page's owner; the timer is cancelled when it is cleaned up.
    pub fn new(content: RwSignal<String>, on_save: Callback<SaveRequest>, enabled: bool) -> Self {
        let handle = Self {
            machine: RwSignal::new(Autosave::new(enabled)),
            timer: StoredValue::new(None),
            content,
            on_save,
        };
        on_cleanup(move || handle.cancel_timer());
        handle
    }

    pub fn state(&self) -> SaveState {
        self.machine
            .try_with_untracked(Autosave::state)
            .unwrap_or_default()
    }

    /// A different document was loaded into `content`.
    pub fn reset(&self) {
        self.cancel_timer();
        self.machine.try_update(Autosave::reset);
    }

    fn feed(&self, event: impl FnOnce(&mut Autosave) -> AutosaveAction) {
        if let Some(action) = self.machine.try_update(event) {
            self.apply(action);
        }
    }

    fn apply(&self, action: AutosaveAction) {
        match action {
            AutosaveAction::Nothing => {}
            AutosaveAction::Schedule => self.schedule(),
            AutosaveAction::Save(generation) => {
                self.cancel_timer();
                let Some(content) = self.content.try_get_untracked() else {
                    return;
                };
                self.on_save.run(SaveRequest {
                    content,
                    generation,
                    done: SaveDone {
                        driver: *self,
                        generation,
                    },
                });
            }
        }
    }

    fn schedule(&self) {
        self.cancel_timer();
        let Some(win) = web_sys::window() else {
            return;
        };
        let driver = *self;
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            driver.timer.try_set_value(None);
            driver.feed(Autosave::timer_fired);
        });
        let tid = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                AUTO_SAVE_TIMEOUT_MS,
            )
            .ok();
        self.timer.try_set_value(tid);
    }

    fn cancel_timer(&self) {
        let Some(Some(tid)) = self.timer.try_update_value(Option::take) else {
            return;
        };
        if let Some(win) = web_sys::window() {
            win.clear_timeout_with_handle(tid);
        }
    }
}

/// Markdown editor with toolbar, shortcuts and debounced autosave.
///
/// The handle's `content` is both the initial text and the live buffer. Saves
/// go through its `on_save`; the receiver must call [`SaveDone::finish`] exactly once.
#[component]
pub fn Editor(autosave: AutosaveHandle) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let driver = autosave;
    let content = driver.content;

    let area_ref = NodeRef::<html::Textarea>::new();
    let preview = RwSignal::new(false);

    let save_state = move || driver.machine.with(Autosave::state);
    let autosave_on = Signal::derive(move || driver.machine.with(Autosave::enabled));

    let selection = move || -> Selection {
        area_ref
            .get_untracked()
            .map(|el| {
                let start = el.selection_start().ok().flatten().unwrap_or(0);
                let end = el.selection_end().ok().flatten().unwrap_or(start);
                Selection::new(start, end)
            })
            .unwrap_or_default()
    };

    // Write an edit to the textarea, restore its selection, and count it as typing.
    let apply_edit = move |edit: TextEdit| {
        if let Some(el) = area_ref.get_untracked() {
            el.set_value(&edit.text);
            let _ = el.set_selection_range(edit.selection.start, edit.selection.end);
            let _ = el.focus();
        }
        content.set(edit.text);
        driver.feed(Autosave::edit);
    };

    let transform = move |f: fn(&str, Selection) -> TextEdit| {
        let sel = selection();
        let edit = content.with_untracked(|text| f(text, sel));
        apply_edit(edit);
    };
    let wrap = move |marker: &'static str| {
        let sel = selection();
        let edit = content.with_untracked(|text| format::wrap_selection(text, sel, marker));
        apply_edit(edit);
    };
    let prefix = move |prefix: String| {
        let sel = selection();
        let edit = content.with_untracked(|text| format::prefix_line(text, sel, &prefix));
        apply_edit(edit);
    };

    // The selection is captured now, before focus moves into the modal.
    let insert_callback = move || {
        let sel = selection();
        Callback::new(move |markdown: String| {
            let edit = content.with_untracked(|text| format::replace_selection(text, sel, &markdown));
            apply_edit(edit);
        })
    };

    let on_input = move |ev: web_sys::Event| {
        if let Some(area) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
        {
            content.set(area.value());
            driver.feed(Autosave::edit);
        }
    };

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        if !(ev.ctrl_key() || ev.meta_key()) {
            return;
        }
        match ev.key().to_lowercase().as_str() {
            "s" => {
                ev.prevent_default();
                driver.feed(|m| m.manual_save(true));
            }
            "b" => {
                ev.prevent_default();
                wrap("**");
            }
            "i" => {
                ev.prevent_default();
                wrap("*");
            }
            _ => {}
        }
    };

    let tool = "h-7 px-2 text-xs";

    let save_button = move |variant: ButtonVariant| {
        view! {
            <Button
                size=ButtonSize::Sm
                variant=variant
                attr:title="Save (Ctrl+S)"
                attr:disabled=move || save_state() == SaveState::Saving
                on:click=move |_| driver.feed(|m| m.manual_save(false))
            >
                <Show when=move || save_state() == SaveState::Saving fallback=|| ().into_view()>
                    <Spinner />
                </Show>
                "Save"
            </Button>
        }
    };

    view! {
        <div class="flex flex-col gap-2">
            <div class="flex flex-wrap items-center gap-1 rounded-md border bg-muted/30 p-1">
                <Show
                    when=move || save_state() == SaveState::Clean
                    fallback=move || save_button(ButtonVariant::Unsaved)
                >
                    {save_button(ButtonVariant::Outline)}
                </Show>
                <label class="flex items-center gap-1 px-1 text-xs" title="Save automatically after typing stops">
                    <Checkbox
                        checked=autosave_on
                        on_toggle=Callback::new(move |on: bool| driver.feed(|m| m.set_enabled(on)))
                    />
                    "Autosave"
                </label>
                <span class="mx-1 h-5 w-px bg-border" />
                <Button variant=ButtonVariant::Ghost class=tool attr:title="Bold (Ctrl+B)" on:click=move |_| wrap("**")>
                    <b>"B"</b>
                </Button>
                <Button variant=ButtonVariant::Ghost class=tool attr:title="Italic (Ctrl+I)" on:click=move |_| wrap("*")>
                    <i>"I"</i>
                </Button>
                {(1u8..=6)
                    .map(|level| {
                        view! {
                            <Button
                                variant=ButtonVariant::Ghost
                                class=tool
                                attr:title=format!("Heading {level}")
                                on:click=move |_| prefix(format::heading_prefix(level))
                            >
                                {format!("H{level}")}
                            </Button>
                        }
                    })
                    .collect_view()}
                <Button variant=ButtonVariant::Ghost class=tool attr:title="Quote" on:click=move |_| prefix("> ".to_string())>
                    "\u{201C}"
                </Button>
                <Button variant=ButtonVariant::Ghost class=tool attr:title="De-indent" on:click=move |_| transform(format::deindent)>
                    "\u{21E4}"
                </Button>
                <Button variant=ButtonVariant::Ghost class=tool attr:title="Indent" on:click=move |_| transform(format::indent)>
                    "\u{21E5}"
                </Button>
                <span class="mx-1 h-5 w-px bg-border" />
                <Button
                    variant=ButtonVariant::Ghost
                    class=tool
                    on:click=move |_| state.modal.open(ModalKind::InsertLink(insert_callback()))
                >
                    "Link"
                </Button>
                <Button
                    variant=ButtonVariant::Ghost
                    class=tool
                    on:click=move |_| state.modal.open(ModalKind::InsertImage(insert_callback()))
                >
                    "Image"
                </Button>
                <Button
                    variant=ButtonVariant::Ghost
                    class=tool
                    on:click=move |_| state.modal.open(ModalKind::InsertTable(insert_callback()))
                >
                    "Table"
                </Button>
                <span class="mx-1 h-5 w-px bg-border" />
                <label class="flex items-center gap-1 px-1 text-xs">
                    <Checkbox checked=preview on_toggle=Callback::new(move |on| preview.set(on)) />
                    "Preview"
                </label>
                <a
                    class="ml-auto px-2 text-xs text-muted-foreground underline underline-offset-4"
                    href=MARKDOWN_HELP_URL
                    target="_blank"
                    rel="noopener"
                >
                    "Markdown help"
                </a>
            </div>
            <div class=move || if preview.get() { "grid gap-3 lg:grid-cols-2" } else { "grid" }>
                <textarea
                    class="min-h-[60vh] w-full rounded-md border border-input bg-transparent px-3 py-2 font-mono text-sm outline-none focus-visible:ring-2 focus-visible:ring-ring/50"
                    spellcheck="true"
                    aria-label="Note content"
                    prop:value=move || content.get()
                    on:input=on_input
                    on:keydown=on_keydown
                    node_ref=area_ref
                />
                <Show when=move || preview.get() fallback=|| ().into_view()>
                    <div class="min-h-[60vh] overflow-y-auto rounded-md border p-3">
                        <MarkdownView content=content />
                    </div>
                </Show>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn recording_handle(content: RwSignal<String>) -> (AutosaveHandle, StoredValue<Vec<String>>) {
        let sent = StoredValue::new(Vec::new());
        let on_save = Callback::new(move |req: SaveRequest| {
            sent.update_value(|s| s.push(req.content.clone()));
            req.done.finish(true);
        });
        // Disabled so no browser timer is involved.
        (AutosaveHandle::new(content, on_save, false), sent)
    }

    #[test]
    fn unsaved_edit_survives_editor_cleanup() {
        let page = Owner::new();
        page.set();
        let content = RwSignal::new("draft".to_string());
        let (handle, sent) = recording_handle(content);

        let editor = page.child();
        editor.with(|| {
            content.set("draft, edited".to_string());
            handle.feed(Autosave::edit);
        });
        editor.cleanup();
        assert_eq!(handle.state(), SaveState::Unsaved);

        handle.feed(|m| m.manual_save(false));
        assert_eq!(sent.get_value(), vec!["draft, edited".to_string()]);
        assert_eq!(handle.state(), SaveState::Clean);
    }

    #[test]
    fn reset_for_another_note_drops_pending_state() {
        let page = Owner::new();
        page.set();
        let content = RwSignal::new("first note".to_string());
        let (handle, sent) = recording_handle(content);

        handle.feed(Autosave::edit);
        handle.reset();
        assert_eq!(handle.state(), SaveState::Clean);
        assert!(sent.get_value().is_empty());
    }
}
