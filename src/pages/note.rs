use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use crate::editor::{AutosaveHandle, Editor};
use crate::markdown::MarkdownView;
use crate::state::NoteMode;
use leptos::prelude::*;
use strum::IntoEnumIterator;

fn mode_label(mode: NoteMode) -> &'static str {
    match mode {
        NoteMode::Rendered => "Rendered",
        NoteMode::Plain => "Plain",
        NoteMode::Edit => "Edit",
    }
}

/// A note body in one of its three modes, with the mode switcher above it.
#[component]
pub(super) fn NoteView(
    #[prop(into)] mode: Signal<NoteMode>,
    on_mode: Callback<NoteMode>,
    content: RwSignal<String>,
    #[prop(into)] can_edit: Signal<bool>,
    autosave: AutosaveHandle,
) -> impl IntoView {
    let effective = Memo::new(move |_| mode.get().effective(can_edit.get()));

    let tabs = move || {
        NoteMode::iter()
            .filter(|m| *m != NoteMode::Edit || can_edit.get())
            .map(|m| {
                let active = effective.get() == m;
                view! {
                    <Button
                        variant=if active { ButtonVariant::Secondary } else { ButtonVariant::Ghost }
                        size=ButtonSize::Sm
                        attr:aria-pressed=if active { "true" } else { "false" }
                        on:click=move |_| on_mode.run(m)
                    >
                        {mode_label(m)}
                    </Button>
                }
            })
            .collect_view()
    };

    view! {
        <div class="space-y-3">
            <div class="flex gap-1 border-b border-border pb-2">{tabs}</div>
            {move || match effective.get() {
                NoteMode::Rendered => view! {
                    <article class="min-h-[40vh]">
                        <MarkdownView content=content />
                    </article>
                }
                .into_any(),
                NoteMode::Plain => view! {
                    <pre class="min-h-[40vh] whitespace-pre-wrap break-words rounded-md border p-3 font-mono text-sm">
                        {move || content.get()}
                    </pre>
                }
                .into_any(),
                NoteMode::Edit => view! { <Editor autosave=autosave /> }.into_any(),
            }}
        </div>
    }
}
