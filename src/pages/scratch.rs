use super::note::NoteView;
use crate::editor::{AutosaveHandle, SaveRequest};
use crate::state::{AppContext, NoteMode};
use crate::storage::{read_setting, write_setting, SCRATCH_PAD_KEY};
use crate::toast::ToastKind;
use leptos::prelude::*;

/// Local-only note kept in session storage.
#[component]
pub fn ScratchPadPage() -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let mode = RwSignal::new(NoteMode::Edit);
    let content = RwSignal::new(read_setting(SCRATCH_PAD_KEY).unwrap_or_default());

    let on_save = Callback::new(move |req: SaveRequest| {
        let result = write_setting(SCRATCH_PAD_KEY, &req.content, false);
        if let Err(e) = &result {
            state.notify(ToastKind::Error, format!("could not save scratch pad: {e}"));
        }
        req.done.finish(result.is_ok());
    });
    let autosave = AutosaveHandle::new(content, on_save, true);

    view! {
        <div class="space-y-3">
            <div class="space-y-1">
                <h1 class="text-xl font-semibold">"Scratch Pad"</h1>
                <p class="text-xs text-muted-foreground">"Kept in this browser tab only."</p>
            </div>
            <NoteView
                mode=mode
                on_mode=Callback::new(move |m| mode.set(m))
                content=content
                can_edit=true
                autosave=autosave
            />
        </div>
    }
}
