use icons::X;
use leptos::prelude::*;
use leptos_ui::clx;
use tw_merge::*;

mod components {
    use super::*;
    clx! {ModalBody, div, "flex flex-col gap-3"}
    clx! {ModalFooter, footer, "flex flex-col-reverse gap-2 pt-2 sm:flex-row sm:justify-end"}
}

pub use components::*;

/// Overlay panel for the active modal. Mounting is driven by the modal state,
/// so there is no open/closed attribute dance here.
#[component]
pub fn ModalFrame(
    #[prop(into)] title: String,
    on_close: Callback<()>,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let panel_class = tw_merge!(
        "relative w-full max-w-md max-h-[85vh] overflow-y-auto rounded-md border border-border bg-background p-4 shadow-lg",
        class
    );

    view! {
        <div
            class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4"
            on:keydown=move |ev: web_sys::KeyboardEvent| {
                if ev.key() == "Escape" {
                    ev.prevent_default();
                    on_close.run(());
                }
            }
        >
            <div class=panel_class role="dialog" aria-modal="true">
                <button
                    type="button"
                    class="absolute top-3 right-3 rounded-sm p-1 text-muted-foreground hover:text-foreground"
                    aria-label="Close"
                    on:click=move |_| on_close.run(())
                >
                    <X class="size-4" />
                </button>
                <h3 class="mb-3 text-sm font-medium">{title}</h3>
                {children()}
            </div>
        </div>
    }
}
