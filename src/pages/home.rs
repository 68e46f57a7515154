use super::LINK_BUTTON;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader, CardItem, CardList, CardTitle,
    Loading,
};
use crate::models::RecentNote;
use crate::modal::ModalKind;
use crate::state::AppContext;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Notes the logged in user touched last. Reloaded whenever the user changes.
#[component]
pub(super) fn RecentNotes() -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let notes: RwSignal<Vec<RecentNote>> = RwSignal::new(Vec::new());
    let loading = RwSignal::new(false);
    let request = StoredValue::new(0u64);

    Effect::new(move |_| {
        let user_id = state.me.with(|m| m.as_ref().map(|u| u.id.clone()));
        request.update_value(|id| *id += 1);
        let request_id = request.get_value();
        if user_id.is_none() {
            notes.set(Vec::new());
            return;
        }
        let api = state.api();
        loading.set(true);
        spawn_local(async move {
            let result = api.get_notes_recent().await;
            if request.try_get_value() != Some(request_id) {
                return;
            }
            match result {
                Ok(rows) => notes.set(rows),
                Err(e) => {
                    tracing::warn!("recent notes unavailable: {e}");
                    notes.set(Vec::new());
                }
            }
            loading.set(false);
        });
    });

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Loading /> }>
            <Show
                when=move || notes.with(|n| !n.is_empty())
                fallback=|| view! { <p class="text-center text-xs text-muted-foreground">"Nothing here yet."</p> }
            >
                <CardList>
                    <For
                        each=move || notes.get()
                        key=|row| row.value.id.clone()
                        children=move |row: RecentNote| {
                            view! {
                                <CardItem>
                                    <a
                                        class="w-full truncate rounded-md border px-3 py-2 text-sm hover:bg-accent"
                                        href=format!("/{}", row.slug)
                                    >
                                        {row.value.name}
                                    </a>
                                </CardItem>
                            }
                        }
                    />
                </CardList>
            </Show>
        </Show>
    }
}

#[component]
pub fn HomePage() -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let my_username = move || state.me.with(|m| m.as_ref().map(|u| u.username.clone()));

    view! {
        <div class="space-y-6">
            <div class="mx-auto max-w-md py-6 text-center">
                <h1 class="text-4xl font-bold">"Note Mark"</h1>
                <p class="py-4 text-sm text-muted-foreground">"Lighting Fast & Minimal Markdown Note Taking App."</p>
                <div class="flex justify-center gap-2">
                    <Show when=move || !state.is_authenticated() fallback=|| ().into_view()>
                        <a class=LINK_BUTTON href="/login">"Login"</a>
                    </Show>
                    {move || my_username().map(|u| view! {
                        <a class=LINK_BUTTON href=format!("/{u}")>"My Notes"</a>
                    })}
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        on:click=move |_| state.modal.open(ModalKind::UserSearch)
                    >
                        "Find User"
                    </Button>
                </div>
            </div>
            <Show when=move || state.me.with(Option::is_some) fallback=|| ().into_view()>
                <Card>
                    <CardHeader>
                        <CardTitle class="text-base">"Recent Notes"</CardTitle>
                    </CardHeader>
                    <CardContent>
                        <RecentNotes />
                    </CardContent>
                </Card>
            </Show>
        </div>
    }
}
