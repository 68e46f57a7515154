use super::home::RecentNotes;
use super::{ShelfParams, LINK_BUTTON};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader, CardTitle,
};
use crate::modal::ModalKind;
use crate::state::AppContext;
use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_params};

/// `/:username`: the user's landing page; the sidebar shows their books.
#[component]
pub fn UserPage() -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());
    let params = use_params::<ShelfParams>();
    let username = Memo::new(move |_| {
        params
            .get()
            .ok()
            .and_then(|p| p.username)
            .unwrap_or_default()
    });

    Effect::new(move |_| {
        let username = username.get();
        if !username.is_empty() {
            state.ensure_shelf(&username);
        }
        state.current_book.set(None);
        state.current_note.set(None);
    });

    let title = move || {
        let owner = state.shelf.with(|s| {
            s.as_ref()
                .filter(|c| c.user.username == username.get())
                .and_then(|c| c.user.name.clone())
                .filter(|n| !n.trim().is_empty())
        });
        format!("{}'s Area", owner.unwrap_or_else(|| username.get()))
    };
    let my_username = move || state.me.with(|m| m.as_ref().map(|u| u.username.clone()));
    let is_owner = move || my_username().is_some_and(|u| u == username.get());

    let relogin = move |_| {
        state.logout();
        navigate.with_value(|nav| nav("/login", Default::default()));
    };

    let account_action = move || {
        if is_owner() {
            view! {
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    on:click=move |_| state.modal.open(ModalKind::NewBook)
                >
                    "New Book"
                </Button>
            }
            .into_any()
        } else if let Some(me) = my_username() {
            view! {
                <a class=LINK_BUTTON href=format!("/{me}")>"My Notes"</a>
            }
            .into_any()
        } else if state.auth.with(Option::is_some) {
            // A stored token that no longer resolves to a user.
            view! {
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=relogin>
                    "Re-Login"
                </Button>
            }
            .into_any()
        } else {
            view! {
                <a class=LINK_BUTTON href="/login">"Login"</a>
            }
            .into_any()
        }
    };

    view! {
        <div class="space-y-6">
            <div class="py-4 text-center">
                <h1 class="text-3xl font-bold">{title}</h1>
                <div class="mt-4 flex justify-center gap-2">
                    {account_action}
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
