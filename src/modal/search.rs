use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Input, Label, Loading, ModalBody, ModalFooter, ModalFrame,
};
use crate::search::{search_searchables, SearchResults, SEARCH_SIZE_LIMIT};
use crate::state::AppContext;
use crate::tree::{book_href, note_href};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

const RESULT_ITEM: &str =
    "flex w-full items-center gap-2 rounded-md border px-2 py-1.5 text-left text-sm hover:bg-accent";

/// Find a book or note in the loaded shelf by title.
#[component]
pub(super) fn ContentSearchModal(on_close: Callback<()>) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());

    let term = RwSignal::new(String::new());
    let results = RwSignal::new(SearchResults::default());
    let searching = RwSignal::new(false);
    let search_id = StoredValue::new(0u64);

    // Searchables are computed once per shelf revision.
    let searchables = Memo::new(move |_| {
        state
            .shelf
            .with(|s| s.as_ref().map(|c| c.searchables()).unwrap_or_default())
    });

    Effect::new(move |_| {
        let term = term.get();
        let (books, notes) = searchables.get();
        search_id.update_value(|id| *id += 1);
        let id = search_id.get_value();
        searching.set(true);
        spawn_local(async move {
            let started = js_sys::Date::now();
            let found = search_searchables(&term, &books, &notes, SEARCH_SIZE_LIMIT).await;
            tracing::debug!(
                "searching for '{term}' took {}ms",
                js_sys::Date::now() - started
            );
            if search_id.get_value() == id {
                results.set(found);
                searching.set(false);
            }
        });
    });

    let go_to = move |book_id: String, note_id: Option<String>| {
        let href = state.shelf.with_untracked(|s| {
            let cache = s.as_ref()?;
            let username = &cache.user.username;
            let book = cache.book(&book_id)?;
            match note_id {
                Some(note_id) => {
                    let note = cache.notes_of(&book_id).find(|n| n.id == note_id)?;
                    Some(note_href(username, &book.slug, &note.slug))
                }
                None => Some(book_href(username, &book.slug)),
            }
        });
        on_close.run(());
        if let Some(href) = href {
            navigate.with_value(|nav| nav(&href, Default::default()));
        }
    };

    view! {
        <ModalFrame title="Search" on_close=on_close>
            <ModalBody>
                <div class="space-y-1">
                    <Label html_for="content-search">"Search for book or note"</Label>
                    <Input id="content-search" bind_value=term placeholder="e.g. Note Mark" autofocus=true />
                </div>
                <Show when=move || !searching.get() fallback=|| view! { <Loading /> }>
                    <ul class="max-h-80 space-y-1 overflow-y-auto">
                        {move || {
                            results
                                .get()
                                .books
                                .into_iter()
                                .map(|b| {
                                    let id = b.book_id.clone();
                                    view! {
                                        <li>
                                            <button type="button" class=RESULT_ITEM on:click=move |_| go_to(id.clone(), None)>
                                                <span class="text-xs text-muted-foreground">"Book"</span>
                                                {b.book_title}
                                            </button>
                                        </li>
                                    }
                                })
                                .collect_view()
                        }}
                        {move || {
                            results
                                .get()
                                .notes
                                .into_iter()
                                .map(|n| {
                                    let (book_id, note_id) = (n.book_id.clone(), n.note_id.clone());
                                    view! {
                                        <li>
                                            <button
                                                type="button"
                                                class=RESULT_ITEM
                                                on:click=move |_| go_to(book_id.clone(), Some(note_id.clone()))
                                            >
                                                <span class="text-xs text-muted-foreground">{n.book_title}" /"</span>
                                                {n.note_title}
                                            </button>
                                        </li>
                                    }
                                })
                                .collect_view()
                        }}
                    </ul>
                    <Show
                        when=move || !term.with(String::is_empty) && results.with(SearchResults::is_empty)
                        fallback=|| ().into_view()
                    >
                        <div class="text-xs text-muted-foreground">"No matches."</div>
                    </Show>
                </Show>
                <ModalFooter>
                    <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| on_close.run(())>
                        "Close"
                    </Button>
                </ModalFooter>
            </ModalBody>
        </ModalFrame>
    }
}

/// Usernames may only hold ASCII letters and digits.
fn sanitise_username(v: &str) -> String {
    v.chars().filter(char::is_ascii_alphanumeric).collect()
}

#[component]
pub(super) fn UserSearchModal(on_close: Callback<()>) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let username = RwSignal::new(String::new());
    let users: RwSignal<Vec<String>> = RwSignal::new(vec![]);
    let loading = RwSignal::new(false);
    let search_id = StoredValue::new(0u64);

    Effect::new(move |_| {
        let query = sanitise_username(&username.get());
        search_id.update_value(|id| *id += 1);
        if query.is_empty() {
            users.set(vec![]);
            loading.set(false);
            return;
        }
        let id = search_id.get_value();
        let api = state.api();
        loading.set(true);
        spawn_local(async move {
            let result = api.search_users(&query).await;
            if search_id.get_value() != id {
                return;
            }
            match result {
                Ok(found) => users.set(found),
                Err(e) => state.report(&e, "searching for users"),
            }
            loading.set(false);
        });
    });

    view! {
        <ModalFrame title="Find User" on_close=on_close>
            <ModalBody>
                <div class="space-y-1">
                    <Label html_for="user-search">"Username"</Label>
                    <Input
                        id="user-search"
                        bind_value=username
                        placeholder="e.g. leo"
                        pattern="[A-Za-z0-9]+"
                        autofocus=true
                    />
                </div>
                <ul class="h-40 max-h-40 space-y-1 overflow-y-auto rounded-md bg-muted/40 p-2">
                    <For
                        each=move || users.get()
                        key=|u| u.clone()
                        children=move |user: String| {
                            let href = format!("/{user}");
                            view! {
                                <li>
                                    <a class=RESULT_ITEM href=href on:click=move |_| on_close.run(())>
                                        {user}
                                    </a>
                                </li>
                            }
                        }
                    />
                </ul>
                <ModalFooter>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || loading.get()
                        on:click=move |_| on_close.run(())
                    >
                        "Close"
                    </Button>
                </ModalFooter>
            </ModalBody>
        </ModalFrame>
    }
}

#[cfg(test)]
mod tests {
    use super::sanitise_username;
    use pretty_assertions::assert_eq;

    #[test]
    fn usernames_keep_ascii_alphanumerics() {
        assert_eq!(sanitise_username("le o!_42"), "leo42");
        assert_eq!(sanitise_username("ünïcode"), "ncode");
    }
}
