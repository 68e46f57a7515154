use crate::components::ui::{Button, ButtonSize, ButtonVariant, Card, CardContent, EnumSelect, Loading};
use crate::modal::ModalKind;
use crate::state::AppContext;
use crate::tree::{build_tree, SortChoice, TreeNode};
use icons::ChevronRight;
use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;
use leptos_router::hooks::use_location;

/// Header + sidebar shell shared by every page except the auth screens.
#[component]
pub fn AppLayout(children: ChildrenFn) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let location = use_location();
    let pathname = move || location.pathname.get();

    let is_authenticated = move || state.is_authenticated();
    let my_username = move || state.me.with(|m| m.as_ref().map(|u| u.username.clone()));
    let shelf_loaded = move || state.shelf.with(Option::is_some);

    // Cmd/Ctrl+K: search the loaded shelf.
    let _key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        let is_meta = ev.meta_key() || ev.ctrl_key();
        if is_meta && ev.key().to_lowercase() == "k" && state.shelf.with_untracked(Option::is_some) {
            ev.prevent_default();
            state.modal.open(ModalKind::ContentSearch);
        }
    });

    let children = StoredValue::new(children);

    view! {
        <div class="min-h-screen bg-background text-foreground">
            <header class="border-b border-border">
                <div class="mx-auto flex h-12 w-full max-w-6xl items-center gap-2 px-4">
                    <a href="/" class="text-sm font-medium text-foreground">"Note Mark"</a>
                    <div class="ml-auto flex items-center gap-1">
                        <Show when=shelf_loaded fallback=|| ().into_view()>
                            <Button
                                variant=ButtonVariant::Ghost
                                size=ButtonSize::Sm
                                attr:title="Search (Ctrl+K)"
                                on:click=move |_| state.modal.open(ModalKind::ContentSearch)
                            >
                                "Search"
                            </Button>
                        </Show>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=move |_| state.modal.open(ModalKind::UserSearch)
                        >
                            "Find User"
                        </Button>
                        <a class="px-2 text-xs text-muted-foreground hover:text-foreground" href="/scratch-pad">
                            "Scratch Pad"
                        </a>
                        <Show
                            when=is_authenticated
                            fallback=|| view! {
                                <a class="px-2 text-xs text-primary underline underline-offset-4" href="/login">"Login"</a>
                            }
                        >
                            {move || my_username().map(|u| view! {
                                <a class="px-2 text-xs text-muted-foreground hover:text-foreground" href=format!("/{u}")>
                                    "My Notes"
                                </a>
                            })}
                            <a class="px-2 text-xs text-muted-foreground hover:text-foreground" href="/profile">"Profile"</a>
                            <a class="px-2 text-xs text-muted-foreground hover:text-foreground" href="/logout">"Logout"</a>
                        </Show>
                    </div>
                </div>
            </header>
            <div class="mx-auto flex w-full max-w-6xl gap-4 px-4 py-6">
                <Show when=move || shelf_loaded() || state.shelf_loading.get() fallback=|| ().into_view()>
                    <aside class="hidden w-64 shrink-0 md:block">
                        <div class="sticky top-6">
                            <ShelfSidebar pathname=Signal::derive(pathname) />
                        </div>
                    </aside>
                </Show>
                <main class="min-w-0 flex-1">{move || children.with_value(|c| c())}</main>
            </div>
        </div>
    }
}

#[component]
fn ShelfSidebar(pathname: Signal<String>) -> impl IntoView {
    let state = expect_context::<AppContext>().0;

    let username = move || {
        state
            .shelf
            .with(|s| s.as_ref().map(|c| c.user.username.clone()))
            .unwrap_or_default()
    };
    let is_owner = move || {
        let owner = username();
        state
            .me
            .with(|m| m.as_ref().is_some_and(|u| !owner.is_empty() && u.username == owner))
    };
    let tree = Memo::new(move |_| {
        let sort = state.sort_choice.get();
        state.shelf.with(|s| {
            s.as_ref()
                .map(|c| build_tree(c, &c.user.username, sort))
                .unwrap_or_default()
        })
    });

    view! {
        <Card>
            <CardContent class="space-y-3 p-3">
                <div class="flex items-center justify-between gap-2">
                    <a class="truncate text-sm font-medium" href=move || format!("/{}", username())>
                        {username}
                    </a>
                    <Show when=is_owner fallback=|| ().into_view()>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Icon
                            class="h-7 w-7"
                            attr:title="New book"
                            on:click=move |_| state.modal.open(ModalKind::NewBook)
                        >
                            <span class="text-xs text-muted-foreground">"+"</span>
                        </Button>
                    </Show>
                </div>
                <EnumSelect
                    selected=state.sort_choice
                    on_change=Callback::new(move |choice| state.set_sort_choice(choice))
                    label=SortChoice::label
                    aria_label="Sort books and notes"
                />
                <Show when=move || !state.shelf_loading.get() fallback=|| view! { <Loading /> }>
                    <nav class="max-h-[70vh] space-y-1 overflow-y-auto text-sm">
                        {move || {
                            tree.get()
                                .into_iter()
                                .map(|node| view! { <BookBranch node=node pathname=pathname /> })
                                .collect_view()
                        }}
                        <Show when=move || tree.with(Vec::is_empty) fallback=|| ().into_view()>
                            <div class="text-xs text-muted-foreground">"No books yet."</div>
                        </Show>
                    </nav>
                </Show>
            </CardContent>
        </Card>
    }
}

fn is_within(pathname: &str, href: &str) -> bool {
    pathname == href || pathname.strip_prefix(href).is_some_and(|rest| rest.starts_with('/'))
}

#[component]
fn BookBranch(node: TreeNode, pathname: Signal<String>) -> impl IntoView {
    let book_href = node.href.clone();
    let active_book = {
        let href = book_href.clone();
        move || pathname.with(|p| is_within(p, &href))
    };
    let expanded = RwSignal::new(pathname.with_untracked(|p| is_within(p, &book_href)));
    Effect::new(move |_| {
        if active_book() {
            expanded.set(true);
        }
    });

    let notes = StoredValue::new(node.children);
    let note_items = move || {
        notes
            .get_value()
            .into_iter()
            .map(|note| {
                let href = note.href.clone();
                let item_class = move || {
                    if pathname.with(|p| *p == href) {
                        "block truncate rounded-md bg-accent px-2 py-1 text-xs"
                    } else {
                        "block truncate rounded-md px-2 py-1 text-xs text-muted-foreground hover:bg-accent"
                    }
                };
                view! {
                    <li>
                        <a class=item_class href=note.href>{note.title}</a>
                    </li>
                }
            })
            .collect_view()
    };

    view! {
        <div>
            <div class="flex items-center gap-1">
                <button
                    type="button"
                    class="rounded-sm p-0.5 text-muted-foreground hover:text-foreground"
                    aria-label="Toggle notes"
                    on:click=move |_| expanded.update(|v| *v = !*v)
                >
                    <span class=move || if expanded.get() { "block rotate-90 transition-transform" } else { "block transition-transform" }>
                        <ChevronRight class="size-3" />
                    </span>
                </button>
                <a class="flex-1 truncate rounded-md px-1 py-1 font-medium hover:bg-accent" href=book_href>
                    {node.title}
                </a>
            </div>
            <Show when=move || expanded.get() fallback=|| ().into_view()>
                <ul class="ml-4 space-y-0.5 border-l border-border pl-2">{note_items}</ul>
            </Show>
        </div>
    }
}

/// Shows `children` to logged in users, the login page otherwise.
#[component]
pub fn RootAuthed(children: ChildrenFn) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let children = StoredValue::new(children);

    view! {
        <Show when=move || state.is_authenticated() fallback=move || view! { <super::LoginPage /> }>
            {move || children.with_value(|c| c())}
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::is_within;

    #[test]
    fn route_prefix_matches_whole_segments() {
        assert!(is_within("/leo/notes", "/leo/notes"));
        assert!(is_within("/leo/notes/todo", "/leo/notes"));
        assert!(!is_within("/leo/notes-old", "/leo/notes"));
    }
}
