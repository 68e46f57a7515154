use super::book::NameSlugFields;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, FormError, Label, ModalBody, ModalFooter, ModalFrame,
    Spinner,
};
use crate::models::{Book, CreateNote, Note, UpdateNote};
use crate::state::AppContext;
use crate::tree::{book_href, note_href};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use wasm_bindgen::JsCast;

#[component]
pub(super) fn NewNoteModal(book: Book, on_close: Callback<()>) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());
    let book = StoredValue::new(book);

    let name = RwSignal::new(String::new());
    let slug = RwSignal::new(String::new());
    let loading = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let body = CreateNote {
            name: name.get_untracked().trim().to_string(),
            slug: slug.get_untracked(),
        };
        if body.name.is_empty() || body.slug.is_empty() {
            error.set(Some("Title and slug are required".to_string()));
            return;
        }
        let Some(username) = state.me.with_untracked(|m| m.as_ref().map(|u| u.username.clone()))
        else {
            return;
        };
        let (book_id, book_slug) = book.with_value(|b| (b.id.clone(), b.slug.clone()));

        let api = state.api();
        loading.set(true);
        error.set(None);
        spawn_local(async move {
            match api.create_note(&book_id, &body).await {
                Ok(note) => {
                    let href = note_href(&username, &book_slug, &note.slug);
                    state.update_note(note);
                    on_close.run(());
                    navigate.with_value(|nav| nav(&href, Default::default()));
                }
                Err(e) => state.report(&e, "creating note"),
            }
            loading.set(false);
        });
    };

    let title = book.with_value(|b| format!("New Note in {}", b.name));

    view! {
        <ModalFrame title=title on_close=on_close>
            <form on:submit=on_submit>
                <ModalBody>
                    <NameSlugFields
                        name=name
                        slug=slug
                        name_placeholder="e.g. Shopping List"
                        slug_placeholder="e.g. shopping-list"
                    />
                    <FormError error=error />
                    <ModalFooter>
                        <Button attr:r#type="button" variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| on_close.run(())>
                            "Cancel"
                        </Button>
                        <Button size=ButtonSize::Sm attr:disabled=move || loading.get()>
                            <Show when=move || loading.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            "Create"
                        </Button>
                    </ModalFooter>
                </ModalBody>
            </form>
        </ModalFrame>
    }
}

#[component]
pub(super) fn EditNoteModal(book: Book, note: Note, on_close: Callback<()>) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());
    let book = StoredValue::new(book);
    let note = StoredValue::new(note);

    let name = RwSignal::new(note.with_value(|n| n.name.clone()));
    let slug = RwSignal::new(note.with_value(|n| n.slug.clone()));
    let target_book = RwSignal::new(book.with_value(|b| b.id.clone()));
    let loading = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    // books the note can move to
    let book_choices = move || {
        state.shelf.with(|s| {
            s.as_ref()
                .map(|c| {
                    c.books()
                        .filter(|b| state.owns(b))
                        .map(|b| (b.id.clone(), b.name.clone(), b.slug.clone()))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
    };

    let username = move || {
        state
            .me
            .with_untracked(|m| m.as_ref().map(|u| u.username.clone()))
            .unwrap_or_default()
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let mut updated = note.get_value();
        updated.name = name.get_untracked().trim().to_string();
        updated.slug = slug.get_untracked();
        if updated.name.is_empty() || updated.slug.is_empty() {
            error.set(Some("Title and slug are required".to_string()));
            return;
        }
        let new_book_id = target_book.get_untracked();
        let moved = new_book_id != updated.book_id;
        let book_slug = if moved {
            state
                .shelf
                .with_untracked(|s| s.as_ref().and_then(|c| c.book(&new_book_id).map(|b| b.slug.clone())))
                .unwrap_or_else(|| book.with_value(|b| b.slug.clone()))
        } else {
            book.with_value(|b| b.slug.clone())
        };
        let body = UpdateNote {
            name: Some(updated.name.clone()),
            slug: Some(updated.slug.clone()),
            book_id: moved.then(|| new_book_id.clone()),
        };
        updated.book_id = new_book_id;

        let api = state.api();
        loading.set(true);
        error.set(None);
        spawn_local(async move {
            match api.update_note(&updated.id, &body).await {
                Ok(()) => {
                    let href = note_href(&username(), &book_slug, &updated.slug);
                    on_close.run(());
                    navigate.with_value(|nav| nav(&href, Default::default()));
                    state.update_note(updated);
                }
                Err(e) => state.report(&e, "saving note"),
            }
            loading.set(false);
        });
    };

    let on_delete = move |_| {
        if loading.get_untracked() {
            return;
        }
        let id = note.with_value(|n| n.id.clone());
        let api = state.api();
        loading.set(true);
        spawn_local(async move {
            match api.delete_note(&id, false).await {
                Ok(()) => {
                    let href = book.with_value(|b| book_href(&username(), &b.slug));
                    on_close.run(());
                    navigate.with_value(|nav| nav(&href, Default::default()));
                    state.delete_note(&id);
                }
                Err(e) => state.report(&e, "deleting note"),
            }
            loading.set(false);
        });
    };

    let on_book_change = move |ev: web_sys::Event| {
        if let Some(select) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
        {
            target_book.set(select.value());
        }
    };

    view! {
        <ModalFrame title="Update Note" on_close=on_close>
            <form on:submit=on_submit>
                <ModalBody>
                    <NameSlugFields
                        name=name
                        slug=slug
                        slug_follows_name=false
                        name_placeholder="e.g. Shopping List"
                        slug_placeholder="e.g. shopping-list"
                    />
                    <div class="space-y-1">
                        <Label html_for="note-book">"Book"</Label>
                        <select
                            id="note-book"
                            class="h-8 w-full rounded-md border border-input bg-background px-2 text-xs"
                            on:change=on_book_change
                        >
                            {move || {
                                book_choices()
                                    .into_iter()
                                    .map(|(id, name, slug)| {
                                        let selected = id == target_book.get_untracked();
                                        view! {
                                            <option value=id selected=selected>
                                                {format!("{name} ({slug})")}
                                            </option>
                                        }
                                    })
                                    .collect_view()
                            }}
                        </select>
                    </div>
                    <FormError error=error />
                    <ModalFooter>
                        <Button
                            attr:r#type="button"
                            variant=ButtonVariant::Destructive
                            size=ButtonSize::Sm
                            attr:disabled=move || loading.get()
                            on:click=on_delete
                        >
                            "Delete"
                        </Button>
                        <Button attr:r#type="button" variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| on_close.run(())>
                            "Cancel"
                        </Button>
                        <Button size=ButtonSize::Sm attr:disabled=move || loading.get()>
                            <Show when=move || loading.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            "Save"
                        </Button>
                    </ModalFooter>
                </ModalBody>
            </form>
        </ModalFrame>
    }
}
