use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Checkbox, FormError, Input, Label, ModalBody, ModalFooter,
    ModalFrame, Spinner,
};
use crate::models::{Book, CreateBook, Note, UpdateBook};
use crate::state::AppContext;
use crate::toast::ToastKind;
use crate::tree::book_href;
use crate::util::{to_slug, to_slug_with_suffix};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

const SLUG_PATTERN: &str = "(?:[a-z0-9]|-)+";

/// Name and slug inputs shared by the create/edit book forms.
/// The slug follows the name until it is edited by hand.
#[component]
pub(super) fn NameSlugFields(
    name: RwSignal<String>,
    slug: RwSignal<String>,
    #[prop(default = true)] slug_follows_name: bool,
    name_placeholder: &'static str,
    slug_placeholder: &'static str,
) -> impl IntoView {
    let slug_touched = RwSignal::new(!slug_follows_name);

    Effect::new(move |_| {
        let n = name.get();
        if !slug_touched.get_untracked() {
            slug.set(to_slug(&n));
        }
    });

    let slug_input = RwSignal::new(slug.get_untracked());
    Effect::new(move |_| slug_input.set(slug.get()));
    Effect::new(move |prev: Option<String>| {
        let v = slug_input.get();
        if prev.is_some() && v != slug.get_untracked() {
            slug_touched.set(true);
            slug.set(to_slug(&v));
        }
        v
    });

    view! {
        <div class="space-y-1">
            <Label html_for="entry-name">"Title"</Label>
            <Input id="entry-name" bind_value=name placeholder=name_placeholder required=true autofocus=true />
        </div>
        <div class="space-y-1">
            <Label html_for="entry-slug">"Slug"</Label>
            <div class="flex gap-2">
                <Input
                    id="entry-slug"
                    bind_value=slug_input
                    placeholder=slug_placeholder
                    pattern=SLUG_PATTERN
                    required=true
                />
                <Button
                    attr:r#type="button"
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    attr:title="Add a random suffix"
                    on:click=move |_| {
                        slug_touched.set(true);
                        slug.set(to_slug_with_suffix(&name.get_untracked()));
                    }
                >
                    "Random"
                </Button>
            </div>
        </div>
    }
}

#[component]
pub(super) fn NewBookModal(on_close: Callback<()>) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());

    let name = RwSignal::new(String::new());
    let slug = RwSignal::new(String::new());
    let is_public = RwSignal::new(false);
    let loading = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let body = CreateBook {
            name: name.get_untracked().trim().to_string(),
            slug: slug.get_untracked(),
            is_public: is_public.get_untracked(),
        };
        if body.name.is_empty() || body.slug.is_empty() {
            error.set(Some("Title and slug are required".to_string()));
            return;
        }
        let Some(username) = state.me.with_untracked(|m| m.as_ref().map(|u| u.username.clone()))
        else {
            return;
        };

        let api = state.api();
        loading.set(true);
        error.set(None);
        spawn_local(async move {
            match api.create_book(&body).await {
                Ok(book) => {
                    let href = book_href(&username, &book.slug);
                    state.update_book(book);
                    on_close.run(());
                    navigate.with_value(|nav| nav(&href, Default::default()));
                }
                Err(e) => state.report(&e, "creating book"),
            }
            loading.set(false);
        });
    };

    view! {
        <ModalFrame title="New Book" on_close=on_close>
            <form on:submit=on_submit>
                <ModalBody>
                    <NameSlugFields
                        name=name
                        slug=slug
                        name_placeholder="e.g. My Amazing Book"
                        slug_placeholder="e.g. my-amazing-book"
                    />
                    <Label class="justify-between">
                        "Public"
                        <Checkbox checked=is_public on_toggle=Callback::new(move |v| is_public.set(v)) />
                    </Label>
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
pub(super) fn EditBookModal(book: Book, on_close: Callback<()>) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());
    let book = StoredValue::new(book);

    let name = RwSignal::new(book.with_value(|b| b.name.clone()));
    let slug = RwSignal::new(book.with_value(|b| b.slug.clone()));
    let is_public = RwSignal::new(book.with_value(|b| b.is_public));
    let loading = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

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
        let mut updated = book.get_value();
        updated.name = name.get_untracked().trim().to_string();
        updated.slug = slug.get_untracked();
        updated.is_public = is_public.get_untracked();
        if updated.name.is_empty() || updated.slug.is_empty() {
            error.set(Some("Title and slug are required".to_string()));
            return;
        }
        let body = UpdateBook {
            name: Some(updated.name.clone()),
            slug: Some(updated.slug.clone()),
            is_public: Some(updated.is_public),
        };

        let api = state.api();
        loading.set(true);
        error.set(None);
        spawn_local(async move {
            match api.update_book(&updated.id, &body).await {
                Ok(()) => {
                    let href = book_href(&username(), &updated.slug);
                    state.update_book(updated);
                    on_close.run(());
                    navigate.with_value(|nav| nav(&href, Default::default()));
                }
                Err(e) => state.report(&e, "saving book"),
            }
            loading.set(false);
        });
    };

    let on_delete = move |_| {
        if loading.get_untracked() {
            return;
        }
        let confirmed = window()
            .confirm_with_message("Delete this book and all of its notes?")
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        let id = book.with_value(|b| b.id.clone());
        let api = state.api();
        loading.set(true);
        spawn_local(async move {
            match api.delete_book(&id).await {
                Ok(()) => {
                    state.delete_book(&id);
                    on_close.run(());
                    let home = format!("/{}", username());
                    navigate.with_value(|nav| nav(&home, Default::default()));
                }
                Err(e) => state.report(&e, "deleting book"),
            }
            loading.set(false);
        });
    };

    view! {
        <ModalFrame title="Update Book" on_close=on_close>
            <form on:submit=on_submit>
                <ModalBody>
                    <NameSlugFields
                        name=name
                        slug=slug
                        slug_follows_name=false
                        name_placeholder="e.g. My Amazing Book"
                        slug_placeholder="e.g. my-amazing-book"
                    />
                    <Label class="justify-between">
                        "Public"
                        <Checkbox checked=is_public on_toggle=Callback::new(move |v| is_public.set(v)) />
                    </Label>
                    <DeletedNotes book_id=book.with_value(|b| b.id.clone()) />
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

/// Soft-deleted notes of a book, with restore and permanent delete.
#[component]
fn DeletedNotes(book_id: String) -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let notes: RwSignal<Vec<Note>> = RwSignal::new(vec![]);
    let loading = RwSignal::new(true);

    let api = state.api();
    spawn_local(async move {
        match api.get_notes_by_book_id(&book_id, true).await {
            Ok(found) => notes.set(found),
            Err(e) => state.report(&e, "getting removed notes"),
        }
        loading.set(false);
    });

    let restore = move |note: Note| {
        let api = state.api();
        spawn_local(async move {
            match api.restore_note(&note.id).await {
                Ok(()) => {
                    notes.update(|ns| ns.retain(|n| n.id != note.id));
                    state.notify(ToastKind::Success, format!("restored {}", note.name));
                    state.update_note(note);
                }
                Err(e) => state.report(&e, "restoring note"),
            }
        });
    };

    let purge = move |id: String| {
        let api = state.api();
        spawn_local(async move {
            match api.delete_note(&id, true).await {
                Ok(()) => notes.update(|ns| ns.retain(|n| n.id != id)),
                Err(e) => state.report(&e, "deleting note"),
            }
        });
    };

    view! {
        <div class="space-y-2">
            <div class="text-xs font-medium">"Removed notes"</div>
            <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
                <ul class="max-h-40 space-y-1 overflow-y-auto">
                    <For
                        each=move || notes.get()
                        key=|n| n.id.clone()
                        children=move |note: Note| {
                            let id = note.id.clone();
                            let name = note.name.clone();
                            view! {
                                <li class="flex items-center gap-2 rounded-md border px-2 py-1 text-xs">
                                    <span class="flex-1 truncate">{name}</span>
                                    <Button
                                        attr:r#type="button"
                                        variant=ButtonVariant::Outline
                                        size=ButtonSize::Sm
                                        on:click=move |_| restore(note.clone())
                                    >
                                        "Restore"
                                    </Button>
                                    <Button
                                        attr:r#type="button"
                                        variant=ButtonVariant::Destructive
                                        size=ButtonSize::Sm
                                        on:click=move |_| purge(id.clone())
                                    >
                                        "Delete"
                                    </Button>
                                </li>
                            }
                        }
                    />
                </ul>
                <Show when=move || notes.with(Vec::is_empty) fallback=|| ().into_view()>
                    <div class="text-xs text-muted-foreground">"Nothing removed."</div>
                </Show>
            </Show>
        </div>
    }
}
