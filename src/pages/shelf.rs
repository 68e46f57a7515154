use super::note::NoteView;
use super::ShelfParams;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, Loading};
use crate::editor::{AutosaveHandle, SaveRequest};
use crate::modal::ModalKind;
use crate::models::NoteId;
use crate::state::AppContext;
use crate::toast::ToastKind;
use crate::tree::{book_href, note_href, Breadcrumb};
use crate::util::{copy_to_clipboard, download_text, ensure_trailing_newline};
use chrono::{DateTime, Utc};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params;

#[component]
fn NoteBreadcrumb(crumb: Breadcrumb) -> impl IntoView {
    let user_label = crumb
        .full_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| crumb.username.clone());
    let user_href = format!("/{}", crumb.username);
    let book = crumb.book_slug.clone().map(|slug| {
        let href = book_href(&crumb.username, &slug);
        let label = crumb.book_name.clone().unwrap_or(slug);
        view! {
            <span class="text-muted-foreground">"/"</span>
            <a class="truncate hover:underline" href=href>{label}</a>
        }
    });
    let note = crumb.book_slug.clone().zip(crumb.note_slug.clone()).map(|(book_slug, slug)| {
        let href = note_href(&crumb.username, &book_slug, &slug);
        let label = crumb.note_name.clone().unwrap_or(slug);
        view! {
            <span class="text-muted-foreground">"/"</span>
            <a class="truncate font-medium hover:underline" href=href>{label}</a>
        }
    });

    view! {
        <nav class="flex min-w-0 flex-1 items-center gap-1 text-sm" aria-label="Breadcrumb">
            <a class="truncate hover:underline" href=user_href>{user_label}</a>
            {book}
            {note}
        </nav>
    }
}

/// `/:username/:book_slug[/:note_slug]`: breadcrumb, note actions and the note itself.
#[component]
pub fn ShelfPage() -> impl IntoView {
    let state = expect_context::<AppContext>().0;
    let params = use_params::<ShelfParams>();
    let route = Memo::new(move |_| {
        params
            .get()
            .map(|p| (p.username.unwrap_or_default(), p.book_slug, p.note_slug))
            .unwrap_or_default()
    });

    Effect::new(move |_| {
        let (username, _, _) = route.get();
        if !username.is_empty() {
            state.ensure_shelf(&username);
        }
    });

    Effect::new(move |_| {
        let (username, book_slug, note_slug) = route.get();
        state.book_refresh.track();
        state.note_refresh.track();
        if !username.is_empty() {
            state.load_displayed(username, book_slug, note_slug);
        }
    });

    let content = RwSignal::new(String::new());
    let content_loading = RwSignal::new(false);
    // Note whose content is in `content`; the editor is remounted when it changes.
    // Its save state lives in `autosave` so mode switches and reloads keep it.
    let loaded_note: RwSignal<Option<NoteId>> = RwSignal::new(None);
    let content_request = StoredValue::new(0u64);
    let last_modified: RwSignal<Option<DateTime<Utc>>> = RwSignal::new(None);

    let current_note_id = Memo::new(move |_| {
        state
            .current_note
            .with(|n| n.as_ref().map(|n| n.id.clone()))
    });

    // Baseline for If-Unmodified-Since follows the server's copy of the note.
    Effect::new(move |_| {
        let updated_at = state.current_note.with(|n| n.as_ref().map(|n| n.updated_at));
        last_modified.set(updated_at);
    });

    let on_save = Callback::new(move |req: SaveRequest| {
        let Some(note_id) = current_note_id.get_untracked() else {
            req.done.finish(false);
            return;
        };
        let baseline = last_modified.get_untracked();
        let api = state.api();
        spawn_local(async move {
            match api.update_note_content(&note_id, &req.content, baseline).await {
                Ok(modified) => {
                    // The page may be gone by now.
                    last_modified.try_update(|lm| *lm = Some(lm.map_or(modified, |old| old.max(modified))));
                    req.done.finish(true);
                }
                Err(e) => {
                    if req.done.is_current() {
                        state.report(&e, "saving note");
                    } else {
                        tracing::debug!(generation = req.generation, "superseded save failed: {e}");
                    }
                    req.done.finish(false);
                }
            }
        });
    });
    let autosave = AutosaveHandle::new(content, on_save, true);

    Effect::new(move |_| {
        let Some(note_id) = current_note_id.get() else {
            autosave.reset();
            loaded_note.set(None);
            content.set(String::new());
            return;
        };
        if loaded_note.get_untracked().as_deref() == Some(note_id.as_str()) {
            return;
        }
        autosave.reset();
        content_request.update_value(|id| *id += 1);
        let request_id = content_request.get_value();
        content_loading.set(true);
        let api = state.api();
        spawn_local(async move {
            let result = api.get_note_content(&note_id).await;
            if content_request.try_get_value() != Some(request_id) {
                return;
            }
            match result {
                Ok(text) => {
                    content.set(ensure_trailing_newline(text));
                    loaded_note.set(Some(note_id));
                }
                Err(e) => state.report(&e, "getting note content"),
            }
            content_loading.set(false);
        });
    });

    let can_edit = Signal::derive(move || {
        state
            .current_book
            .with(|b| b.as_ref().is_some_and(|b| state.owns(b)))
    });
    let owns_username = move || {
        let (username, _, _) = route.get();
        state
            .me
            .with(|m| m.as_ref().is_some_and(|u| u.username == username))
    };
    let busy = move || state.display_loading.get() || content_loading.get();

    let breadcrumb = move || {
        let (username, book_slug, note_slug) = route.get();
        state.shelf.with(|s| {
            Breadcrumb::resolve(s.as_ref(), &username, book_slug.as_deref(), note_slug.as_deref())
        })
    };

    let on_copy_link = move |_| {
        let Ok(href) = window().location().href() else {
            return;
        };
        spawn_local(async move {
            match copy_to_clipboard(&href).await {
                Ok(()) => state.notify(ToastKind::Success, "copied to clipboard"),
                Err(e) => state.notify(ToastKind::Error, e),
            }
        });
    };

    let on_download = move |_| {
        let names = state
            .current_book
            .with_untracked(|b| b.as_ref().map(|b| b.slug.clone()))
            .zip(state.current_note.with_untracked(|n| n.as_ref().map(|n| n.slug.clone())));
        let Some((book_slug, note_slug)) = names else {
            return;
        };
        let file_name = format!("{book_slug}_{note_slug}.md");
        if let Err(e) = content.with_untracked(|c| download_text(c, "text/markdown", &file_name)) {
            tracing::warn!("download failed: {e}");
            state.notify(ToastKind::Error, e);
        }
    };

    let open_book_settings = move |_| {
        if let Some(book) = state.current_book.get_untracked() {
            state.modal.open(ModalKind::EditBook(book));
        }
    };
    let open_new_note = move |_| {
        if let Some(book) = state.current_book.get_untracked() {
            state.modal.open(ModalKind::NewNote(book));
        }
    };
    let open_note_settings = move |_| {
        let book = state.current_book.get_untracked();
        let note = state.current_note.get_untracked();
        if let Some((book, note)) = book.zip(note) {
            state.modal.open(ModalKind::EditNote { book, note });
        }
    };
    let open_assets = move |_| {
        if let Some(note) = state.current_note.get_untracked() {
            state.modal.open(ModalKind::Assets(note));
        }
    };

    let has_book = move || state.current_book.with(Option::is_some);
    let has_note = move || state.current_note.with(Option::is_some);

    view! {
        <div class="space-y-4">
            <div class="flex flex-col gap-2 sm:flex-row sm:items-center">
                {move || view! { <NoteBreadcrumb crumb=breadcrumb() /> }}
                <div class="flex flex-wrap items-center gap-1">
                    <Show when=owns_username fallback=|| ().into_view()>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=busy
                            on:click=move |_| state.modal.open(ModalKind::NewBook)
                        >
                            "New Book"
                        </Button>
                    </Show>
                    <Show when=move || can_edit.get() && has_book() fallback=|| ().into_view()>
                        <Button variant=ButtonVariant::Outline size=ButtonSize::Sm attr:disabled=busy on:click=open_new_note>
                            "New Note"
                        </Button>
                        <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm attr:disabled=busy on:click=open_book_settings>
                            "Book Settings"
                        </Button>
                    </Show>
                    <Show when=move || can_edit.get() && has_note() fallback=|| ().into_view()>
                        <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm attr:disabled=busy on:click=open_note_settings>
                            "Note Settings"
                        </Button>
                    </Show>
                    <Show when=has_note fallback=|| ().into_view()>
                        <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm attr:disabled=busy on:click=open_assets>
                            "Assets"
                        </Button>
                        <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm attr:disabled=busy on:click=on_download>
                            "Download"
                        </Button>
                    </Show>
                    <Show when=move || window().is_secure_context() fallback=|| ().into_view()>
                        <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=on_copy_link>
                            "Copy Link"
                        </Button>
                    </Show>
                </div>
            </div>

            <Show when=move || !busy() fallback=|| view! { <Loading /> }>
                <Show
                    when=move || loaded_note.with(Option::is_some) && has_note()
                    fallback=|| view! {
                        <div class="mx-auto max-w-md py-10 text-center">
                            <h1 class="text-2xl font-semibold">"No Note Selected"</h1>
                            <p class="py-4 text-sm text-muted-foreground">
                                "Either create a new note or select an existing one."
                            </p>
                        </div>
                    }
                >
                    {move || {
                        loaded_note
                            .get()
                            .map(|_| {
                                view! {
                                    <NoteView
                                        mode=state.note_mode
                                        on_mode=Callback::new(move |m| state.set_note_mode(m))
                                        content=content
                                        can_edit=can_edit
                                        autosave=autosave
                                    />
                                }
                            })
                    }}
                </Show>
            </Show>
        </div>
    }
}
