mod account;
mod assets;
mod book;
mod insert;
mod note;
mod search;

use crate::models::{Book, Note};
use leptos::prelude::*;

use account::{ApiUrlModal, ChangePasswordModal, EditProfileModal};
use assets::AssetsModal;
use book::{EditBookModal, NewBookModal};
use insert::{InsertImageModal, InsertLinkModal, InsertTableModal};
use note::{EditNoteModal, NewNoteModal};
use search::{ContentSearchModal, UserSearchModal};

/// Every overlay the app can show. At most one is open at a time.
#[derive(Clone)]
pub(crate) enum ModalKind {
    NewBook,
    EditBook(Book),
    NewNote(Book),
    EditNote { book: Book, note: Note },
    Assets(Note),
    ContentSearch,
    UserSearch,
    EditProfile,
    ChangePassword,
    ApiUrl,
    /// Editor inserts; the callback receives the markdown to put at the selection.
    InsertLink(Callback<String>),
    InsertImage(Callback<String>),
    InsertTable(Callback<String>),
}

#[derive(Clone, Copy)]
pub(crate) struct ModalState {
    active: RwSignal<Option<ModalKind>>,
}

impl ModalState {
    pub fn new() -> Self {
        Self {
            active: RwSignal::new(None),
        }
    }

    pub fn open(&self, kind: ModalKind) {
        self.active.set(Some(kind));
    }

    pub fn close(&self) {
        self.active.set(None);
    }

    fn close_callback(&self) -> Callback<()> {
        let modal = *self;
        Callback::new(move |_| modal.close())
    }
}

impl Default for ModalState {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders whichever modal is active.
#[component]
pub fn ModalHost() -> impl IntoView {
    let state = expect_context::<crate::state::AppContext>().0;
    let modal = state.modal;
    let on_close = modal.close_callback();

    move || {
        modal.active.get().map(|kind| match kind {
            ModalKind::NewBook => view! { <NewBookModal on_close=on_close /> }.into_any(),
            ModalKind::EditBook(book) => view! { <EditBookModal book=book on_close=on_close /> }.into_any(),
            ModalKind::NewNote(book) => view! { <NewNoteModal book=book on_close=on_close /> }.into_any(),
            ModalKind::EditNote { book, note } => {
                view! { <EditNoteModal book=book note=note on_close=on_close /> }.into_any()
            }
            ModalKind::Assets(note) => view! { <AssetsModal note=note on_close=on_close /> }.into_any(),
            ModalKind::ContentSearch => view! { <ContentSearchModal on_close=on_close /> }.into_any(),
            ModalKind::UserSearch => view! { <UserSearchModal on_close=on_close /> }.into_any(),
            ModalKind::EditProfile => view! { <EditProfileModal on_close=on_close /> }.into_any(),
            ModalKind::ChangePassword => view! { <ChangePasswordModal on_close=on_close /> }.into_any(),
            ModalKind::ApiUrl => view! { <ApiUrlModal on_close=on_close /> }.into_any(),
            ModalKind::InsertLink(on_insert) => {
                view! { <InsertLinkModal on_insert=on_insert on_close=on_close /> }.into_any()
            }
            ModalKind::InsertImage(on_insert) => {
                view! { <InsertImageModal on_insert=on_insert on_close=on_close /> }.into_any()
            }
            ModalKind::InsertTable(on_insert) => {
                view! { <InsertTableModal on_insert=on_insert on_close=on_close /> }.into_any()
            }
        })
    }
}
