use crate::api::{ApiClient, ApiError, EnvConfig};
use crate::cache::{CacheEffect, Displayed, ShelfCache};
use crate::modal::ModalState;
use crate::models::{AccessToken, Book, Note, ServerInfo, User};
use crate::session::{load_auth_store, write_auth_store, AuthStore};
use crate::storage::{
    clear_settings, load_json_setting, save_json_setting_logged, NOTE_MODE_KEY, SORT_CHOICE_KEY,
};
use crate::toast::{ToastKind, Toasts};
use crate::tree::SortChoice;
use crate::util::now_ms;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// How the open note is shown. Persisted under `note_mode`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub(crate) enum NoteMode {
    #[default]
    Rendered,
    Plain,
    Edit,
}

impl NoteMode {
    /// Edit falls back to Rendered for viewers who cannot write.
    pub fn effective(self, can_edit: bool) -> Self {
        if self == Self::Edit && !can_edit {
            Self::Rendered
        } else {
            self
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_config: RwSignal<EnvConfig>,
    pub auth: RwSignal<Option<AuthStore>>,
    pub server_info: RwSignal<Option<ServerInfo>>,

    /// `GET /users/me` for the logged in user.
    pub me: RwSignal<Option<User>>,

    /// Book/note tree for the username in the route.
    pub shelf: RwSignal<Option<ShelfCache>>,
    pub shelf_loading: RwSignal<bool>,
    /// Username the shelf was (or is being) loaded for.
    pub shelf_username: RwSignal<Option<String>>,
    /// Shelf load guard: responses for an older id are dropped.
    pub shelf_request_id: RwSignal<u64>,

    /// Book and note resolved from the current route.
    pub current_book: RwSignal<Option<Book>>,
    pub current_note: RwSignal<Option<Note>>,
    pub display_loading: RwSignal<bool>,
    pub display_request_id: RwSignal<u64>,

    /// Bumped when the displayed book/note must be refetched.
    pub book_refresh: RwSignal<u64>,
    pub note_refresh: RwSignal<u64>,

    pub sort_choice: RwSignal<SortChoice>,
    pub note_mode: RwSignal<NoteMode>,

    pub toasts: Toasts,
    pub modal: ModalState,
}

impl AppState {
    pub fn new() -> Self {
        let auth = load_auth_store(now_ms());
        let sort_choice = load_json_setting::<SortChoice>(SORT_CHOICE_KEY).unwrap_or_default();
        let note_mode = load_json_setting::<NoteMode>(NOTE_MODE_KEY).unwrap_or_default();

        Self {
            api_config: RwSignal::new(EnvConfig::new()),
            auth: RwSignal::new(auth),
            server_info: RwSignal::new(None),
            me: RwSignal::new(None),
            shelf: RwSignal::new(None),
            shelf_loading: RwSignal::new(false),
            shelf_username: RwSignal::new(None),
            shelf_request_id: RwSignal::new(0),
            current_book: RwSignal::new(None),
            current_note: RwSignal::new(None),
            display_loading: RwSignal::new(false),
            display_request_id: RwSignal::new(0),
            book_refresh: RwSignal::new(0),
            note_refresh: RwSignal::new(0),
            sort_choice: RwSignal::new(sort_choice),
            note_mode: RwSignal::new(note_mode),
            toasts: Toasts::new(),
            modal: ModalState::new(),
        }
    }

    /// API client for the current server and (unexpired) token.
    pub fn api(&self) -> ApiClient {
        let base_url = self.api_config.with_untracked(|c| c.api_server.clone());
        let token = self.auth.with_untracked(|a| {
            a.as_ref()
                .and_then(|s| s.valid_token(now_ms()))
                .map(str::to_string)
        });
        ApiClient::new(base_url, token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth
            .with(|a| a.as_ref().is_some_and(|s| !s.is_expired(now_ms())))
    }

    pub fn set_api_config(&self, config: EnvConfig) {
        config.save();
        tracing::info!(api_server = %config.api_server, "api server changed");
        self.api_config.set(config);
        self.server_info.set(None);
    }

    /// Forget the stored server and fall back to the deployment default.
    pub fn reset_api_config(&self) {
        let config = EnvConfig::reset();
        tracing::info!(api_server = %config.api_server, "api server reset");
        self.api_config.set(config);
        self.server_info.set(None);
    }

    pub fn login(&self, token: &AccessToken) {
        let store = AuthStore::from_token(token, now_ms());
        write_auth_store(Some(&store));
        self.auth.set(Some(store));
        tracing::info!("logged in");
        self.refresh_me();
    }

    /// Drop the session and every stored setting.
    pub fn logout(&self) {
        write_auth_store(None);
        clear_settings();
        // The stored server went with the wipe; resolve the default again.
        self.api_config.set(EnvConfig::new());
        self.server_info.set(None);
        self.auth.set(None);
        self.me.set(None);
        self.clear_shelf();
        self.current_book.set(None);
        self.current_note.set(None);
        self.sort_choice.set(SortChoice::default());
        self.note_mode.set(NoteMode::default());
        tracing::info!("logged out");
    }

    /// Toast an API failure; a 401 also ends the session and goes to `/login`.
    pub fn report(&self, e: &ApiError, context: &str) {
        self.toasts.api_error(e, context);
        if e.is_unauthorized() {
            self.logout();
            let _ = window().location().set_href("/login");
        }
    }

    pub fn notify(&self, kind: ToastKind, message: impl Into<String>) {
        self.toasts.push(kind, message);
    }

    pub fn load_server_info(&self) {
        let api = self.api();
        let state = *self;
        spawn_local(async move {
            match api.get_server_info().await {
                Ok(info) => state.server_info.set(Some(info)),
                Err(e) => state.toasts.api_error(&e, "loading server info"),
            }
        });
    }

    pub fn refresh_me(&self) {
        let api = self.api();
        if !api.is_authenticated() {
            self.me.set(None);
            return;
        }
        let state = *self;
        spawn_local(async move {
            match api.get_users_me().await {
                Ok(user) => state.me.set(Some(user)),
                Err(e) => state.report(&e, "loading current user"),
            }
        });
    }

    pub fn set_sort_choice(&self, choice: SortChoice) {
        save_json_setting_logged(SORT_CHOICE_KEY, &choice, true);
        self.sort_choice.set(choice);
    }

    pub fn set_note_mode(&self, mode: NoteMode) {
        save_json_setting_logged(NOTE_MODE_KEY, &mode, true);
        self.note_mode.set(mode);
    }

    /// Whether the logged in user owns `book`.
    pub fn owns(&self, book: &Book) -> bool {
        self.me
            .with(|me| me.as_ref().is_some_and(|u| u.id == book.owner_id))
    }

    /// Load the shelf for `username` unless it is already loaded or loading.
    pub fn ensure_shelf(&self, username: &str) {
        let current = self
            .shelf_username
            .with_untracked(|u| u.as_deref() == Some(username));
        if !current {
            self.load_shelf(username.to_string());
        }
    }

    /// Fetch the book/note tree for `username`, replacing whatever is cached.
    pub fn load_shelf(&self, username: String) {
        let request_id = self.shelf_request_id.get_untracked() + 1;
        self.shelf_request_id.set(request_id);
        self.shelf_username.set(Some(username.clone()));
        self.shelf.set(None);
        self.shelf_loading.set(true);

        let api = self.api();
        let state = *self;
        spawn_local(async move {
            let result = api.get_user_by_username(&username).await;
            if state.shelf_request_id.get_untracked() != request_id {
                tracing::debug!(%username, "discarding stale shelf response");
                return;
            }
            match result {
                Ok(user) => {
                    let cache = ShelfCache::from_user(user);
                    tracing::info!(%username, books = cache.books.len(), "shelf loaded");
                    state.shelf.set(Some(cache));
                }
                Err(e) => {
                    state.shelf_username.set(None);
                    state.report(&e, &format!("loading books for {username}"));
                }
            }
            state.shelf_loading.set(false);
        });
    }

    pub fn clear_shelf(&self) {
        self.shelf_request_id.update(|id| *id += 1);
        self.shelf_username.set(None);
        self.shelf.set(None);
        self.shelf_loading.set(false);
    }

    /// Resolve the route's book and note. Responses for a superseded route are dropped.
    pub fn load_displayed(
        &self,
        username: String,
        book_slug: Option<String>,
        note_slug: Option<String>,
    ) {
        let request_id = self.display_request_id.get_untracked() + 1;
        self.display_request_id.set(request_id);

        let Some(book_slug) = book_slug else {
            self.current_book.set(None);
            self.current_note.set(None);
            self.display_loading.set(false);
            return;
        };

        self.display_loading.set(true);
        let api = self.api();
        let state = *self;
        spawn_local(async move {
            let note = async {
                match &note_slug {
                    Some(slug) => Some(api.get_note_by_slug(&username, &book_slug, slug).await),
                    None => None,
                }
            };
            let (book, note) = futures::join!(api.get_book_by_slug(&username, &book_slug), note);

            if state.display_request_id.get_untracked() != request_id {
                tracing::debug!(%book_slug, "discarding stale book/note response");
                return;
            }
            match book {
                Ok(book) => state.current_book.set(Some(book)),
                Err(e) => {
                    state.current_book.set(None);
                    state.report(&e, "loading book");
                }
            }
            match note {
                Some(Ok(note)) => state.current_note.set(Some(note)),
                Some(Err(e)) => {
                    state.current_note.set(None);
                    state.report(&e, "loading note");
                }
                None => state.current_note.set(None),
            }
            state.display_loading.set(false);
        });
    }

    fn displayed(&self) -> Displayed {
        Displayed {
            book_id: self
                .current_book
                .with_untracked(|b| b.as_ref().map(|b| b.id.clone())),
            note_id: self
                .current_note
                .with_untracked(|n| n.as_ref().map(|n| n.id.clone())),
        }
    }

    fn apply_effect(&self, effect: CacheEffect) {
        if effect.refresh_book {
            self.book_refresh.update(|n| *n += 1);
        }
        if effect.refresh_note {
            self.note_refresh.update(|n| *n += 1);
        }
    }

    fn mutate_shelf(&self, f: impl FnOnce(&mut ShelfCache, &Displayed) -> CacheEffect) {
        let displayed = self.displayed();
        let effect = self
            .shelf
            .try_update(|shelf| shelf.as_mut().map(|c| f(c, &displayed)))
            .flatten()
            .unwrap_or_default();
        self.apply_effect(effect);
    }

    pub fn update_book(&self, book: Book) {
        self.mutate_shelf(|c, d| c.update_book(book, d));
    }

    pub fn update_note(&self, note: Note) {
        self.mutate_shelf(|c, d| c.update_note(note, d));
    }

    pub fn delete_book(&self, id: &str) {
        self.mutate_shelf(|c, _| {
            c.delete_book(id);
            CacheEffect::default()
        });
    }

    pub fn delete_note(&self, id: &str) {
        self.mutate_shelf(|c, d| {
            c.delete_note(id, d);
            CacheEffect::default()
        });
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn edit_mode_needs_write_access() {
        assert_eq!(NoteMode::Edit.effective(false), NoteMode::Rendered);
        assert_eq!(NoteMode::Edit.effective(true), NoteMode::Edit);
        assert_eq!(NoteMode::Plain.effective(false), NoteMode::Plain);
    }

    #[test]
    fn note_mode_setting_strings() {
        assert_eq!(NoteMode::from_str("plain"), Ok(NoteMode::Plain));
        assert_eq!(serde_json::to_string(&NoteMode::Edit).ok().as_deref(), Some("\"edit\""));
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn logout_drops_custom_api_server() {
        clear_settings();
        let fallback = EnvConfig::new();
        let state = AppState::new();
        state.set_api_config(EnvConfig {
            api_server: "https://notes.example.org/api".to_string(),
        });
        assert_eq!(EnvConfig::new().api_server, "https://notes.example.org/api");

        state.logout();
        assert_eq!(state.api_config.get_untracked(), fallback);
        assert_eq!(state.server_info.get_untracked(), None);
    }
}
