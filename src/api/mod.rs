mod error;

pub(crate) use error::{ApiError, ApiErrorKind, ApiResult};

use crate::models::{
    AccessToken, Book, CreateBook, CreateNote, CreateUser, Note, NoteAsset, RecentNote,
    ServerInfo, UpdateBook, UpdateNote, UpdateUser, UpdateUserPassword, User,
};
use crate::storage::{clear_setting, load_json_setting, save_json_setting, API_DETAILS_KEY};
use crate::util::{parse_http_date, to_http_date};
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use urlencoding::encode;

/// Where the backend API lives.
///
/// Resolution order: stored `api_details` setting, then `window.ENV.API_URL`
/// (or legacy `window.ENV.api_url`), then `{origin}/api`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnvConfig {
    pub api_server: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        if let Some(stored) = load_json_setting::<EnvConfig>(API_DETAILS_KEY) {
            if !stored.api_server.trim().is_empty() {
                return stored;
            }
        }

        if let Some(api_server) = Self::from_window_env() {
            return Self { api_server };
        }

        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_else(|| "http://localhost:8080".to_string());
        Self {
            api_server: format!("{}/api", origin.trim_end_matches('/')),
        }
    }

    fn from_window_env() -> Option<String> {
        let env = web_sys::window()?.get("ENV")?;
        if env.is_undefined() || !env.is_object() {
            return None;
        }
        ["API_URL", "api_url"].into_iter().find_map(|k| {
            js_sys::Reflect::get(&env, &k.into())
                .ok()
                .and_then(|v| v.as_string())
                .filter(|s| !s.trim().is_empty())
        })
    }

    pub fn save(&self) {
        if let Err(e) = save_json_setting(API_DETAILS_KEY, self, true) {
            tracing::warn!("could not persist API server: {e}");
        }
    }

    pub fn reset() -> Self {
        clear_setting(API_DETAILS_KEY);
        Self::new()
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Clone, Debug)]
struct PasswordGrant<'a> {
    grant_type: &'static str,
    username: &'a str,
    password: &'a str,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            token,
            ..self.clone()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL an `<img>`/link can use directly for an asset.
    pub fn asset_url(&self, note_id: &str, asset_id: &str) -> String {
        self.url(&format!(
            "/notes/{}/assets/{}",
            encode(note_id),
            encode(asset_id)
        ))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(req: RequestBuilder) -> ApiResult<Response> {
        let res = req.send().await.map_err(ApiError::network)?;
        if res.status().is_success() {
            return Ok(res);
        }
        let status = res.status().as_u16();
        let body = res.text().await.unwrap_or_default();
        let err = ApiError::from_response(status, &body);
        tracing::debug!(status, "api request failed: {err}");
        Err(err)
    }

    async fn send_json<T: serde::de::DeserializeOwned>(req: RequestBuilder) -> ApiResult<T> {
        Self::send(req).await?.json().await.map_err(ApiError::parse)
    }

    async fn send_empty(req: RequestBuilder) -> ApiResult<()> {
        Self::send(req).await.map(|_| ())
    }

    // ---- misc / auth ----

    pub async fn get_server_info(&self) -> ApiResult<ServerInfo> {
        Self::send_json(self.request(Method::GET, "/info")).await
    }

    pub async fn post_token(&self, username: &str, password: &str) -> ApiResult<AccessToken> {
        let form = PasswordGrant {
            grant_type: "password",
            username,
            password,
        };
        Self::send_json(self.request(Method::POST, "/auth/token").form(&form)).await
    }

    // ---- users ----

    pub async fn create_user(&self, body: &CreateUser) -> ApiResult<User> {
        Self::send_json(self.request(Method::POST, "/users").json(body)).await
    }

    pub async fn get_users_me(&self) -> ApiResult<User> {
        Self::send_json(self.request(Method::GET, "/users/me")).await
    }

    pub async fn update_users_me(&self, body: &UpdateUser) -> ApiResult<()> {
        Self::send_empty(self.request(Method::PATCH, "/users/me").json(body)).await
    }

    pub async fn update_users_me_password(&self, body: &UpdateUserPassword) -> ApiResult<()> {
        Self::send_empty(self.request(Method::PUT, "/users/me/password").json(body)).await
    }

    pub async fn search_users(&self, username: &str) -> ApiResult<Vec<String>> {
        Self::send_json(
            self.request(Method::GET, "/users/search")
                .query(&[("username", username)]),
        )
        .await
    }

    // ---- slug lookups ----

    /// The user with all their visible books, each carrying its notes.
    pub async fn get_user_by_username(&self, username: &str) -> ApiResult<User> {
        Self::send_json(
            self.request(Method::GET, &format!("/slug/@{}", encode(username)))
                .query(&[("include", "books")]),
        )
        .await
    }

    pub async fn get_book_by_slug(&self, username: &str, book_slug: &str) -> ApiResult<Book> {
        Self::send_json(self.request(
            Method::GET,
            &format!("/slug/@{}/books/{}", encode(username), encode(book_slug)),
        ))
        .await
    }

    pub async fn get_note_by_slug(
        &self,
        username: &str,
        book_slug: &str,
        note_slug: &str,
    ) -> ApiResult<Note> {
        Self::send_json(self.request(
            Method::GET,
            &format!(
                "/slug/@{}/books/{}/notes/{}",
                encode(username),
                encode(book_slug),
                encode(note_slug)
            ),
        ))
        .await
    }

    // ---- books ----

    pub async fn create_book(&self, body: &CreateBook) -> ApiResult<Book> {
        Self::send_json(self.request(Method::POST, "/books").json(body)).await
    }

    pub async fn update_book(&self, book_id: &str, body: &UpdateBook) -> ApiResult<()> {
        Self::send_empty(
            self.request(Method::PATCH, &format!("/books/{}", encode(book_id)))
                .json(body),
        )
        .await
    }

    pub async fn delete_book(&self, book_id: &str) -> ApiResult<()> {
        Self::send_empty(self.request(Method::DELETE, &format!("/books/{}", encode(book_id))))
            .await
    }

    /// Notes of a book; `deleted` lists the soft-deleted ones instead.
    pub async fn get_notes_by_book_id(&self, book_id: &str, deleted: bool) -> ApiResult<Vec<Note>> {
        let mut req = self.request(Method::GET, &format!("/books/{}/notes", encode(book_id)));
        if deleted {
            req = req.query(&[("deleted", "true")]);
        }
        Self::send_json(req).await
    }

    pub async fn create_note(&self, book_id: &str, body: &CreateNote) -> ApiResult<Note> {
        Self::send_json(
            self.request(Method::POST, &format!("/books/{}/notes", encode(book_id)))
                .json(body),
        )
        .await
    }

    // ---- notes ----

    pub async fn get_notes_recent(&self) -> ApiResult<Vec<RecentNote>> {
        Self::send_json(self.request(Method::GET, "/notes/recent")).await
    }

    pub async fn update_note(&self, note_id: &str, body: &UpdateNote) -> ApiResult<()> {
        Self::send_empty(
            self.request(Method::PATCH, &format!("/notes/{}", encode(note_id)))
                .json(body),
        )
        .await
    }

    /// Soft-delete a note, or remove it for good when `permanent`.
    pub async fn delete_note(&self, note_id: &str, permanent: bool) -> ApiResult<()> {
        let mut req = self.request(Method::DELETE, &format!("/notes/{}", encode(note_id)));
        if permanent {
            req = req.query(&[("permanent", "true")]);
        }
        Self::send_empty(req).await
    }

    pub async fn restore_note(&self, note_id: &str) -> ApiResult<()> {
        Self::send_empty(self.request(
            Method::PUT,
            &format!("/notes/{}/restore", encode(note_id)),
        ))
        .await
    }

    pub async fn get_note_content(&self, note_id: &str) -> ApiResult<String> {
        Self::send(self.request(Method::GET, &format!("/notes/{}/content", encode(note_id))))
            .await?
            .text()
            .await
            .map_err(ApiError::parse)
    }

    /// Replace note content.
    ///
    /// `last_modified` is sent as `If-Unmodified-Since`; a newer server copy yields a
    /// `Conflict` error. Returns the server's new modification time.
    pub async fn update_note_content(
        &self,
        note_id: &str,
        content: &str,
        last_modified: Option<DateTime<Utc>>,
    ) -> ApiResult<DateTime<Utc>> {
        let mut req = self
            .request(Method::PUT, &format!("/notes/{}/content", encode(note_id)))
            .header("Content-Type", "text/plain")
            .body(content.to_string());
        if let Some(t) = last_modified {
            req = req.header("If-Unmodified-Since", to_http_date(&t));
        }

        let res = Self::send(req).await?;
        let modified = res
            .headers()
            .get("Last-Modified")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date)
            .unwrap_or_else(Utc::now);
        Ok(modified)
    }

    // ---- assets ----

    pub async fn get_note_assets(&self, note_id: &str) -> ApiResult<Vec<NoteAsset>> {
        Self::send_json(self.request(Method::GET, &format!("/notes/{}/assets", encode(note_id))))
            .await
    }

    pub async fn create_note_asset(
        &self,
        note_id: &str,
        name: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<NoteAsset> {
        Self::send_json(
            self.request(Method::POST, &format!("/notes/{}/assets", encode(note_id)))
                .header("X-Name", name)
                .body(bytes),
        )
        .await
    }

    pub async fn delete_note_asset(&self, note_id: &str, asset_id: &str) -> ApiResult<()> {
        Self::send_empty(self.request(
            Method::DELETE,
            &format!("/notes/{}/assets/{}", encode(note_id), encode(asset_id)),
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised() {
        let client = ApiClient::new("https://notes.example.com/api/".to_string(), None);
        assert_eq!(client.url("/info"), "https://notes.example.com/api/info");
        assert!(!client.is_authenticated());
    }

    #[test]
    fn asset_url_encodes_segments() {
        let client = ApiClient::new("http://h/api".to_string(), None);
        assert_eq!(client.asset_url("n 1", "a/b"), "http://h/api/notes/n%201/assets/a%2Fb");
    }

    #[test]
    fn with_token_keeps_base_url() {
        let client = ApiClient::new("http://h/api".to_string(), None);
        let authed = client.with_token(Some("t".to_string()));
        assert!(authed.is_authenticated());
        assert_eq!(authed.base_url, "http://h/api");
    }
}
