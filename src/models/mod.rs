use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) type UserId = String;
pub(crate) type BookId = String;
pub(crate) type NoteId = String;

/// Backend server capabilities (`GET /info`).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ServerInfo {
    pub min_supported_version: String,
    pub allow_internal_signup: bool,
    pub allow_internal_login: bool,
    pub enable_anonymous_user_search: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds, counted from issue time.
    pub expires_in: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,

    /// Only present when requested with `include=books`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<Book>>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Book {
    pub id: BookId,
    pub owner_id: UserId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Only present when requested with `include=notes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<Note>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Note {
    pub id: NoteId,
    pub book_id: BookId,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NoteAsset {
    pub id: String,
    pub note_id: NoteId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Entry of `GET /notes/recent`: a note plus the slugs needed to link to it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecentNote {
    pub value: Note,
    pub slug: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateUser {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateUserPassword {
    pub existing_password: String,
    pub new_password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateBook {
    pub name: String,
    pub slug: String,
    pub is_public: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateBook {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateNote {
    pub name: String,
    pub slug: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<BookId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn user_tree_parses_nested_books_and_notes() {
        let json = r#"{
            "id": "u1",
            "username": "leo",
            "name": null,
            "books": [{
                "id": "b1",
                "ownerId": "u1",
                "name": "Recipes",
                "slug": "recipes",
                "isPublic": true,
                "createdAt": "2024-01-02T10:00:00Z",
                "updatedAt": "2024-01-03T10:00:00Z",
                "notes": [{
                    "id": "n1",
                    "bookId": "b1",
                    "name": "Pasta",
                    "slug": "pasta",
                    "createdAt": "2024-01-02T11:00:00Z",
                    "updatedAt": "2024-01-02T12:00:00Z"
                }]
            }]
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        let books = user.books.as_ref().unwrap();
        assert_eq!(books[0].slug, "recipes");
        assert_eq!(books[0].notes.as_ref().unwrap()[0].book_id, "b1");
        assert_eq!(user.display_name(), "leo");
    }

    #[test]
    fn update_book_omits_unset_fields() {
        let body = serde_json::to_value(UpdateBook {
            name: Some("Cooking".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "name": "Cooking" }));
    }
}
