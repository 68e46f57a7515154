mod auth;
mod home;
mod layout;
mod note;
mod profile;
mod scratch;
mod shelf;
mod user;

pub use auth::{LoginPage, LogoutPage, SignupPage};
pub use home::HomePage;
pub use layout::{AppLayout, RootAuthed};
pub use profile::ProfilePage;
pub use scratch::ScratchPadPage;
pub use shelf::ShelfPage;
pub use user::UserPage;

use leptos::Params;
use leptos_router::params::Params;

/// Outline button look for plain links.
const LINK_BUTTON: &str = "inline-flex h-8 items-center justify-center rounded-md border bg-background px-3 text-sm font-medium shadow-xs hover:bg-accent hover:text-accent-foreground";

/// Route parameters for `/:username[/:book_slug[/:note_slug]]`.
#[derive(Params, PartialEq, Clone, Debug)]
pub struct ShelfParams {
    pub username: Option<String>,
    pub book_slug: Option<String>,
    pub note_slug: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use leptos_router::params::ParamsMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn shelf_params_leave_missing_segments_empty() {
        let map: ParamsMap = [("username", "leo"), ("book_slug", "recipes")]
            .into_iter()
            .collect();
        let parsed = ShelfParams::from_map(&map).unwrap();
        assert_eq!(
            parsed,
            ShelfParams {
                username: Some("leo".into()),
                book_slug: Some("recipes".into()),
                note_slug: None,
            }
        );
    }
}
