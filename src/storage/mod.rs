use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const AUTH_STORE_KEY: &str = "auth_store";
pub(crate) const API_DETAILS_KEY: &str = "api_details";
pub(crate) const NOTE_MODE_KEY: &str = "note_mode";
pub(crate) const SCRATCH_PAD_KEY: &str = "scratch_pad";
pub(crate) const SORT_CHOICE_KEY: &str = "sort_choice";

/// Every setting this client writes; logout wipes all of them.
const ALL_SETTINGS: [&str; 5] = [
    AUTH_STORE_KEY,
    API_DETAILS_KEY,
    NOTE_MODE_KEY,
    SCRATCH_PAD_KEY,
    SORT_CHOICE_KEY,
];

const KEY_PREFIX: &str = "note_mark__";

#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("browser storage is unavailable")]
    Unavailable,
    #[error("browser storage rejected the write for {0}")]
    Rejected(String),
    #[error("could not serialize setting {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn setting_key(name: &str) -> String {
    format!("{KEY_PREFIX}{name}")
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

fn session_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.session_storage().ok().flatten())
}

/// Read a setting, preferring the tab-scoped (session) copy over the persistent one.
pub(crate) fn read_setting(name: &str) -> Option<String> {
    let key = setting_key(name);
    session_storage()
        .and_then(|s| s.get_item(&key).ok().flatten())
        .or_else(|| local_storage().and_then(|s| s.get_item(&key).ok().flatten()))
}

pub(crate) fn clear_setting(name: &str) {
    let key = setting_key(name);
    if let Some(s) = session_storage() {
        let _ = s.remove_item(&key);
    }
    if let Some(s) = local_storage() {
        let _ = s.remove_item(&key);
    }
}

/// Write a setting to local storage (`persistent`) or session storage.
///
/// Any copy in the other storage area is removed first so reads stay unambiguous.
pub(crate) fn write_setting(name: &str, value: &str, persistent: bool) -> Result<(), StorageError> {
    clear_setting(name);

    let storage = if persistent {
        local_storage()
    } else {
        session_storage()
    }
    .ok_or(StorageError::Unavailable)?;

    storage
        .set_item(&setting_key(name), value)
        .map_err(|_| StorageError::Rejected(name.to_string()))
}

pub(crate) fn clear_settings() {
    for name in ALL_SETTINGS {
        clear_setting(name);
    }
}

pub(crate) fn load_json_setting<T: for<'de> Deserialize<'de>>(name: &str) -> Option<T> {
    let json = read_setting(name)?;
    match serde_json::from_str(&json) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("ignoring unreadable setting {name}: {e}");
            None
        }
    }
}

pub(crate) fn save_json_setting<T: Serialize>(
    name: &str,
    value: &T,
    persistent: bool,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: name.to_string(),
        source,
    })?;
    write_setting(name, &json, persistent)
}

/// Fire-and-forget variant for UI callbacks: failures are only logged.
pub(crate) fn save_json_setting_logged<T: Serialize>(name: &str, value: &T, persistent: bool) {
    if let Err(e) = save_json_setting(name, value, persistent) {
        tracing::warn!("{e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_are_namespaced() {
        assert_eq!(setting_key(AUTH_STORE_KEY), "note_mark__auth_store");
        assert!(ALL_SETTINGS.iter().all(|k| !k.contains(KEY_PREFIX)));
    }
}

// Browser-only (run with `wasm-pack test --headless --firefox`).
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::session::{load_auth_store, write_auth_store, AuthStore};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn session_copy_shadows_persistent_copy() {
        clear_settings();
        write_setting(NOTE_MODE_KEY, "\"plain\"", true).expect("local write");
        assert_eq!(read_setting(NOTE_MODE_KEY).as_deref(), Some("\"plain\""));

        write_setting(NOTE_MODE_KEY, "\"edit\"", false).expect("session write");
        assert_eq!(read_setting(NOTE_MODE_KEY).as_deref(), Some("\"edit\""));

        clear_setting(NOTE_MODE_KEY);
        assert_eq!(read_setting(NOTE_MODE_KEY), None);
    }

    #[wasm_bindgen_test]
    fn auth_store_roundtrip_and_expiry() {
        clear_settings();
        let store = AuthStore {
            access_token: "t1".to_string(),
            expires_at: 10_000,
        };
        write_auth_store(Some(&store));
        assert_eq!(load_auth_store(5_000), Some(store));

        // Expired stores are dropped and wiped.
        assert_eq!(load_auth_store(20_000), None);
        assert_eq!(read_setting(AUTH_STORE_KEY), None);
    }

    #[wasm_bindgen_test]
    fn logout_wipes_every_setting() {
        write_setting(SCRATCH_PAD_KEY, "draft", false).expect("session write");
        write_setting(SORT_CHOICE_KEY, "\"name_asc\"", true).expect("local write");
        clear_settings();
        assert!(ALL_SETTINGS.iter().all(|name| read_setting(name).is_none()));
    }
}
