use crate::models::AccessToken;
use crate::storage::{clear_setting, load_json_setting, save_json_setting, AUTH_STORE_KEY};
use serde::{Deserialize, Serialize};

/// Persisted login: bearer token plus its absolute expiry (ms since epoch).
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthStore {
    pub access_token: String,
    pub expires_at: i64,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AuthStore {
    pub fn from_token(token: &AccessToken, now_ms: i64) -> Self {
        let lifetime_ms = i64::try_from(token.expires_in)
            .unwrap_or(i64::MAX / 1000)
            .saturating_mul(1000);
        Self {
            access_token: token.access_token.clone(),
            expires_at: now_ms.saturating_add(lifetime_ms),
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at < now_ms
    }

    /// The token, unless it has expired.
    pub fn valid_token(&self, now_ms: i64) -> Option<&str> {
        (!self.is_expired(now_ms)).then_some(self.access_token.as_str())
    }
}

/// Load the stored login, discarding (and wiping) an expired one.
pub(crate) fn load_auth_store(now_ms: i64) -> Option<AuthStore> {
    let store = load_json_setting::<AuthStore>(AUTH_STORE_KEY)?;
    if store.is_expired(now_ms) {
        tracing::info!("stored access token expired; clearing session");
        clear_setting(AUTH_STORE_KEY);
        return None;
    }
    Some(store)
}

pub(crate) fn write_auth_store(store: Option<&AuthStore>) {
    match store {
        Some(store) => {
            if let Err(e) = save_json_setting(AUTH_STORE_KEY, store, true) {
                tracing::warn!("could not persist session: {e}");
            }
        }
        None => clear_setting(AUTH_STORE_KEY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_in: u64) -> AccessToken {
        AccessToken {
            access_token: "secret".to_string(),
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }

    #[test]
    fn expiry_is_relative_to_issue_time() {
        let store = AuthStore::from_token(&token(60), 1_000);
        assert_eq!(store.expires_at, 61_000);
        assert_eq!(store.valid_token(61_000), Some("secret"));
        assert!(store.is_expired(61_001));
        assert_eq!(store.valid_token(61_001), None);
    }

    #[test]
    fn debug_output_redacts_token() {
        let debug = format!("{:?}", AuthStore::from_token(&token(60), 0));
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
