//! Account profile storage on the hosted backend (PostgREST).
//!
//! One `profiles` row per account; only the `perfil_accesibilidad` enum
//! column is read or written.
use crate::config::SupabaseConfig;
use async_trait::async_trait;
use serde::Deserialize;
use watio_access::{AccessibilityProfile, PreferenceStore, RemoteProfileStore, Session};

pub const PROFILE_TABLE: &str = "profiles";
pub const PROFILE_COLUMN: &str = "perfil_accesibilidad";

#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("invalid account id: {0:?}")]
    InvalidAccount(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("backend answered HTTP {0}")]
    Status(u16),
    #[error("no profile row for this account")]
    MissingRow,
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("backend requests need a browser")]
    Unsupported,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRow {
    #[serde(default)]
    pub perfil_accesibilidad: Option<AccessibilityProfile>,
}

fn rows_url(config: &SupabaseConfig, account_id: &str) -> Result<String, SupabaseError> {
    let valid = !account_id.is_empty()
        && account_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(SupabaseError::InvalidAccount(account_id.to_string()));
    }
    Ok(format!(
        "{}/rest/v1/{PROFILE_TABLE}?id=eq.{account_id}",
        config.url
    ))
}

/// # Errors
///
/// Returns an error when the account id cannot be placed in a URL filter.
pub fn select_url(config: &SupabaseConfig, account_id: &str) -> Result<String, SupabaseError> {
    Ok(format!("{}&select={PROFILE_COLUMN}", rows_url(config, account_id)?))
}

/// # Errors
///
/// Returns an error when the account id cannot be placed in a URL filter.
pub fn update_url(config: &SupabaseConfig, account_id: &str) -> Result<String, SupabaseError> {
    rows_url(config, account_id)
}

#[must_use]
pub fn update_body(profile: AccessibilityProfile) -> String {
    serde_json::json!({ PROFILE_COLUMN: profile }).to_string()
}

/// The single row a point select must return.
///
/// # Errors
///
/// Returns [`SupabaseError::MissingRow`] when the account has no row.
pub fn profile_from_rows(
    rows: Vec<ProfileRow>,
) -> Result<Option<AccessibilityProfile>, SupabaseError> {
    rows.into_iter()
        .next()
        .map(|row| row.perfil_accesibilidad)
        .ok_or(SupabaseError::MissingRow)
}

#[derive(Deserialize)]
struct StoredAuth {
    access_token: String,
    user: StoredUser,
}

#[derive(Deserialize)]
struct StoredUser {
    id: String,
}

/// Key under which the auth client keeps its session.
#[must_use]
pub fn auth_storage_key(config: &SupabaseConfig) -> Option<String> {
    config
        .project_ref()
        .map(|project| format!("sb-{project}-auth-token"))
}

#[must_use]
pub fn parse_stored_session(json: &str) -> Option<Session> {
    match serde_json::from_str::<StoredAuth>(json) {
        Ok(auth) => Some(Session::new(auth.user.id, auth.access_token)),
        Err(err) => {
            log::warn!("ignoring stored auth session: {err}");
            None
        }
    }
}

/// Session left behind by the auth client, if the user is signed in.
pub fn stored_session<S: PreferenceStore>(config: &SupabaseConfig, store: &S) -> Option<Session> {
    let key = auth_storage_key(config)?;
    let raw = store.get(&key).ok().flatten()?;
    parse_stored_session(&raw)
}

#[derive(Debug, Clone)]
pub struct SupabaseProfileStore {
    config: SupabaseConfig,
}

impl SupabaseProfileStore {
    #[must_use]
    pub const fn new(config: SupabaseConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        SupabaseConfig::from_env().map(Self::new)
    }

    #[must_use]
    pub const fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    #[cfg(target_arch = "wasm32")]
    async fn send(
        &self,
        method: &str,
        url: &str,
        body: Option<String>,
        session: &Session,
    ) -> Result<web_sys::Response, SupabaseError> {
        use wasm_bindgen::{JsCast, JsValue};
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

        let js = |err: JsValue| SupabaseError::Request(crate::dom::js_error_message(&err));
        let headers = Headers::new().map_err(js)?;
        headers.set("apikey", &self.config.anon_key).map_err(js)?;
        headers
            .set("Authorization", &format!("Bearer {}", session.access_token))
            .map_err(js)?;
        headers.set("Content-Type", "application/json").map_err(js)?;
        if method == "PATCH" {
            headers.set("Prefer", "return=minimal").map_err(js)?;
        }

        let init = RequestInit::new();
        init.set_method(method);
        init.set_mode(RequestMode::Cors);
        init.set_headers(&headers);
        if let Some(body) = body {
            init.set_body(&JsValue::from_str(&body));
        }
        let request = Request::new_with_str_and_init(url, &init).map_err(js)?;
        let win = crate::dom::window().ok_or(SupabaseError::Unsupported)?;
        let response: Response = JsFuture::from(win.fetch_with_request(&request))
            .await
            .map_err(js)?
            .dyn_into()
            .map_err(js)?;
        if !response.ok() {
            return Err(SupabaseError::Status(response.status()));
        }
        Ok(response)
    }

    #[cfg(target_arch = "wasm32")]
    async fn fetch_rows(&self, url: &str, session: &Session) -> Result<Vec<ProfileRow>, SupabaseError> {
        use wasm_bindgen_futures::JsFuture;

        let response = self.send("GET", url, None, session).await?;
        let json = response
            .json()
            .map_err(|err| SupabaseError::Decode(crate::dom::js_error_message(&err)))?;
        let value = JsFuture::from(json)
            .await
            .map_err(|err| SupabaseError::Decode(crate::dom::js_error_message(&err)))?;
        serde_wasm_bindgen::from_value(value).map_err(|err| SupabaseError::Decode(err.to_string()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn fetch_rows(&self, _url: &str, _session: &Session) -> Result<Vec<ProfileRow>, SupabaseError> {
        Err(SupabaseError::Unsupported)
    }

    #[cfg(target_arch = "wasm32")]
    async fn patch(&self, url: &str, body: String, session: &Session) -> Result<(), SupabaseError> {
        self.send("PATCH", url, Some(body), session).await.map(|_| ())
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn patch(&self, _url: &str, _body: String, _session: &Session) -> Result<(), SupabaseError> {
        Err(SupabaseError::Unsupported)
    }
}

#[async_trait(?Send)]
impl RemoteProfileStore for SupabaseProfileStore {
    type Error = SupabaseError;

    async fn select_profile(
        &self,
        session: &Session,
    ) -> Result<Option<AccessibilityProfile>, SupabaseError> {
        let url = select_url(&self.config, &session.account_id)?;
        let rows = self.fetch_rows(&url, session).await?;
        profile_from_rows(rows)
    }

    async fn update_profile(
        &self,
        session: &Session,
        profile: AccessibilityProfile,
    ) -> Result<(), SupabaseError> {
        let url = update_url(&self.config, &session.account_id)?;
        self.patch(&url, update_body(profile), session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use watio_access::MemoryStore;

    fn config() -> SupabaseConfig {
        SupabaseConfig {
            url: "https://abcd.supabase.co".to_string(),
            anon_key: "anon".to_string(),
        }
    }

    #[test]
    fn urls_filter_by_account() {
        assert_eq!(
            select_url(&config(), "0b1c-77").unwrap(),
            "https://abcd.supabase.co/rest/v1/profiles?id=eq.0b1c-77&select=perfil_accesibilidad"
        );
        assert_eq!(
            update_url(&config(), "0b1c-77").unwrap(),
            "https://abcd.supabase.co/rest/v1/profiles?id=eq.0b1c-77"
        );
        assert!(matches!(
            select_url(&config(), "x&id=neq.0"),
            Err(SupabaseError::InvalidAccount(_))
        ));
    }

    #[test]
    fn rows_decode_spanish_values_and_null() {
        let rows: Vec<ProfileRow> =
            serde_json::from_str(r#"[{"perfil_accesibilidad":"motriz"}]"#).unwrap();
        assert_eq!(profile_from_rows(rows).unwrap(), Some(AccessibilityProfile::Motor));
        let rows: Vec<ProfileRow> =
            serde_json::from_str(r#"[{"perfil_accesibilidad":null}]"#).unwrap();
        assert_eq!(profile_from_rows(rows).unwrap(), None);
        assert!(matches!(profile_from_rows(Vec::new()), Err(SupabaseError::MissingRow)));
    }

    #[test]
    fn update_body_uses_wire_value() {
        assert_eq!(
            update_body(AccessibilityProfile::Cognitive),
            r#"{"perfil_accesibilidad":"cognitiva"}"#
        );
    }

    #[test]
    fn stored_session_is_read_from_auth_key() {
        let store = MemoryStore::with_entries([(
            "sb-abcd-auth-token",
            r#"{"access_token":"jwt","user":{"id":"acct-1"}}"#,
        )]);
        assert_eq!(
            stored_session(&config(), &store),
            Some(Session::new("acct-1", "jwt"))
        );
        assert_eq!(parse_stored_session("{}"), None);
    }

    #[test]
    fn native_requests_are_unsupported() {
        let remote = SupabaseProfileStore::new(config());
        let session = Session::new("acct-1", "jwt");
        assert!(matches!(
            block_on(remote.select_profile(&session)),
            Err(SupabaseError::Unsupported)
        ));
    }
}
