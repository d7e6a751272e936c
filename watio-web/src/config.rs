//! Compile-time deployment settings.
//!
//! `PUBLIC_URL` sets the router base when the app is hosted under a
//! subdirectory. `SUPABASE_URL` and `SUPABASE_ANON_KEY` point at the hosted
//! backend; without them account sync is disabled.

/// Base path for the router (e.g., `/watio` when hosted under a subdirectory).
///
/// Returns `None` when no base path is configured so the router falls back to root.
#[must_use]
pub fn router_base() -> Option<String> {
    router_base_with_base(option_env!("PUBLIC_URL").unwrap_or(""))
}

fn router_base_with_base(base: &str) -> Option<String> {
    let base = base.trim_end_matches('/').trim();
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

/// Hosted backend endpoint and public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl SupabaseConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_parts(option_env!("SUPABASE_URL"), option_env!("SUPABASE_ANON_KEY"))
    }

    fn from_parts(url: Option<&str>, anon_key: Option<&str>) -> Option<Self> {
        let url = url?.trim().trim_end_matches('/');
        let anon_key = anon_key?.trim();
        if url.is_empty() || anon_key.is_empty() {
            return None;
        }
        Some(Self {
            url: url.to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    /// Project reference, the first label of the backend host.
    #[must_use]
    pub fn project_ref(&self) -> Option<&str> {
        let host = self.url.split("://").nth(1).unwrap_or(&self.url);
        host.split(['.', '/', ':'])
            .next()
            .filter(|label| !label.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_base_is_none_by_default() {
        assert_eq!(router_base(), None);
    }

    #[test]
    fn router_base_returns_trimmed_value() {
        assert_eq!(router_base_with_base("/watio/"), Some(String::from("/watio")));
    }

    #[test]
    fn backend_needs_both_values() {
        assert_eq!(SupabaseConfig::from_parts(Some("https://x.supabase.co"), None), None);
        assert_eq!(SupabaseConfig::from_parts(Some(" "), Some("key")), None);
        let cfg = SupabaseConfig::from_parts(Some("https://abcd.supabase.co/"), Some("anon"))
            .unwrap();
        assert_eq!(cfg.url, "https://abcd.supabase.co");
        assert_eq!(cfg.project_ref(), Some("abcd"));
    }
}
