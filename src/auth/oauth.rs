use dashmap::DashMap;
use oauth2::{basic::BasicClient, AuthUrl, ClientId, ClientSecret, PkceCodeVerifier, RedirectUrl, TokenUrl};
use serde::Deserialize;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

pub fn create_oauth_client(
    client_id: String,
    client_secret: String,
    redirect_uri: String,
) -> anyhow::Result<BasicClient> {
    let client = BasicClient::new(
        ClientId::new(client_id),
        Some(ClientSecret::new(client_secret)),
        AuthUrl::new(GOOGLE_AUTH_URL.to_string())?,
        Some(TokenUrl::new(GOOGLE_TOKEN_URL.to_string())?),
    )
    .set_redirect_uri(RedirectUrl::new(redirect_uri)?);

    Ok(client)
}

/// The organization tag travels through Google inside the CSRF state as
/// `<TAG>.<random>`; the tag is alphanumeric so the first dot splits it.
pub fn state_with_tag(tag: &str, random: &str) -> String {
    format!("{}.{}", tag, random)
}

pub fn tag_from_state(state: &str) -> Option<&str> {
    state.split_once('.').map(|(tag, _)| tag).filter(|tag| !tag.is_empty())
}

const PENDING_LOGIN_TTL: Duration = Duration::from_secs(600);

/// PKCE verifiers of Google logins that have been redirected but not yet
/// called back, keyed by CSRF state.
#[derive(Clone, Default)]
pub struct PendingLogins {
    inner: Arc<DashMap<String, (Instant, PkceCodeVerifier)>>,
}

impl PendingLogins {
    pub fn insert(&self, state: String, verifier: PkceCodeVerifier) {
        self.inner.retain(|_, (started, _)| started.elapsed() < PENDING_LOGIN_TTL);
        self.inner.insert(state, (Instant::now(), verifier));
    }

    /// Removes and returns the verifier; a state is usable once.
    pub fn take(&self, state: &str) -> Option<PkceCodeVerifier> {
        self.inner
            .remove(state)
            .filter(|(_, (started, _))| started.elapsed() < PENDING_LOGIN_TTL)
            .map(|(_, (_, verifier))| verifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_login_is_taken_once() {
        let pending = PendingLogins::default();
        pending.insert("ACME.r1".into(), PkceCodeVerifier::new("verifier".into()));

        let verifier = pending.take("ACME.r1");
        assert_eq!(verifier.map(|v| v.secret().clone()), Some("verifier".to_string()));
        assert!(pending.take("ACME.r1").is_none());
    }

    #[test]
    fn test_expired_logins_are_dropped_on_insert() {
        let pending = PendingLogins::default();
        pending.inner.insert(
            "ACME.old".into(),
            (Instant::now() - PENDING_LOGIN_TTL, PkceCodeVerifier::new("stale".into())),
        );

        pending.insert("ACME.new".into(), PkceCodeVerifier::new("fresh".into()));

        assert_eq!(pending.inner.len(), 1);
        assert!(pending.take("ACME.old").is_none());
        assert!(pending.take("ACME.new").is_some());
    }

    #[test]
    fn test_unknown_state_has_no_verifier() {
        assert!(PendingLogins::default().take("ACME.other").is_none());
    }

    #[test]
    fn test_tag_survives_state_round() {
        let state = state_with_tag("ACME01", "Zx9_-r");
        assert_eq!(tag_from_state(&state), Some("ACME01"));
    }

    #[test]
    fn test_state_without_tag() {
        assert_eq!(tag_from_state("randomonly"), None);
        assert_eq!(tag_from_state(".abc"), None);
    }
}
