use std::collections::HashMap;

use common::{
    http::{Identity, LoginRequest, SessionToken},
    LobbyError,
};
use futures::lock::Mutex;
use log::info;
use thiserror::Error;
use uuid::Uuid;

const MAX_DISPLAY_NAME_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("display name is required")]
    MissingDisplayName,

    #[error("display name is longer than {} characters", MAX_DISPLAY_NAME_LEN)]
    DisplayNameTooLong,

    #[error("'{0}' is not an email address")]
    InvalidEmail(String),
}

impl From<AuthError> for LobbyError {
    fn from(value: AuthError) -> Self {
        LobbyError::SignIn(value.to_string())
    }
}

/// Turns a sign-in attempt into an identity.
pub trait IdentityProvider: Send + Sync {
    fn sign_in(&self, request: LoginRequest) -> Result<Identity, AuthError>;
}

/// Accepts anyone who names themselves.
#[derive(Debug, Default)]
pub struct GuestIdentityProvider;

impl IdentityProvider for GuestIdentityProvider {
    fn sign_in(&self, request: LoginRequest) -> Result<Identity, AuthError> {
        let display_name = request.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(AuthError::MissingDisplayName);
        }
        if display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(AuthError::DisplayNameTooLong);
        }

        let email = request
            .email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(AuthError::InvalidEmail(email.clone()));
            }
        }

        Ok(Identity {
            id: Uuid::new_v4(),
            display_name,
            email,
            avatar_url: request
                .avatar_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
        })
    }
}

/// Live sessions, one per signed-in browser tab.
pub struct SessionStore {
    provider: Box<dyn IdentityProvider>,
    sessions: Mutex<HashMap<SessionToken, Identity>>,
}

impl SessionStore {
    pub fn new(provider: impl IdentityProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub async fn sign_in(&self, request: LoginRequest) -> Result<(SessionToken, Identity), AuthError> {
        let identity = self.provider.sign_in(request)?;
        let token = Uuid::new_v4();
        self.sessions.lock().await.insert(token, identity.clone());
        info!("{} signed in as {}", identity.name(), identity.id);
        Ok((token, identity))
    }

    pub async fn resolve(&self, token: SessionToken) -> Option<Identity> {
        self.sessions.lock().await.get(&token).cloned()
    }

    pub async fn sign_out(&self, token: SessionToken) -> bool {
        match self.sessions.lock().await.remove(&token) {
            Some(identity) => {
                info!("{} signed out", identity.name());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(display_name: &str, email: Option<&str>) -> LoginRequest {
        LoginRequest {
            display_name: display_name.to_string(),
            email: email.map(str::to_string),
            avatar_url: None,
        }
    }

    #[test]
    fn guest_provider_validates() {
        let provider = GuestIdentityProvider;
        assert_eq!(
            provider.sign_in(request("  ", None)),
            Err(AuthError::MissingDisplayName)
        );
        assert_eq!(
            provider.sign_in(request(&"x".repeat(33), None)),
            Err(AuthError::DisplayNameTooLong)
        );
        assert_eq!(
            provider.sign_in(request("alice", Some("alice"))),
            Err(AuthError::InvalidEmail("alice".to_string()))
        );

        let identity = provider.sign_in(request(" alice ", Some(" "))).unwrap();
        assert_eq!(identity.display_name, "alice");
        assert_eq!(identity.email, None);
    }

    #[tokio::test]
    async fn failed_sign_in_creates_no_session() {
        let store = SessionStore::new(GuestIdentityProvider);
        assert!(store.sign_in(request("", None)).await.is_err());
        assert!(store.sessions.lock().await.is_empty());
    }

    #[tokio::test]
    async fn sessions_resolve_until_signed_out() {
        let store = SessionStore::new(GuestIdentityProvider);
        let (token, identity) = store.sign_in(request("alice", Some("a@x.org"))).await.unwrap();

        assert_eq!(store.resolve(token).await, Some(identity));
        assert_eq!(store.resolve(Uuid::new_v4()).await, None);

        assert!(store.sign_out(token).await);
        assert!(!store.sign_out(token).await);
        assert_eq!(store.resolve(token).await, None);
    }

    #[tokio::test]
    async fn each_sign_in_gets_its_own_session() {
        let store = SessionStore::new(GuestIdentityProvider);
        let (a, _) = store.sign_in(request("alice", None)).await.unwrap();
        let (b, _) = store.sign_in(request("alice", None)).await.unwrap();
        assert_ne!(a, b);
    }
}
