//! Session Management
//!
//! The session token is the only piece of client state that outlives a
//! request. It is persisted in a [`TokenStore`] under a well-known key and
//! carried into API calls through an explicit [`Session`] value.
//!
//! ## Flow
//!
//! 1. The backend's OAuth flow redirects to `/login-success?token=...`
//! 2. [`complete_login`] extracts the token and persists it
//! 3. Callers build a [`Session`] from the store and pass it to the client
//! 4. [`logout`] clears the store

mod store;

pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore, TOKEN_STORAGE_KEY};

use std::fmt;

/// Explicit session context passed to every API access function
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Build a session from the persisted token, if one is present
    pub fn from_store(store: &dyn TokenStore) -> Result<Option<Self>, StoreError> {
        Ok(store.load()?.map(Self::new))
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &redact(&self.token))
            .finish()
    }
}

fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{}…", prefix)
}

/// Errors from handling the login callback
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Invalid callback URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Callback URL carries no token")]
    MissingToken,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persist the token delivered to the `/login-success` callback
///
/// Accepts either an absolute URL or a bare path with query string.
pub fn complete_login(store: &dyn TokenStore, callback: &str) -> Result<Session, LoginError> {
    let url = match url::Url::parse(callback) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            url::Url::parse("http://localhost")?.join(callback)?
        }
        Err(e) => return Err(e.into()),
    };

    let token = url
        .query_pairs()
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.into_owned())
        .filter(|t| !t.is_empty())
        .ok_or(LoginError::MissingToken)?;

    store.save(&token)?;
    tracing::info!("Session token stored");

    Ok(Session::new(token))
}

/// Forget the persisted token
pub fn logout(store: &dyn TokenStore) -> Result<(), StoreError> {
    store.clear()?;
    tracing::info!("Session token cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new("secret-token-value");
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-token-value"));
        assert!(debug.contains("secr"));
    }

    #[test]
    fn test_from_store() {
        let store = MemoryTokenStore::new();
        assert!(Session::from_store(&store).unwrap().is_none());

        store.save("abc").unwrap();
        let session = Session::from_store(&store).unwrap().unwrap();
        assert_eq!(session.token(), "abc");
    }

    #[test]
    fn test_complete_login_from_path() {
        let store = MemoryTokenStore::new();
        let session = complete_login(&store, "/login-success?token=tok%2B1&state=x").unwrap();

        assert_eq!(session.token(), "tok+1");
        assert_eq!(store.load().unwrap().as_deref(), Some("tok+1"));
    }

    #[test]
    fn test_complete_login_from_absolute_url() {
        let store = MemoryTokenStore::new();
        complete_login(&store, "http://localhost:3008/login-success?token=abc").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_complete_login_without_token() {
        let store = MemoryTokenStore::new();

        let err = complete_login(&store, "/login-success").unwrap_err();
        assert!(matches!(err, LoginError::MissingToken));

        let err = complete_login(&store, "/login-success?token=").unwrap_err();
        assert!(matches!(err, LoginError::MissingToken));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_logout() {
        let store = MemoryTokenStore::with_token("abc");
        logout(&store).unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
