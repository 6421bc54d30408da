use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage failed: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for SessionError {
    fn from(err: anyhow::Error) -> Self {
        SessionError::Storage(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionCookie {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// `name=value` pair for a `Cookie` request header.
    pub fn header_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Client-side cookie jar holding the session token.
pub trait SessionStore: Send + Sync {
    fn put(&self, cookie: SessionCookie) -> Result<(), SessionError>;
    /// Returns the cookie if it has not expired at `now`; expired cookies are
    /// removed.
    fn get(&self, name: &str, now: DateTime<Utc>) -> Result<Option<SessionCookie>, SessionError>;
    fn remove(&self, name: &str) -> Result<(), SessionError>;
}
