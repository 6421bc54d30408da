use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::entities::product::{Credentials, FieldErrors, LoginField};
use crate::usecase::ports::catalog_api::{ApiError, CatalogApi};
use crate::usecase::ports::session_store::{SessionCookie, SessionError, SessionStore};

pub const TOKEN_COOKIE: &str = "token";
pub const COOKIE_PATH: &str = "/";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(FieldErrors<LoginField>),
    #[error("Login failed: {0}")]
    Network(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

pub struct AuthService {
    api: Arc<dyn CatalogApi>,
    session: Arc<dyn SessionStore>,
    max_age: Duration,
}

impl AuthService {
    pub fn new(api: Arc<dyn CatalogApi>, session: Arc<dyn SessionStore>, max_age: Duration) -> Self {
        Self {
            api,
            session,
            max_age,
        }
    }

    /// Exchanges credentials for a token and stores it as the session cookie.
    pub fn login(&self, credentials: &Credentials) -> Result<(), AuthError> {
        credentials.validate().map_err(AuthError::Validation)?;
        let token = self.api.login(credentials).inspect_err(|err| {
            tracing::warn!("login for {} failed: {err}", credentials.username);
        })?;
        self.session.put(SessionCookie {
            name: TOKEN_COOKIE.to_string(),
            value: token,
            path: COOKIE_PATH.to_string(),
            expires_at: Utc::now() + self.max_age,
        })?;
        tracing::info!("logged in as {}", credentials.username);
        Ok(())
    }

    pub fn current_token(&self) -> Result<Option<String>, SessionError> {
        Ok(self
            .session
            .get(TOKEN_COOKIE, Utc::now())?
            .map(|cookie| cookie.value))
    }

    pub fn is_authenticated(&self) -> bool {
        match self.current_token() {
            Ok(token) => token.is_some(),
            Err(err) => {
                tracing::warn!("failed to read session: {err}");
                false
            }
        }
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.session.remove(TOKEN_COOKIE)?;
        tracing::info!("logged out");
        Ok(())
    }
}
