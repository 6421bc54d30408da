use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::infra::sqlite::schema::{init_db, open_connection};
use crate::usecase::ports::session_store::{SessionCookie, SessionError, SessionStore};

/// Cookie jar persisted in `session.sqlite`.
pub struct SqliteSessionStore {
    pub db_path: PathBuf,
}

impl SqliteSessionStore {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        init_db(&db_path)?;
        Ok(Self { db_path })
    }
}

pub fn upsert_cookie(db_path: &Path, cookie: &SessionCookie) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute(
        "INSERT INTO cookie(name, value, path, expires_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(name) DO UPDATE SET
            value = excluded.value,
            path = excluded.path,
            expires_at = excluded.expires_at",
        params![
            cookie.name,
            cookie.value,
            cookie.path,
            cookie.expires_at.to_rfc3339()
        ],
    )
    .with_context(|| format!("failed to store cookie {}", cookie.name))?;
    Ok(())
}

pub fn load_cookie(db_path: &Path, name: &str) -> Result<Option<SessionCookie>> {
    let conn = open_connection(db_path)?;
    let row = conn
        .query_row(
            "SELECT name, value, path, expires_at FROM cookie WHERE name = ?1",
            [name],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()
        .with_context(|| format!("failed to query cookie {name}"))?;

    let Some((name, value, path, expires_at)) = row else {
        return Ok(None);
    };
    let expires_at = DateTime::parse_from_rfc3339(&expires_at)
        .with_context(|| format!("invalid expiry for cookie {name}: {expires_at}"))?
        .with_timezone(&Utc);

    Ok(Some(SessionCookie {
        name,
        value,
        path,
        expires_at,
    }))
}

pub fn delete_cookie(db_path: &Path, name: &str) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute("DELETE FROM cookie WHERE name = ?1", [name])
        .with_context(|| format!("failed to delete cookie {name}"))?;
    Ok(())
}

impl SessionStore for SqliteSessionStore {
    fn put(&self, cookie: SessionCookie) -> Result<(), SessionError> {
        upsert_cookie(&self.db_path, &cookie).map_err(SessionError::from)
    }

    fn get(&self, name: &str, now: DateTime<Utc>) -> Result<Option<SessionCookie>, SessionError> {
        match load_cookie(&self.db_path, name)? {
            Some(cookie) if cookie.is_expired(now) => {
                tracing::info!("cookie {name} expired at {}", cookie.expires_at);
                delete_cookie(&self.db_path, name)?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    fn remove(&self, name: &str) -> Result<(), SessionError> {
        delete_cookie(&self.db_path, name).map_err(SessionError::from)
    }
}
