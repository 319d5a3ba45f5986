//! Persisted sign-in session
//!
//! The token and the signed-in user are one JSON document. They are written,
//! restored and cleared together so the client never holds a token without
//! its user or the other way round.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::models::User;

use super::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub auth_token: String,
    pub user: User,
}

pub struct SessionStore {
    path: Option<PathBuf>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Session kept in memory only
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: RwLock::new(None),
        }
    }

    /// Session backed by a file, restored if the file holds one
    pub async fn open(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        let restored = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Session>(&bytes) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Discarding unreadable session file {}: {}", path.display(), e);
                    remove_file(&path).await?;
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(ClientError::Session(e.to_string())),
        };

        if let Some(session) = &restored {
            tracing::debug!("Restored session of {}", session.user.email);
        }

        Ok(Self {
            path: Some(path),
            current: RwLock::new(restored),
        })
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.auth_token.clone())
    }

    pub async fn user(&self) -> Option<User> {
        self.current.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn save(&self, session: Session) -> ClientResult<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ClientError::Session(e.to_string()))?;
            }
            let json = serde_json::to_vec_pretty(&session).map_err(|e| ClientError::Session(e.to_string()))?;
            tokio::fs::write(path, json)
                .await
                .map_err(|e| ClientError::Session(e.to_string()))?;
        }
        *self.current.write().await = Some(session);
        Ok(())
    }

    /// Replace the stored user, keeping the token
    pub async fn update_user(&self, user: User) -> ClientResult<()> {
        match self.current().await {
            Some(session) => self.save(Session { user, ..session }).await,
            None => Ok(()),
        }
    }

    pub async fn clear(&self) -> ClientResult<()> {
        *self.current.write().await = None;
        if let Some(path) = &self.path {
            remove_file(path).await?;
        }
        Ok(())
    }
}

async fn remove_file(path: &Path) -> ClientResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ClientError::Session(e.to_string())),
    }
}
