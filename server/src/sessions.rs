use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process map from opaque session token to username.
///
/// Sessions live until they are destroyed or the process exits.
#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, String>>,
}

impl SessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token bound to `username`.
    pub async fn create(&self, username: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions
            .write()
            .await
            .insert(token.clone(), username.to_owned());
        token
    }

    pub async fn resolve(&self, token: &str) -> Option<String> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Forgets the token. Unknown tokens are ignored.
    pub async fn destroy(&self, token: &str) -> Option<String> {
        self.sessions.write().await.remove(token)
    }

    #[cfg(test)]
    async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
