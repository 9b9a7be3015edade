use std::path::{Path, PathBuf};

use kernel::Credentials;
use tokio::sync::Mutex;

use crate::domain::CredentialStore;
use crate::error::{Error, Result};
use crate::json_file;

/// Credential store backed by a single JSON file.
///
/// Passwords are stored and compared as plain text.
pub struct JsonCredentials {
    path: PathBuf,
    users: Mutex<Vec<Credentials>>,
}

impl JsonCredentials {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let users = json_file::load(&path).await?;
        Ok(Self {
            path,
            users: Mutex::new(users),
        })
    }
}

impl CredentialStore for JsonCredentials {
    async fn register(&self, credentials: Credentials) -> Result<()> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(Error::InvalidInput(
                "Username and password are required.".to_owned(),
            ));
        }

        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.username == credentials.username) {
            return Err(Error::AlreadyExists);
        }

        users.push(credentials);
        if let Err(e) = json_file::persist(&self.path, users.as_slice()).await {
            users.pop();
            return Err(e);
        }
        Ok(())
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<()> {
        let users = self.users.lock().await;
        if users
            .iter()
            .any(|u| u.username == username && u.password == password)
        {
            Ok(())
        } else {
            Err(Error::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    async fn store(dir: &tempfile::TempDir) -> JsonCredentials {
        JsonCredentials::open(dir.path().join("users.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;

        // Act
        store
            .register(Credentials::new("alice", "pw1"))
            .await
            .unwrap();
        let result = store.authenticate("alice", "pw1").await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn register_duplicate_fails() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        store
            .register(Credentials::new("alice", "pw1"))
            .await
            .unwrap();

        // Act
        let result = store.register(Credentials::new("alice", "other")).await;

        // Assert
        assert!(matches!(result, Err(Error::AlreadyExists)));
        assert!(store.authenticate("alice", "other").await.is_err());
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        store
            .register(Credentials::new("alice", "pw1"))
            .await
            .unwrap();

        // Act
        let result = store.register(Credentials::new("Alice", "pw2")).await;

        // Assert
        assert!(result.is_ok());
    }

    #[rstest]
    #[case("", "pw")]
    #[case("alice", "")]
    #[case("", "")]
    #[trace]
    #[tokio::test]
    async fn register_requires_both_fields(#[case] username: &str, #[case] password: &str) {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;

        // Act
        let result = store
            .register(Credentials::new(username, password))
            .await;

        // Assert
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[rstest]
    #[case("alice", "pw")]
    #[case("alice", "pw12")]
    #[case("alice", "PW1")]
    #[case("bob", "pw1")]
    #[case("", "")]
    #[trace]
    #[tokio::test]
    async fn authenticate_mismatch(#[case] username: &str, #[case] password: &str) {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        store
            .register(Credentials::new("alice", "pw1"))
            .await
            .unwrap();

        // Act
        let result = store.authenticate(username, password).await;

        // Assert
        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }

    #[tokio::test]
    async fn credentials_survive_reopen() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        store(&dir)
            .await
            .register(Credentials::new("alice", "pw1"))
            .await
            .unwrap();

        // Act
        let reopened = store(&dir).await;

        // Assert
        assert!(reopened.authenticate("alice", "pw1").await.is_ok());
    }
}
