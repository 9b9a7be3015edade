use chrono::Utc;
use kernel::{Credentials, Status, UploadRecord};
use tokio::fs::File;

use crate::domain::{BlobStore, CredentialStore, UploadRegistry};
use crate::error::{Error, Result};
use crate::sessions::SessionManager;

/// File content received from a client.
pub struct Payload {
    /// Name of the file on the client side, only its extension is kept
    pub original_name: String,
    pub data: Vec<u8>,
}

/// Owns the credential store, sessions, registry and blobs.
///
/// Constructed once at startup and shared with the request handlers. Every
/// registry or blob operation resolves the caller's session first and fails
/// with [`Error::Unauthorized`] before touching storage when it does not.
pub struct FileHost<C, R, B> {
    credentials: C,
    sessions: SessionManager,
    registry: R,
    blobs: B,
}

impl<C, R, B> FileHost<C, R, B>
where
    C: CredentialStore,
    R: UploadRegistry,
    B: BlobStore,
{
    pub fn new(credentials: C, registry: R, blobs: B) -> Self {
        Self {
            credentials,
            sessions: SessionManager::new(),
            registry,
            blobs,
        }
    }

    pub async fn signup(&self, credentials: Credentials) -> Result<()> {
        let username = credentials.username.clone();
        self.credentials.register(credentials).await?;
        tracing::info!("user {username} signed up");
        Ok(())
    }

    /// Checks the credentials and opens a session. Returns the session token.
    pub async fn login(&self, credentials: &Credentials) -> Result<String> {
        if let Err(e) = self
            .credentials
            .authenticate(&credentials.username, &credentials.password)
            .await
        {
            tracing::warn!("failed login attempt for user '{}'", credentials.username);
            return Err(e);
        }
        let token = self.sessions.create(&credentials.username).await;
        tracing::info!("user {} logged in", credentials.username);
        Ok(token)
    }

    /// Closes the session if there is one. Never fails.
    pub async fn logout(&self, token: Option<&str>) {
        if let Some(token) = token {
            if let Some(username) = self.sessions.destroy(token).await {
                tracing::info!("user {username} logged out");
            }
        }
    }

    pub async fn status(&self, token: Option<&str>) -> Status {
        let user = match token {
            Some(t) => self.sessions.resolve(t).await,
            None => None,
        };
        Status::new(user)
    }

    /// Resolves the session to its username or fails with [`Error::Unauthorized`].
    pub async fn authorize(&self, token: Option<&str>) -> Result<String> {
        let Some(token) = token else {
            return Err(Error::Unauthorized);
        };
        self.sessions.resolve(token).await.ok_or(Error::Unauthorized)
    }

    /// Stores the payload and records it on behalf of the session owner.
    ///
    /// The blob is written before the record. When recording fails the
    /// blob stays behind as an orphan and the error is returned.
    pub async fn upload(
        &self,
        token: Option<&str>,
        payload: Option<Payload>,
    ) -> Result<UploadRecord> {
        let username = self.authorize(token).await?;
        let Some(payload) = payload else {
            return Err(Error::InvalidInput("No file uploaded".to_owned()));
        };

        let filename = self
            .blobs
            .save(&payload.data, &payload.original_name)
            .await?;
        let record = UploadRecord::new(filename, username, Utc::now());

        if let Err(e) = self.registry.add(record.clone()).await {
            tracing::warn!(
                "blob {} left without a record. Error: {e}",
                record.filename
            );
            return Err(e);
        }

        tracing::info!(
            "file: {} read: {} stored as: {} by: {}",
            payload.original_name,
            payload.data.len(),
            record.filename,
            record.uploaded_by
        );
        Ok(record)
    }

    pub async fn list(&self, token: Option<&str>) -> Result<Vec<UploadRecord>> {
        self.authorize(token).await?;
        self.registry.list().await
    }

    /// Removes the record, then its blob.
    ///
    /// Any logged in user may delete any file. A missing blob is not an
    /// error once the record is gone.
    pub async fn delete(&self, token: Option<&str>, filename: &str) -> Result<UploadRecord> {
        let username = self.authorize(token).await?;
        let record = self.registry.remove(filename).await?;

        match self.blobs.delete(filename).await {
            Ok(true) => tracing::info!("file: {filename} deleted by: {username}"),
            Ok(false) => tracing::info!("file: {filename} record deleted by: {username}, blob did not exist"),
            Err(e) => tracing::error!("file: {filename} record deleted but blob not removed. Error: {e}"),
        }
        Ok(record)
    }

    /// Opens a stored blob for reading. Not gated: anyone knowing the
    /// generated name can read the file.
    pub async fn read(&self, filename: &str) -> Result<(File, u64)> {
        self.blobs.read(filename).await
    }
}
