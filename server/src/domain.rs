use std::future::Future;

use kernel::{Credentials, UploadRecord};
use tokio::fs::File;

use crate::error::Result;

/// Durable username/password store.
pub trait CredentialStore: Send + Sync {
    /// Adds a credential unless the username is already taken.
    fn register(&self, credentials: Credentials) -> impl Future<Output = Result<()>> + Send;

    /// Succeeds only when both username and password match a stored pair exactly.
    fn authenticate(&self, username: &str, password: &str)
        -> impl Future<Output = Result<()>> + Send;
}

/// Durable ordered collection of upload records.
///
/// Mutations are serialized and flushed before they report success.
pub trait UploadRegistry: Send + Sync {
    /// Records in insertion order.
    fn list(&self) -> impl Future<Output = Result<Vec<UploadRecord>>> + Send;

    fn add(&self, record: UploadRecord) -> impl Future<Output = Result<()>> + Send;

    /// Removes and returns the record with the given filename.
    fn remove(&self, filename: &str) -> impl Future<Output = Result<UploadRecord>> + Send;
}

/// Physical file bytes keyed by generated filename.
pub trait BlobStore: Send + Sync {
    /// Stores the bytes under a freshly generated unique name and returns it.
    /// The extension of `original_name` is kept when it is safe to.
    fn save(&self, data: &[u8], original_name: &str) -> impl Future<Output = Result<String>> + Send;

    /// Removes the blob. Returns `false` when there was nothing to remove.
    fn delete(&self, filename: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Opens the blob for streaming together with its size in bytes.
    fn read(&self, filename: &str) -> impl Future<Output = Result<(File, u64)>> + Send;
}
