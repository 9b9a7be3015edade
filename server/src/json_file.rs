//! Whole-collection JSON files used by the credential store and the registry.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Reads the JSON array stored at `path`.
///
/// A missing file is created holding an empty array, the way a fresh data
/// directory is bootstrapped.
pub async fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match fs::read(path).await {
        Ok(content) => Ok(serde_json::from_slice(&content)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            persist::<serde_json::Value>(path, &[]).await?;
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Rewrites the whole collection.
///
/// Content goes to a sibling temporary file that is synced and then renamed
/// over the target, so readers never observe a half written array.
pub async fn persist<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let content = serde_json::to_vec_pretty(items)?;
    let tmp = temporary_path(path);

    let mut file = fs::File::create(&tmp).await?;
    file.write_all(&content).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&tmp, path).await?;
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
