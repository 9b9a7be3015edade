use std::path::{Path, PathBuf};

use kernel::UploadRecord;
use tokio::sync::Mutex;

use crate::domain::UploadRegistry;
use crate::error::{Error, Result};
use crate::json_file;

/// Upload registry backed by a single JSON file.
///
/// The whole collection is held under one lock and rewritten on every
/// mutation before the lock is released, so concurrent adds and removes
/// cannot lose each other's updates.
pub struct JsonRegistry {
    path: PathBuf,
    records: Mutex<Vec<UploadRecord>>,
}

impl JsonRegistry {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = json_file::load(&path).await?;
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }
}

impl UploadRegistry for JsonRegistry {
    async fn list(&self) -> Result<Vec<UploadRecord>> {
        Ok(self.records.lock().await.clone())
    }

    async fn add(&self, record: UploadRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        records.push(record);
        if let Err(e) = json_file::persist(&self.path, records.as_slice()).await {
            records.pop();
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, filename: &str) -> Result<UploadRecord> {
        let mut records = self.records.lock().await;
        let Some(ix) = records.iter().position(|r| r.filename == filename) else {
            return Err(Error::NotFound(filename.to_owned()));
        };

        let removed = records.remove(ix);
        if let Err(e) = json_file::persist(&self.path, records.as_slice()).await {
            records.insert(ix, removed);
            return Err(e);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    fn record(filename: &str, by: &str) -> UploadRecord {
        UploadRecord::new(filename.to_owned(), by.to_owned(), Utc::now())
    }

    async fn registry(dir: &tempfile::TempDir) -> JsonRegistry {
        JsonRegistry::open(dir.path().join("uploads.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir).await;

        // Act
        for name in ["3.txt", "1.txt", "2.txt"] {
            registry.add(record(name, "alice")).await.unwrap();
        }
        let listed = registry.list().await.unwrap();

        // Assert
        let names: Vec<&str> = listed.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["3.txt", "1.txt", "2.txt"]);
    }

    #[tokio::test]
    async fn remove_returns_record() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir).await;
        registry.add(record("1.txt", "alice")).await.unwrap();
        registry.add(record("2.txt", "bob")).await.unwrap();

        // Act
        let removed = registry.remove("1.txt").await.unwrap();

        // Assert
        assert_eq!(removed.uploaded_by, "alice");
        let listed = registry.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].filename, "2.txt");
    }

    #[tokio::test]
    async fn remove_unknown_is_not_found() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir).await;
        registry.add(record("1.txt", "alice")).await.unwrap();

        // Act
        let result = registry.remove("2.txt").await;

        // Assert
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(registry.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remove_twice_is_not_found() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir).await;
        registry.add(record("1.txt", "alice")).await.unwrap();
        registry.remove("1.txt").await.unwrap();

        // Act
        let result = registry.remove("1.txt").await;

        // Assert
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        {
            let registry = registry(&dir).await;
            registry.add(record("1.txt", "alice")).await.unwrap();
            registry.add(record("2.txt", "alice")).await.unwrap();
            registry.remove("1.txt").await.unwrap();
        }

        // Act
        let reopened = registry(&dir).await;

        // Assert
        let listed = reopened.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].filename, "2.txt");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_are_not_lost() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(registry(&dir).await);

        // Act
        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.add(record(&format!("{i}.bin"), "alice")).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        // Assert
        assert_eq!(registry.list().await.unwrap().len(), 32);
        let reopened = JsonRegistry::open(dir.path().join("uploads.json"))
            .await
            .unwrap();
        assert_eq!(reopened.list().await.unwrap().len(), 32);
    }
}
