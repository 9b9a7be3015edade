use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::domain::BlobStore;
use crate::error::{Error, Result};

const MAX_EXTENSION_LEN: usize = 16;

/// Strictly increasing stamps used as blob name stems.
///
/// Each stamp is the larger of the supplied clock reading and the previous
/// stamp plus one, so names stay unique even when several saves happen
/// within the same millisecond or the clock goes backwards.
#[derive(Default)]
pub struct StampGenerator {
    last: AtomicU64,
}

impl StampGenerator {
    pub fn next(&self, now: u64) -> u64 {
        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let next = now.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}

/// Blob store keeping every blob as a plain file in one directory.
pub struct DiskBlobs {
    dir: PathBuf,
    stamps: StampGenerator,
}

impl DiskBlobs {
    /// Opens the store, creating the directory when it is missing.
    pub async fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            stamps: StampGenerator::default(),
        })
    }

    fn locate(&self, filename: &str) -> Result<PathBuf> {
        if is_plain_name(filename) {
            Ok(self.dir.join(filename))
        } else {
            Err(Error::NotFound(filename.to_owned()))
        }
    }

    fn next_filename(&self, extension: &str) -> String {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        format!("{}{extension}", self.stamps.next(now))
    }
}

impl BlobStore for DiskBlobs {
    async fn save(&self, data: &[u8], original_name: &str) -> Result<String> {
        let extension = extension_of(original_name);
        loop {
            let filename = self.next_filename(&extension);
            let path = self.dir.join(&filename);
            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!("blob {filename} already exists, trying next name");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let written = async {
                file.write_all(data).await?;
                file.sync_all().await
            }
            .await;

            if let Err(e) = written {
                drop(file);
                fs::remove_file(&path).await.unwrap_or_default();
                return Err(e.into());
            }
            return Ok(filename);
        }
    }

    async fn delete(&self, filename: &str) -> Result<bool> {
        let path = self.locate(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn read(&self, filename: &str) -> Result<(File, u64)> {
        let path = self.locate(filename)?;
        let file = match File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(filename.to_owned()))
            }
            Err(e) => return Err(e.into()),
        };
        let size = file.metadata().await?.len();
        Ok((file, size))
    }
}

/// Extension of the original name including the leading dot, or an empty
/// string when there is none or it is not short ASCII alphanumeric.
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(OsStr::to_str)
        .filter(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LEN
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

fn is_plain_name(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(&['/', '\\', '\0'])
}
