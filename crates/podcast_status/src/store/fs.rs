use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{store::is_valid_key, StatusRecord, StatusStore};

/// One `<key>.json` file per run, all in a single directory
#[derive(Debug, Clone)]
pub struct FsStatusStore {
    root: PathBuf,
}

impl FsStatusStore {
    /// Creates the records directory if it does not exist yet
    pub async fn init(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();

        tokio::fs::create_dir_all(&root)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, path = ?root, "Failed to create status directory"))
            .with_context(|| format!("Failed to create status directory {}", root.display()))?;

        Ok(FsStatusStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    async fn load(&self, path: &Path) -> anyhow::Result<Option<StatusRecord>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let record = serde_json::from_slice::<StatusRecord>(&bytes)
            .inspect_err(|e| tracing::error!(error = ?e, path = ?path, "Corrupt status record"))
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(record))
    }
}

impl StatusStore for FsStatusStore {
    #[tracing::instrument(skip_all, fields(key = %record.key, status = ?record.status))]
    async fn write(&self, record: &StatusRecord) -> anyhow::Result<()> {
        if !is_valid_key(&record.key) {
            anyhow::bail!("Invalid status key: {:?}", record.key);
        }

        let path = self.record_path(&record.key);

        if let Some(existing) = self.load(&path).await? {
            if existing.is_terminal() {
                anyhow::bail!(
                    "Status record {} is already {:?}; refusing to overwrite",
                    record.key,
                    existing.status
                );
            }
        }

        let json = serde_json::to_vec_pretty(record).context("Failed to serialize status record")?;

        // write-then-rename so readers never observe a half written record
        let tmp_path = self.root.join(format!("{}.json.tmp", record.key));
        tokio::fs::write(&tmp_path, &json)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to move status record into place"))
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Status record written");

        Ok(())
    }

    async fn read(&self, key: &str) -> anyhow::Result<Option<StatusRecord>> {
        if !is_valid_key(key) {
            return Ok(None);
        }
        self.load(&self.record_path(key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, RunState};
    use chrono::{TimeZone, Utc};

    fn pending(key: &str) -> StatusRecord {
        let ts = Utc.with_ymd_and_hms(2026, 10, 15, 14, 5, 1).unwrap();
        StatusRecord::pending(key, "Seneca", ts)
    }

    #[tokio::test]
    async fn test_unwritten_key_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStatusStore::init(dir.path()).await.unwrap();

        let result = store.read("seneca_20261015_140501").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_init_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("audio_files");

        let store = FsStatusStore::init(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.root(), nested.as_path());
    }

    #[tokio::test]
    async fn test_pending_then_terminal_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStatusStore::init(dir.path()).await.unwrap();

        let record = pending("seneca_20261015_140501");
        store.write(&record).await.unwrap();
        assert_eq!(
            store.read(&record.key).await.unwrap().map(|r| r.status),
            Some(RunState::Pending)
        );

        let done = record.clone().complete();
        store.write(&done).await.unwrap();

        let stored = store.read(&record.key).await.unwrap().unwrap();
        assert_eq!(stored, done);
        assert!(!dir.path().join("seneca_20261015_140501.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_after_terminal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStatusStore::init(dir.path()).await.unwrap();

        let failed = pending("20261015_140501").fail(ErrorKind::Transport, "timed out");
        store.write(&failed).await.unwrap();

        let result = store.write(&failed.clone().complete()).await;
        assert!(result.is_err(), "terminal records must not be overwritten");

        let stored = store.read("20261015_140501").await.unwrap().unwrap();
        assert_eq!(stored.status, RunState::Failed);
    }

    #[tokio::test]
    async fn test_invalid_keys_are_never_touched() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStatusStore::init(dir.path()).await.unwrap();

        assert!(store.read("../secret").await.unwrap().is_none());
        assert!(store.write(&pending("../secret")).await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStatusStore::init(dir.path()).await.unwrap();
        std::fs::write(store.record_path("broken"), b"{not json").unwrap();

        assert!(store.read("broken").await.is_err());
    }
}
