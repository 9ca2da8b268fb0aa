use std::{future::Future, sync::Arc, sync::LazyLock};

use regex::Regex;

use crate::StatusRecord;

pub mod fs;

static KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").unwrap());

/// Keys are slugs; anything else can never name a record
pub fn is_valid_key(key: &str) -> bool {
    KEY_RE.is_match(key)
}

pub trait StatusStore {
    /// Persists `record` under `record.key`.
    ///
    /// Fails if the key already holds a terminal record.
    fn write(&self, record: &StatusRecord) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Returns `Ok(None)` for keys that were never written
    fn read(&self, key: &str) -> impl Future<Output = anyhow::Result<Option<StatusRecord>>> + Send;
}

impl<T: StatusStore + Send + Sync> StatusStore for &T {
    async fn write(&self, record: &StatusRecord) -> anyhow::Result<()> {
        (**self).write(record).await
    }

    async fn read(&self, key: &str) -> anyhow::Result<Option<StatusRecord>> {
        (**self).read(key).await
    }
}

impl<T: StatusStore + Send + Sync> StatusStore for Arc<T> {
    async fn write(&self, record: &StatusRecord) -> anyhow::Result<()> {
        (**self).write(record).await
    }

    async fn read(&self, key: &str) -> anyhow::Result<Option<StatusRecord>> {
        (**self).read(key).await
    }
}
