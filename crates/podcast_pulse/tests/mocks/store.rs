use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use podcast_status::{StatusRecord, StatusStore};

/// In-memory store that keeps every write, in order
#[derive(Clone, Default)]
pub struct MockStatusStore {
    pub records: Arc<Mutex<HashMap<String, StatusRecord>>>,
    pub writes: Arc<Mutex<Vec<StatusRecord>>>,
}

impl StatusStore for MockStatusStore {
    async fn write(&self, record: &StatusRecord) -> anyhow::Result<()> {
        self.writes.lock().unwrap().push(record.clone());
        let mut records = self.records.lock().unwrap();
        if records.get(&record.key).is_some_and(|r| r.is_terminal()) {
            anyhow::bail!("record {} is already terminal", record.key);
        }
        records.insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn read(&self, key: &str) -> anyhow::Result<Option<StatusRecord>> {
        Ok(self.records.lock().unwrap().get(key).cloned())
    }
}
