//! In-memory `EventStore` for tests.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::event::{EventRecord, NewEventRecord};
use crate::retention::store::EventStore;

#[derive(Default)]
pub struct MemoryEventStore {
    records: Mutex<Vec<EventRecord>>,
    /// Number of upcoming inserts that fail before inserts succeed again.
    failing_inserts: AtomicU32,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seeded(records: Vec<NewEventRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.records.lock().await.push(stored(record, Uuid::new_v4()));
        }
        store
    }

    pub fn fail_next_inserts(&self, count: u32) {
        self.failing_inserts.store(count, Ordering::SeqCst);
    }

    pub async fn all(&self) -> Vec<EventRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert_one(&self, record: &NewEventRecord) -> Result<Uuid, StoreError> {
        let remaining = self.failing_inserts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_inserts.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        let id = Uuid::new_v4();
        self.records.lock().await.push(stored(record.clone(), id));
        Ok(id)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.created_date >= cutoff);
        Ok((before - records.len()) as u64)
    }

    async fn find_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, StoreError> {
        let mut found: Vec<EventRecord> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.created_date < cutoff)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.created_date);
        Ok(found)
    }
}

fn stored(record: NewEventRecord, id: Uuid) -> EventRecord {
    EventRecord {
        id,
        category: record.category,
        event_type: record.event_type,
        sentiment: record.sentiment,
        title: record.title,
        event_description: record.event_description,
        probability_of_yes: record.probability_of_yes,
        probability_of_no: record.probability_of_no,
        created_date: record.created_date,
    }
}
