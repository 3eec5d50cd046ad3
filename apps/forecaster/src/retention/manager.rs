//! Retention Manager: write-time compaction of the event store.
//!
//! No background sweeper: `save` prunes stale records before every insert.
//! `now` is always passed in so the window is deterministic under test.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::event::{EventRecord, NewEventRecord};
use crate::retention::store::EventStore;

/// Default retention window, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 21;

/// Records created strictly before this instant are stale.
/// A window reaching past the earliest representable instant keeps everything.
pub fn retention_cutoff(now: DateTime<Utc>, window_days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(window_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Deletes every record older than the window. Returns how many were removed.
/// Runtime deletes go through `save`, which always pairs the sweep with an insert.
#[cfg(test)]
pub async fn enforce_retention(
    store: &dyn EventStore,
    now: DateTime<Utc>,
    window_days: u32,
) -> Result<u64, StoreError> {
    let cutoff = retention_cutoff(now, window_days);
    let deleted = store.delete_created_before(cutoff).await?;
    if deleted > 0 {
        info!("Retention sweep removed {deleted} records created before {cutoff}");
    } else {
        debug!("Retention sweep: no records older than {cutoff}");
    }
    Ok(deleted)
}

/// Sweeps the window, then inserts `record`. Returns the new id and the sweep count.
pub async fn save(
    store: &dyn EventStore,
    record: &NewEventRecord,
    now: DateTime<Utc>,
    window_days: u32,
) -> Result<(Uuid, u64), StoreError> {
    let cutoff = retention_cutoff(now, window_days);
    let (deleted, id) = store.prune_and_insert(cutoff, record).await?;
    if deleted > 0 {
        info!("Retention sweep removed {deleted} records created before {cutoff}");
    }
    debug!("Saved event record {id}");
    Ok((id, deleted))
}

/// Read-only view of the records the next sweep would remove.
pub async fn fetch_older_than(
    store: &dyn EventStore,
    now: DateTime<Utc>,
    window_days: u32,
) -> Result<Vec<EventRecord>, StoreError> {
    store
        .find_created_before(retention_cutoff(now, window_days))
        .await
}
