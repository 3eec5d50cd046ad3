use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

/// A persisted forecasting question. Inserted once, never updated,
/// removed only by the retention sweep.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct EventRecord {
    pub id: Uuid,
    pub category: String,
    pub event_type: String,
    pub sentiment: String,
    /// The forecasting question, or the rejection sentinel.
    pub title: String,
    pub event_description: Option<String>,
    pub probability_of_yes: Option<String>,
    pub probability_of_no: Option<String>,
    pub created_date: DateTime<Utc>,
}

/// Insert payload for `EventRecord`; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEventRecord {
    pub category: String,
    pub event_type: String,
    pub sentiment: String,
    pub title: String,
    pub event_description: Option<String>,
    pub probability_of_yes: Option<String>,
    pub probability_of_no: Option<String>,
    pub created_date: DateTime<Utc>,
}

/// Enforces the both-or-neither rule for the probability pair.
/// The two values are not checked to sum to 100.
pub fn pair_probabilities(
    yes: Option<String>,
    no: Option<String>,
) -> (Option<String>, Option<String>) {
    match (yes, no) {
        (Some(yes), Some(no)) => (Some(yes), Some(no)),
        (None, None) => (None, None),
        (yes, no) => {
            warn!(
                "Dropping incomplete probability pair (yes={:?}, no={:?})",
                yes, no
            );
            (None, None)
        }
    }
}
