//! Event store: the document-store collaborator, backed by PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::event::{EventRecord, NewEventRecord};

/// Insert / range-delete / range-query by `created_date`.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_one(&self, record: &NewEventRecord) -> Result<Uuid, StoreError>;

    /// Deletes every record with `created_date < cutoff`. Returns the count deleted.
    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Returns every record with `created_date < cutoff`, oldest first.
    async fn find_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, StoreError>;

    /// Sweeps records older than `cutoff`, then inserts `record`.
    ///
    /// A delete is never left without an insert attempt: if the insert fails
    /// after a successful delete it is retried once. Stores with transactions
    /// override this to commit both statements together.
    async fn prune_and_insert(
        &self,
        cutoff: DateTime<Utc>,
        record: &NewEventRecord,
    ) -> Result<(u64, Uuid), StoreError> {
        let deleted = self.delete_created_before(cutoff).await?;
        let id = match self.insert_one(record).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Insert after retention sweep failed, retrying once: {e}");
                self.insert_one(record).await?
            }
        };
        Ok((deleted, id))
    }
}

/// PostgreSQL-backed store over the `event_records` table.
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_SQL: &str = r#"
    INSERT INTO event_records
        (id, category, event_type, sentiment, title, event_description,
         probability_of_yes, probability_of_no, created_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
"#;

const DELETE_SQL: &str = "DELETE FROM event_records WHERE created_date < $1";

#[async_trait]
impl EventStore for PgEventStore {
    async fn insert_one(&self, record: &NewEventRecord) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        bind_insert(id, record).execute(&self.pool).await?;
        Ok(id)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(DELETE_SQL)
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, StoreError> {
        Ok(sqlx::query_as::<_, EventRecord>(
            r#"
            SELECT id, category, event_type, sentiment, title, event_description,
                   probability_of_yes, probability_of_no, created_date
            FROM event_records
            WHERE created_date < $1
            ORDER BY created_date ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Delete and insert in one transaction; a failed insert rolls the delete back.
    async fn prune_and_insert(
        &self,
        cutoff: DateTime<Utc>,
        record: &NewEventRecord,
    ) -> Result<(u64, Uuid), StoreError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(DELETE_SQL)
            .bind(cutoff)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let id = Uuid::new_v4();
        bind_insert(id, record).execute(&mut *tx).await?;

        tx.commit().await?;
        Ok((deleted, id))
    }
}

fn bind_insert(
    id: Uuid,
    record: &NewEventRecord,
) -> sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments> {
    sqlx::query(INSERT_SQL)
        .bind(id)
        .bind(&record.category)
        .bind(&record.event_type)
        .bind(&record.sentiment)
        .bind(&record.title)
        .bind(&record.event_description)
        .bind(&record.probability_of_yes)
        .bind(&record.probability_of_no)
        .bind(record.created_date)
}
