//! PostgreSQL event repository.

use super::db_error;
use crate::error::Result;
use crate::providers::EventRepository;
use crate::types::{Event, EventId, UserId};
use sqlx::{PgPool, Row};

/// PostgreSQL event repository.
#[derive(Debug, Clone)]
pub struct PostgresEventRepository {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresEventRepository {
    /// Create a new PostgreSQL event repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl EventRepository for PostgresEventRepository {
    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>> {
        let row = sqlx::query(
            r"
            SELECT id, name, starts_at, location, organizer_id
            FROM events
            WHERE id = $1
            ",
        )
        .bind(event_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get event", &e))?;

        row.map(|row| -> std::result::Result<Event, sqlx::Error> {
            Ok(Event {
                id: EventId::from_uuid(row.try_get("id")?),
                name: row.try_get("name")?,
                starts_at: row.try_get("starts_at")?,
                location: row.try_get("location")?,
                organizer_id: UserId::from_uuid(row.try_get("organizer_id")?),
            })
        })
        .transpose()
        .map_err(|e| db_error("Failed to read event", &e))
    }

    async fn delete_event(&self, event_id: EventId) -> Result<bool> {
        // Tickets cascade via the foreign key.
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete event", &e))?;

        Ok(result.rows_affected() > 0)
    }
}
