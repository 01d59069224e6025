//! PostgreSQL ticket repository.
//!
//! Uniqueness of `credential_token` and `artifact_digest` is enforced by
//! named constraints; a violation is reported as a conflict on the matching
//! field. Status changes are a single `UPDATE ... WHERE status = $expected`.

use super::db_error;
use crate::error::{Result, TicketError};
use crate::providers::{StatusUpdate, TicketRepository};
use crate::types::{EventId, Ticket, TicketId, TicketStatus, UserId};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const TICKET_COLUMNS: &str = "id, event_id, holder_id, credential_token, visual_artifact, \
                              artifact_digest, status, issued_at";

/// PostgreSQL ticket repository.
#[derive(Debug, Clone)]
pub struct PostgresTicketRepository {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresTicketRepository {
    /// Create a new PostgreSQL ticket repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, bind: FindBy<'_>) -> Result<Option<Ticket>> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE {column} = $1");
        let query = sqlx::query(&sql);
        let query = match bind {
            FindBy::Id(id) => query.bind(id.as_uuid()),
            FindBy::Text(value) => query.bind(value),
        };

        query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to get ticket", &e))?
            .as_ref()
            .map(row_to_ticket)
            .transpose()
    }

    async fn list(&self, column: &str, id: uuid::Uuid) -> Result<Vec<Ticket>> {
        let sql = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE {column} = $1 ORDER BY issued_at, id"
        );

        sqlx::query(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list tickets", &e))?
            .iter()
            .map(row_to_ticket)
            .collect()
    }
}

enum FindBy<'a> {
    Id(TicketId),
    Text(&'a str),
}

impl TicketRepository for PostgresTicketRepository {
    async fn create(&self, ticket: &Ticket) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO tickets
                (id, event_id, holder_id, credential_token, visual_artifact,
                 artifact_digest, status, issued_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(ticket.id.as_uuid())
        .bind(ticket.event_id.as_uuid())
        .bind(ticket.holder_id.as_uuid())
        .bind(&ticket.credential_token)
        .bind(&ticket.visual_artifact)
        .bind(&ticket.artifact_digest)
        .bind(ticket.status.as_str())
        .bind(ticket.issued_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    let field = match db_err.constraint() {
                        Some("tickets_credential_token_key") => "credential_token",
                        Some("tickets_artifact_digest_key") => "artifact_digest",
                        _ => "id",
                    };
                    return TicketError::PersistenceConflict { field };
                }
            }
            db_error("Failed to create ticket", &e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, ticket_id: TicketId) -> Result<Option<Ticket>> {
        self.find_one("id", FindBy::Id(ticket_id)).await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Ticket>> {
        self.find_one("credential_token", FindBy::Text(token)).await
    }

    async fn find_by_digest(&self, digest: &str) -> Result<Option<Ticket>> {
        self.find_one("artifact_digest", FindBy::Text(digest)).await
    }

    async fn list_by_holder(&self, holder_id: UserId) -> Result<Vec<Ticket>> {
        self.list("holder_id", holder_id.as_uuid()).await
    }

    async fn list_by_event(&self, event_id: EventId) -> Result<Vec<Ticket>> {
        self.list("event_id", event_id.as_uuid()).await
    }

    async fn update_status_if(
        &self,
        ticket_id: TicketId,
        expected: TicketStatus,
        new: TicketStatus,
    ) -> Result<StatusUpdate> {
        let sql = format!(
            "UPDATE tickets SET status = $3 WHERE id = $1 AND status = $2 RETURNING {TICKET_COLUMNS}"
        );

        let updated = sqlx::query(&sql)
            .bind(ticket_id.as_uuid())
            .bind(expected.as_str())
            .bind(new.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update ticket status", &e))?;

        if let Some(row) = updated {
            return Ok(StatusUpdate::Applied(row_to_ticket(&row)?));
        }

        // Lost the race or never existed; report what is there now.
        let current = sqlx::query("SELECT status FROM tickets WHERE id = $1")
            .bind(ticket_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to read ticket status", &e))?;

        match current {
            Some(row) => Ok(StatusUpdate::Stale {
                current: parse_status(&row)?,
            }),
            None => Ok(StatusUpdate::Missing),
        }
    }

    async fn delete_for_event(&self, event_id: EventId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tickets WHERE event_id = $1")
            .bind(event_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete tickets", &e))?;

        Ok(result.rows_affected())
    }
}

fn parse_status(row: &PgRow) -> Result<TicketStatus> {
    let status: String = row
        .try_get("status")
        .map_err(|e| db_error("Failed to read ticket", &e))?;
    status
        .parse()
        .map_err(|e: crate::types::UnknownVariant| TicketError::DatabaseError(e.to_string()))
}

/// Convert a database row to a `Ticket`.
fn row_to_ticket(row: &PgRow) -> Result<Ticket> {
    let read = |e: sqlx::Error| db_error("Failed to read ticket", &e);

    Ok(Ticket {
        id: TicketId::from_uuid(row.try_get("id").map_err(read)?),
        event_id: EventId::from_uuid(row.try_get("event_id").map_err(read)?),
        holder_id: UserId::from_uuid(row.try_get("holder_id").map_err(read)?),
        credential_token: row.try_get("credential_token").map_err(read)?,
        visual_artifact: row.try_get("visual_artifact").map_err(read)?,
        artifact_digest: row.try_get("artifact_digest").map_err(read)?,
        status: parse_status(row)?,
        issued_at: row.try_get("issued_at").map_err(read)?,
    })
}
