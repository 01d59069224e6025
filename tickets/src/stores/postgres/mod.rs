//! PostgreSQL storage implementations.
//!
//! All three repositories share one `PgPool`; the schema lives in
//! `tickets/migrations` and is applied with [`migrate`].
//!
//! # Example
//!
//! ```no_run
//! use gatepass_tickets::stores::postgres::{self, PostgresTicketRepository};
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/gatepass").await?;
//! postgres::migrate(&pool).await?;
//! let tickets = PostgresTicketRepository::new(pool);
//! # Ok(())
//! # }
//! ```

pub mod event;
pub mod ticket;
pub mod user;

// Re-exports
pub use event::PostgresEventRepository;
pub use ticket::PostgresTicketRepository;
pub use user::PostgresUserRepository;

use crate::error::{Result, TicketError};
use sqlx::PgPool;

/// Run database migrations.
///
/// # Errors
///
/// Returns error if migrations fail.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| TicketError::DatabaseError(format!("Migration failed: {e}")))
}

fn db_error(context: &str, e: &sqlx::Error) -> TicketError {
    TicketError::DatabaseError(format!("{context}: {e}"))
}
