//! Storage implementations for the ticketing ports.
//!
//! - **Event / User repositories** (PostgreSQL) - read-only views of external entities
//! - **Ticket repository** (PostgreSQL) - unique constraints and conditional status updates

pub mod postgres;

// Re-exports
pub use postgres::{PostgresEventRepository, PostgresTicketRepository, PostgresUserRepository};
