//! Ticket repository trait.

use crate::error::Result;
use crate::types::{EventId, Ticket, TicketId, TicketStatus, UserId};
use std::future::Future;

/// Outcome of a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// Status matched the expectation and was changed; carries the updated record.
    Applied(Ticket),

    /// Status did not match; nothing was written.
    Stale {
        /// Status found at the time of the attempt.
        current: TicketStatus,
    },

    /// No ticket with that ID.
    Missing,
}

/// Ticket storage.
///
/// # Implementation Notes
///
/// - `create` must be atomic: either the full record is stored or nothing is
/// - `credential_token` and `artifact_digest` are unique; a collision must be
///   reported as `TicketError::PersistenceConflict`, never overwrite
/// - **CRITICAL**: `update_status_if` must check and write as one unit
///   (`UPDATE ... WHERE status = $expected` or a mutex-protected check-and-set);
///   two concurrent calls with the same expectation must see exactly one `Applied`
pub trait TicketRepository: Send + Sync {
    /// Store a new ticket.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - ID, credential token or artifact digest already exists →
    ///   `TicketError::PersistenceConflict`
    /// - Storage operation fails
    fn create(
        &self,
        ticket: &Ticket,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Find a ticket by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn find_by_id(
        &self,
        ticket_id: TicketId,
    ) -> impl Future<Output = Result<Option<Ticket>>> + Send;

    /// Find a ticket by its credential token.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn find_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Ticket>>> + Send;

    /// Find a ticket by its artifact digest.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn find_by_digest(
        &self,
        digest: &str,
    ) -> impl Future<Output = Result<Option<Ticket>>> + Send;

    /// All tickets held by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn list_by_holder(
        &self,
        holder_id: UserId,
    ) -> impl Future<Output = Result<Vec<Ticket>>> + Send;

    /// All tickets for an event, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn list_by_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Ticket>>> + Send;

    /// Set status to `new` only if it is currently `expected`.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn update_status_if(
        &self,
        ticket_id: TicketId,
        expected: TicketStatus,
        new: TicketStatus,
    ) -> impl Future<Output = Result<StatusUpdate>> + Send;

    /// Delete every ticket belonging to an event.
    ///
    /// # Returns
    ///
    /// Number of tickets deleted.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn delete_for_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<u64>> + Send;
}
