//! Event repository trait.

use crate::error::Result;
use crate::types::{Event, EventId};
use std::future::Future;

/// Event lookups and deletion.
///
/// Events are owned by an external CRUD layer; ticketing only reads them and
/// requests deletion once the event's tickets are gone.
pub trait EventRepository: Send + Sync {
    /// Find an event by ID.
    ///
    /// # Returns
    ///
    /// `None` if no such event exists.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn find_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Option<Event>>> + Send;

    /// Delete an event.
    ///
    /// # Returns
    ///
    /// `true` if the event existed.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn delete_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<bool>> + Send;
}
