//! Mock event repository for testing.

use crate::error::{Result, TicketError};
use crate::providers::EventRepository;
use crate::types::{Event, EventId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Mock event repository.
#[derive(Debug, Clone)]
pub struct MockEventRepository {
    events: Arc<Mutex<HashMap<EventId, Event>>>,
}

impl MockEventRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Seed an event, replacing any existing record with the same ID.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::Internal` if the lock is poisoned.
    pub fn insert(&self, event: Event) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| TicketError::Internal("event store lock poisoned".to_string()))?
            .insert(event.id, event);
        Ok(())
    }
}

impl Default for MockEventRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRepository for MockEventRepository {
    fn find_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Option<Event>>> + Send {
        let events = Arc::clone(&self.events);

        async move {
            Ok(events
                .lock()
                .map_err(|_| TicketError::Internal("event store lock poisoned".to_string()))?
                .get(&event_id)
                .cloned())
        }
    }

    fn delete_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<bool>> + Send {
        let events = Arc::clone(&self.events);

        async move {
            Ok(events
                .lock()
                .map_err(|_| TicketError::Internal("event store lock poisoned".to_string()))?
                .remove(&event_id)
                .is_some())
        }
    }
}
