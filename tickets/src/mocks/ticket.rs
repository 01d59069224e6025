//! Mock ticket repository for testing.
//!
//! All indexes live behind one mutex, so `create` and `update_status_if` are
//! atomic exactly like their database counterparts.

use crate::error::{Result, TicketError};
use crate::providers::{StatusUpdate, TicketRepository};
use crate::types::{EventId, Ticket, TicketId, TicketStatus, UserId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Store {
    next_seq: u64,
    tickets: HashMap<TicketId, (u64, Ticket)>,
    by_token: HashMap<String, TicketId>,
    by_digest: HashMap<String, TicketId>,
    unavailable: bool,
}

impl Store {
    fn sorted(&self, filter: impl Fn(&Ticket) -> bool) -> Vec<Ticket> {
        let mut found: Vec<&(u64, Ticket)> =
            self.tickets.values().filter(|(_, t)| filter(t)).collect();
        found.sort_by_key(|(seq, _)| *seq);
        found.into_iter().map(|(_, t)| t.clone()).collect()
    }

    fn by_index(&self, index: &HashMap<String, TicketId>, key: &str) -> Option<Ticket> {
        index
            .get(key)
            .and_then(|id| self.tickets.get(id))
            .map(|(_, t)| t.clone())
    }
}

/// Mock ticket repository.
#[derive(Debug, Clone, Default)]
pub struct MockTicketRepository {
    store: Arc<Mutex<Store>>,
}

fn lock(store: &Mutex<Store>) -> Result<MutexGuard<'_, Store>> {
    let guard = store
        .lock()
        .map_err(|_| TicketError::Internal("ticket store lock poisoned".to_string()))?;
    if guard.unavailable {
        return Err(TicketError::DatabaseError("ticket store unavailable".to_string()));
    }
    Ok(guard)
}

impl MockTicketRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `TicketError::DatabaseError`
    /// until switched back.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::Internal` if the lock is poisoned.
    pub fn set_unavailable(&self, unavailable: bool) -> Result<()> {
        self.store
            .lock()
            .map_err(|_| TicketError::Internal("ticket store lock poisoned".to_string()))?
            .unavailable = unavailable;
        Ok(())
    }

    /// Number of stored tickets.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unavailable.
    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.store)?.tickets.len())
    }

    /// Whether no tickets are stored.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unavailable.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl TicketRepository for MockTicketRepository {
    fn create(&self, ticket: &Ticket) -> impl Future<Output = Result<()>> + Send {
        let store = Arc::clone(&self.store);
        let ticket = ticket.clone();

        async move {
            let mut guard = lock(&store)?;

            if guard.tickets.contains_key(&ticket.id) {
                return Err(TicketError::PersistenceConflict { field: "id" });
            }
            if guard.by_token.contains_key(&ticket.credential_token) {
                return Err(TicketError::PersistenceConflict {
                    field: "credential_token",
                });
            }
            if guard.by_digest.contains_key(&ticket.artifact_digest) {
                return Err(TicketError::PersistenceConflict {
                    field: "artifact_digest",
                });
            }

            let seq = guard.next_seq;
            guard.next_seq += 1;
            guard
                .by_token
                .insert(ticket.credential_token.clone(), ticket.id);
            guard
                .by_digest
                .insert(ticket.artifact_digest.clone(), ticket.id);
            guard.tickets.insert(ticket.id, (seq, ticket));
            Ok(())
        }
    }

    fn find_by_id(
        &self,
        ticket_id: TicketId,
    ) -> impl Future<Output = Result<Option<Ticket>>> + Send {
        let store = Arc::clone(&self.store);

        async move {
            Ok(lock(&store)?
                .tickets
                .get(&ticket_id)
                .map(|(_, t)| t.clone()))
        }
    }

    fn find_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Ticket>>> + Send {
        let store = Arc::clone(&self.store);
        let token = token.to_string();

        async move {
            let guard = lock(&store)?;
            Ok(guard.by_index(&guard.by_token, &token))
        }
    }

    fn find_by_digest(
        &self,
        digest: &str,
    ) -> impl Future<Output = Result<Option<Ticket>>> + Send {
        let store = Arc::clone(&self.store);
        let digest = digest.to_string();

        async move {
            let guard = lock(&store)?;
            Ok(guard.by_index(&guard.by_digest, &digest))
        }
    }

    fn list_by_holder(
        &self,
        holder_id: UserId,
    ) -> impl Future<Output = Result<Vec<Ticket>>> + Send {
        let store = Arc::clone(&self.store);

        async move { Ok(lock(&store)?.sorted(|t| t.holder_id == holder_id)) }
    }

    fn list_by_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Ticket>>> + Send {
        let store = Arc::clone(&self.store);

        async move { Ok(lock(&store)?.sorted(|t| t.event_id == event_id)) }
    }

    fn update_status_if(
        &self,
        ticket_id: TicketId,
        expected: TicketStatus,
        new: TicketStatus,
    ) -> impl Future<Output = Result<StatusUpdate>> + Send {
        let store = Arc::clone(&self.store);

        async move {
            let mut guard = lock(&store)?;
            let Some((_, ticket)) = guard.tickets.get_mut(&ticket_id) else {
                return Ok(StatusUpdate::Missing);
            };

            if ticket.status != expected {
                return Ok(StatusUpdate::Stale {
                    current: ticket.status,
                });
            }

            ticket.status = new;
            Ok(StatusUpdate::Applied(ticket.clone()))
        }
    }

    fn delete_for_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<u64>> + Send {
        let store = Arc::clone(&self.store);

        async move {
            let mut guard = lock(&store)?;
            let doomed: Vec<Ticket> = guard.sorted(|t| t.event_id == event_id);

            for ticket in &doomed {
                guard.tickets.remove(&ticket.id);
                guard.by_token.remove(&ticket.credential_token);
                guard.by_digest.remove(&ticket.artifact_digest);
            }

            Ok(doomed.len() as u64)
        }
    }
}
