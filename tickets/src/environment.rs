//! Ticketing environment.
//!
//! Groups every external dependency of the lifecycle manager so production
//! and tests differ only in what gets injected.

use crate::providers::{EventRepository, TicketRepository, UserRepository};
use gatepass_core::environment::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
use std::sync::Arc;

/// Ticketing environment.
///
/// # Type Parameters
///
/// - `E`: Event repository
/// - `U`: User repository
/// - `T`: Ticket repository
#[derive(Clone)]
pub struct TicketEnvironment<E, U, T>
where
    E: EventRepository,
    U: UserRepository,
    T: TicketRepository,
{
    /// Event lookups (external entity).
    pub events: E,

    /// User lookups (external entity).
    pub users: U,

    /// Ticket storage.
    pub tickets: T,

    /// Time source for issuance timestamps and expiry checks.
    pub clock: Arc<dyn Clock>,

    /// Source of new ticket identities.
    pub ids: Arc<dyn IdGenerator>,
}

impl<E, U, T> TicketEnvironment<E, U, T>
where
    E: EventRepository,
    U: UserRepository,
    T: TicketRepository,
{
    /// Environment with the system clock and random identities.
    #[must_use]
    pub fn new(events: E, users: U, tickets: T) -> Self {
        Self {
            events,
            users,
            tickets,
            clock: Arc::new(SystemClock),
            ids: Arc::new(RandomIdGenerator),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the identity generator.
    #[must_use]
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }
}
