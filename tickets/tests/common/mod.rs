//! Shared fixtures for ticketing integration tests.

#![allow(dead_code)]

use gatepass_testing::{MockClock, SequentialIdGenerator, init_test_tracing, test_epoch};
use gatepass_tickets::config::{SigningKey, SigningKeys, TicketingConfig};
use gatepass_tickets::mocks::{MockEventRepository, MockTicketRepository, MockUserRepository};
use gatepass_tickets::types::{Event, EventId, User, UserId, UserRole};
use gatepass_tickets::{TicketEnvironment, TicketManager};
use std::sync::Arc;

pub type Manager = TicketManager<MockEventRepository, MockUserRepository, MockTicketRepository>;

pub const SESSION_SECRET: &str = "integration-session-secret-0123456789ab";
pub const TICKET_SECRET: &str = "integration-ticket-secret-0123456789abc";

pub fn config() -> TicketingConfig {
    TicketingConfig::new(
        SigningKeys::new(
            SigningKey::new("SESSION_TOKEN_SECRET", SESSION_SECRET).unwrap(),
            SigningKey::new("TICKET_CREDENTIAL_SECRET", TICKET_SECRET).unwrap(),
        )
        .unwrap(),
    )
}

pub fn user(name: &str, role: UserRole) -> User {
    User {
        id: UserId::new(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role,
    }
}

/// One event (organized by `organizer`), one ticket buyer, one bystander.
pub struct World {
    pub manager: Manager,
    pub events: MockEventRepository,
    pub users: MockUserRepository,
    pub tickets: MockTicketRepository,
    pub clock: MockClock,
    pub event: Event,
    pub organizer: User,
    pub holder: User,
    pub stranger: User,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(&config())
    }

    pub fn with_config(config: &TicketingConfig) -> Self {
        init_test_tracing();

        let events = MockEventRepository::new();
        let users = MockUserRepository::new();
        let tickets = MockTicketRepository::new();
        let clock = MockClock::new(test_epoch());

        let organizer = user("Olga", UserRole::Organizer);
        let holder = user("Hank", UserRole::Buyer);
        let stranger = user("Sam", UserRole::Organizer);
        for u in [&organizer, &holder, &stranger] {
            users.insert(u.clone()).unwrap();
        }

        let event = Event {
            id: EventId::new(),
            name: "Summer Music Festival".to_string(),
            starts_at: test_epoch(),
            location: "Riverside Park".to_string(),
            organizer_id: organizer.id,
        };
        events.insert(event.clone()).unwrap();

        let env = TicketEnvironment::new(events.clone(), users.clone(), tickets.clone())
            .with_clock(Arc::new(clock.clone()))
            .with_ids(Arc::new(SequentialIdGenerator::new()));

        Self {
            manager: TicketManager::new(env, config),
            events,
            users,
            tickets,
            clock,
            event,
            organizer,
            holder,
            stranger,
        }
    }

    /// A second event run by `stranger`.
    pub fn other_event(&self) -> Event {
        let event = Event {
            id: EventId::new(),
            name: "Winter Gala".to_string(),
            starts_at: test_epoch(),
            location: "Town Hall".to_string(),
            organizer_id: self.stranger.id,
        };
        self.events.insert(event.clone()).unwrap();
        event
    }
}
