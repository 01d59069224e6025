//! Persistence ports.
//!
//! The lifecycle manager depends on these traits only. Production wires the
//! PostgreSQL adapters in [`crate::stores`]; tests wire the in-memory fakes
//! in [`crate::mocks`].
//!
//! ```text
//!   TicketManager
//!     │  find_event / delete_event      ┌──────────────────┐
//!     ├────────────────────────────────►│ EventRepository  │ (external entity)
//!     │  find_user                      ├──────────────────┤
//!     ├────────────────────────────────►│ UserRepository   │ (external entity)
//!     │  create / find / compare-and-set├──────────────────┤
//!     └────────────────────────────────►│ TicketRepository │ (owned records)
//!                                       └──────────────────┘
//! ```

pub mod event;
pub mod ticket;
pub mod user;

pub use event::EventRepository;
pub use ticket::{StatusUpdate, TicketRepository};
pub use user::UserRepository;
