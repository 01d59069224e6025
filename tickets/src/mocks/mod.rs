//! In-memory provider implementations for testing.
//!
//! Each mock holds its state behind `Arc<Mutex<..>>`, so clones share storage
//! and can be handed to a manager while the test keeps a handle for seeding
//! and inspection.

pub mod event;
pub mod ticket;
pub mod user;

pub use event::MockEventRepository;
pub use ticket::MockTicketRepository;
pub use user::MockUserRepository;
