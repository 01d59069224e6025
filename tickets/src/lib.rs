//! # Gatepass Tickets
//!
//! Signed, scannable event tickets with an organizer-gated status lifecycle.
//!
//! ## Features
//!
//! - **Tamper-evident credentials**: HS256 tokens binding ticket, event and holder
//! - **Scannable artifacts**: styled QR code PNGs, base64-encoded for JSON transport
//! - **Content digests**: SHA-256 fingerprints as unique secondary lookup keys
//! - **Race-free transitions**: conditional updates, never double redemption
//! - **Testable**: every store and time source is injected
//!
//! ## Architecture
//!
//! ```text
//! TicketManager::issue
//!   → CredentialIssuer::issue   (signed token)
//!   → ArtifactRenderer::render  (QR code PNG, base64)
//!   → digest                    (SHA-256 hex)
//!   → TicketRepository::create  (one atomic write)
//!
//! TokenVerifier::verify_ticket  (pure: token + key + clock)
//! ```
//!
//! ## Example
//!
//! ```
//! use gatepass_tickets::config::{SigningKey, SigningKeys, TicketingConfig};
//! use gatepass_tickets::mocks::{MockEventRepository, MockTicketRepository, MockUserRepository};
//! use gatepass_tickets::types::{Event, EventId, TicketStatus, User, UserId, UserRole};
//! use gatepass_tickets::{TicketEnvironment, TicketManager};
//!
//! # tokio_test::block_on(async {
//! let organizer = UserId::new();
//! let holder = User {
//!     id: UserId::new(),
//!     name: "Hank".into(),
//!     email: "hank@example.com".into(),
//!     role: UserRole::Buyer,
//! };
//! let event = Event {
//!     id: EventId::new(),
//!     name: "Launch Night".into(),
//!     starts_at: chrono::Utc::now(),
//!     location: "Hall A".into(),
//!     organizer_id: organizer,
//! };
//!
//! let (events, users) = (MockEventRepository::new(), MockUserRepository::new());
//! events.insert(event.clone())?;
//! users.insert(holder.clone())?;
//!
//! let config = TicketingConfig::new(SigningKeys::new(
//!     SigningKey::new("SESSION", "doc-session-secret-0123456789abcdef")?,
//!     SigningKey::new("TICKET", "doc-ticket-secret-0123456789abcdef0")?,
//! )?);
//! let manager = TicketManager::new(
//!     TicketEnvironment::new(events, users, MockTicketRepository::new()),
//!     &config,
//! );
//!
//! let issued = manager.issue(event.id, holder.id).await?;
//! let claims = manager.verify_credential(&issued.token)?;
//! assert_eq!(claims.holder_id, holder.id);
//!
//! assert_eq!(manager.redeem(issued.ticket_id, organizer).await?, TicketStatus::Redeemed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod artifact;
pub mod config;
pub mod constants;
pub mod credential;
pub mod digest;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod providers;
pub mod session;
pub mod types;
pub mod verifier;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

#[cfg(feature = "postgres")]
pub mod stores;

// Re-export main types for convenience
pub use artifact::{Artifact, ArtifactRenderer};
pub use config::TicketingConfig;
pub use credential::{CredentialIssuer, TicketClaims};
pub use environment::TicketEnvironment;
pub use error::{CredentialError, ErrorCategory, RenderError, Result, TicketError};
pub use lifecycle::TicketManager;
pub use session::{SessionAuthenticator, SessionClaims, SessionIssuer};
pub use types::{EventId, IssuedTicket, Ticket, TicketId, TicketStatus, UserId};
pub use verifier::TokenVerifier;
