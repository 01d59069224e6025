//! Ticket domain types.
//!
//! Identifier newtypes, the closed ticket status enumeration with its
//! transition table, the persisted ticket record and the read-only views of
//! the external event and user entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a ticket.
    TicketId
);

uuid_id!(
    /// Unique identifier for an event (external entity).
    EventId
);

uuid_id!(
    /// Unique identifier for a user: ticket holders and event organizers alike.
    UserId
);

// ═══════════════════════════════════════════════════════════════════════
// Status lifecycle
// ═══════════════════════════════════════════════════════════════════════

/// Ticket status.
///
/// ```text
///            redeem
///   Issued ─────────► Redeemed
///     │
///     │ void
///     ▼
///   Voided
/// ```
///
/// `Redeemed` and `Voided` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Freshly issued, valid for entry.
    #[default]
    Issued,
    /// Used for event entry.
    Redeemed,
    /// Cancelled by the organizer.
    Voided,
}

/// A requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketTransition {
    /// Mark the ticket as used at the gate.
    Redeem,
    /// Cancel the ticket.
    Void,
}

impl TicketStatus {
    /// Storage / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::Redeemed => "redeemed",
            Self::Voided => "voided",
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        match self {
            Self::Issued => false,
            Self::Redeemed | Self::Voided => true,
        }
    }

    /// Status reached by applying `transition`, or `None` if the transition
    /// is not allowed from `self`.
    ///
    /// ```
    /// use gatepass_tickets::types::{TicketStatus, TicketTransition};
    ///
    /// assert_eq!(
    ///     TicketStatus::Issued.apply(TicketTransition::Redeem),
    ///     Some(TicketStatus::Redeemed)
    /// );
    /// assert_eq!(TicketStatus::Redeemed.apply(TicketTransition::Void), None);
    /// ```
    #[must_use]
    pub const fn apply(self, transition: TicketTransition) -> Option<Self> {
        match (self, transition) {
            (Self::Issued, TicketTransition::Redeem) => Some(Self::Redeemed),
            (Self::Issued, TicketTransition::Void) => Some(Self::Voided),
            (Self::Redeemed | Self::Voided, _) => None,
        }
    }
}

impl TicketTransition {
    /// Status the ticket must currently be in for this transition.
    #[must_use]
    pub const fn required_status(self) -> TicketStatus {
        match self {
            Self::Redeem | Self::Void => TicketStatus::Issued,
        }
    }

    /// Lower-case name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Redeem => "redeem",
            Self::Void => "void",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TicketTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognised status or role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// What was being parsed.
    pub kind: &'static str,
    /// The offending input.
    pub value: String,
}

impl FromStr for TicketStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issued" => Ok(Self::Issued),
            "redeemed" => Ok(Self::Redeemed),
            "voided" => Ok(Self::Voided),
            other => Err(UnknownVariant {
                kind: "ticket status",
                value: other.to_string(),
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Records
// ═══════════════════════════════════════════════════════════════════════

/// Persisted ticket record.
///
/// Every field is set once at issuance; only `status` changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identity.
    pub id: TicketId,

    /// Owning event.
    pub event_id: EventId,

    /// Ticket holder.
    pub holder_id: UserId,

    /// Signed credential token. Unique across all tickets.
    pub credential_token: String,

    /// Base64 text of the PNG artifact. Unique across all tickets.
    pub visual_artifact: String,

    /// Hex SHA-256 of the raw PNG bytes. Unique across all tickets.
    pub artifact_digest: String,

    /// Current status.
    pub status: TicketStatus,

    /// Issuance time.
    pub issued_at: DateTime<Utc>,
}

/// Result of a successful issuance, as handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedTicket {
    /// New ticket identity.
    pub ticket_id: TicketId,

    /// Signed credential token.
    pub token: String,

    /// Base64 PNG artifact, safe to embed in a JSON string.
    pub artifact: String,

    /// Always [`TicketStatus::Issued`].
    pub status: TicketStatus,
}

impl From<&Ticket> for IssuedTicket {
    fn from(ticket: &Ticket) -> Self {
        Self {
            ticket_id: ticket.id,
            token: ticket.credential_token.clone(),
            artifact: ticket.visual_artifact.clone(),
            status: ticket.status,
        }
    }
}

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Buys and holds tickets.
    Buyer,
    /// Creates and manages events.
    Organizer,
}

impl UserRole {
    /// Storage / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Organizer => "organizer",
        }
    }
}

impl FromStr for UserRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "organizer" => Ok(Self::Organizer),
            other => Err(UnknownVariant {
                kind: "user role",
                value: other.to_string(),
            }),
        }
    }
}

/// Read-only view of a user account (external entity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identity.
    pub id: UserId,

    /// Display name.
    pub name: String,

    /// Email address.
    pub email: String,

    /// Account role.
    pub role: UserRole,
}

/// Read-only view of an event (external entity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event identity.
    pub id: EventId,

    /// Event name.
    pub name: String,

    /// When the event takes place.
    pub starts_at: DateTime<Utc>,

    /// Venue.
    pub location: String,

    /// User who owns the event and may manage its tickets.
    pub organizer_id: UserId,
}

impl Event {
    /// Whether `actor` may manage this event's tickets.
    #[must_use]
    pub fn is_managed_by(&self, actor: UserId) -> bool {
        self.organizer_id == actor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table_is_exhaustive() {
        use TicketStatus::{Issued, Redeemed, Voided};
        use TicketTransition::{Redeem, Void};

        assert_eq!(Issued.apply(Redeem), Some(Redeemed));
        assert_eq!(Issued.apply(Void), Some(Voided));
        for terminal in [Redeemed, Voided] {
            assert!(terminal.is_terminal());
            assert_eq!(terminal.apply(Redeem), None);
            assert_eq!(terminal.apply(Void), None);
        }
        assert!(!Issued.is_terminal());
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in [TicketStatus::Issued, TicketStatus::Redeemed, TicketStatus::Voided] {
            assert_eq!(status.as_str().parse::<TicketStatus>(), Ok(status));
        }
        assert!("valid".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        let json = serde_json::to_string(&TicketStatus::Redeemed).unwrap();
        assert_eq!(json, "\"redeemed\"");
        assert_eq!(TicketStatus::default(), TicketStatus::Issued);
    }

    #[test]
    fn test_ids_serialize_as_plain_uuid() {
        let id = TicketId::from_uuid(Uuid::from_u128(7));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000007\"");
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000007");
    }

    #[test]
    fn test_event_management_is_organizer_only() {
        let organizer = UserId::new();
        let event = Event {
            id: EventId::new(),
            name: "Launch".to_string(),
            starts_at: Utc::now(),
            location: "Hall A".to_string(),
            organizer_id: organizer,
        };
        assert!(event.is_managed_by(organizer));
        assert!(!event.is_managed_by(UserId::new()));
    }
}
