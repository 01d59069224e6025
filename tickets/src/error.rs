//! Error types for ticket issuance, verification and lifecycle operations.

use crate::types::{EventId, TicketId, TicketStatus, TicketTransition, UserId};
use thiserror::Error;

/// Result type alias for ticket operations.
pub type Result<T> = std::result::Result<T, TicketError>;

/// Broad classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad input: invalid identifiers, oversized payloads, unreadable tokens.
    Validation,
    /// A referenced event, user or ticket does not exist.
    NotFound,
    /// Uniqueness collision or a lost status race. Safe to retry with fresh input.
    Conflict,
    /// The actor may not perform the operation.
    Authorization,
    /// Process misconfiguration. Fatal at startup.
    Configuration,
    /// Storage or other infrastructure failure.
    Internal,
}

/// Failures of credential (or session) token verification.
///
/// None of these are fatal; the caller decides the user-facing response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// Token could not be parsed.
    #[error("Malformed token: {reason}")]
    Malformed {
        /// What was wrong with it.
        reason: String,
    },

    /// Signature mismatch or unsupported signing method.
    #[error("Bad token signature")]
    BadSignature,

    /// Token carries an expiry that has passed.
    #[error("Token has expired")]
    Expired,

    /// Token could not be signed. Only happens with a broken key.
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl CredentialError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// Failures of the visual artifact renderer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Payload exceeds the matrix capacity at the configured error-correction level.
    #[error("Payload of {len} bytes exceeds QR capacity")]
    PayloadTooLarge {
        /// Payload length in bytes.
        len: usize,
    },

    /// Matrix (with quiet zone) is wider than the target resolution.
    #[error("QR matrix of {modules} modules does not fit in {size}x{size} pixels")]
    ResolutionTooSmall {
        /// Matrix width including quiet zone.
        modules: u32,
        /// Target square size in pixels.
        size: u32,
    },

    /// Matrix could not be built for a reason other than capacity.
    #[error("QR encoding failed: {0}")]
    Encoding(String),

    /// PNG serialization failed.
    #[error("PNG encoding failed: {0}")]
    Image(String),
}

/// Configuration errors. Raised once, at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable is not set.
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    /// Value present but unusable.
    #[error("Invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Signing key shorter than the minimum length.
    #[error("Signing key {name} must be at least {min} bytes")]
    WeakKey {
        /// Variable name.
        name: &'static str,
        /// Minimum length in bytes.
        min: usize,
    },

    /// The same secret was configured for two token classes.
    #[error("Session and ticket credential keys must differ")]
    SharedKey,
}

/// Ticket subsystem error taxonomy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicketError {
    // ═══════════════════════════════════════════════════════════
    // Not Found
    // ═══════════════════════════════════════════════════════════

    /// Referenced event does not exist.
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    /// Referenced holder does not exist.
    #[error("Holder not found: {0}")]
    HolderNotFound(UserId),

    /// Referenced user (session subject) does not exist.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Referenced ticket does not exist.
    #[error("Ticket not found: {0}")]
    TicketNotFound(TicketId),

    // ═══════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════

    /// Transition not allowed from the ticket's current status.
    #[error("Cannot {transition} a ticket that is {from}")]
    InvalidTransition {
        /// Status the ticket was found in.
        from: TicketStatus,
        /// Requested transition.
        transition: TicketTransition,
    },

    /// Credential token or artifact digest collides with an existing ticket.
    #[error("Ticket {field} already exists")]
    PersistenceConflict {
        /// Which unique field collided.
        field: &'static str,
    },

    // ═══════════════════════════════════════════════════════════
    // Authorization
    // ═══════════════════════════════════════════════════════════

    /// Actor is not the event's organizer.
    #[error("User {actor} is not authorized to manage this event")]
    Unauthorized {
        /// Acting user.
        actor: UserId,
    },

    /// Presented credential verifies but is not the one stored for its ticket.
    #[error("Credential does not match ticket {0}")]
    CredentialMismatch(TicketId),

    /// Authorization header missing or not a bearer token.
    #[error("Authorization header missing or malformed")]
    MissingBearer,

    // ═══════════════════════════════════════════════════════════
    // Component failures
    // ═══════════════════════════════════════════════════════════

    /// Token verification or signing failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Artifact rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Storage operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TicketError {
    /// Classify this error.
    ///
    /// # Examples
    ///
    /// ```
    /// # use gatepass_tickets::error::{ErrorCategory, TicketError};
    /// assert_eq!(
    ///     TicketError::PersistenceConflict { field: "credential_token" }.category(),
    ///     ErrorCategory::Conflict
    /// );
    /// ```
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::EventNotFound(_)
            | Self::HolderNotFound(_)
            | Self::UserNotFound(_)
            | Self::TicketNotFound(_) => ErrorCategory::NotFound,
            Self::InvalidTransition { .. } | Self::PersistenceConflict { .. } => {
                ErrorCategory::Conflict
            }
            Self::Unauthorized { .. } | Self::CredentialMismatch(_) | Self::MissingBearer => {
                ErrorCategory::Authorization
            }
            Self::Credential(CredentialError::Signing(_)) => ErrorCategory::Configuration,
            Self::Credential(_) | Self::Render(RenderError::PayloadTooLarge { .. }) => {
                ErrorCategory::Validation
            }
            Self::Render(_) | Self::DatabaseError(_) | Self::Internal(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Returns `true` if issuing again with a fresh identity could succeed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use gatepass_tickets::error::TicketError;
    /// assert!(TicketError::PersistenceConflict { field: "artifact_digest" }.is_retryable_conflict());
    /// assert!(!TicketError::MissingBearer.is_retryable_conflict());
    /// ```
    #[must_use]
    pub const fn is_retryable_conflict(&self) -> bool {
        matches!(self, Self::PersistenceConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_follow_taxonomy() {
        let ticket = TicketId::new();
        assert_eq!(TicketError::TicketNotFound(ticket).category(), ErrorCategory::NotFound);
        assert_eq!(
            TicketError::InvalidTransition {
                from: TicketStatus::Redeemed,
                transition: TicketTransition::Redeem,
            }
            .category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            TicketError::Unauthorized { actor: UserId::new() }.category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            TicketError::from(CredentialError::Expired).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            TicketError::from(RenderError::PayloadTooLarge { len: 9000 }).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            TicketError::from(CredentialError::Signing("bad key".into())).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            TicketError::DatabaseError("down".into()).category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = TicketError::InvalidTransition {
            from: TicketStatus::Voided,
            transition: TicketTransition::Redeem,
        };
        assert_eq!(err.to_string(), "Cannot redeem a ticket that is voided");
    }

    #[test]
    fn test_credential_errors_are_transparent() {
        let err = TicketError::from(CredentialError::BadSignature);
        assert_eq!(err.to_string(), "Bad token signature");
    }
}
