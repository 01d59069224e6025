//! Ticket credential encoding.
//!
//! A credential is an HS256 JSON Web Token binding ticket, event and holder
//! identity to the status at issuance time. Claims are never edited in place:
//! a status change is reflected only by re-reading the ticket record.

use crate::config::SigningKey;
use crate::error::CredentialError;
use crate::types::{EventId, TicketId, TicketStatus, UserId};
use crate::verifier::ExpiringClaims;
use chrono::{DateTime, Duration, Utc};
use gatepass_core::environment::Clock;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Claims carried by a ticket credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketClaims {
    /// Ticket identity.
    pub ticket_id: TicketId,

    /// Event the ticket admits to.
    pub event_id: EventId,

    /// Ticket holder.
    pub holder_id: UserId,

    /// Status at issuance time.
    pub status: TicketStatus,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp), when the policy sets one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TicketClaims {
    /// Issuance time as a `DateTime`.
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }
}

impl ExpiringClaims for TicketClaims {
    fn expires_at(&self) -> Option<i64> {
        self.exp
    }
}

/// Sign `claims` with HS256.
pub(crate) fn sign_hs256<C: Serialize>(
    claims: &C,
    key: &EncodingKey,
) -> Result<String, CredentialError> {
    encode(&Header::new(Algorithm::HS256), claims, key)
        .map_err(|e| CredentialError::Signing(e.to_string()))
}

/// Issues signed ticket credentials.
#[derive(Clone)]
pub struct CredentialIssuer {
    key: EncodingKey,
    ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl CredentialIssuer {
    /// Create an issuer signing with `key`.
    ///
    /// With `ttl = None` credentials carry no expiry.
    #[must_use]
    pub fn new(key: &SigningKey, ttl: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        Self {
            key: EncodingKey::from_secret(key.as_bytes()),
            ttl,
            clock,
        }
    }

    /// Build and sign the credential for one ticket.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Signing`] only if the key is unusable.
    pub fn issue(
        &self,
        ticket_id: TicketId,
        event_id: EventId,
        holder_id: UserId,
        status: TicketStatus,
    ) -> Result<String, CredentialError> {
        let now = self.clock.now();
        let claims = TicketClaims {
            ticket_id,
            event_id,
            holder_id,
            status,
            iat: now.timestamp(),
            exp: self.ttl.map(|ttl| (now + ttl).timestamp()),
        };

        sign_hs256(&claims, &self.key)
    }
}

impl fmt::Debug for CredentialIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
