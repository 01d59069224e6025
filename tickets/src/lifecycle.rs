//! Ticket lifecycle manager.
//!
//! Issues tickets (credential, artifact, digest, record) and governs their
//! status transitions:
//!
//! ```text
//!            redeem
//!   issued ─────────► redeemed
//!      │
//!      │ void
//!      ▼
//!   voided
//! ```
//!
//! Every transition is gated on the owning event's organizer and is written
//! with a conditional update keyed on the expected prior status, so concurrent
//! attempts on one ticket produce exactly one winner.

use crate::artifact::ArtifactRenderer;
use crate::config::TicketingConfig;
use crate::credential::{CredentialIssuer, TicketClaims};
use crate::digest::digest;
use crate::environment::TicketEnvironment;
use crate::error::{CredentialError, Result, TicketError};
use crate::providers::{EventRepository, StatusUpdate, TicketRepository, UserRepository};
use crate::types::{
    Event, EventId, IssuedTicket, Ticket, TicketId, TicketStatus, TicketTransition, UserId,
};
use crate::verifier::TokenVerifier;
use tracing::{debug, info, warn};

/// Orchestrates issuance and status transitions.
#[derive(Clone)]
pub struct TicketManager<E, U, T>
where
    E: EventRepository,
    U: UserRepository,
    T: TicketRepository,
{
    env: TicketEnvironment<E, U, T>,
    issuer: CredentialIssuer,
    verifier: TokenVerifier,
    renderer: ArtifactRenderer,
}

impl<E, U, T> TicketManager<E, U, T>
where
    E: EventRepository,
    U: UserRepository,
    T: TicketRepository,
{
    /// Build a manager over `env`, signing and verifying with the ticket
    /// credential key from `config`.
    #[must_use]
    pub fn new(env: TicketEnvironment<E, U, T>, config: &TicketingConfig) -> Self {
        let key = &config.keys.ticket_credential;
        let issuer = CredentialIssuer::new(key, config.policy.ticket_ttl, env.clock.clone());
        let verifier = TokenVerifier::new(key, config.policy.leeway, env.clock.clone());

        Self {
            env,
            issuer,
            verifier,
            renderer: ArtifactRenderer::new(config.style),
        }
    }

    /// Injected dependencies.
    #[must_use]
    pub const fn environment(&self) -> &TicketEnvironment<E, U, T> {
        &self.env
    }

    /// Issue a ticket for `holder_id` to `event_id`.
    ///
    /// The record is persisted in one atomic write; on any failure nothing
    /// is stored.
    ///
    /// # Errors
    ///
    /// - [`TicketError::EventNotFound`] / [`TicketError::HolderNotFound`] if
    ///   either reference is absent
    /// - [`TicketError::PersistenceConflict`] if the token or digest collides
    ///   with an existing ticket; retrying issues a fresh identity
    /// - [`TicketError::Render`] if the credential does not fit the artifact
    /// - [`TicketError::DatabaseError`] on storage failure
    pub async fn issue(&self, event_id: EventId, holder_id: UserId) -> Result<IssuedTicket> {
        self.env
            .events
            .find_event(event_id)
            .await?
            .ok_or(TicketError::EventNotFound(event_id))?;
        self.env
            .users
            .find_user(holder_id)
            .await?
            .ok_or(TicketError::HolderNotFound(holder_id))?;

        let ticket_id = TicketId::from_uuid(self.env.ids.next_id());
        let token = self
            .issuer
            .issue(ticket_id, event_id, holder_id, TicketStatus::Issued)?;
        let artifact = self.renderer.render(&token)?;

        let ticket = Ticket {
            id: ticket_id,
            event_id,
            holder_id,
            artifact_digest: digest(&artifact.png),
            credential_token: token,
            visual_artifact: artifact.encoded,
            status: TicketStatus::Issued,
            issued_at: self.env.clock.now(),
        };

        if let Err(e) = self.env.tickets.create(&ticket).await {
            warn!(
                ticket_id = %ticket_id,
                event_id = %event_id,
                error = %e,
                "Ticket issuance failed to persist"
            );
            return Err(e);
        }

        info!(
            ticket_id = %ticket_id,
            event_id = %event_id,
            holder_id = %holder_id,
            digest = %ticket.artifact_digest,
            "Ticket issued"
        );

        Ok(IssuedTicket::from(&ticket))
    }

    /// Mark a ticket as used for entry.
    ///
    /// # Errors
    ///
    /// - [`TicketError::TicketNotFound`] if the ticket does not exist
    /// - [`TicketError::Unauthorized`] if `actor_id` is not the event's
    ///   organizer, whatever the ticket's status
    /// - [`TicketError::InvalidTransition`] if the ticket is not `issued`,
    ///   including when a concurrent transition won the race
    pub async fn redeem(&self, ticket_id: TicketId, actor_id: UserId) -> Result<TicketStatus> {
        self.transition(ticket_id, actor_id, TicketTransition::Redeem)
            .await
    }

    /// Cancel a ticket.
    ///
    /// # Errors
    ///
    /// Same as [`Self::redeem`].
    pub async fn void(&self, ticket_id: TicketId, actor_id: UserId) -> Result<TicketStatus> {
        self.transition(ticket_id, actor_id, TicketTransition::Void)
            .await
    }

    /// Verify a presented ticket credential.
    ///
    /// Pure: no storage is consulted, so the returned `status` is the status
    /// at issuance. Use [`Self::ticket_status`] for the current one.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Malformed`], [`CredentialError::BadSignature`]
    /// or [`CredentialError::Expired`].
    pub fn verify_credential(
        &self,
        token: &str,
    ) -> std::result::Result<TicketClaims, CredentialError> {
        self.verifier.verify_ticket(token)
    }

    /// Redeem the ticket a scanned credential belongs to.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Credential`] if the token fails verification
    /// - [`TicketError::CredentialMismatch`] if the token verifies but is not
    ///   the credential stored for its ticket
    /// - Anything [`Self::redeem`] returns
    pub async fn redeem_credential(&self, token: &str, actor_id: UserId) -> Result<TicketStatus> {
        let token = token.trim();
        let claims = self.verify_credential(token)?;
        let ticket = self.load(claims.ticket_id).await?;

        if ticket.credential_token != token {
            warn!(ticket_id = %ticket.id, "Presented credential does not match stored credential");
            return Err(TicketError::CredentialMismatch(ticket.id));
        }

        self.apply(ticket, actor_id, TicketTransition::Redeem).await
    }

    /// Current persisted status of a ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::TicketNotFound`] if the ticket does not exist.
    pub async fn ticket_status(&self, ticket_id: TicketId) -> Result<TicketStatus> {
        Ok(self.load(ticket_id).await?.status)
    }

    /// Tickets held by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    pub async fn tickets_for_holder(&self, holder_id: UserId) -> Result<Vec<Ticket>> {
        self.env.tickets.list_by_holder(holder_id).await
    }

    /// Tickets for an event, visible to its organizer only.
    ///
    /// # Errors
    ///
    /// - [`TicketError::EventNotFound`] if the event does not exist
    /// - [`TicketError::Unauthorized`] if `actor_id` is not the organizer
    pub async fn tickets_for_event(
        &self,
        event_id: EventId,
        actor_id: UserId,
    ) -> Result<Vec<Ticket>> {
        self.managed_event(event_id, actor_id).await?;
        self.env.tickets.list_by_event(event_id).await
    }

    /// Look a ticket up by its artifact digest.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    pub async fn find_by_digest(&self, digest: &str) -> Result<Option<Ticket>> {
        self.env.tickets.find_by_digest(digest).await
    }

    /// Delete an event and, first, every ticket it owns.
    ///
    /// The two deletes are separate writes, not one transaction. If the
    /// ticket delete fails the event and its tickets are untouched; if the
    /// event delete fails after it, calling again completes the removal. The
    /// PostgreSQL schema cascades the event delete to tickets as well.
    ///
    /// # Returns
    ///
    /// Number of tickets deleted.
    ///
    /// # Errors
    ///
    /// - [`TicketError::EventNotFound`] if the event does not exist
    /// - [`TicketError::Unauthorized`] if `actor_id` is not the organizer
    pub async fn delete_event(&self, event_id: EventId, actor_id: UserId) -> Result<u64> {
        self.managed_event(event_id, actor_id).await?;

        let removed = self.env.tickets.delete_for_event(event_id).await?;
        if !self.env.events.delete_event(event_id).await? {
            return Err(TicketError::EventNotFound(event_id));
        }

        info!(event_id = %event_id, tickets_removed = removed, "Event deleted with its tickets");
        Ok(removed)
    }

    async fn load(&self, ticket_id: TicketId) -> Result<Ticket> {
        self.env
            .tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or(TicketError::TicketNotFound(ticket_id))
    }

    async fn managed_event(&self, event_id: EventId, actor_id: UserId) -> Result<Event> {
        let event = self
            .env
            .events
            .find_event(event_id)
            .await?
            .ok_or(TicketError::EventNotFound(event_id))?;

        if !event.is_managed_by(actor_id) {
            warn!(event_id = %event_id, actor_id = %actor_id, "Actor is not the event organizer");
            return Err(TicketError::Unauthorized { actor: actor_id });
        }

        Ok(event)
    }

    async fn transition(
        &self,
        ticket_id: TicketId,
        actor_id: UserId,
        transition: TicketTransition,
    ) -> Result<TicketStatus> {
        let ticket = self.load(ticket_id).await?;
        self.apply(ticket, actor_id, transition).await
    }

    /// Authorization, then the transition table, then the conditional write.
    async fn apply(
        &self,
        ticket: Ticket,
        actor_id: UserId,
        transition: TicketTransition,
    ) -> Result<TicketStatus> {
        self.managed_event(ticket.event_id, actor_id).await?;

        let invalid = |from: TicketStatus| {
            debug!(ticket_id = %ticket.id, %from, %transition, "Transition rejected");
            TicketError::InvalidTransition { from, transition }
        };

        let target = ticket
            .status
            .apply(transition)
            .ok_or_else(|| invalid(ticket.status))?;

        match self
            .env
            .tickets
            .update_status_if(ticket.id, transition.required_status(), target)
            .await?
        {
            StatusUpdate::Applied(updated) => {
                info!(
                    ticket_id = %updated.id,
                    actor_id = %actor_id,
                    status = %updated.status,
                    "Ticket {transition} applied"
                );
                Ok(updated.status)
            }
            StatusUpdate::Stale { current } => Err(invalid(current)),
            StatusUpdate::Missing => Err(TicketError::TicketNotFound(ticket.id)),
        }
    }
}
