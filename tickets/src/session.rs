//! User session tokens.
//!
//! Sessions are HS256 tokens signed with the session key, which is never the
//! ticket credential key: a ticket credential presented as a session (or the
//! reverse) fails signature verification.

use crate::config::{SigningKey, TicketingConfig};
use crate::constants::tokens::BEARER_PREFIX;
use crate::credential::sign_hs256;
use crate::error::{CredentialError, Result, TicketError};
use crate::providers::UserRepository;
use crate::types::{User, UserId, UserRole};
use crate::verifier::{ExpiringClaims, TokenVerifier};
use chrono::Duration;
use gatepass_core::environment::Clock;
use jsonwebtoken::EncodingKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID).
    pub sub: UserId,

    /// Display name at login.
    pub name: String,

    /// Role at login.
    pub role: UserRole,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl ExpiringClaims for SessionClaims {
    fn expires_at(&self) -> Option<i64> {
        Some(self.exp)
    }
}

/// Issues session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    key: EncodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionIssuer {
    /// Create an issuer signing with `key`; tokens expire after `ttl`.
    #[must_use]
    pub fn new(key: &SigningKey, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            key: EncodingKey::from_secret(key.as_bytes()),
            ttl,
            clock,
        }
    }

    /// Issuer for the configured session key and lifetime.
    #[must_use]
    pub fn from_config(config: &TicketingConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(&config.keys.session, config.policy.session_ttl, clock)
    }

    /// Issue a session token for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Signing`] only if the key is unusable.
    pub fn issue(&self, user: &User) -> std::result::Result<String, CredentialError> {
        let now = self.clock.now();
        let claims = SessionClaims {
            sub: user.id,
            name: user.name.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        tracing::debug!(user_id = %user.id, "Issuing session token");
        sign_hs256(&claims, &self.key)
    }
}

impl fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Resolves an `Authorization` header to the user it was issued for.
#[derive(Debug, Clone)]
pub struct SessionAuthenticator<U> {
    verifier: TokenVerifier,
    users: U,
}

impl<U: UserRepository> SessionAuthenticator<U> {
    /// Authenticator verifying with `key` and looking subjects up in `users`.
    #[must_use]
    pub fn new(key: &SigningKey, leeway: Duration, clock: Arc<dyn Clock>, users: U) -> Self {
        Self {
            verifier: TokenVerifier::new(key, leeway, clock),
            users,
        }
    }

    /// Authenticator for the configured session key and leeway.
    #[must_use]
    pub fn from_config(config: &TicketingConfig, clock: Arc<dyn Clock>, users: U) -> Self {
        Self::new(&config.keys.session, config.policy.leeway, clock, users)
    }

    /// Verify a bearer header and load the current user record.
    ///
    /// The returned user reflects storage, not the claims: a role change
    /// after login is visible immediately.
    ///
    /// # Errors
    ///
    /// - [`TicketError::MissingBearer`] if the header is not `Bearer <token>`
    /// - [`TicketError::Credential`] if the token fails verification
    /// - [`TicketError::UserNotFound`] if the subject no longer exists
    pub async fn authenticate(&self, header: &str) -> Result<User> {
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(TicketError::MissingBearer)?;

        let claims: SessionClaims = self.verifier.verify(token)?;

        let user = self
            .users
            .find_user(claims.sub)
            .await?
            .ok_or(TicketError::UserNotFound(claims.sub))?;

        tracing::debug!(user_id = %user.id, "Session authenticated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::CredentialIssuer;
    use crate::mocks::MockUserRepository;
    use crate::types::{EventId, TicketId, TicketStatus};
    use gatepass_testing::{MockClock, test_epoch};

    const SESSION: &str = "session-test-key-0123456789abcdef012345";
    const TICKET: &str = "ticket-test-key-0123456789abcdef01234567";

    fn alice() -> User {
        User {
            id: UserId::new(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role: UserRole::Buyer,
        }
    }

    fn setup(users: MockUserRepository) -> (SessionIssuer, SessionAuthenticator<MockUserRepository>, MockClock) {
        let clock = MockClock::new(test_epoch());
        let key = SigningKey::new("SESSION", SESSION).unwrap();
        (
            SessionIssuer::new(&key, Duration::hours(24), Arc::new(clock.clone())),
            SessionAuthenticator::new(&key, Duration::zero(), Arc::new(clock.clone()), users),
            clock,
        )
    }

    #[tokio::test]
    async fn test_authenticate_round_trip() {
        let users = MockUserRepository::new();
        let user = alice();
        users.insert(user.clone()).unwrap();
        let (issuer, auth, _) = setup(users);

        let token = issuer.issue(&user).unwrap();
        let found = auth.authenticate(&format!("Bearer {token}")).await.unwrap();
        assert_eq!(found, user);
    }

    #[tokio::test]
    async fn test_missing_or_wrong_scheme() {
        let (_, auth, _) = setup(MockUserRepository::new());
        for header in ["", "Bearer", "Bearer   ", "Basic abc", "bearer abc"] {
            assert_eq!(
                auth.authenticate(header).await,
                Err(TicketError::MissingBearer),
                "{header:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_subject() {
        let user = alice();
        let (issuer, auth, _) = setup(MockUserRepository::new());
        let token = issuer.issue(&user).unwrap();

        assert_eq!(
            auth.authenticate(&format!("Bearer {token}")).await,
            Err(TicketError::UserNotFound(user.id))
        );
    }

    #[tokio::test]
    async fn test_session_expires_after_ttl() {
        let users = MockUserRepository::new();
        let user = alice();
        users.insert(user.clone()).unwrap();
        let (issuer, auth, clock) = setup(users);
        let header = format!("Bearer {}", issuer.issue(&user).unwrap());

        clock.advance(Duration::hours(24));
        assert_eq!(
            auth.authenticate(&header).await,
            Err(TicketError::Credential(CredentialError::Expired))
        );
    }

    #[tokio::test]
    async fn test_ticket_credential_is_not_a_session() {
        let users = MockUserRepository::new();
        let user = alice();
        users.insert(user.clone()).unwrap();
        let (_, auth, clock) = setup(users);

        let ticket_key = SigningKey::new("TICKET", TICKET).unwrap();
        let credential = CredentialIssuer::new(&ticket_key, None, Arc::new(clock))
            .issue(TicketId::new(), EventId::new(), user.id, TicketStatus::Issued)
            .unwrap();

        assert_eq!(
            auth.authenticate(&format!("Bearer {credential}")).await,
            Err(TicketError::Credential(CredentialError::BadSignature))
        );
    }

    #[test]
    fn test_session_is_not_a_ticket_credential() {
        let clock = Arc::new(gatepass_testing::test_clock());
        let session_key = SigningKey::new("SESSION", SESSION).unwrap();
        let ticket_key = SigningKey::new("TICKET", TICKET).unwrap();

        let session = SessionIssuer::new(&session_key, Duration::hours(1), clock.clone())
            .issue(&alice())
            .unwrap();
        let verifier = TokenVerifier::new(&ticket_key, Duration::zero(), clock);

        assert_eq!(verifier.verify_ticket(&session), Err(CredentialError::BadSignature));
    }
}
