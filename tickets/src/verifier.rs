//! Token verification.
//!
//! A pure function of the token, the configured key and the current time:
//! the verifier never touches storage, so a verified ticket credential's
//! `status` is the status at issuance. Callers needing the current status
//! must cross-check the ticket record.

use crate::config::SigningKey;
use crate::credential::TicketClaims;
use crate::error::CredentialError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use gatepass_core::environment::Clock;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// Claims that may carry an expiry.
pub trait ExpiringClaims {
    /// Expiration time (Unix timestamp), if any.
    fn expires_at(&self) -> Option<i64>;
}

/// HS256 token verifier bound to one signing key.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    leeway: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    /// Create a verifier for tokens signed with `key`.
    ///
    /// Expiry is checked against `clock`, tolerating `leeway` of skew.
    #[must_use]
    pub fn new(key: &SigningKey, leeway: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is optional and checked against the injected clock below.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(key.as_bytes()),
            validation,
            leeway,
            clock,
        }
    }

    /// Verify structure, signature and expiry; return the embedded claims.
    ///
    /// # Errors
    ///
    /// - [`CredentialError::Malformed`] if the token cannot be parsed
    /// - [`CredentialError::BadSignature`] on signature mismatch or a signing
    ///   method other than HS256
    /// - [`CredentialError::Expired`] if the token carries an expiry that has passed
    pub fn verify<C>(&self, token: &str) -> Result<C, CredentialError>
    where
        C: DeserializeOwned + ExpiringClaims,
    {
        let token = token.trim();
        check_algorithm(token).inspect_err(|error| {
            tracing::debug!(error = %error, "Token rejected");
        })?;

        let data = decode::<C>(token, &self.key, &self.validation).map_err(|e| {
            let error = map_jwt_error(&e);
            tracing::debug!(error = %error, "Token rejected");
            error
        })?;

        if let Some(exp) = data.claims.expires_at() {
            let now = self.clock.now().timestamp();
            if now >= exp.saturating_add(self.leeway.num_seconds()) {
                tracing::debug!(exp, now, "Token expired");
                return Err(CredentialError::Expired);
            }
        }

        Ok(data.claims)
    }

    /// Verify a ticket credential.
    ///
    /// # Errors
    ///
    /// See [`Self::verify`].
    pub fn verify_ticket(&self, token: &str) -> Result<TicketClaims, CredentialError> {
        self.verify(token)
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}

/// Header fields read before signature verification.
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Reject any signing method other than HS256, including names the JWT
/// library has no variant for (`none`, vendor extensions).
fn check_algorithm(token: &str) -> Result<(), CredentialError> {
    let segment = token.split_once('.').map_or(token, |(header, _)| header);
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| CredentialError::malformed(format!("header encoding: {e}")))?;
    let header: RawHeader = serde_json::from_slice(&bytes)
        .map_err(|e| CredentialError::malformed(format!("header: {e}")))?;

    if header.alg == "HS256" {
        Ok(())
    } else {
        Err(CredentialError::BadSignature)
    }
}

fn map_jwt_error(error: &jsonwebtoken::errors::Error) -> CredentialError {
    match error.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => CredentialError::BadSignature,
        ErrorKind::ExpiredSignature => CredentialError::Expired,
        _ => CredentialError::malformed(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::CredentialIssuer;
    use crate::types::{EventId, TicketId, TicketStatus, UserId};
    use gatepass_testing::{MockClock, test_epoch};

    fn key(secret: &str) -> SigningKey {
        SigningKey::new("TEST", secret).unwrap()
    }

    fn pair(ttl: Option<Duration>) -> (CredentialIssuer, TokenVerifier, MockClock) {
        let clock = MockClock::new(test_epoch());
        let key = key("verifier-test-key-0123456789abcdef0123");
        (
            CredentialIssuer::new(&key, ttl, Arc::new(clock.clone())),
            TokenVerifier::new(&key, Duration::zero(), Arc::new(clock.clone())),
            clock,
        )
    }

    #[test]
    fn test_round_trip() {
        let (issuer, verifier, clock) = pair(None);
        let (ticket, event, holder) = (TicketId::new(), EventId::new(), UserId::new());
        let token = issuer.issue(ticket, event, holder, TicketStatus::Issued).unwrap();

        let claims = verifier.verify_ticket(&token).unwrap();
        assert_eq!(claims.ticket_id, ticket);
        assert_eq!(claims.event_id, event);
        assert_eq!(claims.holder_id, holder);
        assert_eq!(claims.status, TicketStatus::Issued);
        assert!(claims.issued_at().unwrap() <= clock.now());
    }

    #[test]
    fn test_credentials_without_expiry_never_expire() {
        let (issuer, verifier, clock) = pair(None);
        let token = issuer
            .issue(TicketId::new(), EventId::new(), UserId::new(), TicketStatus::Issued)
            .unwrap();

        clock.advance(Duration::days(3650));
        assert!(verifier.verify_ticket(&token).is_ok());
    }

    #[test]
    fn test_expiry_against_injected_clock() {
        let (issuer, verifier, clock) = pair(Some(Duration::minutes(10)));
        let token = issuer
            .issue(TicketId::new(), EventId::new(), UserId::new(), TicketStatus::Issued)
            .unwrap();

        clock.advance(Duration::minutes(9));
        assert!(verifier.verify_ticket(&token).is_ok());

        clock.advance(Duration::minutes(1));
        assert_eq!(verifier.verify_ticket(&token), Err(CredentialError::Expired));
    }

    #[test]
    fn test_leeway_extends_expiry() {
        let clock = MockClock::new(test_epoch());
        let key = key("verifier-test-key-0123456789abcdef0123");
        let issuer = CredentialIssuer::new(&key, Some(Duration::minutes(1)), Arc::new(clock.clone()));
        let lenient = TokenVerifier::new(&key, Duration::seconds(30), Arc::new(clock.clone()));

        let token = issuer
            .issue(TicketId::new(), EventId::new(), UserId::new(), TicketStatus::Issued)
            .unwrap();

        clock.advance(Duration::seconds(80));
        assert!(lenient.verify_ticket(&token).is_ok());
        clock.advance(Duration::seconds(10));
        assert_eq!(lenient.verify_ticket(&token), Err(CredentialError::Expired));
    }

    #[test]
    fn test_wrong_key_is_bad_signature() {
        let (issuer, _, clock) = pair(None);
        let other = TokenVerifier::new(
            &key("a-completely-different-key-0123456789ab"),
            Duration::zero(),
            Arc::new(clock),
        );
        let token = issuer
            .issue(TicketId::new(), EventId::new(), UserId::new(), TicketStatus::Issued)
            .unwrap();

        assert_eq!(other.verify_ticket(&token), Err(CredentialError::BadSignature));
    }

    #[test]
    fn test_other_algorithm_is_bad_signature() {
        let (_, verifier, _) = pair(None);
        let claims = TicketClaims {
            ticket_id: TicketId::new(),
            event_id: EventId::new(),
            holder_id: UserId::new(),
            status: TicketStatus::Issued,
            iat: 0,
            exp: None,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(Algorithm::HS512),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"verifier-test-key-0123456789abcdef0123"),
        )
        .unwrap();

        assert_eq!(verifier.verify_ticket(&token), Err(CredentialError::BadSignature));
    }

    #[test]
    fn test_unknown_algorithm_names_are_bad_signature() {
        let (issuer, verifier, _) = pair(None);
        let token = issuer
            .issue(TicketId::new(), EventId::new(), UserId::new(), TicketStatus::Issued)
            .unwrap();
        let (_, rest) = token.split_once('.').unwrap();
        let (payload, signature) = rest.split_once('.').unwrap();

        for alg in ["none", "None", "XS999", "hs256"] {
            let header = URL_SAFE_NO_PAD.encode(format!(r#"{{"alg":"{alg}","typ":"JWT"}}"#));
            for forged in [
                format!("{header}.{payload}."),
                format!("{header}.{payload}.{signature}"),
            ] {
                assert_eq!(
                    verifier.verify_ticket(&forged),
                    Err(CredentialError::BadSignature),
                    "alg {alg:?}"
                );
            }
        }
    }

    #[test]
    fn test_unreadable_header_is_malformed() {
        let (_, verifier, _) = pair(None);
        let no_alg = URL_SAFE_NO_PAD.encode(r#"{"typ":"JWT"}"#);
        let not_json = URL_SAFE_NO_PAD.encode("alg=HS256");

        for header in [no_alg, not_json, "!!!".to_string()] {
            assert!(
                matches!(
                    verifier.verify_ticket(&format!("{header}.e30.sig")),
                    Err(CredentialError::Malformed { .. })
                ),
                "{header:?}"
            );
        }
    }

    #[test]
    fn test_garbage_is_malformed() {
        let (_, verifier, _) = pair(None);
        for token in ["", "not-a-token", "a.b", "a.b.c", "....."] {
            assert!(
                matches!(verifier.verify_ticket(token), Err(CredentialError::Malformed { .. })),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_single_character_tamper_never_verifies() {
        let (issuer, verifier, _) = pair(None);
        let token = issuer
            .issue(TicketId::new(), EventId::new(), UserId::new(), TicketStatus::Issued)
            .unwrap();

        for (i, original) in token.char_indices() {
            let replacement = if original == 'A' { 'B' } else { 'A' };
            let mut tampered = token.clone();
            tampered.replace_range(i..=i, &replacement.to_string());

            match verifier.verify_ticket(&tampered) {
                Err(CredentialError::BadSignature | CredentialError::Malformed { .. }) => {}
                other => panic!("position {i}: unexpected {other:?}"),
            }
        }
    }
}
