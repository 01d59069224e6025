//! Ticketing configuration.
//!
//! One configuration object, loaded once at process start, holds a distinct
//! named signing key per token class, the artifact style and the token
//! lifetime policy. Key material is supplied by the environment and never
//! embedded in source.

use crate::constants::{artifact, env_vars, tokens};
use crate::error::ConfigError;
use chrono::Duration;
use std::env;
use std::fmt;
use std::sync::Arc;

/// Symmetric signing secret.
///
/// Cheap to clone; `Debug` never prints the key bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Arc<[u8]>);

impl SigningKey {
    /// Wrap a secret, rejecting anything shorter than
    /// [`tokens::MIN_KEY_BYTES`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WeakKey`] if the secret is too short.
    pub fn new(name: &'static str, secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let secret = secret.as_ref();
        if secret.len() < tokens::MIN_KEY_BYTES {
            return Err(ConfigError::WeakKey {
                name,
                min: tokens::MIN_KEY_BYTES,
            });
        }
        Ok(Self(Arc::from(secret)))
    }

    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey(<{} bytes redacted>)", self.0.len())
    }
}

/// One signing key per token class.
#[derive(Debug, Clone)]
pub struct SigningKeys {
    /// Signs user session tokens.
    pub session: SigningKey,

    /// Signs ticket credential tokens.
    pub ticket_credential: SigningKey,
}

impl SigningKeys {
    /// Pair the two keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SharedKey`] if both classes use the same secret.
    pub fn new(session: SigningKey, ticket_credential: SigningKey) -> Result<Self, ConfigError> {
        if session == ticket_credential {
            return Err(ConfigError::SharedKey);
        }
        Ok(Self {
            session,
            ticket_credential,
        })
    }
}

/// Colours and resolution of the rendered artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactStyle {
    /// RGBA colour of dark modules.
    pub foreground: [u8; 4],

    /// RGBA colour of everything else.
    pub background: [u8; 4],

    /// Edge length of the square image in pixels.
    pub size: u32,
}

impl ArtifactStyle {
    /// Set the mark colour.
    #[must_use]
    pub const fn with_foreground(mut self, rgba: [u8; 4]) -> Self {
        self.foreground = rgba;
        self
    }

    /// Set the background colour.
    #[must_use]
    pub const fn with_background(mut self, rgba: [u8; 4]) -> Self {
        self.background = rgba;
        self
    }

    /// Set the image size.
    #[must_use]
    pub const fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Check the style is renderable and scannable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the size is below
    /// [`artifact::MIN_SIZE`] or both colours are identical.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size < artifact::MIN_SIZE {
            return Err(ConfigError::Invalid {
                name: env_vars::ARTIFACT_SIZE,
                reason: format!("must be at least {}", artifact::MIN_SIZE),
            });
        }
        if self.foreground == self.background {
            return Err(ConfigError::Invalid {
                name: env_vars::ARTIFACT_FOREGROUND,
                reason: "foreground and background colours must differ".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ArtifactStyle {
    fn default() -> Self {
        Self {
            foreground: artifact::DEFAULT_FOREGROUND,
            background: artifact::DEFAULT_BACKGROUND,
            size: artifact::DEFAULT_SIZE,
        }
    }
}

/// Token lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialPolicy {
    /// Lifetime of ticket credentials. `None` issues credentials without `exp`.
    pub ticket_ttl: Option<Duration>,

    /// Lifetime of session tokens.
    ///
    /// Default: 24 hours
    pub session_ttl: Duration,

    /// Tolerated clock skew when checking expiry.
    ///
    /// Default: zero
    pub leeway: Duration,
}

impl CredentialPolicy {
    /// Expire ticket credentials after `ttl`.
    #[must_use]
    pub const fn with_ticket_ttl(mut self, ttl: Duration) -> Self {
        self.ticket_ttl = Some(ttl);
        self
    }

    /// Set session duration.
    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set expiry leeway.
    #[must_use]
    pub const fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            ticket_ttl: None,
            session_ttl: Duration::seconds(tokens::DEFAULT_SESSION_TTL_SECS),
            leeway: Duration::zero(),
        }
    }
}

/// Complete ticketing configuration.
#[derive(Debug, Clone)]
pub struct TicketingConfig {
    /// Signing keys per token class.
    pub keys: SigningKeys,

    /// Artifact rendering style.
    pub style: ArtifactStyle,

    /// Token lifetimes.
    pub policy: CredentialPolicy,
}

impl TicketingConfig {
    /// Configuration with the given keys and default style and policy.
    #[must_use]
    pub fn new(keys: SigningKeys) -> Self {
        Self {
            keys,
            style: ArtifactStyle::default(),
            policy: CredentialPolicy::default(),
        }
    }

    /// Set the artifact style.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the style fails
    /// [`ArtifactStyle::validate`].
    pub fn with_style(mut self, style: ArtifactStyle) -> Result<Self, ConfigError> {
        style.validate()?;
        self.style = style;
        Ok(self)
    }

    /// Set the token policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: CredentialPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// See [`env_vars`] for the recognised names.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a required key is missing, too short,
    /// shared between token classes, or any optional value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let keys = SigningKeys::new(
            SigningKey::new(
                env_vars::SESSION_TOKEN_SECRET,
                required(env_vars::SESSION_TOKEN_SECRET)?,
            )?,
            SigningKey::new(
                env_vars::TICKET_CREDENTIAL_SECRET,
                required(env_vars::TICKET_CREDENTIAL_SECRET)?,
            )?,
        )?;

        let mut style = ArtifactStyle::default();
        if let Some(value) = lookup(env_vars::ARTIFACT_FOREGROUND) {
            style.foreground = parse_hex_color(env_vars::ARTIFACT_FOREGROUND, &value)?;
        }
        if let Some(value) = lookup(env_vars::ARTIFACT_BACKGROUND) {
            style.background = parse_hex_color(env_vars::ARTIFACT_BACKGROUND, &value)?;
        }
        if let Some(value) = lookup(env_vars::ARTIFACT_SIZE) {
            style.size = parse_number(env_vars::ARTIFACT_SIZE, &value)?;
        }
        style.validate()?;

        let mut policy = CredentialPolicy::default();
        if let Some(value) = lookup(env_vars::TICKET_CREDENTIAL_TTL_SECS) {
            policy.ticket_ttl = Some(parse_seconds(env_vars::TICKET_CREDENTIAL_TTL_SECS, &value)?);
        }
        if let Some(value) = lookup(env_vars::SESSION_TOKEN_TTL_SECS) {
            policy.session_ttl = parse_seconds(env_vars::SESSION_TOKEN_TTL_SECS, &value)?;
        }
        if let Some(value) = lookup(env_vars::TOKEN_LEEWAY_SECS) {
            policy.leeway = parse_seconds(env_vars::TOKEN_LEEWAY_SECS, &value)?;
        }

        Ok(Self { keys, style, policy })
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        reason: format!("expected a non-negative integer, got {value:?}"),
    })
}

fn parse_seconds(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let secs: u32 = parse_number(name, value)?;
    Ok(Duration::seconds(i64::from(secs)))
}

/// Parse `#RRGGBB` (leading `#` optional) into an opaque RGBA colour.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for anything that is not six hex digits.
///
/// # Examples
///
/// ```
/// use gatepass_tickets::config::parse_hex_color;
///
/// assert_eq!(parse_hex_color("X", "#00FFCC").unwrap(), [0x00, 0xFF, 0xCC, 0xFF]);
/// assert!(parse_hex_color("X", "#00FFC").is_err());
/// ```
pub fn parse_hex_color(name: &'static str, value: &str) -> Result<[u8; 4], ConfigError> {
    let digits = value.trim().trim_start_matches('#');
    let invalid = || ConfigError::Invalid {
        name,
        reason: format!("expected #RRGGBB, got {value:?}"),
    };

    let bytes = hex::decode(digits).map_err(|_| invalid())?;
    match bytes.as_slice() {
        [r, g, b] => Ok([*r, *g, *b, 0xFF]),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SESSION: &str = "session-secret-0123456789abcdef0123456789";
    const TICKET: &str = "ticket-secret-0123456789abcdef01234567890";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_with_defaults() {
        let config = TicketingConfig::from_lookup(lookup(&[
            (env_vars::SESSION_TOKEN_SECRET, SESSION),
            (env_vars::TICKET_CREDENTIAL_SECRET, TICKET),
        ]))
        .unwrap();

        assert_eq!(config.keys.session.as_bytes(), SESSION.as_bytes());
        assert_eq!(config.keys.ticket_credential.as_bytes(), TICKET.as_bytes());
        assert_eq!(config.style, ArtifactStyle::default());
        assert_eq!(config.policy.ticket_ttl, None);
        assert_eq!(config.policy.session_ttl, Duration::hours(24));
    }

    #[test]
    fn test_from_lookup_with_overrides() {
        let config = TicketingConfig::from_lookup(lookup(&[
            (env_vars::SESSION_TOKEN_SECRET, SESSION),
            (env_vars::TICKET_CREDENTIAL_SECRET, TICKET),
            (env_vars::ARTIFACT_FOREGROUND, "#000000"),
            (env_vars::ARTIFACT_BACKGROUND, "ffffff"),
            (env_vars::ARTIFACT_SIZE, "512"),
            (env_vars::TICKET_CREDENTIAL_TTL_SECS, "3600"),
            (env_vars::TOKEN_LEEWAY_SECS, "30"),
        ]))
        .unwrap();

        assert_eq!(config.style.foreground, [0, 0, 0, 255]);
        assert_eq!(config.style.background, [255, 255, 255, 255]);
        assert_eq!(config.style.size, 512);
        assert_eq!(config.policy.ticket_ttl, Some(Duration::hours(1)));
        assert_eq!(config.policy.leeway, Duration::seconds(30));
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let err = TicketingConfig::from_lookup(lookup(&[(env_vars::SESSION_TOKEN_SECRET, SESSION)]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing(env_vars::TICKET_CREDENTIAL_SECRET));
    }

    #[test]
    fn test_short_key_rejected() {
        let err = TicketingConfig::from_lookup(lookup(&[
            (env_vars::SESSION_TOKEN_SECRET, SESSION),
            (env_vars::TICKET_CREDENTIAL_SECRET, "869687084"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::WeakKey { name, .. } if name == env_vars::TICKET_CREDENTIAL_SECRET));
    }

    #[test]
    fn test_shared_key_rejected() {
        let err = TicketingConfig::from_lookup(lookup(&[
            (env_vars::SESSION_TOKEN_SECRET, SESSION),
            (env_vars::TICKET_CREDENTIAL_SECRET, SESSION),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::SharedKey);
    }

    #[test]
    fn test_invalid_style_rejected() {
        let err = TicketingConfig::from_lookup(lookup(&[
            (env_vars::SESSION_TOKEN_SECRET, SESSION),
            (env_vars::TICKET_CREDENTIAL_SECRET, TICKET),
            (env_vars::ARTIFACT_SIZE, "16"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == env_vars::ARTIFACT_SIZE));

        let same = ArtifactStyle::default().with_foreground(artifact::DEFAULT_BACKGROUND);
        assert!(same.validate().is_err());
    }

    #[test]
    fn test_size_below_largest_symbol_rejected() {
        let keys = || {
            SigningKeys::new(
                SigningKey::new("S", SESSION).unwrap(),
                SigningKey::new("T", TICKET).unwrap(),
            )
            .unwrap()
        };

        for size in [64, artifact::MIN_SIZE - 1] {
            let style = ArtifactStyle::default().with_size(size);
            assert!(style.validate().is_err(), "size {size}");
            assert!(TicketingConfig::new(keys()).with_style(style).is_err());
        }

        let smallest = ArtifactStyle::default().with_size(artifact::MIN_SIZE);
        let config = TicketingConfig::new(keys()).with_style(smallest).unwrap();
        assert_eq!(config.style.size, artifact::MIN_SIZE);

        let err = TicketingConfig::from_lookup(lookup(&[
            (env_vars::SESSION_TOKEN_SECRET, SESSION),
            (env_vars::TICKET_CREDENTIAL_SECRET, TICKET),
            (env_vars::ARTIFACT_SIZE, "64"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == env_vars::ARTIFACT_SIZE));
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let key = SigningKey::new("K", TICKET).unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("ticket-secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_policy_builder() {
        let policy = CredentialPolicy::default()
            .with_ticket_ttl(Duration::minutes(15))
            .with_session_ttl(Duration::hours(2))
            .with_leeway(Duration::seconds(5));

        assert_eq!(policy.ticket_ttl, Some(Duration::minutes(15)));
        assert_eq!(policy.session_ttl, Duration::hours(2));
        assert_eq!(policy.leeway, Duration::seconds(5));
    }
}
