//! Ticketing constants.
//!
//! Values shared by configuration, rendering and token handling.

/// Environment variable names read by [`crate::config::TicketingConfig::from_env`].
pub mod env_vars {
    /// Secret for user session tokens.
    pub const SESSION_TOKEN_SECRET: &str = "SESSION_TOKEN_SECRET";

    /// Secret for ticket credential tokens.
    pub const TICKET_CREDENTIAL_SECRET: &str = "TICKET_CREDENTIAL_SECRET";

    /// Optional ticket credential lifetime in seconds.
    pub const TICKET_CREDENTIAL_TTL_SECS: &str = "TICKET_CREDENTIAL_TTL_SECS";

    /// Optional session token lifetime in seconds.
    pub const SESSION_TOKEN_TTL_SECS: &str = "SESSION_TOKEN_TTL_SECS";

    /// Optional clock skew tolerance for expiry checks, in seconds.
    pub const TOKEN_LEEWAY_SECS: &str = "TOKEN_LEEWAY_SECS";

    /// Optional artifact mark colour (`#RRGGBB`).
    pub const ARTIFACT_FOREGROUND: &str = "TICKET_ARTIFACT_FOREGROUND";

    /// Optional artifact background colour (`#RRGGBB`).
    pub const ARTIFACT_BACKGROUND: &str = "TICKET_ARTIFACT_BACKGROUND";

    /// Optional artifact edge length in pixels.
    pub const ARTIFACT_SIZE: &str = "TICKET_ARTIFACT_SIZE";
}

/// Artifact rendering defaults.
pub mod artifact {
    /// Neon mark colour, `#00FFCC`.
    pub const DEFAULT_FOREGROUND: [u8; 4] = [0x00, 0xFF, 0xCC, 0xFF];

    /// Dark background colour, `#0F172A`.
    pub const DEFAULT_BACKGROUND: [u8; 4] = [0x0F, 0x17, 0x2A, 0xFF];

    /// Square edge length of the rendered image.
    pub const DEFAULT_SIZE: u32 = 256;

    /// Light modules surrounding the matrix on each side.
    pub const QUIET_ZONE_MODULES: u32 = 4;

    /// Module width of a version 40 symbol.
    pub const MAX_MATRIX_MODULES: u32 = 177;

    /// Smallest accepted edge length: one pixel per module of the largest
    /// symbol, quiet zone included.
    pub const MIN_SIZE: u32 = MAX_MATRIX_MODULES + 2 * QUIET_ZONE_MODULES;

    /// Luma value of a dark module in the intermediate matrix image.
    pub const DARK_LUMA: u8 = 0;

    /// Luma value of a light module in the intermediate matrix image.
    pub const LIGHT_LUMA: u8 = 255;

    /// Byte-mode capacity of a version 40 symbol at error-correction level M.
    pub const MAX_PAYLOAD_BYTES: usize = 2331;
}

/// Token handling.
pub mod tokens {
    /// Shortest signing secret accepted at startup (256 bits).
    pub const MIN_KEY_BYTES: usize = 32;

    /// Default session lifetime: 24 hours.
    pub const DEFAULT_SESSION_TTL_SECS: i64 = 24 * 60 * 60;

    /// `Authorization` header scheme prefix.
    pub const BEARER_PREFIX: &str = "Bearer ";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette() {
        assert_eq!(artifact::DEFAULT_FOREGROUND, [0, 255, 204, 255]);
        assert_eq!(artifact::DEFAULT_BACKGROUND, [15, 23, 42, 255]);
    }

    #[test]
    fn test_largest_matrix_fits_minimum_size() {
        assert_eq!(artifact::MIN_SIZE, 185);
        assert!(artifact::MIN_SIZE <= artifact::DEFAULT_SIZE);
    }
}
