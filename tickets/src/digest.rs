//! Artifact content digest.
//!
//! A fixed-width fingerprint of the raw artifact bytes, used as a unique
//! secondary lookup key. It is an index, not an authenticity check; the
//! credential signature is that boundary.

use sha2::{Digest, Sha256};

/// Length of every digest string.
pub const DIGEST_HEX_LEN: usize = 64;

/// Lower-case hex SHA-256 of `bytes`.
///
/// # Examples
///
/// ```
/// use gatepass_tickets::digest::{digest, DIGEST_HEX_LEN};
///
/// let d = digest(b"artifact");
/// assert_eq!(d.len(), DIGEST_HEX_LEN);
/// assert_eq!(d, digest(b"artifact"));
/// ```
#[must_use]
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Whether `value` has the shape of a digest produced by [`digest`].
#[must_use]
pub fn is_digest(value: &str) -> bool {
    value.len() == DIGEST_HEX_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        assert_eq!(
            digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fixed_width_regardless_of_input() {
        for len in [0, 1, 63, 64, 10_000] {
            let d = digest(&vec![0xAB; len]);
            assert_eq!(d.len(), DIGEST_HEX_LEN);
            assert!(is_digest(&d));
        }
    }

    #[test]
    fn test_single_byte_change_changes_digest() {
        assert_ne!(digest(b"artifact-1"), digest(b"artifact-2"));
    }

    #[test]
    fn test_is_digest_rejects_other_shapes() {
        assert!(!is_digest("abc"));
        assert!(!is_digest(&"G".repeat(DIGEST_HEX_LEN)));
        assert!(!is_digest(&"A".repeat(DIGEST_HEX_LEN)));
    }
}
