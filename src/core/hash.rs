//! State Fingerprints
//!
//! SHA-256 digests over world state. Two worlds that were fed the same
//! input, or a world and a fork of it, produce the same digest.

use sha2::{Digest, Sha256};

use super::vec2::Vec2;

/// 32-byte SHA-256 digest.
pub type StateHash = [u8; 32];

/// Prefix mixed into every world fingerprint.
pub const WORLD_STATE_DOMAIN: &[u8] = b"TEECORE_WORLD_V1";

/// Incremental fingerprint builder.
///
/// Floats go in as raw bits, so `-0.0` and `0.0` differ. The order of
/// updates is part of the digest.
pub struct StateHasher {
    sha: Sha256,
}

impl StateHasher {
    /// Builder seeded with `domain`.
    pub fn new(domain: &[u8]) -> Self {
        let mut sha = Sha256::new();
        sha.update(domain);
        Self { sha }
    }

    /// Builder for [`WORLD_STATE_DOMAIN`].
    pub fn for_world_state() -> Self {
        Self::new(WORLD_STATE_DOMAIN)
    }

    /// One byte.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.sha.update([value]);
    }

    /// Little-endian.
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.sha.update(value.to_le_bytes());
    }

    /// Little-endian.
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.sha.update(value.to_le_bytes());
    }

    /// Raw bits.
    #[inline]
    pub fn update_f32(&mut self, value: f32) {
        self.update_u32(value.to_bits());
    }

    /// `x` then `y`.
    #[inline]
    pub fn update_vec2(&mut self, value: Vec2) {
        self.update_f32(value.x);
        self.update_f32(value.y);
    }

    /// As 0 or 1.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(u8::from(value));
    }

    /// Consume the builder.
    pub fn finalize(self) -> StateHash {
        self.sha.finalize().into()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(f: impl Fn(&mut StateHasher)) -> StateHash {
        let mut h = StateHasher::for_world_state();
        f(&mut h);
        h.finalize()
    }

    #[test]
    fn test_same_updates_same_digest() {
        let feed = |h: &mut StateHasher| {
            h.update_i32(42);
            h.update_vec2(Vec2::new(1.5, -2.0));
        };
        assert_eq!(digest(feed), digest(feed));
    }

    #[test]
    fn test_update_order_matters() {
        let a = digest(|h| {
            h.update_u8(1);
            h.update_u8(2);
        });
        let b = digest(|h| {
            h.update_u8(2);
            h.update_u8(1);
        });
        assert_ne!(a, b);
    }

    #[test]
    fn test_signed_zero_differs() {
        assert_ne!(digest(|h| h.update_f32(0.0)), digest(|h| h.update_f32(-0.0)));
    }

    #[test]
    fn test_domain_changes_digest() {
        let mut a = StateHasher::new(b"A");
        a.update_i32(7);
        let mut b = StateHasher::new(b"B");
        b.update_i32(7);
        assert_ne!(a.finalize(), b.finalize());
    }
}
