//! The catalog's message-id hash.
//!
//! The on-disk lookup table identifies each message by a 64-bit hash of
//! its fully-qualified id. Any future reader of a `.umc` file depends on
//! this being bit-identical across platforms, so it is sourced from
//! `xxhash-rust`'s `xxh3` implementation rather than hand-rolled: swapping
//! the hash function is a breaking change to the wire format.

use xxhash_rust::xxh3::xxh3_64;

/// Computes `XXH3_64bits` over the UTF-8 bytes of a fully-qualified
/// message id.
pub fn hash_id(id: &str) -> u64 {
    xxh3_64(id.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_deterministic() {
        assert_eq!(hash_id("hello"), hash_id("hello"));
    }

    #[test]
    fn distinguishes_similar_ids() {
        assert_ne!(hash_id("ui#ok"), hash_id("ui#cancel"));
    }
}
