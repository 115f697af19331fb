//! Deterministic pseudonyms for identifier fields
//!
//! Identifier-like values (UIDs) cannot be emptied without breaking the links
//! between studies, series and instances, so they are replaced with a dummy
//! derived from a one-way digest of the original. The dummy is a valid UID in the
//! `2.25` arc: the first 128 bits of the SHA-256 digest written in decimal.
//!
//! Two different originals collide only if their digests agree on 128 bits, a
//! probability of about `n² / 2¹²⁹` for `n` distinct values. Negligible, not zero.

use crate::config::SecretString;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

/// Root of UUID-derived UIDs
const UID_ROOT: &str = "2.25.";

/// Session-scoped pseudonym generator
///
/// The first request for a value computes and caches its dummy; later requests
/// are cache hits. Entries are never evicted, so every occurrence of an original
/// within one session maps to the same dummy. Dropping the generator loses that
/// state.
///
/// # Examples
///
/// ```
/// use veil::anonymization::PseudonymGenerator;
///
/// let mut generator = PseudonymGenerator::new();
/// let first = generator.dummy_for(b"1.2.840.99.1");
/// let again = generator.dummy_for(b"1.2.840.99.1");
/// assert_eq!(first, again);
/// assert!(first.starts_with(b"2.25."));
/// ```
#[derive(Debug, Default)]
pub struct PseudonymGenerator {
    salt: Option<SecretString>,
    cache: HashMap<Vec<u8>, Vec<u8>>,
    issued: HashSet<Vec<u8>>,
}

impl PseudonymGenerator {
    /// Unsalted generator; dummies are then also stable across sessions
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator whose digests are keyed with a secret salt
    pub fn with_salt(salt: SecretString) -> Self {
        Self {
            salt: Some(salt),
            ..Self::default()
        }
    }

    /// Whether a salt is configured
    pub fn is_salted(&self) -> bool {
        self.salt.is_some()
    }

    /// Dummy value for `original`.
    ///
    /// Trailing NUL and space padding is ignored, so padded and unpadded copies of
    /// one identifier share a dummy. A value this generator issued earlier in the
    /// session is returned unchanged.
    pub fn dummy_for(&mut self, original: &[u8]) -> Vec<u8> {
        let key = trim_padding(original);

        if self.issued.contains(key) {
            return key.to_vec();
        }
        if let Some(dummy) = self.cache.get(key) {
            return dummy.clone();
        }

        let dummy = self.compute(key);
        self.cache.insert(key.to_vec(), dummy.clone());
        self.issued.insert(dummy.clone());
        dummy
    }

    /// Whether `value` is a dummy issued by this session
    pub fn is_issued(&self, value: &[u8]) -> bool {
        self.issued.contains(trim_padding(value))
    }

    /// Number of cached originals
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn compute(&self, value: &[u8]) -> Vec<u8> {
        let mut hasher = Sha256::new();
        if let Some(salt) = &self.salt {
            hasher.update(salt.expose_secret().as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(value);
        let digest = hasher.finalize();

        let mut head = [0u8; 16];
        head.copy_from_slice(&digest[..16]);
        format!("{UID_ROOT}{}", u128::from_be_bytes(head)).into_bytes()
    }
}

fn trim_padding(value: &[u8]) -> &[u8] {
    let end = value
        .iter()
        .rposition(|b| *b != 0 && *b != b' ')
        .map_or(0, |i| i + 1);
    &value[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use proptest::prelude::*;

    #[test]
    fn test_deterministic_within_session() {
        let mut generator = PseudonymGenerator::new();
        let a = generator.dummy_for(b"1.2.840.X.1");
        let b = generator.dummy_for(b"1.2.840.X.1");
        assert_eq!(a, b);
        assert_eq!(generator.cache_len(), 1);
    }

    #[test]
    fn test_output_is_uid() {
        let mut generator = PseudonymGenerator::new();
        let dummy = String::from_utf8(generator.dummy_for(b"1.2.3")).unwrap();
        assert!(dummy.starts_with("2.25."));
        assert!(dummy.len() <= 44);
        assert!(dummy[5..].chars().all(|c| c.is_ascii_digit()));
        assert!(!dummy.contains("1.2.3"));
    }

    #[test]
    fn test_padding_ignored() {
        let mut generator = PseudonymGenerator::new();
        let padded = generator.dummy_for(b"1.2.3\0");
        let spaced = generator.dummy_for(b"1.2.3 ");
        let plain = generator.dummy_for(b"1.2.3");
        assert_eq!(padded, plain);
        assert_eq!(spaced, plain);
    }

    #[test]
    fn test_issued_dummy_is_stable() {
        let mut generator = PseudonymGenerator::new();
        let dummy = generator.dummy_for(b"1.2.840.X.1");
        assert!(generator.is_issued(&dummy));
        assert_eq!(generator.dummy_for(&dummy), dummy);
    }

    #[test]
    fn test_stable_across_unsalted_sessions() {
        let a = PseudonymGenerator::new().dummy_for(b"1.2.3.4");
        let b = PseudonymGenerator::new().dummy_for(b"1.2.3.4");
        assert_eq!(a, b);
    }

    #[test]
    fn test_salt_changes_output() {
        let plain = PseudonymGenerator::new().dummy_for(b"1.2.3.4");
        let mut salted = PseudonymGenerator::with_salt(secret_string("pepper".to_string()));
        assert!(salted.is_salted());
        let keyed = salted.dummy_for(b"1.2.3.4");
        assert_ne!(plain, keyed);
    }

    #[test]
    fn test_trim_padding_all_padding() {
        assert_eq!(trim_padding(b"\0 \0"), b"");
        assert_eq!(trim_padding(b"a\0b\0"), b"a\0b");
    }

    proptest! {
        #[test]
        fn prop_distinct_inputs_distinct_dummies(
            values in proptest::collection::hash_set(
                proptest::collection::vec(1u8..=255, 1..32),
                1..200,
            )
        ) {
            let mut generator = PseudonymGenerator::new();
            let mut seen = HashMap::new();
            for value in &values {
                // Values differing only in trailing padding share a dummy
                let key = trim_padding(value).to_vec();
                let dummy = generator.dummy_for(value);
                if let Some(previous) = seen.insert(dummy.clone(), key.clone()) {
                    prop_assert_eq!(previous, key);
                }
            }
        }

        #[test]
        fn prop_repeated_calls_agree(value in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut generator = PseudonymGenerator::new();
            let first = generator.dummy_for(&value);
            prop_assert_eq!(generator.dummy_for(&value), first);
        }
    }
}
