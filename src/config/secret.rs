//! Pseudonym salt handling
//!
//! The salt is the only secret in a Veil configuration. Anyone holding it can
//! recompute pseudonyms from guessed originals, so it is kept in a
//! [`SecretString`]: redacted from `Debug`, wiped on drop and reachable only
//! through `expose_secret()`.
//!
//! ```rust
//! use veil::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let salt = secret_string("pepper".to_string());
//! assert_eq!(salt.expose_secret().as_bytes(), b"pepper");
//! assert!(!format!("{salt:?}").contains("pepper"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Salt text, zeroed when dropped
#[derive(Clone, Debug, Zeroize, Serialize, Deserialize)]
#[serde(transparent)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl SecretValue {
    /// Salt bytes as fed to the digest
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Secret holding the pseudonym salt
pub type SecretString = Secret<SecretValue>;

/// Wraps `value` as a secret
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_salt_exposes_bytes() {
        let salt = secret_string("test-salt".to_string());
        assert_eq!(salt.expose_secret(), "test-salt");
        assert_eq!(salt.expose_secret().as_bytes(), b"test-salt");
        assert!(!salt.expose_secret().is_empty());
    }

    #[test]
    fn test_salt_debug_redacted() {
        let salt = secret_string("sensitive-salt".to_string());
        let debug_output = format!("{salt:?}");
        assert!(!debug_output.contains("sensitive-salt"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_salt_reads_from_toml() {
        #[derive(Deserialize)]
        struct Profile {
            salt: SecretString,
        }

        let profile: Profile = toml::from_str("salt = \"site-pepper\"").unwrap();
        assert_eq!(profile.salt.expose_secret(), "site-pepper");
    }

    #[test]
    fn test_salt_serializes_as_plain_string() {
        #[derive(Serialize)]
        struct Profile {
            salt: SecretString,
        }

        let profile = Profile {
            salt: secret_string("site-pepper".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&profile).unwrap(),
            r#"{"salt":"site-pepper"}"#
        );
    }
}
