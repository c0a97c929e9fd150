//! Credential Record
//!
//! Stored form of a local password: `"<salt>:<hash>"`, both base64.
//! Accounts created through an external provider carry none.

use std::fmt;

use platform::password::CredentialHasher;

const SEPARATOR: char = ':';

/// Outcome of checking a password against an account's stored credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialCheck {
    Verified,
    Mismatch,
    /// Account has no local credential (external sign-in only)
    NoLocalCredential,
    /// Stored record is not `salt:hash`
    Malformed,
}

impl CredentialCheck {
    pub fn is_verified(&self) -> bool {
        matches!(self, CredentialCheck::Verified)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord(String);

impl CredentialRecord {
    pub fn new(salt: &str, hash: &str) -> Self {
        Self(format!("{salt}{SEPARATOR}{hash}"))
    }

    /// Restore from storage; NULL and blank values mean "no local credential"
    pub fn from_db(raw: Option<String>) -> Option<Self> {
        raw.filter(|value| !value.trim().is_empty()).map(Self)
    }

    /// Split into `(salt, hash)`
    ///
    /// Exactly two non-empty segments are required; base64 never contains
    /// the separator.
    pub fn parts(&self) -> Option<(&str, &str)> {
        let mut segments = self.0.split(SEPARATOR);
        match (segments.next(), segments.next(), segments.next()) {
            (Some(salt), Some(hash), None) if !salt.is_empty() && !hash.is_empty() => {
                Some((salt, hash))
            }
            _ => None,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.parts().is_some()
    }

    pub fn verify(&self, hasher: &CredentialHasher, password: &str) -> CredentialCheck {
        match self.parts() {
            Some((salt, hash)) if hasher.verify(password, hash, salt) => CredentialCheck::Verified,
            Some(_) => CredentialCheck::Mismatch,
            None => CredentialCheck::Malformed,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialRecord([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::with_iterations(10_000)
    }

    #[test]
    fn test_verify_against_record() {
        let hasher = hasher();
        let salt = hasher.generate_salt();
        let hash = hasher.hash("Passw0rd!", &salt).unwrap();
        let record = CredentialRecord::new(&salt, &hash);

        assert!(record.is_well_formed());
        assert_eq!(record.verify(&hasher, "Passw0rd!"), CredentialCheck::Verified);
        assert_eq!(record.verify(&hasher, "wrong-password"), CredentialCheck::Mismatch);
    }

    #[test]
    fn test_malformed_records() {
        let hasher = hasher();
        for raw in ["no-separator", "a:b:c", ":hash", "salt:"] {
            let record = CredentialRecord::from_db(Some(raw.to_string())).unwrap();
            assert!(!record.is_well_formed(), "{raw}");
            assert_eq!(record.verify(&hasher, "anything"), CredentialCheck::Malformed);
        }
    }

    #[test]
    fn test_absent_record() {
        assert!(CredentialRecord::from_db(None).is_none());
        assert!(CredentialRecord::from_db(Some("  ".to_string())).is_none());
    }

    #[test]
    fn test_debug_is_redacted() {
        let record = CredentialRecord::new("c2FsdA==", "aGFzaA==");
        assert!(!format!("{record:?}").contains("c2FsdA"));
    }
}
