//! Password Hashing and Verification
//!
//! Salted PBKDF2-HMAC-SHA256 credential derivation with:
//! - A fixed iteration count, so a persisted salt always reproduces its hash
//! - Unicode NFKC normalization before derivation
//! - Constant-time comparison on verification
//! - Zeroization of clear text passwords on drop
//!
//! ## Storage
//! Salt and hash are both standard base64 text. The caller persists them
//! together as a `salt:hash` credential record.

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{constant_time_eq, from_base64, random_bytes, to_base64};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Salt length in bytes (128 bits)
pub const SALT_LEN: usize = 16;

/// Derived hash length in bytes (256 bits)
pub const HASH_LEN: usize = 32;

/// Iteration count used for every stored credential
pub const PBKDF2_ITERATIONS: u32 = 65_536;

/// Lower bound accepted by [`CredentialHasher::with_iterations`]
pub const MIN_PBKDF2_ITERATIONS: u32 = 10_000;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Password hashing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// Salt text is not valid base64 or decodes to nothing
    #[error("Invalid salt encoding")]
    InvalidSalt,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Policy-checked clear text password
///
/// Used on registration and password change. Login deliberately accepts any
/// string, so a policy failure can never be told apart from a wrong password.
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password with validation
    ///
    /// Unicode is normalized using NFKC before validation:
    /// - 8 to 128 code points
    /// - not empty/whitespace only
    /// - no control characters other than space, tab and newline
    /// - not a well-known weak password
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = normalized.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(&normalized) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(Self(normalized))
    }

    /// Borrow the normalized text for hashing
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Credential Hasher
// ============================================================================

/// Salted, iterated password hasher
///
/// ## Examples
/// ```rust
/// use platform::password::CredentialHasher;
///
/// let hasher = CredentialHasher::default();
/// let salt = hasher.generate_salt();
/// let hash = hasher.hash("correct horse", &salt).unwrap();
///
/// assert!(hasher.verify("correct horse", &hash, &salt));
/// assert!(!hasher.verify("battery staple", &hash, &salt));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialHasher {
    iterations: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            iterations: PBKDF2_ITERATIONS,
        }
    }
}

impl CredentialHasher {
    /// Hasher with a custom iteration count, clamped to [`MIN_PBKDF2_ITERATIONS`]
    ///
    /// Records hashed with one count only verify under the same count.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(MIN_PBKDF2_ITERATIONS),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Fresh random salt ([`SALT_LEN`] bytes, base64)
    pub fn generate_salt(&self) -> String {
        to_base64(&random_bytes(SALT_LEN))
    }

    /// Derive the base64 hash of `password` under `salt`
    ///
    /// Deterministic: identical inputs always yield the identical hash.
    pub fn hash(&self, password: &str, salt: &str) -> Result<String, PasswordHashError> {
        let salt_bytes = from_base64(salt).map_err(|_| PasswordHashError::InvalidSalt)?;
        if salt_bytes.is_empty() {
            return Err(PasswordHashError::InvalidSalt);
        }

        let mut normalized: String = password.nfkc().collect();
        let derived = derive_key(normalized.as_bytes(), &salt_bytes, self.iterations);
        normalized.zeroize();

        Ok(to_base64(&derived))
    }

    /// Check `password` against a stored hash
    ///
    /// Never fails: an undecodable salt or stored hash yields `false`.
    pub fn verify(&self, password: &str, stored_hash: &str, salt: &str) -> bool {
        let Ok(expected) = from_base64(stored_hash) else {
            return false;
        };
        let Ok(candidate) = self.hash(password, salt) else {
            return false;
        };
        let Ok(candidate) = from_base64(&candidate) else {
            return false;
        };

        constant_time_eq(&candidate, &expected)
    }
}

fn derive_key(password: &[u8], salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);
    out
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Check for common weak patterns
fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();

    // All the same character (e.g., "aaaaaaaa")
    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    if is_sequential_numbers(&lower) {
        return true;
    }

    const KEYBOARD_PATTERNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];
    if KEYBOARD_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }

    const COMMON_PASSWORDS: &[&str] = &[
        "password",
        "password1",
        "password123",
        "abcdefgh",
        "letmein1",
        "welcome1",
        "admin123",
        "iloveyou",
        "sunshine",
        "princess",
        "football",
        "baseball",
        "trustno1",
    ];
    COMMON_PASSWORDS.contains(&lower.as_str())
}

/// Check if the string is only an ascending or descending digit run
fn is_sequential_numbers(s: &str) -> bool {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 4 {
        return false;
    }

    let ascending = digits
        .windows(2)
        .all(|w| w[1] == (w[0] + 1) % 10);
    let descending = digits
        .windows(2)
        .all(|w| w[0] == (w[1] + 1) % 10);

    ascending || descending
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::with_iterations(MIN_PBKDF2_ITERATIONS)
    }

    #[test]
    fn test_pbkdf2_known_vector() {
        // PBKDF2-HMAC-SHA256 ("password", "salt", c = 4096, dkLen = 32)
        let derived = derive_key(b"password", b"salt", 4096);
        assert_eq!(
            derived.to_vec(),
            hex::decode("c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a")
                .unwrap()
        );
    }

    #[test]
    fn test_hash_is_deterministic() {
        let hasher = fast_hasher();
        let salt = hasher.generate_salt();
        let first = hasher.hash("Passw0rd!", &salt).unwrap();
        let second = hasher.hash("Passw0rd!", &salt).unwrap();
        assert_eq!(first, second);
        assert_eq!(from_base64(&first).unwrap().len(), HASH_LEN);
    }

    #[test]
    fn test_hash_depends_on_salt() {
        let hasher = fast_hasher();
        let a = hasher.hash("Passw0rd!", &hasher.generate_salt()).unwrap();
        let b = hasher.hash("Passw0rd!", &hasher.generate_salt()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_roundtrip_and_wrong_password() {
        let hasher = fast_hasher();
        let salt = hasher.generate_salt();
        let hash = hasher.hash("Passw0rd!", &salt).unwrap();

        assert!(hasher.verify("Passw0rd!", &hash, &salt));
        assert!(!hasher.verify("passw0rd!", &hash, &salt));
        assert!(!hasher.verify("", &hash, &salt));
    }

    #[test]
    fn test_verify_is_nfkc_insensitive() {
        let hasher = fast_hasher();
        let salt = hasher.generate_salt();
        // U+FF21 FULLWIDTH LATIN CAPITAL LETTER A normalizes to 'A'
        let hash = hasher.hash("\u{FF21}bcdefgh1", &salt).unwrap();
        assert!(hasher.verify("Abcdefgh1", &hash, &salt));
    }

    #[test]
    fn test_hash_rejects_invalid_salt() {
        let hasher = fast_hasher();
        assert_eq!(
            hasher.hash("Passw0rd!", "%%not-base64%%"),
            Err(PasswordHashError::InvalidSalt)
        );
        assert_eq!(hasher.hash("Passw0rd!", ""), Err(PasswordHashError::InvalidSalt));
    }

    #[test]
    fn test_verify_never_fails_on_malformed_input() {
        let hasher = fast_hasher();
        let salt = hasher.generate_salt();
        assert!(!hasher.verify("Passw0rd!", "%%garbage%%", &salt));
        assert!(!hasher.verify("Passw0rd!", "c2FsdA==", "%%garbage%%"));
    }

    #[test]
    fn test_salts_are_unique() {
        let hasher = CredentialHasher::default();
        let mut previous = hasher.generate_salt();
        assert_eq!(from_base64(&previous).unwrap().len(), SALT_LEN);
        for _ in 0..10_000 {
            let next = hasher.generate_salt();
            assert_ne!(previous, next);
            previous = next;
        }
    }

    #[test]
    fn test_with_iterations_is_clamped() {
        assert_eq!(
            CredentialHasher::with_iterations(1).iterations(),
            MIN_PBKDF2_ITERATIONS
        );
        assert_eq!(CredentialHasher::default().iterations(), PBKDF2_ITERATIONS);
    }

    #[test]
    fn test_password_policy() {
        assert!(matches!(
            ClearTextPassword::new("short".to_string()),
            Err(PasswordPolicyError::TooShort { .. })
        ));
        assert!(matches!(
            ClearTextPassword::new("a".repeat(MAX_PASSWORD_LENGTH + 1)),
            Err(PasswordPolicyError::TooLong { .. })
        ));
        assert_eq!(
            ClearTextPassword::new("        ".to_string()).unwrap_err(),
            PasswordPolicyError::EmptyOrWhitespace
        );
        assert_eq!(
            ClearTextPassword::new("abc\u{0007}defgh".to_string()).unwrap_err(),
            PasswordPolicyError::InvalidCharacter
        );
        assert_eq!(
            ClearTextPassword::new("password123".to_string()).unwrap_err(),
            PasswordPolicyError::CommonPattern
        );
        assert_eq!(
            ClearTextPassword::new("12345678".to_string()).unwrap_err(),
            PasswordPolicyError::CommonPattern
        );
        assert!(ClearTextPassword::new("Passw0rd!".to_string()).is_ok());
        assert!(ClearTextPassword::new("パスワード安全です!".to_string()).is_ok());
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::new("Passw0rd!".to_string()).unwrap();
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("Passw0rd"));
    }
}
