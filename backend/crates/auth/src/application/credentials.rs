//! Credential derivation and checking off the async executor
//!
//! PBKDF2 at production cost takes tens of milliseconds; both directions
//! run on the blocking pool.

use platform::password::{ClearTextPassword, CredentialHasher};

use crate::domain::value_object::{CredentialCheck, CredentialRecord};
use crate::error::{AuthError, AuthResult};

/// Fixed record checked when the user does not exist, so that unknown
/// names cost the same as wrong passwords.
const DUMMY_SALT: &str = "AAAAAAAAAAAAAAAAAAAAAA==";
const DUMMY_HASH: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

/// Generate a fresh salt and derive a credential record for `password`
pub async fn derive_credential(
    hasher: CredentialHasher,
    password: ClearTextPassword,
) -> AuthResult<CredentialRecord> {
    tokio::task::spawn_blocking(move || {
        let salt = hasher.generate_salt();
        let hash = hasher
            .hash(password.expose(), &salt)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok::<_, AuthError>(CredentialRecord::new(&salt, &hash))
    })
    .await
    .map_err(|e| AuthError::Internal(format!("Credential task failed: {e}")))?
}

/// Check `password` against an optional stored record
///
/// Every outcome costs exactly one key derivation, so an account without a
/// usable record answers no faster than a wrong password.
pub async fn check_credential(
    hasher: CredentialHasher,
    record: Option<CredentialRecord>,
    password: String,
) -> AuthResult<CredentialCheck> {
    tokio::task::spawn_blocking(move || {
        check_with(record.as_ref(), &password, |password, hash, salt| {
            hasher.verify(password, hash, salt)
        })
    })
    .await
    .map_err(|e| AuthError::Internal(format!("Credential task failed: {e}")))
}

/// `verify(password, hash, salt)` is called once on every path
fn check_with<V>(record: Option<&CredentialRecord>, password: &str, mut verify: V) -> CredentialCheck
where
    V: FnMut(&str, &str, &str) -> bool,
{
    match record.map(CredentialRecord::parts) {
        Some(Some((salt, hash))) => {
            if verify(password, hash, salt) {
                CredentialCheck::Verified
            } else {
                CredentialCheck::Mismatch
            }
        }
        Some(None) => {
            verify(password, DUMMY_HASH, DUMMY_SALT);
            CredentialCheck::Malformed
        }
        None => {
            verify(password, DUMMY_HASH, DUMMY_SALT);
            CredentialCheck::NoLocalCredential
        }
    }
}

/// Burn one verification's worth of work
pub async fn equalize_timing(hasher: CredentialHasher, password: String) {
    let _ = tokio::task::spawn_blocking(move || hasher.verify(&password, DUMMY_HASH, DUMMY_SALT))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::with_iterations(10_000)
    }

    #[tokio::test]
    async fn test_derive_then_check() {
        let password = ClearTextPassword::new("Passw0rd!".to_string()).unwrap();
        let record = derive_credential(hasher(), password).await.unwrap();

        let check = check_credential(hasher(), Some(record.clone()), "Passw0rd!".into())
            .await
            .unwrap();
        assert_eq!(check, CredentialCheck::Verified);

        let check = check_credential(hasher(), Some(record), "Passw0rd?".into())
            .await
            .unwrap();
        assert_eq!(check, CredentialCheck::Mismatch);
    }

    #[tokio::test]
    async fn test_no_record() {
        let check = check_credential(hasher(), None, "x".into()).await.unwrap();
        assert_eq!(check, CredentialCheck::NoLocalCredential);
    }

    #[test]
    fn test_every_outcome_costs_one_derivation() {
        let hasher = hasher();
        let salt = hasher.generate_salt();
        let hash = hasher.hash("Passw0rd!", &salt).unwrap();
        let valid = CredentialRecord::new(&salt, &hash);
        let malformed = CredentialRecord::from_db(Some("not-a-record".to_string())).unwrap();

        let cases = [
            (Some(&valid), "Passw0rd!", CredentialCheck::Verified),
            (Some(&valid), "Passw0rd?", CredentialCheck::Mismatch),
            (Some(&malformed), "Passw0rd!", CredentialCheck::Malformed),
            (None, "Passw0rd!", CredentialCheck::NoLocalCredential),
        ];

        for (record, password, expected) in cases {
            let mut derivations = 0;
            let check = check_with(record, password, |password, hash, salt| {
                derivations += 1;
                hasher.verify(password, hash, salt)
            });
            assert_eq!(check, expected);
            assert_eq!(derivations, 1, "{expected:?}");
        }
    }

    #[tokio::test]
    async fn test_missing_record_is_not_faster_than_wrong_password() {
        let hasher = CredentialHasher::with_iterations(100_000);
        let salt = hasher.generate_salt();
        let hash = hasher.hash("Passw0rd!", &salt).unwrap();
        let record = CredentialRecord::new(&salt, &hash);

        let started = std::time::Instant::now();
        check_credential(hasher, Some(record), "Passw0rd?".into())
            .await
            .unwrap();
        let mismatch = started.elapsed();

        let started = std::time::Instant::now();
        check_credential(hasher, None, "Passw0rd?".into())
            .await
            .unwrap();
        let missing = started.elapsed();

        assert!(missing * 4 > mismatch, "{missing:?} vs {mismatch:?}");
    }

    #[test]
    fn test_dummy_record_never_verifies() {
        assert!(!hasher().verify("", DUMMY_HASH, DUMMY_SALT));
        assert!(!hasher().verify("Passw0rd!", DUMMY_HASH, DUMMY_SALT));
    }
}
