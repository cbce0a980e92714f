use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha512;
use tracing::error;

use crate::error::StoreError;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 64;
const ITERATIONS: u32 = 1000;

fn derive(plain: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha512>(plain.as_bytes(), salt, ITERATIONS, &mut key);
    key
}

/// Hash a password with a fresh random salt, producing a `salt:hash` hex pair.
pub fn hash_password(plain: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let key = derive(plain, &salt);
    format!("{}:{}", hex::encode(salt), hex::encode(key))
}

/// Verify a password against a stored `salt:hash` hex pair.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, StoreError> {
    let (salt_hex, hash_hex) = stored.split_once(':').ok_or_else(|| {
        error!("stored password hash is not a salt:hash pair");
        StoreError::Hash("malformed stored password hash".into())
    })?;
    let salt = hex::decode(salt_hex).map_err(|e| {
        error!(error = %e, "stored salt is not valid hex");
        StoreError::Hash(e.to_string())
    })?;
    let key = derive(plain, &salt);
    Ok(hex::encode(key) == hash_hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password);
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password);
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn hash_has_salt_and_digest_parts() {
        let hash = hash_password("secret1");
        let (salt, digest) = hash.split_once(':').expect("salt:hash shape");
        assert_eq!(salt.len(), SALT_LEN * 2);
        assert_eq!(digest.len(), KEY_LEN * 2);
    }

    #[test]
    fn same_password_hashes_differently() {
        // Fresh salt each time.
        assert_ne!(hash_password("secret1"), hash_password("secret1"));
    }
}
