use crate::domain::user::driven_ports::PasswordHasher;
use anyhow::{Context, anyhow};
use argon2::password_hash::{self, PasswordHash, PasswordVerifier, SaltString};
use argon2::{Argon2, Params};
use rand::RngCore;

/// Hashes passwords into Argon2id PHC strings with a fresh random salt per hash. Hashing and
/// verification run on tokio's blocking pool so they never stall the async workers.
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Argon2PasswordHasher {
            argon2: Argon2::default(),
        }
    }

    /// Uses custom cost parameters for new hashes. Verification always uses the
    /// parameters encoded in the stored hash.
    pub fn with_params(params: Params) -> Self {
        Argon2PasswordHasher {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, anyhow::Error> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hash_with(&argon2, &password))
            .await
            .context("Password hashing task did not finish")?
    }

    async fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<bool, anyhow::Error> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();

        tokio::task::spawn_blocking(move || verify_with(&argon2, &password, &stored_hash))
            .await
            .context("Password verification task did not finish")?
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, anyhow::Error> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| anyhow!("Failed to encode salt: {err}"))?;

    let hash = password_hash::PasswordHasher::hash_password(argon2, password.as_bytes(), &salt)
        .map_err(|err| anyhow!("Failed to hash password: {err}"))?;

    Ok(hash.to_string())
}

fn verify_with(argon2: &Argon2<'_>, password: &str, stored_hash: &str) -> Result<bool, anyhow::Error> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|err| anyhow!("Stored password hash is malformed: {err}"))?;

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(anyhow!("Failed to verify password: {err}")),
    }
}


#[cfg(test)]
mod tests {
    use super::test_util::cheap_hasher;
    use super::*;
    use speculoos::prelude::*;

    #[tokio::test]
    async fn hash_verifies_against_original_password() {
        let hasher = cheap_hasher();
        let hash = hasher.hash_password("password123").await.expect("hashing failed");

        assert!(hash.starts_with("$argon2id$"));
        assert_that!(hasher.verify_password("password123", &hash).await)
            .is_ok()
            .is_true();
        assert_that!(hasher.verify_password("wrongpassword", &hash).await)
            .is_ok()
            .is_false();
    }

    #[tokio::test]
    async fn same_password_gets_different_salts() {
        let hasher = cheap_hasher();
        let first = hasher.hash_password("password123").await.expect("hashing failed");
        let second = hasher.hash_password("password123").await.expect("hashing failed");

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn unparsable_hash_is_an_error() {
        let hasher = cheap_hasher();

        assert_that!(hasher.verify_password("password123", "...somehash...").await).is_err();
    }
}
