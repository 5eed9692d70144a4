//! Registration, login, and authorized profile reads.
//!
//! The expected outcomes of each operation (id taken, unknown user, bad
//! credentials) are enum variants the HTTP layer maps onto wire statuses;
//! only storage and codec faults surface as errors, which the handlers log
//! and mask. Nothing below this module leaks raw storage or crypto detail to
//! a caller, and no state survives between calls.

use crate::{
    password,
    store::{StoreError, UserRecord, UserStore},
    token::TokenCodec,
};
use anyhow::{Context, Result};
use serde_json::Value;

#[derive(Debug, PartialEq)]
pub enum RegisterOutcome {
    /// The user was created and a fresh token issued.
    Created { auth_token: String },
    /// The id is already registered. A normal outcome, not a failure.
    Exists,
}

#[derive(Debug, PartialEq)]
pub enum LoginOutcome {
    LoggedIn { auth_token: String },
    NotFound,
    Unauthorized,
}

#[derive(Debug, PartialEq)]
pub enum InfoOutcome {
    Profile(Value),
    NotFound,
    Unauthorized,
}

/// Orchestrates the credential store, password hasher, and token codec.
pub struct AuthService<S> {
    store: S,
    codec: TokenCodec,
    token_ttl: i64,
}

impl<S: UserStore> AuthService<S> {
    #[must_use]
    pub fn new(store: S, codec: TokenCodec, token_ttl: i64) -> Self {
        Self {
            store,
            codec,
            token_ttl,
        }
    }

    /// Register a new user and hand back a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error on storage or codec failure. A taken id is
    /// [`RegisterOutcome::Exists`], not an error.
    pub async fn register(
        &self,
        id: &str,
        password: &str,
        profile: Value,
    ) -> Result<RegisterOutcome> {
        let password_hash = hash_blocking(password.to_string()).await?;

        let user = UserRecord {
            id: id.to_string(),
            password_hash,
            profile,
        };

        match self.store.create(&user).await {
            Ok(()) => Ok(RegisterOutcome::Created {
                auth_token: self.codec.issue(id, self.token_ttl)?,
            }),
            Err(StoreError::AlreadyExists(_)) => Ok(RegisterOutcome::Exists),
            Err(err) => Err(err).context("Failed to create user"),
        }
    }

    /// Exchange an id and password for a fresh bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error on storage or codec failure. Unknown ids and
    /// mismatched passwords are outcomes, not errors.
    pub async fn login(&self, id: &str, password: &str) -> Result<LoginOutcome> {
        let user = match self.store.get(id).await {
            Ok(user) => user,
            Err(StoreError::NotFound(_)) => return Ok(LoginOutcome::NotFound),
            Err(err) => return Err(err).context("Failed to read user"),
        };

        if !verify_blocking(password.to_string(), user.password_hash).await? {
            return Ok(LoginOutcome::Unauthorized);
        }

        Ok(LoginOutcome::LoggedIn {
            auth_token: self.codec.issue(id, self.token_ttl)?,
        })
    }

    /// Return the stored profile when the presented token authorizes `id`.
    ///
    /// Each call is independently authorized: the token must decode under
    /// the process secret, name `id` as its subject, and be unexpired.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub async fn get_info(&self, id: &str, token: Option<&str>) -> Result<InfoOutcome> {
        let user = match self.store.get(id).await {
            Ok(user) => user,
            Err(StoreError::NotFound(_)) => return Ok(InfoOutcome::NotFound),
            Err(err) => return Err(err).context("Failed to read user"),
        };

        let Some(token) = token.filter(|token| !token.is_empty()) else {
            return Ok(InfoOutcome::Unauthorized);
        };

        if !self.codec.validate(token, id) {
            return Ok(InfoOutcome::Unauthorized);
        }

        Ok(InfoOutcome::Profile(user.profile))
    }
}

// Argon2 is deliberately expensive; keep it off the async workers.
async fn hash_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || password::hash(&password))
        .await
        .context("Password hashing task failed")?
        .context("Failed to hash password")
}

async fn verify_blocking(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || password::verify(&password, &hash))
        .await
        .context("Password verification task failed")
}
