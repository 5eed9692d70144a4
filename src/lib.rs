//! # Custodia (User Credential & Token Service)
//!
//! `custodia` authenticates end users for a multi-service deployment. It
//! registers users, verifies passwords, and issues self-contained bearer
//! tokens; any resource server holding the shared secret can validate those
//! tokens without a session store.
//!
//! ## Tokens
//!
//! A token seals `{expiry, subject}` with authenticated encryption under a
//! single process-wide secret configured at startup. Validity is fully
//! determined by the token's own contents plus the current time: there is no
//! revocation, no rotation, and no server-side session state. Possession of a
//! valid token alone grants the access it encodes.
//!
//! ## Credentials
//!
//! Passwords are stored as salted Argon2id hashes, one fresh salt per
//! registration. The credential store owns id uniqueness: concurrent
//! registrations of the same id resolve to exactly one winner.
//!
//! ## Wire contract
//!
//! - `PUT /users/{id}?pw=…` registers a user with the request body as profile
//!   and returns a token, or `303 See Other` when the id is taken.
//! - `PUT /users/{id}/auth` exchanges a password for a token.
//! - `GET /users/{id}` returns the stored profile to a bearer of a valid
//!   token for that id.

pub mod auth;
pub mod cli;
pub mod custodia;
pub mod password;
pub mod store;
pub mod token;
