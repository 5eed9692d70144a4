//! Stateless bearer tokens.
//!
//! A token seals `"{expires_at}:{subject}"` with ChaCha20-Poly1305 under a
//! process-wide symmetric secret and travels as `base64url(nonce ||
//! ciphertext)`. Validity is fully determined by the token's own contents
//! plus the current time, so any holder of the secret can validate without a
//! session store.
//!
//! The secret is a trust boundary: one static key per process, no rotation,
//! and possession of a valid token alone grants the access it encodes.

use base64ct::{Base64UrlUnpadded, Encoding};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use chrono::Utc;
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Decoded length of the token secret in bytes.
pub const TOKEN_SECRET_BYTES: usize = 32;

const NONCE_BYTES: usize = 12;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token secret must be {TOKEN_SECRET_BYTES} bytes of base64url")]
    InvalidSecret,

    #[error("token encryption failed")]
    Encrypt,
}

/// Seals and validates bearer tokens under a process-wide symmetric secret.
pub struct TokenCodec {
    key: Key,
}

impl TokenCodec {
    /// Build a codec from a base64url-encoded 32-byte secret.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidSecret`] if the secret does not decode to
    /// exactly [`TOKEN_SECRET_BYTES`] bytes.
    pub fn new(secret: &SecretString) -> Result<Self, TokenError> {
        let bytes = Base64UrlUnpadded::decode_vec(secret.expose_secret())
            .map_err(|_| TokenError::InvalidSecret)?;

        if bytes.len() != TOKEN_SECRET_BYTES {
            return Err(TokenError::InvalidSecret);
        }

        Ok(Self {
            key: *Key::from_slice(&bytes),
        })
    }

    /// Generate a fresh base64url secret suitable for [`TokenCodec::new`].
    #[must_use]
    pub fn generate_secret() -> String {
        let mut bytes = [0u8; TOKEN_SECRET_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Base64UrlUnpadded::encode_string(&bytes)
    }

    /// Issue a token for `subject` expiring `ttl_seconds` from now.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails.
    pub fn issue(&self, subject: &str, ttl_seconds: i64) -> Result<String, TokenError> {
        self.issue_at(subject, ttl_seconds, Utc::now().timestamp())
    }

    fn issue_at(&self, subject: &str, ttl_seconds: i64, now: i64) -> Result<String, TokenError> {
        let expires_at = now.saturating_add(ttl_seconds);
        let plaintext = format!("{expires_at}:{subject}");

        let cipher = ChaCha20Poly1305::new(&self.key);

        let mut nonce_bytes = [0u8; NONCE_BYTES];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| TokenError::Encrypt)?;

        let mut sealed = Vec::with_capacity(nonce_bytes.len() + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(Base64UrlUnpadded::encode_string(&sealed))
    }

    /// Check a presented token against the subject it claims to act for.
    ///
    /// True only when the token decrypts under the process secret, the
    /// decoded subject equals `expected_subject` exactly, and the expiry is
    /// still in the future. Malformed, tampered, or wrong-key input is a
    /// routine mismatch, never an error.
    #[must_use]
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        self.validate_at(token, expected_subject, Utc::now().timestamp())
    }

    fn validate_at(&self, token: &str, expected_subject: &str, now: i64) -> bool {
        let Ok(sealed) = Base64UrlUnpadded::decode_vec(token) else {
            return false;
        };

        if sealed.len() < NONCE_BYTES {
            return false;
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_BYTES);

        let cipher = ChaCha20Poly1305::new(&self.key);

        let Ok(plaintext) = cipher.decrypt(Nonce::from_slice(nonce_bytes), ciphertext) else {
            return false;
        };

        let Ok(text) = String::from_utf8(plaintext) else {
            return false;
        };

        let Some((expires_at, subject)) = text.split_once(':') else {
            return false;
        };

        let Ok(expires_at) = expires_at.parse::<i64>() else {
            return false;
        };

        now < expires_at && subject == expected_subject
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn codec() -> Result<TokenCodec> {
        let secret = SecretString::from(TokenCodec::generate_secret());
        Ok(TokenCodec::new(&secret)?)
    }

    /// Seal an arbitrary payload with the codec key, bypassing `issue_at`.
    fn seal_raw(codec: &TokenCodec, plaintext: &str) -> Result<String> {
        let cipher = ChaCha20Poly1305::new(&codec.key);

        let mut nonce_bytes = [0u8; NONCE_BYTES];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| anyhow::anyhow!("encrypt failed: {e}"))?;

        let mut sealed = nonce_bytes.to_vec();
        sealed.extend_from_slice(&ciphertext);

        Ok(Base64UrlUnpadded::encode_string(&sealed))
    }

    #[test]
    fn test_new_rejects_short_secret() {
        let secret = SecretString::from(Base64UrlUnpadded::encode_string(&[0u8; 16]));
        assert!(matches!(
            TokenCodec::new(&secret),
            Err(TokenError::InvalidSecret)
        ));
    }

    #[test]
    fn test_new_rejects_non_base64_secret() {
        let secret = SecretString::from("not base64!".to_string());
        assert!(matches!(
            TokenCodec::new(&secret),
            Err(TokenError::InvalidSecret)
        ));
    }

    #[test]
    fn test_issue_then_validate() -> Result<()> {
        let codec = codec()?;
        let token = codec.issue("alice", 60)?;
        assert!(codec.validate(&token, "alice"));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_other_subject() -> Result<()> {
        let codec = codec()?;
        let token = codec.issue("alice", 60)?;
        assert!(!codec.validate(&token, "bob"));
        assert!(!codec.validate(&token, "Alice"));
        Ok(())
    }

    #[test]
    fn test_token_expires() -> Result<()> {
        let codec = codec()?;
        let now = 1_700_000_000;
        let token = codec.issue_at("alice", 60, now)?;

        assert!(codec.validate_at(&token, "alice", now));
        assert!(codec.validate_at(&token, "alice", now + 59));
        assert!(!codec.validate_at(&token, "alice", now + 60));
        assert!(!codec.validate_at(&token, "alice", now + 61));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_garbage() -> Result<()> {
        let codec = codec()?;
        assert!(!codec.validate("", "alice"));
        assert!(!codec.validate("not a token", "alice"));
        assert!(!codec.validate("AAAA", "alice"));
        assert!(!codec.validate(&"A".repeat(1024), "alice"));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_tampered_token() -> Result<()> {
        let codec = codec()?;
        let token = codec.issue("alice", 60)?;

        let mut tampered = token.into_bytes();
        let middle = tampered.len() / 2;
        tampered[middle] = if tampered[middle] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered)?;

        assert!(!codec.validate(&tampered, "alice"));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_wrong_key() -> Result<()> {
        let issuer = codec()?;
        let verifier = codec()?;
        let token = issuer.issue("alice", 60)?;
        assert!(!verifier.validate(&token, "alice"));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_bad_payload_structure() -> Result<()> {
        let codec = codec()?;
        let now = Utc::now().timestamp();

        // no separator
        let token = seal_raw(&codec, "alice")?;
        assert!(!codec.validate(&token, "alice"));

        // non-numeric expiry
        let token = seal_raw(&codec, "soon:alice")?;
        assert!(!codec.validate(&token, "alice"));

        // empty subject
        let token = seal_raw(&codec, &format!("{}:", now + 60))?;
        assert!(!codec.validate(&token, "alice"));

        Ok(())
    }

    #[test]
    fn test_generate_secret_round_trips() -> Result<()> {
        let secret = TokenCodec::generate_secret();
        let decoded = Base64UrlUnpadded::decode_vec(&secret)
            .map_err(|e| anyhow::anyhow!("decode failed: {e}"))?;
        assert_eq!(decoded.len(), TOKEN_SECRET_BYTES);

        TokenCodec::new(&SecretString::from(secret))?;
        Ok(())
    }
}
