use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Passwords
// =============================================================================

/// Hash a password with Argon2id and a random salt, returning a PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(e.to_string()))
}

/// Check a password against a stored PHC string
///
/// A malformed stored hash is logged and treated as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!("Stored password hash is invalid: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Signatures
// =============================================================================

/// Hex-encoded HMAC-SHA256 of `data`
///
/// Yields an empty string (which never verifies) if the key is rejected.
pub fn sign(data: &str, secret: &str) -> String {
    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mut mac) => {
            mac.update(data.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            String::new()
        }
    }
}

/// Verify a hex-encoded HMAC-SHA256 signature in constant time
pub fn verify_hmac(data: &str, signature: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };

    mac.update(data.as_bytes());

    let sig_bytes = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Invalid hex signature format");
            return false;
        }
    };

    mac.verify_slice(&sig_bytes).is_ok()
}

// =============================================================================
// Sessions
// =============================================================================

/// Authenticated session carried in the signed cookie
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    /// Unix timestamp (seconds) after which the session is rejected
    pub expires_at: i64,
}

impl Session {
    pub fn new(user_id: i64, username: &str, max_age_secs: i64) -> Self {
        Self {
            user_id,
            username: username.to_string(),
            expires_at: chrono::Utc::now().timestamp() + max_age_secs,
        }
    }

    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() >= self.expires_at
    }
}

/// Serialize a session as `user_id|expires_at|username|signature`
pub fn encode_session(session: &Session, secret: &str) -> String {
    let payload = format!(
        "{}|{}|{}",
        session.user_id, session.expires_at, session.username
    );
    let signature = sign(&payload, secret);
    format!("{}|{}", payload, signature)
}

/// Parse and verify a session token
///
/// Returns `None` for malformed tokens, bad signatures and expired sessions.
pub fn decode_session(token: &str, secret: &str) -> Option<Session> {
    let (payload, signature) = token.rsplit_once('|')?;

    if !verify_hmac(payload, signature, secret) {
        tracing::warn!("Session signature mismatch");
        return None;
    }

    let mut parts = payload.splitn(3, '|');
    let user_id = parts.next()?.parse().ok()?;
    let expires_at = parts.next()?.parse().ok()?;
    let username = parts.next()?.to_string();

    let session = Session {
        user_id,
        username,
        expires_at,
    };

    if session.is_expired() {
        tracing::debug!(user_id, "Session expired");
        return None;
    }

    Some(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-session-secret";

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_password_bad_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_verify_hmac_valid() {
        let signature = sign("test data", SECRET);
        assert_eq!(signature.len(), 64);
        assert!(verify_hmac("test data", &signature, SECRET));
    }

    #[test]
    fn test_verify_hmac_wrong_secret() {
        let signature = sign("test data", SECRET);
        assert!(!verify_hmac("test data", &signature, "wrong-secret"));
    }

    #[test]
    fn test_verify_hmac_invalid_signature() {
        assert!(!verify_hmac("test data", &"0".repeat(64), SECRET));
        assert!(!verify_hmac("test data", "not-hex", SECRET));
    }

    #[test]
    fn test_session_round_trip() {
        let session = Session::new(42, "alice", 3600);
        let token = encode_session(&session, SECRET);

        assert_eq!(decode_session(&token, SECRET), Some(session));
    }

    #[test]
    fn test_session_rejects_tampering() {
        let token = encode_session(&Session::new(42, "alice", 3600), SECRET);

        // Swap the user id but keep the original signature
        let forged = token.replacen("42|", "43|", 1);
        assert!(decode_session(&forged, SECRET).is_none());

        assert!(decode_session(&token, "other-secret").is_none());
    }

    #[test]
    fn test_session_rejects_expired() {
        let session = Session {
            user_id: 1,
            username: "alice".to_string(),
            expires_at: chrono::Utc::now().timestamp() - 1,
        };
        let token = encode_session(&session, SECRET);

        assert!(decode_session(&token, SECRET).is_none());
    }

    #[test]
    fn test_session_rejects_garbage() {
        assert!(decode_session("", SECRET).is_none());
        assert!(decode_session("no-separators", SECRET).is_none());
        assert!(decode_session("a|b|c|d", SECRET).is_none());
    }
}
