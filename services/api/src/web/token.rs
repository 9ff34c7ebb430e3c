//! services/api/src/web/token.rs
//!
//! Signed session token generation and verification.
//!
//! Tokens are HS256 JWTs (header.payload.signature, base64url segments,
//! HMAC-SHA256 over the first two) carried in an HTTP-only cookie. Claims are
//! the decoded identity plus issued-at and expiry timestamps; nothing is
//! persisted server-side.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use lectern_core::domain::{Role, SessionUser};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Session lifetime in seconds (1 hour).
pub const SESSION_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Invalid signature")]
    BadSignature,
    #[error("Token expired")]
    Expired,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    username: String,
    role: Role,
    iat: i64,
    exp: i64,
}

fn sign(input: &str, secret: &str) -> Vec<u8> {
    // HMAC accepts keys of any length, so new_from_slice cannot fail here.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(input.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Issues a signed token for the given identity, expiring after
/// [`SESSION_TTL_SECS`].
pub fn issue(user: &SessionUser, secret: &str) -> String {
    issue_with_ttl(user, secret, SESSION_TTL_SECS)
}

pub(crate) fn issue_with_ttl(user: &SessionUser, secret: &str, ttl_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role,
        iat: now,
        exp: now + ttl_secs,
    };

    // Claims and header are plain serializable structs; serialization only
    // fails on non-string map keys, which neither type contains.
    let header_json = serde_json::to_string(&Header::default()).expect("header serializes");
    let payload_json = serde_json::to_string(&claims).expect("claims serialize");
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json.as_bytes()),
        URL_SAFE_NO_PAD.encode(payload_json.as_bytes())
    );
    let signature = sign(&signing_input, secret);
    format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature))
}

/// Verifies a token's signature and expiry, returning the decoded identity.
pub fn verify(token: &str, secret: &str) -> Result<SessionUser, TokenError> {
    let mut parts = token.split('.');
    let (header_b64, payload_b64, signature_b64) =
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(p), Some(s), None) => (h, p, s),
            _ => return Err(TokenError::Malformed),
        };

    let signing_input = format!("{}.{}", header_b64, payload_b64);
    let expected = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| TokenError::Malformed)?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&expected)
        .map_err(|_| TokenError::BadSignature)?;

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| TokenError::Malformed)?;
    let header: Header =
        serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
    if header.alg != "HS256" {
        return Err(TokenError::Malformed);
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| TokenError::Malformed)?;
    let claims: Claims =
        serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;

    if claims.exp < chrono::Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }

    Ok(SessionUser {
        id: claims.sub,
        username: claims.username,
        role: claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn admin() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn round_trip() {
        let user = admin();
        let token = issue(&user, TEST_SECRET);
        let decoded = verify(&token, TEST_SECRET).unwrap();
        assert_eq!(decoded.id, user.id);
        assert_eq!(decoded.username, "admin");
        assert_eq!(decoded.role, Role::Admin);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue(&admin(), TEST_SECRET);
        assert_eq!(
            verify(&token, "wrong-secret").unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = issue(&admin(), TEST_SECRET);
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(
            br#"{"sub":"00000000-0000-0000-0000-000000000000","username":"x","role":"admin","iat":0,"exp":9999999999}"#,
        );
        parts[1] = &forged;
        let forged_token = parts.join(".");
        assert_eq!(
            verify(&forged_token, TEST_SECRET).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_with_ttl(&admin(), TEST_SECRET, -10);
        assert_eq!(verify(&token, TEST_SECRET).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            verify("not-a-token", TEST_SECRET).unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(
            verify("a.b.c.d", TEST_SECRET).unwrap_err(),
            TokenError::Malformed
        );
    }
}
