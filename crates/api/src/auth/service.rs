//! Token issuance and validation against the credential store.

use std::sync::Arc;

use serde::Serialize;

use super::credentials::CredentialStore;
use super::jwt::{generate_access_token, validate_token, JwtConfig};
use super::password::verify_password;

/// Token type reported alongside every issued token.
pub const TOKEN_TYPE_BEARER: &str = "bearer";

/// Authentication failures visible to callers.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    InvalidToken,

    /// Signing failed; a server-side problem, not the caller's.
    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Response body of a successful token request.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Issues and validates bearer tokens.
///
/// Holds the signing configuration and the credential store; both are fixed
/// at construction and shared read-only.
pub struct TokenService {
    jwt: JwtConfig,
    store: Arc<dyn CredentialStore>,
}

impl TokenService {
    pub fn new(jwt: JwtConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self { jwt, store }
    }

    /// Check `username`/`password` against the store and sign a new token.
    pub fn issue_token(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let Some(record) = self.store.lookup(username) else {
            tracing::debug!(username, "Token request for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        match verify_password(password, &record.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(username, "Token request with wrong password");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(username, error = %e, "Stored password hash could not be verified");
                return Err(AuthError::InvalidCredentials);
            }
        }

        let access_token = generate_access_token(&record.username, &self.jwt)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        tracing::info!(username, "Issued access token");
        Ok(IssuedToken {
            access_token,
            token_type: TOKEN_TYPE_BEARER,
            expires_in: self.jwt.expires_in_secs(),
        })
    }

    /// Validate a bearer token and return the username it was issued to.
    ///
    /// Signature, structure, expiry and subject existence are all checked;
    /// every failure is reported as [`AuthError::InvalidToken`].
    pub fn validate_token(&self, token: &str) -> Result<String, AuthError> {
        let claims = validate_token(token, &self.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            AuthError::InvalidToken
        })?;

        if self.store.lookup(&claims.sub).is_none() {
            tracing::debug!(username = %claims.sub, "Token subject no longer exists");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use assert_matches::assert_matches;
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;
    use crate::auth::credentials::{CredentialRecord, InMemoryCredentialStore};
    use crate::auth::password::hash_password;

    const SECRET: &str = "unit-test-secret-for-token-service";

    fn testuser_hash() -> &'static str {
        static HASH: OnceLock<String> = OnceLock::new();
        HASH.get_or_init(|| hash_password("testpassword").expect("hashing should succeed"))
    }

    fn store(usernames: &[&str]) -> Arc<dyn CredentialStore> {
        let records = usernames.iter().map(|u| CredentialRecord {
            username: u.to_string(),
            password_hash: testuser_hash().to_string(),
        });
        Arc::new(InMemoryCredentialStore::from_records(records).unwrap())
    }

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: SECRET.to_string(),
            access_token_expiry_mins: 30,
        }
    }

    fn service() -> TokenService {
        TokenService::new(jwt(), store(&["testuser"]))
    }

    #[test]
    fn issued_token_validates_to_username() {
        let service = service();
        let issued = service.issue_token("testuser", "testpassword").unwrap();

        assert_eq!(issued.token_type, "bearer");
        assert_eq!(issued.expires_in, 1800);
        assert_eq!(service.validate_token(&issued.access_token).unwrap(), "testuser");
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        assert_matches!(
            service().issue_token("testuser", "not-the-password"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn unknown_user_is_invalid_credentials() {
        assert_matches!(
            service().issue_token("nobody", "testpassword"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn expired_token_is_invalid() {
        let now = chrono::Utc::now().timestamp();
        let token = encode(
            &Header::default(),
            &serde_json::json!({ "sub": "testuser", "exp": now - 1, "iat": now - 1801, "jti": "j" }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_matches!(service().validate_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn tampered_signature_is_invalid() {
        let service = service();
        let token = service.issue_token("testuser", "testpassword").unwrap().access_token;

        let (unsigned, signature) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{unsigned}.{}", chars.into_iter().collect::<String>());

        assert_matches!(service.validate_token(&tampered), Err(AuthError::InvalidToken));
    }

    #[test]
    fn swapped_payload_is_invalid() {
        let service = TokenService::new(jwt(), store(&["testuser", "admin"]));
        let token = service.issue_token("testuser", "testpassword").unwrap().access_token;

        let forged = encode(
            &Header::default(),
            &serde_json::json!({ "sub": "admin", "exp": chrono::Utc::now().timestamp() + 600 }),
            &EncodingKey::from_secret(b"attacker-secret"),
        )
        .unwrap();

        let original_sig = token.rsplit_once('.').unwrap().1;
        let forged_unsigned = forged.rsplit_once('.').unwrap().0;
        let spliced = format!("{forged_unsigned}.{original_sig}");

        assert_matches!(service.validate_token(&spliced), Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_for_removed_subject_is_invalid() {
        let issuer = TokenService::new(jwt(), store(&["testuser", "former"]));
        let token = issuer.issue_token("former", "testpassword").unwrap().access_token;

        let validator = service();
        assert_matches!(validator.validate_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert_matches!(service().validate_token("abc.def.ghi"), Err(AuthError::InvalidToken));
    }
}
