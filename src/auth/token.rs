use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims encoded within a session token: the subject's id, denormalized
/// display name fields, and the expiry timestamp.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Issues and verifies session tokens with a process-wide secret.
///
/// The secret is injected once at construction from `Config` and shared as
/// app data; token code never reaches into the environment. Tokens are
/// HS256-signed and expire 24 hours after issuance. Verification failure is a
/// first-class error value, never a panic.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

const TOKEN_TTL_HOURS: i64 = 24;

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs a token binding the user's identity to a 24-hour validity window.
    pub fn issue(
        &self,
        user_id: Uuid,
        first_name: &str,
        last_name: &str,
    ) -> Result<String, AppError> {
        let expiration = chrono::Utc::now()
            .checked_add_signed(chrono::Duration::hours(TOKEN_TTL_HOURS))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            exp: expiration,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            log::error!("failed to sign token: {}", e);
            AppError::Internal("Erro interno do servidor!".into())
        })
    }

    /// Verifies signature and expiry, returning the embedded claims.
    /// Malformed, forged, or expired tokens all collapse into the same
    /// `Unauthorized` rejection.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation_and_verification() {
        let issuer = TokenIssuer::new("segredo_de_teste");
        let user_id = Uuid::new_v4();

        let token = issuer.issue(user_id, "John", "Doe").unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.first_name, "John");
        assert_eq!(claims.last_name, "Doe");
    }

    #[test]
    fn test_tokens_issued_back_to_back_both_verify() {
        let issuer = TokenIssuer::new("segredo_de_teste");
        let user_id = Uuid::new_v4();

        let first = issuer.issue(user_id, "John", "Doe").unwrap();
        let second = issuer.issue(user_id, "John", "Doe").unwrap();

        assert_eq!(issuer.verify(&first).unwrap().sub, user_id);
        assert_eq!(issuer.verify(&second).unwrap().sub, user_id);
    }

    #[test]
    fn test_token_expiration() {
        let issuer = TokenIssuer::new("segredo_de_teste");

        let expiration = chrono::Utc::now()
            .checked_sub_signed(chrono::Duration::hours(2))
            .expect("valid timestamp")
            .timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            exp: expiration,
        };
        let expired_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("segredo_de_teste".as_bytes()),
        )
        .unwrap();

        match issuer.verify(&expired_token) {
            Err(AppError::Unauthorized(msg)) => {
                assert_eq!(msg, "Token inválido ou expirado!");
            }
            Ok(_) => panic!("expired token must not verify"),
            Err(e) => panic!("unexpected error type: {:?}", e),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let issuer = TokenIssuer::new("um_segredo");
        let forger = TokenIssuer::new("outro_segredo");

        let forged = forger.issue(Uuid::new_v4(), "John", "Doe").unwrap();

        match issuer.verify(&forged) {
            Err(AppError::Unauthorized(msg)) => {
                assert_eq!(msg, "Token inválido ou expirado!");
            }
            Ok(_) => panic!("token signed with another secret must not verify"),
            Err(e) => panic!("unexpected error type: {:?}", e),
        }
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let issuer = TokenIssuer::new("segredo_de_teste");
        assert!(issuer.verify("nem.um.jwt").is_err());
        assert!(issuer.verify("").is_err());
    }
}
