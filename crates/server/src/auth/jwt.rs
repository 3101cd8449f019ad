use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use models::role::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: i64,
    pub iat: i64,
    pub role: Role,
}

impl Claims {
    pub fn new(user_id: Uuid, role: Role, expires_in: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            role,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Signs and verifies HS256 session tokens
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expires_in: Duration,
}

impl JwtAuth {
    pub fn new(secret: &[u8], expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            expires_in: Duration::hours(expiry_hours),
        }
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::default(), claims, &self.encoding_key)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }

    /// Issues a token for the user with the configured lifetime
    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, jsonwebtoken::errors::Error> {
        self.encode(&Claims::new(user_id, role, self.expires_in))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_decode() {
        let auth = JwtAuth::new(b"campus-secret", 24);
        let user_id = Uuid::new_v4();

        let token = auth.issue(user_id, Role::Faculty).unwrap();
        let claims = auth.decode(&token).unwrap();

        assert_eq!(claims.user_id(), Some(user_id));
        assert_eq!(claims.role, Role::Faculty);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = JwtAuth::new(b"one", 1)
            .issue(Uuid::new_v4(), Role::Student)
            .unwrap();
        assert!(JwtAuth::new(b"two", 1).decode(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = JwtAuth::new(b"campus-secret", 1);
        let claims = Claims::new(Uuid::new_v4(), Role::Admin, Duration::hours(-2));
        let token = auth.encode(&claims).unwrap();
        assert!(auth.decode(&token).is_err());
    }
}
