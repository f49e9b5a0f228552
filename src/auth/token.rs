use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // user id
    pub jti: String, // token id, used for revocation
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<u64> {
        self.sub.parse().ok()
    }
}

pub fn issue_token(secret: &str, user_id: u64, ttl_secs: i64) -> Result<(String, Claims)> {
    let exp = (chrono::Utc::now().timestamp() + ttl_secs).max(0) as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        jti: Uuid::new_v4().to_string(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, claims))
}

/// Checks signature and expiry.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_carries_user_and_unique_id() {
        let (token, claims) = issue_token("s3cret", 42, 60).unwrap();
        let decoded = decode_token("s3cret", &token).unwrap();
        assert_eq!(decoded, claims);
        assert_eq!(decoded.user_id(), Some(42));

        let (_, other) = issue_token("s3cret", 42, 60).unwrap();
        assert_ne!(other.jti, claims.jti);
    }

    #[test]
    fn wrong_secret_or_expired_is_rejected() {
        let (token, _) = issue_token("s3cret", 1, 60).unwrap();
        assert!(decode_token("other", &token).is_err());

        let (expired, _) = issue_token("s3cret", 1, -3600).unwrap();
        assert!(decode_token("s3cret", &expired).is_err());
    }
}
