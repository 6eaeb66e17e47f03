//! Signed bearer tokens bound to the issuing client's user-agent and IP.
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    login: String,
    user_agent: String,
    ip: String,
    exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("malformed or expired token")]
    Invalid,
    #[error("token was not issued to this user-agent/IP")]
    Unbound,
}

/// Mints and verifies HS256-signed tokens. Holds the signing key and configured lifetime for
/// the lifetime of the process; cheap to clone (wraps only key material and a duration).
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: chrono::Duration,
}

impl TokenCodec {
    pub fn new(signing_key: &str, lifetime: std::time::Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256];
        Self {
            encoding_key: EncodingKey::from_secret(signing_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(signing_key.as_bytes()),
            validation,
            lifetime: chrono::Duration::from_std(lifetime).unwrap_or(chrono::Duration::seconds(3600)),
        }
    }

    /// Issues a fresh token bound to `user_agent`/`ip`, valid for the codec's configured
    /// lifetime from now.
    pub fn issue(
        &self,
        user_id: i64,
        login: &str,
        user_agent: &str,
        ip: &str,
    ) -> anyhow::Result<String> {
        let claims = Claims {
            sub: user_id,
            login: login.to_owned(),
            user_agent: user_agent.to_owned(),
            ip: ip.to_owned(),
            exp: (Utc::now() + self.lifetime).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| anyhow::anyhow!("signing token: {err}"))
    }

    /// Verifies `token`, rejecting malformed payloads, unexpected signing algorithms, invalid
    /// signatures, expired tokens (all folded into `Invalid`, since a client never needs to
    /// distinguish them), and tokens presented from a different user-agent or IP than the one
    /// they were issued to (`Unbound`). Returns the bound user id on success.
    pub fn verify(&self, token: &str, user_agent: &str, ip: &str) -> Result<i64, VerifyError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| VerifyError::Invalid)?;
        if data.claims.user_agent != user_agent || data.claims.ip != ip {
            return Err(VerifyError::Unbound);
        }
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn codec(lifetime_secs: u64) -> TokenCodec {
        TokenCodec::new("test-signing-key", Duration::from_secs(lifetime_secs))
    }

    #[test]
    fn round_trips_a_freshly_issued_token() {
        let codec = codec(3600);
        let token = codec.issue(7, "alice", "curl/8", "127.0.0.1").unwrap();
        assert_eq!(codec.verify(&token, "curl/8", "127.0.0.1").unwrap(), 7);
    }

    #[test]
    fn rejects_a_mismatched_user_agent() {
        let codec = codec(3600);
        let token = codec.issue(7, "alice", "curl/8", "127.0.0.1").unwrap();
        assert!(matches!(
            codec.verify(&token, "curl/9", "127.0.0.1"),
            Err(VerifyError::Unbound)
        ));
    }

    #[test]
    fn rejects_a_mismatched_ip() {
        let codec = codec(3600);
        let token = codec.issue(7, "alice", "curl/8", "127.0.0.1").unwrap();
        assert!(matches!(
            codec.verify(&token, "curl/8", "10.0.0.1"),
            Err(VerifyError::Unbound)
        ));
    }

    #[test]
    fn rejects_an_expired_token() {
        let codec = codec(0);
        let token = codec.issue(7, "alice", "curl/8", "127.0.0.1").unwrap();
        std::thread::sleep(Duration::from_secs(2));
        assert!(matches!(
            codec.verify(&token, "curl/8", "127.0.0.1"),
            Err(VerifyError::Invalid)
        ));
    }

    #[test]
    fn rejects_a_token_signed_with_a_different_key() {
        let issuer = codec(3600);
        let verifier = TokenCodec::new("a-different-key", Duration::from_secs(3600));
        let token = issuer.issue(7, "alice", "curl/8", "127.0.0.1").unwrap();
        assert!(matches!(
            verifier.verify(&token, "curl/8", "127.0.0.1"),
            Err(VerifyError::Invalid)
        ));
    }

    #[test]
    fn rejects_garbage_input() {
        let codec = codec(3600);
        assert!(matches!(
            codec.verify("not.a.token", "curl/8", "127.0.0.1"),
            Err(VerifyError::Invalid)
        ));
    }
}
