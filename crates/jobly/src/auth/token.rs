//! HS256 JSON Web Tokens carrying a [`Caller`].

use super::Caller;
use crate::config::Config;
use crate::error::{JoblyError, JoblyResult};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Registered and private claims of a caller token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies caller tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.secret_key, config.token_ttl_secs)
    }

    /// Issue a token for `caller`, valid for the configured lifetime.
    pub fn sign(&self, caller: &Caller) -> JoblyResult<String> {
        let iat = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl_secs)
            .map_err(|_| JoblyError::Token(format!("token ttl too large: {}", self.ttl_secs)))?;
        let claims = Claims {
            username: caller.username.clone(),
            is_admin: caller.is_admin,
            iat,
            exp: iat.saturating_add(ttl),
        };
        self.sign_claims(&claims)
    }

    pub(crate) fn sign_claims<T: Serialize>(&self, claims: &T) -> JoblyResult<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    fn validation() -> Validation {
        Validation::new(Algorithm::HS256)
    }

    /// Check signature and expiry, then return the caller the token was issued for.
    ///
    /// Any rejection (bad signature, expired, malformed) is [`JoblyError::Unauthorized`].
    pub fn verify(&self, token: &str) -> JoblyResult<Caller> {
        let data = decode::<Claims>(token, &self.decoding, &Self::validation()).map_err(|e| {
            tracing::debug!(target: "jobly.auth", error = %e, "token rejected");
            JoblyError::unauthorized(format!("invalid token: {e}"))
        })?;
        Ok(Caller {
            username: data.claims.username,
            is_admin: data.claims.is_admin,
        })
    }

    /// Decode without mapping into [`Claims`]; every payload field is kept.
    pub fn verify_raw(&self, token: &str) -> JoblyResult<serde_json::Value> {
        decode::<serde_json::Value>(token, &self.decoding, &Self::validation())
            .map(|data| data.claims)
            .map_err(|e| JoblyError::unauthorized(format!("invalid token: {e}")))
    }
}

/// Result of [`smoke_test`]: the issued token and the payload read back from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmokeReport {
    pub token: String,
    pub decoded: serde_json::Value,
}

/// Sign a fixed test payload with `secret`, verify it, and return both sides.
///
/// The payload is `{"userId": 123, "username": "testuser"}` plus `iat` and a one hour `exp`.
pub fn smoke_test(secret: &str) -> JoblyResult<SmokeReport> {
    let service = TokenService::new(secret, 3600);
    let iat = Utc::now().timestamp();
    let token = service.sign_claims(&json!({
        "userId": 123,
        "username": "testuser",
        "iat": iat,
        "exp": iat + 3600,
    }))?;
    let decoded = service.verify_raw(&token)?;
    tracing::info!(target: "jobly.auth", "token smoke test passed");
    Ok(SmokeReport { token, decoded })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_returns_the_caller() {
        let service = TokenService::new("secret-dev", 3600);
        let token = service.sign(&Caller::admin("root")).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let caller = service.verify(&token).unwrap();
        assert_eq!(caller, Caller::admin("root"));
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = TokenService::new("one", 3600)
            .sign(&Caller::new("alice"))
            .unwrap();
        let err = TokenService::new("two", 3600).verify(&token).unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn tampered_token_is_unauthorized() {
        let service = TokenService::new("secret-dev", 3600);
        let token = service.sign(&Caller::new("alice")).unwrap();
        let forged = TokenService::new("secret-dev", 3600)
            .sign(&Caller::admin("alice"))
            .unwrap();

        // Admin payload with the original signature.
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = forged.split('.').nth(1).unwrap();
        parts[1] = forged_payload;
        let tampered = parts.join(".");

        assert!(service.verify(&tampered).unwrap_err().is_unauthorized());
        assert!(service.verify("not-a-token").unwrap_err().is_unauthorized());
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let service = TokenService::new("secret-dev", 3600);
        let now = Utc::now().timestamp();
        let token = service
            .sign_claims(&Claims {
                username: "alice".into(),
                is_admin: false,
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert!(service.verify(&token).unwrap_err().is_unauthorized());
    }

    #[test]
    fn smoke_test_round_trips_the_fixed_payload() {
        let report = smoke_test("secret-dev").unwrap();
        assert_eq!(report.decoded["userId"], 123);
        assert_eq!(report.decoded["username"], "testuser");
        let iat = report.decoded["iat"].as_i64().unwrap();
        let exp = report.decoded["exp"].as_i64().unwrap();
        assert!(iat <= Utc::now().timestamp());
        assert_eq!(exp - iat, 3600);
        assert_eq!(report.decoded.as_object().unwrap().len(), 4);
    }

    #[test]
    fn service_debug_hides_keys() {
        let service = TokenService::from_config(&Config::default());
        assert_eq!(format!("{service:?}"), "TokenService { ttl_secs: 3600, .. }");
    }
}
