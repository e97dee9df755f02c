//! Verification of Google-issued ID tokens presented at login.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use log::{debug, warn};
use serde::{Deserialize, Deserializer};

use crate::config::Config;
use crate::error::AuthError;

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, AuthError>;
}

// Google sends a bool in ID tokens but a string from some endpoints.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(false),
        Some(BoolOrString::Bool(b)) => Ok(b),
        Some(BoolOrString::Str(s)) => Ok(s.eq_ignore_ascii_case("true")),
    }
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    email_verified: bool,
    name: Option<String>,
}

pub struct GoogleIdentityVerifier {
    client: reqwest::Client,
    certs_url: String,
    validation: Validation,
}

impl GoogleIdentityVerifier {
    pub fn new(audience: &str, certs_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[audience]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        Ok(Self {
            client,
            certs_url: certs_url.into(),
            validation,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        Self::new(&config.google_client_id, config.google_certs_url.clone())
    }

    async fn fetch_keys(&self) -> Result<JwkSet, AuthError> {
        let keys = self
            .client
            .get(&self.certs_url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;
        debug!("Fetched {} signing keys from {}", keys.keys.len(), self.certs_url);
        Ok(keys)
    }

    /// Checks `credential` against an already fetched key set.
    pub fn verify_with_keys(
        &self,
        keys: &JwkSet,
        credential: &str,
    ) -> Result<VerifiedIdentity, AuthError> {
        let invalid = |e: jsonwebtoken::errors::Error| AuthError::IdentityInvalid(e.to_string());

        let header = jsonwebtoken::decode_header(credential).map_err(invalid)?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::IdentityInvalid("token has no key id".into()))?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| AuthError::IdentityInvalid(format!("unknown key id {kid}")))?;
        let key = DecodingKey::from_jwk(jwk).map_err(invalid)?;

        let claims = jsonwebtoken::decode::<GoogleClaims>(credential, &key, &self.validation)
            .map_err(invalid)?
            .claims;

        let email = claims
            .email
            .ok_or_else(|| AuthError::IdentityInvalid("token carries no email".into()))?;
        if !claims.email_verified {
            return Err(AuthError::IdentityInvalid(format!(
                "email {email} is not verified"
            )));
        }

        Ok(VerifiedIdentity {
            email,
            name: claims.name,
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, AuthError> {
        let keys = self.fetch_keys().await.inspect_err(|e| {
            warn!("Could not fetch identity provider keys: {}", e);
        })?;
        self.verify_with_keys(&keys, credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const TEST_KEY_PEM: &str = include_str!("testdata/rsa_test_key.pem");
    const TEST_KEY_N: &str = "pOPlni_PTCA8SpdsZrbqMzMd0jVPpVM7guIXrHiCITZJdcHRt1DT19fdzmKh1F1lO-pXWg2z2gEDYIzACsHZiY8TPAGa0i4pVjO1fOgJhx7I7jJq_kArbgPpRHAXfjzjyqYJYzVOL5ggeh52JiSRB3rEij9G7Yth3b--M5ioxFKKaroNURnMWpJz_S1E19gPEAeWuXJ1UreUHFQ7VuRLdH8hudH8SObCDAjSwUoiQHvTNkDTKITJRfsRHcSzrZt2M2UYNdfARbuak_qcJB9GRuTro7YFghEnGNNHhROECNtTTz_-ghbflXxkgpFZjNpWaAhR0ZvNWfO6C4lX84eV3w";
    const AUDIENCE: &str = "ironlog-test.apps.googleusercontent.com";

    fn key_set() -> JwkSet {
        serde_json::from_value(json!({
            "keys": [{
                "kty": "RSA",
                "kid": "test-key",
                "alg": "RS256",
                "use": "sig",
                "n": TEST_KEY_N,
                "e": "AQAB"
            }]
        }))
        .unwrap()
    }

    fn sign(kid: &str, claims: serde_json::Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        let key = EncodingKey::from_rsa_pem(TEST_KEY_PEM.as_bytes()).unwrap();
        jsonwebtoken::encode(&header, &claims, &key).unwrap()
    }

    fn claims(audience: &str, email_verified: bool) -> serde_json::Value {
        let now = Utc::now().timestamp();
        json!({
            "iss": "https://accounts.google.com",
            "aud": audience,
            "iat": now,
            "exp": now + 3600,
            "email": "a@x.com",
            "email_verified": email_verified,
            "name": "Ada Lifter"
        })
    }

    fn verifier() -> GoogleIdentityVerifier {
        GoogleIdentityVerifier::new(AUDIENCE, "http://127.0.0.1:9/certs").unwrap()
    }

    #[test]
    fn valid_credential_yields_email() {
        let credential = sign("test-key", claims(AUDIENCE, true));
        let identity = verifier().verify_with_keys(&key_set(), &credential).unwrap();

        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.name.as_deref(), Some("Ada Lifter"));
    }

    #[test]
    fn audience_mismatch_rejected() {
        let credential = sign("test-key", claims("someone-else", true));
        let result = verifier().verify_with_keys(&key_set(), &credential);
        assert!(matches!(result, Err(AuthError::IdentityInvalid(_))));
    }

    #[test]
    fn unverified_email_rejected() {
        let credential = sign("test-key", claims(AUDIENCE, false));
        let result = verifier().verify_with_keys(&key_set(), &credential);
        assert!(matches!(result, Err(AuthError::IdentityInvalid(_))));
    }

    #[test]
    fn unknown_key_id_rejected() {
        let credential = sign("rotated-away", claims(AUDIENCE, true));
        let result = verifier().verify_with_keys(&key_set(), &credential);
        assert!(matches!(result, Err(AuthError::IdentityInvalid(_))));
    }

    #[test]
    fn expired_credential_rejected() {
        let mut expired = claims(AUDIENCE, true);
        expired["exp"] = json!(Utc::now().timestamp() - 3600);
        let credential = sign("test-key", expired);
        let result = verifier().verify_with_keys(&key_set(), &credential);
        assert!(matches!(result, Err(AuthError::IdentityInvalid(_))));
    }

    #[test]
    fn malformed_credential_rejected() {
        let result = verifier().verify_with_keys(&key_set(), "definitely-not-a-jwt");
        assert!(matches!(result, Err(AuthError::IdentityInvalid(_))));
    }

    #[test]
    fn string_email_verified_flag_accepted() {
        let mut c = claims(AUDIENCE, true);
        c["email_verified"] = json!("true");
        let credential = sign("test-key", c);
        assert!(verifier().verify_with_keys(&key_set(), &credential).is_ok());
    }
}
