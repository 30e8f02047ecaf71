//! HS256 bearer tokens: issuing and validating.
//!
//! The only shared state is the immutable key pair derived once from the
//! configured secret, so a `TokenService` can sit behind an `Arc` and be used
//! from every request without locking.
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::services::auth::principal::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token signature does not match")]
    SignatureInvalid,
    #[error("token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
    #[error("failed to sign token")]
    Signing,
}

/// Payload of an access token. Times are epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    issuer: String,
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    /// `secret_base64` is the standard-alphabet base64 encoding of the HMAC key.
    pub fn new(secret_base64: &str, issuer: &str, ttl_seconds: u64) -> Result<Self, String> {
        let secret = base64::engine::general_purpose::STANDARD
            .decode(secret_base64)
            .map_err(|e| format!("signing secret is not valid base64: {}", e))?;
        if secret.is_empty() {
            return Err("signing secret is empty".to_string());
        }

        let encoding_key = EncodingKey::from_base64_secret(secret_base64)
            .map_err(|e| format!("invalid signing secret: {}", e))?;
        let decoding_key = DecodingKey::from_base64_secret(secret_base64)
            .map_err(|e| format!("invalid signing secret: {}", e))?;

        let ttl_seconds =
            i64::try_from(ttl_seconds).map_err(|_| "token lifetime out of range".to_string())?;

        // Expiry is compared against an injectable clock in `validate_at`,
        // so the library's own wall-clock check stays off.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self {
            issuer: issuer.to_string(),
            ttl: Duration::seconds(ttl_seconds),
            encoding_key,
            decoding_key,
            validation,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: &str, role: Role) -> Result<String, TokenError> {
        self.issue_at(subject, role, Utc::now())
    }

    /// Issued-at has second resolution; the lifetime starts at the truncated instant.
    pub fn issue_at(
        &self,
        subject: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = TokenClaims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            role,
            iat,
            exp: iat + self.ttl.num_seconds(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            TokenError::Signing
        })
    }

    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let claims = self.verified_claims(token, now)?;
        serde_json::from_value(Value::Object(claims))
            .map_err(|e| TokenError::Malformed(format!("unexpected claims: {}", e)))
    }

    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        self.validate(token).map(|claims| claims.sub)
    }

    /// Returns a single payload claim of a verified token, `None` when absent.
    pub fn extract_claim(&self, token: &str, name: &str) -> Result<Option<Value>, TokenError> {
        let mut claims = self.verified_claims(token, Utc::now())?;
        Ok(claims.remove(name))
    }

    fn verified_claims(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Map<String, Value>, TokenError> {
        check_structure(token)?;

        let data = jsonwebtoken::decode::<Map<String, Value>>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .map_err(classify)?;

        let exp = data
            .claims
            .get("exp")
            .and_then(Value::as_i64)
            .ok_or_else(|| TokenError::Malformed("'exp' is not an integer".to_string()))?;
        let expired_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| TokenError::Malformed("'exp' out of range".to_string()))?;

        if now >= expired_at {
            return Err(TokenError::Expired { expired_at });
        }

        Ok(data.claims)
    }
}

// Header and payload must be base64url JSON objects before the signature is
// even looked at; anything failing here is malformed, not forged.
fn check_structure(token: &str) -> Result<(), TokenError> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(_), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed(
            "expected three dot-separated segments".to_string(),
        ));
    };

    for (name, segment) in [("header", header), ("payload", payload)] {
        let bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|_| TokenError::Malformed(format!("{} is not base64url", name)))?;
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(_)) => {}
            _ => return Err(TokenError::Malformed(format!("{} is not a JSON object", name))),
        }
    }

    Ok(())
}

fn classify(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::InvalidSignature | ErrorKind::Base64(_) => TokenError::SignatureInvalid,
        _ => {
            warn!(error = %e, "token rejected");
            TokenError::Malformed(e.to_string())
        }
    }
}
