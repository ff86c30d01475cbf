//! HMAC-SHA256 JSON Web Token verification (and issuance for development).

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::domain::{
    CredentialError, CredentialVerifier, Identity, InvalidCredentialReason, SubjectId, Timestamp,
    VerifiedCredential,
};

/// Claims carried by a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Display name, optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issued at (Unix seconds), optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// Expiration time (Unix seconds)
    pub exp: u64,
}

/// Verifies tokens signed with a shared secret.
pub struct JwtCredentialVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtCredentialVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify a token against the given clock (Unix seconds).
    ///
    /// Only `sub` and `exp` are required. A token without `iat` is treated as
    /// issued at `now_secs`.
    pub fn verify_at(
        &self,
        token: Option<&str>,
        now_secs: i64,
    ) -> Result<VerifiedCredential, CredentialError> {
        let token = match token.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(CredentialError::Missing),
        };

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| CredentialError::Invalid(reason_for(e.kind())))?;
        let claims = data.claims;

        let expires_at = i64::try_from(claims.exp)
            .map_err(|_| CredentialError::Invalid(InvalidCredentialReason::InvalidClaims))?;
        if expires_at <= now_secs {
            return Err(CredentialError::Invalid(InvalidCredentialReason::Expired));
        }
        let issued_at = match claims.iat {
            Some(iat) => i64::try_from(iat)
                .map_err(|_| CredentialError::Invalid(InvalidCredentialReason::InvalidClaims))?,
            None => now_secs,
        };

        let subject_id = SubjectId::new(claims.sub)
            .map_err(|_| CredentialError::Invalid(InvalidCredentialReason::InvalidClaims))?;
        let name = claims
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let name_claimed = name.is_some();
        let display_name = name.unwrap_or_else(|| subject_id.as_str().to_string());

        Ok(VerifiedCredential {
            identity: Identity::new(
                subject_id,
                display_name,
                Timestamp::from_secs(issued_at),
                Timestamp::from_secs(expires_at),
            ),
            name_claimed,
        })
    }

    /// Sign a token for `subject`, valid for `ttl_secs` from `now_secs`.
    pub fn issue_at(
        &self,
        subject: &SubjectId,
        name: Option<&str>,
        now_secs: u64,
        ttl_secs: u64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: subject.as_str().to_string(),
            name: name.map(str::to_string),
            iat: Some(now_secs),
            exp: now_secs.saturating_add(ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Sign a token valid for `ttl_secs` from now.
    pub fn issue(
        &self,
        subject: &SubjectId,
        name: Option<&str>,
        ttl_secs: u64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = u64::try_from(roomcast_shared::time::now_secs()).unwrap_or_default();
        self.issue_at(subject, name, now, ttl_secs)
    }
}

impl CredentialVerifier for JwtCredentialVerifier {
    fn verify(&self, token: Option<&str>) -> Result<VerifiedCredential, CredentialError> {
        self.verify_at(token, roomcast_shared::time::now_secs())
    }
}

fn reason_for(kind: &ErrorKind) -> InvalidCredentialReason {
    match kind {
        ErrorKind::InvalidSignature => InvalidCredentialReason::SignatureMismatch,
        ErrorKind::ExpiredSignature => InvalidCredentialReason::Expired,
        ErrorKind::MissingRequiredClaim(_) | ErrorKind::Json(_) => {
            InvalidCredentialReason::InvalidClaims
        }
        _ => InvalidCredentialReason::Malformed,
    }
}
