//! Pusher identity from the catalog credential.
//!
//! The credential is a JWT: `base64url(header).base64url(payload).signature`.
//! Only the payload is read here; the catalog verifies the signature.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

use crate::error::IdentityError;
use crate::types::PusherId;

#[derive(Debug, Deserialize)]
struct Claims {
    pusher: Option<String>,
    sub: Option<String>,
}

/// Extract the pusher identity from `token`.
///
/// Prefers the `pusher` claim and falls back to `sub`. An empty claim counts
/// as missing.
pub fn pusher_from_token(token: Option<&str>) -> Result<PusherId, IdentityError> {
    let token = token.map(str::trim).filter(|t| !t.is_empty());
    let Some(token) = token else {
        return Err(IdentityError::MissingToken);
    };

    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_sig), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(IdentityError::MalformedToken);
    };

    // Some issuers keep the padding; the no-pad engine rejects it.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| IdentityError::Decode(e.to_string()))?;
    let claims: Claims =
        serde_json::from_slice(&bytes).map_err(|e| IdentityError::Decode(e.to_string()))?;

    claims
        .pusher
        .filter(|p| !p.is_empty())
        .or(claims.sub.filter(|s| !s.is_empty()))
        .map(PusherId::from)
        .ok_or(IdentityError::MissingClaim)
}
