//! Signing and verification of Entity Statements
//!
//! All statements in the federation are compact-serialized RS256 JWTs. The
//! verifier looks the signing key up by `kid` in a supplied JWKS and checks
//! the signature only; `exp`, `iat` and `aud` are policy decisions left to
//! callers.

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{FederationError, Result};
use crate::jwk::JwkSet;

/// Claim map of a decoded statement
pub type Claims = Map<String, Value>;

/// Signature-only validation: structural checks stay, temporal checks are off.
fn signature_only_validation(alg: Algorithm) -> Validation {
    let mut validation = Validation::new(alg);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Verify a statement's RS256 signature against a supplied JWKS.
///
/// Returns the decoded claim map, or `None` if the header `kid` is absent
/// from the set, the key is not RSA, or the signature does not verify.
pub fn verify_statement(jwt: &str, jwks: &JwkSet) -> Option<Claims> {
    let header = match decode_header(jwt) {
        Ok(header) => header,
        Err(e) => {
            warn!(error = %e, "Failed to parse JWT header");
            return None;
        }
    };

    let Some(kid) = header.kid.as_deref() else {
        warn!("JWT header carries no kid");
        return None;
    };
    debug!(kid = %kid, "Verifying JWT signature");

    let Some(jwk) = jwks.find_by_kid(kid) else {
        warn!(kid = %kid, "Key not found in JWKS");
        return None;
    };

    if !jwk.is_rsa() {
        warn!(kid = %kid, kty = %jwk.kty, "Key is not an RSA key");
        return None;
    }

    let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
        warn!(kid = %kid, "RSA key is missing modulus or exponent");
        return None;
    };

    let decoding_key = match DecodingKey::from_rsa_components(n, e) {
        Ok(key) => key,
        Err(e) => {
            warn!(kid = %kid, error = %e, "Invalid RSA key components");
            return None;
        }
    };

    match decode::<Claims>(jwt, &decoding_key, &signature_only_validation(Algorithm::RS256)) {
        Ok(data) => {
            debug!(kid = %kid, "JWT signature verified");
            Some(data.claims)
        }
        Err(e) => {
            warn!(kid = %kid, error = %e, "JWT signature verification failed");
            None
        }
    }
}

/// Verify a self-signed Entity Configuration.
///
/// The JWKS is extracted from the token's own claims and the signature is
/// checked against it. This is deliberately distinct from verification
/// against a trusted key set: an Entity Configuration vouches only that its
/// issuer controls the keys it publishes.
pub fn verify_self_signed(jwt: &str) -> Option<Claims> {
    let claims = match parse_unverified(jwt) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(error = %e, "Failed to parse entity configuration");
            return None;
        }
    };

    let Some(jwks_value) = claims.get("jwks") else {
        warn!("Entity configuration carries no jwks claim");
        return None;
    };

    let jwks = match JwkSet::from_value(jwks_value) {
        Ok(jwks) => jwks,
        Err(e) => {
            warn!(error = %e, "Entity configuration jwks claim is malformed");
            return None;
        }
    };

    verify_statement(jwt, &jwks)
}

/// Parse a JWT's claims without verifying its signature.
///
/// Used for reading claims before verification is possible (e.g. an inbound
/// trust mark whose issuer keys are only known at resolution time).
pub fn parse_unverified(jwt: &str) -> Result<Claims> {
    let header =
        decode_header(jwt).map_err(|e| FederationError::InvalidJwt(e.to_string()))?;

    let mut validation = signature_only_validation(header.alg);
    validation.insecure_disable_signature_validation();

    decode::<Claims>(jwt, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| FederationError::InvalidJwt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{test_keys, KeyManager};
    use serde_json::json;

    fn sample_claims() -> Claims {
        let value = json!({
            "iss": "https://node1.example.com",
            "sub": "https://node1.example.com",
            "iat": 1_700_000_000,
            "exp": 1_731_536_000,
            "jti": "b1946ac9-2f6e-4c43-9b5c-3c3bb3d0a3a1",
        });
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let keys = test_keys();
        let claims = sample_claims();

        let jwt = keys.sign_claims(&claims).unwrap();
        let verified = verify_statement(&jwt, &keys.public_jwk_set()).unwrap();

        assert_eq!(verified, claims);
    }

    #[test]
    fn test_verify_fails_with_wrong_key() {
        let keys = test_keys();
        let other = KeyManager::initialize("node2").unwrap();

        let jwt = keys.sign_claims(&sample_claims()).unwrap();

        // node2's set has no node1 kid
        assert!(verify_statement(&jwt, &other.public_jwk_set()).is_none());
    }

    #[test]
    fn test_verify_fails_with_swapped_key_material() {
        let keys = test_keys();
        let other = KeyManager::initialize("node2").unwrap();

        let jwt = keys.sign_claims(&sample_claims()).unwrap();

        // Same kid, different modulus: the lookup succeeds, the signature fails
        let mut impostor = other.public_jwk().clone();
        impostor.kid = Some(keys.kid().to_string());
        let jwks = JwkSet { keys: vec![impostor] };

        assert!(verify_statement(&jwt, &jwks).is_none());
    }

    #[test]
    fn test_verify_fails_with_non_rsa_key() {
        let keys = test_keys();
        let jwt = keys.sign_claims(&sample_claims()).unwrap();

        let mut jwk = keys.public_jwk().clone();
        jwk.kty = "EC".into();
        let jwks = JwkSet { keys: vec![jwk] };

        assert!(verify_statement(&jwt, &jwks).is_none());
    }

    #[test]
    fn test_verify_fails_on_tampered_signature() {
        let keys = test_keys();
        let jwt = keys.sign_claims(&sample_claims()).unwrap();

        // Flip a character in the signature segment
        let mut tampered = jwt.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(verify_statement(&tampered, &keys.public_jwk_set()).is_none());
    }

    #[test]
    fn test_self_signed_verification() {
        let keys = test_keys();

        let mut claims = sample_claims();
        claims.insert("jwks".into(), keys.public_jwk_set().to_value());

        let jwt = keys.sign_claims(&claims).unwrap();
        let verified = verify_self_signed(&jwt).unwrap();

        assert_eq!(verified["iss"], "https://node1.example.com");
    }

    #[test]
    fn test_self_signed_requires_jwks_claim() {
        let keys = test_keys();
        let jwt = keys.sign_claims(&sample_claims()).unwrap();

        assert!(verify_self_signed(&jwt).is_none());
    }

    #[test]
    fn test_parse_unverified_ignores_signature() {
        let keys = test_keys();
        let jwt = keys.sign_claims(&sample_claims()).unwrap();

        let mut tampered = jwt.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        let claims = parse_unverified(&tampered).unwrap();
        assert_eq!(claims["sub"], "https://node1.example.com");
    }

    #[test]
    fn test_parse_unverified_rejects_garbage() {
        assert!(parse_unverified("not-a-jwt").is_err());
    }

    #[test]
    fn test_verification_does_not_enforce_exp() {
        let keys = test_keys();

        let mut claims = sample_claims();
        // Long in the past
        claims.insert("exp".into(), json!(1_000_000));

        let jwt = keys.sign_claims(&claims).unwrap();
        assert!(verify_statement(&jwt, &keys.public_jwk_set()).is_some());
    }
}
