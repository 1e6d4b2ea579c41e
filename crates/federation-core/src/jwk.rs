//! JWK and JWKS types
//!
//! Public keys travel through the federation as JSON Web Key Sets embedded
//! in Entity Statements. Only RSA signing keys are meaningful here; RS256 is
//! the single supported algorithm.

use serde::{Deserialize, Serialize};

use crate::error::{FederationError, Result};

/// A single JSON Web Key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA")
    pub kty: String,
    /// Key ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Use ("sig" for signing)
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// Algorithm ("RS256")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// RSA modulus, base64url without padding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA public exponent, base64url without padding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

impl Jwk {
    /// Whether this key is usable for RS256 signature verification
    pub fn is_rsa(&self) -> bool {
        self.kty == "RSA"
    }
}

/// A JSON Web Key Set: `{"keys": [ ... ]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Find a key by its key ID
    pub fn find_by_kid(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }

    /// Parse a JWKS from a JSON value (e.g. the `jwks` claim of a statement)
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| FederationError::Serialization(format!("invalid jwks: {}", e)))
    }

    /// Render the set as a JSON value for embedding in statement claims
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("JwkSet serialization is infallible")
    }
}
