//! Key custody for a federation entity
//!
//! Each entity generates an RSA-2048 signing key pair at startup. The private
//! half never leaves the process; the public half is published as a JWK with
//! a stable key ID derived from the entity name.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{FederationError, Result};
use crate::jwk::{Jwk, JwkSet};

const RSA_KEY_BITS: usize = 2048;

/// Holds the entity's signing key pair and signs statements with it.
///
/// Construction is initialization: a `KeyManager` cannot exist without a
/// generated key pair, and no accessor returns private key material.
pub struct KeyManager {
    kid: String,
    encoding_key: EncodingKey,
    public_jwk: Jwk,
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("kid", &self.kid)
            .field("encoding_key", &"[redacted]")
            .finish()
    }
}

impl KeyManager {
    /// Generate a fresh RSA-2048 key pair for the named entity.
    ///
    /// The key ID is `<entity_name>-key-1`.
    pub fn initialize(entity_name: &str) -> Result<Self> {
        info!(entity = %entity_name, "Generating RSA key pair");

        let private_key = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
            .map_err(|e| FederationError::KeyInit(format!("RSA generation failed: {}", e)))?;
        let public_key = private_key.to_public_key();

        let pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| FederationError::KeyInit(format!("PKCS#8 encoding failed: {}", e)))?;
        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| FederationError::KeyInit(format!("signing key rejected: {}", e)))?;

        let kid = format!("{}-key-1", entity_name);
        let public_jwk = Jwk {
            kty: "RSA".into(),
            kid: Some(kid.clone()),
            key_use: Some("sig".into()),
            alg: Some("RS256".into()),
            n: Some(URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be())),
            e: Some(URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be())),
        };

        info!(kid = %kid, bits = RSA_KEY_BITS, alg = "RS256", "RSA key pair generated");

        Ok(Self {
            kid,
            encoding_key,
            public_jwk,
        })
    }

    /// Get the key ID
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Get the public half as a JWK
    pub fn public_jwk(&self) -> &Jwk {
        &self.public_jwk
    }

    /// Get the public half wrapped in a single-key JWKS
    pub fn public_jwk_set(&self) -> JwkSet {
        JwkSet {
            keys: vec![self.public_jwk.clone()],
        }
    }

    /// Sign a claim map as a compact RS256 JWT.
    ///
    /// The header is `{alg: "RS256", kid: <key_id>, typ: "JWT"}`.
    pub fn sign_claims(&self, claims: &Map<String, Value>) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.kid.clone());

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| FederationError::Sign(e.to_string()))
    }
}

/// RSA generation is expensive; unit tests share one key pair.
#[cfg(test)]
pub(crate) fn test_keys() -> &'static KeyManager {
    static KEYS: std::sync::OnceLock<KeyManager> = std::sync::OnceLock::new();
    KEYS.get_or_init(|| KeyManager::initialize("node1").unwrap())
}
