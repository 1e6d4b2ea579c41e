//! Trust mark validation
//!
//! Checks the trust marks carried by an Entity Configuration against a
//! resolved trust chain: a mark is only as good as a chain statement proving
//! its issuer's keys.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use federation_core::jwt;
use federation_core::statement::Statement;

/// Verdict for a single trust mark
#[derive(Debug, Clone, Serialize)]
pub struct TrustMarkValidation {
    /// Trust mark type identifier, when parseable
    pub trust_mark_id: Option<String>,
    pub issuer: Option<String>,
    pub subject: Option<String>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrustMarkValidation {
    fn invalid(self, error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            ..self
        }
    }
}

/// Validate every trust mark in `entity_config`, one verdict per mark.
///
/// A mark is valid when it names `expected_subject`, is unexpired at `now`,
/// and its signature verifies against the JWKS of a chain statement issued
/// by the mark's issuer.
pub fn validate_trust_marks(
    entity_config: &Statement,
    expected_subject: &str,
    chain: &[Statement],
    now: i64,
) -> Vec<TrustMarkValidation> {
    entity_config
        .trust_marks()
        .iter()
        .map(|mark_jwt| validate_trust_mark(mark_jwt, expected_subject, chain, now))
        .collect()
}

fn validate_trust_mark(
    mark_jwt: &str,
    expected_subject: &str,
    chain: &[Statement],
    now: i64,
) -> TrustMarkValidation {
    let claims = match jwt::parse_unverified(mark_jwt) {
        Ok(claims) => claims,
        Err(e) => {
            return TrustMarkValidation {
                trust_mark_id: None,
                issuer: None,
                subject: None,
                valid: false,
                error: Some(format!("malformed trust mark: {}", e)),
            }
        }
    };

    let str_claim = |name: &str| claims.get(name).and_then(Value::as_str).map(String::from);
    let verdict = TrustMarkValidation {
        trust_mark_id: str_claim("id"),
        issuer: str_claim("iss"),
        subject: str_claim("sub"),
        valid: false,
        error: None,
    };

    if verdict.subject.as_deref() != Some(expected_subject) {
        return verdict.invalid("trust mark subject mismatch");
    }

    if let Some(exp) = claims.get("exp").and_then(Value::as_i64) {
        if exp < now {
            return verdict.invalid("trust mark expired");
        }
    }

    let Some(issuer) = verdict.issuer.clone() else {
        return verdict.invalid("trust mark has no issuer");
    };

    let Some(issuer_statement) = chain.iter().find(|s| s.iss() == Some(issuer.as_str())) else {
        return verdict.invalid("trust mark issuer not in chain");
    };

    let Some(issuer_jwks) = issuer_statement.jwks() else {
        return verdict.invalid("issuer statement carries no jwks");
    };

    if jwt::verify_statement(mark_jwt, &issuer_jwks).is_none() {
        return verdict.invalid("trust mark signature verification failed");
    }

    debug!(id = ?verdict.trust_mark_id, iss = %issuer, "Trust mark validated");
    TrustMarkValidation {
        valid: true,
        ..verdict
    }
}
