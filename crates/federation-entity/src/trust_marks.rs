//! Trust mark issuance and intake
//!
//! A trust mark is a signed assertion by an issuer that a subject entity
//! meets criteria identified by a trust mark ID URL. This entity can mint
//! marks about others and record marks others minted about it.

use serde_json::{json, Map, Value};
use tracing::info;

use federation_core::error::{FederationError, Result};
use federation_core::jwt;

use crate::context::EntityContext;
use crate::state::TrustMarkRecord;

/// Issue a signed trust mark about `subject` and record it.
///
/// Returns the compact JWT; claims are `{iss, sub, id, iat}` plus `exp` when
/// a validity period is given.
pub fn issue_trust_mark(
    ctx: &EntityContext,
    trust_mark_id: &str,
    subject: &str,
    expires_in: Option<i64>,
) -> Result<String> {
    let now = ctx.clock.now();
    let entity_id = ctx.state.entity_id();

    info!(id = %trust_mark_id, sub = %subject, iss = %entity_id, "Issuing trust mark");

    let mut claims = Map::new();
    claims.insert("iss".into(), json!(entity_id));
    claims.insert("sub".into(), json!(subject));
    claims.insert("id".into(), json!(trust_mark_id));
    claims.insert("iat".into(), json!(now));

    let expires_at = expires_in.map(|secs| now + secs);
    if let Some(exp) = expires_at {
        claims.insert("exp".into(), json!(exp));
    }

    let signed_jwt = ctx.keys.sign_claims(&claims)?;

    ctx.state.add_issued_trust_mark(TrustMarkRecord {
        id: trust_mark_id.to_string(),
        issuer: entity_id.to_string(),
        subject: subject.to_string(),
        issued_at: now,
        expires_at,
        signed_jwt: signed_jwt.clone(),
    });

    Ok(signed_jwt)
}

/// Record a trust mark another entity issued about this one.
///
/// The JWT is parsed without signature verification; callers verify at
/// resolution time, when the issuer's keys are available through a chain.
/// The mark must name this entity as its subject.
pub fn add_received_trust_mark(ctx: &EntityContext, signed_jwt: &str) -> Result<TrustMarkRecord> {
    let claims = jwt::parse_unverified(signed_jwt)?;

    let id = required_str(&claims, "id")?;
    let issuer = required_str(&claims, "iss")?;
    let subject = required_str(&claims, "sub")?;

    let entity_id = ctx.state.entity_id();
    if subject != entity_id {
        return Err(FederationError::SubjectMismatch {
            expected: entity_id.to_string(),
            actual: subject,
        });
    }

    let record = TrustMarkRecord {
        id,
        issuer,
        subject,
        issued_at: claims.get("iat").and_then(Value::as_i64).unwrap_or(0),
        expires_at: claims.get("exp").and_then(Value::as_i64),
        signed_jwt: signed_jwt.to_string(),
    };

    ctx.state.add_received_trust_mark(record.clone());
    Ok(record)
}

fn required_str(claims: &Map<String, Value>, name: &str) -> Result<String> {
    claims
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| FederationError::InvalidJwt(format!("trust mark missing '{}' claim", name)))
}
