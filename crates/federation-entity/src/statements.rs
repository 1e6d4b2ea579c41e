//! Entity Statement builders
//!
//! Assembles and signs the two statement shapes this entity serves: its own
//! Entity Configuration (self-signed, `iss == sub`) and Subordinate
//! Statements about registered subordinates (`iss != sub`).

use serde_json::{json, Map, Value};
use uuid::Uuid;

use federation_core::error::{FederationError, Result};

use crate::context::EntityContext;

/// Statement lifetime: one year
pub const STATEMENT_TTL_SECS: i64 = 31_536_000;

/// Assemble the claims of this entity's Entity Configuration.
pub fn entity_configuration_claims(ctx: &EntityContext) -> Map<String, Value> {
    let now = ctx.clock.now();
    let entity_id = ctx.state.entity_id();

    let mut claims = Map::new();
    claims.insert("iss".into(), json!(entity_id));
    claims.insert("sub".into(), json!(entity_id));
    claims.insert("iat".into(), json!(now));
    claims.insert("exp".into(), json!(now + STATEMENT_TTL_SECS));
    claims.insert("jti".into(), json!(Uuid::new_v4().to_string()));
    claims.insert("jwks".into(), ctx.keys.public_jwk_set().to_value());

    let metadata = ctx.state.metadata();
    if !metadata.is_empty() {
        claims.insert("metadata".into(), Value::Object(metadata));
    } else {
        claims.insert(
            "metadata".into(),
            json!({
                "federation_entity": {
                    "federation_fetch_endpoint": ctx.settings.fetch_endpoint(),
                    "federation_list_endpoint": ctx.settings.list_endpoint(),
                }
            }),
        );
    }

    let hints = ctx.state.authority_hints();
    if !hints.is_empty() {
        claims.insert("authority_hints".into(), json!(hints));
    }

    let marks: Vec<String> = ctx
        .state
        .received_trust_marks()
        .into_iter()
        .filter(|tm| tm.subject == entity_id)
        .map(|tm| tm.signed_jwt)
        .collect();
    if !marks.is_empty() {
        claims.insert("trust_marks".into(), json!(marks));
    }

    claims
}

/// Build and sign this entity's Entity Configuration JWT.
pub fn signed_entity_configuration(ctx: &EntityContext) -> Result<String> {
    let claims = entity_configuration_claims(ctx);
    ctx.keys.sign_claims(&claims)
}

/// Assemble the claims of a Subordinate Statement about a registered
/// subordinate. Fails when no record exists.
pub fn subordinate_statement_claims(
    ctx: &EntityContext,
    subordinate_id: &str,
) -> Result<Map<String, Value>> {
    let record = ctx
        .state
        .subordinate(subordinate_id)
        .ok_or_else(|| FederationError::UnknownSubordinate(subordinate_id.to_string()))?;

    let now = ctx.clock.now();

    let mut claims = Map::new();
    claims.insert("iss".into(), json!(ctx.state.entity_id()));
    claims.insert("sub".into(), json!(record.entity_id));
    claims.insert("aud".into(), json!(record.entity_id));
    claims.insert("iat".into(), json!(now));
    claims.insert("exp".into(), json!(now + STATEMENT_TTL_SECS));
    claims.insert("jti".into(), json!(Uuid::new_v4().to_string()));

    if let Some(jwks) = record.jwks {
        claims.insert("jwks".into(), jwks);
    }

    if !record.metadata.is_empty() {
        claims.insert("metadata".into(), Value::Object(record.metadata));
    }

    claims.insert(
        "source_endpoint".into(),
        json!(format!(
            "{}?sub={}",
            ctx.settings.fetch_endpoint(),
            subordinate_id
        )),
    );

    Ok(claims)
}

/// Build and sign a Subordinate Statement JWT.
pub fn signed_subordinate_statement(ctx: &EntityContext, subordinate_id: &str) -> Result<String> {
    let claims = subordinate_statement_claims(ctx, subordinate_id)?;
    ctx.keys.sign_claims(&claims)
}
