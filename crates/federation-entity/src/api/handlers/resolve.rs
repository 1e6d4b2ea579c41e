//! Resolution endpoint
//!
//! Runs trust chain resolution on behalf of a caller. Resolution failures
//! are not HTTP failures: the endpoint answers 200 with `valid = false` and
//! the error list, so callers always get the full audit trail.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::ApiError;
use crate::context::EntityContext;
use crate::resolver::{ChainResult, TrustChainResolver};
use crate::validator::{validate_trust_marks, TrustMarkValidation};

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub trust_anchor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    #[serde(flatten)]
    pub chain: ChainResult,
    /// Verdicts for the target's trust marks, when the chain validated
    pub trust_marks: Vec<TrustMarkValidation>,
}

/// GET /resolve?sub=<url>&trust_anchor=<url>
pub async fn resolve_chain(
    State(ctx): State<Arc<EntityContext>>,
    Query(params): Query<ResolveParams>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let Some(sub) = params.sub.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest(
            "Missing required parameter 'sub'".into(),
        ));
    };
    let Some(trust_anchor) = params.trust_anchor.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest(
            "Missing required parameter 'trust_anchor'".into(),
        ));
    };

    info!(sub = %sub, trust_anchor = %trust_anchor, "Resolution requested");

    let resolver = TrustChainResolver::new(ctx.fetcher.clone());
    let chain = resolver.resolve(&sub, &trust_anchor).await;

    let trust_marks = match (chain.valid, chain.statements.first()) {
        (true, Some(target_config)) => target_config
            .iss()
            .map(|target_id| {
                validate_trust_marks(
                    target_config,
                    target_id,
                    &chain.statements,
                    ctx.clock.now(),
                )
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    Ok(Json(ResolveResponse { chain, trust_marks }))
}
