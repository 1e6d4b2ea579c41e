//! Subordinate fetch endpoint
//!
//! Serves signed Subordinate Statements about registered subordinates.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::api::error::ApiError;
use crate::api::handlers::wellknown::ENTITY_STATEMENT_CONTENT_TYPE;
use crate::context::EntityContext;
use crate::statements::signed_subordinate_statement;

#[derive(Debug, Deserialize)]
pub struct FetchParams {
    #[serde(default)]
    pub sub: Option<String>,
}

/// GET /fetch?sub=<entity_id>
pub async fn fetch_subordinate(
    State(ctx): State<Arc<EntityContext>>,
    Query(params): Query<FetchParams>,
) -> Result<Response, ApiError> {
    let Some(sub) = params.sub.filter(|s| !s.is_empty()) else {
        warn!("Fetch request without 'sub' parameter");
        return Err(ApiError::BadRequest(
            "Missing required parameter 'sub'".into(),
        ));
    };

    info!(sub = %sub, entity = %ctx.settings.entity_name, "Subordinate statement requested");

    let jwt = signed_subordinate_statement(&ctx, &sub)?;

    Ok(([(header::CONTENT_TYPE, ENTITY_STATEMENT_CONTENT_TYPE)], jwt).into_response())
}
