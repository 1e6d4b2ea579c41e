//! Well-known endpoint
//!
//! Serves this entity's self-signed Entity Configuration.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::api::error::ApiError;
use crate::context::EntityContext;
use crate::statements::signed_entity_configuration;

/// Media type of signed entity statements on the wire
pub const ENTITY_STATEMENT_CONTENT_TYPE: &str = "application/entity-statement+jwt";

/// GET /.well-known/openid-federation
pub async fn entity_configuration(
    State(ctx): State<Arc<EntityContext>>,
) -> Result<Response, ApiError> {
    info!(
        entity = %ctx.settings.entity_name,
        entity_id = %ctx.state.entity_id(),
        "Entity configuration requested"
    );

    let jwt = signed_entity_configuration(&ctx)?;

    Ok(([(header::CONTENT_TYPE, ENTITY_STATEMENT_CONTENT_TYPE)], jwt).into_response())
}
