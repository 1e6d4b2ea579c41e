//! Subordinate management handlers
//!
//! CRUD over this entity's registered subordinates. Not part of the wire
//! protocol; this is the operator surface that feeds the fetch endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::api::error::ApiError;
use crate::api::handlers::fetch::FetchParams;
use crate::context::EntityContext;
use crate::state::{SubordinateRecord, Upsert};
use crate::statements::subordinate_statement_claims;

#[derive(Debug, Deserialize)]
pub struct UpsertSubordinateRequest {
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub jwks: Option<Value>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub authority_hints: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubordinateRequest {
    #[serde(default)]
    pub jwks: Option<Value>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub authority_hints: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SubordinateResponse {
    pub entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks: Option<Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    pub authority_hints: Vec<String>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl SubordinateResponse {
    fn from_record(record: SubordinateRecord) -> Self {
        Self {
            entity_id: record.entity_id,
            jwks: record.jwks,
            metadata: record.metadata,
            authority_hints: record.authority_hints,
            created_at: record.created_at,
            status: None,
        }
    }

    fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }
}

/// GET /manage/subordinates
pub async fn list_subordinates(
    State(ctx): State<Arc<EntityContext>>,
) -> Json<Vec<SubordinateResponse>> {
    let subordinates: Vec<SubordinateResponse> = ctx
        .state
        .subordinates()
        .into_iter()
        .map(SubordinateResponse::from_record)
        .collect();

    info!(
        entity = %ctx.settings.entity_name,
        count = subordinates.len(),
        "Listed subordinates"
    );

    Json(subordinates)
}

/// GET /manage/subordinates/{entity_id}
pub async fn get_subordinate(
    State(ctx): State<Arc<EntityContext>>,
    Path(entity_id): Path<String>,
) -> Result<Json<SubordinateResponse>, ApiError> {
    let record = ctx
        .state
        .subordinate(&entity_id)
        .ok_or(ApiError::UnknownSubordinate(entity_id))?;

    Ok(Json(SubordinateResponse::from_record(record)))
}

/// POST /manage/subordinates
///
/// Registration is an upsert: re-posting an existing entity ID updates the
/// fields supplied and leaves the rest alone.
pub async fn upsert_subordinate(
    State(ctx): State<Arc<EntityContext>>,
    Json(request): Json<UpsertSubordinateRequest>,
) -> Result<(StatusCode, Json<SubordinateResponse>), ApiError> {
    let Some(entity_id) = request.entity_id.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest("entity_id is required".into()));
    };

    let (record, outcome) = ctx.state.upsert_subordinate_fields(
        &entity_id,
        request.jwks,
        request.metadata,
        request.authority_hints,
        ctx.clock.now(),
    );

    let (status, label) = match outcome {
        Upsert::Created => (StatusCode::CREATED, "created"),
        Upsert::Updated => (StatusCode::OK, "updated"),
    };

    Ok((
        status,
        Json(SubordinateResponse::from_record(record).with_status(label)),
    ))
}

/// PUT /manage/subordinates/{entity_id}
pub async fn update_subordinate(
    State(ctx): State<Arc<EntityContext>>,
    Path(entity_id): Path<String>,
    Json(request): Json<UpdateSubordinateRequest>,
) -> Result<Json<SubordinateResponse>, ApiError> {
    let record = ctx
        .state
        .update_subordinate_fields(
            &entity_id,
            request.jwks,
            request.metadata,
            request.authority_hints,
        )
        .ok_or(ApiError::UnknownSubordinate(entity_id))?;

    Ok(Json(
        SubordinateResponse::from_record(record).with_status("updated"),
    ))
}

/// GET /manage/fetch?sub=<entity_id>
///
/// Operator-facing JSON rendering of the statement the signed fetch
/// endpoint would produce for a subordinate.
pub async fn statement_preview(
    State(ctx): State<Arc<EntityContext>>,
    Query(params): Query<FetchParams>,
) -> Result<Json<Value>, ApiError> {
    let Some(sub) = params.sub.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest("'sub' parameter is required".into()));
    };

    let claims = subordinate_statement_claims(&ctx, &sub)?;

    info!(sub = %sub, entity = %ctx.settings.entity_name, "Subordinate statement preview");

    Ok(Json(Value::Object(claims)))
}

#[derive(Debug, Serialize)]
pub struct DeleteSubordinateResponse {
    pub status: String,
    pub entity_id: String,
}

/// DELETE /manage/subordinates/{entity_id}
pub async fn delete_subordinate(
    State(ctx): State<Arc<EntityContext>>,
    Path(entity_id): Path<String>,
) -> Result<Json<DeleteSubordinateResponse>, ApiError> {
    if !ctx.state.remove_subordinate(&entity_id) {
        return Err(ApiError::UnknownSubordinate(entity_id));
    }

    Ok(Json(DeleteSubordinateResponse {
        status: "deleted".into(),
        entity_id,
    }))
}
