//! Entity management handlers
//!
//! Operator-facing view of this entity: summary, authority hints, and the
//! trust marks it has received from others.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::ApiError;
use crate::context::EntityContext;
use crate::state::TrustMarkRecord;
use crate::trust_marks::add_received_trust_mark as record_received_trust_mark;

/// Summary of this entity's state
#[derive(Debug, Serialize)]
pub struct EntityInfoResponse {
    pub entity_name: String,
    pub entity_id: String,
    pub port: u16,
    pub subordinates_count: usize,
    pub authority_hints: Vec<String>,
}

/// GET /manage/entity
pub async fn entity_info(State(ctx): State<Arc<EntityContext>>) -> Json<EntityInfoResponse> {
    info!(entity = %ctx.settings.entity_name, "Entity info requested");

    Json(EntityInfoResponse {
        entity_name: ctx.settings.entity_name.clone(),
        entity_id: ctx.state.entity_id().to_string(),
        port: ctx.settings.port,
        subordinates_count: ctx.state.subordinate_count(),
        authority_hints: ctx.state.authority_hints(),
    })
}

#[derive(Debug, Deserialize)]
pub struct SetAuthorityHintsRequest {
    #[serde(default)]
    pub authority_hints: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SetAuthorityHintsResponse {
    pub entity_id: String,
    pub authority_hints: Vec<String>,
    pub status: String,
}

/// POST /manage/entity/authority-hints
pub async fn set_authority_hints(
    State(ctx): State<Arc<EntityContext>>,
    Json(request): Json<SetAuthorityHintsRequest>,
) -> Result<Json<SetAuthorityHintsResponse>, ApiError> {
    let Some(hints) = request.authority_hints else {
        return Err(ApiError::BadRequest(
            "authority_hints field is required".into(),
        ));
    };

    ctx.state.set_authority_hints(hints.clone());

    info!(entity = %ctx.settings.entity_name, hints = ?hints, "Authority hints set");

    Ok(Json(SetAuthorityHintsResponse {
        entity_id: ctx.state.entity_id().to_string(),
        authority_hints: hints,
        status: "updated".into(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct AddReceivedTrustMarkRequest {
    #[serde(default)]
    pub signed_jwt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddReceivedTrustMarkResponse {
    pub status: String,
    pub trust_mark_id: String,
    pub issuer: String,
    pub subject: String,
}

/// POST /manage/entity/trust-marks
///
/// Called by this entity's operator after a superior issued it a trust mark.
pub async fn add_received_trust_mark(
    State(ctx): State<Arc<EntityContext>>,
    Json(request): Json<AddReceivedTrustMarkRequest>,
) -> Result<(StatusCode, Json<AddReceivedTrustMarkResponse>), ApiError> {
    let Some(signed_jwt) = request.signed_jwt.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest("signed_jwt is required".into()));
    };

    let record = record_received_trust_mark(&ctx, &signed_jwt)?;

    Ok((
        StatusCode::CREATED,
        Json(AddReceivedTrustMarkResponse {
            status: "added".into(),
            trust_mark_id: record.id,
            issuer: record.issuer,
            subject: record.subject,
        }),
    ))
}

/// A received trust mark in listings
#[derive(Debug, Serialize)]
pub struct ReceivedTrustMarkResponse {
    pub id: String,
    pub issuer: String,
    pub issued_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub expired: bool,
    pub signed_jwt: String,
}

impl ReceivedTrustMarkResponse {
    fn from_record(record: TrustMarkRecord, now: i64) -> Self {
        let expired = record.is_expired(now);
        Self {
            id: record.id,
            issuer: record.issuer,
            issued_at: record.issued_at,
            expires_at: record.expires_at,
            expired,
            signed_jwt: record.signed_jwt,
        }
    }
}

/// GET /manage/entity/trust-marks
pub async fn list_received_trust_marks(
    State(ctx): State<Arc<EntityContext>>,
) -> Json<Vec<ReceivedTrustMarkResponse>> {
    let now = ctx.clock.now();
    let entity_id = ctx.state.entity_id().to_string();

    let marks: Vec<ReceivedTrustMarkResponse> = ctx
        .state
        .received_trust_marks()
        .into_iter()
        .filter(|tm| tm.subject == entity_id)
        .map(|tm| ReceivedTrustMarkResponse::from_record(tm, now))
        .collect();

    info!(entity = %ctx.settings.entity_name, count = marks.len(), "Listed received trust marks");

    Json(marks)
}
