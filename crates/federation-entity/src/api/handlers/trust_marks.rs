//! Trust mark management handlers
//!
//! Issuance, listing and revocation of the trust marks this entity mints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::ApiError;
use crate::context::EntityContext;
use crate::state::TrustMarkRecord;
use crate::trust_marks::issue_trust_mark;

#[derive(Debug, Deserialize)]
pub struct IssueTrustMarkRequest {
    #[serde(default)]
    pub trust_mark_id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct IssueTrustMarkResponse {
    pub status: String,
    pub trust_mark_id: String,
    pub issuer: String,
    pub subject: String,
    pub signed_jwt: String,
}

/// POST /manage/trust-marks
pub async fn issue(
    State(ctx): State<Arc<EntityContext>>,
    Json(request): Json<IssueTrustMarkRequest>,
) -> Result<(StatusCode, Json<IssueTrustMarkResponse>), ApiError> {
    let Some(trust_mark_id) = request.trust_mark_id.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest("trust_mark_id is required".into()));
    };
    let Some(subject) = request.subject.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest("subject is required".into()));
    };

    let signed_jwt = issue_trust_mark(&ctx, &trust_mark_id, &subject, request.expires_in)?;

    info!(
        id = %trust_mark_id,
        sub = %subject,
        iss = %ctx.state.entity_id(),
        "Trust mark issued"
    );

    Ok((
        StatusCode::CREATED,
        Json(IssueTrustMarkResponse {
            status: "created".into(),
            trust_mark_id,
            issuer: ctx.state.entity_id().to_string(),
            subject,
            signed_jwt,
        }),
    ))
}

/// An issued trust mark in listings
#[derive(Debug, Serialize)]
pub struct TrustMarkResponse {
    pub id: String,
    pub issuer: String,
    pub subject: String,
    pub issued_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub expired: bool,
    pub signed_jwt: String,
}

impl TrustMarkResponse {
    fn from_record(record: TrustMarkRecord, now: i64) -> Self {
        let expired = record.is_expired(now);
        Self {
            id: record.id,
            issuer: record.issuer,
            subject: record.subject,
            issued_at: record.issued_at,
            expires_at: record.expires_at,
            expired,
            signed_jwt: record.signed_jwt,
        }
    }
}

/// GET /manage/trust-marks
pub async fn list(State(ctx): State<Arc<EntityContext>>) -> Json<Vec<TrustMarkResponse>> {
    let now = ctx.clock.now();
    let marks: Vec<TrustMarkResponse> = ctx
        .state
        .issued_trust_marks()
        .into_iter()
        .map(|tm| TrustMarkResponse::from_record(tm, now))
        .collect();

    info!(entity = %ctx.settings.entity_name, count = marks.len(), "Listed issued trust marks");

    Json(marks)
}

/// GET /manage/trust-marks/{trust_mark_id}
pub async fn get(
    State(ctx): State<Arc<EntityContext>>,
    Path(trust_mark_id): Path<String>,
) -> Result<Json<TrustMarkResponse>, ApiError> {
    let record = ctx
        .state
        .issued_trust_mark(&trust_mark_id)
        .ok_or(ApiError::UnknownTrustMark(trust_mark_id))?;

    Ok(Json(TrustMarkResponse::from_record(record, ctx.clock.now())))
}

#[derive(Debug, Serialize)]
pub struct RevokeTrustMarkResponse {
    pub status: String,
    pub trust_mark_id: String,
}

/// DELETE /manage/trust-marks/{trust_mark_id}
///
/// Revocation is local record removal; nothing is announced to holders.
pub async fn revoke(
    State(ctx): State<Arc<EntityContext>>,
    Path(trust_mark_id): Path<String>,
) -> Result<Json<RevokeTrustMarkResponse>, ApiError> {
    if !ctx.state.remove_issued_trust_mark(&trust_mark_id) {
        return Err(ApiError::UnknownTrustMark(trust_mark_id));
    }

    info!(id = %trust_mark_id, "Trust mark revoked");

    Ok(Json(RevokeTrustMarkResponse {
        status: "revoked".into(),
        trust_mark_id,
    }))
}
