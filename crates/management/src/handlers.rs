//! Axum REST handlers for campaign creation and audience preview.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use campaign_core::{CampaignError, FieldErrors};
use campaign_segmentation::PreviewService;
use chrono::Utc;
use tracing::{error, warn};

use crate::models::*;
use crate::store::CampaignStore;
use crate::templates::{builtin_templates, CampaignTemplate};
use crate::validation::CampaignValidator;

/// Shared management state.
#[derive(Clone)]
pub struct ManagementState {
    pub store: Arc<CampaignStore>,
    pub previews: Arc<PreviewService>,
    pub validator: CampaignValidator,
}

/// Error body returned by the management API.
pub struct ApiError(CampaignError);

impl From<CampaignError> for ApiError {
    fn from(err: CampaignError) -> Self {
        Self(err)
    }
}

/// Bodies that do not parse still answer with a field-keyed
/// `ValidationResult` rather than axum's plain-text rejection.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Malformed request body");
        let mut errors = FieldErrors::new();
        errors.insert("body".to_string(), vec![rejection.body_text()]);
        Self(CampaignError::InvalidInput(errors))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            CampaignError::InvalidInput(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationResult::from(errors)),
            )
                .into_response(),
            CampaignError::PopulationUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "preview_unavailable".to_string(),
                    message: "Audience preview is temporarily unavailable".to_string(),
                }),
            )
                .into_response(),
            CampaignError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "not_found".to_string(),
                    message: format!("Campaign {id} not found"),
                }),
            )
                .into_response(),
            other => {
                error!(error = %other, "Management request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "internal_error".to_string(),
                        message: "Internal processing error".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

// ─── Campaigns ─────────────────────────────────────────────────────────────

/// POST /api/v1/campaigns/validate: report every field error in a draft.
pub async fn validate_campaign(
    State(state): State<ManagementState>,
    payload: Result<Json<CampaignDraft>, JsonRejection>,
) -> Result<Json<ValidationResult>, ApiError> {
    let Json(draft) = payload?;
    Ok(Json(state.validator.validate_complete_campaign(&draft, Utc::now())))
}

/// POST /api/v1/campaigns: validate and persist a draft.
pub async fn create_campaign(
    State(state): State<ManagementState>,
    payload: Result<Json<CampaignDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<MarketingCampaign>), ApiError> {
    let Json(draft) = payload?;
    let campaign = state.store.submit(&draft, Utc::now()).map_err(|e| {
        if let Some(errors) = e.field_errors() {
            warn!(fields = errors.len(), "Campaign submission rejected");
        }
        e
    })?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

/// GET /api/v1/campaign-templates
pub async fn list_templates() -> Json<Vec<CampaignTemplate>> {
    Json(builtin_templates())
}

// ─── Segments ──────────────────────────────────────────────────────────────

/// POST /api/v1/segments/preview: count and sample the matching audience.
pub async fn preview_segment(
    State(state): State<ManagementState>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let Json(req) = payload?;
    state
        .validator
        .validate_segment_criteria(&req.criteria)
        .into_result()?;
    let (ticket, preview) = state.previews.preview_now(&req.criteria)?;
    Ok(Json(PreviewResponse {
        request_seq: req.request_seq,
        seq: ticket.seq,
        preview,
    }))
}
