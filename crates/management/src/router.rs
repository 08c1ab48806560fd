//! Management API router: mounts campaign and segment endpoints under /api/v1.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use campaign_core::AppConfig;
use campaign_segmentation::{CustomerSource, PreviewService};

use crate::handlers::{self, ManagementState};
use crate::store::CampaignStore;
use crate::validation::CampaignValidator;

impl ManagementState {
    pub fn from_config(config: &AppConfig, source: Arc<dyn CustomerSource>) -> Self {
        let validator = CampaignValidator::new(&config.scheduling);
        Self {
            store: Arc::new(CampaignStore::new(validator.clone())),
            previews: Arc::new(PreviewService::from_config(source, &config.preview)),
            validator,
        }
    }
}

/// Build the management router. Returns a Router that should be merged into the main app.
pub fn management_router(state: ManagementState) -> Router {
    Router::new()
        .route("/api/v1/campaigns", post(handlers::create_campaign))
        .route("/api/v1/campaigns/validate", post(handlers::validate_campaign))
        .route("/api/v1/campaign-templates", get(handlers::list_templates))
        .route("/api/v1/segments/preview", post(handlers::preview_segment))
        .with_state(state)
}
