//! Campaign management backend: draft validation, templates, persistence
//! and the audience preview API used by the campaign creation form.

pub mod draft;
pub mod handlers;
pub mod models;
pub mod router;
pub mod store;
pub mod templates;
pub mod validation;

pub use draft::DraftAction;
pub use handlers::ManagementState;
pub use models::{CampaignDraft, MarketingCampaign, ValidationResult};
pub use router::management_router;
pub use store::CampaignStore;
pub use validation::CampaignValidator;
