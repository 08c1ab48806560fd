pub mod config;
pub mod error;
pub mod loyalty;
pub mod types;

pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult, FieldErrors};
pub use types::{CampaignStatus, CampaignType, Channel};
