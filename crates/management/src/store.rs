//! In-memory campaign store backed by DashMap.
//!
//! Only validated drafts are persisted. Recurrence settings are validated but
//! not stored yet; see DESIGN.md.

use campaign_core::{CampaignError, CampaignResult, CampaignStatus, CampaignType, Channel, FieldErrors};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{CampaignDraft, MarketingCampaign};
use crate::validation::CampaignValidator;

pub struct CampaignStore {
    campaigns: DashMap<Uuid, MarketingCampaign>,
    validator: CampaignValidator,
}

impl CampaignStore {
    pub fn new(validator: CampaignValidator) -> Self {
        info!("Campaign store initialized (in-memory)");
        Self {
            campaigns: DashMap::new(),
            validator,
        }
    }

    /// Validate `draft` and persist it. Scheduled and recurring campaigns are
    /// stored as `scheduled`; send-now campaigns as `draft` until the send
    /// subsystem marks them sent.
    pub fn submit(&self, draft: &CampaignDraft, now: DateTime<Utc>) -> CampaignResult<MarketingCampaign> {
        self.validator
            .validate_complete_campaign(draft, now)
            .into_result()?;

        let campaign_type = draft
            .campaign_type
            .as_deref()
            .and_then(CampaignType::parse)
            .ok_or_else(|| invalid("type", "Campaign type is required"))?;
        let channel = draft
            .channel
            .as_deref()
            .and_then(Channel::parse)
            .ok_or_else(|| invalid("channel", "Channel is required"))?;

        if draft.recurrence.is_some() {
            warn!("Recurrence configuration is not persisted; storing campaign without it");
        }

        let status = if draft.scheduled_at.is_some() || draft.recurrence.is_some() {
            CampaignStatus::Scheduled
        } else {
            CampaignStatus::Draft
        };

        let campaign = MarketingCampaign {
            id: Uuid::new_v4(),
            campaign_type,
            channel,
            segment_criteria: draft.segment_criteria.clone(),
            message_content: draft.message_content.clone(),
            ab_test_config: draft.ab_test_config.clone(),
            scheduled_at: draft.scheduled_at,
            status,
            created_at: now,
            updated_at: now,
            sent_at: None,
        };
        self.campaigns.insert(campaign.id, campaign.clone());
        info!(
            id = %campaign.id,
            channel = %campaign.channel,
            status = ?campaign.status,
            "Campaign persisted"
        );
        metrics::counter!("campaigns.submitted").increment(1);
        Ok(campaign)
    }

    pub fn get(&self, id: Uuid) -> Option<MarketingCampaign> {
        self.campaigns.get(&id).map(|r| r.value().clone())
    }

    /// Called by the send subsystem once delivery has been handed off.
    pub fn mark_sent(&self, id: Uuid, now: DateTime<Utc>) -> CampaignResult<MarketingCampaign> {
        let mut entry = self.campaigns.get_mut(&id).ok_or(CampaignError::NotFound(id))?;
        let campaign = entry.value_mut();
        if campaign.status != CampaignStatus::Sent {
            campaign.status = CampaignStatus::Sent;
            campaign.sent_at = Some(now);
            campaign.updated_at = now;
            info!(id = %id, "Campaign marked sent");
        }
        Ok(campaign.clone())
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }
}

impl Default for CampaignStore {
    fn default() -> Self {
        Self::new(CampaignValidator::default())
    }
}

fn invalid(field: &str, message: &str) -> CampaignError {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.to_string()]);
    CampaignError::InvalidInput(errors)
}
