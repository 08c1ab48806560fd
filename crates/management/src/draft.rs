//! Reducer-style transitions over an immutable [`CampaignDraft`].
//!
//! The form dispatches actions; each action consumes the current draft and
//! returns the next one. Schedule actions keep exactly one send mode active.

use campaign_core::{CampaignType, Channel};
use campaign_segmentation::SegmentCriteria;
use chrono::{DateTime, Utc};

use crate::models::{AbTestConfig, CampaignDraft, MessageContent, Recurrence};
use crate::templates::CampaignTemplate;

#[derive(Debug, Clone)]
pub enum DraftAction {
    ApplyTemplate(CampaignTemplate),
    SetType(CampaignType),
    SetChannel(Channel),
    SetCriteria(SegmentCriteria),
    SetMessage(MessageContent),
    EnableAbTest { traffic_split_percent: i64 },
    SetVariantB(MessageContent),
    DisableAbTest,
    SendNow,
    ScheduleAt(DateTime<Utc>),
    SetRecurrence(Recurrence),
    Reset,
}

impl CampaignDraft {
    pub fn apply(self, action: DraftAction) -> CampaignDraft {
        match action {
            DraftAction::ApplyTemplate(template) => {
                let filled = template.to_draft();
                CampaignDraft {
                    campaign_type: filled.campaign_type,
                    channel: filled.channel,
                    segment_criteria: filled.segment_criteria,
                    message_content: filled.message_content,
                    ab_test_config: None,
                    ..self
                }
            }
            DraftAction::SetType(campaign_type) => CampaignDraft {
                campaign_type: Some(campaign_type.as_str().to_string()),
                recurrence: match campaign_type {
                    CampaignType::OneTime => None,
                    CampaignType::Recurring => self.recurrence,
                },
                ..self
            },
            DraftAction::SetChannel(channel) => CampaignDraft {
                channel: Some(channel.as_str().to_string()),
                ..self
            },
            DraftAction::SetCriteria(segment_criteria) => CampaignDraft {
                segment_criteria,
                ..self
            },
            DraftAction::SetMessage(message_content) => CampaignDraft {
                message_content,
                ..self
            },
            DraftAction::EnableAbTest {
                traffic_split_percent,
            } => {
                let variant_b = self
                    .ab_test_config
                    .as_ref()
                    .map(|c| c.variant_b.clone())
                    .unwrap_or_default();
                CampaignDraft {
                    ab_test_config: Some(AbTestConfig {
                        traffic_split_percent: Some(traffic_split_percent),
                        variant_b,
                    }),
                    ..self
                }
            }
            DraftAction::SetVariantB(variant_b) => match self.ab_test_config {
                Some(config) => CampaignDraft {
                    ab_test_config: Some(AbTestConfig { variant_b, ..config }),
                    ..self
                },
                // Variant B only exists inside an enabled A/B test.
                None => self,
            },
            DraftAction::DisableAbTest => CampaignDraft {
                ab_test_config: None,
                ..self
            },
            DraftAction::SendNow => CampaignDraft {
                campaign_type: Some(CampaignType::OneTime.as_str().to_string()),
                send_now: true,
                scheduled_at: None,
                recurrence: None,
                ..self
            },
            DraftAction::ScheduleAt(at) => CampaignDraft {
                campaign_type: Some(CampaignType::OneTime.as_str().to_string()),
                send_now: false,
                scheduled_at: Some(at),
                recurrence: None,
                ..self
            },
            DraftAction::SetRecurrence(recurrence) => CampaignDraft {
                campaign_type: Some(CampaignType::Recurring.as_str().to_string()),
                send_now: false,
                scheduled_at: None,
                recurrence: Some(recurrence),
                ..self
            },
            DraftAction::Reset => CampaignDraft::default(),
        }
    }

    /// Fold a sequence of actions over this draft.
    pub fn apply_all(self, actions: impl IntoIterator<Item = DraftAction>) -> CampaignDraft {
        actions.into_iter().fold(self, CampaignDraft::apply)
    }
}
