//! Built-in campaign templates. Picking one pre-fills the draft's type,
//! channel, audience and message.

use campaign_core::{CampaignType, Channel};
use campaign_segmentation::{SegmentBuilder, SegmentCriteria};
use serde::Serialize;

use crate::models::{CampaignDraft, MessageContent};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub campaign_type: CampaignType,
    pub channel: Channel,
    pub segment_criteria: SegmentCriteria,
    pub message_content: MessageContent,
}

impl CampaignTemplate {
    pub fn to_draft(&self) -> CampaignDraft {
        CampaignDraft {
            campaign_type: Some(self.campaign_type.as_str().to_string()),
            channel: Some(self.channel.as_str().to_string()),
            segment_criteria: self.segment_criteria.clone(),
            message_content: self.message_content.clone(),
            ..Default::default()
        }
    }
}

pub fn builtin_templates() -> Vec<CampaignTemplate> {
    vec![
        CampaignTemplate {
            id: "win_back",
            name: "We Miss You",
            description: "Reach customers who have not booked a groom in two months",
            campaign_type: CampaignType::OneTime,
            channel: Channel::Both,
            segment_criteria: SegmentBuilder::new().not_visited_since_days(60).build(),
            message_content: MessageContent {
                email_subject: Some("We miss you and your pup!".to_string()),
                email_body: Some(
                    "It has been a while since your last visit. Book a groom this month \
                     and enjoy a complimentary blueberry facial."
                        .to_string(),
                ),
                sms_body: Some(
                    "We miss you! Book a groom this month for a free blueberry facial. Reply STOP to opt out."
                        .to_string(),
                ),
            },
        },
        CampaignTemplate {
            id: "loyalty_reward",
            name: "Loyalty Reward Ready",
            description: "Tell punch-card customers their free groom is waiting",
            campaign_type: CampaignType::OneTime,
            channel: Channel::Sms,
            segment_criteria: SegmentBuilder::new().loyalty_eligible().build(),
            message_content: MessageContent::sms(
                "Your loyalty card is full! Your next groom is on us. Reply STOP to opt out.",
            ),
        },
        CampaignTemplate {
            id: "member_appreciation",
            name: "Member Appreciation",
            description: "Monthly thank-you to active members",
            campaign_type: CampaignType::Recurring,
            channel: Channel::Email,
            segment_criteria: SegmentBuilder::new().members_only().build(),
            message_content: MessageContent::email(
                "A little thank-you for our members",
                "Thanks for being part of the club. This month members get 15% off \
                 nail trims and teeth brushing add-ons.",
            ),
        },
        CampaignTemplate {
            id: "first_visit_follow_up",
            name: "First Visit Follow-up",
            description: "Welcome new customers after their first appointment",
            campaign_type: CampaignType::OneTime,
            channel: Channel::Email,
            segment_criteria: SegmentBuilder::new()
                .min_appointments(1)
                .max_appointments(1)
                .build(),
            message_content: MessageContent::email(
                "Thanks for trusting us with your pet",
                "We loved meeting your pet! Book a second visit within 6 weeks to keep \
                 that coat healthy.",
            ),
        },
        CampaignTemplate {
            id: "big_spenders",
            name: "VIP Thank You",
            description: "Customers who have spent $500 or more",
            campaign_type: CampaignType::OneTime,
            channel: Channel::Both,
            segment_criteria: SegmentBuilder::new().min_total_spend(500.0).build(),
            message_content: MessageContent {
                email_subject: Some("You're one of our VIPs".to_string()),
                email_body: Some(
                    "Thank you for your loyalty. Enjoy priority booking for holiday grooming slots."
                        .to_string(),
                ),
                sms_body: Some(
                    "VIP perk: priority booking for holiday grooms is open now. Reply STOP to opt out."
                        .to_string(),
                ),
            },
        },
    ]
}

pub fn find_template(id: &str) -> Option<CampaignTemplate> {
    builtin_templates().into_iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftAction;
    use crate::models::{Frequency, Recurrence};
    use crate::validation::CampaignValidator;
    use chrono::Utc;

    #[test]
    fn test_template_ids_are_unique() {
        let templates = builtin_templates();
        let mut ids: Vec<&str> = templates.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), templates.len());
    }

    #[test]
    fn test_every_template_produces_a_valid_campaign() {
        let validator = CampaignValidator::default();
        let now = Utc::now();
        for template in builtin_templates() {
            let draft = template.to_draft();
            let draft = match template.campaign_type {
                CampaignType::OneTime => draft.apply(DraftAction::SendNow),
                CampaignType::Recurring => draft.apply(DraftAction::SetRecurrence(Recurrence {
                    frequency: Some(Frequency::Monthly),
                    day_of_week: None,
                    day_of_month: Some(1),
                    time_of_day: Some("10:00".to_string()),
                })),
            };
            let result = validator.validate_complete_campaign(&draft, now);
            assert!(result.is_valid(), "template {} invalid: {:?}", template.id, result.errors);
        }
    }

    #[test]
    fn test_find_template() {
        assert!(find_template("loyalty_reward").is_some());
        assert!(find_template("nope").is_none());
    }
}
