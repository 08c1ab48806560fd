//! Campaign domain types: drafts, persisted campaigns, validation results.

use campaign_core::types::{empty_as_default, empty_as_none};
use campaign_core::{CampaignError, CampaignResult, CampaignStatus, CampaignType, Channel, FieldErrors};
use campaign_segmentation::{SegmentCriteria, SegmentPreview};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Draft ─────────────────────────────────────────────────────────────────

/// Per-channel message text. Which fields are required depends on the
/// campaign channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms_body: Option<String>,
}

impl MessageContent {
    pub fn email(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            email_subject: Some(subject.into()),
            email_body: Some(body.into()),
            sms_body: None,
        }
    }

    pub fn sms(body: impl Into<String>) -> Self {
        Self {
            sms_body: Some(body.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbTestConfig {
    /// Share of the audience that receives variant B.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub traffic_split_percent: Option<i64>,
    #[serde(default)]
    pub variant_b: MessageContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub frequency: Option<Frequency>,
    /// 0 = Sunday … 6 = Saturday.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub day_of_week: Option<i64>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub day_of_month: Option<i64>,
    /// Local send time, `HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<String>,
}

/// Campaign as held by the creation form until it is submitted.
///
/// `type` and `channel` stay raw strings so unknown values reach validation
/// and come back as field errors. Blank values of typed fields deserialize as
/// unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDraft {
    #[serde(default, rename = "type")]
    pub campaign_type: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub segment_criteria: SegmentCriteria,
    #[serde(default)]
    pub message_content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ab_test_config: Option<AbTestConfig>,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub send_now: bool,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

// ─── Validation result ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: FieldErrors,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: FieldErrors::new(),
        }
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn merge(&mut self, other: ValidationResult) {
        for (field, messages) in other.errors {
            for message in messages {
                self.add(field.clone(), message);
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn into_result(self) -> CampaignResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(CampaignError::InvalidInput(self.errors))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

impl From<FieldErrors> for ValidationResult {
    fn from(errors: FieldErrors) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

// ─── Persisted campaign ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingCampaign {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub campaign_type: CampaignType,
    pub channel: Channel,
    pub segment_criteria: SegmentCriteria,
    pub message_content: MessageContent,
    pub ab_test_config: Option<AbTestConfig>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

// ─── API payloads ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    /// Client-side sequence number, echoed back so stale responses can be dropped.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub request_seq: Option<u64>,
    #[serde(default)]
    pub criteria: SegmentCriteria,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub request_seq: Option<u64>,
    /// Server-issued, monotonically increasing preview number. A response
    /// with a lower `seq` than one already received is stale.
    pub seq: u64,
    #[serde(flatten)]
    pub preview: SegmentPreview,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
