//! Campaign validation engine.
//!
//! Every check is a pure function of its inputs (the current time is passed
//! in) and reports problems as field-keyed messages instead of failing fast,
//! so the form can show every error at once.

use campaign_core::config::SchedulingConfig;
use campaign_core::types::non_blank;
use campaign_core::{CampaignType, Channel};
use campaign_segmentation::SegmentCriteria;
use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::models::{AbTestConfig, CampaignDraft, Frequency, MessageContent, Recurrence, ValidationResult};

pub const SMS_BODY_MAX_CHARS: usize = 160;
pub const EMAIL_SUBJECT_MAX_CHARS: usize = 100;
pub const EMAIL_BODY_MAX_CHARS: usize = 5000;

/// Allowed A/B traffic splits: 10, 20, … 90.
pub const AB_SPLIT_MIN: i64 = 10;
pub const AB_SPLIT_MAX: i64 = 90;
pub const AB_SPLIT_STEP: i64 = 10;

pub const RECURRENCE_MAX_DAY_OF_MONTH: i64 = 28;

#[derive(Debug, Clone)]
pub struct CampaignValidator {
    min_lead_minutes: i64,
    max_horizon_days: i64,
}

impl CampaignValidator {
    pub fn new(config: &SchedulingConfig) -> Self {
        Self {
            min_lead_minutes: config.min_lead_minutes,
            max_horizon_days: config.max_horizon_days,
        }
    }

    pub fn validate_campaign_type(&self, raw: Option<&str>) -> ValidationResult {
        let mut result = ValidationResult::ok();
        match raw.filter(|s| !s.trim().is_empty()) {
            None => result.add("type", "Campaign type is required"),
            Some(value) if CampaignType::parse(value).is_none() => result.add(
                "type",
                format!("Unknown campaign type '{}'; expected one_time or recurring", value),
            ),
            Some(_) => {}
        }
        result
    }

    pub fn validate_segment_criteria(&self, criteria: &SegmentCriteria) -> ValidationResult {
        let mut result = ValidationResult::ok();
        if criteria.is_empty() {
            result.add("segmentCriteria", "No filter selected; choose at least one audience filter");
            return result;
        }

        let thresholds = [
            ("lastVisitWithinDays", criteria.last_visit_within_days),
            ("notVisitedSinceDays", criteria.not_visited_since_days),
            ("minAppointments", criteria.min_appointments),
            ("maxAppointments", criteria.max_appointments),
        ];
        for (key, value) in thresholds {
            if matches!(value, Some(v) if v < 0) {
                result.add(format!("segmentCriteria.{key}"), "Must not be negative");
            }
        }
        if let Some(spend) = criteria.min_total_spend {
            if !spend.is_finite() {
                result.add("segmentCriteria.minTotalSpend", "Must be a number");
            } else if spend < 0.0 {
                result.add("segmentCriteria.minTotalSpend", "Must not be negative");
            }
        }

        if let (Some(min), Some(max)) = (criteria.min_appointments, criteria.max_appointments) {
            if min > max {
                result.add(
                    "segmentCriteria.minAppointments",
                    "Minimum appointments cannot exceed maximum appointments",
                );
            }
        }
        if let (Some(within), Some(since)) =
            (criteria.last_visit_within_days, criteria.not_visited_since_days)
        {
            if within >= 0 && since > within {
                result.add(
                    "segmentCriteria.notVisitedSinceDays",
                    "Cannot require no visit for longer than the recent-visit window",
                );
            }
        }
        result
    }

    pub fn validate_message_content(&self, channel: Channel, content: &MessageContent) -> ValidationResult {
        let mut result = ValidationResult::ok();
        check_content(&mut result, "messageContent", channel, content);
        result
    }

    pub fn validate_ab_test_config(&self, channel: Channel, config: &AbTestConfig) -> ValidationResult {
        let mut result = ValidationResult::ok();
        check_traffic_split(&mut result, config.traffic_split_percent);
        check_content(&mut result, "abTestConfig.variantB", channel, &config.variant_b);
        result
    }

    pub fn validate_scheduling(
        &self,
        send_now: bool,
        scheduled_at: Option<DateTime<Utc>>,
        recurrence: Option<&Recurrence>,
        now: DateTime<Utc>,
    ) -> ValidationResult {
        let mut result = ValidationResult::ok();

        let active_modes = [send_now, scheduled_at.is_some(), recurrence.is_some()]
            .iter()
            .filter(|m| **m)
            .count();
        if active_modes == 0 {
            result.add("scheduledAt", "Choose a send time or send the campaign now");
        } else if active_modes > 1 {
            result.add(
                "schedule",
                "Choose exactly one of send now, a scheduled time, or a recurring schedule",
            );
        }

        if let Some(at) = scheduled_at {
            let earliest = shifted(now, self.min_lead_minutes, Duration::try_minutes);
            let latest = shifted(now, self.max_horizon_days, Duration::try_days);
            if at <= earliest {
                result.add(
                    "scheduledAt",
                    format!(
                        "Scheduled time is too soon; it must be more than {} minutes from now",
                        self.min_lead_minutes
                    ),
                );
            } else if at >= latest {
                result.add(
                    "scheduledAt",
                    format!(
                        "Scheduled time is too far out; it must be within {} days",
                        self.max_horizon_days
                    ),
                );
            }
        }

        if let Some(recurrence) = recurrence {
            check_recurrence(&mut result, recurrence);
        }
        result
    }

    /// Run every check and collect all field errors.
    pub fn validate_complete_campaign(&self, draft: &CampaignDraft, now: DateTime<Utc>) -> ValidationResult {
        let mut result = self.validate_campaign_type(draft.campaign_type.as_deref());

        let channel = match non_blank(&draft.channel) {
            None => {
                result.add("channel", "Channel is required");
                None
            }
            Some(raw) => {
                let parsed = Channel::parse(raw);
                if parsed.is_none() {
                    result.add(
                        "channel",
                        format!("Unknown channel '{}'; expected email, sms or both", raw),
                    );
                }
                parsed
            }
        };

        result.merge(self.validate_segment_criteria(&draft.segment_criteria));

        // Content limits depend on the channel; skip them when it is unknown.
        match (channel, &draft.ab_test_config) {
            (Some(channel), ab) => {
                result.merge(self.validate_message_content(channel, &draft.message_content));
                if let Some(ab) = ab {
                    result.merge(self.validate_ab_test_config(channel, ab));
                }
            }
            (None, Some(ab)) => check_traffic_split(&mut result, ab.traffic_split_percent),
            (None, None) => {}
        }

        result.merge(self.validate_scheduling(
            draft.send_now,
            draft.scheduled_at,
            draft.recurrence.as_ref(),
            now,
        ));

        match draft.campaign_type.as_deref().and_then(CampaignType::parse) {
            Some(CampaignType::Recurring) if draft.recurrence.is_none() => {
                result.add("recurrence", "Recurring campaigns need a recurrence schedule");
            }
            Some(CampaignType::OneTime) if draft.recurrence.is_some() => {
                result.add("recurrence", "One-time campaigns cannot have a recurrence schedule");
            }
            _ => {}
        }

        if result.is_valid() {
            metrics::counter!("campaigns.validated").increment(1);
        } else {
            metrics::counter!("campaigns.validation_failed").increment(1);
            tracing::debug!(fields = result.errors.len(), "Campaign draft failed validation");
        }
        result
    }
}

impl Default for CampaignValidator {
    fn default() -> Self {
        Self::new(&SchedulingConfig::default())
    }
}

/// `now` moved by `amount` units, saturating at the ends of the calendar
/// instead of overflowing.
fn shifted(now: DateTime<Utc>, amount: i64, unit: fn(i64) -> Option<Duration>) -> DateTime<Utc> {
    unit(amount)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(if amount < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

fn check_traffic_split(result: &mut ValidationResult, split: Option<i64>) {
    match split {
        None => result.add("abTestConfig.trafficSplitPercent", "Traffic split is required"),
        Some(split) if !(AB_SPLIT_MIN..=AB_SPLIT_MAX).contains(&split) || split % AB_SPLIT_STEP != 0 => {
            result.add(
                "abTestConfig.trafficSplitPercent",
                format!(
                    "Traffic split must be a multiple of {AB_SPLIT_STEP} between {AB_SPLIT_MIN} and {AB_SPLIT_MAX}"
                ),
            )
        }
        Some(_) => {}
    }
}

fn check_content(result: &mut ValidationResult, prefix: &str, channel: Channel, content: &MessageContent) {
    if channel.includes_email() {
        check_text(
            result,
            &format!("{prefix}.emailSubject"),
            "Email subject",
            &content.email_subject,
            EMAIL_SUBJECT_MAX_CHARS,
        );
        check_text(
            result,
            &format!("{prefix}.emailBody"),
            "Email body",
            &content.email_body,
            EMAIL_BODY_MAX_CHARS,
        );
    }
    if channel.includes_sms() {
        check_text(
            result,
            &format!("{prefix}.smsBody"),
            "SMS message",
            &content.sms_body,
            SMS_BODY_MAX_CHARS,
        );
    }
}

/// Required text with an inclusive character limit.
fn check_text(result: &mut ValidationResult, field: &str, label: &str, value: &Option<String>, max: usize) {
    match non_blank(value) {
        None => result.add(field, format!("{label} is required")),
        Some(_) => {
            let len = value.as_deref().map_or(0, |s| s.chars().count());
            if len > max {
                result.add(
                    field,
                    format!("{label} must be {max} characters or fewer (currently {len})"),
                );
            }
        }
    }
}

fn check_recurrence(result: &mut ValidationResult, recurrence: &Recurrence) {
    match recurrence.frequency {
        None => result.add("recurrence.frequency", "Frequency is required"),
        Some(Frequency::Daily) => {}
        Some(Frequency::Weekly) => match recurrence.day_of_week {
            None => result.add("recurrence.dayOfWeek", "Day of week is required for weekly campaigns"),
            Some(day) if !(0..=6).contains(&day) => {
                result.add("recurrence.dayOfWeek", "Day of week must be between 0 (Sunday) and 6 (Saturday)")
            }
            Some(_) => {}
        },
        Some(Frequency::Monthly) => match recurrence.day_of_month {
            Some(day) if (1..=RECURRENCE_MAX_DAY_OF_MONTH).contains(&day) => {}
            _ => result.add(
                "recurrence.dayOfMonth",
                format!("Day of month must be between 1 and {RECURRENCE_MAX_DAY_OF_MONTH}"),
            ),
        },
    }

    match non_blank(&recurrence.time_of_day) {
        None => result.add("recurrence.timeOfDay", "Time of day is required"),
        Some(raw) if NaiveTime::parse_from_str(raw.trim(), "%H:%M").is_err() => {
            result.add("recurrence.timeOfDay", "Time of day must use HH:MM")
        }
        Some(_) => {}
    }
}
