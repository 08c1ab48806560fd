//! Audience criteria as submitted by the campaign form.

use campaign_core::types::empty_as_none;
use serde::{Deserialize, Serialize};

use crate::predicates::Criterion;

/// Optional audience filters. An absent key means the filter is not applied;
/// boolean filters only apply when `true`.
///
/// Numeric thresholds are signed so that negative input survives
/// deserialization and is reported by validation instead of rejected by serde.
/// Blank form values (`""`, `null`) deserialize as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentCriteria {
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub last_visit_within_days: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub not_visited_since_days: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub min_appointments: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub max_appointments: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub min_total_spend: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub has_membership: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub loyalty_eligible: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub has_upcoming_appointment: Option<bool>,
}

impl SegmentCriteria {
    /// The filters this criteria set actually applies, in a fixed order.
    pub fn active_filters(&self) -> Vec<Criterion> {
        let mut filters = Vec::new();
        if let Some(days) = self.last_visit_within_days {
            filters.push(Criterion::LastVisitWithinDays(days));
        }
        if let Some(days) = self.not_visited_since_days {
            filters.push(Criterion::NotVisitedSinceDays(days));
        }
        if let Some(n) = self.min_appointments {
            filters.push(Criterion::MinAppointments(n));
        }
        if let Some(n) = self.max_appointments {
            filters.push(Criterion::MaxAppointments(n));
        }
        if let Some(spend) = self.min_total_spend {
            filters.push(Criterion::MinTotalSpend(spend));
        }
        if self.has_membership == Some(true) {
            filters.push(Criterion::HasMembership);
        }
        if self.loyalty_eligible == Some(true) {
            filters.push(Criterion::LoyaltyEligible);
        }
        if self.has_upcoming_appointment == Some(true) {
            filters.push(Criterion::HasUpcomingAppointment);
        }
        filters
    }

    /// True when no filter would be applied.
    pub fn is_empty(&self) -> bool {
        self.active_filters().is_empty()
    }
}
