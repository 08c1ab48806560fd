//! Predicate types and evaluation logic for segment criteria.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::CustomerActivity;

/// One applied audience filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    LastVisitWithinDays(i64),
    NotVisitedSinceDays(i64),
    MinAppointments(i64),
    MaxAppointments(i64),
    MinTotalSpend(f64),
    HasMembership,
    LoyaltyEligible,
    HasUpcomingAppointment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl Criterion {
    /// Wire name of the criteria key this filter comes from.
    pub fn key(&self) -> &'static str {
        match self {
            Criterion::LastVisitWithinDays(_) => "lastVisitWithinDays",
            Criterion::NotVisitedSinceDays(_) => "notVisitedSinceDays",
            Criterion::MinAppointments(_) => "minAppointments",
            Criterion::MaxAppointments(_) => "maxAppointments",
            Criterion::MinTotalSpend(_) => "minTotalSpend",
            Criterion::HasMembership => "hasMembership",
            Criterion::LoyaltyEligible => "loyaltyEligible",
            Criterion::HasUpcomingAppointment => "hasUpcomingAppointment",
        }
    }

    pub fn matches(&self, customer: &CustomerActivity, now: DateTime<Utc>) -> bool {
        match *self {
            Criterion::LastVisitWithinDays(days) => match customer.last_visit_date {
                Some(last) => match days_before(now, days) {
                    Some(cutoff) => last >= cutoff,
                    None => true,
                },
                None => false,
            },
            Criterion::NotVisitedSinceDays(days) => match customer.last_visit_date {
                Some(last) => match days_before(now, days) {
                    Some(cutoff) => last <= cutoff,
                    None => false,
                },
                None => true,
            },
            Criterion::MinAppointments(n) => compare_counts(
                customer.appointment_count as i64,
                ComparisonOperator::GreaterThanOrEqual,
                n,
            ),
            Criterion::MaxAppointments(n) => compare_counts(
                customer.appointment_count as i64,
                ComparisonOperator::LessThanOrEqual,
                n,
            ),
            Criterion::MinTotalSpend(spend) => compare_amounts(
                customer.total_spend,
                ComparisonOperator::GreaterThanOrEqual,
                spend,
            ),
            Criterion::HasMembership => customer.has_membership,
            Criterion::LoyaltyEligible => customer.loyalty_eligible,
            Criterion::HasUpcomingAppointment => customer.has_upcoming_appointment,
        }
    }
}

/// Logical AND over every filter; an empty list matches everyone.
pub fn matches_all(filters: &[Criterion], customer: &CustomerActivity, now: DateTime<Utc>) -> bool {
    filters.iter().all(|f| f.matches(customer, now))
}

pub fn compare_counts(actual: i64, operator: ComparisonOperator, expected: i64) -> bool {
    match operator {
        ComparisonOperator::GreaterThanOrEqual => actual >= expected,
        ComparisonOperator::LessThanOrEqual => actual <= expected,
    }
}

pub fn compare_amounts(actual: f64, operator: ComparisonOperator, expected: f64) -> bool {
    match operator {
        ComparisonOperator::GreaterThanOrEqual => actual >= expected,
        ComparisonOperator::LessThanOrEqual => actual <= expected,
    }
}

/// `now - days`, or `None` when the offset falls outside the representable range.
fn days_before(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(days).and_then(|d| now.checked_sub_signed(d))
}
