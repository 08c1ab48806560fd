//! Segment filter evaluator: applies audience criteria to a customer
//! population and produces a deterministic preview.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::criteria::SegmentCriteria;
use crate::predicates::matches_all;

/// Default number of customers shown in a preview sample.
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// A customer annotated with the activity facts the filters read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerActivity {
    pub customer_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub last_visit_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub appointment_count: u32,
    #[serde(default)]
    pub total_spend: f64,
    #[serde(default)]
    pub has_membership: bool,
    #[serde(default)]
    pub loyalty_eligible: bool,
    #[serde(default)]
    pub has_upcoming_appointment: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub last_visit_date: Option<DateTime<Utc>>,
    pub total_visits: u32,
}

impl From<&CustomerActivity> for CustomerSummary {
    fn from(customer: &CustomerActivity) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            last_visit_date: customer.last_visit_date,
            total_visits: customer.appointment_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPreview {
    pub total_count: usize,
    pub sample: Vec<CustomerSummary>,
}

/// Stateless evaluator; every call works on the population it is handed.
#[derive(Debug, Clone)]
pub struct SegmentFilterEvaluator {
    sample_size: usize,
}

impl SegmentFilterEvaluator {
    pub fn new(sample_size: usize) -> Self {
        Self { sample_size }
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Every customer matching all set criteria, most recent visit first.
    pub fn matching<'a>(
        &self,
        criteria: &SegmentCriteria,
        population: &'a [CustomerActivity],
        now: DateTime<Utc>,
    ) -> Vec<&'a CustomerActivity> {
        let filters = criteria.active_filters();
        let mut matched: Vec<&CustomerActivity> = population
            .iter()
            .filter(|c| matches_all(&filters, c, now))
            .collect();
        matched.sort_by(|a, b| preview_order(a, b));
        matched
    }

    pub fn evaluate(
        &self,
        criteria: &SegmentCriteria,
        population: &[CustomerActivity],
        now: DateTime<Utc>,
    ) -> SegmentPreview {
        let matched = self.matching(criteria, population, now);
        let preview = SegmentPreview {
            total_count: matched.len(),
            sample: matched
                .iter()
                .take(self.sample_size)
                .map(|c| CustomerSummary::from(*c))
                .collect(),
        };
        tracing::debug!(
            population = population.len(),
            total_count = preview.total_count,
            filters = criteria.active_filters().len(),
            "Segment evaluated"
        );
        preview
    }
}

impl Default for SegmentFilterEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_SIZE)
    }
}

/// Most recent visit first, never-visited last; ties by name, then id.
fn preview_order(a: &CustomerActivity, b: &CustomerActivity) -> Ordering {
    b.last_visit_date
        .cmp(&a.last_visit_date)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.customer_id.cmp(&b.customer_id))
}
