//! Segment builder: fluent API for constructing segment criteria.

use crate::criteria::SegmentCriteria;

#[derive(Debug, Clone, Default)]
pub struct SegmentBuilder {
    criteria: SegmentCriteria,
}

impl SegmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited_within_days(mut self, days: i64) -> Self {
        self.criteria.last_visit_within_days = Some(days);
        self
    }

    pub fn not_visited_since_days(mut self, days: i64) -> Self {
        self.criteria.not_visited_since_days = Some(days);
        self
    }

    pub fn min_appointments(mut self, n: i64) -> Self {
        self.criteria.min_appointments = Some(n);
        self
    }

    pub fn max_appointments(mut self, n: i64) -> Self {
        self.criteria.max_appointments = Some(n);
        self
    }

    pub fn min_total_spend(mut self, amount: f64) -> Self {
        self.criteria.min_total_spend = Some(amount);
        self
    }

    pub fn members_only(mut self) -> Self {
        self.criteria.has_membership = Some(true);
        self
    }

    pub fn loyalty_eligible(mut self) -> Self {
        self.criteria.loyalty_eligible = Some(true);
        self
    }

    pub fn with_upcoming_appointment(mut self) -> Self {
        self.criteria.has_upcoming_appointment = Some(true);
        self
    }

    pub fn build(self) -> SegmentCriteria {
        self.criteria
    }
}
