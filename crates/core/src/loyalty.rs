//! Loyalty eligibility: decides whether a customer has earned a reward groom.
//!
//! The rule itself belongs to the loyalty program; segmentation only asks
//! the yes/no question through [`LoyaltyRule`].

use chrono::{DateTime, Duration, Utc};

use crate::config::LoyaltyConfig;

/// Visit facts a loyalty rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct VisitHistory<'a> {
    /// Start times of completed appointments, any order.
    pub completed_visits: &'a [DateTime<Utc>],
    pub total_spend: f64,
}

pub trait LoyaltyRule: Send + Sync {
    fn is_eligible(&self, history: &VisitHistory<'_>, now: DateTime<Utc>) -> bool;
}

/// "Every Nth groom" punch card: eligible once the customer has at least
/// `visits_required` completed visits inside the trailing window.
#[derive(Debug, Clone)]
pub struct VisitThresholdRule {
    pub visits_required: u32,
    pub window_days: u32,
}

impl VisitThresholdRule {
    pub fn new(visits_required: u32, window_days: u32) -> Self {
        Self {
            visits_required,
            window_days,
        }
    }
}

impl From<&LoyaltyConfig> for VisitThresholdRule {
    fn from(config: &LoyaltyConfig) -> Self {
        Self::new(config.visits_required, config.qualifying_window_days)
    }
}

impl Default for VisitThresholdRule {
    fn default() -> Self {
        Self::from(&LoyaltyConfig::default())
    }
}

impl LoyaltyRule for VisitThresholdRule {
    fn is_eligible(&self, history: &VisitHistory<'_>, now: DateTime<Utc>) -> bool {
        if self.visits_required == 0 {
            return true;
        }
        let cutoff = now - Duration::days(self.window_days as i64);
        let qualifying = history
            .completed_visits
            .iter()
            .filter(|at| **at >= cutoff && **at <= now)
            .count();
        qualifying >= self.visits_required as usize
    }
}
