//! Computed activity: derives the per-customer facts segment filters read
//! from raw customer, appointment and membership rows.

use std::collections::HashMap;

use campaign_core::loyalty::{LoyaltyRule, VisitHistory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::CustomerActivity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub customer_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub total_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Paused,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub customer_id: Uuid,
    pub status: MembershipStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

impl MembershipRecord {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == MembershipStatus::Active && self.expires_at.map_or(true, |at| at > now)
    }
}

/// Raw rows as exported from the salon database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerRecords {
    #[serde(default)]
    pub customers: Vec<CustomerRecord>,
    #[serde(default)]
    pub appointments: Vec<AppointmentRecord>,
    #[serde(default)]
    pub memberships: Vec<MembershipRecord>,
}

#[derive(Default)]
struct Tally {
    completed: Vec<DateTime<Utc>>,
    spend: f64,
    upcoming: bool,
}

/// Builds [`CustomerActivity`] rows, consulting the loyalty rule for eligibility.
pub struct ActivityBuilder<'r> {
    loyalty: &'r dyn LoyaltyRule,
}

impl<'r> ActivityBuilder<'r> {
    pub fn new(loyalty: &'r dyn LoyaltyRule) -> Self {
        Self { loyalty }
    }

    pub fn build_from(&self, records: &CustomerRecords, now: DateTime<Utc>) -> Vec<CustomerActivity> {
        self.build(&records.customers, &records.appointments, &records.memberships, now)
    }

    pub fn build(
        &self,
        customers: &[CustomerRecord],
        appointments: &[AppointmentRecord],
        memberships: &[MembershipRecord],
        now: DateTime<Utc>,
    ) -> Vec<CustomerActivity> {
        let mut tallies: HashMap<Uuid, Tally> = HashMap::new();
        for appt in appointments {
            let tally = tallies.entry(appt.customer_id).or_default();
            match appt.status {
                AppointmentStatus::Completed if appt.start_time <= now => {
                    tally.completed.push(appt.start_time);
                    tally.spend += appt.total_price;
                }
                AppointmentStatus::Scheduled | AppointmentStatus::Confirmed
                    if appt.start_time > now =>
                {
                    tally.upcoming = true;
                }
                _ => {}
            }
        }

        customers
            .iter()
            .map(|customer| {
                let tally = tallies.remove(&customer.id).unwrap_or_default();
                let history = VisitHistory {
                    completed_visits: &tally.completed,
                    total_spend: tally.spend,
                };
                CustomerActivity {
                    customer_id: customer.id,
                    name: format!("{} {}", customer.first_name, customer.last_name)
                        .trim()
                        .to_string(),
                    email: customer.email.clone(),
                    phone: customer.phone.clone(),
                    last_visit_date: tally.completed.iter().max().copied(),
                    appointment_count: tally.completed.len() as u32,
                    total_spend: tally.spend,
                    has_membership: memberships
                        .iter()
                        .any(|m| m.customer_id == customer.id && m.is_active(now)),
                    loyalty_eligible: self.loyalty.is_eligible(&history, now),
                    has_upcoming_appointment: tally.upcoming,
                }
            })
            .collect()
    }
}
