//! Customer population source: the data store the evaluator reads from.

use std::path::Path;

use campaign_core::loyalty::LoyaltyRule;
use campaign_core::{CampaignError, CampaignResult};
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::computed::{ActivityBuilder, CustomerRecords};
use crate::engine::CustomerActivity;

/// Supplies the annotated customer population. Implementations own the data;
/// callers receive a snapshot copy.
pub trait CustomerSource: Send + Sync {
    fn load_population(&self) -> CampaignResult<Vec<CustomerActivity>>;
}

/// In-memory population, optionally seeded from a JSON array file.
pub struct InMemoryCustomerSource {
    customers: RwLock<Vec<CustomerActivity>>,
}

impl InMemoryCustomerSource {
    pub fn new(customers: Vec<CustomerActivity>) -> Self {
        Self {
            customers: RwLock::new(customers),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> CampaignResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let customers: Vec<CustomerActivity> = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            customers = customers.len(),
            "Customer population loaded"
        );
        Ok(Self::new(customers))
    }

    /// Swap in a fresh snapshot from the upstream store.
    pub fn replace(&self, customers: Vec<CustomerActivity>) {
        *self.customers.write() = customers;
    }

    pub fn len(&self) -> usize {
        self.customers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.read().is_empty()
    }
}

impl CustomerSource for InMemoryCustomerSource {
    fn load_population(&self) -> CampaignResult<Vec<CustomerActivity>> {
        Ok(self.customers.read().clone())
    }
}

/// Raw customer, appointment and membership rows. Activity facts, loyalty
/// eligibility included, are derived on every load so they track the clock.
pub struct RecordsCustomerSource {
    records: RwLock<CustomerRecords>,
    loyalty: Box<dyn LoyaltyRule>,
}

impl RecordsCustomerSource {
    pub fn new(records: CustomerRecords, loyalty: impl LoyaltyRule + 'static) -> Self {
        Self {
            records: RwLock::new(records),
            loyalty: Box::new(loyalty),
        }
    }

    pub fn from_json_file(
        path: impl AsRef<Path>,
        loyalty: impl LoyaltyRule + 'static,
    ) -> CampaignResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let records: CustomerRecords = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            customers = records.customers.len(),
            appointments = records.appointments.len(),
            memberships = records.memberships.len(),
            "Customer records loaded"
        );
        Ok(Self::new(records, loyalty))
    }

    pub fn replace(&self, records: CustomerRecords) {
        *self.records.write() = records;
    }
}

impl CustomerSource for RecordsCustomerSource {
    fn load_population(&self) -> CampaignResult<Vec<CustomerActivity>> {
        let records = self.records.read();
        let population = ActivityBuilder::new(self.loyalty.as_ref()).build_from(&records, Utc::now());
        debug!(customers = population.len(), "Customer activity derived");
        Ok(population)
    }
}

/// Source used when no population is configured; every load fails so the
/// caller surfaces "preview unavailable".
pub struct DisconnectedSource;

impl CustomerSource for DisconnectedSource {
    fn load_population(&self) -> CampaignResult<Vec<CustomerActivity>> {
        Err(CampaignError::PopulationUnavailable(
            "no customer data store configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::loyalty::VisitThresholdRule;
    use uuid::Uuid;

    fn activity(name: &str) -> CustomerActivity {
        CustomerActivity {
            customer_id: Uuid::new_v4(),
            name: name.to_string(),
            email: None,
            phone: None,
            last_visit_date: None,
            appointment_count: 0,
            total_spend: 0.0,
            has_membership: false,
            loyalty_eligible: false,
            has_upcoming_appointment: false,
        }
    }

    #[test]
    fn test_replace_swaps_snapshot() {
        let source = InMemoryCustomerSource::new(vec![activity("Rex")]);
        assert_eq!(source.len(), 1);
        source.replace(vec![activity("Ziggy"), activity("Pip")]);
        let loaded = source.load_population().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "Ziggy");
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("population-{}.json", Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"[{"customerId": "8f7d2c1e-3a4b-4c5d-9e6f-0a1b2c3d4e5f", "name": "Olive Park",
                 "appointmentCount": 3, "hasMembership": true}]"#,
        )
        .unwrap();
        let source = InMemoryCustomerSource::from_json_file(&path).unwrap();
        let loaded = source.load_population().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].appointment_count, 3);
        assert!(loaded[0].has_membership);
        assert!(!loaded[0].loyalty_eligible);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = InMemoryCustomerSource::from_json_file("/nonexistent/population.json");
        assert!(matches!(result, Err(CampaignError::Io(_))));
    }

    #[test]
    fn test_records_file_derives_activity_with_loyalty_rule() {
        let path = std::env::temp_dir().join(format!("records-{}.json", Uuid::new_v4()));
        let now = Utc::now();
        let day = |n: i64| (now - chrono::Duration::days(n)).to_rfc3339();
        let doc = serde_json::json!({
            "customers": [
                {"id": "8f7d2c1e-3a4b-4c5d-9e6f-0a1b2c3d4e5f", "first_name": "Hazel",
                 "last_name": "Ng", "email": "hazel@example.com", "phone": null},
                {"id": "1b2c3d4e-5f60-4a1b-8c2d-3e4f5a6b7c8d", "first_name": "Otis",
                 "last_name": "Reed", "email": null, "phone": "+15550142"}
            ],
            "appointments": [
                {"customer_id": "8f7d2c1e-3a4b-4c5d-9e6f-0a1b2c3d4e5f", "start_time": day(20),
                 "status": "completed", "total_price": 65.0},
                {"customer_id": "8f7d2c1e-3a4b-4c5d-9e6f-0a1b2c3d4e5f", "start_time": day(50),
                 "status": "completed", "total_price": 65.0},
                {"customer_id": "1b2c3d4e-5f60-4a1b-8c2d-3e4f5a6b7c8d", "start_time": day(90),
                 "status": "completed", "total_price": 120.0}
            ],
            "memberships": [
                {"customer_id": "1b2c3d4e-5f60-4a1b-8c2d-3e4f5a6b7c8d", "status": "active",
                 "expires_at": null}
            ]
        });
        std::fs::write(&path, doc.to_string()).unwrap();

        let source = RecordsCustomerSource::from_json_file(&path, VisitThresholdRule::new(2, 365)).unwrap();
        std::fs::remove_file(&path).unwrap();
        let population = source.load_population().unwrap();
        assert_eq!(population.len(), 2);

        let hazel = population.iter().find(|c| c.name == "Hazel Ng").unwrap();
        assert_eq!(hazel.appointment_count, 2);
        assert_eq!(hazel.total_spend, 130.0);
        assert!(hazel.loyalty_eligible);
        assert!(!hazel.has_membership);

        let otis = population.iter().find(|c| c.name == "Otis Reed").unwrap();
        assert!(!otis.loyalty_eligible);
        assert!(otis.has_membership);
    }

    #[test]
    fn test_records_replace_is_seen_on_next_load() {
        let source = RecordsCustomerSource::new(CustomerRecords::default(), VisitThresholdRule::default());
        assert!(source.load_population().unwrap().is_empty());
        source.replace(CustomerRecords {
            customers: vec![crate::computed::CustomerRecord {
                id: Uuid::new_v4(),
                first_name: "June".to_string(),
                last_name: String::new(),
                email: None,
                phone: None,
            }],
            ..Default::default()
        });
        let population = source.load_population().unwrap();
        assert_eq!(population[0].name, "June");
        assert_eq!(population[0].last_visit_date, None);
    }

    #[test]
    fn test_disconnected_source_reports_unavailable() {
        let result = DisconnectedSource.load_population();
        assert!(matches!(result, Err(CampaignError::PopulationUnavailable(_))));
    }
}
