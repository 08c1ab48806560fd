//! Audience preview service with latest-request-wins sequencing.
//!
//! Every preview takes a ticket from a monotonically increasing counter when
//! it arrives, and the ticket travels back with the result. Debouncing edits
//! is the form's job; the form keeps the highest `seq` it has seen and drops
//! any response numbered below it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use campaign_core::config::PreviewConfig;
use campaign_core::CampaignResult;
use chrono::Utc;
use tracing::{debug, warn};

use crate::criteria::SegmentCriteria;
use crate::engine::{SegmentFilterEvaluator, SegmentPreview};
use crate::source::CustomerSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PreviewTicket {
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct PreviewSequencer {
    latest: AtomicU64,
}

impl PreviewSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket that supersedes every earlier one.
    pub fn next(&self) -> PreviewTicket {
        PreviewTicket {
            seq: self.latest.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

pub struct PreviewService {
    source: Arc<dyn CustomerSource>,
    evaluator: SegmentFilterEvaluator,
    sequencer: PreviewSequencer,
}

impl PreviewService {
    pub fn new(source: Arc<dyn CustomerSource>, evaluator: SegmentFilterEvaluator) -> Self {
        Self {
            source,
            evaluator,
            sequencer: PreviewSequencer::new(),
        }
    }

    pub fn from_config(source: Arc<dyn CustomerSource>, config: &PreviewConfig) -> Self {
        Self::new(source, SegmentFilterEvaluator::new(config.sample_size))
    }

    pub fn sequencer(&self) -> &PreviewSequencer {
        &self.sequencer
    }

    /// Evaluate against a fresh population snapshot. The ticket is taken
    /// before the population loads so it reflects arrival order.
    pub fn preview_now(
        &self,
        criteria: &SegmentCriteria,
    ) -> CampaignResult<(PreviewTicket, SegmentPreview)> {
        let ticket = self.sequencer.next();
        let population = self.source.load_population().map_err(|e| {
            warn!(seq = ticket.seq, error = %e, "Customer population unavailable for preview");
            metrics::counter!("segments.preview_unavailable").increment(1);
            e
        })?;
        metrics::counter!("segments.previews").increment(1);
        let preview = self.evaluator.evaluate(criteria, &population, Utc::now());
        debug!(seq = ticket.seq, total_count = preview.total_count, "Preview computed");
        Ok((ticket, preview))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CustomerActivity;
    use crate::source::{DisconnectedSource, InMemoryCustomerSource};
    use campaign_core::CampaignError;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn population() -> Vec<CustomerActivity> {
        (0..8)
            .map(|i| CustomerActivity {
                customer_id: Uuid::new_v4(),
                name: format!("Customer {i}"),
                email: None,
                phone: None,
                last_visit_date: Some(Utc::now() - chrono::Duration::days(i)),
                appointment_count: i as u32,
                total_spend: 50.0 * i as f64,
                has_membership: i % 2 == 0,
                loyalty_eligible: false,
                has_upcoming_appointment: false,
            })
            .collect()
    }

    fn service() -> PreviewService {
        PreviewService::new(
            Arc::new(InMemoryCustomerSource::new(population())),
            SegmentFilterEvaluator::default(),
        )
    }

    #[test]
    fn test_sequencer_is_monotonic() {
        let sequencer = PreviewSequencer::new();
        let first = sequencer.next();
        let second = sequencer.next();
        assert!(second > first);
        assert_eq!(sequencer.latest(), second.seq);
    }

    #[test]
    fn test_sequencer_tickets_unique_across_threads() {
        let sequencer = PreviewSequencer::new();
        let seqs: HashSet<u64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| (0..250).map(|_| sequencer.next().seq).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });
        assert_eq!(seqs.len(), 1000);
        assert_eq!(sequencer.latest(), 1000);
    }

    #[test]
    fn test_preview_now_uses_sample_size() {
        let criteria = SegmentCriteria {
            min_appointments: Some(0),
            ..Default::default()
        };
        let (_, preview) = service().preview_now(&criteria).unwrap();
        assert_eq!(preview.total_count, 8);
        assert_eq!(preview.sample.len(), 5);
    }

    #[test]
    fn test_later_previews_carry_higher_tickets() {
        let service = service();
        let members = SegmentCriteria {
            has_membership: Some(true),
            ..Default::default()
        };
        let regulars = SegmentCriteria {
            min_appointments: Some(6),
            ..Default::default()
        };
        let (first, member_preview) = service.preview_now(&members).unwrap();
        let (second, regular_preview) = service.preview_now(&regulars).unwrap();
        assert!(second > first);
        assert_eq!(member_preview.total_count, 4);
        assert_eq!(regular_preview.total_count, 2);
    }

    #[test]
    fn test_preview_now_reports_unavailable_source() {
        let service = PreviewService::new(Arc::new(DisconnectedSource), SegmentFilterEvaluator::default());
        let result = service.preview_now(&SegmentCriteria::default());
        assert!(matches!(result, Err(CampaignError::PopulationUnavailable(_))));
        assert_eq!(service.sequencer().latest(), 1);
    }
}
