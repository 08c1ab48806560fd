//! Audience segmentation: criteria, conjunctive filter evaluation,
//! activity derivation and sequenced previews.

pub mod builder;
pub mod computed;
pub mod criteria;
pub mod engine;
pub mod predicates;
pub mod preview;
pub mod source;

pub use builder::SegmentBuilder;
pub use computed::{ActivityBuilder, CustomerRecords};
pub use criteria::SegmentCriteria;
pub use engine::{CustomerActivity, CustomerSummary, SegmentFilterEvaluator, SegmentPreview};
pub use preview::{PreviewSequencer, PreviewService, PreviewTicket};
pub use source::{CustomerSource, DisconnectedSource, InMemoryCustomerSource, RecordsCustomerSource};
