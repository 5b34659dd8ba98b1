//! The synchronous analysis core: URL keys, exclusions, keyword presence,
//! performance-data cleaning and the report join. Nothing in here performs I/O.

pub mod errors;
pub mod exclusion;
pub mod matcher;
pub mod processor;
pub mod report;
pub mod url;

pub use errors::AnalysisError;
pub use exclusion::ExclusionList;
pub use matcher::{Presence, check_presence};
pub use processor::{
    CleanedTable, EmptyReason, FilterStats, ProcessOutcome, QueryPerformanceRecord, process,
};
pub use report::{BodyPresence, ReportSummary, StrikingDistanceRow, build_report};
pub use url::{UrlMode, UrlNormalizer};
