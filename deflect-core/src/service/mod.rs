//! Request-driven services
//!
//! Each service owns the writer for the fields it mutates; the router
//! bundles them behind the HTTP endpoints.

pub mod calibration;
pub mod chord;
pub mod ingest;
pub mod query;
pub mod router;
pub mod target;

pub use calibration::CalibrationService;
pub use chord::{ChordOutcome, ChordService};
pub use ingest::SecondarySensorIngestor;
pub use query::TelemetryQueryService;
pub use router::Router;
pub use target::TargetConfigService;
