//! Visual feedback
//!
//! Target proximity classification and the status heartbeat.

pub mod classifier;
pub mod proximity;
pub mod status;

pub use classifier::ProximityClassifier;
pub use proximity::ProximityClass;
pub use status::Heartbeat;
