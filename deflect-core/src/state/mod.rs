//! Shared runtime state
//!
//! The telemetry record every producer writes into and every consumer reads
//! from, plus the lifecycle of the HTTP server that exposes it.

pub mod link;
pub mod telemetry;

pub use link::{LinkEvent, ServerAction, ServerLifecycle, ServerState};
pub use telemetry::{
    BatteryWriter, CalibrationWriter, Channel, ChordWriter, ClaimError, PrimaryWriter, Role,
    SecondaryWriter, SharedTelemetryState, TargetSpec, TargetWriter,
};
