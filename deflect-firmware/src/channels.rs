//! Inter-task communication channels
//!
//! Telemetry itself lives in the lock-free shared state; these primitives
//! only carry control flow between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use deflect_core::state::ServerAction;

/// Start/stop requests for the HTTP server (from the access point task)
pub static SERVER_ACTION: Signal<CriticalSectionRawMutex, ServerAction> = Signal::new();
