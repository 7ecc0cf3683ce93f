//! Board-agnostic telemetry core for the deflection monitor
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Chord-to-travel conversion
//! - Lock-free shared telemetry state with single-writer roles
//! - Request services (snapshot, remote ingestion, target, reset, chord)
//! - Target proximity classification and heartbeat
//! - Sensor sampling steps
//! - Configuration types and parser

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod feedback;
pub mod geometry;
pub mod sampling;
pub mod service;
pub mod state;
pub mod traits;
