//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in deflect-core for the monitor's hardware:
//!
//! - Battery voltage through a resistor divider (ADC averaging)
//! - RGB target indicator
//! - MPU-6050 accelerometer tilt sensor

#![no_std]
#![deny(unsafe_code)]

pub mod battery;
pub mod imu;
pub mod indicator;
