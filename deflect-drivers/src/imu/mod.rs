//! Tilt sensors

pub mod mpu6050;

pub use mpu6050::{tilt_degrees, Mpu6050, TiltAxis, MPU6050_ADDRESS};
