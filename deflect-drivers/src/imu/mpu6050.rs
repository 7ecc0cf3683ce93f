//! MPU-6050 accelerometer tilt sensor
//!
//! The deflection angle is taken from gravity alone: with the sensor at
//! rest on the control surface, the direction of the measured acceleration
//! gives the surface's tilt around the hinge axis.
//!
//! Register map (subset):
//! ```text
//! 0x1C ACCEL_CONFIG   full scale select (±2 g = 0x00)
//! 0x3B ACCEL_XOUT_H   6 bytes: X, Y, Z big-endian i16
//! 0x6B PWR_MGMT_1     0x00 wakes the device
//! 0x75 WHO_AM_I       reads 0x68
//! ```

use deflect_core::traits::{AngleSensor, SensorError};
use embedded_hal_async::i2c::I2c;

/// Default I2C address (AD0 low)
pub const MPU6050_ADDRESS: u8 = 0x68;

const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;

const WHO_AM_I_VALUE: u8 = 0x68;
const ACCEL_FS_2G: u8 = 0x00;

const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Axis the control surface hinge is parallel to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TiltAxis {
    /// Hinge along the sensor X axis (tilt moves Y into Z)
    #[default]
    X,
    /// Hinge along the sensor Y axis (tilt moves X into Z)
    Y,
}

/// MPU-6050 on an async I2C bus
pub struct Mpu6050<I2C> {
    i2c: I2C,
    address: u8,
    axis: TiltAxis,
}

impl<I2C: I2c> Mpu6050<I2C> {
    pub fn new(i2c: I2C, address: u8, axis: TiltAxis) -> Self {
        Self { i2c, address, axis }
    }

    /// Check the device identity, wake it and select ±2 g
    pub async fn init(&mut self) -> Result<(), SensorError> {
        let mut who = [0u8; 1];
        self.i2c
            .write_read(self.address, &[REG_WHO_AM_I], &mut who)
            .await
            .map_err(|_| SensorError::Bus)?;
        if who[0] != WHO_AM_I_VALUE {
            return Err(SensorError::NotResponding);
        }

        self.write_register(REG_PWR_MGMT_1, 0x00).await?;
        self.write_register(REG_ACCEL_CONFIG, ACCEL_FS_2G).await
    }

    /// Raw accelerometer counts (x, y, z)
    pub async fn read_accel(&mut self) -> Result<[i16; 3], SensorError> {
        let mut raw = [0u8; 6];
        self.i2c
            .write_read(self.address, &[REG_ACCEL_XOUT_H], &mut raw)
            .await
            .map_err(|_| SensorError::Bus)?;
        Ok([
            i16::from_be_bytes([raw[0], raw[1]]),
            i16::from_be_bytes([raw[2], raw[3]]),
            i16::from_be_bytes([raw[4], raw[5]]),
        ])
    }

    async fn write_register(&mut self, register: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[register, value])
            .await
            .map_err(|_| SensorError::Bus)
    }
}

/// Tilt angle (degrees) around `axis` from accelerometer counts
pub fn tilt_degrees(accel: [i16; 3], axis: TiltAxis) -> Result<f32, SensorError> {
    let [x, y, z] = accel.map(f32::from);
    if x == 0.0 && y == 0.0 && z == 0.0 {
        // Free fall or a dead sensor; no gravity direction to measure
        return Err(SensorError::OutOfRange);
    }
    let radians = match axis {
        TiltAxis::X => libm::atan2f(y, z),
        TiltAxis::Y => libm::atan2f(-x, libm::sqrtf(y * y + z * z)),
    };
    Ok(radians * RAD_TO_DEG)
}

impl<I2C: I2c> AngleSensor for Mpu6050<I2C> {
    async fn read_angle(&mut self) -> Result<f32, SensorError> {
        let accel = self.read_accel().await?;
        tilt_degrees(accel, self.axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorKind, ErrorType, Operation};

    /// Register file behind a fake I2C bus
    struct FakeBus {
        registers: [u8; 128],
        pointer: usize,
        nack: bool,
    }

    impl FakeBus {
        fn with_accel(x: i16, y: i16, z: i16) -> Self {
            let mut registers = [0u8; 128];
            registers[REG_WHO_AM_I as usize] = WHO_AM_I_VALUE;
            registers[REG_PWR_MGMT_1 as usize] = 0x40;
            let base = REG_ACCEL_XOUT_H as usize;
            for (i, value) in [x, y, z].iter().enumerate() {
                registers[base + 2 * i..base + 2 * i + 2].copy_from_slice(&value.to_be_bytes());
            }
            Self {
                registers,
                pointer: 0,
                nack: false,
            }
        }
    }

    fn imu_reading(x: i16, y: i16, z: i16) -> Mpu6050<FakeBus> {
        Mpu6050::new(FakeBus::with_accel(x, y, z), MPU6050_ADDRESS, TiltAxis::X)
    }

    impl ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.nack || address != MPU6050_ADDRESS {
                return Err(ErrorKind::Other);
            }
            for operation in operations {
                match operation {
                    Operation::Write(bytes) => {
                        if let Some((&register, data)) = bytes.split_first() {
                            self.pointer = register as usize;
                            for &byte in data {
                                self.registers[self.pointer] = byte;
                                self.pointer += 1;
                            }
                        }
                    }
                    Operation::Read(buffer) => {
                        for byte in buffer.iter_mut() {
                            *byte = self.registers[self.pointer];
                            self.pointer += 1;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_init_wakes_device() {
        let mut imu = imu_reading(0, 0, 16384);

        block_on(imu.init()).unwrap();

        assert_eq!(imu.i2c.registers[REG_PWR_MGMT_1 as usize], 0x00);
        assert_eq!(imu.i2c.registers[REG_ACCEL_CONFIG as usize], ACCEL_FS_2G);
    }

    #[test]
    fn test_init_rejects_wrong_identity() {
        let mut bus = FakeBus::with_accel(0, 0, 16384);
        bus.registers[REG_WHO_AM_I as usize] = 0x12;
        let mut imu = Mpu6050::new(bus, MPU6050_ADDRESS, TiltAxis::X);

        assert_eq!(block_on(imu.init()), Err(SensorError::NotResponding));
    }

    #[test]
    fn test_level_surface_reads_zero() {
        let mut imu = imu_reading(0, 0, 16384);
        assert_eq!(block_on(imu.read_angle()), Ok(0.0));
    }

    #[test]
    fn test_tilt_around_x() {
        // 30 degrees: y = g * sin(30), z = g * cos(30)
        let mut imu = imu_reading(0, 8192, 14189);
        let angle = block_on(imu.read_angle()).unwrap();
        assert!(libm::fabsf(angle - 30.0) < 0.05, "angle = {}", angle);
    }

    #[test]
    fn test_tilt_around_y() {
        let angle = tilt_degrees([-11585, 0, 11585], TiltAxis::Y).unwrap();
        assert!(libm::fabsf(angle - 45.0) < 0.05, "angle = {}", angle);
    }

    #[test]
    fn test_no_gravity_is_out_of_range() {
        assert_eq!(tilt_degrees([0, 0, 0], TiltAxis::X), Err(SensorError::OutOfRange));
    }

    #[test]
    fn test_bus_error() {
        let mut bus = FakeBus::with_accel(0, 0, 16384);
        bus.nack = true;
        let mut imu = Mpu6050::new(bus, MPU6050_ADDRESS, TiltAxis::X);

        assert_eq!(block_on(imu.read_angle()), Err(SensorError::Bus));
    }
}
