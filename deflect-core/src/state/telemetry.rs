//! Shared telemetry state
//!
//! One record holds the latest value of every producer. Each field lives in
//! its own atomic cell and has exactly one writer; there is no lock and no
//! compound read, so a reader assembling several fields may see them from
//! different instants.
//!
//! Write access is handed out as writer handles. Each [`Role`] can be
//! claimed once per state instance, which keeps a second producer from ever
//! writing a field it does not own.

use portable_atomic::{AtomicBool, AtomicF32, AtomicU16, AtomicU8, Ordering};

use crate::geometry::DEFAULT_CHORD_MM;

/// Angle source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Local sensor on the device
    Primary,
    /// Remote node pushing readings over the network
    Secondary,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Primary, Channel::Secondary];
}

/// Writer roles, one per group of owned fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    Primary,
    Secondary,
    Battery,
    Calibration,
    Target,
    Chord,
}

impl Role {
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Error returned when a writer role is already taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClaimError {
    AlreadyClaimed(Role),
}

/// Target tracking configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TargetSpec {
    pub angle_deg: f32,
    pub active: bool,
}

struct ChannelCells {
    raw_angle: AtomicF32,
    raw_travel: AtomicF32,
    zero_angle: AtomicF32,
    zero_travel: AtomicF32,
}

impl ChannelCells {
    const fn new() -> Self {
        Self {
            raw_angle: AtomicF32::new(0.0),
            raw_travel: AtomicF32::new(0.0),
            zero_angle: AtomicF32::new(0.0),
            zero_travel: AtomicF32::new(0.0),
        }
    }
}

/// Process-wide telemetry record
///
/// Fields never written read as 0.0 / `false`, the chord length reads as
/// the value the state was created with.
pub struct SharedTelemetryState {
    primary: ChannelCells,
    secondary: ChannelCells,
    primary_ready: AtomicBool,
    local_voltage_mv: AtomicF32,
    remote_voltage_mv: AtomicF32,
    target_angle: AtomicF32,
    target_active: AtomicBool,
    chord_mm: AtomicU16,
    claimed: AtomicU8,
}

impl Default for SharedTelemetryState {
    fn default() -> Self {
        Self::new(DEFAULT_CHORD_MM)
    }
}

impl SharedTelemetryState {
    /// Create an empty state; usable in a `static`
    ///
    /// A zero chord length falls back to [`DEFAULT_CHORD_MM`].
    pub const fn new(chord_mm: u16) -> Self {
        let chord_mm = if chord_mm == 0 {
            DEFAULT_CHORD_MM
        } else {
            chord_mm
        };
        Self {
            primary: ChannelCells::new(),
            secondary: ChannelCells::new(),
            primary_ready: AtomicBool::new(false),
            local_voltage_mv: AtomicF32::new(0.0),
            remote_voltage_mv: AtomicF32::new(0.0),
            target_angle: AtomicF32::new(0.0),
            target_active: AtomicBool::new(false),
            chord_mm: AtomicU16::new(chord_mm),
            claimed: AtomicU8::new(0),
        }
    }

    fn cells(&self, channel: Channel) -> &ChannelCells {
        match channel {
            Channel::Primary => &self.primary,
            Channel::Secondary => &self.secondary,
        }
    }

    // ---- Reads ----

    /// Most recent angle sample (degrees)
    pub fn raw_angle(&self, channel: Channel) -> f32 {
        self.cells(channel).raw_angle.load(Ordering::Relaxed)
    }

    /// Most recent travel (mm), converted when the sample was written
    pub fn raw_travel(&self, channel: Channel) -> f32 {
        self.cells(channel).raw_travel.load(Ordering::Relaxed)
    }

    pub fn zero_offset_angle(&self, channel: Channel) -> f32 {
        self.cells(channel).zero_angle.load(Ordering::Relaxed)
    }

    pub fn zero_offset_travel(&self, channel: Channel) -> f32 {
        self.cells(channel).zero_travel.load(Ordering::Relaxed)
    }

    /// Calibrated angle, derived on every call
    pub fn relative_angle(&self, channel: Channel) -> f32 {
        self.raw_angle(channel) - self.zero_offset_angle(channel)
    }

    /// Calibrated travel, derived on every call
    pub fn relative_travel(&self, channel: Channel) -> f32 {
        self.raw_travel(channel) - self.zero_offset_travel(channel)
    }

    /// Whether the primary sensor finished warming up
    pub fn primary_ready(&self) -> bool {
        self.primary_ready.load(Ordering::Acquire)
    }

    /// Local battery (mV)
    pub fn local_voltage_mv(&self) -> f32 {
        self.local_voltage_mv.load(Ordering::Relaxed)
    }

    /// Remote node battery (mV)
    pub fn remote_voltage_mv(&self) -> f32 {
        self.remote_voltage_mv.load(Ordering::Relaxed)
    }

    /// Target configuration
    ///
    /// An active target always carries the angle it was activated with.
    pub fn target(&self) -> TargetSpec {
        let active = self.target_active.load(Ordering::Acquire);
        let angle_deg = self.target_angle.load(Ordering::Acquire);
        TargetSpec { angle_deg, active }
    }

    pub fn chord_mm(&self) -> u16 {
        self.chord_mm.load(Ordering::Relaxed)
    }

    // ---- Writer claims ----

    fn claim(&self, role: Role) -> Result<(), ClaimError> {
        let previous = self.claimed.fetch_or(role.bit(), Ordering::AcqRel);
        if previous & role.bit() != 0 {
            return Err(ClaimError::AlreadyClaimed(role));
        }
        Ok(())
    }

    pub fn primary_writer(&self) -> Result<PrimaryWriter<'_>, ClaimError> {
        self.claim(Role::Primary)?;
        Ok(PrimaryWriter { state: self })
    }

    pub fn secondary_writer(&self) -> Result<SecondaryWriter<'_>, ClaimError> {
        self.claim(Role::Secondary)?;
        Ok(SecondaryWriter { state: self })
    }

    pub fn battery_writer(&self) -> Result<BatteryWriter<'_>, ClaimError> {
        self.claim(Role::Battery)?;
        Ok(BatteryWriter { state: self })
    }

    pub fn calibration_writer(&self) -> Result<CalibrationWriter<'_>, ClaimError> {
        self.claim(Role::Calibration)?;
        Ok(CalibrationWriter { state: self })
    }

    pub fn target_writer(&self) -> Result<TargetWriter<'_>, ClaimError> {
        self.claim(Role::Target)?;
        Ok(TargetWriter { state: self })
    }

    pub fn chord_writer(&self) -> Result<ChordWriter<'_>, ClaimError> {
        self.claim(Role::Chord)?;
        Ok(ChordWriter { state: self })
    }
}

fn sanitize_voltage(millivolts: f32) -> f32 {
    // NaN fails the comparison as well
    if millivolts >= 0.0 {
        millivolts
    } else {
        0.0
    }
}

/// Owner of the primary channel samples and the ready flag
pub struct PrimaryWriter<'a> {
    state: &'a SharedTelemetryState,
}

impl<'a> PrimaryWriter<'a> {
    pub fn state(&self) -> &'a SharedTelemetryState {
        self.state
    }

    pub fn write_sample(&self, angle_deg: f32, travel_mm: f32) {
        let cells = &self.state.primary;
        cells.raw_angle.store(angle_deg, Ordering::Relaxed);
        cells.raw_travel.store(travel_mm, Ordering::Relaxed);
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.primary_ready.store(ready, Ordering::Release);
    }
}

/// Owner of the secondary channel samples and the remote voltage
pub struct SecondaryWriter<'a> {
    state: &'a SharedTelemetryState,
}

impl<'a> SecondaryWriter<'a> {
    pub fn state(&self) -> &'a SharedTelemetryState {
        self.state
    }

    pub fn write_sample(&self, angle_deg: f32, travel_mm: f32) {
        let cells = &self.state.secondary;
        cells.raw_angle.store(angle_deg, Ordering::Relaxed);
        cells.raw_travel.store(travel_mm, Ordering::Relaxed);
    }

    pub fn write_voltage_mv(&self, millivolts: f32) {
        self.state
            .remote_voltage_mv
            .store(sanitize_voltage(millivolts), Ordering::Relaxed);
    }
}

/// Owner of the local battery voltage
pub struct BatteryWriter<'a> {
    state: &'a SharedTelemetryState,
}

impl BatteryWriter<'_> {
    pub fn write_voltage_mv(&self, millivolts: f32) {
        self.state
            .local_voltage_mv
            .store(sanitize_voltage(millivolts), Ordering::Relaxed);
    }
}

/// Owner of the zero offsets of both channels
pub struct CalibrationWriter<'a> {
    state: &'a SharedTelemetryState,
}

impl<'a> CalibrationWriter<'a> {
    pub fn state(&self) -> &'a SharedTelemetryState {
        self.state
    }

    pub fn write_offsets(&self, channel: Channel, angle_deg: f32, travel_mm: f32) {
        let cells = self.state.cells(channel);
        cells.zero_angle.store(angle_deg, Ordering::Relaxed);
        cells.zero_travel.store(travel_mm, Ordering::Relaxed);
    }
}

/// Owner of the target configuration
pub struct TargetWriter<'a> {
    state: &'a SharedTelemetryState,
}

impl TargetWriter<'_> {
    /// Set the target angle and activate tracking
    pub fn publish(&self, angle_deg: f32) -> TargetSpec {
        self.state.target_angle.store(angle_deg, Ordering::Release);
        self.state.target_active.store(true, Ordering::Release);
        TargetSpec {
            angle_deg,
            active: true,
        }
    }
}

/// Owner of the chord length
pub struct ChordWriter<'a> {
    state: &'a SharedTelemetryState,
}

impl<'a> ChordWriter<'a> {
    pub fn state(&self) -> &'a SharedTelemetryState {
        self.state
    }

    /// Replace the chord length; 0 is rejected and keeps the old value
    pub fn write(&self, chord_mm: u16) -> bool {
        if chord_mm == 0 {
            return false;
        }
        self.state.chord_mm.store(chord_mm, Ordering::Relaxed);
        true
    }
}
