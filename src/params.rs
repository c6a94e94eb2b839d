//! Strongly typed parameter enumerations for the sensor drivers.
//!
//! These enums map directly to datasheet field encodings and are used across
//! [`ImuConfig`](crate::config::ImuConfig), [`ProximityConfig`](crate::config::ProximityConfig)
//! and the register layouts in [`registers`](crate::registers). Prefer these types over
//! raw integers to keep configuration values valid and explicit.
//!
//! # Examples
//!
//! ```rust
//! use twi_regdev::params::{AccelRange, GyroRange, PsDuty};
//!
//! let accel = AccelRange::G8;
//! let gyro = GyroRange::Dps1000;
//! let duty = PsDuty::Ratio160;
//! assert_eq!(accel.lsb_per_g(), 4_096);
//! let _ = (gyro, duty);
//! ```

use modular_bitfield::prelude::Specifier;

/// ICM-20948 clock source selection (`PWR_MGMT_1.CLKSEL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Internal 20 MHz oscillator.
    Internal,
    /// Best available source: PLL when ready, otherwise the internal oscillator.
    Auto,
    /// Stops the clock and keeps timing generation in reset.
    Stopped,
}

impl ClockSource {
    /// Returns the three-bit `CLKSEL` encoding.
    pub const fn bits(self) -> u8 {
        match self {
            Self::Internal => 0b000,
            Self::Auto => 0b001,
            Self::Stopped => 0b111,
        }
    }
}

/// Accelerometer full-scale range (`ACCEL_CONFIG[4:3]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum AccelRange {
    /// ±2 g.
    G2 = 0b00,
    /// ±4 g.
    G4 = 0b01,
    /// ±8 g.
    G8 = 0b10,
    /// ±16 g.
    G16 = 0b11,
}

impl AccelRange {
    /// Raw counts per g at this range.
    pub const fn lsb_per_g(self) -> u16 {
        match self {
            Self::G2 => 16_384,
            Self::G4 => 8_192,
            Self::G8 => 4_096,
            Self::G16 => 2_048,
        }
    }

    /// Decodes the two-bit field value.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::G2,
            0b01 => Self::G4,
            0b10 => Self::G8,
            _ => Self::G16,
        }
    }
}

/// Gyroscope full-scale range (`GYRO_CONFIG[4:3]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum GyroRange {
    /// ±250 °/s.
    Dps250 = 0b00,
    /// ±500 °/s.
    Dps500 = 0b01,
    /// ±1000 °/s.
    Dps1000 = 0b10,
    /// ±2000 °/s.
    Dps2000 = 0b11,
}

impl GyroRange {
    /// Raw counts per degree per second at this range.
    pub const fn lsb_per_dps(self) -> f32 {
        match self {
            Self::Dps250 => 131.0,
            Self::Dps500 => 65.5,
            Self::Dps1000 => 32.8,
            Self::Dps2000 => 16.4,
        }
    }

    /// Decodes the two-bit field value.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Dps250,
            0b01 => Self::Dps500,
            0b10 => Self::Dps1000,
            _ => Self::Dps2000,
        }
    }
}

/// Proximity IRED duty ratio (`PS_CONF1.PS_Duty`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum PsDuty {
    /// 1/40.
    Ratio40 = 0b00,
    /// 1/80.
    Ratio80 = 0b01,
    /// 1/160.
    Ratio160 = 0b10,
    /// 1/320.
    Ratio320 = 0b11,
}

/// Proximity integration time in units of T (`PS_CONF1.PS_IT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum PsIntegrationTime {
    /// 1T.
    T1 = 0b000,
    /// 1.5T.
    T1_5 = 0b001,
    /// 2T.
    T2 = 0b010,
    /// 2.5T.
    T2_5 = 0b011,
    /// 3T.
    T3 = 0b100,
    /// 3.5T.
    T3_5 = 0b101,
    /// 4T.
    T4 = 0b110,
    /// 8T.
    T8 = 0b111,
}

/// Consecutive out-of-threshold readings before an interrupt (`PS_CONF1.PS_PERS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum PsPersistence {
    /// One reading.
    One = 0b00,
    /// Two readings.
    Two = 0b01,
    /// Three readings.
    Three = 0b10,
    /// Four readings.
    Four = 0b11,
}

/// Proximity interrupt trigger (`PS_CONF2.PS_INT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum PsInterrupt {
    /// Interrupt disabled.
    Disabled = 0b00,
    /// Trigger when an object comes close.
    Closing = 0b01,
    /// Trigger when an object moves away.
    Away = 0b10,
    /// Trigger on both transitions.
    Both = 0b11,
}
