//! Register map definitions for the ICM-20948 motion sensor and the VCNL4040 proximity
//! sensor.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::{AccelRange, GyroRange, PsDuty, PsIntegrationTime, PsInterrupt, PsPersistence};

/// Register address of `WHO_AM_I` (ICM-20948).
pub const REG_WHO_AM_I: u8 = 0x00;
/// Identity reported by an ICM-20948.
pub const WHO_AM_I_EXPECTED: u8 = 0xEA;
/// Register address of `PWR_MGMT_1` (ICM-20948).
pub const REG_PWR_MGMT_1: u8 = 0x06;
/// Register address of `ACCEL_CONFIG` (ICM-20948).
pub const REG_ACCEL_CONFIG: u8 = 0x14;
/// Register address of `GYRO_CONFIG` (ICM-20948).
pub const REG_GYRO_CONFIG: u8 = 0x15;
/// Register address of `ACCEL_XOUT_H`, first byte of the accel/gyro burst (ICM-20948).
pub const REG_ACCEL_XOUT_H: u8 = 0x2D;
/// Register address of `GYRO_XOUT_H` (ICM-20948).
pub const REG_GYRO_XOUT_H: u8 = 0x33;

/// Register address of `PS_CONF1`/`PS_CONF2` (VCNL4040).
pub const REG_PS_CONF1: u8 = 0x03;
/// Register address of `PS_CANC` (VCNL4040).
pub const REG_PS_CANC: u8 = 0x05;
/// Register address of `PS_DATA` (VCNL4040).
pub const REG_PS_DATA: u8 = 0x08;
/// Register address of `ID` (VCNL4040).
pub const REG_ID: u8 = 0x0C;
/// Identity reported by a VCNL4040.
pub const ID_EXPECTED: u16 = 0x0186;

/// `PWR_MGMT_1` bit that puts the ICM-20948 to sleep.
pub const PWR_MGMT_1_SLEEP_BIT: u8 = 6;
/// Most significant bit of the full-scale field in `ACCEL_CONFIG`/`GYRO_CONFIG`.
pub const FULL_SCALE_BIT_START: u8 = 4;
/// Width of the full-scale field in `ACCEL_CONFIG`/`GYRO_CONFIG`.
pub const FULL_SCALE_LENGTH: u8 = 2;

/// Access permissions encoded for each register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAccess {
    /// Read-only register.
    ReadOnly,
    /// Write-only register.
    WriteOnly,
    /// Read/write register.
    ReadWrite,
}

/// Minimal metadata exposed by every register value type.
pub trait Register {
    /// Raw storage backing the register payload.
    type Raw: Copy;
    /// Register address as documented in the datasheet.
    const ADDRESS: u8;
    /// Access permission classification.
    const ACCESS: RegisterAccess;
    /// Optional reset/default value defined by the datasheet.
    const RESET_VALUE: Option<Self::Raw>;
}

/// Bitfield representation of the ICM-20948 `PWR_MGMT_1` register (address `0x06`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerManagement1 {
    // Clock source selection (bits 0..=2).
    pub clksel: B3,
    // Disables the temperature sensor (bit 3).
    pub temp_disable: bool,
    #[skip]
    __: B1,
    // Duty-cycled low power mode (bit 5).
    pub low_power: bool,
    // Sleep mode (bit 6).
    pub sleep: bool,
    // Self-clearing device reset (bit 7).
    pub device_reset: bool,
}

impl From<u8> for PowerManagement1 {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<PowerManagement1> for u8 {
    fn from(value: PowerManagement1) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the ICM-20948 `ACCEL_CONFIG` register (address `0x14`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelConfig {
    #[skip]
    __: B3,
    // Full-scale range (bits 3..=4).
    pub full_scale: AccelRange,
    #[skip]
    __: B3,
}

impl From<u8> for AccelConfig {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<AccelConfig> for u8 {
    fn from(value: AccelConfig) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the ICM-20948 `GYRO_CONFIG` register (address `0x15`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GyroConfig {
    #[skip]
    __: B3,
    // Full-scale range (bits 3..=4).
    pub full_scale: GyroRange,
    #[skip]
    __: B3,
}

impl From<u8> for GyroConfig {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<GyroConfig> for u8 {
    fn from(value: GyroConfig) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the VCNL4040 `PS_CONF1`/`PS_CONF2` register pair
/// (command code `0x03`). `PS_CONF1` is the low byte and travels first on the wire.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PsConfig {
    // Proximity shutdown (bit 0).
    pub ps_sd: bool,
    // Integration time (bits 1..=3).
    pub ps_it: PsIntegrationTime,
    // Interrupt persistence (bits 4..=5).
    pub ps_pers: PsPersistence,
    // IRED duty ratio (bits 6..=7).
    pub ps_duty: PsDuty,
    // Interrupt trigger (bits 8..=9).
    pub ps_int: PsInterrupt,
    #[skip]
    __: B1,
    // 16-bit output resolution (bit 11).
    pub ps_hd: bool,
    #[skip]
    __: B4,
}

impl From<u16> for PsConfig {
    fn from(value: u16) -> Self {
        Self::from_bytes(value.to_le_bytes())
    }
}

impl From<PsConfig> for u16 {
    fn from(value: PsConfig) -> Self {
        u16::from_le_bytes(value.into_bytes())
    }
}

impl Register for PowerManagement1 {
    type Raw = u8;
    const ADDRESS: u8 = REG_PWR_MGMT_1;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<Self::Raw> = Some(0x41);
}

impl Register for AccelConfig {
    type Raw = u8;
    const ADDRESS: u8 = REG_ACCEL_CONFIG;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<Self::Raw> = Some(0x00);
}

impl Register for GyroConfig {
    type Raw = u8;
    const ADDRESS: u8 = REG_GYRO_CONFIG;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<Self::Raw> = Some(0x00);
}

impl Register for PsConfig {
    type Raw = u16;
    const ADDRESS: u8 = REG_PS_CONF1;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<Self::Raw> = Some(0x0001);
}
