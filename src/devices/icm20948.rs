//! ICM-20948 nine-axis motion sensor driver (accelerometer and gyroscope).

use crate::config::ImuConfig;
use crate::error::{Error, Result};
use crate::interface::RegisterInterface;
use crate::params::{AccelRange, GyroRange};
use crate::registers::{
    AccelConfig,
    GyroConfig,
    PowerManagement1,
    FULL_SCALE_BIT_START,
    FULL_SCALE_LENGTH,
    PWR_MGMT_1_SLEEP_BIT,
    REG_ACCEL_CONFIG,
    REG_ACCEL_XOUT_H,
    REG_GYRO_CONFIG,
    REG_GYRO_XOUT_H,
    REG_PWR_MGMT_1,
    REG_WHO_AM_I,
    WHO_AM_I_EXPECTED,
};

/// Device address with AD0 pulled high.
pub const DEFAULT_ADDRESS: u8 = 0x69;
/// Device address with AD0 pulled low.
pub const ALT_ADDRESS: u8 = 0x68;

// Accel X/Y/Z followed by gyro X/Y/Z, two bytes each.
const MOTION_BYTES: usize = 12;
const AXES_BYTES: usize = 6;

/// Signed three-axis sample in raw counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vector3 {
    /// X axis.
    pub x: i16,
    /// Y axis.
    pub y: i16,
    /// Z axis.
    pub z: i16,
}

impl Vector3 {
    fn from_be_bytes(raw: &[u8]) -> Self {
        Self {
            x: i16::from_be_bytes([raw[0], raw[1]]),
            y: i16::from_be_bytes([raw[2], raw[3]]),
            z: i16::from_be_bytes([raw[4], raw[5]]),
        }
    }
}

/// One accelerometer and gyroscope reading taken in a single burst.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Motion {
    /// Acceleration in raw counts; see [`AccelRange::lsb_per_g`].
    pub accel: Vector3,
    /// Angular rate in raw counts; see [`GyroRange::lsb_per_dps`].
    pub gyro: Vector3,
}

impl Motion {
    /// Decodes the `ACCEL_XOUT_H..=GYRO_ZOUT_L` burst.
    pub fn from_be_bytes(raw: &[u8; MOTION_BYTES]) -> Self {
        Self {
            accel: Vector3::from_be_bytes(&raw[..6]),
            gyro: Vector3::from_be_bytes(&raw[6..]),
        }
    }
}

/// High-level synchronous driver for the ICM-20948.
#[derive(Debug)]
pub struct Icm20948<IFACE> {
    interface: IFACE,
    address: u8,
    config: ImuConfig,
}

impl<IFACE> Icm20948<IFACE> {
    /// Creates a driver for a part at [`DEFAULT_ADDRESS`].
    pub fn new(interface: IFACE, config: ImuConfig) -> Self {
        Self::with_address(interface, DEFAULT_ADDRESS, config)
    }

    /// Creates a driver for a part at `address`, typically [`ALT_ADDRESS`].
    pub fn with_address(interface: IFACE, address: u8, config: ImuConfig) -> Self {
        Self {
            interface,
            address,
            config,
        }
    }

    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> (IFACE, ImuConfig) {
        (self.interface, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Device address the driver talks to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Returns the configuration last written to the device.
    pub fn config(&self) -> &ImuConfig {
        &self.config
    }
}

impl<IFACE, CommE> Icm20948<IFACE>
where
    IFACE: RegisterInterface<Error = CommE>,
{
    /// Verifies the identity, then applies the stored configuration.
    pub fn init(&mut self) -> Result<(), CommE> {
        self.verify_identity()?;
        self.configure(self.config)
    }

    /// Reads `WHO_AM_I` and checks it against the ICM-20948 constant.
    pub fn verify_identity(&mut self) -> Result<(), CommE> {
        let id = self.interface.read_byte(self.address, REG_WHO_AM_I)?;
        if id != WHO_AM_I_EXPECTED {
            log_warn!("icm20948: unexpected WHO_AM_I {:#x}", id);
            return Err(Error::IdentityMismatch(id as u16));
        }
        Ok(())
    }

    /// Returns `true` only if the identity register reads back exactly as expected.
    ///
    /// A failed read also yields `false`.
    pub fn probe(&mut self) -> bool {
        self.verify_identity().is_ok()
    }

    /// Wakes the part on the selected clock and sets both full-scale ranges.
    ///
    /// Writes `PWR_MGMT_1`, `ACCEL_CONFIG` and `GYRO_CONFIG` in that order and stops at the
    /// first failure. Registers already written stay written.
    pub fn configure(&mut self, config: ImuConfig) -> Result<(), CommE> {
        let power = PowerManagement1::new().with_clksel(config.clock.bits());
        let accel = AccelConfig::new().with_full_scale(config.accel_range);
        let gyro = GyroConfig::new().with_full_scale(config.gyro_range);

        self.interface
            .write_byte(self.address, REG_PWR_MGMT_1, u8::from(power))?;
        self.interface
            .write_byte(self.address, REG_ACCEL_CONFIG, u8::from(accel))?;
        self.interface
            .write_byte(self.address, REG_GYRO_CONFIG, u8::from(gyro))?;

        log_info!("icm20948: configured at {:#x}", self.address);
        self.config = config;
        Ok(())
    }

    /// Puts the part to sleep or wakes it, leaving the clock selection untouched.
    pub fn set_sleep(&mut self, sleep: bool) -> Result<(), CommE> {
        self.interface
            .write_bit(self.address, REG_PWR_MGMT_1, PWR_MGMT_1_SLEEP_BIT, sleep)
            .map_err(Error::from)
    }

    /// Reads the accelerometer full-scale range from the device.
    pub fn accel_range(&mut self) -> Result<AccelRange, CommE> {
        let bits = self.interface.read_bits(
            self.address,
            REG_ACCEL_CONFIG,
            FULL_SCALE_BIT_START,
            FULL_SCALE_LENGTH,
        )?;
        Ok(AccelRange::from_bits(bits))
    }

    /// Changes only the accelerometer full-scale field.
    pub fn set_accel_range(&mut self, range: AccelRange) -> Result<(), CommE> {
        self.interface.write_bits(
            self.address,
            REG_ACCEL_CONFIG,
            FULL_SCALE_BIT_START,
            FULL_SCALE_LENGTH,
            range as u8,
        )?;
        self.config.accel_range = range;
        Ok(())
    }

    /// Reads the gyroscope full-scale range from the device.
    pub fn gyro_range(&mut self) -> Result<GyroRange, CommE> {
        let bits = self.interface.read_bits(
            self.address,
            REG_GYRO_CONFIG,
            FULL_SCALE_BIT_START,
            FULL_SCALE_LENGTH,
        )?;
        Ok(GyroRange::from_bits(bits))
    }

    /// Changes only the gyroscope full-scale field.
    pub fn set_gyro_range(&mut self, range: GyroRange) -> Result<(), CommE> {
        self.interface.write_bits(
            self.address,
            REG_GYRO_CONFIG,
            FULL_SCALE_BIT_START,
            FULL_SCALE_LENGTH,
            range as u8,
        )?;
        self.config.gyro_range = range;
        Ok(())
    }

    /// Reads accelerometer and gyroscope in one 12-byte burst.
    pub fn read_motion(&mut self) -> Result<Motion, CommE> {
        let raw = self
            .interface
            .read_array::<MOTION_BYTES>(self.address, REG_ACCEL_XOUT_H)?;
        Ok(Motion::from_be_bytes(&raw))
    }

    /// Reads only the accelerometer axes.
    pub fn read_accel(&mut self) -> Result<Vector3, CommE> {
        self.read_axes(REG_ACCEL_XOUT_H)
    }

    /// Reads only the gyroscope axes.
    pub fn read_gyro(&mut self) -> Result<Vector3, CommE> {
        self.read_axes(REG_GYRO_XOUT_H)
    }

    fn read_axes(&mut self, register: u8) -> Result<Vector3, CommE> {
        let raw = self
            .interface
            .read_array::<AXES_BYTES>(self.address, register)?;
        Ok(Vector3::from_be_bytes(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BusError, Fault};
    use crate::mock::{FakeDevice, Phase};
    use crate::params::ClockSource;

    fn driver() -> Icm20948<FakeDevice> {
        let mut device = FakeDevice::new(DEFAULT_ADDRESS);
        device.registers[REG_WHO_AM_I as usize] = WHO_AM_I_EXPECTED;
        device.registers[REG_PWR_MGMT_1 as usize] = 0x41;
        Icm20948::new(device, ImuConfig::default())
    }

    #[test]
    fn probe_requires_exact_identity() {
        let mut imu = driver();
        assert!(imu.probe());

        imu.interface_mut().registers[REG_WHO_AM_I as usize] = 0xE9;
        assert!(!imu.probe());
        assert_eq!(imu.verify_identity(), Err(Error::IdentityMismatch(0xE9)));
    }

    #[test]
    fn probe_is_false_when_read_fails() {
        let mut imu = driver();
        imu.interface_mut().fail_phase = Some(1);

        assert!(!imu.probe());
    }

    #[test]
    fn default_configuration_wakes_then_sets_ranges() {
        let mut imu = driver();
        imu.configure(ImuConfig::default()).unwrap();

        let device = imu.interface_mut();
        assert_eq!(
            device.phases,
            [
                Phase::Transmit { bytes: vec![0x06, 0x01], hold_bus: false },
                Phase::Transmit { bytes: vec![0x14, 0x10], hold_bus: false },
                Phase::Transmit { bytes: vec![0x15, 0x10], hold_bus: false },
            ]
        );
    }

    #[test]
    fn configure_stops_at_first_failed_write() {
        let mut imu = driver();
        imu.interface_mut().fail_phase = Some(1);
        let config = ImuConfig {
            clock: ClockSource::Internal,
            ..ImuConfig::default()
        };

        assert_eq!(
            imu.configure(config),
            Err(Error::Bus(BusError::TransferFailed(Fault::Nack)))
        );
        assert_eq!(imu.interface_mut().phases.len(), 2);
        assert_eq!(imu.interface_mut().registers[REG_PWR_MGMT_1 as usize], 0x00);
        assert_eq!(imu.config().clock, ClockSource::Auto);
    }

    #[test]
    fn init_checks_identity_before_writing() {
        let mut imu = driver();
        imu.interface_mut().registers[REG_WHO_AM_I as usize] = 0x00;

        assert_eq!(imu.init(), Err(Error::IdentityMismatch(0x00)));
        assert_eq!(imu.interface_mut().phases.len(), 2);
    }

    #[test]
    fn read_motion_decodes_big_endian_axes() {
        let mut imu = driver();
        let base = REG_ACCEL_XOUT_H as usize;
        for (offset, byte) in (0x01..=0x0C).enumerate() {
            imu.interface_mut().registers[base + offset] = byte;
        }

        let motion = imu.read_motion().unwrap();
        assert_eq!(
            motion.accel,
            Vector3 { x: 0x0102, y: 0x0304, z: 0x0506 }
        );
        assert_eq!(
            motion.gyro,
            Vector3 { x: 0x0708, y: 0x090A, z: 0x0B0C }
        );
        assert_eq!(
            imu.interface_mut().phases.last(),
            Some(&Phase::Receive { length: MOTION_BYTES })
        );
    }

    #[test]
    fn single_sensor_reads_start_at_their_own_register() {
        let mut imu = driver();
        let base = REG_ACCEL_XOUT_H as usize;
        for (offset, byte) in (0x01..=0x0C).enumerate() {
            imu.interface_mut().registers[base + offset] = byte;
        }

        assert_eq!(imu.read_gyro(), Ok(Vector3 { x: 0x0708, y: 0x090A, z: 0x0B0C }));
        assert_eq!(imu.read_accel(), Ok(Vector3 { x: 0x0102, y: 0x0304, z: 0x0506 }));
        assert_eq!(
            imu.interface_mut().phases,
            [
                Phase::Transmit { bytes: vec![REG_GYRO_XOUT_H], hold_bus: true },
                Phase::Receive { length: 6 },
                Phase::Transmit { bytes: vec![REG_ACCEL_XOUT_H], hold_bus: true },
                Phase::Receive { length: 6 },
            ]
        );
    }

    #[test]
    fn motion_axes_are_signed() {
        let mut raw = [0u8; MOTION_BYTES];
        raw[0] = 0xFF;
        raw[1] = 0xFE;
        raw[10] = 0x80;

        let motion = Motion::from_be_bytes(&raw);
        assert_eq!(motion.accel.x, -2);
        assert_eq!(motion.gyro.z, i16::MIN);
    }

    #[test]
    fn sleep_toggles_only_bit_six() {
        let mut imu = driver();

        imu.set_sleep(false).unwrap();
        assert_eq!(imu.interface_mut().registers[REG_PWR_MGMT_1 as usize], 0x01);

        imu.set_sleep(true).unwrap();
        assert_eq!(imu.interface_mut().registers[REG_PWR_MGMT_1 as usize], 0x41);
    }

    #[test]
    fn range_setters_preserve_neighbouring_bits() {
        let mut imu = driver();
        imu.interface_mut().registers[REG_ACCEL_CONFIG as usize] = 0b1110_0111;

        imu.set_accel_range(AccelRange::G4).unwrap();
        assert_eq!(
            imu.interface_mut().registers[REG_ACCEL_CONFIG as usize],
            0b1110_1111
        );
        assert_eq!(imu.accel_range(), Ok(AccelRange::G4));

        imu.set_gyro_range(GyroRange::Dps2000).unwrap();
        assert_eq!(imu.gyro_range(), Ok(GyroRange::Dps2000));
        assert_eq!(imu.config().gyro_range, GyroRange::Dps2000);
    }

    #[test]
    fn alternate_address_is_used_on_the_wire() {
        let device = FakeDevice::new(ALT_ADDRESS);
        let mut imu = Icm20948::with_address(device, ALT_ADDRESS, ImuConfig::default());

        assert_eq!(imu.address(), ALT_ADDRESS);
        imu.configure(ImuConfig::default()).unwrap();
    }
}
