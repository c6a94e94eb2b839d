//! VCNL4040 proximity sensor driver.
//!
//! Every VCNL4040 command code addresses a 16-bit register that travels low byte first.

use crate::config::ProximityConfig;
use crate::error::{Error, Result};
use crate::interface::RegisterInterface;
use crate::registers::{PsConfig, ID_EXPECTED, REG_ID, REG_PS_CANC, REG_PS_CONF1, REG_PS_DATA};

/// Fixed device address.
pub const ADDRESS: u8 = 0x60;

fn ps_config(config: &ProximityConfig) -> PsConfig {
    PsConfig::new()
        .with_ps_sd(config.shutdown)
        .with_ps_it(config.integration)
        .with_ps_pers(config.persistence)
        .with_ps_duty(config.duty)
        .with_ps_int(config.interrupt)
        .with_ps_hd(config.high_resolution)
}

/// High-level synchronous driver for the VCNL4040.
#[derive(Debug)]
pub struct Vcnl4040<IFACE> {
    interface: IFACE,
    config: ProximityConfig,
}

impl<IFACE> Vcnl4040<IFACE> {
    /// Creates a new driver instance from the provided bus interface.
    pub fn new(interface: IFACE, config: ProximityConfig) -> Self {
        Self { interface, config }
    }

    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> (IFACE, ProximityConfig) {
        (self.interface, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns the configuration last written to the device.
    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }
}

impl<IFACE, CommE> Vcnl4040<IFACE>
where
    IFACE: RegisterInterface<Error = CommE>,
{
    /// Verifies the identity, then applies the stored configuration.
    pub fn init(&mut self) -> Result<(), CommE> {
        self.verify_identity()?;
        self.configure(self.config)
    }

    /// Reads the `ID` register and checks it against the VCNL4040 constant.
    pub fn verify_identity(&mut self) -> Result<(), CommE> {
        let id = self.read_le(REG_ID)?;
        if id != ID_EXPECTED {
            log_warn!("vcnl4040: unexpected ID {:#x}", id);
            return Err(Error::IdentityMismatch(id));
        }
        Ok(())
    }

    /// Returns `true` only if the identity register reads back exactly as expected.
    pub fn probe(&mut self) -> bool {
        self.verify_identity().is_ok()
    }

    /// Writes `PS_CONF1` and `PS_CONF2` in one transfer.
    pub fn configure(&mut self, config: ProximityConfig) -> Result<(), CommE> {
        let raw = u16::from(ps_config(&config));
        self.interface
            .write_bytes(ADDRESS, REG_PS_CONF1, &raw.to_le_bytes())?;

        log_info!("vcnl4040: configured PS_CONF {:#x}", raw);
        self.config = config;
        Ok(())
    }

    /// Reads the latest proximity count.
    pub fn read_proximity(&mut self) -> Result<u16, CommE> {
        self.read_le(REG_PS_DATA)
    }

    /// Reads the crosstalk cancellation level subtracted from every count.
    pub fn cancellation(&mut self) -> Result<u16, CommE> {
        self.read_le(REG_PS_CANC)
    }

    /// Sets the crosstalk cancellation level.
    pub fn set_cancellation(&mut self, level: u16) -> Result<(), CommE> {
        self.interface
            .write_bytes(ADDRESS, REG_PS_CANC, &level.to_le_bytes())
            .map_err(Error::from)
    }

    fn read_le(&mut self, register: u8) -> Result<u16, CommE> {
        let raw = self.interface.read_array::<2>(ADDRESS, register)?;
        Ok(u16::from_le_bytes(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BusError, Fault};
    use crate::mock::{FakeDevice, Phase};
    use crate::params::{PsDuty, PsIntegrationTime, PsInterrupt};

    fn driver() -> Vcnl4040<FakeDevice> {
        let mut device = FakeDevice::new(ADDRESS);
        device.registers[REG_ID as usize] = 0x86;
        device.registers[REG_ID as usize + 1] = 0x01;
        Vcnl4040::new(device, ProximityConfig::default())
    }

    #[test]
    fn default_configuration_is_one_little_endian_write() {
        let mut prox = driver();
        prox.configure(ProximityConfig::default()).unwrap();

        assert_eq!(
            prox.interface_mut().phases,
            [Phase::Transmit { bytes: vec![0x03, 0x80, 0x00], hold_bus: false }]
        );
    }

    #[test]
    fn configuration_fields_land_in_both_bytes() {
        let mut prox = driver();
        let config = ProximityConfig {
            duty: PsDuty::Ratio40,
            integration: PsIntegrationTime::T8,
            interrupt: PsInterrupt::Closing,
            high_resolution: true,
            ..ProximityConfig::default()
        };
        prox.configure(config).unwrap();

        let registers = &prox.interface_mut().registers;
        assert_eq!(registers[REG_PS_CONF1 as usize], 0b0000_1110);
        assert_eq!(registers[REG_PS_CONF1 as usize + 1], 0b0000_1001);
    }

    #[test]
    fn proximity_is_little_endian() {
        let mut prox = driver();
        prox.interface_mut().registers[REG_PS_DATA as usize] = 0x34;
        prox.interface_mut().registers[REG_PS_DATA as usize + 1] = 0x12;

        assert_eq!(prox.read_proximity(), Ok(0x1234));
    }

    #[test]
    fn failed_read_is_an_error_not_a_sentinel() {
        let mut prox = driver();
        prox.interface_mut().fail_phase = Some(0);

        assert_eq!(
            prox.read_proximity(),
            Err(Error::Bus(BusError::TransferFailed(Fault::Nack)))
        );
    }

    #[test]
    fn cancellation_level_is_little_endian() {
        let mut prox = driver();
        prox.set_cancellation(0x0123).unwrap();

        assert_eq!(
            prox.interface_mut().phases,
            [Phase::Transmit { bytes: vec![REG_PS_CANC, 0x23, 0x01], hold_bus: false }]
        );
        assert_eq!(prox.cancellation(), Ok(0x0123));
    }

    #[test]
    fn identity_check() {
        let mut prox = driver();
        assert!(prox.probe());

        prox.interface_mut().registers[REG_ID as usize] = 0x87;
        assert_eq!(prox.verify_identity(), Err(Error::IdentityMismatch(0x0187)));
        assert!(!prox.probe());
    }

    #[test]
    fn init_configures_after_identity() {
        let mut prox = driver();
        prox.init().unwrap();

        assert_eq!(prox.interface_mut().phases.len(), 3);
        assert_eq!(prox.interface_mut().registers[REG_PS_CONF1 as usize], 0x80);
    }
}
