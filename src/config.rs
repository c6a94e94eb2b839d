//! Configuration primitives for bus instances and the sensor drivers.

use crate::params::{
    AccelRange,
    ClockSource,
    GyroRange,
    PsDuty,
    PsIntegrationTime,
    PsInterrupt,
    PsPersistence,
};

/// Highest interrupt priority level accepted for the bus event handler.
pub const MAX_INTERRUPT_PRIORITY: u8 = 7;

/// Bus clock frequency classes supported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Frequency {
    /// 100 kHz standard mode.
    K100,
    /// 250 kHz.
    K250,
    /// 400 kHz fast mode.
    K400,
}

impl Frequency {
    /// Returns the bus clock in hertz.
    pub const fn hz(self) -> u32 {
        match self {
            Self::K100 => 100_000,
            Self::K250 => 250_000,
            Self::K400 => 400_000,
        }
    }
}

/// Fixed parameters of one physical two-wire controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// Clock line pin number.
    pub scl: u8,
    /// Data line pin number.
    pub sda: u8,
    /// Bus clock frequency.
    pub frequency: Frequency,
    /// Priority of the completion event handler.
    pub interrupt_priority: u8,
    /// Upper bound on one transfer, in microseconds. `None` waits forever.
    pub timeout_us: Option<u32>,
}

impl BusConfig {
    /// Begins building a [`BusConfig`] using the builder pattern.
    pub fn new() -> BusConfigBuilder {
        BusConfigBuilder::new()
    }

    /// Checks whether this configuration can be applied to a controller.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.scl == self.sda {
            return Err(ConfigError::SharedPin);
        }

        if self.interrupt_priority > MAX_INTERRUPT_PRIORITY {
            return Err(ConfigError::InvalidPriority);
        }

        if self.timeout_us == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            scl: 15,
            sda: 14,
            frequency: Frequency::K100,
            interrupt_priority: 2,
            timeout_us: Some(1_000_000),
        }
    }
}

/// Builder for [`BusConfig`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct BusConfigBuilder {
    config: BusConfig,
}

impl BusConfigBuilder {
    /// Creates a new builder seeded with [`BusConfig::default()`].
    pub fn new() -> Self {
        Self {
            config: BusConfig::default(),
        }
    }

    /// Sets the clock and data line pins.
    pub fn pins(mut self, scl: u8, sda: u8) -> Self {
        self.config.scl = scl;
        self.config.sda = sda;
        self
    }

    /// Overrides the bus frequency.
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.config.frequency = frequency;
        self
    }

    /// Overrides the event handler priority.
    pub fn interrupt_priority(mut self, priority: u8) -> Self {
        self.config.interrupt_priority = priority;
        self
    }

    /// Sets the per-transfer timeout in microseconds.
    pub fn timeout_us(mut self, timeout_us: u32) -> Self {
        self.config.timeout_us = Some(timeout_us);
        self
    }

    /// Waits for completion without a time limit.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout_us = None;
        self
    }

    /// Finalizes the builder and returns the [`BusConfig`].
    pub fn build(self) -> BusConfig {
        self.config
    }
}

impl Default for BusConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation errors generated while verifying a [`BusConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Clock and data lines are assigned the same pin.
    SharedPin,
    /// Interrupt priority is above [`MAX_INTERRUPT_PRIORITY`].
    InvalidPriority,
    /// A zero timeout would fail every transfer.
    ZeroTimeout,
}

/// Settings written by [`Icm20948::configure`](crate::Icm20948::configure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImuConfig {
    /// Clock source written to `PWR_MGMT_1`; also takes the part out of sleep.
    pub clock: ClockSource,
    /// Accelerometer full-scale range.
    pub accel_range: AccelRange,
    /// Gyroscope full-scale range.
    pub gyro_range: GyroRange,
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self {
            clock: ClockSource::Auto,
            accel_range: AccelRange::G8,
            gyro_range: GyroRange::Dps1000,
        }
    }
}

/// Settings written by [`Vcnl4040::configure`](crate::Vcnl4040::configure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProximityConfig {
    /// IRED duty ratio.
    pub duty: PsDuty,
    /// Integration time.
    pub integration: PsIntegrationTime,
    /// Interrupt persistence.
    pub persistence: PsPersistence,
    /// Interrupt trigger.
    pub interrupt: PsInterrupt,
    /// 16-bit instead of 12-bit output.
    pub high_resolution: bool,
    /// Keeps the proximity engine shut down.
    pub shutdown: bool,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            duty: PsDuty::Ratio160,
            integration: PsIntegrationTime::T1,
            persistence: PsPersistence::One,
            interrupt: PsInterrupt::Disabled,
            high_resolution: false,
            shutdown: false,
        }
    }
}
