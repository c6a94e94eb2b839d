//! One physical two-wire controller and its synchronization state.

use embedded_hal::delay::DelayNs;

use crate::completion::Completion;
use crate::config::BusConfig;
use crate::error::{BusError, BusResult};
use crate::interface::RegisterInterface;
use crate::sync::Synchronizer;
use crate::transport::{Transaction, Transport};

/// Largest 7-bit device address.
pub const MAX_DEVICE_ADDRESS: u8 = 0x7F;

/// Lifecycle state of a [`Bus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusState {
    /// [`Bus::initialize`] has not been called.
    Uninitialized,
    /// Initialized, controller not driving the bus.
    Disabled,
    /// Ready for transfers.
    Enabled,
    /// A transfer timed out; the controller and device state are unknown.
    Indeterminate,
}

/// A bus instance: owns the transport and borrows its own [`Completion`].
///
/// Transfers block the calling context until the transport's event handler signals the
/// completion flag. Only one transfer is ever outstanding because every transfer holds
/// `&mut self` until it has completed. Two `Bus` values over two controllers, each with
/// its own flag, are fully independent.
///
/// ```
/// use embedded_hal_mock::eh1::delay::NoopDelay;
/// use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
/// use twi_regdev::config::BusConfig;
/// use twi_regdev::interface::hal::HalTransport;
/// use twi_regdev::{Bus, Completion, RegisterInterface};
///
/// static TWI0_DONE: Completion = Completion::new();
///
/// let expectations = [I2cTransaction::write_read(0x69, vec![0x00], vec![0xEA])];
/// let mut i2c = I2cMock::new(&expectations);
///
/// let mut bus = Bus::new(
///     HalTransport::new(i2c.clone()),
///     &TWI0_DONE,
///     NoopDelay::new(),
///     BusConfig::default(),
/// );
/// bus.initialize().unwrap();
/// assert_eq!(bus.read_byte(0x69, 0x00), Ok(0xEA));
///
/// i2c.done();
/// ```
#[derive(Debug)]
pub struct Bus<'a, T, D> {
    transport: T,
    sync: Synchronizer<'a, D>,
    config: BusConfig,
    state: BusState,
}

impl<'a, T, D> Bus<'a, T, D> {
    /// Creates an uninitialized bus instance.
    ///
    /// `completion` must belong to this bus alone. [`initialize`](Self::initialize) claims
    /// it and fails with [`BusError::CompletionInUse`] while another bus holds it;
    /// [`release`](Self::release) gives it back.
    pub fn new(transport: T, completion: &'a Completion, delay: D, config: BusConfig) -> Self {
        Self {
            transport,
            sync: Synchronizer::new(completion, delay, config.timeout_us),
            config,
            state: BusState::Uninitialized,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BusState {
        self.state
    }

    /// Configuration the bus was created with.
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// The completion flag owned by this bus.
    pub fn completion(&self) -> &'a Completion {
        self.sync.completion()
    }

    /// Provides mutable access to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<'a, T, D> Bus<'a, T, D>
where
    T: Transport<'a>,
    D: DelayNs,
{
    /// Configures the controller, registers its event handler and enables it.
    ///
    /// A second call fails with [`BusError::AlreadyInitialized`].
    pub fn initialize(&mut self) -> BusResult<(), T::Error> {
        if self.state != BusState::Uninitialized {
            return Err(BusError::AlreadyInitialized);
        }

        self.config.validate().map_err(|_| BusError::InvalidConfig)?;

        let completion = self.sync.completion();
        if !completion.claim() {
            log_warn!("twi: completion flag already owned by another bus");
            return Err(BusError::CompletionInUse);
        }

        if let Err(err) = self.transport.initialize(&self.config, completion.notifier()) {
            completion.unclaim();
            return Err(BusError::InitFailed(err));
        }

        log_debug!(
            "twi: initialized scl={} sda={} at {} Hz",
            self.config.scl,
            self.config.sda,
            self.config.frequency.hz()
        );

        self.state = BusState::Disabled;
        self.enable(true)
    }

    /// Gates whether the controller drives the bus.
    ///
    /// A bus left [`Indeterminate`](BusState::Indeterminate) by a timeout can be disabled
    /// but must go through [`recover`](Self::recover) to be enabled again.
    pub fn enable(&mut self, enabled: bool) -> BusResult<(), T::Error> {
        match (self.state, enabled) {
            (BusState::Uninitialized, _) => Err(BusError::NotInitialized),
            (BusState::Indeterminate, true) => Err(BusError::Indeterminate),
            (_, true) => {
                self.transport.set_enabled(true);
                self.state = BusState::Enabled;
                Ok(())
            }
            (_, false) => {
                self.transport.set_enabled(false);
                self.sync.completion().reset();
                self.state = BusState::Disabled;
                Ok(())
            }
        }
    }

    /// Stops the controller from driving the bus.
    pub fn disable(&mut self) -> BusResult<(), T::Error> {
        self.enable(false)
    }

    /// Returns an [`Indeterminate`](BusState::Indeterminate) bus to service by cycling the
    /// controller and dropping any late completion event. A no-op in any other state.
    pub fn recover(&mut self) -> BusResult<(), T::Error> {
        if self.state != BusState::Indeterminate {
            return Ok(());
        }

        self.transport.set_enabled(false);
        self.sync.completion().reset();
        self.transport.set_enabled(true);
        self.state = BusState::Enabled;

        log_info!("twi: bus recovered after timeout");
        Ok(())
    }

    /// Replaces the per-transfer timeout. `None` waits forever.
    ///
    /// `Some(0)` is refused with [`BusError::InvalidConfig`], as in
    /// [`BusConfig::validate`].
    pub fn set_timeout_us(&mut self, timeout_us: Option<u32>) -> BusResult<(), T::Error> {
        if timeout_us == Some(0) {
            return Err(BusError::InvalidConfig);
        }
        self.config.timeout_us = timeout_us;
        self.sync.set_timeout_us(timeout_us);
        Ok(())
    }

    /// Disables the controller and returns the transport and delay provider.
    pub fn release(mut self) -> (T, D) {
        if self.state != BusState::Uninitialized {
            self.transport.set_enabled(false);
            self.sync.completion().reset();
            self.sync.completion().unclaim();
        }
        (self.transport, self.sync.release())
    }

    fn ready(&self, address: u8) -> BusResult<(), T::Error> {
        match self.state {
            BusState::Enabled => {}
            BusState::Uninitialized => return Err(BusError::NotInitialized),
            BusState::Disabled => return Err(BusError::Disabled),
            BusState::Indeterminate => return Err(BusError::Indeterminate),
        }

        if address > MAX_DEVICE_ADDRESS {
            return Err(BusError::InvalidAddress);
        }

        Ok(())
    }

    fn execute(&mut self, transaction: Transaction<'_>) -> BusResult<(), T::Error> {
        self.ready(transaction.address)?;

        let transport = &mut self.transport;
        let result = self.sync.run_and_wait(|| transaction.start(transport));

        match result {
            Err(BusError::Timeout) => {
                self.state = BusState::Indeterminate;
                log_warn!("twi: device {:#x} timed out", transaction.address);
            }
            Err(_) => log_debug!("twi: transfer to {:#x} failed", transaction.address),
            Ok(()) => log_trace!("twi: transfer to {:#x} done", transaction.address),
        }

        result
    }
}

impl<'a, T, D> RegisterInterface for Bus<'a, T, D>
where
    T: Transport<'a>,
    D: DelayNs,
{
    type Error = T::Error;

    fn transmit(&mut self, address: u8, bytes: &[u8], hold_bus: bool) -> BusResult<(), Self::Error> {
        self.execute(Transaction::write(address, bytes, hold_bus))
    }

    fn receive(&mut self, address: u8, buf: &mut [u8]) -> BusResult<(), Self::Error> {
        self.execute(Transaction::read(address, buf.len()))?;
        self.transport.read_received(buf);
        Ok(())
    }
}
