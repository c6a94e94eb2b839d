//! Byte-level transport abstraction for one physical two-wire controller.

use crate::completion::Notifier;
use crate::config::BusConfig;

/// Raw, non-blocking access to a two-wire controller.
///
/// `transmit` and `receive` only start a transfer. The transfer ends when the
/// controller's event handler records an [`Event`](crate::Event) through the notifier
/// handed over in [`initialize`](Transport::initialize). The handler must do nothing else.
///
/// Implementations copy the bytes they need before returning and keep received bytes
/// until [`read_received`](Transport::read_received) is called, so no caller buffer has to
/// outlive the call that started the transfer.
pub trait Transport<'a> {
    /// Error type produced when the controller refuses a request.
    type Error;

    /// Configures pins and frequency and registers the event handler.
    ///
    /// Calling this twice without releasing the controller is a caller error and should be
    /// rejected.
    fn initialize(
        &mut self,
        config: &BusConfig,
        notifier: Notifier<'a>,
    ) -> core::result::Result<(), Self::Error>;

    /// Gates whether the controller drives the bus.
    fn set_enabled(&mut self, enabled: bool);

    /// Starts writing `bytes` to `address`. With `hold_bus` no stop condition is issued, so
    /// the next transfer continues with a repeated start.
    fn transmit(
        &mut self,
        address: u8,
        bytes: &[u8],
        hold_bus: bool,
    ) -> core::result::Result<(), Self::Error>;

    /// Starts reading `length` bytes from `address`.
    fn receive(&mut self, address: u8, length: usize) -> core::result::Result<(), Self::Error>;

    /// Copies the bytes of the last completed receive into `buf`.
    fn read_received(&mut self, buf: &mut [u8]);
}

/// Direction and payload of a single transfer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction<'b> {
    /// Controller-to-device write.
    Write {
        /// Bytes to send.
        bytes: &'b [u8],
        /// Skip the stop condition so the next phase follows with a repeated start.
        hold_bus: bool,
    },
    /// Device-to-controller read.
    Read {
        /// Number of bytes to receive.
        length: usize,
    },
}

/// One transmit or receive phase addressed to a device. Created per call, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction<'b> {
    /// 7-bit device address.
    pub address: u8,
    /// What the phase does.
    pub direction: Direction<'b>,
}

impl<'b> Transaction<'b> {
    /// Builds a write phase.
    pub const fn write(address: u8, bytes: &'b [u8], hold_bus: bool) -> Self {
        Self {
            address,
            direction: Direction::Write { bytes, hold_bus },
        }
    }

    /// Builds a read phase.
    pub const fn read(address: u8, length: usize) -> Self {
        Self {
            address,
            direction: Direction::Read { length },
        }
    }

    /// Hands the phase to `transport`.
    pub fn start<'a, T>(&self, transport: &mut T) -> core::result::Result<(), T::Error>
    where
        T: Transport<'a>,
    {
        match self.direction {
            Direction::Write { bytes, hold_bus } => {
                transport.transmit(self.address, bytes, hold_bus)
            }
            Direction::Read { length } => transport.receive(self.address, length),
        }
    }
}
