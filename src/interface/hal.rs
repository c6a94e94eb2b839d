//! [`Transport`] adapter over a blocking `embedded-hal` I2C bus.
//!
//! The HAL call returns only once the wire is idle, so the adapter signals completion from
//! inside `transmit`/`receive` instead of from a real interrupt. Bytes written with
//! `hold_bus` are kept back and sent in front of the next transfer to the same device,
//! which reproduces the repeated-start continuation on a HAL without split phases.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use heapless::Vec;

use super::MAX_FRAME_LEN;
use crate::completion::{Event, Notifier};
use crate::config::BusConfig;
use crate::transport::Transport;

const HELD_CAPACITY: usize = MAX_FRAME_LEN + 1;
const FRAME_CAPACITY: usize = 2 * HELD_CAPACITY;

/// Requests the adapter refuses to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalTransportError {
    /// No notifier has been registered yet.
    NotInitialized,
    /// A notifier is already registered.
    AlreadyInitialized,
    /// The adapter is disabled.
    Disabled,
    /// The transfer does not fit the adapter's buffers.
    Overflow,
}

impl core::fmt::Display for HalTransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotInitialized => f.write_str("transport not initialized"),
            Self::AlreadyInitialized => f.write_str("transport already initialized"),
            Self::Disabled => f.write_str("transport disabled"),
            Self::Overflow => f.write_str("transfer exceeds transport buffer"),
        }
    }
}

impl core::error::Error for HalTransportError {}

/// Two-wire transport built on an `embedded-hal` [`I2c`] implementation.
#[derive(Debug)]
pub struct HalTransport<'a, I2C> {
    i2c: I2C,
    notifier: Option<Notifier<'a>>,
    enabled: bool,
    held: Vec<u8, HELD_CAPACITY>,
    held_address: Option<u8>,
    rx: Vec<u8, MAX_FRAME_LEN>,
}

impl<'a, I2C> HalTransport<'a, I2C> {
    /// Wraps an I2C bus. The adapter starts uninitialized and disabled.
    pub const fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            notifier: None,
            enabled: false,
            held: Vec::new(),
            held_address: None,
            rx: Vec::new(),
        }
    }

    /// Provides mutable access to the wrapped I2C bus.
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consumes the adapter and returns the owned I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn notifier(&self) -> Result<Notifier<'a>, HalTransportError> {
        let notifier = self.notifier.ok_or(HalTransportError::NotInitialized)?;
        if !self.enabled {
            return Err(HalTransportError::Disabled);
        }
        Ok(notifier)
    }

    fn drop_held(&mut self) {
        self.held.clear();
        self.held_address = None;
    }

    /// Abandons the pending write so a refused request leaves nothing behind for the next
    /// transfer.
    fn refuse(&mut self, address: u8) -> HalTransportError {
        log_debug!("hal: transfer to {:#x} exceeds buffers", address);
        self.drop_held();
        HalTransportError::Overflow
    }
}

impl<'a, I2C> HalTransport<'a, I2C>
where
    I2C: I2c,
{
    /// Sends bytes still held for a device other than `address`.
    fn flush_other(&mut self, address: u8) -> Result<(), I2C::Error> {
        match self.held_address {
            Some(held) if held != address => {
                let result = self.i2c.write(held, &self.held);
                self.drop_held();
                result
            }
            _ => Ok(()),
        }
    }

    fn classify(address: u8, err: &I2C::Error) -> Event {
        match err.kind() {
            ErrorKind::NoAcknowledge(_) => {
                log_debug!("hal: {:#x} not acknowledged", address);
                Event::Error
            }
            _ => {
                log_warn!("hal: bus fault on {:#x}", address);
                Event::BusError
            }
        }
    }
}

impl<'a, I2C> Transport<'a> for HalTransport<'a, I2C>
where
    I2C: I2c,
{
    type Error = HalTransportError;

    fn initialize(&mut self, config: &BusConfig, notifier: Notifier<'a>) -> Result<(), Self::Error> {
        if self.notifier.is_some() {
            return Err(HalTransportError::AlreadyInitialized);
        }

        // Pins and clock belong to the HAL bus that was passed in.
        log_trace!("hal: frequency {} Hz set by the HAL", config.frequency.hz());
        self.notifier = Some(notifier);
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.drop_held();
        }
        self.enabled = enabled;
    }

    fn transmit(&mut self, address: u8, bytes: &[u8], hold_bus: bool) -> Result<(), Self::Error> {
        let notifier = self.notifier()?;

        if let Err(err) = self.flush_other(address) {
            notifier.notify(Self::classify(address, &err));
            return Ok(());
        }

        if hold_bus {
            if self.held.extend_from_slice(bytes).is_err() {
                return Err(self.refuse(address));
            }
            self.held_address = Some(address);
            notifier.notify(Event::Done);
            return Ok(());
        }

        let result = if self.held.is_empty() {
            self.i2c.write(address, bytes)
        } else {
            let mut frame: Vec<u8, FRAME_CAPACITY> = Vec::new();
            if frame.extend_from_slice(&self.held).is_err() || frame.extend_from_slice(bytes).is_err() {
                return Err(self.refuse(address));
            }
            self.drop_held();
            self.i2c.write(address, &frame)
        };

        match result {
            Ok(()) => notifier.notify(Event::Done),
            Err(err) => notifier.notify(Self::classify(address, &err)),
        }
        Ok(())
    }

    fn receive(&mut self, address: u8, length: usize) -> Result<(), Self::Error> {
        let notifier = self.notifier()?;

        if let Err(err) = self.flush_other(address) {
            notifier.notify(Self::classify(address, &err));
            return Ok(());
        }

        self.rx.clear();
        if self.rx.resize(length, 0).is_err() {
            return Err(self.refuse(address));
        }

        let result = if self.held.is_empty() {
            self.i2c.read(address, &mut self.rx)
        } else {
            let result = self.i2c.write_read(address, &self.held, &mut self.rx);
            self.drop_held();
            result
        };

        match result {
            Ok(()) => notifier.notify(Event::Done),
            Err(err) => {
                self.rx.clear();
                notifier.notify(Self::classify(address, &err));
            }
        }
        Ok(())
    }

    fn read_received(&mut self, buf: &mut [u8]) {
        let len = buf.len().min(self.rx.len());
        buf[..len].copy_from_slice(&self.rx[..len]);
    }
}
