//! Error handling primitives for the bus core and the sensor drivers.

use core::fmt;

/// Result type for register access on a bus whose transport reports `E`.
pub type BusResult<T, E> = core::result::Result<T, BusError<E>>;

/// Crate-wide result type alias for driver operations.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Why a single transmit or receive phase did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault<E> {
    /// The transport refused to start the transfer.
    Rejected(E),
    /// The transfer ended with an `ERROR` event (address or data not acknowledged).
    Nack,
    /// The transfer ended with a `BUS_ERROR` event.
    Bus,
}

/// Errors produced by a bus instance and the register access layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError<E> {
    /// The transport reported non-success for a transmit or receive phase.
    TransferFailed(Fault<E>),
    /// No completion event arrived within the configured timeout.
    Timeout,
    /// A previous transfer timed out; call [`Bus::recover`](crate::Bus::recover) first.
    Indeterminate,
    /// The bus has not been initialized.
    NotInitialized,
    /// The bus was already initialized.
    AlreadyInitialized,
    /// The completion flag is owned by another bus.
    CompletionInUse,
    /// The bus is initialized but not enabled.
    Disabled,
    /// The transport failed to initialize.
    InitFailed(E),
    /// The bus configuration did not validate.
    InvalidConfig,
    /// The device address does not fit in 7 bits.
    InvalidAddress,
    /// The payload does not fit in a single frame.
    PayloadTooLong,
}

/// Error variants produced by the device drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any error reported by the underlying bus.
    Bus(BusError<E>),
    /// The identity register read back a value other than the expected one.
    IdentityMismatch(u16),
}

impl<E> From<BusError<E>> for Error<E> {
    fn from(err: BusError<E>) -> Self {
        Self::Bus(err)
    }
}

impl<E: fmt::Debug> fmt::Display for BusError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::TransferFailed(Fault::Rejected(e)) => {
                write!(f, "transfer rejected by transport: {:?}", e)
            }
            BusError::TransferFailed(Fault::Nack) => write!(f, "transfer not acknowledged"),
            BusError::TransferFailed(Fault::Bus) => write!(f, "bus error during transfer"),
            BusError::Timeout => write!(f, "transfer timed out"),
            BusError::Indeterminate => write!(f, "bus state indeterminate after timeout"),
            BusError::NotInitialized => write!(f, "bus not initialized"),
            BusError::AlreadyInitialized => write!(f, "bus already initialized"),
            BusError::CompletionInUse => write!(f, "completion flag owned by another bus"),
            BusError::Disabled => write!(f, "bus disabled"),
            BusError::InitFailed(e) => write!(f, "transport initialization failed: {:?}", e),
            BusError::InvalidConfig => write!(f, "invalid bus configuration"),
            BusError::InvalidAddress => write!(f, "device address exceeds 7 bits"),
            BusError::PayloadTooLong => write!(f, "payload exceeds frame capacity"),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "{}", e),
            Error::IdentityMismatch(found) => write!(f, "unexpected identity {:#x}", found),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for BusError<E> {}

impl<E: fmt::Debug> core::error::Error for Error<E> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_errors_lift_into_driver_errors() {
        fn read() -> Result<u8, ()> {
            let failed: BusResult<u8, ()> = Err(BusError::Timeout);
            Ok(failed?)
        }

        assert_eq!(read(), Err(Error::Bus(BusError::Timeout)));
    }

    #[test]
    fn display_names_the_fault() {
        let err: BusError<u8> = BusError::TransferFailed(Fault::Nack);
        assert_eq!(std::format!("{}", err), "transfer not acknowledged");

        let err: Error<u8> = Error::IdentityMismatch(0xEB);
        assert_eq!(std::format!("{}", err), "unexpected identity 0xeb");
    }
}
