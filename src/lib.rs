#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;
mod error;

pub mod bus;
pub mod completion;
pub mod config;
pub mod devices;
pub mod interface;
pub mod params;
pub mod registers;
pub mod report;
pub mod sync;
pub mod transport;

#[cfg(test)]
mod mock;

pub use crate::bus::{Bus, BusState};
pub use crate::completion::{Completion, Event, Notifier};
pub use crate::devices::{Icm20948, Vcnl4040};
pub use crate::error::{BusError, BusResult, Error, Fault, Result};
pub use crate::interface::RegisterInterface;
pub use crate::transport::Transport;
