//! Transaction synchronizer: turns an interrupt-completed transfer into a blocking call.

use embedded_hal::delay::DelayNs;

use crate::completion::{Completion, Event};
use crate::error::{BusError, BusResult, Fault};

/// Polling step used while a timeout is armed (microseconds).
pub const POLL_INTERVAL_US: u32 = 10;

/// Waits on one bus instance's [`Completion`], one transfer at a time.
///
/// Must never run in the event handler's context: the flag it spins on is only set from
/// there.
#[derive(Debug)]
pub struct Synchronizer<'a, D> {
    completion: &'a Completion,
    delay: D,
    timeout_us: Option<u32>,
}

impl<'a, D> Synchronizer<'a, D> {
    /// Creates a synchronizer over `completion`.
    pub const fn new(completion: &'a Completion, delay: D, timeout_us: Option<u32>) -> Self {
        Self {
            completion,
            delay,
            timeout_us,
        }
    }

    /// The flag this synchronizer waits on.
    pub fn completion(&self) -> &'a Completion {
        self.completion
    }

    /// Current per-transfer timeout.
    pub fn timeout_us(&self) -> Option<u32> {
        self.timeout_us
    }

    /// Replaces the per-transfer timeout.
    pub fn set_timeout_us(&mut self, timeout_us: Option<u32>) {
        self.timeout_us = timeout_us;
    }

    /// Consumes the synchronizer and returns the delay provider.
    pub fn release(self) -> D {
        self.delay
    }
}

impl<D> Synchronizer<'_, D>
where
    D: DelayNs,
{
    /// Clears the flag, starts one transfer and blocks until its event arrives.
    ///
    /// A transfer the transport refuses to start fails at once, since no event will follow.
    /// Nothing is retried.
    pub fn run_and_wait<E, F>(&mut self, start: F) -> BusResult<(), E>
    where
        F: FnOnce() -> core::result::Result<(), E>,
    {
        self.completion.clear();

        if let Err(err) = start() {
            return Err(BusError::TransferFailed(Fault::Rejected(err)));
        }

        match self.wait() {
            Some(Event::Done) => Ok(()),
            Some(Event::Error) => Err(BusError::TransferFailed(Fault::Nack)),
            Some(Event::BusError) => Err(BusError::TransferFailed(Fault::Bus)),
            None => Err(BusError::Timeout),
        }
    }

    fn wait(&mut self) -> Option<Event> {
        let Some(limit) = self.timeout_us else {
            loop {
                if let Some(event) = self.completion.poll() {
                    return Some(event);
                }
                core::hint::spin_loop();
            }
        };

        let mut waited = 0u32;
        loop {
            if let Some(event) = self.completion.poll() {
                return Some(event);
            }
            if waited >= limit {
                return None;
            }
            self.delay.delay_us(POLL_INTERVAL_US);
            waited = waited.saturating_add(POLL_INTERVAL_US);
        }
    }
}
