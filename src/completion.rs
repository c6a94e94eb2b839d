//! Completion flag shared between a bus instance and its event handler.
//!
//! Each [`Bus`](crate::Bus) borrows exactly one [`Completion`] and claims it for as long as
//! it is initialized, so no two buses can wait on the same flag. The transport's event
//! handler (interrupt context) only ever stores into it through a [`Notifier`]; the
//! synchronizer (foreground context) is the only party that clears or waits on it.
//!
//! ```
//! use twi_regdev::{Completion, Event};
//!
//! static TWI0_DONE: Completion = Completion::new();
//!
//! // Inside the TWI0 event handler:
//! TWI0_DONE.notifier().notify(Event::Done);
//! assert!(TWI0_DONE.is_set());
//! ```

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

const IDLE: u8 = 0;
const PENDING: u8 = 1;
const DONE: u8 = 2;
const ERROR: u8 = 3;
const BUS_ERROR: u8 = 4;

/// Classification of the event that terminates a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The transfer finished successfully.
    Done,
    /// The device did not acknowledge the address or a data byte.
    Error,
    /// The controller detected a bus fault.
    BusError,
}

impl Event {
    const fn encode(self) -> u8 {
        match self {
            Self::Done => DONE,
            Self::Error => ERROR,
            Self::BusError => BUS_ERROR,
        }
    }

    const fn decode(raw: u8) -> Option<Self> {
        match raw {
            DONE => Some(Self::Done),
            ERROR => Some(Self::Error),
            BUS_ERROR => Some(Self::BusError),
            _ => None,
        }
    }
}

/// Per-bus completion flag.
///
/// Starts cleared. It becomes set only when a [`Notifier`] records an [`Event`], and is
/// cleared again right before the next transfer is started.
#[derive(Debug)]
pub struct Completion {
    state: AtomicU8,
    claimed: AtomicBool,
}

impl Completion {
    /// Creates a cleared flag. `const` so it can back a `static` owned by one bus.
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
            claimed: AtomicBool::new(false),
        }
    }

    /// Returns the set-only handle given to the transport's event handler.
    pub const fn notifier(&self) -> Notifier<'_> {
        Notifier { completion: self }
    }

    /// Whether an event has been recorded since the flag was last cleared.
    pub fn is_set(&self) -> bool {
        self.state.load(Ordering::Acquire) >= DONE
    }

    /// Whether a transfer has been started and not yet signalled.
    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) == PENDING
    }

    /// Clears the flag ahead of a new transfer.
    pub(crate) fn clear(&self) {
        self.state.store(PENDING, Ordering::Release);
    }

    /// Returns the recorded event, if any, leaving the flag set.
    pub(crate) fn poll(&self) -> Option<Event> {
        Event::decode(self.state.load(Ordering::Acquire))
    }

    /// Drops any outstanding or late event.
    pub(crate) fn reset(&self) {
        self.state.store(IDLE, Ordering::Release);
    }

    /// Whether a bus currently owns this flag.
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// Takes ownership for one bus. Returns `false` if another bus already holds it.
    pub(crate) fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn unclaim(&self) {
        self.claimed.store(false, Ordering::Release);
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

/// Set-only view of a [`Completion`], safe to call from interrupt context.
#[derive(Debug, Clone, Copy)]
pub struct Notifier<'a> {
    completion: &'a Completion,
}

impl Notifier<'_> {
    /// Records the event that ended the current transfer. Does nothing else.
    #[inline]
    pub fn notify(&self, event: Event) {
        self.completion
            .state
            .store(event.encode(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_cleared() {
        let completion = Completion::new();
        assert!(!completion.is_set());
        assert!(!completion.is_pending());
        assert_eq!(completion.poll(), None);
    }

    #[test]
    fn notify_sets_until_cleared() {
        let completion = Completion::new();
        completion.clear();
        assert!(completion.is_pending());

        completion.notifier().notify(Event::BusError);
        assert!(completion.is_set());
        assert_eq!(completion.poll(), Some(Event::BusError));
        // Observing the event does not consume it.
        assert_eq!(completion.poll(), Some(Event::BusError));

        completion.clear();
        assert!(!completion.is_set());
        assert_eq!(completion.poll(), None);
    }

    #[test]
    fn independent_flags_do_not_share_state() {
        let twi0 = Completion::new();
        let twi1 = Completion::new();
        twi0.clear();
        twi1.clear();

        twi0.notifier().notify(Event::Done);

        assert!(twi0.is_set());
        assert!(!twi1.is_set());
        assert!(twi1.is_pending());
    }

    #[test]
    fn claimed_by_one_owner_at_a_time() {
        let completion = Completion::new();
        assert!(!completion.is_claimed());

        assert!(completion.claim());
        assert!(!completion.claim());
        assert!(completion.is_claimed());

        completion.unclaim();
        assert!(completion.claim());
    }

    #[test]
    fn notifier_crosses_threads() {
        static FLAG: Completion = Completion::new();
        FLAG.clear();

        let notifier = FLAG.notifier();
        std::thread::spawn(move || notifier.notify(Event::Done))
            .join()
            .unwrap();

        assert_eq!(FLAG.poll(), Some(Event::Done));
    }
}
