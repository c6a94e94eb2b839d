//! Text telemetry for a byte-oriented link such as a BLE UART service.
//!
//! ```
//! use twi_regdev::devices::icm20948::Motion;
//! use twi_regdev::report::{LinkSink, TelemetryFrame};
//!
//! struct Console(Vec<u8>);
//!
//! impl LinkSink for Console {
//!     type Error = ();
//!
//!     fn transmit(&mut self, bytes: &[u8]) -> Result<(), ()> {
//!         self.0.extend_from_slice(bytes);
//!         Ok(())
//!     }
//! }
//!
//! let mut frame = TelemetryFrame::new();
//! frame.push_motion(&Motion::default()).unwrap();
//! frame.push_proximity(12).unwrap();
//!
//! let mut console = Console(Vec::new());
//! frame.send(&mut console).unwrap();
//! assert!(console.0.ends_with(b"Prox: 12\n"));
//! assert!(frame.is_empty());
//! ```

use core::fmt::Write as _;

use heapless::{String, Vec};

use crate::devices::icm20948::Motion;

/// Capacity of one telemetry frame in bytes.
pub const FRAME_CAPACITY: usize = 100;

/// Outgoing byte link.
pub trait LinkSink {
    /// Error type produced by the link.
    type Error;

    /// Queues `bytes` for transmission.
    fn transmit(&mut self, bytes: &[u8]) -> core::result::Result<(), Self::Error>;
}

impl<T> LinkSink for &mut T
where
    T: LinkSink + ?Sized,
{
    type Error = T::Error;

    fn transmit(&mut self, bytes: &[u8]) -> core::result::Result<(), Self::Error> {
        (**self).transmit(bytes)
    }
}

/// The text did not fit in the frame. The frame keeps what was there before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFull;

impl core::fmt::Display for FrameFull {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("telemetry frame full")
    }
}

impl core::error::Error for FrameFull {}

/// Fixed-capacity text frame holding one reporting cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryFrame {
    text: String<FRAME_CAPACITY>,
}

impl TelemetryFrame {
    /// Creates an empty frame.
    pub const fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Appends the accelerometer and gyroscope lines followed by a blank line.
    pub fn push_motion(&mut self, motion: &Motion) -> core::result::Result<(), FrameFull> {
        let (a, g) = (motion.accel, motion.gyro);
        self.append(format_args!(
            "Accel: X={}, Y={}, Z={}\nGyro: X={}, Y={}, Z={}\n\n",
            a.x, a.y, a.z, g.x, g.y, g.z
        ))
    }

    /// Appends the proximity line.
    pub fn push_proximity(&mut self, proximity: u16) -> core::result::Result<(), FrameFull> {
        self.append(format_args!("Prox: {}\n", proximity))
    }

    /// Appends free text, e.g. a status message when a sensor is missing.
    pub fn push_str(&mut self, text: &str) -> core::result::Result<(), FrameFull> {
        self.text.push_str(text).map_err(|_| FrameFull)
    }

    /// Current contents.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the frame holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Discards the contents.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Hands the contents to `sink` and empties the frame, even if the link fails.
    pub fn send<S>(&mut self, mut sink: S) -> core::result::Result<(), S::Error>
    where
        S: LinkSink,
    {
        let result = sink.transmit(self.text.as_bytes());
        if result.is_err() {
            log_warn!("report: link dropped {} bytes", self.text.len());
        }
        self.text.clear();
        result
    }

    fn append(&mut self, args: core::fmt::Arguments<'_>) -> core::result::Result<(), FrameFull> {
        let mark = self.text.len();
        if self.text.write_fmt(args).is_err() {
            self.text.truncate(mark);
            return Err(FrameFull);
        }
        Ok(())
    }
}

/// Accumulates bytes from a receive callback into newline-terminated lines.
///
/// A line longer than `N` bytes is dropped whole.
#[derive(Debug, Clone, Default)]
pub struct LineReceiver<const N: usize> {
    buf: Vec<u8, N>,
    complete: bool,
    overflowed: bool,
}

impl<const N: usize> LineReceiver<N> {
    /// Creates an empty receiver.
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            complete: false,
            overflowed: false,
        }
    }

    /// Feeds one received byte. Returns the line, without its `\n`, once it is complete.
    pub fn push(&mut self, byte: u8) -> Option<&[u8]> {
        if self.complete {
            self.buf.clear();
            self.complete = false;
        }

        if byte == b'\n' {
            if core::mem::take(&mut self.overflowed) {
                self.buf.clear();
                return None;
            }
            self.complete = true;
            return Some(self.buf.as_slice());
        }

        if !self.overflowed && self.buf.push(byte).is_err() {
            log_debug!("report: line longer than {} bytes dropped", N);
            self.overflowed = true;
            self.buf.clear();
        }
        None
    }

    /// Bytes of the line collected so far.
    pub fn pending(&self) -> &[u8] {
        if self.complete { &[] } else { self.buf.as_slice() }
    }

    /// Forgets any partial line.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.complete = false;
        self.overflowed = false;
    }
}
