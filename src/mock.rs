//! Simulated two-wire devices and controller for unit tests.

use crate::completion::{Completion, Event, Notifier};
use crate::config::BusConfig;
use crate::error::{BusError, BusResult, Fault};
use crate::interface::RegisterInterface;
use crate::transport::Transport;

/// One phase as seen on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Phase {
    Transmit { bytes: Vec<u8>, hold_bus: bool },
    Receive { length: usize },
}

/// A device with a 256-byte register file and an auto-incrementing register pointer.
///
/// The first byte of a fresh write selects the register. A write that follows a held
/// transmit continues at the pointer.
#[derive(Debug)]
pub(crate) struct FakeDevice {
    pub address: u8,
    pub registers: [u8; 256],
    pub phases: Vec<Phase>,
    pub record: bool,
    /// Index of the phase that ends with an `ERROR` event.
    pub fail_phase: Option<usize>,
    pointer: u8,
    continuing: bool,
    count: usize,
}

impl FakeDevice {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; 256],
            phases: Vec::new(),
            record: true,
            fail_phase: None,
            pointer: 0,
            continuing: false,
            count: 0,
        }
    }

    fn apply_transmit(&mut self, bytes: &[u8], hold_bus: bool) {
        let data = if self.continuing {
            bytes
        } else {
            match bytes.split_first() {
                Some((register, rest)) => {
                    self.pointer = *register;
                    rest
                }
                None => &[],
            }
        };

        for byte in data {
            self.registers[self.pointer as usize] = *byte;
            self.pointer = self.pointer.wrapping_add(1);
        }
        self.continuing = hold_bus;
    }

    fn apply_receive(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.registers[self.pointer as usize];
            self.pointer = self.pointer.wrapping_add(1);
        }
        self.continuing = false;
    }

    fn next_phase(&mut self, phase: Phase) -> bool {
        let index = self.count;
        self.count += 1;
        if self.record {
            self.phases.push(phase);
        }
        if self.fail_phase == Some(index) {
            self.continuing = false;
            return false;
        }
        true
    }
}

impl RegisterInterface for FakeDevice {
    type Error = Refused;

    fn transmit(&mut self, address: u8, bytes: &[u8], hold_bus: bool) -> BusResult<(), Self::Error> {
        let phase = Phase::Transmit {
            bytes: bytes.to_vec(),
            hold_bus,
        };
        if !self.next_phase(phase) || address != self.address {
            return Err(BusError::TransferFailed(Fault::Nack));
        }
        self.apply_transmit(bytes, hold_bus);
        Ok(())
    }

    fn receive(&mut self, address: u8, buf: &mut [u8]) -> BusResult<(), Self::Error> {
        let phase = Phase::Receive { length: buf.len() };
        if !self.next_phase(phase) || address != self.address {
            return Err(BusError::TransferFailed(Fault::Nack));
        }
        self.apply_receive(buf);
        Ok(())
    }
}

/// Error returned when the fake controller refuses to start a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Refused;

/// A controller whose "interrupt" fires synchronously from inside each start call.
///
/// Every start asserts that the bus's completion flag was cleared first, which is what
/// keeps two transfers from overlapping.
pub(crate) struct FakeTwi<'a> {
    completion: &'a Completion,
    notifier: Option<Notifier<'a>>,
    pub devices: Vec<FakeDevice>,
    pub log: Vec<(u8, Phase)>,
    pub enabled: bool,
    pub init_calls: usize,
    /// Transfer index that ends with the given event instead of `Done`.
    pub fail: Option<(usize, Event)>,
    /// Transfer index the controller refuses to start.
    pub reject: Option<usize>,
    /// Transfer index that never signals completion.
    pub silent: Option<usize>,
    /// Refuse `initialize`.
    pub refuse_init: bool,
    started: usize,
    rx: Vec<u8>,
}

impl<'a> FakeTwi<'a> {
    pub fn new(completion: &'a Completion, devices: Vec<FakeDevice>) -> Self {
        Self {
            completion,
            notifier: None,
            devices,
            log: Vec::new(),
            enabled: false,
            init_calls: 0,
            fail: None,
            reject: None,
            silent: None,
            refuse_init: false,
            started: 0,
            rx: Vec::new(),
        }
    }

    pub fn device(&mut self, address: u8) -> &mut FakeDevice {
        self.devices
            .iter_mut()
            .find(|device| device.address == address)
            .expect("no such fake device")
    }

    /// Records the phase and decides how it ends.
    fn begin(&mut self, address: u8, phase: Phase) -> Result<Outcome, Refused> {
        assert!(self.enabled, "transfer started on a disabled controller");
        assert!(
            self.completion.is_pending(),
            "transfer started before the completion flag was cleared"
        );

        let index = self.started;
        self.started += 1;
        if self.reject == Some(index) {
            return Err(Refused);
        }
        self.log.push((address, phase));

        let outcome = match self.fail {
            _ if self.silent == Some(index) => Outcome::Silent,
            Some((at, event)) if at == index => Outcome::End(event),
            _ => Outcome::Run,
        };
        if !matches!(outcome, Outcome::Run) {
            self.abort(address);
        }
        Ok(outcome)
    }

    /// A phase that never finished leaves no repeated start pending.
    fn abort(&mut self, address: u8) {
        for device in self.devices.iter_mut().filter(|d| d.address == address) {
            device.continuing = false;
        }
    }

    fn finish(&self, event: Event) {
        if let Some(notifier) = self.notifier {
            notifier.notify(event);
        }
    }
}

enum Outcome {
    Run,
    End(Event),
    Silent,
}

impl<'a> Transport<'a> for FakeTwi<'a> {
    type Error = Refused;

    fn initialize(&mut self, _config: &BusConfig, notifier: Notifier<'a>) -> Result<(), Refused> {
        self.init_calls += 1;
        if self.refuse_init || self.notifier.is_some() {
            return Err(Refused);
        }
        self.notifier = Some(notifier);
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            for device in self.devices.iter_mut() {
                device.continuing = false;
            }
        }
    }

    fn transmit(&mut self, address: u8, bytes: &[u8], hold_bus: bool) -> Result<(), Refused> {
        let phase = Phase::Transmit {
            bytes: bytes.to_vec(),
            hold_bus,
        };
        match self.begin(address, phase)? {
            Outcome::Silent => {}
            Outcome::End(event) => self.finish(event),
            Outcome::Run => match self.devices.iter_mut().find(|d| d.address == address) {
                Some(device) => {
                    device.apply_transmit(bytes, hold_bus);
                    self.finish(Event::Done);
                }
                None => self.finish(Event::Error),
            },
        }
        Ok(())
    }

    fn receive(&mut self, address: u8, length: usize) -> Result<(), Refused> {
        match self.begin(address, Phase::Receive { length })? {
            Outcome::Silent => {}
            Outcome::End(event) => self.finish(event),
            Outcome::Run => match self.devices.iter_mut().find(|d| d.address == address) {
                Some(device) => {
                    self.rx.clear();
                    self.rx.resize(length, 0);
                    device.apply_receive(&mut self.rx);
                    self.finish(Event::Done);
                }
                None => self.finish(Event::Error),
            },
        }
        Ok(())
    }

    fn read_received(&mut self, buf: &mut [u8]) {
        let len = buf.len().min(self.rx.len());
        buf[..len].copy_from_slice(&self.rx[..len]);
    }
}
