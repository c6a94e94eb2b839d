//! Register access layer shared by every sensor driver.
//!
//! [`RegisterInterface`] needs only the two synchronized phases of a two-wire bus: one
//! blocking transmit and one blocking receive. Every register operation is built on top of
//! them, so the same driver code runs on a [`Bus`](crate::Bus), on a borrowed bus, or on a
//! test double.

pub mod field;
pub mod hal;

use heapless::Vec;

use crate::error::{BusError, BusResult};

/// Largest payload, in bytes, carried by one multi-byte write or word burst.
pub const MAX_FRAME_LEN: usize = 32;

/// Synchronous, bit-addressable register access on 7-bit devices with 8-bit register
/// addresses.
///
/// A register read is two phases: the register address is written with the bus held, then
/// the data is read. The read phase is never attempted if the address phase fails. Nothing
/// is retried.
///
/// Read-modify-write operations are not atomic across their two transfers; a change made
/// by another agent in between is lost. Single-owner access to each device is assumed.
pub trait RegisterInterface {
    /// Error type produced by the underlying transport.
    type Error;

    /// Writes `bytes` to `address` and waits for completion. With `hold_bus` no stop
    /// condition is issued.
    fn transmit(&mut self, address: u8, bytes: &[u8], hold_bus: bool) -> BusResult<(), Self::Error>;

    /// Reads `buf.len()` bytes from `address` and waits for completion.
    fn receive(&mut self, address: u8, buf: &mut [u8]) -> BusResult<(), Self::Error>;

    /// Reads consecutive registers starting at `register` into `buf`.
    ///
    /// Bursts longer than [`MAX_FRAME_LEN`] fail with [`BusError::PayloadTooLong`] before the
    /// bus is touched.
    fn read_bytes(&mut self, address: u8, register: u8, buf: &mut [u8]) -> BusResult<(), Self::Error> {
        if buf.is_empty() {
            return Ok(());
        }
        if buf.len() > MAX_FRAME_LEN {
            return Err(BusError::PayloadTooLong);
        }

        self.transmit(address, &[register], true)?;
        self.receive(address, buf)
    }

    /// Reads `N` consecutive registers starting at `register` in one burst.
    fn read_array<const N: usize>(&mut self, address: u8, register: u8) -> BusResult<[u8; N], Self::Error> {
        let mut buf = [0u8; N];
        self.read_bytes(address, register, &mut buf)?;
        Ok(buf)
    }

    /// Reads a single register.
    fn read_byte(&mut self, address: u8, register: u8) -> BusResult<u8, Self::Error> {
        let [value] = self.read_array::<1>(address, register)?;
        Ok(value)
    }

    /// Writes a single register.
    fn write_byte(&mut self, address: u8, register: u8, value: u8) -> BusResult<(), Self::Error> {
        self.transmit(address, &[register, value], false)
    }

    /// Writes consecutive registers starting at `register` in one transfer, then releases
    /// the bus.
    fn write_bytes(&mut self, address: u8, register: u8, values: &[u8]) -> BusResult<(), Self::Error> {
        let mut frame: Vec<u8, { MAX_FRAME_LEN + 1 }> = Vec::new();
        frame.push(register).map_err(|_| BusError::PayloadTooLong)?;
        frame
            .extend_from_slice(values)
            .map_err(|_| BusError::PayloadTooLong)?;
        self.transmit(address, &frame, false)
    }

    /// Returns whether bit `bit` (0 = LSB) of a register is set.
    fn read_bit(&mut self, address: u8, register: u8, bit: u8) -> BusResult<bool, Self::Error> {
        let value = self.read_byte(address, register)?;
        Ok(field::extract8(value, bit, 1) != 0)
    }

    /// Reads the right-aligned field whose most significant bit is `bit_start`.
    fn read_bits(
        &mut self,
        address: u8,
        register: u8,
        bit_start: u8,
        length: u8,
    ) -> BusResult<u8, Self::Error> {
        let value = self.read_byte(address, register)?;
        Ok(field::extract8(value, bit_start, length))
    }

    /// Sets or clears bit `bit`, preserving the other bits. Nothing is written if the read
    /// fails.
    fn write_bit(&mut self, address: u8, register: u8, bit: u8, value: bool) -> BusResult<(), Self::Error> {
        let current = self.read_byte(address, register)?;
        let updated = field::insert8(current, bit, 1, value as u8);
        self.write_byte(address, register, updated)
    }

    /// Replaces the field whose most significant bit is `bit_start` with the low `length`
    /// bits of `value`. Nothing is written if the read fails.
    fn write_bits(
        &mut self,
        address: u8,
        register: u8,
        bit_start: u8,
        length: u8,
        value: u8,
    ) -> BusResult<(), Self::Error> {
        let current = self.read_byte(address, register)?;
        let updated = field::insert8(current, bit_start, length, value);
        self.write_byte(address, register, updated)
    }

    /// Reads a big-endian 16-bit register.
    fn read_word(&mut self, address: u8, register: u8) -> BusResult<u16, Self::Error> {
        let raw = self.read_array::<2>(address, register)?;
        Ok(u16::from_be_bytes(raw))
    }

    /// Reads consecutive big-endian 16-bit registers in one burst.
    fn read_words(&mut self, address: u8, register: u8, words: &mut [u16]) -> BusResult<(), Self::Error> {
        let mut raw: Vec<u8, MAX_FRAME_LEN> = Vec::new();
        raw.resize(words.len() * 2, 0)
            .map_err(|_| BusError::PayloadTooLong)?;
        self.read_bytes(address, register, &mut raw)?;

        for (word, pair) in words.iter_mut().zip(raw.chunks_exact(2)) {
            *word = u16::from_be_bytes([pair[0], pair[1]]);
        }
        Ok(())
    }

    /// Writes a big-endian 16-bit register.
    fn write_word(&mut self, address: u8, register: u8, value: u16) -> BusResult<(), Self::Error> {
        self.write_words(address, register, &[value])
    }

    /// Writes consecutive big-endian 16-bit registers. The register address and every word
    /// but the last are sent with the bus held.
    fn write_words(&mut self, address: u8, register: u8, values: &[u16]) -> BusResult<(), Self::Error> {
        if values.is_empty() {
            return Ok(());
        }
        if values.len() * 2 > MAX_FRAME_LEN {
            return Err(BusError::PayloadTooLong);
        }

        self.transmit(address, &[register], true)?;
        for (index, value) in values.iter().enumerate() {
            let hold_bus = index + 1 < values.len();
            self.transmit(address, &value.to_be_bytes(), hold_bus)?;
        }
        Ok(())
    }

    /// Returns whether bit `bit` (0 = LSB) of a 16-bit register is set.
    fn read_bit_word(&mut self, address: u8, register: u8, bit: u8) -> BusResult<bool, Self::Error> {
        let value = self.read_word(address, register)?;
        Ok(field::extract16(value, bit, 1) != 0)
    }

    /// Reads the right-aligned field of a 16-bit register whose most significant bit is
    /// `bit_start`.
    fn read_bits_word(
        &mut self,
        address: u8,
        register: u8,
        bit_start: u8,
        length: u8,
    ) -> BusResult<u16, Self::Error> {
        let value = self.read_word(address, register)?;
        Ok(field::extract16(value, bit_start, length))
    }

    /// Sets or clears bit `bit` of a 16-bit register.
    fn write_bit_word(
        &mut self,
        address: u8,
        register: u8,
        bit: u8,
        value: bool,
    ) -> BusResult<(), Self::Error> {
        let current = self.read_word(address, register)?;
        let updated = field::insert16(current, bit, 1, value as u16);
        self.write_word(address, register, updated)
    }

    /// Replaces a field of a 16-bit register. Nothing is written if the read fails.
    fn write_bits_word(
        &mut self,
        address: u8,
        register: u8,
        bit_start: u8,
        length: u8,
        value: u16,
    ) -> BusResult<(), Self::Error> {
        let current = self.read_word(address, register)?;
        let updated = field::insert16(current, bit_start, length, value);
        self.write_word(address, register, updated)
    }
}

impl<T> RegisterInterface for &mut T
where
    T: RegisterInterface + ?Sized,
{
    type Error = T::Error;

    fn transmit(&mut self, address: u8, bytes: &[u8], hold_bus: bool) -> BusResult<(), Self::Error> {
        (**self).transmit(address, bytes, hold_bus)
    }

    fn receive(&mut self, address: u8, buf: &mut [u8]) -> BusResult<(), Self::Error> {
        (**self).receive(address, buf)
    }
}
