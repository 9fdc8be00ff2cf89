//! Byte-level serial line shared by AT commands and data-mode traffic.

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::serial;
use heapless::Deque;
use log::warn;

/// What the controller needs from a serial line.
///
/// Implemented by [`NbSerial`] for hardware UARTs, and by anything else that
/// can move bytes (a bit-banged line, a test double).
pub trait SerialTransport {
    type Error: core::fmt::Debug;

    /// Start listening at `baudrate`. Lines configured at construction may
    /// ignore this.
    fn open(&mut self, baudrate: u32) -> Result<(), Self::Error>;

    /// Number of received bytes that `read_byte` can return without waiting
    fn available(&mut self) -> Result<usize, Self::Error>;

    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Block for `ms` milliseconds. Lines that lose bytes nobody picks up
    /// keep draining their receiver in the meantime.
    fn wait<D: DelayMs<u32>>(&mut self, delay: &mut D, ms: u32) -> Result<(), Self::Error> {
        delay.delay_ms(ms);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError<TE, RE> {
    Write(TE),
    Read(RE),
}

/// Adapts a non-blocking `embedded-hal` TX/RX pair to [`SerialTransport`].
///
/// Hardware receivers usually hold a byte or two, so everything they have
/// ready is moved into a queue of `N` bytes whenever the line is touched,
/// and once per millisecond while the controller waits for the module.
pub struct NbSerial<TX, RX, const N: usize> {
    tx: TX,
    rx: RX,

    received: Deque<u8, N>,
    overruns: usize,    // Bytes dropped because the queue was full
}

impl<TX, RX, const N: usize> NbSerial<TX, RX, N>
where
    TX: serial::Write<u8>,
    RX: serial::Read<u8>,
{
    pub fn new(tx: TX, rx: RX) -> Self {
        NbSerial {
            tx,
            rx,
            received: Deque::new(),
            overruns: 0,
        }
    }

    /// Moves every byte the receiver has ready into the queue, returns how
    /// many were kept.
    pub fn poll(&mut self) -> Result<usize, RX::Error> {
        let mut kept = 0;
        let mut dropped = 0;

        loop {
            match self.rx.read() {
                Ok(byte) => match self.received.push_back(byte) {
                    Ok(()) => kept += 1,
                    Err(_) => dropped += 1,
                },
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }

        if dropped > 0 {
            warn!("receive queue full, dropped {} bytes", dropped);
            self.overruns += dropped;
        }

        Ok(kept)
    }

    pub fn overruns(&self) -> usize {
        self.overruns
    }

    // Queued bytes are lost, drain the line first if it matters
    pub fn free(self) -> (TX, RX) {
        (self.tx, self.rx)
    }
}

impl<TX, RX, const N: usize> SerialTransport for NbSerial<TX, RX, N>
where
    TX: serial::Write<u8>,
    RX: serial::Read<u8>,
    TX::Error: core::fmt::Debug,
    RX::Error: core::fmt::Debug,
{
    type Error = SerialError<TX::Error, RX::Error>;

    // The HAL peripheral already runs at the rate it was built with
    fn open(&mut self, _baudrate: u32) -> Result<(), Self::Error> {
        Ok(())
    }

    fn available(&mut self) -> Result<usize, Self::Error> {
        self.poll().map_err(SerialError::Read)?;
        Ok(self.received.len())
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        match self.received.pop_front() {
            Some(byte) => Ok(byte),
            None => nb::block!(self.rx.read()).map_err(SerialError::Read),
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &byte in bytes {
            nb::block!(self.tx.write(byte)).map_err(SerialError::Write)?;
        }
        nb::block!(self.tx.flush()).map_err(SerialError::Write)
    }

    fn wait<D: DelayMs<u32>>(&mut self, delay: &mut D, ms: u32) -> Result<(), Self::Error> {
        for _ in 0..ms {
            self.poll().map_err(SerialError::Read)?;
            delay.delay_ms(1);
        }
        self.poll().map_err(SerialError::Read)?;

        Ok(())
    }
}
