//! HC-06 Bluetooth serial module.
//!
//! The module has two modes sharing one serial line. While nothing is paired
//! it listens for AT commands, once a host connects it relays bytes verbatim.
//! Commands are not terminated; the module treats the pause after each one as
//! the end, so every command is followed by a blind settle wait.

pub mod commands;

use core::fmt::Write as _;

use embedded_hal::blocking::delay::DelayMs;
use heapless::String;
use log::{debug, trace, warn};

use commands::{AtCommand, Baudrate, COMMAND_CAPACITY, MAX_DEVICE_NAME, PIN_LENGTH};

use crate::config::Config;
use crate::drivers::serial::SerialTransport;
use crate::error::Error;

// Accepted PIN bytes, much wider than '0'..='9'
const PIN_CHAR_MIN: u8 = 0x30;
const PIN_CHAR_MAX: u8 = 0x90;

pub struct Hc06<S, D> {
    serial: S,
    delay: D,
    config: Config,

    initialized: bool,

    message: String<COMMAND_CAPACITY>,          // Command being sent
    device_name: String<MAX_DEVICE_NAME>,       // Last name we set, never read back
    device_pin: String<PIN_LENGTH>,             // Last PIN we set, never read back
}

impl<S, D> Hc06<S, D>
where
    S: SerialTransport,
    D: DelayMs<u32>,
{
    /// Does not talk to the module, call [`Hc06::begin`] for that.
    pub fn new(serial: S, delay: D, config: Config) -> Self {
        Hc06 {
            serial,
            delay,
            config,

            initialized: false,

            message: String::new(),
            device_name: String::new(),
            device_pin: String::new(),
        }
    }

    pub fn with_defaults(serial: S, delay: D) -> Self {
        Self::new(serial, delay, Config::default())
    }

    /// Brings the module into a known state: probe it, then push our baudrate.
    ///
    /// Any replies are thrown away afterwards so they don't show up in
    /// [`Hc06::read`]. On error the controller stays uninitialized.
    pub fn begin(&mut self) -> Result<(), Error<S::Error>> {
        self.serial
            .open(self.config.baudrate)
            .map_err(Error::Serial)?;
        self.settle()?;

        self.send(AtCommand::Probe)?;

        if self.config.verify_replies {
            self.expect_ok()?;
        }

        self.initialized = true;

        // Half-configured counts as not initialized
        if let Err(e) = self.sync() {
            self.initialized = false;
            return Err(e);
        }

        Ok(())
    }

    fn sync(&mut self) -> Result<(), Error<S::Error>> {
        self.set_baudrate(self.config.baudrate)?;

        let dropped = self.clear_serial()?;
        debug!("HC-06 ready at {} baud, dropped {} reply bytes", self.config.baudrate, dropped);

        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), Error<S::Error>> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }

        self.send(AtCommand::Reset)
    }

    /// Reads whatever already arrived, up to `buffer.len()` bytes. Never
    /// waits for more.
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Error<S::Error>> {
        let mut bytes_read = 0;

        while bytes_read < buffer.len() && self.serial.available().map_err(Error::Serial)? > 0 {
            buffer[bytes_read] = self.serial.read_byte().map_err(Error::Serial)?;
            bytes_read += 1;
        }

        Ok(bytes_read)
    }

    /// Data mode: the bytes go out verbatim.
    pub fn write(&mut self, buffer: &[u8]) -> Result<(), Error<S::Error>> {
        self.serial.write_bytes(buffer).map_err(Error::Serial)
    }

    /// Returns the rate actually applied. Unlisted rates are replaced by
    /// 9600, both on the module and in our own configuration.
    pub fn set_baudrate(&mut self, baudrate: u32) -> Result<Baudrate, Error<S::Error>> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }

        let rate = Baudrate::from_bps_or_default(baudrate);
        if rate.bps() != baudrate {
            warn!("unsupported baudrate {}, falling back to {}", baudrate, rate.bps());
        }
        self.config.baudrate = rate.bps();

        self.send(AtCommand::Baud(rate))?;

        Ok(rate)
    }

    pub fn set_device_name(&mut self, name: &str) -> Result<(), Error<S::Error>> {
        if name.len() > MAX_DEVICE_NAME {
            warn!("device name too long ({} bytes)", name.len());
            return Err(Error::NameTooLong(name.len()));
        }

        self.render(AtCommand::Name(name))?;

        self.device_name.clear();
        self.device_name
            .push_str(name)
            .map_err(|_| Error::NameTooLong(name.len()))?;

        self.write_and_wait()
    }

    pub fn set_device_pin(&mut self, pin: &str) -> Result<(), Error<S::Error>> {
        if pin.len() != PIN_LENGTH {
            warn!("device pin must be {} bytes, got {}", PIN_LENGTH, pin.len());
            return Err(Error::InvalidPinLength(pin.len()));
        }

        // TODO: confirm whether 0x90 should have been 0x39 before narrowing this
        if let Some(&c) = pin
            .as_bytes()
            .iter()
            .find(|&&c| !(PIN_CHAR_MIN..=PIN_CHAR_MAX).contains(&c))
        {
            warn!("invalid device pin character 0x{:02x}", c);
            return Err(Error::InvalidPinCharacter(c));
        }

        self.render(AtCommand::Pin(pin))?;

        self.device_pin.clear();
        self.device_pin
            .push_str(pin)
            .map_err(|_| Error::InvalidPinLength(pin.len()))?;

        self.write_and_wait()
    }

    pub fn rx_pin(&self) -> u32 {
        self.config.rx_pin
    }

    pub fn tx_pin(&self) -> u32 {
        self.config.tx_pin
    }

    pub fn baudrate(&self) -> u32 {
        self.config.baudrate
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Queries the module. The reply is copied into `buffer` and its length
    /// returned; whatever doesn't fit is read and dropped.
    ///
    /// No NUL terminator is written, use `&buffer[..len]`.
    pub fn version(&mut self, buffer: &mut [u8]) -> Result<usize, Error<S::Error>> {
        self.render(AtCommand::Version)?;
        self.write_receive(buffer)
    }

    // Note: this is what we last sent, the module is not asked
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    // Same as device_name, not read back from the module
    pub fn device_pin(&self) -> &str {
        &self.device_pin
    }

    pub fn free(self) -> (S, D) {
        (self.serial, self.delay)
    }

    fn settle(&mut self) -> Result<(), Error<S::Error>> {
        self.serial
            .wait(&mut self.delay, self.config.write_wait.ticks())
            .map_err(Error::Serial)
    }

    fn render(&mut self, command: AtCommand) -> Result<(), Error<S::Error>> {
        self.message.clear();
        write!(self.message, "{}", command).map_err(|_| Error::CommandOverflow)
    }

    fn send(&mut self, command: AtCommand) -> Result<(), Error<S::Error>> {
        self.render(command)?;
        self.write_and_wait()
    }

    fn write_and_wait(&mut self) -> Result<(), Error<S::Error>> {
        debug!("-> {}", self.message.as_str());

        self.serial
            .write_bytes(self.message.as_bytes())
            .map_err(Error::Serial)?;

        self.settle()
    }

    fn write_receive(&mut self, buffer: &mut [u8]) -> Result<usize, Error<S::Error>> {
        self.clear_serial()?;

        self.write_and_wait()?;

        let mut index = 0;
        let mut dropped = 0;
        while self.serial.available().map_err(Error::Serial)? > 0 {
            let byte = self.serial.read_byte().map_err(Error::Serial)?;
            match buffer.get_mut(index) {
                Some(slot) => {
                    *slot = byte;
                    index += 1;
                }
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!("reply did not fit, dropped {} bytes", dropped);
        }

        Ok(index)
    }

    // Returns the number of bytes thrown away
    fn clear_serial(&mut self) -> Result<usize, Error<S::Error>> {
        let mut dropped = 0;

        while self.serial.available().map_err(Error::Serial)? > 0 {
            let trash = self.serial.read_byte().map_err(Error::Serial)?;
            trace!("dropping 0x{:02x}", trash);
            dropped += 1;
        }

        Ok(dropped)
    }

    fn expect_ok(&mut self) -> Result<(), Error<S::Error>> {
        let mut reply = [0u8; 2];
        let len = self.read(&mut reply)?;
        self.clear_serial()?;

        if &reply[..len] == b"OK" {
            Ok(())
        } else {
            warn!("probe answered with {:?}", &reply[..len]);
            Err(Error::UnexpectedReply)
        }
    }
}
