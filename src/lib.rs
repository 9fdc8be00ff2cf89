#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod drivers;
pub mod error;

pub use config::Config;
pub use drivers::hc06::commands::{AtCommand, Baudrate};
pub use drivers::hc06::Hc06;
pub use drivers::serial::{NbSerial, SerialError, SerialTransport};
pub use error::Error;
