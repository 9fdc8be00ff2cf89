use fugit::MillisDurationU32;

/// Baudrate the module ships with
pub const DEFAULT_BAUDRATE: u32 = 9600;

/// Time the module needs after power-up or a command before it listens again
pub const WRITE_WAIT: MillisDurationU32 = MillisDurationU32::millis(1200);

pub const DEFAULT_RX_PIN: u32 = 2;
pub const DEFAULT_TX_PIN: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub rx_pin: u32,
    pub tx_pin: u32,
    pub baudrate: u32,

    // Blind wait after every command, there is no acknowledgement polling
    pub write_wait: MillisDurationU32,

    // Require the probe in begin() to be answered with "OK"
    pub verify_replies: bool,
}

impl Config {
    pub const fn new(rx_pin: u32, tx_pin: u32, baudrate: u32) -> Self {
        Config {
            rx_pin,
            tx_pin,
            baudrate,
            write_wait: WRITE_WAIT,
            verify_replies: false,
        }
    }

    pub const fn with_write_wait(mut self, write_wait: MillisDurationU32) -> Self {
        self.write_wait = write_wait;
        self
    }

    pub const fn with_verify_replies(mut self, verify_replies: bool) -> Self {
        self.verify_replies = verify_replies;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_RX_PIN, DEFAULT_TX_PIN, DEFAULT_BAUDRATE)
    }
}
