use core::convert::TryFrom;
use core::fmt;

pub const MAX_DEVICE_NAME: usize = 40;
pub const LONGEST_OPCODE: usize = 10; // AT+VERSION
pub const PIN_LENGTH: usize = 4;
pub const COMMAND_CAPACITY: usize = LONGEST_OPCODE + MAX_DEVICE_NAME;

// Firmware numbering of the rates the module accepts, see AT+BAUD<code>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baudrate {
    B1200,
    B2400,
    B4800,
    B9600,      // Factory default
    B19200,
    B38400,
    B57600,
    B115200,
    B230400,
    B460800,
    B921600,
    B1382400,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedBaudrate(pub u32);

impl Baudrate {
    pub const ALL: [Baudrate; 12] = [
        Baudrate::B1200,
        Baudrate::B2400,
        Baudrate::B4800,
        Baudrate::B9600,
        Baudrate::B19200,
        Baudrate::B38400,
        Baudrate::B57600,
        Baudrate::B115200,
        Baudrate::B230400,
        Baudrate::B460800,
        Baudrate::B921600,
        Baudrate::B1382400,
    ];

    pub fn code(self) -> u8 {
        match self {
            Baudrate::B1200 => 1,
            Baudrate::B2400 => 2,
            Baudrate::B4800 => 3,
            Baudrate::B9600 => 4,
            Baudrate::B19200 => 5,
            Baudrate::B38400 => 6,
            Baudrate::B57600 => 7,
            Baudrate::B115200 => 8,
            Baudrate::B230400 => 9,
            Baudrate::B460800 => 10,
            Baudrate::B921600 => 11,
            Baudrate::B1382400 => 12,
        }
    }

    pub fn bps(self) -> u32 {
        match self {
            Baudrate::B1200 => 1200,
            Baudrate::B2400 => 2400,
            Baudrate::B4800 => 4800,
            Baudrate::B9600 => 9600,
            Baudrate::B19200 => 19200,
            Baudrate::B38400 => 38400,
            Baudrate::B57600 => 57600,
            Baudrate::B115200 => 115200,
            Baudrate::B230400 => 230400,
            Baudrate::B460800 => 460800,
            Baudrate::B921600 => 921600,
            Baudrate::B1382400 => 1382400,
        }
    }

    /// Unlisted rates silently become 9600, which is what the module gets told.
    pub fn from_bps_or_default(bps: u32) -> Self {
        Baudrate::try_from(bps).unwrap_or_default()
    }
}

impl Default for Baudrate {
    fn default() -> Self {
        Baudrate::B9600
    }
}

impl TryFrom<u32> for Baudrate {
    type Error = UnsupportedBaudrate;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Baudrate::ALL
            .iter()
            .copied()
            .find(|rate| rate.bps() == bps)
            .ok_or(UnsupportedBaudrate(bps))
    }
}

impl From<Baudrate> for u32 {
    fn from(rate: Baudrate) -> u32 {
        rate.bps()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtCommand<'a> {
    Probe,              // Expect "OK"
    Reset,              // Soft-reset the module
    Baud(Baudrate),     // Change the baudrate, effective after reconnecting
    Name(&'a str),      // Advertised name, at most MAX_DEVICE_NAME bytes
    Pin(&'a str),       // Pairing PIN, exactly PIN_LENGTH bytes
    Version,            // Firmware version string
}

// No terminator, the module splits commands by the pause after each one
impl fmt::Display for AtCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtCommand::Probe => f.write_str("AT"),
            AtCommand::Reset => f.write_str("AT+RESET"),
            AtCommand::Baud(rate) => write!(f, "AT+BAUD{}", rate.code()),
            AtCommand::Name(name) => write!(f, "AT+NAME{}", name),
            AtCommand::Pin(pin) => write!(f, "AT+PIN{}", pin),
            AtCommand::Version => f.write_str("AT+VERSION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_firmware_table() {
        let codes: Vec<u8> = Baudrate::ALL.iter().map(|r| r.code()).collect();
        assert_eq!(codes, (1..=12).collect::<Vec<u8>>());
    }

    #[test]
    fn lookup_by_bps() {
        assert_eq!(Baudrate::try_from(460800), Ok(Baudrate::B460800));
        assert_eq!(Baudrate::try_from(1382400), Ok(Baudrate::B1382400));
        assert_eq!(Baudrate::try_from(9601), Err(UnsupportedBaudrate(9601)));
        assert_eq!(Baudrate::try_from(0), Err(UnsupportedBaudrate(0)));
    }

    #[test]
    fn unlisted_rate_falls_back_to_9600() {
        assert_eq!(Baudrate::from_bps_or_default(9601), Baudrate::B9600);
        assert_eq!(Baudrate::from_bps_or_default(14400), Baudrate::B9600);
        assert_eq!(Baudrate::from_bps_or_default(57600), Baudrate::B57600);
    }

    #[test]
    fn commands_render_without_terminator() {
        assert_eq!(AtCommand::Probe.to_string(), "AT");
        assert_eq!(AtCommand::Reset.to_string(), "AT+RESET");
        assert_eq!(AtCommand::Version.to_string(), "AT+VERSION");
        assert_eq!(AtCommand::Baud(Baudrate::B1200).to_string(), "AT+BAUD1");
        assert_eq!(AtCommand::Baud(Baudrate::B921600).to_string(), "AT+BAUD11");
        assert_eq!(AtCommand::Name("linvor").to_string(), "AT+NAMElinvor");
        assert_eq!(AtCommand::Pin("1234").to_string(), "AT+PIN1234");
    }

    #[test]
    fn longest_command_fits_capacity() {
        let name = "n".repeat(MAX_DEVICE_NAME);
        let rendered = AtCommand::Name(&name).to_string();

        assert!(rendered.len() <= COMMAND_CAPACITY);
        assert_eq!(AtCommand::Version.to_string().len(), LONGEST_OPCODE);
    }
}
