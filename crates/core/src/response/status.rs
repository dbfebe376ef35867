//! Status words closing every APDU response

use core::fmt;

use tracing::Level;

/// Status word (SW1 SW2) ending an APDU response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord {
    /// First status byte
    pub sw1: u8,
    /// Second status byte
    pub sw2: u8,
}

/// Broad outcome announced by SW1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// `90 00`
    Success,
    /// `61 XX`: XX more response bytes are available
    MoreData,
    /// `6C XX`: the command must be resent with Le = XX
    WrongLe,
    /// `62 XX` and `63 XX`
    Warning,
    /// `64 XX` to `66 XX`
    ExecutionError,
    /// `67 XX` to `6F XX`
    CheckingError,
    /// Anything else
    Unknown,
}

impl StatusWord {
    /// Status word `90 00`
    pub const SUCCESS: Self = Self::new(0x90, 0x00);

    /// Status word `67 00`
    pub const WRONG_LENGTH: Self = Self::new(0x67, 0x00);

    /// Status word `6A 82`
    pub const FILE_NOT_FOUND: Self = Self::new(0x6A, 0x82);

    /// Status word `6D 00`
    pub const INS_NOT_SUPPORTED: Self = Self::new(0x6D, 0x00);

    /// Create a new status word
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Build from the big-endian `SW1SW2` value
    pub const fn from_u16(value: u16) -> Self {
        Self::new((value >> 8) as u8, value as u8)
    }

    /// The big-endian `SW1SW2` value
    pub const fn to_u16(&self) -> u16 {
        ((self.sw1 as u16) << 8) | self.sw2 as u16
    }

    /// Classify by SW1
    pub const fn class(&self) -> StatusClass {
        match (self.sw1, self.sw2) {
            (0x90, 0x00) => StatusClass::Success,
            (0x61, _) => StatusClass::MoreData,
            (0x6C, _) => StatusClass::WrongLe,
            (0x62 | 0x63, _) => StatusClass::Warning,
            (0x64..=0x66, _) => StatusClass::ExecutionError,
            (0x67..=0x6F, _) => StatusClass::CheckingError,
            _ => StatusClass::Unknown,
        }
    }

    /// Whether this is `90 00`
    pub const fn is_success(&self) -> bool {
        matches!(self.class(), StatusClass::Success)
    }

    /// Bytes still available when SW1 is `61`
    pub const fn remaining_bytes(&self) -> Option<u8> {
        match self.class() {
            StatusClass::MoreData => Some(self.sw2),
            _ => None,
        }
    }

    /// Level at which an exchange ending with this status is logged
    pub const fn tracing_level(&self) -> Level {
        match self.class() {
            StatusClass::Success | StatusClass::MoreData => Level::DEBUG,
            StatusClass::Warning | StatusClass::WrongLe => Level::INFO,
            _ => Level::WARN,
        }
    }

    /// Short ISO/IEC 7816-4 meaning of the status word
    pub const fn description(&self) -> &'static str {
        match self.class() {
            StatusClass::Success => "Success",
            StatusClass::MoreData => "Response continues, issue GET RESPONSE",
            StatusClass::WrongLe => "Le rejected, resend with the Le given in SW2",
            StatusClass::Warning => match (self.sw1, self.sw2) {
                (0x62, 0x82) => "Short read, file ended before Le bytes",
                (0x63, sw2) if sw2 & 0xF0 == 0xC0 => "Counter value",
                (0x62, _) => "Warning, non-volatile memory untouched",
                _ => "Warning, non-volatile memory modified",
            },
            StatusClass::ExecutionError => match self.sw1 {
                0x64 => "Execution failed, non-volatile memory untouched",
                _ => "Execution failed, non-volatile memory modified",
            },
            StatusClass::CheckingError => match (self.sw1, self.sw2) {
                (0x67, _) => "Lc or Le has the wrong length",
                (0x68, _) => "CLA function unavailable",
                (0x69, 0x82) => "Access denied by security status",
                (0x69, _) => "Command refused in the current state",
                (0x6A, 0x82) => "No such file or application",
                (0x6A, _) => "P1-P2 or data field rejected",
                (0x6B, _) => "P1-P2 out of range",
                (0x6D, _) => "INS not supported",
                (0x6E, _) => "CLA not supported",
                _ => "Checking error without diagnosis",
            },
            StatusClass::Unknown => "Unknown status word",
        }
    }
}

impl From<(u8, u8)> for StatusWord {
    fn from((sw1, sw2): (u8, u8)) -> Self {
        Self::new(sw1, sw2)
    }
}

impl From<u16> for StatusWord {
    fn from(value: u16) -> Self {
        Self::from_u16(value)
    }
}

impl From<StatusWord> for u16 {
    fn from(status: StatusWord) -> Self {
        status.to_u16()
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X}", self.sw1, self.sw2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u16_conversion() {
        let sw = StatusWord::from(0x6A82u16);
        assert_eq!(sw, StatusWord::FILE_NOT_FOUND);
        assert_eq!(u16::from(sw), 0x6A82);
        assert_eq!(sw.to_string(), "6A 82");
    }

    #[test]
    fn test_class() {
        assert_eq!(StatusWord::SUCCESS.class(), StatusClass::Success);
        assert_eq!(StatusWord::new(0x61, 0x10).class(), StatusClass::MoreData);
        assert_eq!(StatusWord::new(0x6C, 0x20).class(), StatusClass::WrongLe);
        assert_eq!(StatusWord::new(0x63, 0xC2).class(), StatusClass::Warning);
        assert_eq!(StatusWord::new(0x65, 0x81).class(), StatusClass::ExecutionError);
        assert_eq!(StatusWord::WRONG_LENGTH.class(), StatusClass::CheckingError);
        assert_eq!(StatusWord::new(0x90, 0x01).class(), StatusClass::Unknown);
    }

    #[test]
    fn test_remaining_bytes() {
        assert_eq!(StatusWord::new(0x61, 0x15).remaining_bytes(), Some(0x15));
        assert_eq!(StatusWord::SUCCESS.remaining_bytes(), None);
    }

    #[test]
    fn test_tracing_level() {
        assert_eq!(StatusWord::SUCCESS.tracing_level(), Level::DEBUG);
        assert_eq!(StatusWord::new(0x62, 0x82).tracing_level(), Level::INFO);
        assert_eq!(StatusWord::INS_NOT_SUPPORTED.tracing_level(), Level::WARN);
    }

    #[test]
    fn test_description() {
        assert_eq!(StatusWord::SUCCESS.description(), "Success");
        assert_eq!(StatusWord::new(0x63, 0xC1).description(), "Counter value");
        assert_eq!(
            StatusWord::WRONG_LENGTH.description(),
            "Lc or Le has the wrong length"
        );
        assert_eq!(StatusWord::new(0x12, 0x34).description(), "Unknown status word");
    }
}
