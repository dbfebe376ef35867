//! Command line description of an APDU command

use clap::Args;
use scard_apdu_core::ApduCommand;
use scard_apdu_core::constants::HEADER_LEN;

/// An APDU command given on the command line
#[derive(Args, Debug, Clone)]
pub(crate) struct ApduArgs {
    /// CLA INS P1 P2 as 4 hex bytes (e.g. 00A40400)
    #[arg(value_parser = parse_header)]
    header: [u8; HEADER_LEN],

    /// Command data in hex
    #[arg(short, long, value_parser = parse_hex)]
    data: Option<HexBytes>,

    /// Expected response length, short encoding when it fits
    #[arg(long, conflicts_with = "extended_le")]
    le: Option<u32>,

    /// Expected response length, always extended encoding
    #[arg(long)]
    extended_le: Option<u32>,
}

impl ApduArgs {
    /// Build the command
    pub(crate) fn to_command(&self) -> ApduCommand {
        let [cla, ins, p1, p2] = self.header;
        let mut command = ApduCommand::new(cla, ins, p1, p2);
        if let Some(HexBytes(data)) = &self.data {
            command = command.with_data(data.clone());
        }
        match (self.le, self.extended_le) {
            (Some(le), _) => command.with_le(le),
            (None, Some(le)) => command.with_extended_le(le),
            (None, None) => command,
        }
    }
}

/// Bytes given in hex on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HexBytes(pub(crate) Vec<u8>);

/// Parse a hex string, ignoring spaces
pub(crate) fn parse_hex(s: &str) -> Result<HexBytes, hex::FromHexError> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(compact).map(HexBytes)
}

fn parse_header(s: &str) -> Result<[u8; HEADER_LEN], String> {
    let HexBytes(bytes) = parse_hex(s).map_err(|e| e.to_string())?;
    <[u8; HEADER_LEN]>::try_from(bytes)
        .map_err(|bytes| format!("header must be {HEADER_LEN} bytes, got {}", bytes.len()))
}
