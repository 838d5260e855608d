//! AT commands used by the logger. Each command encodes itself including the CR+LF line terminator.
use crate::responses::NoResponse;
use atat::atat_derive::AtatCmd;
use atat::heapless::String;
use atat::{AtatCmd, Error as AtError, InternalError};

/// Max. SSID length in bytes
pub const MAX_SSID_LEN: usize = 32;

/// Max. password length in bytes
pub const MAX_PASSWORD_LEN: usize = 64;

/// Max. host name length in bytes
pub const MAX_HOST_LEN: usize = 128;

/// Restores the factory default settings
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+RESTORE", NoResponse)]
pub struct RestoreCommand {}

impl RestoreCommand {
    pub fn new() -> Self {
        Self {}
    }
}

/// Sets the WIFI mode
#[derive(Clone, AtatCmd)]
#[at_cmd("+CWMODE", NoResponse)]
pub struct WifiModeCommand {
    /// WIFI mode:
    ///     0: Null mode. Wi-Fi RF will be disabled.
    ///     1: Station mode.
    ///     2: SoftAP mode.
    ///     3: SoftAP+Station mode.
    #[at_arg(position = 0)]
    mode: usize,
}

impl WifiModeCommand {
    pub fn station_mode() -> Self {
        Self { mode: 1 }
    }
}

/// Soft reset of the module
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+RST", NoResponse)]
pub struct RestartCommand {}

impl RestartCommand {
    pub fn new() -> Self {
        Self {}
    }
}

/// Command for connecting to the target WIFI access point
#[derive(Clone, AtatCmd)]
#[at_cmd("+CWJAP", NoResponse)]
pub struct AccessPointConnectCommand {
    /// The SSID of the target access point
    #[at_arg(position = 0)]
    ssid: String<MAX_SSID_LEN>,

    /// The password/key of the target access point
    #[at_arg(position = 1)]
    password: String<MAX_PASSWORD_LEN>,
}

impl AccessPointConnectCommand {
    /// Returns None if SSID or password exceed the max. length
    pub fn new(ssid: &str, password: &str) -> Option<Self> {
        Some(Self {
            ssid: bounded(ssid)?,
            password: bounded(password)?,
        })
    }
}

/// Establishes a TCP connection
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSTART", NoResponse)]
pub struct ConnectCommand {
    /// Connection type, just TCP is used
    #[at_arg(position = 0)]
    connection_type: String<5>,

    /// Remote host name or IP address
    #[at_arg(position = 1)]
    remote_host: String<MAX_HOST_LEN>,

    /// Remote port
    #[at_arg(position = 2)]
    port: u16,
}

impl ConnectCommand {
    /// Returns None if the host name exceeds the max. length
    pub fn tcp(host: &str, port: u16) -> Option<Self> {
        Some(Self {
            connection_type: bounded("TCP")?,
            remote_host: bounded(host)?,
            port,
        })
    }
}

/// Announces the length of the following transmission
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSEND", NoResponse)]
pub struct TransmissionPrepareCommand {
    /// Byte count of the following data, including its line terminator
    #[at_arg(position = 0)]
    length: usize,
}

impl TransmissionPrepareCommand {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

/// Literal line which is sent verbatim, e.g. the upload payload.
///
/// LEN: Max. line length in bytes, excluding the line terminator
#[derive(Clone, Debug)]
pub struct RawCommand<'a, const LEN: usize> {
    line: &'a str,
}

impl<'a, const LEN: usize> RawCommand<'a, LEN> {
    /// Returns None if the line exceeds LEN bytes
    pub fn new(line: &'a str) -> Option<Self> {
        if line.len() > LEN {
            return None;
        }

        Some(Self { line })
    }
}

impl<const LEN: usize> AtatCmd for RawCommand<'_, LEN> {
    type Response = NoResponse;

    const MAX_LEN: usize = LEN + 2;

    fn write(&self, buf: &mut [u8]) -> usize {
        let length = self.line.len();
        buf[..length].copy_from_slice(self.line.as_bytes());
        buf[length..length + 2].copy_from_slice(b"\r\n");
        length + 2
    }

    fn parse(&self, resp: Result<&[u8], InternalError>) -> Result<Self::Response, AtError> {
        match resp {
            Ok(_) => Ok(NoResponse),
            Err(_) => Err(AtError::Parse),
        }
    }
}

/// Copies the given text to a bounded string. Returns None if the capacity is exceeded.
fn bounded<const N: usize>(text: &str) -> Option<String<N>> {
    let mut string = String::new();
    string.push_str(text).ok()?;
    Some(string)
}
