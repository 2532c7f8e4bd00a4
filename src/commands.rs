//! # AT commands
//!
//! Typed versions of all command texts known to the [Classifier](crate::classifier::Classifier).
//! Encoding is done by the [AtatCmd] derive, each command carries its own response timeout.
//!
//! ````
//! use atat::AtatCmd;
//! use esp8266_at::commands::WifiModeCommand;
//!
//! let mut buffer = [0x0; 32];
//! let length = WifiModeCommand::station_mode().write(&mut buffer);
//! assert_eq!(b"AT+CWMODE=1\r\n", &buffer[..length]);
//! ````
use crate::responses::NoResponse;
use atat::atat_derive::AtatCmd;
use atat::heapless::String;

/// Tests AT startup
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("", NoResponse, timeout_ms = 1_000)]
pub struct StartupCommand;

/// Restarts the module
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+RST", NoResponse, timeout_ms = 2_000)]
pub struct RestartCommand;

/// Checks version information
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+GMR", NoResponse, timeout_ms = 1_000)]
pub struct VersionCommand;

/// Sets the WIFI mode. Setting is not stored in flash and needs to be repeated after a restart.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CWMODE", NoResponse, timeout_ms = 1_000)]
pub struct WifiModeCommand {
    /// WIFI mode:
    ///     1: Station mode.
    ///     2: SoftAP mode.
    ///     3: SoftAP+Station mode.
    #[at_arg(position = 0)]
    mode: usize,
}

impl WifiModeCommand {
    /// Module works as client
    pub fn station_mode() -> Self {
        Self { mode: 1 }
    }
}

/// Queries the current WIFI mode
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CWMODE_CUR?", NoResponse, timeout_ms = 1_000)]
pub struct WifiModeQueryCommand;

/// Joins the given access point. Needs station mode to be enabled.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CWJAP", NoResponse, timeout_ms = 20_000)]
pub struct AccessPointConnectCommand {
    /// The SSID of the target access point
    #[at_arg(position = 0)]
    ssid: String<32>,

    /// The password/key of the target access point
    #[at_arg(position = 1)]
    password: String<64>,
}

impl AccessPointConnectCommand {
    pub fn new(ssid: String<32>, password: String<64>) -> Self {
        Self { ssid, password }
    }
}

/// Queries the access point the module is joined to
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CWJAP?", NoResponse, timeout_ms = 1_000)]
pub struct AccessPointQueryCommand;

/// Disconnects from the current access point
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CWQAP", NoResponse, timeout_ms = 1_000)]
pub struct AccessPointDisconnectCommand;

/// Enables/Disables multiple connections
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPMUX", NoResponse, timeout_ms = 1_000)]
pub struct SetMultipleConnectionsCommand {
    /// 0: single connection, 1: multiple connections
    mode: usize,
}

impl SetMultipleConnectionsCommand {
    /// Just one connection at a time
    pub fn single() -> Self {
        Self { mode: 0 }
    }
}

/// Queries the connection mode
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CIPMUX?", NoResponse, timeout_ms = 1_000)]
pub struct MultipleConnectionsQueryCommand;

/// Transport protocol of a connection
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectionType {
    Tcp,
    Udp,
    Ssl,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Tcp => "TCP",
            ConnectionType::Udp => "UDP",
            ConnectionType::Ssl => "SSL",
        }
    }
}

/// Establishes a TCP connection, UDP transmission or SSL connection. Assumes single connection mode.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSTART", NoResponse, timeout_ms = 10_000, attempts = 1)]
pub struct ConnectCommand {
    /// TCP, UDP or SSL
    connection_type: String<3>,

    /// Remote IP address or domain name
    remote_host: String<64>,

    /// Remote port
    port: u16,
}

impl ConnectCommand {
    pub fn new(connection_type: ConnectionType, remote_host: String<64>, port: u16) -> Self {
        let mut kind = String::new();
        // Every connection type has exactly three characters
        let _ = kind.push_str(connection_type.as_str());

        Self {
            connection_type: kind,
            remote_host,
            port,
        }
    }
}

/// Announces the length of the payload which follows the command
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSEND", NoResponse, timeout_ms = 5_000)]
pub struct TransmissionPrepareCommand {
    /// Payload length in bytes
    length: usize,
}

impl TransmissionPrepareCommand {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}
