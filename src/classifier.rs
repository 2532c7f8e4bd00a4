//! # Command classifier
//!
//! Maps the text of a sent command to a [CommandIdentity] and evaluates the received response for
//! that identity. Commands with a variable suffix (credentials, remote host, payload length) are
//! reduced to their fixed prefix first, so e.g. every `AT+CWJAP="..","..."` is classified as
//! [CommandIdentity::JoinAccessPoint].
//!
//! ````
//! use esp8266_at::{Classifier, CommandIdentity};
//!
//! let classifier = Classifier::new();
//! assert_eq!(CommandIdentity::Startup, classifier.classify("AT\r\n"));
//! assert_eq!(CommandIdentity::JoinAccessPoint, classifier.classify("AT+CWJAP=\"wifi\",\"secret\"\r\n"));
//! assert_eq!(CommandIdentity::Unimplemented, classifier.classify("AT+CIPCLOSE=0\r\n"));
//! ````
use crate::responses::{
    CIPMUX_MULTIPLE, CIPMUX_SINGLE, CWJAP_CONNECTION_FAILED, CWJAP_NO_TARGET, CWJAP_TIMEOUT,
    CWJAP_WRONG_PASSWORD, CWMODE_SOFT_AP, CWMODE_SOFT_AP_STATION, CWMODE_STATION, NO_AP,
};
use crate::session::Session;
use core::fmt;
use heapless::FnvIndexMap;

/// Symbolic kind of a sent command
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommandIdentity {
    /// AT
    Startup,
    /// AT+RST
    Restart,
    /// AT+GMR
    Version,
    /// AT+CWMODE=1
    SetStationMode,
    /// AT+CWMODE_CUR?
    QueryMode,
    /// AT+CWJAP?
    QueryAccessPoint,
    /// AT+CWJAP="<ssid>","<pwd>"
    JoinAccessPoint,
    /// AT+CWQAP
    QuitAccessPoint,
    /// AT+CIPMUX=0
    SetSingleConnection,
    /// AT+CIPMUX?
    QueryMultiplex,
    /// AT+CIPSTART="<type>","<host>",<port>
    StartConnection,
    /// AT+CIPSEND=<length>
    Send,
    /// Any other command text
    Unimplemented,
}

/// WIFI mode reported by AT+CWMODE_CUR?
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WifiMode {
    Station,
    SoftAp,
    SoftApStation,
}

/// Connection mode reported by AT+CIPMUX?
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MultiplexMode {
    Single,
    Multiple,
}

/// Final result of one command/response exchange
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Error,
    /// Response did not contain any known value
    Unknown,
    /// Command is not known to the classifier
    NotImplemented,
    /// No terminating condition was received in time
    Timeout,
    WifiConnected,
    WifiDisconnected,
    /// Joining the access point timed out on the module
    ConnectionTimeout,
    WrongPassword,
    /// Access point was not found
    NoTarget,
    ConnectionFailed,
    Connect,
    SendOk,
    Closed,
    Mode(WifiMode),
    Multiplex(MultiplexMode),
}

impl Outcome {
    /// Textual form of the outcome as printed by the module
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "OK",
            Outcome::Error => "ERROR",
            Outcome::Unknown => "UNKNOWN",
            Outcome::NotImplemented => "NOT IMPLEMENTED",
            Outcome::Timeout => "TIMEOUT",
            Outcome::WifiConnected => "WIFI CONNECTED",
            Outcome::WifiDisconnected => "WIFI DISCONNECTED",
            Outcome::ConnectionTimeout => "connection timeout",
            Outcome::WrongPassword => "wrong password",
            Outcome::NoTarget => "cannot find AP",
            Outcome::ConnectionFailed => "connection failed",
            Outcome::Connect => "CONNECT",
            Outcome::SendOk => "SEND OK",
            Outcome::Closed => "CLOSED",
            Outcome::Mode(WifiMode::Station) => "CWMODE_CUR:1",
            Outcome::Mode(WifiMode::SoftAp) => "CWMODE_CUR:2",
            Outcome::Mode(WifiMode::SoftApStation) => "CWMODE_CUR:3",
            Outcome::Multiplex(MultiplexMode::Single) => "CIPMUX:0",
            Outcome::Multiplex(MultiplexMode::Multiple) => "CIPMUX:1",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Outcome {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CommandIdentity {
    fn format(&self, f: defmt::Formatter) {
        match self {
            CommandIdentity::Startup => defmt::write!(f, "Startup"),
            CommandIdentity::Restart => defmt::write!(f, "Restart"),
            CommandIdentity::Version => defmt::write!(f, "Version"),
            CommandIdentity::SetStationMode => defmt::write!(f, "SetStationMode"),
            CommandIdentity::QueryMode => defmt::write!(f, "QueryMode"),
            CommandIdentity::QueryAccessPoint => defmt::write!(f, "QueryAccessPoint"),
            CommandIdentity::JoinAccessPoint => defmt::write!(f, "JoinAccessPoint"),
            CommandIdentity::QuitAccessPoint => defmt::write!(f, "QuitAccessPoint"),
            CommandIdentity::SetSingleConnection => defmt::write!(f, "SetSingleConnection"),
            CommandIdentity::QueryMultiplex => defmt::write!(f, "QueryMultiplex"),
            CommandIdentity::StartConnection => defmt::write!(f, "StartConnection"),
            CommandIdentity::Send => defmt::write!(f, "Send"),
            CommandIdentity::Unimplemented => defmt::write!(f, "Unimplemented"),
        }
    }
}

/// Prefixes of commands carrying variable parameters
const PARAMETERIZED_PREFIXES: [&str; 3] = ["AT+CWJAP=", "AT+CIPSTART=", "AT+CIPSEND="];

/// Canonical command texts and their identity
const COMMAND_TABLE: [(&str, CommandIdentity); 12] = [
    ("AT", CommandIdentity::Startup),
    ("AT+RST", CommandIdentity::Restart),
    ("AT+GMR", CommandIdentity::Version),
    ("AT+CWMODE=1", CommandIdentity::SetStationMode),
    ("AT+CWMODE_CUR?", CommandIdentity::QueryMode),
    ("AT+CWJAP?", CommandIdentity::QueryAccessPoint),
    ("AT+CWJAP=", CommandIdentity::JoinAccessPoint),
    ("AT+CWQAP", CommandIdentity::QuitAccessPoint),
    ("AT+CIPMUX=0", CommandIdentity::SetSingleConnection),
    ("AT+CIPMUX?", CommandIdentity::QueryMultiplex),
    ("AT+CIPSTART=", CommandIdentity::StartConnection),
    ("AT+CIPSEND=", CommandIdentity::Send),
];

const TABLE_SIZE: usize = 16;
const _: () = assert!(COMMAND_TABLE.len() <= TABLE_SIZE);

/// Lookup table from canonical command text to [CommandIdentity]
pub struct Classifier {
    table: FnvIndexMap<&'static str, CommandIdentity, TABLE_SIZE>,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            table: COMMAND_TABLE.into_iter().collect(),
        }
    }

    /// Reduces a command text to the key used for classification
    pub fn canonicalize(text: &str) -> &str {
        if let Some(prefix) = PARAMETERIZED_PREFIXES.into_iter().find(|prefix| text.starts_with(prefix)) {
            return prefix;
        }

        text.strip_suffix("\r\n").unwrap_or(text)
    }

    /// Returns the identity of the given command text
    pub fn classify(&self, text: &str) -> CommandIdentity {
        self.table
            .get(Self::canonicalize(text))
            .copied()
            .unwrap_or(CommandIdentity::Unimplemented)
    }

    /// Evaluates the terminated session for the given command
    pub fn outcome<const CAPACITY: usize>(identity: CommandIdentity, session: &Session<CAPACITY>) -> Outcome {
        let failed = session.flags().any();

        match identity {
            CommandIdentity::Startup
            | CommandIdentity::Version
            | CommandIdentity::Restart
            | CommandIdentity::SetStationMode
            | CommandIdentity::SetSingleConnection
            | CommandIdentity::QuitAccessPoint => {
                if failed {
                    return Outcome::Error;
                }

                Outcome::Ok
            }
            CommandIdentity::QueryMode => {
                if failed {
                    return Outcome::Error;
                }

                Self::first_match(
                    session,
                    &[
                        (CWMODE_STATION, Outcome::Mode(WifiMode::Station)),
                        (CWMODE_SOFT_AP, Outcome::Mode(WifiMode::SoftAp)),
                        (CWMODE_SOFT_AP_STATION, Outcome::Mode(WifiMode::SoftApStation)),
                    ],
                    Outcome::Unknown,
                )
            }
            CommandIdentity::QueryMultiplex => {
                if failed {
                    return Outcome::Error;
                }

                Self::first_match(
                    session,
                    &[
                        (CIPMUX_SINGLE, Outcome::Multiplex(MultiplexMode::Single)),
                        (CIPMUX_MULTIPLE, Outcome::Multiplex(MultiplexMode::Multiple)),
                    ],
                    Outcome::Unknown,
                )
            }
            CommandIdentity::QueryAccessPoint => {
                if failed {
                    return Outcome::Error;
                }

                if session.scan_for(NO_AP) {
                    return Outcome::WifiDisconnected;
                }

                Outcome::WifiConnected
            }
            CommandIdentity::JoinAccessPoint => {
                // Module only terminates without error marker on an actual connection
                if !failed {
                    return Outcome::WifiConnected;
                }

                Self::first_match(
                    session,
                    &[
                        (CWJAP_TIMEOUT, Outcome::ConnectionTimeout),
                        (CWJAP_WRONG_PASSWORD, Outcome::WrongPassword),
                        (CWJAP_NO_TARGET, Outcome::NoTarget),
                        (CWJAP_CONNECTION_FAILED, Outcome::ConnectionFailed),
                    ],
                    Outcome::Error,
                )
            }
            CommandIdentity::StartConnection => {
                if failed {
                    return Outcome::Error;
                }

                Outcome::Connect
            }
            CommandIdentity::Send => {
                if failed {
                    return Outcome::Error;
                }

                Outcome::SendOk
            }
            CommandIdentity::Unimplemented => Outcome::NotImplemented,
        }
    }

    /// Returns the outcome of the first marker contained in the response
    fn first_match<const CAPACITY: usize>(
        session: &Session<CAPACITY>,
        candidates: &[(&[u8], Outcome)],
        fallback: Outcome,
    ) -> Outcome {
        candidates
            .iter()
            .find(|(marker, _)| session.scan_for(marker))
            .map(|(_, outcome)| *outcome)
            .unwrap_or(fallback)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
