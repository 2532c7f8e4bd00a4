//! # WIFI bring-up
//!
//! Initializing the module and joining an access point.
//!
//! Note: A failed join is not retried. The outcome tells the reason (e.g. [Outcome::WrongPassword]),
//! retrying is left to the caller.
//!
//! ## Example
//!
//! ````
//! # use esp8266_at::example::{ExampleSerial, ExampleTimer};
//! use esp8266_at::wifi::WifiAdapter;
//! use esp8266_at::{Config, Dispatcher, Outcome, SharedSession};
//!
//! static SESSION: SharedSession = SharedSession::new();
//!
//! let serial = ExampleSerial::new(&SESSION);
//! let mut dispatcher: Dispatcher<_, _, 1_000> =
//!     Dispatcher::new(&SESSION, serial, ExampleTimer::default(), Config::default());
//!
//! // Station mode + single connection
//! dispatcher.init().unwrap();
//!
//! assert_eq!(Outcome::WrongPassword, dispatcher.join("test_wifi", "wrong").unwrap());
//! assert_eq!(Outcome::WifiConnected, dispatcher.join("test_wifi", "secret").unwrap());
//! assert_eq!(Outcome::WifiConnected, dispatcher.join_state().unwrap());
//! ````
use crate::classifier::{MultiplexMode, Outcome, WifiMode};
use crate::commands::{
    AccessPointConnectCommand, AccessPointDisconnectCommand, AccessPointQueryCommand,
    MultipleConnectionsQueryCommand, RestartCommand, SetMultipleConnectionsCommand, StartupCommand,
    VersionCommand, WifiModeCommand, WifiModeQueryCommand,
};
use crate::dispatcher::{Dispatcher, Error};
use crate::responses::READY;
use atat::heapless::String;
use core::fmt::Debug;
use embedded_io::Write;
use fugit_timer::Timer;
use log::{info, warn};

/// Wifi network adapter trait
pub trait WifiAdapter {
    /// Error when initializing the module
    type InitError: Debug;

    /// Error when joining a WIFI network
    type JoinError: Debug;

    /// Error of single commands
    type CommandError: Debug;

    /// Brings the module into station mode with a single connection
    fn init(&mut self) -> Result<(), Self::InitError>;

    /// Restarts the module and blocks until it is ready
    fn restart(&mut self) -> Result<Outcome, Self::CommandError>;

    /// Joins the given access point
    fn join(&mut self, ssid: &str, key: &str) -> Result<Outcome, Self::JoinError>;

    /// Returns whether the module is joined to an access point
    fn join_state(&mut self) -> Result<Outcome, Self::CommandError>;

    /// Leaves the current access point
    fn disconnect(&mut self) -> Result<Outcome, Self::CommandError>;

    /// Queries the firmware version. The version text may be read by `with_response()` afterwards.
    fn version(&mut self) -> Result<Outcome, Self::CommandError>;
}

/// Possible errors when initializing the module. Each step carries the unexpected outcome.
#[derive(Clone, Debug, PartialEq)]
pub enum InitError {
    /// Module did not respond to AT
    StartupFailed(Outcome),

    /// Restart failed or module did not get ready in time
    RestartFailed(Outcome),

    /// Error while setting WIFI mode to station
    ModeError(Outcome),

    /// Module is not in station mode after setting it
    ModeVerificationFailed(Outcome),

    /// Error while enabling single connection mode
    MultiplexError(Outcome),

    /// Module is not in single connection mode after setting it
    MultiplexVerificationFailed(Outcome),

    /// Protocol engine failure
    Engine(Error),
}

impl From<Error> for InitError {
    fn from(error: Error) -> Self {
        InitError::Engine(error)
    }
}

/// Possible errors when joining an access point
#[derive(Clone, Debug, PartialEq)]
pub enum JoinError {
    /// Given SSID is longer than the max. size of 32 chars
    InvalidSsidLength,

    /// Given password is longer than the max. size of 63 chars
    InvalidPasswordLength,

    /// Protocol engine failure
    Engine(Error),
}

impl From<Error> for JoinError {
    fn from(error: Error) -> Self {
        JoinError::Engine(error)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InitError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            InitError::StartupFailed(o) => defmt::write!(f, "InitError::StartupFailed({})", o),
            InitError::RestartFailed(o) => defmt::write!(f, "InitError::RestartFailed({})", o),
            InitError::ModeError(o) => defmt::write!(f, "InitError::ModeError({})", o),
            InitError::ModeVerificationFailed(o) => defmt::write!(f, "InitError::ModeVerificationFailed({})", o),
            InitError::MultiplexError(o) => defmt::write!(f, "InitError::MultiplexError({})", o),
            InitError::MultiplexVerificationFailed(o) => {
                defmt::write!(f, "InitError::MultiplexVerificationFailed({})", o)
            }
            InitError::Engine(e) => defmt::write!(f, "InitError::Engine({})", e),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for JoinError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            JoinError::InvalidSsidLength => defmt::write!(f, "JoinError::InvalidSsidLength"),
            JoinError::InvalidPasswordLength => defmt::write!(f, "JoinError::InvalidPasswordLength"),
            JoinError::Engine(e) => defmt::write!(f, "JoinError::Engine({})", e),
        }
    }
}

impl<W: Write, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const CAPACITY: usize> WifiAdapter
    for Dispatcher<'_, W, T, TIMER_HZ, CAPACITY>
{
    type InitError = InitError;
    type JoinError = JoinError;
    type CommandError = Error;

    /// Sequence:
    /// 1. Liveness check, followed by a pause as the module prints its boot log when powered on
    /// 2. Restart
    /// 3. Liveness check
    /// 4. Station mode, verified by query
    /// 5. Single connection mode, verified by query
    fn init(&mut self) -> Result<(), InitError> {
        expect(self.send(&StartupCommand)?, Outcome::Ok, InitError::StartupFailed)?;
        self.settle(self.config.settle_ms)?;

        expect(self.restart()?, Outcome::Ok, InitError::RestartFailed)?;
        expect(self.send(&StartupCommand)?, Outcome::Ok, InitError::StartupFailed)?;

        expect(self.send(&WifiModeCommand::station_mode())?, Outcome::Ok, InitError::ModeError)?;
        expect(
            self.send(&WifiModeQueryCommand)?,
            Outcome::Mode(WifiMode::Station),
            InitError::ModeVerificationFailed,
        )?;

        expect(
            self.send(&SetMultipleConnectionsCommand::single())?,
            Outcome::Ok,
            InitError::MultiplexError,
        )?;
        expect(
            self.send(&MultipleConnectionsQueryCommand)?,
            Outcome::Multiplex(MultiplexMode::Single),
            InitError::MultiplexVerificationFailed,
        )?;

        info!("Module initialized");
        Ok(())
    }

    /// Returns [Outcome::Timeout] if the ready banner was not received within the restart timeout
    fn restart(&mut self) -> Result<Outcome, Error> {
        let outcome = self.send(&RestartCommand)?;
        if outcome != Outcome::Ok {
            return Ok(outcome);
        }

        if !self.await_marker(READY, self.config.restart_timeout_ms)? {
            warn!("Module not ready within {} ms after restart", self.config.restart_timeout_ms);
            return Ok(Outcome::Timeout);
        }

        Ok(Outcome::Ok)
    }

    /// Possible outcomes: [Outcome::WifiConnected], [Outcome::ConnectionTimeout], [Outcome::WrongPassword],
    /// [Outcome::NoTarget], [Outcome::ConnectionFailed], [Outcome::Error] and [Outcome::Timeout]
    fn join(&mut self, ssid: &str, key: &str) -> Result<Outcome, JoinError> {
        Ok(self.send(&join_command(ssid, key)?)?)
    }

    fn join_state(&mut self) -> Result<Outcome, Error> {
        self.send(&AccessPointQueryCommand)
    }

    fn disconnect(&mut self) -> Result<Outcome, Error> {
        self.send(&AccessPointDisconnectCommand)
    }

    fn version(&mut self) -> Result<Outcome, Error> {
        self.send(&VersionCommand)
    }
}

/// Validates the credentials length
pub(crate) fn join_command(ssid: &str, key: &str) -> Result<AccessPointConnectCommand, JoinError> {
    if ssid.len() > 32 {
        return Err(JoinError::InvalidSsidLength);
    }

    if key.len() > 63 {
        return Err(JoinError::InvalidPasswordLength);
    }

    Ok(AccessPointConnectCommand::new(
        String::try_from(ssid).map_err(|_| JoinError::InvalidSsidLength)?,
        String::try_from(key).map_err(|_| JoinError::InvalidPasswordLength)?,
    ))
}

/// Maps an unexpected outcome of an init step to the matching error
pub(crate) fn expect(outcome: Outcome, expected: Outcome, error: fn(Outcome) -> InitError) -> Result<(), InitError> {
    if outcome != expected {
        return Err(error(outcome));
    }

    Ok(())
}
