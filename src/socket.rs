//! # Single connection client
//!
//! Opening a TCP, UDP or SSL connection and transferring data over it. Only single connection mode
//! is supported, so the module needs to be initialized by [init](crate::wifi::WifiAdapter::init).
//!
//! ## Example
//!
//! ````
//! # use esp8266_at::example::{ExampleSerial, ExampleTimer};
//! use esp8266_at::commands::ConnectionType;
//! use esp8266_at::http::Method;
//! use esp8266_at::{Config, Dispatcher, Outcome, SharedSession};
//!
//! static SESSION: SharedSession = SharedSession::new();
//!
//! let serial = ExampleSerial::new(&SESSION);
//! let mut dispatcher: Dispatcher<_, _, 1_000> =
//!     Dispatcher::new(&SESSION, serial, ExampleTimer::default(), Config::default());
//!
//! assert_eq!(Outcome::Connect, dispatcher.connect(ConnectionType::Tcp, "10.0.0.1", 80).unwrap());
//! assert_eq!(Outcome::Closed, dispatcher.request(Method::Get, "10.0.0.1", "/").unwrap());
//!
//! // Server response
//! assert!(dispatcher.with_response(|data| data.windows(6).any(|w| w == b"200 OK")));
//! ````
use crate::classifier::Outcome;
use crate::commands::{ConnectCommand, ConnectionType, TransmissionPrepareCommand};
use crate::dispatcher::{Dispatcher, Error};
use crate::http::{HttpError, Method, Request};
use atat::heapless::String;
use embedded_io::Write;
use fugit_timer::Timer;

/// Max. payload length of a single transfer
pub const MAX_PAYLOAD_SIZE: usize = 2048;

/// Max. length of the remote host name or address
pub const MAX_HOST_LENGTH: usize = 64;

/// Max. length of a rendered HTTP request
pub const REQUEST_SIZE: usize = 512;

/// Connection related errors
#[derive(Clone, Debug, PartialEq)]
pub enum SocketError {
    /// Remote host is longer than 64 chars
    InvalidHostLength,

    /// Payload exceeds [MAX_PAYLOAD_SIZE]
    PayloadTooLong,

    /// Building the HTTP request failed
    Http(HttpError),

    /// Protocol engine failure
    Engine(Error),
}

impl From<Error> for SocketError {
    fn from(error: Error) -> Self {
        SocketError::Engine(error)
    }
}

impl From<HttpError> for SocketError {
    fn from(error: HttpError) -> Self {
        SocketError::Http(error)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SocketError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            SocketError::InvalidHostLength => defmt::write!(f, "SocketError::InvalidHostLength"),
            SocketError::PayloadTooLong => defmt::write!(f, "SocketError::PayloadTooLong"),
            SocketError::Http(e) => defmt::write!(f, "SocketError::Http({})", e),
            SocketError::Engine(e) => defmt::write!(f, "SocketError::Engine({})", e),
        }
    }
}

impl<W: Write, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const CAPACITY: usize> Dispatcher<'_, W, T, TIMER_HZ, CAPACITY> {
    /// Opens a connection to the given host, which may be an IP address or a domain name.
    /// Returns [Outcome::Connect] on success.
    pub fn connect(&mut self, connection_type: ConnectionType, host: &str, port: u16) -> Result<Outcome, SocketError> {
        Ok(self.send(&connect_command(connection_type, host, port)?)?)
    }

    /// Announces the payload length and transmits the payload afterwards.
    ///
    /// If the module does not acknowledge the announcement, its outcome is returned and no payload is
    /// sent. Otherwise returns [Outcome::Closed] once the remote side closed the connection.
    pub fn send_data(&mut self, payload: &[u8]) -> Result<Outcome, SocketError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(SocketError::PayloadTooLong);
        }

        let outcome = self.send(&TransmissionPrepareCommand::new(payload.len()))?;
        if outcome != Outcome::SendOk {
            return Ok(outcome);
        }

        Ok(self.send_payload(payload)?)
    }

    /// Sends a HTTP request over the open connection, which is closed by the server after responding
    pub fn request(&mut self, method: Method, host: &str, uri: &str) -> Result<Outcome, SocketError> {
        let request = Request::new(method, host, uri).render::<REQUEST_SIZE>()?;
        self.send_data(request.as_bytes())
    }
}

pub(crate) fn connect_command(
    connection_type: ConnectionType,
    host: &str,
    port: u16,
) -> Result<ConnectCommand, SocketError> {
    if host.len() > MAX_HOST_LENGTH {
        return Err(SocketError::InvalidHostLength);
    }

    let host = String::try_from(host).map_err(|_| SocketError::InvalidHostLength)?;
    Ok(ConnectCommand::new(connection_type, host, port))
}
