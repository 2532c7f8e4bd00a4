//! # Protocol engine
//!
//! [Dispatcher] sends a command over the serial link, waits until the response received by
//! [Ingress](crate::ingress::Ingress) is complete and evaluates it for the sent command.
//!
//! A response is complete as soon as one of the following markers got received. The marker which
//! completed first in the stream decides:
//!
//! * `OK\r\n`: success
//! * `ERROR`: generic failure
//! * `FAIL`: operation did not complete
//! * `rst cause`: module printed its boot log
//!
//! Waiting is bounded by a timeout, after which [Outcome::Timeout] is returned.
//!
//! ## Example
//!
//! ````
//! # use esp8266_at::example::{ExampleSerial, ExampleTimer};
//! use esp8266_at::{Config, Dispatcher, Outcome, SharedSession};
//!
//! static SESSION: SharedSession = SharedSession::new();
//!
//! let serial = ExampleSerial::new(&SESSION);
//! let mut dispatcher: Dispatcher<_, _, 1_000> =
//!     Dispatcher::new(&SESSION, serial, ExampleTimer::default(), Config::default());
//!
//! assert_eq!(Outcome::Ok, dispatcher.send_command("AT\r\n").unwrap());
//! assert_eq!(Outcome::Connect, dispatcher.send_command("AT+CIPSTART=\"TCP\",\"10.0.0.1\",80\r\n").unwrap());
//! ````
use crate::classifier::{Classifier, Outcome};
use crate::config::Config;
use crate::responses::CLOSED;
use crate::session::{Session, SharedSession, DEFAULT_BUFFER_SIZE};
use atat::AtatCmd;
use embedded_io::{Error as IoError, ErrorKind, Write};
use fugit::TimerDurationU32;
use fugit_timer::Timer;
use log::{debug, trace, warn};

/// Max. length of an encoded typed command
pub const COMMAND_SIZE: usize = 256;

/// Protocol engine errors
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Writing to the serial link failed
    Transmit(ErrorKind),

    /// More data was received than fits into the response buffer. Received data is incomplete.
    BufferOverflow,

    /// Encoded command is longer than [COMMAND_SIZE]
    CommandTooLong,

    /// Encoded command is not valid UTF-8
    InvalidCommand,

    /// Upstream timer error
    TimerError,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Transmit(e) => defmt::write!(f, "Error::Transmit({})", e),
            Error::BufferOverflow => defmt::write!(f, "Error::BufferOverflow"),
            Error::CommandTooLong => defmt::write!(f, "Error::CommandTooLong"),
            Error::InvalidCommand => defmt::write!(f, "Error::InvalidCommand"),
            Error::TimerError => defmt::write!(f, "Error::TimerError"),
        }
    }
}

/// Blocking protocol engine
///
/// TIMER_HZ: Frequency of the timer used for timeout measurement. Timeouts exceeding `u32::MAX` ticks
/// are waited out as consecutive timer periods.
///
/// CAPACITY: Size of the response buffer in bytes
pub struct Dispatcher<'a, W: Write, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const CAPACITY: usize = DEFAULT_BUFFER_SIZE>
{
    /// State shared with the receive interrupt
    pub(crate) session: &'a SharedSession<CAPACITY>,

    /// Serial link to the module
    pub(crate) serial: W,

    /// Timer used for timeout measurement
    pub(crate) timer: T,

    classifier: Classifier,

    pub(crate) config: Config,
}

impl<'a, W: Write, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const CAPACITY: usize>
    Dispatcher<'a, W, T, TIMER_HZ, CAPACITY>
{
    pub fn new(session: &'a SharedSession<CAPACITY>, serial: W, timer: T, config: Config) -> Self {
        Self {
            session,
            serial,
            timer,
            classifier: Classifier::new(),
            config,
        }
    }

    /// Sends the command text verbatim and returns the evaluated response.
    /// Waits at most for the configured command timeout.
    pub fn send_command(&mut self, command: &str) -> Result<Outcome, Error> {
        self.dispatch(command, self.config.command_timeout_ms)
    }

    /// Encodes and sends a typed command. Waits at most for the timeout of the command.
    pub fn send<Cmd: AtatCmd>(&mut self, command: &Cmd) -> Result<Outcome, Error> {
        let mut buffer = [0x0; COMMAND_SIZE];
        let text = encode(command, &mut buffer)?;
        self.dispatch(text, Cmd::MAX_TIMEOUT_MS)
    }

    /// Transmits raw payload data after a send command was acknowledged. Waits until the remote side
    /// closed the connection.
    ///
    /// Nothing is transmitted and [Outcome::Error] is returned if the previous exchange failed.
    pub fn send_payload(&mut self, payload: &[u8]) -> Result<Outcome, Error> {
        let aborted = self.session.lock(|session| {
            if session.flags().any() {
                return true;
            }

            session.clear_buffer();
            false
        });

        if aborted {
            warn!("Previous exchange failed, payload of {} bytes not sent", payload.len());
            return Ok(Outcome::Error);
        }

        self.transmit(payload)?;

        match self.await_condition(self.config.data_timeout_ms, |session| session.scan_for(CLOSED).then_some(()))? {
            Some(_) => Ok(Outcome::Closed),
            None => {
                warn!("Connection not closed within {} ms", self.config.data_timeout_ms);
                Ok(Outcome::Timeout)
            }
        }
    }

    /// Runs the closure with the raw response of the last exchange
    pub fn with_response<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        self.session.lock(|session| f(session.buffer().as_bytes()))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Full exchange: reset, transmit, wait, classify
    fn dispatch(&mut self, command: &str, timeout_ms: u32) -> Result<Outcome, Error> {
        let identity = self.classifier.classify(command);
        debug!("Sending {:?} command", identity);

        self.session.lock(|session| session.reset());
        self.transmit(command.as_bytes())?;

        let Some(termination) = self.await_condition(timeout_ms, |session| session.poll_termination())? else {
            warn!("{:?} command not terminated within {} ms", identity, timeout_ms);
            return Ok(Outcome::Timeout);
        };
        trace!("{:?} command terminated by {:?}", identity, termination);

        let outcome = self.session.lock(|session| Classifier::outcome(identity, session));
        debug!("{:?} command => {}", identity, outcome);
        Ok(outcome)
    }

    /// Blocks until the marker got received. Returns false on timeout.
    /// The buffer is not reset, so data received by the previous exchange is taken into account.
    pub(crate) fn await_marker(&mut self, marker: &[u8], timeout_ms: u32) -> Result<bool, Error> {
        let found = self.await_condition(timeout_ms, |session| session.scan_for(marker).then_some(()))?;
        Ok(found.is_some())
    }

    /// Blocks for the given duration
    pub(crate) fn settle(&mut self, duration_ms: u32) -> Result<(), Error> {
        for period in Periods::<TIMER_HZ>::new(duration_ms) {
            self.timer.start(period).map_err(|_| Error::TimerError)?;
            nb::block!(self.timer.wait()).map_err(|_| Error::TimerError)?;
        }

        Ok(())
    }

    /// Polls the session until the condition is met or the timeout elapsed
    fn await_condition<R>(
        &mut self,
        timeout_ms: u32,
        mut condition: impl FnMut(&mut Session<CAPACITY>) -> Option<R>,
    ) -> Result<Option<R>, Error> {
        for period in Periods::<TIMER_HZ>::new(timeout_ms) {
            self.timer.start(period).map_err(|_| Error::TimerError)?;

            loop {
                let state = self.session.lock(|session| {
                    if session.overflowed() {
                        return Err(Error::BufferOverflow);
                    }

                    Ok(condition(session))
                })?;

                if state.is_some() {
                    return Ok(state);
                }

                match self.timer.wait() {
                    Ok(_) => break,
                    Err(error) => match error {
                        nb::Error::Other(_) => return Err(Error::TimerError),
                        nb::Error::WouldBlock => {}
                    },
                }
            }
        }

        Ok(None)
    }

    fn transmit(&mut self, data: &[u8]) -> Result<(), Error> {
        self.serial.write_all(data).map_err(|e| Error::Transmit(e.kind()))?;
        self.serial.flush().map_err(|e| Error::Transmit(e.kind()))
    }
}

/// Splits a timeout into timer periods, as a single period is limited to `u32::MAX` ticks.
///
/// Zero timeouts still yield one empty period, so the condition is checked at least once.
pub(crate) struct Periods<const TIMER_HZ: u32> {
    remaining: u64,
    started: bool,
}

impl<const TIMER_HZ: u32> Periods<TIMER_HZ> {
    pub(crate) fn new(timeout_ms: u32) -> Self {
        Self {
            remaining: u64::from(timeout_ms) * u64::from(TIMER_HZ) / 1_000,
            started: false,
        }
    }
}

impl<const TIMER_HZ: u32> Iterator for Periods<TIMER_HZ> {
    type Item = TimerDurationU32<TIMER_HZ>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.started && self.remaining == 0 {
            return None;
        }
        self.started = true;

        let ticks = u32::try_from(self.remaining).unwrap_or(u32::MAX);
        self.remaining -= u64::from(ticks);
        Some(TimerDurationU32::from_ticks(ticks))
    }
}

/// Encodes the command into the given buffer
pub(crate) fn encode<'b, Cmd: AtatCmd>(command: &Cmd, buffer: &'b mut [u8]) -> Result<&'b str, Error> {
    if Cmd::MAX_LEN > buffer.len() {
        return Err(Error::CommandTooLong);
    }

    let length = command.write(buffer);
    core::str::from_utf8(&buffer[..length]).map_err(|_| Error::InvalidCommand)
}
