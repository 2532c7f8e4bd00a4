use crate::classifier::{Classifier, Outcome};
use crate::config::Config;
use crate::dispatcher::{encode, Error, COMMAND_SIZE};
use crate::responses::CLOSED;
use crate::session::{Session, SharedSession, DEFAULT_BUFFER_SIZE};
use atat::AtatCmd;
use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use embassy_time::{Duration, Timer};
use embedded_io::Error as IoError;
use embedded_io_async::Write;
use log::{debug, trace, warn};

/// Async protocol engine
///
/// ````
/// # use esp8266_at::example::ExampleSerial;
/// use esp8266_at::asynch::Dispatcher;
/// use esp8266_at::{Config, Outcome, SharedSession};
///
/// static SESSION: SharedSession = SharedSession::new();
///
/// let mut dispatcher = Dispatcher::new(&SESSION, ExampleSerial::new(&SESSION), Config::default());
///
/// embassy_futures::block_on(async {
///     assert_eq!(Outcome::Ok, dispatcher.send_command("AT\r\n").await.unwrap());
/// });
/// ````
pub struct Dispatcher<'a, W: Write, const CAPACITY: usize = DEFAULT_BUFFER_SIZE> {
    /// State shared with the receive interrupt
    pub(crate) session: &'a SharedSession<CAPACITY>,

    /// Serial link to the module
    pub(crate) serial: W,

    classifier: Classifier,

    pub(crate) config: Config,
}

impl<'a, W: Write, const CAPACITY: usize> Dispatcher<'a, W, CAPACITY> {
    pub fn new(session: &'a SharedSession<CAPACITY>, serial: W, config: Config) -> Self {
        Self {
            session,
            serial,
            classifier: Classifier::new(),
            config,
        }
    }

    /// Sends the command text verbatim and returns the evaluated response.
    /// Waits at most for the configured command timeout.
    pub async fn send_command(&mut self, command: &str) -> Result<Outcome, Error> {
        self.dispatch(command, self.config.command_timeout_ms).await
    }

    /// Encodes and sends a typed command. Waits at most for the timeout of the command.
    pub async fn send<Cmd: AtatCmd>(&mut self, command: &Cmd) -> Result<Outcome, Error> {
        let mut buffer = [0x0; COMMAND_SIZE];
        let text = encode(command, &mut buffer)?;
        self.dispatch(text, Cmd::MAX_TIMEOUT_MS).await
    }

    /// Transmits raw payload data after a send command was acknowledged. Waits until the remote side
    /// closed the connection.
    ///
    /// Nothing is transmitted and [Outcome::Error] is returned if the previous exchange failed.
    pub async fn send_payload(&mut self, payload: &[u8]) -> Result<Outcome, Error> {
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

        self.transmit(payload).await?;

        let timeout_ms = self.config.data_timeout_ms;
        match self
            .await_condition(timeout_ms, |session| session.scan_for(CLOSED).then_some(()))
            .await?
        {
            Some(_) => Ok(Outcome::Closed),
            None => {
                warn!("Connection not closed within {} ms", timeout_ms);
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

    async fn dispatch(&mut self, command: &str, timeout_ms: u32) -> Result<Outcome, Error> {
        let identity = self.classifier.classify(command);
        debug!("Sending {:?} command", identity);

        self.session.lock(|session| session.reset());
        self.transmit(command.as_bytes()).await?;

        let Some(termination) = self
            .await_condition(timeout_ms, |session| session.poll_termination())
            .await?
        else {
            warn!("{:?} command not terminated within {} ms", identity, timeout_ms);
            return Ok(Outcome::Timeout);
        };
        trace!("{:?} command terminated by {:?}", identity, termination);

        let outcome = self.session.lock(|session| Classifier::outcome(identity, session));
        debug!("{:?} command => {}", identity, outcome);
        Ok(outcome)
    }

    /// Waits until the marker got received. Returns false on timeout.
    /// The buffer is not reset, so data received by the previous exchange is taken into account.
    pub(crate) async fn await_marker(&mut self, marker: &[u8], timeout_ms: u32) -> Result<bool, Error> {
        let found = self
            .await_condition(timeout_ms, |session| session.scan_for(marker).then_some(()))
            .await?;
        Ok(found.is_some())
    }

    /// Polls the session until the condition is met. Returns None if the timer fired first.
    async fn await_condition<R>(
        &mut self,
        timeout_ms: u32,
        mut condition: impl FnMut(&mut Session<CAPACITY>) -> Option<R>,
    ) -> Result<Option<R>, Error> {
        let session = self.session;
        let timer = Timer::after(Duration::from_millis(timeout_ms.into()));

        let task = async {
            loop {
                let state = session.lock(|session| {
                    if session.overflowed() {
                        return Err(Error::BufferOverflow);
                    }

                    Ok(condition(session))
                });

                match state {
                    Err(error) => return Err(error),
                    Ok(Some(state)) => return Ok(state),
                    Ok(None) => yield_now().await,
                }
            }
        };

        match select(timer, task).await {
            Either::First(_) => Ok(None),
            Either::Second(result) => result.map(Some),
        }
    }

    async fn transmit(&mut self, data: &[u8]) -> Result<(), Error> {
        self.serial.write_all(data).await.map_err(|e| Error::Transmit(e.kind()))?;
        self.serial.flush().await.map_err(|e| Error::Transmit(e.kind()))
    }
}
