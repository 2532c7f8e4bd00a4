use crate::asynch::Dispatcher;
use crate::classifier::{MultiplexMode, Outcome, WifiMode};
use crate::commands::{
    AccessPointDisconnectCommand, AccessPointQueryCommand, MultipleConnectionsQueryCommand, RestartCommand,
    SetMultipleConnectionsCommand, StartupCommand, VersionCommand, WifiModeCommand, WifiModeQueryCommand,
};
use crate::dispatcher::Error;
use crate::responses::READY;
use crate::wifi::{expect, join_command, InitError, JoinError};
use core::fmt::Debug;
use embassy_time::{Duration, Timer};
use embedded_io_async::Write;
use log::{info, warn};

/// Async wifi network adapter trait
pub trait WifiAdapter {
    /// Error when initializing the module
    type InitError: Debug;

    /// Error when joining a WIFI network
    type JoinError: Debug;

    /// Error of single commands
    type CommandError: Debug;

    /// Brings the module into station mode with a single connection
    fn init(&mut self) -> impl core::future::Future<Output = Result<(), Self::InitError>>;

    /// Restarts the module and waits until it is ready
    fn restart(&mut self) -> impl core::future::Future<Output = Result<Outcome, Self::CommandError>>;

    /// Joins the given access point
    fn join(&mut self, ssid: &str, key: &str) -> impl core::future::Future<Output = Result<Outcome, Self::JoinError>>;

    /// Returns whether the module is joined to an access point
    fn join_state(&mut self) -> impl core::future::Future<Output = Result<Outcome, Self::CommandError>>;

    /// Leaves the current access point
    fn disconnect(&mut self) -> impl core::future::Future<Output = Result<Outcome, Self::CommandError>>;

    /// Queries the firmware version. The version text may be read by `with_response()` afterwards.
    fn version(&mut self) -> impl core::future::Future<Output = Result<Outcome, Self::CommandError>>;
}

impl<W: Write, const CAPACITY: usize> WifiAdapter for Dispatcher<'_, W, CAPACITY> {
    type InitError = InitError;
    type JoinError = JoinError;
    type CommandError = Error;

    /// Same sequence as the blocking adapter
    async fn init(&mut self) -> Result<(), InitError> {
        expect(self.send(&StartupCommand).await?, Outcome::Ok, InitError::StartupFailed)?;
        Timer::after(Duration::from_millis(self.config.settle_ms.into())).await;

        expect(self.restart().await?, Outcome::Ok, InitError::RestartFailed)?;
        expect(self.send(&StartupCommand).await?, Outcome::Ok, InitError::StartupFailed)?;

        expect(
            self.send(&WifiModeCommand::station_mode()).await?,
            Outcome::Ok,
            InitError::ModeError,
        )?;
        expect(
            self.send(&WifiModeQueryCommand).await?,
            Outcome::Mode(WifiMode::Station),
            InitError::ModeVerificationFailed,
        )?;

        expect(
            self.send(&SetMultipleConnectionsCommand::single()).await?,
            Outcome::Ok,
            InitError::MultiplexError,
        )?;
        expect(
            self.send(&MultipleConnectionsQueryCommand).await?,
            Outcome::Multiplex(MultiplexMode::Single),
            InitError::MultiplexVerificationFailed,
        )?;

        info!("Module initialized");
        Ok(())
    }

    async fn restart(&mut self) -> Result<Outcome, Error> {
        let outcome = self.send(&RestartCommand).await?;
        if outcome != Outcome::Ok {
            return Ok(outcome);
        }

        if !self.await_marker(READY, self.config.restart_timeout_ms).await? {
            warn!("Module not ready within {} ms after restart", self.config.restart_timeout_ms);
            return Ok(Outcome::Timeout);
        }

        Ok(Outcome::Ok)
    }

    async fn join(&mut self, ssid: &str, key: &str) -> Result<Outcome, JoinError> {
        let command = join_command(ssid, key)?;
        Ok(self.send(&command).await?)
    }

    async fn join_state(&mut self) -> Result<Outcome, Error> {
        self.send(&AccessPointQueryCommand).await
    }

    async fn disconnect(&mut self) -> Result<Outcome, Error> {
        self.send(&AccessPointDisconnectCommand).await
    }

    async fn version(&mut self) -> Result<Outcome, Error> {
        self.send(&VersionCommand).await
    }
}
