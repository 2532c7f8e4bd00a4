use crate::asynch::Dispatcher;
use crate::classifier::Outcome;
use crate::commands::{ConnectionType, TransmissionPrepareCommand};
use crate::http::{Method, Request};
use crate::socket::{connect_command, SocketError, MAX_PAYLOAD_SIZE, REQUEST_SIZE};
use embedded_io_async::Write;

impl<W: Write, const CAPACITY: usize> Dispatcher<'_, W, CAPACITY> {
    /// Opens a connection to the given host, which may be an IP address or a domain name.
    /// Returns [Outcome::Connect] on success.
    pub async fn connect(&mut self, connection_type: ConnectionType, host: &str, port: u16) -> Result<Outcome, SocketError> {
        let command = connect_command(connection_type, host, port)?;
        Ok(self.send(&command).await?)
    }

    /// Announces the payload length and transmits the payload afterwards.
    /// See [crate::dispatcher::Dispatcher::send_data].
    pub async fn send_data(&mut self, payload: &[u8]) -> Result<Outcome, SocketError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(SocketError::PayloadTooLong);
        }

        let outcome = self.send(&TransmissionPrepareCommand::new(payload.len())).await?;
        if outcome != Outcome::SendOk {
            return Ok(outcome);
        }

        Ok(self.send_payload(payload).await?)
    }

    /// Sends a HTTP request over the open connection, which is closed by the server after responding
    pub async fn request(&mut self, method: Method, host: &str, uri: &str) -> Result<Outcome, SocketError> {
        let request = Request::new(method, host, uri).render::<REQUEST_SIZE>()?;
        self.send_data(request.as_bytes()).await
    }
}
