//! # Receive path
//!
//! [Ingress] is the interrupt side of the engine. The UART receive interrupt hands over every byte
//! by calling [Ingress::on_byte_arrived], which stores it verbatim in the [SharedSession] and
//! requests the next byte from the [ByteSource].
//!
//! ````
//! use esp8266_at::ingress::AlwaysArmed;
//! use esp8266_at::{Ingress, SharedSession};
//!
//! static SESSION: SharedSession = SharedSession::new();
//!
//! let mut ingress = Ingress::new(&SESSION, AlwaysArmed);
//! ingress.start().unwrap();
//!
//! for byte in b"OK\r\n" {
//!     ingress.on_byte_arrived(*byte).unwrap();
//! }
//!
//! assert!(SESSION.lock(|session| session.scan_for(b"OK\r\n")));
//! ````
use crate::session::{SharedSession, DEFAULT_BUFFER_SIZE};
use core::convert::Infallible;
use core::fmt::Debug;
use log::warn;

/// Interrupt driven receiver which delivers a single byte per request
pub trait ByteSource {
    /// Error when requesting the next byte
    type Error: Debug;

    /// Requests the delivery of exactly one further byte
    fn arm(&mut self) -> Result<(), Self::Error>;
}

/// Source which keeps delivering bytes without being re-armed, e.g. a FIFO or DMA driver
#[derive(Copy, Clone, Debug, Default)]
pub struct AlwaysArmed;

impl ByteSource for AlwaysArmed {
    type Error = Infallible;

    fn arm(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Feeds received bytes into the session
pub struct Ingress<'a, S: ByteSource, const CAPACITY: usize = DEFAULT_BUFFER_SIZE> {
    session: &'a SharedSession<CAPACITY>,
    source: S,
}

impl<'a, S: ByteSource, const CAPACITY: usize> Ingress<'a, S, CAPACITY> {
    pub fn new(session: &'a SharedSession<CAPACITY>, source: S) -> Self {
        Self { session, source }
    }

    /// Arms the reception of the first byte
    pub fn start(&mut self) -> Result<(), S::Error> {
        self.source.arm()
    }

    /// Stores a received byte and re-arms the source. Needs to be called for every received byte.
    ///
    /// Bytes arriving while the response buffer is full are dropped and reported to the dispatcher as
    /// overflow.
    pub fn on_byte_arrived(&mut self, byte: u8) -> Result<(), S::Error> {
        let first_drop = self.session.lock(|session| {
            let overflowed = session.overflowed();
            !session.append(byte) && !overflowed
        });

        if first_drop {
            warn!("Response buffer full ({} bytes), dropping received data", CAPACITY);
        }

        self.source.arm()
    }

    /// Stores a chunk of received bytes without re-arming the source
    pub fn write(&mut self, bytes: &[u8]) {
        let first_drop = self.session.lock(|session| {
            let overflowed = session.overflowed();
            !session.append_all(bytes) && !overflowed
        });

        if first_drop {
            warn!("Response buffer full ({} bytes), dropping received data", CAPACITY);
        }
    }
}
