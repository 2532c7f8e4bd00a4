//! # Session state
//!
//! State of exactly one in-flight command/response exchange: the received bytes plus the flags which
//! got latched while waiting for the response.
//!
//! The state is shared between the receive interrupt ([Ingress](crate::ingress::Ingress)) and the
//! [Dispatcher](crate::dispatcher::Dispatcher). All access goes through a critical section, so a
//! reset can not interleave with an arriving byte.
//!
//! ````
//! use esp8266_at::SharedSession;
//!
//! static SESSION: SharedSession = SharedSession::new();
//!
//! SESSION.lock(|session| session.append(b'O'));
//! assert!(SESSION.lock(|session| session.scan_for(b"O")));
//!
//! SESSION.lock(|session| session.reset());
//! assert!(!SESSION.lock(|session| session.scan_for(b"O")));
//! ````
use crate::buffer::ResponseBuffer;
use crate::responses::{ERROR, FAIL, OK_TERMINATOR, RESET};
use core::cell::RefCell;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Response buffer size of the reference hardware
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Markers observed during the current exchange
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionFlags {
    /// ERROR was received
    pub error: bool,

    /// FAIL or a module reset was received
    pub fail: bool,
}

impl SessionFlags {
    /// Returns true if any of the flags is set
    pub fn any(&self) -> bool {
        self.error || self.fail
    }
}

/// Condition which ended the wait for a command response
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    /// OK followed by line end
    Ok,
    /// Generic error marker
    Error,
    /// Failure marker
    Fail,
    /// Module printed its boot log
    Reset,
}

impl Termination {
    fn marker(&self) -> &'static [u8] {
        match self {
            Termination::Ok => OK_TERMINATOR,
            Termination::Error => ERROR,
            Termination::Fail => FAIL,
            Termination::Reset => RESET,
        }
    }
}

/// Buffer and flags of one exchange
pub struct Session<const CAPACITY: usize> {
    buffer: ResponseBuffer<CAPACITY>,
    flags: SessionFlags,

    /// True if at least one byte got dropped since the last reset
    overflow: bool,
}

impl<const CAPACITY: usize> Session<CAPACITY> {
    pub const fn new() -> Self {
        Self {
            buffer: ResponseBuffer::new(),
            flags: SessionFlags { error: false, fail: false },
            overflow: false,
        }
    }

    /// Clears buffer, flags and overflow state
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.flags = SessionFlags::default();
        self.overflow = false;
    }

    /// Clears buffer and overflow state, but keeps the flags of the previous exchange
    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
        self.overflow = false;
    }

    /// Appends a received byte. Returns false if the byte was dropped due to a full buffer.
    pub fn append(&mut self, byte: u8) -> bool {
        if self.buffer.push(byte).is_err() {
            self.overflow = true;
            return false;
        }

        true
    }

    /// Appends a chunk of received bytes. Returns false if the chunk got truncated.
    pub fn append_all(&mut self, bytes: &[u8]) -> bool {
        if self.buffer.extend(bytes).is_err() {
            self.overflow = true;
            return false;
        }

        true
    }

    /// Substring search across the accumulated bytes
    pub fn scan_for(&self, marker: &[u8]) -> bool {
        self.buffer.contains(marker)
    }

    /// Returns the terminating condition which completed first in the received stream
    pub fn termination(&self) -> Option<Termination> {
        [Termination::Ok, Termination::Error, Termination::Fail, Termination::Reset]
            .into_iter()
            .filter_map(|termination| Some((self.buffer.find_end(termination.marker())?, termination)))
            .min_by_key(|(end, _)| *end)
            .map(|(_, termination)| termination)
    }

    /// Checks for a terminating condition and latches the matching flag
    pub fn poll_termination(&mut self) -> Option<Termination> {
        let termination = self.termination()?;

        match termination {
            Termination::Ok => {}
            Termination::Error => self.flags.error = true,
            Termination::Fail | Termination::Reset => self.flags.fail = true,
        }

        Some(termination)
    }

    pub fn flags(&self) -> SessionFlags {
        self.flags
    }

    /// True if bytes got dropped since the last reset
    pub fn overflowed(&self) -> bool {
        self.overflow
    }

    pub fn buffer(&self) -> &ResponseBuffer<CAPACITY> {
        &self.buffer
    }
}

impl<const CAPACITY: usize> Default for Session<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

/// Session shared by receive interrupt and dispatcher
pub struct SharedSession<const CAPACITY: usize = DEFAULT_BUFFER_SIZE> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Session<CAPACITY>>>,
}

impl<const CAPACITY: usize> SharedSession<CAPACITY> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Session::new())),
        }
    }

    /// Runs the closure with exclusive access to the session inside a critical section
    pub fn lock<R>(&self, f: impl FnOnce(&mut Session<CAPACITY>) -> R) -> R {
        self.inner.lock(|session| f(&mut session.borrow_mut()))
    }
}

impl<const CAPACITY: usize> Default for SharedSession<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}
