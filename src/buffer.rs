//! # Response buffer
//!
//! Holds the raw bytes the ESP8266 sent since the last command was dispatched. The buffer is a plain
//! byte string, line structure is not tracked.
use heapless::Vec;

/// A byte arrived while the buffer was already filled up to its capacity
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Overflow;

/// Capacity checked, append-only byte buffer
pub struct ResponseBuffer<const CAPACITY: usize> {
    data: Vec<u8, CAPACITY>,
}

impl<const CAPACITY: usize> ResponseBuffer<CAPACITY> {
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Appends a single byte. Returns [Overflow] and drops the byte if the buffer is full.
    pub fn push(&mut self, byte: u8) -> Result<(), Overflow> {
        self.data.push(byte).map_err(|_| Overflow)
    }

    /// Appends as many bytes as fit. Returns [Overflow] if the chunk got truncated.
    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), Overflow> {
        for byte in bytes {
            self.push(*byte)?;
        }

        Ok(())
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Returns the start index of the first occurrence of `marker`.
    /// An empty marker never matches.
    pub fn find(&self, marker: &[u8]) -> Option<usize> {
        if marker.is_empty() || marker.len() > self.data.len() {
            return None;
        }

        self.data.windows(marker.len()).position(|window| window == marker)
    }

    /// Returns the index just behind the first occurrence of `marker`
    pub fn find_end(&self, marker: &[u8]) -> Option<usize> {
        self.find(marker).map(|start| start + marker.len())
    }

    /// Returns true if `marker` is contained anywhere in the received data
    pub fn contains(&self, marker: &[u8]) -> bool {
        self.find(marker).is_some()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if no further byte can be appended
    pub fn is_full(&self) -> bool {
        self.data.is_full()
    }

    pub const fn capacity(&self) -> usize {
        CAPACITY
    }
}

impl<const CAPACITY: usize> Default for ResponseBuffer<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}
