//! # Response classification
//!
//! The received bytes of a transaction are matched against the success marker `OK` and the failure markers
//! `ERROR` and `SEND FAIL`. Just a rolling window of the most recent bytes is stored, so memory usage is bounded
//! regardless of the amount of data the modem sends.
use heapless::Vec;

/// Marker signaling a successful command
pub const SUCCESS_MARKER: &[u8] = b"OK";

/// Marker of an error response
pub const ERROR_MARKER: &[u8] = b"ERROR";

/// Marker of a failed data transmission
pub const SEND_FAIL_MARKER: &[u8] = b"SEND FAIL";

/// Length of the longest marker
const WINDOW_SIZE: usize = 9;

/// Result of a single transaction
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Success marker was received
    Success,

    /// Transaction failed for the given reason
    Failure(Failure),
}

impl Outcome {
    /// Returns true if the success marker was received
    pub fn is_success(&self) -> bool {
        *self == Outcome::Success
    }
}

/// Reasons of a failed transaction. All of them are reported as `false` by the public API.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Failure {
    /// Modem responded with ERROR
    ErrorResponse,

    /// Modem responded with SEND FAIL
    SendFail,

    /// Neither a success nor a failure marker was received within the response timeout
    Timeout,

    /// Reading from or writing to the serial port failed
    Serial,

    /// Upstream timer error
    TimerError,

    /// Encoded command or argument does not fit into the command buffer
    CommandTooLong,
}

/// Incremental marker matcher of a single transaction
pub struct ResponseWatcher {
    /// Most recent received bytes
    window: Vec<u8, WINDOW_SIZE>,

    /// Total number of received bytes
    received: usize,
}

impl Default for ResponseWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWatcher {
    pub fn new() -> Self {
        Self {
            window: Vec::new(),
            received: 0,
        }
    }

    /// Processes the bytes of one read cycle. Returns the outcome as soon as a marker was found.
    ///
    /// If a success and a failure marker are both contained in the same cycle, success wins.
    pub fn feed(&mut self, data: &[u8]) -> Option<Outcome> {
        let mut success = false;
        let mut failure = None;

        for byte in data {
            self.push(*byte);

            if self.window.ends_with(SUCCESS_MARKER) {
                success = true;
            } else if failure.is_none() {
                failure = self.matching_failure();
            }
        }

        if success {
            return Some(Outcome::Success);
        }

        failure.map(Outcome::Failure)
    }

    /// Total number of bytes received so far
    pub fn received(&self) -> usize {
        self.received
    }

    /// Appends a byte to the window and drops the oldest one if full
    fn push(&mut self, byte: u8) {
        if self.window.is_full() {
            self.window.remove(0);
        }

        // Capacity was freed above
        let _ = self.window.push(byte);
        self.received += 1;
    }

    /// Returns the failure reason if the window ends with a failure marker
    fn matching_failure(&self) -> Option<Failure> {
        if self.window.ends_with(ERROR_MARKER) {
            return Some(Failure::ErrorResponse);
        }

        if self.window.ends_with(SEND_FAIL_MARKER) {
            return Some(Failure::SendFail);
        }

        None
    }
}
