//! # Transaction engine
//!
//! Every interaction with the modem is a transaction: The command is sent, followed by a settle delay. Afterwards
//! the response is awaited until a success or failure marker is received or the response timeout has elapsed.
//!
//! Transactions are strictly sequential, as [Adapter::transact] is the only path to the serial port.
//!
//! ## Example
//!
//! ````
//! # use esp_at_logger::adapter::Adapter;
//! # use esp_at_logger::commands::WifiModeCommand;
//! # use esp_at_logger::example::{ExampleSerial, ExampleTimer};
//! #
//! let mut adapter: Adapter<_, _, 1_000_000, 64> = Adapter::new(ExampleSerial::default(), ExampleTimer::default());
//!
//! // Switching to station mode, waiting 100 ms before reading the response
//! assert!(adapter.transact(&WifiModeCommand::station_mode(), 100));
//! assert_eq!(None, adapter.last_failure());
//! ````
use crate::config::Config;
use crate::fmt::LossyStr;
use crate::watcher::{Failure, Outcome, ResponseWatcher};
use alloc::vec;
use atat::AtatCmd;
use embedded_io::{Read, ReadReady, Write};
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer;

/// Max. number of reads when dropping stale input, so a chatty modem can not block the next command
const STALE_READ_LIMIT: usize = 64;

/// Upper bound of the response timeout in ticks. Elapsed time is measured by wrapping instants, which are only
/// ordered within half of the timer range.
const MAX_TIMEOUT_TICKS: u32 = u32::MAX / 4;

/// Current connection state. Each flag is just updated by the corresponding operation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionState {
    /// True if the last join was successful
    pub link_up: bool,

    /// True if the last TCP connect was successful
    pub socket_up: bool,

    /// True if the last payload transmission was successful
    pub last_transfer_ok: bool,
}

/// Central client driving the ESP-AT modem
///
/// TIMER_HZ: Frequency of the given timer
///
/// RX_SIZE: Chunk size in bytes when reading from the serial port
pub struct Adapter<S, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize>
where
    S: Read + ReadReady + Write,
{
    /// Serial connection to the modem
    pub(crate) serial: S,

    /// Timer used for delays and timeout measurement
    pub(crate) timer: T,

    /// Timing and connection parameters
    pub(crate) config: Config,

    /// Connection flags
    pub(crate) session: ConnectionState,

    /// Failure reason of the last transaction, None if successful
    last_failure: Option<Failure>,
}

impl<S, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> Adapter<S, T, TIMER_HZ, RX_SIZE>
where
    S: Read + ReadReady + Write,
{
    /// Creates a new adapter using the default configuration
    pub fn new(serial: S, timer: T) -> Self {
        Self::with_config(serial, timer, Config::default())
    }

    /// Creates a new adapter using the given configuration
    pub fn with_config(serial: S, timer: T, config: Config) -> Self {
        Self {
            serial,
            timer,
            config,
            session: ConnectionState::default(),
            last_failure: None,
        }
    }

    /// Sends the command, waits `settle_ms` and then blocks until the response is classified.
    /// Returns true if the success marker was received.
    pub fn transact<Cmd: AtatCmd>(&mut self, command: &Cmd, settle_ms: u32) -> bool {
        let outcome = match self.send(command, settle_ms) {
            Ok(()) => self.wait_response(),
            Err(failure) => Outcome::Failure(failure),
        };

        self.last_failure = match outcome {
            Outcome::Success => None,
            Outcome::Failure(failure) => {
                warn!("Transaction failed: {:?}", failure);
                Some(failure)
            }
        };

        outcome.is_success()
    }

    /// Blocks for the given time. Does nothing for zero or negative values.
    pub fn wait(&mut self, delay_ms: i32) {
        if let Ok(delay_ms) = u32::try_from(delay_ms) {
            self.pause(delay_ms);
        }
    }

    /// Returns true if the last join was successful
    pub fn is_link_up(&self) -> bool {
        self.session.link_up
    }

    /// Returns true if the last TCP connect was successful
    pub fn is_socket_up(&self) -> bool {
        self.session.socket_up
    }

    /// Returns true if the last payload transmission was successful
    pub fn is_last_transfer_ok(&self) -> bool {
        self.session.last_transfer_ok
    }

    /// Returns a snapshot of all connection flags
    pub fn state(&self) -> ConnectionState {
        self.session
    }

    /// Returns the failure reason of the last transaction. None if it was successful or no transaction was
    /// executed yet.
    pub fn last_failure(&self) -> Option<Failure> {
        self.last_failure
    }

    /// Marks the last transaction as failed without sending anything
    pub(crate) fn reject(&mut self, failure: Failure) {
        self.last_failure = Some(failure);
    }

    /// Encodes and writes the command, followed by the settle delay
    fn send<Cmd: AtatCmd>(&mut self, command: &Cmd, settle_ms: u32) -> Result<(), Failure> {
        let mut buffer = vec![0u8; Cmd::MAX_LEN];
        let length = command.write(&mut buffer);
        let encoded = &buffer[..length];

        if self.config.discard_stale_input {
            self.discard_input()?;
        }

        debug!("Sending {:?} ({} bytes)", LossyStr(command_name(encoded)), length);
        self.serial.write_all(encoded).map_err(|_| Failure::Serial)?;
        self.serial.flush().map_err(|_| Failure::Serial)?;

        self.sleep(settle_ms)
    }

    /// Reads pending data until the response got classified or the response timeout elapsed
    fn wait_response(&mut self) -> Outcome {
        let mut watcher = ResponseWatcher::new();
        let mut chunk = [0u8; RX_SIZE];
        let timeout = TimerDurationU32::<TIMER_HZ>::from_ticks(
            Self::ticks(self.config.response_timeout).min(MAX_TIMEOUT_TICKS),
        );
        let started = self.timer.now();

        loop {
            let length = match self.read_pending(&mut chunk) {
                Ok(length) => length,
                Err(failure) => return Outcome::Failure(failure),
            };

            if length > 0 {
                trace!("Received {:?}", LossyStr(&chunk[..length]));

                if let Some(outcome) = watcher.feed(&chunk[..length]) {
                    return outcome;
                }
            }

            if self.elapsed_since(started) > timeout {
                debug!("Response timeout, {} bytes received", watcher.received());
                return Outcome::Failure(Failure::Timeout);
            }

            if length == 0 {
                if let Err(failure) = self.sleep(self.config.poll_interval) {
                    return Outcome::Failure(failure);
                }
            }
        }
    }

    /// Reads into the given buffer if data is pending. Returns the number of bytes read.
    fn read_pending(&mut self, buffer: &mut [u8]) -> Result<usize, Failure> {
        if !self.serial.read_ready().map_err(|_| Failure::Serial)? {
            return Ok(0);
        }

        self.serial.read(buffer).map_err(|_| Failure::Serial)
    }

    /// Drops any pending input
    fn discard_input(&mut self) -> Result<(), Failure> {
        let mut chunk = [0u8; RX_SIZE];
        let mut discarded = 0;

        for _ in 0..STALE_READ_LIMIT {
            let length = self.read_pending(&mut chunk)?;
            if length == 0 {
                break;
            }

            discarded += length;
        }

        if discarded > 0 {
            debug!("Discarded {} bytes of stale input", discarded);
        }

        Ok(())
    }

    /// Blocking sleep. Timer is not started for a zero duration.
    ///
    /// Delays exceeding the timer range are split into several timer runs.
    fn sleep(&mut self, ms: u32) -> Result<(), Failure> {
        let mut remaining = ms;

        while remaining > 0 {
            let chunk = remaining.min(Self::MAX_DELAY_MS);

            self.timer
                .start(TimerDurationU32::from_ticks(Self::ticks(chunk)))
                .map_err(|_| Failure::TimerError)?;
            nb::block!(self.timer.wait()).map_err(|_| Failure::TimerError)?;

            remaining -= chunk;
        }

        Ok(())
    }

    /// Blocking sleep which just logs timer errors
    pub(crate) fn pause(&mut self, ms: u32) {
        if self.sleep(ms).is_err() {
            warn!("Timer error while pausing for {} ms", ms);
        }
    }

    /// Longest delay in ms a single timer run can represent
    const MAX_DELAY_MS: u32 = {
        let max = u32::MAX as u64 * 1_000 / TIMER_HZ as u64;
        if max > u32::MAX as u64 {
            u32::MAX
        } else {
            max as u32
        }
    };

    /// Converts milliseconds to timer ticks, saturating at the timer range
    fn ticks(ms: u32) -> u32 {
        let ticks = ms as u64 * TIMER_HZ as u64 / 1_000;
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }

    /// Time passed since the given instant. Zero if the clock went backwards.
    fn elapsed_since(&mut self, started: TimerInstantU32<TIMER_HZ>) -> TimerDurationU32<TIMER_HZ> {
        self.timer
            .now()
            .checked_duration_since(started)
            .unwrap_or(TimerDurationU32::from_ticks(0))
    }
}

/// Returns the command without its arguments, so credentials do not end up in logs
fn command_name(encoded: &[u8]) -> &[u8] {
    let end = encoded
        .iter()
        .position(|byte| *byte == b'=' || *byte == b'\r')
        .unwrap_or(encoded.len());

    &encoded[..end]
}
