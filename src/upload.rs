//! # Uploading readings
//!
//! A [Reading] consists of eight numeric fields. It is transmitted over a raw TCP connection as query string like
//! payload: `GET&field1=1&field2=2&...&field8=8`.
//!
//! Nothing is uploaded while the WIFI link is down or if the TCP connection could not be established.
//!
//! ## Example
//!
//! ````
//! # use esp_at_logger::adapter::Adapter;
//! # use esp_at_logger::example::{ExampleSerial, ExampleTimer};
//! # use esp_at_logger::upload::Reading;
//! # use esp_at_logger::wifi::WifiAdapter;
//! #
//! let mut adapter: Adapter<_, _, 1_000_000, 64> = Adapter::new(ExampleSerial::default(), ExampleTimer::default());
//! adapter.join("test_wifi", "secret");
//!
//! let reading = Reading::new([21.5, 48.0, 1013.25, 0.0, 0.0, 0.0, 0.0, 0.0]);
//! adapter.upload("api.thingspeak.com", &reading);
//!
//! assert!(adapter.is_socket_up());
//! assert!(adapter.is_last_transfer_ok());
//! ````
use crate::adapter::Adapter;
use crate::commands::{ConnectCommand, RawCommand, TransmissionPrepareCommand};
use crate::watcher::Failure;
use core::fmt::Write as _;
use embedded_io::{Read, ReadReady, Write};
use fugit_timer::Timer;
use heapless::String;

/// Number of fields of a reading
pub const FIELD_COUNT: usize = 8;

/// Max. length of a rendered field value. Subnormal values print as sign, `0.` and up to 324 decimals.
pub const MAX_VALUE_LEN: usize = 327;

/// Max. payload length: `GET` followed by eight `&fieldN=<value>` pairs
pub const MAX_PAYLOAD_LEN: usize = 3 + FIELD_COUNT * ("&fieldN=".len() + MAX_VALUE_LEN);

/// Upload payload
pub type Payload = String<MAX_PAYLOAD_LEN>;

/// Set of sensor values uploaded at once
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Reading {
    fields: [f64; FIELD_COUNT],
}

impl Reading {
    pub fn new(fields: [f64; FIELD_COUNT]) -> Self {
        Self { fields }
    }

    /// Returns the field values
    pub fn fields(&self) -> &[f64; FIELD_COUNT] {
        &self.fields
    }

    /// Renders the upload payload, e.g. `GET&field1=1&field2=2.5&...&field8=8`
    pub fn payload(&self) -> Payload {
        let mut payload = Payload::new();
        let _ = payload.push_str("GET");

        for (index, value) in self.fields.iter().enumerate() {
            // Can not overflow, s. MAX_PAYLOAD_LEN
            let _ = write!(payload, "&field{}={}", index + 1, value);
        }

        payload
    }
}

impl From<[f64; FIELD_COUNT]> for Reading {
    fn from(fields: [f64; FIELD_COUNT]) -> Self {
        Self::new(fields)
    }
}

impl<S, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> Adapter<S, T, TIMER_HZ, RX_SIZE>
where
    S: Read + ReadReady + Write,
{
    /// Connects to the given host and uploads the reading.
    ///
    /// Does nothing while the WIFI link is down. The results are reflected by [Adapter::is_socket_up] and
    /// [Adapter::is_last_transfer_ok]. If the connection fails, the transfer state of a previous upload is kept.
    pub fn upload(&mut self, host: &str, reading: &Reading) {
        if !self.session.link_up {
            debug!("WIFI link is down, skipping upload");
            return;
        }

        self.session.socket_up = false;
        if !self.connect(host) {
            return;
        }

        self.session.last_transfer_ok = false;
        let payload = reading.payload();
        let Some(command) = RawCommand::<MAX_PAYLOAD_LEN>::new(payload.as_str()) else {
            self.reject(Failure::CommandTooLong);
            return;
        };

        // Announced length includes the line terminator
        let _ = self.transact(
            &TransmissionPrepareCommand::new(payload.len() + 2),
            self.config.send_prefix_delay,
        );
        self.session.last_transfer_ok = self.transact(&command, 0);
        self.pause(self.config.response_pause);

        if !self.session.last_transfer_ok {
            warn!("Upload of {} bytes failed", payload.len());
        }
    }

    /// Opens the TCP connection and updates the socket state
    fn connect(&mut self, host: &str) -> bool {
        let Some(command) = ConnectCommand::tcp(host, self.config.remote_port) else {
            error!("Host name exceeds the max. length");
            self.reject(Failure::CommandTooLong);
            return false;
        };

        debug!("Connecting to {:?}:{}", host, self.config.remote_port);
        self.session.socket_up = self.transact(&command, 0);
        self.pause(self.config.response_pause);

        self.session.socket_up
    }
}
