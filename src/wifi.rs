//! # WIFI access point client
//!
//! Joining resets the modem to factory settings, switches to station mode, restarts it and finally connects to
//! the access point. Just the outcome of the final connect command is relevant for the link state.
//!
//! ## Example
//!
//! ````
//! # use esp_at_logger::adapter::Adapter;
//! # use esp_at_logger::example::{ExampleSerial, ExampleTimer};
//! # use esp_at_logger::wifi::WifiAdapter;
//! #
//! let mut adapter: Adapter<_, _, 1_000_000, 64> = Adapter::new(ExampleSerial::default(), ExampleTimer::default());
//!
//! adapter.join("test_wifi", "secret");
//! assert!(adapter.is_link_up());
//! assert!(!adapter.is_socket_up());
//! ````
use crate::adapter::Adapter;
use crate::commands::{AccessPointConnectCommand, RestartCommand, RestoreCommand, WifiModeCommand};
use crate::watcher::Failure;
use embedded_io::{Read, ReadReady, Write};
use fugit_timer::Timer;

/// Wifi network adapter trait
pub trait WifiAdapter {
    /// Prepares the modem and connects to the given WIFI access point.
    /// The result is reflected by [WifiAdapter::is_link_up].
    fn join(&mut self, ssid: &str, key: &str);

    /// Returns true if the last join was successful
    fn is_link_up(&self) -> bool;
}

impl<S, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> WifiAdapter
    for Adapter<S, T, TIMER_HZ, RX_SIZE>
where
    S: Read + ReadReady + Write,
{
    /// Connects to an WIFI access point and updates the link state.
    ///
    /// Link and socket state are reset in advance, so a failed join never leaves a stale link state of a
    /// previous session.
    fn join(&mut self, ssid: &str, key: &str) {
        self.session.link_up = false;
        self.session.socket_up = false;

        let Some(command) = AccessPointConnectCommand::new(ssid, key) else {
            error!("SSID or password exceeds the max. length");
            self.reject(Failure::CommandTooLong);
            return;
        };

        self.prepare_station();

        info!("Joining WIFI network {:?}", ssid);
        self.session.link_up = self.transact(&command, 0);
        self.pause(self.config.response_pause);

        if self.session.link_up {
            info!("Joined WIFI network");
        }
    }

    fn is_link_up(&self) -> bool {
        self.session.link_up
    }
}

impl<S, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> Adapter<S, T, TIMER_HZ, RX_SIZE>
where
    S: Read + ReadReady + Write,
{
    /// Brings the modem into a known state. Failures are ignored, as just the following join is relevant.
    fn prepare_station(&mut self) {
        let _ = self.transact(&RestoreCommand::new(), self.config.restore_delay);
        let _ = self.transact(&WifiModeCommand::station_mode(), self.config.mode_delay);
        let _ = self.transact(&RestartCommand::new(), self.config.restart_delay);
    }
}
