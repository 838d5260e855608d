//! # Web logger client for ESP-AT modems
//!
//! Joins a WIFI network and uploads sensor readings to a web server using a ESP-AT modem (e.g. ESP8266/ESP-01)
//! connected by a serial port.
//!
//! The communication is strictly sequential and blocking: Each command is sent, followed by waiting for the
//! response until a success or failure marker is received or the response timeout (default: 30 seconds)
//! elapsed. Failures are not returned, but reflected by the connection state of the [adapter::Adapter].
#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod adapter;
pub mod commands;
pub mod config;
pub(crate) mod responses;
pub mod upload;
pub mod watcher;
pub mod wifi;

#[cfg(feature = "examples")]
pub mod example;

#[cfg(test)]
mod tests;
