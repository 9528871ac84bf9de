//! DHT22 Pulse-Width Decoder for Embedded Rust
//!
//! This crate reads the DHT22 (AM2302) temperature and humidity sensor over its
//! single-wire protocol. Bits are told apart by comparing the width of each
//! data pulse with the reference pulse before it, both measured by counting
//! polls of the line, so the decoder works without calibrated timers.
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Designed for `no_std` environments
//! - Timing-critical capture runs inside a [`critical_section`]
//! - Reads are rate limited to the sensor's minimum sampling interval
//! - Optional logging support via `defmt` or `log`
//!
//! # Dependencies
//! This driver depends on the following platform capabilities:
//! - [`DataLine`] for the data pin; [`OpenDrain`] adapts any
//!   [`InputPin`] + [`OutputPin`]
//! - [`DelayNs`] for the start request timing
//! - [`Clock`] for spacing reads
//! - a `critical-section` implementation for masking interrupts
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and logs through `defmt`
//! - `log`: Logs through the `log` facade
//!
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod config;
pub mod decoder;
pub mod dht22;
pub mod error;
pub mod frame;
pub mod line;
pub mod pulse;
pub mod reading;

#[cfg(test)]
mod testing;

pub use clock::Clock;
pub use config::Config;
pub use dht22::Dht22;
pub use error::{DhtError, FrameError};
pub use frame::RawFrame;
pub use line::{DataLine, LineMode, OpenDrain};
pub use pulse::{CycleBudget, PulseMeasurement};
pub use reading::Reading;
