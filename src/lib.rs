//! This is a platform-agnostic Rust driver for the AHT10 capacitive humidity and temperature
//! digital sensor using the [`embedded-hal`] or [`embedded-hal-async`] traits, plus a small
//! threshold monitor that drives indicator lines and emits telemetry lines.
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal
//! [`embedded-hal-async`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal-async
//!
//! This driver allows you to:
//! - Soft-reset and initialize the device, checking that it reports calibrated.
//! - Trigger a measurement and wait for it with a bounded, cancellable busy-poll.
//! - Decode the 20-bit humidity and temperature fields into %RH and °C.
//! - Classify a reading against low/high temperature and high humidity thresholds.
//! - Format a reading as a JSON telemetry line and a human-readable line.
//! - Run a read → classify → indicate → emit cycle over GPIO pins and a serial stream.
//! - blocking API support.
//! - async API support.
//!
//! The driver never retries on its own. Every failure comes back as an [`Error`] and the
//! caller decides whether to try again on the next cycle.
//!
//! ## Features
//!
//! - `async`: Enables the async driver in [`asynch`].
//! - `blocking`: Enables the blocking driver in [`blocking`], the pin-backed indicator sink and
//!   the [`monitor`].
//! - `crc`: Reads the trailing CRC byte sent by AHT20/AHT21 compatible parts and checks it.
//! - `defmt`: Enables logging using the `defmt` framework.
//! - `log`: Enables logging using the `log` framework.
//!
//! ## Driver lifecycle
//!
//! ```text
//! Uninitialized ─► Resetting ─► AwaitingCalibration ─► Ready ◄─► Measuring
//!                        │               │                │           │
//!                        └───────────────┴──── Faulted ◄──┴───────────┘
//! ```
//!
//! Any transport failure, and an uncalibrated status after initialization, leave the driver
//! [`DriverState::Faulted`]. Only `initialize()` leaves that state. A busy-poll timeout or
//! cancellation returns the driver to [`DriverState::Ready`].
//!
//! Datasheet:
//!   [AHT10](https://server4.eca.ir/eshop/AHT10/Aosong_AHT10_en_draft_0c.pdf)
//!
//! ## Blocking Example:
//!
//! ```ignore
//! use aht10::{blocking::Aht10, I2cAddr};
//!
//! // Platform-specific
//! let i2c = /* embedded_hal::i2c::I2c instance */;
//! let delay = /* embedded_hal::delay::DelayNs instance */;
//!
//! let mut aht10 = Aht10::new(i2c, delay, I2cAddr::Addr38);
//! aht10.initialize().unwrap();
//!
//! loop {
//!     match aht10.read_measurement() {
//!         Ok(reading) => println!("{:.2} °C, {:.2} %RH", reading.temperature, reading.humidity),
//!         Err(e) => println!("read failed: {e}"),
//!     }
//!     sleep_secs(2);
//! }
//! ```
//!
//! ## Monitor Example:
//!
//! ```ignore
//! use aht10::{blocking::Aht10, monitor::Monitor, sink::PinIndicators, I2cAddr, ThresholdConfig};
//!
//! // Platform-specific
//! let (i2c, delay, blue, red, green, uart) = /* board bring-up */;
//!
//! let sensor = Aht10::new(i2c, delay.clone(), I2cAddr::Addr38);
//! let leds = PinIndicators::new(blue, red, green);
//! let mut monitor = Monitor::new(sensor, leds, uart, ThresholdConfig::default());
//!
//! monitor.lamp_test(&mut delay.clone()).unwrap();
//! monitor.start().unwrap();
//! loop {
//!     // sensor failures are reported on the stream and do not end the loop
//!     monitor.cycle(uptime_ms()).unwrap();
//!     sleep_secs(2);
//! }
//! ```
//!
//! ## Async Example:
//!
//! ```ignore
//! use aht10::{asynch::Aht10, I2cAddr};
//!
//! let mut aht10 = Aht10::new(i2c, delay, I2cAddr::Addr38);
//! aht10.initialize().await.unwrap();
//! let reading = aht10.read_measurement().await.unwrap();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![no_std]

#[cfg(not(any(feature = "async", feature = "blocking")))]
compile_error!("At least one of \"async\" and \"blocking\" features must be enabled");

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

// Logging macros live in textual scope so every module below sees them without an import.
cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! trace {
            ($($arg:tt)*) => { defmt::trace!($($arg)*) };
        }
        #[allow(unused_macros)]
        macro_rules! debug {
            ($($arg:tt)*) => { defmt::debug!($($arg)*) };
        }
        macro_rules! warn {
            ($($arg:tt)*) => { defmt::warn!($($arg)*) };
        }
    } else if #[cfg(feature = "log")] {
        macro_rules! trace {
            ($($arg:tt)*) => { log::trace!($($arg)*) };
        }
        #[allow(unused_macros)]
        macro_rules! debug {
            ($($arg:tt)*) => { log::debug!($($arg)*) };
        }
        macro_rules! warn {
            ($($arg:tt)*) => { log::warn!($($arg)*) };
        }
    } else {
        macro_rules! trace {
            ($($arg:tt)*) => {};
        }
        #[allow(unused_macros)]
        macro_rules! debug {
            ($($arg:tt)*) => {};
        }
        macro_rules! warn {
            ($($arg:tt)*) => {};
        }
    }
}

mod device_impl;
mod hw_def;
mod types;

#[cfg(feature = "async")]
pub mod asynch;
#[cfg(feature = "blocking")]
pub mod blocking;
#[cfg(feature = "blocking")]
pub mod monitor;
pub mod policy;
pub mod sink;
pub mod telemetry;

pub use crate::{
    hw_def::*,
    policy::{classify, ConfigError, Indicator, IndicatorState, ThresholdConfig},
    telemetry::{encode, Telemetry, TelemetryError},
    types::*,
};
