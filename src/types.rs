use crate::hw_def::*;

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature="defmt")]
use defmt::Format;

/// All possible errors from the sensor driver
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, PartialEq)]
pub enum Error<E> {
    /// I²C communication error
    I2c(E),
    /// The device answered but reports that it is not calibrated
    Calibration {
        /// status byte read back after the initialize command
        status: u8,
    },
    /// The busy flag did not clear within the busy-poll budget
    Timeout,
    /// The busy-poll was aborted by the caller's cancellation token
    Cancelled,
    /// A measurement was requested before `initialize()` succeeded
    NotInitialized,
    /// A previous transport or calibration failure left the driver faulted; re-initialize
    Faulted,
    /// The measurement frame still carried the busy flag
    StaleFrame,
    /// Failure of a checksum from the device was detected
    #[cfg(feature = "crc")]
    CrcMismatch,
}
impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "I2C transport error: {e:?}"),
            Error::Calibration { status } => write!(f, "sensor not calibrated (status: 0x{status:02X})"),
            Error::Timeout => write!(f, "timed out waiting for measurement"),
            Error::Cancelled => write!(f, "measurement cancelled"),
            Error::NotInitialized => write!(f, "driver not initialized"),
            Error::Faulted => write!(f, "driver faulted"),
            Error::StaleFrame => write!(f, "measurement frame still busy"),
            #[cfg(feature = "crc")]
            Error::CrcMismatch => write!(f, "CRC mismatch"),
        }
    }
}

/// Driver lifecycle
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DriverState {
    /// created, `initialize()` not yet run
    #[default]
    Uninitialized,
    /// soft reset sent, waiting for the device to settle
    Resetting,
    /// initialize command sent, calibration not yet confirmed
    AwaitingCalibration,
    /// idle and calibrated; measurements may be taken
    Ready,
    /// measurement triggered, conversion in progress
    Measuring,
    /// transport or calibration failure; only `initialize()` leaves this state
    Faulted,
}

/// Driver tuning
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// bus address of the device
    pub i2c_addr: I2cAddr,
    /// maximum number of status reads while waiting for the busy flag to clear; `0` is treated as `1`
    pub max_busy_polls: u16,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            i2c_addr: I2cAddr::default(),
            max_busy_polls: DEFAULT_MAX_BUSY_POLLS,
        }
    }
}

/// Status byte from the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusByte(pub u8);
impl StatusByte {
    /// a conversion is still in progress
    pub fn is_busy(self) -> bool {
        self.0 & STATUS_BUSY != 0
    }
    /// calibration coefficients are loaded
    pub fn is_calibrated(self) -> bool {
        self.0 & STATUS_CALIBRATED != 0
    }
}
impl fmt::Display for StatusByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusByte {{ 0x{:02x}; ", self.0)?;
        if self.is_busy() {
            write!(f, "busy ")?;
        }
        if self.is_calibrated() {
            write!(f, "calibrated ")?;
        }
        write!(f, "}}")
    }
}

/// Raw measurement frame: status byte followed by 20 bits of humidity and 20 bits of temperature
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RawFrame(pub [u8; FRAME_LEN]);
impl RawFrame {
    /// Status byte that leads the frame
    pub fn status(&self) -> StatusByte {
        StatusByte(self.0[0])
    }
    /// Unprocessed 20-bit humidity field
    pub fn raw_humidity(&self) -> u32 {
        let b = &self.0;
        ((b[1] as u32) << 12 | (b[2] as u32) << 4 | (b[3] as u32) >> 4) & RAW_FIELD_MASK
    }
    /// Unprocessed 20-bit temperature field
    pub fn raw_temperature(&self) -> u32 {
        let b = &self.0;
        ((b[3] as u32 & 0x0F) << 16 | (b[4] as u32) << 8 | b[5] as u32) & RAW_FIELD_MASK
    }
    /// Convert the payload to physical units; the status byte is not consulted
    pub fn decode(&self) -> Reading {
        Reading {
            temperature: raw_temp_to_centigrade(self.raw_temperature()),
            humidity: raw_humidity_to_percent(self.raw_humidity()),
        }
    }
}

/// Temperature and relative humidity after conversion
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// degrees centigrade
    pub temperature: f32,
    /// relative humidity in percent
    pub humidity: f32,
}
impl Reading {
    /// Get temperature in Fahrenheit
    pub fn fahrenheit(&self) -> f32 {
        self.temperature * 1.8 + 32.0
    }
}
impl From<&RawFrame> for Reading {
    fn from(raw: &RawFrame) -> Self {
        raw.decode()
    }
}

/// Source of an external request to abandon a busy-poll
pub trait Cancellation {
    /// true once the caller wants the measurement abandoned
    fn is_cancelled(&self) -> bool;
}

/// Token that is never cancelled
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;
impl Cancellation for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}
impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}
impl<T: Cancellation + ?Sized> Cancellation for &T {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}
