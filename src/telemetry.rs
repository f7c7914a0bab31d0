//! Telemetry lines for a byte-stream sink, built without heap allocation.

use crate::types::Reading;

use core::fmt::{self, Write};
use heapless::String;

#[cfg(feature="defmt")]
use defmt::Format;

/// Capacity of one telemetry line in bytes
pub const TELEMETRY_LINE_CAPACITY: usize = 128;

/// One telemetry line
pub type TelemetryLine = String<TELEMETRY_LINE_CAPACITY>;

/// Sent once when monitoring starts
pub const STARTUP_BANNER: &str = "AHT10 Temperature & Humidity Monitor Started\r\n";
/// Sent in place of the telemetry lines when a measurement fails
pub const READ_FAILURE_LINE: &str = "ERROR: Sensor read failed\r\n";

/// Telemetry encoding errors
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TelemetryError {
    /// the formatted line does not fit in [`TELEMETRY_LINE_CAPACITY`] bytes
    Overflow,
}
impl From<fmt::Error> for TelemetryError {
    fn from(_: fmt::Error) -> Self {
        TelemetryError::Overflow
    }
}
impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Overflow => write!(f, "telemetry line exceeds {TELEMETRY_LINE_CAPACITY} bytes"),
        }
    }
}

/// Both encodings of one reading
#[derive(Clone, Debug, PartialEq)]
pub struct Telemetry {
    /// `{"temperature":..,"humidity":..,"timestamp":..}` followed by CRLF
    pub structured: TelemetryLine,
    /// `TEMP: ..°C, HUMID: ..%, TIME: ..ms` followed by CRLF
    pub human: TelemetryLine,
}
impl Telemetry {
    /// Lines in transmission order
    pub fn lines(&self) -> [&str; 2] {
        [self.structured.as_str(), self.human.as_str()]
    }
}

/// Structured (JSON object) line with two-decimal values
pub fn structured_line(reading: &Reading, timestamp_ms: u64) -> Result<TelemetryLine, TelemetryError> {
    let mut s = TelemetryLine::new();
    write!(
        s,
        "{{\"temperature\":{:.2},\"humidity\":{:.2},\"timestamp\":{}}}\r\n",
        reading.temperature, reading.humidity, timestamp_ms
    )?;
    Ok(s)
}

/// Human-readable line with the same values and precision
pub fn human_line(reading: &Reading, timestamp_ms: u64) -> Result<TelemetryLine, TelemetryError> {
    let mut s = TelemetryLine::new();
    write!(
        s,
        "TEMP: {:.2}°C, HUMID: {:.2}%, TIME: {}ms\r\n",
        reading.temperature, reading.humidity, timestamp_ms
    )?;
    Ok(s)
}

/// Encode a reading taken at `timestamp_ms` (milliseconds since start)
pub fn encode(reading: &Reading, timestamp_ms: u64) -> Result<Telemetry, TelemetryError> {
    Ok(Telemetry {
        structured: structured_line(reading, timestamp_ms)?,
        human: human_line(reading, timestamp_ms)?,
    })
}
