//! Threshold classification of a [`Reading`] into indicator line states.

use crate::types::Reading;

use core::fmt;

#[cfg(feature="defmt")]
use defmt::Format;

/// Default lower temperature threshold in °C
pub const DEFAULT_TEMP_LOW: f32 = 20.0;
/// Default upper temperature threshold in °C
pub const DEFAULT_TEMP_HIGH: f32 = 25.0;
/// Default upper relative humidity threshold in percent
pub const DEFAULT_HUMIDITY_HIGH: f32 = 60.0;

/// Rejected threshold configuration
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// a threshold is NaN or infinite
    NotFinite,
    /// the upper temperature threshold does not exceed the lower one
    InvertedTemperatureBand,
}
impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFinite => write!(f, "threshold is not a finite number"),
            ConfigError::InvertedTemperatureBand => write!(f, "temp_high must be greater than temp_low"),
        }
    }
}

/// Classification thresholds
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdConfig {
    temp_low: f32,
    temp_high: f32,
    humidity_high: f32,
}
impl ThresholdConfig {
    /// Validate and build a threshold configuration
    pub fn new(temp_low: f32, temp_high: f32, humidity_high: f32) -> Result<Self, ConfigError> {
        if !(temp_low.is_finite() && temp_high.is_finite() && humidity_high.is_finite()) {
            return Err(ConfigError::NotFinite);
        }
        if temp_high <= temp_low {
            return Err(ConfigError::InvertedTemperatureBand);
        }
        Ok(Self { temp_low, temp_high, humidity_high })
    }
    /// Lower temperature threshold in °C
    pub fn temp_low(&self) -> f32 {
        self.temp_low
    }
    /// Upper temperature threshold in °C
    pub fn temp_high(&self) -> f32 {
        self.temp_high
    }
    /// Upper relative humidity threshold in percent
    pub fn humidity_high(&self) -> f32 {
        self.humidity_high
    }
}
impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temp_low: DEFAULT_TEMP_LOW,
            temp_high: DEFAULT_TEMP_HIGH,
            humidity_high: DEFAULT_HUMIDITY_HIGH,
        }
    }
}
impl fmt::Display for ThresholdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Low Temp: {:.1}°C, High Temp: {:.1}°C, High Humidity: {:.1}%",
            self.temp_low, self.temp_high, self.humidity_high
        )
    }
}

/// One indicator output line
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Indicator {
    /// temperature below `temp_low` (blue in the reference wiring)
    LowTemp,
    /// temperature above `temp_high` (red in the reference wiring)
    HighTemp,
    /// humidity above `humidity_high` (green in the reference wiring)
    HighHumidity,
}
impl Indicator {
    /// Every line, in lamp-test order
    pub const ALL: [Indicator; 3] = [Indicator::HighTemp, Indicator::HighHumidity, Indicator::LowTemp];
}

/// Desired state of every indicator line
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IndicatorState {
    /// temperature below the band
    pub low_temp: bool,
    /// temperature above the band
    pub high_temp: bool,
    /// humidity above its threshold
    pub high_humidity: bool,
}
impl IndicatorState {
    /// State with every line off
    pub const OFF: IndicatorState = IndicatorState { low_temp: false, high_temp: false, high_humidity: false };

    /// State with only `indicator` on
    pub fn only(indicator: Indicator) -> Self {
        let mut state = Self::OFF;
        match indicator {
            Indicator::LowTemp => state.low_temp = true,
            Indicator::HighTemp => state.high_temp = true,
            Indicator::HighHumidity => state.high_humidity = true,
        }
        state
    }
    /// Whether `indicator` should be on
    pub fn get(&self, indicator: Indicator) -> bool {
        match indicator {
            Indicator::LowTemp => self.low_temp,
            Indicator::HighTemp => self.high_temp,
            Indicator::HighHumidity => self.high_humidity,
        }
    }
    /// Each line paired with its desired state
    pub fn iter(&self) -> impl Iterator<Item = (Indicator, bool)> + '_ {
        Indicator::ALL.into_iter().map(move |line| (line, self.get(line)))
    }
    /// No line is active: the reading is within every threshold
    pub fn is_nominal(&self) -> bool {
        !(self.low_temp || self.high_temp || self.high_humidity)
    }
}
impl fmt::Display for IndicatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nominal() {
            return write!(f, "nominal");
        }
        let mut sep = "";
        if self.high_temp {
            write!(f, "{sep}high-temp")?;
            sep = " ";
        }
        if self.low_temp {
            write!(f, "{sep}low-temp")?;
            sep = " ";
        }
        if self.high_humidity {
            write!(f, "{sep}high-humidity")?;
        }
        Ok(())
    }
}

/// Map a reading onto indicator lines; thresholds are strict
pub fn classify(reading: &Reading, thresholds: &ThresholdConfig) -> IndicatorState {
    IndicatorState {
        low_temp: reading.temperature < thresholds.temp_low,
        high_temp: reading.temperature > thresholds.temp_high,
        high_humidity: reading.humidity > thresholds.humidity_high,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::{string::ToString, vec::Vec};

    use super::*;

    fn reading(temperature: f32, humidity: f32) -> Reading {
        Reading { temperature, humidity }
    }

    #[test]
    fn high_temperature() {
        let thresholds = ThresholdConfig::new(20.0, 25.0, 60.0).unwrap();
        let state = classify(&reading(30.0, 50.0), &thresholds);
        assert_eq!(state, IndicatorState { high_temp: true, low_temp: false, high_humidity: false });
    }

    #[test]
    fn thresholds_are_strict() {
        let thresholds = ThresholdConfig::default();
        assert!(classify(&reading(25.0, 60.0), &thresholds).is_nominal());
        assert!(classify(&reading(20.0, 60.0), &thresholds).is_nominal());
        assert!(classify(&reading(25.01, 60.0), &thresholds).high_temp);
        assert!(classify(&reading(19.99, 60.0), &thresholds).low_temp);
        assert!(classify(&reading(22.0, 60.01), &thresholds).high_humidity);
    }

    #[test]
    fn humidity_is_independent() {
        let thresholds = ThresholdConfig::default();
        let cold_and_damp = classify(&reading(5.0, 90.0), &thresholds);
        assert_eq!(cold_and_damp, IndicatorState { low_temp: true, high_temp: false, high_humidity: true });
        let hot_and_damp = classify(&reading(40.0, 90.0), &thresholds);
        assert_eq!(hot_and_damp, IndicatorState { low_temp: false, high_temp: true, high_humidity: true });
    }

    #[test]
    fn temperature_flags_exclusive() {
        let thresholds = ThresholdConfig::default();
        for tenths in -500..1500 {
            let state = classify(&reading(tenths as f32 / 10.0, 0.0), &thresholds);
            assert!(!(state.low_temp && state.high_temp));
        }
    }

    #[test]
    fn rejects_bad_config() {
        assert_eq!(ThresholdConfig::new(25.0, 25.0, 60.0), Err(ConfigError::InvertedTemperatureBand));
        assert_eq!(ThresholdConfig::new(30.0, 25.0, 60.0), Err(ConfigError::InvertedTemperatureBand));
        assert_eq!(ThresholdConfig::new(f32::NAN, 25.0, 60.0), Err(ConfigError::NotFinite));
        assert_eq!(ThresholdConfig::new(20.0, 25.0, f32::INFINITY), Err(ConfigError::NotFinite));
    }

    #[test]
    fn per_line_access() {
        let state = IndicatorState { low_temp: false, high_temp: true, high_humidity: true };
        let lines: Vec<_> = state.iter().collect();
        assert_eq!(
            lines,
            [(Indicator::HighTemp, true), (Indicator::HighHumidity, true), (Indicator::LowTemp, false)]
        );
        assert_eq!(IndicatorState::only(Indicator::LowTemp).iter().filter(|(_, on)| *on).count(), 1);
    }

    #[test]
    fn display() {
        assert_eq!(IndicatorState::OFF.to_string(), "nominal");
        let state = IndicatorState { low_temp: false, high_temp: true, high_humidity: true };
        assert_eq!(state.to_string(), "high-temp high-humidity");
        assert_eq!(
            ThresholdConfig::default().to_string(),
            "Low Temp: 20.0°C, High Temp: 25.0°C, High Humidity: 60.0%"
        );
    }
}
