//! Monitoring loop body: read → classify → drive indicators → emit telemetry.
//!
//! The caller owns the loop and the sleep between cycles; a failed measurement is reported once
//! per cycle and never ends the loop.

use crate::blocking::Aht10;
use crate::policy::{classify, Indicator, IndicatorState, ThresholdConfig};
use crate::sink::IndicatorSink;
use crate::telemetry::{self, TelemetryError, READ_FAILURE_LINE, STARTUP_BANNER};
use crate::types::*;

use core::fmt;
use embedded_hal::{delay::DelayNs, i2c::I2c};

#[cfg(feature="defmt")]
use defmt::Format;

/// How long each line stays lit during [`Monitor::lamp_test`]
pub const LAMP_TEST_STEP_MS: u32 = 500;

/// Failures that stop a monitoring step
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug)]
pub enum MonitorError<E, IndE, SerialE> {
    /// sensor failure during `start()`
    Sensor(Error<E>),
    /// an indicator line could not be driven
    Indicator(IndE),
    /// the telemetry stream rejected a write
    Serial(SerialE),
    /// a telemetry line could not be formatted
    Telemetry(TelemetryError),
}
impl<E, IndE, SerialE> From<TelemetryError> for MonitorError<E, IndE, SerialE> {
    fn from(err: TelemetryError) -> Self {
        MonitorError::Telemetry(err)
    }
}
impl<E: fmt::Debug, IndE: fmt::Debug, SerialE: fmt::Debug> fmt::Display for MonitorError<E, IndE, SerialE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::Sensor(e) => write!(f, "sensor: {e}"),
            MonitorError::Indicator(e) => write!(f, "indicator line error: {e:?}"),
            MonitorError::Serial(e) => write!(f, "telemetry stream error: {e:?}"),
            MonitorError::Telemetry(e) => write!(f, "telemetry: {e}"),
        }
    }
}

/// Result of one monitoring cycle
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, PartialEq)]
pub enum Outcome<E> {
    /// a reading was taken, classified and emitted
    Measured {
        /// the reading
        reading: Reading,
        /// indicator lines applied for it
        indicators: IndicatorState,
    },
    /// the sensor failed this cycle; the failure line was emitted and the indicators left as they were
    SensorFailed(Error<E>),
}

/// Sensor, indicator lines and telemetry stream wired together
#[derive(Debug)]
pub struct Monitor<I2C, Delay, Ind, Serial> {
    sensor: Aht10<I2C, Delay>,
    indicators: Ind,
    serial: Serial,
    thresholds: ThresholdConfig,
}

impl<I2C, Delay, Ind, Serial, E> Monitor<I2C, Delay, Ind, Serial>
where
    I2C: I2c<Error = E>,
    Delay: DelayNs,
    Ind: IndicatorSink,
    Serial: embedded_io::Write,
{
    /// Wire up a monitor; nothing is sent until `start()` or `cycle()`
    pub fn new(sensor: Aht10<I2C, Delay>, indicators: Ind, serial: Serial, thresholds: ThresholdConfig) -> Self {
        Self { sensor, indicators, serial, thresholds }
    }

    /// Thresholds in use
    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// The sensor driver
    pub fn sensor(&self) -> &Aht10<I2C, Delay> {
        &self.sensor
    }

    /// Return the parts
    pub fn release(self) -> (Aht10<I2C, Delay>, Ind, Serial) {
        (self.sensor, self.indicators, self.serial)
    }

    /// Light each line alone for [`LAMP_TEST_STEP_MS`], then switch everything off
    pub fn lamp_test<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), MonitorError<E, Ind::Error, Serial::Error>> {
        for line in Indicator::ALL {
            self.indicators.apply(IndicatorState::only(line)).map_err(MonitorError::Indicator)?;
            delay.delay_ms(LAMP_TEST_STEP_MS);
        }
        self.indicators.apply(IndicatorState::OFF).map_err(MonitorError::Indicator)
    }

    /// Initialize the sensor and announce the monitor on the telemetry stream
    pub fn start(&mut self) -> Result<(), MonitorError<E, Ind::Error, Serial::Error>> {
        self.sensor.initialize().map_err(MonitorError::Sensor)?;
        debug!("monitor: thresholds {}", self.thresholds);
        self.send(STARTUP_BANNER)
    }

    /// Run one cycle stamped with `timestamp_ms`.
    ///
    /// A sensor that is not ready (never started, or faulted by an earlier cycle) is
    /// re-initialized first. Sensor failures come back as [`Outcome::SensorFailed`].
    pub fn cycle(&mut self, timestamp_ms: u64) -> Result<Outcome<E>, MonitorError<E, Ind::Error, Serial::Error>> {
        let reading = match self.measure() {
            Ok(reading) => reading,
            Err(err) => {
                warn!("monitor: sensor read failed, driver {}", self.sensor.state());
                self.send(READ_FAILURE_LINE)?;
                return Ok(Outcome::SensorFailed(err));
            }
        };

        let indicators = classify(&reading, &self.thresholds);
        debug!("monitor: {} degC, {} %RH: {}", reading.temperature, reading.humidity, indicators);
        self.indicators.apply(indicators).map_err(MonitorError::Indicator)?;

        let telemetry = telemetry::encode(&reading, timestamp_ms)?;
        for line in telemetry.lines() {
            self.send(line)?;
        }
        Ok(Outcome::Measured { reading, indicators })
    }

    fn measure(&mut self) -> Result<Reading, Error<E>> {
        if self.sensor.state() != DriverState::Ready {
            self.sensor.initialize()?;
        }
        self.sensor.read_measurement()
    }

    fn send(&mut self, line: &str) -> Result<(), MonitorError<E, Ind::Error, Serial::Error>> {
        self.serial.write_all(line.as_bytes()).map_err(MonitorError::Serial)?;
        self.serial.flush().map_err(MonitorError::Serial)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::{string::{String, ToString}, vec, vec::Vec};

    use super::*;
    use crate::device_impl::test_support::{frame_bytes, CountingDelay};
    use crate::hw_def::I2cAddr;
    use crate::sink::PinIndicators;

    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    const ADDR: u8 = 0x38;

    /// Serial stream that keeps everything written to it
    #[derive(Debug, Default)]
    struct Capture {
        bytes: Vec<u8>,
    }
    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.bytes.clone()).unwrap()
        }
    }
    impl embedded_io::ErrorType for Capture {
        type Error = embedded_io::ErrorKind;
    }
    impl embedded_io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn init() -> Vec<Transaction> {
        vec![
            Transaction::write(ADDR, vec![0xBA]),
            Transaction::write(ADDR, vec![0xE1, 0x08, 0x00]),
            Transaction::read(ADDR, vec![0x08]),
        ]
    }

    fn measurement(raw_humidity: u32, raw_temperature: u32) -> Vec<Transaction> {
        let frame = [
            0x08,
            (raw_humidity >> 12) as u8,
            (raw_humidity >> 4) as u8,
            ((raw_humidity & 0x0F) << 4 | raw_temperature >> 16) as u8,
            (raw_temperature >> 8) as u8,
            raw_temperature as u8,
        ];
        vec![
            Transaction::write(ADDR, vec![0xAC, 0x33, 0x00]),
            Transaction::read(ADDR, vec![0x08]),
            Transaction::read(ADDR, frame_bytes(frame)),
        ]
    }

    type TestMonitor = Monitor<I2cMock, CountingDelay, PinIndicators<PinMock, PinMock, PinMock>, Capture>;

    fn monitor(i2c: &[Transaction], low: &[PinTransaction], high: &[PinTransaction], humid: &[PinTransaction]) -> TestMonitor {
        let sensor = Aht10::new(I2cMock::new(i2c), CountingDelay::new(), I2cAddr::Addr38);
        let pins = PinIndicators::new(PinMock::new(low), PinMock::new(high), PinMock::new(humid));
        Monitor::new(sensor, pins, Capture::default(), ThresholdConfig::default())
    }

    fn finish(monitor: TestMonitor) -> Capture {
        let (sensor, pins, serial) = monitor.release();
        let (mut i2c, _) = sensor.release();
        i2c.done();
        let (mut low, mut high, mut humid) = pins.release();
        low.done();
        high.done();
        humid.done();
        serial
    }

    #[test]
    fn start_then_hot_reading() {
        let mut i2c = init();
        // 50 %RH, ~30 °C
        i2c.append(&mut measurement(0x80000, 0x66666));
        let mut monitor = monitor(
            &i2c,
            &[PinTransaction::set(State::Low)],
            &[PinTransaction::set(State::High)],
            &[PinTransaction::set(State::Low)],
        );

        monitor.start().unwrap();
        let outcome = monitor.cycle(2000).unwrap();
        match outcome {
            Outcome::Measured { reading, indicators } => {
                assert_eq!(reading.humidity, 50.0);
                assert!((reading.temperature - 30.0).abs() < 0.01);
                assert_eq!(indicators, IndicatorState { low_temp: false, high_temp: true, high_humidity: false });
            }
            other => panic!("unexpected outcome {other:?}"),
        }

        let serial = finish(monitor);
        assert_eq!(
            serial.text(),
            "AHT10 Temperature & Humidity Monitor Started\r\n\
             {\"temperature\":30.00,\"humidity\":50.00,\"timestamp\":2000}\r\n\
             TEMP: 30.00°C, HUMID: 50.00%, TIME: 2000ms\r\n"
        );
    }

    #[test]
    fn failed_read_reported_then_recovered() {
        let mut i2c = init();
        i2c.push(Transaction::write(ADDR, vec![0xAC, 0x33, 0x00]).with_error(ErrorKind::Other));
        i2c.append(&mut init());
        // 75 %RH, ~10 °C
        i2c.append(&mut measurement(0xC0000, 0x4CCCC));
        let mut monitor = monitor(
            &i2c,
            &[PinTransaction::set(State::High)],
            &[PinTransaction::set(State::Low)],
            &[PinTransaction::set(State::High)],
        );

        monitor.start().unwrap();
        assert_eq!(monitor.cycle(2000).unwrap(), Outcome::SensorFailed(Error::I2c(ErrorKind::Other)));
        assert_eq!(monitor.sensor().state(), DriverState::Faulted);

        match monitor.cycle(4000).unwrap() {
            Outcome::Measured { indicators, .. } => {
                assert_eq!(indicators, IndicatorState { low_temp: true, high_temp: false, high_humidity: true });
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(monitor.sensor().state(), DriverState::Ready);

        let text = finish(monitor).text();
        let lines: Vec<&str> = text.split_inclusive("\r\n").collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "ERROR: Sensor read failed\r\n");
        assert!(lines[2].starts_with("{\"temperature\":10.00,\"humidity\":75.00,\"timestamp\":4000}"));
    }

    #[test]
    fn cycle_initializes_unstarted_sensor() {
        let mut i2c = init();
        // 30 %RH, ~22.5 °C
        i2c.append(&mut measurement(0x4CCCC, 0x5CCCC));
        let mut monitor = monitor(
            &i2c,
            &[PinTransaction::set(State::Low)],
            &[PinTransaction::set(State::Low)],
            &[PinTransaction::set(State::Low)],
        );
        match monitor.cycle(0).unwrap() {
            Outcome::Measured { indicators, .. } => assert!(indicators.is_nominal()),
            other => panic!("unexpected outcome {other:?}"),
        }
        let serial = finish(monitor);
        assert!(!serial.text().contains("Monitor Started"));
    }

    #[test]
    fn uncalibrated_start_fails() {
        let i2c = [
            Transaction::write(ADDR, vec![0xBA]),
            Transaction::write(ADDR, vec![0xE1, 0x08, 0x00]),
            Transaction::read(ADDR, vec![0x00]),
        ];
        let mut monitor = monitor(&i2c, &[], &[], &[]);
        assert!(matches!(
            monitor.start(),
            Err(MonitorError::Sensor(Error::Calibration { status: 0x00 }))
        ));
        assert!(finish(monitor).bytes.is_empty());
    }

    #[test]
    fn monitor_error_display() {
        let err: MonitorError<ErrorKind, (), embedded_io::ErrorKind> = MonitorError::Sensor(Error::Timeout);
        assert_eq!(err.to_string(), "sensor: timed out waiting for measurement");
        let err: MonitorError<ErrorKind, (), embedded_io::ErrorKind> = TelemetryError::Overflow.into();
        assert_eq!(err.to_string(), "telemetry: telemetry line exceeds 128 bytes");
        let err: MonitorError<ErrorKind, (), embedded_io::ErrorKind> = MonitorError::Serial(embedded_io::ErrorKind::Other);
        assert_eq!(err.to_string(), "telemetry stream error: Other");
    }

    #[test]
    fn lamp_test_sequence() {
        let (h, l) = (PinTransaction::set(State::High), PinTransaction::set(State::Low));
        let mut monitor = monitor(
            &[],
            &[l.clone(), l.clone(), h.clone(), l.clone()],
            &[h.clone(), l.clone(), l.clone(), l.clone()],
            &[l.clone(), h.clone(), l.clone(), l.clone()],
        );
        let mut delay = CountingDelay::new();
        monitor.lamp_test(&mut delay).unwrap();
        assert_eq!(delay.waits_ms, vec![500, 500, 500]);
        finish(monitor);
    }
}
