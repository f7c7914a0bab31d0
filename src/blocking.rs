//! Blocking driver over [`embedded_hal::i2c::I2c`] and [`embedded_hal::delay::DelayNs`].

use crate::device_impl::{Session, READ_LEN};
use crate::hw_def::*;
use crate::types::*;

use embedded_hal::{delay::DelayNs, i2c::I2c};

/// AHT10 device driver, blocking flavour
#[derive(Debug)]
pub struct Aht10<I2C, Delay> {
    i2c: I2C,
    delay: Delay,
    session: Session,
}

impl<I2C, Delay, E> Aht10<I2C, Delay>
where
    I2C: I2c<Error = E>,
    Delay: DelayNs,
{
    /// Create a new AHT10 driver instance with the default busy-poll budget
    pub fn new(i2c: I2C, delay: Delay, i2c_addr: I2cAddr) -> Self {
        Self::with_config(i2c, delay, Config { i2c_addr, ..Config::default() })
    }

    /// Create a new AHT10 driver instance
    pub fn with_config(i2c: I2C, delay: Delay, config: Config) -> Self {
        Self { i2c, delay, session: Session::new(config) }
    }

    /// Current lifecycle state
    pub fn state(&self) -> DriverState {
        self.session.state
    }

    /// Bus address in use
    pub fn address(&self) -> I2cAddr {
        self.session.config.i2c_addr
    }

    /// Destroy the driver and return the bus and delay
    pub fn release(self) -> (I2C, Delay) {
        (self.i2c, self.delay)
    }

    /// Soft-reset and configure the device, then confirm it reports calibrated.
    ///
    /// May be called from any state; it is the only way out of [`DriverState::Faulted`].
    pub fn initialize(&mut self) -> Result<(), Error<E>> {
        let addr = self.session.addr();

        self.session.enter(DriverState::Resetting);
        let res = self.i2c.write(addr, &SOFT_RESET_CMD);
        self.session.transport(res)?;
        self.delay.delay_ms(RESET_SETTLE_MS);

        self.session.enter(DriverState::AwaitingCalibration);
        let res = self.i2c.write(addr, &INITIALIZE_CMD);
        self.session.transport(res)?;
        self.delay.delay_ms(INIT_SETTLE_MS);

        let mut status = [0u8; 1];
        let res = self.i2c.read(addr, &mut status);
        self.session.transport(res)?;
        self.session.check_calibration(StatusByte(status[0]))
    }

    /// Trigger a measurement, wait for it to complete and return it in physical units
    pub fn read_measurement(&mut self) -> Result<Reading, Error<E>> {
        self.read_measurement_cancellable(&NeverCancel)
    }

    /// As [`Self::read_measurement`], checking `cancel` before every busy-poll retry
    pub fn read_measurement_cancellable<C: Cancellation>(&mut self, cancel: &C) -> Result<Reading, Error<E>> {
        self.session.check_ready()?;
        let addr = self.session.addr();

        let res = self.i2c.write(addr, &TRIGGER_MEASUREMENT_CMD);
        self.session.transport(res)?;
        self.session.enter(DriverState::Measuring);
        self.delay.delay_ms(CONVERSION_MS);

        let mut polls: u16 = 0;
        loop {
            let mut status = [0u8; 1];
            let res = self.i2c.read(addr, &mut status);
            self.session.transport(res)?;
            polls = polls.saturating_add(1);
            if !StatusByte(status[0]).is_busy() {
                break;
            }
            self.session.busy_retry(polls, cancel)?;
            self.delay.delay_ms(BUSY_POLL_INTERVAL_MS);
        }
        trace!("aht10: conversion complete after {} status reads", polls);

        let mut read_buf = [0u8; READ_LEN];
        let res = self.i2c.read(addr, &mut read_buf);
        self.session.transport(res)?;
        self.session.accept_frame(&read_buf)
    }
}
