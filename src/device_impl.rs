use crate::hw_def::*;
use crate::types::*;

use core::fmt;

#[cfg(feature = "crc")]
use crc::{Crc, CRC_8_NRSC_5};

#[cfg(feature = "crc")]
const CRC: crc::Crc<u8> = Crc::<u8>::new(&CRC_8_NRSC_5);

/// Bytes read back for one measurement: the frame, plus a trailing CRC when checked
#[cfg(not(feature = "crc"))]
pub(crate) const READ_LEN: usize = FRAME_LEN;
#[cfg(feature = "crc")]
pub(crate) const READ_LEN: usize = FRAME_LEN + 1;

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriverState::Uninitialized => "uninitialized",
            DriverState::Resetting => "resetting",
            DriverState::AwaitingCalibration => "awaiting-calibration",
            DriverState::Ready => "ready",
            DriverState::Measuring => "measuring",
            DriverState::Faulted => "faulted",
        };
        f.write_str(name)
    }
}

/// Protocol bookkeeping shared by the blocking and async drivers.
///
/// The bus flavours only differ in whether they `.await`; every state transition and every
/// decision about a byte the device sent back lives here.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) config: Config,
    pub(crate) state: DriverState,
}

impl Session {
    pub(crate) fn new(mut config: Config) -> Self {
        // the status byte is always read at least once
        config.max_busy_polls = config.max_busy_polls.max(1);
        Self { config, state: DriverState::Uninitialized }
    }

    pub(crate) fn addr(&self) -> u8 {
        self.config.i2c_addr.as_u8()
    }

    pub(crate) fn enter(&mut self, next: DriverState) {
        trace!("aht10: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Map a bus result, faulting the driver on failure
    pub(crate) fn transport<T, E>(&mut self, result: Result<T, E>) -> Result<T, Error<E>> {
        match result {
            Ok(val) => Ok(val),
            Err(e) => {
                warn!("aht10: transport failure while {}", self.state);
                self.enter(DriverState::Faulted);
                Err(Error::I2c(e))
            }
        }
    }

    pub(crate) fn check_calibration<E>(&mut self, status: StatusByte) -> Result<(), Error<E>> {
        if !status.is_calibrated() {
            warn!("aht10: not calibrated (status: {:#x})", status.0);
            self.enter(DriverState::Faulted);
            return Err(Error::Calibration { status: status.0 });
        }
        debug!("aht10: initialized (status: {:#x})", status.0);
        self.enter(DriverState::Ready);
        Ok(())
    }

    /// Gate a measurement request on the lifecycle state
    pub(crate) fn check_ready<E>(&self) -> Result<(), Error<E>> {
        match self.state {
            // an abandoned measurement does not poison the device
            DriverState::Ready | DriverState::Measuring => Ok(()),
            DriverState::Faulted => Err(Error::Faulted),
            DriverState::Uninitialized
            | DriverState::Resetting
            | DriverState::AwaitingCalibration => Err(Error::NotInitialized),
        }
    }

    /// Decide whether another status read may follow `polls` busy reads
    pub(crate) fn busy_retry<E, C: Cancellation>(&mut self, polls: u16, cancel: &C) -> Result<(), Error<E>> {
        if polls >= self.config.max_busy_polls {
            warn!("aht10: still busy after {} status reads", polls);
            self.enter(DriverState::Ready);
            return Err(Error::Timeout);
        }
        if cancel.is_cancelled() {
            debug!("aht10: busy-poll cancelled after {} status reads", polls);
            self.enter(DriverState::Ready);
            return Err(Error::Cancelled);
        }
        trace!("aht10: busy, status read {}/{}", polls, self.config.max_busy_polls);
        Ok(())
    }

    /// Validate the bytes read after the busy flag cleared and convert them
    pub(crate) fn accept_frame<E>(&mut self, read_buf: &[u8; READ_LEN]) -> Result<Reading, Error<E>> {
        self.enter(DriverState::Ready);

        let mut bytes = [0u8; FRAME_LEN];
        bytes.copy_from_slice(&read_buf[..FRAME_LEN]);
        let frame = RawFrame(bytes);

        #[cfg(feature = "crc")]
        {
            let crc_expect = CRC.checksum(&frame.0);
            if read_buf[FRAME_LEN] != crc_expect {
                warn!("aht10: crc mismatch: read_crc={}, crc_expect={}", read_buf[FRAME_LEN], crc_expect);
                return Err(Error::CrcMismatch);
            }
        }

        if frame.status().is_busy() {
            warn!("aht10: frame status {:#x} still busy", frame.0[0]);
            return Err(Error::StaleFrame);
        }

        let reading = frame.decode();
        debug!("aht10: {} degC, {} %RH", reading.temperature, reading.humidity);
        Ok(reading)
    }
}
