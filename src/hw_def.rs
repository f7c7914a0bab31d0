//! Wire-level definitions for the AHT10: addresses, commands, status bits, timing and the
//! fixed-point conversions from the datasheet.

#[cfg(feature="defmt")]
use defmt::Format;

/// I²C address of the device, selected by the ADR pin
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum I2cAddr {
    /// ADR pin low (factory default)
    #[default]
    Addr38,
    /// ADR pin high
    Addr39,
}
impl I2cAddr {
    /// Get the 7-bit bus address
    pub fn as_u8(&self) -> u8 {
        match self {
            I2cAddr::Addr38 => 0x38,
            I2cAddr::Addr39 => 0x39,
        }
    }
}

/// Command opcodes understood by the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    /// Soft reset, no parameters
    SoftReset,
    /// Initialize/calibrate, followed by two configuration bytes
    Initialize,
    /// Trigger a measurement, followed by two parameter bytes
    TriggerMeasurement,
}
impl Command {
    /// The opcode byte
    pub const fn opcode(&self) -> u8 {
        match self {
            Command::SoftReset => 0xBA,
            Command::Initialize => 0xE1,
            Command::TriggerMeasurement => 0xAC,
        }
    }
}

/// Full soft-reset command
pub const SOFT_RESET_CMD: [u8; 1] = [Command::SoftReset.opcode()];
/// Full initialize command: opcode plus configuration bytes
pub const INITIALIZE_CMD: [u8; 3] = [Command::Initialize.opcode(), 0x08, 0x00];
/// Full trigger-measurement command: opcode plus parameter bytes
pub const TRIGGER_MEASUREMENT_CMD: [u8; 3] = [Command::TriggerMeasurement.opcode(), 0x33, 0x00];

/// Status bit 7: a conversion is in progress
pub const STATUS_BUSY: u8 = 0x80;
/// Status bit 3: the calibration coefficients are loaded
pub const STATUS_CALIBRATED: u8 = 0x08;

/// Settle time after soft reset
pub const RESET_SETTLE_MS: u32 = 20;
/// Settle time after the initialize command
pub const INIT_SETTLE_MS: u32 = 10;
/// Nominal conversion time after a trigger
pub const CONVERSION_MS: u32 = 80;
/// Interval between status reads while the device reports busy
pub const BUSY_POLL_INTERVAL_MS: u32 = 10;
/// Default number of status reads before giving up on a conversion
pub const DEFAULT_MAX_BUSY_POLLS: u16 = 100;

/// Length of a measurement frame: status byte plus 40-bit payload
pub const FRAME_LEN: usize = 6;

/// Mask of a 20-bit measurement field
pub const RAW_FIELD_MASK: u32 = 0x000F_FFFF;
const RAW_FULL_SCALE: f32 = 1_048_576.0; // 2^20

pub(crate) fn raw_humidity_to_percent(raw: u32) -> f32 {
    (raw as f32 / RAW_FULL_SCALE) * 100.0
}

pub(crate) fn raw_temp_to_centigrade(raw: u32) -> f32 {
    (raw as f32 / RAW_FULL_SCALE) * 200.0 - 50.0
}
