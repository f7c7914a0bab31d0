//! Output capabilities consumed by the monitor: indicator lines and the telemetry byte stream.

use crate::policy::{Indicator, IndicatorState};

/// A set of independently driven boolean output lines
pub trait IndicatorSink {
    /// Line driver error
    type Error;

    /// Drive one line
    fn set(&mut self, indicator: Indicator, active: bool) -> Result<(), Self::Error>;

    /// Drive every line to the given state
    fn apply(&mut self, state: IndicatorState) -> Result<(), Self::Error> {
        for (indicator, active) in state.iter() {
            self.set(indicator, active)?;
        }
        Ok(())
    }
}

impl<T: IndicatorSink + ?Sized> IndicatorSink for &mut T {
    type Error = T::Error;

    fn set(&mut self, indicator: Indicator, active: bool) -> Result<(), Self::Error> {
        (**self).set(indicator, active)
    }
}

#[cfg(feature = "blocking")]
pub use self::pins::PinIndicators;

#[cfg(feature = "blocking")]
mod pins {
    use super::IndicatorSink;
    use crate::policy::Indicator;

    use embedded_hal::digital::OutputPin;

    /// Indicator lines backed by three GPIO output pins
    #[derive(Debug)]
    pub struct PinIndicators<Low, High, Humid> {
        low_temp: Low,
        high_temp: High,
        high_humidity: Humid,
    }

    impl<Low, High, Humid, E> PinIndicators<Low, High, Humid>
    where
        Low: OutputPin<Error = E>,
        High: OutputPin<Error = E>,
        Humid: OutputPin<Error = E>,
    {
        /// Wrap the three pins; they are not touched until the first `set`
        pub fn new(low_temp: Low, high_temp: High, high_humidity: Humid) -> Self {
            Self { low_temp, high_temp, high_humidity }
        }

        /// Return the pins
        pub fn release(self) -> (Low, High, Humid) {
            (self.low_temp, self.high_temp, self.high_humidity)
        }
    }

    impl<Low, High, Humid, E> IndicatorSink for PinIndicators<Low, High, Humid>
    where
        Low: OutputPin<Error = E>,
        High: OutputPin<Error = E>,
        Humid: OutputPin<Error = E>,
    {
        type Error = E;

        fn set(&mut self, indicator: Indicator, active: bool) -> Result<(), E> {
            match indicator {
                Indicator::LowTemp => self.low_temp.set_state(active.into()),
                Indicator::HighTemp => self.high_temp.set_state(active.into()),
                Indicator::HighHumidity => self.high_humidity.set_state(active.into()),
            }
        }
    }
}
