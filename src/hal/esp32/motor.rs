//! Two-line relay motor drive for ESP32.
//!
//! One GPIO per direction into the relay stage:
//! - Open: open line high, close line low
//! - Close: close line high, open line low
//! - Stopped: both low
//!
//! The opposite line is always dropped before the new one is raised so the
//! relay stage never sees both directions energized.

use esp_idf_hal::gpio::{Output, OutputPin, PinDriver};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;

use crate::traits::MotorDriver;

/// Relay-stage motor driver for ESP32.
///
/// # Example
///
/// ```ignore
/// use esp_idf_hal::peripherals::Peripherals;
/// use kitty_door::hal::esp32::Esp32Motor;
/// use kitty_door::traits::MotorDriver;
///
/// let p = Peripherals::take()?;
/// let mut motor = Esp32Motor::new(p.pins.gpio16, p.pins.gpio17)?;
///
/// motor.drive_open()?;
/// // ... wait for the limit switch ...
/// motor.stop()?;
/// ```
pub struct Esp32Motor<'d, O, C>
where
    O: OutputPin,
    C: OutputPin,
{
    open_line: PinDriver<'d, O, Output>,
    close_line: PinDriver<'d, C, Output>,
}

impl<'d, O, C> Esp32Motor<'d, O, C>
where
    O: OutputPin,
    C: OutputPin,
{
    /// Creates the motor driver with both lines de-energized.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(
        open_pin: impl Peripheral<P = O> + 'd,
        close_pin: impl Peripheral<P = C> + 'd,
    ) -> Result<Self, EspError> {
        let mut open_line = PinDriver::output(open_pin)?;
        let mut close_line = PinDriver::output(close_pin)?;

        open_line.set_low()?;
        close_line.set_low()?;

        Ok(Self {
            open_line,
            close_line,
        })
    }
}

impl<O, C> MotorDriver for Esp32Motor<'_, O, C>
where
    O: OutputPin,
    C: OutputPin,
{
    type Error = EspError;

    fn drive_open(&mut self) -> Result<(), EspError> {
        self.close_line.set_low()?;
        self.open_line.set_high()
    }

    fn drive_close(&mut self) -> Result<(), EspError> {
        self.open_line.set_low()?;
        self.close_line.set_high()
    }

    fn stop(&mut self) -> Result<(), EspError> {
        self.open_line.set_low()?;
        self.close_line.set_low()
    }
}
