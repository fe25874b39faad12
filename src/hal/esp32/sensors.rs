//! Switch and light sensor inputs for ESP32.
//!
//! The four microswitches are wired to GND and read through internal
//! pull-ups, so every switch is active low as the [`DoorSense`] contract
//! expects. The photoresistor divider hangs off ADC1.

use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::adc::Adc;
use esp_idf_hal::gpio::{ADCPin, Input, InputPin, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;

use crate::traits::{DoorSense, Level, LightSensor};

/// Combined switch and light inputs for ESP32.
///
/// # Example
///
/// ```ignore
/// use esp_idf_hal::peripherals::Peripherals;
/// use kitty_door::hal::esp32::Esp32Sensors;
///
/// let p = Peripherals::take()?;
/// let sensors = Esp32Sensors::new(
///     p.pins.gpio32, // open limit
///     p.pins.gpio33, // close limit
///     p.pins.gpio25, // force open
///     p.pins.gpio26, // force close
///     p.adc1,
///     p.pins.gpio34, // photoresistor
/// )?;
/// ```
pub struct Esp32Sensors<'d, OL, CL, FO, FC, P>
where
    OL: InputPin + OutputPin,
    CL: InputPin + OutputPin,
    FO: InputPin + OutputPin,
    FC: InputPin + OutputPin,
    P: ADCPin,
{
    open_limit: PinDriver<'d, OL, Input>,
    close_limit: PinDriver<'d, CL, Input>,
    force_open: PinDriver<'d, FO, Input>,
    force_close: PinDriver<'d, FC, Input>,
    light: AdcChannelDriver<'d, P, AdcDriver<'d, P::Adc>>,
}

impl<'d, OL, CL, FO, FC, P> Esp32Sensors<'d, OL, CL, FO, FC, P>
where
    OL: InputPin + OutputPin,
    CL: InputPin + OutputPin,
    FO: InputPin + OutputPin,
    FC: InputPin + OutputPin,
    P: ADCPin,
{
    /// Configure the four switch inputs with pull-ups and the ADC channel.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO or ADC initialization fails.
    pub fn new<A>(
        open_limit_pin: impl Peripheral<P = OL> + 'd,
        close_limit_pin: impl Peripheral<P = CL> + 'd,
        force_open_pin: impl Peripheral<P = FO> + 'd,
        force_close_pin: impl Peripheral<P = FC> + 'd,
        adc: impl Peripheral<P = A> + 'd,
        light_pin: impl Peripheral<P = P> + 'd,
    ) -> Result<Self, EspError>
    where
        A: Adc,
        P: ADCPin<Adc = A>,
    {
        let mut open_limit = PinDriver::input(open_limit_pin)?;
        let mut close_limit = PinDriver::input(close_limit_pin)?;
        let mut force_open = PinDriver::input(force_open_pin)?;
        let mut force_close = PinDriver::input(force_close_pin)?;

        open_limit.set_pull(Pull::Up)?;
        close_limit.set_pull(Pull::Up)?;
        force_open.set_pull(Pull::Up)?;
        force_close.set_pull(Pull::Up)?;

        // 11dB attenuation covers the full divider swing.
        let channel_config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };
        let adc_driver = AdcDriver::new(adc)?;
        let light = AdcChannelDriver::new(adc_driver, light_pin, &channel_config)?;

        Ok(Self {
            open_limit,
            close_limit,
            force_open,
            force_close,
            light,
        })
    }
}

fn level_of(is_low: bool) -> Level {
    if is_low {
        Level::Low
    } else {
        Level::High
    }
}

impl<OL, CL, FO, FC, P> DoorSense for Esp32Sensors<'_, OL, CL, FO, FC, P>
where
    OL: InputPin + OutputPin,
    CL: InputPin + OutputPin,
    FO: InputPin + OutputPin,
    FC: InputPin + OutputPin,
    P: ADCPin,
{
    fn open_limit_level(&mut self) -> Level {
        level_of(self.open_limit.is_low())
    }

    fn close_limit_level(&mut self) -> Level {
        level_of(self.close_limit.is_low())
    }

    fn force_open_level(&mut self) -> Level {
        level_of(self.force_open.is_low())
    }

    fn force_close_level(&mut self) -> Level {
        level_of(self.force_close.is_low())
    }
}

impl<OL, CL, FO, FC, P> LightSensor for Esp32Sensors<'_, OL, CL, FO, FC, P>
where
    OL: InputPin + OutputPin,
    CL: InputPin + OutputPin,
    FO: InputPin + OutputPin,
    FC: InputPin + OutputPin,
    P: ADCPin,
{
    type Error = EspError;

    fn read_level(&mut self) -> Result<u16, EspError> {
        // The thresholds assume the legacy 10-bit range, so fold the
        // 12-bit ADC reading down to 0..=1023.
        let raw = self.light.read()?;
        Ok(raw >> 2)
    }
}
