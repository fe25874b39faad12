//! ESP32 hardware abstraction layer for the door controller.
//!
//! This module provides hardware implementations for an ESP32 DevKit
//! driving the door through a dual-relay motor stage.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32 DevKit (Xtensa dual-core, 4MB Flash)
//! - **Motor stage**: two relay/driver lines, one per direction
//! - **Switches**: four microswitches to GND (internal pull-ups, active low)
//! - **Light sensor**: photoresistor divider on ADC1
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO assignments.

mod clock;
mod motor;
mod sensors;

pub use clock::{Esp32Clock, Esp32Delay};
pub use motor::Esp32Motor;
pub use sensors::Esp32Sensors;

#[cfg(feature = "wifi")]
mod wifi;
#[cfg(feature = "wifi")]
pub use wifi::Esp32Wifi;

#[cfg(feature = "wifi")]
mod gateway;
#[cfg(feature = "wifi")]
pub use gateway::{EspMqttGateway, EspMqttGatewayError};

/// Pin assignments for the ESP32 DevKit build.
///
/// The two motor lines must never share a GPIO with a switch input; the
/// relay stage holds the door wherever the lines leave it.
pub mod pins {
    // =========================================================================
    // Motor Drive
    // =========================================================================

    /// Open-direction drive line
    pub const MOTOR_OPEN: i32 = 16;

    /// Close-direction drive line
    pub const MOTOR_CLOSE: i32 = 17;

    // =========================================================================
    // Switches (active low, internal pull-ups)
    // =========================================================================

    /// Open limit switch (asserted when the door rests fully open)
    pub const DOOR_OPEN_LIMIT: i32 = 32;

    /// Close limit switch (asserted when the door rests fully closed)
    pub const DOOR_CLOSE_LIMIT: i32 = 33;

    /// Force-open override switch
    pub const FORCE_OPEN: i32 = 25;

    /// Force-close override switch
    pub const FORCE_CLOSE: i32 = 26;

    // =========================================================================
    // Light Sensor
    // =========================================================================

    /// Photoresistor divider on ADC1 channel 6 (input-only pin)
    pub const LIGHT_SENSOR: i32 = 34;
}
