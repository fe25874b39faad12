//! Hardware abstraction traits for door sensing, motor drive, and timing.
//!
//! This module defines the hardware interfaces that allow kitty-door to
//! work across different platforms (ESP32, desktop mocks, etc.).
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`DoorSense`] | Limit and override switch inputs |
//! | [`LightSensor`] | Ambient light level (photo sensor on ADC) |
//! | [`MotorDriver`] | Two-line open/close motor drive |
//! | [`Clock`] | Time source for `no_std` environments |
//! | [`Delay`] | Blocking delay used by the poll loop and door operations |
//!
//! # Switch Polarity
//!
//! All four digital inputs are wired active-low with internal pull-ups:
//! a switch reads [`Level::Low`] when asserted. The inversion lives in the
//! default predicate methods on [`DoorSense`] so that every implementation
//! gets it right by construction; it governs every decision the door state
//! machine makes.
//!
//! # Example
//!
//! ```rust
//! use kitty_door::traits::{DoorSense, MotorDriver};
//! use kitty_door::hal::{MockMotor, MockSensors};
//!
//! let mut sensors = MockSensors::new();
//! sensors.set_door_closed();
//! assert!(sensors.is_door_closed());
//! assert!(!sensors.is_door_open());
//!
//! let mut motor = MockMotor::new();
//! motor.drive_open().unwrap();
//! assert!(motor.open_line());
//! motor.stop().unwrap();
//! assert!(!motor.open_line() && !motor.close_line());
//! ```

use crate::commands::OverrideKind;

/// Logic level of a digital input pin.
///
/// The door's switches are active-low: asserted switches read [`Low`](Self::Low).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Level {
    /// Pin reads high (switch released, with pull-up).
    High,
    /// Pin reads low (switch asserted).
    Low,
}

impl Level {
    /// Returns true if the pin reads low (switch asserted).
    #[inline]
    pub const fn is_low(self) -> bool {
        matches!(self, Level::Low)
    }
}

impl Default for Level {
    /// Pull-ups mean an untouched input reads high.
    fn default() -> Self {
        Level::High
    }
}

/// Limit and override switch inputs.
///
/// Wraps the four digital reads into named predicates. The raw `*_level`
/// methods exist because the controller diffs the override switch levels
/// between poll cycles to detect changes; everything else should use the
/// boolean predicates.
///
/// # Implementation Notes
///
/// - All switches are active-low (see module docs); implementations return
///   the raw pin level and the default methods apply the inversion.
/// - No debouncing is expected beyond the fixed poll interval; mechanical
///   bounce is the hardware's responsibility.
/// - Methods take `&mut self` so implementations may buffer or count reads.
pub trait DoorSense {
    /// Raw level of the open-limit switch (low = door fully open).
    fn open_limit_level(&mut self) -> Level;

    /// Raw level of the close-limit switch (low = door fully closed).
    fn close_limit_level(&mut self) -> Level;

    /// Raw level of the force-open override switch.
    fn force_open_level(&mut self) -> Level;

    /// Raw level of the force-close override switch.
    fn force_close_level(&mut self) -> Level;

    /// True when the door rests at its fully open position.
    fn is_door_open(&mut self) -> bool {
        self.open_limit_level().is_low()
    }

    /// True when the door rests at its fully closed position.
    fn is_door_closed(&mut self) -> bool {
        self.close_limit_level().is_low()
    }

    /// True when the hardware force-open switch is asserted.
    fn is_force_open_enabled(&mut self) -> bool {
        self.force_open_level().is_low()
    }

    /// True when the hardware force-close switch is asserted.
    fn is_force_close_enabled(&mut self) -> bool {
        self.force_close_level().is_low()
    }

    /// True when either override switch is asserted.
    fn is_override_active(&mut self) -> bool {
        self.is_force_close_enabled() || self.is_force_open_enabled()
    }

    /// Returns the active override, if any.
    ///
    /// Close wins when both switches are somehow asserted at once.
    fn override_kind(&mut self) -> OverrideKind {
        if self.is_force_close_enabled() {
            OverrideKind::ForceClose
        } else if self.is_force_open_enabled() {
            OverrideKind::ForceOpen
        } else {
            OverrideKind::None
        }
    }
}

/// Ambient light sensor (photo sensor on an ADC pin).
///
/// Readings are raw ADC counts in `0..=1023`; the door options clamp their
/// thresholds to the same range.
pub trait LightSensor {
    /// Error type for sensor reads.
    ///
    /// Must be `Debug` so a failed read can be logged and the previous
    /// reading kept.
    type Error: core::fmt::Debug;

    /// Read the current light level.
    fn read_level(&mut self) -> Result<u16, Self::Error>;
}

/// Two-line motor driver for the door actuator.
///
/// One output line per direction. The caller (the door state machine)
/// guarantees the two lines are never left simultaneously energized at
/// rest: `stop` forces both low, and each `drive_*` sets exactly one line
/// high and the other low.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use kitty_door::traits::MotorDriver;
///
/// struct MyMotor { /* gpio handles */ }
///
/// impl MotorDriver for MyMotor {
///     type Error = ();
///
///     fn drive_open(&mut self) -> Result<(), ()> {
///         // close line low, open line high
///         Ok(())
///     }
///
///     fn drive_close(&mut self) -> Result<(), ()> {
///         // open line low, close line high
///         Ok(())
///     }
///
///     fn stop(&mut self) -> Result<(), ()> {
///         // both lines low
///         Ok(())
///     }
/// }
/// ```
pub trait MotorDriver {
    /// Error type for motor operations.
    type Error;

    /// Energize the open line (and de-energize the close line).
    fn drive_open(&mut self) -> Result<(), Self::Error>;

    /// Energize the close line (and de-energize the open line).
    fn drive_close(&mut self) -> Result<(), Self::Error>;

    /// De-energize both lines.
    fn stop(&mut self) -> Result<(), Self::Error>;
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for operation timeouts and the
/// keep-alive ping. On desktop this can wrap `std::time::Instant`; on
/// embedded, a hardware timer.
///
/// # Example
///
/// ```rust
/// use kitty_door::traits::Clock;
/// use kitty_door::hal::MockClock;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

/// Blocking delay.
///
/// The door state machine deliberately busy-waits while a door operation is
/// in flight (bounded by the operation timeout); this trait is the delay it
/// blocks on, and the poll loop's fixed period. Implementations must
/// actually block the calling thread of control.
pub trait Delay {
    /// Block for the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_default_is_high() {
        assert_eq!(Level::default(), Level::High);
        assert!(!Level::default().is_low());
    }

    #[test]
    fn level_is_low() {
        assert!(Level::Low.is_low());
        assert!(!Level::High.is_low());
    }

    // =========================================================================
    // DoorSense Default Methods Tests
    // =========================================================================

    struct TestSense {
        open_limit: Level,
        close_limit: Level,
        force_open: Level,
        force_close: Level,
    }

    impl TestSense {
        fn released() -> Self {
            Self {
                open_limit: Level::High,
                close_limit: Level::High,
                force_open: Level::High,
                force_close: Level::High,
            }
        }
    }

    impl DoorSense for TestSense {
        fn open_limit_level(&mut self) -> Level {
            self.open_limit
        }

        fn close_limit_level(&mut self) -> Level {
            self.close_limit
        }

        fn force_open_level(&mut self) -> Level {
            self.force_open
        }

        fn force_close_level(&mut self) -> Level {
            self.force_close
        }
    }

    #[test]
    fn predicates_are_active_low() {
        let mut sense = TestSense::released();
        assert!(!sense.is_door_open());
        assert!(!sense.is_door_closed());

        sense.open_limit = Level::Low;
        assert!(sense.is_door_open());

        sense.open_limit = Level::High;
        sense.close_limit = Level::Low;
        assert!(sense.is_door_closed());
    }

    #[test]
    fn override_kind_none_when_released() {
        let mut sense = TestSense::released();
        assert!(!sense.is_override_active());
        assert_eq!(sense.override_kind(), OverrideKind::None);
    }

    #[test]
    fn override_kind_single_switch() {
        let mut sense = TestSense::released();
        sense.force_open = Level::Low;
        assert_eq!(sense.override_kind(), OverrideKind::ForceOpen);

        sense.force_open = Level::High;
        sense.force_close = Level::Low;
        assert_eq!(sense.override_kind(), OverrideKind::ForceClose);
    }

    #[test]
    fn override_kind_close_wins_ties() {
        let mut sense = TestSense::released();
        sense.force_open = Level::Low;
        sense.force_close = Level::Low;
        assert_eq!(sense.override_kind(), OverrideKind::ForceClose);
    }
}
