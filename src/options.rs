//! Door options, live sensor snapshot, and the one-shot pending command.
//!
//! [`DoorOptions::apply_update`] is a pure reducer over the inbound
//! key/value stream from the sync gateway: it validates and applies each
//! recognized key and ignores anything malformed, preserving the prior
//! value. A bad remote payload must never wedge the door.
//!
//! Recognized keys:
//!
//! | Key | Effect |
//! |-----|--------|
//! | `openLightLevel` | open threshold, clamped to `0..=1023` |
//! | `closeLightLevel` | close threshold, clamped to `0..=1023` |
//! | `delayOpening` / `delayClosing` | reserved flags, parse from `"true"` |
//! | `delayOpeningVal` / `delayClosingVal` | reserved values, non-negative only |
//! | `overrideAuto` | manual suppression of automatic mode |
//! | `command` | raw command word into the pending slot, unvalidated |
//!
//! The delay-opening/closing feature is represented in data but enacted by
//! no operation; it is carried as-is (reserved, inert).

extern crate alloc;
use alloc::string::String;

use log::{debug, warn};

use crate::traits::Level;

/// Lowest reportable light level (ADC floor).
pub const MIN_LIGHT_LEVEL: u16 = 0;

/// Highest reportable light level (10-bit ADC ceiling).
pub const MAX_LIGHT_LEVEL: u16 = 1023;

// Inbound update keys (fixed by the remote end).

/// Key for the close light threshold.
pub const KEY_CLOSE_LIGHT_LEVEL: &str = "closeLightLevel";
/// Key for the open light threshold.
pub const KEY_OPEN_LIGHT_LEVEL: &str = "openLightLevel";
/// Key for the reserved delay-closing value.
pub const KEY_DELAY_CLOSING_VAL: &str = "delayClosingVal";
/// Key for the reserved delay-opening value.
pub const KEY_DELAY_OPENING_VAL: &str = "delayOpeningVal";
/// Key for the reserved delay-opening flag.
pub const KEY_DELAY_OPENING: &str = "delayOpening";
/// Key for the reserved delay-closing flag.
pub const KEY_DELAY_CLOSING: &str = "delayClosing";
/// Key for the manual automatic-mode suppression flag.
pub const KEY_OVERRIDE_AUTO: &str = "overrideAuto";
/// Key carrying a remote command word.
pub const KEY_COMMAND: &str = "command";

/// Tunable door configuration, mutated only by inbound sync updates.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoorOptions {
    /// Light level at or above which automatic mode opens the door.
    pub open_light_level: u16,
    /// Light level at or below which automatic mode closes the door.
    pub close_light_level: u16,
    /// Reserved: delay automatic opening (not enacted).
    pub delay_opening: bool,
    /// Reserved: delay automatic closing (not enacted).
    pub delay_closing: bool,
    /// Reserved: delay-opening duration (not enacted).
    pub delay_opening_val: i64,
    /// Reserved: delay-closing duration (not enacted).
    pub delay_closing_val: i64,
    /// Manual suppression of automatic mode (set remotely, cleared by any
    /// hardware override change).
    pub override_auto: bool,
}

impl Default for DoorOptions {
    fn default() -> Self {
        Self {
            open_light_level: 190,
            close_light_level: 40,
            delay_opening: false,
            delay_closing: false,
            delay_opening_val: 0,
            delay_closing_val: 0,
            override_auto: false,
        }
    }
}

impl DoorOptions {
    /// True when the thresholds are inverted (`open < close`).
    ///
    /// Under that misconfiguration both automatic branches can be true on
    /// different cycles. The reducer does not silently reorder the values;
    /// it only warns, and the automatic mode runs the configuration as
    /// given.
    pub fn thresholds_inverted(&self) -> bool {
        self.open_light_level < self.close_light_level
    }

    /// Apply one inbound key/value pair.
    ///
    /// Unrecognized keys and malformed values are ignored (prior value
    /// preserved). The `command` key writes the raw value into `pending`
    /// without validation; it is parsed at consumption.
    pub fn apply_update(
        &mut self,
        key: &str,
        value: &str,
        pending: &mut PendingCommand,
        readings: &mut SensorReadings,
    ) {
        match key {
            KEY_CLOSE_LIGHT_LEVEL => {
                if let Some(level) = parse_light_level(value) {
                    self.close_light_level = level;
                    self.warn_if_inverted();
                }
            }
            KEY_OPEN_LIGHT_LEVEL => {
                if let Some(level) = parse_light_level(value) {
                    self.open_light_level = level;
                    self.warn_if_inverted();
                }
            }
            KEY_DELAY_CLOSING_VAL => {
                if let Some(v) = parse_non_negative(value) {
                    self.delay_closing_val = v;
                    readings.delay_closing = -1;
                }
            }
            KEY_DELAY_OPENING_VAL => {
                if let Some(v) = parse_non_negative(value) {
                    self.delay_opening_val = v;
                    readings.delay_opening = -1;
                }
            }
            KEY_DELAY_OPENING => {
                self.delay_opening = parse_bool(value);
                if !self.delay_opening {
                    readings.delay_opening = -1;
                }
            }
            KEY_DELAY_CLOSING => {
                self.delay_closing = parse_bool(value);
                if !self.delay_closing {
                    readings.delay_closing = -1;
                }
            }
            KEY_OVERRIDE_AUTO => {
                self.override_auto = parse_bool(value);
            }
            KEY_COMMAND => {
                pending.set(value);
            }
            _ => {
                debug!("ignoring unrecognized option key: {key}");
            }
        }
    }

    fn warn_if_inverted(&self) {
        if self.thresholds_inverted() {
            warn!(
                "light thresholds inverted: open ({}) < close ({}); \
                 automatic mode may oscillate",
                self.open_light_level, self.close_light_level
            );
        }
    }
}

/// Parse a light threshold, clamping into `MIN_LIGHT_LEVEL..=MAX_LIGHT_LEVEL`.
fn parse_light_level(value: &str) -> Option<u16> {
    let raw: i64 = value.trim().trim_matches('"').parse().ok()?;
    Some(raw.clamp(i64::from(MIN_LIGHT_LEVEL), i64::from(MAX_LIGHT_LEVEL)) as u16)
}

/// Parse a reserved delay value; negative or unparseable input yields `None`.
fn parse_non_negative(value: &str) -> Option<i64> {
    let raw: i64 = value.trim().trim_matches('"').parse().ok()?;
    (raw >= 0).then_some(raw)
}

/// Booleans parse from the literal `"true"`; anything else is false.
fn parse_bool(value: &str) -> bool {
    value.trim().trim_matches('"') == "true"
}

/// Live sensor snapshot, refreshed every poll cycle.
///
/// The raw switch levels are kept so the controller can diff the override
/// switches between cycles. The delay counters are reserved placeholders
/// (always cleared to `-1`, never enacted).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReadings {
    /// Last light sensor reading (`0..=1023`).
    pub light_level: u16,
    /// Raw open-limit switch level.
    pub open_limit: Level,
    /// Raw close-limit switch level.
    pub close_limit: Level,
    /// Raw force-open switch level.
    pub force_open: Level,
    /// Raw force-close switch level.
    pub force_close: Level,
    /// Reserved per-run delay counter (always `-1`).
    pub delay_opening: i64,
    /// Reserved per-run delay counter (always `-1`).
    pub delay_closing: i64,
}

impl Default for SensorReadings {
    fn default() -> Self {
        Self {
            light_level: 0,
            open_limit: Level::High,
            close_limit: Level::High,
            force_open: Level::High,
            force_close: Level::High,
            delay_opening: -1,
            delay_closing: -1,
        }
    }
}

/// One-shot slot for the next remote command.
///
/// Written by the inbound reducer, consumed exactly once by the poll loop.
/// A second command arriving before the first is consumed overwrites it;
/// there is no queue.
///
/// # Example
///
/// ```
/// use kitty_door::PendingCommand;
///
/// let mut pending = PendingCommand::default();
/// pending.set("openKittyDoor");
/// pending.set("closeKittyDoor"); // overwrites
///
/// assert_eq!(pending.take().as_deref(), Some("closeKittyDoor"));
/// assert_eq!(pending.take(), None); // consumed
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingCommand {
    slot: Option<String>,
}

impl PendingCommand {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw command word, overwriting any unconsumed one.
    pub fn set(&mut self, raw: &str) {
        if let Some(old) = &self.slot {
            debug!("pending command {old:?} overwritten by {raw:?}");
        }
        self.slot = Some(String::from(raw));
    }

    /// Consume the slot, leaving it empty.
    pub fn take(&mut self) -> Option<String> {
        self.slot.take()
    }

    /// True when a command is waiting.
    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }
}
