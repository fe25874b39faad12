//! Remote command vocabulary and hardware override classification.
//!
//! Commands arrive from the sync gateway as raw wire words and are parsed
//! only at the moment of consumption (the pending slot in
//! [`options`](crate::options) stores them unvalidated). The wire vocabulary
//! is fixed by the remote end and must not change:
//!
//! | Wire word | Command |
//! |-----------|---------|
//! | `openKittyDoor` | [`RemoteCommand::Open`] |
//! | `closeKittyDoor` | [`RemoteCommand::Close`] |
//! | `readLightLevel` | [`RemoteCommand::ReadLightLevel`] |
//! | `_none_` | no command (cleared slot) |
//!
//! # Arbitration
//!
//! Remote commands are the middle of the three command sources: hardware
//! override switches always beat them, and they in turn invalidate the
//! automatic mode's memory so it reevaluates fresh afterwards. That logic
//! lives in [`DoorController`](crate::DoorController); this module only
//! defines the types.

/// Wire word for an empty/cleared command slot.
pub const NONE_WORD: &str = "_none_";

/// Wire word for the remote open command.
pub const COMMAND_OPEN: &str = "openKittyDoor";

/// Wire word for the remote close command.
pub const COMMAND_CLOSE: &str = "closeKittyDoor";

/// Wire word for the remote light level request.
pub const COMMAND_READ_LIGHT_LEVEL: &str = "readLightLevel";

/// A recognized remote command.
///
/// Parsed from the raw pending slot at consumption time; `_none_` and
/// unrecognized words parse to `None` and are handled (logged) by the
/// controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RemoteCommand {
    /// Open the door (rejected while a hardware override is asserted).
    Open,
    /// Close the door (rejected while a hardware override is asserted).
    Close,
    /// Push the current light level reading without moving the door.
    ReadLightLevel,
}

impl RemoteCommand {
    /// Parse a command from its wire word.
    ///
    /// Input is trimmed and stripped of surrounding double quotes; the
    /// remote datastore delivers string values quoted and the command must
    /// survive that framing.
    ///
    /// # Examples
    ///
    /// ```
    /// use kitty_door::RemoteCommand;
    ///
    /// assert_eq!(RemoteCommand::from_wire("openKittyDoor"), Some(RemoteCommand::Open));
    /// assert_eq!(RemoteCommand::from_wire("\"closeKittyDoor\""), Some(RemoteCommand::Close));
    /// assert_eq!(RemoteCommand::from_wire("readLightLevel"), Some(RemoteCommand::ReadLightLevel));
    /// assert_eq!(RemoteCommand::from_wire("_none_"), None);
    /// assert_eq!(RemoteCommand::from_wire("purgeKittyDoor"), None);
    /// ```
    pub fn from_wire(s: &str) -> Option<Self> {
        match s.trim().trim_matches('"') {
            COMMAND_OPEN => Some(RemoteCommand::Open),
            COMMAND_CLOSE => Some(RemoteCommand::Close),
            COMMAND_READ_LIGHT_LEVEL => Some(RemoteCommand::ReadLightLevel),
            _ => None,
        }
    }

    /// Returns the command's wire word.
    #[inline]
    pub const fn as_wire(&self) -> &'static str {
        match self {
            RemoteCommand::Open => COMMAND_OPEN,
            RemoteCommand::Close => COMMAND_CLOSE,
            RemoteCommand::ReadLightLevel => COMMAND_READ_LIGHT_LEVEL,
        }
    }
}

/// Which hardware override is in effect.
///
/// Reported to the remote end whenever the override switches change.
/// The wire encoding is a bare integer code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverrideKind {
    /// No override switch asserted.
    #[default]
    None,
    /// Force-open switch asserted.
    ForceOpen,
    /// Force-close switch asserted (wins when both are asserted).
    ForceClose,
}

impl OverrideKind {
    /// Wire code: `0 = none`, `1 = force-open`, `2 = force-close`.
    #[inline]
    pub const fn code(&self) -> u8 {
        match self {
            OverrideKind::None => 0,
            OverrideKind::ForceOpen => 1,
            OverrideKind::ForceClose => 2,
        }
    }

    /// True when any override switch is asserted.
    #[inline]
    pub const fn is_active(&self) -> bool {
        !matches!(self, OverrideKind::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_wire_known_words() {
        assert_eq!(RemoteCommand::from_wire(COMMAND_OPEN), Some(RemoteCommand::Open));
        assert_eq!(RemoteCommand::from_wire(COMMAND_CLOSE), Some(RemoteCommand::Close));
        assert_eq!(
            RemoteCommand::from_wire(COMMAND_READ_LIGHT_LEVEL),
            Some(RemoteCommand::ReadLightLevel)
        );
    }

    #[test]
    fn from_wire_quoted_and_padded() {
        assert_eq!(
            RemoteCommand::from_wire("\"openKittyDoor\""),
            Some(RemoteCommand::Open)
        );
        assert_eq!(
            RemoteCommand::from_wire("  closeKittyDoor  "),
            Some(RemoteCommand::Close)
        );
    }

    #[test]
    fn from_wire_none_and_unknown() {
        assert_eq!(RemoteCommand::from_wire(NONE_WORD), None);
        assert_eq!(RemoteCommand::from_wire("\"_none_\""), None);
        assert_eq!(RemoteCommand::from_wire(""), None);
        assert_eq!(RemoteCommand::from_wire("OPENKITTYDOOR"), None);
    }

    #[test]
    fn wire_round_trip() {
        for cmd in [
            RemoteCommand::Open,
            RemoteCommand::Close,
            RemoteCommand::ReadLightLevel,
        ] {
            assert_eq!(RemoteCommand::from_wire(cmd.as_wire()), Some(cmd));
        }
    }

    #[test]
    fn override_codes() {
        assert_eq!(OverrideKind::None.code(), 0);
        assert_eq!(OverrideKind::ForceOpen.code(), 1);
        assert_eq!(OverrideKind::ForceClose.code(), 2);
    }

    #[test]
    fn override_activity() {
        assert!(!OverrideKind::None.is_active());
        assert!(OverrideKind::ForceOpen.is_active());
        assert!(OverrideKind::ForceClose.is_active());
    }

    #[test]
    fn override_default_is_none() {
        assert_eq!(OverrideKind::default(), OverrideKind::None);
    }
}
