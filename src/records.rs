//! Wire-format records for the remote datastore (feature `serde`).
//!
//! Field names here are the remote schema and must not change: the
//! companion app reads them verbatim. Timestamps travel as decimal strings
//! of milliseconds since boot, stamped by the gateway at encode time.
//!
//! | Record | Remote path (default) |
//! |--------|-----------------------|
//! | [`DoorStateRecord`] | `status/kitty_door` |
//! | [`OverrideRecord`] | `status/kitty_door_hw_override` |
//! | [`LightLevelRecord`] | `status/kitty_door_light_level` |
//! | [`OptionsRecord`] | `systems/kitty_door` |
//! | [`PingRecord`] | `debug/kitty_door/ping` |

extern crate alloc;
use alloc::string::{String, ToString};

use serde::{Deserialize, Serialize};

use crate::commands::{OverrideKind, NONE_WORD};
use crate::config::SyncConfig;
use crate::door::DoorState;
use crate::options::DoorOptions;
use crate::traits::OutboundRecord;

/// Door state report.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoorStateRecord {
    /// Milliseconds since boot, as a decimal string.
    pub l_timestamp: String,
    /// Door state wire word (`"OPEN"`, `"CLOSED"`, `"OPENING"`, `"CLOSING"`).
    #[serde(rename = "type")]
    pub state: String,
}

impl DoorStateRecord {
    /// Stamp a record for `state` at `now_ms`.
    pub fn new(state: DoorState, now_ms: u64) -> Self {
        Self {
            l_timestamp: now_ms.to_string(),
            state: String::from(state.as_wire()),
        }
    }
}

/// Hardware override report.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverrideRecord {
    /// Milliseconds since boot, as a decimal string.
    pub hw_timestamp: String,
    /// Override code: `0` none, `1` force-open, `2` force-close.
    #[serde(rename = "type")]
    pub kind: u8,
}

impl OverrideRecord {
    /// Stamp a record for `kind` at `now_ms`.
    pub fn new(kind: OverrideKind, now_ms: u64) -> Self {
        Self {
            hw_timestamp: now_ms.to_string(),
            kind: kind.code(),
        }
    }
}

/// Light level report.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LightLevelRecord {
    /// Milliseconds since boot, as a decimal string.
    pub ll_timestamp: String,
    /// Raw ADC reading (`0..=1023`).
    pub level: u16,
}

impl LightLevelRecord {
    /// Stamp a record for `level` at `now_ms`.
    pub fn new(level: u16, now_ms: u64) -> Self {
        Self {
            ll_timestamp: now_ms.to_string(),
            level,
        }
    }
}

/// Full options snapshot.
///
/// Pushed after every consumed remote command. `command` is always the
/// none word, which clears the command slot on the remote end.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OptionsRecord {
    /// Milliseconds since boot, as a decimal string.
    #[serde(rename = "o_timestamp")]
    pub o_timestamp: String,
    /// Light level at or above which the door opens.
    pub open_light_level: u16,
    /// Light level at or below which the door closes.
    pub close_light_level: u16,
    /// Reserved delayed-opening flag.
    pub delay_opening: bool,
    /// Reserved delayed-closing flag.
    pub delay_closing: bool,
    /// Reserved delayed-opening duration.
    pub delay_opening_val: i64,
    /// Reserved delayed-closing duration.
    pub delay_closing_val: i64,
    /// Manual suppression of automatic mode.
    pub auto_override: bool,
    /// Always the none word in a snapshot.
    pub command: String,
}

impl OptionsRecord {
    /// Snapshot `options` at `now_ms`.
    pub fn new(options: &DoorOptions, now_ms: u64) -> Self {
        Self {
            o_timestamp: now_ms.to_string(),
            open_light_level: options.open_light_level,
            close_light_level: options.close_light_level,
            delay_opening: options.delay_opening,
            delay_closing: options.delay_closing,
            delay_opening_val: options.delay_opening_val,
            delay_closing_val: options.delay_closing_val,
            auto_override: options.override_auto,
            command: String::from(NONE_WORD),
        }
    }
}

/// Periodic keep-alive.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PingRecord {
    /// Milliseconds since boot, as a decimal string.
    pub time_alive: String,
    /// Incrementing ping counter.
    pub count: u64,
}

impl PingRecord {
    /// Stamp a ping at `now_ms`.
    pub fn new(count: u64, uptime_ms: u64) -> Self {
        Self {
            time_alive: uptime_ms.to_string(),
            count,
        }
    }
}

/// Select the remote path an outbound record is routed to.
pub fn record_path<'a>(record: &OutboundRecord, sync: &'a SyncConfig) -> &'a str {
    match record {
        OutboundRecord::Options(_) => sync.options_path.as_str(),
        OutboundRecord::LightLevel { .. } => sync.light_level_path.as_str(),
        OutboundRecord::HardwareOverride { .. } => sync.override_path.as_str(),
        OutboundRecord::DoorState { .. } => sync.door_state_path.as_str(),
        OutboundRecord::Ping { .. } => sync.ping_path.as_str(),
    }
}

/// Encode an outbound record as its JSON wire form, stamped at `now_ms`.
///
/// `Ping` carries its own uptime and ignores `now_ms`.
#[cfg(any(feature = "mqtt", feature = "wifi"))]
pub fn encode_json(record: &OutboundRecord, now_ms: u64) -> serde_json::Result<String> {
    match record {
        OutboundRecord::Options(options) => serde_json::to_string(&OptionsRecord::new(options, now_ms)),
        OutboundRecord::LightLevel { level } => {
            serde_json::to_string(&LightLevelRecord::new(*level, now_ms))
        }
        OutboundRecord::HardwareOverride { kind } => {
            serde_json::to_string(&OverrideRecord::new(*kind, now_ms))
        }
        OutboundRecord::DoorState { state } => {
            serde_json::to_string(&DoorStateRecord::new(*state, now_ms))
        }
        OutboundRecord::Ping { count, uptime_ms } => {
            serde_json::to_string(&PingRecord::new(*count, *uptime_ms))
        }
    }
}

/// Decode an inbound options document into a [`SyncUpdate`].
///
/// The payload is a flat JSON object; string values are passed through
/// unquoted, everything else keeps its JSON rendering (the option reducer
/// parses per key). Non-object payloads decode to `None`.
#[cfg(any(feature = "mqtt", feature = "wifi"))]
pub fn decode_update(payload: &[u8]) -> Option<crate::traits::SyncUpdate> {
    let value: serde_json::Value = serde_json::from_slice(payload).ok()?;
    let object = value.as_object()?;

    let mut update = crate::traits::SyncUpdate::new();
    for (key, value) in object {
        match value.as_str() {
            Some(s) => update.push(key.as_str(), s),
            None => update.push(key.as_str(), value.to_string()),
        }
    }
    Some(update)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_state_record_fields() {
        let record = DoorStateRecord::new(DoorState::Opening, 12345);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"l_timestamp":"12345","type":"OPENING"}"#);
    }

    #[test]
    fn override_record_fields() {
        let record = OverrideRecord::new(OverrideKind::ForceClose, 99);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"hw_timestamp":"99","type":2}"#);
    }

    #[test]
    fn light_level_record_fields() {
        let record = LightLevelRecord::new(512, 1000);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"ll_timestamp":"1000","level":512}"#);
    }

    #[test]
    fn ping_record_fields() {
        let record = PingRecord::new(3, 1_800_000);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"time_alive":"1800000","count":3}"#);
    }

    #[test]
    fn options_record_uses_camel_case_and_none_command() {
        let options = DoorOptions::default();
        let record = OptionsRecord::new(&options, 42);
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains(r#""o_timestamp":"42""#));
        assert!(json.contains(r#""openLightLevel":190"#));
        assert!(json.contains(r#""closeLightLevel":40"#));
        assert!(json.contains(r#""delayOpeningVal":0"#));
        assert!(json.contains(r#""autoOverride":false"#));
        assert!(json.contains(r#""command":"_none_""#));
    }

    #[test]
    fn options_record_round_trip() {
        let mut options = DoorOptions::default();
        options.override_auto = true;
        options.open_light_level = 300;

        let record = OptionsRecord::new(&options, 7);
        let json = serde_json::to_string(&record).unwrap();
        let back: OptionsRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn record_path_routing() {
        let sync = SyncConfig::default();

        let record = OutboundRecord::LightLevel { level: 100 };
        assert_eq!(record_path(&record, &sync), "status/kitty_door_light_level");

        let record = OutboundRecord::Ping {
            count: 1,
            uptime_ms: 0,
        };
        assert_eq!(record_path(&record, &sync), "debug/kitty_door/ping");
    }

    #[cfg(feature = "mqtt")]
    #[test]
    fn decode_update_flat_object() {
        let payload = br#"{"openLightLevel":200,"command":"openKittyDoor","overrideAuto":true}"#;
        let update = decode_update(payload).unwrap();

        let pairs: alloc::vec::Vec<_> = update.iter().collect();
        assert!(pairs.contains(&("openLightLevel", "200")));
        assert!(pairs.contains(&("command", "openKittyDoor")));
        assert!(pairs.contains(&("overrideAuto", "true")));
    }

    #[cfg(feature = "mqtt")]
    #[test]
    fn decode_update_rejects_non_objects() {
        assert!(decode_update(b"42").is_none());
        assert!(decode_update(b"not json").is_none());
        assert!(decode_update(b"[1,2]").is_none());
    }

    #[cfg(feature = "mqtt")]
    #[test]
    fn encode_json_ping_keeps_own_uptime() {
        let record = OutboundRecord::Ping {
            count: 2,
            uptime_ms: 500,
        };
        let json = encode_json(&record, 999_999).unwrap();
        assert_eq!(json, r#"{"time_alive":"500","count":2}"#);
    }
}
