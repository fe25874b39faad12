//! Remote sync gateway abstraction.
//!
//! The gateway is the door's only link to the remote datastore. It is a
//! **sync-first** trait in the same spirit as the hardware traits: the poll
//! loop is single-threaded and cooperative, so inbound data is drained
//! non-blockingly at one point per cycle and outbound pushes are plain
//! calls.
//!
//! # Contract
//!
//! - **Inbound**: [`try_recv`](SyncGateway::try_recv) returns one
//!   [`SyncUpdate`] (a key/value set) per call when the remote configuration
//!   changed, including the initial stored set delivered right after
//!   subscribing.
//! - **Outbound**: [`publish`](SyncGateway::publish) pushes one
//!   [`OutboundRecord`]; implementations stamp each record with a
//!   millisecond timestamp at encode time.
//! - **Failure**: implementations own reconnect-and-resubscribe. A publish
//!   failure is surfaced once to the caller (which logs and moves on) while
//!   the gateway restores the link; the controller never retries a push.
//!
//! # Implementations
//!
//! - [`MockGateway`](crate::hal::MockGateway) for tests.
//! - `MqttGateway` (feature `mqtt`) over rumqttc for desktop use.
//! - `EspMqttGateway` (feature `wifi`) over esp-idf-svc on hardware.

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::commands::OverrideKind;
use crate::door::DoorState;
use crate::options::DoorOptions;

/// One inbound key/value set from the remote datastore.
///
/// Keys and recognized values are documented in [`crate::options`]; the
/// gateway does not interpret them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncUpdate {
    pairs: Vec<(String, String)>,
}

impl SyncUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a key/value pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Iterate the pairs in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when the update carries no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// An outbound status/telemetry record.
///
/// The door state machine emits these fire-and-forget; the gateway encodes
/// them (wire field names live in [`crate::records`]) and routes each to its
/// remote path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundRecord {
    /// Full options snapshot, pushed after every consumed remote command
    /// (also clears the command slot on the remote end).
    Options(DoorOptions),
    /// Current light level reading, on demand and for telemetry.
    LightLevel {
        /// Raw ADC reading (`0..=1023`).
        level: u16,
    },
    /// Hardware override classification, on every override change.
    HardwareOverride {
        /// Which override is in effect.
        kind: OverrideKind,
    },
    /// Door state, on every transition start and settle.
    DoorState {
        /// The state being reported.
        state: DoorState,
    },
    /// Periodic keep-alive.
    Ping {
        /// Incrementing ping counter.
        count: u64,
        /// Milliseconds since boot.
        uptime_ms: u64,
    },
}

/// The remote sync link.
///
/// See the module docs for the contract. `Error` must be `Debug` because
/// the controller treats push failures as fire-and-forget and only logs
/// them.
pub trait SyncGateway {
    /// Error type for outbound pushes.
    type Error: core::fmt::Debug;

    /// Push one record to the remote datastore.
    fn publish(&mut self, record: &OutboundRecord) -> Result<(), Self::Error>;

    /// Drain one inbound update, if any. Must never block.
    fn try_recv(&mut self) -> Option<SyncUpdate>;

    /// True while the link is believed up.
    fn is_connected(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_update_builder() {
        let update = SyncUpdate::new()
            .with("openLightLevel", "200")
            .with("command", "openKittyDoor");

        assert_eq!(update.len(), 2);
        assert!(!update.is_empty());

        let pairs: Vec<_> = update.iter().collect();
        assert_eq!(pairs[0], ("openLightLevel", "200"));
        assert_eq!(pairs[1], ("command", "openKittyDoor"));
    }

    #[test]
    fn sync_update_empty() {
        let update = SyncUpdate::new();
        assert!(update.is_empty());
        assert_eq!(update.iter().count(), 0);
    }
}
