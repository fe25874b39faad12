//! Desktop MQTT sync gateway over `rumqttc`.
//!
//! **Publish paths** (JSON wire forms from [`crate::records`]):
//! - `status/kitty_door` - door state on every transition start and settle
//! - `status/kitty_door_hw_override` - hardware override changes
//! - `status/kitty_door_light_level` - light level telemetry
//! - `systems/kitty_door` - options snapshot after each consumed command
//! - `debug/kitty_door/ping` - periodic keep-alive
//!
//! **Subscribe path:**
//! - `systems/kitty_door` - the remote options/command document
//!
//! The controller is synchronous, so the async event loop runs on its own
//! thread with a small tokio runtime. Inbound updates cross to the poll
//! loop over a std channel; outbound pushes go through `try_publish`,
//! which queues without blocking. `rumqttc` reconnects on its own; the
//! pump re-subscribes on every connection acknowledgement so a dropped
//! session picks the options document back up.

use std::string::String;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};

use crate::config::SyncConfig;
use crate::records;
use crate::traits::{OutboundRecord, SyncGateway, SyncUpdate};

/// Gateway errors surfaced to the controller.
#[derive(Debug)]
pub enum MqttGatewayError {
    /// A record failed to encode.
    Encode(serde_json::Error),
    /// The client rejected the operation (usually a full request queue).
    Client(rumqttc::ClientError),
}

impl std::fmt::Display for MqttGatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "record encode error: {e}"),
            Self::Client(e) => write!(f, "mqtt client error: {e}"),
        }
    }
}

impl std::error::Error for MqttGatewayError {}

impl From<serde_json::Error> for MqttGatewayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encode(e)
    }
}

impl From<rumqttc::ClientError> for MqttGatewayError {
    fn from(e: rumqttc::ClientError) -> Self {
        Self::Client(e)
    }
}

/// MQTT-backed sync gateway for desktop builds.
///
/// # Example
///
/// ```no_run
/// use kitty_door::config::SyncConfig;
/// use kitty_door::services::MqttGateway;
///
/// let config = SyncConfig::default().with_host("broker.local");
/// let gateway = MqttGateway::new(&config);
/// ```
pub struct MqttGateway {
    client: AsyncClient,
    update_rx: Receiver<SyncUpdate>,
    sync: SyncConfig,
    started: Instant,
    connected: Arc<AtomicBool>,
}

impl MqttGateway {
    /// Create the gateway and start its event pump thread.
    ///
    /// Connection happens in the background; records pushed before the
    /// link is up are queued by the client.
    pub fn new(config: &SyncConfig) -> Self {
        let mut options = MqttOptions::new(
            config.client_id.as_str(),
            config.host.as_str(),
            config.port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
        if config.has_auth() {
            options.set_credentials(config.username.as_str(), config.password.as_str());
        }

        let (client, eventloop) = AsyncClient::new(options, 32);
        let (update_tx, update_rx) = channel::<SyncUpdate>();
        let connected = Arc::new(AtomicBool::new(false));

        let pump_client = client.clone();
        let pump_connected = Arc::clone(&connected);
        let options_path: String = config.options_path.as_str().into();
        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    warn!("gateway runtime failed to start: {e}");
                    return;
                }
            };
            runtime.block_on(pump_events(
                eventloop,
                pump_client,
                update_tx,
                options_path,
                pump_connected,
            ));
        });

        Self {
            client,
            update_rx,
            sync: config.clone(),
            started: Instant::now(),
            connected,
        }
    }

    fn uptime_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

impl SyncGateway for MqttGateway {
    type Error = MqttGatewayError;

    fn publish(&mut self, record: &OutboundRecord) -> Result<(), MqttGatewayError> {
        let json = records::encode_json(record, self.uptime_ms())?;
        let path = records::record_path(record, &self.sync);

        self.client
            .try_publish(path, QoS::AtLeastOnce, false, json.into_bytes())?;
        Ok(())
    }

    fn try_recv(&mut self) -> Option<SyncUpdate> {
        match self.update_rx.try_recv() {
            Ok(update) => Some(update),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.connected.store(false, Ordering::Relaxed);
                None
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

async fn pump_events(
    mut eventloop: EventLoop,
    client: AsyncClient,
    update_tx: Sender<SyncUpdate>,
    options_path: String,
    connected: Arc<AtomicBool>,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                connected.store(true, Ordering::Relaxed);
                // Sessions are not persistent, so re-subscribe on every
                // (re)connection.
                if let Err(e) = client.subscribe(&options_path, QoS::AtLeastOnce).await {
                    warn!("gateway subscribe failed: {e}");
                } else {
                    debug!("gateway subscribed to {options_path}");
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if publish.topic != options_path {
                    continue;
                }
                match records::decode_update(&publish.payload) {
                    Some(update) => {
                        if update_tx.send(update).is_err() {
                            // Gateway dropped; stop pumping.
                            return;
                        }
                    }
                    None => warn!("undecodable options payload on {}", publish.topic),
                }
            }
            Ok(_) => {}
            Err(e) => {
                connected.store(false, Ordering::Relaxed);
                warn!("gateway connection error, retrying: {e}");
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::door::DoorState;

    #[test]
    fn gateway_starts_disconnected_without_broker() {
        let gateway = MqttGateway::new(&SyncConfig::default());
        // No broker on localhost in tests; the pump has not acked.
        assert!(!gateway.is_connected());
    }

    #[test]
    fn publish_queues_before_connection() {
        let mut gateway = MqttGateway::new(&SyncConfig::default());
        // try_publish queues into the client channel even while offline.
        let record = OutboundRecord::DoorState {
            state: DoorState::Open,
        };
        assert!(gateway.publish(&record).is_ok());
    }

    #[test]
    fn try_recv_empty_without_updates() {
        let mut gateway = MqttGateway::new(&SyncConfig::default());
        assert!(gateway.try_recv().is_none());
    }

    #[test]
    fn error_display() {
        let encode_err: MqttGatewayError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        let display = format!("{encode_err}");
        assert!(display.contains("record encode error"));
    }
}
