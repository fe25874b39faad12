//! MQTT sync gateway for ESP32.
//!
//! Implements [`SyncGateway`] over esp-idf-svc's MQTT client. Outbound
//! records are encoded to the JSON wire forms in [`crate::records`] and
//! routed by record kind; inbound options documents arrive on the options
//! path and are decoded into [`SyncUpdate`]s on a background thread.
//!
//! The ESP-IDF client reconnects on its own; this wrapper only tracks
//! whether the event channel is still alive.

use esp_idf_svc::mqtt::client::{
    EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
};
use log::{debug, warn};
use std::string::{String, ToString};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::config::SyncConfig;
use crate::hal::esp32::Esp32Clock;
use crate::records;
use crate::traits::{Clock, OutboundRecord, SyncGateway, SyncUpdate};

/// Error type for ESP32 gateway operations.
#[derive(Debug)]
pub struct EspMqttGatewayError(pub String);

impl core::fmt::Display for EspMqttGatewayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "gateway error: {}", self.0)
    }
}

/// MQTT-backed sync gateway for ESP32.
///
/// # Example
///
/// ```ignore
/// use kitty_door::config::SyncConfig;
/// use kitty_door::hal::esp32::EspMqttGateway;
///
/// let config = SyncConfig::default().with_host("192.168.1.100");
/// let gateway = EspMqttGateway::new(&config)?;
/// ```
pub struct EspMqttGateway {
    client: EspMqttClient<'static>,
    update_rx: Receiver<SyncUpdate>,
    sync: SyncConfig,
    clock: Esp32Clock,
    connected: bool,
}

impl EspMqttGateway {
    /// Connect to the broker and subscribe to the options path.
    ///
    /// # Errors
    ///
    /// Returns an error if connection or subscription fails.
    pub fn new(config: &SyncConfig) -> anyhow::Result<Self> {
        let broker_url = format!("mqtt://{}:{}", config.host.as_str(), config.port);

        let mqtt_config = MqttClientConfiguration {
            client_id: Some(config.client_id.as_str()),
            keep_alive_interval: Some(Duration::from_secs(u64::from(config.keep_alive_secs))),
            username: config.has_auth().then(|| config.username.as_str()),
            password: config.has_auth().then(|| config.password.as_str()),
            ..Default::default()
        };

        let (update_tx, update_rx) = channel::<SyncUpdate>();
        let options_path: String = config.options_path.as_str().to_string();

        let (mut client, mut connection) = EspMqttClient::new(&broker_url, &mqtt_config)?;

        // Event pump thread; the client itself stays with the caller.
        thread::spawn(move || {
            pump_events(&mut connection, update_tx, &options_path);
        });

        client.subscribe(config.options_path.as_str(), QoS::AtLeastOnce)?;
        debug!("gateway subscribed to {}", config.options_path.as_str());

        Ok(Self {
            client,
            update_rx,
            sync: config.clone(),
            clock: Esp32Clock::new(),
            connected: true,
        })
    }
}

impl SyncGateway for EspMqttGateway {
    type Error = EspMqttGatewayError;

    fn publish(&mut self, record: &OutboundRecord) -> Result<(), EspMqttGatewayError> {
        let json = records::encode_json(record, self.clock.now_ms())
            .map_err(|e| EspMqttGatewayError(e.to_string()))?;
        let path = records::record_path(record, &self.sync);

        // Same delivery guarantee as the desktop gateway.
        self.client
            .publish(path, QoS::AtLeastOnce, false, json.as_bytes())
            .map_err(|e| EspMqttGatewayError(format!("{e:?}")))?;
        Ok(())
    }

    fn try_recv(&mut self) -> Option<SyncUpdate> {
        match self.update_rx.try_recv() {
            Ok(update) => Some(update),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.connected = false;
                None
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

fn pump_events(
    connection: &mut EspMqttConnection,
    update_tx: Sender<SyncUpdate>,
    options_path: &str,
) {
    loop {
        match connection.next() {
            Err(e) => {
                warn!("gateway event error: {e:?}");
                thread::sleep(Duration::from_secs(1));
            }
            Ok(event) => {
                if let EventPayload::Received {
                    topic: Some(topic),
                    data,
                    ..
                } = event.payload()
                {
                    if topic != options_path {
                        continue;
                    }
                    match records::decode_update(data) {
                        Some(update) => {
                            if update_tx.send(update).is_err() {
                                // Gateway dropped; stop pumping.
                                return;
                            }
                        }
                        None => warn!("undecodable options payload on {topic}"),
                    }
                }
            }
        }
    }
}
