//! Desktop service layer.
//!
//! Hosts the gateway implementation used when the controller runs on a
//! desktop (development, integration against a real broker) rather than on
//! the ESP32 build.

pub mod mqtt;

pub use mqtt::{MqttGateway, MqttGatewayError};
