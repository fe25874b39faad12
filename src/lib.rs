//! # kitty-door
//!
//! An automated pet door controller driven by ambient light, with hardware
//! override switches and remote control through a cloud sync gateway.
//!
//! ## Features
//!
//! - **Hardware abstraction**: Traits for switch sensing, motor drive, light
//!   reading, and timing
//! - **Three command sources**: Hardware override switches, remote commands,
//!   and light-driven automatic mode, arbitrated with fixed precedence
//! - **Bounded operations**: Every door movement is capped by a hard timeout
//!   so a jammed door never leaves a motor running
//! - **Remote sync**: Options and commands flow in, status and telemetry
//!   flow out, over a pluggable gateway (MQTT on desktop and ESP32)
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware and gateway abstractions
//! - `commands` - Remote command vocabulary and override classification
//! - `options` - Remote-tunable options and the inbound update reducer
//! - `door` - Main state machine that ties everything together
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use kitty_door::config::DoorConfig;
//! use kitty_door::hal::{MockClock, MockGateway, MockMotor, MockSensors};
//! use kitty_door::traits::SyncUpdate;
//! use kitty_door::DoorController;
//!
//! let sensors = MockSensors::new();
//! let motor = MockMotor::new();
//! let gateway = MockGateway::new();
//! let clock = MockClock::new();
//!
//! sensors.set_door_closed();
//! sensors.set_light_level(250); // bright enough to open
//! sensors.settle_open_after(3);
//!
//! let mut door = DoorController::new(
//!     sensors.clone(),
//!     motor.clone(),
//!     gateway.clone(),
//!     clock.clone(),
//!     clock.clone(),
//!     &DoorConfig::default(),
//! );
//!
//! // Remote end raises the open threshold mid-flight
//! gateway.queue_update(SyncUpdate::new().with("openLightLevel", "300"));
//!
//! door.poll_cycle().unwrap();
//! assert_eq!(door.options().open_light_level, 300);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Remote command vocabulary and hardware override classification.
pub mod commands;
/// Main door state machine that arbitrates the three command sources.
pub mod door;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Remote-tunable door options and the inbound update reducer.
pub mod options;
/// Core traits for hardware abstraction and the remote sync link.
pub mod traits;

/// Shared configuration system for desktop and ESP32.
pub mod config;

/// Wire-format records for the remote datastore (serde-based).
#[cfg(feature = "serde")]
pub mod records;

/// Desktop service layer (feature-gated).
#[cfg(feature = "mqtt")]
pub mod services;

// Re-exports for convenience
pub use commands::{OverrideKind, RemoteCommand};
pub use door::{auto_decision, AutoMode, Direction, DoorController, DoorState, DoorStatus};
pub use options::{DoorOptions, PendingCommand, SensorReadings};
pub use traits::{
    // Hardware
    Clock,
    Delay,
    DoorSense,
    Level,
    LightSensor,
    MotorDriver,
    // Gateway
    OutboundRecord,
    SyncGateway,
    SyncUpdate,
};

// Config re-exports
pub use config::{Config, DeviceConfig, DoorConfig, SyncConfig, WifiConfig};
