//! Core traits for hardware abstraction and the remote sync link.
//!
//! # Organization
//!
//! - [`hardware`] - Sensing, motor drive, and timing traits
//! - [`gateway`] - Remote sync gateway trait and boundary types
//!
//! All traits are re-exported here for convenience:
//!
//! ```rust
//! use kitty_door::traits::{Clock, Delay, DoorSense, LightSensor, MotorDriver, SyncGateway};
//! ```

/// Sensing, motor drive, and timing traits.
pub mod hardware;

/// Remote sync gateway trait and boundary types.
pub mod gateway;

pub use gateway::{OutboundRecord, SyncGateway, SyncUpdate};
pub use hardware::{Clock, Delay, DoorSense, Level, LightSensor, MotorDriver};
