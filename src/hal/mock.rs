//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware and gateway traits,
//! enabling development and testing on desktop without a physical door.
//!
//! # Available Mocks
//!
//! | Mock | Trait(s) | Purpose |
//! |------|----------|---------|
//! | [`MockSensors`] | [`DoorSense`], [`LightSensor`] | Scriptable switches and light level |
//! | [`MockMotor`] | [`MotorDriver`] | Tracks line state and drive history |
//! | [`MockClock`] | [`Clock`], [`Delay`] | Controllable time; delays advance it |
//! | [`MockGateway`] | [`SyncGateway`] | Captures pushes, queues inbound updates |
//!
//! # Handle Semantics
//!
//! Every mock is a cheap cloneable handle over shared state. The controller
//! owns one clone; the test keeps another to script inputs and inspect
//! outputs while the controller runs. `MockClock` doubles as the [`Delay`]
//! implementation so blocking waits advance mock time and timeout paths
//! terminate in tests.
//!
//! # Example
//!
//! ```rust
//! use kitty_door::config::DoorConfig;
//! use kitty_door::hal::{MockClock, MockGateway, MockMotor, MockSensors};
//! use kitty_door::DoorController;
//!
//! let sensors = MockSensors::new();
//! let motor = MockMotor::new();
//! let gateway = MockGateway::new();
//! let clock = MockClock::new();
//!
//! sensors.set_door_open();
//! sensors.set_light_level(30); // dark enough to close
//! sensors.settle_close_after(3);
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
//! door.poll_cycle().unwrap();
//! assert!(!gateway.published().is_empty()); // door state was reported
//! ```
//!
//! [`DoorSense`]: crate::traits::DoorSense
//! [`LightSensor`]: crate::traits::LightSensor
//! [`MotorDriver`]: crate::traits::MotorDriver
//! [`Clock`]: crate::traits::Clock
//! [`Delay`]: crate::traits::Delay
//! [`SyncGateway`]: crate::traits::SyncGateway

extern crate alloc;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::traits::{
    Clock, Delay, DoorSense, Level, LightSensor, MotorDriver, OutboundRecord, SyncGateway,
    SyncUpdate,
};

// ============================================================================
// Sensor Mock
// ============================================================================

/// Error returned by [`MockSensors`] when scripted to fail light reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightReadError;

#[derive(Debug)]
struct SensorState {
    open_limit: Level,
    close_limit: Level,
    force_open: Level,
    force_close: Level,
    light_level: u16,
    fail_light_reads: bool,
    // Countdown of limit reads until the door "arrives" in that direction.
    open_settle: Option<u32>,
    close_settle: Option<u32>,
}

impl Default for SensorState {
    fn default() -> Self {
        Self {
            open_limit: Level::High,
            close_limit: Level::High,
            force_open: Level::High,
            force_close: Level::High,
            light_level: 0,
            fail_light_reads: false,
            open_settle: None,
            close_settle: None,
        }
    }
}

/// Mock switch and light inputs.
///
/// Scripts the four active-low switches and the ADC light level. The
/// `settle_*_after` methods simulate a moving door: after the given number
/// of limit reads the corresponding limit switch asserts, so a blocking
/// door operation observes the door arriving mid-wait.
///
/// # Example
///
/// ```rust
/// use kitty_door::hal::MockSensors;
/// use kitty_door::traits::DoorSense;
///
/// let mut sensors = MockSensors::new();
/// sensors.set_door_closed();
/// assert!(sensors.is_door_closed());
///
/// sensors.set_force_close(true);
/// assert!(sensors.is_override_active());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockSensors {
    inner: Rc<RefCell<SensorState>>,
}

impl MockSensors {
    /// Creates mock sensors: all switches released, light level 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rest the door at its fully open position.
    pub fn set_door_open(&self) {
        let mut state = self.inner.borrow_mut();
        state.open_limit = Level::Low;
        state.close_limit = Level::High;
    }

    /// Rest the door at its fully closed position.
    pub fn set_door_closed(&self) {
        let mut state = self.inner.borrow_mut();
        state.open_limit = Level::High;
        state.close_limit = Level::Low;
    }

    /// Place the door between its limits (neither switch asserted).
    pub fn set_door_midway(&self) {
        let mut state = self.inner.borrow_mut();
        state.open_limit = Level::High;
        state.close_limit = Level::High;
    }

    /// Assert or release the force-open override switch.
    pub fn set_force_open(&self, asserted: bool) {
        self.inner.borrow_mut().force_open = if asserted { Level::Low } else { Level::High };
    }

    /// Assert or release the force-close override switch.
    pub fn set_force_close(&self, asserted: bool) {
        self.inner.borrow_mut().force_close = if asserted { Level::Low } else { Level::High };
    }

    /// Set the light level returned by reads.
    pub fn set_light_level(&self, level: u16) {
        self.inner.borrow_mut().light_level = level;
    }

    /// Make subsequent light reads fail (or succeed again).
    pub fn fail_light_reads(&self, fail: bool) {
        self.inner.borrow_mut().fail_light_reads = fail;
    }

    /// Arrive at the open limit after `reads` open-limit reads.
    pub fn settle_open_after(&self, reads: u32) {
        self.inner.borrow_mut().open_settle = Some(reads);
    }

    /// Arrive at the close limit after `reads` close-limit reads.
    pub fn settle_close_after(&self, reads: u32) {
        self.inner.borrow_mut().close_settle = Some(reads);
    }
}

impl DoorSense for MockSensors {
    fn open_limit_level(&mut self) -> Level {
        let mut state = self.inner.borrow_mut();
        match state.open_settle {
            Some(0) => {
                state.open_settle = None;
                state.open_limit = Level::Low;
                state.close_limit = Level::High;
            }
            Some(n) => state.open_settle = Some(n - 1),
            None => {}
        }
        state.open_limit
    }

    fn close_limit_level(&mut self) -> Level {
        let mut state = self.inner.borrow_mut();
        match state.close_settle {
            Some(0) => {
                state.close_settle = None;
                state.close_limit = Level::Low;
                state.open_limit = Level::High;
            }
            Some(n) => state.close_settle = Some(n - 1),
            None => {}
        }
        state.close_limit
    }

    fn force_open_level(&mut self) -> Level {
        self.inner.borrow().force_open
    }

    fn force_close_level(&mut self) -> Level {
        self.inner.borrow().force_close
    }
}

impl LightSensor for MockSensors {
    type Error = LightReadError;

    fn read_level(&mut self) -> Result<u16, LightReadError> {
        let state = self.inner.borrow();
        if state.fail_light_reads {
            Err(LightReadError)
        } else {
            Ok(state.light_level)
        }
    }
}

// ============================================================================
// Motor Mock
// ============================================================================

/// A recorded motor call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotorAction {
    /// `drive_open` was called.
    DriveOpen,
    /// `drive_close` was called.
    DriveClose,
    /// `stop` was called.
    Stop,
}

#[derive(Debug, Default)]
struct MotorState {
    open_line: bool,
    close_line: bool,
    history: Vec<MotorAction>,
}

/// Mock motor driver.
///
/// Tracks the two output lines and the full call history for
/// verification.
///
/// # Example
///
/// ```rust
/// use kitty_door::hal::{MockMotor, MotorAction};
/// use kitty_door::traits::MotorDriver;
///
/// let mut motor = MockMotor::new();
/// motor.drive_close().unwrap();
/// assert!(motor.close_line());
///
/// motor.stop().unwrap();
/// assert!(!motor.open_line() && !motor.close_line());
/// assert_eq!(motor.history(), [MotorAction::DriveClose, MotorAction::Stop]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockMotor {
    inner: Rc<RefCell<MotorState>>,
}

impl MockMotor {
    /// Creates a mock motor with both lines de-energized.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the open line is energized.
    pub fn open_line(&self) -> bool {
        self.inner.borrow().open_line
    }

    /// True while the close line is energized.
    pub fn close_line(&self) -> bool {
        self.inner.borrow().close_line
    }

    /// All drive calls in order.
    pub fn history(&self) -> Vec<MotorAction> {
        self.inner.borrow().history.clone()
    }
}

impl MotorDriver for MockMotor {
    type Error = ();

    fn drive_open(&mut self) -> Result<(), ()> {
        let mut state = self.inner.borrow_mut();
        state.open_line = true;
        state.close_line = false;
        state.history.push(MotorAction::DriveOpen);
        Ok(())
    }

    fn drive_close(&mut self) -> Result<(), ()> {
        let mut state = self.inner.borrow_mut();
        state.open_line = false;
        state.close_line = true;
        state.history.push(MotorAction::DriveClose);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ()> {
        let mut state = self.inner.borrow_mut();
        state.open_line = false;
        state.close_line = false;
        state.history.push(MotorAction::Stop);
        Ok(())
    }
}

// ============================================================================
// Clock Mock
// ============================================================================

/// Mock clock and delay.
///
/// Controllable time source. Also implements [`Delay`] by advancing its
/// own time, so a controller given clones of the same `MockClock` for both
/// observes time passing during blocking waits and its timeouts fire.
///
/// # Example
///
/// ```rust
/// use kitty_door::hal::MockClock;
/// use kitty_door::traits::{Clock, Delay};
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 500);
///
/// let mut delay = clock.clone();
/// delay.delay_ms(25);
/// assert_eq!(clock.now_ms(), 525);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockClock {
    inner: Rc<RefCell<u64>>,
}

impl MockClock {
    /// Creates a mock clock starting at 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current time in milliseconds.
    pub fn set(&self, ms: u64) {
        *self.inner.borrow_mut() = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, ms: u64) {
        *self.inner.borrow_mut() += ms;
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        *self.inner.borrow()
    }
}

impl Delay for MockClock {
    fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms));
    }
}

// ============================================================================
// Gateway Mock
// ============================================================================

/// Error returned by [`MockGateway`] when scripted to fail pushes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GatewayDown;

#[derive(Debug)]
struct GatewayState {
    published: Vec<OutboundRecord>,
    incoming: Vec<SyncUpdate>,
    connected: bool,
    fail_publishes: bool,
}

/// Mock sync gateway.
///
/// Captures all published records and lets tests queue inbound updates for
/// the next drain.
///
/// # Example
///
/// ```rust
/// use kitty_door::hal::MockGateway;
/// use kitty_door::traits::{SyncGateway, SyncUpdate};
///
/// let mut gateway = MockGateway::new();
/// gateway.queue_update(SyncUpdate::new().with("command", "openKittyDoor"));
///
/// assert_eq!(gateway.try_recv().unwrap().len(), 1);
/// assert!(gateway.try_recv().is_none());
/// ```
#[derive(Clone, Debug)]
pub struct MockGateway {
    inner: Rc<RefCell<GatewayState>>,
}

impl MockGateway {
    /// Creates a mock gateway in connected state.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(GatewayState {
                published: Vec::new(),
                incoming: Vec::new(),
                connected: true,
                fail_publishes: false,
            })),
        }
    }

    /// Queue an inbound update for the next drain.
    pub fn queue_update(&self, update: SyncUpdate) {
        self.inner.borrow_mut().incoming.push(update);
    }

    /// All records published so far, in order.
    pub fn published(&self) -> Vec<OutboundRecord> {
        self.inner.borrow().published.clone()
    }

    /// Drop all captured records.
    pub fn clear_published(&self) {
        self.inner.borrow_mut().published.clear();
    }

    /// Set the reported connection state.
    pub fn set_connected(&self, connected: bool) {
        self.inner.borrow_mut().connected = connected;
    }

    /// Make subsequent pushes fail (or succeed again).
    pub fn fail_publishes(&self, fail: bool) {
        self.inner.borrow_mut().fail_publishes = fail;
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncGateway for MockGateway {
    type Error = GatewayDown;

    fn publish(&mut self, record: &OutboundRecord) -> Result<(), GatewayDown> {
        let mut state = self.inner.borrow_mut();
        if state.fail_publishes {
            return Err(GatewayDown);
        }
        state.published.push(record.clone());
        Ok(())
    }

    fn try_recv(&mut self) -> Option<SyncUpdate> {
        let mut state = self.inner.borrow_mut();
        if state.incoming.is_empty() {
            None
        } else {
            Some(state.incoming.remove(0))
        }
    }

    fn is_connected(&self) -> bool {
        self.inner.borrow().connected
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::OverrideKind;

    // =========================================================================
    // MockSensors Tests
    // =========================================================================

    #[test]
    fn mock_sensors_default() {
        let mut sensors = MockSensors::new();
        assert!(!sensors.is_door_open());
        assert!(!sensors.is_door_closed());
        assert!(!sensors.is_override_active());
        assert_eq!(sensors.read_level(), Ok(0));
    }

    #[test]
    fn mock_sensors_door_positions() {
        let mut sensors = MockSensors::new();

        sensors.set_door_open();
        assert!(sensors.is_door_open());
        assert!(!sensors.is_door_closed());

        sensors.set_door_closed();
        assert!(!sensors.is_door_open());
        assert!(sensors.is_door_closed());

        sensors.set_door_midway();
        assert!(!sensors.is_door_open());
        assert!(!sensors.is_door_closed());
    }

    #[test]
    fn mock_sensors_overrides() {
        let mut sensors = MockSensors::new();

        sensors.set_force_open(true);
        assert_eq!(sensors.override_kind(), OverrideKind::ForceOpen);

        sensors.set_force_close(true);
        assert_eq!(sensors.override_kind(), OverrideKind::ForceClose);

        sensors.set_force_open(false);
        sensors.set_force_close(false);
        assert_eq!(sensors.override_kind(), OverrideKind::None);
    }

    #[test]
    fn mock_sensors_light_reads() {
        let mut sensors = MockSensors::new();
        sensors.set_light_level(512);
        assert_eq!(sensors.read_level(), Ok(512));

        sensors.fail_light_reads(true);
        assert_eq!(sensors.read_level(), Err(LightReadError));

        sensors.fail_light_reads(false);
        assert_eq!(sensors.read_level(), Ok(512));
    }

    #[test]
    fn mock_sensors_settle_countdown() {
        let mut sensors = MockSensors::new();
        sensors.set_door_closed();
        sensors.settle_open_after(2);

        // Two reads still in motion, third arrives.
        assert!(!sensors.is_door_open());
        assert!(!sensors.is_door_open());
        assert!(sensors.is_door_open());
        assert!(!sensors.is_door_closed());
        // Stays settled afterwards.
        assert!(sensors.is_door_open());
    }

    #[test]
    fn mock_sensors_clones_share_state() {
        let handle = MockSensors::new();
        let mut owned = handle.clone();

        handle.set_door_open();
        assert!(owned.is_door_open());
    }

    // =========================================================================
    // MockMotor Tests
    // =========================================================================

    #[test]
    fn mock_motor_lines_are_exclusive() {
        let mut motor = MockMotor::new();

        motor.drive_open().unwrap();
        assert!(motor.open_line());
        assert!(!motor.close_line());

        motor.drive_close().unwrap();
        assert!(!motor.open_line());
        assert!(motor.close_line());

        motor.stop().unwrap();
        assert!(!motor.open_line());
        assert!(!motor.close_line());
    }

    #[test]
    fn mock_motor_history() {
        let mut motor = MockMotor::new();
        motor.drive_open().unwrap();
        motor.stop().unwrap();
        motor.drive_close().unwrap();
        motor.stop().unwrap();

        assert_eq!(
            motor.history(),
            [
                MotorAction::DriveOpen,
                MotorAction::Stop,
                MotorAction::DriveClose,
                MotorAction::Stop,
            ]
        );
    }

    // =========================================================================
    // MockClock Tests
    // =========================================================================

    #[test]
    fn mock_clock_set_and_advance() {
        let clock = MockClock::new();
        assert_eq!(clock.now_ms(), 0);

        clock.set(1000);
        assert_eq!(clock.now_ms(), 1000);

        clock.advance(500);
        assert_eq!(clock.now_ms(), 1500);
    }

    #[test]
    fn mock_clock_delay_advances_shared_time() {
        let clock = MockClock::new();
        let mut delay = clock.clone();

        delay.delay_ms(25);
        delay.delay_ms(25);
        assert_eq!(clock.now_ms(), 50);
    }

    // =========================================================================
    // MockGateway Tests
    // =========================================================================

    #[test]
    fn mock_gateway_captures_pushes() {
        let mut gateway = MockGateway::new();
        assert!(gateway.is_connected());

        gateway
            .publish(&OutboundRecord::LightLevel { level: 77 })
            .unwrap();
        assert_eq!(
            gateway.published(),
            [OutboundRecord::LightLevel { level: 77 }]
        );

        gateway.clear_published();
        assert!(gateway.published().is_empty());
    }

    #[test]
    fn mock_gateway_queued_updates_fifo() {
        let mut gateway = MockGateway::new();
        gateway.queue_update(SyncUpdate::new().with("openLightLevel", "200"));
        gateway.queue_update(SyncUpdate::new().with("command", "openKittyDoor"));

        let first = gateway.try_recv().unwrap();
        assert_eq!(first.iter().next(), Some(("openLightLevel", "200")));

        let second = gateway.try_recv().unwrap();
        assert_eq!(second.iter().next(), Some(("command", "openKittyDoor")));

        assert!(gateway.try_recv().is_none());
    }

    #[test]
    fn mock_gateway_scripted_failure() {
        let mut gateway = MockGateway::new();
        gateway.fail_publishes(true);
        assert_eq!(
            gateway.publish(&OutboundRecord::Ping {
                count: 1,
                uptime_ms: 0
            }),
            Err(GatewayDown)
        );

        gateway.fail_publishes(false);
        assert!(gateway
            .publish(&OutboundRecord::Ping {
                count: 2,
                uptime_ms: 1
            })
            .is_ok());
    }
}
