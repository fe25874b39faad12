//! ESP32 pet door controller.
//!
//! This is the main entry point for the physical hardware controller.
//! It wires the switch, motor, and light sensor GPIOs to the door state
//! machine, brings up WiFi and the MQTT sync gateway, and then runs the
//! fixed 25ms poll loop forever.
//!
//! # Build
//!
//! ```bash
//! WIFI_SSID=MyNetwork WIFI_PASSWORD=secret SYNC_HOST=192.168.1.10 \
//!     cargo build --release --features esp32,wifi --bin esp32_main
//! ```

use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use kitty_door::hal::esp32::{
    Esp32Clock, Esp32Delay, Esp32Motor, Esp32Sensors, Esp32Wifi, EspMqttGateway,
};
use kitty_door::{Config, DoorController, SyncConfig, WifiConfig};
use log::info;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("kitty-door starting");

    // TODO: Load from NVS instead of compile-time env vars
    let config = Config::default()
        .with_wifi(
            WifiConfig::default()
                .with_ssid(option_env!("WIFI_SSID").unwrap_or(""))
                .with_password(option_env!("WIFI_PASSWORD").unwrap_or("")),
        )
        .with_sync(SyncConfig::default().with_host(option_env!("SYNC_HOST").unwrap_or("localhost")));

    if !config.wifi.is_configured() {
        anyhow::bail!("wifi not configured (set WIFI_SSID/WIFI_PASSWORD at build time)");
    }

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Hardware
    // =========================================================================
    let sensors = Esp32Sensors::new(
        peripherals.pins.gpio32, // open limit
        peripherals.pins.gpio33, // close limit
        peripherals.pins.gpio25, // force open
        peripherals.pins.gpio26, // force close
        peripherals.adc1,
        peripherals.pins.gpio34, // photoresistor
    )?;
    info!("sensors initialized");

    let motor = Esp32Motor::new(
        peripherals.pins.gpio16, // open line
        peripherals.pins.gpio17, // close line
    )?;
    info!("motor initialized");

    // =========================================================================
    // Network
    // =========================================================================
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let wifi = Esp32Wifi::connect(peripherals.modem, sysloop, Some(nvs), &config.wifi)?;
    info!("wifi up, ip {:?}", wifi.ip_addr());

    let gateway = EspMqttGateway::new(&config.sync)?;
    info!(
        "gateway up, broker {}:{}",
        config.sync.host.as_str(),
        config.sync.port
    );

    // =========================================================================
    // Controller
    // =========================================================================
    let mut door = DoorController::new(
        sensors,
        motor,
        gateway,
        Esp32Clock::new(),
        Esp32Delay::new(),
        &config.door,
    );

    door.initialize()?;
    info!("door initialized, entering poll loop");

    door.run()?;
    Ok(())
}
