//! Transmit a telemetry reading every few seconds using crate radio_rfm9x on a linux spidev.
//!
//! Wiring is taken from the environment: `RFM9X_SPI` (default /dev/spidev0.0),
//! `RFM9X_RST` (default 17) and optionally `RFM9X_DIO0`.
//! See lora_spi_receive for the other end of the link.

use std::thread;
use std::time::Duration;

use linux_embedded_hal::spidev::{self, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, SpidevDevice, SysfsPin};

use radio_rfm9x::prelude::*;

// ch_12_900: 915_000_000, ch_17_868: 868_000_000
const FREQUENCY: u32 = 915_000_000;

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn main() {
    let mut spi = SpidevDevice::open(env_or("RFM9X_SPI", "/dev/spidev0.0".to_string()))
        .expect("error opening spi device");
    let mut opts = SpidevOptions::new();
    opts.mode(spidev::SpiModeFlags::SPI_MODE_0);
    opts.max_speed_hz(1_000_000);
    spi.configure(&opts).expect("error configuring spi device");

    let rst = SysfsPin::new(env_or("RFM9X_RST", 17));
    rst.export().expect("error exporting rst pin");
    rst.set_direction(Direction::High)
        .expect("error setting rst pin direction");

    let dio0 = std::env::var("RFM9X_DIO0")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(|p| {
            let pin = SysfsPin::new(p);
            pin.export().expect("error exporting dio0 pin");
            pin.set_direction(Direction::In)
                .expect("error setting dio0 pin direction");
            pin
        });

    let mut config = Config::long_range(FREQUENCY);
    config.pa_config = PaConfig {
        output: PaSelect::Boost,
        power: 10,
    };

    let mut lora = Rfm9x::spi(spi, rst, dio0, Delay {}, &config).expect("error creating radio");

    println!("lora setup completed, silicon version 0x{:02X}", lora.silicon_version().unwrap());

    let mut temperature = 20.0;

    loop {
        let reading = Reading::new(temperature, 55.0);

        match lora.transmit(&reading.encode()) {
            Ok(()) => println!("sent {:.2}C", reading.temperature_c()),
            Err(e) => println!("transmit error: {}", e),
        }

        temperature += 0.25;
        thread::sleep(Duration::from_secs(5));
    }
}
