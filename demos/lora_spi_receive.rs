//! Receive telemetry readings using crate radio_rfm9x on a linux spidev.
//!
//! Wiring is taken from the environment as in lora_spi_send.
//! Uses the non-blocking start_receive / check_receive / get_received cycle.

use std::thread;
use std::time::Duration;

use linux_embedded_hal::spidev::{self, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, SpidevDevice, SysfsPin};

use radio_rfm9x::prelude::*;

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

    // DIO0 is not needed when polling IRQFLAGS
    let dio0: Option<SysfsPin> = None;

    let config = Config::long_range(FREQUENCY);
    let mut lora = Rfm9x::spi(spi, rst, dio0, Delay {}, &config).expect("error creating radio");

    lora.start_receive().expect("error starting receive");

    let mut buff = [0u8; 255];

    loop {
        match lora.check_receive(true) {
            Ok(true) => {
                let (n, info) = lora.get_received(&mut buff).expect("error reading packet");

                match Reading::decode(&buff[..n]) {
                    Ok(r) => println!(
                        "{:.2}C {:.2}% (rssi: {} snr: {})",
                        r.temperature_c(),
                        r.humidity_pct(),
                        info.rssi,
                        info.snr
                    ),
                    Err(_) => println!("received {:02x?} (rssi: {})", &buff[..n], info.rssi),
                }
            }
            Ok(false) => (),
            Err(e) => println!("receive error: {}", e),
        }

        thread::sleep(Duration::from_millis(10));
    }
}
