//! RFM9x hardware loopback testing
//!
//! Requires two radios attached to the host, configured via environment variables:
//! `RFM9X_TX_SPI`, `RFM9X_TX_RST`, `RFM9X_RX_SPI`, `RFM9X_RX_RST` and optionally
//! `RFM9X_TX_DIO0` / `RFM9X_RX_DIO0`.
//!
//! Copyright 2019 Ryan Kurte

use std::thread;
use std::time::Duration;

use linux_embedded_hal::spidev::{self, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, SpidevDevice, SysfsPin};

use radio_rfm9x::prelude::*;

fn env_pin(name: &str) -> Option<u64> {
    std::env::var(name).ok().map(|v| {
        v.parse()
            .unwrap_or_else(|_| panic!("invalid pin number for {}: {}", name, v))
    })
}

/// Open the radio attached via `RFM9X_<prefix>_*` pins
macro_rules! load {
    ($prefix:expr, $config:expr) => {{
        let prefix = $prefix;
        let spi_path = std::env::var(format!("RFM9X_{}_SPI", prefix))
            .unwrap_or_else(|_| panic!("missing RFM9X_{}_SPI", prefix));
        let rst_pin = env_pin(&format!("RFM9X_{}_RST", prefix))
            .unwrap_or_else(|| panic!("missing RFM9X_{}_RST", prefix));
        let dio0_pin = env_pin(&format!("RFM9X_{}_DIO0", prefix));

        let mut spi = SpidevDevice::open(&spi_path).expect("error opening spi device");
        let mut opts = SpidevOptions::new();
        opts.mode(spidev::SpiModeFlags::SPI_MODE_0);
        opts.max_speed_hz(1_000_000);
        spi.configure(&opts).expect("error configuring spi device");

        let rst = SysfsPin::new(rst_pin);
        rst.export().expect("error exporting rst pin");
        rst.set_direction(Direction::High)
            .expect("error setting rst pin direction");

        let dio0 = dio0_pin.map(|p| {
            let pin = SysfsPin::new(p);
            pin.export().expect("error exporting dio0 pin");
            pin.set_direction(Direction::In)
                .expect("error setting dio0 pin direction");
            pin
        });

        Rfm9x::spi(spi, rst, dio0, Delay {}, $config).expect("error creating radio")
    }};
}

#[test]
#[ignore]
fn integration() {
    color_backtrace::install();

    let config = Config::long_range(915_000_000);

    let mut radio1 = load!("RX", &config);
    let mut radio2 = load!("TX", &config);

    println!("Testing send/receive");

    let data = Reading::new(23.45, 61.2).encode();

    // Configure receive
    radio1.start_receive().unwrap();

    // Start transmit
    radio2.start_transmit(&data).unwrap();

    // Poll on tx and rx complete
    let mut sent = false;
    let mut received = false;
    let mut buff = [0u8; 255];
    let mut n = 0;

    for _i in 0..50 {
        // Check TX state
        if !sent && radio2.check_transmit().unwrap() {
            println!("TX complete");
            sent = true;
        }

        // Check RX state
        if !received && radio1.check_receive(false).unwrap() {
            let (len, info) = radio1.get_received(&mut buff).unwrap();
            n = len;
            received = true;
            println!("RX complete ({:?} {:?})", info, &buff[..n]);
        }

        if sent && received {
            break;
        }

        thread::sleep(Duration::from_millis(100));
    }

    assert!(sent, "Send not completed");
    assert!(received, "Receive not completed");
    assert_eq!(&data[..], &buff[..n]);

    let reading = Reading::decode(&buff[..n]).expect("invalid reading");
    assert_eq!(reading.temperature, 2345);
    assert_eq!(reading.humidity, 6120);
}
