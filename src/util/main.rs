//! RFM9x command line utility
//!
//! Provides mechanisms for command line interaction with RFM9x devices using linux spidev and sysfs_gpio
//!
//! Copyright 2019 Ryan Kurte

use log::{debug, error, info};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use structopt::StructOpt;

use linux_embedded_hal::spidev::{self, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, SpidevDevice, SysfsPin};

use radio_rfm9x::prelude::*;

mod options;
use options::*;

mod operations;
use operations::*;

fn main() {
    // Load options
    let opts = Options::from_args();

    // Setup logging
    let _ = TermLogger::init(
        opts.level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );

    debug!("Connecting to SPI device");

    // Connect to hardware
    let mut spi = SpidevDevice::open(&opts.spi).expect("error opening spi device");
    let mut config = SpidevOptions::new();
    config.mode(spidev::SpiModeFlags::SPI_MODE_0);
    config.max_speed_hz(opts.baud);
    spi.configure(&config).expect("error configuring spi device");

    debug!("Configuring I/O pins");

    let rst = SysfsPin::new(opts.rst);
    rst.export().expect("error exporting rst pin");
    rst.set_direction(Direction::High)
        .expect("error setting rst pin direction");

    let dio0 = opts.dio0.map(|p| {
        let dio0 = SysfsPin::new(p);
        dio0.export().expect("error exporting dio0 pin");
        dio0.set_direction(Direction::In)
            .expect("error setting dio0 pin direction");
        dio0
    });

    let radio_config = match &opts.command {
        Command::LoRa(c) => {
            let freq = match c.freq_hz() {
                Some(f) => f,
                None => {
                    error!("Invalid frequency: {} MHz", c.freq_mhz);
                    std::process::exit(1);
                }
            };
            let mut config = match c.preset {
                Preset::Default => Config::default().with_frequency(freq),
                Preset::LongRange => Config::long_range(freq),
            };
            config.timeout_ms = c.timeout_ms();
            config
        }
        _ => Config::default(),
    };

    debug!("Creating radio instance");
    let mut radio = match Rfm9x::spi(spi, rst, dio0, Delay {}, &radio_config) {
        Ok(r) => r,
        Err(e) => {
            error!("Error creating device: {}", e);
            std::process::exit(1);
        }
    };

    debug!("Executing command");
    let res = match opts.command {
        Command::SiliconVersion => radio.silicon_version().map(|version| {
            info!("Silicon version: 0x{:X}", version);
        }),
        Command::LoRa(lora_config) => do_command(&mut radio, lora_config.operation),
    };

    if let Err(e) = res {
        error!("Error executing command: {}", e);
        std::process::exit(1);
    }
}
