use std::str::FromStr;

use humantime::Duration as HumanDuration;
use simplelog::LevelFilter;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(name = "rfm9x-util")]
/// A Command Line Interface (CLI) for interacting with a local RFM9x radio module
pub struct Options {
    #[structopt(subcommand)]
    /// Subcommand to execute
    pub command: Command,

    /// SPI device for radio connection
    #[structopt(long = "spi", default_value = "/dev/spidev0.0", env = "RFM9X_SPI")]
    pub spi: String,

    /// Reset (output) pin
    #[structopt(long = "rst-pin", default_value = "17", env = "RFM9X_RST")]
    pub rst: u64,

    /// DIO0 (input) pin, completion is polled over SPI when not set
    #[structopt(long = "dio0-pin", env = "RFM9X_DIO0")]
    pub dio0: Option<u64>,

    /// Baud rate setting
    #[structopt(long = "baud", default_value = "1000000", env = "RFM9X_BAUD")]
    pub baud: u32,

    /// Log verbosity setting
    #[structopt(long = "log-level", default_value = "info")]
    pub level: LevelFilter,
}

#[derive(StructOpt, PartialEq, Debug)]
pub enum Command {
    #[structopt(name = "chip-version")]
    /// Fetch the device silicon version
    SiliconVersion,

    #[structopt(name = "lora")]
    /// LoRa mode configuration and operations
    LoRa(LoRaCommand),
}

/// Register profile to configure the radio with
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Preset {
    /// 125kHz, SF7, CR 4/5, 17dBm
    Default,
    /// 125kHz, SF12, CR 4/8, 20dBm
    LongRange,
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Preset::Default),
            "long-range" => Ok(Preset::LongRange),
            _ => Err(format!("unrecognised preset '{}' (default, long-range)", s)),
        }
    }
}

#[derive(StructOpt, PartialEq, Debug)]
pub struct LoRaCommand {
    /// LoRa frequency in MHz
    #[structopt(long = "freq-mhz", default_value = "915")]
    pub freq_mhz: u32,

    /// Register profile (default, long-range)
    #[structopt(long = "preset", default_value = "long-range")]
    pub preset: Preset,

    /// Timeout for blocking operations
    #[structopt(long = "timeout", default_value = "5s")]
    pub timeout: HumanDuration,

    #[structopt(subcommand)]
    /// Operation to execute
    pub operation: Operation,
}

impl LoRaCommand {
    /// Channel frequency in Hz, None if it does not fit in a u32
    pub fn freq_hz(&self) -> Option<u32> {
        self.freq_mhz.checked_mul(1_000_000)
    }

    /// Blocking operation timeout in milliseconds, saturating at u32::MAX
    pub fn timeout_ms(&self) -> u32 {
        u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX)
    }
}

#[derive(StructOpt, PartialEq, Debug)]
pub enum Operation {
    #[structopt(name = "tx")]
    /// Transmit a (string) packet
    Transmit(Transmit),

    #[structopt(name = "rx")]
    /// Receive a (string) packet
    Receive(Receive),

    #[structopt(name = "rssi")]
    /// Poll for RSSI on the specified channel
    Rssi(Rssi),

    #[structopt(name = "repeat")]
    /// Repeat received messages
    Repeat(Repeat),

    #[structopt(name = "telemetry")]
    /// Receive and decode temperature / humidity readings
    Telemetry(Telemetry),
}

#[derive(StructOpt, PartialEq, Debug)]
pub struct Transmit {
    /// Data to be transmitted
    #[structopt(long = "data", default_value = "Click!")]
    pub data: String,

    /// Run continuously
    #[structopt(long = "continuous")]
    pub continuous: bool,

    /// Power in dBm
    #[structopt(long = "power")]
    pub power: Option<i8>,

    /// Specify period for transmission
    #[structopt(long = "period", default_value = "1s")]
    pub period: HumanDuration,
}

#[derive(StructOpt, PartialEq, Debug)]
pub struct Receive {
    /// Run continuously
    #[structopt(long = "continuous")]
    pub continuous: bool,
}

#[derive(StructOpt, PartialEq, Debug)]
pub struct Rssi {
    /// Specify period for RSSI polling
    #[structopt(long = "period", default_value = "1s")]
    pub period: HumanDuration,

    /// Run continuously
    #[structopt(long = "continuous")]
    pub continuous: bool,
}

#[derive(StructOpt, PartialEq, Debug)]
pub struct Repeat {
    /// Run continuously
    #[structopt(long = "continuous")]
    pub continuous: bool,

    /// Power in dBm
    #[structopt(long = "power")]
    pub power: Option<i8>,

    /// Specify delay for response message
    #[structopt(long = "delay", default_value = "100ms")]
    pub delay: HumanDuration,
}

#[derive(StructOpt, PartialEq, Debug)]
pub struct Telemetry {
    /// Run continuously
    #[structopt(long = "continuous")]
    pub continuous: bool,
}
