//! RFM9x general device definitions
//!
//! Operating states, interrupt flags, and the top level radio configuration.
//!
//! Copyright 2019 Ryan Kurte

use core::convert::TryFrom;

use bitflags::bitflags;

pub mod regs;

pub mod common;
pub use common::{Lna, LnaGain, Ocp, PaConfig, PaSelect};

pub mod lora;
use lora::{Bandwidth, CodingRate, LoRaChannel, LoRaConfig, PayloadCrc, SpreadingFactor};

/// Crystal oscillator frequency
pub const XTAL_FREQ: u32 = 32_000_000;

/// Device frequency step (XTAL_FREQ / 2^19)
pub const FREQ_STEP: f32 = 61.03515625;

/// Expected silicon version for SX1276/7/8/9 based modules
pub const VERSION: u8 = 0x12;

/// Maximum LoRa payload length
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Default blocking operation timeout
pub const DEFAULT_TIMEOUT_MS: u32 = 5000;

/// Offset for LF RSSI calculation
pub const RSSI_OFFSET_LF: i16 = -164;

/// Offset for HF RSSI calculation
pub const RSSI_OFFSET_HF: i16 = -157;

/// Channels above this frequency use the HF port
pub const RF_MID_BAND_THRESH: u32 = 525_000_000;

/// Supported synthesizer range in Hz
pub const FREQ_MIN: u32 = 137_000_000;
pub const FREQ_MAX: u32 = 1_020_000_000;

pub const OPMODE_STATE_MASK: u8 = 0b0000_0111;

/// RFM9x radio state enumeration
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum State {
    Sleep = 0x00,
    Standby = 0x01,
    FsTx = 0x02,
    Tx = 0x03,
    FsRx = 0x04,
    /// Continuous receive mode
    Rx = 0x05,
    /// Single receive mode
    RxSingle = 0x06,
    /// Channel activity detection mode
    Cad = 0x07,
}

impl TryFrom<u8> for State {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, u8> {
        match v & OPMODE_STATE_MASK {
            0x00 => Ok(State::Sleep),
            0x01 => Ok(State::Standby),
            0x02 => Ok(State::FsTx),
            0x03 => Ok(State::Tx),
            0x04 => Ok(State::FsRx),
            0x05 => Ok(State::Rx),
            0x06 => Ok(State::RxSingle),
            0x07 => Ok(State::Cad),
            _ => Err(v),
        }
    }
}

impl radio::RadioState for State {
    fn idle() -> Self {
        State::Standby
    }

    fn sleep() -> Self {
        State::Sleep
    }
}

pub const OPMODE_LONGRANGEMODE_MASK: u8 = 0b1000_0000;
pub const OPMODE_LONGRANGEMODE_ON: u8 = 0b1000_0000;

/// OPMODE register LowFrequencyMode bit mask
pub const OPMODE_LF_MASK: u8 = 0b0000_1000;

/// Frequency mode, selects the register bank for the LF or HF port
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum FrequencyMode {
    /// High frequency mode
    Hf = 0x00,
    /// Low frequency mode
    Lf = 0x08,
}

impl FrequencyMode {
    pub fn for_frequency(freq: u32) -> Self {
        if freq > RF_MID_BAND_THRESH {
            FrequencyMode::Hf
        } else {
            FrequencyMode::Lf
        }
    }

    /// RSSI offset for the port in use
    pub fn rssi_offset(&self) -> i16 {
        match self {
            FrequencyMode::Hf => RSSI_OFFSET_HF,
            FrequencyMode::Lf => RSSI_OFFSET_LF,
        }
    }
}

/// OPMODE register value for a LoRa mode state
pub fn opmode(state: State, freq_mode: FrequencyMode) -> u8 {
    OPMODE_LONGRANGEMODE_ON | freq_mode as u8 | state as u8
}

/// Compute the 24-bit FRF register value for a frequency in Hz
pub fn frequency_to_frf(freq: u32, xtal: u32) -> u32 {
    (((freq as u64) << 19) / xtal as u64) as u32
}

/// Compute the frequency in Hz for a 24-bit FRF register value
pub fn frf_to_frequency(frf: u32, xtal: u32) -> u32 {
    ((frf as u64 * xtal as u64) >> 19) as u32
}

pub const DIOMAPPING1_DIO0_MASK: u8 = 0b1100_0000;

/// DIO0 pin function, DIO0 is the only pin used by the driver
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Dio0Mapping {
    RxDone = 0x00,
    TxDone = 0x40,
    CadDone = 0x80,
}

bitflags! {
    /// LoRa interrupt flags, cleared by writing a one to the flag
    pub struct Irq: u8 {
        /// Receive timeout (single receive mode only)
        const RX_TIMEOUT           = 0b1000_0000;
        /// Packet receipt complete
        const RX_DONE              = 0b0100_0000;
        /// Indicates an invalid payload CRC was received
        const CRC_ERROR            = 0b0010_0000;
        /// Indicates a valid header has been received
        const VALID_HEADER         = 0b0001_0000;
        /// Packet sending complete
        const TX_DONE              = 0b0000_1000;
        /// Channel activity detection complete
        const CAD_DONE             = 0b0000_0100;
        /// Frequency hopping channel change request
        const FHSS_CHANGE_CHANNEL  = 0b0000_0010;
        /// Channel activity detected
        const CAD_DETECTED         = 0b0000_0001;
    }
}

/// Received packet information
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PacketInfo {
    /// Received Signal Strength Indication in dBm
    pub rssi: i16,
    /// Signal to Noise Ratio in dB
    pub snr: i16,
}

impl radio::ReceiveInfo for PacketInfo {
    fn rssi(&self) -> i16 {
        self.rssi
    }
}

impl PacketInfo {
    /// Compute packet RSSI and SNR from PKTRSSIVALUE and PKTSNRVALUE
    pub fn from_raw(rssi: u8, snr: u8, freq_mode: FrequencyMode) -> Self {
        // SNR is two's complement in quarter dB steps
        let snr = (snr as i8 as i16) / 4;

        let raw = rssi as i16;
        let mut rssi = freq_mode.rssi_offset() + raw + (raw >> 4);
        if snr < 0 {
            rssi += snr;
        }

        PacketInfo { rssi, snr }
    }
}

/// RFM9x radio configuration
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// LoRa channel configuration
    pub channel: LoRaChannel,

    /// LoRa modem configuration
    pub modem: LoRaConfig,

    /// Power amplifier configuration
    pub pa_config: PaConfig,

    /// Over current protection
    pub ocp: Ocp,

    /// Low noise amplifier configuration
    pub lna: Lna,

    /// Oscillator frequency in Hz
    pub xtal_freq: u32,

    /// Timeout for blocking transmit and receive operations
    pub timeout_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            channel: LoRaChannel::default(),
            modem: LoRaConfig::default(),
            pa_config: PaConfig::default(),
            ocp: Ocp::default(),
            lna: Lna::default(),
            xtal_freq: XTAL_FREQ,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Long range profile: 125kHz, SF12, CR 4/8 with 20dBm output
    pub fn long_range(freq: u32) -> Self {
        Config {
            channel: LoRaChannel {
                freq,
                bw: Bandwidth::Bw125kHz,
                sf: SpreadingFactor::Sf12,
                cr: CodingRate::Cr4_8,
            },
            modem: LoRaConfig {
                preamble_len: 12,
                payload_crc: PayloadCrc::Enabled,
                agc_auto: true,
                ..LoRaConfig::default()
            },
            pa_config: PaConfig {
                output: PaSelect::Boost,
                power: 20,
            },
            ocp: Ocp::Enabled(200),
            lna: Lna {
                gain: LnaGain::G1,
                boost_hf: true,
            },
            ..Config::default()
        }
    }

    /// Set the channel frequency
    pub fn with_frequency(mut self, freq: u32) -> Self {
        self.channel.freq = freq;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frf_for_common_bands() {
        assert_eq!(frequency_to_frf(915_000_000, XTAL_FREQ), 0xE4C000);
        assert_eq!(frequency_to_frf(868_000_000, XTAL_FREQ), 0xD90000);
        assert_eq!(frequency_to_frf(434_000_000, XTAL_FREQ), 0x6C8000);
    }

    #[test]
    fn frf_read_back() {
        let frf = frequency_to_frf(907_400_000, XTAL_FREQ);
        let freq = frf_to_frequency(frf, XTAL_FREQ);
        assert!(907_400_000 - freq < FREQ_STEP as u32 + 1);
    }

    #[test]
    fn opmode_values() {
        assert_eq!(opmode(State::Sleep, FrequencyMode::Hf), 0x80);
        assert_eq!(opmode(State::Standby, FrequencyMode::Hf), 0x81);
        assert_eq!(opmode(State::Tx, FrequencyMode::Hf), 0x83);
        assert_eq!(opmode(State::Rx, FrequencyMode::Lf), 0x8D);
    }

    #[test]
    fn state_from_opmode() {
        assert_eq!(State::try_from(0x81), Ok(State::Standby));
        assert_eq!(State::try_from(0x8D), Ok(State::Rx));
    }

    #[test]
    fn packet_info_positive_snr() {
        // SNR +10dB, raw RSSI 100
        let info = PacketInfo::from_raw(100, 40, FrequencyMode::Hf);
        assert_eq!(info.snr, 10);
        assert_eq!(info.rssi, -157 + 100 + 6);
    }

    #[test]
    fn packet_info_negative_snr() {
        // SNR -5dB
        let info = PacketInfo::from_raw(40, (-20i8) as u8, FrequencyMode::Lf);
        assert_eq!(info.snr, -5);
        assert_eq!(info.rssi, -164 + 40 + 2 - 5);
    }

    #[test]
    fn long_range_profile() {
        let config = Config::long_range(915_000_000);
        assert_eq!(config.pa_config.registers(), (0xFF, 0x87));
        assert_eq!(config.ocp.register(), 0x37);
        assert_eq!(config.lna.register(), 0x23);
        assert_eq!(config.modem.sync_word, 0x12);
    }
}
