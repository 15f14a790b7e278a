//! RFM9x LoRa mode definitions
//!
//! Modem configuration types and the register fields they map onto.
//!
//! Copyright 2019 Ryan Kurte

pub use super::common::*;

/// LoRa Radio Configuration Object
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoRaConfig {
    /// Preamble length in symbols (defaults to 0x8)
    /// (note that hardware adds four additional symbols in LoRa mode)
    pub preamble_len: u16,
    /// RxSingle timeout value in symbols (defaults to 0x64)
    pub symbol_timeout: u16,
    /// Payload RX CRC configuration (defaults to enabled)
    pub payload_crc: PayloadCrc,
    /// Sync word (defaults to 0x12, private networks)
    pub sync_word: u8,
    /// Automatic gain control (defaults to off)
    pub agc_auto: bool,
    /// IQ inversion configuration (defaults to disabled)
    pub invert_iq: bool,
}

impl Default for LoRaConfig {
    fn default() -> Self {
        LoRaConfig {
            preamble_len: 0x8,
            symbol_timeout: 0x64,
            payload_crc: PayloadCrc::Enabled,
            sync_word: SYNCWORD_PRIVATE,
            agc_auto: false,
            invert_iq: false,
        }
    }
}

/// LoRa radio channel configuration
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoRaChannel {
    /// LoRa frequency in Hz (defaults to 434 MHz)
    pub freq: u32,
    /// LoRa channel bandwidth (defaults to 125kHz)
    pub bw: Bandwidth,
    /// LoRa spreading factor (defaults to SF7)
    pub sf: SpreadingFactor,
    /// LoRa coding rate (defaults to 4/5)
    pub cr: CodingRate,
}

impl Default for LoRaChannel {
    fn default() -> Self {
        Self {
            freq: 434e6 as u32,
            bw: Bandwidth::Bw125kHz,
            sf: SpreadingFactor::Sf7,
            cr: CodingRate::Cr4_5,
        }
    }
}

impl LoRaChannel {
    /// Low datarate optimisation is mandated when the symbol time exceeds 16ms
    pub fn low_datarate_optimise(&self) -> LowDatarateOptimise {
        let chips = self.sf.chips() as u64;
        if chips * 1000 > 16 * self.bw.hz() as u64 {
            LowDatarateOptimise::Enabled
        } else {
            LowDatarateOptimise::Disabled
        }
    }

    /// Spreading factor 6 only operates with implicit headers
    pub fn implicit_header(&self) -> bool {
        self.sf == SpreadingFactor::Sf6
    }
}

pub const BANDWIDTH_MASK: u8 = 0b1111_0000;

/// LoRa channel bandwidth
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Bandwidth {
    Bw7_8kHz = 0b0000_0000,
    Bw10_4kHz = 0b0001_0000,
    Bw15_6kHz = 0b0010_0000,
    Bw20_8kHz = 0b0011_0000,
    Bw31_25kHz = 0b0100_0000,
    Bw41_7kHz = 0b0101_0000,
    Bw62_5kHz = 0b0110_0000,
    Bw125kHz = 0b0111_0000,
    Bw250kHz = 0b1000_0000,
    Bw500kHz = 0b1001_0000,
}

impl Bandwidth {
    /// Bandwidth in Hz
    pub fn hz(&self) -> u32 {
        use Bandwidth::*;
        match self {
            Bw7_8kHz => 7_800,
            Bw10_4kHz => 10_400,
            Bw15_6kHz => 15_600,
            Bw20_8kHz => 20_800,
            Bw31_25kHz => 31_250,
            Bw41_7kHz => 41_700,
            Bw62_5kHz => 62_500,
            Bw125kHz => 125_000,
            Bw250kHz => 250_000,
            Bw500kHz => 500_000,
        }
    }
}

pub const SPREADING_FACTOR_MASK: u8 = 0b1111_0000;

/// LoRa spreading factor in chips / symbol
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum SpreadingFactor {
    /// Sf6: 64 chips / symbol
    Sf6 = 0b0110_0000,
    /// Sf7: 128 chips / symbol
    Sf7 = 0b0111_0000,
    /// Sf8: 256 chips / symbol
    Sf8 = 0b1000_0000,
    /// Sf9: 512 chips / symbol
    Sf9 = 0b1001_0000,
    /// Sf10: 1024 chips / symbol
    Sf10 = 0b1010_0000,
    /// Sf11: 2048 chips / symbol
    Sf11 = 0b1011_0000,
    /// Sf12: 4096 chips / symbol
    Sf12 = 0b1100_0000,
}

impl SpreadingFactor {
    /// Chips per symbol
    pub fn chips(&self) -> u32 {
        1 << ((*self as u8) >> 4)
    }
}

pub const CODERATE_MASK: u8 = 0b0000_1110;

#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CodingRate {
    /// LoRa Coding rate 4/5
    Cr4_5 = 0b0000_0010,
    /// LoRa Coding rate 4/6
    Cr4_6 = 0b0000_0100,
    /// LoRa Coding rate 4/7
    Cr4_7 = 0b0000_0110,
    /// LoRa Coding rate 4/8
    Cr4_8 = 0b0000_1000,
}

pub const IMPLICITHEADER_MASK: u8 = 0b0000_0001;
pub const IMPLICITHEADER_ENABLE: u8 = 0b0000_0001;
pub const IMPLICITHEADER_DISABLE: u8 = 0b0000_0000;

pub const RXPAYLOADCRC_MASK: u8 = 0b0000_0100;

/// Payload RX CRC configuration
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PayloadCrc {
    Disabled = 0x00,
    Enabled = 0x04,
}

pub const SYMBTIMEOUTMSB_MASK: u8 = 0b0000_0011;

pub const AGC_AUTO_ON_MASK: u8 = 0b0000_0100;
pub const AGC_AUTO_ON_ENABLED: u8 = 0b0000_0100;
pub const AGC_AUTO_ON_DISABLED: u8 = 0b0000_0000;

pub const LOWDATARATEOPTIMIZE_MASK: u8 = 0b0000_1000;

/// Low datarate optimization state
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum LowDatarateOptimise {
    /// Low datarate optimizations disabled
    Disabled = 0x00,
    /// Low datarate optimizations enabled, this is required when symbol length > 16ms
    Enabled = 0x08,
}

pub const SYNCWORD_PRIVATE: u8 = 0x12;
pub const SYNCWORD_LORAWAN: u8 = 0x34;

pub const DETECTIONOPTIMIZE_MASK: u8 = 0b0000_0111;

/// LoRa detection optimization mode
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum DetectionOptimize {
    /// Optimised for Sf7 to Sf12
    Sf7To12 = 0x03,
    /// Optimised for Sf6
    Sf6 = 0x05,
}

pub const DETECTIONTHRESHOLD_SF7TO12: u8 = 0x0A;
pub const DETECTIONTHRESHOLD_SF6: u8 = 0x0C;

pub const INVERTIQ_RX_MASK: u8 = 0xBF;
pub const INVERTIQ_RX_OFF: u8 = 0x00;
pub const INVERTIQ_RX_ON: u8 = 0x40;
pub const INVERTIQ_TX_MASK: u8 = 0xFE;
pub const INVERTIQ_TX_OFF: u8 = 0x01;
pub const INVERTIQ_TX_ON: u8 = 0x00;

pub const INVERTIQ2_ON: u8 = 0x19;
pub const INVERTIQ2_OFF: u8 = 0x1D;

/// Modem configuration register values for a channel and modem configuration
///
/// Returns (MODEMCONFIG1, MODEMCONFIG2, MODEMCONFIG3)
pub fn modem_config(channel: &LoRaChannel, config: &LoRaConfig) -> (u8, u8, u8) {
    let implicit_header = if channel.implicit_header() {
        IMPLICITHEADER_ENABLE
    } else {
        IMPLICITHEADER_DISABLE
    };

    let mc1 = channel.bw as u8 | channel.cr as u8 | implicit_header;

    let symbol_timeout_msb = ((config.symbol_timeout >> 8) as u8) & SYMBTIMEOUTMSB_MASK;
    let mc2 = channel.sf as u8 | config.payload_crc as u8 | symbol_timeout_msb;

    let agc = if config.agc_auto {
        AGC_AUTO_ON_ENABLED
    } else {
        AGC_AUTO_ON_DISABLED
    };
    let mc3 = channel.low_datarate_optimise() as u8 | agc;

    (mc1, mc2, mc3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_modem_config() {
        let (mc1, mc2, mc3) = modem_config(&LoRaChannel::default(), &LoRaConfig::default());
        assert_eq!(mc1, 0x72);
        assert_eq!(mc2, 0x74);
        assert_eq!(mc3, 0x00);
    }

    #[test]
    fn long_range_modem_config() {
        let channel = LoRaChannel {
            freq: 915_000_000,
            bw: Bandwidth::Bw125kHz,
            sf: SpreadingFactor::Sf12,
            cr: CodingRate::Cr4_8,
        };
        let config = LoRaConfig {
            agc_auto: true,
            ..LoRaConfig::default()
        };
        assert_eq!(modem_config(&channel, &config), (0x78, 0xC4, 0x0C));
    }

    #[test]
    fn low_datarate_threshold() {
        let mut channel = LoRaChannel::default();

        channel.sf = SpreadingFactor::Sf10;
        assert_eq!(channel.low_datarate_optimise(), LowDatarateOptimise::Disabled);

        // 2048 chips at 125kHz is 16.4ms
        channel.sf = SpreadingFactor::Sf11;
        assert_eq!(channel.low_datarate_optimise(), LowDatarateOptimise::Enabled);

        channel.bw = Bandwidth::Bw250kHz;
        assert_eq!(channel.low_datarate_optimise(), LowDatarateOptimise::Disabled);

        channel.sf = SpreadingFactor::Sf7;
        channel.bw = Bandwidth::Bw7_8kHz;
        assert_eq!(channel.low_datarate_optimise(), LowDatarateOptimise::Enabled);
    }

    #[test]
    fn sf6_uses_implicit_header() {
        let channel = LoRaChannel {
            sf: SpreadingFactor::Sf6,
            ..LoRaChannel::default()
        };
        let (mc1, _, _) = modem_config(&channel, &LoRaConfig::default());
        assert_eq!(mc1 & IMPLICITHEADER_MASK, IMPLICITHEADER_ENABLE);
    }

    #[test]
    fn symbol_timeout_msb() {
        let config = LoRaConfig {
            symbol_timeout: 0x3FF,
            ..LoRaConfig::default()
        };
        let (_, mc2, _) = modem_config(&LoRaChannel::default(), &config);
        assert_eq!(mc2 & SYMBTIMEOUTMSB_MASK, 0x03);
    }
}
