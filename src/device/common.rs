//! Power amplifier, over-current protection and LNA settings
//!
//! These are shared by every modem mode and live on the common register page.
//!
//! Copyright 2019 Ryan Kurte

pub const PASELECT_MASK: u8 = 0b1000_0000;
pub const PASELECT_RFO: u8 = 0b0000_0000;
pub const PASELECT_PA_BOOST: u8 = 0b1000_0000;

pub const MAXPOWER_MASK: u8 = 0b0111_0000;
pub const MAXPOWER_SHIFT: u8 = 4;
/// Maximum MaxPower setting, Pmax = 10.8 + 0.6 * 7 = 15 dBm
pub const MAXPOWER_MAX: u8 = 0x07;

pub const OUTPUTPOWER_MASK: u8 = 0b0000_1111;

pub const PADAC_20DBM_ON: u8 = 0x87;
pub const PADAC_20DBM_OFF: u8 = 0x84;

/// Select the power amplifier output
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PaSelect {
    /// RFO pin, output power limited to +14dBm
    Rfo,
    /// PA_BOOST pin, output power limited to +20dBm.
    /// RFM95/96/97/98 modules only route this pin to the antenna.
    Boost,
}

/// Power amplifier configuration
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PaConfig {
    /// Power amplifier output selection (defaults to PA_BOOST output)
    pub output: PaSelect,
    /// Output power in dBm (defaults to 17dBm)
    pub power: i8,
}

impl Default for PaConfig {
    fn default() -> Self {
        Self {
            output: PaSelect::Boost,
            power: 17,
        }
    }
}

impl PaConfig {
    /// Output power limits in dBm for the selected output
    pub fn power_limits(&self) -> (i8, i8) {
        match self.output {
            PaSelect::Rfo => (0, 14),
            PaSelect::Boost => (2, 20),
        }
    }

    /// Requested power clamped to the limits of the selected output
    pub fn clamped_power(&self) -> i8 {
        let (min, max) = self.power_limits();
        self.power.clamp(min, max)
    }

    /// Compute the PACONFIG and PADAC register values for this configuration.
    ///
    /// Out of range power requests are clamped, see [`PaConfig::clamped_power`].
    pub fn registers(&self) -> (u8, u8) {
        let max = MAXPOWER_MAX << MAXPOWER_SHIFT;
        let power = self.clamped_power();

        match self.output {
            // With Pmax = 15dBm, Pout = OutputPower
            PaSelect::Rfo => (PASELECT_RFO | max | power as u8, PADAC_20DBM_OFF),
            // High power mode, Pout = 20 - (15 - OutputPower)
            PaSelect::Boost if power > 17 => {
                (PASELECT_PA_BOOST | max | (power - 5) as u8, PADAC_20DBM_ON)
            }
            // Pout = 17 - (15 - OutputPower)
            PaSelect::Boost => (PASELECT_PA_BOOST | max | (power - 2) as u8, PADAC_20DBM_OFF),
        }
    }
}

pub const OCP_ON: u8 = 0b0010_0000;
pub const OCP_TRIM_MASK: u8 = 0b0001_1111;

/// Over current protection for the power amplifier
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Ocp {
    Disabled,
    /// Current limit in mA (45 to 240mA)
    Enabled(u8),
}

impl Default for Ocp {
    fn default() -> Self {
        Ocp::Enabled(100)
    }
}

impl Ocp {
    /// OCP register value
    pub fn register(&self) -> u8 {
        match *self {
            Ocp::Disabled => 0x00,
            Ocp::Enabled(ma) => {
                let ma = ma.max(45) as u16;
                let trim = if ma <= 120 {
                    (ma - 45) / 5
                } else if ma <= 240 {
                    (ma + 30) / 10
                } else {
                    27
                };
                OCP_ON | (trim as u8 & OCP_TRIM_MASK)
            }
        }
    }
}

pub const LNA_GAIN_SHIFT: u8 = 5;
pub const LNA_BOOST_HF_ON: u8 = 0b0000_0011;
pub const LNA_BOOST_HF_OFF: u8 = 0b0000_0000;

/// LNA gain setting, G1 is the highest gain
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum LnaGain {
    G1 = 0x01,
    G2 = 0x02,
    G3 = 0x03,
    G4 = 0x04,
    G5 = 0x05,
    G6 = 0x06,
}

/// Low noise amplifier configuration
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Lna {
    /// LNA gain (defaults to G1)
    pub gain: LnaGain,
    /// HF LNA current boost (defaults to off)
    pub boost_hf: bool,
}

impl Default for Lna {
    fn default() -> Self {
        Self {
            gain: LnaGain::G1,
            boost_hf: false,
        }
    }
}

impl Lna {
    /// LNA register value
    pub fn register(&self) -> u8 {
        let boost = if self.boost_hf {
            LNA_BOOST_HF_ON
        } else {
            LNA_BOOST_HF_OFF
        };
        ((self.gain as u8) << LNA_GAIN_SHIFT) | boost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pa_boost_high_power() {
        let pa = PaConfig {
            output: PaSelect::Boost,
            power: 20,
        };
        assert_eq!(pa.registers(), (0xFF, 0x87));
    }

    #[test]
    fn pa_boost_clamps() {
        let pa = PaConfig {
            output: PaSelect::Boost,
            power: 30,
        };
        assert_eq!(pa.registers(), (0xFF, PADAC_20DBM_ON));

        let pa = PaConfig {
            output: PaSelect::Boost,
            power: -10,
        };
        assert_eq!(pa.registers(), (0xF0, PADAC_20DBM_OFF));
        assert_eq!(pa.clamped_power(), 2);
    }

    #[test]
    fn pa_clamped_power() {
        let pa = PaConfig {
            output: PaSelect::Rfo,
            power: 17,
        };
        assert_eq!(pa.power_limits(), (0, 14));
        assert_eq!(pa.clamped_power(), 14);

        let pa = PaConfig::default();
        assert_eq!(pa.clamped_power(), pa.power);
    }

    #[test]
    fn pa_rfo() {
        let pa = PaConfig {
            output: PaSelect::Rfo,
            power: 10,
        };
        assert_eq!(pa.registers(), (0x7A, PADAC_20DBM_OFF));
    }

    #[test]
    fn ocp_trim() {
        assert_eq!(Ocp::Enabled(200).register(), 0x37);
        assert_eq!(Ocp::Enabled(100).register(), 0x2B);
        assert_eq!(Ocp::Enabled(250).register(), 0x3B);
        assert_eq!(Ocp::Disabled.register(), 0x00);
    }

    #[test]
    fn lna_values() {
        let lna = Lna {
            gain: LnaGain::G1,
            boost_hf: true,
        };
        assert_eq!(lna.register(), 0x23);
        assert_eq!(Lna::default().register(), 0x20);
    }
}
