//! Common requirements for crate consumers

pub use crate::{Error, Rfm9x};

pub use crate::device::lora::{
    Bandwidth, CodingRate, LoRaChannel, LoRaConfig, PayloadCrc, SpreadingFactor,
};
pub use crate::device::{Config, Irq, Lna, LnaGain, Ocp, PaConfig, PaSelect, PacketInfo, State};
pub use crate::telemetry::Reading;
