//! RFM9x / SX1276 register definitions
//!
//! Addresses for the common page and the LoRa page of the register map.
//!
//! Copyright 2019 Ryan Kurte

/// Read access clears the MSB of the address byte
pub const READ_MASK: u8 = 0x7F;
/// Write access sets the MSB of the address byte
pub const WRITE_FLAG: u8 = 0x80;

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Register {
    Common(Common),
    LoRa(LoRa),
}

impl From<Register> for u8 {
    fn from(r: Register) -> u8 {
        match r {
            Register::Common(c) => c as u8,
            Register::LoRa(l) => l as u8,
        }
    }
}

impl From<Common> for u8 {
    fn from(c: Common) -> u8 {
        c as u8
    }
}

impl From<LoRa> for u8 {
    fn from(l: LoRa) -> u8 {
        l as u8
    }
}

impl From<Common> for Register {
    fn from(common: Common) -> Register {
        Register::Common(common)
    }
}

impl From<LoRa> for Register {
    fn from(lora: LoRa) -> Register {
        Register::LoRa(lora)
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Common {
    FIFO = 0x00,
    // Common settings
    OPMODE = 0x01,
    FRFMSB = 0x06,
    FRFMID = 0x07,
    FRFLSB = 0x08,
    // Tx settings
    PACONFIG = 0x09,
    PARAMP = 0x0A,
    OCP = 0x0B,
    // Rx settings
    LNA = 0x0C,
    // I/O settings
    DIOMAPPING1 = 0x40,
    DIOMAPPING2 = 0x41,
    // Version
    VERSION = 0x42,
    // Additional settings
    TCXO = 0x4B,
    PADAC = 0x4D,
    FORMERTEMP = 0x5B,
    AGCREF = 0x61,
    AGCTHRESH1 = 0x62,
    AGCTHRESH2 = 0x63,
    AGCTHRESH3 = 0x64,
    PLL = 0x70,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum LoRa {
    FIFOADDRPTR = 0x0D,
    FIFOTXBASEADDR = 0x0E,
    FIFORXBASEADDR = 0x0F,
    FIFORXCURRENTADDR = 0x10,
    IRQFLAGSMASK = 0x11,
    IRQFLAGS = 0x12,
    RXNBBYTES = 0x13,
    RXHEADERCNTVALUEMSB = 0x14,
    RXHEADERCNTVALUELSB = 0x15,
    RXPACKETCNTVALUEMSB = 0x16,
    RXPACKETCNTVALUELSB = 0x17,
    MODEMSTAT = 0x18,
    PKTSNRVALUE = 0x19,
    PKTRSSIVALUE = 0x1A,
    RSSIVALUE = 0x1B,
    HOPCHANNEL = 0x1C,
    MODEMCONFIG1 = 0x1D,
    MODEMCONFIG2 = 0x1E,
    SYMBTIMEOUTLSB = 0x1F,
    PREAMBLEMSB = 0x20,
    PREAMBLELSB = 0x21,
    PAYLOADLENGTH = 0x22,
    PAYLOADMAXLENGTH = 0x23,
    HOPPERIOD = 0x24,
    FIFORXBYTEADDR = 0x25,
    MODEMCONFIG3 = 0x26,
    FEIMSB = 0x28,
    FEIMID = 0x29,
    FEILSB = 0x2A,
    RSSIWIDEBAND = 0x2C,
    DETECTOPTIMIZE = 0x31,
    INVERTIQ = 0x33,
    DETECTIONTHRESHOLD = 0x37,
    SYNCWORD = 0x39,
    INVERTIQ2 = 0x3B,
}
