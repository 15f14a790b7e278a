//! Sensor reading payload
//!
//! Temperature and humidity readings are sent as two little-endian `i16`s in
//! hundredths of a degree Celsius and hundredths of a percent relative humidity.
//!
//! Copyright 2019 Ryan Kurte

/// Encoded length of a [`Reading`]
pub const READING_LEN: usize = 4;

/// Temperature and humidity reading
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Reading {
    /// Temperature in 0.01 °C
    pub temperature: i16,
    /// Relative humidity in 0.01 %
    pub humidity: i16,
}

/// Payload is not a valid reading
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct InvalidReading(pub usize);

impl Reading {
    /// Build a reading from floating point values, rounding to the nearest hundredth
    pub fn new(temperature: f32, humidity: f32) -> Self {
        Self {
            temperature: centi(temperature),
            humidity: centi(humidity),
        }
    }

    /// Temperature in °C
    pub fn temperature_c(&self) -> f32 {
        self.temperature as f32 / 100.0
    }

    /// Relative humidity in %
    pub fn humidity_pct(&self) -> f32 {
        self.humidity as f32 / 100.0
    }

    pub fn encode(&self) -> [u8; READING_LEN] {
        let t = self.temperature.to_le_bytes();
        let h = self.humidity.to_le_bytes();
        [t[0], t[1], h[0], h[1]]
    }

    /// Decode a reading, the payload must be exactly [`READING_LEN`] bytes
    pub fn decode(data: &[u8]) -> Result<Self, InvalidReading> {
        if data.len() != READING_LEN {
            return Err(InvalidReading(data.len()));
        }

        Ok(Self {
            temperature: i16::from_le_bytes([data[0], data[1]]),
            humidity: i16::from_le_bytes([data[2], data[3]]),
        })
    }
}

fn centi(v: f32) -> i16 {
    let scaled = v * 100.0;
    let rounded = if scaled < 0.0 {
        scaled - 0.5
    } else {
        scaled + 0.5
    };
    rounded as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_sensor_payload() {
        // 23.45 °C, 61.20 %
        let r = Reading::decode(&[0x29, 0x09, 0xE8, 0x17]).unwrap();
        assert_eq!(r.temperature, 2345);
        assert_eq!(r.humidity, 6120);
        let t = r.temperature_c();
        assert!(t > 23.449 && t < 23.451);
    }

    #[test]
    fn negative_temperature() {
        let r = Reading::new(-5.25, 40.0);
        assert_eq!(r.temperature, -525);
        assert_eq!(Reading::decode(&r.encode()), Ok(r));
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(Reading::decode(&[0x01, 0x02, 0x03]), Err(InvalidReading(3)));
        assert_eq!(Reading::decode(b"Click!"), Err(InvalidReading(6)));
    }
}
