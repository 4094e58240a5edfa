//! Clock Rates.
//!
//! The system clock is configured as a frequency (`"1GHz"`) or a period
//! (`"1ns"`). Internally the simulator counts time in picosecond ticks.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ConfigError;

const TICKS_PER_SECOND: f64 = 1.0e12;

/// A clock domain with its frequency and period.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Clock {
    frequency_hz: f64,
}

impl Clock {
    /// Creates a clock running at `frequency_hz`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidClock` for a non-positive or non-finite
    /// frequency.
    pub fn from_hz(frequency_hz: f64) -> Result<Self, ConfigError> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(ConfigError::InvalidClock(frequency_hz.to_string()));
        }
        Ok(Self { frequency_hz })
    }

    /// Clock frequency in hertz.
    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    /// Clock period in picosecond ticks, rounded to the nearest tick.
    pub fn period_ticks(&self) -> u64 {
        (TICKS_PER_SECOND / self.frequency_hz).round() as u64
    }
}

impl Default for Clock {
    /// Returns a 1 GHz clock.
    fn default() -> Self {
        Self { frequency_hz: 1.0e9 }
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hz = self.frequency_hz;
        if hz >= 1.0e9 {
            write!(f, "{}GHz", hz / 1.0e9)
        } else if hz >= 1.0e6 {
            write!(f, "{}MHz", hz / 1.0e6)
        } else if hz >= 1.0e3 {
            write!(f, "{}kHz", hz / 1.0e3)
        } else {
            write!(f, "{}Hz", hz)
        }
    }
}

impl FromStr for Clock {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || ConfigError::InvalidClock(s.to_string());

        let split = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(text.len());
        let (number, unit) = text.split_at(split);
        let value: f64 = number.parse().map_err(|_| invalid())?;

        let hz = match unit.trim() {
            "Hz" => value,
            "kHz" => value * 1.0e3,
            "MHz" => value * 1.0e6,
            "GHz" => value * 1.0e9,
            "s" => 1.0 / value,
            "ms" => 1.0e3 / value,
            "us" => 1.0e6 / value,
            "ns" => 1.0e9 / value,
            "ps" => 1.0e12 / value,
            _ => return Err(invalid()),
        };

        Self::from_hz(hz).map_err(|_| invalid())
    }
}

impl<'de> Deserialize<'de> for Clock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
