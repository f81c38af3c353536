//! Board configuration types
//!
//! Pin numbers, bus addresses, mux codes, and default calibration all
//! arrive through these structs at construction time, so one driver
//! build serves every board revision. The presets at the bottom encode
//! the shipping A2D board revisions.

use heapless::{String, Vec};

use crate::calibration::LinearCalibration;
use crate::traits::{Gain, SampleRate};

/// Maximum channels on any supported board
pub const MAX_CHANNELS: usize = 8;

/// Maximum board name length
pub const MAX_NAME_LEN: usize = 24;

/// Number of logical channels on the sense board (voltage, current,
/// temperature)
pub const SENSE_CHANNEL_COUNT: usize = 3;

/// One channel of a multi-ADC board: a dedicated chip at a bus address
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IsoChannelConfig {
    /// 7-bit bus address of this channel's ADC chip
    pub bus_addr: u8,
    /// Manufacturing-default calibration (divider ratio, zero offset)
    pub default: LinearCalibration,
}

/// Configuration for a board with one dedicated ADC chip per channel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IsoAdcConfig {
    /// Board revision name (e.g. "a2d-4ch-iso-adc-v1")
    pub name: String<MAX_NAME_LEN>,
    /// Per-channel chip addresses and defaults, in channel order
    pub channels: Vec<IsoChannelConfig, MAX_CHANNELS>,
    /// PGA setting applied to every chip at init
    pub gain: Gain,
    /// Conversion rate applied to every chip at init
    pub rate: SampleRate,
}

impl IsoAdcConfig {
    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

/// Multiplexer input codes for the sense board's logical channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SenseMux {
    pub voltage: u8,
    pub current: u8,
    pub temperature: u8,
}

/// Configuration for a board with one multiplexed ADC chip
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SenseConfig {
    /// Board revision name (e.g. "a2d-sense-board-v1")
    pub name: String<MAX_NAME_LEN>,
    /// 7-bit bus address of the single ADC chip
    pub bus_addr: u8,
    /// Mux input routing for the three logical channels
    pub mux: SenseMux,
    /// Defaults in channel order: voltage, current, temperature
    pub defaults: [LinearCalibration; SENSE_CHANNEL_COUNT],
    /// PGA setting applied at init
    pub gain: Gain,
    /// Conversion rate applied at init
    pub rate: SampleRate,
    /// Ready polls allowed per conversion before `ConversionTimeout`
    pub poll_budget: u32,
}

fn name(text: &str) -> String<MAX_NAME_LEN> {
    let mut s = String::new();
    let _ = s.push_str(text);
    s
}

/// A2D 4CH Isolated ADC V1.0: four MCP3425-class chips at 0x68..0x6B,
/// an (18.7k + 2k) / 2k input divider, continuous 15 SPS conversion
pub fn a2d_4ch_iso_adc_v1() -> IsoAdcConfig {
    let default = LinearCalibration::new(10.35, 0.0);
    let mut channels = Vec::new();
    for bus_addr in [0x68, 0x69, 0x6A, 0x6B] {
        let _ = channels.push(IsoChannelConfig { bus_addr, default });
    }
    IsoAdcConfig {
        name: name("a2d-4ch-iso-adc-v1"),
        channels,
        gain: Gain::X1,
        rate: SampleRate::Sps15,
    }
}

/// A2D Sense Board V1.0: one multiplexed chip at 0x68 sampling the
/// voltage divider, the shunt amplifier, and the temperature sensor
pub fn a2d_sense_board_v1() -> SenseConfig {
    SenseConfig {
        name: name("a2d-sense-board-v1"),
        bus_addr: 0x68,
        mux: SenseMux {
            voltage: 0,
            current: 1,
            temperature: 2,
        },
        defaults: [
            // (20k + 11k) / 11k divider
            LinearCalibration::new(2.818181818, 0.0),
            // 50 mV/A shunt + amplifier chain
            LinearCalibration::new(20.0, 0.0),
            // 10 mV/K sensor, reported in degrees Celsius
            LinearCalibration::new(100.0, -273.15),
        ],
        gain: Gain::X1,
        rate: SampleRate::Sps15,
        poll_budget: 200,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_well_formed() {
        let iso = a2d_4ch_iso_adc_v1();
        assert_eq!(iso.channel_count(), 4);
        assert_eq!(iso.channels[0].bus_addr, 0x68);
        assert_eq!(iso.channels[3].bus_addr, 0x6B);
        assert!(iso.channels.iter().all(|c| c.default.scale != 0.0));

        let sense = a2d_sense_board_v1();
        assert_eq!(sense.bus_addr, 0x68);
        assert!(sense.poll_budget > 0);
        // Each logical channel gets a distinct mux input
        assert_ne!(sense.mux.voltage, sense.mux.current);
        assert_ne!(sense.mux.current, sense.mux.temperature);
    }
}
