//! Delta-sigma ADC chip trait
//!
//! Models the register-level capabilities of small I2C delta-sigma
//! converters (MCP3425/MCP3428 class parts): programmable gain, sample
//! rate, conversion mode, and - on multi-input parts - an input
//! multiplexer. The actual bus transactions live in the chip driver
//! implementing this trait.

/// Programmable gain amplifier setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gain {
    /// Unity gain
    #[default]
    X1,
    X2,
    X4,
    X8,
}

/// Conversion rate / resolution setting
///
/// On the MCP342x family the sample rate also fixes the resolution
/// (240 SPS = 12 bit, 60 SPS = 14 bit, 15 SPS = 16 bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleRate {
    Sps240,
    Sps60,
    /// Slowest rate, highest resolution
    #[default]
    Sps15,
}

/// Conversion mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConversionMode {
    /// Chip free-runs; a read returns the most recent completed result
    Continuous,
    /// Each conversion is triggered explicitly
    SingleShot,
}

/// Delta-sigma ADC chip capability
///
/// Implementations own the bus transactions for one chip model. All
/// methods are synchronous and non-reentrant; the board controller
/// serializes access.
pub trait AdcChip {
    /// Bus/chip error type
    type Error;

    /// Bind the driver to a bus address and probe the chip
    fn init(&mut self, address: u8) -> Result<(), Self::Error>;

    /// Soft-reset the chip to its power-on configuration
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// Set the programmable gain
    fn set_gain(&mut self, gain: Gain) -> Result<(), Self::Error>;

    /// Set the conversion rate
    fn set_rate(&mut self, rate: SampleRate) -> Result<(), Self::Error>;

    /// Set continuous or single-shot conversion mode
    fn set_mode(&mut self, mode: ConversionMode) -> Result<(), Self::Error>;

    /// Route the given input through the multiplexer
    ///
    /// Single-input chips keep the default no-op.
    fn set_mux(&mut self, _input: u8) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Trigger a single-shot conversion
    fn start_conversion(&mut self) -> Result<(), Self::Error>;

    /// Check whether the most recently triggered conversion completed
    fn conversion_ready(&mut self) -> Result<bool, Self::Error>;

    /// Read the latest completed conversion, in volts at the chip input
    ///
    /// In continuous mode the value may be stale by up to one
    /// conversion period; no new conversion is triggered.
    fn last_voltage(&mut self) -> Result<f32, Self::Error>;

    /// Run the chip's internal offset self-calibration, if it has one
    fn self_calibrate(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
