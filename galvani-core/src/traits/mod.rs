//! Capability traits
//!
//! These traits define the interface between the board logic and the
//! hardware it consumes: the ADC chip on the bus, the non-volatile
//! storage part, and the status indicator pin. Chip-specific drivers
//! and HAL glue implement them; everything in this workspace only
//! consumes them.

pub mod adc;
pub mod gpio;
pub mod storage;

pub use adc::{AdcChip, ConversionMode, Gain, SampleRate};
pub use gpio::OutputPin;
pub use storage::Eeprom;
