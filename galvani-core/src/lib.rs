//! Board-agnostic core logic for the Galvani measurement board firmware
//!
//! This crate contains all logic that does not depend on a specific
//! ADC chip, storage part, or pin assignment:
//!
//! - Capability traits (ADC chip, byte-addressed EEPROM, output pin)
//! - Two-point linear calibration model and per-board coefficient store
//! - Non-volatile persistence layout (address map)
//! - Measurement sequencing state machine for multiplexed boards
//! - Board configuration type definitions and revision presets

#![no_std]
#![deny(unsafe_code)]

// Host-run unit tests are allowed the full standard library.
#[cfg(test)]
extern crate std;

pub mod calibration;
pub mod config;
pub mod layout;
pub mod sequence;
pub mod traits;
