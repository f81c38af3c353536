//! Board drivers for the Galvani measurement boards
//!
//! This crate composes the galvani-core calibration model with the
//! capability traits into complete board controllers:
//!
//! - Channel transducers (dedicated-chip and multiplexed)
//! - [`board::IsoAdcBoard`] - one ADC chip per channel, continuous mode
//! - [`board::SenseBoard`] - one multiplexed chip, single-shot mode
//! - An embedded-hal pin adapter for the status LED

#![no_std]
#![deny(unsafe_code)]

// Host-run unit tests are allowed the full standard library.
#[cfg(test)]
extern crate std;

pub mod board;
pub mod channel;
pub mod gpio;

#[cfg(test)]
mod mock;
