//! Board controllers
//!
//! A board controller owns everything one physical board exposes: its
//! ADC chip(s), its status LED, its storage part, and its calibration
//! store. All bus and storage access is serialized through the
//! controller; the capabilities underneath are not reentrant.

pub mod iso_adc;
pub mod sense;

pub use iso_adc::IsoAdcBoard;
pub use sense::{SenseBoard, SenseChannel};

use galvani_core::calibration::{CalibrationError, StoreError};
use galvani_core::layout::LayoutError;

use crate::channel::ChannelError;

/// Board-level faults, combining the chip error type `CE` and the
/// storage error type `SE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardError<CE, SE> {
    /// Bus/chip fault on a transducer; the reading must not be used
    Transducer(CE),
    /// A conversion did not complete within the poll budget
    ConversionTimeout,
    /// The storage capability failed
    Storage(SE),
    /// The storage part cannot hold the persistence layout
    StorageTooSmall { required: usize, capacity: usize },
    /// Bad calibration input or channel index
    Calibration(CalibrationError),
}

impl<CE, SE> From<CalibrationError> for BoardError<CE, SE> {
    fn from(err: CalibrationError) -> Self {
        BoardError::Calibration(err)
    }
}

impl<CE, SE> From<LayoutError> for BoardError<CE, SE> {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::StorageTooSmall { required, capacity } => {
                BoardError::StorageTooSmall { required, capacity }
            }
        }
    }
}

impl<CE, SE> From<StoreError<SE>> for BoardError<CE, SE> {
    fn from(err: StoreError<SE>) -> Self {
        match err {
            StoreError::Storage(e) => BoardError::Storage(e),
            StoreError::ChannelOutOfRange => {
                BoardError::Calibration(CalibrationError::ChannelOutOfRange)
            }
        }
    }
}

impl<CE, SE> From<ChannelError<CE>> for BoardError<CE, SE> {
    fn from(err: ChannelError<CE>) -> Self {
        match err {
            ChannelError::Bus(e) => BoardError::Transducer(e),
            ChannelError::Timeout => BoardError::ConversionTimeout,
        }
    }
}
