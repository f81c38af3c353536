//! Two-point linear calibration model
//!
//! Every channel carries one affine coefficient pair converting a raw
//! chip voltage into physical units. The canonical form everywhere in
//! this workspace is
//!
//! ```text
//! physical = scale * raw + offset
//! ```
//!
//! which is exactly the line fitted by [`LinearCalibration::from_two_points`],
//! so a calibrated channel reproduces both reference points bit-for-bit
//! (up to float rounding). Coefficients live in RAM; persisting them is
//! an explicit `save` step against the [`PersistenceLayout`] addresses.

use heapless::Vec;

use crate::config::MAX_CHANNELS;
use crate::layout::PersistenceLayout;
use crate::traits::Eeprom;

/// Sentinel byte marking the persisted calibration block as valid
pub const INIT_MARKER: u8 = 0x55;

/// Calibration errors (pure, no storage involved)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// The two calibration points do not define a usable line
    /// (equal measured values, or a zero/non-finite scale)
    InvalidPoints,
    /// Channel index past the board's channel count
    ChannelOutOfRange,
    /// More default coefficients than `MAX_CHANNELS`
    TooManyChannels,
}

/// Errors from persisting or restoring the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError<E> {
    /// The storage capability failed
    Storage(E),
    /// Channel index past the board's channel count
    ChannelOutOfRange,
}

impl<E> From<E> for StoreError<E> {
    fn from(err: E) -> Self {
        StoreError::Storage(err)
    }
}

/// One channel's affine conversion coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearCalibration {
    /// Dimensionless gain, physical units per raw volt. Never zero.
    pub scale: f32,
    /// Additive offset in physical units
    pub offset: f32,
}

impl LinearCalibration {
    /// Identity conversion (scale 1, offset 0)
    pub const IDENTITY: Self = Self::new(1.0, 0.0);

    /// Create a coefficient pair
    pub const fn new(scale: f32, offset: f32) -> Self {
        Self { scale, offset }
    }

    /// Fit the line through two (measured, actual) reference pairs
    ///
    /// Rejects degenerate input: equal measured values would divide by
    /// zero, and equal actual values would produce a zero scale - both
    /// leave the conversion undefined or non-invertible.
    pub fn from_two_points(
        p1_measured: f32,
        p1_actual: f32,
        p2_measured: f32,
        p2_actual: f32,
    ) -> Result<Self, CalibrationError> {
        let run = p2_measured - p1_measured;
        if run == 0.0 {
            return Err(CalibrationError::InvalidPoints);
        }
        let scale = (p2_actual - p1_actual) / run;
        if scale == 0.0 || !scale.is_finite() {
            return Err(CalibrationError::InvalidPoints);
        }
        let offset = p2_actual - scale * p2_measured;
        Ok(Self { scale, offset })
    }

    /// Convert a raw chip voltage into physical units
    pub fn apply(&self, raw: f32) -> f32 {
        self.scale * raw + self.offset
    }

    /// A stored coefficient a conversion can trust
    fn is_sane(&self) -> bool {
        self.scale != 0.0 && self.scale.is_finite() && self.offset.is_finite()
    }
}

/// Per-board calibration state: one coefficient pair per channel, the
/// manufacturing defaults to fall back on, and the device identity.
///
/// Lifecycle: constructed with defaults, restored from storage by
/// [`CalibrationStore::load`] (self-healing on first boot or a
/// corrupted marker), mutated in memory by `calibrate`/`reset`, and
/// committed by `save`/`save_all`. It is never destroyed; one instance
/// lives for the life of the board controller.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationStore {
    coeffs: Vec<LinearCalibration, MAX_CHANNELS>,
    defaults: Vec<LinearCalibration, MAX_CHANNELS>,
    serial: u32,
    initialized: bool,
}

impl CalibrationStore {
    /// Create a store seeded with manufacturing defaults, one per channel
    pub fn new(
        defaults: impl IntoIterator<Item = LinearCalibration>,
    ) -> Result<Self, CalibrationError> {
        let mut d: Vec<LinearCalibration, MAX_CHANNELS> = Vec::new();
        for coeff in defaults {
            d.push(coeff)
                .map_err(|_| CalibrationError::TooManyChannels)?;
        }
        Ok(Self {
            coeffs: d.clone(),
            defaults: d,
            serial: 0,
            initialized: false,
        })
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.coeffs.len()
    }

    /// Factory-provisioned device serial, valid after `load`
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Whether `load` has run (and therefore storage is consistent)
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn coeff(&self, ch: usize) -> Result<&LinearCalibration, CalibrationError> {
        self.coeffs.get(ch).ok_or(CalibrationError::ChannelOutOfRange)
    }

    /// Current scale for a channel
    pub fn scale(&self, ch: usize) -> Result<f32, CalibrationError> {
        self.coeff(ch).map(|c| c.scale)
    }

    /// Current offset for a channel
    pub fn offset(&self, ch: usize) -> Result<f32, CalibrationError> {
        self.coeff(ch).map(|c| c.offset)
    }

    /// Convert a raw reading on `ch` into physical units
    pub fn apply(&self, ch: usize, raw: f32) -> Result<f32, CalibrationError> {
        self.coeff(ch).map(|c| c.apply(raw))
    }

    /// Fit and install a new coefficient pair for `ch` from two
    /// (measured, actual) reference points. In-memory only; a rejected
    /// fit leaves the prior calibration untouched.
    pub fn calibrate(
        &mut self,
        ch: usize,
        p1_measured: f32,
        p1_actual: f32,
        p2_measured: f32,
        p2_actual: f32,
    ) -> Result<(), CalibrationError> {
        let fitted =
            LinearCalibration::from_two_points(p1_measured, p1_actual, p2_measured, p2_actual)?;
        let slot = self
            .coeffs
            .get_mut(ch)
            .ok_or(CalibrationError::ChannelOutOfRange)?;
        *slot = fitted;
        Ok(())
    }

    /// Restore one channel to its manufacturing default, in memory
    pub fn reset(&mut self, ch: usize) -> Result<(), CalibrationError> {
        let default = *self
            .defaults
            .get(ch)
            .ok_or(CalibrationError::ChannelOutOfRange)?;
        self.coeffs[ch] = default;
        Ok(())
    }

    /// Restore every channel to its manufacturing default, in memory
    pub fn reset_all(&mut self) {
        self.coeffs.copy_from_slice(&self.defaults);
    }

    /// Commit one channel's coefficients to storage
    pub fn save<S: Eeprom>(
        &self,
        ch: usize,
        storage: &mut S,
        layout: &PersistenceLayout,
    ) -> Result<(), StoreError<S::Error>> {
        let coeff = self.coeffs.get(ch).ok_or(StoreError::ChannelOutOfRange)?;
        storage.write_f32(layout.offset_addr(ch), coeff.offset)?;
        storage.write_f32(layout.scale_addr(ch), coeff.scale)?;
        Ok(())
    }

    /// Commit every channel and (re)write the initialization marker,
    /// making storage load-consistent on the next boot
    pub fn save_all<S: Eeprom>(
        &self,
        storage: &mut S,
        layout: &PersistenceLayout,
    ) -> Result<(), StoreError<S::Error>> {
        for ch in 0..self.coeffs.len() {
            self.save(ch, storage, layout)?;
        }
        storage.write_u8(layout.marker_addr(), INIT_MARKER)?;
        Ok(())
    }

    /// Restore the store from non-volatile storage
    ///
    /// If the initialization marker does not match [`INIT_MARKER`]
    /// (first boot, or corrupted storage), the defaults are written
    /// back - marker included - before reading, so the recovery is
    /// idempotent and invisible to the caller beyond the returned
    /// flag. Returns `true` when that self-heal ran.
    ///
    /// A stored coefficient with a zero or non-finite scale would
    /// poison every reading on its channel, so it is replaced by the
    /// manufacturing default on the way in.
    pub fn load<S: Eeprom>(
        &mut self,
        storage: &mut S,
        layout: &PersistenceLayout,
    ) -> Result<bool, StoreError<S::Error>> {
        let marker = storage.read_u8(layout.marker_addr())?;
        let healed = marker != INIT_MARKER;
        if healed {
            self.reset_all();
            self.save_all(storage, layout)?;
        }

        self.serial = storage.read_u32(layout.serial_addr())?;
        for ch in 0..self.coeffs.len() {
            let loaded = LinearCalibration {
                offset: storage.read_f32(layout.offset_addr(ch))?,
                scale: storage.read_f32(layout.scale_addr(ch))?,
            };
            self.coeffs[ch] = if loaded.is_sane() {
                loaded
            } else {
                self.defaults[ch]
            };
        }
        self.initialized = true;
        Ok(healed)
    }
}
