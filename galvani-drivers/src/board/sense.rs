//! Single-ADC multiplexed sense board
//!
//! One delta-sigma chip samples three physical signals - the voltage
//! divider, the current shunt amplifier, and the temperature sensor -
//! through its input multiplexer. The chip runs single-shot: every
//! measurement routes the mux, triggers a conversion, and waits
//! (bounded) for completion. Nothing is ever read off a mux selection
//! left behind by an earlier call.

use galvani_core::calibration::{CalibrationError, CalibrationStore};
use galvani_core::config::{SenseConfig, SENSE_CHANNEL_COUNT};
use galvani_core::layout::PersistenceLayout;
use galvani_core::sequence::MeasurementPhase;
use galvani_core::traits::{AdcChip, ConversionMode, Eeprom, Gain, OutputPin, SampleRate};

use super::BoardError;
use crate::channel::MuxedChannel;

/// Logical channels of the sense board, in persisted order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SenseChannel {
    Voltage,
    Current,
    Temperature,
}

impl SenseChannel {
    /// Channel index in the calibration store and persistence layout
    pub const fn index(self) -> usize {
        match self {
            SenseChannel::Voltage => 0,
            SenseChannel::Current => 1,
            SenseChannel::Temperature => 2,
        }
    }
}

/// Controller for a board whose channels share one multiplexed chip
pub struct SenseBoard<C, P, S> {
    chip: C,
    led: P,
    storage: S,
    bus_addr: u8,
    channels: [MuxedChannel; SENSE_CHANNEL_COUNT],
    layout: PersistenceLayout,
    cal: CalibrationStore,
    phase: MeasurementPhase,
    gain: Gain,
    rate: SampleRate,
    poll_budget: u32,
}

impl<C, P, S> SenseBoard<C, P, S>
where
    C: AdcChip,
    P: OutputPin,
    S: Eeprom,
{
    /// Build the board from its configuration; hardware untouched
    /// until [`init`](Self::init)
    pub fn new(config: &SenseConfig, chip: C, led: P, storage: S) -> Result<Self, CalibrationError> {
        let cal = CalibrationStore::new(config.defaults.iter().copied())?;
        Ok(Self {
            chip,
            led,
            storage,
            bus_addr: config.bus_addr,
            channels: [
                MuxedChannel::new(config.mux.voltage),
                MuxedChannel::new(config.mux.current),
                MuxedChannel::new(config.mux.temperature),
            ],
            layout: PersistenceLayout::new(SENSE_CHANNEL_COUNT),
            cal,
            phase: MeasurementPhase::Idle,
            gain: config.gain,
            rate: config.rate,
            poll_budget: config.poll_budget,
        })
    }

    /// Bring the board up: LED off, calibration restored (self-healing
    /// on first boot), chip configured for single-shot conversion
    ///
    /// Returns `true` when defaults were written back to storage.
    pub fn init(&mut self) -> Result<bool, BoardError<C::Error, S::Error>> {
        self.led.set_state(false);
        self.layout.validate(self.storage.capacity())?;
        let healed = self.cal.load(&mut self.storage, &self.layout)?;

        self.chip.init(self.bus_addr).map_err(BoardError::Transducer)?;
        self.chip.reset().map_err(BoardError::Transducer)?;
        self.chip.set_gain(self.gain).map_err(BoardError::Transducer)?;
        self.chip.set_rate(self.rate).map_err(BoardError::Transducer)?;
        self.chip
            .set_mode(ConversionMode::SingleShot)
            .map_err(BoardError::Transducer)?;
        self.chip.self_calibrate().map_err(BoardError::Transducer)?;
        Ok(healed)
    }

    /// Re-bind the chip to its bus address; calibration untouched
    pub fn reset(&mut self) -> Result<(), BoardError<C::Error, S::Error>> {
        self.led.set_state(false);
        self.phase = MeasurementPhase::Idle;
        self.chip.init(self.bus_addr).map_err(BoardError::Transducer)
    }

    /// Factory-provisioned serial number, valid after `init`
    pub fn serial(&self) -> u32 {
        self.cal.serial()
    }

    /// Phase of the measurement in flight (idle between calls)
    pub fn phase(&self) -> MeasurementPhase {
        self.phase
    }

    /// Calibrated measurement on one logical channel
    pub fn measure(&mut self, ch: SenseChannel) -> Result<f32, BoardError<C::Error, S::Error>> {
        let raw = self.measure_raw(ch)?;
        Ok(self.cal.apply(ch.index(), raw)?)
    }

    /// Uncalibrated chip voltage on one logical channel - diagnostics
    /// and calibration-point acquisition
    pub fn measure_raw(&mut self, ch: SenseChannel) -> Result<f32, BoardError<C::Error, S::Error>> {
        let channel = self.channels[ch.index()];
        let raw = channel.read_raw(&mut self.chip, &mut self.phase, self.poll_budget)?;
        Ok(raw)
    }

    /// Calibrated bus voltage
    pub fn measure_voltage(&mut self) -> Result<f32, BoardError<C::Error, S::Error>> {
        self.measure(SenseChannel::Voltage)
    }

    /// Uncalibrated chip voltage on the voltage input
    pub fn measure_raw_voltage(&mut self) -> Result<f32, BoardError<C::Error, S::Error>> {
        self.measure_raw(SenseChannel::Voltage)
    }

    /// Calibrated current
    pub fn measure_current(&mut self) -> Result<f32, BoardError<C::Error, S::Error>> {
        self.measure(SenseChannel::Current)
    }

    /// Uncalibrated chip voltage on the current input
    pub fn measure_raw_current(&mut self) -> Result<f32, BoardError<C::Error, S::Error>> {
        self.measure_raw(SenseChannel::Current)
    }

    /// Calibrated temperature
    pub fn measure_temperature(&mut self) -> Result<f32, BoardError<C::Error, S::Error>> {
        self.measure(SenseChannel::Temperature)
    }

    /// Uncalibrated chip voltage on the temperature input
    pub fn measure_raw_temperature(&mut self) -> Result<f32, BoardError<C::Error, S::Error>> {
        self.measure_raw(SenseChannel::Temperature)
    }

    /// Fit a new calibration for one channel from two (measured,
    /// actual) reference points; in memory only until saved
    pub fn calibrate(
        &mut self,
        ch: SenseChannel,
        p1_measured: f32,
        p1_actual: f32,
        p2_measured: f32,
        p2_actual: f32,
    ) -> Result<(), BoardError<C::Error, S::Error>> {
        Ok(self
            .cal
            .calibrate(ch.index(), p1_measured, p1_actual, p2_measured, p2_actual)?)
    }

    /// Two-point calibration of the voltage channel
    pub fn calibrate_voltage(
        &mut self,
        p1_measured: f32,
        p1_actual: f32,
        p2_measured: f32,
        p2_actual: f32,
    ) -> Result<(), BoardError<C::Error, S::Error>> {
        self.calibrate(SenseChannel::Voltage, p1_measured, p1_actual, p2_measured, p2_actual)
    }

    /// Two-point calibration of the current channel
    pub fn calibrate_current(
        &mut self,
        p1_measured: f32,
        p1_actual: f32,
        p2_measured: f32,
        p2_actual: f32,
    ) -> Result<(), BoardError<C::Error, S::Error>> {
        self.calibrate(SenseChannel::Current, p1_measured, p1_actual, p2_measured, p2_actual)
    }

    /// Restore one channel's manufacturing defaults, in memory
    pub fn reset_calibration(
        &mut self,
        ch: SenseChannel,
    ) -> Result<(), BoardError<C::Error, S::Error>> {
        Ok(self.cal.reset(ch.index())?)
    }

    /// Restore every channel's manufacturing defaults, in memory
    pub fn reset_all_calibration(&mut self) {
        self.cal.reset_all();
    }

    /// Commit one channel's calibration to storage
    pub fn save_calibration(
        &mut self,
        ch: SenseChannel,
    ) -> Result<(), BoardError<C::Error, S::Error>> {
        Ok(self.cal.save(ch.index(), &mut self.storage, &self.layout)?)
    }

    /// Commit every channel and the initialization marker
    pub fn save_all_calibration(&mut self) -> Result<(), BoardError<C::Error, S::Error>> {
        Ok(self.cal.save_all(&mut self.storage, &self.layout)?)
    }

    /// Current calibration scale for one channel
    pub fn calibration_scale(
        &self,
        ch: SenseChannel,
    ) -> Result<f32, BoardError<C::Error, S::Error>> {
        Ok(self.cal.scale(ch.index())?)
    }

    /// Current calibration offset for one channel
    pub fn calibration_offset(
        &self,
        ch: SenseChannel,
    ) -> Result<f32, BoardError<C::Error, S::Error>> {
        Ok(self.cal.offset(ch.index())?)
    }

    /// Drive the status LED
    pub fn set_led(&mut self, on: bool) {
        self.led.set_state(on);
    }
}
