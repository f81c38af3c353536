//! Channel transducers
//!
//! A transducer is one physical measurement channel viewed through its
//! ADC. Two shapes exist on the shipping boards:
//!
//! - [`DedicatedChannel`]: the channel owns a whole chip (one bus
//!   address per channel) free-running in continuous mode, so a read
//!   is just "latest conversion".
//! - [`MuxedChannel`]: the channel is one input of a shared chip, and
//!   every read must route the mux, trigger a conversion, and wait for
//!   completion before the value is trusted.
//!
//! Neither holds calibration state; they produce raw chip volts.

use galvani_core::sequence::{MeasureEvent, MeasurementPhase};
use galvani_core::traits::{AdcChip, ConversionMode, Gain, SampleRate};

/// Transducer faults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError<E> {
    /// Bus or chip fault; the reading must not be used
    Bus(E),
    /// Conversion did not complete within the poll budget
    Timeout,
}

/// A channel backed by its own ADC chip in continuous mode
pub struct DedicatedChannel<C> {
    chip: C,
    address: u8,
}

impl<C: AdcChip> DedicatedChannel<C> {
    /// Wrap a chip driver bound to `address`
    pub const fn new(chip: C, address: u8) -> Self {
        Self { chip, address }
    }

    /// Bus address of this channel's chip
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Full bring-up: bind, reset, configure, self-calibrate, and
    /// start free-running conversion
    pub fn init(&mut self, gain: Gain, rate: SampleRate) -> Result<(), C::Error> {
        self.chip.init(self.address)?;
        self.chip.reset()?;
        self.chip.set_gain(gain)?;
        self.chip.set_rate(rate)?;
        self.chip.set_mode(ConversionMode::Continuous)?;
        self.chip.self_calibrate()?;
        Ok(())
    }

    /// Re-bind the chip to its bus address without reconfiguring
    pub fn rebind(&mut self) -> Result<(), C::Error> {
        self.chip.init(self.address)
    }

    /// Latest completed conversion in raw chip volts
    ///
    /// May be stale by up to one conversion period; no blocking wait
    /// is performed.
    pub fn read_raw(&mut self) -> Result<f32, C::Error> {
        self.chip.last_voltage()
    }
}

/// A channel that is one multiplexer input of a shared ADC chip
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MuxedChannel {
    input: u8,
}

impl MuxedChannel {
    /// A channel routed through mux input `input`
    pub const fn new(input: u8) -> Self {
        Self { input }
    }

    /// Multiplexer input code
    pub const fn input(&self) -> u8 {
        self.input
    }

    /// One self-contained measurement: select, convert, read
    ///
    /// The mux is re-routed on every call; the selection left by a
    /// previous measurement is never trusted. The conversion wait is
    /// bounded by `poll_budget` ready checks. `phase` is advanced
    /// through the full cycle and returned to idle on any fault.
    pub fn read_raw<C: AdcChip>(
        &self,
        chip: &mut C,
        phase: &mut MeasurementPhase,
        poll_budget: u32,
    ) -> Result<f32, ChannelError<C::Error>> {
        let result = self.drive(chip, phase, poll_budget);
        if result.is_err() {
            *phase = phase.transition(MeasureEvent::Abort);
        }
        result
    }

    fn drive<C: AdcChip>(
        &self,
        chip: &mut C,
        phase: &mut MeasurementPhase,
        poll_budget: u32,
    ) -> Result<f32, ChannelError<C::Error>> {
        *phase = phase.transition(MeasureEvent::Select(self.input));
        chip.set_mux(self.input).map_err(ChannelError::Bus)?;

        chip.start_conversion().map_err(ChannelError::Bus)?;
        *phase = phase.transition(MeasureEvent::Begin);

        let mut polls = 0;
        while !chip.conversion_ready().map_err(ChannelError::Bus)? {
            polls += 1;
            if polls >= poll_budget {
                return Err(ChannelError::Timeout);
            }
        }
        *phase = phase.transition(MeasureEvent::Complete);

        let raw = chip.last_voltage().map_err(ChannelError::Bus)?;
        *phase = phase.transition(MeasureEvent::Take);
        Ok(raw)
    }
}
