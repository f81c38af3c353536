//! Measurement sequencing for multiplexed boards
//!
//! A board whose channels share one ADC must route the multiplexer,
//! trigger a conversion, and wait for it to finish before a reading
//! can be trusted. The phase of that cycle is an explicit value and
//! every measurement drives the full cycle from `Select` - no code
//! path may assume the mux still points where a previous call left it,
//! because another caller may have moved it.

/// Phase of one multiplexed measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementPhase {
    /// No measurement in flight
    #[default]
    Idle,
    /// Mux routed to the given input, conversion not yet triggered
    MuxSelected(u8),
    /// Conversion running on the given input
    Converting(u8),
    /// Conversion finished, result not yet consumed
    ResultReady(u8),
}

/// Events that advance a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasureEvent {
    /// Route the mux to an input, beginning a new measurement
    Select(u8),
    /// Conversion triggered
    Begin,
    /// Conversion completed
    Complete,
    /// Result read out
    Take,
    /// Fault or timeout; discard the measurement in flight
    Abort,
}

impl MeasurementPhase {
    /// Process an event and return the next phase
    ///
    /// `Select` is legal from any phase: each measurement is
    /// self-contained and preempts whatever came before. Out-of-order
    /// events do not advance the phase.
    pub fn transition(self, event: MeasureEvent) -> Self {
        use MeasureEvent::*;
        use MeasurementPhase::*;

        match (self, event) {
            (_, Select(input)) => MuxSelected(input),
            (_, Abort) => Idle,

            (MuxSelected(input), Begin) => Converting(input),
            (Converting(input), Complete) => ResultReady(input),
            (ResultReady(_), Take) => Idle,

            // Out-of-order event: stay put
            (phase, _) => phase,
        }
    }

    /// Input the in-flight measurement is routed to, if any
    pub fn input(&self) -> Option<u8> {
        match self {
            MeasurementPhase::Idle => None,
            MeasurementPhase::MuxSelected(input)
            | MeasurementPhase::Converting(input)
            | MeasurementPhase::ResultReady(input) => Some(*input),
        }
    }

    /// Check if no measurement is in flight
    pub fn is_idle(&self) -> bool {
        matches!(self, MeasurementPhase::Idle)
    }
}
