//! Shared test doubles for the capability traits

use core::convert::Infallible;

use galvani_core::traits::{AdcChip, ConversionMode, Eeprom, Gain, OutputPin, SampleRate};
use heapless::Vec;

/// Bus fault injected by [`MockChip::fail_next`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

/// Scriptable ADC chip
pub struct MockChip {
    pub bound_address: Option<u8>,
    pub gain: Option<Gain>,
    pub rate: Option<SampleRate>,
    pub mode: Option<ConversionMode>,
    pub self_calibrated: bool,
    /// Every mux selection, in call order
    pub mux_log: Vec<u8, 32>,
    /// Ready polls consumed before a conversion reports complete
    /// (`u32::MAX` = wedged chip, never ready)
    pub ready_after: u32,
    /// Fail the next bus transaction
    pub fail_next: bool,
    /// Voltage returned for every completed conversion
    pub voltage: f32,
    polls_left: u32,
}

impl MockChip {
    pub fn reading(voltage: f32) -> Self {
        Self {
            bound_address: None,
            gain: None,
            rate: None,
            mode: None,
            self_calibrated: false,
            mux_log: Vec::new(),
            ready_after: 0,
            fail_next: false,
            voltage,
            polls_left: 0,
        }
    }

    fn bus(&mut self) -> Result<(), MockBusError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(MockBusError);
        }
        Ok(())
    }
}

impl AdcChip for MockChip {
    type Error = MockBusError;

    fn init(&mut self, address: u8) -> Result<(), MockBusError> {
        self.bus()?;
        self.bound_address = Some(address);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), MockBusError> {
        self.bus()
    }

    fn set_gain(&mut self, gain: Gain) -> Result<(), MockBusError> {
        self.bus()?;
        self.gain = Some(gain);
        Ok(())
    }

    fn set_rate(&mut self, rate: SampleRate) -> Result<(), MockBusError> {
        self.bus()?;
        self.rate = Some(rate);
        Ok(())
    }

    fn set_mode(&mut self, mode: ConversionMode) -> Result<(), MockBusError> {
        self.bus()?;
        self.mode = Some(mode);
        Ok(())
    }

    fn set_mux(&mut self, input: u8) -> Result<(), MockBusError> {
        self.bus()?;
        let _ = self.mux_log.push(input);
        Ok(())
    }

    fn start_conversion(&mut self) -> Result<(), MockBusError> {
        self.bus()?;
        self.polls_left = self.ready_after;
        Ok(())
    }

    fn conversion_ready(&mut self) -> Result<bool, MockBusError> {
        self.bus()?;
        if self.polls_left == 0 {
            Ok(true)
        } else {
            if self.polls_left != u32::MAX {
                self.polls_left -= 1;
            }
            Ok(false)
        }
    }

    fn last_voltage(&mut self) -> Result<f32, MockBusError> {
        self.bus()?;
        Ok(self.voltage)
    }

    fn self_calibrate(&mut self) -> Result<(), MockBusError> {
        self.bus()?;
        self.self_calibrated = true;
        Ok(())
    }
}

/// In-memory EEPROM
pub struct MockEeprom {
    pub bytes: [u8; 128],
}

impl MockEeprom {
    /// Fresh part: all bytes erased to 0xFF
    pub fn erased() -> Self {
        Self { bytes: [0xFF; 128] }
    }
}

impl Eeprom for MockEeprom {
    type Error = Infallible;

    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn read(&mut self, addr: usize, buf: &mut [u8]) -> Result<(), Infallible> {
        buf.copy_from_slice(&self.bytes[addr..addr + buf.len()]);
        Ok(())
    }

    fn write(&mut self, addr: usize, data: &[u8]) -> Result<(), Infallible> {
        self.bytes[addr..addr + data.len()].copy_from_slice(data);
        Ok(())
    }
}

/// Undersized EEPROM for the too-small path
pub struct TinyEeprom {
    pub bytes: [u8; 8],
}

impl Eeprom for TinyEeprom {
    type Error = Infallible;

    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn read(&mut self, addr: usize, buf: &mut [u8]) -> Result<(), Infallible> {
        buf.copy_from_slice(&self.bytes[addr..addr + buf.len()]);
        Ok(())
    }

    fn write(&mut self, addr: usize, data: &[u8]) -> Result<(), Infallible> {
        self.bytes[addr..addr + data.len()].copy_from_slice(data);
        Ok(())
    }
}

/// Recording LED pin
#[derive(Default)]
pub struct MockPin {
    pub high: bool,
    pub writes: u32,
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
        self.writes += 1;
    }

    fn set_low(&mut self) {
        self.high = false;
        self.writes += 1;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
