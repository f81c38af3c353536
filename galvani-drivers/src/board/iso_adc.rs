//! Multi-ADC isolated measurement board
//!
//! One dedicated delta-sigma chip per channel, each at its own bus
//! address, free-running in continuous mode. A measurement is the
//! chip's latest conversion passed through that channel's calibration.

use heapless::Vec;

use galvani_core::calibration::{CalibrationError, CalibrationStore};
use galvani_core::config::{IsoAdcConfig, MAX_CHANNELS};
use galvani_core::layout::PersistenceLayout;
use galvani_core::traits::{AdcChip, Eeprom, Gain, OutputPin, SampleRate};

use super::BoardError;
use crate::channel::DedicatedChannel;

/// Controller for a board with one ADC chip per channel
pub struct IsoAdcBoard<C, P, S> {
    channels: Vec<DedicatedChannel<C>, MAX_CHANNELS>,
    led: P,
    storage: S,
    layout: PersistenceLayout,
    cal: CalibrationStore,
    gain: Gain,
    rate: SampleRate,
}

impl<C, P, S> IsoAdcBoard<C, P, S>
where
    C: AdcChip,
    P: OutputPin,
    S: Eeprom,
{
    /// Build the board from its configuration
    ///
    /// `make_chip` constructs one chip driver per configured channel,
    /// given the channel's bus address. Nothing touches the hardware
    /// until [`init`](Self::init).
    pub fn new(
        config: &IsoAdcConfig,
        led: P,
        storage: S,
        mut make_chip: impl FnMut(u8) -> C,
    ) -> Result<Self, CalibrationError> {
        let mut channels = Vec::new();
        for ch in &config.channels {
            channels
                .push(DedicatedChannel::new(make_chip(ch.bus_addr), ch.bus_addr))
                .map_err(|_| CalibrationError::TooManyChannels)?;
        }
        let cal = CalibrationStore::new(config.channels.iter().map(|ch| ch.default))?;
        let layout = PersistenceLayout::new(config.channels.len());
        Ok(Self {
            channels,
            led,
            storage,
            layout,
            cal,
            gain: config.gain,
            rate: config.rate,
        })
    }

    /// Bring the board up: LED off, calibration restored from storage
    /// (self-healing on first boot), every chip configured and started
    ///
    /// Returns `true` when the stored calibration was missing or
    /// corrupt and the manufacturing defaults were written back.
    pub fn init(&mut self) -> Result<bool, BoardError<C::Error, S::Error>> {
        self.led.set_state(false);
        self.layout.validate(self.storage.capacity())?;
        let healed = self.cal.load(&mut self.storage, &self.layout)?;
        for ch in self.channels.iter_mut() {
            ch.init(self.gain, self.rate)
                .map_err(BoardError::Transducer)?;
        }
        Ok(healed)
    }

    /// Re-bind every chip to its bus address; calibration untouched
    pub fn reset(&mut self) -> Result<(), BoardError<C::Error, S::Error>> {
        self.led.set_state(false);
        for ch in self.channels.iter_mut() {
            ch.rebind().map_err(BoardError::Transducer)?;
        }
        Ok(())
    }

    /// Number of channels on this board
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Factory-provisioned serial number, valid after `init`
    pub fn serial(&self) -> u32 {
        self.cal.serial()
    }

    /// Calibrated voltage on channel `ch`
    pub fn measure_voltage(&mut self, ch: usize) -> Result<f32, BoardError<C::Error, S::Error>> {
        let raw = self.measure_raw_voltage(ch)?;
        Ok(self.cal.apply(ch, raw)?)
    }

    /// Uncalibrated chip voltage on channel `ch` - diagnostics and
    /// calibration-point acquisition
    pub fn measure_raw_voltage(
        &mut self,
        ch: usize,
    ) -> Result<f32, BoardError<C::Error, S::Error>> {
        let channel = self
            .channels
            .get_mut(ch)
            .ok_or(CalibrationError::ChannelOutOfRange)?;
        channel.read_raw().map_err(BoardError::Transducer)
    }

    /// Fit a new calibration for `ch` from two (measured, actual)
    /// reference points; in memory only until saved
    pub fn calibrate_voltage(
        &mut self,
        ch: usize,
        p1_measured: f32,
        p1_actual: f32,
        p2_measured: f32,
        p2_actual: f32,
    ) -> Result<(), BoardError<C::Error, S::Error>> {
        Ok(self
            .cal
            .calibrate(ch, p1_measured, p1_actual, p2_measured, p2_actual)?)
    }

    /// Restore one channel's manufacturing defaults, in memory
    pub fn reset_calibration(&mut self, ch: usize) -> Result<(), BoardError<C::Error, S::Error>> {
        Ok(self.cal.reset(ch)?)
    }

    /// Restore every channel's manufacturing defaults, in memory
    pub fn reset_all_calibration(&mut self) {
        self.cal.reset_all();
    }

    /// Commit one channel's calibration to storage
    pub fn save_calibration(&mut self, ch: usize) -> Result<(), BoardError<C::Error, S::Error>> {
        Ok(self.cal.save(ch, &mut self.storage, &self.layout)?)
    }

    /// Commit every channel and the initialization marker
    pub fn save_all_calibration(&mut self) -> Result<(), BoardError<C::Error, S::Error>> {
        Ok(self.cal.save_all(&mut self.storage, &self.layout)?)
    }

    /// Current calibration scale for `ch`
    pub fn calibration_scale(&self, ch: usize) -> Result<f32, BoardError<C::Error, S::Error>> {
        Ok(self.cal.scale(ch)?)
    }

    /// Current calibration offset for `ch`
    pub fn calibration_offset(&self, ch: usize) -> Result<f32, BoardError<C::Error, S::Error>> {
        Ok(self.cal.offset(ch)?)
    }

    /// Drive the status LED
    pub fn set_led(&mut self, on: bool) {
        self.led.set_state(on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockChip, MockEeprom, MockPin, TinyEeprom};
    use galvani_core::calibration::{LinearCalibration, INIT_MARKER};
    use galvani_core::config::IsoChannelConfig;
    use heapless::String;

    /// Four channels, default scale 2.818181818 (offset 0), every chip
    /// reading a fixed raw voltage
    fn test_board(raw: f32) -> IsoAdcBoard<MockChip, MockPin, MockEeprom> {
        let mut channels = Vec::new();
        for bus_addr in [0x68, 0x69, 0x6A, 0x6B] {
            let _ = channels.push(IsoChannelConfig {
                bus_addr,
                default: LinearCalibration::new(2.818181818, 0.0),
            });
        }
        let config = IsoAdcConfig {
            name: String::new(),
            channels,
            gain: Gain::X1,
            rate: SampleRate::Sps15,
        };
        IsoAdcBoard::new(
            &config,
            MockPin::default(),
            MockEeprom::erased(),
            |_addr| MockChip::reading(raw),
        )
        .unwrap()
    }

    #[test]
    fn end_to_end_default_then_calibrated() {
        let mut board = test_board(1.000);
        assert!(board.init().unwrap()); // first boot heals

        assert_eq!(board.measure_raw_voltage(2).unwrap(), 1.000);
        assert!((board.measure_voltage(2).unwrap() - 2.818181818).abs() < 1e-6);

        // Two-point calibration: (1.0 -> 3.0), (2.0 -> 6.0) fits
        // scale 3.0, offset 0.0
        board.calibrate_voltage(2, 1.0, 3.0, 2.0, 6.0).unwrap();
        assert_eq!(board.calibration_scale(2).unwrap(), 3.0);
        assert_eq!(board.calibration_offset(2).unwrap(), 0.0);
        assert!((board.measure_voltage(2).unwrap() - 3.0).abs() < 1e-6);

        // Other channels unaffected
        assert!((board.measure_voltage(0).unwrap() - 2.818181818).abs() < 1e-6);
    }

    #[test]
    fn init_binds_and_configures_every_chip() {
        let mut board = test_board(0.0);
        board.init().unwrap();

        for (i, addr) in [0x68u8, 0x69, 0x6A, 0x6B].iter().enumerate() {
            assert_eq!(board.channels[i].address(), *addr);
        }
        assert!(!board.led.high); // indicator starts off
        assert_eq!(board.channel_count(), 4);
    }

    #[test]
    fn saved_calibration_survives_reload() {
        let mut board = test_board(1.0);
        board.init().unwrap();
        board.calibrate_voltage(1, 1.0, 3.0, 2.0, 6.0).unwrap();
        board.save_calibration(1).unwrap();

        // Same storage bytes, fresh board: like a power cycle
        let mut rebooted = test_board(1.0);
        rebooted.storage.bytes = board.storage.bytes;
        assert!(!rebooted.init().unwrap()); // marker valid, no heal
        assert!((rebooted.measure_voltage(1).unwrap() - 3.0).abs() < 1e-6);
        assert!((rebooted.measure_voltage(0).unwrap() - 2.818181818).abs() < 1e-6);
    }

    #[test]
    fn reset_save_reload_returns_to_defaults() {
        let mut board = test_board(1.0);
        board.init().unwrap();
        board.calibrate_voltage(0, 1.0, 9.0, 2.0, 18.0).unwrap();
        board.save_all_calibration().unwrap();

        board.reset_calibration(0).unwrap();
        board.save_calibration(0).unwrap();

        let mut rebooted = test_board(1.0);
        rebooted.storage.bytes = board.storage.bytes;
        rebooted.init().unwrap();
        assert!((rebooted.calibration_scale(0).unwrap() - 2.818181818).abs() < 1e-6);
    }

    #[test]
    fn corrupted_marker_self_heals_idempotently() {
        let mut board = test_board(1.0);
        board.init().unwrap();
        board.calibrate_voltage(3, 1.0, 5.0, 2.0, 10.0).unwrap();
        board.save_all_calibration().unwrap();

        // Corrupt the marker byte
        board.storage.bytes[0] = 0x00;

        let mut healed_once = test_board(1.0);
        healed_once.storage.bytes = board.storage.bytes;
        assert!(healed_once.init().unwrap());
        assert!((healed_once.calibration_scale(3).unwrap() - 2.818181818).abs() < 1e-6);
        assert_eq!(healed_once.storage.bytes[0], INIT_MARKER);

        let mut healed_twice = test_board(1.0);
        healed_twice.storage.bytes = healed_once.storage.bytes;
        assert!(!healed_twice.init().unwrap());
        assert!((healed_twice.calibration_scale(3).unwrap() - 2.818181818).abs() < 1e-6);
    }

    #[test]
    fn undersized_storage_is_rejected() {
        let mut channels = Vec::new();
        let _ = channels.push(IsoChannelConfig {
            bus_addr: 0x68,
            default: LinearCalibration::IDENTITY,
        });
        let config = IsoAdcConfig {
            name: String::new(),
            channels,
            gain: Gain::X1,
            rate: SampleRate::Sps15,
        };
        let mut board = IsoAdcBoard::new(
            &config,
            MockPin::default(),
            TinyEeprom { bytes: [0xFF; 8] },
            |_| MockChip::reading(0.0),
        )
        .unwrap();

        assert_eq!(
            board.init(),
            Err(BoardError::StorageTooSmall {
                required: 13,
                capacity: 8
            })
        );
    }

    #[test]
    fn bad_channel_index_is_an_error() {
        let mut board = test_board(1.0);
        board.init().unwrap();
        assert!(matches!(
            board.measure_voltage(4),
            Err(BoardError::Calibration(CalibrationError::ChannelOutOfRange))
        ));
        assert!(matches!(
            board.calibrate_voltage(9, 1.0, 1.0, 2.0, 2.0),
            Err(BoardError::Calibration(CalibrationError::ChannelOutOfRange))
        ));
    }

    #[test]
    fn degenerate_calibration_rejected_keeps_prior() {
        let mut board = test_board(1.0);
        board.init().unwrap();
        assert!(matches!(
            board.calibrate_voltage(0, 2.0, 1.0, 2.0, 5.0),
            Err(BoardError::Calibration(CalibrationError::InvalidPoints))
        ));
        assert!((board.calibration_scale(0).unwrap() - 2.818181818).abs() < 1e-6);
    }

    #[test]
    fn led_follows_set_led() {
        let mut board = test_board(1.0);
        board.init().unwrap();
        board.set_led(true);
        assert!(board.led.high);
        board.set_led(false);
        assert!(!board.led.high);
        board.reset().unwrap();
        assert!(!board.led.high);
    }

    #[test]
    fn serial_reads_through() {
        let mut board = test_board(1.0);
        // Factory provisioning: serial at address 1, little-endian
        board.storage.bytes[1..5].copy_from_slice(&0xA2D0_0017u32.to_le_bytes());
        board.init().unwrap();
        assert_eq!(board.serial(), 0xA2D0_0017);
    }
}
