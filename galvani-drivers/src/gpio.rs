//! embedded-hal pin adapter
//!
//! Lets any HAL's `embedded_hal::digital::OutputPin` drive a board's
//! status LED. Pin writes in embedded-hal are fallible in the
//! signature only; on-package GPIO never fails, so write errors are
//! dropped and the last commanded state is tracked locally for
//! readback.

use galvani_core::traits::OutputPin;

/// Wraps an `embedded_hal::digital::OutputPin` as a board LED pin
pub struct HalPin<T> {
    pin: T,
    high: bool,
}

impl<T: embedded_hal::digital::OutputPin> HalPin<T> {
    /// Adapt `pin`, assuming it currently drives low
    pub fn new(pin: T) -> Self {
        Self { pin, high: false }
    }

    /// Release the underlying HAL pin
    pub fn release(self) -> T {
        self.pin
    }
}

impl<T: embedded_hal::digital::OutputPin> OutputPin for HalPin<T> {
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
