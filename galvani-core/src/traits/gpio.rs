//! Digital output pin abstraction
//!
//! Only an output pin is needed here (the status LED); boards with
//! richer GPIO needs get that from their HAL directly.

/// Digital output pin
///
/// Implementations handle the actual register manipulation for the
/// specific chip. Pin writes are assumed infallible, which holds for
/// every on-package GPIO this library targets.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;
}
