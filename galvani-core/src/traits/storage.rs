//! Byte-addressed non-volatile storage
//!
//! Models a small EEPROM (or emulated EEPROM page): plain get/put at a
//! byte address, no transactions, no wear leveling at this layer.
//! Multi-byte values are little-endian on the wire; the provided
//! helpers are the only encode/decode path, so the persisted layout
//! cannot drift between load and save.

/// Byte-addressed storage capability
pub trait Eeprom {
    /// Storage/bus error type
    type Error;

    /// Total usable size in bytes
    fn capacity(&self) -> usize;

    /// Read `buf.len()` bytes starting at `addr`
    fn read(&mut self, addr: usize, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `data` starting at `addr`
    fn write(&mut self, addr: usize, data: &[u8]) -> Result<(), Self::Error>;

    /// Read a single byte
    fn read_u8(&mut self, addr: usize) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read(addr, &mut buf)?;
        Ok(buf[0])
    }

    /// Write a single byte
    fn write_u8(&mut self, addr: usize, value: u8) -> Result<(), Self::Error> {
        self.write(addr, &[value])
    }

    /// Read a little-endian u32
    fn read_u32(&mut self, addr: usize) -> Result<u32, Self::Error> {
        let mut buf = [0u8; 4];
        self.read(addr, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Write a little-endian u32
    fn write_u32(&mut self, addr: usize, value: u32) -> Result<(), Self::Error> {
        self.write(addr, &value.to_le_bytes())
    }

    /// Read a little-endian f32
    fn read_f32(&mut self, addr: usize) -> Result<f32, Self::Error> {
        let mut buf = [0u8; 4];
        self.read(addr, &mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    /// Write a little-endian f32
    fn write_f32(&mut self, addr: usize, value: f32) -> Result<(), Self::Error> {
        self.write(addr, &value.to_le_bytes())
    }
}
