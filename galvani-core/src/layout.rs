//! Non-volatile persistence layout
//!
//! Maps each logical field (initialization marker, serial number, and
//! the per-channel offset/scale pair) to a fixed byte address. The map
//! is a pure function of the field sizes and the channel count, walked
//! in a fixed order, so every boot of the same build recomputes the
//! identical addresses.
//!
//! Layout, starting at address 0:
//!
//! ```text
//! marker  (1 byte, sentinel 0x55)
//! serial  (4 bytes, LE u32)
//! ch 0:   offset (4 bytes, LE f32), scale (4 bytes, LE f32)
//! ch 1:   offset, scale
//! ...
//! ```
//!
//! Changing the field order or sizes invalidates every unit calibrated
//! under the old layout. There is no version byte; this is a known
//! limitation carried over from the boards already in the field.

use core::mem::size_of;

const MARKER_SIZE: usize = size_of::<u8>();
const SERIAL_SIZE: usize = size_of::<u32>();
const COEFF_SIZE: usize = size_of::<f32>();
const CHANNEL_STRIDE: usize = 2 * COEFF_SIZE;

/// Layout errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    /// The backing storage cannot hold the whole layout
    StorageTooSmall { required: usize, capacity: usize },
}

/// Address map for one board's persisted calibration block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PersistenceLayout {
    channel_count: usize,
    marker_addr: usize,
    serial_addr: usize,
    channels_base: usize,
}

impl PersistenceLayout {
    /// Compute the layout for a board with `channel_count` channels
    pub const fn new(channel_count: usize) -> Self {
        // Walk the fields in their fixed on-device order, accumulating
        // sizes into addresses.
        let marker_addr = 0;
        let serial_addr = marker_addr + MARKER_SIZE;
        let channels_base = serial_addr + SERIAL_SIZE;
        Self {
            channel_count,
            marker_addr,
            serial_addr,
            channels_base,
        }
    }

    /// Number of channels this layout covers
    pub const fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Address of the initialization marker byte
    pub const fn marker_addr(&self) -> usize {
        self.marker_addr
    }

    /// Address of the serial number
    pub const fn serial_addr(&self) -> usize {
        self.serial_addr
    }

    /// Address of channel `ch`'s calibration offset
    pub const fn offset_addr(&self, ch: usize) -> usize {
        self.channels_base + ch * CHANNEL_STRIDE
    }

    /// Address of channel `ch`'s calibration scale
    pub const fn scale_addr(&self, ch: usize) -> usize {
        self.offset_addr(ch) + COEFF_SIZE
    }

    /// Total bytes occupied, from address 0 past the last field
    pub const fn total_size(&self) -> usize {
        self.channels_base + self.channel_count * CHANNEL_STRIDE
    }

    /// Check that a storage part of `capacity` bytes can hold the layout
    pub fn validate(&self, capacity: usize) -> Result<(), LayoutError> {
        let required = self.total_size();
        if capacity < required {
            return Err(LayoutError::StorageTooSmall { required, capacity });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn matches_on_device_format() {
        // The byte layout is the on-device file format; these addresses
        // must never move.
        let layout = PersistenceLayout::new(4);
        assert_eq!(layout.marker_addr(), 0);
        assert_eq!(layout.serial_addr(), 1);
        assert_eq!(layout.offset_addr(0), 5);
        assert_eq!(layout.scale_addr(0), 9);
        assert_eq!(layout.offset_addr(3), 29);
        assert_eq!(layout.scale_addr(3), 33);
        assert_eq!(layout.total_size(), 37);
    }

    #[test]
    fn validate_rejects_small_storage() {
        let layout = PersistenceLayout::new(4);
        assert_eq!(
            layout.validate(16),
            Err(LayoutError::StorageTooSmall {
                required: 37,
                capacity: 16
            })
        );
        assert_eq!(layout.validate(37), Ok(()));
        assert_eq!(layout.validate(256), Ok(()));
    }

    /// Collect every field as an (address, size) range
    fn ranges(layout: &PersistenceLayout) -> std::vec::Vec<(usize, usize)> {
        let mut out = std::vec![
            (layout.marker_addr(), 1),
            (layout.serial_addr(), 4),
        ];
        for ch in 0..layout.channel_count() {
            out.push((layout.offset_addr(ch), 4));
            out.push((layout.scale_addr(ch), 4));
        }
        out
    }

    proptest! {
        #[test]
        fn no_field_ranges_overlap(channel_count in 1usize..=64) {
            let layout = PersistenceLayout::new(channel_count);
            let fields = ranges(&layout);
            for (i, &(a_start, a_len)) in fields.iter().enumerate() {
                for &(b_start, b_len) in fields.iter().skip(i + 1) {
                    let disjoint =
                        a_start + a_len <= b_start || b_start + b_len <= a_start;
                    prop_assert!(disjoint, "fields overlap: {}..{} vs {}..{}",
                        a_start, a_start + a_len, b_start, b_start + b_len);
                }
            }
            prop_assert!(fields.iter().all(|&(s, l)| s + l <= layout.total_size()));
        }
    }
}
