//! Completion bitmap: one bit per unit.

/// Completion bitmap: one bit per unit, 1-based (bit 0 of byte 0 = unit 1).
#[derive(Debug, Clone, Default)]
pub struct PartBitmap {
    bytes: Vec<u8>,
    len: u32,
}

impl PartBitmap {
    /// New empty bitmap with capacity for `len` units.
    pub fn new(len: u32) -> Self {
        PartBitmap {
            bytes: vec![0u8; (len as usize).div_ceil(8)],
            len,
        }
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mark `unit` completed. Returns false if it was already set or is out of range.
    pub fn set_completed(&mut self, unit: u32) -> bool {
        if unit == 0 || unit > self.len {
            return false;
        }
        let (byte_idx, bit) = Self::locate(unit);
        let was_set = self.bytes[byte_idx] & (1 << bit) != 0;
        self.bytes[byte_idx] |= 1 << bit;
        !was_set
    }

    /// True if `unit` is marked completed.
    pub fn is_completed(&self, unit: u32) -> bool {
        if unit == 0 || unit > self.len {
            return false;
        }
        let (byte_idx, bit) = Self::locate(unit);
        self.bytes[byte_idx] & (1 << bit) != 0
    }

    /// Number of completed units.
    pub fn count_completed(&self) -> u32 {
        self.bytes.iter().map(|b| b.count_ones()).sum()
    }

    /// True if every unit in 1..=len is completed.
    pub fn all_completed(&self) -> bool {
        self.count_completed() == self.len
    }

    /// Units not yet completed, ascending.
    pub fn missing(&self) -> Vec<u32> {
        (1..=self.len).filter(|u| !self.is_completed(*u)).collect()
    }

    fn locate(unit: u32) -> (usize, u32) {
        let index = (unit - 1) as usize;
        (index / 8, (index % 8) as u32)
    }
}
