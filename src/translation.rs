use std::fmt;

use crate::constants::{OFFSET_WIDTH, PAGE_SIZE};

/// Split a linear address into its (page number, intra-page offset) pair.
///
/// Pure integer division and remainder; total over all addresses.
#[inline]
pub fn translate(address: u64) -> (u64, u64) {
    (address / PAGE_SIZE, address % PAGE_SIZE)
}

/// A resident location: the frame holding a page plus the intra-frame offset.
///
/// Renders the way location reports expect it: the frame number immediately
/// followed by the offset zero-padded to [`OFFSET_WIDTH`] digits, so frame 2
/// at offset 5 reads `2005`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub frame: usize,
    pub offset: u64,
}

impl Location {
    pub fn new(frame: usize, offset: u64) -> Self {
        Location { frame, offset }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:0width$}", self.frame, self.offset, width = OFFSET_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_page_boundaries() {
        assert_eq!(translate(0), (0, 0));
        assert_eq!(translate(999), (0, 999));
        assert_eq!(translate(1000), (1, 0));
        assert_eq!(translate(2500), (2, 500));
        assert_eq!(translate(4605), (4, 605));
    }

    #[test]
    fn test_location_pads_offset() {
        assert_eq!(Location::new(0, 0).to_string(), "0000");
        assert_eq!(Location::new(2, 5).to_string(), "2005");
        assert_eq!(Location::new(1, 42).to_string(), "1042");
        assert_eq!(Location::new(0, 500).to_string(), "0500");
    }

    #[test]
    fn test_location_full_width_offset() {
        // A maximal offset needs no padding
        assert_eq!(Location::new(2, 999).to_string(), "2999");
    }
}
