/// Size of one page (and one frame), in address units.
pub const PAGE_SIZE: u64 = 1000;

/// Total simulated physical memory, in address units.
pub const TOTAL_MEMORY: u64 = 3000;

/// Number of physical frames available to the active job.
pub const FRAME_COUNT: usize = (TOTAL_MEMORY / PAGE_SIZE) as usize;

/// Width of the zero-padded offset field in location reports: the decimal
/// digit count of the largest possible offset (PAGE_SIZE - 1).
pub const OFFSET_WIDTH: usize = decimal_digits(PAGE_SIZE - 1);

const fn decimal_digits(mut n: u64) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}
