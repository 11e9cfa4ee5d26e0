use std::str::FromStr;

use crate::constants::{FRAME_COUNT, PAGE_SIZE};
use crate::engine::{FramePool, PageTable};
use crate::trace::Operation;

/// Eviction strategy consulted by the paging engine on a fault when no
/// free frame remains, plus a hook invoked on every page hit.
///
/// The engine owns the shared eviction mechanics (dirty write-back
/// reporting, page-table removal, frame rotation); a policy only picks
/// the victim's position in the frame pool.
pub trait ReplacementPolicy {
    /// Human-readable name, used in pass banners.
    fn name(&self) -> &'static str;

    /// Pool position of the frame to evict. Called only with a full pool.
    /// `future` holds the not-yet-processed remainder of the trace.
    fn select_victim(&self, pool: &FramePool, table: &PageTable, future: &[Operation]) -> usize;

    /// Hit notification for the frame the hit page occupies.
    fn touch(&self, pool: &mut FramePool, frame: usize) {
        let _ = (pool, frame);
    }
}

/// First-in-first-out: the pool front is always the frame resident longest,
/// so the victim is simply position 0. Hits never reorder anything.
pub struct Fifo;

impl ReplacementPolicy for Fifo {
    fn name(&self) -> &'static str {
        "First In First Out"
    }

    fn select_victim(&self, _pool: &FramePool, _table: &PageTable, _future: &[Operation]) -> usize {
        0
    }
}

/// Least-recently-used: same victim selection as FIFO (the pool front),
/// but every hit rotates the touched frame to the most-recently-used end,
/// keeping the front the least-recently-touched frame.
pub struct Lru;

impl ReplacementPolicy for Lru {
    fn name(&self) -> &'static str {
        "Least Recently Used"
    }

    fn select_victim(&self, _pool: &FramePool, _table: &PageTable, _future: &[Operation]) -> usize {
        0
    }

    fn touch(&self, pool: &mut FramePool, frame: usize) {
        pool.move_to_back(frame);
    }
}

/// Optimal (look-ahead) replacement: scan the remaining trace and drop
/// resident frames from candidacy as their pages get referenced again;
/// the survivor is the frame whose next use is furthest away.
pub struct Optimal;

impl ReplacementPolicy for Optimal {
    fn name(&self) -> &'static str {
        "Optimal"
    }

    fn select_victim(&self, _pool: &FramePool, table: &PageTable, future: &[Operation]) -> usize {
        // Candidate flags are indexed by frame number; the scan feeds on
        // the raw parameter of every future operation, job boundaries
        // included, and stops once a single candidate remains. The victim
        // is re-read from the flags before each operation is applied, so
        // the final operation's reference never influences the choice.
        let mut candidate = [true; FRAME_COUNT];
        let mut victim = 0;
        for op in future {
            let mut remaining = 0;
            for (frame, &flagged) in candidate.iter().enumerate() {
                if flagged {
                    remaining += 1;
                    victim = frame;
                }
            }
            if remaining == 1 {
                break;
            }
            let page = op.parameter() / PAGE_SIZE;
            if let Some(entry) = table.get(page) {
                candidate[entry.frame] = false;
            }
        }
        victim
    }
}

/// Policy selector for the CLI and for running the standard pass set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Fifo,
    Lru,
    Optimal,
}

impl PolicyKind {
    /// The standard pass order: FIFO, then LRU, then OPTIMAL.
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Fifo, PolicyKind::Lru, PolicyKind::Optimal];

    pub fn policy(&self) -> &'static dyn ReplacementPolicy {
        match self {
            PolicyKind::Fifo => &Fifo,
            PolicyKind::Lru => &Lru,
            PolicyKind::Optimal => &Optimal,
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" => Ok(PolicyKind::Fifo),
            "lru" => Ok(PolicyKind::Lru),
            "optimal" | "opt" => Ok(PolicyKind::Optimal),
            _ => Err(format!("unknown policy '{s}' (expected fifo, lru, or optimal)")),
        }
    }
}
