use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use thiserror::Error;

use crate::constants::FRAME_COUNT;
use crate::policy::ReplacementPolicy;
use crate::trace::{Operation, Trace};
use crate::translation::{Location, translate};

/// Resident-page bookkeeping: the frame holding the page and whether the
/// page has been written since it was installed or last paged out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTableEntry {
    pub frame: usize,
    pub dirty: bool,
}

/// Per-job mapping from resident page number to its entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTable {
    entries: BTreeMap<u64, PageTableEntry>,
}

impl PageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, page: u64) -> Option<&PageTableEntry> {
        self.entries.get(&page)
    }

    pub fn contains(&self, page: u64) -> bool {
        self.entries.contains_key(&page)
    }

    /// Install a fresh, clean entry mapping `page` to `frame`.
    pub fn install(&mut self, page: u64, frame: usize) {
        self.entries.insert(page, PageTableEntry { frame, dirty: false });
    }

    pub fn mark_dirty(&mut self, page: u64) {
        if let Some(entry) = self.entries.get_mut(&page) {
            entry.dirty = true;
        }
    }

    /// The page currently mapped to `frame`, if any.
    pub fn page_of_frame(&self, frame: usize) -> Option<u64> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.frame == frame)
            .map(|(&page, _)| page)
    }

    /// Remove the entry mapped to `frame`.
    pub fn evict_frame(&mut self, frame: usize) {
        if let Some(page) = self.page_of_frame(frame) {
            self.entries.remove(&page);
        }
    }

    /// Whether any entry mapped to `frame` is dirty. The page-out consumes
    /// the dirty bits: they are cleared as they are read.
    pub fn take_dirty(&mut self, frame: usize) -> bool {
        let mut dirty = false;
        for entry in self.entries.values_mut() {
            if entry.frame == frame && entry.dirty {
                dirty = true;
                entry.dirty = false;
            }
        }
        dirty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Frames currently allocated to the active job, ordered by eviction
/// priority: the front is the FIFO/LRU victim, and a reused frame rotates
/// to the back regardless of policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FramePool {
    frames: VecDeque<usize>,
}

impl FramePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() >= FRAME_COUNT
    }

    pub fn front(&self) -> Option<usize> {
        self.frames.front().copied()
    }

    pub fn get(&self, position: usize) -> Option<usize> {
        self.frames.get(position).copied()
    }

    /// Allocate the next free frame. Frames hand out in increasing index
    /// order, so the next index is simply the pool's current size.
    pub fn allocate(&mut self) -> usize {
        let frame = self.frames.len();
        self.frames.push_back(frame);
        frame
    }

    /// Remove the frame at `position` and rotate it to the back.
    pub fn rotate_to_back(&mut self, position: usize) -> Option<usize> {
        let frame = self.frames.remove(position)?;
        self.frames.push_back(frame);
        Some(frame)
    }

    /// Move `frame`, wherever it sits, to the most-recently-used end.
    pub fn move_to_back(&mut self, frame: usize) {
        if let Some(position) = self.frames.iter().position(|&f| f == frame) {
            self.rotate_to_back(position);
        }
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Read/write discriminator for events and the bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

/// How a fault was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultResolution {
    /// A free frame was still available.
    FreeFrame,
    /// A resident page was evicted; `page_out` reports whether its dirty
    /// contents had to be written back first.
    Evicted { page_out: bool },
}

/// One structured entry in a pass's event stream.
///
/// `Display` renders the event in the simulator's report format; the
/// structured form is the engine's actual output surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    JobStart { size: u64 },
    Access { kind: AccessKind, address: u64 },
    AccessViolation,
    Hit { location: Location },
    Fault { resolution: FaultResolution, location: Location },
    JobEnd { counts: JobCounts },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::JobStart { size } => write!(f, "New job, size {size}"),
            Event::Access { kind: AccessKind::Read, address } => write!(f, "Read {address}"),
            Event::Access { kind: AccessKind::Write, address } => write!(f, "Write {address}"),
            Event::AccessViolation => write!(f, "  Access Violation"),
            Event::Hit { location } => write!(f, "  Page hit\n  Location {location}"),
            Event::Fault { resolution, location } => {
                writeln!(f, "  Page fault")?;
                match resolution {
                    FaultResolution::FreeFrame => writeln!(f, "      Using free frame")?,
                    FaultResolution::Evicted { page_out } => {
                        writeln!(f, "    Page replacement")?;
                        if *page_out {
                            writeln!(f, "      Page out")?;
                        }
                    }
                }
                write!(f, "  Location {location}")
            }
            Event::JobEnd { counts } => write!(
                f,
                "End job\n###Total page hit is {}; total page fault is {}###",
                counts.hits, counts.faults
            ),
        }
    }
}

/// Per-job hit/fault counters, reset when the job ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobCounts {
    pub hits: u64,
    pub faults: u64,
}

/// Aggregate counters for one full pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassTotals {
    pub jobs: u64,
    pub hits: u64,
    pub faults: u64,
}

impl fmt::Display for PassTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "####For all {} processes, total page hit is {}, total page fault is {}####",
            self.jobs, self.hits, self.faults
        )
    }
}

/// Everything one pass produces: the ordered event stream plus totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub events: Vec<Event>,
    pub totals: PassTotals,
}

/// Trace-ordering violations. All of these abort the pass: the engine
/// returns the error and discards any partial event stream.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StructuralError {
    #[error("the trace never ends its last job; the final operation must be a job end (opcode 4)")]
    UnterminatedTrace,
    #[error("only one job may be active; a job end (opcode 4) must precede another new job (opcode 1)")]
    JobAlreadyActive,
    #[error("no active job for a read/write; a new job (opcode 1) must come first")]
    NoActiveJob,
    #[error("no active job to end; a new job (opcode 1) must precede a job end (opcode 4)")]
    NoJobToEnd,
}

/// The single resident job: its declared size and its page table.
#[derive(Debug)]
struct Workload {
    size: u64,
    table: PageTable,
}

/// Drives one full pass of a trace under one replacement policy.
///
/// Construct fresh per pass; nothing survives the pass except the
/// returned [`PassReport`].
pub struct Engine<'a> {
    trace: &'a Trace,
    policy: &'a dyn ReplacementPolicy,
    workload: Option<Workload>,
    pool: FramePool,
    counts: JobCounts,
    totals: PassTotals,
    events: Vec<Event>,
}

/// Run one pass of `trace` under `policy`.
pub fn run_pass(trace: &Trace, policy: &dyn ReplacementPolicy) -> Result<PassReport, StructuralError> {
    Engine::new(trace, policy).run()
}

impl<'a> Engine<'a> {
    pub fn new(trace: &'a Trace, policy: &'a dyn ReplacementPolicy) -> Self {
        Engine {
            trace,
            policy,
            workload: None,
            pool: FramePool::new(),
            counts: JobCounts::default(),
            totals: PassTotals::default(),
            events: Vec::new(),
        }
    }

    /// Consume the engine, processing every operation in trace order.
    pub fn run(mut self) -> Result<PassReport, StructuralError> {
        let ops = self.trace.ops();

        // Whole-trace precondition, checked before anything is processed.
        // An empty trace is vacuously valid and yields an empty report.
        if ops.last().is_some_and(|op| !op.is_end()) {
            return Err(StructuralError::UnterminatedTrace);
        }

        for (index, &op) in ops.iter().enumerate() {
            self.step(op, &ops[index + 1..])?;
        }
        Ok(PassReport { events: self.events, totals: self.totals })
    }

    fn step(&mut self, op: Operation, future: &[Operation]) -> Result<(), StructuralError> {
        match op {
            Operation::Start { size } => self.start_job(size),
            Operation::Read { address } => self.access(AccessKind::Read, address, future),
            Operation::Write { address } => self.access(AccessKind::Write, address, future),
            Operation::End => self.end_job(),
        }
    }

    fn start_job(&mut self, size: u64) -> Result<(), StructuralError> {
        if self.workload.is_some() {
            return Err(StructuralError::JobAlreadyActive);
        }
        self.workload = Some(Workload { size, table: PageTable::new() });
        self.totals.jobs += 1;
        self.events.push(Event::JobStart { size });
        Ok(())
    }

    fn access(
        &mut self,
        kind: AccessKind,
        address: u64,
        future: &[Operation],
    ) -> Result<(), StructuralError> {
        let workload = self.workload.as_mut().ok_or(StructuralError::NoActiveJob)?;
        self.events.push(Event::Access { kind, address });

        // Reads fault at the declared size, writes only past it. The
        // asymmetry is part of the simulated machine's contract.
        let out_of_bounds = match kind {
            AccessKind::Read => address >= workload.size,
            AccessKind::Write => address > workload.size,
        };
        if out_of_bounds {
            self.events.push(Event::AccessViolation);
            return Ok(());
        }

        let (page, offset) = translate(address);
        if let Some(entry) = workload.table.get(page) {
            let frame = entry.frame;
            self.counts.hits += 1;
            self.events.push(Event::Hit { location: Location::new(frame, offset) });
            self.policy.touch(&mut self.pool, frame);
        } else {
            self.counts.faults += 1;
            let event = Self::handle_fault(
                self.policy,
                &mut self.pool,
                &mut workload.table,
                page,
                offset,
                future,
            );
            self.events.push(event);
        }

        // The page is resident now; a write leaves it dirty.
        if kind == AccessKind::Write {
            workload.table.mark_dirty(page);
        }
        Ok(())
    }

    /// Resolve a fault for `page`: free-frame allocation while the pool is
    /// filling, otherwise a policy-chosen eviction with the mechanics
    /// shared by all policies.
    fn handle_fault(
        policy: &dyn ReplacementPolicy,
        pool: &mut FramePool,
        table: &mut PageTable,
        page: u64,
        offset: u64,
        future: &[Operation],
    ) -> Event {
        if !pool.is_full() {
            let frame = pool.allocate();
            table.install(page, frame);
            return Event::Fault {
                resolution: FaultResolution::FreeFrame,
                location: Location::new(frame, offset),
            };
        }

        let position = policy.select_victim(pool, table, future);
        let frame = pool.get(position).expect("victim position within the full pool");
        let page_out = table.take_dirty(frame);
        table.evict_frame(frame);
        pool.rotate_to_back(position);
        table.install(page, frame);
        Event::Fault {
            resolution: FaultResolution::Evicted { page_out },
            location: Location::new(frame, offset),
        }
    }

    fn end_job(&mut self) -> Result<(), StructuralError> {
        self.workload.take().ok_or(StructuralError::NoJobToEnd)?;
        self.events.push(Event::JobEnd { counts: self.counts });
        self.totals.hits += self.counts.hits;
        self.totals.faults += self.counts.faults;
        self.counts = JobCounts::default();
        self.pool.clear();
        Ok(())
    }
}
