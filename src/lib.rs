pub mod constants;
pub mod engine;
pub mod policy;
pub mod trace;
pub mod translation;

// Re-export commonly used items for convenience
pub use constants::*;
pub use engine::{Engine, Event, PassReport, PassTotals, StructuralError, run_pass};
pub use policy::{Fifo, Lru, Optimal, PolicyKind, ReplacementPolicy};
pub use trace::{Operation, ParseError, Trace};
pub use translation::{Location, translate};
