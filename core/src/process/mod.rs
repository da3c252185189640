//! process: supervision of opaque native helpers.
//!
//! - `probe`: per-pid resident-memory readouts
//! - `drain`: stdout/stderr pipe drainers
//! - `supervisor`: spawn, sample, wait, time out
//! - `tool`: fixed argument contract plus success predicate

pub mod drain;
pub mod probe;
pub mod supervisor;
pub mod tool;

pub use probe::{MemoryProbe, NullProbe, ProbeKind, ProcfsProbe, SysinfoProbe};
pub use supervisor::{ProcessRun, ProcessSupervisor, SupervisorConfig, SupervisorError};
pub use tool::{ExternalTool, ToolOutput};
