//! filediff-core
//!
//! Streaming XOR diff of two files, with supervised native helpers for
//! large inputs and for the frequency-domain transform.
//! No HTTP, no FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

pub mod config;
pub mod logging;
pub mod telemetry;

// Engine layers
pub mod process;
pub mod diff;
pub mod transform;
pub mod pipeline;

pub use types::{CoreError, CoreResult, ProcessFailure};

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::CoreConfig;
    pub use crate::diff::{DiffConfig, DiffEngine, DiffRoute, DifferenceArtifact, InputFile};
    pub use crate::pipeline::{DiffReport, LocalFileResolver, PathResolver, Pipeline, TransformReport};
    pub use crate::process::{ExternalTool, ProbeKind, ProcessRun, ProcessSupervisor, SupervisorConfig};
    pub use crate::telemetry::{Stage, TelemetrySnapshot};
    pub use crate::transform::{TransformResult, TransformStage};
    pub use crate::types::{CoreError, CoreResult};
}
