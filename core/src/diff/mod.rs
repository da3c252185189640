//! diff: streaming XOR difference of two files.
//!
//! Inputs at or under the size threshold are streamed in-process; anything
//! larger is handed to an external helper with the same XOR semantics.

pub mod artifact;
pub mod engine;
pub mod policy;
pub mod stream;

pub use artifact::{ArtifactGuard, DifferenceArtifact, InputFile};
pub use engine::{DiffConfig, DiffEngine, DiffOutcome, LARGE_DIFF_LABEL};
pub use policy::{select_route, DiffRoute};
pub use stream::{count_nonzero, xor_chunk, xor_stream, XorStreamError};
