//! diff/policy.rs
//! Size-based choice between the in-process stream and the external helper.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffRoute {
    InProcess,
    External,
}

impl fmt::Display for DiffRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiffRoute::InProcess => "in_process",
            DiffRoute::External => "external",
        })
    }
}

/// External once either input is strictly larger than `threshold`.
pub fn select_route(len_a: u64, len_b: u64, threshold: u64) -> DiffRoute {
    if len_a > threshold || len_b > threshold {
        DiffRoute::External
    } else {
        DiffRoute::InProcess
    }
}
