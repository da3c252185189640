//! transform: run the frequency-domain helper over a diff artifact.
//!
//! The output name is a single fixed slot inside the output directory, so
//! concurrent transforms overwrite each other; the result is only valid once
//! `transform` has returned.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::TRANSFORM_OUTPUT_NAME;
use crate::diff::{ArtifactGuard, DifferenceArtifact};
use crate::process::{ExternalTool, ProcessRun, ProcessSupervisor};
use crate::types::{CoreError, CoreResult};
use crate::utils::{is_non_empty_file, kib_to_mib};

pub const TRANSFORM_LABEL: &str = "transform";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub binary: Option<PathBuf>,
    pub output_name: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            binary: None,
            output_name: TRANSFORM_OUTPUT_NAME.to_string(),
        }
    }
}

/// Output of a successful transform. The output file exists and is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    pub output_path: PathBuf,
    pub output_len: u64,
    pub peak_rss_kb: u64,
    /// `peak_rss_kb / 1024`
    pub peak_memory_mb: f64,
    pub run: ProcessRun,
}

#[derive(Debug, Clone)]
pub struct TransformStage {
    tool: ExternalTool,
    output_dir: PathBuf,
    output_name: String,
    supervisor: ProcessSupervisor,
}

impl TransformStage {
    pub fn new(tool: ExternalTool, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            output_dir: output_dir.into(),
            output_name: TRANSFORM_OUTPUT_NAME.to_string(),
            supervisor: ProcessSupervisor::default(),
        }
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    pub fn with_supervisor(mut self, supervisor: ProcessSupervisor) -> Self {
        self.supervisor = supervisor;
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }

    /// Run the helper as `<bin> <artifact> <output>`.
    ///
    /// # Errors
    /// - `InputMissing` for `NoDifference` or a missing/empty artifact file;
    ///   no process is spawned in that case
    /// - `ExternalTool` on non-zero exit or missing/empty output
    /// - `Spawn` / `Process` from the supervisor
    pub fn transform(&self, artifact: &DifferenceArtifact) -> CoreResult<TransformResult> {
        let input = match artifact {
            DifferenceArtifact::NoDifference => {
                return Err(CoreError::InputMissing(
                    "no difference artifact to transform (inputs are identical)".into(),
                ));
            }
            DifferenceArtifact::Produced { path, .. } => path,
        };
        if !is_non_empty_file(input) {
            return Err(CoreError::InputMissing(format!(
                "difference file is missing or empty: {}",
                input.display()
            )));
        }

        fs::create_dir_all(&self.output_dir).map_err(|e| CoreError::io(&self.output_dir, e))?;
        let output_path = self.output_path();

        // A stale result from an earlier run must not pass the output check.
        let guard = ArtifactGuard::reserve(&output_path)?;
        let output = self.tool.invoke(&self.supervisor, &[input.as_path(), guard.path()], guard.path())?;
        let output_path = guard.commit();

        tracing::info!(
            output = %output_path.display(),
            output_len = output.output_len,
            peak_rss_kb = output.run.peak_rss_kb,
            "transform finished"
        );

        Ok(TransformResult {
            output_path,
            output_len: output.output_len,
            peak_rss_kb: output.run.peak_rss_kb,
            peak_memory_mb: kib_to_mib(output.run.peak_rss_kb),
            run: output.run,
        })
    }
}
