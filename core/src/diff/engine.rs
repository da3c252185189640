//! diff/engine.rs
//! Size-dispatched XOR diff of two files into a content-addressed artifact.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::constants::{DIFF_CHUNK_SIZE, SIZE_THRESHOLD};
use crate::diff::artifact::{ArtifactGuard, DifferenceArtifact, InputFile};
use crate::diff::policy::{select_route, DiffRoute};
use crate::diff::stream::{count_nonzero, xor_stream, XorStreamError};
use crate::process::{ExternalTool, ProcessRun, ProcessSupervisor};
use crate::telemetry::{DiffCounters, Stage, StageTimes};
use crate::types::{CoreError, CoreResult};
use crate::utils::artifact_name;

/// Label used for the large-file helper in errors and logs.
pub const LARGE_DIFF_LABEL: &str = "large-diff";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Inputs strictly larger than this go to the external helper.
    pub size_threshold: u64,
    pub chunk_size: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            size_threshold: SIZE_THRESHOLD,
            chunk_size: DIFF_CHUNK_SIZE,
        }
    }
}

/// Artifact plus what it cost to produce.
#[derive(Debug, Clone)]
pub struct DiffOutcome {
    pub artifact: DifferenceArtifact,
    pub route: DiffRoute,
    pub counters: DiffCounters,
    pub stage_times: StageTimes,
    /// Present when the external helper ran.
    pub external: Option<ProcessRun>,
}

#[derive(Debug, Clone)]
pub struct DiffEngine {
    artifact_dir: PathBuf,
    config: DiffConfig,
    large_diff: Option<ExternalTool>,
    supervisor: ProcessSupervisor,
}

impl DiffEngine {
    pub fn new(artifact_dir: impl Into<PathBuf>, config: DiffConfig) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            config,
            large_diff: None,
            supervisor: ProcessSupervisor::default(),
        }
    }

    pub fn with_large_diff(mut self, tool: ExternalTool) -> Self {
        self.large_diff = Some(tool);
        self
    }

    pub fn with_supervisor(mut self, supervisor: ProcessSupervisor) -> Self {
        self.supervisor = supervisor;
        self
    }

    /// Where the artifact for this pair lives (whether or not it exists yet).
    pub fn artifact_path(&self, a: &InputFile, b: &InputFile) -> PathBuf {
        self.artifact_dir.join(artifact_name(a.path(), b.path()))
    }

    pub fn route_for(&self, a: &InputFile, b: &InputFile) -> DiffRoute {
        select_route(a.len(), b.len(), self.config.size_threshold)
    }

    /// XOR `a` against `b`.
    ///
    /// # Errors
    /// - `Io` if an input cannot be read or the artifact cannot be written
    /// - `ExternalTool` if the large-file helper fails, cannot be started, or
    ///   is not configured
    /// - `Config` for a zero chunk size
    pub fn diff(&self, a: &InputFile, b: &InputFile) -> CoreResult<DifferenceArtifact> {
        self.diff_with_telemetry(a, b).map(|o| o.artifact)
    }

    pub fn diff_with_telemetry(&self, a: &InputFile, b: &InputFile) -> CoreResult<DiffOutcome> {
        if self.config.chunk_size == 0 {
            return Err(CoreError::Config("diff.chunk_size must be greater than zero".into()));
        }
        let route = self.route_for(a, b);
        tracing::info!(
            input_a = %a.path().display(),
            input_b = %b.path().display(),
            len_a = a.len(),
            len_b = b.len(),
            %route,
            "diff route selected"
        );

        fs::create_dir_all(&self.artifact_dir).map_err(|e| CoreError::io(&self.artifact_dir, e))?;
        let target = self.artifact_path(a, b);

        let outcome = match route {
            DiffRoute::InProcess => self.diff_in_process(a, b, &target)?,
            DiffRoute::External => self.diff_external(a, b, &target)?,
        };

        tracing::info!(
            %route,
            different = outcome.artifact.is_different(),
            bytes_written = outcome.counters.bytes_written,
            bytes_differing = outcome.counters.bytes_differing,
            "diff finished"
        );
        Ok(outcome)
    }

    fn diff_in_process(&self, a: &InputFile, b: &InputFile, target: &Path) -> CoreResult<DiffOutcome> {
        let started = Instant::now();

        let mut reader_a = File::open(a.path()).map_err(|e| CoreError::io(a.path(), e))?;
        let mut reader_b = File::open(b.path()).map_err(|e| CoreError::io(b.path(), e))?;
        let (guard, file) = ArtifactGuard::create(target)?;
        let mut writer = BufWriter::with_capacity(self.config.chunk_size, file);

        let counters = xor_stream(&mut reader_a, &mut reader_b, &mut writer, self.config.chunk_size)
            .map_err(|e| match e {
                XorStreamError::ReadA(e) => CoreError::io(a.path(), e),
                XorStreamError::ReadB(e) => CoreError::io(b.path(), e),
                XorStreamError::Write(e) => CoreError::io(target, e),
                XorStreamError::ZeroChunkSize => CoreError::Config(XorStreamError::ZeroChunkSize.to_string()),
            })?;
        drop(writer);

        let artifact = if counters.is_different() {
            DifferenceArtifact::Produced {
                path: guard.commit(),
                byte_len: counters.bytes_written,
            }
        } else {
            guard.discard()?;
            DifferenceArtifact::NoDifference
        };

        let mut stage_times = StageTimes::default();
        stage_times.add(Stage::Diff, started.elapsed());

        Ok(DiffOutcome {
            artifact,
            route: DiffRoute::InProcess,
            counters,
            stage_times,
            external: None,
        })
    }

    fn diff_external(&self, a: &InputFile, b: &InputFile, target: &Path) -> CoreResult<DiffOutcome> {
        let tool = self.large_diff.as_ref().ok_or_else(|| {
            CoreError::external_tool(LARGE_DIFF_LABEL, "input exceeds size threshold but no large-diff helper is configured")
        })?;

        let mut stage_times = StageTimes::default();
        let guard = ArtifactGuard::reserve(target)?;

        let started = Instant::now();
        // Spawn and process failures are reported as helper failures.
        let output = tool
            .invoke(&self.supervisor, &[a.path(), b.path(), target], guard.path())
            .map_err(|e| match e {
                CoreError::Spawn { .. } | CoreError::Process { .. } => {
                    CoreError::external_tool(LARGE_DIFF_LABEL, e.to_string())
                }
                other => other,
            })?;
        stage_times.add(Stage::LargeDiff, started.elapsed());

        // The helper only reports success; the verdict comes from its output.
        let started = Instant::now();
        let mut produced = File::open(target).map_err(|e| CoreError::io(target, e))?;
        let differing = count_nonzero(&mut produced, self.config.chunk_size)
            .map_err(|e| CoreError::io(target, e))?;
        drop(produced);
        stage_times.add(Stage::Verify, started.elapsed());

        let counters = DiffCounters {
            chunks: 0,
            bytes_read_a: a.len(),
            bytes_read_b: b.len(),
            bytes_written: output.output_len,
            bytes_differing: differing,
        };

        let artifact = if differing > 0 {
            DifferenceArtifact::Produced {
                path: guard.commit(),
                byte_len: output.output_len,
            }
        } else {
            guard.discard()?;
            DifferenceArtifact::NoDifference
        };

        Ok(DiffOutcome {
            artifact,
            route: DiffRoute::External,
            counters,
            stage_times,
            external: Some(output.run),
        })
    }
}
