//! config.rs
//! Layered configuration: defaults, then a JSON file, then environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{env_vars, DEFAULT_ARTIFACT_DIR};
use crate::diff::{DiffConfig, DiffEngine, LARGE_DIFF_LABEL};
use crate::process::{ExternalTool, ProcessSupervisor, SupervisorConfig};
use crate::transform::{TransformConfig, TransformStage, TRANSFORM_LABEL};
use crate::types::{CoreError, CoreResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub binary: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub artifact_dir: PathBuf,
    pub diff: DiffConfig,
    pub large_diff: ToolConfig,
    pub transform: TransformConfig,
    pub supervisor: SupervisorConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            diff: DiffConfig::default(),
            large_diff: ToolConfig::default(),
            transform: TransformConfig::default(),
            supervisor: SupervisorConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Read a JSON file; missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        serde_json::from_str(&raw)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply `FILEDIFF_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from));
    }

    /// Same as `apply_env` with an injectable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<PathBuf>) {
        if let Some(dir) = lookup(env_vars::ARTIFACT_DIR) {
            self.artifact_dir = dir;
        }
        if let Some(bin) = lookup(env_vars::LARGE_DIFF_BIN) {
            self.large_diff.binary = Some(bin);
        }
        if let Some(bin) = lookup(env_vars::TRANSFORM_BIN) {
            self.transform.binary = Some(bin);
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.diff.chunk_size == 0 {
            return Err(CoreError::Config("diff.chunk_size must be greater than zero".into()));
        }
        if self.supervisor.sampling_interval_ms == 0 {
            return Err(CoreError::Config(
                "supervisor.sampling_interval_ms must be greater than zero".into(),
            ));
        }
        if self.transform.output_name.trim().is_empty() {
            return Err(CoreError::Config("transform.output_name must not be empty".into()));
        }
        if self.artifact_dir.as_os_str().is_empty() {
            return Err(CoreError::Config("artifact_dir must not be empty".into()));
        }
        Ok(())
    }

    pub fn supervisor(&self) -> ProcessSupervisor {
        ProcessSupervisor::new(self.supervisor.clone())
    }

    pub fn build_engine(&self) -> DiffEngine {
        let engine = DiffEngine::new(&self.artifact_dir, self.diff.clone()).with_supervisor(self.supervisor());
        match &self.large_diff.binary {
            Some(bin) => engine.with_large_diff(ExternalTool::new(LARGE_DIFF_LABEL, bin)),
            None => engine,
        }
    }

    /// # Errors
    /// `Config` if no transform binary is configured.
    pub fn build_transform_stage(&self) -> CoreResult<TransformStage> {
        let bin = self.transform.binary.as_ref().ok_or_else(|| {
            CoreError::Config(format!(
                "no transform binary configured (set transform.binary or {})",
                env_vars::TRANSFORM_BIN
            ))
        })?;
        Ok(TransformStage::new(ExternalTool::new(TRANSFORM_LABEL, bin), &self.artifact_dir)
            .with_output_name(&self.transform.output_name)
            .with_supervisor(self.supervisor()))
    }
}
