//! pipeline.rs
//! Resolver, diff engine and transform stage wired into the two user-facing
//! operations: compare, and compare-then-transform.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diff::{DiffEngine, DiffRoute, DifferenceArtifact, InputFile};
use crate::telemetry::{Stage, TelemetrySnapshot, TelemetryTimer};
use crate::transform::{TransformResult, TransformStage};
use crate::types::{CoreError, CoreResult};

/// Turns a user-supplied location into a local, readable [`InputFile`].
pub trait PathResolver {
    fn resolve(&self, raw: &str) -> CoreResult<InputFile>;
}

/// Local filesystem only; remote URLs are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileResolver;

impl PathResolver for LocalFileResolver {
    fn resolve(&self, raw: &str) -> CoreResult<InputFile> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CoreError::InputMissing("both file paths must be provided".into()));
        }
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Err(CoreError::InputMissing(format!(
                "remote inputs are not supported: {}",
                raw
            )));
        }

        // Any stat or open failure is reported as an input problem.
        let unusable = |source: io::Error| {
            CoreError::InputMissing(format!("file does not exist or cannot be read: {} ({})", raw, source))
        };
        let path = Path::new(raw);
        let input = InputFile::open(path).map_err(|e| match e {
            CoreError::Io { source, .. } => unusable(source),
            other => other,
        })?;
        File::open(path).map_err(unusable)?;
        Ok(input)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffReport {
    pub artifact: DifferenceArtifact,
    pub route: DiffRoute,
    pub telemetry: TelemetrySnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformReport {
    pub artifact: DifferenceArtifact,
    pub route: DiffRoute,
    pub result: TransformResult,
    pub telemetry: TelemetrySnapshot,
}

pub struct Pipeline<R = LocalFileResolver> {
    resolver: R,
    engine: DiffEngine,
    transform: Option<TransformStage>,
}

impl Pipeline<LocalFileResolver> {
    pub fn new(engine: DiffEngine) -> Self {
        Self::with_resolver(LocalFileResolver, engine)
    }
}

impl<R: PathResolver> Pipeline<R> {
    pub fn with_resolver(resolver: R, engine: DiffEngine) -> Self {
        Self {
            resolver,
            engine,
            transform: None,
        }
    }

    pub fn with_transform(mut self, stage: TransformStage) -> Self {
        self.transform = Some(stage);
        self
    }

    pub fn compare(&self, a: &str, b: &str) -> CoreResult<DiffReport> {
        let mut timer = TelemetryTimer::new();
        let (artifact, route, mut telemetry) = self.run_diff(&mut timer, a, b)?;
        timer.finish();
        telemetry.elapsed = timer.elapsed();
        Ok(DiffReport { artifact, route, telemetry })
    }

    /// Compare, then transform the artifact.
    ///
    /// # Errors
    /// `InputMissing` when the inputs do not differ; `Config` if no transform
    /// stage is attached. Both are checked without spawning anything.
    pub fn compare_and_transform(&self, a: &str, b: &str) -> CoreResult<TransformReport> {
        let stage = self
            .transform
            .as_ref()
            .ok_or_else(|| CoreError::Config("no transform stage configured".into()))?;

        let mut timer = TelemetryTimer::new();
        let (artifact, route, mut telemetry) = self.run_diff(&mut timer, a, b)?;
        let result = timer.time(Stage::Transform, || stage.transform(&artifact))?;
        timer.finish();

        telemetry.record_external(&result.run);
        telemetry.stage_times = timer.stage_times.clone();
        telemetry.elapsed = timer.elapsed();

        Ok(TransformReport {
            artifact,
            route,
            result,
            telemetry,
        })
    }

    fn run_diff(
        &self,
        timer: &mut TelemetryTimer,
        a: &str,
        b: &str,
    ) -> CoreResult<(DifferenceArtifact, DiffRoute, TelemetrySnapshot)> {
        let (input_a, input_b) = timer.time(Stage::Resolve, || -> CoreResult<_> {
            Ok((self.resolver.resolve(a)?, self.resolver.resolve(b)?))
        })?;

        let outcome = self.engine.diff_with_telemetry(&input_a, &input_b)?;
        timer.stage_times.merge(&outcome.stage_times);

        let mut telemetry = TelemetrySnapshot::from(&outcome.counters, timer);
        if let Some(run) = &outcome.external {
            telemetry.record_external(run);
        }
        Ok((outcome.artifact, outcome.route, telemetry))
    }
}
