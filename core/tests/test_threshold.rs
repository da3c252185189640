// Size dispatch:
// * inputs at the threshold stay in-process (helper never runs)
// * one byte over goes to the helper with (a, b, out) arguments
// * helper output is scanned; all-zero output is NoDifference
// * no helper configured is an ExternalTool error
// * missing, signal-killed and timed-out helpers are ExternalTool errors
// * the default 50 MiB boundary, checked with sparse files

#[cfg(all(test, unix))]
mod threshold_tests {
    use std::fs::{self, File};
    use std::path::Path;

    use filediff_core::constants::SIZE_THRESHOLD;
    use filediff_core::diff::{DiffConfig, DiffEngine, DiffRoute, DifferenceArtifact, InputFile, LARGE_DIFF_LABEL};
    use filediff_core::process::{ExternalTool, ProcessSupervisor, SupervisorConfig};
    use filediff_core::telemetry::Stage;
    use filediff_core::CoreError;

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------
    fn input(dir: &Path, name: &str, data: &[u8]) -> InputFile {
        let path = dir.join(name);
        fs::write(&path, data).unwrap();
        InputFile::open(path).unwrap()
    }

    /// Helper that records its argv and writes `output` (printf format) to `$3`.
    fn recording_helper(dir: &Path, output: &str) -> ExternalTool {
        let script = dir.join("large_diff.sh");
        let log = dir.join("helper_args.txt");
        fs::write(
            &script,
            format!("printf '%s\\n' \"$@\" > '{}'\nprintf '{}' > \"$3\"\n", log.display(), output),
        )
        .unwrap();
        ExternalTool::new(LARGE_DIFF_LABEL, "/bin/sh").with_leading_arg(script)
    }

    fn engine(dir: &Path, threshold: u64) -> DiffEngine {
        DiffEngine::new(
            dir.join("artifacts"),
            DiffConfig { size_threshold: threshold, chunk_size: 8 },
        )
        .with_supervisor(ProcessSupervisor::new(SupervisorConfig {
            sampling_interval_ms: 10,
            timeout_secs: Some(30),
            ..SupervisorConfig::default()
        }))
    }

    fn helper_args(dir: &Path) -> Option<Vec<String>> {
        fs::read_to_string(dir.join("helper_args.txt"))
            .ok()
            .map(|s| s.lines().map(str::to_string).collect())
    }

    // ------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------
    #[test]
    fn at_threshold_stays_in_process() {
        let dir = tempfile::tempdir().unwrap();
        let a = input(dir.path(), "a.bin", &[1; 16]);
        let b = input(dir.path(), "b.bin", &[2; 16]);
        let engine = engine(dir.path(), 16).with_large_diff(recording_helper(dir.path(), "\\001"));

        let outcome = engine.diff_with_telemetry(&a, &b).unwrap();

        assert_eq!(outcome.route, DiffRoute::InProcess);
        assert!(helper_args(dir.path()).is_none());
        assert_eq!(fs::read(outcome.artifact.path().unwrap()).unwrap(), vec![3; 16]);
    }

    #[test]
    fn over_threshold_invokes_helper_with_contract_args() {
        let dir = tempfile::tempdir().unwrap();
        let a = input(dir.path(), "a.bin", &[1; 17]);
        let b = input(dir.path(), "b.bin", &[1; 4]);
        let engine = engine(dir.path(), 16).with_large_diff(recording_helper(dir.path(), "\\000\\001"));

        let outcome = engine.diff_with_telemetry(&a, &b).unwrap();

        assert_eq!(outcome.route, DiffRoute::External);
        let expected_out = engine.artifact_path(&a, &b);
        assert_eq!(
            helper_args(dir.path()).unwrap(),
            vec![
                a.path().display().to_string(),
                b.path().display().to_string(),
                expected_out.display().to_string(),
            ]
        );
        assert_eq!(
            outcome.artifact,
            DifferenceArtifact::Produced { path: expected_out, byte_len: 2 }
        );
        assert!(outcome.external.is_some());
        assert!(outcome.stage_times.contains(Stage::LargeDiff));
        assert!(outcome.stage_times.contains(Stage::Verify));
    }

    #[test]
    fn all_zero_helper_output_is_no_difference() {
        let dir = tempfile::tempdir().unwrap();
        let a = input(dir.path(), "a.bin", &[5; 20]);
        let b = input(dir.path(), "b.bin", &[5; 20]);
        let engine = engine(dir.path(), 16).with_large_diff(recording_helper(dir.path(), "\\000\\000\\000"));

        let artifact = engine.diff(&a, &b).unwrap();

        assert_eq!(artifact, DifferenceArtifact::NoDifference);
        assert!(!engine.artifact_path(&a, &b).exists());
    }

    #[test]
    fn failing_helper_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let a = input(dir.path(), "a.bin", &[5; 20]);
        let b = input(dir.path(), "b.bin", &[6; 20]);
        let script = dir.path().join("broken.sh");
        fs::write(&script, "printf 'x' > \"$3\"\nexit 4\n").unwrap();
        let engine = engine(dir.path(), 16)
            .with_large_diff(ExternalTool::new(LARGE_DIFF_LABEL, "/bin/sh").with_leading_arg(script));

        let err = engine.diff(&a, &b).unwrap_err();

        assert!(matches!(err, CoreError::ExternalTool { ref tool, .. } if tool == LARGE_DIFF_LABEL));
        assert!(!engine.artifact_path(&a, &b).exists());
    }

    #[test]
    fn missing_helper_binary_is_external_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = input(dir.path(), "a.bin", &[5; 20]);
        let b = input(dir.path(), "b.bin", &[6; 20]);
        let engine = engine(dir.path(), 16)
            .with_large_diff(ExternalTool::new(LARGE_DIFF_LABEL, dir.path().join("no_such_file_diff")));

        let err = engine.diff(&a, &b).unwrap_err();

        assert!(matches!(err, CoreError::ExternalTool { ref tool, .. } if tool == LARGE_DIFF_LABEL));
        assert!(!engine.artifact_path(&a, &b).exists());
    }

    #[test]
    fn signal_killed_helper_is_external_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = input(dir.path(), "a.bin", &[5; 20]);
        let b = input(dir.path(), "b.bin", &[6; 20]);
        let script = dir.path().join("crash.sh");
        fs::write(&script, "printf 'x' > \"$3\"\nkill -9 $$\n").unwrap();
        let engine = engine(dir.path(), 16)
            .with_large_diff(ExternalTool::new(LARGE_DIFF_LABEL, "/bin/sh").with_leading_arg(script));

        let err = engine.diff(&a, &b).unwrap_err();

        assert!(matches!(err, CoreError::ExternalTool { ref tool, .. } if tool == LARGE_DIFF_LABEL));
        assert!(!engine.artifact_path(&a, &b).exists());
    }

    #[test]
    fn timed_out_helper_is_external_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = input(dir.path(), "a.bin", &[5; 20]);
        let b = input(dir.path(), "b.bin", &[6; 20]);
        let script = dir.path().join("hang.sh");
        fs::write(&script, "exec sleep 30\n").unwrap();
        let engine = engine(dir.path(), 16)
            .with_supervisor(ProcessSupervisor::new(SupervisorConfig {
                sampling_interval_ms: 10,
                timeout_secs: Some(1),
                ..SupervisorConfig::default()
            }))
            .with_large_diff(ExternalTool::new(LARGE_DIFF_LABEL, "/bin/sh").with_leading_arg(script));

        let err = engine.diff(&a, &b).unwrap_err();

        assert!(matches!(err, CoreError::ExternalTool { ref tool, .. } if tool == LARGE_DIFF_LABEL));
    }

    #[test]
    fn over_threshold_without_helper_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = input(dir.path(), "a.bin", &[5; 20]);
        let b = input(dir.path(), "b.bin", &[6; 2]);

        let err = engine(dir.path(), 16).diff(&a, &b).unwrap_err();

        assert!(matches!(err, CoreError::ExternalTool { .. }));
    }

    #[test]
    fn default_threshold_boundary_with_sparse_files() {
        let dir = tempfile::tempdir().unwrap();
        let sparse = |name: &str, len: u64| {
            let path = dir.path().join(name);
            File::create(&path).unwrap().set_len(len).unwrap();
            InputFile::open(path).unwrap()
        };
        let engine = DiffEngine::new(dir.path().join("artifacts"), DiffConfig::default());

        let at = sparse("at.bin", SIZE_THRESHOLD);
        let small = sparse("small.bin", 1);
        let over = sparse("over.bin", SIZE_THRESHOLD + 1);

        assert_eq!(engine.route_for(&at, &small), DiffRoute::InProcess);
        assert_eq!(engine.route_for(&small, &over), DiffRoute::External);
        assert_eq!(engine.route_for(&over, &at), DiffRoute::External);
    }
}
