// Process supervisor:
// * quick exit-0 process yields a run within one sampling interval
// * a zero sampling interval is clamped instead of spinning
// * non-zero exit carries the code and stderr tail
// * missing executable is a spawn error
// * wall-clock ceiling kills the child
// * peak resident memory is sampled on Linux
// * stdout is drained so chatty helpers cannot deadlock

#[cfg(all(test, unix))]
mod supervisor_tests {
    use std::time::{Duration, Instant};

    use filediff_core::process::{NullProbe, ProbeKind, ProcessSupervisor, SupervisorConfig, SupervisorError};
    use filediff_core::{CoreError, ProcessFailure};

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------
    fn supervisor(timeout_secs: Option<u64>) -> ProcessSupervisor {
        ProcessSupervisor::new(SupervisorConfig {
            sampling_interval_ms: 10,
            timeout_secs,
            ..SupervisorConfig::default()
        })
    }

    fn sh(script: &str) -> [String; 2] {
        ["-c".to_string(), script.to_string()]
    }

    // ------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------
    #[test]
    fn fast_exit_zero_is_success() {
        let sup = ProcessSupervisor::new(SupervisorConfig {
            sampling_interval_ms: 500,
            timeout_secs: Some(30),
            ..SupervisorConfig::default()
        });
        let started = Instant::now();
        let run = sup.run("/bin/sh", &sh("exit 0")).unwrap();

        // At most one tick is waited out after the child has gone.
        assert!(started.elapsed() < Duration::from_millis(1_000), "took {:?}", started.elapsed());
        assert!(run.success());
        assert_eq!(run.exit_code, Some(0));
        assert!(run.pid > 0);
        assert_eq!(run.program, "/bin/sh");
    }

    #[test]
    fn nonzero_exit_reports_code_and_stderr() {
        let err = supervisor(Some(30))
            .run("/bin/sh", &sh("echo boom >&2; exit 3"))
            .unwrap_err();

        match err {
            SupervisorError::Exited { run } => {
                assert_eq!(run.exit_code, Some(3));
                assert_eq!(run.stderr_lossy(), "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nonzero_exit_maps_to_process_failure() {
        let err: CoreError = supervisor(Some(30)).run("/bin/sh", &sh("exit 7")).unwrap_err().into();

        assert!(matches!(
            err,
            CoreError::Process { failure: ProcessFailure::ExitCode(7), .. }
        ));
    }

    #[test]
    fn missing_executable_is_spawn_error() {
        let args: [&str; 0] = [];
        let err = supervisor(Some(30))
            .run("/definitely/not/a/real/binary", &args)
            .unwrap_err();

        assert!(matches!(err, SupervisorError::Spawn { .. }));
        assert!(matches!(CoreError::from(err), CoreError::Spawn { .. }));
    }

    #[test]
    fn timeout_kills_the_child() {
        let started = Instant::now();
        let err = supervisor(Some(1))
            .run("/bin/sh", &sh("exec sleep 30"))
            .unwrap_err();

        assert!(matches!(err, SupervisorError::TimedOut { limit, .. } if limit == Duration::from_secs(1)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn large_stdout_does_not_block_the_child() {
        // ~1 MiB of output, well past a pipe buffer.
        let run = supervisor(Some(30))
            .run("/bin/sh", &sh("i=0; while [ $i -lt 16384 ]; do echo 0123456789012345678901234567890123456789012345678901234567890; i=$((i+1)); done"))
            .unwrap();

        assert!(run.success());
        assert!(!run.stdout_tail.is_empty());
        assert!(run.stdout_tail.len() <= SupervisorConfig::default().output_tail_bytes);
    }

    #[test]
    fn zero_sampling_interval_is_clamped() {
        let config = SupervisorConfig {
            sampling_interval_ms: 0,
            timeout_secs: Some(30),
            ..SupervisorConfig::default()
        };
        assert_eq!(config.sampling_interval(), Duration::from_millis(1));

        let mut probe = NullProbe;
        let run = ProcessSupervisor::new(config)
            .run_with_probe("/bin/sh", &sh("sleep 0.2"), &mut probe)
            .unwrap();

        // One attempt per millisecond at most, plus slack for scheduling.
        assert!(run.sample_misses < 1_000, "{} sample attempts in 200ms", run.sample_misses);
    }

    #[test]
    fn disabled_probe_reports_zero_peak() {
        let mut probe = NullProbe;
        let run = supervisor(Some(30))
            .run_with_probe("/bin/sh", &sh("sleep 0.2"), &mut probe)
            .unwrap();

        assert_eq!(run.peak_rss_kb, 0);
        assert_eq!(run.samples, 0);
        assert!(run.sample_misses > 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn procfs_probe_observes_resident_memory() {
        let sup = ProcessSupervisor::new(SupervisorConfig {
            sampling_interval_ms: 10,
            timeout_secs: Some(30),
            probe: ProbeKind::Procfs,
            ..SupervisorConfig::default()
        });
        let run = sup.run("/bin/sh", &sh("sleep 0.5")).unwrap();

        assert!(run.samples > 0);
        assert!(run.peak_rss_kb > 0);
        assert!(run.peak_memory_mb() > 0.0);
    }
}
