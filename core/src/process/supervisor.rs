//! process/supervisor.rs
//! Spawn an external executable, sample its resident memory until it exits,
//! and report exit status plus peak memory.

use std::ffi::OsStr;
use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossbeam::channel::tick;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_OUTPUT_TAIL_BYTES, DEFAULT_PROCESS_TIMEOUT, DEFAULT_SAMPLING_INTERVAL};
use crate::process::drain::spawn_drainer;
use crate::process::probe::{MemoryProbe, ProbeKind};
use crate::utils::kib_to_mib;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Waiting on the child or wiring its streams failed after spawn.
    #[error("failed supervising {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The child exited unsuccessfully; the run telemetry is still attached.
    #[error("{} exited with status {:?}", .run.program, .run.exit_code)]
    Exited { run: Box<ProcessRun> },

    #[error("{program} exceeded {}s wall-clock limit", .limit.as_secs())]
    TimedOut {
        program: String,
        limit: Duration,
        peak_rss_kb: u64,
    },
}

const MIN_SAMPLING_INTERVAL_MS: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    pub sampling_interval_ms: u64,
    /// `None` disables the wall-clock ceiling.
    pub timeout_secs: Option<u64>,
    /// Bytes of stdout/stderr kept per stream.
    pub output_tail_bytes: usize,
    pub probe: ProbeKind,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            sampling_interval_ms: DEFAULT_SAMPLING_INTERVAL.as_millis() as u64,
            timeout_secs: Some(DEFAULT_PROCESS_TIMEOUT.as_secs()),
            output_tail_bytes: DEFAULT_OUTPUT_TAIL_BYTES,
            probe: ProbeKind::Auto,
        }
    }
}

impl SupervisorConfig {
    /// Never below 1 ms; a zero tick would spin the sampling loop.
    pub fn sampling_interval(&self) -> Duration {
        Duration::from_millis(self.sampling_interval_ms.max(MIN_SAMPLING_INTERVAL_MS))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// One finished invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRun {
    pub program: String,
    pub args: Vec<String>,
    pub pid: u32,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Highest resident-memory reading in KiB; 0 if none was ever obtained.
    pub peak_rss_kb: u64,
    pub samples: u32,
    pub sample_misses: u32,
    pub elapsed: Duration,
    pub started_at: DateTime<Utc>,
    #[serde(skip)]
    pub stdout_tail: Vec<u8>,
    #[serde(skip)]
    pub stderr_tail: Vec<u8>,
}

impl ProcessRun {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn peak_memory_mb(&self) -> f64 {
        kib_to_mib(self.peak_rss_kb)
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr_tail).trim_end().to_string()
    }
}

/// Kills and reaps the child on drop unless it was already reaped.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        let status = self.child.try_wait()?;
        if status.is_some() {
            self.reaped = true;
        }
        Ok(status)
    }

    fn kill_and_reap(&mut self) {
        if self.reaped {
            return;
        }
        if let Err(e) = self.child.kill() {
            tracing::debug!(pid = self.child.id(), error = %e, "kill failed");
        }
        let _ = self.child.wait();
        self.reaped = true;
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.kill_and_reap();
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessSupervisor {
    config: SupervisorConfig,
}

impl ProcessSupervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self { config }
    }

    /// Run `program` to completion with a fresh probe of the configured kind.
    ///
    /// Blocks the calling thread for the lifetime of the child.
    ///
    /// # Errors
    /// - `Spawn` if the executable cannot be started (nothing is left running)
    /// - `Exited` on a non-zero or signal exit
    /// - `TimedOut` if the wall-clock ceiling is hit (the child is killed)
    pub fn run<P, S>(&self, program: P, args: &[S]) -> Result<ProcessRun, SupervisorError>
    where
        P: AsRef<OsStr>,
        S: AsRef<OsStr>,
    {
        let mut probe = self.config.probe.build();
        self.run_with_probe(program, args, probe.as_mut())
    }

    pub fn run_with_probe<P, S>(
        &self,
        program: P,
        args: &[S],
        probe: &mut dyn MemoryProbe,
    ) -> Result<ProcessRun, SupervisorError>
    where
        P: AsRef<OsStr>,
        S: AsRef<OsStr>,
    {
        let program = program.as_ref();
        let program_name = program.to_string_lossy().into_owned();
        let arg_names: Vec<String> = args
            .iter()
            .map(|a| a.as_ref().to_string_lossy().into_owned())
            .collect();

        let started_at = Utc::now();
        let start = Instant::now();

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SupervisorError::Spawn {
                program: program_name.clone(),
                source,
            })?;
        let pid = child.id();
        let mut guard = ChildGuard { child, reaped: false };

        tracing::info!(program = %program_name, pid, probe = probe.name(), "process spawned");

        // Helpers take no input; closing stdin gives them EOF.
        drop(guard.child.stdin.take());

        let limit = self.config.output_tail_bytes;
        let io_err = |source: io::Error| SupervisorError::Io {
            program: program_name.clone(),
            source,
        };
        let stdout = match guard.child.stdout.take() {
            Some(s) => Some(spawn_drainer(format!("stdout-{pid}"), s, limit).map_err(io_err)?),
            None => None,
        };
        let stderr = match guard.child.stderr.take() {
            Some(s) => Some(spawn_drainer(format!("stderr-{pid}"), s, limit).map_err(io_err)?),
            None => None,
        };

        let ticker = tick(self.config.sampling_interval());
        let timeout = self.config.timeout();
        let mut peak_rss_kb = 0u64;
        let mut samples = 0u32;
        let mut sample_misses = 0u32;

        let status = loop {
            if let Some(status) = guard.try_wait().map_err(io_err)? {
                break status;
            }

            match probe.resident_kb(pid) {
                Some(kb) => {
                    samples += 1;
                    peak_rss_kb = peak_rss_kb.max(kb);
                }
                None => {
                    sample_misses += 1;
                    tracing::trace!(pid, "memory sample unavailable");
                }
            }

            if let Some(limit) = timeout {
                if start.elapsed() >= limit {
                    guard.kill_and_reap();
                    // Drainers finish on their own once the pipes close.
                    drop(stdout);
                    drop(stderr);
                    tracing::warn!(
                        program = %program_name,
                        pid,
                        limit_secs = limit.as_secs(),
                        peak_rss_kb,
                        "process killed after exceeding wall-clock limit"
                    );
                    return Err(SupervisorError::TimedOut {
                        program: program_name,
                        limit,
                        peak_rss_kb,
                    });
                }
            }

            // tick() never disconnects
            let _ = ticker.recv();
        };

        let run = ProcessRun {
            program: program_name,
            args: arg_names,
            pid,
            exit_code: status.code(),
            peak_rss_kb,
            samples,
            sample_misses,
            elapsed: start.elapsed(),
            started_at,
            stdout_tail: join_tail(stdout),
            stderr_tail: join_tail(stderr),
        };

        tracing::info!(
            program = %run.program,
            pid,
            exit_code = ?run.exit_code,
            peak_rss_kb = run.peak_rss_kb,
            samples = run.samples,
            elapsed_ms = run.elapsed.as_millis() as u64,
            "process exited"
        );

        if run.success() {
            Ok(run)
        } else {
            Err(SupervisorError::Exited { run: Box::new(run) })
        }
    }
}

fn join_tail(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
