//! process/probe.rs
//! Per-process resident-memory readouts.
//!
//! A probe answers one question: "resident KiB for this pid, or none". It
//! never fails loudly; a process that exited between the liveness check and
//! the read simply yields `None`.

use std::fs;

use serde::{Deserialize, Serialize};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

pub trait MemoryProbe: Send {
    /// Resident memory in KiB, or `None` if unavailable right now.
    fn resident_kb(&mut self, pid: u32) -> Option<u64>;

    fn name(&self) -> &'static str;
}

/// Which probe a supervisor builds for each run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// procfs on Linux, sysinfo where supported, otherwise disabled.
    #[default]
    Auto,
    Procfs,
    Sysinfo,
    Disabled,
}

impl ProbeKind {
    pub fn build(self) -> Box<dyn MemoryProbe> {
        match self.resolve() {
            ProbeKind::Procfs => Box::new(ProcfsProbe),
            ProbeKind::Sysinfo => Box::new(SysinfoProbe::new()),
            _ => Box::new(NullProbe),
        }
    }

    /// Concrete kind `Auto` maps to on this platform.
    pub fn resolve(self) -> ProbeKind {
        match self {
            ProbeKind::Auto if cfg!(target_os = "linux") => ProbeKind::Procfs,
            ProbeKind::Auto if sysinfo::IS_SUPPORTED_SYSTEM => ProbeKind::Sysinfo,
            ProbeKind::Auto => ProbeKind::Disabled,
            other => other,
        }
    }
}

// ============================================================
// procfs
// ============================================================

/// Reads `/proc/<pid>/status`.
///
/// Prefers `VmHWM` (kernel-tracked high-water mark) over `VmRSS`, so a spike
/// between two samples is still observed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcfsProbe;

impl MemoryProbe for ProcfsProbe {
    fn resident_kb(&mut self, pid: u32) -> Option<u64> {
        let status = fs::read_to_string(format!("/proc/{}/status", pid)).ok()?;
        parse_status_kb(&status, "VmHWM:").or_else(|| parse_status_kb(&status, "VmRSS:"))
    }

    fn name(&self) -> &'static str {
        "procfs"
    }
}

/// Extract `<key>   1234 kB` from a procfs status document.
pub fn parse_status_kb(status: &str, key: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix(key))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
}

// ============================================================
// sysinfo
// ============================================================

/// Portable probe backed by the `sysinfo` crate.
pub struct SysinfoProbe {
    system: System,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        Self { system: System::new() }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SysinfoProbe {
    fn resident_kb(&mut self, pid: u32) -> Option<u64> {
        let pid = Pid::from_u32(pid);
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        // sysinfo reports bytes
        self.system
            .process(pid)
            .map(|p| p.memory() / 1024)
            .filter(|kb| *kb > 0)
    }

    fn name(&self) -> &'static str {
        "sysinfo"
    }
}

// ============================================================
// disabled
// ============================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct NullProbe;

impl MemoryProbe for NullProbe {
    fn resident_kb(&mut self, _pid: u32) -> Option<u64> {
        None
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
