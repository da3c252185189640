//! process/tool.rs
//! Opaque native helpers with a fixed positional-argument contract.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::process::supervisor::{ProcessRun, ProcessSupervisor, SupervisorError};
use crate::types::{CoreError, CoreResult};
use crate::utils::{file_len, is_non_empty_file};

/// An external executable plus the label used in errors and logs.
///
/// `leading_args` are placed before the contract arguments, which lets a
/// helper be started through an interpreter (`/bin/sh helper.sh a b out`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    label: String,
    program: PathBuf,
    leading_args: Vec<OsString>,
}

/// A successful invocation: contract satisfied, output present and non-empty.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub output_len: u64,
    pub run: ProcessRun,
}

impl ExternalTool {
    pub fn new(label: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_leading_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    /// Full argv after the program for the given contract arguments.
    pub fn argv(&self, contract: &[&Path]) -> Vec<OsString> {
        self.leading_args
            .iter()
            .cloned()
            .chain(contract.iter().map(|p| p.as_os_str().to_os_string()))
            .collect()
    }

    /// Run the tool and check its success predicate.
    ///
    /// `contract` are the positional arguments; `expected_output` must exist
    /// and be non-empty after a zero exit.
    ///
    /// # Errors
    /// - `Spawn` if the program cannot be started
    /// - `ExternalTool` on non-zero exit or missing/empty output
    /// - `Process` on timeout or signal termination
    pub fn invoke(
        &self,
        supervisor: &ProcessSupervisor,
        contract: &[&Path],
        expected_output: &Path,
    ) -> CoreResult<ToolOutput> {
        let argv = self.argv(contract);
        let run = match supervisor.run(&self.program, argv.as_slice()) {
            Ok(run) => run,
            Err(SupervisorError::Exited { run }) if run.exit_code.is_some() => {
                let mut reason = format!("exited with code {}", run.exit_code.unwrap_or_default());
                let stderr = run.stderr_lossy();
                if !stderr.is_empty() {
                    reason.push_str(": ");
                    reason.push_str(&stderr);
                }
                return Err(CoreError::external_tool(&self.label, reason));
            }
            Err(e) => return Err(e.into()),
        };

        if !is_non_empty_file(expected_output) {
            return Err(CoreError::external_tool(
                &self.label,
                format!(
                    "exited 0 but output {} is missing or empty",
                    expected_output.display()
                ),
            ));
        }

        Ok(ToolOutput {
            output_len: file_len(expected_output).unwrap_or_default(),
            run,
        })
    }
}
