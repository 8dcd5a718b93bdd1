// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! External process execution.
//!
//! The core only depends on the [`CommandRunner`] contract: run a program
//! with arguments, capture stdout, stderr and the exit status. The default
//! [`TokioCommandRunner`] spawns a real child process; tests substitute a
//! scripted runner.

use std::fmt;
use std::future::Future;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::CommandError;

/// A program and its arguments.
///
/// # Examples
///
/// ```
/// use ddc_brightness::device::Invocation;
///
/// let inv = Invocation::new("ddcutil").arg("setvcp").arg("0x10").arg("75");
/// assert_eq!(inv.to_string(), "ddcutil setvcp 0x10 75");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    /// Creates an invocation of `program` without arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, `None` if terminated by a signal.
    pub code: Option<i32>,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// Creates a successful output with the given stdout.
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Creates a failed output with the given exit code and stderr.
    #[must_use]
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Returns `true` if the process exited with status 0.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Converts a non-zero exit into `CommandError::Failed`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Failed` unless the exit status was 0.
    pub fn into_result(self, program: &str) -> Result<Self, CommandError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(CommandError::Failed {
            program: program.to_string(),
            code: self.code,
            stderr: self.stderr.trim().to_string(),
        })
    }
}

/// Runs external programs.
///
/// Implementations must be shareable across tasks; each device apply runs
/// on its own task.
pub trait CommandRunner: Send + Sync + 'static {
    /// Runs `invocation` to completion and captures its output.
    ///
    /// A non-zero exit is reported through [`CommandOutput::code`], not as
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Spawn` if the process could not be started.
    fn run(
        &self,
        invocation: Invocation,
    ) -> impl Future<Output = Result<CommandOutput, CommandError>> + Send;
}

/// Runs programs as child processes on the Tokio runtime.
///
/// Children are killed when their future is dropped, so a timeout around
/// [`CommandRunner::run`] does not leak processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    /// Creates a new runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, invocation: Invocation) -> Result<CommandOutput, CommandError> {
        tracing::trace!(command = %invocation, "Spawning process");
        let output = Command::new(invocation.program())
            .args(invocation.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CommandError::Spawn {
                program: invocation.program().to_string(),
                message: e.to_string(),
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
