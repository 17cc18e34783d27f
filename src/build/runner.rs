//! Process invocation abstraction.
//!
//! Build steps go through [`CommandRunner`] so the orchestrator only sees a
//! structured [`Completion`], never a raw exit code, and tests can swap in a
//! fake.

use std::path::PathBuf;
use std::process::{Command, Stdio};

/// A fully resolved process to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl Invocation {
    /// The command line as typed, for logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStatus {
    Success,
    /// Exited unsuccessfully; `code` is `None` when killed by a signal.
    Failed { code: Option<i32> },
    /// The process could not be started at all.
    Spawn { message: String },
}

/// Result of running one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub status: CompletionStatus,
    /// Captured stdout; empty when output was streamed to the terminal.
    pub stdout: String,
    /// Captured stderr; empty when output was streamed to the terminal.
    pub stderr: String,
}

impl Completion {
    pub fn spawn_error(message: impl Into<String>) -> Self {
        Self {
            status: CompletionStatus::Spawn {
                message: message.into(),
            },
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CompletionStatus::Success
    }
}

/// Runs invocations synchronously, one at a time.
pub trait CommandRunner {
    fn run(&mut self, invocation: &Invocation) -> Completion;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, invocation: &Invocation) -> Completion {
        (**self).run(invocation)
    }
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemRunner {
    capture: bool,
}

impl SystemRunner {
    /// Child output goes straight to this process's stderr. Both child
    /// streams land there so stdout carries only command results.
    pub fn streaming() -> Self {
        Self { capture: false }
    }

    /// Child output is captured into the [`Completion`].
    pub fn capturing() -> Self {
        Self { capture: true }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Completion {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null());

        if self.capture {
            match command.output() {
                Ok(output) => Completion {
                    status: status_of(output.status),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                },
                Err(e) => Completion::spawn_error(e.to_string()),
            }
        } else {
            command.stdout(Stdio::from(std::io::stderr()));
            match command.status() {
                Ok(status) => Completion {
                    status: status_of(status),
                    stdout: String::new(),
                    stderr: String::new(),
                },
                Err(e) => Completion::spawn_error(e.to_string()),
            }
        }
    }
}

fn status_of(status: std::process::ExitStatus) -> CompletionStatus {
    if status.success() {
        CompletionStatus::Success
    } else {
        CompletionStatus::Failed {
            code: status.code(),
        }
    }
}
