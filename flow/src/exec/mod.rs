//! Subprocess execution.
//!
//! Stage runners never spawn processes themselves; they describe a
//! [`ToolCommand`] and hand it to an [`Executor`].

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use arcstr::ArcStr;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{with_err_context, ErrorContext, Result};
use crate::io;
use crate::log::info;

/// A fully-formed external tool invocation.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_owned()));
        self
    }

    #[inline]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[inline]
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// The file name of the program, used to identify the tool in logs and
    /// when scripting exit codes.
    pub fn program_name(&self) -> ArcStr {
        let name = self
            .program
            .file_name()
            .unwrap_or(self.program.as_os_str());
        ArcStr::from(&*name.to_string_lossy())
    }
}

/// Prints the command the way a user would type it.
impl Display for ToolCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.display())?;
        if !self.args.is_empty() {
            write!(
                f,
                " {}",
                self.args.iter().map(|arg| arg.to_string_lossy()).join(" ")
            )?;
        }
        Ok(())
    }
}

/// How an external tool terminated.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ToolExit {
    code: Option<i32>,
}

impl ToolExit {
    pub const SUCCESS: ToolExit = ToolExit { code: Some(0) };

    /// A `None` code means the process was terminated by a signal.
    #[inline]
    pub fn from_code(code: Option<i32>) -> Self {
        Self { code }
    }

    #[inline]
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    #[inline]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ToolExit {
    fn from(value: std::process::ExitStatus) -> Self {
        Self {
            code: value.code(),
        }
    }
}

impl Display for ToolExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "retcode: {code}"),
            None => write!(f, "no retcode, terminated by signal"),
        }
    }
}

/// Runs external tools to completion.
pub trait Executor {
    /// Runs `cmd` in the current working directory and waits for it to exit.
    ///
    /// Returns `Err` only if the tool could not be run at all; a tool that ran
    /// and failed is reported through the returned [`ToolExit`].
    fn execute(&self, cmd: &ToolCommand) -> Result<ToolExit>;
}

/// Spawns real subprocesses, inheriting stdio.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&self, cmd: &ToolCommand) -> Result<ToolExit> {
        let status = with_err_context(
            Command::new(&cmd.program).args(&cmd.args).status(),
            || ErrorContext::Spawn(cmd.program.clone()),
        )?;
        Ok(status.into())
    }
}

/// A single call observed by a [`RecordingExecutor`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    pub command: ToolCommand,
    /// The working directory at the time of the call.
    pub cwd: PathBuf,
}

/// Records commands instead of running them.
///
/// Every command succeeds unless an exit code was scripted for its program
/// name with [`RecordingExecutor::with_exit`]. Backs `--dry-run`.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    exits: HashMap<ArcStr, i32>,
    invocations: Mutex<Vec<Invocation>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every command whose program file name is `program` exit with
    /// `code`.
    pub fn with_exit(mut self, program: impl Into<ArcStr>, code: i32) -> Self {
        self.exits.insert(program.into(), code);
        self
    }

    /// All invocations so far, in call order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Program file names of all invocations so far, in call order.
    pub fn programs(&self) -> Vec<ArcStr> {
        self.invocations()
            .iter()
            .map(|call| call.command.program_name())
            .collect()
    }
}

impl Executor for RecordingExecutor {
    fn execute(&self, cmd: &ToolCommand) -> Result<ToolExit> {
        let cwd = io::current_dir()?;
        info!("dry run: not executing `{cmd}` in {cwd:?}");
        let code = self.exits.get(&cmd.program_name()).copied().unwrap_or(0);
        let call = Invocation {
            command: cmd.clone(),
            cwd,
        };
        match self.invocations.lock() {
            Ok(mut calls) => calls.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }
        Ok(ToolExit::from_code(Some(code)))
    }
}
