use std::fmt::{Debug, Display};
use std::path::PathBuf;

use arcstr::ArcStr;
use thiserror::Error;

use crate::exec::ToolExit;
use crate::stage::Stage;

pub type Result<T> = std::result::Result<T, FlowError>;

pub struct FlowError {
    pub(crate) source: ErrorSource,
    pub(crate) context: Vec<ErrorContext>,
}

impl FlowError {
    pub fn source(&self) -> &ErrorSource {
        &self.source
    }

    pub fn context(&self) -> &[ErrorContext] {
        &self.context
    }

    /// The process exit code that should be reported for this error.
    ///
    /// Stage failures propagate the tool's own return code when it is a valid
    /// non-zero exit status; everything else exits with `1`.
    pub fn exit_code(&self) -> u8 {
        match &self.source {
            ErrorSource::StageFailed { status, .. } => status
                .code()
                .and_then(|code| u8::try_from(code).ok())
                .filter(|&code| code != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl Display for FlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)?;
        for item in self.context.iter() {
            write!(f, "\n\twhile {}", item)?;
        }
        Ok(())
    }
}

impl Debug for FlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.source)?;
        if !self.context.is_empty() {
            writeln!(f, "\nError occurred:")?;
            for (i, item) in self.context.iter().enumerate() {
                writeln!(f, "\t{}: {:?}", i, item)?;
            }
        }
        Ok(())
    }
}

impl<T> From<T> for FlowError
where
    T: Into<ErrorSource>,
{
    fn from(value: T) -> Self {
        Self {
            source: value.into(),
            context: Vec::new(),
        }
    }
}

impl FlowError {
    pub fn new(source: impl Into<ErrorSource>) -> Self {
        Self {
            source: source.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<ErrorContext>) -> Self {
        self.context.push(ctx.into());
        self
    }

    #[inline]
    pub fn into_inner(self) -> ErrorSource {
        self.source
    }
}

#[inline]
pub fn with_err_context<T, E, C>(result: std::result::Result<T, E>, ctx: C) -> Result<T>
where
    C: FnOnce() -> ErrorContext,
    E: Into<FlowError>,
{
    result.map_err(|err| err.into().with_context(ctx()))
}

#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorContext {
    Stage(Stage),
    Spawn(PathBuf),
    ChangeDir(PathBuf),
    CurrentDir,
    ReadFile(PathBuf),
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stage(stage) => write!(f, "running the {stage} stage"),
            Self::Spawn(program) => write!(f, "launching {program:?}"),
            Self::ChangeDir(path) => write!(f, "changing directory to {path:?}"),
            Self::CurrentDir => write!(f, "querying the current directory"),
            Self::ReadFile(path) => write!(f, "reading file {path:?}"),
        }
    }
}

/// A problem with the user's arguments or environment, detected before any
/// external tool runs.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ConfigError {
    #[error("could not find {tool} directory based on {var} environment variable or command line option")]
    MissingToolDir {
        tool: &'static str,
        var: &'static str,
    },

    #[error("project path {0:?} does not name a file")]
    InvalidProject(PathBuf),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorSource {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{stage} stage failed: {tool} returned {status}")]
    StageFailed {
        stage: Stage,
        tool: ArcStr,
        status: ToolExit,
    },

    #[error("no tool specified for the {0} stage")]
    ToolNotSpecified(Stage),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing TOML: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("error writing TOML: {0}")]
    TomlWriting(#[from] toml::ser::Error),
}
