//! IO utilities.

use std::path::{Path, PathBuf};

use crate::error::{with_err_context, ErrorContext, Result};
use crate::log::{error, info};

pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let data = with_err_context(std::fs::read_to_string(path), || {
        ErrorContext::ReadFile(path.to_path_buf())
    })?;
    Ok(data)
}

pub fn current_dir() -> Result<PathBuf> {
    with_err_context(std::env::current_dir(), || ErrorContext::CurrentDir)
}

pub fn set_current_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    with_err_context(std::env::set_current_dir(path), || {
        ErrorContext::ChangeDir(path.to_path_buf())
    })
}

/// A scoped change of the process working directory.
///
/// The previous directory is restored when the guard is dropped, including
/// when the scope is left through an error. Use [`WorkDir::restore`] to
/// observe restoration failures.
#[must_use = "the previous directory is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct WorkDir {
    prev: Option<PathBuf>,
}

impl WorkDir {
    pub fn enter(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let prev = current_dir()?;
        info!("moving to directory {dir:?}");
        set_current_dir(dir)?;
        Ok(Self { prev: Some(prev) })
    }

    pub fn restore(mut self) -> Result<()> {
        match self.prev.take() {
            Some(prev) => {
                info!("moving back to directory {prev:?}");
                set_current_dir(prev)
            }
            None => Ok(()),
        }
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Some(prev) = self.prev.take() {
            info!("moving back to directory {prev:?}");
            if let Err(e) = set_current_dir(&prev) {
                error!("failed to restore working directory: {e}");
            }
        }
    }
}
