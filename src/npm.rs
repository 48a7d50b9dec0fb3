//! Package manager command lines.
//!
//! Commands are spawned in the project root with the user's terminal as
//! stdio and are not awaited: the manifest watcher is the only completion
//! signal.

use std::io;
use std::path::Path;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::{Child, Command};

use crate::manifest::DependencyKind;

pub const DEFAULT_PROGRAM: &str = "npm";

#[derive(Debug, Error)]
pub enum NpmError {
    #[error("Invalid package name: {0:?}")]
    InvalidName(String),

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// A package manager executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManager {
    program: String,
}

impl Default for PackageManager {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl PackageManager {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// `install <name> --save|--save-dev`
    pub fn install_args(name: &str, kind: DependencyKind) -> Result<Vec<String>, NpmError> {
        validate_name(name)?;
        Ok(vec![
            "install".to_string(),
            name.to_string(),
            kind.save_flag().to_string(),
        ])
    }

    /// `uninstall <name>`
    pub fn uninstall_args(name: &str) -> Result<Vec<String>, NpmError> {
        validate_name(name)?;
        Ok(vec!["uninstall".to_string(), name.to_string()])
    }

    /// Start the package manager in `cwd`. The child is detached from the
    /// caller: its exit status is never collected here.
    pub fn dispatch(&self, cwd: &Path, args: &[String]) -> Result<Child, NpmError> {
        tracing::info!(program = %self.program, ?args, cwd = %cwd.display(), "Dispatching package manager");

        Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| NpmError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

/// Names are passed as separate arguments, never through a shell; rejecting a
/// leading `-` keeps a name from being read as an option.
fn validate_name(name: &str) -> Result<(), NpmError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') || trimmed != name {
        return Err(NpmError::InvalidName(name.to_string()));
    }
    Ok(())
}
