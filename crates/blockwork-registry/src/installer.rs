//! External package installation.

use std::process::Command;

use blockwork_core::{BlockError, BlockResult};
use tracing::{error, info};

/// Makes an external package available to the host process.
pub trait PackageInstaller {
    /// Install one requirement.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::InstallFailure`] if the package could not be installed.
    fn install(&self, requirement: &str) -> BlockResult<()>;
}

/// Installs requirements by running `<command...> <requirement>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInstaller {
    command: Vec<String>,
}

impl CommandInstaller {
    /// Installer for a command line such as `["pip", "install"]`.
    #[must_use]
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    /// The command line, without the requirement.
    #[must_use]
    pub fn command(&self) -> &[String] {
        &self.command
    }
}

impl Default for CommandInstaller {
    fn default() -> Self {
        Self::new(vec!["pip".into(), "install".into()])
    }
}

impl PackageInstaller for CommandInstaller {
    fn install(&self, requirement: &str) -> BlockResult<()> {
        let failure = |message: String| BlockError::InstallFailure {
            requirement: requirement.to_string(),
            message,
        };

        let Some((program, args)) = self.command.split_first() else {
            return Err(failure("install command is empty".into()));
        };
        let binary = which::which(program)
            .map_err(|e| failure(format!("{program} not found in PATH: {e}")))?;

        info!(requirement, program = %binary.display(), "Installing requirement");
        let output = Command::new(&binary)
            .args(args)
            .arg(requirement)
            .output()
            .map_err(|e| failure(format!("failed to run {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(requirement, status = %output.status, "Requirement install failed");
            return Err(failure(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}
