//! Invocation of the external build tool

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

use crate::config::ReleaseConfig;
use crate::error::{ReleaseError, TargetError};
use crate::targets::Target;

/// Number of trailing stderr lines kept on a failed invocation
const STDERR_TAIL_LINES: usize = 20;

/// One cross-compile-and-install request for a single target.
#[derive(Debug, Clone)]
pub struct InstallRequest<'a> {
    pub target: Target,
    /// Install prefix; the releases directory
    pub prefix: &'a Path,
    /// Executable directory, relative to `prefix`
    pub exe_dir: &'a str,
}

/// Something that can build zigverm and report its version.
///
/// Implementations must be callable from several worker threads at once.
pub trait Toolchain: Sync {
    /// Cross-compile for `request.target` and install the executables into
    /// `request.prefix/request.exe_dir`.
    fn install(&self, request: &InstallRequest<'_>) -> Result<(), TargetError>;

    /// Build natively and return what `zigverm --version` prints on stdout.
    fn query_version(&self) -> Result<String, ReleaseError>;
}

/// The Zig build system, driven through `zig build`.
#[derive(Debug, Clone)]
pub struct Zig {
    program: String,
    project_root: PathBuf,
    optimize: String,
    native_binary: PathBuf,
}

impl Zig {
    pub fn from_config(config: &ReleaseConfig) -> Self {
        Zig {
            program: config.build_tool.clone(),
            project_root: config.project_root.clone(),
            optimize: config.optimize.clone(),
            native_binary: config.native_binary_path(),
        }
    }

    /// Arguments for `zig` that install one target into `prefix/exe_dir`.
    pub fn install_args(&self, request: &InstallRequest<'_>) -> Vec<String> {
        vec![
            "build".to_string(),
            "install".to_string(),
            "--prefix".to_string(),
            request.prefix.display().to_string(),
            "--prefix-exe-dir".to_string(),
            request.exe_dir.to_string(),
            format!("--release={}", self.optimize),
            format!("-Dtarget={}", request.target.triple()),
        ]
    }

    fn run(&self, command: &mut Command) -> std::io::Result<Output> {
        debug!(?command, "running");
        command.current_dir(&self.project_root).output()
    }
}

impl Toolchain for Zig {
    fn install(&self, request: &InstallRequest<'_>) -> Result<(), TargetError> {
        let output = self
            .run(Command::new(&self.program).args(self.install_args(request)))
            .map_err(|e| TargetError::BuildFailed {
                target: request.target,
                exit_code: None,
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(TargetError::BuildFailed {
                target: request.target,
                exit_code: output.status.code(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        Ok(())
    }

    fn query_version(&self) -> Result<String, ReleaseError> {
        let build = self
            .run(Command::new(&self.program).arg("build"))
            .map_err(|e| ReleaseError::VersionQuery {
                exit_code: None,
                stderr: e.to_string(),
            })?;

        if !build.status.success() {
            return Err(ReleaseError::VersionQuery {
                exit_code: build.status.code(),
                stderr: stderr_tail(&build.stderr),
            });
        }

        let query = self
            .run(Command::new(&self.native_binary).arg("--version"))
            .map_err(|e| ReleaseError::VersionQuery {
                exit_code: None,
                stderr: e.to_string(),
            })?;

        if !query.status.success() {
            return Err(ReleaseError::VersionQuery {
                exit_code: query.status.code(),
                stderr: stderr_tail(&query.stderr),
            });
        }

        Ok(String::from_utf8_lossy(&query.stdout).into_owned())
    }
}

/// Last few lines of a captured stderr stream
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
