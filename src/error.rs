use std::path::PathBuf;

use thiserror::Error;

use crate::targets::Target;

/// Failure writing a release archive or its checksum.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Failure confined to a single target. Reported, never fatal to the run.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("build failed for {target} (exit code {})", format_exit_code(.exit_code))]
    BuildFailed {
        target: Target,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("packaging failed for {target}: {source}")]
    Archive {
        target: Target,
        #[source]
        source: ArchiveError,
    },
}

impl TargetError {
    pub fn target(&self) -> Target {
        match self {
            TargetError::BuildFailed { target, .. } | TargetError::Archive { target, .. } => {
                *target
            }
        }
    }
}

/// Failure that aborts the whole release run.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("version query failed (exit code {})", format_exit_code(.exit_code))]
    VersionQuery {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("version query printed nothing")]
    EmptyVersion,

    #[error("failed to create releases directory '{}': {source}", .path.display())]
    ReleasesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start build workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

fn format_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}
