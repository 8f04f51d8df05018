use std::fs;
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::archive;
use crate::config::ReleaseConfig;
use crate::error::{ReleaseError, TargetError};
use crate::report;
use crate::targets::{self, Target};
use crate::toolchain::{InstallRequest, Toolchain};
use crate::version;

/// Result of building and packaging one target
#[derive(Debug)]
pub enum BuildOutcome {
    Built {
        target: Target,
        archive: PathBuf,
        sha256: String,
    },
    Failed(TargetError),
}

impl BuildOutcome {
    pub fn target(&self) -> Target {
        match self {
            BuildOutcome::Built { target, .. } => *target,
            BuildOutcome::Failed(e) => e.target(),
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(self, BuildOutcome::Built { .. })
    }
}

/// Per-target outcomes of a release run, in catalog order.
#[derive(Debug)]
pub struct ReleaseSummary {
    pub version: String,
    pub outcomes: Vec<BuildOutcome>,
}

impl ReleaseSummary {
    pub fn built(&self) -> impl Iterator<Item = &BuildOutcome> {
        self.outcomes.iter().filter(|o| o.is_built())
    }

    pub fn failed(&self) -> impl Iterator<Item = &TargetError> {
        self.outcomes.iter().filter_map(|o| match o {
            BuildOutcome::Failed(e) => Some(e),
            BuildOutcome::Built { .. } => None,
        })
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Build and package every catalog target.
///
/// Resolves the version once, then fans out over [`targets::ALL_TARGETS`].
pub fn make_release(
    config: &ReleaseConfig,
    toolchain: &dyn Toolchain,
) -> Result<ReleaseSummary, ReleaseError> {
    let version = version::resolve_version(toolchain)?;
    build_all(config, toolchain, targets::ALL_TARGETS, &version)
}

/// Build and package `target_list` concurrently, one worker per target.
///
/// A failing target is reported and recorded; it never stops the others.
/// Only setup failures (releases directory, worker pool) are returned as errors.
pub fn build_all(
    config: &ReleaseConfig,
    toolchain: &dyn Toolchain,
    target_list: &[Target],
    version: &str,
) -> Result<ReleaseSummary, ReleaseError> {
    // Created once up front so workers never race on it
    let releases = config.releases_path();
    fs::create_dir_all(&releases).map_err(|e| ReleaseError::ReleasesDir {
        path: releases.clone(),
        source: e,
    })?;

    if target_list.is_empty() {
        return Ok(ReleaseSummary {
            version: version.to_string(),
            outcomes: Vec::new(),
        });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(target_list.len())
        .thread_name(|i| format!("release-worker-{}", i))
        .build()?;

    info!(
        version,
        targets = target_list.len(),
        "building release into {}",
        releases.display()
    );

    let outcomes = pool.install(|| {
        target_list
            .par_iter()
            .map(|target| build_one(config, toolchain, target, version))
            .collect()
    });

    Ok(ReleaseSummary {
        version: version.to_string(),
        outcomes,
    })
}

/// Cross-compile one target, then zip and checksum its output directory.
pub fn build_one(
    config: &ReleaseConfig,
    toolchain: &dyn Toolchain,
    target: &Target,
    version: &str,
) -> BuildOutcome {
    let output_dir_name = target.output_dir_name(version);
    info!(triple = %target, "building {}", output_dir_name);

    // Stale artifacts from an earlier run must not outlive a failed rebuild
    let result = archive::remove_release_artifacts(config, &output_dir_name)
        .map_err(|source| TargetError::Archive {
            target: *target,
            source,
        })
        .and_then(|()| install(config, toolchain, target, &output_dir_name))
        .and_then(|()| package(config, target, &output_dir_name));

    match result {
        Ok((archive, sha256)) => {
            info!(triple = %target, sha256 = %sha256, "packaged {}", archive.display());
            BuildOutcome::Built {
                target: *target,
                archive,
                sha256,
            }
        }
        Err(e) => {
            warn!(triple = %target, "{}", e);
            if let TargetError::BuildFailed { stderr, .. } = &e {
                if !stderr.is_empty() {
                    debug!(triple = %target, "build tool stderr:\n{}", stderr);
                }
            }
            report::target_failure(&e);
            BuildOutcome::Failed(e)
        }
    }
}

fn install(
    config: &ReleaseConfig,
    toolchain: &dyn Toolchain,
    target: &Target,
    output_dir_name: &str,
) -> Result<(), TargetError> {
    let prefix = config.releases_path();
    toolchain.install(&InstallRequest {
        target: *target,
        prefix: &prefix,
        exe_dir: output_dir_name,
    })
}

fn package(
    config: &ReleaseConfig,
    target: &Target,
    output_dir_name: &str,
) -> Result<(PathBuf, String), TargetError> {
    let to_target_error = |source| TargetError::Archive {
        target: *target,
        source,
    };

    let archive_path = archive::create_release_archive(config, target, output_dir_name)
        .map_err(to_target_error)?;
    let sha256 = match archive::write_checksum(&archive_path) {
        Ok(sha256) => sha256,
        Err(e) => {
            let _ = archive::remove_release_artifacts(config, output_dir_name);
            return Err(to_target_error(e));
        }
    };

    Ok((archive_path, sha256))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::{LINUX_X86, WINDOWS_X86};
    use tempfile::tempdir;

    /// Writes placeholder executables, or fails for one chosen target.
    struct Stub {
        fail: Option<Target>,
    }

    impl Toolchain for Stub {
        fn install(&self, request: &InstallRequest<'_>) -> Result<(), TargetError> {
            if self.fail == Some(request.target) {
                return Err(TargetError::BuildFailed {
                    target: request.target,
                    exit_code: Some(1),
                    stderr: "error: unsupported target".to_string(),
                });
            }
            let dir = request.prefix.join(request.exe_dir);
            fs::create_dir_all(&dir).unwrap();
            for name in ["zigverm", "zig"] {
                fs::write(dir.join(request.target.executable_name(name)), b"bin").unwrap();
            }
            Ok(())
        }

        fn query_version(&self) -> Result<String, ReleaseError> {
            Ok("0.9.1\n".to_string())
        }
    }

    /// Installs the main executable but not the bundled one.
    struct Incomplete;

    impl Toolchain for Incomplete {
        fn install(&self, request: &InstallRequest<'_>) -> Result<(), TargetError> {
            let dir = request.prefix.join(request.exe_dir);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(request.target.executable_name("zigverm")), b"bin").unwrap();
            Ok(())
        }

        fn query_version(&self) -> Result<String, ReleaseError> {
            Ok("1.0.0".to_string())
        }
    }

    fn project() -> (tempfile::TempDir, ReleaseConfig) {
        let root = tempdir().unwrap();
        fs::write(root.path().join("LICENSE"), b"MIT").unwrap();
        fs::write(root.path().join("README.md"), b"# zigverm").unwrap();
        let config = ReleaseConfig::in_dir(root.path());
        (root, config)
    }

    #[test]
    fn build_one_produces_archive_and_checksum() {
        let (_root, config) = project();
        fs::create_dir_all(config.releases_path()).unwrap();

        let outcome = build_one(&config, &Stub { fail: None }, &LINUX_X86, "0.9.1");

        match outcome {
            BuildOutcome::Built { archive, sha256, .. } => {
                assert_eq!(
                    archive,
                    config.releases_path().join("zigverm-0.9.1-x86-linux.zip")
                );
                assert_eq!(sha256.len(), 64);
                assert!(
                    config
                        .releases_path()
                        .join("zigverm-0.9.1-x86-linux.zip.sha256")
                        .exists()
                );
            }
            BuildOutcome::Failed(e) => panic!("unexpected failure: {}", e),
        }
    }

    #[test]
    fn failed_build_leaves_no_archive() {
        let (_root, config) = project();
        fs::create_dir_all(config.releases_path()).unwrap();
        let stub = Stub {
            fail: Some(WINDOWS_X86),
        };

        let outcome = build_one(&config, &stub, &WINDOWS_X86, "0.9.1");

        assert!(matches!(
            outcome,
            BuildOutcome::Failed(TargetError::BuildFailed {
                exit_code: Some(1),
                ..
            })
        ));
        assert!(
            !config
                .releases_path()
                .join("zigverm-0.9.1-x86-windows.zip")
                .exists()
        );
    }

    #[test]
    fn packaging_failure_leaves_no_archive() {
        let (_root, config) = project();
        fs::create_dir_all(config.releases_path()).unwrap();

        let outcome = build_one(&config, &Incomplete, &LINUX_X86, "1.0.0");

        assert!(matches!(
            outcome,
            BuildOutcome::Failed(TargetError::Archive { .. })
        ));
        let releases = config.releases_path();
        assert!(!releases.join("zigverm-1.0.0-x86-linux.zip").exists());
        assert!(!releases.join("zigverm-1.0.0-x86-linux.zip.tmp").exists());
        assert!(!releases.join("zigverm-1.0.0-x86-linux.zip.sha256").exists());
    }

    #[test]
    fn failed_rebuild_removes_previous_archive() {
        let (_root, config) = project();
        let releases = config.releases_path();
        fs::create_dir_all(&releases).unwrap();
        fs::write(releases.join("zigverm-0.9.1-x86-windows.zip"), b"old").unwrap();
        fs::write(releases.join("zigverm-0.9.1-x86-windows.zip.sha256"), b"old").unwrap();
        let stub = Stub {
            fail: Some(WINDOWS_X86),
        };

        let outcome = build_one(&config, &stub, &WINDOWS_X86, "0.9.1");

        assert!(!outcome.is_built());
        assert!(!releases.join("zigverm-0.9.1-x86-windows.zip").exists());
        assert!(!releases.join("zigverm-0.9.1-x86-windows.zip.sha256").exists());
    }

    #[test]
    fn build_all_keeps_catalog_order() {
        let (_root, config) = project();

        let summary = build_all(&config, &Stub { fail: None }, targets::ALL_TARGETS, "0.9.1")
            .unwrap();

        let order: Vec<Target> = summary.outcomes.iter().map(BuildOutcome::target).collect();
        assert_eq!(order, targets::ALL_TARGETS);
        assert!(summary.is_success());
    }

    #[test]
    fn build_all_with_no_targets_still_creates_releases_dir() {
        let (_root, config) = project();

        let summary = build_all(&config, &Stub { fail: None }, &[], "0.9.1").unwrap();

        assert!(summary.outcomes.is_empty());
        assert!(config.releases_path().is_dir());
    }

    #[test]
    fn make_release_uses_trimmed_version() {
        let (_root, config) = project();

        let summary = make_release(&config, &Stub { fail: None }).unwrap();

        assert_eq!(summary.version, "0.9.1");
        assert_eq!(summary.built().count(), targets::ALL_TARGETS.len());
    }
}
