use std::path::{Path, PathBuf};

/// Paths and names used by a release run.
///
/// Relative paths are resolved against `project_root`.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Root of the zigverm checkout (contains build.zig, LICENSE, README.md)
    pub project_root: PathBuf,
    /// Directory that receives per-target output directories and archives
    pub releases_dir: PathBuf,
    /// Build tool program, looked up on PATH
    pub build_tool: String,
    /// Value passed as `--release=<optimize>`
    pub optimize: String,
    /// Main executable produced by the build
    pub binary_name: String,
    /// Secondary executable bundled alongside the main one
    pub bundled_binary: String,
    pub license_file: PathBuf,
    pub readme_file: PathBuf,
    /// Name the readme is stored under inside the archive
    pub readme_archive_name: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl ReleaseConfig {
    /// Default configuration rooted at `project_root`.
    pub fn in_dir(project_root: impl AsRef<Path>) -> Self {
        ReleaseConfig {
            project_root: project_root.as_ref().to_path_buf(),
            releases_dir: PathBuf::from("releases"),
            build_tool: "zig".to_string(),
            optimize: "safe".to_string(),
            binary_name: "zigverm".to_string(),
            bundled_binary: "zig".to_string(),
            license_file: PathBuf::from("LICENSE"),
            readme_file: PathBuf::from("README.md"),
            readme_archive_name: "README".to_string(),
        }
    }

    pub fn releases_path(&self) -> PathBuf {
        self.project_root.join(&self.releases_dir)
    }

    pub fn license_path(&self) -> PathBuf {
        self.project_root.join(&self.license_file)
    }

    pub fn readme_path(&self) -> PathBuf {
        self.project_root.join(&self.readme_file)
    }

    /// Absolute path to the natively built main executable (`zig build` output).
    ///
    /// A relative `project_root` is resolved against the current directory.
    pub fn native_binary_path(&self) -> PathBuf {
        let root = std::path::absolute(&self.project_root)
            .unwrap_or_else(|_| self.project_root.clone());
        let name = if cfg!(target_os = "windows") {
            format!("{}.exe", self.binary_name)
        } else {
            self.binary_name.clone()
        };
        root.join("zig-out").join("bin").join(name)
    }
}
