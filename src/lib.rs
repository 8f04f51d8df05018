mod archive;
mod builder;
pub mod config;
mod error;
mod report;
pub mod targets;
pub mod toolchain;
mod version;

pub use archive::{create_release_archive, hash_file, write_checksum};
pub use builder::{BuildOutcome, ReleaseSummary, build_all, build_one, make_release};
pub use config::ReleaseConfig;
pub use error::{ArchiveError, ReleaseError, TargetError};
pub use toolchain::{InstallRequest, Toolchain, Zig};
pub use version::resolve_version;
