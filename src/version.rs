use tracing::info;

use crate::error::ReleaseError;
use crate::toolchain::Toolchain;

/// Resolve the version string used for every artifact of this run.
///
/// The freshly built binary is asked for its version; surrounding whitespace
/// is trimmed. There is no fallback when the query fails.
pub fn resolve_version(toolchain: &dyn Toolchain) -> Result<String, ReleaseError> {
    let raw = toolchain.query_version()?;
    let version = raw.trim();

    if version.is_empty() {
        return Err(ReleaseError::EmptyVersion);
    }

    info!(version, "resolved release version");
    Ok(version.to_string())
}
