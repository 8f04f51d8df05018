//! Release archive creation

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::ReleaseConfig;
use crate::error::ArchiveError;
use crate::targets::Target;

const EXECUTABLE_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

/// A file to place in the archive
struct ArchiveEntry {
    source: PathBuf,
    name: String,
    mode: u32,
}

/// Zip `releases/<output_dir>` into `releases/<output_dir>.zip`.
///
/// The archive holds the directory entry itself, both executables, the
/// license and the readme, all under `<output_dir>/`.
pub fn create_release_archive(
    config: &ReleaseConfig,
    target: &Target,
    output_dir_name: &str,
) -> Result<PathBuf, ArchiveError> {
    let releases = config.releases_path();
    let output_dir = releases.join(output_dir_name);
    let archive_path = releases.join(format!("{}.zip", output_dir_name));

    let main_exe = target.executable_name(&config.binary_name);
    let bundled_exe = target.executable_name(&config.bundled_binary);

    let entries = [
        ArchiveEntry {
            source: output_dir.join(&main_exe),
            name: format!("{}/{}", output_dir_name, main_exe),
            mode: EXECUTABLE_MODE,
        },
        ArchiveEntry {
            source: output_dir.join(&bundled_exe),
            name: format!("{}/{}", output_dir_name, bundled_exe),
            mode: EXECUTABLE_MODE,
        },
        ArchiveEntry {
            source: config.license_path(),
            name: format!("{}/LICENSE", output_dir_name),
            mode: FILE_MODE,
        },
        ArchiveEntry {
            source: config.readme_path(),
            name: format!("{}/{}", output_dir_name, config.readme_archive_name),
            mode: FILE_MODE,
        },
    ];

    // Only a finished archive ever appears under the final name
    let mut partial_path = archive_path.as_os_str().to_owned();
    partial_path.push(".tmp");
    let partial_path = PathBuf::from(partial_path);

    if let Err(e) = write_archive(&partial_path, output_dir_name, &entries) {
        let _ = fs::remove_file(&partial_path);
        return Err(e);
    }

    fs::rename(&partial_path, &archive_path).map_err(|e| {
        let _ = fs::remove_file(&partial_path);
        io_error(&archive_path, e)
    })?;

    Ok(archive_path)
}

fn write_archive(
    path: &Path,
    output_dir_name: &str,
    entries: &[ArchiveEntry],
) -> Result<(), ArchiveError> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.add_directory(format!("{}/", output_dir_name), options)?;

    for entry in entries {
        let source = File::open(&entry.source).map_err(|e| io_error(&entry.source, e))?;
        zip.start_file(entry.name.as_str(), options.unix_permissions(entry.mode))?;
        io::copy(&mut BufReader::new(source), &mut zip).map_err(|e| io_error(&entry.source, e))?;
    }

    let mut writer = zip.finish()?;
    writer.flush().map_err(|e| io_error(path, e))?;

    Ok(())
}

/// Path of the `sha256sum` file written next to `archive_path`.
pub fn checksum_path(archive_path: &Path) -> PathBuf {
    let mut path = archive_path.as_os_str().to_owned();
    path.push(".sha256");
    PathBuf::from(path)
}

/// Delete a target's archive and checksum left by an earlier run.
///
/// Missing files are not an error.
pub fn remove_release_artifacts(
    config: &ReleaseConfig,
    output_dir_name: &str,
) -> Result<(), ArchiveError> {
    let archive_path = config.releases_path().join(format!("{}.zip", output_dir_name));
    for path in [checksum_path(&archive_path), archive_path] {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(&path, e)),
        }
    }
    Ok(())
}

/// Write `<archive>.sha256` next to the archive and return the hex digest.
///
/// The file uses the `sha256sum` format: `<digest>  <file name>`.
pub fn write_checksum(archive_path: &Path) -> Result<String, ArchiveError> {
    let digest = hash_file(archive_path)?;

    let file_name = archive_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let checksum_path = checksum_path(archive_path);

    fs::write(&checksum_path, format!("{}  {}\n", digest, file_name))
        .map_err(|e| io_error(&checksum_path, e))?;

    Ok(digest)
}

/// SHA-256 of a file as lowercase hex
pub fn hash_file(path: &Path) -> Result<String, ArchiveError> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut BufReader::new(file), &mut hasher).map_err(|e| io_error(path, e))?;
    Ok(format!("{:x}", hasher.finalize()))
}

fn io_error(path: &Path, source: io::Error) -> ArchiveError {
    ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    }
}
