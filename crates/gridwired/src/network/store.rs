//! Upload folder management: atomic writes, listing, and pruning.

use std::fs;
use std::io::{self, Write};
use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::Builder;
use tracing::{debug, warn};
use uuid::Uuid;

use super::NETWORK_TARGET;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

const DEFAULT_EXTENSION: &str = "jiidm";

/// Stores uploaded bytes under a fresh unique name inside `folder`.
///
/// The extension is taken from the client-supplied file name when it is a
/// plain alphanumeric suffix, and falls back to `jiidm` otherwise since JSON
/// is the only IIDM serialisation the service parses.
pub(crate) fn write_upload(
    folder: &Utf8Path,
    filename: &str,
    contents: &[u8],
) -> io::Result<Utf8PathBuf> {
    fs::create_dir_all(folder)?;
    let extension = upload_extension(filename);
    let path = folder.join(format!("{}.{extension}", Uuid::new_v4()));
    atomic_write(&path, contents)?;
    debug!(
        target: NETWORK_TARGET,
        path = %path,
        bytes = contents.len(),
        "stored uploaded network"
    );
    Ok(path)
}

fn upload_extension(filename: &str) -> &str {
    Utf8Path::new(filename)
        .extension()
        .filter(|extension| {
            !extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or(DEFAULT_EXTENSION)
}

/// Writes the provided bytes to the path using an atomic persist step.
///
/// Data is flushed and fsync'd before the temporary file is renamed into
/// place so a concurrent reload never observes a partially written network.
fn atomic_write(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    let directory = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "target path did not have a parent directory",
        )
    })?;

    let mut builder = Builder::new();
    builder.prefix(".upload");
    #[cfg(unix)]
    {
        use std::fs::Permissions;
        builder.permissions(Permissions::from_mode(0o600));
    }

    let mut file = builder.tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}

/// Regular files in `folder`, most recently modified first.
///
/// Hidden entries, such as in-flight temporary files, are skipped. A missing
/// folder is treated as empty.
pub(crate) fn stored_networks(folder: &Utf8Path) -> io::Result<Vec<Utf8PathBuf>> {
    let entries = match folder.read_dir_utf8() {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(error),
    };

    let mut files: Vec<(SystemTime, Utf8PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_name().starts_with('.') {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        files.push((modified, entry.into_path()));
    }

    files.sort_by(|left, right| right.0.cmp(&left.0).then_with(|| left.1.cmp(&right.1)));
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Deletes stored files beyond the `keep` most recent, never touching
/// `protected`. Returns the paths that were removed.
pub(crate) fn prune(folder: &Utf8Path, keep: usize, protected: Option<&Utf8Path>) -> Vec<Utf8PathBuf> {
    let files = match stored_networks(folder) {
        Ok(files) => files,
        Err(error) => {
            warn!(
                target: NETWORK_TARGET,
                folder = %folder,
                error = %error,
                "failed to list stored networks"
            );
            return Vec::new();
        }
    };

    let mut removed = Vec::new();
    for path in files.into_iter().skip(keep) {
        if protected.is_some_and(|current| current == path.as_path()) {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => removed.push(path),
            Err(error) => warn!(
                target: NETWORK_TARGET,
                path = %path,
                error = %error,
                "failed to delete stored network"
            ),
        }
    }
    removed
}
