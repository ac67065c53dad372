//! Writes artifacts to disk.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::{
    Error,
    Result,
};

/// The mode of certificate files.
pub const CERTIFICATE_MODE: u32 = 0o640;

/// The mode of private key files.  Only the owner may read them.
pub const KEY_MODE: u32 = 0o600;

/// How an artifact is written to an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// The file's content is replaced.
    ///
    /// All artifacts are first written to temporary files, and are
    /// only moved into place once every one of them has been written
    /// successfully.  If moving one into place fails, the artifacts
    /// already moved are reverted to their previous content.
    Replace,

    /// The artifact is appended to the file's content.
    ///
    /// The file is created if it does not exist, but it is never
    /// truncated.  Callers may pre-seed the file.
    Append,
}

/// Data to be written to a file.
#[derive(Debug)]
pub struct Artifact<'a> {
    /// Where to write the data.
    pub path: PathBuf,

    /// The data.
    pub contents: &'a [u8],

    /// The mode to create the file with, subject to the umask.
    /// Ignored on platforms without Unix permissions.
    pub mode: u32,
}

impl<'a> Artifact<'a> {
    /// Returns a certificate artifact.
    pub fn certificate<P: Into<PathBuf>>(path: P, contents: &'a [u8]) -> Self {
        Artifact {
            path: path.into(),
            contents,
            mode: CERTIFICATE_MODE,
        }
    }

    /// Returns a private key artifact.
    pub fn private_key<P: Into<PathBuf>>(path: P, contents: &'a [u8]) -> Self {
        Artifact {
            path: path.into(),
            contents,
            mode: KEY_MODE,
        }
    }
}

/// Writes the artifacts according to `policy`.
pub fn write_artifacts(artifacts: &[Artifact], policy: WritePolicy)
                       -> Result<()>
{
    match policy {
        WritePolicy::Replace => {
            let mut staged = Vec::with_capacity(artifacts.len());
            for a in artifacts {
                staged.push(stage(a)?);
            }

            let previous = artifacts.iter()
                .map(|a| fs::read(&a.path).ok())
                .collect::<Vec<_>>();

            for (i, (file, a)) in staged.into_iter().zip(artifacts).enumerate() {
                if let Err(err) = file.persist(&a.path) {
                    for (done, content) in artifacts[..i].iter().zip(&previous) {
                        restore(&done.path, content.as_deref());
                    }
                    return Err(Error::Persistence(a.path.clone(), err.error));
                }
            }
        }

        WritePolicy::Append => {
            for a in artifacts {
                append(a)?;
            }
        }
    }

    Ok(())
}

/// Writes the artifact to a temporary file next to its destination.
///
/// Fails if the destination exists, but cannot be replaced by a file.
fn stage(a: &Artifact) -> Result<NamedTempFile> {
    let e = |err| Error::Persistence(a.path.clone(), err);

    let file_name = a.path.file_name()
        .ok_or_else(|| e(io::Error::new(
            io::ErrorKind::InvalidInput, "not a file name")))?;

    if let Ok(m) = fs::symlink_metadata(&a.path) {
        let t = m.file_type();
        if ! (t.is_file() || t.is_symlink()) {
            return Err(e(io::Error::new(
                io::ErrorKind::InvalidInput, "not a regular file")));
        }
    }
    let parent = match a.path.parent() {
        Some(p) if ! p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut sink = tempfile::Builder::new();

    platform! {
        unix => {
            use std::os::unix::fs::PermissionsExt;
            sink.permissions(std::fs::Permissions::from_mode(a.mode));
        },
        windows => {
            // We cannot do the same on Windows.
        },
    }

    let mut file = sink
        .prefix(file_name)
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(e)?;

    file.write_all(a.contents).map_err(e)?;
    file.flush().map_err(e)?;
    Ok(file)
}

/// Puts back what was at `path` before it was replaced.
///
/// Best effort: this runs while another error is being reported.
fn restore(path: &Path, previous: Option<&[u8]>) {
    let _ = match previous {
        Some(content) => fs::write(path, content),
        None => fs::remove_file(path),
    };
}

/// Appends the artifact to its destination.
fn append(a: &Artifact) -> Result<()> {
    let e = |err| Error::Persistence(a.path.clone(), err);

    let mut options = OpenOptions::new();
    options.append(true).create(true);

    platform! {
        unix => {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(a.mode);
        },
        windows => {
        },
    }

    let mut file = options.open(&a.path).map_err(e)?;
    file.write_all(a.contents).map_err(e)?;
    file.flush().map_err(e)?;
    Ok(())
}
