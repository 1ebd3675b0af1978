//! Packs the output directory into a gzipped tarball for the publishing
//! step. Paths inside the archive are relative to the output directory, so
//! unpacking yields the site tree directly.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;
use walkdir::WalkDir;

/// Packs every file under `output_directory` into a `.tar.gz` at
/// `destination`, overwriting any previous archive there.
pub fn pack(output_directory: &Path, destination: &Path) -> Result<()> {
    let file = File::create(destination)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut count = 0usize;
    for entry in WalkDir::new(output_directory) {
        let entry = entry?;
        if entry.file_type().is_file() {
            let name = entry
                .path()
                .strip_prefix(output_directory)
                .map_err(|_| Error::Prefix(entry.path().to_owned()))?;
            builder.append_path_with_name(entry.path(), name)?;
            count += 1;
        }
    }

    builder.into_inner()?.finish()?;
    info!(
        "packed {} files from `{}` into `{}`",
        count,
        output_directory.display(),
        destination.display(),
    );
    Ok(())
}

/// The result of a fallible packing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error packing the output directory.
#[derive(Debug)]
pub enum Error {
    /// An error walking the output directory.
    Walk(walkdir::Error),

    /// A walked path fell outside the output directory.
    Prefix(PathBuf),

    /// An error writing the archive.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Walk(err) => err.fmt(f),
            Error::Prefix(path) => write!(
                f,
                "Path '{}' is not inside the output directory",
                path.display(),
            ),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Walk(err) => Some(err),
            Error::Prefix(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::Walk(err)
    }
}

impl From<io::Error> for Error {
    /// Converts [`io::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use flate2::read::GzDecoder;
    use std::collections::BTreeSet;
    use std::fs;

    #[test]
    fn test_pack_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("generated_pages");
        fs::create_dir(&site)?;
        fs::write(site.join("index.html"), "<html></html>")?;
        fs::write(site.join("Reno-NV.html"), "<html></html>")?;

        let archive = dir.path().join("generated_pages.tar.gz");
        pack(&site, &archive)?;

        let mut unpacked = tar::Archive::new(GzDecoder::new(File::open(&archive)?));
        let names: BTreeSet<String> = unpacked
            .entries()?
            .map(|entry| {
                entry
                    .unwrap()
                    .path()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        let expected: BTreeSet<String> = ["Reno-NV.html", "index.html"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        assert_eq!(expected, names);
        Ok(())
    }

    #[test]
    fn test_pack_empty_directory() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("generated_pages");
        fs::create_dir(&site)?;

        let archive = dir.path().join("generated_pages.tar.gz");
        pack(&site, &archive)?;
        assert!(archive.exists());
        Ok(())
    }
}
