//! Persistence for the generation tracker: the set of identifiers that have
//! already had a page generated, plus the timestamp of the last run. The
//! tracker is the run's durable checkpoint, so [`Store::save`] replaces the
//! file atomically and [`Store::load`] degrades to an empty state instead of
//! failing the run when the file is absent or corrupt.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

/// The progress checkpoint carried between runs. The identifier set only
/// grows: nothing ever removes an entry, which is what guarantees a
/// once-generated record is never regenerated even if the dataset is
/// reloaded or reordered.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProgressState {
    #[serde(default, rename = "generated_cities")]
    generated: BTreeSet<String>,

    #[serde(default, rename = "last_run")]
    pub last_run: Option<String>,
}

impl ProgressState {
    /// Whether `id` has already had a page generated.
    pub fn contains(&self, id: &str) -> bool {
        self.generated.contains(id)
    }

    /// The number of identifiers generated so far.
    pub fn len(&self) -> usize {
        self.generated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generated.is_empty()
    }

    /// Appends a run's batch of identifiers and stamps the run time. There
    /// is deliberately no way to remove an identifier.
    pub fn record<I>(&mut self, ids: I, timestamp: String)
    where
        I: IntoIterator<Item = String>,
    {
        self.generated.extend(ids);
        self.last_run = Some(timestamp);
    }
}

/// Loads and saves [`ProgressState`] as a JSON tracker file.
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new<P: Into<PathBuf>>(path: P) -> Store {
        Store { path: path.into() }
    }

    /// Reads the persisted state. An absent file is a fresh start; an
    /// unreadable or malformed file is treated the same way with a warning,
    /// so a corrupt tracker never aborts a run.
    pub fn load(&self) -> ProgressState {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return ProgressState::default();
            }
            Err(err) => {
                warn!(
                    "could not read tracker file `{}`, starting from an empty one: {}",
                    self.path.display(),
                    err,
                );
                return ProgressState::default();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(state) => state,
            Err(err) => {
                warn!(
                    "tracker file `{}` is malformed, starting from an empty one: {}",
                    self.path.display(),
                    err,
                );
                ProgressState::default()
            }
        }
    }

    /// Writes the full state, replacing the prior file. The JSON is written
    /// to a sibling temporary file and renamed over the target, so a crash
    /// mid-save leaves the previous checkpoint intact.
    pub fn save(&self, state: &ProgressState) -> Result<()> {
        let contents = serde_json::to_string(state)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    // The temporary file must live on the same filesystem as the target for
    // the rename to be atomic, so it goes in the same directory.
    fn tmp_path(&self) -> PathBuf {
        let mut os = self.path.clone().into_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }
}

/// The result of a fallible save operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error persisting the tracker file.
#[derive(Debug)]
pub enum Error {
    /// An error serializing the state.
    Json(serde_json::Error),

    /// An error writing or renaming the tracker file.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Json(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    /// Converts [`serde_json::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl From<io::Error> for Error {
    /// Converts [`io::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
