//! Exports the [`run`] function which stitches together the high-level steps
//! of one generation run: loading the dataset ([`crate::dataset`]), loading
//! the tracker ([`crate::progress`]), selecting a bounded random batch
//! ([`crate::batch`]), rendering the batch ([`crate::render`]), committing
//! the tracker, and writing the run manifest ([`crate::manifest`]).
//!
//! The run is a single linear pass. Nothing is committed to the tracker
//! until every page in the batch has been written, so a persisted identifier
//! always corresponds to an artifact that was actually produced; a render
//! failure aborts the whole batch without committing any of it.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{info, warn};

use crate::batch;
use crate::config::Config;
use crate::dataset;
use crate::manifest;
use crate::progress;
use crate::render::{self, ArtifactSink, DirectorySink};

/// What a run amounted to. This is the only thing the external scheduler
/// sees; "no data" and "backlog exhausted" are deliberately distinct.
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// A batch was rendered and committed. `pages` are the output file names
    /// from this run; `remaining` is the backlog size after the commit.
    Generated {
        pages: Vec<String>,
        remaining: usize,
    },

    /// Every known identifier has already been generated.
    BacklogExhausted,

    /// The dataset was absent or contained no loadable rows.
    NoData,
}

/// Runs one generation batch from a [`Config`]. The output directory is
/// cleaned at the start of every run, so it holds exactly the current run's
/// pages plus the manifest.
pub fn run(config: &Config) -> Result<RunOutcome> {
    let mut sink = DirectorySink::new(&config.output_directory);
    run_with_sink(config, &mut sink)
}

/// Runs one generation batch, writing artifacts through the given sink.
/// [`run`] delegates here with a [`DirectorySink`]; tests can supply a sink
/// that fails partway through a batch to exercise the no-partial-commit
/// behavior.
pub fn run_with_sink<S: ArtifactSink>(config: &Config, sink: &mut S) -> Result<RunOutcome> {
    clean_output_directory(&config.output_directory)?;

    let records = match dataset::load_records(&config.dataset) {
        Ok(records) => records,
        Err(dataset::Error::MissingSource(path)) => {
            warn!(
                "dataset `{}` is missing; emitting an empty index",
                path.display(),
            );
            write_manifest(sink, &[], config)?;
            return Ok(RunOutcome::NoData);
        }
        Err(err) => return Err(Error::Load(err)),
    };
    if records.is_empty() {
        warn!("dataset contained no loadable rows; emitting an empty index");
        write_manifest(sink, &[], config)?;
        return Ok(RunOutcome::NoData);
    }

    let store = progress::Store::new(&config.progress_file);
    let mut state = store.load();

    let batch = batch::select(&records, &state, config.max_batch, &mut rand::thread_rng());
    if batch.is_empty() {
        info!("backlog exhausted; nothing left to generate");
        write_manifest(sink, &[], config)?;
        return Ok(RunOutcome::BacklogExhausted);
    }

    // Render every page before committing anything.
    let mut artifacts = Vec::with_capacity(batch.len());
    for record in &batch {
        let artifact = render::render(record);
        sink.write(&artifact.file_name, artifact.content.as_bytes())
            .map_err(|err| Error::Render {
                ident: artifact.ident.clone(),
                err,
            })?;
        artifacts.push(artifact);
    }

    let now = Local::now();
    state.record(
        artifacts.iter().map(|artifact| artifact.ident.clone()),
        now.to_rfc3339(),
    );
    store.save(&state)?;

    write_manifest(sink, &artifacts, config)?;

    let remaining = batch::backlog(&records, &state).len();
    info!(
        "generated {} pages, {} remaining in the backlog",
        artifacts.len(),
        remaining,
    );
    Ok(RunOutcome::Generated {
        pages: artifacts
            .iter()
            .map(|artifact| artifact.file_name.display().to_string())
            .collect(),
        remaining,
    })
}

fn write_manifest<S: ArtifactSink>(
    sink: &mut S,
    artifacts: &[render::Artifact],
    config: &Config,
) -> Result<()> {
    let stamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let index = manifest::build(artifacts, &stamp, &config.title);
    sink.write(&index.file_name, index.content.as_bytes())
        .map_err(Error::Io)?;
    Ok(())
}

fn clean_output_directory(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) => match e.kind() {
            io::ErrorKind::NotFound => {}
            _ => {
                return Err(Error::Clean {
                    path: dir.to_owned(),
                    err: e,
                })
            }
        },
    }
    std::fs::create_dir_all(dir).map_err(|err| Error::Clean {
        path: dir.to_owned(),
        err,
    })
}

/// The result of a fallible run.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for a generation run. Errors can be during dataset
/// loading, output-directory cleaning, page rendering, tracker persistence,
/// and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading the dataset (other than a missing file,
    /// which is the [`RunOutcome::NoData`] outcome rather than an error).
    Load(dataset::Error),

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: io::Error },

    /// Returned when a page in the batch fails to write. The whole batch is
    /// abandoned uncommitted.
    Render { ident: String, err: io::Error },

    /// Returned for errors persisting the tracker file.
    Progress(progress::Error),

    /// Returned for other I/O errors.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Load(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::Render { ident, err } => {
                write!(f, "Rendering page for '{}': {}", ident, err)
            }
            Error::Progress(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Load(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::Render { ident: _, err } => Some(err),
            Error::Progress(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<progress::Error> for Error {
    /// Converts [`progress::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: progress::Error) -> Error {
        Error::Progress(err)
    }
}

impl From<io::Error> for Error {
    /// Converts [`io::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
