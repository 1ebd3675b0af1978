//! Parses the raw city dataset into [`CityRecord`]s. The source is a CSV
//! export whose column order varies between vendors, so the loader sniffs the
//! first row for a header ([`detect_header`]) and binds column positions by
//! name when it finds one, falling back to the fixed positions of the
//! upstream `uscities.csv` layout otherwise. Individual malformed rows are
//! skipped with a warning; only a missing or unreadable source file aborts
//! the load.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

/// One row of the city dataset. Immutable once loaded; `population` is
/// carried as passthrough metadata and is never used to filter records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CityRecord {
    pub name: String,
    pub region: String,
    pub population: u64,
}

/// Column positions for the three fields of interest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    pub name: usize,
    pub region: usize,

    /// `None` when the source has no population column; every row then
    /// loads with a population of zero.
    pub population: Option<usize>,
}

impl Default for ColumnLayout {
    /// The fixed positions used when no header row is recognized: the layout
    /// of the upstream `uscities.csv` export (city, city_ascii, state_id,
    /// state_name, ..., population at index 8).
    fn default() -> Self {
        ColumnLayout {
            name: 0,
            region: 2,
            population: Some(8),
        }
    }
}

/// Inspects a candidate header row and returns the column layout it
/// describes, or `None` if the row doesn't look like a header.
///
/// A cell claims a role by case-insensitive substring match against a small
/// vocabulary: `city`/`city_ascii` for the name, `state`/`state_id`/
/// `state_name` for the region, `population`/`pop` for the population. The
/// first matching cell wins each role, and the row counts as a header only
/// when both a name and a region column were claimed.
pub fn detect_header(row: &csv::StringRecord) -> Option<ColumnLayout> {
    let mut name = None;
    let mut region = None;
    let mut population = None;
    for (i, cell) in row.iter().enumerate() {
        let cell = cell.trim().to_ascii_lowercase();
        if name.is_none() && cell.contains("city") {
            name = Some(i);
        } else if region.is_none() && cell.contains("state") {
            region = Some(i);
        } else if population.is_none() && cell.contains("pop") {
            population = Some(i);
        }
    }
    match (name, region) {
        (Some(name), Some(region)) => Some(ColumnLayout {
            name,
            region,
            population,
        }),
        _ => None,
    }
}

/// Loads every parseable row of the dataset at `path`, in source order, with
/// duplicates retained. An absent file is reported as the distinct
/// [`Error::MissingSource`] so the caller can tell "no data" apart from "no
/// remaining work".
pub fn load_records(path: &Path) -> Result<Vec<CityRecord>> {
    let file = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => Error::MissingSource(path.to_owned()),
        _ => Error::Io(err),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut records = Vec::new();
    let mut layout = ColumnLayout::default();
    let mut skipped = 0usize;

    for (row_number, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                warn!("skipping unreadable row {}: {}", row_number + 1, err);
                skipped += 1;
                continue;
            }
        };

        if row_number == 0 {
            if let Some(bound) = detect_header(&row) {
                layout = bound;
                continue;
            }
        }

        if row.iter().all(|cell| cell.trim().is_empty()) {
            warn!("skipping blank row {}", row_number + 1);
            skipped += 1;
            continue;
        }

        match parse_row(&row, &layout) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!("skipping invalid row {}: {}", row_number + 1, reason);
                skipped += 1;
            }
        }
    }

    info!(
        "loaded {} city records from `{}` ({} rows skipped)",
        records.len(),
        path.display(),
        skipped,
    );
    Ok(records)
}

fn parse_row(
    row: &csv::StringRecord,
    layout: &ColumnLayout,
) -> std::result::Result<CityRecord, String> {
    let name = row
        .get(layout.name)
        .ok_or("missing name column")?
        .trim();
    if name.is_empty() {
        return Err("empty name".to_owned());
    }

    let region = row
        .get(layout.region)
        .ok_or("missing region column")?
        .trim();

    let population = match layout.population.and_then(|i| row.get(i)) {
        None => 0,
        Some(raw) => parse_population(raw)
            .ok_or_else(|| format!("unparseable population {:?}", raw))?,
    };

    Ok(CityRecord {
        name: name.to_owned(),
        region: region.to_owned(),
        population,
    })
}

// Accepts integers, decimals, and thousands-separated or quote-decorated
// strings; an empty cell counts as zero.
fn parse_population(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '"' | '\''))
        .collect();
    if cleaned.is_empty() {
        return Some(0);
    }
    if let Ok(n) = cleaned.parse::<u64>() {
        return Some(n);
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.is_finite() => Some(f as u64),
        _ => None,
    }
}

/// The result of a fallible load operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the dataset. Row-level problems never surface
/// here; they are recovered locally with warnings and counters.
#[derive(Debug)]
pub enum Error {
    /// The dataset file does not exist.
    MissingSource(PathBuf),

    /// Any other I/O problem opening the dataset.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingSource(path) => {
                write!(f, "Dataset file `{}` does not exist", path.display())
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingSource(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
