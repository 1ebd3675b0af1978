//! Project configuration. A project is a directory containing a
//! `citypages.yaml` file; [`Config::from_directory`] walks up from a
//! starting directory until it finds one, so the tool can be invoked from
//! anywhere inside the project tree. Every field has a default matching the
//! historical layout, so an empty mapping is a valid project file.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct MaxBatch(usize);
impl Default for MaxBatch {
    fn default() -> Self {
        MaxBatch(50)
    }
}

#[derive(Deserialize)]
struct Project {
    #[serde(default = "default_dataset")]
    dataset: PathBuf,

    #[serde(default = "default_output_directory")]
    output_directory: PathBuf,

    #[serde(default = "default_progress_file")]
    progress_file: PathBuf,

    #[serde(default)]
    max_batch: MaxBatch,

    #[serde(default = "default_title")]
    title: String,
}

fn default_dataset() -> PathBuf {
    PathBuf::from("uscities.csv")
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("generated_pages")
}

fn default_progress_file() -> PathBuf {
    PathBuf::from("generation_tracker.json")
}

fn default_title() -> String {
    "Auto Insurance Pages".to_owned()
}

/// The resolved configuration for one run. Relative paths in the project
/// file are resolved against the project root (the directory holding
/// `citypages.yaml`).
pub struct Config {
    pub dataset: PathBuf,
    pub output_directory: PathBuf,
    pub progress_file: PathBuf,
    pub max_batch: usize,
    pub title: String,
}

impl Config {
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join("citypages.yaml");
        if path.exists() {
            Config::from_project_file(&path)
                .map_err(|e| anyhow!("Loading configuration: {:?}", e))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(anyhow!(
                    "Could not find `citypages.yaml` in any parent directory"
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config {
                dataset: project_root.join(project.dataset),
                output_directory: project_root.join(project.output_directory),
                progress_file: project_root.join(project.progress_file),
                max_batch: project.max_batch.0,
                title: project.title,
            }),
        }
    }
}

fn open(path: &Path, kind: &str) -> Result<File> {
    match File::open(path) {
        Err(e) => Err(anyhow!("Opening {} file `{}`: {}", kind, path.display(), e)),
        Ok(file) => Ok(file),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_from_project_file_resolves_relative_paths() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("citypages.yaml");
        fs::write(
            &path,
            "dataset: data/cities.csv\n\
             output_directory: out\n\
             max_batch: 25\n",
        )?;

        let config = Config::from_project_file(&path)?;
        assert_eq!(dir.path().join("data/cities.csv"), config.dataset);
        assert_eq!(dir.path().join("out"), config.output_directory);
        assert_eq!(
            dir.path().join("generation_tracker.json"),
            config.progress_file,
        );
        assert_eq!(25, config.max_batch);
        assert_eq!("Auto Insurance Pages", config.title);
        Ok(())
    }

    #[test]
    fn test_defaults_apply() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("citypages.yaml");
        fs::write(&path, "{}\n")?;

        let config = Config::from_project_file(&path)?;
        assert_eq!(dir.path().join("uscities.csv"), config.dataset);
        assert_eq!(50, config.max_batch);
        Ok(())
    }

    #[test]
    fn test_from_directory_walks_up() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("citypages.yaml"), "title: Walked\n")?;
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!("Walked", config.title);
        Ok(())
    }
}
