//! Renders one HTML landing page per selected city record. Rendering is
//! deterministic: the content and the output file name are derived solely
//! from the record's fields, so re-rendering the same record always produces
//! the same artifact at the same location. Filesystem writes go through the
//! [`ArtifactSink`] seam so the content generation is testable without
//! touching a disk.

use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::dataset::CityRecord;
use crate::ident;

/// A rendered output file, addressed by the identifier it was derived from.
/// `file_name` is relative to the output directory; identifiers map 1:1 to
/// locations, so two distinct identifiers can never collide on disk.
pub struct Artifact {
    pub ident: String,
    pub file_name: PathBuf,
    pub content: String,
}

/// Renders the landing page for a single record.
pub fn render(record: &CityRecord) -> Artifact {
    let ident = ident::normalize(&record.name, &record.region);
    let artifact = Artifact {
        file_name: PathBuf::from(format!("{}.html", ident)),
        content: page_html(&record.name, &record.region),
        ident,
    };
    debug!("rendered `{}`", artifact.file_name.display());
    artifact
}

fn page_html(name: &str, region: &str) -> String {
    format!(
        r#"<html>
<head>
    <title>Auto Insurance in {name}, {region}</title>
    <meta name="description" content="Affordable auto insurance in {name}, {region}. Compare rates today!">
</head>
<body>
    <h1>Get Auto Insurance in {name}, {region}</h1>
    <p>Find affordable auto insurance in {name}. Contact us for free quotes.</p>
    <footer>
        <p>Contact us at 1-800-123-4567</p>
    </footer>
</body>
</html>
"#,
        name = name,
        region = region,
    )
}

/// Receives rendered artifacts. The production implementation is
/// [`DirectorySink`]; tests can collect writes in memory instead.
pub trait ArtifactSink {
    fn write(&mut self, file_name: &Path, content: &[u8]) -> io::Result<()>;
}

/// Writes artifacts under a root directory, creating parent directories as
/// needed and overwriting whatever was there before (idempotent re-render).
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new<P: Into<PathBuf>>(root: P) -> DirectorySink {
        DirectorySink { root: root.into() }
    }
}

impl ArtifactSink for DirectorySink {
    fn write(&mut self, file_name: &Path, content: &[u8]) -> io::Result<()> {
        let path = self.root.join(file_name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;

    struct MemorySink(BTreeMap<PathBuf, Vec<u8>>);

    impl ArtifactSink for MemorySink {
        fn write(&mut self, file_name: &Path, content: &[u8]) -> io::Result<()> {
            self.0.insert(file_name.to_owned(), content.to_owned());
            Ok(())
        }
    }

    fn record(name: &str, region: &str) -> CityRecord {
        CityRecord {
            name: name.to_owned(),
            region: region.to_owned(),
            population: 0,
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let reno = record("Reno", "NV");
        let first = render(&reno);
        let second = render(&reno);
        assert_eq!(first.ident, second.ident);
        assert_eq!(first.file_name, second.file_name);
        assert_eq!(first.content, second.content);
    }

    #[test]
    fn test_file_name_derives_from_identifier() {
        let artifact = render(&record("Winston Salem", "NC"));
        assert_eq!("Winston_Salem-NC", artifact.ident);
        assert_eq!(PathBuf::from("Winston_Salem-NC.html"), artifact.file_name);
    }

    #[test]
    fn test_content_mentions_the_city() {
        let artifact = render(&record("Reno", "NV"));
        assert!(artifact.content.contains("<title>Auto Insurance in Reno, NV</title>"));
        assert!(artifact.content.contains("<h1>Get Auto Insurance in Reno, NV</h1>"));
    }

    #[test]
    fn test_sink_receives_the_artifact() {
        let mut sink = MemorySink(BTreeMap::new());
        let artifact = render(&record("Helena", "MT"));
        sink.write(&artifact.file_name, artifact.content.as_bytes())
            .unwrap();
        assert_eq!(
            artifact.content.as_bytes(),
            sink.0[&PathBuf::from("Helena-MT.html")].as_slice(),
        );
    }

    #[test]
    fn test_directory_sink_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        sink.write(Path::new("Reno-NV.html"), b"old").unwrap();
        sink.write(Path::new("Reno-NV.html"), b"new").unwrap();
        assert_eq!(
            "new",
            std::fs::read_to_string(dir.path().join("Reno-NV.html")).unwrap(),
        );
    }
}
