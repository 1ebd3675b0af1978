//! Builds the `index.html` manifest: the entry point listing every page
//! produced in the current run. The manifest covers the current run only,
//! not the cumulative history, and is emitted even when the run produced
//! nothing so the output directory always has an entry point.

use std::path::PathBuf;

use crate::render::Artifact;

/// The manifest's file name within the output directory.
pub const FILE_NAME: &str = "index.html";

/// Builds the manifest artifact for a run. `artifacts` are listed in the
/// order given; `timestamp` is a human-readable build time stamped into the
/// page body.
pub fn build(artifacts: &[Artifact], timestamp: &str, title: &str) -> Artifact {
    let items = artifacts
        .iter()
        .map(|artifact| {
            format!(
                "    <li><a href=\"{}\">{}</a></li>",
                artifact.file_name.display(),
                artifact.file_name.display(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let content = format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
</head>
<body>
  <h1>{title}</h1>
  <p>Last build: {timestamp}</p>
  <ul>
{items}
  </ul>
</body>
</html>
"#,
        title = title,
        timestamp = timestamp,
        items = items,
    );

    Artifact {
        ident: "index".to_owned(),
        file_name: PathBuf::from(FILE_NAME),
        content,
    }
}
