//! Archive export: a three-entry zip (index.html, styles.css, script.js)
//! with the bundle's fields carried verbatim.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use anyhow::{Context, Result};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::bundle::CodeBundle;

const DEFAULT_TITLE: &str = "Generated Website";

/// Derive a page title from the prompt: first 50 characters, alphanumerics
/// and spaces only.
pub fn safe_title(prompt: &str) -> String {
    let title: String = prompt
        .chars()
        .take(50)
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    let title = title.trim();
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// Wrap the bundle's body markup in a full HTML document that references the
/// external stylesheet and script entries.
pub fn index_html(bundle: &CodeBundle, title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="description" content="{title}">
    <title>{title}</title>
    <link rel="stylesheet" href="styles.css">
</head>
<body>
{body}
    <script src="script.js"></script>
</body>
</html>"#,
        title = title,
        body = bundle.html,
    )
}

/// Write the three-entry archive to any `Write + Seek` target.
pub fn export_zip<W: Write + Seek>(bundle: &CodeBundle, prompt: &str, writer: W) -> Result<()> {
    let title = safe_title(prompt);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(writer);
    zip.start_file("index.html", options)
        .context("failed to start index.html entry")?;
    zip.write_all(index_html(bundle, &title).as_bytes())?;

    zip.start_file("styles.css", options)
        .context("failed to start styles.css entry")?;
    zip.write_all(bundle.css.as_bytes())?;

    zip.start_file("script.js", options)
        .context("failed to start script.js entry")?;
    zip.write_all(bundle.js.as_bytes())?;

    zip.finish().context("failed to finalize archive")?;
    Ok(())
}

/// Export to a file path.
pub fn export_to_path(bundle: &CodeBundle, prompt: &str, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create archive at {}", path.display()))?;
    export_zip(bundle, prompt, file)
}
