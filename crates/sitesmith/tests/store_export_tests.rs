//! Persistence and archive-export tests against temp directories.

use std::io::{Cursor, Read};

use sitesmith::bundle::CodeBundle;
use sitesmith::export;
use sitesmith::store::ProjectStore;
use zip::ZipArchive;

fn bakery_bundle() -> CodeBundle {
    CodeBundle {
        html: "<main><h1>Bakery</h1></main>".into(),
        css: "main{color:brown}\nh1{font-size:2rem}".into(),
        js: "console.log('fresh bread');".into(),
    }
}

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut entry = archive.by_name(name).expect("entry exists");
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    content
}

#[test]
fn archive_has_three_entries_with_verbatim_fields() {
    let bundle = bakery_bundle();
    let mut buffer = Cursor::new(Vec::new());
    export::export_zip(&bundle, "A landing page for a bakery", &mut buffer).unwrap();

    buffer.set_position(0);
    let mut archive = ZipArchive::new(buffer).unwrap();
    assert_eq!(archive.len(), 3);

    let index = read_entry(&mut archive, "index.html");
    assert!(index.contains("<main><h1>Bakery</h1></main>"));
    assert!(index.contains(r#"<link rel="stylesheet" href="styles.css">"#));
    assert!(index.contains(r#"<script src="script.js"></script>"#));
    assert!(index.contains("<title>A landing page for a bakery</title>"));

    assert_eq!(read_entry(&mut archive, "styles.css"), bundle.css);
    assert_eq!(read_entry(&mut archive, "script.js"), bundle.js);
}

#[test]
fn empty_js_still_produces_script_entry() {
    let bundle = CodeBundle {
        html: "<p>a</p>".into(),
        css: "p{}".into(),
        js: String::new(),
    };
    let mut buffer = Cursor::new(Vec::new());
    export::export_zip(&bundle, "A minimal page with no behavior", &mut buffer).unwrap();

    buffer.set_position(0);
    let mut archive = ZipArchive::new(buffer).unwrap();
    assert_eq!(read_entry(&mut archive, "script.js"), "");
}

#[test]
fn export_to_path_writes_archive_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("website-project.zip");

    export::export_to_path(&bakery_bundle(), "A landing page for a bakery", &path).unwrap();
    assert!(path.exists());
    assert!(path.metadata().unwrap().len() > 0);
}

#[test]
fn stored_project_exports_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProjectStore::open(dir.path().join("projects")).unwrap();

    let saved = store
        .save("A landing page for a bakery", bakery_bundle())
        .unwrap();
    let loaded = store.get(saved.id).unwrap().expect("saved project");

    let mut buffer = Cursor::new(Vec::new());
    export::export_zip(&loaded.code, &loaded.prompt, &mut buffer).unwrap();

    buffer.set_position(0);
    let mut archive = ZipArchive::new(buffer).unwrap();
    assert_eq!(read_entry(&mut archive, "styles.css"), bakery_bundle().css);
}
