use super::*;
use crate::test_utils::{build_zip, init_logger, manifest_xml};

const INDEX_HTML: &str = r#"<html><head><title>Intro</title>
<link rel="stylesheet" href="style.css"></head>
<body><img src="img.png"><a href="missing.html">gone</a></body></html>"#;
const STYLE_CSS: &str = "body { background: url('img.png'); }";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake";

fn basic_archive() -> Vec<u8> {
    let manifest = manifest_xml(&[("intro", "index.html")]);
    build_zip(&[
        ("imsmanifest.xml", manifest.as_bytes()),
        ("index.html", INDEX_HTML.as_bytes()),
        ("style.css", STYLE_CSS.as_bytes()),
        ("img.png", PNG_BYTES),
    ])
}

fn loaded(archive: &[u8]) -> (PackageLoader, PackageDescriptor) {
    init_logger();
    let mut loader = PackageLoader::default();
    let descriptor = loader.load("course.zip", archive).unwrap();
    (loader, descriptor)
}

#[test]
fn test_package_name_strips_zip_extension() {
    assert_eq!(package_name("course.zip"), "course");
    assert_eq!(package_name("/tmp/Golf Basics.ZIP"), "Golf Basics");
    assert_eq!(package_name(r"C:\pkgs\course.zip"), "course");
    assert_eq!(package_name("notes.txt"), "notes.txt");
    assert_eq!(package_name(".zip"), ".zip");
}

#[test]
fn test_corrupt_archive_is_rejected() {
    let mut loader = PackageLoader::default();
    let err = loader.load("bad.zip", b"definitely not a zip").unwrap_err();
    assert!(matches!(err, PackageError::CorruptArchive(_)));
    assert!(!loader.is_loaded());
}

// Covers: archive without a descriptor document
#[test]
fn test_missing_manifest() {
    let archive = build_zip(&[("index.html", b"<html></html>".as_slice())]);
    let mut loader = PackageLoader::default();

    assert_eq!(
        loader.load("course.zip", &archive).unwrap_err(),
        PackageError::ManifestMissing
    );
}

// Covers: organization item without a sco resource
#[test]
fn test_manifest_without_sco_has_no_launchable_units() {
    let manifest = r#"<manifest identifier="m">
  <organizations><organization identifier="o"><title>T</title>
    <item identifier="i1" identifierref="r1"><title>Only</title></item>
  </organization></organizations>
  <resources><resource identifier="r1" type="webcontent" href="index.html"/></resources>
</manifest>"#;
    let archive = build_zip(&[
        ("imsmanifest.xml", manifest.as_bytes()),
        ("index.html", b"<html></html>".as_slice()),
    ]);
    let mut loader = PackageLoader::default();

    assert_eq!(
        loader.load("course.zip", &archive).unwrap_err(),
        PackageError::NoLaunchableUnits
    );
}

#[test]
fn test_invalid_manifest_xml() {
    let archive = build_zip(&[("imsmanifest.xml", b"<manifest><unclosed>".as_slice())]);
    let mut loader = PackageLoader::default();

    assert!(matches!(
        loader.load("course.zip", &archive).unwrap_err(),
        PackageError::ManifestInvalid(_)
    ));
}

// Covers: manifest + page + stylesheet + image end to end
#[test]
fn test_basic_package_rewrites_references_to_handles() {
    let (mut loader, descriptor) = loaded(&basic_archive());

    assert_eq!(descriptor.name, "course");
    assert_eq!(descriptor.manifest_path, "imsmanifest.xml");
    assert_eq!(descriptor.file_count, 4);
    assert_eq!(descriptor.launchable_units.len(), 1);

    let unit = descriptor.launchable_units[0].clone();
    let page = loader.content_for(&unit).unwrap();
    let img_uri = loader.file_url("img.png").unwrap().to_string();
    let css_uri = loader.file_url("style.css").unwrap().to_string();

    assert!(img_uri.starts_with("blob:scorm-sandbox/"));
    assert!(page.contains(&format!(r#"src="{img_uri}""#)));
    assert!(page.contains(&format!(r#"href="{css_uri}""#)));
    assert!(!page.contains(r#"src="img.png""#));
    assert!(page.contains("doLMSInitialize"));
    assert_eq!(loader.current_page(), Some("index.html"));

    let css = loader.resource(&css_uri).unwrap();
    assert_eq!(css.mime, "text/css; charset=utf-8");
    assert_eq!(
        std::str::from_utf8(&css.bytes).unwrap(),
        format!("body {{ background: url('{img_uri}'); }}")
    );

    let img = loader.resource(&img_uri).unwrap();
    assert_eq!(img.mime, "image/png");
    assert_eq!(&*img.bytes, PNG_BYTES);
}

#[test]
fn test_unresolved_references_are_reported() {
    let (_loader, descriptor) = loaded(&basic_archive());

    // missing.html is a page link, so it is left for navigation; nothing
    // else in the package is dangling
    assert!(descriptor.unresolved_references.is_empty());

    let archive = build_zip(&[
        ("imsmanifest.xml", manifest_xml(&[("a", "a.html")]).as_bytes()),
        ("a.html", br#"<head></head><img src="nope.gif">"#.as_slice()),
    ]);
    let (_loader, descriptor) = loaded(&archive);
    assert_eq!(descriptor.unresolved_references.len(), 1);
    assert_eq!(descriptor.unresolved_references[0].reference, "nope.gif");
    assert_eq!(descriptor.unresolved_references[0].source_path, "a.html");
}

// Covers: links one directory shallower than the archive layout
#[test]
fn test_navigation_resolves_when_archive_is_nested_deeper() {
    let archive = build_zip(&[
        (
            "imsmanifest.xml",
            manifest_xml(&[("intro", "index.html")]).as_bytes(),
        ),
        (
            "course/index.html",
            br#"<html><head></head><body><a href="page2.html">Next</a></body></html>"#.as_slice(),
        ),
        (
            "course/page2.html",
            b"<html><head></head><body>Second page</body></html>".as_slice(),
        ),
    ]);
    let (mut loader, descriptor) = loaded(&archive);

    let page = loader.content_for(&descriptor.launchable_units[0]).unwrap();
    assert!(page.contains("window._scormNavigate('page2.html')"));
    assert_eq!(loader.current_page(), Some("course/index.html"));

    let next = loader.navigate("page2.html").unwrap();
    assert!(next.contains("Second page"));
    assert_eq!(loader.current_page(), Some("course/page2.html"));

    assert_eq!(
        loader.navigate("missing.html").unwrap_err(),
        PackageError::PageNotFound("missing.html".into())
    );
    assert_eq!(loader.current_page(), Some("course/page2.html"));
}

#[test]
fn test_manifest_lookup_is_case_insensitive_and_first_wins() {
    let archive = build_zip(&[
        (
            "pkg/IMSMANIFEST.XML",
            manifest_xml(&[("a", "start.htm")]).as_bytes(),
        ),
        (
            "other/imsmanifest.xml",
            manifest_xml(&[("b", "other.htm")]).as_bytes(),
        ),
        ("pkg/start.htm", b"<p>start</p>".as_slice()),
    ]);
    let (mut loader, descriptor) = loaded(&archive);

    assert_eq!(descriptor.manifest_path, "pkg/IMSMANIFEST.XML");
    let page = loader.content_for(&descriptor.launchable_units[0]).unwrap();
    assert!(page.ends_with("<p>start</p>"));
    assert_eq!(loader.current_page(), Some("pkg/start.htm"));
}

#[test]
fn test_unit_url_appends_launch_parameters() {
    let (loader, descriptor) = loaded(&basic_archive());
    let mut unit = descriptor.launchable_units[0].clone();
    let base = loader.file_url("index.html").unwrap().to_string();

    assert_eq!(loader.unit_url(&unit).unwrap(), base);

    unit.launch_parameters = "lang=en".into();
    assert_eq!(loader.unit_url(&unit).unwrap(), format!("{base}?lang=en"));

    unit.launch_parameters = "?lang=fr".into();
    assert_eq!(loader.unit_url(&unit).unwrap(), format!("{base}?lang=fr"));

    unit.entry_path = "absent.html".into();
    assert_eq!(
        loader.unit_url(&unit).unwrap_err(),
        PackageError::UnitFileNotFound("absent.html".into())
    );
}

#[test]
fn test_unsafe_entries_are_skipped() {
    let archive = build_zip(&[
        (
            "imsmanifest.xml",
            manifest_xml(&[("a", "index.html")]).as_bytes(),
        ),
        ("index.html", b"<p>x</p>".as_slice()),
        ("../escape.txt", b"nope".as_slice()),
    ]);
    let (loader, descriptor) = loaded(&archive);

    assert_eq!(descriptor.file_count, 2);
    assert!(loader.files().unwrap().keys().all(|p| !p.contains("..")));
}

#[test]
fn test_limits_are_enforced() {
    let archive = basic_archive();

    let mut few_entries = PackageLoader::new(LoaderOptions {
        max_entries: 2,
        ..LoaderOptions::default()
    });
    assert!(matches!(
        few_entries.load("course.zip", &archive).unwrap_err(),
        PackageError::ArchiveTooLarge(_)
    ));

    let mut few_bytes = PackageLoader::new(LoaderOptions {
        max_uncompressed_bytes: 64,
        ..LoaderOptions::default()
    });
    assert!(matches!(
        few_bytes.load("course.zip", &archive).unwrap_err(),
        PackageError::ArchiveTooLarge(_)
    ));
}

#[test]
fn test_reload_and_cleanup_release_previous_handles() {
    let (mut loader, descriptor) = loaded(&basic_archive());
    let old_uri = loader.file_url("img.png").unwrap().to_string();
    loader.content_for(&descriptor.launchable_units[0]).unwrap();

    loader.load("again.zip", &basic_archive()).unwrap();
    assert!(loader.resource(&old_uri).is_none());
    assert_eq!(loader.current_page(), None);
    assert_eq!(loader.descriptor().unwrap().name, "again");

    loader.cleanup();
    loader.cleanup();
    assert!(!loader.is_loaded());
    assert_eq!(
        loader.content_for(&descriptor.launchable_units[0]).unwrap_err(),
        PackageError::NotLoaded
    );
    assert_eq!(loader.navigate("index.html").unwrap_err(), PackageError::NotLoaded);
}

#[test]
fn test_failed_load_leaves_no_package_installed() {
    let (mut loader, _) = loaded(&basic_archive());
    assert!(loader.load("broken.zip", b"junk").is_err());
    assert!(!loader.is_loaded());
}
