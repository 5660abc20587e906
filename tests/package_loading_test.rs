mod common;

use common::{build_zip, init_logger, INDEX_HTML, PNG, SINGLE_SCO_MANIFEST, STYLE_CSS};
use scorm_sandbox_lib::services::config::LoaderOptions;
use scorm_sandbox_lib::services::package::PackageLoader;
use scorm_sandbox_lib::types::errors::PackageError;

// Covers: archive without imsmanifest.xml
#[test]
fn test_load_without_manifest_fails() {
    init_logger();
    let archive = build_zip(&[
        ("index.html", INDEX_HTML.as_bytes()),
        ("style.css", STYLE_CSS.as_bytes()),
    ]);
    let mut loader = PackageLoader::new(LoaderOptions::default());

    let err = loader.load("golf.zip", &archive).unwrap_err();

    assert_eq!(err, PackageError::ManifestMissing);
    assert_eq!(err.to_string(), "imsmanifest.xml not found");
}

// Covers: only item references a resource without a scorm type
#[test]
fn test_load_without_sco_fails() {
    init_logger();
    let manifest = SINGLE_SCO_MANIFEST.replace(r#"adlcp:scormType="sco" "#, "");
    let archive = build_zip(&[
        ("imsmanifest.xml", manifest.as_bytes()),
        ("index.html", INDEX_HTML.as_bytes()),
    ]);
    let mut loader = PackageLoader::new(LoaderOptions::default());

    assert_eq!(
        loader.load("golf.zip", &archive).unwrap_err(),
        PackageError::NoLaunchableUnits
    );
}

// Covers: imsmanifest.xml + index.html + style.css + img.png
#[test]
fn test_four_file_package_end_to_end() {
    init_logger();
    let archive = build_zip(&[
        ("imsmanifest.xml", SINGLE_SCO_MANIFEST.as_bytes()),
        ("index.html", INDEX_HTML.as_bytes()),
        ("style.css", STYLE_CSS.as_bytes()),
        ("img.png", PNG),
    ]);
    let mut loader = PackageLoader::new(LoaderOptions::default());

    let descriptor = loader.load("Golf Explained.zip", &archive).unwrap();

    assert_eq!(descriptor.name, "Golf Explained");
    assert_eq!(descriptor.manifest.schema_version, "1.2");
    assert_eq!(descriptor.launchable_units.len(), 1);
    let unit = &descriptor.launchable_units[0];
    assert_eq!(unit.title, "Playing the Game");
    assert_eq!(unit.breadcrumb, "Playing the Game");
    assert_eq!(unit.launch_parameters, "?mode=intro");

    let page = loader.content_for(unit).unwrap();
    let img_uri = loader.file_url("img.png").unwrap().to_string();
    assert!(page.contains(&img_uri));
    assert!(!page.contains(r#"src="img.png""#));
    assert!(page.contains("window.parent.API"));
    assert!(page.contains(r#"onclick="return window._scormNavigate('next.html')""#));

    // The stylesheet was rewritten before markup, so its handle serves the
    // rewritten text
    let css_uri = loader.file_url("style.css").unwrap().to_string();
    let css = loader.resource(&css_uri).unwrap();
    assert!(String::from_utf8_lossy(&css.bytes).contains(&img_uri));

    let url = loader.unit_url(unit).unwrap();
    assert!(url.ends_with("?mode=intro"));
    assert!(url.starts_with("blob:scorm-sandbox/"));
}

// Covers: sibling navigation when the archive adds a wrapper folder
#[test]
fn test_sibling_navigation_with_extra_wrapper_folder() {
    init_logger();
    let page_one = r#"<html><head></head><body><a href="page2.html">Next</a></body></html>"#;
    let page_two = r#"<html><head></head><body><a href="page1.html">Back</a> two</body></html>"#;
    let manifest = SINGLE_SCO_MANIFEST.replace(r#"href="index.html""#, r#"href="page1.html""#);
    let archive = build_zip(&[
        ("imsmanifest.xml", manifest.as_bytes()),
        ("export/lesson/page1.html", page_one.as_bytes()),
        ("export/lesson/page2.html", page_two.as_bytes()),
    ]);
    let mut loader = PackageLoader::new(LoaderOptions::default());
    let descriptor = loader.load("nested.zip", &archive).unwrap();

    loader.content_for(&descriptor.launchable_units[0]).unwrap();
    assert_eq!(loader.current_page(), Some("export/lesson/page1.html"));

    let second = loader.navigate("page2.html").unwrap();
    assert!(second.contains("two"));
    assert_eq!(loader.current_page(), Some("export/lesson/page2.html"));

    loader.navigate("page1.html").unwrap();
    assert_eq!(loader.current_page(), Some("export/lesson/page1.html"));
}

#[test]
fn test_percent_encoded_references_resolve() {
    init_logger();
    let page = r#"<html><head></head><body><img src="my%20image.png"></body></html>"#;
    let manifest = SINGLE_SCO_MANIFEST.replace(r#"href="index.html""#, r#"href="start.html""#);
    let archive = build_zip(&[
        ("imsmanifest.xml", manifest.as_bytes()),
        ("start.html", page.as_bytes()),
        ("my image.png", PNG),
    ]);
    let mut loader = PackageLoader::new(LoaderOptions::default());
    let descriptor = loader.load("enc.zip", &archive).unwrap();

    let text = loader.content_for(&descriptor.launchable_units[0]).unwrap();

    assert!(text.contains(loader.file_url("my image.png").unwrap()));
    assert!(descriptor.unresolved_references.is_empty());
}
