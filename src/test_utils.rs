use std::io::{Cursor, Write};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Build a stored (uncompressed) ZIP in memory.
pub fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    for (entry_name, content) in files {
        writer.start_file(entry_name.to_string(), options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Minimal SCORM 1.2 manifest with one SCO per `(identifier, href)` pair.
pub fn manifest_xml(scos: &[(&str, &str)]) -> String {
    let items: String = scos
        .iter()
        .map(|(id, _)| {
            format!(
                r#"<item identifier="item_{id}" identifierref="res_{id}"><title>Lesson {id}</title></item>"#
            )
        })
        .collect();
    let resources: String = scos
        .iter()
        .map(|(id, href)| {
            format!(
                r#"<resource identifier="res_{id}" type="webcontent" adlcp:scormtype="sco" href="{href}"><file href="{href}"/></resource>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="test_course" version="1.0"
    xmlns="http://www.imsproject.org/xsd/imscp_rootv1p1p2"
    xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_rootv1p2">
  <metadata><schemaversion>1.2</schemaversion></metadata>
  <organizations default="org">
    <organization identifier="org"><title>Test Course</title>{items}</organization>
  </organizations>
  <resources>{resources}</resources>
</manifest>"#
    )
}
