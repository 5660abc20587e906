#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

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

pub const SINGLE_SCO_MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="golf" version="1.1"
    xmlns="http://www.imsproject.org/xsd/imscp_rootv1p1p2"
    xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_rootv1p2">
  <metadata><schema>ADL SCORM</schema><schemaversion>1.2</schemaversion></metadata>
  <organizations default="golf_org">
    <organization identifier="golf_org">
      <title>Golf Explained</title>
      <item identifier="item_1" identifierref="res_1" parameters="?mode=intro">
        <title>Playing the Game</title>
      </item>
    </organization>
  </organizations>
  <resources>
    <resource identifier="res_1" type="webcontent" adlcp:scormType="sco" href="index.html">
      <file href="index.html"/>
      <file href="style.css"/>
      <file href="img.png"/>
    </resource>
  </resources>
</manifest>"#;

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Golf</title>
  <link rel="stylesheet" type="text/css" href="style.css">
</head>
<body>
  <img src="img.png" alt="course">
  <a href="next.html">Next</a>
</body>
</html>"#;

pub const STYLE_CSS: &str = "h1 { background-image: url(img.png); }";

pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n0000";
