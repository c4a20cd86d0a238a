mod support;

use std::fs;

use kaggle_bridge::{ErrorKind, extract_nested};
use support::nested_zip;
use tempfile::tempdir;

#[test]
fn each_entry_lands_in_its_own_directory() {
    let labels: &[u8] = b"id,label\n1,cat\n2,dog\n";
    let pixels: &[u8] = &[0x00, 0xff, 0x10, 0x80, 0x7f];
    let bundle = nested_zip(&[
        ("labels.zip", &[("labels.csv", labels)]),
        ("images.zip", &[("a.bin", pixels), ("nested/b.bin", pixels)]),
    ]);

    let dir = tempdir().expect("tempdir");
    let archive = dir.path().join("bundle.zip");
    fs::write(&archive, bundle).unwrap();
    let dest = dir.path().join("out");

    let mut extracted = extract_nested(&archive, &dest).expect("extract");
    extracted.sort();
    assert_eq!(extracted, vec![dest.join("images"), dest.join("labels")]);

    assert_eq!(fs::read(dest.join("labels").join("labels.csv")).unwrap(), labels);
    assert_eq!(fs::read(dest.join("images").join("a.bin")).unwrap(), pixels);
    assert_eq!(fs::read(dest.join("images").join("nested").join("b.bin")).unwrap(), pixels);
}

#[test]
fn rerunning_overwrites_earlier_output() {
    let dir = tempdir().expect("tempdir");
    let archive = dir.path().join("bundle.zip");
    let dest = dir.path().join("out");

    fs::write(&archive, nested_zip(&[("data.zip", &[("data.txt", b"v1".as_slice())])])).unwrap();
    extract_nested(&archive, &dest).expect("first extraction");

    fs::write(&archive, nested_zip(&[("data.zip", &[("data.txt", b"v2".as_slice())])])).unwrap();
    extract_nested(&archive, &dest).expect("second extraction");

    assert_eq!(fs::read(dest.join("data").join("data.txt")).unwrap(), b"v2");
}

#[test]
fn plain_entries_are_extraction_errors() {
    use std::io::{Cursor, Write};
    use zip::write::{SimpleFileOptions, ZipWriter};

    let mut outer = ZipWriter::new(Cursor::new(Vec::new()));
    outer.start_file("readme.txt", SimpleFileOptions::default()).unwrap();
    outer.write_all(b"not an archive").unwrap();
    let bytes = outer.finish().unwrap().into_inner();

    let dir = tempdir().expect("tempdir");
    let archive = dir.path().join("bundle.zip");
    fs::write(&archive, bytes).unwrap();

    let err = extract_nested(&archive, &dir.path().join("out")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Extraction);
    assert!(err.to_string().contains("readme.txt"));
}

#[test]
fn a_non_zip_bundle_is_an_extraction_error() {
    let dir = tempdir().expect("tempdir");
    let archive = dir.path().join("bundle.zip");
    fs::write(&archive, b"i am data").unwrap();

    let err = extract_nested(&archive, dir.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Extraction);
}

#[test]
fn a_missing_bundle_is_an_extraction_error() {
    let dir = tempdir().expect("tempdir");
    let err = extract_nested(&dir.path().join("absent.zip"), dir.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Extraction);
}
