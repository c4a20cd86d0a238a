use anyhow::Context;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use zip::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::Error;

const SIZE_HINT_CAP: u64 = 1 << 26;

// Declared entry sizes come from the archive and are not trusted for allocation.
fn size_hint(declared: u64) -> usize {
    usize::try_from(declared.min(SIZE_HINT_CAP)).unwrap_or(0)
}

/// Extracts a competition bundle whose top-level entries are themselves zip
/// archives. Each entry `name.ext` is unpacked into `dest/name/`, overwriting
/// earlier extractions. Returns the created directories.
pub fn extract_nested(archive_path: &Path, dest: &Path) -> Result<Vec<PathBuf>, Error> {
    let file = fs::File::open(archive_path).map_err(|e| {
        Error::Extraction(format!("failed to open {}: {e}", archive_path.display()))
    })?;
    let mut outer = ZipArchive::new(file).map_err(|e| {
        Error::Extraction(format!(
            "failed to read zip archive {}: {e}",
            archive_path.display()
        ))
    })?;

    let mut extracted = Vec::new();
    for i in 0..outer.len() {
        let mut entry = outer.by_index(i).map_err(|e| {
            Error::Extraction(format!("failed to read entry {i} of {}: {e}", archive_path.display()))
        })?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| Error::Extraction(format!("entry {name:?} escapes the destination")))?
            .with_extension("");
        let unarchived = dest.join(relative);

        let mut content = Vec::with_capacity(size_hint(entry.size()));
        entry
            .read_to_end(&mut content)
            .map_err(|e| Error::Extraction(format!("failed to read entry {name:?}: {e}")))?;

        let mut inner = ZipArchive::new(Cursor::new(content)).map_err(|e| {
            Error::Extraction(format!("entry {name:?} is not a nested zip archive: {e}"))
        })?;
        fs::create_dir_all(&unarchived).map_err(|e| {
            Error::Extraction(format!("failed to create {}: {e}", unarchived.display()))
        })?;
        inner.extract(&unarchived).map_err(|e| {
            Error::Extraction(format!(
                "failed to extract {name:?} to {}: {e}",
                unarchived.display()
            ))
        })?;

        log::debug!("[extract] {} -> {}", name, unarchived.display());
        extracted.push(unarchived);
    }

    Ok(extracted)
}

/// Extracts `zip_path` into `dest_dir`, removing the archive afterwards when
/// `delete_after` is set.
pub(crate) fn extract_flat(zip_path: &Path, dest_dir: &Path, delete_after: bool) -> anyhow::Result<()> {
    let file = fs::File::open(zip_path)
        .with_context(|| format!("failed to open {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("failed to read zip archive {}", zip_path.display()))?;

    archive
        .extract(dest_dir)
        .with_context(|| format!("failed to extract {} to {}", zip_path.display(), dest_dir.display()))?;

    if delete_after {
        fs::remove_file(zip_path)
            .with_context(|| format!("failed to delete {}", zip_path.display()))?;
    }

    Ok(())
}

/// Zips the contents of `dir` into memory, with paths relative to `dir`.
pub(crate) fn zip_directory(dir: &Path) -> anyhow::Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = fs::read_dir(&current)
            .with_context(|| format!("failed to list {}", current.display()))?
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let name = path
                .strip_prefix(dir)?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if path.is_dir() {
                writer.add_directory(format!("{name}/"), options)?;
                pending.push(path);
            } else {
                writer.start_file(name, options)?;
                let bytes = fs::read(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                writer.write_all(&bytes)?;
            }
        }
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn declared_sizes_are_capped_before_allocating() {
        assert_eq!(size_hint(512), 512);
        assert_eq!(size_hint(u64::MAX), 1 << 26);
    }

    #[test]
    fn an_entry_with_an_inflated_declared_size_fails_cleanly() {
        let mut outer = ZipWriter::new(Cursor::new(Vec::new()));
        outer.start_file("readme.txt", SimpleFileOptions::default()).unwrap();
        outer.write_all(b"tiny").unwrap();
        let mut bytes = outer.finish().unwrap().into_inner();

        let central = bytes
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .expect("central directory header");
        bytes[central + 24..central + 28].copy_from_slice(&0xF000_0000u32.to_le_bytes());

        let dir = tempdir().expect("tempdir");
        let archive = dir.path().join("bundle.zip");
        fs::write(&archive, bytes).unwrap();
        let err = extract_nested(&archive, &dir.path().join("out")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Extraction);
    }

    #[test]
    fn zipped_directories_extract_back_to_the_same_tree() {
        let src = tempdir().expect("tempdir");
        fs::create_dir_all(src.path().join("images/train")).unwrap();
        fs::write(src.path().join("labels.csv"), "id,label\n1,cat\n").unwrap();
        fs::write(src.path().join("images/train/1.txt"), b"\x00\x01pixels").unwrap();

        let bytes = zip_directory(src.path()).expect("zip");
        let out = tempdir().expect("tempdir");
        let zip_path = out.path().join("bundle.zip");
        fs::write(&zip_path, bytes).unwrap();

        extract_flat(&zip_path, out.path(), true).expect("extract");
        assert!(!zip_path.exists());
        assert_eq!(
            fs::read_to_string(out.path().join("labels.csv")).unwrap(),
            "id,label\n1,cat\n"
        );
        assert_eq!(
            fs::read(out.path().join("images/train/1.txt")).unwrap(),
            b"\x00\x01pixels"
        );
    }
}
