// Photo storage - raw files under {photos_dir}/{plant_id}/. Compression and
// reorientation happen upstream; this layer only files bytes.

use crate::error::{GardenLogError, Result};
use crate::util::write_atomic;
use std::path::{Path, PathBuf};

pub struct PhotoStore {
    photos_dir: PathBuf,
}

impl PhotoStore {
    pub fn new(photos_dir: impl Into<PathBuf>) -> Self {
        PhotoStore {
            photos_dir: photos_dir.into(),
        }
    }

    pub fn photos_dir(&self) -> &Path {
        &self.photos_dir
    }

    /// Write one photo under the plant's subdirectory, creating it if
    /// needed. Returns the stored path.
    pub fn store(&self, plant_id: &str, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        validate_component(plant_id, "plant ID")?;
        validate_component(filename, "photo filename")?;

        let dir = self.photos_dir.join(plant_id);
        std::fs::create_dir_all(&dir).map_err(|source| GardenLogError::Persistence {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(filename);
        write_atomic(&path, bytes)?;
        Ok(path)
    }

    /// Filenames stored for a plant, sorted. A plant with no photos (or no
    /// directory yet) yields an empty list.
    pub fn list(&self, plant_id: &str) -> Result<Vec<String>> {
        validate_component(plant_id, "plant ID")?;

        let dir = self.photos_dir.join(plant_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Uploaded names must be a single path component: no separators, no parent
/// traversal, non-empty.
fn validate_component(value: &str, what: &str) -> Result<()> {
    let bad = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains('/')
        || value.contains('\\')
        || value.contains('\0');
    if bad {
        return Err(GardenLogError::Validation(format!(
            "invalid {what}: {value:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_store_and_list() {
        let tmp = TempDir::new().unwrap();
        let photos = PhotoStore::new(tmp.path().join("photos"));

        photos
            .store("basil_001", "basil_001_20251101_0745_01.jpg", b"jpegdata")
            .unwrap();
        photos
            .store("basil_001", "basil_001_20251101_0745_02.jpg", b"jpegdata")
            .unwrap();

        let names = photos.list("basil_001").unwrap();
        assert_eq!(
            names,
            vec![
                "basil_001_20251101_0745_01.jpg",
                "basil_001_20251101_0745_02.jpg"
            ]
        );
    }

    #[test]
    fn test_list_without_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let photos = PhotoStore::new(tmp.path().join("photos"));
        assert!(photos.list("basil_001").unwrap().is_empty());
    }

    #[test]
    fn test_traversal_names_rejected() {
        let tmp = TempDir::new().unwrap();
        let photos = PhotoStore::new(tmp.path().join("photos"));

        for name in ["../escape.jpg", "a/b.jpg", "..", ""] {
            let err = photos.store("basil_001", name, b"x").unwrap_err();
            assert!(matches!(err, GardenLogError::Validation(_)), "{name:?}");
        }

        let err = photos.store("../basil", "ok.jpg", b"x").unwrap_err();
        assert!(matches!(err, GardenLogError::Validation(_)));
    }
}
