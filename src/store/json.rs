use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::model::Palette;

use super::{PaletteStore, StoreError};

/// Palette collection kept as a single pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Seed the file with an empty collection unless it already exists.
    ///
    /// Returns `true` when a new file was written.
    pub fn create_if_missing(&self) -> Result<bool, StoreError> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| StoreError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        self.save(&[])?;
        Ok(true)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl PaletteStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Palette>, StoreError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, palettes: &[Palette]) -> Result<(), StoreError> {
        let payload = serde_json::to_string_pretty(palettes).map_err(StoreError::Serialize)?;
        let tmp_path = self.tmp_path();
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        std::fs::write(&tmp_path, payload.as_bytes()).map_err(write_err)?;
        std::fs::rename(&tmp_path, &self.path).map_err(write_err)?;
        log::debug!(
            "saved {} palettes to {}",
            palettes.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn temp_store(name: &str) -> (PathBuf, JsonFileStore) {
        let dir = std::env::temp_dir().join(format!("koralowy-test-store-{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let store = JsonFileStore::new(dir.join("palettes.json"));
        (dir, store)
    }

    fn palette(name: &str) -> Palette {
        Palette {
            name: name.to_string(),
            colors: vec![
                "#ff0000".to_string(),
                "#ff9900".to_string(),
                "#ffff00".to_string(),
            ],
        }
    }

    #[test]
    fn load_missing_file_is_storage_unavailable() {
        let (dir, store) = temp_store("missing");
        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
        assert!(err.is_storage_unavailable());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_non_array_is_parse_error() {
        let (dir, store) = temp_store("non-array");
        std::fs::write(store.path(), r#"{"not":"an array"}"#).unwrap();
        assert!(matches!(store.load(), Err(StoreError::Parse { .. })));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_rejects_malformed_entries() {
        let (dir, store) = temp_store("malformed");
        std::fs::write(store.path(), r##"[{"name":"x","colors":"#fff"}]"##).unwrap();
        assert!(matches!(store.load(), Err(StoreError::Parse { .. })));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn create_if_missing_seeds_empty_array_once() {
        let (dir, store) = temp_store("seed");
        assert!(store.create_if_missing().unwrap());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[]");
        store.append(palette("Kept")).unwrap();
        assert!(!store.create_if_missing().unwrap());
        assert_eq!(store.load().unwrap(), vec![palette("Kept")]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn save_writes_pretty_json_and_leaves_no_temp_file() {
        let (dir, store) = temp_store("pretty");
        store.save(&[palette("Sunset")]).unwrap();
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with("[\n  {\n    \"name\": \"Sunset\""));
        assert!(!store.tmp_path().exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn append_returns_palette_unchanged() {
        let (dir, store) = temp_store("append");
        store.create_if_missing().unwrap();
        let appended = store.append(palette("Sunset")).unwrap();
        assert_eq!(appended, palette("Sunset"));
        assert_eq!(store.load().unwrap(), vec![palette("Sunset")]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn append_to_unreadable_file_writes_nothing() {
        let (dir, store) = temp_store("append-corrupt");
        std::fs::write(store.path(), "not json").unwrap();
        assert!(store.append(palette("Lost")).is_err());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "not json");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn remove_out_of_range_leaves_file_untouched() {
        let (dir, store) = temp_store("remove-oob");
        store.save(&[palette("A"), palette("B")]).unwrap();
        let before = std::fs::read(store.path()).unwrap();

        for index in [2, 5, -1] {
            let err = store.remove_at(index).unwrap_err();
            assert!(matches!(
                err,
                StoreError::IndexOutOfRange { len: 2, .. }
            ));
            assert!(!err.is_storage_unavailable());
        }

        assert_eq!(std::fs::read(store.path()).unwrap(), before);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn replace_discards_previous_contents() {
        let (dir, store) = temp_store("replace");
        store.save(&[palette("Old")]).unwrap();
        store.replace(&[palette("New"), palette("Newer")]).unwrap();
        assert_eq!(store.load().unwrap(), vec![palette("New"), palette("Newer")]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    fn arb_palette() -> impl Strategy<Value = Palette> {
        (
            "[A-Za-z ]{1,48}",
            proptest::collection::vec("#[0-9a-f]{6}", 3..=9),
        )
            .prop_map(|(name, colors)| Palette { name, colors })
    }

    proptest! {
        #[test]
        fn append_then_load_adds_at_end(
            existing in proptest::collection::vec(arb_palette(), 0..6),
            extra in arb_palette(),
        ) {
            let (dir, store) = temp_store("prop-append");
            store.replace(&existing).unwrap();
            store.append(extra.clone()).unwrap();

            let mut expected = existing.clone();
            expected.push(extra);
            prop_assert_eq!(store.load().unwrap(), expected);
            std::fs::remove_dir_all(&dir).unwrap();
        }

        #[test]
        fn remove_then_load_keeps_relative_order(
            existing in proptest::collection::vec(arb_palette(), 1..8),
            pick in any::<proptest::sample::Index>(),
        ) {
            let (dir, store) = temp_store("prop-remove");
            store.replace(&existing).unwrap();
            let index = pick.index(existing.len());
            let removed = store.remove_at(index as i64).unwrap();

            let mut expected = existing.clone();
            prop_assert_eq!(expected.remove(index), removed);
            prop_assert_eq!(store.load().unwrap(), expected);
            std::fs::remove_dir_all(&dir).unwrap();
        }

        #[test]
        fn replace_then_load_is_identity(
            palettes in proptest::collection::vec(arb_palette(), 0..8),
        ) {
            let (dir, store) = temp_store("prop-replace");
            store.replace(&palettes).unwrap();
            prop_assert_eq!(store.load().unwrap(), palettes);
            std::fs::remove_dir_all(&dir).unwrap();
        }
    }
}
