pub mod json;

use std::path::PathBuf;

use thiserror::Error;

use crate::model::Palette;

pub use json::JsonFileStore;

/// Failures of a [`PaletteStore`] operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not serialize palettes")]
    Serialize(#[source] serde_json::Error),
    #[error("storage task did not complete")]
    Task(#[source] tokio::task::JoinError),
    #[error("index {index} is out of range for {len} palettes")]
    IndexOutOfRange { index: i64, len: usize },
}

impl StoreError {
    /// Whether the backing storage failed, as opposed to a bad request.
    pub fn is_storage_unavailable(&self) -> bool {
        !matches!(self, StoreError::IndexOutOfRange { .. })
    }
}

/// Owner of the persisted palette collection.
///
/// Implementors provide whole-collection [`load`](Self::load) and
/// [`save`](Self::save); the mutating operations are built on top of them as
/// read-modify-write cycles. Nothing serializes concurrent callers, so two
/// overlapping mutations race and the last save wins.
pub trait PaletteStore: Send + Sync {
    /// Read the full ordered collection.
    fn load(&self) -> Result<Vec<Palette>, StoreError>;

    /// Overwrite the collection. Readers never observe a partial write.
    fn save(&self, palettes: &[Palette]) -> Result<(), StoreError>;

    /// Push `palette` to the end of the collection and return it unchanged.
    fn append(&self, palette: Palette) -> Result<Palette, StoreError> {
        let mut palettes = self.load()?;
        palettes.push(palette.clone());
        self.save(&palettes)?;
        Ok(palette)
    }

    /// Discard the stored collection in favor of `palettes`.
    fn replace(&self, palettes: &[Palette]) -> Result<(), StoreError> {
        self.save(palettes)
    }

    /// Remove the palette at `index`. Out-of-range indices write nothing.
    fn remove_at(&self, index: i64) -> Result<Palette, StoreError> {
        let mut palettes = self.load()?;
        let len = palettes.len();
        let position = usize::try_from(index)
            .ok()
            .filter(|&i| i < len)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        let removed = palettes.remove(position);
        self.save(&palettes)?;
        Ok(removed)
    }
}
