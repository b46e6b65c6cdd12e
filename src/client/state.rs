use std::sync::Arc;

use crate::model::Palette;

/// Immutable view of the palette collection as last seen by the client.
///
/// Every transition builds a new snapshot; nothing mutates one in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientState {
    palettes: Arc<Vec<Palette>>,
    loading: bool,
    error: Option<String>,
    stale: bool,
}

impl ClientState {
    /// Last successfully fetched collection.
    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    /// True only while a refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed refresh, cleared when the next one starts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The palettes predate a failed refresh and may not match the server.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub(crate) fn loading(&self) -> Self {
        Self {
            palettes: Arc::clone(&self.palettes),
            loading: true,
            error: None,
            stale: self.stale,
        }
    }

    pub(crate) fn loaded(palettes: Vec<Palette>) -> Self {
        Self {
            palettes: Arc::new(palettes),
            loading: false,
            error: None,
            stale: false,
        }
    }

    pub(crate) fn failed(&self, message: String) -> Self {
        Self {
            palettes: Arc::clone(&self.palettes),
            loading: false,
            error: Some(message),
            stale: true,
        }
    }
}
