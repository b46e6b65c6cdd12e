use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{Color, ColorError};

pub const MIN_COLORS: usize = 3;
pub const MAX_COLORS: usize = 9;
pub const MAX_NAME_LEN: usize = 48;

/// Colors a freshly created palette starts with.
pub const DEFAULT_COLORS: [&str; 3] = ["#8b6fff", "#c47fff", "#4ade80"];

/// A named, ordered list of `#rrggbb` colors.
///
/// Colors stay plain strings on the wire and on disk; only palettes created
/// through [`Palette::new`] are checked against the creation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,
    pub colors: Vec<String>,
}

/// Reasons a palette is rejected at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("Give your palette a name.")]
    NameEmpty,
    #[error("palette name is longer than {} characters", MAX_NAME_LEN)]
    NameTooLong,
    #[error("Add at least {} colors.", MIN_COLORS)]
    TooFewColors,
    #[error("a palette holds at most {} colors", MAX_COLORS)]
    TooManyColors,
    #[error(transparent)]
    Color(#[from] ColorError),
}

impl Palette {
    /// Build a palette from user input.
    ///
    /// The name is trimmed and the colors are normalized to lowercase
    /// `#rrggbb`.
    pub fn new<S: AsRef<str>>(name: &str, colors: &[S]) -> Result<Self, PaletteError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PaletteError::NameEmpty);
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(PaletteError::NameTooLong);
        }
        if colors.len() < MIN_COLORS {
            return Err(PaletteError::TooFewColors);
        }
        if colors.len() > MAX_COLORS {
            return Err(PaletteError::TooManyColors);
        }
        let colors = colors
            .iter()
            .map(|c| Color::from_hex(c.as_ref()).map(Color::to_hex))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.to_string(),
            colors,
        })
    }

    /// Parsed colors, skipping entries that are not valid hex.
    pub fn parsed_colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.colors.iter().filter_map(|c| Color::from_hex(c).ok())
    }
}

/// Fill a color list up to `count` entries: the defaults first, then random
/// colors.
pub fn starter_colors(count: usize) -> Vec<String> {
    let count = count.clamp(MIN_COLORS, MAX_COLORS);
    DEFAULT_COLORS
        .iter()
        .map(|c| c.to_string())
        .chain(std::iter::repeat_with(|| Color::random().to_hex()))
        .take(count)
        .collect()
}
