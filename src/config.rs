//! Render parameters and configuration files.
//!
//! [`Parameters`] is everything one render needs: where the photographs are,
//! where the mosaic goes, which catalog and layout to use, and the single
//! `scale` multiplier every pixel metric derives from.
//!
//! ## Scaling law
//!
//! Pixel sizes are fixed base constants multiplied by `scale` and truncated:
//!
//! | Metric | Base | At `scale = 3.0` |
//! |---|---|---|
//! | cell (thumbnail) size | 100 | 300 |
//! | label font size | 10 | 30 |
//! | title font size | 42 | 126 |
//! | outer padding | 5 | 15 |
//! | label clearance above cell bottom | 7 | 21 |
//!
//! ## Persisted record
//!
//! Parameters round-trip through a flat record (JSON in the settings store,
//! TOML in `mosaic.toml`):
//!
//! ```toml
//! input_folder = "images"
//! output_file = "messier_catalog.png"
//! title = "Messier Catalog"
//! catalog = "messier"
//! layout_mode = "Enhanced"    # or "Basic": every item gets one cell
//! grid_cols = 17
//! scale = 3.0
//! font_path = "/System/Library/Fonts/HelveticaNeue.ttc"
//! show_progress = true
//!
//! [[layout]]
//! numbers = [8, 20]
//! x = 2
//! y = 2
//! width = 2
//! height = 3
//! ```
//!
//! Writing is plain `Serialize`. Reading is lenient: each key is decoded on
//! its own, a missing key takes the catalog default, and a key with the
//! wrong shape or out of range (a list where a number belongs, a zero-width
//! layout entry, a region far outside the grid) is logged and replaced by its
//! default. Only a file that is not valid TOML at all is an error.

use crate::catalog::Catalog;
use crate::layout::MAX_GRID_EXTENT;
use crate::special::{self, SpecialObject};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

// Base metrics, multiplied by `scale`.
pub const THUMB_SIZE: u32 = 100;
pub const FONT_SIZE: u32 = 10;
pub const TITLE_FONT_SIZE: u32 = 42;
pub const PADDING: u32 = 5;
pub const LABEL_BOTTOM_SPACE: u32 = 7;

pub const DEFAULT_GRID_COLS: u32 = 17;
pub const DEFAULT_SCALE: f64 = 3.0;
/// 1000px cells.
pub const MAX_SCALE: f64 = 10.0;
pub const DEFAULT_FONT_PATH: &str = "/System/Library/Fonts/HelveticaNeue.ttc";

/// `floor(base * scale)`; non-finite or negative products clamp to 0.
pub fn scaled(base: u32, scale: f64) -> u32 {
    let value = (base as f64 * scale).floor();
    if value.is_finite() && value > 0.0 {
        value.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Whether special regions are honored.
///
/// Written as `"Basic"` / `"Enhanced"`; read case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum LayoutMode {
    /// Every catalog number gets a plain 1×1 cell.
    Basic,
    #[default]
    Enhanced,
}

impl LayoutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutMode::Basic => "Basic",
            LayoutMode::Enhanced => "Enhanced",
        }
    }

    pub fn parse(text: &str) -> Option<LayoutMode> {
        match text.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(LayoutMode::Basic),
            "enhanced" => Some(LayoutMode::Enhanced),
            _ => None,
        }
    }
}

impl TryFrom<String> for LayoutMode {
    type Error = String;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        LayoutMode::parse(&text).ok_or_else(|| format!("unknown layout mode {text:?}"))
    }
}

/// Configuration for one render. Serializes to the persisted record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    pub input_folder: PathBuf,
    pub output_file: PathBuf,
    pub title: String,
    pub catalog: Catalog,
    /// Special regions. Ignored (not cleared) in [`LayoutMode::Basic`].
    pub layout: Vec<SpecialObject>,
    pub layout_mode: LayoutMode,
    pub grid_cols: u32,
    pub scale: f64,
    pub font_path: PathBuf,
    /// Draw the "loaded / total" readout when the catalog is incomplete.
    pub show_progress: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Self::for_catalog(Catalog::default())
    }
}

impl Parameters {
    /// Fresh defaults for a catalog, including its default layout.
    pub fn for_catalog(catalog: Catalog) -> Self {
        Self {
            input_folder: PathBuf::new(),
            output_file: PathBuf::from(format!("{}_catalog.png", catalog.id())),
            title: catalog.title().to_string(),
            catalog,
            layout: special::default_layout(catalog),
            layout_mode: LayoutMode::Enhanced,
            grid_cols: DEFAULT_GRID_COLS,
            scale: DEFAULT_SCALE,
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            show_progress: true,
        }
    }

    /// The special regions the layout engine should honor.
    pub fn effective_layout(&self) -> &[SpecialObject] {
        match self.layout_mode {
            LayoutMode::Basic => &[],
            LayoutMode::Enhanced => &self.layout,
        }
    }

    pub fn thumb_size(&self) -> u32 {
        scaled(THUMB_SIZE, self.scale)
    }

    pub fn font_size(&self) -> u32 {
        scaled(FONT_SIZE, self.scale)
    }

    pub fn title_font_size(&self) -> u32 {
        scaled(TITLE_FONT_SIZE, self.scale)
    }

    pub fn padding(&self) -> u32 {
        scaled(PADDING, self.scale)
    }

    pub fn label_bottom_space(&self) -> u32 {
        scaled(LABEL_BOTTOM_SPACE, self.scale)
    }

    /// Reject values no render can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_GRID_EXTENT).contains(&self.grid_cols) {
            return Err(ConfigError::Validation(format!(
                "grid_cols must be between 1 and {MAX_GRID_EXTENT}"
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::Validation(
                "scale must be a positive number".into(),
            ));
        }
        if self.scale > MAX_SCALE {
            return Err(ConfigError::Validation(format!(
                "scale must be at most {MAX_SCALE}"
            )));
        }
        if self.thumb_size() == 0 {
            return Err(ConfigError::Validation(
                "scale is too small: cells would be 0px".into(),
            ));
        }
        for (i, obj) in self.layout.iter().enumerate() {
            if let Some(problem) = region_problem(obj) {
                return Err(ConfigError::Validation(format!(
                    "layout entry {i} {:?} {problem}",
                    obj.numbers
                )));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Persisted record
    // =========================================================================

    /// Serialize to the flat persisted record.
    ///
    /// Fails only for paths that are not valid UTF-8.
    pub fn to_value(&self) -> Result<Value, ConfigError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Read a persisted record. Never fails; see the [module docs](self).
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let record = match value.as_object() {
            Some(map) => map,
            None => {
                log::warn!("settings record is not an object; using defaults");
                &empty
            }
        };

        let catalog = field::<Catalog>(record, "catalog").unwrap_or_default();
        let mut params = Self::for_catalog(catalog);

        if let Some(v) = field(record, "input_folder") {
            params.input_folder = v;
        }
        if let Some(v) = field(record, "output_file") {
            params.output_file = v;
        }
        if let Some(v) = field(record, "title") {
            params.title = v;
        }
        if let Some(v) = field(record, "font_path") {
            params.font_path = v;
        }
        if let Some(v) = field(record, "layout_mode") {
            params.layout_mode = v;
        }
        // Decoded as f64 so that `17.0` is read as 17
        if let Some(v) = checked_field::<f64>(record, "grid_cols", |n| {
            n.fract() == 0.0 && (1.0..=MAX_GRID_EXTENT as f64).contains(n)
        }) {
            params.grid_cols = v as u32;
        }
        if let Some(v) = checked_field::<f64>(record, "scale", |s| {
            s.is_finite() && *s > 0.0 && *s <= MAX_SCALE
        }) {
            params.scale = v;
        }
        if let Some(v) = field(record, "show_progress") {
            params.show_progress = v;
        }
        if let Some(entries) = field::<Vec<Value>>(record, "layout") {
            params.layout = entries
                .iter()
                .enumerate()
                .filter_map(|(i, entry)| layout_entry(i, entry))
                .collect();
        }
        params
    }
}

/// Decode `key` with serde; a present-but-malformed value is logged.
fn field<T: DeserializeOwned>(record: &Map<String, Value>, key: &str) -> Option<T> {
    checked_field(record, key, |_| true)
}

/// [`field`], also rejecting decoded values that fail `accept`.
fn checked_field<T: DeserializeOwned>(
    record: &Map<String, Value>,
    key: &str,
    accept: impl FnOnce(&T) -> bool,
) -> Option<T> {
    let raw = record.get(key)?;
    match T::deserialize(raw) {
        Ok(value) if accept(&value) => Some(value),
        Ok(_) => {
            log::warn!("ignoring out-of-range setting {key} = {raw}; using default");
            None
        }
        Err(e) => {
            log::warn!("ignoring malformed setting {key} = {raw} ({e}); using default");
            None
        }
    }
}

fn layout_entry(index: usize, entry: &Value) -> Option<SpecialObject> {
    match SpecialObject::deserialize(entry) {
        Ok(obj) => match region_problem(&obj) {
            None => Some(obj),
            Some(problem) => {
                log::warn!("skipping layout entry {index}: {entry} {problem}");
                None
            }
        },
        Err(e) => {
            log::warn!("skipping malformed layout entry {index}: {entry} ({e})");
            None
        }
    }
}

/// Why a special region can't be laid out, if it can't.
fn region_problem(obj: &SpecialObject) -> Option<&'static str> {
    if obj.numbers.is_empty() {
        Some("lists no catalog numbers")
    } else if obj.numbers.contains(&0) {
        Some("lists catalog number 0")
    } else if obj.width == 0 || obj.height == 0 {
        Some("has no width or height")
    } else if !obj.fits_within(MAX_GRID_EXTENT) {
        Some("reaches too far outside the grid")
    } else {
        None
    }
}

// =============================================================================
// Config file loading and layering
// =============================================================================

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "mosaic.toml";

/// The stock parameters of a catalog as a TOML table, the base layer for
/// merging user overrides.
pub fn stock_defaults_value(catalog: Catalog) -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Parameters::for_catalog(catalog))?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value (arrays included)
/// replaces the base value outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut merged), toml::Value::Table(overrides)) => {
            for (key, value) in overrides {
                let value = match merged.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            toml::Value::Table(merged)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as raw TOML. `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Layer an optional overlay on the stock defaults of its catalog.
///
/// The catalog named in the overlay (if any) decides which stock defaults
/// form the base, so a Caldwell config file starts from the Caldwell layout.
pub fn resolve_parameters(
    fallback_catalog: Catalog,
    overlay: Option<toml::Value>,
) -> Result<Parameters, ConfigError> {
    let catalog = overlay
        .as_ref()
        .and_then(|ov| ov.get("catalog"))
        .and_then(toml::Value::as_str)
        .map(Catalog::from_id)
        .unwrap_or(fallback_catalog);
    let base = stock_defaults_value(catalog)?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let record = serde_json::to_value(&merged)?;
    Ok(Parameters::from_value(&record))
}

/// Load parameters from a config file layered on stock defaults.
pub fn load_config(path: &Path, fallback_catalog: Catalog) -> Result<Parameters, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_parameters(fallback_catalog, overlay)
}

/// A fully commented stock `mosaic.toml` (the `gen-config` command).
pub fn stock_config_toml() -> &'static str {
    r##"# Astro Mosaic Configuration
# ==========================
# All settings are optional. Values shown below are the Messier defaults.
# Command-line flags override anything set here.

# Folder scanned for catalog images. Files must be named
# <prefix><separator?><number>..., e.g. M31.jpg, M_42_orion.png, C-20.tif
input_folder = ""

# Where the mosaic is written. The format follows the extension:
# .png, .jpg/.jpeg (saved at maximum quality) or .tif/.tiff
output_file = "messier_catalog.png"

# Text drawn in the title band above the grid.
title = "Messier Catalog"

# Which catalog to lay out: "messier" (110 items) or "caldwell" (109 items).
catalog = "messier"

# "Enhanced" honors the [[layout]] regions below.
# "Basic" ignores them and gives every item a single cell.
layout_mode = "Enhanced"

# Number of grid columns. Rows are computed from the catalog size.
grid_cols = 17

# Multiplier for every pixel size. 1.0 gives 100px cells, 3.0 gives 300px.
scale = 3.0

# TrueType/OpenType font for labels and the title.
# A built-in bitmap font is used when this file can't be read.
font_path = "/System/Library/Fonts/HelveticaNeue.ttc"

# Draw "Progress: loaded / total" when some images are missing.
show_progress = true

# ---------------------------------------------------------------------------
# Special regions: objects that span several cells.
# x/y are the top-left cell (0-based, y excludes the title row).
# Several numbers share one region and one photograph.
# ---------------------------------------------------------------------------
[[layout]]
numbers = [8, 20]      # Lagoon + Trifid
x = 2
y = 2
width = 2
height = 3

[[layout]]
numbers = [16]         # Eagle
x = 14
y = 2
width = 2
height = 2

[[layout]]
numbers = [31, 32, 110] # Andromeda
x = 7
y = 2
width = 4
height = 2

[[layout]]
numbers = [33]         # Triangulum
x = 1
y = 6
width = 3
height = 2

[[layout]]
numbers = [42, 43]     # Orion
x = 6
y = 5
width = 2
height = 3

[[layout]]
numbers = [45]         # Pleiades
x = 13
y = 5
width = 2
height = 2
"##
}
