//! Persisted preferences.
//!
//! The last parameters used for each catalog, and which catalog was selected
//! last, are kept in a single JSON object file:
//!
//! ```json
//! {
//!   "astro_catalog_selected": "caldwell",
//!   "astro_catalog_parameters.messier": { "grid_cols": 17, ... },
//!   "astro_catalog_parameters.caldwell": { "grid_cols": 15, ... }
//! }
//! ```
//!
//! Every read degrades to defaults: a missing file, a missing key or a record
//! of the wrong shape never fails a load. Writes are explicit and surface
//! their IO errors.
//!
//! [`SettingsStore::resolve`] puts the stored record between the stock
//! defaults and a config file:
//!
//! ```text
//! stock defaults → stored record → mosaic.toml → command-line flags
//! ```

use crate::catalog::Catalog;
use crate::config::{self, ConfigError, Parameters};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

const PARAMETERS_KEY: &str = "astro_catalog_parameters";
const CATALOG_SELECTED_KEY: &str = "astro_catalog_selected";

/// File-backed key/value store for render settings.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Key under which a catalog's parameters are stored.
    pub fn parameters_key(catalog: Catalog) -> String {
        format!("{PARAMETERS_KEY}.{}", catalog.id())
    }

    pub fn save_parameters(&self, params: &Parameters) -> Result<(), ConfigError> {
        let mut entries = self.read_entries();
        entries.insert(Self::parameters_key(params.catalog), params.to_value()?);
        self.write_entries(entries)
    }

    /// Parameters for the last selected catalog, or its stock defaults.
    pub fn load_parameters(&self) -> Parameters {
        self.load_parameters_for(self.load_catalog())
    }

    pub fn load_parameters_for(&self, catalog: Catalog) -> Parameters {
        match self.read_entries().get(&Self::parameters_key(catalog)) {
            Some(record) => {
                let params = Parameters::from_value(record);
                if params.catalog != catalog {
                    log::warn!(
                        "stored {} settings name catalog {}; using defaults",
                        catalog,
                        params.catalog
                    );
                    return Parameters::for_catalog(catalog);
                }
                params
            }
            None => Parameters::for_catalog(catalog),
        }
    }

    /// Layer the stored record for the selected catalog under `overlay`.
    ///
    /// The catalog is the one `overlay` names, else the last one saved.
    pub fn resolve(&self, overlay: Option<toml::Value>) -> Result<Parameters, ConfigError> {
        let catalog = overlay
            .as_ref()
            .and_then(|ov| ov.get("catalog"))
            .and_then(toml::Value::as_str)
            .map(Catalog::from_id)
            .unwrap_or_else(|| self.load_catalog());
        let layered = match (self.stored_layer(catalog), overlay) {
            (Some(stored), Some(ov)) => Some(config::merge_toml(stored, ov)),
            (stored, ov) => stored.or(ov),
        };
        config::resolve_parameters(catalog, layered)
    }

    /// The stored record for `catalog` as a TOML table, if there is a usable one.
    fn stored_layer(&self, catalog: Catalog) -> Option<toml::Value> {
        let record = self
            .read_entries()
            .remove(&Self::parameters_key(catalog))?;
        let stored_catalog = record
            .get("catalog")
            .and_then(Value::as_str)
            .map(Catalog::from_id);
        if stored_catalog.is_some_and(|c| c != catalog) {
            log::warn!("stored {catalog} settings name another catalog; ignoring them");
            return None;
        }
        match toml::Value::try_from(record) {
            Ok(table @ toml::Value::Table(_)) => {
                log::info!("using stored {catalog} settings from {}", self.path.display());
                Some(table)
            }
            Ok(_) => {
                log::warn!("stored {catalog} settings are not an object; ignoring them");
                None
            }
            Err(e) => {
                log::warn!("cannot use stored {catalog} settings: {e}");
                None
            }
        }
    }

    pub fn save_catalog(&self, catalog: Catalog) -> Result<(), ConfigError> {
        let mut entries = self.read_entries();
        entries.insert(
            CATALOG_SELECTED_KEY.to_string(),
            Value::String(catalog.id().to_string()),
        );
        self.write_entries(entries)
    }

    pub fn load_catalog(&self) -> Catalog {
        self.read_entries()
            .get(CATALOG_SELECTED_KEY)
            .and_then(Value::as_str)
            .map(Catalog::from_id)
            .unwrap_or_default()
    }

    /// Forget everything.
    pub fn clear(&self) -> Result<(), ConfigError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn read_entries(&self) -> Map<String, Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("cannot read settings {}: {e}", self.path.display());
                }
                return Map::new();
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                log::warn!("settings {} is not a JSON object; ignoring", self.path.display());
                Map::new()
            }
            Err(e) => {
                log::warn!("settings {} is not valid JSON: {e}", self.path.display());
                Map::new()
            }
        }
    }

    fn write_entries(&self, entries: Map<String, Value>) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&Value::Object(entries))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
