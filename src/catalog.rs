//! Catalog descriptors.
//!
//! A catalog is a fixed, numbered enumeration of deep-sky objects that share a
//! label prefix. Every catalog the mosaic knows about is a variant of
//! [`Catalog`]; its metadata is a pure function of the variant.
//!
//! | Catalog | Id | Prefix | Items |
//! |---|---|---|---|
//! | Messier | `messier` | `M` | 110 |
//! | Caldwell | `caldwell` | `C` | 109 |
//!
//! Lookups never fail: an unknown id or prefix resolves to
//! [`Catalog::default`] (Messier).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A supported astronomical catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Catalog {
    #[default]
    Messier,
    Caldwell,
}

impl Catalog {
    /// Every supported catalog, in display order.
    pub const ALL: [Catalog; 2] = [Catalog::Messier, Catalog::Caldwell];

    /// Stable identifier used in persisted settings.
    pub fn id(self) -> &'static str {
        match self {
            Catalog::Messier => "messier",
            Catalog::Caldwell => "caldwell",
        }
    }

    /// Label prefix put in front of every item number (`M31`, `C20`).
    pub fn prefix(self) -> &'static str {
        match self {
            Catalog::Messier => "M",
            Catalog::Caldwell => "C",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Catalog::Messier => "Messier Catalog",
            Catalog::Caldwell => "Caldwell Catalog",
        }
    }

    /// Number of items; catalog numbers run `1..=count`.
    pub fn count(self) -> u32 {
        match self {
            Catalog::Messier => 110,
            Catalog::Caldwell => 109,
        }
    }

    /// Resolve an id (case-insensitive). Unknown ids fall back to the default catalog.
    pub fn from_id(id: &str) -> Catalog {
        Catalog::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(id.trim()))
            .unwrap_or_default()
    }

    /// Resolve a label prefix (exact match). Unknown prefixes fall back to the default catalog.
    pub fn from_prefix(prefix: &str) -> Catalog {
        Catalog::ALL
            .into_iter()
            .find(|c| c.prefix() == prefix)
            .unwrap_or_default()
    }

    /// Label for a single item, e.g. `M42`.
    pub fn label(self, number: u32) -> String {
        format!("{}{}", self.prefix(), number)
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Ok(Catalog::from_id(&id))
    }
}
