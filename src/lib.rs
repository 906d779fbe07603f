//! # Astro Mosaic
//!
//! Arranges the photographs of an astronomical catalog (the 110 Messier
//! objects, the 109 Caldwell objects) into one large grid image. Every
//! catalog item gets a cell; a few showpiece objects get larger regions;
//! items you have not photographed yet are drawn as labelled placeholders, so
//! the mosaic doubles as a progress chart.
//!
//! # Pipeline
//!
//! ```text
//! Parameters ──┬──> load photos      (folder → number → bitmap)
//!              └──> plan layout      (cols, regions, N → placements)
//!                        │
//!                        v
//!                   render           (placements + photos → canvas)
//!                        │
//!                        v
//!                   save             (extension picks the encoder)
//! ```
//!
//! Planning is pure and independent of the photographs: the same parameters
//! always put every item in the same cell, whether or not its photo exists.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Supported catalogs: id, label prefix, title, item count |
//! | [`special`] | Multi-cell regions, per-catalog default layouts, draft editing |
//! | [`naming`] | `M31.jpg` / `C-20.png` filename convention parser |
//! | [`layout`] | Row estimate, occupancy grid, two-phase placement |
//! | [`render`] | Region, title and progress drawing; `build_mosaic` |
//! | [`imaging`] | Pure-Rust image loading, fill-crop, text, encoding |
//! | [`config`] | `Parameters`, scaling law, persisted record, `mosaic.toml` |
//! | [`settings`] | JSON preferences store: per-catalog parameters, last catalog |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Plan, Then Draw
//!
//! The layout is computed in full before a single pixel is drawn. The canvas
//! can then be sized from the rows actually used, and the grid is free to grow
//! when the row estimate falls short instead of dropping items off the bottom.
//!
//! ## Lenient Inputs, Strict Output
//!
//! A corrupt photo, a missing font, a missing folder or a malformed settings
//! field is logged and replaced with a safe default. The only hard failures
//! are a grid with no columns and an output file that cannot be written.
//!
//! ## Values, Not Shared State
//!
//! Default layouts come from factory functions and are fresh on every call.
//! Layout edits go through a [`special::LayoutDraft`] that is committed as a
//! whole; a half-edited layout never reaches a render.

pub mod catalog;
pub mod config;
pub mod imaging;
pub mod layout;
pub mod naming;
pub mod output;
pub mod render;
pub mod settings;
pub mod special;

pub use catalog::Catalog;
pub use config::{LayoutMode, Parameters};
pub use render::{Mosaic, MosaicError, build_mosaic, build_mosaic_with, render_mosaic};

#[cfg(test)]
pub(crate) mod test_helpers;
