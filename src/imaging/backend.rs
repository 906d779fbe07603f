//! Image source trait and shared types.
//!
//! The [`ImageLoader`] trait is the seam between the mosaic and wherever the
//! photographs come from. The production implementation is
//! [`DirectoryLoader`](super::loader::DirectoryLoader), which scans one folder
//! and decodes every file named after a catalog item.
//!
//! A loader never fails as a whole: unreadable files, a missing folder, or a
//! folder of unrelated files all produce a (possibly empty) [`ImageMap`].

use image::DynamicImage;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Decoded photographs keyed by catalog number.
///
/// A number missing from the map has no photograph and is drawn as a
/// placeholder. Ordered, so iteration is ascending by catalog number.
pub type ImageMap = BTreeMap<u32, DynamicImage>;

/// Source of catalog photographs.
pub trait ImageLoader {
    /// Load every image in `folder` whose name starts with `prefix`.
    fn load_images(&self, folder: &Path, prefix: &str) -> ImageMap;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::RgbImage;
    use std::cell::RefCell;

    /// In-memory loader that records the folders and prefixes it was asked for.
    #[derive(Default)]
    pub struct MockLoader {
        pub images: ImageMap,
        pub requests: RefCell<Vec<(String, String)>>,
    }

    impl MockLoader {
        pub fn new() -> Self {
            Self::default()
        }

        /// Solid-colour images for the given numbers.
        pub fn with_numbers(numbers: &[u32]) -> Self {
            let images = numbers
                .iter()
                .map(|&n| {
                    let shade = (n % 200) as u8 + 40;
                    let img = RgbImage::from_pixel(40, 30, image::Rgb([shade, 0, 255 - shade]));
                    (n, DynamicImage::ImageRgb8(img))
                })
                .collect();
            Self {
                images,
                requests: RefCell::new(Vec::new()),
            }
        }

        pub fn get_requests(&self) -> Vec<(String, String)> {
            self.requests.borrow().clone()
        }
    }

    impl ImageLoader for MockLoader {
        fn load_images(&self, folder: &Path, prefix: &str) -> ImageMap {
            self.requests
                .borrow_mut()
                .push((folder.to_string_lossy().to_string(), prefix.to_string()));
            self.images.clone()
        }
    }

    #[test]
    fn mock_records_requests() {
        let loader = MockLoader::with_numbers(&[1, 2]);
        let images = loader.load_images(Path::new("/photos"), "M");
        assert_eq!(images.len(), 2);
        assert_eq!(
            loader.get_requests(),
            vec![("/photos".to_string(), "M".to_string())]
        );
    }

    #[test]
    fn image_map_iterates_in_catalog_order() {
        let loader = MockLoader::with_numbers(&[42, 8, 110, 1]);
        let keys: Vec<u32> = loader.images.keys().copied().collect();
        assert_eq!(keys, vec![1, 8, 42, 110]);
    }
}
