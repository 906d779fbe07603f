//! Filename parsing for catalog images.
//!
//! Image files name the catalog item they show with the catalog prefix, an
//! optional single separator, and the item number. Anything after the digits
//! is free text (object name, exposure notes, the extension):
//!
//! - `M31.jpg` → 31
//! - `M_42_orion.png` → 42
//! - `M-8 lagoon.tif` → 8
//! - `C 20.jpeg` → 20
//! - `M101-pinwheel.jpg` → 101
//!
//! The prefix match is case-sensitive. Files that don't follow the pattern
//! are not catalog images and are ignored by the loader.

/// Characters allowed between the prefix and the number.
const SEPARATORS: [char; 3] = ['-', '_', ' '];

/// Result of parsing a catalog image filename like `M_42_orion.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Catalog number (always ≥ 1).
    pub number: u32,
    /// Remainder after the digits, untouched (`_orion.png`).
    pub rest: String,
}

/// Parse `<prefix><separator>?<digits><rest>`.
///
/// Returns `None` when the name does not start with `prefix`, when no digit
/// follows the optional separator, or when the number is zero or overflows.
pub fn parse_catalog_name(file_name: &str, prefix: &str) -> Option<ParsedName> {
    let after_prefix = file_name.strip_prefix(prefix)?;
    let after_sep = after_prefix
        .strip_prefix(SEPARATORS.as_slice())
        .unwrap_or(after_prefix);

    let digits_end = after_sep
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after_sep.len());
    if digits_end == 0 {
        return None;
    }

    let number = after_sep[..digits_end].parse::<u32>().ok().filter(|&n| n > 0)?;
    Some(ParsedName {
        number,
        rest: after_sep[digits_end..].to_string(),
    })
}

/// Just the catalog number, for callers that don't need the remainder.
pub fn catalog_number(file_name: &str, prefix: &str) -> Option<u32> {
    parse_catalog_name(file_name, prefix).map(|p| p.number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_number() {
        let p = parse_catalog_name("M31.jpg", "M").unwrap();
        assert_eq!(p.number, 31);
        assert_eq!(p.rest, ".jpg");
    }

    #[test]
    fn underscore_separator_with_name() {
        let p = parse_catalog_name("M_42_orion.png", "M").unwrap();
        assert_eq!(p.number, 42);
        assert_eq!(p.rest, "_orion.png");
    }

    #[test]
    fn dash_and_space_separators() {
        assert_eq!(catalog_number("M-8 lagoon.tif", "M"), Some(8));
        assert_eq!(catalog_number("C 20.jpeg", "C"), Some(20));
    }

    #[test]
    fn three_digit_number() {
        assert_eq!(catalog_number("M110.jpg", "M"), Some(110));
        assert_eq!(catalog_number("M101-pinwheel.jpg", "M"), Some(101));
    }

    #[test]
    fn leading_zeros_are_accepted() {
        assert_eq!(catalog_number("M007.jpg", "M"), Some(7));
    }

    #[test]
    fn only_one_separator_allowed() {
        assert_eq!(catalog_number("M__42.jpg", "M"), None);
        assert_eq!(catalog_number("M- 42.jpg", "M"), None);
    }

    #[test]
    fn wrong_prefix_is_ignored() {
        assert_eq!(catalog_number("C31.jpg", "M"), None);
        assert_eq!(catalog_number("m31.jpg", "M"), None);
        assert_eq!(catalog_number("IMG_0042.jpg", "M"), None);
    }

    #[test]
    fn prefix_without_digits_is_ignored() {
        assert_eq!(catalog_number("Messier.jpg", "M"), None);
        assert_eq!(catalog_number("M_.jpg", "M"), None);
        assert_eq!(catalog_number("M", "M"), None);
    }

    #[test]
    fn zero_is_not_a_catalog_number() {
        assert_eq!(catalog_number("M0.jpg", "M"), None);
    }

    #[test]
    fn overflowing_number_is_ignored() {
        assert_eq!(catalog_number("M99999999999.jpg", "M"), None);
    }
}
