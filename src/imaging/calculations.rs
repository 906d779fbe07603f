//! Pure calculation functions for placing pixels.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Fill dimensions (at least one matches target)
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Wider: height matches, width overflows
        let w = ((tgt_h as f64 * src_aspect).round() as u32).max(tgt_w);
        (w, tgt_h)
    } else {
        let h = ((tgt_w as f64 / src_aspect).round() as u32).max(tgt_h);
        (tgt_w, h)
    }
}

/// Top-left corner of a `target`-sized window centred in `filled`.
pub fn center_crop_offset(filled: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    (
        filled.0.saturating_sub(target.0) / 2,
        filled.1.saturating_sub(target.1) / 2,
    )
}

/// Start coordinate that centres a span of `inner` inside `[start, start + outer)`.
///
/// May be left of `start` when `inner` is wider than `outer`; text is allowed
/// to overhang its cell rather than be shifted off-centre.
pub fn center_start(start: i64, outer: u32, inner: u32) -> i64 {
    start + (outer as i64 - inner as i64).div_euclid(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // calculate_fill_dimensions tests
    // =========================================================================

    #[test]
    fn fill_wider_source_to_square_target() {
        // 800x600 (4:3) into 300x300: height matches, width = 400
        assert_eq!(calculate_fill_dimensions((800, 600), (300, 300)), (400, 300));
    }

    #[test]
    fn fill_taller_source_to_landscape_target() {
        // 600x800 (3:4) into 500x400: width matches, height = 667
        assert_eq!(calculate_fill_dimensions((600, 800), (500, 400)), (500, 667));
    }

    #[test]
    fn fill_same_aspect_ratio() {
        assert_eq!(calculate_fill_dimensions((800, 600), (400, 300)), (400, 300));
    }

    #[test]
    fn fill_upscales_small_sources() {
        // A 40x30 thumbnail filling a 2x3-cell region of 600x900
        assert_eq!(calculate_fill_dimensions((40, 30), (600, 900)), (1200, 900));
    }

    #[test]
    fn fill_never_undershoots_target() {
        for source in [(1, 1000), (1000, 1), (333, 777), (4096, 4095)] {
            for target in [(299, 299), (599, 299), (299, 899)] {
                let (w, h) = calculate_fill_dimensions(source, target);
                assert!(w >= target.0 && h >= target.1, "{source:?} -> {target:?}");
            }
        }
    }

    // =========================================================================
    // center_crop_offset tests
    // =========================================================================

    #[test]
    fn crop_offset_centres_horizontal_overflow() {
        assert_eq!(center_crop_offset((400, 300), (300, 300)), (50, 0));
    }

    #[test]
    fn crop_offset_centres_vertical_overflow() {
        assert_eq!(center_crop_offset((500, 667), (500, 400)), (0, 133));
    }

    #[test]
    fn crop_offset_exact_fit_is_origin() {
        assert_eq!(center_crop_offset((300, 300), (300, 300)), (0, 0));
    }

    // =========================================================================
    // center_start tests
    // =========================================================================

    #[test]
    fn center_start_inside_outer() {
        assert_eq!(center_start(15, 300, 40), 145);
    }

    #[test]
    fn center_start_odd_remainder_rounds_down() {
        assert_eq!(center_start(0, 11, 4), 3);
    }

    #[test]
    fn center_start_overhangs_when_inner_is_wider() {
        assert_eq!(center_start(100, 10, 30), 90);
    }
}
