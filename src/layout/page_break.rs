//! # Page Break Decisions
//!
//! Units are atomic: a unit is never split, so the only choices are to
//! place it, push it to a fresh page, shrink it (images only) or let it
//! overflow a page of its own.

/// Tolerance for floating-point comparisons against the page budget.
pub const FIT_EPSILON: f32 = 0.01;

/// What to do with the next unit.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Place the unit on the current page (it fits).
    Place,
    /// Close the current page and retry on an empty one.
    MoveToNextPage,
    /// Scale the image down to one column height and give it a page of its own.
    ScaleToFit {
        /// Height after scaling
        height: f32,
        /// Factor applied to the measured height
        scale: f32,
    },
    /// The unit is taller than an empty page; place it alone, overflowing.
    PlaceOverflowed,
}

/// Decide how to place a unit of `height` on a page.
///
/// `used` is the height already filled on the current page, `budget` the
/// page's total flow height and `column_height` the height of one column.
pub fn decide_break(
    height: f32,
    is_image: bool,
    used: f32,
    budget: f32,
    column_height: f32,
) -> BreakDecision {
    // Images cannot break across columns, so a column is their limit.
    if is_image && height > column_height + FIT_EPSILON {
        let scale = column_height / height;
        return BreakDecision::ScaleToFit {
            height: column_height,
            scale,
        };
    }

    if used + height <= budget + FIT_EPSILON {
        return BreakDecision::Place;
    }

    if used > 0.0 {
        return BreakDecision::MoveToNextPage;
    }

    BreakDecision::PlaceOverflowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits() {
        assert_eq!(decide_break(80.0, false, 80.0, 200.0, 200.0), BreakDecision::Place);
    }

    #[test]
    fn exact_fit_within_tolerance() {
        assert_eq!(
            decide_break(40.005, false, 160.0, 200.0, 200.0),
            BreakDecision::Place
        );
    }

    #[test]
    fn moves_when_page_has_content() {
        assert_eq!(
            decide_break(80.0, false, 160.0, 200.0, 200.0),
            BreakDecision::MoveToNextPage
        );
    }

    #[test]
    fn oversized_text_overflows_empty_page() {
        assert_eq!(
            decide_break(500.0, false, 0.0, 484.0, 242.0),
            BreakDecision::PlaceOverflowed
        );
    }

    #[test]
    fn oversized_image_scales() {
        let decision = decide_break(350.0, true, 0.0, 250.0, 250.0);
        match decision {
            BreakDecision::ScaleToFit { height, scale } => {
                assert_eq!(height, 250.0);
                assert!((scale - 250.0 / 350.0).abs() < 1e-6);
            }
            other => panic!("expected scale, got {:?}", other),
        }
    }

    #[test]
    fn image_taller_than_column_scales_even_if_page_has_room() {
        // Two columns of 242mm: a 300mm image fits the flow budget but not a column.
        assert!(matches!(
            decide_break(300.0, true, 0.0, 484.0, 242.0),
            BreakDecision::ScaleToFit { .. }
        ));
    }

    #[test]
    fn column_sized_image_is_placed() {
        assert_eq!(decide_break(242.0, true, 0.0, 484.0, 242.0), BreakDecision::Place);
    }
}
