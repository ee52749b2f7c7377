//! Page-level types.

use super::ContentUnit;
use serde::{Deserialize, Serialize};

/// A content unit placed on a page, with its measured height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// The placed unit
    pub unit: ContentUnit,

    /// Height the unit occupies on the page, in millimetres
    pub height: f32,

    /// Scale factor applied to an oversized image (`None` when unscaled)
    pub scale: Option<f32>,
}

impl Placement {
    /// Place a unit at its measured height.
    pub fn new(unit: ContentUnit, height: f32) -> Self {
        Self {
            unit,
            height,
            scale: None,
        }
    }

    /// Place an image unit scaled down by `scale`.
    pub fn scaled(unit: ContentUnit, height: f32, scale: f32) -> Self {
        Self {
            unit,
            height,
            scale: Some(scale),
        }
    }

    /// Check if the unit was scaled to fit.
    pub fn is_scaled(&self) -> bool {
        self.scale.is_some()
    }
}

/// An ordered, contiguous run of content units assigned to one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContentGroup {
    /// Placed units in document order
    pub placements: Vec<Placement>,

    /// Set when a single unit taller than the page was placed alone
    pub overflowed: bool,
}

impl PageContentGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a placement.
    pub fn push(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    /// Iterate over the units in this group.
    pub fn units(&self) -> impl Iterator<Item = &ContentUnit> {
        self.placements.iter().map(|p| &p.unit)
    }

    /// Number of units on the page.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Check if the group holds no units.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Sum of the placed heights, in millimetres.
    pub fn used_height(&self) -> f32 {
        self.placements.iter().map(|p| p.height).sum()
    }

    /// Order indices of the first and last unit.
    pub fn unit_range(&self) -> Option<(usize, usize)> {
        let first = self.placements.first()?.unit.order_index;
        let last = self.placements.last()?.unit.order_index;
        Some((first, last))
    }
}

/// A page ready for presentation: content wrapped in header/footer chrome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPage {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Complete page markup including chrome
    pub html: String,

    /// Whether the page holds an overflowing unit
    pub overflowed: bool,

    /// Order indices of the first and last unit on the page
    pub unit_range: Option<(usize, usize)>,
}

impl RenderedPage {
    /// Check if this is the first page.
    pub fn is_first(&self) -> bool {
        self.page_number == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_accounting() {
        let mut group = PageContentGroup::new();
        assert!(group.is_empty());
        assert_eq!(group.unit_range(), None);

        group.push(Placement::new(ContentUnit::paragraph("<p>a</p>", 4), 20.0));
        group.push(Placement::scaled(ContentUnit::image("<img/>", 5), 30.0, 0.5));

        assert_eq!(group.len(), 2);
        assert_eq!(group.used_height(), 50.0);
        assert_eq!(group.unit_range(), Some((4, 5)));
        assert!(group.placements[1].is_scaled());
        assert_eq!(group.units().count(), 2);
    }

    #[test]
    fn test_rendered_page_json_shape() {
        let page = RenderedPage {
            page_number: 1,
            html: "<article></article>".into(),
            overflowed: false,
            unit_range: Some((0, 3)),
        };
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("\"pageNumber\":1"));
        assert!(json.contains("\"html\""));
        assert!(page.is_first());
    }
}
