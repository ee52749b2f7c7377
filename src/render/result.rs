//! Pagination result with statistics.

use serde::{Deserialize, Serialize};

use crate::model::{PageContentGroup, RenderedPage, UnitKind};

/// Result of a pagination run, including pages and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult {
    /// Assembled pages in order
    pub pages: Vec<RenderedPage>,

    /// Flow statistics
    pub stats: PaginationStats,
}

impl PaginationResult {
    /// Create a new pagination result.
    pub fn new(pages: Vec<RenderedPage>, stats: PaginationStats) -> Self {
        Self { pages, stats }
    }

    /// Number of assembled pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Statistics collected while flowing units into pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationStats {
    /// Total number of pages produced by the flow
    pub page_count: u32,

    /// Total number of content units
    pub unit_count: u32,

    /// Units synthesized from metadata
    pub virtual_unit_count: u32,

    /// Number of image units
    pub image_count: u32,

    /// Number of heading units
    pub heading_count: u32,

    /// Number of table units
    pub table_count: u32,

    /// Images scaled down to fit a column
    pub scaled_image_count: u32,

    /// Pages holding a single overflowing unit
    pub overflowed_page_count: u32,

    /// Sum of placed heights, in millimetres
    pub total_height: f32,
}

impl PaginationStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect statistics from flowed page groups.
    pub fn from_groups(groups: &[PageContentGroup]) -> Self {
        let mut stats = Self::new();
        for group in groups {
            stats.add_page(group);
        }
        stats
    }

    /// Account for one page group.
    pub fn add_page(&mut self, group: &PageContentGroup) {
        self.page_count += 1;
        if group.overflowed {
            self.overflowed_page_count += 1;
        }
        for placement in &group.placements {
            self.unit_count += 1;
            self.total_height += placement.height;
            if placement.is_scaled() {
                self.scaled_image_count += 1;
            }

            let kind = placement.unit.kind;
            if kind.is_virtual() {
                self.virtual_unit_count += 1;
            }
            match kind {
                UnitKind::Image | UnitKind::HeroImage => self.image_count += 1,
                UnitKind::Heading { .. } => self.heading_count += 1,
                UnitKind::Table => self.table_count += 1,
                _ => {}
            }
        }
    }

    /// Average filled height per page, in millimetres.
    pub fn average_page_height(&self) -> f32 {
        if self.page_count == 0 {
            0.0
        } else {
            self.total_height / self.page_count as f32
        }
    }
}
