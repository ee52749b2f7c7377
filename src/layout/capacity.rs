//! Page geometry and the usable content area it leaves.
//!
//! All lengths are millimetres.

use crate::error::{Error, Result};

/// Physical page and chrome configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Page width (A4: 210mm)
    pub page_width: f32,

    /// Page height (A4: 297mm)
    pub page_height: f32,

    /// Header band height
    pub header_height: f32,

    /// Header band height on the first page, if it differs
    pub first_page_header_height: Option<f32>,

    /// Footer band height
    pub footer_height: f32,

    /// Left margin
    pub margin_left: f32,

    /// Right margin
    pub margin_right: f32,

    /// Number of text columns
    pub column_count: u32,

    /// Gap between adjacent columns
    pub column_gap: f32,
}

impl LayoutConfig {
    /// Create a new layout config with A4 defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Set the header and footer band heights.
    pub fn with_chrome(mut self, header_height: f32, footer_height: f32) -> Self {
        self.header_height = header_height;
        self.footer_height = footer_height;
        self
    }

    /// Use a different header band height on the first page.
    pub fn with_first_page_header(mut self, height: f32) -> Self {
        self.first_page_header_height = Some(height);
        self
    }

    /// Set both horizontal margins.
    pub fn with_margins(mut self, left: f32, right: f32) -> Self {
        self.margin_left = left;
        self.margin_right = right;
        self
    }

    /// Set the column count.
    pub fn with_columns(mut self, count: u32) -> Self {
        self.column_count = count;
        self
    }

    /// Set the column gap.
    pub fn with_column_gap(mut self, gap: f32) -> Self {
        self.column_gap = gap;
        self
    }

    /// Check that the configuration describes a physically possible page.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("page width", self.page_width),
            ("page height", self.page_height),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidLayoutConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("header height", self.header_height),
            ("first page header height", self.first_page_header_height.unwrap_or(0.0)),
            ("footer height", self.footer_height),
            ("left margin", self.margin_left),
            ("right margin", self.margin_right),
            ("column gap", self.column_gap),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidLayoutConfig(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if self.column_count == 0 {
            return Err(Error::InvalidLayoutConfig(
                "column count must be at least 1".to_string(),
            ));
        }

        let tallest_header = self
            .header_height
            .max(self.first_page_header_height.unwrap_or(0.0));
        if tallest_header + self.footer_height >= self.page_height {
            return Err(Error::InvalidLayoutConfig(format!(
                "header ({}mm) and footer ({}mm) leave no content height on a {}mm page",
                tallest_header, self.footer_height, self.page_height
            )));
        }

        let gaps = self.column_gap * (self.column_count - 1) as f32;
        if self.margin_left + self.margin_right + gaps >= self.page_width {
            return Err(Error::InvalidLayoutConfig(format!(
                "margins and {} column gaps leave no column width on a {}mm page",
                self.column_count - 1,
                self.page_width
            )));
        }

        Ok(())
    }

    /// Compute the content area for a page.
    pub fn capacity(&self, is_first_page: bool) -> Result<PageCapacity> {
        self.validate()?;

        let header = if is_first_page {
            self.first_page_header_height.unwrap_or(self.header_height)
        } else {
            self.header_height
        };
        let content_height = self.page_height - header - self.footer_height;
        let content_width = self.page_width - self.margin_left - self.margin_right;
        let columns = self.column_count as f32;
        let column_width = (content_width - self.column_gap * (columns - 1.0)) / columns;

        Ok(PageCapacity {
            content_height,
            content_width,
            column_width,
            column_count: self.column_count,
            column_gap: self.column_gap,
            is_first_page,
        })
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            header_height: 35.0,
            first_page_header_height: None,
            footer_height: 20.0,
            margin_left: 20.0,
            margin_right: 20.0,
            column_count: 2,
            column_gap: 10.0,
        }
    }
}

/// Usable content area of one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCapacity {
    /// Height of the content area between header and footer
    pub content_height: f32,

    /// Width of the content area between the margins
    pub content_width: f32,

    /// Width of a single column
    pub column_width: f32,

    /// Number of columns
    pub column_count: u32,

    /// Gap between columns
    pub column_gap: f32,

    /// Whether this is the first page
    pub is_first_page: bool,
}

impl PageCapacity {
    /// Total vertical space the flow engine may fill: one content height per column.
    pub fn flow_height(&self) -> f32 {
        self.content_height * self.column_count as f32
    }
}
