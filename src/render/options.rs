//! Rendering options and configuration.

use std::ops::RangeInclusive;

use crate::model::DEFAULT_THEME_COLOR;

/// Options for assembling pages.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Assemble pages on the rayon thread pool
    pub parallel: bool,

    /// Which pages to emit (numbering is kept)
    pub page_selection: PageSelection,

    /// Colour used when the metadata theme colour is missing or invalid
    pub fallback_theme_color: String,

    /// Text of the page number label in the footer
    pub page_label: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel assembly.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.page_selection = selection;
        self
    }

    /// Set specific page range.
    pub fn with_page_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.page_selection = PageSelection::Range(range);
        self
    }

    /// Set specific pages.
    pub fn with_page_list(mut self, pages: Vec<u32>) -> Self {
        self.page_selection = PageSelection::Pages(pages);
        self
    }

    /// Set the fallback theme colour.
    pub fn with_fallback_theme_color(mut self, color: impl Into<String>) -> Self {
        self.fallback_theme_color = color.into();
        self
    }

    /// Set the footer page label (e.g. "Page", "Seite").
    pub fn with_page_label(mut self, label: impl Into<String>) -> Self {
        self.page_label = label.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            page_selection: PageSelection::All,
            fallback_theme_color: DEFAULT_THEME_COLOR.to_string(),
            page_label: "Page".to_string(),
        }
    }
}

/// Page selection for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Render all pages
    #[default]
    All,
    /// Render a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Render specific pages (1-indexed)
    Pages(Vec<u32>),
    /// Render several ranges (inclusive, 1-indexed), sorted and disjoint
    Ranges(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
            PageSelection::Ranges(ranges) => {
                let after = ranges.partition_point(|r| *r.start() <= page);
                after > 0 && ranges[after - 1].contains(&page)
            }
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start = parse_page(start, "Invalid start page")?;
                let end = parse_page(end, "Invalid end page")?;
                if start > end {
                    return Err(format!("Empty page range {}-{}", start, end));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut ranges = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start = parse_page(start, "Invalid page number")?;
                let end = parse_page(end, "Invalid page number")?;
                if start > end {
                    return Err(format!("Empty page range {}-{}", start, end));
                }
                ranges.push(start..=end);
            } else {
                let p = parse_page(part, "Invalid page number")?;
                ranges.push(p..=p);
            }
        }

        Ok(PageSelection::Ranges(merge_ranges(ranges)))
    }
}

/// Sort ranges and merge overlapping or adjacent ones.
fn merge_ranges(mut ranges: Vec<RangeInclusive<u32>>) -> Vec<RangeInclusive<u32>> {
    ranges.sort_unstable_by_key(|r| *r.start());
    let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if *range.start() <= last.end().saturating_add(1) => {
                if range.end() > last.end() {
                    *last = *last.start()..=*range.end();
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Parse a 1-indexed page number.
fn parse_page(s: &str, message: &str) -> Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(format!("{}: '{}'", message, s.trim())),
        Ok(page) => Ok(page),
    }
}
