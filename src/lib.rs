//! # pressflow
//!
//! Print-layout pagination for rich article markup.
//!
//! This library splits an article into atomic content units, measures each
//! one, flows them into fixed-size multi-column pages and wraps every page in
//! publication chrome (masthead, logo, footer, page number).
//!
//! ## Quick Start
//!
//! ```no_run
//! use pressflow::{paginate, PublicationMetadata};
//!
//! fn main() -> pressflow::Result<()> {
//!     let metadata = PublicationMetadata::new("The Quarterly")
//!         .with_title("On Pagination")
//!         .with_author("A. Writer");
//!
//!     let pages = paginate("<p>First paragraph.</p><p>Second.</p>", &metadata)?;
//!     for page in &pages {
//!         println!("page {}: {} bytes", page.page_number, page.html.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Atomic units**: paragraphs, headings, images and tables are never split
//! - **Pluggable measurement**: a headless text-metrics measurer, or your own
//!   [`MeasurementProvider`] backed by a real rendering surface
//! - **Oversized content**: images are scaled to a column, other blocks
//!   overflow a page of their own; nothing is truncated
//! - **Debounced repagination**: [`Repaginator`] and [`DebounceWorker`] for
//!   live editors (tokio driver behind the `async` feature)
//! - **Parallel assembly**: uses Rayon for building page markup

pub mod controller;
pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use controller::{
    DebounceWorker, PaginationOutcome, PaginationRequest, Repaginator, DEFAULT_DEBOUNCE,
};
pub use error::{Error, Result};
pub use layout::{
    FixedHeightMeasurer, FlowEngine, LayoutConfig, MeasurementProvider, PageCapacity,
    TextMetricsMeasurer, Typography,
};
pub use model::{
    ContentUnit, PageContentGroup, Placement, PublicationMetadata, RenderedPage, TableOfContents,
    TocEntry, UnitKind,
};
pub use parser::{decompose, DecomposeOptions, Decomposer};
pub use pipeline::PaginateOptions;
pub use render::{
    JsonFormat, PageAssembler, PageSelection, PaginationResult, PaginationStats, RenderOptions,
};

use std::time::Duration;

/// Paginate an article with the default A4 layout and the headless measurer.
///
/// # Example
///
/// ```no_run
/// use pressflow::{paginate, PublicationMetadata};
///
/// let pages = paginate("<p>Hello</p>", &PublicationMetadata::new("Weekly")).unwrap();
/// assert_eq!(pages[0].page_number, 1);
/// ```
pub fn paginate(markup: &str, metadata: &PublicationMetadata) -> Result<Vec<RenderedPage>> {
    let mut measurer = TextMetricsMeasurer::new();
    paginate_with(markup, metadata, &PaginateOptions::default(), &mut measurer)
}

/// Paginate an article with custom options and measurer.
///
/// # Example
///
/// ```no_run
/// use pressflow::{paginate_with, FixedHeightMeasurer, LayoutConfig, PaginateOptions};
/// use pressflow::{PublicationMetadata, Typography};
///
/// let options = PaginateOptions::new().with_layout(LayoutConfig::default().with_columns(1));
/// let mut measurer = FixedHeightMeasurer::new(|_: &str, _: f32, _: &Typography| 40.0);
/// let pages = paginate_with(
///     "<p>a</p><p>b</p>",
///     &PublicationMetadata::default(),
///     &options,
///     &mut measurer,
/// )
/// .unwrap();
/// ```
pub fn paginate_with(
    markup: &str,
    metadata: &PublicationMetadata,
    options: &PaginateOptions,
    measurer: &mut dyn MeasurementProvider,
) -> Result<Vec<RenderedPage>> {
    Ok(pipeline::run(markup, metadata, options, measurer)?.pages)
}

/// Paginate an article and return statistics alongside the pages.
pub fn paginate_with_stats(
    markup: &str,
    metadata: &PublicationMetadata,
    options: &PaginateOptions,
    measurer: &mut dyn MeasurementProvider,
) -> Result<PaginationResult> {
    pipeline::run(markup, metadata, options, measurer)
}

/// Serialize pages to JSON.
///
/// # Example
///
/// ```no_run
/// use pressflow::{paginate, to_json, JsonFormat, PublicationMetadata};
///
/// let pages = paginate("<p>Hello</p>", &PublicationMetadata::default()).unwrap();
/// std::fs::write("pages.json", to_json(&pages, JsonFormat::Pretty).unwrap()).unwrap();
/// ```
pub fn to_json(pages: &[RenderedPage], format: JsonFormat) -> Result<String> {
    render::to_json(pages, format)
}

/// Builder for configuring and running pagination.
///
/// # Example
///
/// ```no_run
/// use pressflow::{Pressflow, PublicationMetadata};
///
/// let result = Pressflow::new()
///     .with_columns(3)
///     .with_column_gap(6.0)
///     .with_font_size(9.0)
///     .sequential()
///     .paginate("<p>Body</p>", &PublicationMetadata::new("Weekly"))?;
/// println!("{} pages", result.page_count());
/// # Ok::<(), pressflow::Error>(())
/// ```
pub struct Pressflow {
    options: PaginateOptions,
    debounce: Duration,
}

impl Pressflow {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            options: PaginateOptions::default(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Set the page layout.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.options.layout = layout;
        self
    }

    /// Set the column count.
    pub fn with_columns(mut self, count: u32) -> Self {
        self.options.layout = self.options.layout.with_columns(count);
        self
    }

    /// Set the column gap in millimetres.
    pub fn with_column_gap(mut self, gap: f32) -> Self {
        self.options.layout = self.options.layout.with_column_gap(gap);
        self
    }

    /// Set the typography.
    pub fn with_typography(mut self, typography: Typography) -> Self {
        self.options.typography = typography;
        self
    }

    /// Set the body font size in points.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.options.typography = self.options.typography.with_font_size(size);
        self
    }

    /// Set the line height multiplier.
    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.options.typography = self.options.typography.with_line_height(line_height);
        self
    }

    /// Set decomposition options.
    pub fn with_decompose_options(mut self, options: DecomposeOptions) -> Self {
        self.options.decompose = options;
        self
    }

    /// Set the debounce window used by [`Pressflow::repaginator`].
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Disable parallel page assembly.
    pub fn sequential(mut self) -> Self {
        self.options.render = self.options.render.with_parallel(false);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options.render = self.options.render.with_pages(pages);
        self
    }

    /// Set page selection from a string such as `"1-3,5"`.
    pub fn with_page_spec(self, spec: &str) -> Result<Self> {
        let selection = PageSelection::parse(spec).map_err(Error::InvalidPageRange)?;
        Ok(self.with_pages(selection))
    }

    /// Get the assembled options.
    pub fn options(&self) -> &PaginateOptions {
        &self.options
    }

    /// Paginate with the headless measurer.
    pub fn paginate(&self, markup: &str, metadata: &PublicationMetadata) -> Result<PaginationResult> {
        let mut measurer = TextMetricsMeasurer::new();
        pipeline::run(markup, metadata, &self.options, &mut measurer)
    }

    /// Paginate with a caller-supplied measurer.
    pub fn paginate_with<M: MeasurementProvider + ?Sized>(
        &self,
        markup: &str,
        metadata: &PublicationMetadata,
        measurer: &mut M,
    ) -> Result<PaginationResult> {
        pipeline::run(markup, metadata, &self.options, measurer)
    }

    /// Build a debounced repaginator owning `measurer`.
    pub fn repaginator<M: MeasurementProvider>(self, measurer: M) -> Result<Repaginator<M>> {
        Ok(Repaginator::new(measurer, self.options)?.with_debounce(self.debounce))
    }

    /// Start a background repagination worker owning `measurer`.
    pub fn spawn_worker<M>(self, measurer: M) -> Result<DebounceWorker>
    where
        M: MeasurementProvider + Send + 'static,
    {
        DebounceWorker::spawn(measurer, self.options, self.debounce)
    }
}

impl Default for Pressflow {
    fn default() -> Self {
        Self::new()
    }
}
