//! The pagination pipeline: decompose, flow, assemble.

use log::debug;

use crate::error::Result;
use crate::layout::{FlowEngine, LayoutConfig, MeasurementProvider, Typography};
use crate::model::PublicationMetadata;
use crate::parser::{DecomposeOptions, Decomposer};
use crate::render::{PageAssembler, PageSelection, PaginationResult, PaginationStats, RenderOptions};

/// Options for a pagination run.
#[derive(Debug, Clone, Default)]
pub struct PaginateOptions {
    /// Decomposition options
    pub decompose: DecomposeOptions,

    /// Page geometry
    pub layout: LayoutConfig,

    /// Typography shared by measurement and display
    pub typography: Typography,

    /// Assembly options
    pub render: RenderOptions,
}

impl PaginateOptions {
    /// Create new pagination options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set decomposition options.
    pub fn with_decompose_options(mut self, options: DecomposeOptions) -> Self {
        self.decompose = options;
        self
    }

    /// Set the page layout.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Set the typography.
    pub fn with_typography(mut self, typography: Typography) -> Self {
        self.typography = typography;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.render = self.render.with_pages(selection);
        self
    }

    /// Check layout and typography before any work is done.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        self.typography.validate()
    }
}

/// Run the full pipeline with an explicit measurer.
///
/// The run is all-or-nothing: a decomposition or measurement error discards
/// everything computed so far.
pub fn run<M>(
    markup: &str,
    metadata: &PublicationMetadata,
    options: &PaginateOptions,
    measurer: &mut M,
) -> Result<PaginationResult>
where
    M: MeasurementProvider + ?Sized,
{
    options.validate()?;

    let units = Decomposer::new(options.decompose.clone()).decompose(markup, metadata)?;

    let engine = FlowEngine::new(options.layout.clone(), options.typography.clone());
    let groups = engine.flow(units, measurer)?;
    let stats = PaginationStats::from_groups(&groups);

    let assembler = PageAssembler::new(
        options.layout.clone(),
        options.typography.clone(),
        options.render.clone(),
    );
    let pages = assembler.assemble(&groups, metadata);
    debug!(
        "assembled {} of {} pages ({} overflowed, {} scaled images)",
        pages.len(),
        stats.page_count,
        stats.overflowed_page_count,
        stats.scaled_image_count
    );

    Ok(PaginationResult::new(pages, stats))
}
