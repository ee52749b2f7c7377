//! Greedy flow of content units into pages.

use std::mem;

use log::{debug, warn};

use super::capacity::{LayoutConfig, PageCapacity};
use super::measure::{MeasurementProvider, Typography};
use super::page_break::{decide_break, BreakDecision};
use crate::error::{Error, Result};
use crate::model::{ContentUnit, PageContentGroup, Placement};

/// Distributes measured units across pages.
///
/// Units are taken strictly in order and never split. A unit goes on the
/// current page when it fits, otherwise it starts the next one.
#[derive(Debug, Clone, Default)]
pub struct FlowEngine {
    layout: LayoutConfig,
    typography: Typography,
}

impl FlowEngine {
    /// Create a flow engine for a page layout and typography.
    pub fn new(layout: LayoutConfig, typography: Typography) -> Self {
        Self { layout, typography }
    }

    /// Get the page layout.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Get the typography used for measurement.
    pub fn typography(&self) -> &Typography {
        &self.typography
    }

    /// Measure one unit at the column width.
    pub fn measure<M>(&self, unit: &ContentUnit, measurer: &mut M) -> Result<f32>
    where
        M: MeasurementProvider + ?Sized,
    {
        let capacity = self.layout.capacity(false)?;
        self.measure_at(unit, &capacity, measurer)
    }

    fn measure_at<M>(
        &self,
        unit: &ContentUnit,
        capacity: &PageCapacity,
        measurer: &mut M,
    ) -> Result<f32>
    where
        M: MeasurementProvider + ?Sized,
    {
        let height = measurer.measure_height(&unit.markup, capacity.column_width, &self.typography)?;
        if !height.is_finite() || height < 0.0 {
            return Err(Error::Measurement(format!(
                "unit {} ({}) measured an invalid height of {}",
                unit.order_index,
                unit.kind.label(),
                height
            )));
        }
        Ok(height)
    }

    /// Flow units into page groups.
    ///
    /// Every input unit appears in exactly one group, in input order.
    pub fn flow<M>(&self, units: Vec<ContentUnit>, measurer: &mut M) -> Result<Vec<PageContentGroup>>
    where
        M: MeasurementProvider + ?Sized,
    {
        self.typography.validate()?;

        let mut pages: Vec<PageContentGroup> = Vec::new();
        let mut current = PageContentGroup::new();
        let mut used = 0.0f32;
        let mut capacity = self.layout.capacity(true)?;

        for unit in units {
            let height = self.measure_at(&unit, &capacity, measurer)?;

            loop {
                let decision = decide_break(
                    height,
                    unit.kind.is_image(),
                    used,
                    capacity.flow_height(),
                    capacity.content_height,
                );

                match decision {
                    BreakDecision::Place => {
                        used += height;
                        current.push(Placement::new(unit, height));
                        break;
                    }
                    BreakDecision::MoveToNextPage => {
                        capacity = self.close_page(&mut pages, &mut current)?;
                        used = 0.0;
                    }
                    BreakDecision::ScaleToFit {
                        height: scaled,
                        scale,
                    } => {
                        // The image goes alone on a fresh page; scale it to that page.
                        if !current.is_empty() {
                            capacity = self.close_page(&mut pages, &mut current)?;
                            used = 0.0;
                            continue;
                        }
                        warn!(
                            "image unit {} is {:.1}mm tall, scaled by {:.3} to {:.1}mm",
                            unit.order_index, height, scale, scaled
                        );
                        current.push(Placement::scaled(unit, scaled, scale));
                        capacity = self.close_page(&mut pages, &mut current)?;
                        used = 0.0;
                        break;
                    }
                    BreakDecision::PlaceOverflowed => {
                        warn!(
                            "unit {} ({}) is {:.1}mm tall and overflows a {:.1}mm page",
                            unit.order_index,
                            unit.kind.label(),
                            height,
                            capacity.flow_height()
                        );
                        current.overflowed = true;
                        current.push(Placement::new(unit, height));
                        capacity = self.close_page(&mut pages, &mut current)?;
                        used = 0.0;
                        break;
                    }
                }
            }
        }

        if !current.is_empty() {
            self.close_page(&mut pages, &mut current)?;
        }

        Ok(pages)
    }

    /// Move the current group into `pages` and return the next page's capacity.
    fn close_page(
        &self,
        pages: &mut Vec<PageContentGroup>,
        current: &mut PageContentGroup,
    ) -> Result<PageCapacity> {
        let group = mem::take(current);
        debug!(
            "page {}: {} units, {:.1}mm used{}",
            pages.len() + 1,
            group.len(),
            group.used_height(),
            if group.overflowed { " (overflowed)" } else { "" }
        );
        pages.push(group);
        self.layout.capacity(false)
    }
}
