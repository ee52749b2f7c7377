//! Wraps page content groups in chrome.

use rayon::prelude::*;

use super::chrome::Chrome;
use super::RenderOptions;
use crate::layout::{LayoutConfig, Typography};
use crate::model::{PageContentGroup, Placement, PublicationMetadata, RenderedPage};
use crate::parser::markup::escape;

/// Base stylesheet for assembled pages.
///
/// Page geometry and theme colours are inline on each page; this only carries
/// the rules that keep units whole and scaled images inside their frame.
pub const PAGE_STYLESHEET: &str = "\
.magazine-page{box-sizing:border-box;overflow:hidden;display:flex;flex-direction:column;background:#fff}
.page-header,.page-footer{box-sizing:border-box;display:flex;align-items:center;gap:4mm;flex:none}
.page-footer{justify-content:space-between;font-size:8pt}
.masthead{font-weight:bold;letter-spacing:0.05em;text-transform:uppercase}
.publication-logo{max-height:80%}
.page-content{box-sizing:border-box;flex:none;column-fill:auto}
.page-content>*{break-inside:avoid;margin-top:0}
.page-content.overflowed{overflow:visible}
.fit-image{display:flex;justify-content:center;break-inside:avoid}
.fit-image img{max-height:100%;max-width:100%;width:auto;height:auto}
";

/// Turns flowed page groups into presentable pages.
#[derive(Debug, Clone, Default)]
pub struct PageAssembler {
    layout: LayoutConfig,
    typography: Typography,
    options: RenderOptions,
}

impl PageAssembler {
    /// Create an assembler for a layout.
    pub fn new(layout: LayoutConfig, typography: Typography, options: RenderOptions) -> Self {
        Self {
            layout,
            typography,
            options,
        }
    }

    /// Get the render options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Assemble pages in order, numbering from 1.
    ///
    /// Pages outside the page selection are skipped but keep their numbers.
    pub fn assemble(
        &self,
        groups: &[PageContentGroup],
        metadata: &PublicationMetadata,
    ) -> Vec<RenderedPage> {
        let chrome = Chrome::new(metadata, &self.layout, &self.options);
        let selection = &self.options.page_selection;

        if self.options.parallel {
            groups
                .par_iter()
                .enumerate()
                .filter(|(index, _)| selection.includes(*index as u32 + 1))
                .map(|(index, group)| self.render_page(&chrome, group, index as u32 + 1))
                .collect()
        } else {
            groups
                .iter()
                .enumerate()
                .filter(|(index, _)| selection.includes(*index as u32 + 1))
                .map(|(index, group)| self.render_page(&chrome, group, index as u32 + 1))
                .collect()
        }
    }

    fn render_page(&self, chrome: &Chrome, group: &PageContentGroup, page_number: u32) -> RenderedPage {
        let layout = &self.layout;
        let header_height = if page_number == 1 {
            layout.first_page_header_height.unwrap_or(layout.header_height)
        } else {
            layout.header_height
        };
        let content_height = layout.page_height - header_height - layout.footer_height;

        let mut html = String::with_capacity(
            group.placements.iter().map(|p| p.unit.markup.len()).sum::<usize>() + 1024,
        );
        html.push_str(&format!(
            "<article class=\"magazine-page\" data-page=\"{}\" style=\"width:{}mm;height:{}mm;{}\">",
            page_number,
            layout.page_width,
            layout.page_height,
            escape(&self.typography.to_css())
        ));
        html.push_str(&chrome.header(page_number));

        let class = if group.overflowed {
            "page-content overflowed"
        } else {
            "page-content"
        };
        html.push_str(&format!(
            "<main class=\"{}\" style=\"height:{}mm;column-count:{};column-gap:{}mm;padding:0 {}mm 0 {}mm\">",
            class,
            content_height,
            layout.column_count,
            layout.column_gap,
            layout.margin_right,
            layout.margin_left
        ));
        for placement in &group.placements {
            push_placement(&mut html, placement);
        }
        html.push_str("</main>");

        html.push_str(&chrome.footer(page_number));
        html.push_str("</article>");

        RenderedPage {
            page_number,
            html,
            overflowed: group.overflowed,
            unit_range: group.unit_range(),
        }
    }
}

fn push_placement(html: &mut String, placement: &Placement) {
    match placement.scale {
        Some(scale) => {
            html.push_str(&format!(
                "<div class=\"fit-image\" style=\"height:{:.2}mm\" data-scale=\"{:.4}\">",
                placement.height, scale
            ));
            html.push_str(&placement.unit.markup);
            html.push_str("</div>");
        }
        None => html.push_str(&placement.unit.markup),
    }
    html.push('\n');
}
