//! Splits article markup into atomic content units.

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::model::{ContentUnit, PublicationMetadata, TableOfContents, UnitKind};

use super::markup::{self, escape};
use super::options::{DecomposeOptions, DEFAULT_DATE_FORMAT};

/// Decompose markup with default options.
pub fn decompose(markup: &str, metadata: &PublicationMetadata) -> Result<Vec<ContentUnit>> {
    Decomposer::new(DecomposeOptions::default()).decompose(markup, metadata)
}

/// Content decomposer.
///
/// Produces virtual units synthesized from metadata (title block, hero image,
/// table of contents) followed by one unit per top-level block element of the
/// body markup.
#[derive(Debug, Clone, Default)]
pub struct Decomposer {
    options: DecomposeOptions,
}

impl Decomposer {
    /// Create a new decomposer.
    pub fn new(options: DecomposeOptions) -> Self {
        Self { options }
    }

    /// Get the decomposer options.
    pub fn options(&self) -> &DecomposeOptions {
        &self.options
    }

    /// Decompose an article into an ordered unit sequence.
    ///
    /// Fails with [`Error::MalformedDocument`] if the markup is not
    /// well-formed; nothing is returned in that case.
    pub fn decompose(
        &self,
        markup: &str,
        metadata: &PublicationMetadata,
    ) -> Result<Vec<ContentUnit>> {
        let mut units = Vec::new();

        for (kind, fragment) in self.virtual_units(metadata)? {
            let index = units.len();
            units.push(ContentUnit::new(kind, fragment, index));
        }

        for (kind, fragment) in split_blocks(markup)? {
            let index = units.len();
            units.push(ContentUnit::new(kind, fragment, index));
        }

        log::debug!("Decomposed document into {} units", units.len());
        Ok(units)
    }

    fn virtual_units(&self, metadata: &PublicationMetadata) -> Result<Vec<(UnitKind, String)>> {
        let mut units = Vec::new();

        if self.options.title_block && metadata.has_byline() {
            units.push((UnitKind::TitleBlock, self.title_block(metadata)));
        }

        if self.options.hero_image {
            if let Some(ref url) = metadata.hero_image {
                let alt = metadata.title.as_deref().unwrap_or("");
                units.push((
                    UnitKind::HeroImage,
                    format!(
                        "<figure class=\"hero-image\"><img src=\"{}\" alt=\"{}\"/></figure>",
                        escape(url),
                        escape(alt)
                    ),
                ));
            }
        }

        if self.options.table_of_contents {
            if let Some(ref toc) = metadata.table_of_content {
                if !toc.is_empty() {
                    let fragment = self.table_of_contents(toc);
                    // Caller-supplied markup has to hold up like the body does.
                    split_blocks(&fragment)?;
                    units.push((UnitKind::TableOfContents, fragment));
                }
            }
        }

        Ok(units)
    }

    fn title_block(&self, metadata: &PublicationMetadata) -> String {
        let mut out = String::from("<header class=\"article-title-block\">");

        if let Some(ref title) = metadata.title {
            out.push_str(&format!("<h1 class=\"article-title\">{}</h1>", escape(title)));
        }
        if let Some(ref author) = metadata.author_name {
            out.push_str(&format!("<p class=\"article-byline\">By {}</p>", escape(author)));
        }
        if let Some(ref editor) = metadata.editor_name {
            out.push_str(&format!(
                "<p class=\"article-editor\">Edited by {}</p>",
                escape(editor)
            ));
        }
        if let Some(date) = metadata.publication_date {
            out.push_str(&format!(
                "<p class=\"article-date\"><time datetime=\"{}\">{}</time></p>",
                date.format("%Y-%m-%d"),
                escape(&format_date(date, &self.options.date_format))
            ));
        }

        out.push_str("</header>");
        out
    }

    fn table_of_contents(&self, toc: &TableOfContents) -> String {
        match toc {
            TableOfContents::Markup(markup) => {
                format!("<nav class=\"table-of-contents\">{}</nav>", markup.trim())
            }
            TableOfContents::Entries(entries) => {
                let mut out = String::from("<nav class=\"table-of-contents\">");
                out.push_str(&format!("<h2>{}</h2><ol>", escape(&self.options.toc_heading)));
                for entry in entries {
                    out.push_str(&format!(
                        "<li><span class=\"toc-title\">{}</span>",
                        escape(&entry.title)
                    ));
                    if let Some(ref page) = entry.page {
                        out.push_str(&format!("<span class=\"toc-page\">{}</span>", escape(page)));
                    }
                    out.push_str("</li>");
                }
                out.push_str("</ol></nav>");
                out
            }
        }
    }
}

/// Format a date, falling back to the default pattern if `pattern` is invalid.
fn format_date(date: NaiveDate, pattern: &str) -> String {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        log::warn!("Invalid date format {:?}, using {:?}", pattern, DEFAULT_DATE_FORMAT);
        return date.format(DEFAULT_DATE_FORMAT).to_string();
    }
    date.format_with_items(items.into_iter()).to_string()
}

/// A top-level block element that is still open.
struct OpenBlock {
    start: usize,
    tag: String,
    kind: UnitKind,
    images: usize,
    other_elements: usize,
    has_text: bool,
}

impl OpenBlock {
    fn new(start: usize, tag: String, kind: UnitKind) -> Self {
        Self {
            start,
            tag,
            kind,
            images: 0,
            other_elements: 0,
            has_text: false,
        }
    }

    fn note_element(&mut self, name: &str) {
        match name {
            "img" => self.images += 1,
            "a" | "picture" | "source" | "figcaption" | "br" => {}
            _ => self.other_elements += 1,
        }
    }

    /// Paragraphs and figures that only wrap an image flow like images.
    fn resolve_kind(&self) -> UnitKind {
        match self.tag.as_str() {
            "p" if self.images == 1 && self.other_elements == 0 && !self.has_text => {
                UnitKind::Image
            }
            "figure" if self.images >= 1 => UnitKind::Image,
            _ => self.kind,
        }
    }
}

/// Split markup into top-level block fragments.
///
/// Consecutive top-level inline content becomes one paragraph fragment.
/// Whitespace between blocks is dropped; every other byte of content ends up
/// in exactly one fragment.
pub(crate) fn split_blocks(markup: &str) -> Result<Vec<(UnitKind, String)>> {
    let mut reader = Reader::from_str(markup);
    {
        let config = reader.config_mut();
        // Void elements may appear without a closing slash; nesting is
        // checked against our own stack instead.
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.check_comments = true;
    }

    let mut blocks = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<OpenBlock> = None;
    let mut inline_run: Option<(usize, usize)> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| Error::malformed(before, e.to_string()))?;
        let after = reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = markup::start_name(e, before)?;
                markup::check_attributes(e, before)?;
                let opens = matches!(event, Event::Start(_)) && !markup::is_void(&name);

                if !stack.is_empty() {
                    if let Some(block) = current.as_mut() {
                        block.note_element(&name);
                    }
                } else if let Some(kind) = UnitKind::from_tag(&name) {
                    flush_inline(&mut inline_run, markup, &mut blocks);
                    if opens {
                        current = Some(OpenBlock::new(before, name.clone(), kind));
                    } else {
                        blocks.push((kind, markup[before..after].to_string()));
                    }
                } else {
                    extend_inline(&mut inline_run, before, after);
                }

                if opens {
                    stack.push(name);
                }
            }
            Event::End(ref e) => {
                let name = markup::end_name(e, before)?;
                if markup::is_void(&name) {
                    // `<img ...></img>` style: nothing was opened.
                    if stack.is_empty() && current.is_none() {
                        extend_inline(&mut inline_run, before, after);
                    }
                    continue;
                }

                match stack.pop() {
                    None => {
                        return Err(Error::malformed(
                            before,
                            format!("unexpected closing tag </{}>", name),
                        ))
                    }
                    Some(open) if open != name => {
                        return Err(Error::malformed(
                            before,
                            format!("expected </{}>, found </{}>", open, name),
                        ))
                    }
                    Some(_) => {}
                }

                if stack.is_empty() {
                    match current.take() {
                        Some(block) => {
                            let kind = block.resolve_kind();
                            blocks.push((kind, markup[block.start..after].to_string()));
                        }
                        None => extend_inline(&mut inline_run, before, after),
                    }
                }
            }
            Event::Text(ref text) => {
                let raw: &[u8] = text;
                let has_content = !raw.iter().all(u8::is_ascii_whitespace);
                if has_content {
                    if stack.is_empty() {
                        let lead = raw.iter().take_while(|b| b.is_ascii_whitespace()).count();
                        let trail = raw.iter().rev().take_while(|b| b.is_ascii_whitespace()).count();
                        extend_inline(&mut inline_run, before + lead, after - trail);
                    } else if let Some(block) = current.as_mut() {
                        block.has_text = true;
                    }
                }
            }
            Event::CData(_) => {
                if stack.is_empty() {
                    extend_inline(&mut inline_run, before, after);
                } else if let Some(block) = current.as_mut() {
                    block.has_text = true;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::malformed(
            markup.len(),
            format!("unclosed <{}>", open),
        ));
    }

    flush_inline(&mut inline_run, markup, &mut blocks);
    Ok(blocks)
}

fn extend_inline(run: &mut Option<(usize, usize)>, start: usize, end: usize) {
    match run {
        Some((_, run_end)) => *run_end = end,
        None => *run = Some((start, end)),
    }
}

fn flush_inline(
    run: &mut Option<(usize, usize)>,
    markup: &str,
    blocks: &mut Vec<(UnitKind, String)>,
) {
    if let Some((start, end)) = run.take() {
        blocks.push((UnitKind::Paragraph, markup[start..end].to_string()));
    }
}
