//! Content unit types.

use serde::{Deserialize, Serialize};

/// The kind of an atomic content unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitKind {
    /// Synthesized title / byline block
    TitleBlock,
    /// Hero image synthesized from metadata
    HeroImage,
    /// Table of contents synthesized from metadata
    TableOfContents,
    /// A paragraph, or a run of top-level inline content
    Paragraph,
    /// A heading (`h1`..`h6`)
    Heading {
        /// Heading level (1-6)
        level: u8,
    },
    /// An image, or a paragraph/figure holding only an image
    Image,
    /// An ordered, unordered or description list
    List,
    /// A block quotation
    Blockquote,
    /// A table
    Table,
    /// Preformatted text
    Preformatted,
    /// A horizontal rule
    Rule,
    /// Any other block-level container
    Block,
}

impl UnitKind {
    /// Classify a top-level element by its tag name.
    ///
    /// Returns `None` for inline elements.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "p" => UnitKind::Paragraph,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => UnitKind::Heading {
                level: tag.as_bytes()[1] - b'0',
            },
            "img" => UnitKind::Image,
            "ul" | "ol" | "dl" => UnitKind::List,
            "blockquote" => UnitKind::Blockquote,
            "table" => UnitKind::Table,
            "pre" => UnitKind::Preformatted,
            "hr" => UnitKind::Rule,
            "div" | "section" | "article" | "aside" | "header" | "footer" | "nav" | "main"
            | "figure" | "address" | "details" | "hgroup" | "fieldset" | "form" | "video"
            | "iframe" | "canvas" => UnitKind::Block,
            _ => return None,
        };
        Some(kind)
    }

    /// Check if this unit is an image that may be scaled to fit a column.
    pub fn is_image(&self) -> bool {
        matches!(self, UnitKind::Image | UnitKind::HeroImage)
    }

    /// Check if this unit was synthesized from metadata rather than parsed.
    pub fn is_virtual(&self) -> bool {
        matches!(
            self,
            UnitKind::TitleBlock | UnitKind::HeroImage | UnitKind::TableOfContents
        )
    }

    /// Short label used in logs and the CLI.
    pub fn label(&self) -> &'static str {
        match self {
            UnitKind::TitleBlock => "title-block",
            UnitKind::HeroImage => "hero-image",
            UnitKind::TableOfContents => "table-of-contents",
            UnitKind::Paragraph => "paragraph",
            UnitKind::Heading { .. } => "heading",
            UnitKind::Image => "image",
            UnitKind::List => "list",
            UnitKind::Blockquote => "blockquote",
            UnitKind::Table => "table",
            UnitKind::Preformatted => "preformatted",
            UnitKind::Rule => "rule",
            UnitKind::Block => "block",
        }
    }
}

/// An atomic, indivisible block extracted from the source document.
///
/// A unit is never split across two pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUnit {
    /// What kind of block this is
    pub kind: UnitKind,

    /// Self-contained, well-formed markup for this unit
    pub markup: String,

    /// Position in the decomposed sequence (0-indexed, unique)
    pub order_index: usize,
}

impl ContentUnit {
    /// Create a new content unit.
    pub fn new(kind: UnitKind, markup: impl Into<String>, order_index: usize) -> Self {
        Self {
            kind,
            markup: markup.into(),
            order_index,
        }
    }

    /// Create a paragraph unit.
    pub fn paragraph(markup: impl Into<String>, order_index: usize) -> Self {
        Self::new(UnitKind::Paragraph, markup, order_index)
    }

    /// Create an image unit.
    pub fn image(markup: impl Into<String>, order_index: usize) -> Self {
        Self::new(UnitKind::Image, markup, order_index)
    }
}
