//! Publication metadata carried alongside the article markup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default theme colour used when none (or an invalid one) is supplied.
pub const DEFAULT_THEME_COLOR: &str = "#1f2937";

/// Metadata bundle for a single pagination run.
///
/// Chrome styling (theme colour, logo) travels here explicitly; pagination
/// never reads ambient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicationMetadata {
    /// International Standard Serial Number
    pub issn: Option<String>,

    /// Volume number or label
    pub volume: Option<String>,

    /// Issue number or label
    pub issue: Option<String>,

    /// Editor responsible for the article
    pub editor_name: Option<String>,

    /// Article author
    pub author_name: Option<String>,

    /// Article title
    pub title: Option<String>,

    /// Logo image URL, shown on the first page only
    pub logo: Option<String>,

    /// Masthead title repeated on every page
    pub publication_title: String,

    /// Footer text repeated on every page
    pub footer_text: String,

    /// Accent colour for header and footer chrome
    pub theme_color: String,

    /// Hero image URL placed after the title block
    pub hero_image: Option<String>,

    /// Table of contents placed after the hero image
    pub table_of_content: Option<TableOfContents>,

    /// Contact address printed in the footer
    pub email: Option<String>,

    /// Publication date
    pub publication_date: Option<NaiveDate>,
}

impl PublicationMetadata {
    /// Create metadata with a masthead title and defaults elsewhere.
    pub fn new(publication_title: impl Into<String>) -> Self {
        Self {
            publication_title: publication_title.into(),
            ..Default::default()
        }
    }

    /// Set the article title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the article author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author_name = Some(author.into());
        self
    }

    /// Set the editor.
    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor_name = Some(editor.into());
        self
    }

    /// Set volume and issue labels.
    pub fn with_issue(mut self, volume: impl Into<String>, issue: impl Into<String>) -> Self {
        self.volume = Some(volume.into());
        self.issue = Some(issue.into());
        self
    }

    /// Set the ISSN.
    pub fn with_issn(mut self, issn: impl Into<String>) -> Self {
        self.issn = Some(issn.into());
        self
    }

    /// Set the logo URL.
    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = Some(logo.into());
        self
    }

    /// Set the footer text.
    pub fn with_footer_text(mut self, text: impl Into<String>) -> Self {
        self.footer_text = text.into();
        self
    }

    /// Set the theme colour.
    pub fn with_theme_color(mut self, color: impl Into<String>) -> Self {
        self.theme_color = color.into();
        self
    }

    /// Set the hero image URL.
    pub fn with_hero_image(mut self, url: impl Into<String>) -> Self {
        self.hero_image = Some(url.into());
        self
    }

    /// Set the table of contents.
    pub fn with_table_of_contents(mut self, toc: TableOfContents) -> Self {
        self.table_of_content = Some(toc);
        self
    }

    /// Set the contact email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the publication date.
    pub fn with_publication_date(mut self, date: NaiveDate) -> Self {
        self.publication_date = Some(date);
        self
    }

    /// Check if any title/byline field is present.
    pub fn has_byline(&self) -> bool {
        self.title.is_some()
            || self.author_name.is_some()
            || self.editor_name.is_some()
            || self.publication_date.is_some()
    }
}

impl Default for PublicationMetadata {
    fn default() -> Self {
        Self {
            issn: None,
            volume: None,
            issue: None,
            editor_name: None,
            author_name: None,
            title: None,
            logo: None,
            publication_title: String::new(),
            footer_text: String::new(),
            theme_color: DEFAULT_THEME_COLOR.to_string(),
            hero_image: None,
            table_of_content: None,
            email: None,
            publication_date: None,
        }
    }
}

/// Table of contents supplied with the metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableOfContents {
    /// Structured entries rendered as an ordered list
    Entries(Vec<TocEntry>),
    /// Pre-rendered markup used verbatim
    Markup(String),
}

impl TableOfContents {
    /// Check if there is nothing to render.
    pub fn is_empty(&self) -> bool {
        match self {
            TableOfContents::Entries(entries) => entries.is_empty(),
            TableOfContents::Markup(markup) => markup.trim().is_empty(),
        }
    }
}

/// A single table-of-contents line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Entry title
    pub title: String,

    /// Target page label
    #[serde(default)]
    pub page: Option<String>,
}

impl TocEntry {
    /// Create a new entry.
    pub fn new(title: impl Into<String>, page: Option<&str>) -> Self {
        Self {
            title: title.into(),
            page: page.map(str::to_string),
        }
    }
}
