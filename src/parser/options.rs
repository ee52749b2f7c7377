//! Decomposition options and configuration.

/// Default `strftime` pattern for the publication date in the byline.
pub const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y";

/// Options for decomposing an article into content units.
#[derive(Debug, Clone)]
pub struct DecomposeOptions {
    /// Synthesize a title/byline unit from metadata
    pub title_block: bool,

    /// Synthesize a hero image unit from metadata
    pub hero_image: bool,

    /// Synthesize a table-of-contents unit from metadata
    pub table_of_contents: bool,

    /// Heading printed above structured table-of-contents entries
    pub toc_heading: String,

    /// `strftime` pattern for the publication date
    pub date_format: String,
}

impl DecomposeOptions {
    /// Create new decompose options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only decompose the body markup; synthesize nothing from metadata.
    pub fn body_only(mut self) -> Self {
        self.title_block = false;
        self.hero_image = false;
        self.table_of_contents = false;
        self
    }

    /// Enable or disable the title/byline unit.
    pub fn with_title_block(mut self, enabled: bool) -> Self {
        self.title_block = enabled;
        self
    }

    /// Enable or disable the hero image unit.
    pub fn with_hero_image(mut self, enabled: bool) -> Self {
        self.hero_image = enabled;
        self
    }

    /// Enable or disable the table-of-contents unit.
    pub fn with_table_of_contents(mut self, enabled: bool) -> Self {
        self.table_of_contents = enabled;
        self
    }

    /// Set the table-of-contents heading.
    pub fn with_toc_heading(mut self, heading: impl Into<String>) -> Self {
        self.toc_heading = heading.into();
        self
    }

    /// Set the publication date format.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }
}

impl Default for DecomposeOptions {
    fn default() -> Self {
        Self {
            title_block: true,
            hero_image: true,
            table_of_contents: true,
            toc_heading: "Contents".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}
