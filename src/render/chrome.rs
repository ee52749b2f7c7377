//! Header and footer chrome shared by every page.

use log::warn;
use regex::Regex;

use super::RenderOptions;
use crate::layout::LayoutConfig;
use crate::model::PublicationMetadata;
use crate::parser::markup::escape;

/// Check if a string is an acceptable CSS colour for the chrome.
///
/// Hex notation (`#rgb`, `#rrggbb`, `#rrggbbaa`) and named colours only.
pub fn is_valid_color(color: &str) -> bool {
    let re = Regex::new(r"^(?:#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})|[a-zA-Z][a-zA-Z-]*)$")
        .unwrap();
    re.is_match(color)
}

/// Pre-rendered chrome fragments.
///
/// Everything except the page number and the first-page logo is rendered
/// once, so the chrome is identical across all pages of a run.
#[derive(Debug, Clone)]
pub struct Chrome {
    theme_color: String,
    header_open: String,
    first_page_header_open: String,
    logo: Option<String>,
    masthead: String,
    footer_open: String,
    footer_close: String,
    page_label: String,
}

impl Chrome {
    /// Render the fixed chrome fragments for a publication.
    pub fn new(metadata: &PublicationMetadata, layout: &LayoutConfig, options: &RenderOptions) -> Self {
        let theme_color = resolve_theme_color(&metadata.theme_color, &options.fallback_theme_color);

        let header_style = |height: f32| {
            format!(
                "<header class=\"page-header\" style=\"height:{}mm;border-bottom:0.5mm solid {};padding:0 {}mm 0 {}mm\">",
                height, theme_color, layout.margin_right, layout.margin_left
            )
        };
        let header_open = header_style(layout.header_height);
        let first_page_header_open =
            header_style(layout.first_page_header_height.unwrap_or(layout.header_height));

        let logo = metadata.logo.as_ref().map(|url| {
            format!(
                "<img class=\"publication-logo\" src=\"{}\" alt=\"{}\"/>",
                escape(url),
                escape(&metadata.publication_title)
            )
        });

        let masthead = format!(
            "<div class=\"masthead\" style=\"color:{}\">{}</div>",
            theme_color,
            escape(&metadata.publication_title)
        );

        let mut footer_open = format!(
            "<footer class=\"page-footer\" style=\"height:{}mm;border-top:0.5mm solid {};padding:0 {}mm 0 {}mm\">",
            layout.footer_height, theme_color, layout.margin_right, layout.margin_left
        );
        if !metadata.footer_text.is_empty() {
            footer_open.push_str(&format!(
                "<div class=\"footer-text\">{}</div>",
                escape(&metadata.footer_text)
            ));
        }
        if let Some(line) = issue_line(metadata) {
            footer_open.push_str(&format!("<div class=\"issue-line\">{}</div>", escape(&line)));
        }

        let mut footer_close = String::new();
        if let Some(email) = &metadata.email {
            let email = escape(email);
            footer_close.push_str(&format!(
                "<div class=\"footer-email\"><a href=\"mailto:{}\">{}</a></div>",
                email, email
            ));
        }
        footer_close.push_str("</footer>");

        Self {
            theme_color,
            header_open,
            first_page_header_open,
            logo,
            masthead,
            footer_open,
            footer_close,
            page_label: escape(&options.page_label),
        }
    }

    /// The theme colour actually applied.
    pub fn theme_color(&self) -> &str {
        &self.theme_color
    }

    /// Header markup for a page.
    pub fn header(&self, page_number: u32) -> String {
        let mut out = String::new();
        if page_number == 1 {
            out.push_str(&self.first_page_header_open);
            if let Some(logo) = &self.logo {
                out.push_str(logo);
            }
        } else {
            out.push_str(&self.header_open);
        }
        out.push_str(&self.masthead);
        out.push_str("</header>");
        out
    }

    /// Footer markup for a page.
    pub fn footer(&self, page_number: u32) -> String {
        format!(
            "{}<div class=\"page-number\">{} {}</div>{}",
            self.footer_open, self.page_label, page_number, self.footer_close
        )
    }
}

/// "ISSN 1234-5678 · Vol. 3 · Issue 2", omitting absent parts.
fn issue_line(metadata: &PublicationMetadata) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(issn) = &metadata.issn {
        parts.push(format!("ISSN {}", issn));
    }
    if let Some(volume) = &metadata.volume {
        parts.push(format!("Vol. {}", volume));
    }
    if let Some(issue) = &metadata.issue {
        parts.push(format!("Issue {}", issue));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" · "))
    }
}

fn resolve_theme_color(color: &str, fallback: &str) -> String {
    let color = color.trim();
    if is_valid_color(color) {
        return color.to_string();
    }
    if !color.is_empty() {
        warn!("invalid theme colour '{}', using {}", color, fallback);
    }
    fallback.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> PublicationMetadata {
        PublicationMetadata::new("Quarterly Review")
            .with_footer_text("All rights reserved")
            .with_issn("1234-5678")
            .with_issue("3", "2")
            .with_email("editor@example.org")
            .with_logo("logo.png")
            .with_theme_color("#0a7")
    }

    #[test]
    fn test_valid_colors() {
        for color in ["#fff", "#00aa77", "#00aa77cc", "rebeccapurple", "dark-blue"] {
            assert!(is_valid_color(color), "{}", color);
        }
        for color in ["", "#ggg", "#12345", "red;background:url(x)", "\"><script>"] {
            assert!(!is_valid_color(color), "{}", color);
        }
    }

    #[test]
    fn test_invalid_theme_color_falls_back() {
        let metadata = metadata().with_theme_color("red;position:fixed");
        let chrome = Chrome::new(&metadata, &LayoutConfig::default(), &RenderOptions::default());
        assert_eq!(chrome.theme_color(), crate::model::DEFAULT_THEME_COLOR);
        assert!(!chrome.header(2).contains("position:fixed"));
    }

    #[test]
    fn test_logo_only_on_first_page() {
        let chrome = Chrome::new(&metadata(), &LayoutConfig::default(), &RenderOptions::default());
        assert!(chrome.header(1).contains("publication-logo"));
        assert!(!chrome.header(2).contains("publication-logo"));
        assert!(chrome.header(1).contains("Quarterly Review"));
        assert!(chrome.header(2).contains("Quarterly Review"));
    }

    #[test]
    fn test_footer_contents() {
        let chrome = Chrome::new(&metadata(), &LayoutConfig::default(), &RenderOptions::default());
        let footer = chrome.footer(7);
        assert!(footer.contains("All rights reserved"));
        assert!(footer.contains("ISSN 1234-5678 · Vol. 3 · Issue 2"));
        assert!(footer.contains("Page 7"));
        assert!(footer.contains("mailto:editor@example.org"));
        assert_eq!(
            chrome.footer(3).replace("Page 3", "Page 7"),
            footer
        );
    }

    #[test]
    fn test_chrome_text_is_escaped() {
        let metadata = PublicationMetadata::new("Tom & Jerry <Weekly>");
        let chrome = Chrome::new(&metadata, &LayoutConfig::default(), &RenderOptions::default());
        assert!(chrome.header(2).contains("Tom &amp; Jerry &lt;Weekly&gt;"));
    }

    #[test]
    fn test_issue_line_partial() {
        let metadata = PublicationMetadata::new("X").with_issn("0000-0000");
        assert_eq!(issue_line(&metadata).as_deref(), Some("ISSN 0000-0000"));
        assert_eq!(issue_line(&PublicationMetadata::new("X")), None);
    }
}
