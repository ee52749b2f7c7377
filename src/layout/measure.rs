//! Measurement of rendered unit heights.
//!
//! The flow engine never measures anything itself; it asks a
//! [`MeasurementProvider`]. A browser host can answer with real layout, while
//! [`TextMetricsMeasurer`] gives a headless approximation from text metrics.

use std::num::NonZeroUsize;

use lru::LruCache;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::parser::markup;

/// Millimetres per typographic point.
pub const PT_TO_MM: f32 = 25.4 / 72.0;

/// Millimetres per CSS pixel (96 dpi).
pub const PX_TO_MM: f32 = 25.4 / 96.0;

/// Height/width ratio assumed for images without intrinsic dimensions.
const DEFAULT_IMAGE_ASPECT: f32 = 0.75;

/// Default number of cached measurements kept by [`TextMetricsMeasurer`].
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Vertical space taken by a horizontal rule.
const RULE_HEIGHT: f32 = 4.0;

/// Glyph advance of monospace text in `pre` blocks, in em.
const MONOSPACE_CHAR_WIDTH: f32 = 0.6;

/// Typography used for both measurement and final display.
///
/// Measured heights are only valid when these match what the page frame renders with.
#[derive(Debug, Clone, PartialEq)]
pub struct Typography {
    /// CSS font family
    pub font_family: String,

    /// Body font size in points
    pub font_size: f32,

    /// Line height as a multiple of the font size
    pub line_height: f32,

    /// Average glyph advance in em
    pub avg_char_width: f32,

    /// Space after each block, in millimetres
    pub paragraph_spacing: f32,

    /// Indentation per list or quote level, in millimetres
    pub list_indent: f32,
}

impl Typography {
    /// Create typography with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the body font size in points.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set the line height multiplier.
    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    /// Set the average glyph advance in em.
    pub fn with_avg_char_width(mut self, em: f32) -> Self {
        self.avg_char_width = em;
        self
    }

    /// Set the space after each block.
    pub fn with_paragraph_spacing(mut self, mm: f32) -> Self {
        self.paragraph_spacing = mm;
        self
    }

    /// Height of one body text line in millimetres.
    pub fn line_height_mm(&self) -> f32 {
        self.font_size * PT_TO_MM * self.line_height
    }

    /// Check that all metrics are usable.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("font size", self.font_size),
            ("line height", self.line_height),
            ("average character width", self.avg_char_width),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidLayoutConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("paragraph spacing", self.paragraph_spacing),
            ("list indent", self.list_indent),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidLayoutConfig(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// CSS declarations reproducing these metrics on the page frame.
    pub fn to_css(&self) -> String {
        format!(
            "font-family:{};font-size:{}pt;line-height:{}",
            self.font_family, self.font_size, self.line_height
        )
    }

}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "Georgia, 'Times New Roman', serif".to_string(),
            font_size: 10.0,
            line_height: 1.5,
            avg_char_width: 0.5,
            paragraph_spacing: 3.0,
            list_indent: 6.0,
        }
    }
}

/// Capability that reports how tall a unit renders.
///
/// A provider is borrowed mutably for a whole pagination run, so two runs can
/// never interleave their measurements.
pub trait MeasurementProvider {
    /// Height in millimetres of `markup` laid out in a column `width` millimetres wide.
    fn measure_height(&mut self, markup: &str, width: f32, typography: &Typography)
        -> Result<f32>;
}

impl<M: MeasurementProvider + ?Sized> MeasurementProvider for &mut M {
    fn measure_height(
        &mut self,
        markup: &str,
        width: f32,
        typography: &Typography,
    ) -> Result<f32> {
        (**self).measure_height(markup, width, typography)
    }
}

impl<M: MeasurementProvider + ?Sized> MeasurementProvider for Box<M> {
    fn measure_height(
        &mut self,
        markup: &str,
        width: f32,
        typography: &Typography,
    ) -> Result<f32> {
        (**self).measure_height(markup, width, typography)
    }
}

/// Provider backed by a closure, for hosts that already know unit heights.
pub struct FixedHeightMeasurer<F> {
    measure: F,
}

impl<F> FixedHeightMeasurer<F>
where
    F: FnMut(&str, f32, &Typography) -> f32,
{
    /// Wrap a closure.
    pub fn new(measure: F) -> Self {
        Self { measure }
    }
}

impl<F> MeasurementProvider for FixedHeightMeasurer<F>
where
    F: FnMut(&str, f32, &Typography) -> f32,
{
    fn measure_height(
        &mut self,
        markup: &str,
        width: f32,
        typography: &Typography,
    ) -> Result<f32> {
        Ok((self.measure)(markup, width, typography))
    }
}

/// Headless text-metrics approximation of a rendering surface.
///
/// Text is broken into lines at UAX #14 opportunities using an average glyph
/// advance; images use their intrinsic size scaled to the column. Results are
/// cached per `(markup, width)` so unchanged units are not re-measured
/// between repagination runs. The cache holds at most
/// [`DEFAULT_CACHE_CAPACITY`] entries, evicting the least recently used, and
/// is cleared whenever the typography changes.
pub struct TextMetricsMeasurer {
    cache: LruCache<(String, u32), f32>,
    cache_typography: Option<Typography>,
    cache_hits: usize,
    entity_regex: Regex,
    whitespace_regex: Regex,
}

impl TextMetricsMeasurer {
    /// Create a new measurer with an empty cache.
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a measurer whose cache holds at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            cache_typography: None,
            cache_hits: 0,
            entity_regex: Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);")
                .unwrap(),
            whitespace_regex: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Number of cached measurements.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Number of measurements answered from the cache.
    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    /// Maximum number of cached measurements.
    pub fn cache_capacity(&self) -> usize {
        self.cache.cap().get()
    }

    /// Drop all cached measurements.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.cache_typography = None;
        self.cache_hits = 0;
    }

    fn measure_uncached(&self, source: &str, width: f32, typography: &Typography) -> Result<f32> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().check_end_names = false;
        reader.config_mut().allow_unmatched_ends = true;

        let mut state = MeasureState::new(width, typography);
        let mut open: Vec<String> = Vec::new();

        loop {
            let position = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| {
                Error::Measurement(format!("cannot read markup at byte {}: {}", position, e))
            })?;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let name = markup::start_name(e, position)?;
                    let opens = matches!(event, Event::Start(_)) && !markup::is_void(&name);
                    match name.as_str() {
                        "img" => {
                            state.flush(self);
                            state.height += image_height(e, state.available_width());
                        }
                        "hr" => {
                            state.flush(self);
                            state.height += RULE_HEIGHT;
                        }
                        "br" => state.flush(self),
                        _ if breaks_line(&name) => state.flush(self),
                        _ => {}
                    }
                    if opens {
                        state.enter(&name);
                        open.push(name);
                    }
                }
                Event::End(ref e) => {
                    let name = markup::end_name(e, position)?;
                    if breaks_line(&name) {
                        state.flush(self);
                    }
                    if open.last() == Some(&name) {
                        open.pop();
                        state.leave();
                    }
                }
                Event::Text(ref text) => state.push_text(&String::from_utf8_lossy(text)),
                Event::CData(ref text) => state.push_text(&String::from_utf8_lossy(text)),
                Event::Eof => break,
                _ => {}
            }
        }

        state.flush(self);
        Ok(state.height + typography.paragraph_spacing)
    }

    fn normalize(&self, text: &str, preformatted: bool) -> String {
        let text: String = text.nfc().collect();
        let text = self.entity_regex.replace_all(&text, "x");
        if preformatted {
            text.into_owned()
        } else {
            self.whitespace_regex.replace_all(&text, " ").trim().to_string()
        }
    }
}

impl Default for TextMetricsMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementProvider for TextMetricsMeasurer {
    fn measure_height(
        &mut self,
        markup: &str,
        width: f32,
        typography: &Typography,
    ) -> Result<f32> {
        if !width.is_finite() || width <= 0.0 {
            return Err(Error::Measurement(format!(
                "column width must be positive, got {}",
                width
            )));
        }

        if self.cache_typography.as_ref() != Some(typography) {
            self.cache.clear();
            self.cache_typography = Some(typography.clone());
        }

        let key = (markup.to_string(), width.to_bits());
        if let Some(&height) = self.cache.get(&key) {
            self.cache_hits += 1;
            return Ok(height);
        }

        let height = self.measure_uncached(markup, width, typography)?;
        self.cache.put(key, height);
        Ok(height)
    }
}

/// Running state while walking one unit's markup.
struct MeasureState<'t> {
    typography: &'t Typography,
    width: f32,
    height: f32,
    pending: String,
    pending_scale: f32,
    scales: Vec<f32>,
    indents: Vec<f32>,
    pre_flags: Vec<bool>,
    preformatted: usize,
}

impl<'t> MeasureState<'t> {
    fn new(width: f32, typography: &'t Typography) -> Self {
        Self {
            typography,
            width,
            height: 0.0,
            pending: String::new(),
            pending_scale: 1.0,
            scales: Vec::new(),
            indents: Vec::new(),
            pre_flags: Vec::new(),
            preformatted: 0,
        }
    }

    fn scale(&self) -> f32 {
        self.scales.last().copied().unwrap_or(1.0)
    }

    fn available_width(&self) -> f32 {
        let indent: f32 = self.indents.iter().sum();
        (self.width - indent).max(self.width * 0.25)
    }

    fn enter(&mut self, name: &str) {
        let scale = font_scale(name).unwrap_or_else(|| self.scale());
        self.scales.push(scale);
        let indent = match name {
            "ul" | "ol" | "blockquote" | "dd" => self.typography.list_indent,
            _ => 0.0,
        };
        self.indents.push(indent);
        let is_pre = name == "pre";
        self.pre_flags.push(is_pre);
        if is_pre {
            self.preformatted += 1;
        }
    }

    fn leave(&mut self) {
        self.scales.pop();
        self.indents.pop();
        if self.pre_flags.pop() == Some(true) {
            self.preformatted -= 1;
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.pending.is_empty() {
            self.pending_scale = self.scale();
        }
        self.pending.push_str(text);
    }

    /// Close the current line box and add its height.
    fn flush(&mut self, measurer: &TextMetricsMeasurer) {
        if self.pending.is_empty() {
            return;
        }
        let raw = std::mem::take(&mut self.pending);
        let preformatted = self.preformatted > 0;
        let text = measurer.normalize(&raw, preformatted);
        if text.trim().is_empty() {
            return;
        }

        let font_mm = self.typography.font_size * PT_TO_MM * self.pending_scale;
        let line_height = font_mm * self.typography.line_height;
        let width = self.available_width();

        let lines = if preformatted {
            let advance = font_mm * MONOSPACE_CHAR_WIDTH;
            text.trim_matches('\n')
                .split('\n')
                .map(|line| count_lines(line, width, advance))
                .sum()
        } else {
            count_lines(&text, width, font_mm * self.typography.avg_char_width)
        };

        self.height += lines as f32 * line_height;
    }
}

/// Elements that start or end a line box.
fn breaks_line(name: &str) -> bool {
    matches!(
        name,
        "p" | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "li"
            | "dt"
            | "dd"
            | "div"
            | "blockquote"
            | "figure"
            | "figcaption"
            | "header"
            | "footer"
            | "section"
            | "article"
            | "aside"
            | "nav"
            | "ul"
            | "ol"
            | "dl"
            | "table"
            | "tr"
            | "pre"
            | "address"
    )
}

fn font_scale(name: &str) -> Option<f32> {
    let scale = match name {
        "h1" => 2.0,
        "h2" => 1.6,
        "h3" => 1.35,
        "h4" => 1.2,
        "h5" => 1.1,
        "h6" => 1.0,
        "figcaption" | "small" | "sub" | "sup" => 0.85,
        _ => return None,
    };
    Some(scale)
}

fn parse_px(value: &str) -> Option<f32> {
    value
        .trim()
        .trim_end_matches("px")
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Rendered height of an image constrained to `available_width`.
fn image_height(e: &BytesStart<'_>, available_width: f32) -> f32 {
    let width = markup::attribute(e, "width").as_deref().and_then(parse_px);
    let height = markup::attribute(e, "height").as_deref().and_then(parse_px);

    match (width, height) {
        (Some(w), Some(h)) => {
            let display_width = (w * PX_TO_MM).min(available_width);
            display_width * h / w
        }
        (None, Some(h)) => h * PX_TO_MM,
        (Some(w), None) => (w * PX_TO_MM).min(available_width) * DEFAULT_IMAGE_ASPECT,
        (None, None) => available_width * DEFAULT_IMAGE_ASPECT,
    }
}

/// Count the lines `text` occupies when greedily broken at UAX #14 opportunities.
fn count_lines(text: &str, max_width: f32, char_width: f32) -> usize {
    if text.is_empty() {
        return 1;
    }

    let per_line = ((max_width / char_width).floor() as usize).max(1);
    let mut lines = 1;
    let mut line_len = 0usize;
    let mut last = 0;

    for (position, opportunity) in linebreaks(text) {
        let segment = &text[last..position];
        last = position;

        let full_len = segment.chars().count();
        let ink_len = segment.trim_end().chars().count();

        if line_len > 0 && line_len + ink_len > per_line {
            lines += 1;
            line_len = 0;
        }

        if ink_len > per_line {
            let spans = ink_len.div_ceil(per_line);
            lines += spans - 1;
            line_len = ink_len - (spans - 1) * per_line + (full_len - ink_len);
        } else {
            line_len += full_len;
        }

        if opportunity == BreakOpportunity::Mandatory && position < text.len() {
            lines += 1;
            line_len = 0;
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_count_lines_greedy() {
        assert_eq!(count_lines("aaaa bbbb cccc", 10.0, 1.0), 2);
        assert_eq!(count_lines("short", 10.0, 1.0), 1);
        assert_eq!(count_lines("abcdefghijklmnopqrstuvwxy", 10.0, 1.0), 3);
        assert_eq!(count_lines("", 10.0, 1.0), 1);
    }

    #[test]
    fn test_count_lines_mandatory_break() {
        assert_eq!(count_lines("one\ntwo", 100.0, 1.0), 2);
    }

    #[test]
    fn test_paragraph_height() {
        let typography = Typography::default().with_paragraph_spacing(0.0);
        let mut measurer = TextMetricsMeasurer::new();

        let one_line = measurer
            .measure_height("<p>Short line.</p>", 80.0, &typography)
            .unwrap();
        assert!(approx(one_line, typography.line_height_mm()));

        let long = "word ".repeat(200);
        let many = measurer
            .measure_height(&format!("<p>{}</p>", long), 80.0, &typography)
            .unwrap();
        assert!(many > one_line * 10.0);
    }

    #[test]
    fn test_narrower_column_is_taller() {
        let typography = Typography::default();
        let mut measurer = TextMetricsMeasurer::new();
        let markup = format!("<p>{}</p>", "lorem ipsum dolor sit amet ".repeat(40));

        let wide = measurer.measure_height(&markup, 170.0, &typography).unwrap();
        let narrow = measurer.measure_height(&markup, 80.0, &typography).unwrap();
        assert!(narrow > wide);
    }

    #[test]
    fn test_heading_taller_than_paragraph() {
        let typography = Typography::default();
        let mut measurer = TextMetricsMeasurer::new();
        let heading = measurer.measure_height("<h1>Title</h1>", 80.0, &typography).unwrap();
        let paragraph = measurer.measure_height("<p>Title</p>", 80.0, &typography).unwrap();
        assert!(heading > paragraph);
    }

    #[test]
    fn test_image_uses_intrinsic_aspect() {
        let typography = Typography::default().with_paragraph_spacing(0.0);
        let mut measurer = TextMetricsMeasurer::new();

        // 1200x900 px is wider than an 80mm column: scaled to 80mm wide, 60mm tall.
        let height = measurer
            .measure_height(r#"<p><img src="a.jpg" width="1200" height="900"></p>"#, 80.0, &typography)
            .unwrap();
        assert!(approx(height, 60.0));

        // Without dimensions the default 4:3 ratio applies.
        let height = measurer
            .measure_height(r#"<img src="b.jpg"/>"#, 80.0, &typography)
            .unwrap();
        assert!(approx(height, 60.0));
    }

    #[test]
    fn test_entities_and_whitespace_collapse() {
        let typography = Typography::default();
        let mut measurer = TextMetricsMeasurer::new();
        let plain = measurer.measure_height("<p>a b</p>", 80.0, &typography).unwrap();
        let spaced = measurer
            .measure_height("<p>a\n\n      &nbsp;b</p>", 80.0, &typography)
            .unwrap();
        assert!(approx(plain, spaced));
    }

    #[test]
    fn test_cache_hits() {
        let typography = Typography::default();
        let mut measurer = TextMetricsMeasurer::new();
        let first = measurer.measure_height("<p>cached</p>", 80.0, &typography).unwrap();
        let second = measurer.measure_height("<p>cached</p>", 80.0, &typography).unwrap();
        assert_eq!(first, second);
        assert_eq!(measurer.cache_len(), 1);
        assert_eq!(measurer.cache_hits(), 1);

        measurer
            .measure_height("<p>cached</p>", 60.0, &typography)
            .unwrap();
        assert_eq!(measurer.cache_len(), 2);

        measurer.clear_cache();
        assert_eq!(measurer.cache_len(), 0);
    }

    #[test]
    fn test_cache_is_bounded() {
        let typography = Typography::default();
        let mut measurer = TextMetricsMeasurer::with_cache_capacity(64);
        for i in 0..10_000 {
            measurer
                .measure_height(&format!("<p>edit {}</p>", i), 80.0, &typography)
                .unwrap();
        }
        assert_eq!(measurer.cache_len(), 64);
        assert_eq!(measurer.cache_capacity(), 64);

        // Recent entries survive, the oldest are gone.
        measurer.measure_height("<p>edit 9999</p>", 80.0, &typography).unwrap();
        assert_eq!(measurer.cache_hits(), 1);
        measurer.measure_height("<p>edit 0</p>", 80.0, &typography).unwrap();
        assert_eq!(measurer.cache_hits(), 1);
    }

    #[test]
    fn test_default_cache_capacity_bounds_long_sessions() {
        let typography = Typography::default();
        let mut measurer = TextMetricsMeasurer::new();
        for i in 0..20_000 {
            measurer
                .measure_height(&format!("<p>edit {}</p>", i), 80.0, &typography)
                .unwrap();
        }
        assert_eq!(measurer.cache_len(), DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_cache_keyed_by_markup_and_width() {
        let typography = Typography::default();
        let mut measurer = TextMetricsMeasurer::new();
        let short = measurer.measure_height("<p>a</p>", 80.0, &typography).unwrap();
        let long = measurer
            .measure_height(&format!("<p>{}</p>", "word ".repeat(200)), 80.0, &typography)
            .unwrap();
        assert!(long > short);
        assert_eq!(measurer.measure_height("<p>a</p>", 80.0, &typography).unwrap(), short);
        assert_eq!(measurer.cache_hits(), 1);
    }

    #[test]
    fn test_typography_change_clears_cache() {
        let mut measurer = TextMetricsMeasurer::new();
        let body = Typography::default();
        let large = Typography::default().with_font_size(14.0);

        let small_height = measurer.measure_height("<p>text</p>", 80.0, &body).unwrap();
        let large_height = measurer.measure_height("<p>text</p>", 80.0, &large).unwrap();
        assert!(large_height > small_height);
        assert_eq!(measurer.cache_len(), 1);
        assert_eq!(measurer.cache_hits(), 0);
    }

    #[test]
    fn test_invalid_width_rejected() {
        let mut measurer = TextMetricsMeasurer::new();
        let err = measurer
            .measure_height("<p>x</p>", 0.0, &Typography::default())
            .unwrap_err();
        assert!(matches!(err, Error::Measurement(_)));
    }

    #[test]
    fn test_fixed_height_measurer() {
        let mut measurer = FixedHeightMeasurer::new(|markup: &str, _: f32, _: &Typography| markup.len() as f32);
        assert_eq!(
            measurer.measure_height("<p>abc</p>", 80.0, &Typography::default()).unwrap(),
            10.0
        );
    }

    #[test]
    fn test_typography_validation() {
        assert!(Typography::default().validate().is_ok());
        assert!(Typography::default().with_font_size(0.0).validate().is_err());
        assert!(Typography::default().with_paragraph_spacing(-1.0).validate().is_err());
    }
}
