//! JSON rendering for pages and pagination results.

use serde::Serialize;

use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize pages (or a whole [`PaginationResult`](super::PaginationResult)) to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RenderedPage;

    fn pages() -> Vec<RenderedPage> {
        vec![RenderedPage {
            page_number: 1,
            html: "<article></article>".to_string(),
            overflowed: false,
            unit_range: Some((0, 3)),
        }]
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&pages(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"pageNumber\": 1"));
        assert!(json.contains("\"html\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(pages().as_slice(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"unitRange\":[0,3]"));
    }
}
