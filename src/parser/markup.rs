//! Small helpers shared by everything that walks article markup.

use quick_xml::events::{BytesEnd, BytesStart};

use crate::error::{Error, Result};

/// HTML elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Check if an element is an HTML void element.
pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Lowercased tag name of a start tag.
pub fn start_name(e: &BytesStart<'_>, position: usize) -> Result<String> {
    decode_name(e.name().as_ref(), position)
}

/// Lowercased tag name of an end tag.
pub fn end_name(e: &BytesEnd<'_>, position: usize) -> Result<String> {
    decode_name(e.name().as_ref(), position)
}

fn decode_name(raw: &[u8], position: usize) -> Result<String> {
    let name = std::str::from_utf8(raw)
        .map_err(|_| Error::malformed(position, "tag name is not valid UTF-8"))?;
    if name.is_empty() {
        return Err(Error::malformed(position, "empty tag name"));
    }
    Ok(name.to_ascii_lowercase())
}

/// Validate every attribute of a start tag.
///
/// HTML rules apply: valueless and unquoted attributes are accepted,
/// duplicates are not.
pub fn check_attributes(e: &BytesStart<'_>, position: usize) -> Result<()> {
    for attr in e.html_attributes() {
        attr.map_err(|err| Error::malformed(position, format!("invalid attribute: {}", err)))?;
    }
    Ok(())
}

/// Raw value of an attribute, if present.
pub fn attribute(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.html_attributes()
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(name.as_bytes()))
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Escape text for inclusion in element content or attribute values.
pub fn escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;
    use quick_xml::Reader;

    fn first_start(markup: &str) -> BytesStart<'static> {
        let mut reader = Reader::from_str(markup);
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) | Event::Empty(e) => return e.into_owned(),
                Event::Eof => panic!("no start tag in {:?}", markup),
                _ => {}
            }
        }
    }

    #[test]
    fn test_void_elements() {
        assert!(is_void("img"));
        assert!(is_void("br"));
        assert!(!is_void("p"));
    }

    #[test]
    fn test_attribute_lookup() {
        let e = first_start(r#"<IMG SRC="a.png" width=640 height="480">"#);
        assert_eq!(start_name(&e, 0).unwrap(), "img");
        assert_eq!(attribute(&e, "src").as_deref(), Some("a.png"));
        assert_eq!(attribute(&e, "width").as_deref(), Some("640"));
        assert_eq!(attribute(&e, "alt"), None);
        assert!(check_attributes(&e, 0).is_ok());
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let e = first_start(r#"<p class="a" class="b">"#);
        let err = check_attributes(&e, 7).unwrap_err();
        assert!(err.is_malformed_document());
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("Tom & \"Jerry\" <3"), "Tom &amp; &quot;Jerry&quot; &lt;3");
    }
}
