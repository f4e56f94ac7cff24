//! XML parser implementation

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Result, Span};
use crate::xml::cursor::Cursor;
use crate::xml::model::{Content, Document, Element};

/// Configuration for the XML parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

impl Config {
    pub const fn unlimited() -> Self {
        Self { max_depth: 0 }
    }

    pub const fn new(max_depth: u16) -> Self {
        Self { max_depth }
    }
}

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
    depth: u16,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    pub fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            depth: 0,
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        // UTF-8 byte order mark
        if self.cursor.starts_with(&[0xEF, 0xBB, 0xBF]) {
            self.cursor.advance_by(3);
        }

        self.skip_misc()?;
        if self.cursor.current() != Some(b'<') {
            return Err(self.error_here(ErrorKind::InvalidToken, "expected root element"));
        }
        let root = self.parse_element()?;
        self.skip_misc()?;

        if !self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::InvalidToken, "content after root element"));
        }

        Ok(Document { root })
    }

    /// Skip whitespace, comments, processing instructions and doctype
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
            } else if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
            } else if self.cursor.starts_with(b"<!") {
                self.cursor.advance_by(2);
                self.skip_until(b">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_element(&mut self) -> Result<Element> {
        let limit_hit = self.config.max_depth != 0 && self.depth >= self.config.max_depth;
        let Some(depth) = self.depth.checked_add(1).filter(|_| !limit_hit) else {
            let max = match self.config.max_depth {
                0 => u16::MAX,
                max => max,
            };
            return Err(Error::at(
                ErrorKind::MaxDepthExceeded { max },
                self.cursor.position(),
            ));
        };
        self.depth = depth;
        let element = self.parse_element_inner();
        self.depth -= 1;
        element
    }

    fn parse_element_inner(&mut self) -> Result<Element> {
        self.expect_byte(b'<')?;
        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.consume(b'/') {
            self.expect_byte(b'>')?;
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }
        self.expect_byte(b'>')?;

        let mut children = Vec::new();
        loop {
            if self.cursor.starts_with(b"</") {
                let pos = self.cursor.position();
                self.cursor.advance_by(2);
                let close_name = self.parse_name()?;
                if close_name != name {
                    return Err(Error::at(
                        ErrorKind::MismatchedTag {
                            expected: name,
                            found: close_name,
                        },
                        pos,
                    ));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                break;
            }

            if self.cursor.starts_with(b"<![CDATA[") {
                self.cursor.advance_by(9);
                let text = self.take_until(b"]]>")?;
                push_text(&mut children, text);
                continue;
            }

            if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
                continue;
            }

            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
                continue;
            }

            if self.cursor.current() == Some(b'<') {
                let child = self.parse_element()?;
                children.push(Content::Element(child));
                continue;
            }

            if self.cursor.is_eof() {
                return Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated element"));
            }

            let text = self.parse_text()?;
            if !text.trim().is_empty() {
                push_text(&mut children, text);
            }
        }

        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) => {}
                None => return Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated tag")),
            }

            let pos = self.cursor.position();
            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(Error::at(ErrorKind::DuplicateAttribute { name }, pos));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => {
                return Err(
                    self.error_here(ErrorKind::InvalidToken, "expected quoted attribute value")
                )
            }
        };
        self.cursor.advance();

        let start = self.cursor.offset();
        let pos = self.cursor.position();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = bytes_to_string(raw, pos)?;
                return decode_entities(&text, pos);
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated attribute value"))
    }

    fn parse_text(&mut self) -> Result<String> {
        let start = self.cursor.offset();
        let pos = self.cursor.position();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let text = bytes_to_string(self.cursor.slice_from(start), pos)?;
        decode_entities(&text, pos)
    }

    fn parse_name(&mut self) -> Result<String> {
        let pos = self.cursor.position();
        let start = self.cursor.offset();

        match self.cursor.current() {
            Some(first) if is_name_start(first) => self.cursor.advance(),
            Some(_) => return Err(self.error_here(ErrorKind::InvalidToken, "expected name")),
            None => return Err(self.error_here(ErrorKind::UnexpectedEof, "expected name")),
        }

        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        bytes_to_string(self.cursor.slice_from(start), pos)
    }

    fn take_until(&mut self, pattern: &[u8]) -> Result<String> {
        let start = self.cursor.offset();
        let pos = self.cursor.position();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance_by(pattern.len());
                return bytes_to_string(raw, pos);
            }
            self.cursor.advance();
        }
        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated markup"))
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        self.take_until(pattern).map(drop)
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else if self.cursor.is_eof() {
            Err(self.error_here(ErrorKind::UnexpectedEof, "unexpected end of input"))
        } else {
            Err(self.error_here(
                ErrorKind::InvalidToken,
                &format!("expected '{}'", char::from(expected)),
            ))
        }
    }

    fn error_here(&self, kind: ErrorKind, message: &str) -> Error {
        Error::with_message(kind, Span::at(self.cursor.position()), message)
    }
}

/// Append text, merging with a preceding text run
fn push_text(children: &mut Vec<Content>, text: String) {
    match children.last_mut() {
        Some(Content::Text(last)) => last.push_str(&text),
        _ => children.push(Content::Text(text)),
    }
}

fn bytes_to_string(bytes: &[u8], pos: crate::error::Pos) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| Error::at(ErrorKind::InvalidUtf8, pos))
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str, pos: crate::error::Pos) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        let (head, tail) = rest.split_at(amp);
        result.push_str(head);

        let Some(end) = tail.find(';') else {
            return Err(Error::at(ErrorKind::InvalidEntity, pos));
        };
        let entity = tail.get(1..end).unwrap_or_default();
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(entity),
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => return Err(Error::at(ErrorKind::InvalidEntity, pos)),
        }
        rest = tail.get(end + 1..).unwrap_or_default();
    }
    result.push_str(rest);

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Document> {
        Parser::new(input.as_bytes()).parse()
    }

    #[test]
    fn test_parse_simple_element() -> Result<()> {
        let doc = parse("<root></root>")?;
        assert_eq!(doc.root.name, "root");
        assert!(doc.root.children.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_with_attributes() -> Result<()> {
        let doc = parse("<root id=\"1\" name='test'></root>")?;
        assert_eq!(doc.root.attributes.get("id").map(String::as_str), Some("1"));
        assert_eq!(doc.root.attributes.get("name").map(String::as_str), Some("test"));
        Ok(())
    }

    #[test]
    fn test_parse_nested_with_prolog() -> Result<()> {
        let doc = parse(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- saved -->\n<Ableton>\n  <LiveSet>text</LiveSet>\n</Ableton>\n",
        )?;
        let child = doc.root.child_elements().next();
        assert_eq!(child.map(|c| c.name.as_str()), Some("LiveSet"));
        assert_eq!(child.and_then(Element::text), Some("text"));
        assert_eq!(doc.root.text(), None);
        Ok(())
    }

    #[test]
    fn test_comments_between_children() -> Result<()> {
        let doc = parse("<a><!-- one --><b/><?pi data?><c/><!-- two --></a>")?;
        let names: Vec<&str> = doc.root.child_elements().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["b", "c"]);
        Ok(())
    }

    #[test]
    fn test_cdata_and_entities_become_text() -> Result<()> {
        let doc = parse("<a x=\"&lt;&#65;&#x42;\">1 &amp; <![CDATA[<2>]]></a>")?;
        assert_eq!(doc.root.attributes.get("x").map(String::as_str), Some("<AB"));
        assert_eq!(doc.root.text(), Some("1 & <2>"));
        Ok(())
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let err = parse("<a><b></a></b>").err();
        assert!(matches!(
            err.as_ref().map(Error::kind),
            Some(ErrorKind::MismatchedTag { expected, found }) if expected == "b" && found == "a"
        ));
    }

    #[test]
    fn test_duplicate_attribute() {
        let err = parse("<a x=\"1\" x=\"2\"/>").err();
        assert!(matches!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::DuplicateAttribute { name }) if name == "x"
        ));
    }

    #[test]
    fn test_unterminated_element() {
        let err = parse("<a><b/>").err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_unknown_entity() {
        let err = parse("<a>&nbsp;</a>").err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::InvalidEntity));
    }

    #[test]
    fn test_max_depth() {
        let input = "<a><a><a><a/></a></a></a>";
        let err = Parser::with_config(input.as_bytes(), Config::new(3))
            .parse()
            .err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::MaxDepthExceeded { max: 3 })
        );
        assert!(Parser::with_config(input.as_bytes(), Config::unlimited())
            .parse()
            .is_ok());
    }

    #[test]
    fn test_unlimited_depth_stops_at_counter_limit() {
        let mut parser = Parser::with_config(b"<a/>", Config::unlimited());
        parser.depth = u16::MAX;
        assert_eq!(
            parser.parse().err().map(|e| e.kind().clone()),
            Some(ErrorKind::MaxDepthExceeded { max: u16::MAX })
        );
    }

    #[test]
    fn test_trailing_content_rejected() {
        assert!(parse("<a/><b/>").is_err());
        assert!(parse("<a/>\n<!-- trailer -->\n").is_ok());
    }
}
