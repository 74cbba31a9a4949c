//! Recursive-descent XML parser.
//!
//! Supports the subset of XML the document model represents: a prolog,
//! comments, a doctype, elements with single- or double-quoted
//! attributes, self-closing tags, character data, and the five
//! predefined entities. Whitespace-only runs between elements are not
//! materialized as text nodes.

use crate::error::XmlError;

use super::document::{Document, NodeId};

/// Parses markup text into a [`Document`].
pub(crate) fn parse(source: &str) -> Result<Document, XmlError> {
    Parser::new(source).parse_document()
}

/// Byte-offset cursor over the source text.
struct Parser<'a> {
    source: &'a str,
    pos: usize,
    doc: Document,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            doc: Document::new(),
        }
    }

    fn parse_document(mut self) -> Result<Document, XmlError> {
        self.skip_misc()?;

        if !self.rest().starts_with('<') {
            return Err(XmlError::new("expected root element", self.pos));
        }

        let root = self.parse_element(None)?;
        self.doc.set_root(root);

        self.skip_misc()?;
        if self.pos < self.source.len() {
            return Err(XmlError::new("content after root element", self.pos));
        }

        Ok(self.doc)
    }

    /// Parses one element, attaching it to `parent` when given.
    fn parse_element(&mut self, parent: Option<NodeId>) -> Result<NodeId, XmlError> {
        self.expect('<')?;
        let name = self.parse_name()?;

        let id = self.doc.create_element(name.as_str());
        if let Some(parent) = parent {
            self.doc.append_child(parent, id);
        }

        // Attributes until '>' or '/>'.
        loop {
            self.skip_whitespace();

            match self.peek() {
                Some('/') => {
                    self.advance();
                    self.expect('>')?;
                    return Ok(id);
                }
                Some('>') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    let (attr, value) = self.parse_attribute()?;
                    self.doc.set_attribute(id, attr, value);
                }
                None => return Err(XmlError::new("unexpected end of input in tag", self.pos)),
            }
        }

        // Content until the matching close tag.
        loop {
            if self.rest().starts_with("</") {
                self.pos += 2;
                let close = self.parse_name()?;
                if close != name {
                    return Err(XmlError::new(
                        format!("mismatched close tag </{close}> for <{name}>"),
                        self.pos,
                    ));
                }
                self.skip_whitespace();
                self.expect('>')?;
                return Ok(id);
            }

            if self.rest().starts_with("<!--") {
                self.skip_comment()?;
                continue;
            }

            match self.peek() {
                Some('<') => {
                    self.parse_element(Some(id))?;
                }
                Some(_) => {
                    let text = self.parse_text()?;
                    if !text.chars().all(char::is_whitespace) {
                        let node = self.doc.create_text(text);
                        self.doc.append_child(id, node);
                    }
                }
                None => {
                    return Err(XmlError::new(format!("unclosed element <{name}>"), self.pos));
                }
            }
        }
    }

    /// Parses character data up to the next `<`, decoding entities.
    fn parse_text(&mut self) -> Result<String, XmlError> {
        let mut out = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '<' => break,
                '&' => out.push(self.parse_entity()?),
                other => {
                    self.advance();
                    out.push(other);
                }
            }
        }

        Ok(out)
    }

    /// Parses one of the five predefined entities.
    fn parse_entity(&mut self) -> Result<char, XmlError> {
        let start = self.pos;
        self.expect('&')?;

        let Some(end) = self.rest().find(';') else {
            return Err(XmlError::new("unterminated entity", start));
        };

        let name = &self.source[self.pos..self.pos + end];
        let decoded = match name {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "apos" => '\'',
            "quot" => '"',
            _ => return Err(XmlError::new(format!("unknown entity &{name};"), start)),
        };

        self.pos += end + 1;
        Ok(decoded)
    }

    /// Parses `name="value"` or `name='value'`.
    fn parse_attribute(&mut self) -> Result<(String, String), XmlError> {
        let name = self.parse_name()?;

        self.skip_whitespace();
        self.expect('=')?;
        self.skip_whitespace();

        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(XmlError::new("expected quoted attribute value", self.pos)),
        };
        self.advance();

        let mut value = String::new();
        loop {
            match self.peek() {
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok((name, value));
                }
                Some('&') => value.push(self.parse_entity()?),
                Some(ch) => {
                    self.advance();
                    value.push(ch);
                }
                None => {
                    return Err(XmlError::new("unterminated attribute value", self.pos));
                }
            }
        }
    }

    /// Parses an element or attribute name.
    fn parse_name(&mut self) -> Result<String, XmlError> {
        let start = self.pos;

        match self.peek() {
            Some(ch) if ch.is_alphabetic() || ch == '_' || ch == ':' => self.advance(),
            _ => return Err(XmlError::new("expected a name", self.pos)),
        };

        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.' | ':') {
                self.advance();
            } else {
                break;
            }
        }

        Ok(self.source[start..self.pos].to_string())
    }

    /// Skips whitespace, the XML declaration, comments, and a doctype.
    fn skip_misc(&mut self) -> Result<(), XmlError> {
        loop {
            self.skip_whitespace();

            if self.rest().starts_with("<?") {
                let Some(end) = self.rest().find("?>") else {
                    return Err(XmlError::new("unterminated processing instruction", self.pos));
                };
                self.pos += end + 2;
            } else if self.rest().starts_with("<!--") {
                self.skip_comment()?;
            } else if self.rest().starts_with("<!DOCTYPE") {
                let Some(end) = self.rest().find('>') else {
                    return Err(XmlError::new("unterminated doctype", self.pos));
                };
                self.pos += end + 1;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), XmlError> {
        let Some(end) = self.rest().find("-->") else {
            return Err(XmlError::new("unterminated comment", self.pos));
        };
        self.pos += end + 3;
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), XmlError> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(XmlError::new(format!("expected '{expected}'"), self.pos))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_attributes() {
        let doc = parse(r#"<catalog><book id="bk101"><author>X</author></book></catalog>"#)
            .expect("well-formed");

        let root = doc.root().expect("root element");
        assert_eq!(doc.name(root), "catalog");

        let book = doc.children(root)[0];
        assert_eq!(doc.attribute(book, "id"), "bk101");
        assert_eq!(doc.attributes(book), [("id".to_string(), "bk101".to_string())]);
        assert_eq!(doc.parent(book), Some(root));
        assert_eq!(doc.parent(root), None);

        let author = doc.children(book)[0];
        assert_eq!(doc.text(author), "X");
    }

    #[test]
    fn skips_prolog_comments_and_whitespace_runs() {
        let doc = parse(
            "<?xml version=\"1.0\"?>\n<!-- catalog -->\n<a>\n  <b>1</b>\n  <b>2</b>\n</a>",
        )
        .expect("well-formed");

        let root = doc.root().expect("root element");
        // Whitespace between elements is not kept as text nodes.
        assert_eq!(doc.children(root).len(), 2);
        assert_eq!(doc.text(root), "12");
    }

    #[test]
    fn decodes_predefined_entities() {
        let doc = parse("<a note=\"&quot;q&quot;\">1 &lt; 2 &amp; 3 &gt; 2</a>").expect("entities");
        let root = doc.root().expect("root element");

        assert_eq!(doc.text(root), "1 < 2 & 3 > 2");
        assert_eq!(doc.attribute(root, "note"), "\"q\"");
    }

    #[test]
    fn self_closing_elements() {
        let doc = parse("<a><b flag='on'/><c /></a>").expect("well-formed");
        let root = doc.root().expect("root element");

        assert_eq!(doc.children(root).len(), 2);
        assert_eq!(doc.attribute(doc.children(root)[0], "flag"), "on");
    }

    #[test]
    fn rejects_mismatched_close_tag() {
        let err = parse("<a><b></a></b>").expect_err("mismatched");
        assert!(err.message.contains("mismatched"));
    }

    #[test]
    fn rejects_trailing_content() {
        assert!(parse("<a/><b/>").is_err());
    }

    #[test]
    fn rejects_truncated_input() {
        assert!(parse("<catalog><book id=").is_err());
        assert!(parse("").is_err());
    }
}
