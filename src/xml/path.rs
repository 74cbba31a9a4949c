//! Path expressions over a [`Document`].
//!
//! The supported grammar covers the child (`/`) and descendant (`//`)
//! axes, element name tests, the `*` wildcard, and attribute-equality
//! predicates:
//!
//! ```text
//! expression := ('/' | '//')? step (('/' | '//') step)*
//! step       := (name | '*') predicate?
//! predicate  := '[@' name '=' '\'' value '\'' ']'
//! ```
//!
//! Examples: `//catalog/book/author`, `//book[@id='bk101']`, `/a/*/c`.
//!
//! Matches are produced in document (preorder) order. An expression
//! with no leading axis is evaluated like a child step from the
//! document root.

use std::collections::{HashMap, HashSet};

use crate::error::PathError;

use super::document::{Document, NodeId};

/// Which relation a step walks from its context nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    /// Direct element children (`/`).
    Child,
    /// Element descendants at any depth (`//`).
    Descendant,
}

/// Element name test of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Name(String),
    Any,
}

/// Attribute filter of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    AttributeEquals { name: String, value: String },
}

/// One parsed location step.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NameTest,
    predicate: Option<Predicate>,
}

/// Evaluates `expression` and returns all matching nodes in document
/// order.
///
/// Zero matches yields an empty vector.
///
/// # Errors
///
/// Returns a [`PathError`] if the expression is malformed.
pub fn query(doc: &Document, expression: &str) -> Result<Vec<NodeId>, PathError> {
    let steps = parse_expression(expression)?;

    // Preorder rank of every element. Walking contexts one by one can
    // interleave nested subtrees, so each step's matches are re-sorted
    // by rank to restore document order.
    let rank: HashMap<NodeId, usize> = doc
        .elements()
        .into_iter()
        .enumerate()
        .map(|(index, id)| (id, index))
        .collect();

    let mut current: Vec<NodeId> = Vec::new();
    let mut seen: HashSet<NodeId> = HashSet::new();

    for (index, step) in steps.iter().enumerate() {
        let mut next = Vec::new();
        seen.clear();

        let candidate_sets: Vec<Vec<NodeId>> = if index == 0 {
            // The first step walks from the document itself.
            match step.axis {
                Axis::Child => vec![doc.root().into_iter().collect()],
                Axis::Descendant => vec![doc.elements()],
            }
        } else {
            current
                .iter()
                .map(|&context| match step.axis {
                    Axis::Child => doc
                        .children(context)
                        .iter()
                        .copied()
                        .filter(|&child| doc.is_element(child))
                        .collect(),
                    Axis::Descendant => doc.element_descendants(context),
                })
                .collect()
        };

        for candidates in candidate_sets {
            for candidate in candidates {
                if matches(doc, candidate, step) && seen.insert(candidate) {
                    next.push(candidate);
                }
            }
        }

        next.sort_by_key(|id| rank[id]);

        current = next;
        if current.is_empty() {
            break;
        }
    }

    Ok(current)
}

/// Evaluates `expression` and returns the first matching node in
/// document order, or `None`.
///
/// # Errors
///
/// Returns a [`PathError`] if the expression is malformed.
pub fn query_single(doc: &Document, expression: &str) -> Result<Option<NodeId>, PathError> {
    Ok(query(doc, expression)?.into_iter().next())
}

/// Whether `id` passes a step's name test and predicate.
fn matches(doc: &Document, id: NodeId, step: &Step) -> bool {
    let name_ok = match &step.test {
        NameTest::Any => true,
        NameTest::Name(name) => doc.name(id) == name,
    };

    if !name_ok {
        return false;
    }

    match &step.predicate {
        None => true,
        Some(Predicate::AttributeEquals { name, value }) => doc.attribute(id, name) == value,
    }
}

/// Parses an expression into location steps.
fn parse_expression(expression: &str) -> Result<Vec<Step>, PathError> {
    let mut cursor = Cursor::new(expression);
    let mut steps = Vec::new();

    // A leading axis is optional; a bare name is a child step.
    let mut axis = cursor.take_axis().unwrap_or(Axis::Child);

    loop {
        let test = cursor.take_name_test()?;
        let predicate = cursor.take_predicate()?;

        steps.push(Step {
            axis,
            test,
            predicate,
        });

        if cursor.at_end() {
            return Ok(steps);
        }

        axis = match cursor.take_axis() {
            Some(axis) => axis,
            None => {
                return Err(PathError::new("expected '/' between steps", cursor.pos));
            }
        };
    }
}

/// Byte-offset cursor over the expression text.
struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn take_axis(&mut self) -> Option<Axis> {
        if self.rest().starts_with("//") {
            self.pos += 2;
            Some(Axis::Descendant)
        } else if self.rest().starts_with('/') {
            self.pos += 1;
            Some(Axis::Child)
        } else {
            None
        }
    }

    fn take_name_test(&mut self) -> Result<NameTest, PathError> {
        if self.rest().starts_with('*') {
            self.pos += 1;
            return Ok(NameTest::Any);
        }

        let name = self.take_name()?;
        Ok(NameTest::Name(name))
    }

    fn take_name(&mut self) -> Result<String, PathError> {
        let start = self.pos;

        for ch in self.rest().chars() {
            if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.' | ':') {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(PathError::new("expected a name", self.pos));
        }

        Ok(self.source[start..self.pos].to_string())
    }

    fn take_predicate(&mut self) -> Result<Option<Predicate>, PathError> {
        if !self.rest().starts_with('[') {
            return Ok(None);
        }
        self.pos += 1;

        if !self.rest().starts_with('@') {
            return Err(PathError::new("expected '@' in predicate", self.pos));
        }
        self.pos += 1;

        let name = self.take_name()?;

        if !self.rest().starts_with('=') {
            return Err(PathError::new("expected '=' in predicate", self.pos));
        }
        self.pos += 1;

        if !self.rest().starts_with('\'') {
            return Err(PathError::new("expected quoted predicate value", self.pos));
        }
        self.pos += 1;

        let Some(end) = self.rest().find('\'') else {
            return Err(PathError::new("unterminated predicate value", self.pos));
        };
        let value = self.source[self.pos..self.pos + end].to_string();
        self.pos += end + 1;

        if !self.rest().starts_with(']') {
            return Err(PathError::new("expected ']' after predicate", self.pos));
        }
        self.pos += 1;

        Ok(Some(Predicate::AttributeEquals { name, value }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Document {
        Document::parse(concat!(
            "<catalog>",
            "<book id=\"bk101\"><author>X</author><title>T1</title></book>",
            "<book id=\"bk102\"><author>Y</author><title>T2</title></book>",
            "<magazine><author>Z</author></magazine>",
            "</catalog>",
        ))
        .expect("well-formed")
    }

    #[test]
    fn descendant_axis_finds_all_matches_in_document_order() {
        let doc = catalog();
        let authors = query(&doc, "//author").expect("valid expression");

        let texts: Vec<String> = authors.iter().map(|&id| doc.text(id)).collect();
        assert_eq!(texts, ["X", "Y", "Z"]);
    }

    #[test]
    fn child_axis_only_walks_direct_children() {
        let doc = catalog();

        let books = query(&doc, "//catalog/book").expect("valid expression");
        assert_eq!(books.len(), 2);

        // author is not a direct child of catalog
        assert!(query(&doc, "/catalog/author").expect("valid").is_empty());
    }

    #[test]
    fn attribute_predicate_selects_one_book() {
        let doc = catalog();
        let author = query_single(&doc, "//catalog/book[@id='bk101']/author")
            .expect("valid expression")
            .expect("one match");

        assert_eq!(doc.text(author), "X");
    }

    #[test]
    fn wildcard_matches_any_element_name() {
        let doc = catalog();
        let all = query(&doc, "/catalog/*").expect("valid expression");

        assert_eq!(all.len(), 3);
        assert_eq!(doc.name(all[2]), "magazine");
    }

    #[test]
    fn nested_contexts_keep_matches_in_document_order() {
        let doc = Document::parse("<a><a><x n='inner'/></a><x n='outer'/></a>")
            .expect("well-formed");

        // The outer <a> is visited as a context before the inner one,
        // but its <x> child comes later in the document.
        let matches = query(&doc, "//a/x").expect("valid expression");
        let names: Vec<&str> = matches.iter().map(|&id| doc.attribute(id, "n")).collect();
        assert_eq!(names, ["inner", "outer"]);

        let first = query_single(&doc, "//a/x").expect("valid").expect("match");
        assert_eq!(doc.attribute(first, "n"), "inner");
    }

    #[test]
    fn zero_matches_is_an_empty_list_not_an_error() {
        let doc = catalog();
        assert!(query(&doc, "//paper").expect("valid").is_empty());
        assert_eq!(query_single(&doc, "//paper").expect("valid"), None);
    }

    #[test]
    fn relative_expression_starts_at_the_root() {
        let doc = catalog();
        let root = query_single(&doc, "catalog").expect("valid").expect("root");
        assert_eq!(doc.name(root), "catalog");
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        let doc = catalog();
        assert!(query(&doc, "//book[id='x']").is_err());
        assert!(query(&doc, "//book[@id=bk101]").is_err());
        assert!(query(&doc, "///author").is_err());
        assert!(query(&doc, "//").is_err());
    }

    #[test]
    fn empty_document_matches_nothing() {
        let doc = Document::new();
        assert!(query(&doc, "//anything").expect("valid").is_empty());
    }
}
