use bytes::Bytes;

use super::{Document, Node};

/// Kinds of JSON nodes a [`Cursor`] can rest on.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum NodeType {
    Object,
    Array,
    String,
    /// An integer that fits `i64`.
    SignedInt,
    /// A positive integer above `i64::MAX` that fits `u64`.
    UnsignedInt,
    Double,
    True,
    False,
    Null,
}

/// Depth-first navigation over a [`Document`].
///
/// The cursor starts on the root value at depth 0. [`descend`](Self::descend)
/// enters the first child of a non-empty container, [`advance`](Self::advance)
/// moves between siblings and [`ascend`](Self::ascend) returns to the
/// enclosing container. Inside an object, keys and their values are
/// alternating siblings: key, value, key, value.
#[derive(Debug, Clone)]
pub struct Cursor<'doc> {
    doc: &'doc Document,
    pos: usize,
    parents: Vec<usize>,
}

impl<'doc> Cursor<'doc> {
    pub(crate) fn new(doc: &'doc Document) -> Self {
        Self {
            doc,
            pos: 0,
            parents: Vec::new(),
        }
    }

    fn current(&self) -> Node {
        self.doc.node(self.pos).unwrap_or(Node::Null)
    }

    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self.current() {
            Node::Object { .. } => NodeType::Object,
            Node::Array { .. } => NodeType::Array,
            Node::String { .. } => NodeType::String,
            Node::Int(_) => NodeType::SignedInt,
            Node::UInt(_) => NodeType::UnsignedInt,
            Node::Double(_) => NodeType::Double,
            Node::True => NodeType::True,
            Node::False => NodeType::False,
            Node::Null => NodeType::Null,
            Node::ObjectEnd | Node::ArrayEnd => unreachable!("cursor rests on a container end"),
        }
    }

    /// Nesting depth of the current node; the root is at depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    /// Enter the first child of the current container.
    ///
    /// Returns `false`, leaving the cursor where it is, for empty containers
    /// and for scalars.
    pub fn descend(&mut self) -> bool {
        match self.current() {
            Node::Object { end } | Node::Array { end } if end > self.pos + 1 => {
                self.parents.push(self.pos);
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// Return to the container entered by the matching [`descend`](Self::descend).
    pub fn ascend(&mut self) {
        debug_assert!(!self.parents.is_empty(), "ascend without descend");
        if let Some(parent) = self.parents.pop() {
            self.pos = parent;
        }
    }

    /// Move to the next sibling. Returns `false`, leaving the cursor where it
    /// is, after the last child of a container and at the root.
    pub fn advance(&mut self) -> bool {
        if self.parents.is_empty() {
            return false;
        }
        let next = match self.current() {
            Node::Object { end } | Node::Array { end } => end + 1,
            _ => self.pos + 1,
        };
        match self.doc.node(next) {
            Some(Node::ObjectEnd | Node::ArrayEnd) | None => false,
            Some(_) => {
                self.pos = next;
                true
            }
        }
    }

    /// The current string or key, borrowed from the document.
    #[must_use]
    pub fn string_view(&self) -> Option<&'doc str> {
        match self.current() {
            Node::String { start, end } => Some(self.doc.str_at(start, end)),
            _ => None,
        }
    }

    /// The current string or key as a shared handle on the document's string
    /// buffer. No bytes are copied.
    #[must_use]
    pub fn string_bytes(&self) -> Option<Bytes> {
        match self.current() {
            Node::String { start, end } => Some(self.doc.bytes_at(start, end)),
            _ => None,
        }
    }

    #[must_use]
    pub fn integer_value(&self) -> Option<i64> {
        match self.current() {
            Node::Int(n) => Some(n),
            Node::UInt(n) => i64::try_from(n).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn unsigned_value(&self) -> Option<u64> {
        match self.current() {
            Node::UInt(n) => Some(n),
            Node::Int(n) => u64::try_from(n).ok(),
            _ => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn double_value(&self) -> Option<f64> {
        match self.current() {
            Node::Double(n) => Some(n),
            Node::Int(n) => Some(n as f64),
            Node::UInt(n) => Some(n as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn bool_value(&self) -> Option<bool> {
        match self.current() {
            Node::True => Some(true),
            Node::False => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Parser;

    fn doc(json: &str) -> Document {
        Parser::default().parse(json.as_bytes()).unwrap()
    }

    #[test]
    fn walks_object_keys_and_values() {
        let doc = doc(r#"{"a":1,"b":[true,null],"c":"x"}"#);
        let mut c = doc.cursor();
        assert_eq!(c.node_type(), NodeType::Object);
        assert_eq!(c.depth(), 0);

        assert!(c.descend());
        assert_eq!(c.depth(), 1);
        assert_eq!(c.string_view(), Some("a"));
        assert!(c.advance());
        assert_eq!(c.integer_value(), Some(1));
        assert!(c.advance());
        assert_eq!(c.string_view(), Some("b"));
        assert!(c.advance());
        assert_eq!(c.node_type(), NodeType::Array);

        assert!(c.descend());
        assert_eq!(c.depth(), 2);
        assert_eq!(c.bool_value(), Some(true));
        assert!(c.advance());
        assert_eq!(c.node_type(), NodeType::Null);
        assert!(!c.advance());
        c.ascend();
        assert_eq!(c.node_type(), NodeType::Array);

        assert!(c.advance());
        assert_eq!(c.string_view(), Some("c"));
        assert!(c.advance());
        assert_eq!(c.string_bytes().as_deref(), Some(&b"x"[..]));
        assert!(!c.advance());
        c.ascend();
        assert_eq!(c.node_type(), NodeType::Object);
        assert_eq!(c.depth(), 0);
        assert!(!c.advance());
    }

    #[test]
    fn empty_containers_do_not_descend() {
        for json in ["{}", "[]", " [ ] "] {
            let doc = doc(json);
            let mut c = doc.cursor();
            assert!(!c.descend());
            assert_eq!(c.depth(), 0);
        }
    }

    #[test]
    fn advance_skips_whole_subtrees() {
        let doc = doc(r#"[[1,[2,3]],{"k":{}},4]"#);
        let mut c = doc.cursor();
        assert!(c.descend());
        assert!(c.advance());
        assert_eq!(c.node_type(), NodeType::Object);
        assert!(c.advance());
        assert_eq!(c.integer_value(), Some(4));
        assert!(!c.advance());
    }

    #[test]
    fn accessors_on_the_wrong_type_return_none() {
        let doc = doc("18446744073709551615");
        let c = doc.cursor();
        assert_eq!(c.node_type(), NodeType::UnsignedInt);
        assert_eq!(c.integer_value(), None);
        assert_eq!(c.unsigned_value(), Some(u64::MAX));
        assert_eq!(c.string_view(), None);
        assert_eq!(c.bool_value(), None);
    }
}
