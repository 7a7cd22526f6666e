use super::Node;

/// What happened after feeding one more byte into the literal matcher?
pub(crate) enum Step {
    /// Byte matched, but the literal is not finished yet.
    NeedMore,
    /// Byte matched *and* it was the last byte of the literal.
    Done(Node),
    /// Byte did **not** match the expected one.
    Reject,
}

/// Matches the remainder of `true`, `false` or `null` after its first byte.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExpectedLiteral {
    rest: &'static [u8],
    node: Node,
}

impl ExpectedLiteral {
    /// Start matching after the first byte (`n`, `t`, or `f`).
    pub fn new(first: u8) -> Option<Self> {
        let (rest, node): (&'static [u8], _) = match first {
            b'n' => (b"ull", Node::Null),
            b't' => (b"rue", Node::True),
            b'f' => (b"alse", Node::False),
            _ => return None,
        };
        Some(Self { rest, node })
    }

    pub fn step(&mut self, b: u8) -> Step {
        match self.rest.split_first() {
            Some((&expected, rest)) if expected == b => {
                self.rest = rest;
                if rest.is_empty() {
                    Step::Done(self.node)
                } else {
                    Step::NeedMore
                }
            }
            _ => Step::Reject,
        }
    }
}
