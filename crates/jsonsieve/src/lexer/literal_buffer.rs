/// The keyword literals a value can start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedLiteralValue {
    Null,
    True,
    False,
}

/// What happened after feeding one more byte into the literal matcher?
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// Byte matched, but the literal is not finished yet.
    NeedMore,
    /// Byte matched *and* it was the last byte of the literal.
    Done(ExpectedLiteralValue),
    /// Byte did **not** match the expected byte.
    Reject,
}

/// `None`  ➜  we are **not** in the middle of a literal
/// `Some`  ➜  `(remaining_bytes, literal)` while matching
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpectedLiteralBuffer(Option<(&'static [u8], ExpectedLiteralValue)>);

impl ExpectedLiteralBuffer {
    /// Start matching after the *first* byte (`n`, `t`, or `f`)
    pub fn new(first: u8) -> Self {
        match first {
            b'n' => ExpectedLiteralBuffer(Some((b"ull", ExpectedLiteralValue::Null))),
            b't' => ExpectedLiteralBuffer(Some((b"rue", ExpectedLiteralValue::True))),
            b'f' => ExpectedLiteralBuffer(Some((b"alse", ExpectedLiteralValue::False))),
            _ => ExpectedLiteralBuffer(None),
        }
    }

    pub fn step(&mut self, b: u8) -> Step {
        let Some((bytes, kind)) = self.0.take() else {
            return Step::Reject;
        };

        match bytes.split_first() {
            Some((expected, rest)) if *expected == b => {
                if rest.is_empty() {
                    Step::Done(kind)
                } else {
                    self.0 = Some((rest, kind));
                    Step::NeedMore
                }
            }
            _ => {
                self.0 = Some((bytes, kind));
                Step::Reject
            }
        }
    }
}
