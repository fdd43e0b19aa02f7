//! The single-pass scan over the token stream and the binding tree.
//!
//! Two pieces of position state advance together and do not depend on each
//! other: `cur` is the semantic position in the binding tree, and `stack`
//! records the containers actually opened in the input. While skipping,
//! only the stack and `skip_depth` move; `cur` stays anchored on the
//! container holding the skipped value.

use crate::{
    DecodeError, Error, Lexer, Nested, Source, StructureKind, Token, TokenPattern,
    structure::StructureStack,
    tree::{BindingTree, NodeId},
};

pub(crate) struct Scanner<'t, 'cb, 'l, S> {
    tree: &'t mut BindingTree<'cb, S>,
    lexer: &'l mut Lexer<S>,
    stack: StructureStack,
    cur: NodeId,
    skipping: bool,
    skip_depth: usize,
}

impl<'t, 'cb, 'l, S: Source> Scanner<'t, 'cb, 'l, S> {
    pub fn new(tree: &'t mut BindingTree<'cb, S>, lexer: &'l mut Lexer<S>) -> Self {
        Self {
            tree,
            lexer,
            stack: StructureStack::default(),
            cur: NodeId::ROOT,
            skipping: false,
            skip_depth: 0,
        }
    }

    pub fn scan(mut self) -> Result<(), Error> {
        #[cfg(any(test, feature = "fuzzing"))]
        let start_depth = self.lexer.depth();

        loop {
            let opened = self.process_value()?;
            // An empty container closes right away.
            let closing = !opened || self.lexer.peek()?.is(TokenPattern::END);
            if closing && self.close()? {
                #[cfg(any(test, feature = "fuzzing"))]
                assert_eq!(
                    self.lexer.depth(),
                    start_depth,
                    "Internal error: scan did not return to its starting depth"
                );
                return Ok(());
            }
            self.process_key()?;
        }
    }

    /// Decides what the value at the cursor is. Returns `true` if it opened
    /// a container.
    fn process_value(&mut self) -> Result<bool, Error> {
        if self.skipping {
            let token = self.lexer.expect(TokenPattern::VALUE)?;
            if let Some(kind) = StructureKind::opened_by(token) {
                self.stack.push(kind);
                self.skip_depth += 1;
                return Ok(true);
            }
            if self.skip_depth == 0 {
                self.end_skip();
            }
            return Ok(false);
        }

        match self.tree.kind(self.cur) {
            StructureKind::Callback => {
                self.invoke()?;
                // Leaves always hang off a container.
                if let Some(parent) = self.tree.parent(self.cur) {
                    self.cur = parent;
                }
                Ok(false)
            }
            StructureKind::Array => self.open(Token::BeginArray, StructureKind::Array),
            StructureKind::Object => self.open(Token::BeginObject, StructureKind::Object),
            StructureKind::Incomplete => {
                // Opens as whichever container the input holds; siblings
                // sharing this node may differ.
                let token = self.lexer.expect_peek(TokenPattern::BEGIN)?;
                let kind = match token {
                    Token::BeginArray => StructureKind::Array,
                    _ => StructureKind::Object,
                };
                tracing::trace!(%kind, "opening wildcard node");
                self.open(token, kind)
            }
        }
    }

    fn open(&mut self, opener: Token, kind: StructureKind) -> Result<bool, Error> {
        self.lexer.expect(opener.pattern())?;
        self.stack.push(kind);
        self.tree.begin(self.cur);
        Ok(true)
    }

    fn invoke(&mut self) -> Result<(), Error> {
        let at = self
            .tree
            .parent(self.cur)
            .and_then(|parent| self.tree.last_dispatched(parent));
        tracing::trace!(?at, "invoking binding");

        let before = self.lexer.tokens_consumed();
        if let Some(callback) = self.tree.callback_mut(self.cur) {
            callback(&mut Nested::new(self.lexer, at))?;
        }
        if self.lexer.tokens_consumed() == before {
            self.lexer.skip_value()?;
        }
        Ok(())
    }

    /// Positions `cur` for the next member of the container on top of the
    /// stack.
    fn process_key(&mut self) -> Result<(), Error> {
        match self.stack.top() {
            Some(StructureKind::Array) => {
                if self.skipping {
                    return Ok(());
                }
                let (index, child) = self.tree.next_index(self.cur);
                match child {
                    Some(child) => self.cur = child,
                    None => {
                        tracing::trace!(index, "skipping element");
                        self.begin_skip();
                    }
                }
            }
            Some(StructureKind::Object) => {
                self.lexer.expect(TokenPattern::STRING)?;
                if !self.skipping {
                    match self.tree.key_child(self.cur, self.lexer.string()) {
                        Some(child) => self.cur = child,
                        None => {
                            tracing::trace!(key = self.lexer.string(), "skipping member");
                            self.begin_skip();
                        }
                    }
                }
                self.lexer.expect(TokenPattern::NAME_DELIMITER)?;
            }
            _ => unreachable!("process_key runs only inside an open container"),
        }
        Ok(())
    }

    /// Consumes closers until an element delimiter or the end of the scanned
    /// object. Returns `true` once the object is closed.
    fn close(&mut self) -> Result<bool, Error> {
        loop {
            let token = self
                .lexer
                .expect(TokenPattern::END | TokenPattern::ELEMENT_DELIMITER)?;
            if token == Token::ElementDelimiter {
                return Ok(false);
            }
            self.stack
                .pop_closer(token)
                .map_err(|source| self.positioned(source))?;
            if self.stack.is_empty() {
                return Ok(true);
            }
            if self.skipping {
                self.skip_depth -= 1;
                if self.skip_depth == 0 {
                    self.end_skip();
                }
            } else if let Some(parent) = self.tree.parent(self.cur) {
                self.cur = parent;
            }
        }
    }

    fn begin_skip(&mut self) {
        self.skipping = true;
        self.skip_depth = 0;
        self.lexer.set_discarding(true);
    }

    fn end_skip(&mut self) {
        tracing::trace!("skip finished");
        self.skipping = false;
        self.lexer.set_discarding(false);
    }

    fn positioned(&self, source: crate::ErrorSource) -> DecodeError {
        self.lexer.error_at_token(source)
    }
}
