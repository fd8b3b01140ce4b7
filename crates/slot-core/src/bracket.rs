//! Bracket pairs wrapping a nested infix.

use std::sync::Arc;

use slot_core_lang::GrammarProfile;

use crate::infix::Infix;

/// An opening/closing bracket pair that exclusively owns a nested [`Infix`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketedGroup {
    opening: char,
    closing: char,
    content: Infix,
}

impl BracketedGroup {
    /// An empty group opened by `opening`.
    ///
    /// # Panics
    ///
    /// Panics if `opening` is not an opening bracket of `grammar`.
    pub fn new(opening: char, grammar: Arc<GrammarProfile>) -> Self {
        let closing = grammar
            .closing_for(opening)
            .unwrap_or_else(|| panic!("{opening:?} is not an opening bracket"));
        Self {
            opening,
            closing,
            content: Infix::nested(grammar, closing),
        }
    }

    /// Opening character.
    pub fn opening(&self) -> char {
        self.opening
    }

    /// Closing character.
    pub fn closing(&self) -> char {
        self.closing
    }

    /// Nested content.
    pub fn content(&self) -> &Infix {
        &self.content
    }

    pub(crate) fn content_mut(&mut self) -> &mut Infix {
        &mut self.content
    }
}
