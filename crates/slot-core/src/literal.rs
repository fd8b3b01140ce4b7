//! String and character literals.

use crate::field::TextField;

/// Whether the next character would be escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeStatus {
    /// The next character is taken literally.
    Normal,
    /// The previous character was an unescaped backslash.
    AfterBackslash,
}

impl EscapeStatus {
    /// Escape status after scanning `prefix`.
    pub fn of(prefix: &str) -> Self {
        prefix.chars().fold(Self::Normal, |status, c| match (status, c) {
            (Self::Normal, '\\') => Self::AfterBackslash,
            _ => Self::Normal,
        })
    }
}

/// A text field wrapped in quote delimiters.
///
/// Literals never contain structure: everything typed inside, including operator and
/// bracket characters, is kept as raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    quote: char,
    field: TextField,
}

impl StringLiteral {
    /// An empty literal delimited by `quote`.
    pub fn new(quote: char) -> Self {
        Self::with_text(quote, "")
    }

    /// A literal delimited by `quote` holding `text`.
    pub fn with_text(quote: char, text: impl Into<String>) -> Self {
        Self {
            quote,
            field: TextField::new(text),
        }
    }

    /// Delimiter character.
    pub fn quote(&self) -> char {
        self.quote
    }

    /// Text between the quotes.
    pub fn text(&self) -> &str {
        self.field.text()
    }

    /// Wrapped field.
    pub fn field(&self) -> &TextField {
        &self.field
    }

    pub(crate) fn field_mut(&mut self) -> &mut TextField {
        &mut self.field
    }

    /// Returns `true` if typing `c` at `offset` should close the literal instead of inserting.
    pub fn closes_at(&self, c: char, offset: usize) -> bool {
        c == self.quote && EscapeStatus::of(self.field.slice(None, Some(offset))) == EscapeStatus::Normal
    }

    /// Source text including the delimiters.
    pub fn quoted(&self) -> String {
        format!("{q}{}{q}", self.field.text(), q = self.quote)
    }
}
