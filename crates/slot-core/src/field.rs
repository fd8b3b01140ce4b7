//! Plain text fields.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use crate::text;
use crate::transaction::ModificationToken;

/// Atomic editable leaf; the only component that stores text directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    text: String,
    prompt: String,
}

impl TextField {
    /// Create a field holding `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prompt: String::new(),
        }
    }

    /// Field content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the content.
    pub fn set_text(&mut self, text: impl Into<String>, _token: &ModificationToken) {
        self.text = text.into();
    }

    pub(crate) fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        text::char_len(&self.text)
    }

    /// Returns `true` if the field holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Placeholder shown while the field is empty. Not part of the content.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Set the placeholder.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Returns `true` if the text is all ASCII digits (including the empty string).
    pub fn is_numeric_literal(&self) -> bool {
        self.text.chars().all(|c| c.is_ascii_digit())
    }

    /// Width of the text in terminal cells.
    pub fn width(&self) -> usize {
        self.text
            .chars()
            .map(|c| UnicodeWidthChar::width(c).unwrap_or(0))
            .sum()
    }

    /// Closest caret offset to `column` (in cells from the start of the field).
    ///
    /// Returns `(offset, distance)`; offset is clamped to `[0, len]` and ties go to the left.
    pub fn nearest(&self, column: usize) -> (usize, usize) {
        let mut best = (0, column);
        let mut x = 0;
        for (i, c) in self.text.chars().enumerate() {
            x += UnicodeWidthChar::width(c).unwrap_or(0);
            let distance = x.abs_diff(column);
            if distance < best.1 {
                best = (i + 1, distance);
            }
        }
        best
    }

    /// Offset of the end of the next word after `from`, or the end of the field.
    pub fn next_word_offset(&self, from: usize) -> usize {
        self.text
            .split_word_bound_indices()
            .filter(|(_, word)| word.chars().any(char::is_alphanumeric))
            .map(|(byte, word)| text::char_index(&self.text, byte + word.len()))
            .find(|&end| end > from)
            .unwrap_or_else(|| self.len())
    }

    /// Offset of the start of the word before `from`, or `0`.
    pub fn previous_word_offset(&self, from: usize) -> usize {
        self.text
            .split_word_bound_indices()
            .filter(|(_, word)| word.chars().any(char::is_alphanumeric))
            .map(|(byte, _)| text::char_index(&self.text, byte))
            .filter(|&start| start < from)
            .last()
            .unwrap_or(0)
    }

    /// Text between two offsets (`None` meaning the respective end).
    pub fn slice(&self, from: Option<usize>, to: Option<usize>) -> &str {
        text::slice_chars(&self.text, from.unwrap_or(0), to.unwrap_or_else(|| self.len()))
    }
}
