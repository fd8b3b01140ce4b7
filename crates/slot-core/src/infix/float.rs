//! Floating-point literal reconciliation.
//!
//! `.`, `+` and `-` are typed straight into fields; afterwards the field is re-examined to
//! decide whether each of them belongs to a numeric literal (`1.5`, `2e-3`, `0x1p+4`) or should
//! become an operator of its own. Splits made earlier are merged back when the text around
//! them turns into a literal.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::trace;

use super::Infix;
use crate::caret::CaretPos;
use crate::component::Component;
use crate::field::TextField;
use crate::operator::Joint;
use crate::text;
use crate::transaction::ModificationToken;

const DIGITS: &str = "[0-9]([0-9_]*[0-9])?";
const HEX: &str = "[0-9A-Fa-f]([0-9A-Fa-f_]*[0-9A-Fa-f])?";

static PRECEDES_DOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\A\s*(?:[+-]?{DIGITS}|0x{HEX})\z")).expect("valid literal regex")
});

static PRECEDES_SIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\A\s*(?:0x{HEX}(?:\.(?:{HEX})?)?[pP]|[+-]?{DIGITS}(?:\.(?:{DIGITS})?)?[eE])\z"
    ))
    .expect("valid literal regex")
});

/// Text before a `.` that makes the dot part of a numeric literal.
pub(crate) fn precedes_dot(before: &str) -> bool {
    PRECEDES_DOT.is_match(before)
}

/// Text before a `+`/`-` that makes the sign an exponent sign.
pub(crate) fn precedes_sign(before: &str) -> bool {
    PRECEDES_SIGN.is_match(before)
}

/// Text after a leading `+`/`-` that makes it the sign of a literal.
pub(crate) fn succeeds_opening_sign(after: &str) -> bool {
    after.starts_with(|c: char| c.is_ascii_digit())
}

/// Shift `pos` after splitting field `index` at char `split`, where `consumed` chars became the
/// operator. Positions in later fields move one field to the right; a position inside the
/// operator lands at the start of the field after it.
fn shift_for_split(pos: CaretPos, index: usize, split: usize, consumed: usize) -> CaretPos {
    match pos.slot() {
        Some(p) if p > index => CaretPos::new(p + 1, pos.sub_or_start()),
        Some(p) if p == index => {
            let offset = pos.leaf_offset();
            if offset <= split {
                pos
            } else {
                CaretPos::new(index + 1, CaretPos::leaf(offset.saturating_sub(split + consumed)))
            }
        }
        _ => pos,
    }
}

/// Shift `pos` after field `index + 1` was merged into field `index` whose text was `prev_len`
/// chars long, joined by a one-char operator.
fn shift_for_merge(pos: CaretPos, index: usize, prev_len: usize) -> CaretPos {
    match pos.slot() {
        Some(p) if p > index + 1 => CaretPos::new(p - 1, pos.sub_or_start()),
        Some(p) if p == index + 1 => {
            CaretPos::new(index, CaretPos::leaf(pos.leaf_offset() + prev_len + 1))
        }
        _ => pos,
    }
}

impl Infix {
    /// Re-examine the plain field at `index` after its text changed, splitting out or merging
    /// back `.`, `..`, `+` and `-` operators. Returns `pos` adjusted to the new structure.
    pub(crate) fn check_field_change(
        &mut self,
        index: usize,
        pos: CaretPos,
        added_dot: bool,
        user: bool,
        token: &ModificationToken,
    ) -> CaretPos {
        if !matches!(self.fields.get(index), Some(Component::Field(_))) {
            return pos;
        }
        let grammar = Arc::clone(&self.grammar);
        let floats = grammar.supports_float_literals();
        let prev_op = self.prev_op(index).to_string();
        let prev_field = index.checked_sub(1).and_then(|i| self.field(i)).map(|f| f.text().to_string());
        let preceding_bracket = index > 0 && self.joints[index - 1].is_boundary();
        let bracket_before_prev_field =
            index > 1 && prev_field.is_some() && self.joints[index - 2].is_boundary();
        let mut pos = pos;

        let current = self.field_text(index).to_string();
        for (byte, _) in current.match_indices('.') {
            let before = &current[..byte];
            let after = &current[byte + 1..];
            let double = grammar.is_operator("..") && after.starts_with('.');
            if floats && precedes_dot(before) && !double {
                continue;
            }

            let split = text::char_len(before);
            let (op, rest) = if double { ("..", &after[1..]) } else { (".", after) };
            trace!(index, op, "dot split out of field");
            self.field_mut(index).set_text(before, token);
            self.add_joint(index, Joint::op(op));
            self.add_field(index + 1, Component::Field(TextField::new(rest)));
            if !double && user && added_dot {
                token.request_completion();
            }

            pos = shift_for_split(pos, index, split, op.len());
            pos = self.check_field_change(index, pos, false, false, token);
            return self.check_field_change(index + 1, pos, false, false, token);
        }

        if floats && precedes_dot(self.field_text(index)) && self.next_op(index) == "." {
            pos = self.merge_next(index, pos, token);
        }

        let current = self.field_text(index).to_string();
        for (byte, sign) in current.match_indices(['+', '-']) {
            let before = &current[..byte];
            let after = &current[byte + 1..];
            let at_beginning_and_unary = before.is_empty()
                && !preceding_bracket
                && (!prev_op.is_empty() || prev_field.as_deref().is_none_or(str::is_empty))
                && succeeds_opening_sign(after);
            let after_exponent = precedes_sign(before);
            if !at_beginning_and_unary && !after_exponent {
                let split = text::char_len(before);
                trace!(index, sign, "sign split out of field");
                self.field_mut(index).set_text(before, token);
                self.add_joint(index, Joint::op(sign));
                self.add_field(index + 1, Component::Field(TextField::new(after)));
                return shift_for_split(pos, index, split, 1);
            }
        }

        let next_op = self.next_op(index);
        if precedes_sign(self.field_text(index)) && (next_op == "+" || next_op == "-") {
            pos = self.merge_next(index, pos, token);
        }

        if (prev_op == "+" || prev_op == "-")
            && succeeds_opening_sign(self.field_text(index))
            && prev_field.as_deref() == Some("")
            && !bracket_before_prev_field
        {
            self.remove_joint(index - 1);
            self.remove_field(index - 1);
            self.field_mut(index - 1).text_mut().insert_str(0, &prev_op);
            pos = match pos.slot() {
                Some(p) if p == index => CaretPos::new(index - 1, CaretPos::leaf(pos.leaf_offset() + 1)),
                Some(p) if p > index => CaretPos::new(p - 1, pos.sub_or_start()),
                _ => pos,
            };
        }

        pos
    }

    /// Join field `index`, the one-char operator after it and field `index + 1`.
    fn merge_next(&mut self, index: usize, pos: CaretPos, token: &ModificationToken) -> CaretPos {
        let prev_len = text::char_len(self.field_text(index));
        let joined = format!(
            "{}{}{}",
            self.field_text(index),
            self.next_op(index),
            self.field_text(index + 1)
        );
        trace!(index, %joined, "operator merged back into literal");
        self.field_mut(index).set_text(joined, token);
        self.remove_joint(index);
        self.remove_field(index + 1);
        shift_for_merge(pos, index, prev_len)
    }
}
