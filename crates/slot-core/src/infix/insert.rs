//! Character insertion.

use std::sync::Arc;

use tracing::trace;

use super::Infix;
use crate::bracket::BracketedGroup;
use crate::caret::CaretPos;
use crate::component::Component;
use crate::field::TextField;
use crate::literal::StringLiteral;
use crate::operator::Joint;
use crate::text;
use crate::transaction::ModificationToken;

impl Infix {
    /// Insert `text` at `pos` one character at a time and return the caret afterwards.
    ///
    /// A non-empty selection from `anchor` to `pos` is replaced, except when the text starts
    /// with an opening bracket or quote: then the selection is wrapped in the new compound.
    /// At the top level, text starting with one of the closing chars returns the
    /// escape-to-next sentinel without inserting anything.
    pub fn insert(
        &mut self,
        pos: &CaretPos,
        text: &str,
        anchor: Option<&CaretPos>,
        user: bool,
        token: &ModificationToken,
    ) -> CaretPos {
        let Some(first) = text.chars().next() else {
            return pos.clone();
        };
        if !self.nested && self.closing_chars.contains(&first) {
            return CaretPos::escape_next();
        }

        let mut pos = pos.clone();
        let mut anchor = anchor.filter(|a| **a != pos).cloned();
        if !self.grammar.is_opening_bracket(first) && !self.grammar.is_quote(first) {
            if let Some(a) = anchor.take() {
                pos = self.delete_selection(&a, &pos, token);
            }
        }

        for c in text.chars() {
            pos = self.insert_char(&pos, c, user, anchor.take().as_ref(), token);
            if pos.is_escape_next() {
                break;
            }
        }
        pos
    }

    /// Insert a single character at `pos`.
    ///
    /// `anchor` is the other end of a selection at this level, if any; it only matters for
    /// opening brackets and quotes, which wrap the selection.
    pub fn insert_char(
        &mut self,
        pos: &CaretPos,
        c: char,
        user: bool,
        anchor: Option<&CaretPos>,
        token: &ModificationToken,
    ) -> CaretPos {
        let index = pos.field_index();
        match &self.fields[index] {
            Component::Bracket(_) => {
                let sub = pos.sub_or_start();
                let sub_anchor = anchor
                    .filter(|a| a.slot() == Some(index))
                    .and_then(CaretPos::sub);
                let Some(group) = self.bracket_mut(index) else {
                    return pos.clone();
                };
                let result = group
                    .content_mut()
                    .insert_char(&sub, c, user, sub_anchor, token);
                if result.is_escape_next() {
                    CaretPos::new(index + 1, CaretPos::leaf(0))
                } else {
                    CaretPos::new(index, result)
                }
            }
            Component::Literal(_) => self.insert_into_literal(index, pos.leaf_offset(), c),
            Component::Field(_) => {
                self.insert_into_field(index, pos.leaf_offset(), c, user, anchor, token)
            }
        }
    }

    fn insert_into_literal(&mut self, index: usize, offset: usize, c: char) -> CaretPos {
        let literal = self.literal_mut(index);
        if literal.closes_at(c, offset) {
            if offset == literal.field().len() {
                return CaretPos::new(index + 1, CaretPos::leaf(0));
            }
            trace!(index, offset, "unescaped quote inside literal ignored");
            return CaretPos::new(index, CaretPos::leaf(offset));
        }
        text::insert_char_at(literal.field_mut().text_mut(), offset, c);
        CaretPos::new(index, CaretPos::leaf(offset + 1))
    }

    fn insert_into_field(
        &mut self,
        index: usize,
        offset: usize,
        c: char,
        user: bool,
        anchor: Option<&CaretPos>,
        token: &ModificationToken,
    ) -> CaretPos {
        let grammar = Arc::clone(&self.grammar);
        let here = CaretPos::new(index, CaretPos::leaf(offset));
        let current = self.field_text(index).to_string();
        let len = text::char_len(&current);
        let before = text::split_at_char(&current, offset).0;
        let prev_op = self.prev_op(index).to_string();
        let next_op = self.next_op(index).to_string();

        if grammar.is_disallowed(c) {
            trace!(?c, grammar = %grammar.name, "disallowed character ignored");
            return here;
        }
        if c.is_whitespace() && grammar.keyword_operator(before).is_none() {
            return here;
        }

        if offset == 0 && !prev_op.is_empty() && grammar.is_operator(&format!("{prev_op}{c}")) {
            if let Some(op) = self.joints[index - 1].operator_mut() {
                op.set(format!("{prev_op}{c}"), token);
            }
            return here;
        }
        if offset == len && !next_op.is_empty() && grammar.is_operator(&format!("{c}{next_op}")) {
            if let Some(op) = self.joints[index].operator_mut() {
                op.set(format!("{c}{next_op}"), token);
            }
            return here;
        }
        if c == ','
            && offset == len
            && next_op == ","
            && self
                .fields
                .get(index + 1)
                .is_some_and(|f| f.copy_text(None, None).is_empty())
        {
            return CaretPos::new(index + 1, CaretPos::leaf(0));
        }

        if grammar.begins_operator(c) && !matches!(c, '.' | '+' | '-') {
            let after = text::split_off_chars(self.field_mut(index).text_mut(), offset);
            self.add_joint(index, Joint::op(c.to_string()));
            self.add_field(index + 1, Component::Field(TextField::new(after)));
            return CaretPos::new(index + 1, CaretPos::leaf(0));
        }

        if let Some(anchor) = anchor {
            if grammar.is_opening_bracket(c) || grammar.is_quote(c) {
                return self.enclose_selection(anchor, &here, c, token);
            }
        }

        if grammar.is_opening_bracket(c) {
            let overtype = offset == len
                && matches!(self.fields.get(index + 1), Some(Component::Bracket(b)) if b.opening() == c);
            if overtype {
                return CaretPos::new(index + 1, CaretPos::new(0, CaretPos::leaf(0)));
            }
            let after = text::split_off_chars(self.field_mut(index).text_mut(), offset);
            self.add_joint(index, Joint::Boundary);
            let group = BracketedGroup::new(c, Arc::clone(&self.grammar));
            self.add_field(index + 1, Component::Bracket(group));
            self.pad_after_compound(index + 1, after);
            return CaretPos::new(index + 1, CaretPos::new(0, CaretPos::leaf(0)));
        }

        if grammar.is_closing_bracket(c) {
            if self.closing_chars.contains(&c) && offset == len {
                return CaretPos::escape_next();
            }
            trace!(?c, "closing bracket ignored");
            return here;
        }

        if grammar.is_quote(c) {
            let after = text::split_off_chars(self.field_mut(index).text_mut(), offset);
            self.add_joint(index, Joint::Boundary);
            self.add_field(index + 1, Component::Literal(StringLiteral::new(c)));
            self.pad_after_compound(index + 1, after);
            return CaretPos::new(index + 1, CaretPos::leaf(0));
        }

        if c.is_whitespace() {
            if let Some(keyword) = grammar.keyword_operator(before) {
                let after = text::split_off_chars(self.field_mut(index).text_mut(), offset);
                self.field_mut(index).text_mut().clear();
                self.add_joint(index, Joint::op(keyword));
                self.add_field(index + 1, Component::Field(TextField::new(after)));
                return CaretPos::new(index + 1, CaretPos::leaf(0));
            }
        }

        text::insert_char_at(self.field_mut(index).text_mut(), offset, c);
        self.check_field_change(
            index,
            CaretPos::new(index, CaretPos::leaf(offset + 1)),
            c == '.',
            user,
            token,
        )
    }

    /// Replace the text of the field at `pos` with a completion `name`.
    ///
    /// With `params`, the call's argument bracket (opened by `opening`) is reused when it
    /// directly follows the name, receiving `params.len() - 1` commas if it is empty, or created
    /// otherwise. Returns where the caret should go: the first argument, or just past the
    /// bracket when there are no parameters. Inside a string literal nothing happens.
    pub fn insert_suggestion(
        &mut self,
        pos: &CaretPos,
        name: &str,
        opening: char,
        params: Option<&[String]>,
        token: &ModificationToken,
    ) -> CaretPos {
        let index = pos.field_index();
        match &self.fields[index] {
            Component::Literal(_) => return pos.clone(),
            Component::Bracket(_) => {
                let sub = pos.sub_or_start();
                let Some(group) = self.bracket_mut(index) else {
                    return pos.clone();
                };
                let inner = group
                    .content_mut()
                    .insert_suggestion(&sub, name, opening, params, token);
                return CaretPos::new(index, inner);
            }
            Component::Field(_) => {}
        }

        self.field_mut(index).set_text("", token);
        let p = self.insert(&CaretPos::new(index, CaretPos::leaf(0)), name, None, false, token);
        let Some(params) = params else {
            return p;
        };
        if p.is_escape_next() {
            return p;
        }
        let commas = ",".repeat(params.len().saturating_sub(1));
        let at = p.field_index();

        let existing = matches!(
            self.fields.get(at + 1),
            Some(Component::Bracket(b)) if b.opening() == opening
        );
        if existing {
            if let Some(group) = self.bracket_mut(at + 1) {
                if group.content().is_empty() {
                    let start = group.content().start_pos();
                    group.content_mut().insert(&start, &commas, None, false, token);
                }
            }
        } else {
            let closing = self.grammar.closing_for(opening).unwrap_or(')');
            let call = format!("{opening}{commas}{closing}");
            self.insert(&p, &call, None, false, token);
        }
        trace!(name, params = params.len(), reused = existing, "suggestion inserted");

        if params.is_empty() {
            CaretPos::new(at + 2, self.fields[at + 2].start_pos())
        } else {
            CaretPos::new(at + 1, self.fields[at + 1].start_pos())
        }
    }

    /// After a compound was inserted at `compound`, make sure a plain field follows it:
    /// either a fresh padding field holding `after`, or `after` prepended to an existing one.
    fn pad_after_compound(&mut self, compound: usize, after: String) {
        let needs_padding = compound >= self.joints.len()
            || self.joints[compound].operator().is_some()
            || !matches!(self.fields.get(compound + 1), Some(Component::Field(_)));
        if needs_padding {
            self.add_joint(compound, Joint::Boundary);
            self.add_field(compound + 1, Component::Field(TextField::new(after)));
        } else {
            self.field_mut(compound + 1).text_mut().insert_str(0, &after);
        }
    }

    /// Wrap the selection between `anchor` and `pos` in a new bracket or literal opened by `c`.
    fn enclose_selection(
        &mut self,
        anchor: &CaretPos,
        pos: &CaretPos,
        c: char,
        token: &ModificationToken,
    ) -> CaretPos {
        let (start, end) = if anchor.before(pos) {
            (anchor, pos)
        } else {
            (pos, anchor)
        };
        let content = self.copy_text(Some(start), Some(end));
        let pos = self.delete_selection(anchor, pos, token);
        let pos = self.insert_char(&pos, c, false, None, token);
        self.insert(&pos, &content, None, false, token);
        trace!(%content, "selection enclosed");
        CaretPos::new(pos.field_index() + 1, CaretPos::leaf(0))
    }
}
