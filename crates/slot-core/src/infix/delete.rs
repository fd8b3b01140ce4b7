//! Deletion: single characters, operators, compounds and selections.

use tracing::trace;

use super::{Infix, Projection};
use crate::caret::CaretPos;
use crate::component::Component;
use crate::operator::Joint;
use crate::text;
use crate::transaction::ModificationToken;

impl Infix {
    /// Delete the character before `pos` and return the caret afterwards.
    ///
    /// At the very start of a nested infix the owning bracket is flattened by the parent level.
    /// At the very start of the top level the escape-to-parent sentinel is returned and nothing
    /// changes.
    pub fn delete_previous(&mut self, pos: &CaretPos, token: &ModificationToken) -> CaretPos {
        let index = pos.field_index();
        if let Some(group) = self.bracket_mut(index) {
            let result = group.content_mut().delete_previous(&pos.sub_or_start(), token);
            if result.is_escape_parent() {
                return self.flatten_compound(index, false, token);
            }
            return CaretPos::new(index, result);
        }

        let offset = pos.leaf_offset();
        if offset > 0 {
            let pos = CaretPos::new(index, CaretPos::leaf(offset - 1));
            if let Component::Literal(l) = &mut self.fields[index] {
                text::remove_char_at(l.field_mut().text_mut(), offset - 1);
                return pos;
            }
            text::remove_char_at(self.field_mut(index).text_mut(), offset - 1);
            return self.check_field_change(index, pos, false, false, token);
        }

        if index == 0 {
            return CaretPos::escape_parent();
        }
        match &self.joints[index - 1] {
            Joint::Boundary => {
                let in_string = matches!(self.fields[index], Component::Literal(_));
                let compound = if in_string { index } else { index - 1 };
                self.flatten_compound(compound, !in_string, token)
            }
            Joint::Operator(op) => {
                let op = op.get().to_string();
                if text::char_len(&op) > 1 && op != "new " {
                    let mut chipped = op.clone();
                    chipped.pop();
                    trace!(%op, %chipped, "operator shortened");
                    if let Some(o) = self.joints[index - 1].operator_mut() {
                        o.set(chipped, token);
                    }
                    return self.check_field_change(index - 1, pos.clone(), false, false, token);
                }
                let remainder = if op == "new " { "new" } else { "" };
                self.remove_joint(index - 1);
                let current = self.remove_field(index);
                let current = current.as_field().map_or("", |f| f.text()).to_string();
                let prev = self.field_mut(index - 1).text_mut();
                let new_pos = text::char_len(prev) + remainder.len();
                prev.push_str(remainder);
                prev.push_str(&current);
                let pos = CaretPos::new(index - 1, CaretPos::leaf(new_pos));
                self.check_field_change(index - 1, pos, false, false, token)
            }
        }
    }

    /// Delete the character after `pos` and return the caret afterwards.
    ///
    /// Mirror image of [`Infix::delete_previous`]; at the very end of the top level the
    /// escape-to-parent sentinel is returned.
    pub fn delete_next(&mut self, pos: &CaretPos, token: &ModificationToken) -> CaretPos {
        let index = pos.field_index();
        if let Some(group) = self.bracket_mut(index) {
            let result = group.content_mut().delete_next(&pos.sub_or_start(), token);
            if result.is_escape_parent() {
                return self.flatten_compound(index, true, token);
            }
            return CaretPos::new(index, result);
        }

        let offset = pos.leaf_offset();
        if offset < self.fields[index].text_len() {
            if let Component::Literal(l) = &mut self.fields[index] {
                text::remove_char_at(l.field_mut().text_mut(), offset);
                return pos.clone();
            }
            text::remove_char_at(self.field_mut(index).text_mut(), offset);
            return self.check_field_change(index, pos.clone(), false, false, token);
        }

        if index + 1 == self.fields.len() {
            return CaretPos::escape_parent();
        }
        match &self.joints[index] {
            Joint::Boundary => {
                let in_string = matches!(self.fields[index], Component::Literal(_));
                let compound = if in_string { index } else { index + 1 };
                self.flatten_compound(compound, in_string, token)
            }
            Joint::Operator(op) => {
                let op = op.get().to_string();
                let rest: String = op.chars().skip(1).collect();
                if !rest.is_empty() && self.grammar.is_operator(&rest) {
                    trace!(%op, %rest, "operator shortened");
                    if let Some(o) = self.joints[index].operator_mut() {
                        o.set(rest, token);
                    }
                    return self.check_field_change(index, pos.clone(), false, false, token);
                }
                let remainder = if op == "new " { "ew" } else { "" };
                self.remove_joint(index);
                let next = self.remove_field(index + 1);
                let next = next.as_field().map_or("", |f| f.text()).to_string();
                let current = self.field_mut(index).text_mut();
                let old_len = text::char_len(current);
                current.push_str(remainder);
                current.push_str(&next);
                let pos = CaretPos::new(index, CaretPos::leaf(old_len));
                self.check_field_change(index, pos, false, false, token)
            }
        }
    }

    /// Remove the compound at `index` and its two boundaries, splicing its inner text and the
    /// text of the field after it into the field before it.
    ///
    /// Returns the caret at the end of the inner text if `at_end`, else at its start.
    pub(crate) fn flatten_compound(
        &mut self,
        index: usize,
        at_end: bool,
        token: &ModificationToken,
    ) -> CaretPos {
        let content = {
            let compound = &self.fields[index];
            compound.copy_text(Some(&compound.start_pos()), Some(&compound.end_pos()))
        };
        let after = self.fields[index + 1].copy_text(None, None);
        trace!(index, %content, "flattening compound");

        self.remove_field(index + 1);
        let joint = self.remove_joint(index);
        assert!(joint.is_boundary(), "compound must be followed by a boundary");
        self.remove_field(index);
        let joint = self.remove_joint(index - 1);
        assert!(joint.is_boundary(), "compound must be preceded by a boundary");

        let start = CaretPos::new(index - 1, CaretPos::leaf(self.fields[index - 1].text_len()));
        let start_offset = self.caret_to_string_pos(&start, Projection::Source);
        let mut mid = self.insert_chars(&start, &content, token);
        if mid.is_escape_next() {
            mid = start.clone();
        }
        let mid_offset = self.caret_to_string_pos(&mid, Projection::Source);
        self.insert_chars(&mid, &after, token);

        // Retyping may merge or split fields before the returned caret, but never changes the
        // source text in front of it, so re-resolve through the source offset.
        let (pos, offset) = if at_end { (mid, mid_offset) } else { (start, start_offset) };
        offset
            .and_then(|offset| self.string_pos_to_caret_pos(offset, Projection::Source))
            .unwrap_or(pos)
    }

    /// Delete everything between `a` and `b` (in either order) and return the caret where the
    /// selection started.
    ///
    /// # Panics
    ///
    /// Panics if the endpoints lie in different components and either one is not a plain field;
    /// see [`Infix::is_valid_selection`].
    pub fn delete_selection(
        &mut self,
        a: &CaretPos,
        b: &CaretPos,
        token: &ModificationToken,
    ) -> CaretPos {
        if a == b {
            return b.clone();
        }
        let (start, end) = if a.before(b) { (a, b) } else { (b, a) };
        let index = start.field_index();
        let end_index = end.field_index();

        if index == end_index {
            match &mut self.fields[index] {
                Component::Bracket(group) => {
                    let inner = group.content_mut().delete_selection(
                        &start.sub_or_start(),
                        &end.sub_or_start(),
                        token,
                    );
                    return CaretPos::new(index, inner);
                }
                Component::Literal(l) => {
                    let buf = l.field_mut().text_mut();
                    let tail = text::split_off_chars(buf, end.leaf_offset());
                    let cut = text::byte_offset(buf, start.leaf_offset());
                    buf.truncate(cut);
                    buf.push_str(&tail);
                    return start.clone();
                }
                Component::Field(_) => {}
            }
        }

        let tail = self
            .field_text(end_index)
            .chars()
            .skip(end.leaf_offset())
            .collect::<String>();
        let head = text::split_at_char(self.field_text(index), start.leaf_offset()).0;
        let joined = format!("{head}{tail}");
        self.field_mut(index).set_text(joined, token);
        for _ in index + 1..=end_index {
            self.remove_joint(index);
            self.remove_field(index + 1);
        }
        let start = CaretPos::new(index, CaretPos::leaf(start.leaf_offset()));
        self.check_field_change(index, start, false, false, token)
    }

    /// Returns `true` if the selection from `a` to `b` can be deleted or wrapped at this level:
    /// both endpoints inside the same component, or both in plain fields.
    pub fn is_valid_selection(&self, a: &CaretPos, b: &CaretPos) -> bool {
        let (Some(i), Some(j)) = (a.slot(), b.slot()) else {
            return false;
        };
        if i == j {
            return match self.fields.get(i) {
                Some(Component::Bracket(group)) => match (a.sub(), b.sub()) {
                    (Some(x), Some(y)) => group.content().is_valid_selection(x, y),
                    _ => false,
                },
                Some(_) => true,
                None => false,
            };
        }
        self.field(i).is_some() && self.field(j).is_some()
    }

    /// Type `content` at `pos` without selection handling, stopping at an escape.
    fn insert_chars(&mut self, pos: &CaretPos, content: &str, token: &ModificationToken) -> CaretPos {
        let mut pos = pos.clone();
        for c in content.chars() {
            let next = self.insert_char(&pos, c, false, None, token);
            if next.is_escape_next() {
                return next;
            }
            pos = next;
        }
        pos
    }
}
