//! Caret movement and selection extension.
//!
//! Movement functions are pure: they take a caret and return the new one, leaving the tree
//! untouched. Leaving the top level returns a sentinel ([`CaretPos::escape_parent`] to the left,
//! [`CaretPos::escape_next`] to the right) which the [`Slot`](crate::Slot) turns into a focus
//! request.
//!
//! Selections never span levels: the anchor and the caret always address fields of the same
//! infix, and they never cross into a bracket or out of a string literal.

use super::Infix;
use crate::caret::CaretPos;
use crate::component::Component;
use crate::field::TextField;

/// Result of extending a selection: both ends at the level the selection lives on, expressed
/// as full paths from this infix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMove {
    /// Fixed end.
    pub anchor: CaretPos,
    /// Moving end.
    pub caret: CaretPos,
}

impl Infix {
    /// One character left, entering compounds at their end.
    pub fn move_left(&self, pos: &CaretPos) -> CaretPos {
        let index = pos.field_index();
        if let Component::Bracket(group) = &self.fields[index] {
            let inner = group.content().move_left(&pos.sub_or_start());
            if !inner.is_escape_parent() {
                return CaretPos::new(index, inner);
            }
        } else if pos.leaf_offset() > 0 {
            return CaretPos::new(index, CaretPos::leaf(pos.leaf_offset() - 1));
        }
        match index.checked_sub(1) {
            Some(prev) => CaretPos::new(prev, self.fields[prev].end_pos()),
            None => CaretPos::escape_parent(),
        }
    }

    /// One character right, entering compounds at their start.
    pub fn move_right(&self, pos: &CaretPos) -> CaretPos {
        let index = pos.field_index();
        if let Component::Bracket(group) = &self.fields[index] {
            let inner = group.content().move_right(&pos.sub_or_start());
            if !inner.is_escape_next() {
                return CaretPos::new(index, inner);
            }
        } else if pos.leaf_offset() < self.fields[index].text_len() {
            return CaretPos::new(index, CaretPos::leaf(pos.leaf_offset() + 1));
        }
        if index + 1 < self.fields.len() {
            CaretPos::new(index + 1, self.fields[index + 1].start_pos())
        } else {
            CaretPos::escape_next()
        }
    }

    /// Start of the innermost infix containing `pos`.
    pub fn home(&self, pos: &CaretPos) -> CaretPos {
        let index = pos.field_index();
        match &self.fields[index] {
            Component::Bracket(group) => CaretPos::new(index, group.content().home(&pos.sub_or_start())),
            _ => self.start_pos(),
        }
    }

    /// End of the innermost infix containing `pos`.
    pub fn end(&self, pos: &CaretPos) -> CaretPos {
        let index = pos.field_index();
        match &self.fields[index] {
            Component::Bracket(group) => CaretPos::new(index, group.content().end(&pos.sub_or_start())),
            _ => self.end_pos(),
        }
    }

    /// End of the next word inside the current leaf, or one step right at its end.
    pub fn next_word(&self, pos: &CaretPos) -> CaretPos {
        let index = pos.field_index();
        let offset = pos.leaf_offset();
        match &self.fields[index] {
            Component::Bracket(group) => {
                let inner = group.content().next_word(&pos.sub_or_start());
                if inner.is_escape_next() {
                    self.move_right(&CaretPos::new(index, group.content().end_pos()))
                } else {
                    CaretPos::new(index, inner)
                }
            }
            Component::Field(f) if offset < f.len() => {
                CaretPos::new(index, CaretPos::leaf(f.next_word_offset(offset)))
            }
            Component::Literal(l) if offset < l.field().len() => {
                CaretPos::new(index, CaretPos::leaf(l.field().next_word_offset(offset)))
            }
            _ => self.move_right(pos),
        }
    }

    /// Start of the previous word inside the current leaf, or one step left at its start.
    pub fn previous_word(&self, pos: &CaretPos) -> CaretPos {
        let index = pos.field_index();
        let offset = pos.leaf_offset();
        match &self.fields[index] {
            Component::Bracket(group) => {
                let inner = group.content().previous_word(&pos.sub_or_start());
                if inner.is_escape_parent() {
                    self.move_left(&CaretPos::new(index, group.content().start_pos()))
                } else {
                    CaretPos::new(index, inner)
                }
            }
            Component::Field(f) if offset > 0 => {
                CaretPos::new(index, CaretPos::leaf(f.previous_word_offset(offset)))
            }
            Component::Literal(l) if offset > 0 => {
                CaretPos::new(index, CaretPos::leaf(l.field().previous_word_offset(offset)))
            }
            _ => self.move_left(pos),
        }
    }

    /// Extend the selection one character left. Returns `None` if it cannot grow.
    pub fn select_left(&self, pos: &CaretPos, anchor: Option<&CaretPos>) -> Option<SelectionMove> {
        self.select_at_level(pos, anchor, &|infix, pos, _| {
            let index = pos.field_index();
            let offset = pos.leaf_offset();
            if offset > 0 {
                return Some(CaretPos::new(index, CaretPos::leaf(offset - 1)));
            }
            infix.select_backward_from(index)
        })
    }

    /// Extend the selection one character right. Returns `None` if it cannot grow.
    pub fn select_right(&self, pos: &CaretPos, anchor: Option<&CaretPos>) -> Option<SelectionMove> {
        self.select_at_level(pos, anchor, &|infix, pos, _| {
            let index = pos.field_index();
            let offset = pos.leaf_offset();
            if offset < infix.fields[index].text_len() {
                return Some(CaretPos::new(index, CaretPos::leaf(offset + 1)));
            }
            infix.select_forward_from(index)
        })
    }

    /// Extend the selection to the end of the next word.
    pub fn select_next_word(&self, pos: &CaretPos, anchor: Option<&CaretPos>) -> Option<SelectionMove> {
        self.select_at_level(pos, anchor, &|infix, pos, _| {
            let index = pos.field_index();
            let offset = pos.leaf_offset();
            let field = match &infix.fields[index] {
                Component::Field(f) => f,
                Component::Literal(l) => l.field(),
                Component::Bracket(_) => return None,
            };
            if offset < field.len() {
                return Some(CaretPos::new(index, CaretPos::leaf(field.next_word_offset(offset))));
            }
            infix.select_forward_from(index)
        })
    }

    /// Extend the selection to the start of the previous word.
    pub fn select_previous_word(
        &self,
        pos: &CaretPos,
        anchor: Option<&CaretPos>,
    ) -> Option<SelectionMove> {
        self.select_at_level(pos, anchor, &|infix, pos, _| {
            let index = pos.field_index();
            let offset = pos.leaf_offset();
            let field = match &infix.fields[index] {
                Component::Field(f) => f,
                Component::Literal(l) => l.field(),
                Component::Bracket(_) => return None,
            };
            if offset > 0 {
                return Some(CaretPos::new(index, CaretPos::leaf(field.previous_word_offset(offset))));
            }
            infix.select_backward_from(index)
        })
    }

    /// Extend the selection to the start of the level, or of the literal the caret is in.
    pub fn select_home(&self, pos: &CaretPos, anchor: Option<&CaretPos>) -> Option<SelectionMove> {
        self.select_at_level(pos, anchor, &|infix, pos, _| {
            let index = pos.field_index();
            let dest = if matches!(infix.fields[index], Component::Literal(_)) { index } else { 0 };
            Some(CaretPos::new(dest, infix.fields[dest].start_pos()))
        })
    }

    /// Extend the selection to the end of the level, or of the literal the caret is in.
    pub fn select_end(&self, pos: &CaretPos, anchor: Option<&CaretPos>) -> Option<SelectionMove> {
        self.select_at_level(pos, anchor, &|infix, pos, _| {
            let index = pos.field_index();
            let last = infix.fields.len() - 1;
            let dest = if matches!(infix.fields[index], Component::Literal(_)) { index } else { last };
            Some(CaretPos::new(dest, infix.fields[dest].end_pos()))
        })
    }

    /// Select the whole innermost infix containing `pos`.
    pub fn select_all(&self, pos: &CaretPos) -> SelectionMove {
        let index = pos.field_index();
        match &self.fields[index] {
            Component::Bracket(group) => {
                let inner = group.content().select_all(&pos.sub_or_start());
                SelectionMove {
                    anchor: CaretPos::new(index, inner.anchor),
                    caret: CaretPos::new(index, inner.caret),
                }
            }
            _ => SelectionMove {
                anchor: self.start_pos(),
                caret: self.end_pos(),
            },
        }
    }

    /// Closest caret position to `column` (in cells of the copy text), with its distance.
    ///
    /// Brackets are only entered when `descend` is set; string literals only when `descend` is
    /// set or `restrict` names them. With `restrict`, only that component is considered.
    pub fn nearest(&self, column: usize, descend: bool, restrict: Option<usize>) -> (CaretPos, usize) {
        self.nearest_from(0, column, descend, restrict)
    }

    /// Like [`Infix::nearest`], but without descending, at the nested level reached through
    /// `prefix`. Used to extend a selection, which never leaves its level.
    pub fn nearest_at_level(
        &self,
        prefix: &[usize],
        column: usize,
        restrict: Option<usize>,
    ) -> Option<(CaretPos, usize)> {
        let mut origin = 0;
        let mut level = self;
        for &i in prefix {
            origin += level.column_of(i) + 1;
            level = level.fields.get(i)?.content()?;
        }
        let (pos, dist) = level.nearest_from(origin, column, false, restrict);
        let pos = prefix.iter().rev().fold(pos, |sub, &i| CaretPos::new(i, sub));
        Some((pos, dist))
    }

    /// Column at which component `index` starts, relative to this level.
    fn column_of(&self, index: usize) -> usize {
        let fields: usize = self.fields[..index].iter().map(Component::width).sum();
        let ops: usize = self.joints[..index].iter().map(|j| j.text().chars().count()).sum();
        fields + ops
    }

    fn nearest_from(
        &self,
        origin: usize,
        column: usize,
        descend: bool,
        restrict: Option<usize>,
    ) -> (CaretPos, usize) {
        let mut best: Option<(CaretPos, usize)> = None;
        let mut x = origin;
        for (i, component) in self.fields.iter().enumerate() {
            let allowed = restrict.is_none_or(|r| r == i);
            let candidate = match component {
                _ if !allowed => None,
                Component::Field(f) => Some(leaf_nearest(f, x, column)),
                Component::Literal(l) if descend || restrict == Some(i) => {
                    Some(leaf_nearest(l.field(), x + 1, column))
                }
                Component::Bracket(group) if descend => {
                    Some(group.content().nearest_from(x + 1, column, descend, None))
                }
                _ => None,
            };
            if let Some((pos, dist)) = candidate {
                if best.as_ref().is_none_or(|(_, d)| dist < *d) {
                    best = Some((CaretPos::new(i, pos), dist));
                }
            }
            x += component.width();
            x += self.joints.get(i).map_or(0, |j| j.text().chars().count());
        }
        best.unwrap_or_else(|| (self.start_pos(), usize::MAX))
    }

    /// Run `step` at the level where the selection lives and rebuild full paths.
    ///
    /// The selection lives in the deepest bracket that contains both the caret and the anchor
    /// (the caret alone when there is no anchor yet).
    fn select_at_level<F>(
        &self,
        pos: &CaretPos,
        anchor: Option<&CaretPos>,
        step: &F,
    ) -> Option<SelectionMove>
    where
        F: Fn(&Infix, &CaretPos, Option<&CaretPos>) -> Option<CaretPos>,
    {
        let index = pos.field_index();
        if let Component::Bracket(group) = &self.fields[index] {
            let same = anchor.is_none_or(|a| a.slot() == Some(index));
            if same {
                let sub_anchor = anchor.and_then(CaretPos::sub);
                let inner = group
                    .content()
                    .select_at_level(&pos.sub_or_start(), sub_anchor, step)?;
                return Some(SelectionMove {
                    anchor: CaretPos::new(index, inner.anchor),
                    caret: CaretPos::new(index, inner.caret),
                });
            }
        }
        let caret = step(self, pos, anchor)?;
        Some(SelectionMove {
            anchor: anchor.cloned().unwrap_or_else(|| pos.clone()),
            caret,
        })
    }

    /// Nearest plain field before `index` to extend a selection into; never from a literal.
    fn select_backward_from(&self, index: usize) -> Option<CaretPos> {
        if matches!(self.fields[index], Component::Literal(_)) {
            return None;
        }
        (0..index)
            .rev()
            .find_map(|i| self.fields[i].select_into_pos(true).map(|p| CaretPos::new(i, p)))
    }

    /// Nearest plain field after `index` to extend a selection into; never from a literal.
    fn select_forward_from(&self, index: usize) -> Option<CaretPos> {
        if matches!(self.fields[index], Component::Literal(_)) {
            return None;
        }
        (index + 1..self.fields.len())
            .find_map(|i| self.fields[i].select_into_pos(false).map(|p| CaretPos::new(i, p)))
    }
}

fn leaf_nearest(field: &TextField, origin: usize, column: usize) -> (CaretPos, usize) {
    if column <= origin {
        return (CaretPos::leaf(0), origin - column);
    }
    let (offset, dist) = field.nearest(column - origin);
    (CaretPos::leaf(offset), dist)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use slot_core_lang::GrammarProfile;

    use super::*;
    use crate::transaction::ModificationToken;

    fn build(src: &str) -> Infix {
        let mut infix = Infix::new(Arc::new(GrammarProfile::expression()));
        ModificationToken::standalone(|token| {
            infix.insert(&infix.start_pos(), src, None, false, token);
        });
        infix
    }

    #[test]
    fn test_move_through_brackets() {
        let infix = build("f(a)+b");
        // {f}_({a})_{}+{b}
        assert_eq!(infix.move_right(&CaretPos::path(&[0, 1])), CaretPos::path(&[1, 0, 0]));
        assert_eq!(infix.move_right(&CaretPos::path(&[1, 0, 1])), CaretPos::path(&[2, 0]));
        assert_eq!(infix.move_right(&CaretPos::path(&[2, 0])), CaretPos::path(&[3, 0]));
        assert_eq!(infix.move_left(&CaretPos::path(&[2, 0])), CaretPos::path(&[1, 0, 1]));
        assert_eq!(infix.move_left(&CaretPos::path(&[1, 0, 0])), CaretPos::path(&[0, 1]));
        assert!(infix.move_left(&CaretPos::path(&[0, 0])).is_escape_parent());
        assert!(infix.move_right(&CaretPos::path(&[3, 1])).is_escape_next());
    }

    #[test]
    fn test_home_and_end_stay_in_level() {
        let infix = build("x+(a*b)");
        let inside = CaretPos::path(&[2, 1, 0]);
        assert_eq!(infix.home(&inside), CaretPos::path(&[2, 0, 0]));
        assert_eq!(infix.end(&inside), CaretPos::path(&[2, 1, 1]));
        assert_eq!(infix.end(&CaretPos::path(&[0, 0])), CaretPos::path(&[3, 0]));
    }

    #[test]
    fn test_word_movement() {
        let infix = build("foo_bar+baz");
        assert_eq!(infix.next_word(&CaretPos::path(&[0, 0])), CaretPos::path(&[0, 7]));
        assert_eq!(infix.next_word(&CaretPos::path(&[0, 7])), CaretPos::path(&[1, 0]));
        assert_eq!(infix.previous_word(&CaretPos::path(&[1, 0])), CaretPos::path(&[0, 7]));
    }

    #[test]
    fn test_selection_skips_compounds() {
        let infix = build("a(b)c");
        // {a}_({b})_{c}
        let moved = infix.select_right(&CaretPos::path(&[0, 1]), None).expect("can extend");
        assert_eq!(moved.anchor, CaretPos::path(&[0, 1]));
        assert_eq!(moved.caret, CaretPos::path(&[2, 0]));

        let back = infix
            .select_left(&CaretPos::path(&[2, 0]), Some(&CaretPos::path(&[2, 1])))
            .expect("can extend");
        assert_eq!(back.anchor, CaretPos::path(&[2, 1]));
        assert_eq!(back.caret, CaretPos::path(&[0, 1]));
    }

    #[test]
    fn test_selection_stays_in_literal() {
        let infix = build("a+\"xy\"");
        assert_eq!(infix.select_left(&CaretPos::path(&[2, 0]), None), None);
        let home = infix.select_home(&CaretPos::path(&[2, 2]), None).expect("in literal");
        assert_eq!(home.caret, CaretPos::path(&[2, 0]));
        let end = infix.select_end(&CaretPos::path(&[0, 0]), None).expect("plain field");
        assert_eq!(end.caret, CaretPos::path(&[3, 0]));
    }

    #[test]
    fn test_selection_inside_bracket() {
        let infix = build("f(ab)");
        let all = infix.select_all(&CaretPos::path(&[1, 0, 1]));
        assert_eq!(all.anchor, CaretPos::path(&[1, 0, 0]));
        assert_eq!(all.caret, CaretPos::path(&[1, 0, 2]));

        let moved = infix
            .select_left(&CaretPos::path(&[1, 0, 1]), None)
            .expect("can extend");
        assert_eq!(moved.caret, CaretPos::path(&[1, 0, 0]));
    }

    #[test]
    fn test_nearest_at_nested_level() {
        let infix = build("f(ab+c)");
        // Content of the bracket starts at column 2.
        let (pos, dist) = infix.nearest_at_level(&[1], 3, None).expect("level exists");
        assert_eq!((pos, dist), (CaretPos::path(&[1, 0, 1]), 0));
        assert_eq!(infix.nearest_at_level(&[0], 3, None), None);
    }

    #[test]
    fn test_nearest_column() {
        let infix = build("ab+(cd)");
        // Copy text "ab+(cd)": fields at columns 0..2, 3 (empty), bracket content at 4..6.
        assert_eq!(infix.nearest(1, true, None), (CaretPos::path(&[0, 1]), 0));
        assert_eq!(infix.nearest(5, true, None), (CaretPos::path(&[2, 0, 1]), 0));
        // Without descending, the empty field before the bracket wins the tie.
        assert_eq!(infix.nearest(5, false, None), (CaretPos::path(&[1, 0]), 2));
    }
}
