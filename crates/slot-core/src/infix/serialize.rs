//! Text projections of an infix and the mapping between caret paths and string offsets.
//!
//! Two strings are produced from a tree:
//!
//! - the *source* text ([`Infix::copy_text`]), which reproduces the same tree when typed back in;
//! - the *generated code* ([`Infix::java_code`]), where operators are padded with spaces, `<:`
//!   becomes `instanceof` and `a..b` becomes a call to the grammar's range helper.
//!
//! [`Infix::caret_to_string_pos`] and [`Infix::string_pos_to_caret_pos`] translate between caret
//! paths and character offsets in either string. They are used to place error markers reported
//! against generated code back into the editor.

use tracing::warn;

use super::Infix;
use crate::caret::CaretPos;
use crate::operator::Joint;

/// Which string a position refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Projection {
    /// The round-trippable source text.
    Source,
    /// The generated code.
    GeneratedCode,
}

/// A leaf component's extent in a projected string.
///
/// `prefix` is the caret path down to the leaf; appending a character offset gives a full
/// caret position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretPosMap {
    /// Path from the top of the mapped tree to the leaf.
    pub prefix: Vec<usize>,
    /// Offset of the first character of the leaf.
    pub start: usize,
    /// Offset just past the last character of the leaf.
    pub end: usize,
}

impl CaretPosMap {
    pub(crate) fn leaf(start: usize, end: usize) -> Self {
        Self {
            prefix: Vec::new(),
            start,
            end,
        }
    }

    fn wrap(mut self, index: usize) -> Self {
        self.prefix.insert(0, index);
        self
    }

    /// Caret position `offset` characters into the leaf.
    pub fn position(&self, offset: usize) -> CaretPos {
        let mut path = self.prefix.clone();
        path.push(offset);
        CaretPos::path(&path)
    }
}

impl Infix {
    /// Source text between two positions (`None` meaning the respective end).
    ///
    /// Compounds that lie entirely inside the range are copied with their delimiters, so the
    /// full copy text types back into an identical tree.
    pub fn copy_text(&self, from: Option<&CaretPos>, to: Option<&CaretPos>) -> String {
        let start = from.cloned().unwrap_or_else(|| CaretPos::path(&[0, 0]));
        let end = to.cloned().unwrap_or_else(|| self.end_pos());
        let (first, last) = (start.field_index(), end.field_index());

        if first == last {
            return self.fields[first].copy_text(start.sub(), end.sub());
        }
        let mut out = self.fields[first].copy_text(start.sub(), None);
        out.push_str(self.joints[first].text());
        for i in first + 1..last {
            out.push_str(&self.fields[i].copy_text(None, None));
            out.push_str(self.joints[i].text());
        }
        out.push_str(&self.fields[last].copy_text(None, end.sub()));
        out
    }

    /// Generated code for the whole infix.
    ///
    /// Each `..` opens a call to the grammar's range helper that is closed at the next `,` or at
    /// the end; several ranges before a comma therefore nest.
    pub fn java_code(&self) -> String {
        let helper = &self.grammar.range_helper;
        let mut out = String::new();
        let mut closing = 0;
        let mut last = 0;
        for (i, joint) in self.joints.iter().enumerate() {
            if joint.is("..") {
                out.push_str(helper);
                out.push('(');
                out.push_str(&self.java_fields(last, i + 1));
                out.push_str(", ");
                last = i + 1;
                closing += 1;
            } else if joint.is(",") {
                out.push_str(&self.java_fields(last, i + 1));
                out.push_str(&")".repeat(closing));
                out.push_str(", ");
                closing = 0;
                last = i + 1;
            }
        }
        out.push_str(&self.java_fields(last, self.fields.len()));
        out.push_str(&")".repeat(closing));
        out
    }

    /// Generated code for fields `start..end` and the operators between them.
    fn java_fields(&self, start: usize, end: usize) -> String {
        let mut out = String::new();
        for i in start..end {
            out.push_str(&self.fields[i].java_code());
            if i + 1 < end {
                if let Some(Joint::Operator(op)) = self.joints.get(i) {
                    out.push_str(&op.java_code());
                }
            }
        }
        out
    }

    /// Width in cells of the copy text.
    pub(crate) fn width(&self) -> usize {
        let fields: usize = self.fields.iter().map(|f| f.width()).sum();
        let ops: usize = self.joints.iter().map(|j| j.text().chars().count()).sum();
        fields + ops
    }

    /// Extents of every leaf in the projected string, in order, starting at `counter`.
    pub(crate) fn map_positions(&self, counter: &mut usize, projection: Projection) -> Vec<CaretPosMap> {
        let mut out = Vec::new();
        match projection {
            Projection::Source => self.map_range(0, self.fields.len(), counter, projection, &mut out),
            Projection::GeneratedCode => {
                let helper_len = self.grammar.range_helper.chars().count() + 1;
                let mut closing = 0;
                let mut last = 0;
                for (i, joint) in self.joints.iter().enumerate() {
                    if joint.is("..") {
                        *counter += helper_len;
                        self.map_range(last, i + 1, counter, projection, &mut out);
                        *counter += 2;
                        last = i + 1;
                        closing += 1;
                    } else if joint.is(",") {
                        self.map_range(last, i + 1, counter, projection, &mut out);
                        *counter += closing + 2;
                        closing = 0;
                        last = i + 1;
                    }
                }
                self.map_range(last, self.fields.len(), counter, projection, &mut out);
                *counter += closing;
            }
        }
        out
    }

    fn map_range(
        &self,
        start: usize,
        end: usize,
        counter: &mut usize,
        projection: Projection,
        out: &mut Vec<CaretPosMap>,
    ) {
        for i in start..end {
            let mut maps = Vec::new();
            self.fields[i].map_positions(counter, projection, &mut maps);
            out.extend(maps.into_iter().map(|m| m.wrap(i)));
            if i + 1 < end {
                if let Some(Joint::Operator(op)) = self.joints.get(i) {
                    *counter += match projection {
                        Projection::Source => op.len(),
                        Projection::GeneratedCode => op.java_code().chars().count(),
                    };
                }
            }
        }
    }

    /// Character offset of `pos` in the projected string, or `None` if `pos` does not address a
    /// leaf of this tree.
    pub fn caret_to_string_pos(&self, pos: &CaretPos, projection: Projection) -> Option<usize> {
        self.map_positions(&mut 0, projection)
            .into_iter()
            .find_map(|m| pos.following(&m.prefix).map(|offset| m.start + offset))
    }

    /// Caret position for a character offset in the projected string.
    ///
    /// Offsets that fall on operator text map to `None` for the source projection; for
    /// generated code they snap to the start of the next leaf.
    pub fn string_pos_to_caret_pos(&self, pos: usize, projection: Projection) -> Option<CaretPos> {
        let maps = self.map_positions(&mut 0, projection);
        let Some(map) = maps.iter().find(|m| pos <= m.end) else {
            warn!(pos, ?projection, "string position past the end of the slot");
            return None;
        };
        (pos >= map.start || projection == Projection::GeneratedCode)
            .then(|| map.position(pos.saturating_sub(map.start)))
    }
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
    fn test_copy_text_round_trips_source() {
        for src in ["a+b", "foo(1,2)", "\"x\"+'y'", "a[0].b", "(a)", ""] {
            assert_eq!(build(src).copy_text(None, None), src);
        }
    }

    #[test]
    fn test_java_code_spacing() {
        assert_eq!(build("1++2").java_code(), "1 + +2");
        assert_eq!(build("a<:Crab").java_code(), "a instanceof Crab");
        assert_eq!(build("new ton").java_code(), "new ton");
        assert_eq!(build("x.y(a,b)").java_code(), "x.y(a, b)");
    }

    #[test]
    fn test_java_code_ranges() {
        let helper = "lang.stride.Utility.makeRange";
        assert_eq!(build("1..2").java_code(), format!("{helper}(1, 2)"));
        assert_eq!(
            build("1,2..3+4,5,6..7..8").java_code(),
            format!("1, {helper}(2, 3 + 4), 5, {helper}(6, {helper}(7, 8))")
        );
    }

    #[test]
    fn test_range_helper_is_configurable() {
        let grammar = GrammarProfile::expression().with_range_helper("range");
        let mut infix = Infix::new(Arc::new(grammar));
        ModificationToken::standalone(|token| {
            infix.insert(&infix.start_pos(), "0..n", None, false, token);
        });
        assert_eq!(infix.java_code(), "range(0, n)");
        assert_eq!(
            infix.caret_to_string_pos(&CaretPos::path(&[1, 0]), Projection::GeneratedCode),
            Some(9)
        );
    }

    #[test]
    fn test_unmappable_positions() {
        let infix = build("a+b");
        assert_eq!(infix.string_pos_to_caret_pos(9, Projection::Source), None);
        assert_eq!(
            infix.caret_to_string_pos(&CaretPos::path(&[7, 0]), Projection::Source),
            None
        );
    }
}
