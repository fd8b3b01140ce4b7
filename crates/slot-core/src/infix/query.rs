//! Read-only questions about an infix, plus variable renaming built on them.

use super::Infix;
use crate::caret::CaretPos;
use crate::component::Component;
use crate::field::TextField;
use crate::operator::Joint;
use crate::transaction::ModificationToken;

/// Classification of an expression as a `..` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeType {
    /// No top-level `..`, or a `,` anywhere at the top level.
    NotRange,
    /// A range whose every field is an integer literal.
    RangeConstant,
    /// Any other range.
    RangeNonConstant,
}

/// Source text either side of a split operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitInfo {
    /// Text before the operator.
    pub lhs: String,
    /// Text after the operator.
    pub rhs: String,
}

/// A plain field holding a bare variable name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlainVarUse {
    /// Field indices from the top level down to the field.
    pub path: Vec<usize>,
}

impl Infix {
    /// Whether this level is a range expression.
    pub fn check_range_expression(&self) -> RangeType {
        if self.joints.iter().any(|j| j.is(",")) || !self.joints.iter().any(|j| j.is("..")) {
            return RangeType::NotRange;
        }
        if self.fields.iter().all(Component::is_numeric_literal) {
            RangeType::RangeConstant
        } else {
            RangeType::RangeNonConstant
        }
    }

    /// Whether the field at `index` may be drawn collapsed while empty.
    ///
    /// A lone top-level field follows `slot_collapsible`; a lone field inside brackets always
    /// collapses. Between two operators (or an operator and an edge) the field collapses only
    /// if the following operator can be unary. Next to a boundary it always collapses.
    pub fn is_collapsible(&self, index: usize, slot_collapsible: bool) -> bool {
        if self.fields.len() == 1 {
            return if self.nested { true } else { slot_collapsible };
        }
        let op_before = index == 0 || !self.joints[index - 1].is_boundary();
        let op_after = index == self.joints.len() || !self.joints[index].is_boundary();
        if op_before && op_after {
            let unary_after = self
                .joints
                .get(index)
                .is_some_and(|j| self.grammar.can_be_unary(j.text()));
            return unary_after;
        }
        true
    }

    /// One entry per comma-separated parameter: the field index when the parameter is a single
    /// plain field, `None` otherwise.
    pub fn simple_parameters(&self) -> Vec<Option<usize>> {
        let mut params = Vec::new();
        let mut param_start = 0;
        for i in 0..self.fields.len() {
            let ends_param = i + 1 == self.fields.len() || self.joints[i].is(",");
            if ends_param {
                let simple = param_start == i && matches!(self.fields[i], Component::Field(_));
                params.push(simple.then_some(i));
                param_start = i + 1;
            }
        }
        params
    }

    /// Returns `true` if the component at `index` is a bracket directly after a non-empty plain
    /// field, i.e. the argument list of a call.
    pub fn is_method_params(&self, index: usize) -> bool {
        index > 0
            && matches!(self.fields.get(index), Some(Component::Bracket(_)))
            && matches!(&self.fields[index - 1], Component::Field(f) if !f.is_empty())
    }

    /// Returns `true` if this level is exactly one curly-bracket group, e.g. `{1, 2, 3}`.
    pub fn is_curly_literal(&self) -> bool {
        self.fields.len() == 3
            && self.joints.iter().all(Joint::is_boundary)
            && self.fields[0].is_field_and_empty()
            && self.fields[2].is_field_and_empty()
            && matches!(&self.fields[1], Component::Bracket(b) if b.opening() == '{')
    }

    /// Returns `true` if all text is whitespace; brackets, quotes and operators are allowed.
    pub fn is_almost_blank(&self) -> bool {
        self.fields.iter().all(Component::is_almost_blank)
    }

    /// Rough number of keystrokes that produced this infix.
    pub fn calculate_effort(&self) -> usize {
        let fields: usize = self.fields.iter().map(Component::calculate_effort).sum();
        let ops: usize = self
            .joints
            .iter()
            .filter_map(Joint::operator)
            .map(|op| op.len())
            .sum();
        fields + ops
    }

    /// Split around the first top-level operator equal to `target`.
    pub fn try_split_on(&self, target: &str) -> Option<SplitInfo> {
        let i = self.joints.iter().position(|j| j.is(target))?;
        let lhs_end = CaretPos::new(i, self.fields[i].end_pos());
        let rhs_start = CaretPos::new(i + 1, self.fields[i + 1].start_pos());
        Some(SplitInfo {
            lhs: self.copy_text(None, Some(&lhs_end)),
            rhs: self.copy_text(Some(&rhs_start), None),
        })
    }

    /// Plain fields holding exactly `name` that are not member accesses (`x.name`) and not
    /// method names (`name(...)`).
    pub fn find_plain_var_uses(&self, name: &str) -> Vec<PlainVarUse> {
        let mut uses = Vec::new();
        self.collect_plain_var_uses(name, &mut Vec::new(), &mut uses);
        uses
    }

    fn collect_plain_var_uses(&self, name: &str, prefix: &mut Vec<usize>, out: &mut Vec<PlainVarUse>) {
        for (i, component) in self.fields.iter().enumerate() {
            match component {
                Component::Field(f) if f.text() == name => {
                    let after_dot = self.prev_op(i) == ".";
                    let is_call = matches!(
                        self.fields.get(i + 1),
                        Some(Component::Bracket(b)) if b.opening() == '('
                    );
                    if !after_dot && !is_call {
                        let mut path = prefix.clone();
                        path.push(i);
                        out.push(PlainVarUse { path });
                    }
                }
                Component::Bracket(b) => {
                    prefix.push(i);
                    b.content().collect_plain_var_uses(name, prefix, out);
                    prefix.pop();
                }
                _ => {}
            }
        }
    }

    /// Replace every plain use of `old` with `new`; returns the number of fields changed.
    pub fn rename_plain_var(&mut self, old: &str, new: &str, token: &ModificationToken) -> usize {
        let uses = self.find_plain_var_uses(old);
        for var in &uses {
            if let Some(field) = self.field_at_path_mut(&var.path) {
                field.set_text(new, token);
            }
        }
        uses.len()
    }

    fn field_at_path_mut(&mut self, path: &[usize]) -> Option<&mut TextField> {
        match path {
            [] => None,
            [i] => match self.fields.get_mut(*i)? {
                Component::Field(f) => Some(f),
                _ => None,
            },
            [i, rest @ ..] => self.bracket_mut(*i)?.content_mut().field_at_path_mut(rest),
        }
    }

    /// Paths of the bracket groups whose delimiters should be highlighted for `caret`: groups
    /// the caret sits directly before or after, and the group whose content the caret is at
    /// either end of.
    pub fn brackets_to_highlight(&self, caret: &CaretPos) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        self.collect_highlights(None, Some(caret), &mut Vec::new(), &mut out);
        out
    }

    fn collect_highlights(
        &self,
        wrapper: Option<&[usize]>,
        pos: Option<&CaretPos>,
        prefix: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
    ) {
        if let (Some(wrapper), Some(pos)) = (wrapper, pos) {
            let last = self.fields.len() - 1;
            let at_start = pos.slot() == Some(0) && pos.sub() == Some(&self.fields[0].start_pos());
            let at_end = pos.slot() == Some(last) && pos.sub() == Some(&self.fields[last].end_pos());
            if at_start || at_end {
                out.push(wrapper.to_vec());
            }
        }

        for (i, component) in self.fields.iter().enumerate() {
            let Component::Bracket(group) = component else {
                continue;
            };
            let cursor_before = i > 0
                && pos.is_some_and(|p| {
                    p.slot() == Some(i - 1)
                        && matches!(self.fields[i - 1], Component::Field(_))
                        && p.sub() == Some(&self.fields[i - 1].end_pos())
                });
            let cursor_after = i + 1 < self.fields.len()
                && pos.is_some_and(|p| {
                    p.slot() == Some(i + 1)
                        && matches!(self.fields[i + 1], Component::Field(_))
                        && p.sub() == Some(&self.fields[i + 1].start_pos())
                });
            prefix.push(i);
            if cursor_before || cursor_after {
                out.push(prefix.clone());
            }
            let inner = pos.filter(|p| p.slot() == Some(i)).and_then(CaretPos::sub);
            let here = prefix.clone();
            group.content().collect_highlights(Some(&here), inner, prefix, out);
            prefix.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use slot_core_lang::GrammarProfile;

    use super::*;

    fn build(src: &str) -> Infix {
        let mut infix = Infix::new(Arc::new(GrammarProfile::expression()));
        ModificationToken::standalone(|token| {
            infix.insert(&infix.start_pos(), src, None, false, token);
        });
        infix
    }

    #[test]
    fn test_range_detection() {
        assert_eq!(build("1..10").check_range_expression(), RangeType::RangeConstant);
        assert_eq!(build("0..n").check_range_expression(), RangeType::RangeNonConstant);
        assert_eq!(build("a,1..2").check_range_expression(), RangeType::NotRange);
        assert_eq!(build("a+b").check_range_expression(), RangeType::NotRange);
    }

    #[test]
    fn test_collapsible_fields() {
        let single = build("");
        assert!(!single.is_collapsible(0, false));
        assert!(single.is_collapsible(0, true));

        // {}-{x}: the leading empty field sits before a unary-capable operator.
        let unary = build("-x");
        assert!(unary.is_collapsible(0, false));

        // {a}*{}: last field after a binary operator.
        let trailing = build("a*");
        assert!(!trailing.is_collapsible(1, false));

        // Next to a bracket boundary.
        let call = build("f()");
        assert!(call.is_collapsible(2, false));
    }

    #[test]
    fn test_simple_parameters() {
        let params = build("a,b+c,(d),e");
        assert_eq!(params.simple_parameters(), vec![Some(0), None, None, Some(6)]);
        assert_eq!(build("").simple_parameters(), vec![Some(0)]);
    }

    #[test]
    fn test_method_params_and_curly_literal() {
        let call = build("foo(1)+(2)");
        assert!(call.is_method_params(1));
        assert!(!call.is_method_params(4));
        assert!(build("{1,2}").is_curly_literal());
        assert!(!build("({1,2})").is_curly_literal());
        assert!(!build("a{1}").is_curly_literal());
    }

    #[test]
    fn test_effort_and_blankness() {
        assert_eq!(build("ab+\"c\"").calculate_effort(), 2 + 1 + 2);
        assert!(build("( )+\"\"").is_almost_blank());
        assert!(!build("(x)").is_almost_blank());
    }

    #[test]
    fn test_split_on_first_operator() {
        assert_eq!(build("a+b").try_split_on("<="), None);

        let assign = build("a<=b+c");
        assert_eq!(
            assign.try_split_on("<="),
            Some(SplitInfo {
                lhs: "a".to_string(),
                rhs: "b+c".to_string(),
            })
        );
    }

    #[test]
    fn test_plain_var_uses_and_rename() {
        let mut infix = build("x+o.x+x(1)+(x*2)");
        let uses = infix.find_plain_var_uses("x");
        let paths: Vec<_> = uses.into_iter().map(|u| u.path).collect();
        assert_eq!(paths, vec![vec![0], vec![7, 0]]);

        let renamed = ModificationToken::standalone(|token| infix.rename_plain_var("x", "y", token));
        assert_eq!(renamed, 2);
        assert_eq!(infix.copy_text(None, None), "y+o.x+x(1)+(y*2)");
    }

    #[test]
    fn test_bracket_highlighting() {
        let infix = build("f(a)");
        assert_eq!(infix.brackets_to_highlight(&CaretPos::path(&[0, 1])), vec![vec![1]]);
        assert_eq!(infix.brackets_to_highlight(&CaretPos::path(&[1, 0, 0])), vec![vec![1]]);
        assert_eq!(infix.brackets_to_highlight(&CaretPos::path(&[0, 0])), Vec::<Vec<usize>>::new());
    }
}
