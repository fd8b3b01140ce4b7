//! The recursive field/operator sequence at the heart of a slot.
//!
//! # Overview
//!
//! An [`Infix`] holds `N` [`Component`]s and `N - 1` [`Joint`]s, alternating
//! `field, joint, field, ..., field`. Components are plain [`TextField`]s,
//! [`StringLiteral`]s or [`BracketedGroup`]s, the latter owning a nested `Infix`.
//!
//! The following invariants hold after every edit:
//!
//! 1. the first and last components are plain text fields;
//! 2. a joint is [`Joint::Boundary`] exactly when one of its neighbours is a bracket or literal;
//! 3. a single-field infix has no joints.
//!
//! Edits are expressed as character insertions and deletions at a [`CaretPos`]. Each returns the
//! caret position after the edit. A nested infix never reaches up to its owner; when an edit has
//! to leave the infix it returns a sentinel position (see [`CaretIndex`](crate::CaretIndex)) and
//! the owning level acts on it.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use slot_core::{CaretPos, Infix, ModificationToken};
//! use slot_core_lang::GrammarProfile;
//!
//! let mut infix = Infix::new(Arc::new(GrammarProfile::expression()));
//! let caret = ModificationToken::standalone(|token| {
//!     infix.insert(&infix.start_pos(), "getX(", None, true, token)
//! });
//! assert_eq!(infix.copy_text(None, None), "getX()");
//! assert_eq!(infix.render_state(Some(&caret)), "{getX}_({$})_{}");
//! ```

mod delete;
mod float;
mod insert;
mod navigate;
mod query;
mod serialize;

use std::sync::Arc;

use slot_core_lang::GrammarProfile;

use crate::bracket::BracketedGroup;
use crate::caret::CaretPos;
use crate::component::Component;
use crate::field::TextField;
use crate::literal::StringLiteral;
use crate::operator::{Joint, calculate_precedences};
use crate::transaction::ModificationToken;

pub use navigate::SelectionMove;
pub use query::{PlainVarUse, RangeType, SplitInfo};
pub use serialize::{CaretPosMap, Projection};

/// One level of an expression or type tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Infix {
    grammar: Arc<GrammarProfile>,
    fields: Vec<Component>,
    joints: Vec<Joint>,
    closing_chars: Vec<char>,
    nested: bool,
    structure_changed: bool,
}

impl Infix {
    /// An empty top-level infix.
    pub fn new(grammar: Arc<GrammarProfile>) -> Self {
        Self {
            grammar,
            fields: vec![Component::Field(TextField::default())],
            joints: Vec::new(),
            closing_chars: Vec::new(),
            nested: false,
            structure_changed: false,
        }
    }

    /// An empty infix owned by a bracket closed by `closing`.
    pub(crate) fn nested(grammar: Arc<GrammarProfile>, closing: char) -> Self {
        Self {
            closing_chars: vec![closing],
            nested: true,
            ..Self::new(grammar)
        }
    }

    /// Characters that, typed at the end of a field, leave this infix instead of being inserted.
    pub fn with_closing_chars(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.closing_chars.extend(chars);
        self
    }

    /// Grammar used for classification.
    pub fn grammar(&self) -> &Arc<GrammarProfile> {
        &self.grammar
    }

    /// Components in order.
    pub fn fields(&self) -> &[Component] {
        &self.fields
    }

    /// Joints in order; always one shorter than [`Infix::fields`].
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Closing characters of this level.
    pub fn closing_chars(&self) -> &[char] {
        &self.closing_chars
    }

    /// Returns `true` if a bracket owns this infix.
    pub fn is_nested(&self) -> bool {
        self.nested
    }

    /// Returns `true` for a single empty field.
    pub fn is_empty(&self) -> bool {
        self.fields.len() == 1 && self.fields[0].is_field_and_empty()
    }

    /// First caret position.
    pub fn start_pos(&self) -> CaretPos {
        CaretPos::new(0, self.fields[0].start_pos())
    }

    /// Last caret position.
    pub fn end_pos(&self) -> CaretPos {
        let last = self.fields.len() - 1;
        CaretPos::new(last, self.fields[last].end_pos())
    }

    /// Returns `true` if `pos` addresses a caret position inside this tree.
    pub fn is_valid_position(&self, pos: &CaretPos) -> bool {
        let Some(index) = pos.slot() else {
            return false;
        };
        let Some(sub) = pos.sub() else {
            return false;
        };
        match self.fields.get(index) {
            Some(Component::Bracket(group)) => group.content().is_valid_position(sub),
            Some(component) => {
                sub.sub().is_none() && sub.slot().is_some_and(|off| off <= component.text_len())
            }
            None => false,
        }
    }

    /// Clear all content, leaving a single empty field.
    pub fn blank(&mut self, _token: &ModificationToken) {
        self.fields = vec![Component::Field(TextField::default())];
        self.joints.clear();
        self.structure_changed = true;
    }

    /// Debug rendering: `{text}` for fields, operators verbatim, `_` for boundaries, literals
    /// in their quotes, brackets around their content, and `$` at `caret`.
    pub fn render_state(&self, caret: Option<&CaretPos>) -> String {
        let mut out = String::new();
        for (i, field) in self.fields.iter().enumerate() {
            let sub = caret.filter(|c| c.slot() == Some(i)).map(CaretPos::sub_or_start);
            out.push_str(&field.render_state(sub.as_ref()));
            if let Some(joint) = self.joints.get(i) {
                match joint {
                    Joint::Operator(op) => out.push_str(op.get()),
                    Joint::Boundary => out.push('_'),
                }
            }
        }
        out
    }

    /// Check the structural invariants of this level and every nested level.
    ///
    /// # Panics
    ///
    /// Panics when an invariant is broken; a corrupted tree is a bug in the engine.
    pub fn assert_invariants(&self) {
        assert!(!self.fields.is_empty(), "infix has no fields");
        assert_eq!(
            self.joints.len(),
            self.fields.len() - 1,
            "joint count out of step with fields"
        );
        assert!(
            matches!(self.fields.first(), Some(Component::Field(_))),
            "first component must be a plain field"
        );
        assert!(
            matches!(self.fields.last(), Some(Component::Field(_))),
            "last component must be a plain field"
        );
        for (i, joint) in self.joints.iter().enumerate() {
            let compound = self.fields[i].is_compound() || self.fields[i + 1].is_compound();
            assert_eq!(
                joint.is_boundary(),
                compound,
                "joint {i} must be a boundary exactly next to a compound"
            );
        }
        for field in &self.fields {
            if let Component::Bracket(group) = field {
                group.content().assert_invariants();
            }
        }
    }

    /// Recompute precedences over the whole tree.
    pub fn calculate_precedences(&mut self) {
        let unary: Vec<bool> = self
            .fields
            .iter()
            .take(self.joints.len())
            .map(Component::is_field_and_empty)
            .collect();
        calculate_precedences(&mut self.joints, &unary, &self.grammar);
        for field in &mut self.fields {
            if let Component::Bracket(group) = field {
                group.content_mut().calculate_precedences();
            }
        }
    }

    /// Clear the prompts of every level whose structure changed and that stopped being a single
    /// field. Returns `true` if any level changed structure since the last call.
    pub(crate) fn settle(&mut self) -> bool {
        let mut changed = std::mem::take(&mut self.structure_changed);
        if changed && self.fields.len() != 1 {
            for field in &mut self.fields {
                if let Component::Field(f) = field {
                    f.set_prompt("");
                }
            }
        }
        for field in &mut self.fields {
            if let Component::Bracket(group) = field {
                changed |= group.content_mut().settle();
            }
        }
        changed
    }

    /// The infix reached by following `prefix` through bracket contents (`self` when empty).
    pub fn level(&self, prefix: &[usize]) -> Option<&Infix> {
        prefix.iter().try_fold(self, |level, &i| level.fields.get(i)?.content())
    }

    pub(crate) fn level_mut(&mut self, prefix: &[usize]) -> Option<&mut Infix> {
        match prefix.split_first() {
            None => Some(self),
            Some((&i, rest)) => self.bracket_mut(i)?.content_mut().level_mut(rest),
        }
    }

    /// Bracket indices leading from this infix to the level whose leaf `pos` addresses.
    pub(crate) fn level_prefix(&self, pos: &CaretPos) -> Vec<usize> {
        let mut prefix = Vec::new();
        let mut level = self;
        let mut pos = pos;
        while let (Some(i), Some(sub)) = (pos.slot(), pos.sub()) {
            match level.fields.get(i).and_then(Component::content) {
                Some(content) => {
                    prefix.push(i);
                    level = content;
                    pos = sub;
                }
                None => break,
            }
        }
        prefix
    }

    pub(crate) fn plain_field_mut(&mut self, index: usize) -> Option<&mut TextField> {
        match self.fields.get_mut(index) {
            Some(Component::Field(f)) => Some(f),
            _ => None,
        }
    }

    // ----- list primitives -----

    fn add_field(&mut self, index: usize, component: Component) {
        self.fields.insert(index, component);
        self.structure_changed = true;
    }

    fn add_joint(&mut self, index: usize, joint: Joint) {
        self.joints.insert(index, joint);
        self.structure_changed = true;
    }

    fn remove_field(&mut self, index: usize) -> Component {
        self.structure_changed = true;
        self.fields.remove(index)
    }

    fn remove_joint(&mut self, index: usize) -> Joint {
        self.structure_changed = true;
        self.joints.remove(index)
    }

    fn field(&self, index: usize) -> Option<&TextField> {
        self.fields.get(index).and_then(Component::as_field)
    }

    /// Text of the plain field at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the component is not a plain field.
    fn field_text(&self, index: usize) -> &str {
        match self.fields.get(index) {
            Some(Component::Field(f)) => f.text(),
            other => panic!("component {index} is not a plain field: {other:?}"),
        }
    }

    fn field_mut(&mut self, index: usize) -> &mut TextField {
        match self.fields.get_mut(index) {
            Some(Component::Field(f)) => f,
            other => panic!("component {index} is not a plain field: {other:?}"),
        }
    }

    fn literal_mut(&mut self, index: usize) -> &mut StringLiteral {
        match self.fields.get_mut(index) {
            Some(Component::Literal(l)) => l,
            other => panic!("component {index} is not a string literal: {other:?}"),
        }
    }

    fn bracket_mut(&mut self, index: usize) -> Option<&mut BracketedGroup> {
        match self.fields.get_mut(index) {
            Some(Component::Bracket(group)) => Some(group),
            _ => None,
        }
    }

    /// Text of the operator after field `index` (`""` for boundaries and the end).
    fn next_op(&self, index: usize) -> &str {
        self.joints.get(index).map_or("", Joint::text)
    }

    /// Text of the operator before field `index` (`""` for boundaries and the start).
    fn prev_op(&self, index: usize) -> &str {
        index
            .checked_sub(1)
            .and_then(|i| self.joints.get(i))
            .map_or("", Joint::text)
    }
}
