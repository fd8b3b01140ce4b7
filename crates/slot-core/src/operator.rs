//! Operators, joints and the presentational precedence pass.

use slot_core_lang::GrammarProfile;

use crate::transaction::ModificationToken;

/// Display category of an operator.
///
/// Categories group operators visually by binding strength; they have no effect on the
/// generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precedence {
    /// Binds tightest among its siblings.
    High,
    /// One level looser than [`Precedence::High`].
    Medium,
    /// Two or more levels looser.
    Low,
    /// Always used for `.`.
    Dot,
    /// Always used for `,`.
    Comma,
    /// Always used for `new `.
    New,
}

impl Precedence {
    /// Category for a computed nesting level.
    pub fn for_level(level: u32) -> Self {
        match level {
            0 => Self::High,
            1 => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Fixed category for sentinel operators.
    pub fn fixed(text: &str) -> Option<Self> {
        match text {
            "." => Some(Self::Dot),
            "," => Some(Self::Comma),
            "new " => Some(Self::New),
            _ => None,
        }
    }
}

/// A single operator token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    text: String,
    precedence: Precedence,
}

impl Operator {
    /// Create an operator; its category is refreshed by the next precedence pass.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let precedence = Precedence::fixed(&text).unwrap_or(Precedence::High);
        Self { text, precedence }
    }

    /// Operator text.
    pub fn get(&self) -> &str {
        &self.text
    }

    /// Replace the operator text.
    pub fn set(&mut self, text: impl Into<String>, _token: &ModificationToken) {
        self.text = text.into();
    }

    /// Display category from the last precedence pass.
    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    pub(crate) fn set_precedence(&mut self, precedence: Precedence) {
        self.precedence = precedence;
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns `true` for an empty operator.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Rendering in generated code.
    pub fn java_code(&self) -> String {
        match self.text.as_str() {
            "." => ".".to_string(),
            "," => ", ".to_string(),
            "<:" => " instanceof ".to_string(),
            "new " => "new ".to_string(),
            other => format!(" {other} "),
        }
    }
}

/// What sits between two neighbouring fields of an infix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Joint {
    /// An explicit operator typed by the user.
    Operator(Operator),
    /// The edge of a bracket or string literal; never holds an operator.
    Boundary,
}

impl Joint {
    /// Convenience constructor for an operator joint.
    pub fn op(text: impl Into<String>) -> Self {
        Self::Operator(Operator::new(text))
    }

    /// The operator, if any.
    pub fn operator(&self) -> Option<&Operator> {
        match self {
            Self::Operator(op) => Some(op),
            Self::Boundary => None,
        }
    }

    pub(crate) fn operator_mut(&mut self) -> Option<&mut Operator> {
        match self {
            Self::Operator(op) => Some(op),
            Self::Boundary => None,
        }
    }

    /// Operator text, or `""` for a boundary.
    pub fn text(&self) -> &str {
        self.operator().map_or("", Operator::get)
    }

    /// Returns `true` for a bracket/literal boundary.
    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary)
    }

    /// Returns `true` if this is the operator `text`.
    pub fn is(&self, text: &str) -> bool {
        self.operator().is_some_and(|op| op.get() == text)
    }
}

/// Result of [`calculate_precedences`] over a range: the lowest precedence value found and the
/// level assigned to it (`-1`/`0` when the range has no rankable operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpPrec {
    /// Lowest binding strength in the range.
    pub prec: i32,
    /// Nesting level of that operator.
    pub levels: u32,
}

/// Assign display categories to every operator in `joints`.
///
/// `unary[i]` says whether operator `i` is used in prefix position. The loosest operator
/// (leftmost on ties) splits the range; both halves are ranked recursively and the splitting
/// operator's level is the deeper half's level, plus one unless a half shares its precedence.
/// `.`, `,` and `new ` always get their fixed categories and never split.
pub fn calculate_precedences(
    joints: &mut [Joint],
    unary: &[bool],
    grammar: &GrammarProfile,
) -> OpPrec {
    let mut lowest: Option<(usize, i32)> = None;
    for (i, joint) in joints.iter_mut().enumerate() {
        let Some(op) = joint.operator_mut() else {
            continue;
        };
        if let Some(fixed) = Precedence::fixed(op.get()) {
            op.set_precedence(fixed);
            continue;
        }
        let prec = grammar.precedence(op.get(), unary.get(i).copied().unwrap_or(false));
        if lowest.is_none_or(|(_, lowest_prec)| prec < lowest_prec) {
            lowest = Some((i, prec));
        }
    }

    let Some((index, lowest_prec)) = lowest else {
        return OpPrec { prec: -1, levels: 0 };
    };

    let (lhs, rest) = joints.split_at_mut(index);
    let (split, rhs) = rest.split_at_mut(1);
    let lhs_unary = &unary[..index.min(unary.len())];
    let rhs_unary = unary.get(index + 1..).unwrap_or(&[]);

    let lhs_prec = calculate_precedences(lhs, lhs_unary, grammar);
    let rhs_prec = calculate_precedences(rhs, rhs_unary, grammar);

    let level = if lhs_prec.prec == lowest_prec
        || rhs_prec.prec == lowest_prec
        || (lhs_prec.prec == -1 && rhs_prec.prec == -1)
    {
        lhs_prec.levels.max(rhs_prec.levels)
    } else {
        1 + lhs_prec.levels.max(rhs_prec.levels)
    };

    if let Some(op) = split[0].operator_mut() {
        op.set_precedence(Precedence::for_level(level));
    }
    OpPrec {
        prec: lowest_prec,
        levels: level,
    }
}
