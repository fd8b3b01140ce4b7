#![warn(missing_docs)]
//! `slot-core-lang` - data-driven grammar profiles for `slot-core`.
//!
//! A structured slot needs to know which strings are operators, which characters open and close
//! brackets, which characters may never be typed, and whether numeric literals with a decimal
//! point or exponent should be kept together. None of that is algorithmic: this crate describes
//! each flavour of slot as plain data, and the engine in `slot-core` consults it.
//!
//! Two flavours ship with the crate:
//!
//! - [`GrammarProfile::expression`]: Java-like expressions (full operator set, string literals,
//!   `(`/`[`/`{` brackets, floating-point literals).
//! - [`GrammarProfile::type_name`]: type names (`.` and `,` only, `<`/`[` brackets, identifier
//!   characters only).
//!
//! # Example
//!
//! ```rust
//! use slot_core_lang::GrammarProfile;
//!
//! let grammar = GrammarProfile::expression();
//! assert!(grammar.is_operator("<="));
//! assert!(grammar.begins_operator('='));
//! assert!(!grammar.is_operator("="));
//! assert_eq!(grammar.closing_for('('), Some(')'));
//! ```

/// Default name of the helper called for `a .. b` ranges in generated code.
pub const DEFAULT_RANGE_HELPER: &str = "lang.stride.Utility.makeRange";

/// Precedence given to any unary-capable operator that is used in unary position.
pub const UNARY_PRECEDENCE: i32 = 13;

/// One operator of a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSpec {
    /// Operator text as it appears in source (e.g. `>>>`, `new `).
    pub text: String,
    /// Binary binding strength; higher binds tighter.
    pub precedence: i32,
    /// Whether the operator may appear with an empty left operand.
    pub unary: bool,
}

impl OperatorSpec {
    /// A binary-only operator.
    pub fn binary(text: impl Into<String>, precedence: i32) -> Self {
        Self {
            text: text.into(),
            precedence,
            unary: false,
        }
    }

    /// An operator that may also be used as a prefix.
    pub fn prefix(text: impl Into<String>, precedence: i32) -> Self {
        Self {
            text: text.into(),
            precedence,
            unary: true,
        }
    }

    /// Keyword operators (e.g. `new `) end in a space and are never begun by punctuation.
    pub fn is_keyword(&self) -> bool {
        self.text.ends_with(' ')
    }
}

/// A matching pair of bracket characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketPair {
    /// Opening character, e.g. `(`.
    pub opening: char,
    /// Closing character, e.g. `)`.
    pub closing: char,
}

impl BracketPair {
    /// Create a bracket pair.
    pub const fn new(opening: char, closing: char) -> Self {
        Self { opening, closing }
    }
}

/// Characters a slot refuses to accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharFilter {
    /// Exactly the listed characters are rejected.
    Listed(Vec<char>),
    /// Only identifier characters, whitespace and the grammar's own punctuation are accepted.
    IdentifierOnly,
}

impl Default for CharFilter {
    fn default() -> Self {
        Self::Listed(Vec::new())
    }
}

/// Classification data for one flavour of structured slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarProfile {
    /// Human readable flavour name (used in logs).
    pub name: String,
    /// Valid operators.
    pub operators: Vec<OperatorSpec>,
    /// Bracket pairs, in no particular order.
    pub brackets: Vec<BracketPair>,
    /// Characters that start and end a string literal.
    pub quotes: Vec<char>,
    /// Rejected characters.
    pub disallowed: CharFilter,
    /// Whether `1.5`, `1e-3`, `0x1p+4` and friends are kept as one field.
    pub float_literals: bool,
    /// Function called for ranges in generated code.
    pub range_helper: String,
}

impl GrammarProfile {
    /// The expression flavour.
    pub fn expression() -> Self {
        let binary: [(&str, i32); 22] = [
            ("->", 1),
            ("..", 2),
            ("||", 3),
            ("&&", 4),
            ("|", 5),
            ("^", 6),
            ("&", 7),
            ("==", 8),
            ("!=", 8),
            ("<", 9),
            ("<=", 9),
            (">", 9),
            (">=", 9),
            ("<:", 9),
            ("<<", 10),
            (">>", 10),
            (">>>", 10),
            ("*", 12),
            ("/", 12),
            ("%", 12),
            ("::", 14),
            (".", 15),
        ];
        let mut operators: Vec<OperatorSpec> = binary
            .iter()
            .map(|(text, prec)| OperatorSpec::binary(*text, *prec))
            .collect();
        operators.push(OperatorSpec::prefix("+", 11));
        operators.push(OperatorSpec::prefix("-", 11));
        operators.push(OperatorSpec::prefix("~", UNARY_PRECEDENCE));
        operators.push(OperatorSpec::prefix("!", UNARY_PRECEDENCE));
        operators.push(OperatorSpec::prefix("new ", UNARY_PRECEDENCE));
        operators.push(OperatorSpec::binary(",", 0));

        Self {
            name: "expression".to_string(),
            operators,
            brackets: vec![
                BracketPair::new('(', ')'),
                BracketPair::new('[', ']'),
                BracketPair::new('{', '}'),
            ],
            quotes: vec!['"', '\''],
            disallowed: CharFilter::Listed(vec![';']),
            float_literals: true,
            range_helper: DEFAULT_RANGE_HELPER.to_string(),
        }
    }

    /// The type-name flavour.
    pub fn type_name() -> Self {
        Self {
            name: "type".to_string(),
            operators: vec![OperatorSpec::binary(".", 15), OperatorSpec::binary(",", 0)],
            brackets: vec![BracketPair::new('<', '>'), BracketPair::new('[', ']')],
            quotes: Vec::new(),
            disallowed: CharFilter::IdentifierOnly,
            float_literals: false,
            range_helper: DEFAULT_RANGE_HELPER.to_string(),
        }
    }

    /// Replace the range helper name.
    pub fn with_range_helper(mut self, helper: impl Into<String>) -> Self {
        self.range_helper = helper.into();
        self
    }

    fn spec(&self, text: &str) -> Option<&OperatorSpec> {
        self.operators.iter().find(|op| op.text == text)
    }

    /// Returns `true` if `text` is a complete operator.
    pub fn is_operator(&self, text: &str) -> bool {
        self.spec(text).is_some()
    }

    /// Returns `true` if `text` may be used with an empty left operand.
    pub fn can_be_unary(&self, text: &str) -> bool {
        self.spec(text).is_some_and(|op| op.unary)
    }

    /// Returns `true` if `c` is the first character of some punctuation operator.
    ///
    /// `=` begins an operator (`==`) even though `=` alone is not one.
    pub fn begins_operator(&self, c: char) -> bool {
        self.operators
            .iter()
            .filter(|op| !op.is_keyword())
            .any(|op| op.text.starts_with(c))
    }

    /// The keyword operator spelled `word` followed by a space, if the grammar has one.
    pub fn keyword_operator(&self, word: &str) -> Option<&str> {
        self.operators
            .iter()
            .filter(|op| op.is_keyword())
            .find(|op| op.text.strip_suffix(' ') == Some(word))
            .map(|op| op.text.as_str())
    }

    /// Returns `true` if `c` opens a bracket.
    pub fn is_opening_bracket(&self, c: char) -> bool {
        self.brackets.iter().any(|b| b.opening == c)
    }

    /// Returns `true` if `c` closes a bracket.
    pub fn is_closing_bracket(&self, c: char) -> bool {
        self.brackets.iter().any(|b| b.closing == c)
    }

    /// Closing character matching `opening`.
    pub fn closing_for(&self, opening: char) -> Option<char> {
        self.brackets
            .iter()
            .find(|b| b.opening == opening)
            .map(|b| b.closing)
    }

    /// Returns `true` if `c` delimits string literals.
    pub fn is_quote(&self, c: char) -> bool {
        self.quotes.contains(&c)
    }

    /// Returns `true` if `c` may never be typed into a plain field.
    pub fn is_disallowed(&self, c: char) -> bool {
        match &self.disallowed {
            CharFilter::Listed(chars) => chars.contains(&c),
            CharFilter::IdentifierOnly => {
                let allowed = c.is_alphanumeric()
                    || c == '_'
                    || c == '$'
                    || c.is_whitespace()
                    || self.begins_operator(c)
                    || self.is_opening_bracket(c)
                    || self.is_closing_bracket(c);
                !allowed
            }
        }
    }

    /// Returns `true` if floating-point literal reconciliation is enabled.
    pub fn supports_float_literals(&self) -> bool {
        self.float_literals
    }

    /// Binding strength of `text`; higher binds tighter, unknown operators get `0`.
    pub fn precedence(&self, text: &str, unary: bool) -> i32 {
        match self.spec(text) {
            Some(op) if unary && op.unary => UNARY_PRECEDENCE,
            Some(op) => op.precedence,
            None => 0,
        }
    }
}

impl Default for GrammarProfile {
    fn default() -> Self {
        Self::expression()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_operator_classification() {
        let g = GrammarProfile::expression();
        for op in [">>>", "<:", "..", "::", "->", "new ", "!="] {
            assert!(g.is_operator(op), "{op}");
        }
        assert!(!g.is_operator("="));
        assert!(!g.is_operator(":"));
        assert!(g.begins_operator('='));
        assert!(g.begins_operator(':'));
        assert!(!g.begins_operator('n'));
        assert!(g.can_be_unary("-"));
        assert!(!g.can_be_unary("*"));
        assert_eq!(g.keyword_operator("new"), Some("new "));
        assert_eq!(g.keyword_operator("ne"), None);
    }

    #[test]
    fn test_type_profile_filters_non_identifier_chars() {
        let g = GrammarProfile::type_name();
        assert!(g.is_disallowed('+'));
        assert!(g.is_disallowed('"'));
        assert!(!g.is_disallowed('<'));
        assert!(!g.is_disallowed('x'));
        assert!(!g.is_disallowed(','));
        assert!(!g.can_be_unary("."));
        assert!(!g.supports_float_literals());
        assert_eq!(g.closing_for('<'), Some('>'));
    }

    #[test]
    fn test_unary_precedence_only_for_unary_capable_operators() {
        let g = GrammarProfile::expression();
        assert_eq!(g.precedence("-", true), UNARY_PRECEDENCE);
        assert_eq!(g.precedence("-", false), 11);
        assert_eq!(g.precedence("*", true), 12);
        assert_eq!(g.precedence("=", false), 0);
    }
}
