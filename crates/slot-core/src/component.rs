//! Components that can occupy a field position of an [`Infix`].

use crate::bracket::BracketedGroup;
use crate::caret::CaretPos;
use crate::field::TextField;
use crate::infix::{CaretPosMap, Infix, Projection};
use crate::literal::StringLiteral;
use crate::text;

/// A field position of an infix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    /// Plain editable text.
    Field(TextField),
    /// A quoted literal.
    Literal(StringLiteral),
    /// A bracket pair with nested content.
    Bracket(BracketedGroup),
}

impl Component {
    /// The plain field, if this is one.
    pub fn as_field(&self) -> Option<&TextField> {
        match self {
            Self::Field(f) => Some(f),
            _ => None,
        }
    }

    /// The literal, if this is one.
    pub fn as_literal(&self) -> Option<&StringLiteral> {
        match self {
            Self::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// The bracket group, if this is one.
    pub fn as_bracket(&self) -> Option<&BracketedGroup> {
        match self {
            Self::Bracket(b) => Some(b),
            _ => None,
        }
    }

    /// Nested content of a bracket group.
    pub fn content(&self) -> Option<&Infix> {
        self.as_bracket().map(BracketedGroup::content)
    }

    /// Brackets and literals are compounds; they are always flanked by boundaries.
    pub fn is_compound(&self) -> bool {
        !matches!(self, Self::Field(_))
    }

    /// Returns `true` for an empty plain field.
    pub fn is_field_and_empty(&self) -> bool {
        matches!(self, Self::Field(f) if f.is_empty())
    }

    /// Returns `true` for a plain field holding only digits.
    pub fn is_numeric_literal(&self) -> bool {
        matches!(self, Self::Field(f) if f.is_numeric_literal())
    }

    /// Returns `true` if all text inside is whitespace; structure is allowed.
    pub fn is_almost_blank(&self) -> bool {
        match self {
            Self::Field(f) => f.text().trim().is_empty(),
            Self::Literal(l) => l.text().trim().is_empty(),
            Self::Bracket(b) => b.content().is_almost_blank(),
        }
    }

    /// Rough count of keystrokes needed to produce this component.
    pub fn calculate_effort(&self) -> usize {
        match self {
            Self::Field(f) => f.len(),
            Self::Literal(l) => l.field().len() + 1,
            Self::Bracket(b) => b.content().calculate_effort() + 1,
        }
    }

    /// Character length of a leaf component's text (`0` for brackets).
    pub(crate) fn text_len(&self) -> usize {
        match self {
            Self::Field(f) => f.len(),
            Self::Literal(l) => l.field().len(),
            Self::Bracket(_) => 0,
        }
    }

    /// First caret position inside the component.
    pub fn start_pos(&self) -> CaretPos {
        match self {
            Self::Bracket(b) => b.content().start_pos(),
            _ => CaretPos::leaf(0),
        }
    }

    /// Last caret position inside the component.
    pub fn end_pos(&self) -> CaretPos {
        match self {
            Self::Bracket(b) => b.content().end_pos(),
            other => CaretPos::leaf(other.text_len()),
        }
    }

    /// Source text between two positions.
    ///
    /// With no bounds at all, compounds include their delimiters; with any bound, only the
    /// inner text is copied.
    pub fn copy_text(&self, from: Option<&CaretPos>, to: Option<&CaretPos>) -> String {
        let offset = |p: Option<&CaretPos>| p.and_then(CaretPos::slot);
        match self {
            Self::Field(f) => f.slice(offset(from), offset(to)).to_string(),
            Self::Literal(l) if from.is_none() && to.is_none() => l.quoted(),
            Self::Literal(l) => l.field().slice(offset(from), offset(to)).to_string(),
            Self::Bracket(b) if from.is_none() && to.is_none() => {
                format!(
                    "{}{}{}",
                    b.opening(),
                    b.content().copy_text(None, None),
                    b.closing()
                )
            }
            Self::Bracket(b) => b.content().copy_text(from, to),
        }
    }

    /// Generated code.
    pub fn java_code(&self) -> String {
        match self {
            Self::Field(f) => f.text().to_string(),
            Self::Literal(l) => l.quoted(),
            Self::Bracket(b) => format!("{}{}{}", b.opening(), b.content().java_code(), b.closing()),
        }
    }

    /// Width in cells of the copy text, used for column addressing.
    pub(crate) fn width(&self) -> usize {
        match self {
            Self::Field(f) => f.width(),
            Self::Literal(l) => l.field().width() + 2,
            Self::Bracket(b) => b.content().width() + 2,
        }
    }

    pub(crate) fn map_positions(
        &self,
        counter: &mut usize,
        projection: Projection,
        out: &mut Vec<CaretPosMap>,
    ) {
        match self {
            Self::Field(f) => {
                out.push(CaretPosMap::leaf(*counter, *counter + f.len()));
                *counter += f.len();
            }
            Self::Literal(l) => {
                *counter += 1;
                let len = l.field().len();
                out.push(CaretPosMap::leaf(*counter, *counter + len));
                *counter += len + 1;
            }
            Self::Bracket(b) => {
                *counter += 1;
                out.extend(b.content().map_positions(counter, projection));
                *counter += 1;
            }
        }
    }

    pub(crate) fn render_state(&self, caret: Option<&CaretPos>) -> String {
        let with_caret = |s: &str| match caret.and_then(CaretPos::slot) {
            Some(offset) => {
                let (before, after) = text::split_at_char(s, offset);
                format!("{before}${after}")
            }
            None => s.to_string(),
        };
        match self {
            Self::Field(f) => format!("{{{}}}", with_caret(f.text())),
            Self::Literal(l) => format!("{q}{}{q}", with_caret(l.text()), q = l.quote()),
            Self::Bracket(b) => format!(
                "{}{}{}",
                b.opening(),
                b.content().render_state(caret),
                b.closing()
            ),
        }
    }

    /// Position to land on when a selection is extended into this component, or `None` if
    /// selections may not enter it.
    pub(crate) fn select_into_pos(&self, at_end: bool) -> Option<CaretPos> {
        match self {
            Self::Field(f) => Some(CaretPos::leaf(if at_end { f.len() } else { 0 })),
            _ => None,
        }
    }
}
