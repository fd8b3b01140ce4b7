//! Errors reported to callers of the slot façade.

use thiserror::Error;

use crate::caret::CaretPos;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Caller errors reported by the [`Slot`](crate::Slot) façade.
///
/// Malformed keystrokes are not errors: they are ignored and the caret stays put.
pub enum SlotError {
    #[error("caret position {0} does not address this slot")]
    /// A caret path that does not lead to a leaf of the tree.
    InvalidPosition(CaretPos),

    #[error("selection from {anchor} to {caret} crosses a compound")]
    /// Selection endpoints that do not share a level, or leave a string literal.
    InvalidSelection {
        /// Fixed end of the selection.
        anchor: CaretPos,
        /// Moving end of the selection.
        caret: CaretPos,
    },

    #[error("string offset {0} is outside the slot text")]
    /// A string offset that maps to no caret position.
    UnmappedOffset(usize),

    #[error("parameter hint requested at {requested} but the caret has moved to {current}")]
    /// A hint result arrived after the caret moved on.
    StaleHint {
        /// Caret when the hint was requested.
        requested: CaretPos,
        /// Caret when the result arrived.
        current: CaretPos,
    },
}

/// Result alias for slot operations.
pub type SlotResult<T> = Result<T, SlotError>;
