#![warn(missing_docs)]
//! Slot Core - Headless Structured-Expression Editing Engine
//!
//! # Overview
//!
//! `slot-core` edits expressions as typed trees instead of flat text. An expression is an
//! [`Infix`]: an alternating sequence of components (plain text fields, string literals and
//! bracketed sub-expressions) and joints (operators, or boundaries around compounds). Every
//! keystroke is interpreted against the grammar of the slot: operators split fields, opening
//! brackets and quotes create compounds, digits and dots form float literals, and the tree is
//! kept canonical after every change.
//!
//! Rendering is left to the caller. The engine exposes the tree, caret paths ([`CaretPos`]), a
//! cell-width column model for mouse addressing, and change notifications.
//!
//! # Core Features
//!
//! - **Structured typing**: operator recognition, bracket and quote pairing, float literals
//! - **Canonical trees**: empty fields around compounds, merged operators, flattened brackets
//! - **Two projections**: round-trippable source text and generated code, with caret mapping
//! - **Transactions**: nested modifications, one settle pass and one notification burst each
//! - **Grammar profiles**: expression and type-name flavours from `slot-core-lang`
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Slot (caret, selection, notifications)     │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Transactions (ModificationToken)           │  ← Mutation control
//! ├─────────────────────────────────────────────┤
//! │  Infix (insert, delete, navigate, project)  │  ← Core algorithms
//! ├─────────────────────────────────────────────┤
//! │  Components (fields, literals, brackets)    │  ← Tree nodes
//! ├─────────────────────────────────────────────┤
//! │  GrammarProfile (slot-core-lang)            │  ← Classification data
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Using a Slot
//!
//! ```rust
//! use slot_core::{CaretPos, Slot, SlotConfig};
//!
//! let mut slot = Slot::new(SlotConfig::expression());
//! slot.insert_text("getX(1,2)*3");
//!
//! assert_eq!(slot.text(), "getX(1,2)*3");
//! assert_eq!(slot.generated_code(), "getX(1, 2) * 3");
//! assert_eq!(slot.caret(), &CaretPos::path(&[3, 1]));
//! ```
//!
//! ## Using a free-standing Infix
//!
//! ```rust
//! use std::sync::Arc;
//! use slot_core::{GrammarProfile, Infix, ModificationToken};
//!
//! let mut infix = Infix::new(Arc::new(GrammarProfile::expression()));
//! ModificationToken::standalone(|token| {
//!     let caret = infix.insert(&infix.start_pos(), "a+\"b\"", None, false, token);
//!     assert_eq!(infix.render_state(Some(&caret)), "{a}+{}_\"b\"_{$}");
//! });
//! ```
//!
//! # Module Description
//!
//! - [`caret`] - Caret paths into the tree
//! - [`operator`] - Operators, joints and the precedence pass
//! - [`field`], [`literal`], [`bracket`], [`component`] - Tree nodes
//! - [`infix`] - The core editing algorithms
//! - [`transaction`] - Modification tokens
//! - [`slot`] - The slot façade and change notifications
//! - [`error`] - Caller errors

pub mod bracket;
pub mod caret;
pub mod component;
pub mod error;
pub mod field;
pub mod infix;
pub mod literal;
pub mod operator;
pub mod slot;
mod text;
pub mod transaction;

pub use bracket::BracketedGroup;
pub use caret::{CaretIndex, CaretPos};
pub use component::Component;
pub use error::{SlotError, SlotResult};
pub use field::TextField;
pub use infix::{
    CaretPosMap, Infix, PlainVarUse, Projection, RangeType, SelectionMove, SplitInfo,
};
pub use literal::{EscapeStatus, StringLiteral};
pub use operator::{Joint, OpPrec, Operator, Precedence};
pub use slot::{
    FocusInfo, FocusRequest, ParamHintRequest, Slot, SlotChange, SlotChangeCallback,
    SlotChangeType, SlotConfig,
};
pub use slot_core_lang::GrammarProfile;
pub use transaction::{AfterAction, ModificationToken, SlotId};
