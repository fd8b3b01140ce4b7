//! Modification transactions.
//!
//! Every structural mutation of a slot tree takes a [`ModificationToken`]. Tokens cannot be
//! constructed directly: a [`Slot`](crate::Slot) mints one for the extent of
//! [`Slot::modification`](crate::Slot::modification), and trees that are not owned by a slot
//! can use [`ModificationToken::standalone`]. Holding a token is therefore proof that the caller
//! is inside a transaction whose completion will fire the change notifications.
//!
//! Transactions nest: only the outermost one settles the tree, notifies subscribers and runs the
//! actions queued with [`Slot::after_current_modification`](crate::Slot::after_current_modification).

use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::slot::Slot;

/// Identity of a [`Slot`], used to check that a token belongs to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(u64);

impl SlotId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Capability required by every mutating primitive.
#[derive(Debug)]
pub struct ModificationToken {
    owner: Option<SlotId>,
    completion_requested: Cell<bool>,
}

impl ModificationToken {
    pub(crate) fn for_slot(owner: SlotId) -> Self {
        Self {
            owner: Some(owner),
            completion_requested: Cell::new(false),
        }
    }

    /// Run `f` with a token that is not tied to any slot.
    ///
    /// Intended for building and editing free-standing [`Infix`](crate::Infix) trees (tests,
    /// batch conversions). No notifications are fired for such edits.
    pub fn standalone<T>(f: impl FnOnce(&ModificationToken) -> T) -> T {
        let token = Self {
            owner: None,
            completion_requested: Cell::new(false),
        };
        f(&token)
    }

    /// Slot that minted this token (`None` for standalone tokens).
    pub fn owner(&self) -> Option<SlotId> {
        self.owner
    }

    pub(crate) fn request_completion(&self) {
        self.completion_requested.set(true);
    }

    pub(crate) fn take_completion_request(&self) -> bool {
        self.completion_requested.replace(false)
    }
}

/// Deferred action run after the outermost transaction completes.
pub type AfterAction = Box<dyn FnOnce(&mut Slot)>;

/// Nesting depth and queued after-actions of one slot.
#[derive(Default)]
pub(crate) struct TransactionState {
    depth: usize,
    after: VecDeque<AfterAction>,
}

impl TransactionState {
    /// Enter a transaction; returns `true` if it is the outermost one.
    pub(crate) fn enter(&mut self) -> bool {
        self.depth += 1;
        self.depth == 1
    }

    /// Leave a transaction; returns `true` if the outermost one just finished.
    pub(crate) fn exit(&mut self) -> bool {
        assert!(self.depth > 0, "transaction exit without matching enter");
        self.depth -= 1;
        self.depth == 0
    }

    pub(crate) fn in_progress(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn queue(&mut self, action: AfterAction) {
        self.after.push_back(action);
    }

    pub(crate) fn take_queued(&mut self) -> VecDeque<AfterAction> {
        std::mem::take(&mut self.after)
    }
}

impl std::fmt::Debug for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionState")
            .field("depth", &self.depth)
            .field("queued", &self.after.len())
            .finish()
    }
}
