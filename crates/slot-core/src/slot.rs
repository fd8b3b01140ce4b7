//! The slot façade: one editable expression with its caret, selection and subscribers.
//!
//! # Overview
//!
//! A [`Slot`] owns the top-level [`Infix`] of an expression together with everything a frontend
//! needs around it:
//!
//! - the caret and an optional selection anchor (both [`CaretPos`] paths);
//! - a text mirror of the round-trippable source, kept in sync at the end of every transaction;
//! - a version counter bumped whenever the text changes;
//! - change subscribers notified with [`SlotChange`] records.
//!
//! All mutation goes through [`Slot::modification`]. Transactions nest, and only the outermost
//! one settles the tree and fires notifications, in a fixed order:
//!
//! 1. `ContentChanged` (only if the text differs from the mirror, carrying the new text);
//! 2. `StructureChanged` (if components were added or removed);
//! 3. `FocusMoved` (if the caret tried to leave the slot);
//! 4. `CompletionRequested` (if a keystroke asked for it while suggestions are showing).
//!
//! Actions queued with [`Slot::after_current_modification`] run afterwards, in queue order.
//!
//! # Example
//!
//! ```rust
//! use slot_core::{Slot, SlotChangeType, SlotConfig};
//! use std::sync::{Arc, Mutex};
//!
//! let mut slot = Slot::new(SlotConfig::expression());
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! slot.subscribe(move |change| sink.lock().unwrap().push(change.change_type));
//!
//! slot.insert_text("a+b");
//! assert_eq!(slot.text(), "a+b");
//! assert_eq!(slot.generated_code(), "a + b");
//! assert!(seen.lock().unwrap().contains(&SlotChangeType::ContentChanged));
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use slot_core_lang::GrammarProfile;
use tracing::{debug, trace, warn};

use crate::caret::CaretPos;
use crate::component::Component;
use crate::error::{SlotError, SlotResult};
use crate::infix::{Infix, PlainVarUse, Projection, RangeType, SelectionMove};
use crate::transaction::{ModificationToken, SlotId, TransactionState};

/// Construction parameters of a [`Slot`].
#[derive(Debug, Clone)]
pub struct SlotConfig {
    /// Classification data of the flavour edited in the slot.
    pub grammar: Arc<GrammarProfile>,
    /// Whether blank leading or trailing fields may be collapsed when rendering.
    pub collapsible: bool,
    /// Prompt shown in the slot's sole field while it holds a single field.
    pub simple_prompt: Option<String>,
    /// Characters that leave the slot when typed at its top level.
    pub closing_chars: Vec<char>,
}

impl SlotConfig {
    /// Expression flavour with default settings.
    pub fn expression() -> Self {
        Self::for_grammar(GrammarProfile::expression())
    }

    /// Type-name flavour with default settings.
    pub fn type_name() -> Self {
        Self::for_grammar(GrammarProfile::type_name())
    }

    fn for_grammar(grammar: GrammarProfile) -> Self {
        Self {
            grammar: Arc::new(grammar),
            collapsible: false,
            simple_prompt: None,
            closing_chars: Vec::new(),
        }
    }

    /// Replace the grammar profile.
    pub fn with_grammar(mut self, grammar: Arc<GrammarProfile>) -> Self {
        self.grammar = grammar;
        self
    }

    /// Set whether blank edge fields may collapse.
    pub fn with_collapsible(mut self, collapsible: bool) -> Self {
        self.collapsible = collapsible;
        self
    }

    /// Set the prompt shown while the slot holds a single field.
    pub fn with_simple_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.simple_prompt = Some(prompt.into());
        self
    }

    /// Set the characters that leave the slot when typed at its top level.
    pub fn with_closing_chars(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.closing_chars = chars.into_iter().collect();
        self
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self::expression()
    }
}

/// Kind of a [`SlotChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotChangeType {
    /// The round-trippable text changed.
    ContentChanged,
    /// Components were added or removed.
    StructureChanged,
    /// The caret tried to leave the slot; see [`SlotChange::focus`].
    FocusMoved,
    /// Code completion should be offered at [`SlotChange::caret`].
    CompletionRequested,
}

/// Where the caret wanted to go when it left the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusRequest {
    /// Backspace at the very start.
    BackspaceAtStart,
    /// Delete at the very end.
    DeleteAtEnd,
    /// Moved left past the start.
    Previous,
    /// Moved right past the end, or typed a closing char at the top level.
    Next,
}

/// A change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotChange {
    /// Change type
    pub change_type: SlotChangeType,
    /// Version before the transaction
    pub old_version: u64,
    /// Version after the transaction
    pub new_version: u64,
    /// New copy text, for content changes
    pub text: Option<String>,
    /// Requested focus movement, for focus changes
    pub focus: Option<FocusRequest>,
    /// Caret at which to complete, for completion requests
    pub caret: Option<CaretPos>,
}

impl SlotChange {
    /// Create a change record with no payload.
    pub fn new(change_type: SlotChangeType, old_version: u64, new_version: u64) -> Self {
        Self {
            change_type,
            old_version,
            new_version,
            text: None,
            focus: None,
            caret: None,
        }
    }

    /// Attach the post-transaction copy text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attach a focus request.
    pub fn with_focus(mut self, focus: FocusRequest) -> Self {
        self.focus = Some(focus);
        self
    }

    /// Attach a caret position.
    pub fn with_caret(mut self, caret: CaretPos) -> Self {
        self.caret = Some(caret);
        self
    }
}

/// Change notification callback.
pub type SlotChangeCallback = Box<dyn FnMut(&SlotChange) + Send>;

/// Caret and selection saved by [`Slot::focus_info`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusInfo {
    /// Caret position.
    pub caret: CaretPos,
    /// Selection anchor, if a selection was active.
    pub anchor: Option<CaretPos>,
}

/// Pending request for parameter names of the call around the caret.
///
/// Looking the names up may take a while; the result is applied with
/// [`Slot::apply_param_hints`], which discards it if the caret has moved meanwhile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamHintRequest {
    /// Caret when the request was made.
    pub caret: CaretPos,
    /// Path of bracket indices to the argument list.
    pub call: Vec<usize>,
    /// Text of the field naming the method.
    pub method: String,
}

impl ParamHintRequest {
    /// Check that the caret of `slot` is still where it was when the request was made.
    pub fn check(&self, slot: &Slot) -> SlotResult<()> {
        if slot.caret == self.caret {
            Ok(())
        } else {
            Err(SlotError::StaleHint {
                requested: self.caret.clone(),
                current: slot.caret.clone(),
            })
        }
    }
}

/// One editable expression.
pub struct Slot {
    id: SlotId,
    config: SlotConfig,
    infix: Infix,
    caret: CaretPos,
    anchor: Option<CaretPos>,
    text: String,
    version: u64,
    callbacks: Vec<SlotChangeCallback>,
    transaction: TransactionState,
    pending_focus: Option<FocusRequest>,
    completion_requested: bool,
    showing_suggestions: bool,
}

impl Slot {
    /// Create an empty slot.
    pub fn new(config: SlotConfig) -> Self {
        let infix = Infix::new(Arc::clone(&config.grammar))
            .with_closing_chars(config.closing_chars.iter().copied());
        let caret = infix.start_pos();
        let mut slot = Self {
            id: SlotId::next(),
            config,
            infix,
            caret,
            anchor: None,
            text: String::new(),
            version: 0,
            callbacks: Vec::new(),
            transaction: TransactionState::default(),
            pending_focus: None,
            completion_requested: false,
            showing_suggestions: false,
        };
        slot.apply_simple_prompt();
        slot
    }

    /// Create a slot holding `text`, with the caret at the start.
    pub fn with_text(config: SlotConfig, text: &str) -> Self {
        let mut slot = Self::new(config);
        slot.set_text(text);
        slot.caret = slot.infix.start_pos();
        slot
    }

    /// Identity of this slot.
    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Configuration the slot was created with.
    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    /// The top-level infix.
    pub fn infix(&self) -> &Infix {
        &self.infix
    }

    /// Mutable access to the top-level infix inside a transaction.
    ///
    /// # Panics
    ///
    /// Panics if `token` was not minted by this slot.
    pub fn infix_mut(&mut self, token: &ModificationToken) -> &mut Infix {
        assert_eq!(
            token.owner(),
            Some(self.id),
            "modification token belongs to another slot"
        );
        &mut self.infix
    }

    // ----- transactions -----

    /// Run `f` inside a transaction.
    ///
    /// Re-entrant: a nested call shares the outer transaction, and settling and notifications
    /// happen once, when the outermost call returns. If `f` panics the transaction is closed
    /// without notifications and its queued actions are dropped.
    pub fn modification<T>(&mut self, f: impl FnOnce(&mut Slot, &ModificationToken) -> T) -> T {
        if self.transaction.enter() {
            trace!(slot = ?self.id, "transaction started");
        }
        let token = ModificationToken::for_slot(self.id);
        let result = match panic::catch_unwind(AssertUnwindSafe(|| f(self, &token))) {
            Ok(result) => result,
            Err(payload) => {
                self.abandon_modification();
                panic::resume_unwind(payload);
            }
        };
        if token.take_completion_request() {
            self.completion_requested = true;
        }
        if self.transaction.exit() {
            self.complete_modification();
        }
        result
    }

    /// Run `action` once the current outermost transaction has completed, or right away if no
    /// transaction is in progress.
    pub fn after_current_modification(&mut self, action: impl FnOnce(&mut Slot) + 'static) {
        if self.transaction.in_progress() {
            self.transaction.queue(Box::new(action));
        } else {
            action(self);
        }
    }

    /// Returns `true` while inside [`Slot::modification`].
    pub fn is_modifying(&self) -> bool {
        self.transaction.in_progress()
    }

    fn abandon_modification(&mut self) {
        if self.transaction.exit() {
            let dropped = self.transaction.take_queued().len();
            warn!(slot = ?self.id, dropped, "transaction unwound");
            self.pending_focus = None;
            self.completion_requested = false;
        }
    }

    fn complete_modification(&mut self) {
        let structure_changed = self.infix.settle();
        self.infix.calculate_precedences();
        self.apply_simple_prompt();

        let old_version = self.version;
        let text = self.infix.copy_text(None, None);
        let content_changed = text != self.text;
        if content_changed {
            self.text = text;
            self.version += 1;
        }
        let new_version = self.version;

        if content_changed {
            let change = SlotChange::new(SlotChangeType::ContentChanged, old_version, new_version)
                .with_text(self.text.clone());
            self.notify_callbacks(&change);
        }
        if structure_changed {
            let change = SlotChange::new(SlotChangeType::StructureChanged, old_version, new_version);
            self.notify_callbacks(&change);
        }
        if let Some(focus) = self.pending_focus.take() {
            let change = SlotChange::new(SlotChangeType::FocusMoved, old_version, new_version)
                .with_focus(focus);
            self.notify_callbacks(&change);
        }
        if std::mem::take(&mut self.completion_requested) && self.showing_suggestions {
            let change =
                SlotChange::new(SlotChangeType::CompletionRequested, old_version, new_version)
                    .with_caret(self.caret.clone());
            self.notify_callbacks(&change);
        }
        debug!(
            slot = ?self.id,
            content_changed,
            structure_changed,
            version = new_version,
            "transaction completed"
        );

        for action in self.transaction.take_queued() {
            action(self);
        }
    }

    fn apply_simple_prompt(&mut self) {
        let Some(prompt) = self.config.simple_prompt.clone() else {
            return;
        };
        if self.infix.fields().len() == 1 {
            if let Some(field) = self.infix.plain_field_mut(0) {
                field.set_prompt(prompt);
            }
        }
    }

    // ----- subscriptions -----

    /// Subscribe to change notifications.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SlotChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Current version; bumped whenever the text changes.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Check if the text has changed since a version.
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.version > version
    }

    fn notify_callbacks(&mut self, change: &SlotChange) {
        for callback in &mut self.callbacks {
            callback(change);
        }
    }

    // ----- text -----

    /// Round-trippable source text as of the last completed transaction.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the whole content with `text`, leaving the caret at its end.
    pub fn set_text(&mut self, text: &str) {
        self.modification(|slot, token| {
            slot.infix.blank(token);
            let start = slot.infix.start_pos();
            let end = slot.infix.insert(&start, text, None, false, token);
            slot.caret = if end.is_escape_next() { start } else { end.normalise() };
            slot.anchor = None;
        });
    }

    /// Generated code for the current content.
    pub fn generated_code(&self) -> String {
        self.infix.java_code()
    }

    /// Returns `true` if the slot is blank apart from empty fields and boundaries.
    pub fn is_almost_blank(&self) -> bool {
        self.infix.is_almost_blank()
    }

    // ----- caret and selection -----

    /// Current caret.
    pub fn caret(&self) -> &CaretPos {
        &self.caret
    }

    /// Selection anchor, if a selection is active.
    pub fn anchor(&self) -> Option<&CaretPos> {
        self.anchor.as_ref()
    }

    /// Move the caret to `pos`, dropping any selection.
    pub fn set_caret(&mut self, pos: CaretPos) -> SlotResult<()> {
        if !self.infix.is_valid_position(&pos) {
            return Err(SlotError::InvalidPosition(pos));
        }
        self.caret = pos;
        self.anchor = None;
        Ok(())
    }

    /// Select from `anchor` to `caret`.
    pub fn set_selection(&mut self, anchor: CaretPos, caret: CaretPos) -> SlotResult<()> {
        for pos in [&anchor, &caret] {
            if !self.infix.is_valid_position(pos) {
                return Err(SlotError::InvalidPosition(pos.clone()));
            }
        }
        if !self.infix.is_valid_selection(&anchor, &caret) {
            return Err(SlotError::InvalidSelection { anchor, caret });
        }
        self.anchor = (anchor != caret).then_some(anchor);
        self.caret = caret;
        Ok(())
    }

    /// Drop the selection, keeping the caret.
    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Ordered selection endpoints `(start, end)`, if a non-empty selection is active.
    pub fn selection(&self) -> Option<(CaretPos, CaretPos)> {
        let anchor = self.anchor.as_ref().filter(|a| **a != self.caret)?;
        if anchor.before(&self.caret) {
            Some((anchor.clone(), self.caret.clone()))
        } else {
            Some((self.caret.clone(), anchor.clone()))
        }
    }

    /// Returns `true` if a non-empty selection is active.
    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    /// Save the caret and selection.
    pub fn focus_info(&self) -> FocusInfo {
        FocusInfo {
            caret: self.caret.clone(),
            anchor: self.anchor.clone(),
        }
    }

    /// Restore a caret and selection saved by [`Slot::focus_info`].
    pub fn recall_focus(&mut self, info: FocusInfo) -> SlotResult<()> {
        match info.anchor {
            Some(anchor) => self.set_selection(anchor, info.caret),
            None => self.set_caret(info.caret),
        }
    }

    // ----- editing -----

    /// Type `text` at the caret, replacing or wrapping the selection.
    ///
    /// Typing a closing char at the top level moves focus out instead.
    pub fn insert_text(&mut self, text: &str) {
        self.insert_with(text, true);
    }

    /// Insert `text` as a block, without keystroke-triggered completion.
    pub fn paste(&mut self, text: &str) {
        self.insert_with(text, false);
    }

    fn insert_with(&mut self, text: &str, user: bool) {
        self.modification(|slot, token| {
            let anchor = slot.anchor.take();
            let pos = slot
                .infix
                .insert(&slot.caret, text, anchor.as_ref(), user, token);
            if pos.is_escape_next() {
                slot.pending_focus = Some(FocusRequest::Next);
            } else {
                slot.caret = pos.normalise();
            }
        });
    }

    /// Delete the selection, or the character before the caret.
    pub fn backspace(&mut self) {
        if self.delete_selection() {
            return;
        }
        self.modification(|slot, token| {
            let pos = slot.infix.delete_previous(&slot.caret, token);
            if pos.is_escape_parent() {
                slot.pending_focus = Some(FocusRequest::BackspaceAtStart);
            } else {
                slot.caret = pos.normalise();
            }
        });
    }

    /// Delete the selection, or the character after the caret.
    pub fn delete_forward(&mut self) {
        if self.delete_selection() {
            return;
        }
        self.modification(|slot, token| {
            let pos = slot.infix.delete_next(&slot.caret, token);
            if pos.is_escape_parent() {
                slot.pending_focus = Some(FocusRequest::DeleteAtEnd);
            } else {
                slot.caret = pos.normalise();
            }
        });
    }

    /// Delete the selection; returns `false` if there was none.
    pub fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection() else {
            return false;
        };
        self.modification(|slot, token| {
            let pos = slot.infix.delete_selection(&start, &end, token);
            slot.caret = pos.normalise();
            slot.anchor = None;
        });
        true
    }

    /// Source text of the selection.
    pub fn copy(&self) -> Option<String> {
        let (start, end) = self.selection()?;
        Some(self.infix.copy_text(Some(&start), Some(&end)))
    }

    /// Copy and delete the selection.
    pub fn cut(&mut self) -> Option<String> {
        let text = self.copy()?;
        self.delete_selection();
        Some(text)
    }

    // ----- navigation -----

    /// Move the caret one character left.
    pub fn move_left(&mut self) {
        let pos = self.infix.move_left(&self.caret);
        self.move_to(pos);
    }

    /// Move the caret one character right.
    pub fn move_right(&mut self) {
        let pos = self.infix.move_right(&self.caret);
        self.move_to(pos);
    }

    /// Move the caret to the start of its innermost level.
    pub fn home(&mut self) {
        let pos = self.infix.home(&self.caret);
        self.move_to(pos);
    }

    /// Move the caret to the end of its innermost level.
    pub fn end(&mut self) {
        let pos = self.infix.end(&self.caret);
        self.move_to(pos);
    }

    /// Move the caret to the end of the next word.
    pub fn next_word(&mut self) {
        let pos = self.infix.next_word(&self.caret);
        self.move_to(pos);
    }

    /// Move the caret to the start of the previous word.
    pub fn previous_word(&mut self) {
        let pos = self.infix.previous_word(&self.caret);
        self.move_to(pos);
    }

    fn move_to(&mut self, pos: CaretPos) {
        self.anchor = None;
        let focus = if pos.is_escape_parent() {
            FocusRequest::Previous
        } else if pos.is_escape_next() {
            FocusRequest::Next
        } else {
            self.caret = pos;
            return;
        };
        self.modification(|slot, _| slot.pending_focus = Some(focus));
    }

    /// Move the caret to the position nearest `column` of the rendered text.
    pub fn move_to_column(&mut self, column: usize) {
        let (pos, _) = self.infix.nearest(column, true, None);
        self.caret = pos;
        self.anchor = None;
    }

    /// Extend the selection to the position nearest `column` on the selection's level.
    ///
    /// Starts a selection at the caret if none is active. Returns `false` if nothing moved.
    pub fn select_to_column(&mut self, column: usize) -> bool {
        let anchor = self.anchor.clone().unwrap_or_else(|| self.caret.clone());
        let prefix = self.infix.level_prefix(&anchor);
        let restrict = self.infix.level(&prefix).and_then(|level| {
            let index = anchor.to_path()?.get(prefix.len()).copied()?;
            matches!(level.fields().get(index), Some(Component::Literal(_))).then_some(index)
        });
        let Some((pos, _)) = self.infix.nearest_at_level(&prefix, column, restrict) else {
            return false;
        };
        if pos == self.caret {
            return false;
        }
        self.anchor = Some(anchor);
        self.caret = pos;
        true
    }

    /// Extend the selection one step left.
    pub fn select_left(&mut self) -> bool {
        let step = self.infix.select_left(&self.caret, self.anchor.as_ref());
        self.apply_selection(step)
    }

    /// Extend the selection one step right.
    pub fn select_right(&mut self) -> bool {
        let step = self.infix.select_right(&self.caret, self.anchor.as_ref());
        self.apply_selection(step)
    }

    /// Extend the selection to the end of the next word.
    pub fn select_next_word(&mut self) -> bool {
        let step = self.infix.select_next_word(&self.caret, self.anchor.as_ref());
        self.apply_selection(step)
    }

    /// Extend the selection to the start of the previous word.
    pub fn select_previous_word(&mut self) -> bool {
        let step = self
            .infix
            .select_previous_word(&self.caret, self.anchor.as_ref());
        self.apply_selection(step)
    }

    /// Extend the selection to the start of its level.
    pub fn select_home(&mut self) -> bool {
        let step = self.infix.select_home(&self.caret, self.anchor.as_ref());
        self.apply_selection(step)
    }

    /// Extend the selection to the end of its level.
    pub fn select_end(&mut self) -> bool {
        let step = self.infix.select_end(&self.caret, self.anchor.as_ref());
        self.apply_selection(step)
    }

    /// Select the whole innermost level around the caret.
    pub fn select_all(&mut self) {
        let step = self.infix.select_all(&self.caret);
        self.apply_selection(Some(step));
    }

    fn apply_selection(&mut self, step: Option<SelectionMove>) -> bool {
        let Some(SelectionMove { anchor, caret }) = step else {
            return false;
        };
        self.anchor = (anchor != caret).then_some(anchor);
        self.caret = caret;
        true
    }

    // ----- string mapping -----

    /// Offset of `pos` in the projected string, if `pos` addresses a leaf.
    pub fn caret_to_string_pos(&self, pos: &CaretPos, projection: Projection) -> Option<usize> {
        self.infix.caret_to_string_pos(pos, projection)
    }

    /// Caret position for an offset in the projected string.
    pub fn string_pos_to_caret(&self, pos: usize, projection: Projection) -> SlotResult<CaretPos> {
        self.infix
            .string_pos_to_caret_pos(pos, projection)
            .ok_or(SlotError::UnmappedOffset(pos))
    }

    // ----- queries -----

    /// Whether the blank field at `path` may collapse when rendering.
    ///
    /// `path` addresses the field itself (bracket indices followed by the field index).
    pub fn is_collapsible(&self, path: &[usize]) -> bool {
        let Some((&index, prefix)) = path.split_last() else {
            return false;
        };
        self.infix
            .level(prefix)
            .filter(|level| index < level.fields().len())
            .is_some_and(|level| level.is_collapsible(index, self.config.collapsible))
    }

    /// Whether the whole slot is a range expression.
    pub fn check_range_expression(&self) -> RangeType {
        self.infix.check_range_expression()
    }

    /// Bracket paths to highlight for the current caret.
    pub fn brackets_to_highlight(&self) -> Vec<Vec<usize>> {
        self.infix.brackets_to_highlight(&self.caret)
    }

    /// Uses of `name` as a plain variable.
    pub fn find_plain_var_uses(&self, name: &str) -> Vec<PlainVarUse> {
        self.infix.find_plain_var_uses(name)
    }

    /// Rename every plain use of `old` to `new`; returns the number of renamed uses.
    pub fn rename_variable(&mut self, old: &str, new: &str) -> usize {
        self.modification(|slot, token| slot.infix.rename_plain_var(old, new, token))
    }

    // ----- code completion -----

    /// Whether a suggestion list is currently open.
    pub fn showing_suggestions(&self) -> bool {
        self.showing_suggestions
    }

    /// Tell the slot whether a suggestion list is open; keystrokes only request completion
    /// while it is.
    pub fn set_showing_suggestions(&mut self, showing: bool) {
        self.showing_suggestions = showing;
    }

    /// Replace the field at the caret with the chosen suggestion `name`.
    ///
    /// For methods, `params` lists the parameter names; an argument bracket opened by
    /// `opening` is created or reused and the caret lands on the first argument.
    pub fn insert_suggestion(&mut self, name: &str, opening: char, params: Option<&[String]>) {
        self.showing_suggestions = false;
        self.modification(|slot, token| {
            let pos = slot
                .infix
                .insert_suggestion(&slot.caret, name, opening, params, token);
            if !pos.is_escape_next() {
                slot.caret = pos.normalise();
            }
            slot.anchor = None;
        });
    }

    /// Request parameter names for the innermost method call around the caret.
    pub fn request_param_hints(&self) -> Option<ParamHintRequest> {
        let mut best = None;
        let mut level = &self.infix;
        let mut pos = &self.caret;
        let mut prefix = Vec::new();
        while let (Some(i), Some(sub)) = (pos.slot(), pos.sub()) {
            let Some(content) = level.fields().get(i).and_then(Component::content) else {
                break;
            };
            prefix.push(i);
            if level.is_method_params(i) {
                let method = level.fields()[i - 1]
                    .as_field()
                    .map_or_else(String::new, |f| f.text().to_string());
                best = Some((prefix.clone(), method));
            }
            level = content;
            pos = sub;
        }
        let (call, method) = best?;
        Some(ParamHintRequest {
            caret: self.caret.clone(),
            call,
            method,
        })
    }

    /// Show `names` as prompts on the simple parameters of the requested call.
    ///
    /// Returns `Ok(false)` without changing anything if the caret moved since the request.
    pub fn apply_param_hints(
        &mut self,
        request: &ParamHintRequest,
        names: &[String],
    ) -> SlotResult<bool> {
        if let Err(err) = request.check(self) {
            debug!(%err, method = %request.method, "discarding stale parameter hints");
            return Ok(false);
        }
        let content = self
            .infix
            .level_mut(&request.call)
            .ok_or_else(|| SlotError::InvalidPosition(request.caret.clone()))?;
        let params = content.simple_parameters();
        for (param, name) in params.into_iter().zip(names) {
            if let Some(field) = param.and_then(|index| content.plain_field_mut(index)) {
                field.set_prompt(name.clone());
            }
        }
        Ok(true)
    }
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("id", &self.id)
            .field("text", &self.text)
            .field("caret", &self.caret)
            .field("anchor", &self.anchor)
            .field("version", &self.version)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;

    fn recorder(slot: &mut Slot) -> Arc<Mutex<Vec<SlotChange>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        slot.subscribe(move |change| sink.lock().unwrap().push(change.clone()));
        seen
    }

    fn types(seen: &Arc<Mutex<Vec<SlotChange>>>) -> Vec<SlotChangeType> {
        seen.lock().unwrap().iter().map(|c| c.change_type).collect()
    }

    #[test]
    fn test_typing_updates_text_and_version() {
        let mut slot = Slot::new(SlotConfig::expression());
        let seen = recorder(&mut slot);
        slot.insert_text("a+b");
        assert_eq!(slot.text(), "a+b");
        assert_eq!(slot.version(), 1);
        assert_eq!(slot.caret(), &CaretPos::path(&[1, 1]));
        assert_eq!(
            types(&seen),
            vec![SlotChangeType::ContentChanged, SlotChangeType::StructureChanged]
        );
        assert_eq!(seen.lock().unwrap()[0].text.as_deref(), Some("a+b"));
    }

    #[test]
    fn test_nested_transactions_notify_once() {
        let mut slot = Slot::new(SlotConfig::expression());
        let seen = recorder(&mut slot);
        slot.modification(|slot, _| {
            slot.insert_text("x");
            slot.insert_text("y");
            assert!(slot.is_modifying());
            assert_eq!(slot.text(), "");
        });
        assert_eq!(slot.text(), "xy");
        assert_eq!(types(&seen), vec![SlotChangeType::ContentChanged]);
    }

    #[test]
    fn test_after_actions_run_in_order_after_completion() {
        let mut slot = Slot::new(SlotConfig::expression());
        let order = Arc::new(Mutex::new(Vec::new()));
        let (first, second) = (Arc::clone(&order), Arc::clone(&order));
        slot.modification(|slot, _| {
            slot.after_current_modification(move |s| first.lock().unwrap().push(s.text().to_string()));
            slot.after_current_modification(move |_| second.lock().unwrap().push("second".into()));
            slot.insert_text("q");
        });
        assert_eq!(*order.lock().unwrap(), vec!["q".to_string(), "second".to_string()]);

        let now = Arc::clone(&order);
        slot.after_current_modification(move |_| now.lock().unwrap().push("now".into()));
        assert_eq!(order.lock().unwrap().last().map(String::as_str), Some("now"));
    }

    #[test]
    fn test_unchanged_text_fires_no_content_change() {
        let mut slot = Slot::with_text(SlotConfig::expression(), "ab");
        let seen = recorder(&mut slot);
        slot.modification(|_, _| {});
        assert!(types(&seen).is_empty());
    }

    #[test]
    #[should_panic(expected = "another slot")]
    fn test_foreign_token_panics() {
        let mut a = Slot::new(SlotConfig::expression());
        let mut b = Slot::new(SlotConfig::expression());
        a.modification(|_, token| {
            b.infix_mut(token);
        });
    }

    #[test]
    fn test_panicking_transaction_is_closed() {
        let mut a = Slot::new(SlotConfig::expression());
        let mut b = Slot::new(SlotConfig::expression());
        let seen = recorder(&mut a);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            a.modification(|a, token| {
                a.after_current_modification(|s| s.insert_text("never"));
                b.infix_mut(token);
            })
        }));
        assert!(outcome.is_err());
        assert!(!a.is_modifying());

        a.insert_text("x");
        assert_eq!(a.text(), "x");
        assert_eq!(types(&seen), vec![SlotChangeType::ContentChanged]);
    }

    #[test]
    fn test_backspace_at_start_moves_focus() {
        let mut slot = Slot::with_text(SlotConfig::expression(), "ab");
        let seen = recorder(&mut slot);
        slot.backspace();
        let changes = seen.lock().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type, SlotChangeType::FocusMoved);
        assert_eq!(changes[0].focus, Some(FocusRequest::BackspaceAtStart));
        assert_eq!(slot.caret(), &CaretPos::path(&[0, 0]));
    }

    #[test]
    fn test_closing_char_leaves_slot() {
        let config = SlotConfig::expression().with_closing_chars([')']);
        let mut slot = Slot::new(config);
        let seen = recorder(&mut slot);
        slot.insert_text(")");
        assert_eq!(slot.text(), "");
        assert_eq!(seen.lock().unwrap()[0].focus, Some(FocusRequest::Next));
    }

    #[test]
    fn test_selection_copy_cut() {
        let mut slot = Slot::with_text(SlotConfig::expression(), "ab+cd");
        slot.set_selection(CaretPos::path(&[1, 1]), CaretPos::path(&[0, 1]))
            .unwrap();
        assert_eq!(slot.copy().as_deref(), Some("b+c"));
        assert_eq!(slot.cut().as_deref(), Some("b+c"));
        assert_eq!(slot.text(), "ad");
        assert_eq!(slot.caret(), &CaretPos::path(&[0, 1]));
        assert!(!slot.has_selection());
    }

    #[test]
    fn test_invalid_positions_are_rejected() {
        let mut slot = Slot::with_text(SlotConfig::expression(), "a+\"bc\"");
        assert_eq!(
            slot.set_caret(CaretPos::path(&[9, 0])),
            Err(SlotError::InvalidPosition(CaretPos::path(&[9, 0])))
        );
        let err = slot
            .set_selection(CaretPos::path(&[2, 1]), CaretPos::path(&[0, 0]))
            .unwrap_err();
        assert!(matches!(err, SlotError::InvalidSelection { .. }));
        assert_eq!(
            slot.string_pos_to_caret(40, Projection::Source),
            Err(SlotError::UnmappedOffset(40))
        );
    }

    #[test]
    fn test_focus_info_round_trip() {
        let mut slot = Slot::with_text(SlotConfig::expression(), "abc");
        slot.set_selection(CaretPos::path(&[0, 1]), CaretPos::path(&[0, 3]))
            .unwrap();
        let info = slot.focus_info();
        slot.set_caret(CaretPos::path(&[0, 0])).unwrap();
        slot.recall_focus(info.clone()).unwrap();
        assert_eq!(slot.focus_info(), info);
    }

    #[test]
    fn test_simple_prompt_only_on_single_field() {
        let config = SlotConfig::expression().with_simple_prompt("condition");
        let mut slot = Slot::new(config);
        assert_eq!(slot.infix().fields()[0].as_field().map(|f| f.prompt()), Some("condition"));
        slot.insert_text("a+");
        assert_eq!(slot.infix().fields()[0].as_field().map(|f| f.prompt()), Some(""));
    }

    #[test]
    fn test_completion_requested_only_while_showing_suggestions() {
        let mut slot = Slot::new(SlotConfig::expression());
        let seen = recorder(&mut slot);
        slot.insert_text("a.");
        assert!(!types(&seen).contains(&SlotChangeType::CompletionRequested));

        slot.set_showing_suggestions(true);
        slot.insert_text("b.");
        let changes = seen.lock().unwrap();
        let completion = changes
            .iter()
            .find(|c| c.change_type == SlotChangeType::CompletionRequested)
            .expect("completion requested");
        assert_eq!(completion.caret.as_ref(), Some(slot.caret()));
    }

    #[test]
    fn test_param_hints_apply_and_go_stale() {
        let mut slot = Slot::with_text(SlotConfig::expression(), "move(,)");
        slot.set_caret(CaretPos::path(&[1, 0, 0])).unwrap();
        let request = slot.request_param_hints().expect("inside a call");
        assert_eq!(request.method, "move");
        assert_eq!(request.call, vec![1]);

        let names = vec!["dx".to_string(), "dy".to_string()];
        assert_eq!(slot.apply_param_hints(&request, &names), Ok(true));
        let content = slot.infix().fields()[1].content().expect("bracket");
        assert_eq!(content.fields()[1].as_field().map(|f| f.prompt()), Some("dy"));

        slot.set_caret(CaretPos::path(&[1, 1, 0])).unwrap();
        assert_eq!(slot.apply_param_hints(&request, &names), Ok(false));
    }

    #[test]
    fn test_rename_variable_counts_uses() {
        let mut slot = Slot::with_text(SlotConfig::expression(), "x+x.x");
        assert_eq!(slot.rename_variable("x", "y"), 2);
        assert_eq!(slot.text(), "y+y.x");
    }

    #[test]
    fn test_move_past_end_requests_focus() {
        let mut slot = Slot::with_text(SlotConfig::expression(), "a");
        let seen = recorder(&mut slot);
        slot.move_right();
        assert_eq!(slot.caret(), &CaretPos::path(&[0, 1]));
        slot.move_right();
        assert_eq!(seen.lock().unwrap()[0].focus, Some(FocusRequest::Next));
    }
}
