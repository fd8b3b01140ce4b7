//! Caret paths.
//!
//! A [`CaretPos`] addresses a point inside a slot tree as a path of indices: the first index
//! selects a field of the top-level [`Infix`](crate::Infix), the next one either a character
//! offset (text fields and string literals) or a field of a bracket's content, and so on.
//!
//! Two sentinel indices are used by the editing algorithms to ask the owner of an infix to move
//! the caret outside of it (see [`CaretIndex`]). Public positions handed back to callers never
//! carry sentinels once [`CaretPos::normalise`] has been applied.

use std::fmt;

/// One step of a caret path.
///
/// The declaration order gives the ordering used by [`CaretPos::before`]:
/// `EscapeParent < At(_) < EscapeNext`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CaretIndex {
    /// Leave the current infix towards its owner (used by deletion at the outer edge).
    EscapeParent,
    /// A field index, or a character offset for leaf components.
    At(usize),
    /// Leave the current infix and continue just after it.
    EscapeNext,
}

/// An immutable caret path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaretPos {
    index: CaretIndex,
    sub: Option<Box<CaretPos>>,
}

impl CaretPos {
    /// A single-step path, e.g. a character offset inside a text field.
    pub fn leaf(index: usize) -> Self {
        Self {
            index: CaretIndex::At(index),
            sub: None,
        }
    }

    /// `index` followed by `sub`.
    pub fn new(index: usize, sub: CaretPos) -> Self {
        Self {
            index: CaretIndex::At(index),
            sub: Some(Box::new(sub)),
        }
    }

    /// Build a position from a full path.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty.
    pub fn path(path: &[usize]) -> Self {
        let (last, init) = path.split_last().expect("caret path must not be empty");
        init.iter()
            .rev()
            .fold(Self::leaf(*last), |sub, &index| Self::new(index, sub))
    }

    /// Sentinel asking the owner to handle an edge (deletion or leftward movement).
    pub fn escape_parent() -> Self {
        Self {
            index: CaretIndex::EscapeParent,
            sub: None,
        }
    }

    /// Sentinel asking the owner to move the caret just past this infix.
    pub fn escape_next() -> Self {
        Self {
            index: CaretIndex::EscapeNext,
            sub: None,
        }
    }

    /// First step of the path.
    pub fn index(&self) -> CaretIndex {
        self.index
    }

    /// First step of the path, if it is not a sentinel.
    pub fn slot(&self) -> Option<usize> {
        match self.index {
            CaretIndex::At(i) => Some(i),
            _ => None,
        }
    }

    /// Remainder of the path.
    pub fn sub(&self) -> Option<&CaretPos> {
        self.sub.as_deref()
    }

    /// Returns `true` for the escape-to-parent sentinel.
    pub fn is_escape_parent(&self) -> bool {
        self.index == CaretIndex::EscapeParent
    }

    /// Returns `true` for the escape-to-next-sibling sentinel.
    pub fn is_escape_next(&self) -> bool {
        self.index == CaretIndex::EscapeNext
    }

    /// The path as plain indices, or `None` if any step is a sentinel.
    pub fn to_path(&self) -> Option<Vec<usize>> {
        let mut out = Vec::new();
        let mut cur = Some(self);
        while let Some(p) = cur {
            out.push(p.slot()?);
            cur = p.sub();
        }
        Some(out)
    }

    /// Field index at this level.
    ///
    /// # Panics
    ///
    /// Panics on a sentinel; the editing algorithms resolve sentinels before indexing.
    pub(crate) fn field_index(&self) -> usize {
        match self.index {
            CaretIndex::At(i) => i,
            other => panic!("caret sentinel {other:?} used as a field index"),
        }
    }

    /// Character offset of the leaf below this level (`0` when absent).
    pub(crate) fn leaf_offset(&self) -> usize {
        self.sub().and_then(CaretPos::slot).unwrap_or(0)
    }

    /// The sub-position, or the start of the component when absent.
    pub(crate) fn sub_or_start(&self) -> CaretPos {
        self.sub().cloned().unwrap_or_else(|| CaretPos::leaf(0))
    }

    /// Canonical form: a nested escape-to-next-sibling becomes the start of the following field.
    pub fn normalise(&self) -> CaretPos {
        match self.sub() {
            None => self.clone(),
            Some(sub) => {
                let sub = sub.normalise();
                match (self.index, sub.index) {
                    (CaretIndex::At(i), CaretIndex::EscapeNext) => {
                        CaretPos::new(i + 1, CaretPos::leaf(0))
                    }
                    (index, _) => CaretPos {
                        index,
                        sub: Some(Box::new(sub)),
                    },
                }
            }
        }
    }

    /// Lexicographic comparison over the path; a prefix sorts before its extensions.
    pub fn before(&self, other: &CaretPos) -> bool {
        self < other
    }

    /// Path concatenation.
    pub fn append(&self, tail: CaretPos) -> CaretPos {
        let sub = match self.sub() {
            None => tail,
            Some(sub) => sub.append(tail),
        };
        CaretPos {
            index: self.index,
            sub: Some(Box::new(sub)),
        }
    }

    /// Inclusive range test; `start` and `end` may be given in either order.
    pub fn is_between(&self, start: &CaretPos, end: &CaretPos) -> bool {
        let (lo, hi) = if end.before(start) {
            (end, start)
        } else {
            (start, end)
        };
        !self.before(lo) && !hi.before(self)
    }

    /// If this position is exactly `prefix` plus one trailing offset, return that offset.
    pub fn following(&self, prefix: &[usize]) -> Option<usize> {
        let path = self.to_path()?;
        match path.split_last() {
            Some((last, init)) if init == prefix => Some(*last),
            _ => None,
        }
    }
}

impl fmt::Display for CaretPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            CaretIndex::At(i) => write!(f, "{i}")?,
            CaretIndex::EscapeParent => write!(f, "^")?,
            CaretIndex::EscapeNext => write!(f, ">")?,
        }
        if let Some(sub) = self.sub() {
            write!(f, ",{sub}")?;
        }
        Ok(())
    }
}
