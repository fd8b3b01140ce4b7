//! Shared helpers for the typing tables.
//!
//! Rendered states use `{..}` for plain fields, operators written literally, `_` for
//! boundaries, quotes around literals, brackets around nested infixes and `$` for the caret.

#![allow(dead_code)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use slot_core::{CaretPos, GrammarProfile, Infix, ModificationToken, Projection};

/// Marks the caret in backspace/delete sources.
pub const KEY: char = '#';

pub fn new_infix() -> Infix {
    Infix::new(Arc::new(GrammarProfile::expression()))
}

pub fn insert_at(infix: &mut Infix, pos: &CaretPos, text: &str) -> CaretPos {
    ModificationToken::standalone(|token| infix.insert(pos, text, None, false, token))
}

/// Type `text` into an empty infix. If `marker` occurs in `text`, it is not typed; the caret
/// where it stood is returned instead of the final caret.
pub fn insert_marked(infix: &mut Infix, text: &str, marker: char) -> CaretPos {
    let start = infix.start_pos();
    match text.split_once(marker) {
        Some((before, after)) => {
            let p = insert_at(infix, &start, before);
            insert_at(infix, &p, after);
            p
        }
        None => insert_at(infix, &start, text),
    }
}

/// Split `src` around its first `{..}` group.
pub fn split_nest(src: &str) -> (&str, &str, &str) {
    let open = src.find('{').expect("source has a nest");
    let close = open + src[open..].find('}').expect("nest is closed");
    (&src[..open], &src[open + 1..close], &src[close + 1..])
}

pub fn check_insert(insertion: &str, result: &str) {
    let mut e = new_infix();
    let p = insert_marked(&mut e, insertion, '\0');
    assert_eq!(e.render_state(Some(&p)), result, "typing {insertion:?}");
    e.assert_invariants();

    for i in 0..=insertion.len() {
        if let Some(pos) = e.string_pos_to_caret_pos(i, Projection::Source) {
            assert_eq!(
                e.caret_to_string_pos(&pos, Projection::Source),
                Some(i),
                "string pos {i} of {insertion:?} via {pos}"
            );
        }
    }

    let no_pos = result.replace('$', "");
    for split in 1..insertion.len() {
        let mut e = new_infix();
        let start = e.start_pos();
        let p = insert_at(&mut e, &start, &insertion[..split]);
        insert_at(&mut e, &p, &insertion[split..]);
        assert_eq!(
            e.render_state(None),
            no_pos,
            "typing {insertion:?} split at {split}"
        );
    }
}

pub fn check_multi_insert(src: &str, first: &str, second: &str) {
    let (before, nest, after) = split_nest(src);
    let mut e = new_infix();
    let p = insert_marked(&mut e, &format!("{before}${after}"), '$');
    assert_eq!(e.render_state(Some(&p)), first, "{src:?} before nest");
    let p = insert_at(&mut e, &p, nest);
    assert_eq!(e.render_state(Some(&p)), second, "{src:?} after nest");
}

pub fn check_insert_existing(start: &str, insertion: &str, result: &str) {
    let mut e = new_infix();
    let p = insert_marked(&mut e, start, '$');
    let p = insert_at(&mut e, &p, insertion);
    assert_eq!(e.render_state(Some(&p)), result, "{start:?} then {insertion:?}");
}

/// `src` marks the caret with [`KEY`]. Checks backspace there and, if `delete` is set, the
/// delete key one character earlier.
pub fn check_backspace_with(src: &str, result: &str, backspace: bool, delete: bool) {
    if backspace {
        let mut e = new_infix();
        let p = insert_marked(&mut e, src, KEY);
        let p = ModificationToken::standalone(|token| e.delete_previous(&p, token));
        assert_eq!(e.render_state(Some(&p)), result, "backspace in {src:?}");
        e.assert_invariants();
    }

    let index = src.find(KEY).expect("source has a caret");
    if index > 0 && delete {
        let (before, after) = (&src[..index], &src[index + 1..]);
        let joined = format!(
            "{}{KEY}{}{}",
            &before[..before.len() - 1],
            &before[before.len() - 1..],
            after
        );
        let mut e = new_infix();
        let p = insert_marked(&mut e, &joined, KEY);
        let p = ModificationToken::standalone(|token| e.delete_next(&p, token));
        assert_eq!(e.render_state(Some(&p)), result, "delete in {joined:?}");
        e.assert_invariants();
    }
}

pub fn check_backspace(src: &str, result: &str) {
    check_backspace_with(src, result, true, true);
}

/// Build `before nest after` remembering where the nest starts and ends.
fn build_nested(src: &str) -> (Infix, CaretPos, CaretPos) {
    let (before, nest, after) = split_nest(src);
    let mut e = new_infix();
    let start = insert_marked(&mut e, before, '\0');
    let end = insert_at(&mut e, &start, nest);
    insert_at(&mut e, &end, after);
    (e, start, end)
}

pub fn check_delete_selection(src: &str, result: &str) {
    let (mut e, start, end) = build_nested(src);
    let p = ModificationToken::standalone(|token| e.delete_selection(&start, &end, token));
    assert_eq!(e.render_state(Some(&p)), result, "deleting nest of {src:?}");
    e.assert_invariants();
}

pub fn check_selection_insert(c: char, src: &str, result: &str) {
    let (mut e, start, end) = build_nested(src);
    let p = ModificationToken::standalone(|token| {
        e.insert(&end, &c.to_string(), Some(&start), false, token)
    });
    assert_eq!(e.render_state(Some(&p)), result, "{c:?} around nest of {src:?}");
    e.assert_invariants();
}

/// Check the rendered tree of `src` and each `(offset, path)` pair in both directions, in the
/// generated code when `java` is given and in the source text otherwise.
pub fn check_caret_map(src: &str, result: &str, java: Option<&str>, maps: &[(usize, &[usize])]) {
    let mut e = new_infix();
    let p = insert_marked(&mut e, src, '\0');
    assert_eq!(e.render_state(Some(&p)).replace('$', ""), result, "typing {src:?}");
    let projection = if java.is_some() {
        Projection::GeneratedCode
    } else {
        Projection::Source
    };
    for &(offset, path) in maps {
        let pos = CaretPos::path(path);
        assert_eq!(
            e.caret_to_string_pos(&pos, projection),
            Some(offset),
            "caret {pos} of {src:?}"
        );
        assert_eq!(
            e.string_pos_to_caret_pos(offset, projection),
            Some(pos),
            "offset {offset} of {src:?}"
        );
    }
    if let Some(java) = java {
        assert_eq!(e.java_code(), java, "generated code of {src:?}");
    }
}
