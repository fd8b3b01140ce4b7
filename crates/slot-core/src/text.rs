//! Char-indexed helpers over `String`.
//!
//! Every offset stored in a caret path counts Unicode scalar values, not bytes.

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub(crate) fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(byte, _)| byte)
}

pub(crate) fn char_index(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

pub(crate) fn split_at_char(text: &str, char_index: usize) -> (&str, &str) {
    text.split_at(byte_offset(text, char_index))
}

pub(crate) fn slice_chars(text: &str, from: usize, to: usize) -> &str {
    let start = byte_offset(text, from);
    let end = byte_offset(text, to.max(from));
    &text[start..end]
}

pub(crate) fn insert_char_at(text: &mut String, char_index: usize, c: char) {
    let at = byte_offset(text, char_index);
    text.insert(at, c);
}

pub(crate) fn remove_char_at(text: &mut String, char_index: usize) -> Option<char> {
    let at = byte_offset(text, char_index);
    (at < text.len()).then(|| text.remove(at))
}

/// Splits `text` at `char_index`, keeping the head and returning the tail.
pub(crate) fn split_off_chars(text: &mut String, char_index: usize) -> String {
    let at = byte_offset(text, char_index);
    text.split_off(at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_count_scalars() {
        let s = "añb";
        assert_eq!(char_len(s), 3);
        assert_eq!(split_at_char(s, 2), ("añ", "b"));
        assert_eq!(slice_chars(s, 1, 2), "ñ");
        assert_eq!(char_index(s, 3), 2);
    }

    #[test]
    fn test_mutation_helpers() {
        let mut s = String::from("añb");
        insert_char_at(&mut s, 1, 'x');
        assert_eq!(s, "axñb");
        assert_eq!(remove_char_at(&mut s, 2), Some('ñ'));
        assert_eq!(remove_char_at(&mut s, 9), None);
        let tail = split_off_chars(&mut s, 1);
        assert_eq!((s.as_str(), tail.as_str()), ("a", "xb"));
    }
}
