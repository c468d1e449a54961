
// Get the byte offset after char_pos utf8 characters
pub(crate) fn char_to_byte_idx(s: &str, char_pos: usize) -> usize {
    str_indices::chars::to_byte_idx(s, char_pos)
}

pub(crate) fn count_chars(s: &str) -> usize {
    str_indices::chars::count(s)
}

/// The number of bytes in the codepoint introduced by this UTF-8 lead byte.
///
/// Content only ever enters the rope as `&str`, so `b` is always a valid
/// lead byte by the time we classify it.
pub(crate) fn codepoint_len(b: u8) -> usize {
    match b {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_chars_mixed() {
        assert_eq!(count_chars(""), 0);
        assert_eq!(count_chars("hello"), 5);
        // 2, 3 and 4 byte codepoints.
        assert_eq!(count_chars("é"), 1);
        assert_eq!(count_chars("せかい"), 3);
        assert_eq!(count_chars("𐆐𐆔"), 2);
    }

    #[test]
    fn char_to_byte_idx_mixed() {
        let text = "Hello せかい!";
        assert_eq!(char_to_byte_idx(text, 0), 0);
        assert_eq!(char_to_byte_idx(text, 6), 6);
        assert_eq!(char_to_byte_idx(text, 8), 12);
        assert_eq!(char_to_byte_idx(text, 9), 15);
        assert_eq!(char_to_byte_idx(text, 10), 16);
        // Past the end.
        assert_eq!(char_to_byte_idx(text, 50), 16);
    }

    #[test]
    fn codepoint_len_classifies_lead_bytes() {
        for c in ['a', '\n', '\x7f'] {
            assert_eq!(codepoint_len(c.to_string().as_bytes()[0]), 1);
        }
        assert_eq!(codepoint_len("é".as_bytes()[0]), 2);
        assert_eq!(codepoint_len("せ".as_bytes()[0]), 3);
        assert_eq!(codepoint_len("𐆐".as_bytes()[0]), 4);
    }

    #[test]
    fn codepoint_len_matches_len_utf8() {
        for c in "aé߿ࠀせ\u{ffff}𐆐\u{10ffff}".chars() {
            let mut buf = [0u8; 4];
            let s = c.encode_utf8(&mut buf);
            assert_eq!(codepoint_len(s.as_bytes()[0]), c.len_utf8());
        }
    }
}
