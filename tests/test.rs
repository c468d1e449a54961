// Scenario tests adapted from the classic C rope test suite, plus a
// randomized oracle test comparing the rope against a plain String.

#[cfg(test)]
mod test {
    use skiprope::SkipRope;

    use rand::prelude::*;
    use rand::rngs::SmallRng;

    const UCHARS: [char; 23] = [
      'a', 'b', 'c', '1', '2', '3', ' ', '\n', // ASCII
      '©', '¥', '½', // The Latin-1 suppliment (U+80 - U+ff)
      'Ύ', 'Δ', 'δ', 'Ϡ', // Greek (U+0370 - U+03FF)
      '←', '↯', '↻', '⇈', // Arrows (U+2190 – U+21FF)
      '𐆐', '𐆔', '𐆘', '𐆚', // Ancient roman symbols (U+10190 – U+101CF)
    ];

    const CHARS: &[u8; 83] = b" ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()[]{}<>?,./";

    fn random_ascii_string(len: usize, rng: &mut SmallRng) -> String {
        let mut s = String::new();
        for _ in 0..len {
            s.push(CHARS[rng.gen_range(0..CHARS.len())] as char);
        }
        s
    }

    fn random_unicode_string(len: usize, rng: &mut SmallRng) -> String {
        let mut s = String::new();
        for _ in 0..len {
            s.push(UCHARS[rng.gen_range(0..UCHARS.len())]);
        }
        s
    }

    fn check(r: &SkipRope, expected: &str) {
        r.check();
        assert_eq!(r.to_string(), expected);
        assert_eq!(r.len_bytes(), expected.len());
        assert_eq!(r.len_chars(), expected.chars().count());
        assert!(*r == expected, "Rope comparison fails");
        assert!(*r == SkipRope::from(expected), "Rope comparison fails");
    }

    // Char offset -> byte offset in a str, for driving the String oracle.
    fn byte_offset(s: &str, char_pos: usize) -> usize {
        s.char_indices().nth(char_pos).map_or(s.len(), |(i, _)| i)
    }

    #[test]
    fn empty_rope_has_no_contents() {
        let mut r = SkipRope::new();
        check(&r, "");

        r.insert(0, "");
        check(&r, "");
    }

    #[test]
    fn insert_at_location() {
        let mut r = SkipRope::new();

        r.insert(0, "AAA");
        check(&r, "AAA");

        r.insert(0, "BBB");
        check(&r, "BBBAAA");

        r.insert(6, "CCC");
        check(&r, "BBBAAACCC");

        r.insert(5, "DDD");
        check(&r, "BBBAADDDACCC");
    }

    #[test]
    fn new_string_has_content() {
        let r = SkipRope::from("hi there");
        check(&r, "hi there");

        let mut r = SkipRope::from("κόσμε");
        check(&r, "κόσμε");
        r.insert(2, "𝕐𝕆😘");
        check(&r, "κό𝕐𝕆😘σμε");
    }

    #[test]
    fn multibyte_offsets() {
        let mut r = SkipRope::from("héllo");
        assert_eq!(r.len_chars(), 5);
        assert_eq!(r.len_bytes(), 6);

        r.insert(1, "X");
        check(&r, "hXéllo");
        assert_eq!(r.len_chars(), 6);
        assert_eq!(r.len_bytes(), 7);
    }

    #[test]
    fn del_at_location() {
        let mut r = SkipRope::from("012345678");

        r.remove(8..9);
        check(&r, "01234567");

        r.remove(0..1);
        check(&r, "1234567");

        r.remove(5..6);
        check(&r, "123457");

        r.remove(5..6);
        check(&r, "12345");

        r.remove(0..5);
        check(&r, "");
    }

    #[test]
    fn del_past_end_of_string() {
        let mut r = SkipRope::new();

        r.remove(0..100);
        check(&r, "");

        r.insert(0, "hi there");
        r.remove(3..13);
        check(&r, "hi ");
    }

    #[test]
    fn insert_past_end_appends() {
        let mut r = SkipRope::from("abc");
        r.insert(1000, "def");
        check(&r, "abcdef");
    }

    #[test]
    fn zero_length_delete_is_a_noop() {
        let mut r = SkipRope::from("oh hai");
        r.remove(3..3);
        check(&r, "oh hai");
    }

    // In debug builds nodes hold only a few bytes, so these strings span
    // several nodes.
    #[test]
    fn insert_spanning_nodes() {
        let mut r = SkipRope::new();
        r.insert(0, "abcdefghijklmnopqrstuvwxyz");
        check(&r, "abcdefghijklmnopqrstuvwxyz");
    }

    #[test]
    fn middle_insert_forcing_split() {
        let mut r = SkipRope::from("abcdefgh");
        r.insert(4, "ZZZZZ");
        check(&r, "abcdZZZZZefgh");

        // And with the split landing between multibyte codepoints.
        let mut r = SkipRope::from("ééééé");
        r.insert(2, "ΔΔΔΔΔ");
        check(&r, "ééΔΔΔΔΔééé");
    }

    #[test]
    fn delete_across_nodes() {
        let mut r = SkipRope::from("abcdefghijklmno");
        check(&r, "abcdefghijklmno");

        r.remove(3..8);
        check(&r, "abcijklmno");

        // Consume several whole nodes at once.
        let mut r = SkipRope::from("abcdefghijklmnopqrstuvwxyzabcdefghijklmnopqrstuvwxyz");
        r.remove(1..51);
        check(&r, "az");
    }

    #[test]
    fn delete_everything() {
        let s = "abcdefghijklmnopqrstuvwxyz0123456789";
        let mut r = SkipRope::from(s);
        r.remove(0..s.len());
        check(&r, "");

        // The rope is fully usable again afterwards.
        r.insert(0, "hi there");
        check(&r, "hi there");
    }

    #[test]
    fn insert_then_delete_restores() {
        let base = "the quick brown fox jumps over the lazy dog";
        for content in ["X", "↯↯↯↯↯↯↯↯↯↯↯↯", "some much longer piece of content 𐆚𐆚𐆚"] {
            let mut r = SkipRope::from(base);
            r.insert(10, content);
            r.remove(10..10 + content.chars().count());
            check(&r, base);
        }
    }

    #[test]
    fn split_insert_equivalence() {
        let s1 = "hello ↯↯↯ ";
        let s2 = "world 𐆐𐆔𐆘";
        let joined = format!("{s1}{s2}");

        let mut a = SkipRope::from("aaaabbbbccccdddd");
        let mut b = a.clone();

        a.insert(8, &joined);

        b.insert(8, s1);
        b.insert(8 + s1.chars().count(), s2);

        check(&a, "aaaabbbbhello ↯↯↯ world 𐆐𐆔𐆘ccccdddd");
        assert!(a == b);
    }

    #[test]
    fn replace_with_new_content() {
        let mut r = SkipRope::from("Hi Mike!");
        r.replace(3..7, "Duane");
        check(&r, "Hi Duane!");

        // Replacement spanning several nodes.
        let mut r = SkipRope::from("abcdefghijklmnopqrstuvwxyz");
        r.replace(5..20, "JUST THIS");
        check(&r, "abcdeJUST THISuvwxyz");
    }

    #[test]
    fn extend_appends_chunks() {
        let mut r = SkipRope::new();
        r.extend(["oh ", "hai ", "there ", "↻↻↻"]);
        check(&r, "oh hai there ↻↻↻");

        r.extend(["", " and more"]);
        check(&r, "oh hai there ↻↻↻ and more");
    }

    #[test]
    fn chunks_concatenate_to_contents() {
        let mut rng = SmallRng::seed_from_u64(10);
        let s = random_unicode_string(200, &mut rng);
        let r = SkipRope::from(s.as_str());

        let collected: String = r.chunks().collect();
        assert_eq!(collected, s);

        // No chunk is empty, and none exceeds a node's worth of data.
        for chunk in r.chunks() {
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn clone_is_independent() {
        let mut r = SkipRope::from("abcdefghijklmnopqrstuvwxyz");
        let c = r.clone();
        check(&c, "abcdefghijklmnopqrstuvwxyz");
        assert!(r == c);

        r.remove(0..13);
        check(&r, "nopqrstuvwxyz");
        check(&c, "abcdefghijklmnopqrstuvwxyz");
        assert!(r != c);
    }

    #[test]
    fn really_long_ascii_string() {
        let mut rng = SmallRng::seed_from_u64(1234);
        let len = 2000;
        let s = random_ascii_string(len, &mut rng);

        let mut r = SkipRope::from(s.as_str());
        check(&r, s.as_str());

        // Delete everything but the first and last characters.
        r.remove(1..len - 1);
        let expect = format!("{}{}", s.as_bytes()[0] as char, s.as_bytes()[len - 1] as char);
        check(&r, expect.as_str());
    }

    #[test]
    fn seeded_ropes_are_deterministic() {
        let mut a = SkipRope::new_from_seed(99);
        let mut b = SkipRope::new_from_seed(99);

        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..100 {
            let pos = rng.gen_range(0..=a.len_chars());
            let s = random_unicode_string(rng.gen_range(0..15), &mut rng);
            a.insert(pos, &s);
            b.insert(pos, &s);
        }

        assert!(a == b);
        // Identical seeds and edits give byte-identical traversals.
        assert!(a.chunks().eq(b.chunks()));
    }

    #[test]
    fn random_edits() {
        let mut rope = SkipRope::new();
        let mut expected = String::new();

        let mut rng = SmallRng::seed_from_u64(321);

        let target_min = 800;
        let target_max = 1200;
        let max_chunk_size = 50;

        for _ in 0..1000 {
            let len = expected.chars().count();

            if len == 0 || (len < target_min && rng.gen_bool(0.55)) {
                // Insert.
                let pos = rng.gen_range(0..=len);
                let content = if rng.gen_bool(0.5) {
                    random_ascii_string(rng.gen_range(1..max_chunk_size), &mut rng)
                } else {
                    random_unicode_string(rng.gen_range(1..max_chunk_size), &mut rng)
                };

                rope.insert(pos, &content);
                let b = byte_offset(&expected, pos);
                expected.insert_str(b, &content);
            } else if len > target_max || rng.gen_bool(0.5) {
                // Delete. Sometimes the range pokes past the end, to
                // exercise clamping.
                let pos = rng.gen_range(0..=len);
                let del_len = rng.gen_range(0..max_chunk_size);

                rope.remove(pos..pos + del_len);
                let start = byte_offset(&expected, pos);
                let end = byte_offset(&expected, (pos + del_len).min(len));
                expected.replace_range(start..end, "");
            } else {
                // Replace.
                let pos = rng.gen_range(0..=len);
                let del_len = rng.gen_range(0..max_chunk_size);
                let content = random_unicode_string(rng.gen_range(0..max_chunk_size), &mut rng);

                rope.replace(pos..pos + del_len, &content);
                let start = byte_offset(&expected, pos);
                let end = byte_offset(&expected, (pos + del_len).min(len));
                expected.replace_range(start..end, &content);
            }

            rope.check();
            assert_eq!(rope.len_bytes(), expected.len());
            assert_eq!(rope.len_chars(), expected.chars().count());
            assert_eq!(rope.to_string(), expected);
        }
    }
}
