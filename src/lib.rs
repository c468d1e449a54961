//! Skiprope is a rope library for rust. Ropes are like strings, except
//! they scale: inserting or deleting text in the middle of a large
//! [`String`] means shuffling every byte after the edit point, while a rope
//! keeps edits cheap no matter how big the document gets or where the edits
//! land. Use a rope any time a string is edited repeatedly at arbitrary
//! positions - a text editor buffer, a collaborative editing engine, that
//! sort of thing.
//!
//! Internally the rope is a skip list of small fixed-size UTF-8 chunks,
//! where every forward pointer also records how many unicode characters it
//! skips over. All positions in the API are character offsets (unicode
//! codepoints), never byte offsets.
//!
//! ```
//! use skiprope::SkipRope;
//!
//! let mut rope = SkipRope::new();
//! rope.insert(0, "Why hello dear reader");
//! rope.replace(4..9, "goodbye");
//! rope.remove(11..16);
//! assert_eq!(rope.to_string(), "Why goodbye reader");
//! assert_eq!(rope.len_chars(), 18);
//! ```
//!
//! Edits and lookups are *O(log n)*; [`len_chars`](SkipRope::len_chars) and
//! [`len_bytes`](SkipRope::len_bytes) are *O(1)*.
//!
//! Node heights are random. By default (the `ddos_protection` feature) the
//! rope draws them from a cryptographically seeded RNG so an adversary
//! feeding you documents can't degenerate the list; disable the feature to
//! use a smaller, faster RNG. Either way,
//! [`new_from_seed`](SkipRope::new_from_seed) makes a rope's structure
//! fully deterministic, which tests here lean on heavily.
//!
//! The rope is a plain single-threaded data structure: no locks, no
//! snapshots, and borrowed [`chunks`](SkipRope::chunks) are invalidated by
//! any mutation.

mod iter;
mod skiprope;
mod utils;

pub use crate::iter::Chunks;
pub use crate::skiprope::SkipRope;
