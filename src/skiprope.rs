// This is an implementation of a rope (fancy string) built on a skip list
// where every forward pointer is annotated with the number of characters it
// skips over. That turns the skip list into a positional index: finding a
// character offset costs O(log n), and every edit repairs the counts on
// each level it touches.

// The structure is very fast, but it manages that through heavy use of
// unsafe pointers and C-style dynamic arrays.

use std::{mem, ptr, str};
use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::cmp::min;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Range;
use rand::prelude::*;
use crate::utils::*;

// Nodes hold up to NODE_STR_SIZE bytes of utf8 data. In debug builds the
// capacity is tiny so ordinary tests exercise node splits and splices.
#[cfg(debug_assertions)]
pub(crate) const NODE_STR_SIZE: usize = 10;
#[cfg(not(debug_assertions))]
pub(crate) const NODE_STR_SIZE: usize = 128;

// Tall enough that the list stays logarithmic well past 2^60 characters.
const MAX_HEIGHT: usize = 60;
const MAX_HEIGHT_U8: u8 = MAX_HEIGHT as u8;

// The head vector starts with room for this many levels; it doubles from
// there and never shrinks its allocation.
const INITIAL_HEAD_CAPACITY: usize = 10;

// Using StdRng notably increases code size, providing some tiny extra
// protection against ddos attacks. See the crate documentation for details.
#[cfg(feature = "ddos_protection")]
type RopeRng = StdRng;
#[cfg(not(feature = "ddos_protection"))]
type RopeRng = SmallRng;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct SkipEntry {
    pub(crate) node: *mut Node,
    /// The number of *characters* between the start of the current node and
    /// the start of the next node.
    pub(crate) skip_chars: usize,
}

impl SkipEntry {
    fn new() -> Self {
        SkipEntry { node: ptr::null_mut(), skip_chars: 0 }
    }
}

// Each node is allocated with the exact amount of memory its height needs:
// a fixed header followed by `height` SkipEntry values. This would be more
// at home in C, but it keeps a node's forward pointers on the same cache
// lines as its content.
#[repr(C)] // Prevent parameter reordering.
pub(crate) struct Node {
    // The first num_bytes of this store a valid utf8 string.
    str: [u8; NODE_STR_SIZE],

    // Number of bytes in str in use
    num_bytes: u8,

    // Height of the nexts array.
    height: u8,

    // This array actually has the size of height, allocated using more or
    // less direct calls to malloc() at runtime based on the randomly
    // generated height. The size is always at least 1.
    nexts: [SkipEntry; 0],
}

// Make sure nexts uses correct alignment. This should be guaranteed by
// repr(C). This test will fail if this ever stops being true.
#[test]
fn test_align() {
    #[repr(C)] struct Check([SkipEntry; 0]);
    assert!(mem::align_of::<Check>() >= mem::align_of::<SkipEntry>());
}

// Geometric draw: P(height >= h+1) is half of P(height >= h). A single
// uniform word gives us up to 64 fair coin flips.
fn random_height(rng: &mut RopeRng) -> u8 {
    let word: u64 = rng.gen();
    let h = 1 + word.leading_ones() as usize;
    h.min(MAX_HEIGHT) as u8
}

impl Node {
    fn nexts(&self) -> &[SkipEntry] {
        unsafe {
            std::slice::from_raw_parts(self.nexts.as_ptr(), self.height as usize)
        }
    }

    fn nexts_mut(&mut self) -> &mut [SkipEntry] {
        unsafe {
            std::slice::from_raw_parts_mut(self.nexts.as_mut_ptr(), self.height as usize)
        }
    }

    fn layout_with_height(height: u8) -> Layout {
        Layout::from_size_align(
            mem::size_of::<Node>() + mem::size_of::<SkipEntry>() * (height as usize),
            mem::align_of::<Node>()).unwrap()
    }

    fn alloc_with_height(height: u8, content: &str) -> *mut Node {
        assert!(height >= 1 && height <= MAX_HEIGHT_U8);
        assert!(content.len() <= NODE_STR_SIZE);

        unsafe {
            let layout = Self::layout_with_height(height);
            let node = alloc(layout) as *mut Node;
            if node.is_null() { handle_alloc_error(layout); }

            node.write(Node {
                str: [0; NODE_STR_SIZE],
                num_bytes: content.len() as u8,
                height,
                nexts: [],
            });
            (&mut (*node).str)[..content.len()].copy_from_slice(content.as_bytes());

            for next in (*node).nexts_mut() {
                *next = SkipEntry::new();
            }

            node
        }
    }

    fn alloc(rng: &mut RopeRng, content: &str) -> *mut Node {
        Self::alloc_with_height(random_height(rng), content)
    }

    unsafe fn free(p: *mut Node) {
        dealloc(p as *mut u8, Self::layout_with_height((*p).height));
    }

    pub(crate) fn as_str(&self) -> &str {
        let slice = &self.str[..self.num_bytes as usize];
        if cfg!(debug_assertions) {
            str::from_utf8(slice).unwrap()
        } else {
            unsafe { str::from_utf8_unchecked(slice) }
        }
    }

    // The height is at least 1, so this is always valid.
    fn first_next(&self) -> &SkipEntry {
        unsafe { &*self.nexts.as_ptr() }
    }

    pub(crate) fn next_ptr(&self) -> *const Node {
        self.first_next().node
    }

    // The level 0 skip covers exactly this node's characters, since nothing
    // sits between level 0 neighbours.
    fn num_chars(&self) -> usize {
        self.first_next().skip_chars
    }
}

/// The result of navigating to a character position: for every active
/// level, the last node starting at or before the position (null standing
/// for the head) and how many characters of that node's span precede the
/// position. Mutations rewrite exactly these entries.
#[derive(Debug, Clone)]
pub(crate) struct RopeCursor {
    entries: [SkipEntry; MAX_HEIGHT],

    /// The global character position of the cursor. Needed to seed fresh
    /// head levels when a new node outgrows the rope.
    char_pos: usize,
}

impl RopeCursor {
    fn here_ptr(&self) -> *mut Node {
        self.entries[0].node
    }

    fn move_within_node(&mut self, height: usize, by: isize) {
        for e in &mut self.entries[..height] {
            e.skip_chars = e.skip_chars.wrapping_add(by as usize);
        }
    }
}

/// A rope is a "rich string" data structure for storing fancy strings, like
/// the contents of a text editor. See the crate documentation for more
/// information.
pub struct SkipRope {
    rng: RopeRng,

    // The total number of characters in the rope
    num_chars: usize,

    // The total number of bytes which the characters in the rope take up
    num_bytes: usize,

    // One entry point per active level. The vector's length is the rope's
    // height: the height of the tallest live node. Each slot points to the
    // first node participating in that level, skipping the characters
    // stored before it.
    head: Vec<SkipEntry>,
}

impl SkipRope {
    fn new_with_rng(rng: RopeRng) -> Self {
        SkipRope {
            rng,
            num_chars: 0,
            num_bytes: 0,
            head: Vec::with_capacity(INITIAL_HEAD_CAPACITY),
        }
    }

    /// Creates and returns a new, empty rope.
    ///
    /// In release mode this method is an alias for
    /// [`new_from_entropy`](Self::new_from_entropy). But when compiled for
    /// testing (or in debug mode), we use a fixed seed in order to keep
    /// tests fully deterministic.
    pub fn new() -> Self {
        if cfg!(test) || cfg!(debug_assertions) {
            Self::new_from_seed(123)
        } else {
            Self::new_from_entropy()
        }
    }

    /// Creates a new, empty rope seeded from an entropy source.
    pub fn new_from_entropy() -> Self {
        Self::new_with_rng(RopeRng::from_entropy())
    }

    /// Creates a new, empty rope using an RNG seeded from the passed u64
    /// parameter.
    ///
    /// Node heights are the only randomness in the rope, so two ropes built
    /// from the same seed with the same sequence of edits end up with
    /// byte-identical internal structure.
    pub fn new_from_seed(seed: u64) -> Self {
        Self::new_with_rng(RopeRng::seed_from_u64(seed))
    }

    fn new_from_str(s: &str) -> Self {
        let mut rope = Self::new();
        rope.insert(0, s);
        rope
    }

    fn height(&self) -> usize {
        self.head.len()
    }

    pub(crate) fn first_node(&self) -> *mut Node {
        self.head.first().map_or(ptr::null_mut(), |e| e.node)
    }

    /// Return the length of the rope in unicode characters. Note this is
    /// not the same as either the number of bytes the characters take, or
    /// the number of grapheme clusters in the string.
    ///
    /// This method returns the length in constant-time (*O(1)*).
    ///
    /// # Example
    ///
    /// ```
    /// # use skiprope::*;
    /// assert_eq!("↯".len(), 3);
    ///
    /// let rope = SkipRope::from("↯");
    /// assert_eq!(rope.len_chars(), 1);
    /// ```
    pub fn len_chars(&self) -> usize {
        self.num_chars
    }

    /// Get the number of bytes used for the UTF8 representation of the
    /// rope. This will always match the `.len()` property of the
    /// equivalent `String`.
    ///
    /// # Example
    ///
    /// ```
    /// # use skiprope::*;
    /// let str = "κόσμε"; // "Cosmos" in ancient greek
    /// assert_eq!(str.len(), 11); // 11 bytes over the wire
    ///
    /// let rope = SkipRope::from(str);
    /// assert_eq!(rope.len_bytes(), str.len());
    /// ```
    pub fn len_bytes(&self) -> usize { self.num_bytes }

    /// Returns `true` if the rope contains no elements.
    pub fn is_empty(&self) -> bool { self.num_bytes == 0 }

    // The forward entry leaving `node` at the given level; a null node
    // names the head vector's slot for that level.
    unsafe fn next_entry(&self, node: *const Node, level: usize) -> &SkipEntry {
        match node.as_ref() {
            Some(n) => &n.nexts()[level],
            None => &self.head[level],
        }
    }

    unsafe fn next_entry_mut(&mut self, node: *mut Node, level: usize) -> &mut SkipEntry {
        match node.as_mut() {
            Some(n) => &mut n.nexts_mut()[level],
            None => &mut self.head[level],
        }
    }

    // Internal function for navigating to a particular character offset in
    // the rope. The function returns the list of nodes which point past the
    // position, as well as offsets of how far into their character lists
    // the specified characters are.
    pub(crate) fn cursor_at_char(&self, char_pos: usize) -> RopeCursor {
        assert!(char_pos <= self.num_chars);

        let mut cursor = RopeCursor {
            entries: [SkipEntry::new(); MAX_HEIGHT],
            char_pos,
        };

        let mut e: *const Node = ptr::null();
        let mut offset = char_pos; // How many more chars to skip

        for level in (0..self.height()).rev() {
            loop {
                let next = unsafe { self.next_entry(e, level) };
                if next.skip_chars < offset {
                    // Go right. Note the strict comparison: when the
                    // position falls on a node boundary the cursor stays
                    // with the earlier node.
                    offset -= next.skip_chars;
                    e = next.node;
                    assert!(!e.is_null(), "Internal constraint violation: reached rope end prematurely");
                } else {
                    // Record this and go down.
                    cursor.entries[level] = SkipEntry {
                        node: e as *mut Node,
                        skip_chars: offset,
                    };
                    break;
                }
            }
        }

        debug_assert!(offset <= NODE_STR_SIZE);
        cursor
    }

    // Add `by` characters to the forward entry each cursor level points
    // through. This is how an edit inside a node's span updates every level
    // above it.
    unsafe fn update_skips(&mut self, cursor: &RopeCursor, by: isize) {
        for i in 0..self.height() {
            let entry = self.next_entry_mut(cursor.entries[i].node, i);
            entry.skip_chars = entry.skip_chars.wrapping_add(by as usize);
        }
    }

    // Internal fn to create a new node at the specified cursor filled with
    // the specified content. num_chars is the character length of contents.
    //
    // If update_cursor is set the cursor is moved to the end of the new
    // node, so subsequent pieces thread in after it.
    unsafe fn insert_node_at(&mut self, cursor: &mut RopeCursor, contents: &str,
            num_chars: usize, update_cursor: bool) {
        debug_assert_eq!(count_chars(contents), num_chars);
        debug_assert!(contents.len() <= NODE_STR_SIZE);

        let new_node = Node::alloc(&mut self.rng, contents);
        let new_height = (*new_node).height as usize;
        let old_height = self.height();

        for i in 0..new_height.min(old_height) {
            let prev = self.next_entry_mut(cursor.entries[i].node, i);
            let nexts = (*new_node).nexts_mut();
            nexts[i].node = prev.node;
            nexts[i].skip_chars = num_chars + prev.skip_chars - cursor.entries[i].skip_chars;

            prev.node = new_node;
            prev.skip_chars = cursor.entries[i].skip_chars;

            if update_cursor {
                // Move the cursor to the end of the newly inserted node.
                cursor.entries[i] = SkipEntry { node: new_node, skip_chars: num_chars };
            }
        }

        // The new node is the tallest the rope has seen. Grow the head
        // vector, entering the node at each fresh level. The skips are
        // computed from the rope's current totals, which at this point do
        // not include the new node yet.
        for i in old_height..new_height {
            (*new_node).nexts_mut()[i] = SkipEntry {
                node: ptr::null_mut(),
                skip_chars: num_chars + self.num_chars - cursor.char_pos,
            };
            self.head.push(SkipEntry {
                node: new_node,
                skip_chars: cursor.char_pos,
            });
            cursor.entries[i] = if update_cursor {
                SkipEntry { node: new_node, skip_chars: num_chars }
            } else {
                SkipEntry { node: ptr::null_mut(), skip_chars: cursor.char_pos }
            };
        }

        // Levels the new node doesn't participate in just get longer.
        for i in new_height..old_height {
            self.next_entry_mut(cursor.entries[i].node, i).skip_chars += num_chars;
            if update_cursor {
                cursor.entries[i].skip_chars += num_chars;
            }
        }

        self.num_chars += num_chars;
        self.num_bytes += contents.len();
        if update_cursor {
            cursor.char_pos += num_chars;
        }
    }

    unsafe fn insert_at_cursor(&mut self, cursor: &mut RopeCursor, contents: &str) {
        if contents.is_empty() { return; }

        // The cursor tells us how far (in characters) into the target node
        // the insert lands. Figure out how much that is in bytes.
        let mut offset_bytes: usize = 0;
        let offset = cursor.entries[0].skip_chars;
        let mut e = cursor.here_ptr();

        let num_inserted_bytes = contents.len();
        let num_inserted_chars = count_chars(contents);

        // Can we insert into the current node?
        let mut insert_here = false;
        if !e.is_null() {
            assert!(offset <= (*e).num_chars());
            if offset > 0 {
                offset_bytes = char_to_byte_idx((*e).as_str(), offset);
            }
            insert_here = (*e).num_bytes as usize + num_inserted_bytes <= NODE_STR_SIZE;
        }

        // If we can't insert here, see if the content fits at the start of
        // the subsequent node instead. (When the cursor sits ahead of the
        // first node, that first node is the subsequent node.)
        if !insert_here && (e.is_null() || offset_bytes == (*e).num_bytes as usize) {
            let next = if e.is_null() { self.first_node() } else { (*e).first_next().node };
            if let Some(next) = next.as_mut() {
                if next.num_bytes as usize + num_inserted_bytes <= NODE_STR_SIZE {
                    offset_bytes = 0;
                    for entry in &mut cursor.entries[..next.height as usize] {
                        *entry = SkipEntry { node: next, skip_chars: 0 };
                    }
                    e = next;
                    insert_here = true;
                }
            }
        }

        if insert_here {
            // First move the current bytes later on in the string.
            let c = &mut (*e).str;
            if offset_bytes < (*e).num_bytes as usize {
                ptr::copy(
                    &c[offset_bytes],
                    &mut c[offset_bytes + num_inserted_bytes],
                    (*e).num_bytes as usize - offset_bytes);
            }

            // Then copy in the string bytes.
            ptr::copy_nonoverlapping(
                contents.as_bytes().as_ptr(),
                &mut c[offset_bytes],
                num_inserted_bytes);

            (*e).num_bytes += num_inserted_bytes as u8;
            self.num_bytes += num_inserted_bytes;
            self.num_chars += num_inserted_chars;

            // .... aaaand update all the skip amounts.
            self.update_skips(cursor, num_inserted_chars as isize);
            cursor.move_within_node(self.height(), num_inserted_chars as isize);
            cursor.char_pos += num_inserted_chars;
        } else {
            // There isn't room. We'll need to add at least one new node to
            // the rope.

            // If we're not at the end of the current node, we'll need to
            // remove the end of the current node's data and reinsert it
            // later.
            let mut num_end_chars: usize = 0;
            let end_str = if !e.is_null() && offset_bytes < (*e).num_bytes as usize {
                // The characters are deleted from the node's bookkeeping,
                // while the bytes themselves stay put until they are
                // re-threaded below.
                let num_end_bytes = (*e).num_bytes as usize - offset_bytes;
                let end_str = &(*e).as_str()[offset_bytes..];
                num_end_chars = (*e).num_chars() - offset;
                (*e).num_bytes = offset_bytes as u8;

                self.update_skips(cursor, -(num_end_chars as isize));
                self.num_chars -= num_end_chars;
                self.num_bytes -= num_end_bytes;
                Some(end_str)
            } else {
                None
            };

            // Now we insert new nodes containing the new character data.
            // The data must be broken into pieces of a maximum size of
            // NODE_STR_SIZE, and a piece boundary must never land in the
            // middle of a utf8 codepoint.
            let mut remainder = contents;
            while !remainder.is_empty() {
                let bytes = remainder.as_bytes();
                let mut byte_pos = 0;
                let mut char_pos = 0;

                while byte_pos < bytes.len() {
                    let cs = codepoint_len(bytes[byte_pos]);
                    if byte_pos + cs > NODE_STR_SIZE { break; }
                    byte_pos += cs;
                    char_pos += 1;
                }

                let (piece, rem) = remainder.split_at(byte_pos);
                assert!(!piece.is_empty());
                self.insert_node_at(cursor, piece, char_pos, true);
                remainder = rem;
            }

            if let Some(end_str) = end_str {
                self.insert_node_at(cursor, end_str, num_end_chars, false);
            }
        }
    }

    unsafe fn del_at_cursor(&mut self, cursor: &mut RopeCursor, mut length: usize) {
        if length == 0 { return; }
        let mut offset = cursor.entries[0].skip_chars;
        let mut e = cursor.here_ptr();

        while length > 0 {
            // At the end of the current node (or sitting ahead of the first
            // node), step to the start of the successor.
            let span = if e.is_null() { 0 } else { (*e).first_next().skip_chars };
            if offset == span {
                e = if e.is_null() { self.first_node() } else { (*e).first_next().node };
                offset = 0;
                if e.is_null() { break; }
            }

            let num_chars = (*e).num_chars();
            let removed = min(length, num_chars - offset);
            assert!(removed > 0);
            let height = (*e).height as usize;

            if removed < num_chars {
                // Just trim the node down.
                let s = (*e).as_str();
                let leading_bytes = char_to_byte_idx(s, offset);
                let removed_bytes = char_to_byte_idx(&s[leading_bytes..], removed);
                let trailing_bytes = (*e).num_bytes as usize - leading_bytes - removed_bytes;

                let c = &mut (*e).str;
                if trailing_bytes > 0 {
                    ptr::copy(
                        &c[leading_bytes + removed_bytes],
                        &mut c[leading_bytes],
                        trailing_bytes);
                }

                (*e).num_bytes -= removed_bytes as u8;
                self.num_bytes -= removed_bytes;

                for s in (*e).nexts_mut() {
                    s.skip_chars -= removed;
                }
            } else {
                // The node is consumed whole; splice it out of every level
                // it participates in. This works because the cursor must be
                // pointing from the previous element to the start of this
                // element.
                assert_ne!(cursor.entries[0].node, e);

                for i in 0..height {
                    let next = (*e).nexts()[i];
                    let entry = self.next_entry_mut(cursor.entries[i].node, i);
                    entry.node = next.node;
                    entry.skip_chars += next.skip_chars - removed;
                }

                self.num_bytes -= (*e).num_bytes as usize;
                let next = (*e).first_next().node;
                Node::free(e);
                e = next;
            }

            // Levels above the node just get shorter.
            for i in height..self.height() {
                self.next_entry_mut(cursor.entries[i].node, i).skip_chars -= removed;
            }

            self.num_chars -= removed;
            length -= removed;
        }

        // Levels whose last node died leave a dangling head slot behind.
        // Drop them so the rope's height tracks the tallest live node
        // again. (The vector keeps its allocation.)
        while self.head.last().map_or(false, |e| e.node.is_null()) {
            self.head.pop();
        }
    }

    /// Insert new content into the rope. The content is inserted at the
    /// specified unicode character offset, which is different from a byte
    /// offset for non-ASCII characters.
    ///
    /// # Example
    ///
    /// ```
    /// # use skiprope::*;
    /// let mut rope = SkipRope::from("--");
    /// rope.insert(1, "hi there");
    /// assert_eq!(rope.to_string(), "-hi there-");
    /// ```
    ///
    /// If the position names a location past the end of the rope, it is
    /// truncated.
    pub fn insert(&mut self, mut pos: usize, contents: &str) {
        if contents.is_empty() { return; }
        pos = min(pos, self.len_chars());

        let mut cursor = self.cursor_at_char(pos);
        unsafe { self.insert_at_cursor(&mut cursor, contents); }

        debug_assert_eq!(cursor.char_pos, pos + count_chars(contents));
    }

    /// Delete a span of unicode characters from the rope. The span is
    /// specified in unicode characters, not bytes.
    ///
    /// Any attempt to delete past the end of the rope will be silently
    /// ignored.
    ///
    /// # Example
    ///
    /// ```
    /// # use skiprope::*;
    /// let mut rope = SkipRope::from("Whoa dawg!");
    /// rope.remove(4..9); // delete " dawg"
    /// assert_eq!(rope.to_string(), "Whoa!");
    /// ```
    pub fn remove(&mut self, mut range: Range<usize>) {
        range.end = range.end.min(self.len_chars());
        if range.start >= range.end { return; }

        let mut cursor = self.cursor_at_char(range.start);
        unsafe { self.del_at_cursor(&mut cursor, range.end - range.start); }

        debug_assert_eq!(cursor.char_pos, range.start);
    }

    /// Replace the specified range with new content. This is equivalent to
    /// calling [`remove`](Self::remove) followed by
    /// [`insert`](Self::insert), but it is simpler and faster.
    ///
    /// # Example
    ///
    /// ```
    /// # use skiprope::*;
    /// let mut rope = SkipRope::from("Hi Mike!");
    /// rope.replace(3..7, "Duane"); // replace "Mike" with "Duane"
    /// assert_eq!(rope.to_string(), "Hi Duane!");
    /// ```
    pub fn replace(&mut self, range: Range<usize>, content: &str) {
        let len = self.len_chars();
        let pos = usize::min(range.start, len);
        let del_len = usize::min(range.end, len) - pos;

        let mut cursor = self.cursor_at_char(pos);
        if del_len > 0 {
            unsafe { self.del_at_cursor(&mut cursor, del_len); }
        }
        if !content.is_empty() {
            unsafe { self.insert_at_cursor(&mut cursor, content); }
        }

        debug_assert_eq!(cursor.char_pos, pos + count_chars(content));
    }

    fn eq_str(&self, mut other: &str) -> bool {
        if self.num_bytes != other.len() { return false; }

        for s in self.chunks() {
            let (start, rem) = other.split_at(s.len());
            if start != s { return false; }
            other = rem;
        }

        true
    }

    /// Walk the entire structure, asserting every internal invariant: each
    /// level's skip counts partition the characters, node buffers are valid
    /// utf8 within capacity, the totals agree, and the rope's height
    /// matches the tallest live node.
    pub fn check(&self) {
        assert!(self.height() <= MAX_HEIGHT);
        if self.height() > 0 {
            // Level 0 reaches the first node without skipping anything.
            assert_eq!(self.head[0].skip_chars, 0);
        }

        // Scan entries store, per level, the node the scan expects to see
        // next and the total characters before it.
        let mut scan = [SkipEntry::new(); MAX_HEIGHT];
        for (i, slot) in self.head.iter().enumerate() {
            assert!(!slot.node.is_null());
            scan[i] = *slot;
        }

        let mut num_bytes: usize = 0;
        let mut num_chars = 0;
        let mut max_height = 0;

        for n in self.node_iter() {
            assert!(n.num_bytes > 0);
            assert!(n.num_bytes as usize <= NODE_STR_SIZE);
            assert!(n.height >= 1);
            assert!((n.height as usize) <= self.height());
            max_height = max_height.max(n.height as usize);

            let s = str::from_utf8(&n.str[..n.num_bytes as usize]).unwrap();
            assert_eq!(count_chars(s), n.num_chars());

            for (i, entry) in scan[..n.height as usize].iter_mut().enumerate() {
                assert_eq!(entry.node as *const Node, n as *const Node);
                assert_eq!(entry.skip_chars, num_chars);

                entry.node = n.nexts()[i].node;
                entry.skip_chars += n.nexts()[i].skip_chars;
            }

            num_bytes += n.num_bytes as usize;
            num_chars += n.num_chars();
        }

        for entry in &scan[..self.height()] {
            assert!(entry.node.is_null());
            assert_eq!(entry.skip_chars, num_chars);
        }

        assert_eq!(max_height, self.height());
        assert_eq!(self.num_bytes, num_bytes);
        assert_eq!(self.num_chars, num_chars);
    }

    #[allow(unused)]
    pub(crate) fn print(&self) {
        println!("chars: {}\tbytes: {}\theight: {}",
            self.num_chars, self.num_bytes, self.height());

        print!("HEAD:");
        for s in &self.head {
            print!(" |{} ", s.skip_chars);
        }
        println!();

        for (i, node) in self.node_iter().enumerate() {
            print!("{}:", i);
            for s in node.nexts() {
                print!(" |{} ", s.skip_chars);
            }
            println!("      : {:?}", node.as_str());
        }
    }
}

impl Default for SkipRope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SkipRope {
    fn drop(&mut self) {
        let mut node = self.first_node();
        unsafe {
            while !node.is_null() {
                let next = (*node).first_next().node;
                Node::free(node);
                node = next;
            }
        }
    }
}

impl From<&str> for SkipRope {
    fn from(str: &str) -> Self {
        SkipRope::new_from_str(str)
    }
}

impl From<String> for SkipRope {
    fn from(str: String) -> Self {
        SkipRope::new_from_str(&str)
    }
}

impl From<&SkipRope> for String {
    fn from(rope: &SkipRope) -> Self {
        let mut content = String::with_capacity(rope.num_bytes);
        for s in rope.chunks() {
            content.push_str(s);
        }
        content
    }
}

impl Clone for SkipRope {
    fn clone(&self) -> Self {
        // Rebuild the exact node chain - same heights, same skips - so a
        // rope and its clone stay structurally identical under identical
        // future edits.
        let mut r = SkipRope {
            rng: self.rng.clone(),
            num_chars: self.num_chars,
            num_bytes: self.num_bytes,
            head: Vec::with_capacity(self.height().max(INITIAL_HEAD_CAPACITY)),
        };
        for slot in &self.head {
            r.head.push(SkipEntry { node: ptr::null_mut(), skip_chars: slot.skip_chars });
        }

        // Per level, the forward entry still waiting to learn which node
        // comes next. The head vector will not reallocate below: its
        // capacity already covers every level.
        let mut tails: [*mut SkipEntry; MAX_HEIGHT] = [ptr::null_mut(); MAX_HEIGHT];
        for (i, slot) in r.head.iter_mut().enumerate() {
            tails[i] = slot;
        }

        unsafe {
            for other in self.node_iter() {
                let node = Node::alloc_with_height(other.height, other.as_str());
                for i in 0..other.height as usize {
                    (*node).nexts_mut()[i].skip_chars = other.nexts()[i].skip_chars;
                    (*tails[i]).node = node;
                    tails[i] = &mut (*node).nexts_mut()[i];
                }
            }
        }

        r
    }
}

impl PartialEq for SkipRope {
    // This walks both ropes' chunks in lock step, comparing the overlap at
    // each step, so differing node boundaries don't matter.
    fn eq(&self, other: &SkipRope) -> bool {
        if self.num_bytes != other.num_bytes
                || self.num_chars != other.num_chars {
            return false
        }

        let mut other_iter = other.chunks();
        let mut os = "";

        for mut s in self.chunks() {
            while !s.is_empty() {
                if os.is_empty() {
                    os = other_iter.next().unwrap();
                }

                let amt = min(s.len(), os.len());
                let (s_start, s_rem) = s.split_at(amt);
                let (os_start, os_rem) = os.split_at(amt);

                if s_start != os_start { return false; }

                s = s_rem;
                os = os_rem;
            }
        }

        true
    }
}
impl Eq for SkipRope {}

// I don't know why I need all three of these, but I do.
impl PartialEq<str> for SkipRope {
    fn eq(&self, other: &str) -> bool {
        self.eq_str(other)
    }
}
impl PartialEq<&str> for SkipRope {
    fn eq(&self, other: &&str) -> bool {
        self.eq_str(*other)
    }
}
impl PartialEq<String> for SkipRope {
    fn eq(&self, other: &String) -> bool {
        self.eq_str(other.as_str())
    }
}

impl Debug for SkipRope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.chunks())
            .finish()
    }
}

impl Display for SkipRope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for s in self.chunks() {
            f.write_str(s)?;
        }
        Ok(())
    }
}

impl<'a> Extend<&'a str> for SkipRope {
    fn extend<T: IntoIterator<Item = &'a str>>(&mut self, iter: T) {
        let mut cursor = self.cursor_at_char(self.len_chars());
        iter.into_iter().for_each(|s| {
            unsafe { self.insert_at_cursor(&mut cursor, s); }
        });
    }
}
