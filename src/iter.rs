use crate::skiprope::{Node, SkipRope};

/// An iterator over the nodes in the list.
pub(crate) struct NodeIter<'a>(Option<&'a Node>);

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let prev = self.0;
        if let Some(n) = self.0 {
            *self = NodeIter(unsafe { n.next_ptr().as_ref() });
        }
        prev
    }
}

/// An iterator over the rope's contents, yielding one string chunk per
/// internal node. Concatenating the chunks reproduces the rope's contents.
///
/// The borrowed chunks are invalidated by any mutation of the rope.
pub struct Chunks<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.next?;
        self.next = unsafe { n.next_ptr().as_ref() };
        Some(n.as_str())
    }
}

impl SkipRope {
    pub(crate) fn node_iter(&self) -> NodeIter {
        NodeIter(unsafe { self.first_node().as_ref() })
    }

    /// Iterate over the rope's contents as string chunks.
    ///
    /// # Example
    ///
    /// ```
    /// # use skiprope::*;
    /// let rope = SkipRope::from("oh hai");
    /// let s: String = rope.chunks().collect();
    /// assert_eq!(s, "oh hai");
    /// ```
    pub fn chunks(&self) -> Chunks {
        Chunks { next: unsafe { self.first_node().as_ref() } }
    }
}
