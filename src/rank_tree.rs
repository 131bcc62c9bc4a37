//! A sequence stored in a B-tree, indexed by rank.
//!
//! This is what the sweep line is made of: it needs to insert and remove in
//! the middle, find positions by binary search, and look at neighbors, all
//! without the linear cost of shifting a `Vec`.

use arrayvec::ArrayVec;

/// A sequence with logarithmic-time insertion, removal, and indexing.
///
/// Every node holds at most `B` entries, and every node except the root holds at
/// least `B / 2`. `B` must be even and at least 4.
#[derive(Clone, Debug)]
pub struct RankTree<T, const B: usize> {
    root: Box<Node<T, B>>,
}

#[derive(Clone, Debug)]
enum Node<T, const B: usize> {
    Leaf(ArrayVec<T, B>),
    Branch {
        /// The number of elements in each child's subtree.
        counts: ArrayVec<usize, B>,
        children: ArrayVec<Box<Node<T, B>>, B>,
    },
}

// Finds the child containing rank `idx`, and the rank relative to that child.
fn locate(counts: &[usize], mut idx: usize) -> Option<(usize, usize)> {
    for (child, &count) in counts.iter().enumerate() {
        if idx < count {
            return Some((child, idx));
        }
        idx -= count;
    }
    None
}

// Like `locate`, but for insertion: an index just past the end of a child
// belongs to that child.
fn locate_insertion(counts: &[usize], mut idx: usize) -> (usize, usize) {
    let last = counts.len() - 1;
    for (child, &count) in counts[..last].iter().enumerate() {
        if idx <= count {
            return (child, idx);
        }
        idx -= count;
    }
    (last, idx)
}

// Moves entries between two siblings so that both have at least half of them.
fn redistribute<U, const B: usize>(left: &mut ArrayVec<U, B>, right: &mut ArrayVec<U, B>) {
    let mut all: Vec<U> = left.drain(..).chain(right.drain(..)).collect();
    let right_half = all.split_off(all.len() / 2);
    left.extend(all);
    right.extend(right_half);
}

impl<T, const B: usize> Node<T, B> {
    /// The number of elements in this subtree.
    fn len(&self) -> usize {
        match self {
            Node::Leaf(data) => data.len(),
            Node::Branch { counts, .. } => counts.iter().sum(),
        }
    }

    /// The number of entries (elements or children) in this node itself.
    fn width(&self) -> usize {
        match self {
            Node::Leaf(data) => data.len(),
            Node::Branch { children, .. } => children.len(),
        }
    }

    fn get(&self, idx: usize) -> Option<&T> {
        match self {
            Node::Leaf(data) => data.get(idx),
            Node::Branch { counts, children } => {
                let (child, idx) = locate(counts, idx)?;
                children[child].get(idx)
            }
        }
    }

    fn last(&self) -> Option<&T> {
        match self {
            Node::Leaf(data) => data.last(),
            Node::Branch { children, .. } => children.last()?.last(),
        }
    }

    /// Inserts at `idx`, returning a new right-hand sibling if we had to split.
    fn insert(&mut self, idx: usize, element: T) -> Option<Box<Node<T, B>>> {
        match self {
            Node::Leaf(data) => {
                if data.is_full() {
                    let mut right: ArrayVec<T, B> = data.drain(B / 2..).collect();
                    if idx <= B / 2 {
                        data.insert(idx, element);
                    } else {
                        right.insert(idx - B / 2, element);
                    }
                    Some(Box::new(Node::Leaf(right)))
                } else {
                    data.insert(idx, element);
                    None
                }
            }
            Node::Branch { counts, children } => {
                let (child, child_idx) = locate_insertion(counts, idx);
                let Some(sibling) = children[child].insert(child_idx, element) else {
                    counts[child] += 1;
                    return None;
                };

                counts[child] = children[child].len();
                let sibling_count = sibling.len();
                let pos = child + 1;
                if children.is_full() {
                    let mut right_counts: ArrayVec<usize, B> = counts.drain(B / 2..).collect();
                    let mut right_children: ArrayVec<_, B> = children.drain(B / 2..).collect();
                    if pos <= B / 2 {
                        counts.insert(pos, sibling_count);
                        children.insert(pos, sibling);
                    } else {
                        right_counts.insert(pos - B / 2, sibling_count);
                        right_children.insert(pos - B / 2, sibling);
                    }
                    Some(Box::new(Node::Branch {
                        counts: right_counts,
                        children: right_children,
                    }))
                } else {
                    counts.insert(pos, sibling_count);
                    children.insert(pos, sibling);
                    None
                }
            }
        }
    }

    /// Removes the element at `idx`. The flag is true if this node is now undersized.
    fn remove(&mut self, idx: usize) -> (T, bool) {
        match self {
            Node::Leaf(data) => {
                let ret = data.remove(idx);
                (ret, data.len() < B / 2)
            }
            Node::Branch { counts, children } => {
                // unwrap: out-of-bounds indices are caught by `RankTree::remove`
                let (child, child_idx) = locate(counts, idx).unwrap();
                let (ret, undersized) = children[child].remove(child_idx);
                counts[child] -= 1;
                if undersized {
                    fix_undersized_child(counts, children, child);
                }
                (ret, children.len() < B / 2)
            }
        }
    }

    /// Moves everything from `right` into `self`, if it fits. Otherwise, shares
    /// entries evenly between the two.
    ///
    /// Returns true if `right` was emptied.
    fn merge_or_share(&mut self, right: &mut Node<T, B>) -> bool {
        let fits = self.width() + right.width() <= B;
        match (self, right) {
            (Node::Leaf(left), Node::Leaf(right)) => {
                if fits {
                    left.extend(right.drain(..));
                } else {
                    redistribute(left, right);
                }
            }
            (
                Node::Branch {
                    counts: left_counts,
                    children: left_children,
                },
                Node::Branch {
                    counts: right_counts,
                    children: right_children,
                },
            ) => {
                if fits {
                    left_counts.extend(right_counts.drain(..));
                    left_children.extend(right_children.drain(..));
                } else {
                    redistribute(left_counts, right_counts);
                    redistribute(left_children, right_children);
                }
            }
            // All leaves are at the same depth.
            _ => unreachable!(),
        }
        fits
    }

    fn check_invariants(&self, is_root: bool) -> usize {
        match self {
            Node::Leaf(data) => {
                if !is_root {
                    assert!(data.len() >= B / 2);
                }
                0
            }
            Node::Branch { counts, children } => {
                assert_eq!(counts.len(), children.len());
                if is_root {
                    assert!(children.len() >= 2);
                } else {
                    assert!(children.len() >= B / 2);
                }

                let mut depths = children.iter().zip(counts).map(|(child, &count)| {
                    assert_eq!(child.len(), count);
                    child.check_invariants(false)
                });
                // unwrap: branches always have children
                let depth = depths.next().unwrap();
                assert!(depths.all(|d| d == depth));
                depth + 1
            }
        }
    }
}

fn fix_undersized_child<T, const B: usize>(
    counts: &mut ArrayVec<usize, B>,
    children: &mut ArrayVec<Box<Node<T, B>>, B>,
    child: usize,
) {
    // Every branch has at least two children, so there's always a sibling.
    let left = if child + 1 < children.len() {
        child
    } else {
        child - 1
    };

    let (a, b) = children.split_at_mut(left + 1);
    // unwrap: both halves are non-empty by the choice of `left`
    let left_node = a.last_mut().unwrap();
    let right_node = b.first_mut().unwrap();
    if left_node.merge_or_share(right_node) {
        counts[left] = left_node.len();
        children.remove(left + 1);
        counts.remove(left + 1);
    } else {
        counts[left] = left_node.len();
        counts[left + 1] = right_node.len();
    }
}

impl<T, const B: usize> Default for RankTree<T, B> {
    fn default() -> Self {
        debug_assert!(B >= 4 && B % 2 == 0);
        Self {
            root: Box::new(Node::Leaf(ArrayVec::new())),
        }
    }
}

impl<T, const B: usize> RankTree<T, B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        match &*self.root {
            Node::Leaf(data) => data.is_empty(),
            Node::Branch { .. } => false,
        }
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.root.get(idx)
    }

    /// Inserts `element` at position `idx`, shifting everything after it to the right.
    ///
    /// # Panics
    ///
    /// Panics if `idx > self.len()`.
    pub fn insert(&mut self, idx: usize, element: T) {
        assert!(idx <= self.len(), "insertion index {idx} out of bounds");
        if let Some(sibling) = self.root.insert(idx, element) {
            let old_root = std::mem::replace(
                &mut self.root,
                Box::new(Node::Leaf(ArrayVec::new())),
            );
            let mut counts = ArrayVec::new();
            counts.push(old_root.len());
            counts.push(sibling.len());
            let mut children = ArrayVec::new();
            children.push(old_root);
            children.push(sibling);
            self.root = Box::new(Node::Branch { counts, children });
        }
    }

    /// Removes and returns the element at position `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len()`.
    pub fn remove(&mut self, idx: usize) -> T {
        assert!(idx < self.len(), "removal index {idx} out of bounds");
        let (ret, _) = self.root.remove(idx);

        if let Node::Branch { children, .. } = &mut *self.root {
            if children.len() == 1 {
                // unwrap: we just checked the length
                self.root = children.pop().unwrap();
            }
        }
        ret
    }

    /// Returns the index of the first element for which `pred` is false, assuming
    /// that `pred` is true for some prefix of the sequence and false afterwards.
    ///
    /// Unlike a binary search over indices, this walks down the tree once, testing
    /// `pred` on the last element of each child it passes.
    pub fn partition_point<P>(&self, mut pred: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let mut offset = 0;
        let mut node = &*self.root;
        loop {
            match node {
                Node::Leaf(data) => return offset + data.partition_point(&mut pred),
                Node::Branch { counts, children } => {
                    let next = children
                        .iter()
                        .position(|child| child.last().is_some_and(|x| !pred(x)));
                    let Some(idx) = next else {
                        return offset + counts.iter().sum::<usize>();
                    };
                    // Every child before this one is entirely `true`.
                    offset += counts[..idx].iter().sum::<usize>();
                    node = &children[idx];
                }
            }
        }
    }

    pub fn iter(&self) -> Iter<'_, T, B> {
        let mut ret = Iter {
            stack: Vec::new(),
            leaf: [].iter(),
            remaining: self.len(),
        };
        ret.descend(&self.root);
        ret
    }

    /// Panics if the tree is malformed.
    pub fn check_invariants(&self) {
        self.root.check_invariants(true);
    }
}

impl<T, const B: usize> FromIterator<T> for RankTree<T, B> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut ret = RankTree::new();
        for x in iter {
            ret.insert(ret.len(), x);
        }
        ret
    }
}

impl<T, const B: usize> std::ops::Index<usize> for RankTree<T, B> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        // unwrap: indexing out of bounds is supposed to panic
        self.get(idx).unwrap()
    }
}

impl<T: serde::Serialize, const B: usize> serde::Serialize for RankTree<T, B> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

pub struct Iter<'a, T, const B: usize> {
    stack: Vec<std::slice::Iter<'a, Box<Node<T, B>>>>,
    leaf: std::slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T, const B: usize> Iter<'a, T, B> {
    fn descend(&mut self, mut node: &'a Node<T, B>) {
        loop {
            match node {
                Node::Leaf(data) => {
                    self.leaf = data.iter();
                    return;
                }
                Node::Branch { children, .. } => {
                    let mut children = children.iter();
                    // unwrap: branches always have children
                    node = children.next().unwrap();
                    self.stack.push(children);
                }
            }
        }
    }
}

impl<'a, T, const B: usize> Iterator for Iter<'a, T, B> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if let Some(ret) = self.leaf.next() {
            return Some(ret);
        }
        loop {
            let top = self.stack.last_mut()?;
            let Some(node) = top.next() else {
                self.stack.pop();
                continue;
            };
            self.descend(node);
            return self.leaf.next();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, const B: usize> ExactSizeIterator for Iter<'_, T, B> {}
