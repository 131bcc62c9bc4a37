//! Pairs of intersecting segments, and a cache for pairwise tests.

use std::collections::{BTreeSet, HashMap};

use crate::{geom::Point, SegIdx, Segments};

/// An unordered pair of segments.
///
/// The smaller index is always stored first, so `SegPair::new(a, b) == SegPair::new(b, a)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct SegPair {
    first: SegIdx,
    second: SegIdx,
}

impl std::fmt::Debug for SegPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.first, self.second)
    }
}

impl SegPair {
    /// The pair of `a` and `b`, in either order.
    pub fn new(a: SegIdx, b: SegIdx) -> Self {
        if a <= b {
            SegPair {
                first: a,
                second: b,
            }
        } else {
            SegPair {
                first: b,
                second: a,
            }
        }
    }

    /// The segment with the smaller index.
    pub fn first(&self) -> SegIdx {
        self.first
    }

    /// The segment with the larger index.
    pub fn second(&self) -> SegIdx {
        self.second
    }

    /// Does this pair involve `seg`?
    pub fn contains(&self, seg: SegIdx) -> bool {
        self.first == seg || self.second == seg
    }
}

impl From<(SegIdx, SegIdx)> for SegPair {
    fn from((a, b): (SegIdx, SegIdx)) -> Self {
        SegPair::new(a, b)
    }
}

/// The pairs of segments that touch or cross.
///
/// Each pair appears at most once, and iteration is in sorted order, so two
/// sweeps that find the same intersections produce equal `Intersections`, no
/// matter what order they found them in.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Intersections {
    pairs: BTreeSet<SegPair>,
}

impl Intersections {
    /// Adds a pair, returning `false` if it was already there.
    pub fn insert(&mut self, a: SegIdx, b: SegIdx) -> bool {
        self.pairs.insert(SegPair::new(a, b))
    }

    /// Do `a` and `b` meet? The order of the arguments doesn't matter.
    pub fn contains(&self, a: SegIdx, b: SegIdx) -> bool {
        self.pairs.contains(&SegPair::new(a, b))
    }

    /// The number of intersecting pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if nothing intersects.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates over the intersecting pairs, in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = SegPair> + '_ {
        self.pairs.iter().copied()
    }

    /// All the segments that are involved in at least one intersection.
    pub fn involved(&self) -> BTreeSet<SegIdx> {
        self.pairs
            .iter()
            .flat_map(|pair| [pair.first, pair.second])
            .collect()
    }

    /// For each of the first `len` segments, whether it is involved in an intersection.
    ///
    /// This is the shape a renderer wants: one color for unflagged edges, another
    /// for flagged ones.
    pub fn flags(&self, len: usize) -> Vec<bool> {
        let mut ret = vec![false; len];
        for pair in &self.pairs {
            for seg in [pair.first, pair.second] {
                if let Some(flag) = ret.get_mut(seg.0) {
                    *flag = true;
                }
            }
        }
        ret
    }
}

impl FromIterator<SegPair> for Intersections {
    fn from_iter<I: IntoIterator<Item = SegPair>>(iter: I) -> Self {
        Intersections {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Intersections {
    type Item = SegPair;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, SegPair>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter().copied()
    }
}

/// A cache for intersection tests, so that each pair of segments is tested at most once.
///
/// The sweep can ask about the same pair several times (every time the two
/// segments become neighbors, and again at every event point they share).
#[derive(Clone, Debug, Default)]
pub struct IntersectionCache {
    inner: HashMap<SegPair, Option<Point>>,
}

impl IntersectionCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Where segments `i` and `j` meet, if anywhere.
    pub fn intersect(&mut self, segments: &Segments, i: SegIdx, j: SegIdx) -> Option<Point> {
        *self
            .inner
            .entry(SegPair::new(i, j))
            .or_insert_with(|| segments.intersect(i, j))
    }

    /// The number of distinct pairs that have been tested.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no pairs have been tested.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
