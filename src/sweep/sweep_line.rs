//! The active segments, in their order along the sweep line.

use std::{cmp::Ordering, collections::HashSet, ops::Range};

use crate::{
    geom::Point,
    num::{approx_eq, CheapOrderedFloat},
    rank_tree::RankTree,
    SegIdx, Segments,
};

const B: usize = 32;

/// The segments that currently cross the sweep line, ordered from left to right.
///
/// The order between two segments depends on where the sweep line is: two
/// segments swap places where they cross. So rather than storing the sweep
/// position, every query that needs to compare segments takes the current
/// sweep point, along with a tolerance `eps` for deciding when two positions
/// are the same.
///
/// Within a run of segments meeting at a single point, the order is the order
/// they will have just after the sweep line moves past that point: sorted by
/// [`inverse_slope`](crate::Segment::inverse_slope), and then by index.
#[derive(Clone, Debug, Default)]
pub struct SweepLine {
    segs: RankTree<SegIdx, B>,
    members: HashSet<SegIdx>,
}

/// Compares two segments leaving the same point, by the order they'll have
/// just after the sweep line passes it.
pub(crate) fn cmp_leaving(segments: &Segments, a: SegIdx, b: SegIdx) -> Ordering {
    let slope = |s: SegIdx| CheapOrderedFloat::from(segments[s].inverse_slope());
    slope(a).cmp(&slope(b)).then(a.cmp(&b))
}

impl SweepLine {
    /// The number of active segments.
    pub fn len(&self) -> usize {
        self.segs.len()
    }

    /// Returns true if there are no active segments.
    pub fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }

    /// The segment at position `idx`, counting from the left.
    pub fn get(&self, idx: usize) -> Option<SegIdx> {
        self.segs.get(idx).copied()
    }

    /// The active segments, from left to right.
    pub fn iter(&self) -> impl Iterator<Item = SegIdx> + '_ {
        self.segs.iter().copied()
    }

    /// Is `seg` active?
    pub fn contains(&self, seg: SegIdx) -> bool {
        self.members.contains(&seg)
    }

    /// Compares two segments on a sweep line that sits at `at`.
    ///
    /// Segments whose horizontal positions agree up to `eps` are compared as if
    /// they were leaving a common point.
    pub fn compare(segments: &Segments, at: &Point, eps: f64, a: SegIdx, b: SegIdx) -> Ordering {
        let xa = segments[a].sweep_x(at);
        let xb = segments[b].sweep_x(at);
        if approx_eq(xa, xb, eps) {
            cmp_leaving(segments, a, b)
        } else {
            CheapOrderedFloat::from(xa).cmp(&CheapOrderedFloat::from(xb))
        }
    }

    /// Inserts `seg` at its sorted position, returning that position.
    ///
    /// # Panics
    ///
    /// Panics if `seg` is already present.
    pub fn insert(&mut self, segments: &Segments, at: &Point, eps: f64, seg: SegIdx) -> usize {
        assert!(self.members.insert(seg), "{seg:?} is already active");
        let idx = self
            .segs
            .partition_point(|&s| Self::compare(segments, at, eps, s, seg) == Ordering::Less);
        self.segs.insert(idx, seg);
        idx
    }

    /// Where is `seg` on the sweep line?
    pub fn position(&self, segments: &Segments, at: &Point, eps: f64, seg: SegIdx) -> Option<usize> {
        if !self.contains(seg) {
            return None;
        }

        // Look first among the segments close to where `seg` ought to be.
        let near = Point::new(segments[seg].sweep_x(at), at.y);
        let range = self.containing_range(segments, &near, eps);
        range
            .clone()
            .find(|&i| self.segs[i] == seg)
            .or_else(|| {
                tracing::warn!(?seg, ?at, ?range, "active segment out of place");
                self.segs.iter().position(|&s| s == seg)
            })
    }

    /// Removes `seg`, returning the position it was at.
    pub fn remove(&mut self, segments: &Segments, at: &Point, eps: f64, seg: SegIdx) -> Option<usize> {
        let idx = self.position(segments, at, eps, seg)?;
        self.segs.remove(idx);
        self.members.remove(&seg);
        Some(idx)
    }

    /// The segment immediately to the left of `seg`.
    pub fn predecessor(&self, segments: &Segments, at: &Point, eps: f64, seg: SegIdx) -> Option<SegIdx> {
        let idx = self.position(segments, at, eps, seg)?;
        idx.checked_sub(1).and_then(|i| self.get(i))
    }

    /// The segment immediately to the right of `seg`.
    pub fn successor(&self, segments: &Segments, at: &Point, eps: f64, seg: SegIdx) -> Option<SegIdx> {
        let idx = self.position(segments, at, eps, seg)?;
        self.get(idx + 1)
    }

    /// The positions of all segments that pass within `eps` of `p`.
    ///
    /// These form a contiguous run. If there are none, the returned range is
    /// empty and starts where a segment through `p` would be inserted.
    ///
    /// Closeness is measured perpendicular to each segment (see
    /// [`Segment::offset_from`](crate::Segment::offset_from)), so that a point
    /// computed as the crossing of two nearly horizontal segments is still
    /// found on both of them.
    pub fn containing_range(&self, segments: &Segments, p: &Point, eps: f64) -> Range<usize> {
        let start = self
            .segs
            .partition_point(|&s| segments[s].offset_from(p) > eps);
        let mut end = start;
        while let Some(&s) = self.segs.get(end) {
            if segments[s].offset_from(p).abs() > eps {
                break;
            }
            end += 1;
        }
        start..end
    }

    /// Replaces the segments in `range` by `new`, returning the positions of
    /// the inserted segments.
    ///
    /// `new` must already be in order; it's the caller's job to ensure that the
    /// resulting sequence is sorted.
    pub fn replace_range(&mut self, range: Range<usize>, new: &[SegIdx]) -> Range<usize> {
        for idx in range.clone().rev() {
            let seg = self.segs.remove(idx);
            self.members.remove(&seg);
        }
        for (offset, &seg) in new.iter().enumerate() {
            assert!(self.members.insert(seg), "{seg:?} is already active");
            self.segs.insert(range.start + offset, seg);
        }
        range.start..(range.start + new.len())
    }

    /// Checks that the active segments are sorted at `at`.
    ///
    /// The positions are allowed to be out of order by a little bit, since
    /// they are computed in floating point.
    #[cfg(feature = "slow-asserts")]
    pub fn check_invariants(&self, segments: &Segments, at: &Point) {
        self.segs.check_invariants();
        assert_eq!(self.segs.len(), self.members.len());

        let xs: Vec<f64> = self.iter().map(|s| segments[s].sweep_x(at)).collect();
        for (i, pair) in xs.windows(2).enumerate() {
            let slack = 1e-6 * (1.0 + pair[0].abs().max(pair[1].abs()));
            assert!(
                pair[0] <= pair[1] + slack,
                "{:?} and {:?} out of order at {at:?}",
                self.segs[i],
                self.segs[i + 1]
            );
        }
    }

    /// Checks that the active segments are sorted at `at`.
    ///
    /// This does nothing unless the `slow-asserts` feature is enabled.
    #[cfg(not(feature = "slow-asserts"))]
    pub fn check_invariants(&self, _segments: &Segments, _at: &Point) {}
}

impl serde::Serialize for SweepLine {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.segs.serialize(serializer)
    }
}
