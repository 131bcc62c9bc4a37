use crate::{
    geom::Point,
    num::{approx_eq, default_eps},
    pairs::{IntersectionCache, Intersections},
    Error, SegIdx, Segments,
};

use super::{
    events::{Event, EventQueue},
    sweep_line::{cmp_leaving, SweepLine},
};

/// Runs a sweep line over a collection of segments, collecting the pairs that
/// touch or cross.
///
/// This is a Bentley-Ottmann sweep. The sweep line moves in increasing `y`
/// (and within a horizontal line, in increasing `x`), stopping at every
/// segment endpoint and at every crossing point it discovers along the way.
/// At each stop, only segments that are neighbors on the sweep line get
/// tested against each other, so the total work is proportional to the
/// number of segments plus the number of intersections, times a logarithm.
///
/// Most callers will want [`find_intersections`](crate::find_intersections)
/// instead; using a `Sweeper` directly lets you choose the tolerance, and
/// watch the sweep one event at a time.
#[derive(Clone, Debug)]
pub struct Sweeper<'a> {
    segments: &'a Segments,
    eps: f64,
    events: EventQueue,
    line: SweepLine,
    cache: IntersectionCache,
    found: Intersections,
    point: Option<Point>,
    defect: Option<Error>,
}

// The largest coordinate, in absolute value.
fn max_abs(segments: &Segments) -> f64 {
    segments
        .segments()
        .flat_map(|s| [s.start, s.end])
        .fold(0.0, |m: f64, p| m.max(p.x.abs()).max(p.y.abs()))
}

impl<'a> Sweeper<'a> {
    /// Prepares a sweep over `segments`.
    ///
    /// `eps` is the tolerance for deciding that a segment passes through an
    /// event point; see [`default_eps`](crate::num::default_eps) for a
    /// reasonable choice. The segments must not contain NaN or infinite
    /// coordinates.
    ///
    /// Below a certain size (depending on the coordinates), the tolerance is
    /// smaller than the rounding error in the positions of segments, and the
    /// sweep line can't be kept in order. So an `eps` that is smaller than
    /// `default_eps` of the largest coordinate (or that isn't finite) is
    /// replaced by `default_eps`.
    pub fn new(segments: &'a Segments, eps: f64) -> Self {
        let min_eps = default_eps(max_abs(segments));
        let eps = if eps.is_finite() && eps >= min_eps {
            eps
        } else {
            if eps < min_eps {
                tracing::debug!(eps, min_eps, "tolerance too small, raising it");
            }
            min_eps
        };

        Sweeper {
            segments,
            eps,
            events: EventQueue::from_segments(segments),
            line: SweepLine::default(),
            cache: IntersectionCache::new(),
            found: Intersections::default(),
            point: None,
            defect: None,
        }
    }

    /// The tolerance in use.
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// The first inconsistency found on the sweep line, if any.
    ///
    /// This is always a bug; [`run`](Self::run) returns it as an error.
    pub fn defect(&self) -> Option<Error> {
        self.defect
    }

    /// The point of the most recently handled event.
    pub fn point(&self) -> Option<&Point> {
        self.point.as_ref()
    }

    /// The active segments, from left to right.
    pub fn sweep_line(&self) -> impl Iterator<Item = SegIdx> + '_ {
        self.line.iter()
    }

    /// The intersections found so far.
    pub fn intersections(&self) -> &Intersections {
        &self.found
    }

    /// The number of events still waiting.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Handles the next event, returning its point.
    ///
    /// Returns `None` once there are no events left.
    pub fn next_event(&mut self) -> Option<Point> {
        let event = self.events.pop_min()?;
        let point = event.point;
        self.handle_event(event);
        self.point = Some(point);
        Some(point)
    }

    /// Runs the sweep to completion.
    pub fn run(mut self) -> Result<Intersections, Error> {
        let mut steps = 0usize;
        while self.next_event().is_some() {
            steps += 1;
        }

        if let Some(err) = self.defect {
            return Err(err);
        }
        if !self.line.is_empty() {
            let remaining = self.line.len();
            tracing::warn!(remaining, "sweep finished with active segments");
            return Err(Error::UnfinishedSweep { remaining });
        }

        tracing::debug!(
            segments = self.segments.len(),
            events = steps,
            tests = self.cache.len(),
            intersections = self.found.len(),
            "sweep finished"
        );
        Ok(self.found)
    }

    // Tests a pair of segments, and records them if they meet.
    fn test_pair(&mut self, a: SegIdx, b: SegIdx) -> Option<Point> {
        if self.segments.are_adjacent(a, b) {
            return None;
        }
        let p = self.cache.intersect(self.segments, a, b)?;
        if self.found.insert(a, b) {
            tracing::trace!(?a, ?b, ?p, "found intersection");
        }
        Some(p)
    }

    // Tests two segments that have just become neighbors on the sweep line. If
    // they meet after the current event, the sweep needs to stop there.
    fn test_neighbors(&mut self, left: usize, right: usize, p: &Point) {
        let (Some(a), Some(b)) = (self.line.get(left), self.line.get(right)) else {
            return;
        };
        if let Some(mut q) = self.test_pair(a, b) {
            if q < *p && approx_eq(q.y, p.y, self.eps) {
                // The crossing was computed just below the sweep line, but the
                // two segments haven't swapped yet. Swap them on this line.
                q = Point::new(q.x, p.y);
            }
            if q > *p && self.events.push(q) {
                tracing::trace!(?a, ?b, ?q, "scheduled crossing");
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        let Event { point: p, starts, ends } = event;
        let segments = self.segments;
        let eps = self.eps;
        tracing::trace!(?p, starts = starts.len(), ends = ends.len(), "event");

        // Everything already on the sweep line that passes through `p`. This
        // includes the segments ending here, and those crossing here.
        let mut range = self.line.containing_range(segments, &p, eps);
        for &seg in &ends {
            match self.line.position(segments, &p, eps, seg) {
                Some(idx) if !range.contains(&idx) => {
                    tracing::warn!(?seg, ?p, "ending segment doesn't pass through its end");
                    self.defect.get_or_insert(Error::Misplaced { seg });
                    // Still take it off the line, so the sweep can finish.
                    range = range.start.min(idx)..range.end.max(idx + 1);
                }
                Some(_) => {}
                None => {
                    tracing::warn!(?seg, ?p, "ending segment isn't active");
                    self.defect.get_or_insert(Error::Misplaced { seg });
                }
            }
        }
        let through: Vec<SegIdx> = range.clone().filter_map(|i| self.line.get(i)).collect();

        // Every pair meeting at `p` gets reported, not just the neighbors.
        let meeting: Vec<SegIdx> = through.iter().chain(&starts).copied().collect();
        for (i, &a) in meeting.iter().enumerate() {
            for &b in &meeting[(i + 1)..] {
                self.test_pair(a, b);
            }
        }

        let mut leaving: Vec<SegIdx> = through
            .into_iter()
            .filter(|s| !ends.contains(s))
            .chain(starts)
            .collect();
        leaving.sort_by(|&a, &b| cmp_leaving(segments, a, b));

        // If nothing was inserted, this tests the two segments on either side
        // of `p`, which have just become neighbors.
        let inserted = self.line.replace_range(range, &leaving);
        if let Some(left) = inserted.start.checked_sub(1) {
            self.test_neighbors(left, inserted.start, &p);
        }
        if !inserted.is_empty() {
            self.test_neighbors(inserted.end - 1, inserted.end, &p);
        }

        self.line.check_invariants(segments, &p);
    }
}

/// Finds all pairs of segments that touch or cross, by testing every pair.
///
/// This takes quadratic time, so it's only useful for small inputs and for
/// checking the output of a [`Sweeper`].
pub fn brute_force(segments: &Segments) -> Intersections {
    let mut ret = Intersections::default();
    let indices: Vec<SegIdx> = segments.indices().collect();
    for (i, &a) in indices.iter().enumerate() {
        for &b in &indices[(i + 1)..] {
            if !segments.are_adjacent(a, b) && segments.intersect(a, b).is_some() {
                ret.insert(a, b);
            }
        }
    }
    ret
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::*;
    use crate::{
        geom::Segment,
        num::{default_eps, tests::Reasonable},
        pairs::SegPair,
    };

    fn sweep(segments: &Segments) -> Intersections {
        Sweeper::new(segments, 1e-9).run().unwrap()
    }

    fn pairs(ints: &Intersections) -> Vec<(usize, usize)> {
        ints.iter().map(|p| (p.first().0, p.second().0)).collect()
    }

    #[test]
    fn unit_square() {
        let segs = Segments::from_closed_cycle([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert!(sweep(&segs).is_empty());
    }

    #[test]
    fn crossing() {
        let mut segs = Segments::default();
        segs.add_segment((0.0, 0.0), (1.0, 1.0));
        segs.add_segment((0.0, 1.0), (1.0, 0.0));
        assert_eq!(pairs(&sweep(&segs)), vec![(0, 1)]);

        let mut segs = Segments::default();
        segs.add_segment((0.0, 0.0), (2.0, 2.0));
        segs.add_segment((0.0, 2.0), (2.0, 0.0));
        let ints = sweep(&segs);
        assert_eq!(pairs(&ints), vec![(0, 1)]);
        assert_eq!(segs.intersect(SegIdx(0), SegIdx(1)), Some(Point::new(1.0, 1.0)));
    }

    #[test]
    fn bowtie() {
        let segs = Segments::from_closed_cycle([(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]);
        insta::assert_compact_debug_snapshot!(sweep(&segs).iter().collect::<Vec<_>>(), @"[(s_0, s_2)]");
    }

    #[test]
    fn collinear_chain() {
        // Touching end to end, but consecutive along a polyline.
        let mut segs = Segments::default();
        segs.add_points([(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
        assert!(sweep(&segs).is_empty());

        // Free segments, with gaps between them.
        let mut segs = Segments::default();
        for i in 0..4 {
            let x = i as f64;
            segs.add_segment((x, x), (x + 0.5, x + 0.5));
        }
        assert!(sweep(&segs).is_empty());
    }

    #[test]
    fn free_segments_touching() {
        // Not part of a contour, so the shared endpoint counts.
        let mut segs = Segments::default();
        segs.add_segment((0.0, 0.0), (1.0, 1.0));
        segs.add_segment((1.0, 1.0), (2.0, 0.0));
        assert_eq!(pairs(&sweep(&segs)), vec![(0, 1)]);
    }

    #[test]
    fn horizontal_and_vertical() {
        let mut segs = Segments::default();
        segs.add_segment((0.0, 1.0), (4.0, 1.0));
        segs.add_segment((1.0, 0.0), (1.0, 2.0));
        segs.add_segment((3.0, 0.0), (3.0, 0.5));
        segs.add_segment((3.0, 1.0), (3.0, 3.0));
        segs.add_segment((5.0, 0.0), (5.0, 2.0));
        assert_eq!(pairs(&sweep(&segs)), vec![(0, 1), (0, 3)]);
    }

    #[test]
    fn horizontal_through_several() {
        let mut segs = Segments::default();
        segs.add_segment((0.0, 0.0), (0.0, 2.0));
        segs.add_segment((1.0, 0.0), (2.0, 2.0));
        segs.add_segment((3.0, 2.0), (2.0, 0.0));
        segs.add_segment((-1.0, 1.0), (5.0, 1.0));
        assert_eq!(pairs(&sweep(&segs)), vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[test]
    fn three_through_a_point() {
        let mut segs = Segments::default();
        segs.add_segment((0.0, 0.0), (2.0, 2.0));
        segs.add_segment((1.0, 0.0), (1.0, 2.0));
        segs.add_segment((2.0, 0.0), (0.0, 2.0));
        assert_eq!(pairs(&sweep(&segs)), vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn touching_in_the_middle() {
        // `b` ends on `a`'s interior, `c` starts on it.
        let mut segs = Segments::default();
        segs.add_segment((0.0, 0.0), (4.0, 4.0));
        segs.add_segment((3.0, 0.0), (1.0, 1.0));
        segs.add_segment((2.0, 2.0), (0.0, 5.0));
        assert_eq!(pairs(&sweep(&segs)), vec![(0, 1), (0, 2)]);
    }

    #[test]
    fn crossing_after_reorder() {
        // `a` and `c` only become neighbors after `b` ends.
        let mut segs = Segments::default();
        segs.add_segment((0.0, 0.0), (4.0, 4.0));
        segs.add_segment((2.0, 0.0), (2.0, 1.0));
        segs.add_segment((4.0, 0.0), (0.0, 4.0));
        assert_eq!(pairs(&sweep(&segs)), vec![(0, 2)]);
    }

    #[test]
    fn degenerate_and_empty() {
        assert!(sweep(&Segments::default()).is_empty());

        let mut segs = Segments::default();
        segs.add_segment((1.0, 1.0), (1.0, 1.0));
        segs.add_segment((0.0, 0.0), (2.0, 2.0));
        assert!(sweep(&segs).is_empty());
    }

    #[test]
    fn stepping() {
        let mut segs = Segments::default();
        let a = segs.add_segment((0.0, 0.0), (1.0, 1.0));
        let b = segs.add_segment((0.0, 1.0), (1.0, 0.0));
        let mut sweeper = Sweeper::new(&segs, 1e-9);
        assert_eq!(sweeper.pending_events(), 4);

        assert_eq!(sweeper.next_event(), Some(Point::new(0.0, 0.0)));
        assert_eq!(sweeper.sweep_line().collect::<Vec<_>>(), vec![a]);
        assert_eq!(sweeper.next_event(), Some(Point::new(1.0, 0.0)));
        assert_eq!(sweeper.sweep_line().collect::<Vec<_>>(), vec![a, b]);
        // Now that they're neighbors, the crossing is known.
        assert!(sweeper.intersections().contains(a, b));
        assert_eq!(sweeper.next_event(), Some(Point::new(0.5, 0.5)));
        assert_eq!(sweeper.sweep_line().collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(sweeper.point(), Some(&Point::new(0.5, 0.5)));

        let ints = sweeper.run().unwrap();
        assert_eq!(ints.len(), 1);
    }

    #[test]
    fn unfinished() {
        let mut segs = Segments::default();
        let a = segs.add_segment((0.0, 0.0), (1.0, 1.0));
        let mut sweeper = Sweeper::new(&segs, 1e-9);
        sweeper.next_event();
        // Force the end event to go missing.
        sweeper.events = EventQueue::default();
        assert_eq!(sweeper.sweep_line().collect::<Vec<_>>(), vec![a]);
        assert_matches!(sweeper.run(), Err(Error::UnfinishedSweep { remaining: 1 }));
    }

    #[test]
    fn tiny_eps_is_raised() {
        let mut segs = Segments::default();
        segs.add_segment((0.0, 0.0), (1000.0, 1.0));
        let floor = default_eps(1000.0);
        for eps in [0.0, -1.0, 1e-16, f64::NAN, f64::INFINITY] {
            assert_eq!(Sweeper::new(&segs, eps).eps(), floor);
        }
        assert_eq!(Sweeper::new(&segs, 0.5).eps(), 0.5);
    }

    #[test]
    fn tiny_eps() {
        // With a zero (or negative) tolerance, the sweep line would fall out of
        // order here and miss some crossings.
        let mut segs = Segments::default();
        segs.add_segment((2.0, 0.0), (0.0, 4.0));
        segs.add_segment((1.0, 1.0), (1.0, 2.0));
        segs.add_segment((3.0, 0.0), (0.0, 3.0));
        segs.add_segment((4.0, 2.0), (2.0, 4.0));
        segs.add_segment((4.0, 1.0), (3.0, 3.0));
        segs.add_segment((0.0, 1.0), (4.0, 3.0));
        segs.add_segment((1.0, 4.0), (3.0, 0.0));
        segs.add_segment((0.0, 2.0), (4.0, 2.0));
        segs.add_segment((2.0, 0.0), (2.0, 4.0));
        segs.add_segment((0.0, 0.0), (4.0, 4.0));
        let reference = brute_force(&segs);
        for eps in [0.0, 1e-16, -1.0] {
            assert_eq!(Sweeper::new(&segs, eps).run().unwrap(), reference, "eps = {eps}");
        }
    }

    #[test]
    fn misplaced() {
        let mut segs = Segments::default();
        let a = segs.add_segment((0.0, 0.0), (1.0, 1.0));
        let mut sweeper = Sweeper::new(&segs, 1e-9);
        sweeper.next_event();
        // Take `a` off the sweep line behind the sweeper's back.
        sweeper.line.replace_range(0..1, &[]);
        assert_eq!(sweeper.defect(), None);
        sweeper.next_event();
        assert_eq!(sweeper.defect(), Some(Error::Misplaced { seg: a }));
        assert_matches!(sweeper.run(), Err(Error::Misplaced { seg }) if seg == a);
    }

    fn reasonable_segments(max: usize) -> impl Strategy<Value = Segments> {
        prop::collection::vec(Segment::reasonable(), 0..max).prop_map(|segs| {
            let mut ret = Segments::default();
            for s in segs {
                ret.add_segment(s.start, s.end);
            }
            ret
        })
    }

    fn reasonable_polygon(max: usize) -> impl Strategy<Value = Segments> {
        prop::collection::vec(<(f64, f64)>::reasonable(), 3..max)
            .prop_map(|pts| Segments::from_closed_cycle(pts))
    }

    fn eps_for(segs: &Segments) -> f64 {
        let max_abs = segs
            .bounding_box()
            .map(|r| r.x0.abs().max(r.x1.abs()).max(r.y0.abs()).max(r.y1.abs()))
            .unwrap_or(0.0);
        default_eps(max_abs)
    }

    proptest! {
        #[test]
        fn matches_brute_force(segs in reasonable_segments(12)) {
            let ints = Sweeper::new(&segs, eps_for(&segs)).run().unwrap();
            prop_assert_eq!(ints, brute_force(&segs));
        }

        #[test]
        fn polygon_matches_brute_force(segs in reasonable_polygon(12)) {
            let ints = Sweeper::new(&segs, eps_for(&segs)).run().unwrap();
            prop_assert_eq!(ints, brute_force(&segs));
        }

        #[test]
        fn order_doesnt_matter(segs in prop::collection::vec(Segment::reasonable(), 0..10)) {
            let mut fwd = Segments::default();
            for s in &segs {
                fwd.add_segment(s.start, s.end);
            }
            let mut rev = Segments::default();
            for s in segs.iter().rev() {
                rev.add_segment(s.start, s.end);
            }
            let n = segs.len();

            let fwd_ints = Sweeper::new(&fwd, eps_for(&fwd)).run().unwrap();
            let rev_ints: Intersections = Sweeper::new(&rev, eps_for(&rev))
                .run()
                .unwrap()
                .iter()
                .map(|p| SegPair::new(SegIdx(n - 1 - p.first().0), SegIdx(n - 1 - p.second().0)))
                .collect();
            prop_assert_eq!(fwd_ints, rev_ints);
        }

        #[test]
        fn idempotent(segs in reasonable_segments(10)) {
            let eps = eps_for(&segs);
            let first = Sweeper::new(&segs, eps).run().unwrap();
            let second = Sweeper::new(&segs, eps).run().unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
