use kurbo::{BezPath, PathEl, Rect};

use crate::geom::{Point, Segment};

/// An index into our segment arena.
///
/// Throughout this library, we assign identities to segments, so that we may
/// consider segments as different even if they have the same start- and end-points.
///
/// This index is used to identify a segment, whose data can be retrieved by looking
/// it up in [`Segments`]. (Of course, this index-as-identifier breaks down if there are
/// multiple `Segments` in flight. Just be careful not to mix them up.)
#[derive(
    Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SegIdx(pub usize);

impl std::fmt::Debug for SegIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s_{}", self.0)
    }
}

/// An arena of line segments.
///
/// Segments are indexed by [`SegIdx`] and can be retrieved by indexing (i.e. with square brackets).
///
/// Segments that were added as part of a polyline remember their neighbors in
/// that polyline. Neighbors always share an endpoint, and that shared endpoint
/// is never reported as an intersection.
#[derive(Debug, Clone, Default)]
pub struct Segments {
    segs: Vec<Segment>,
    contour_prev: Vec<Option<SegIdx>>,
    contour_next: Vec<Option<SegIdx>>,
    /// For each segment, stores true if the sweep-line order (small y to big y)
    /// is the same as the orientation in its original contour.
    orientation: Vec<bool>,
}

fn cyclic_pairs<T>(xs: &[T]) -> impl Iterator<Item = (&T, &T)> {
    pairs(xs).chain(xs.last().zip(xs.first()))
}

fn pairs<T>(xs: &[T]) -> impl Iterator<Item = (&T, &T)> {
    xs.windows(2).map(|pair| (&pair[0], &pair[1]))
}

// Collects the points of a polyline, dropping repeated points so that
// consecutive segments never have a zero-length segment between them.
fn polyline<P: Into<Point>>(ps: impl IntoIterator<Item = P>, closed: bool) -> Vec<Point> {
    let mut ps: Vec<Point> = ps.into_iter().map(|p| p.into()).collect();
    ps.dedup();
    if closed && ps.len() > 1 && ps.first() == ps.last() {
        ps.pop();
    }
    ps
}

impl Segments {
    /// The number of line segments in this arena.
    pub fn len(&self) -> usize {
        self.segs.len()
    }

    /// Returns true if there are no segments.
    pub fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }

    /// Iterate over all indices that can be used to index into this arena.
    pub fn indices(&self) -> impl Iterator<Item = SegIdx> {
        (0..self.segs.len()).map(SegIdx)
    }

    /// Iterate over all segments in this arena.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segs.iter()
    }

    /// Returns the starting point of the segment at `idx`, relative to the segment's original orientation.
    ///
    /// The start and end points of the segment itself are stored in sweep-line
    /// order (i.e. `start` has the smaller `y` coordinate), regardless of the
    /// original orientation of the segment. Use this method to retrieve the
    /// segment's original start point.
    pub fn oriented_start(&self, idx: SegIdx) -> &Point {
        if self.orientation[idx.0] {
            &self[idx].start
        } else {
            &self[idx].end
        }
    }

    /// Returns the ending point of the segment at `idx`, relative to the segment's original orientation.
    pub fn oriented_end(&self, idx: SegIdx) -> &Point {
        if self.orientation[idx.0] {
            &self[idx].end
        } else {
            &self[idx].start
        }
    }

    /// Returns the index of the segment following `idx`.
    ///
    /// If `idx` is part of a non-closed polyline and it is the last segment,
    /// or if it was added on its own, this returns `None`. If `idx` is part of
    /// a closed polyline, this will always return `Some`, and you might need to
    /// be careful to avoid looping infinitely.
    pub fn contour_next(&self, idx: SegIdx) -> Option<SegIdx> {
        self.contour_next[idx.0]
    }

    /// Returns the index of the segment preceding `idx`.
    ///
    /// See [`Segments::contour_next`].
    pub fn contour_prev(&self, idx: SegIdx) -> Option<SegIdx> {
        self.contour_prev[idx.0]
    }

    /// Are `i` and `j` consecutive segments of the same polyline?
    pub fn are_adjacent(&self, i: SegIdx, j: SegIdx) -> bool {
        i != j && (self.contour_next(i) == Some(j) || self.contour_prev(i) == Some(j))
    }

    /// Does the sweep-line orientation of `idx` agree with its original orientation?
    pub fn positively_oriented(&self, idx: SegIdx) -> bool {
        self.orientation[idx.0]
    }

    /// Where do segments `i` and `j` meet, if anywhere?
    ///
    /// The geometric test is always run with the smaller index first, so that
    /// asking about `(i, j)` and `(j, i)` can't give different answers due to
    /// rounding.
    pub fn intersect(&self, i: SegIdx, j: SegIdx) -> Option<Point> {
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        self[i].intersection(&self[j])
    }

    /// The smallest rectangle containing all the segments, or `None` if there aren't any.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.segs
            .iter()
            .map(|s| Rect::from_points(s.start.to_kurbo(), s.end.to_kurbo()))
            .reduce(|a, b| a.union(b))
    }

    fn push(&mut self, a: Point, b: Point, prev: Option<SegIdx>, next: Option<SegIdx>) -> SegIdx {
        let (seg, orient) = Segment::from_unordered(a, b);
        self.segs.push(seg);
        self.orientation.push(orient);
        self.contour_prev.push(prev);
        self.contour_next.push(next);
        SegIdx(self.segs.len() - 1)
    }

    /// Add a single segment that isn't part of any polyline.
    pub fn add_segment(&mut self, a: impl Into<Point>, b: impl Into<Point>) -> SegIdx {
        self.push(a.into(), b.into(), None, None)
    }

    /// Add a (non-closed) polyline to this arena.
    pub fn add_points<P: Into<Point>>(&mut self, ps: impl IntoIterator<Item = P>) {
        let old_len = self.segs.len();

        let ps = polyline(ps, false);
        if ps.len() <= 1 {
            return;
        }

        for (p, q) in pairs(&ps) {
            let idx = self.segs.len();
            self.push(*p, *q, Some(SegIdx(idx.saturating_sub(1))), Some(SegIdx(idx + 1)));
        }

        if let Some(first) = self.contour_prev.get_mut(old_len) {
            *first = None;
        }
        if let Some(last) = self.contour_next.last_mut() {
            *last = None;
        }
    }

    /// Add a collection of closed polylines to this arena.
    pub fn add_cycles<P: Into<Point>>(
        &mut self,
        ps: impl IntoIterator<Item = impl IntoIterator<Item = P>>,
    ) {
        for p in ps {
            self.add_cycle(p);
        }
    }

    /// Add a closed polyline to this arena.
    ///
    /// The last point is joined back to the first; there's no need to repeat
    /// the first point at the end (but it's harmless).
    pub fn add_cycle<P: Into<Point>>(&mut self, ps: impl IntoIterator<Item = P>) {
        let old_len = self.segs.len();

        let ps = polyline(ps, true);
        if ps.len() <= 1 {
            return;
        }

        for (p, q) in cyclic_pairs(&ps) {
            let idx = self.segs.len();
            self.push(*p, *q, Some(SegIdx(idx.saturating_sub(1))), Some(SegIdx(idx + 1)));
        }

        if let Some(first) = self.contour_prev.get_mut(old_len) {
            *first = Some(SegIdx(self.segs.len() - 1));
        }
        if let Some(last) = self.contour_next.last_mut() {
            *last = Some(SegIdx(old_len));
        }
    }

    /// Add the contents of a Bézier path, flattening curves into line segments
    /// that are within `tolerance` of the curve.
    ///
    /// Closed subpaths become cycles, and the others become open polylines.
    pub fn add_bez_path(&mut self, path: &BezPath, tolerance: f64) {
        fn finish(segs: &mut Segments, current: &mut Vec<Point>, closed: bool) {
            if closed {
                segs.add_cycle(current.drain(..));
            } else {
                segs.add_points(current.drain(..));
            }
        }

        let mut els = Vec::new();
        kurbo::flatten(path.elements().iter().cloned(), tolerance, |el| els.push(el));

        let mut current: Vec<Point> = Vec::new();
        for el in els {
            match el {
                PathEl::MoveTo(p) => {
                    finish(self, &mut current, false);
                    current.push(p.into());
                }
                PathEl::LineTo(p) => current.push(p.into()),
                PathEl::ClosePath => finish(self, &mut current, true),
                // `flatten` only produces lines.
                PathEl::QuadTo(..) | PathEl::CurveTo(..) => unreachable!(),
            }
        }
        finish(self, &mut current, false);
    }

    /// Construct a segment arena from a single closed polyline.
    pub fn from_closed_cycle<P: Into<Point>>(ps: impl IntoIterator<Item = P>) -> Self {
        let mut ret = Self::default();
        ret.add_cycle(ps);
        ret
    }
}

#[cfg(feature = "debug-svg")]
impl Segments {
    /// Draws all the segments, with the ones involved in an intersection in red.
    pub fn dump_svg(&self, intersections: &crate::Intersections) -> svg::Document {
        use svg::node::element::{Circle, Line};

        let flags = intersections.flags(self.len());
        let bbox = self.bounding_box().unwrap_or_default();
        let size = bbox.width().max(bbox.height()).max(1.0);
        let pad = size / 16.0;
        let stroke_width = size / 256.0;

        let mut document = svg::Document::new().set(
            "viewBox",
            (
                bbox.x0 - pad,
                bbox.y0 - pad,
                bbox.width() + 2.0 * pad,
                bbox.height() + 2.0 * pad,
            ),
        );
        for idx in self.indices() {
            let seg = &self[idx];
            let color = if flags[idx.0] { "red" } else { "black" };
            document = document.add(
                Line::new()
                    .set("id", format!("{idx:?}"))
                    .set("x1", seg.start.x)
                    .set("y1", seg.start.y)
                    .set("x2", seg.end.x)
                    .set("y2", seg.end.y)
                    .set("stroke", color)
                    .set("stroke-width", stroke_width),
            );
            for p in [seg.start, seg.end] {
                document = document.add(
                    Circle::new()
                        .set("cx", p.x)
                        .set("cy", p.y)
                        .set("r", stroke_width * 1.5)
                        .set("fill", "black"),
                );
            }
        }
        document
    }
}

impl std::ops::Index<SegIdx> for Segments {
    type Output = Segment;

    fn index(&self, index: SegIdx) -> &Self::Output {
        &self.segs[index.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn polyline_links() {
        let mut segs = Segments::default();
        segs.add_points([p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)]);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs.contour_prev(SegIdx(0)), None);
        assert_eq!(segs.contour_next(SegIdx(0)), Some(SegIdx(1)));
        assert_eq!(segs.contour_prev(SegIdx(1)), Some(SegIdx(0)));
        assert_eq!(segs.contour_next(SegIdx(1)), None);
        assert!(segs.are_adjacent(SegIdx(0), SegIdx(1)));
        assert!(segs.are_adjacent(SegIdx(1), SegIdx(0)));
    }

    #[test]
    fn cycle_links() {
        let segs = Segments::from_closed_cycle([p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]);
        assert_eq!(segs.len(), 4);
        assert_eq!(segs.contour_prev(SegIdx(0)), Some(SegIdx(3)));
        assert_eq!(segs.contour_next(SegIdx(3)), Some(SegIdx(0)));
        assert!(segs.are_adjacent(SegIdx(0), SegIdx(3)));
        assert!(!segs.are_adjacent(SegIdx(0), SegIdx(2)));
    }

    #[test]
    fn orientation() {
        let segs = Segments::from_closed_cycle([p(0.0, 0.0), p(1.0, 1.0), p(2.0, 0.0)]);
        assert!(segs.positively_oriented(SegIdx(0)));
        assert!(!segs.positively_oriented(SegIdx(1)));
        assert_eq!(segs.oriented_start(SegIdx(1)), &p(1.0, 1.0));
        assert_eq!(segs.oriented_end(SegIdx(1)), &p(2.0, 0.0));
        assert_eq!(segs[SegIdx(1)].start, p(2.0, 0.0));
    }

    #[test]
    fn repeated_points() {
        // The closing point and the doubled vertex are both dropped.
        let segs = Segments::from_closed_cycle([
            p(0.0, 0.0),
            p(1.0, 0.0),
            p(1.0, 0.0),
            p(1.0, 1.0),
            p(0.0, 0.0),
        ]);
        assert_eq!(segs.len(), 3);
        assert!(segs.segments().all(|s| !s.is_degenerate()));

        let mut segs = Segments::default();
        segs.add_points([p(0.0, 0.0), p(0.0, 0.0)]);
        assert!(segs.is_empty());
    }

    #[test]
    fn free_segments() {
        let mut segs = Segments::default();
        let a = segs.add_segment((0.0, 0.0), (1.0, 1.0));
        let b = segs.add_segment((1.0, 1.0), (2.0, 0.0));
        assert_eq!(segs.contour_next(a), None);
        assert!(!segs.are_adjacent(a, b));
        assert_eq!(segs.intersect(a, b), Some(p(1.0, 1.0)));
        assert_eq!(segs.intersect(b, a), Some(p(1.0, 1.0)));
    }

    #[test]
    fn bez_path() {
        let path = BezPath::from_svg("M0,0 L4,0 L4,4 Z M10,10 L11,11").unwrap();
        let mut segs = Segments::default();
        segs.add_bez_path(&path, 0.1);
        assert_eq!(segs.len(), 4);
        assert_eq!(segs.contour_next(SegIdx(2)), Some(SegIdx(0)));
        assert_eq!(segs.contour_next(SegIdx(3)), None);

        let bbox = segs.bounding_box().unwrap();
        assert_eq!(bbox, Rect::new(0.0, 0.0, 11.0, 11.0));
        assert_eq!(Segments::default().bounding_box(), None);
    }
}
