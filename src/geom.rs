//! Geometric primitives, like points and lines, and the intersection kernel.

use crate::num::{approx_eq, CheapOrderedFloat};

/// A two-dimensional point.
///
/// Points are sorted by `y` and then by `x`, for the convenience of our sweep-line
/// algorithm (which moves in increasing `y`).
#[derive(Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    /// Horizontal component.
    pub x: f64,
    /// Vertical coordinate. The sweep line moves in the direction of increasing `y`.
    pub y: f64,
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (
            CheapOrderedFloat::from(self.y),
            CheapOrderedFloat::from(self.x),
        )
            .cmp(&(
                CheapOrderedFloat::from(other.y),
                CheapOrderedFloat::from(other.x),
            ))
    }
}

impl PartialOrd for Point {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Point {}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl Point {
    /// Create a new point.
    ///
    /// Note that the `x` coordinate comes first, even though we sort by `y` first.
    pub fn new(x: f64, y: f64) -> Self {
        debug_assert!(!x.is_nan());
        debug_assert!(!y.is_nan());
        Point { x, y }
    }

    /// Compute an affine combination between `self` and `other`; that is, `(1 - t) * self + t * other`.
    pub fn affine(&self, other: &Self, t: f64) -> Self {
        Point {
            x: (1.0 - t) * self.x + t * other.x,
            y: (1.0 - t) * self.y + t * other.y,
        }
    }

    /// Is either coordinate NaN?
    pub fn is_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }

    /// Are both coordinates finite?
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Convert to a `kurbo` point.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// A line segment, in sweep-line order.
///
/// `start` is never bigger than `end` (in the order of [`Point`]), so the sweep line
/// meets `start` first. The orientation the segment was drawn with is remembered by
/// [`Segments`](crate::Segments), not here.
#[derive(Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// The endpoint that the sweep line meets first.
    pub start: Point,
    /// The endpoint that the sweep line meets last.
    pub end: Point,
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -- {:?}", self.start, self.end)
    }
}

impl Segment {
    /// Create a new segment.
    ///
    /// `start` must be less than or equal to `end`.
    pub fn new(start: Point, end: Point) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Create a segment between two points given in any order.
    ///
    /// Also returns `true` if `a` became the start (that is, if the sweep-line
    /// order agrees with the order the points were given in).
    pub fn from_unordered(a: Point, b: Point) -> (Self, bool) {
        if a <= b {
            (Self::new(a, b), true)
        } else {
            (Self::new(b, a), false)
        }
    }

    /// Convert to a `kurbo` line, from `start` to `end`.
    pub fn to_kurbo(&self) -> kurbo::Line {
        kurbo::Line::new(self.start.to_kurbo(), self.end.to_kurbo())
    }

    /// Returns true if this segment is exactly horizontal.
    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    /// Returns true if this segment has zero length.
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// The smallest `x` coordinate on this segment.
    pub fn min_x(&self) -> f64 {
        self.start.x.min(self.end.x)
    }

    /// The largest `x` coordinate on this segment.
    pub fn max_x(&self) -> f64 {
        self.start.x.max(self.end.x)
    }

    /// The horizontal distance travelled per unit of vertical distance.
    ///
    /// Segments leaving a common point are ordered by this, left to right.
    /// Horizontal segments return positive infinity: they lie to the right
    /// of everything else leaving the same point.
    pub fn inverse_slope(&self) -> f64 {
        if self.is_horizontal() {
            f64::INFINITY
        } else {
            (self.end.x - self.start.x) / (self.end.y - self.start.y)
        }
    }

    // The x coordinate of our line at height `y`, without any range checks.
    //
    // Endpoint heights return the endpoint exactly, so that a segment ending at an
    // event point is found exactly where the event is.
    fn line_x(&self, y: f64) -> f64 {
        if y == self.start.y {
            self.start.x
        } else if y == self.end.y {
            self.end.x
        } else {
            let t = (y - self.start.y) / (self.end.y - self.start.y);
            self.start.x + t * (self.end.x - self.start.x)
        }
    }

    /// Our `x` coordinate at height `y`.
    ///
    /// Returns `None` if the segment doesn't reach height `y`; the boundary is
    /// checked with a slack of `eps` (see [`approx_eq`]), since heights coming
    /// from computed intersection points are rarely exact. The returned value is
    /// clamped to our horizontal extent.
    ///
    /// Horizontal segments have no single `x` coordinate at their height, so they
    /// always return `None`. The sweep places them explicitly instead; see
    /// [`Segment::sweep_x`].
    pub fn x_at_height(&self, y: f64, eps: f64) -> Option<f64> {
        if self.is_horizontal() {
            return None;
        }

        let within = (self.start.y < y && y < self.end.y)
            || approx_eq(y, self.start.y, eps)
            || approx_eq(y, self.end.y, eps);
        within.then(|| self.line_x(y).clamp(self.min_x(), self.max_x()))
    }

    /// Our horizontal position on a sweep line that currently sits at `p`.
    ///
    /// For non-horizontal segments, this is just the `x` coordinate at height
    /// `p.y`. A horizontal segment is being swept "from left to right" while the
    /// sweep line sits at its height, and so its position is wherever the sweep
    /// is, clamped to the segment.
    pub fn sweep_x(&self, p: &Point) -> f64 {
        if self.is_horizontal() {
            p.x.clamp(self.start.x, self.end.x)
        } else {
            self.line_x(p.y).clamp(self.min_x(), self.max_x())
        }
    }

    /// How far `p` is to the right of the line through this segment.
    ///
    /// This is a signed perpendicular distance: negative values are to the left.
    /// Unlike a difference of `x` coordinates, it stays small for points near a
    /// nearly horizontal segment, which is what makes it a good test for whether
    /// a computed point lies on a segment.
    pub fn offset_from(&self, p: &Point) -> f64 {
        let d = self.end.to_kurbo() - self.start.to_kurbo();
        let v = p.to_kurbo() - self.start.to_kurbo();
        let len = d.hypot();
        if len == 0.0 {
            v.hypot()
        } else {
            -d.cross(v) / len
        }
    }

    /// The point at which we meet `other`, if any.
    ///
    /// We write both segments as `p + t * (q - p)` and solve for the two
    /// parameters. The segments meet if both parameters are in the closed interval
    /// `[0, 1]`, so segments that only touch at their ends do meet.
    ///
    /// Two segments with an endpoint in common always meet there, even if they are
    /// collinear. Apart from that, parallel segments (including collinear ones,
    /// overlapping or not) never meet. Zero-length segments never meet anything.
    pub fn intersection(&self, other: &Segment) -> Option<Point> {
        if self.is_degenerate() || other.is_degenerate() {
            return None;
        }
        if self.start == other.start || self.start == other.end {
            return Some(self.start);
        }
        if self.end == other.start || self.end == other.end {
            return Some(self.end);
        }

        let (d1x, d1y) = (self.end.x - self.start.x, self.end.y - self.start.y);
        let (d2x, d2y) = (other.end.x - other.start.x, other.end.y - other.start.y);

        let denom = -d2x * d1y + d1x * d2y;
        if denom == 0.0 {
            return None;
        }

        let ox = self.start.x - other.start.x;
        let oy = self.start.y - other.start.y;
        // `s` runs along `other`, `t` runs along `self`.
        let s = (-d1y * ox + d1x * oy) / denom;
        let t = (d2x * oy - d2y * ox) / denom;

        // Written this way round so that NaNs (from overflow) are rejected.
        let unit = 0.0..=1.0;
        if !unit.contains(&s) || !unit.contains(&t) {
            return None;
        }

        // If we touch at an endpoint, return the endpoint exactly.
        let p = if t == 0.0 {
            self.start
        } else if t == 1.0 {
            self.end
        } else if s == 0.0 {
            other.start
        } else if s == 1.0 {
            other.end
        } else {
            // Horizontal and vertical segments have an exact coordinate, which
            // rounding shouldn't be allowed to move.
            let x = if self.start.x == self.end.x {
                self.start.x
            } else if other.start.x == other.end.x {
                other.start.x
            } else {
                self.start.x + t * d1x
            };
            let y = if self.is_horizontal() {
                self.start.y
            } else if other.is_horizontal() {
                other.start.y
            } else {
                self.start.y + t * d1y
            };
            Point::new(x, y)
        };
        Some(p)
    }
}

/// The point at which two segments meet, if any. See [`Segment::intersection`].
pub fn intersection(s1: &Segment, s2: &Segment) -> Option<Point> {
    s1.intersection(s2)
}

/// Where `segment` crosses height `y`, if it does. See [`Segment::x_at_height`].
pub fn x_at_height(segment: &Segment, y: f64, eps: f64) -> Option<f64> {
    segment.x_at_height(y, eps)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::num::tests::Reasonable;
    use proptest::prelude::*;

    impl Reasonable for Point {
        type Strategy = BoxedStrategy<Point>;

        fn reasonable() -> Self::Strategy {
            (f64::reasonable(), f64::reasonable())
                .prop_map(|(x, y)| Point::new(x, y))
                .boxed()
        }
    }

    impl Reasonable for Segment {
        type Strategy = BoxedStrategy<Segment>;

        fn reasonable() -> Self::Strategy {
            (Point::reasonable(), Point::reasonable())
                .prop_map(|(a, b)| Segment::from_unordered(a, b).0)
                .boxed()
        }
    }

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::from_unordered(Point::new(x0, y0), Point::new(x1, y1)).0
    }

    #[test]
    fn point_order() {
        assert!(Point::new(5.0, 0.0) < Point::new(0.0, 1.0));
        assert!(Point::new(0.0, 1.0) < Point::new(1.0, 1.0));
        assert_eq!(Point::new(0.0, -0.0), Point::new(-0.0, 0.0));
    }

    #[test]
    fn crossing() {
        let a = seg(0.0, 0.0, 2.0, 2.0);
        let b = seg(0.0, 2.0, 2.0, 0.0);
        assert_eq!(intersection(&a, &b), Some(Point::new(1.0, 1.0)));
        assert_eq!(intersection(&b, &a), Some(Point::new(1.0, 1.0)));

        let kurbo = a.to_kurbo().crossing_point(b.to_kurbo()).unwrap();
        assert_eq!(Point::from(kurbo), Point::new(1.0, 1.0));
    }

    #[test]
    fn touching() {
        // Shared endpoint.
        let a = seg(0.0, 0.0, 1.0, 0.0);
        let b = seg(1.0, 0.0, 1.0, 1.0);
        assert_eq!(intersection(&a, &b), Some(Point::new(1.0, 0.0)));

        // One endpoint in the interior of the other.
        let c = seg(-1.0, 1.0, 1.0, 1.0);
        let d = seg(0.0, 1.0, 0.0, 3.0);
        assert_eq!(intersection(&c, &d), Some(Point::new(0.0, 1.0)));
        assert_eq!(intersection(&d, &c), Some(Point::new(0.0, 1.0)));
    }

    #[test]
    fn misses() {
        // The lines cross, but not the segments.
        let a = seg(0.0, 0.0, 1.0, 1.0);
        let b = seg(3.0, 0.0, 2.0, 1.0);
        assert_eq!(intersection(&a, &b), None);

        // Parallel.
        let c = seg(0.0, 1.0, 1.0, 2.0);
        assert_eq!(intersection(&a, &c), None);

        // Collinear and overlapping: deliberately unhandled.
        let d = seg(0.5, 0.5, 2.0, 2.0);
        assert_eq!(intersection(&a, &d), None);

        // Zero length, even when sitting on the other segment.
        let e = seg(0.5, 0.5, 0.5, 0.5);
        assert_eq!(intersection(&a, &e), None);
        assert_eq!(intersection(&e, &e), None);
    }

    #[test]
    fn collinear_shared_endpoint() {
        let a = seg(0.0, 0.0, 1.0, 0.0);
        let b = seg(1.0, 0.0, 2.0, 0.0);
        assert_eq!(intersection(&a, &b), Some(Point::new(1.0, 0.0)));

        // Duplicated segments share both endpoints.
        assert_eq!(intersection(&a, &a), Some(Point::new(0.0, 0.0)));

        // Collinear with a gap: no contact.
        let c = seg(1.5, 0.0, 2.0, 0.0);
        assert_eq!(intersection(&a, &c), None);
    }

    #[test]
    fn offsets() {
        let v = seg(0.0, 0.0, 0.0, 2.0);
        assert_eq!(v.offset_from(&Point::new(1.0, 1.0)), 1.0);
        assert_eq!(v.offset_from(&Point::new(-2.0, 5.0)), -2.0);
        assert_eq!(v.offset_from(&Point::new(0.0, 1.0)), 0.0);

        // Nearly horizontal: a small vertical error is a small offset, even
        // though it's a big horizontal error.
        let h = seg(0.0, 0.0, 1e6, 1.0);
        assert!(h.offset_from(&Point::new(5e5, 0.5 + 1e-9)).abs() < 1e-8);
    }

    #[test]
    fn vertical_and_horizontal() {
        let v = seg(1.0, -1.0, 1.0, 1.0);
        let h = seg(0.0, 0.0, 3.0, 0.0);
        assert_eq!(intersection(&v, &h), Some(Point::new(1.0, 0.0)));
        assert!(h.is_horizontal());
        assert_eq!(h.inverse_slope(), f64::INFINITY);
        assert_eq!(v.inverse_slope(), 0.0);
    }

    #[test]
    fn exact_coordinates() {
        // In floating point, 0.1 * 3.0 != 0.3. The crossing with a horizontal
        // segment is still exactly at its height.
        let h = seg(-1.0, 0.3, 1.0, 0.3);
        let a = seg(-0.7, 0.0, 0.3, 1.0);
        let p = intersection(&a, &h).unwrap();
        assert_eq!(p.y, 0.3);

        let v = seg(0.1, -1.0, 0.1, 1.0);
        let b = seg(-1.0, -0.9, 1.0, 0.7);
        let q = intersection(&v, &b).unwrap();
        assert_eq!(q.x, 0.1);
    }

    #[test]
    fn heights() {
        let eps = 1e-9;
        let a = seg(0.0, 0.0, 2.0, 4.0);
        assert_eq!(x_at_height(&a, 0.0, eps), Some(0.0));
        assert_eq!(x_at_height(&a, 2.0, eps), Some(1.0));
        assert_eq!(x_at_height(&a, 4.0, eps), Some(2.0));
        assert_eq!(x_at_height(&a, 4.0 + 1e-12, eps), Some(2.0));
        assert_eq!(x_at_height(&a, 5.0, eps), None);
        assert_eq!(x_at_height(&a, -1.0, eps), None);

        // Vertical segments have a single x, but still a bounded height.
        let v = seg(3.0, 0.0, 3.0, 1.0);
        assert_eq!(x_at_height(&v, 0.5, eps), Some(3.0));
        assert_eq!(x_at_height(&v, 2.0, eps), None);

        // Horizontal segments are placed by the sweep, not by height.
        let h = seg(0.0, 1.0, 2.0, 1.0);
        assert_eq!(x_at_height(&h, 1.0, eps), None);
        assert_eq!(h.sweep_x(&Point::new(1.5, 1.0)), 1.5);
        assert_eq!(h.sweep_x(&Point::new(-1.0, 1.0)), 0.0);
        assert_eq!(a.sweep_x(&Point::new(100.0, 2.0)), 1.0);
    }

    proptest! {
        #[test]
        fn intersection_is_on_first_segment((a, b) in <(Segment, Segment)>::reasonable()) {
            if let Some(p) = intersection(&a, &b) {
                let slack = 1e-6;
                prop_assert!(p.x >= a.min_x() - slack && p.x <= a.max_x() + slack);
                prop_assert!(p.y >= a.start.y - slack && p.y <= a.end.y + slack);
            }
        }

        #[test]
        fn endpoints_are_exact(a in Segment::reasonable(), q in Point::reasonable()) {
            // A segment starting at `a`'s end meets `a` exactly there (unless the two are parallel).
            prop_assume!(a.end <= q);
            let b = Segment::new(a.end, q);
            if let Some(p) = intersection(&a, &b) {
                prop_assert_eq!(p, a.end);
            }
        }
    }
}
