//! Utilities for fuzz and/or property testing using `arbitrary`.
//!
//! Random floats almost never produce the interesting cases (shared
//! endpoints, horizontal segments, three segments through one point), so the
//! generators here go out of their way to produce them.

use arbitrary::Unstructured;

use crate::{Point, Segments};

/// Generate an arbitrary float in some range.
pub fn float_in_range(
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let num: u32 = u.arbitrary()?;
    let t = num as f64 / u32::MAX as f64;
    Ok((1.0 - t) * start + t * end)
}

fn float(u: &mut Unstructured<'_>) -> Result<f64, arbitrary::Error> {
    float_in_range(-1e6, 1e6, u)
}

/// Generate a float, but give it a chance to be equal or very close to `orig`.
fn another_float(orig: f64, u: &mut Unstructured<'_>) -> Result<f64, arbitrary::Error> {
    match u.int_in_range(0..=3)? {
        0 => Ok(orig),
        1 => {
            let ulps: i32 = u.int_in_range(-32..=32)?;
            let scale = 1.0f64 + ulps as f64 * f64::EPSILON;
            Ok(orig * scale)
        }
        _ => float(u),
    }
}

/// Generate an arbitrary point.
pub fn point(u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    Ok(Point::new(float(u)?, float(u)?))
}

/// Generate a point that has a chance of being equal to `orig`, or of sharing a
/// coordinate with it.
pub fn another_point(orig: &Point, u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    if u.ratio(1, 4)? {
        Ok(*orig)
    } else {
        Ok(Point::new(another_float(orig.x, u)?, another_float(orig.y, u)?))
    }
}

// Picks a point, biased towards points we've already used.
fn some_point(seen: &[Point], u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    if seen.is_empty() || u.ratio(1, 2)? {
        point(u)
    } else {
        let orig = u.choose(seen)?;
        another_point(orig, u)
    }
}

/// Generate an arbitrary polygon, as a list of vertices.
///
/// The vertices are often close to one another, or share coordinates.
pub fn polygon(u: &mut Unstructured<'_>) -> Result<Vec<Point>, arbitrary::Error> {
    let len = u.int_in_range(3..=16)?;
    let mut ret = Vec::with_capacity(len);
    for _ in 0..len {
        let p = some_point(&ret, u)?;
        ret.push(p);
    }
    Ok(ret)
}

/// Generate an arbitrary collection of segments: a mix of free segments,
/// open polylines, and closed cycles.
pub fn segments(u: &mut Unstructured<'_>) -> Result<Segments, arbitrary::Error> {
    let mut ret = Segments::default();
    let mut seen = Vec::new();
    let groups = u.int_in_range(1..=6)?;
    for _ in 0..groups {
        let kind = u.int_in_range(0..=2)?;
        let len = u.int_in_range(2..=8)?;
        let mut points = Vec::with_capacity(len);
        for _ in 0..len {
            let p = some_point(&seen, u)?;
            seen.push(p);
            points.push(p);
        }

        match kind {
            0 => {
                ret.add_segment(points[0], points[1]);
            }
            1 => ret.add_points(points),
            _ => ret.add_cycle(points),
        }
    }
    Ok(ret)
}
