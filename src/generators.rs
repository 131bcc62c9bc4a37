//! Utilities for generating examples, benchmarks, and test cases.

use crate::{Point, Segments};

type Contours = Vec<Vec<Point>>;

/// Generate a bunch of squares, arranged in a grid.
///
/// The top-left of the first square is at (x0, y0). Each square has size `size
/// x size`, and the distance between squares (both horizontally and vertically)
/// is `offset`.
///
/// If `slant` is non-zero, generates parallelograms instead of squares: the
/// right-hand side of each square gets translated down by `slant`.
fn squares((x0, y0): (f64, f64), size: f64, offset: f64, slant: f64, count: usize) -> Contours {
    let mut ret = Vec::new();
    for i in 0..count {
        let x = x0 + i as f64 * offset;
        for j in 0..count {
            let y = y0 + j as f64 * offset;
            ret.push(vec![
                Point::new(x, y),
                Point::new(x, y + size),
                Point::new(x + size, y + size + slant),
                Point::new(x + size, y + slant),
            ]);
        }
    }

    ret
}

fn cycles(contours: Contours) -> Segments {
    let mut ret = Segments::default();
    ret.add_cycles(contours);
    ret
}

/// An `n` by `n` grid of squares, overlapped by an `n - 1` by `n - 1` grid
/// of squares placed over the gaps.
///
/// Every inner square crosses four outer squares, twice each.
pub fn checkerboard(n: usize) -> Segments {
    let mut contours = squares((0.0, 0.0), 30.0, 40.0, 0.0, n);
    contours.extend(squares((20.0, 20.0), 30.0, 40.0, 0.0, n.saturating_sub(1)));
    cycles(contours)
}

/// Like `checkerboard`, but with no exactly-horizontal lines.
///
/// Horizontal lines have special handling in the sweep-line algorithm, so
/// their presence or absence can affect performance.
pub fn slanted_checkerboard(n: usize) -> Segments {
    let mut contours = squares((0.0, 0.0), 30.0, 40.0, 1.0, n);
    contours.extend(squares((20.0, 20.0), 30.0, 40.0, 1.0, n.saturating_sub(1)));
    cycles(contours)
}

/// Long, skinny parallelograms, half of them going from top-left to
/// bottom-right and the other half from top-right to bottom-left.
///
/// This has a quadratic number of intersections.
pub fn slanties(n: usize) -> Segments {
    let h = 20.0 * n as f64;

    let mut contours = Vec::new();
    for i in 0..n {
        let x_off = 20.0 * i as f64;
        contours.push(vec![
            Point::new(x_off, 0.0),
            Point::new(x_off + h, h),
            Point::new(x_off + h + 10.0, h),
            Point::new(x_off + 10.0, 0.0),
        ]);

        contours.push(vec![
            Point::new(x_off + h, 0.0),
            Point::new(x_off, h),
            Point::new(x_off + 10.0, h),
            Point::new(x_off + h + 10.0, 0.0),
        ]);
    }

    cycles(contours)
}

/// The vertices of a star polygon: `points` vertices evenly spaced on a circle
/// of radius `radius`, joined by skipping ahead `step` vertices at a time.
///
/// When `points` and `step` have no common factor, this is a single cycle and
/// each edge crosses `2 * (step - 1)` others. With `step == 1`, it's a
/// regular (simple) polygon.
pub fn star(points: usize, step: usize, radius: f64) -> Vec<Point> {
    (0..points)
        .map(|i| {
            let theta = std::f64::consts::TAU * ((i * step) % points) as f64 / points as f64;
            Point::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect()
}

/// A simple polygon shaped like a comb with `teeth` teeth.
///
/// It has lots of vertices sharing the same height, and no intersections at
/// all, so it's a good test for the case of a correctly drawn polygon.
pub fn comb(teeth: usize) -> Vec<Point> {
    let mut ret = vec![Point::new(0.0, 0.0)];
    for i in 0..teeth {
        let x = 2.0 * i as f64;
        ret.push(Point::new(x, 10.0));
        ret.push(Point::new(x + 1.0, 10.0));
        ret.push(Point::new(x + 1.0, 1.0));
        ret.push(Point::new(x + 2.0, 1.0));
    }
    // The last notch runs straight down into the spine.
    ret.pop();
    ret.push(Point::new(2.0 * teeth as f64 - 1.0, 0.0));
    ret
}

/// A zigzag polyline (not closed) with `n` segments, alternating between
/// heights `0` and `1`.
pub fn zigzag(n: usize) -> Vec<Point> {
    (0..=n)
        .map(|i| Point::new(i as f64, (i % 2) as f64))
        .collect()
}
