#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;
pub mod draft;
mod geom;
pub mod num;
pub mod pairs;
mod segments;
pub mod sweep;

#[cfg(feature = "generators")]
pub mod generators;

// pub so that we can use it in fuzz tests, but it's really private
#[doc(hidden)]
pub mod rank_tree;

pub use draft::{DraftEvent, PolygonDraft};
pub use geom::{intersection, x_at_height, Point, Segment};
pub use pairs::{Intersections, SegPair};
pub use segments::{SegIdx, Segments};
pub use sweep::Sweeper;

#[derive(Clone, Copy, Debug, PartialEq)]
/// Something went wrong while looking for intersections.
pub enum Error {
    /// At least one of the inputs was infinite.
    Infinity,
    /// At least one of the inputs was not a number.
    NaN,
    /// The sweep ran out of events with segments still on the sweep line.
    ///
    /// This is a bug, not a problem with the input.
    UnfinishedSweep {
        /// The number of segments left over.
        remaining: usize,
    },
    /// A segment was missing from the sweep line, or out of order on it.
    ///
    /// Like `UnfinishedSweep`, this is a bug.
    Misplaced {
        /// The segment that wasn't where it should have been.
        seg: SegIdx,
    },
    /// The tolerance was NaN or infinite.
    InvalidEps,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Infinity => write!(f, "one of the inputs was infinite"),
            Error::NaN => write!(f, "one of the inputs had a NaN"),
            Error::UnfinishedSweep { remaining } => {
                write!(f, "the sweep finished with {remaining} active segments")
            }
            Error::Misplaced { seg } => {
                write!(f, "segment {seg:?} was out of place on the sweep line")
            }
            Error::InvalidEps => write!(f, "the tolerance was not finite"),
        }
    }
}

impl std::error::Error for Error {}

// Checks that all the coordinates are finite, and returns the largest one
// (in absolute value).
fn check_coords(segments: &Segments) -> Result<f64, Error> {
    let mut max_abs = 0.0f64;
    for seg in segments.segments() {
        for p in [seg.start, seg.end] {
            if p.is_nan() {
                return Err(Error::NaN);
            }
            if !p.is_finite() {
                return Err(Error::Infinity);
            }
            max_abs = max_abs.max(p.x.abs()).max(p.y.abs());
        }
    }
    Ok(max_abs)
}

/// Finds all pairs of segments that touch or cross.
///
/// Segments that are consecutive in the same polyline (see
/// [`Segments::are_adjacent`]) are never reported, since they always share an
/// endpoint. Zero-length segments are never reported either.
///
/// The tolerance for deciding that a segment passes through a point is chosen
/// based on the size of the coordinates; see [`num::default_eps`]. To choose
/// it yourself, use [`find_intersections_with_eps`].
pub fn find_intersections(segments: &Segments) -> Result<Intersections, Error> {
    let max_abs = check_coords(segments)?;
    let eps = num::default_eps(max_abs);
    debug_assert!(eps.is_finite());
    Sweeper::new(segments, eps).run()
}

/// Like [`find_intersections`], but with a caller-provided tolerance.
///
/// A tolerance smaller than the one [`find_intersections`] would choose is
/// raised to that one, since the sweep can't stay consistent with less. A
/// tolerance that isn't finite is an error.
pub fn find_intersections_with_eps(segments: &Segments, eps: f64) -> Result<Intersections, Error> {
    check_coords(segments)?;
    if !eps.is_finite() {
        return Err(Error::InvalidEps);
    }
    Sweeper::new(segments, eps).run()
}
