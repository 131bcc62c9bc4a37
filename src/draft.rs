//! A polygon that is still being drawn.
//!
//! Someone drawing a polygon places vertices one at a time, and in between
//! drags a "live" edge from the last vertex to wherever the pointer is. A
//! [`PolygonDraft`] keeps track of this, and can say at any moment which of
//! the edges drawn so far (including the live one) touch or cross.

use crate::{find_intersections, Error, Intersections, Point, Segments};

/// What happened when a vertex was placed.
#[derive(Clone, Debug, PartialEq)]
pub enum DraftEvent {
    /// A new vertex was added, with this index.
    Added(usize),
    /// The initial vertex was placed again, closing the polygon. These were
    /// its vertices; the draft is now empty again.
    Closed(Vec<Point>),
    /// An existing vertex (other than the initial one, or the initial one
    /// before there were enough vertices to close) was placed again.
    Ignored,
}

/// A polygon under construction.
///
/// Nothing here is global: a drawing session is just a value, and you can
/// have as many as you like.
#[derive(Clone, Debug, Default)]
pub struct PolygonDraft {
    vertices: Vec<Point>,
    cursor: Option<Point>,
}

impl PolygonDraft {
    /// An empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// The vertices placed so far, in order.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// The loose end of the edge being dragged, if there is one.
    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    /// Have no vertices been placed yet?
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Places a vertex at `p`.
    ///
    /// Placing the initial vertex again closes the polygon, as long as there
    /// are at least three vertices.
    pub fn add_vertex(&mut self, p: impl Into<Point>) -> DraftEvent {
        let p = p.into();
        match self.vertices.iter().position(|v| *v == p) {
            Some(0) if self.vertices.len() >= 3 => {
                self.cursor = None;
                tracing::debug!(vertices = self.vertices.len(), "closed polygon");
                DraftEvent::Closed(std::mem::take(&mut self.vertices))
            }
            Some(_) => DraftEvent::Ignored,
            None => {
                self.vertices.push(p);
                self.cursor = Some(p);
                DraftEvent::Added(self.vertices.len() - 1)
            }
        }
    }

    /// Moves the loose end of the live edge to `p`.
    ///
    /// Does nothing if no vertex has been placed yet, since then there's no
    /// live edge.
    pub fn drag_to(&mut self, p: impl Into<Point>) {
        if !self.vertices.is_empty() {
            self.cursor = Some(p.into());
        }
    }

    /// The pointer was released: the drawing is abandoned.
    pub fn release(&mut self) {
        self.vertices.clear();
        self.cursor = None;
    }

    /// Is the live edge sitting on the initial vertex, ready to close?
    pub fn is_closing(&self) -> bool {
        self.vertices.len() >= 3 && self.cursor.as_ref() == self.vertices.first()
    }

    /// The edges drawn so far, including the live one.
    ///
    /// These form a single polyline, so consecutive edges are never reported
    /// as touching each other. If the live edge ends on the initial vertex,
    /// the polyline is closed up into a cycle.
    pub fn segments(&self) -> Segments {
        let mut ret = Segments::default();
        if self.is_closing() {
            ret.add_cycle(self.vertices.iter().copied());
        } else {
            ret.add_points(self.vertices.iter().copied().chain(self.cursor));
        }
        ret
    }

    /// The pairs of edges that touch or cross.
    ///
    /// The edge indices are those of [`PolygonDraft::segments`]: edge `i` joins
    /// vertex `i` to vertex `i + 1`, and the last edge is the live one.
    pub fn conflicts(&self) -> Result<Intersections, Error> {
        find_intersections(&self.segments())
    }
}
