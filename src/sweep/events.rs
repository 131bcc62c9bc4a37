//! The event schedule: the points where the sweep line has to stop.

use std::collections::BTreeMap;

use crate::{geom::Point, SegIdx, Segments};

/// Everything that happens at a single point.
///
/// An event that neither starts nor ends any segment was scheduled because two
/// segments were found to cross there.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Event {
    /// Where it happens.
    pub point: Point,
    /// Segments whose start is at `point`.
    pub starts: Vec<SegIdx>,
    /// Segments whose end is at `point`.
    pub ends: Vec<SegIdx>,
}

impl Event {
    /// Was this event scheduled only because of a crossing?
    pub fn is_crossing(&self) -> bool {
        self.starts.is_empty() && self.ends.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
struct Tags {
    starts: Vec<SegIdx>,
    ends: Vec<SegIdx>,
}

/// A priority queue of event points, smallest first.
///
/// Points are ordered the way [`Point`] orders them: by `y`, then by `x`. Each
/// point is stored once; pushing a point that's already scheduled merges its
/// segment lists into the existing event.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: BTreeMap<Point, Tags>,
}

impl EventQueue {
    /// Schedules the endpoints of all the segments.
    ///
    /// Zero-length segments are left out entirely.
    pub fn from_segments(segments: &Segments) -> Self {
        let mut ret = EventQueue::default();
        for idx in segments.indices() {
            let seg = &segments[idx];
            if seg.is_degenerate() {
                continue;
            }
            ret.push_start(seg.start, idx);
            ret.push_end(seg.end, idx);
        }
        ret
    }

    /// Schedules an untagged event at `p`.
    ///
    /// Returns `false` (and changes nothing) if `p` was already scheduled.
    pub fn push(&mut self, p: Point) -> bool {
        if self.events.contains_key(&p) {
            false
        } else {
            self.events.insert(p, Tags::default());
            true
        }
    }

    /// Schedules the start of segment `seg` at `p`.
    pub fn push_start(&mut self, p: Point, seg: SegIdx) {
        self.events.entry(p).or_default().starts.push(seg);
    }

    /// Schedules the end of segment `seg` at `p`.
    pub fn push_end(&mut self, p: Point, seg: SegIdx) {
        self.events.entry(p).or_default().ends.push(seg);
    }

    /// Removes and returns the smallest event.
    pub fn pop_min(&mut self) -> Option<Event> {
        self.events
            .pop_first()
            .map(|(point, Tags { starts, ends })| Event { point, starts, ends })
    }

    /// The smallest scheduled point, without removing it.
    pub fn peek(&self) -> Option<&Point> {
        self.events.keys().next()
    }

    /// Is there an event scheduled at exactly `p`?
    pub fn contains(&self, p: &Point) -> bool {
        self.events.contains_key(p)
    }

    /// The number of scheduled points.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
