//! The sweep-line implementation.
//!
//! The main entry point is [`Sweeper`], which moves a horizontal line upwards
//! over a collection of segments and reports the pairs that touch or cross.
//! [`EventQueue`] holds the points where the sweep line stops, and
//! [`SweepLine`] holds the segments that currently cross it.

mod events;
mod sweep_line;
mod sweeper;

pub use events::{Event, EventQueue};
pub use sweep_line::SweepLine;
pub use sweeper::{brute_force, Sweeper};
