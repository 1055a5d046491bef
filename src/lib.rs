//! ERDOS: Eulerian Routing of DNA Origami Scaffolds.
//!
//! Automates the design of A-trail scaffold routings for toroidal
//! DNA-origami polyhedra. A polygon mesh is augmented with doubled edges
//! until its face graph is checkerboard-colorable, re-embedded as a rotation
//! system, and searched for a covering tree whose A-trail is the scaffold
//! routing.

#[macro_use]
extern crate lazy_static;

pub mod checkerboard;
pub mod graph;
pub mod output;
pub mod ply;
pub mod rotation;
pub mod search;
pub mod trail;

pub mod error;
mod util;

pub use util::{round_down_pow2, CyclicIterable};
