//! Just enough 2D geometry to represent road networks in world-space meters.

#[macro_use]
extern crate anyhow;

mod bounds;
mod polyline;
mod pt;
mod units;

pub use crate::bounds::Bounds;
pub use crate::polyline::PolyLine;
pub use crate::pt::Pt2D;
pub use crate::units::{Distance, Speed};
