//! This crate reads a [SUMO](https://www.eclipse.org/sumo/)
//! [network](https://sumo.dlr.de/docs/Networks/SUMO_Road_Networks.html) into an in-memory graph
//! of junctions, edges, lanes, and lane-to-lane connections.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use std::collections::BTreeMap;

use geom::{Bounds, Distance, PolyLine, Pt2D, Speed};

pub use self::raw::{Connection, Direction, EdgeID, LaneID, NodeID};

mod normalize;
pub mod raw;

/// A normalized form of a SUMO network. A `raw::Network` is a direct representation of a .net.xml
/// file; this structure is simplified to be easier to work with:
///
/// - Unspecified edge attributes are inherited from `types` or set to defaults
/// - Internal edges and junctions are filtered out, along with connections touching them
/// - Each junction knows its incident edges
///
/// Coordinates are kept exactly as the file has them; in particular, the Y axis is not flipped.
pub struct Network {
    pub location: Location,
    pub edges: BTreeMap<EdgeID, Edge>,
    pub junctions: BTreeMap<NodeID, Junction>,
    pub connections: Vec<Connection>,
}

pub struct Location {
    pub net_offset: Pt2D,
    pub conv_boundary: Bounds,
    /// The GPS boundary, kept as the file's raw string.
    pub orig_boundary: String,
}

pub struct Edge {
    pub id: EdgeID,
    pub from: NodeID,
    pub to: NodeID,
    pub priority: isize,
    /// 0 is the rightmost lane
    pub lanes: Vec<Lane>,
}

pub struct Lane {
    pub id: LaneID,
    pub index: usize,
    pub speed: Speed,
    pub length: Distance,
    pub center_line: PolyLine,
}

pub struct Junction {
    pub id: NodeID,
    pub junction_type: JunctionType,
    pub pt: Pt2D,
    /// Edges ending here, in edge ID order
    pub incoming: Vec<EdgeID>,
    /// Edges starting here, in edge ID order
    pub outgoing: Vec<EdgeID>,
}

/// See https://sumo.dlr.de/docs/Networks/PlainXML.html#node_types. Only the types that influence
/// signal conversion are split out; everything else is `Other`.
#[derive(Clone, Debug, PartialEq)]
pub enum JunctionType {
    TrafficLight,
    Priority,
    RightBeforeLeft,
    DeadEnd,
    Other(String),
}

impl JunctionType {
    pub fn parse(raw_type: &str) -> JunctionType {
        match raw_type {
            "traffic_light" => JunctionType::TrafficLight,
            "priority" => JunctionType::Priority,
            "right_before_left" => JunctionType::RightBeforeLeft,
            "dead_end" => JunctionType::DeadEnd,
            other => JunctionType::Other(other.to_string()),
        }
    }
}

impl Edge {
    /// Lanes in the reverse of the file's order, which appears to be leftmost first.
    pub fn lanes_reversed(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter().rev()
    }
}
