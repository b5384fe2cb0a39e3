//! Converts a SUMO network into the CityFlow
//! [roadnet format](https://cityflow.readthedocs.io/en/latest/roadnet.html): explicit
//! road-to-road links per intersection, plus a synthesized traffic signal program. The
//! conversion is a pure, deterministic batch transform; all I/O lives in the binary.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use std::fmt;

use serde::Serialize;

use geom::Pt2D;
use sumo::{Direction, EdgeID, NodeID};

pub use crate::convert::convert;
pub use crate::phases::{
    ALL_GREEN_PHASE_TIME, MOVEMENT_PHASE_TIME, RIGHT_TURN_PHASE_TIME, TRAFFIC_LIGHT_PHASE_COUNT,
};

mod convert;
mod lanes;
mod links;
mod phases;

/// The CityFlow roadnet, ready to serialize as JSON.
#[derive(Serialize)]
pub struct RoadNet {
    pub intersections: Vec<Intersection>,
    pub roads: Vec<Road>,
}

#[derive(Serialize)]
pub struct Intersection {
    pub id: NodeID,
    pub point: Pt2D,
    pub width: usize,
    /// All incident roads, incoming first
    pub roads: Vec<EdgeID>,
    /// Empty for virtual intersections
    #[serde(rename = "roadLinks")]
    pub road_links: Vec<RoadLink>,
    #[serde(rename = "trafficLight")]
    pub traffic_light: TrafficLight,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
}

#[derive(Serialize)]
pub struct TrafficLight {
    #[serde(rename = "roadLinkIndices")]
    pub road_link_indices: Vec<usize>,
    pub lightphases: Vec<LightPhase>,
}

/// One step of a signal program: for `time` seconds, exactly these road links may move.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct LightPhase {
    pub time: usize,
    /// Indices into the intersection's road link list, sorted and deduplicated
    #[serde(rename = "availableRoadLinks")]
    pub available_road_links: Vec<usize>,
}

/// Aggregated connectivity between two roads for one movement. There's at most one per
/// (start, end, movement) at an intersection.
#[derive(Serialize)]
pub struct RoadLink {
    #[serde(rename = "type")]
    pub movement: Movement,
    #[serde(rename = "startRoad")]
    pub start_road: EdgeID,
    #[serde(rename = "endRoad")]
    pub end_road: EdgeID,
    /// Unused by CityFlow, but required by the format
    pub direction: usize,
    #[serde(rename = "laneLinks")]
    pub lane_links: Vec<LaneLink>,
}

/// One concrete lane-to-lane transition within a road link.
#[derive(Serialize)]
pub struct LaneLink {
    /// Position in the intersection-local (reversed) lane ordering of the start road
    #[serde(rename = "startLaneIndex")]
    pub start_lane_index: usize,
    /// Position in the reversed lane list of the end road
    #[serde(rename = "endLaneIndex")]
    pub end_lane_index: usize,
    /// Where the start lane ends and the end lane begins
    pub points: Vec<Pt2D>,
}

#[derive(Serialize)]
pub struct Road {
    pub id: EdgeID,
    /// The two endpoint intersections
    pub points: Vec<Pt2D>,
    pub lanes: Vec<RoadLane>,
    #[serde(rename = "startIntersection")]
    pub start_intersection: NodeID,
    #[serde(rename = "endIntersection")]
    pub end_intersection: NodeID,
}

/// CityFlow wants per-lane geometry and speed, but the conversion just uses placeholders.
#[derive(Serialize)]
pub struct RoadLane {
    pub width: f64,
    #[serde(rename = "maxSpeed")]
    pub max_speed: f64,
}

/// A turning movement through an intersection, using CityFlow's tags. `DeadEnd` only ever
/// appears in the lane ordering side table, never on a road link.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Movement {
    #[serde(rename = "go_straight")]
    Straight,
    #[serde(rename = "turn_u")]
    UTurn,
    #[serde(rename = "turn_left")]
    Left,
    #[serde(rename = "turn_right")]
    Right,
    #[serde(rename = "go_end")]
    DeadEnd,
}

impl Movement {
    pub fn from_direction(dir: Direction) -> Movement {
        match dir {
            Direction::Straight => Movement::Straight,
            Direction::Turn => Movement::UTurn,
            Direction::Left | Direction::PartiallyLeft => Movement::Left,
            Direction::Right | Direction::PartiallyRight => Movement::Right,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Movement::Straight => "go_straight",
            Movement::UTurn => "turn_u",
            Movement::Left => "turn_left",
            Movement::Right => "turn_right",
            Movement::DeadEnd => "go_end",
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
