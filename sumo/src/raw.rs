//! A direct representation of a SUMO .net.xml file, deserialized with quick-xml. Only the
//! attributes this crate consumes are modeled; everything else is skipped.

use std::fmt;
use std::io::BufReader;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use geom::Pt2D;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct EdgeID(pub String);
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct NodeID(pub String);
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct LaneID(pub String);

impl fmt::Display for EdgeID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl fmt::Display for LaneID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize)]
pub struct Network {
    pub location: Location,
    #[serde(rename = "type", default)]
    pub types: Vec<Type>,
    #[serde(rename = "edge", default)]
    pub edges: Vec<Edge>,
    #[serde(rename = "junction", default)]
    pub junctions: Vec<Junction>,
    #[serde(rename = "connection", default)]
    pub connections: Vec<Connection>,
}

impl Network {
    /// Reads a .net.xml file without any further processing.
    pub fn parse(path: &str) -> Result<Network> {
        let reader = BufReader::new(fs_err::File::open(path)?);
        let network: Network = quick_xml::de::from_reader(reader)
            .map_err(|err| anyhow!("XML error in {}: {}", path, err))?;
        Ok(network)
    }

    pub fn from_xml_str(raw_xml: &str) -> Result<Network> {
        let network: Network =
            quick_xml::de::from_str(raw_xml).map_err(|err| anyhow!("XML error: {}", err))?;
        Ok(network)
    }
}

#[derive(Deserialize)]
pub struct Location {
    #[serde(rename = "netOffset")]
    pub net_offset: String,
    #[serde(rename = "convBoundary")]
    pub conv_boundary: String,
    #[serde(rename = "origBoundary")]
    pub orig_boundary: String,
    #[serde(rename = "projParameter", default)]
    pub proj_parameter: String,
}

/// An edge type template; edges missing an attribute inherit it from their type.
#[derive(Deserialize)]
pub struct Type {
    pub id: String,
    #[serde(default)]
    pub priority: Option<isize>,
    #[serde(default)]
    pub speed: Option<f64>,
}

#[derive(Deserialize)]
pub struct Edge {
    pub id: EdgeID,
    #[serde(default)]
    pub from: Option<NodeID>,
    #[serde(default)]
    pub to: Option<NodeID>,
    #[serde(rename = "type", default)]
    pub edge_type: Option<String>,
    #[serde(default)]
    pub priority: Option<isize>,
    #[serde(default)]
    pub function: Function,
    #[serde(rename = "lane", default)]
    pub lanes: Vec<Lane>,
}

/// See https://sumo.dlr.de/docs/Networks/SUMO_Road_Networks.html#edges_and_lanes
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub enum Function {
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "internal")]
    Internal,
    #[serde(rename = "connector")]
    Connector,
    #[serde(rename = "crossing")]
    Crossing,
    #[serde(rename = "walkingarea")]
    WalkingArea,
}

impl Default for Function {
    fn default() -> Self {
        Function::Normal
    }
}

#[derive(Deserialize)]
pub struct Lane {
    pub id: LaneID,
    pub index: usize,
    pub speed: f64,
    pub length: f64,
    pub shape: String,
}

#[derive(Deserialize)]
pub struct Junction {
    pub id: NodeID,
    #[serde(rename = "type")]
    pub junction_type: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "incLanes", default)]
    pub inc_lanes: String,
    #[serde(rename = "intLanes", default)]
    pub int_lanes: String,
    #[serde(default)]
    pub shape: Option<String>,
}

#[derive(Clone, Deserialize)]
pub struct Connection {
    pub from: EdgeID,
    pub to: EdgeID,
    #[serde(rename = "fromLane")]
    pub from_lane: usize,
    #[serde(rename = "toLane")]
    pub to_lane: usize,
    #[serde(default)]
    pub via: Option<LaneID>,
    pub dir: Direction,
}

impl Connection {
    /// SUMO lane IDs are always the edge ID with the lane's index appended.
    pub fn from_lane(&self) -> LaneID {
        LaneID(format!("{}_{}", self.from, self.from_lane))
    }

    pub fn to_lane(&self) -> LaneID {
        LaneID(format!("{}_{}", self.to, self.to_lane))
    }
}

/// The turning direction of a connection, as encoded in the network file.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub enum Direction {
    #[serde(rename = "s")]
    Straight,
    #[serde(rename = "t")]
    Turn,
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "r")]
    Right,
    #[serde(rename = "L")]
    PartiallyLeft,
    #[serde(rename = "R")]
    PartiallyRight,
}

/// Parses a list of "x,y" or "x,y,z" coordinates separated by spaces. The Z coordinate is
/// dropped.
pub fn parse_shape(input: &str) -> Result<Vec<Pt2D>> {
    let mut pts = Vec::new();
    for pt in input.split_whitespace() {
        let coords: Vec<&str> = pt.split(',').collect();
        if coords.len() != 2 && coords.len() != 3 {
            bail!("Weird shape point {}", pt);
        }
        pts.push(Pt2D::new(coords[0].parse()?, coords[1].parse()?));
    }
    Ok(pts)
}
