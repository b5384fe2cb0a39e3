//! Transforms a `raw::Network` into a `Network` that's easier to reason about.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use geom::{Bounds, Distance, PolyLine, Pt2D, Speed};

use crate::{raw, Edge, Junction, JunctionType, Lane, Location, Network};

impl Network {
    /// Reads a .net.xml file and returns the normalized SUMO network.
    pub fn load(path: &str) -> Result<Network> {
        info!("Reading {}", path);
        let raw = raw::Network::parse(path)?;
        let network = Network::from_raw(raw)?;
        info!(
            "{} has {} edges, {} junctions, {} connections",
            path,
            network.edges.len(),
            network.junctions.len(),
            network.connections.len()
        );
        Ok(network)
    }

    /// Parses a .net.xml document from a string. Mainly a seam for tests.
    pub fn from_xml(raw_xml: &str) -> Result<Network> {
        Network::from_raw(raw::Network::from_xml_str(raw_xml)?)
    }

    fn from_raw(raw: raw::Network) -> Result<Network> {
        let mut network = Network {
            location: parse_location(&raw.location)?,
            edges: BTreeMap::new(),
            junctions: BTreeMap::new(),
            connections: Vec::new(),
        };

        let types: BTreeMap<String, raw::Type> =
            raw.types.into_iter().map(|t| (t.id.clone(), t)).collect();

        for junction in raw.junctions {
            if junction.junction_type == "internal" {
                continue;
            }
            network.junctions.insert(
                junction.id.clone(),
                Junction {
                    junction_type: JunctionType::parse(&junction.junction_type),
                    pt: Pt2D::new(junction.x, junction.y),
                    id: junction.id,
                    incoming: Vec::new(),
                    outgoing: Vec::new(),
                },
            );
        }

        for edge in raw.edges {
            if edge.function != raw::Function::Normal {
                continue;
            }
            let id = edge.id;
            let from = edge
                .from
                .ok_or_else(|| anyhow!("{} has no from junction", id))?;
            let to = edge.to.ok_or_else(|| anyhow!("{} has no to junction", id))?;
            for endpt in [&from, &to] {
                if !network.junctions.contains_key(endpt) {
                    bail!("{} references unknown junction {}", id, endpt);
                }
            }

            let priority = edge
                .priority
                .or_else(|| {
                    edge.edge_type
                        .as_ref()
                        .and_then(|t| types.get(t))
                        .and_then(|t| t.priority)
                })
                .unwrap_or(-1);

            let mut raw_lanes = edge.lanes;
            raw_lanes.sort_by_key(|l| l.index);
            let mut lanes = Vec::new();
            for (idx, lane) in raw_lanes.into_iter().enumerate() {
                if lane.index != idx {
                    bail!("{} has a gap in lane indices", id);
                }
                let center_line = PolyLine::new(raw::parse_shape(&lane.shape)?)
                    .with_context(|| format!("lane {}", lane.id))?;
                lanes.push(Lane {
                    id: lane.id,
                    index: lane.index,
                    speed: Speed::meters_per_second(lane.speed),
                    length: Distance::meters(lane.length),
                    center_line,
                });
            }
            if lanes.is_empty() {
                bail!("{} has no lanes", id);
            }

            network.edges.insert(
                id.clone(),
                Edge {
                    id,
                    from,
                    to,
                    priority,
                    lanes,
                },
            );
        }

        // BTreeMap iteration gives edge ID order
        let incident: Vec<(raw::EdgeID, raw::NodeID, raw::NodeID)> = network
            .edges
            .values()
            .map(|e| (e.id.clone(), e.from.clone(), e.to.clone()))
            .collect();
        for (id, from, to) in incident {
            network
                .junctions
                .get_mut(&from)
                .unwrap()
                .outgoing
                .push(id.clone());
            network.junctions.get_mut(&to).unwrap().incoming.push(id);
        }

        for connection in raw.connections {
            // Connections involving internal or filtered edges don't survive normalization.
            let (from_edge, to_edge) = match (
                network.edges.get(&connection.from),
                network.edges.get(&connection.to),
            ) {
                (Some(f), Some(t)) => (f, t),
                _ => continue,
            };
            if connection.from_lane >= from_edge.lanes.len() {
                bail!(
                    "Connection from {} lane {} is out of bounds",
                    connection.from,
                    connection.from_lane
                );
            }
            if connection.to_lane >= to_edge.lanes.len() {
                bail!(
                    "Connection to {} lane {} is out of bounds",
                    connection.to,
                    connection.to_lane
                );
            }
            network.connections.push(connection);
        }

        Ok(network)
    }
}

fn parse_location(location: &raw::Location) -> Result<Location> {
    Ok(Location {
        net_offset: parse_pt(&location.net_offset)?,
        conv_boundary: parse_bounds(&location.conv_boundary)?,
        orig_boundary: location.orig_boundary.clone(),
    })
}

fn parse_pt(input: &str) -> Result<Pt2D> {
    let coords: Vec<&str> = input.split(',').collect();
    if coords.len() != 2 {
        bail!("Weird point {}", input);
    }
    Ok(Pt2D::new(coords[0].parse()?, coords[1].parse()?))
}

fn parse_bounds(input: &str) -> Result<Bounds> {
    let coords: Vec<&str> = input.split(',').collect();
    if coords.len() != 4 {
        bail!("Weird boundary {}", input);
    }
    let mut bounds = Bounds::new();
    bounds.update(Pt2D::new(coords[0].parse()?, coords[1].parse()?));
    bounds.update(Pt2D::new(coords[2].parse()?, coords[3].parse()?));
    Ok(bounds)
}
