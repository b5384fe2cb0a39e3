//! Orchestrates the conversion, one intersection at a time. Two strict stages: first the lane
//! ordering side table is built for every road, then every junction is assembled against that
//! read-only table.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;

use sumo::{Connection, Junction, JunctionType, Network, NodeID};

use crate::lanes::LaneOrdering;
use crate::links::{build_road_links, group_connections};
use crate::phases::{self, TRAFFIC_LIGHT_PHASE_COUNT};
use crate::{Intersection, Road, RoadLane, RoadNet, TrafficLight};

/// Every output lane gets this width, in meters. The input's real lane widths are ignored.
const LANE_WIDTH: f64 = 4.0;
/// Every output lane gets this speed limit; 11.111 m/s is 40 km/h.
const LANE_MAX_SPEED: f64 = 11.111;

/// Converts a normalized SUMO network into a CityFlow roadnet. Pure and deterministic; the same
/// input always serializes to the same bytes.
pub fn convert(network: &Network) -> Result<RoadNet> {
    let ordering = LaneOrdering::new(network);

    let mut connections_per_node: BTreeMap<&NodeID, Vec<&Connection>> = BTreeMap::new();
    for connection in &network.connections {
        let node = &network.edges[&connection.from].to;
        connections_per_node
            .entry(node)
            .or_insert_with(Vec::new)
            .push(connection);
    }

    let signals = network
        .junctions
        .values()
        .filter(|j| j.junction_type == JunctionType::TrafficLight)
        .count();
    info!("Have {} traffic lights", signals);

    let mut intersections = Vec::new();
    for junction in network.junctions.values() {
        // Junctions with no roads at all don't appear in the output.
        if junction.incoming.is_empty() && junction.outgoing.is_empty() {
            continue;
        }
        let connections = connections_per_node
            .get(&junction.id)
            .map(|list| list.as_slice())
            .unwrap_or(&[]);
        intersections.push(convert_junction(junction, connections, network, &ordering)?);
    }
    info!("Converted {} intersections", intersections.len());

    Ok(RoadNet {
        intersections,
        roads: convert_roads(network),
    })
}

fn convert_junction(
    junction: &Junction,
    connections: &[&Connection],
    network: &Network,
    ordering: &LaneOrdering,
) -> Result<Intersection> {
    debug!("Converting {}", junction.id);

    let groups = group_connections(connections);
    let mut road_links = build_road_links(&groups, network, ordering)?;
    let mut road_link_indices: Vec<usize> = (0..road_links.len()).collect();

    let structurally_virtual = is_pass_through(junction, network);
    let lightphases = match junction.junction_type {
        JunctionType::TrafficLight => {
            phases::traffic_light_phases(&phases::classify(&road_links))
        }
        // Virtual pass-throughs don't get a signal program at all.
        _ if structurally_virtual => Vec::new(),
        _ => vec![phases::all_green_phase(&road_link_indices)],
    };

    // The validity gate: anything that can't carry a full signal program is demoted to a virtual
    // intersection. Note this demotes every unsignalized junction too; only real traffic lights
    // with enough structure stay non-virtual.
    let forced_virtual = road_links.is_empty()
        || road_link_indices.len() <= 1
        || lightphases.len() != TRAFFIC_LIGHT_PHASE_COUNT;
    let is_virtual = structurally_virtual || forced_virtual;
    if is_virtual {
        road_links.clear();
        road_link_indices.clear();
    }

    let mut roads = junction.incoming.clone();
    roads.extend(junction.outgoing.clone());

    Ok(Intersection {
        id: junction.id.clone(),
        point: junction.pt,
        width: 0,
        roads,
        road_links,
        traffic_light: TrafficLight {
            road_link_indices,
            lightphases,
        },
        is_virtual,
    })
}

/// True if the junction sits on a simple pass-through rather than a true branching: counting
/// every endpoint of every incident road (the junction itself included) finds at most 2 distinct
/// nodes.
fn is_pass_through(junction: &Junction, network: &Network) -> bool {
    let mut endpoints: BTreeSet<&NodeID> = BTreeSet::new();
    for id in junction.incoming.iter().chain(junction.outgoing.iter()) {
        let edge = &network.edges[id];
        endpoints.insert(&edge.from);
        endpoints.insert(&edge.to);
    }
    endpoints.len() <= 2
}

fn convert_roads(network: &Network) -> Vec<Road> {
    network
        .edges
        .values()
        .map(|edge| Road {
            id: edge.id.clone(),
            points: vec![
                network.junctions[&edge.from].pt,
                network.junctions[&edge.to].pt,
            ],
            lanes: edge
                .lanes
                .iter()
                .map(|_| RoadLane {
                    width: LANE_WIDTH,
                    max_speed: LANE_MAX_SPEED,
                })
                .collect(),
            start_intersection: edge.from.clone(),
            end_intersection: edge.to.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use geom::{Bounds, Distance, PolyLine, Pt2D, Speed};
    use sumo::{
        Connection, Direction, Edge, EdgeID, Junction, JunctionType, Lane, LaneID, Location,
        Network, NodeID,
    };

    use crate::Movement;

    use super::*;

    fn network(
        edges: Vec<(&str, &str, &str, Vec<Vec<Pt2D>>)>,
        junctions: Vec<(&str, JunctionType, Pt2D)>,
        connections: Vec<(&str, usize, &str, usize, Direction)>,
    ) -> Network {
        let mut network = Network {
            location: Location {
                net_offset: Pt2D::new(0.0, 0.0),
                conv_boundary: Bounds::new(),
                orig_boundary: String::new(),
            },
            edges: BTreeMap::new(),
            junctions: BTreeMap::new(),
            connections: Vec::new(),
        };
        for (id, junction_type, pt) in junctions {
            network.junctions.insert(
                NodeID(id.to_string()),
                Junction {
                    id: NodeID(id.to_string()),
                    junction_type,
                    pt,
                    incoming: Vec::new(),
                    outgoing: Vec::new(),
                },
            );
        }
        for (id, from, to, lane_shapes) in edges {
            network.edges.insert(
                EdgeID(id.to_string()),
                Edge {
                    id: EdgeID(id.to_string()),
                    from: NodeID(from.to_string()),
                    to: NodeID(to.to_string()),
                    priority: -1,
                    lanes: lane_shapes
                        .into_iter()
                        .enumerate()
                        .map(|(index, pts)| Lane {
                            id: LaneID(format!("{}_{}", id, index)),
                            index,
                            speed: Speed::meters_per_second(13.89),
                            length: Distance::meters(100.0),
                            center_line: PolyLine::must_new(pts),
                        })
                        .collect(),
                },
            );
        }
        let incident: Vec<(EdgeID, NodeID, NodeID)> = network
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
        for (from, from_lane, to, to_lane, dir) in connections {
            network.connections.push(Connection {
                from: EdgeID(from.to_string()),
                to: EdgeID(to.to_string()),
                from_lane,
                to_lane,
                via: None,
                dir,
            });
        }
        network
    }

    fn lane(pts: &[(f64, f64)]) -> Vec<Pt2D> {
        pts.iter().map(|(x, y)| Pt2D::new(*x, *y)).collect()
    }

    #[test]
    fn pass_through_node_is_virtual() {
        // b only connects a to itself and back, so it's structurally a pass-through.
        let network = network(
            vec![
                ("ab", "a", "b", vec![lane(&[(0.0, 0.0), (100.0, 0.0)])]),
                ("ba", "b", "a", vec![lane(&[(100.0, 0.0), (0.0, 0.0)])]),
            ],
            vec![
                ("a", JunctionType::DeadEnd, Pt2D::new(0.0, 0.0)),
                ("b", JunctionType::Priority, Pt2D::new(100.0, 0.0)),
            ],
            vec![("ab", 0, "ba", 0, Direction::Turn)],
        );
        let roadnet = convert(&network).unwrap();

        let b = roadnet
            .intersections
            .iter()
            .find(|i| i.id.0 == "b")
            .unwrap();
        assert!(b.is_virtual);
        assert!(b.road_links.is_empty());
        assert!(b.traffic_light.road_link_indices.is_empty());
        assert!(b.traffic_light.lightphases.is_empty());
    }

    #[test]
    fn traffic_light_with_one_road_link_is_demoted() {
        // A genuine 3-endpoint chain through b, but only one controllable road link.
        let network = network(
            vec![
                ("ab", "a", "b", vec![lane(&[(0.0, 0.0), (95.0, 0.0)])]),
                ("bc", "b", "c", vec![lane(&[(105.0, 0.0), (200.0, 0.0)])]),
            ],
            vec![
                ("a", JunctionType::DeadEnd, Pt2D::new(0.0, 0.0)),
                ("b", JunctionType::TrafficLight, Pt2D::new(100.0, 0.0)),
                ("c", JunctionType::DeadEnd, Pt2D::new(200.0, 0.0)),
            ],
            vec![("ab", 0, "bc", 0, Direction::Straight)],
        );
        let roadnet = convert(&network).unwrap();

        let b = roadnet
            .intersections
            .iter()
            .find(|i| i.id.0 == "b")
            .unwrap();
        // The signal program is synthesized in full, but the junction still gets demoted.
        assert_eq!(b.traffic_light.lightphases.len(), TRAFFIC_LIGHT_PHASE_COUNT);
        assert!(b.is_virtual);
        assert!(b.road_links.is_empty());
        assert!(b.traffic_light.road_link_indices.is_empty());
    }

    #[test]
    fn unsignalized_junction_gets_all_green_but_stays_virtual() {
        // A T junction of one-way roads: 2 road links, priority control.
        let network = network(
            vec![
                ("wb", "w", "b", vec![lane(&[(0.0, 0.0), (95.0, 0.0)])]),
                ("be", "b", "e", vec![lane(&[(105.0, 0.0), (200.0, 0.0)])]),
                ("bn", "b", "n", vec![lane(&[(100.0, 5.0), (100.0, 100.0)])]),
            ],
            vec![
                ("w", JunctionType::DeadEnd, Pt2D::new(0.0, 0.0)),
                ("b", JunctionType::Priority, Pt2D::new(100.0, 0.0)),
                ("e", JunctionType::DeadEnd, Pt2D::new(200.0, 0.0)),
                ("n", JunctionType::DeadEnd, Pt2D::new(100.0, 100.0)),
            ],
            vec![
                ("wb", 0, "be", 0, Direction::Straight),
                ("wb", 0, "bn", 0, Direction::Left),
            ],
        );
        let roadnet = convert(&network).unwrap();

        let b = roadnet
            .intersections
            .iter()
            .find(|i| i.id.0 == "b")
            .unwrap();
        // One all-green phase isn't a full signal program, so the gate still demotes it.
        assert_eq!(b.traffic_light.lightphases.len(), 1);
        assert_eq!(b.traffic_light.lightphases[0].available_road_links, vec![0, 1]);
        assert!(b.is_virtual);
        assert!(b.road_links.is_empty());
    }

    #[test]
    fn junction_without_roads_is_dropped() {
        let network = network(
            vec![("ab", "a", "b", vec![lane(&[(0.0, 0.0), (100.0, 0.0)])])],
            vec![
                ("a", JunctionType::DeadEnd, Pt2D::new(0.0, 0.0)),
                ("b", JunctionType::DeadEnd, Pt2D::new(100.0, 0.0)),
                ("lonely", JunctionType::Priority, Pt2D::new(500.0, 500.0)),
            ],
            Vec::new(),
        );
        let roadnet = convert(&network).unwrap();

        assert!(roadnet
            .intersections
            .iter()
            .all(|i| i.id.0 != "lonely"));
        assert_eq!(roadnet.intersections.len(), 2);
    }

    #[test]
    fn roads_use_endpoint_coordinates_and_placeholder_lanes() {
        let network = network(
            vec![(
                "ab",
                "a",
                "b",
                vec![
                    lane(&[(0.0, -1.6), (100.0, -1.6)]),
                    lane(&[(0.0, 1.6), (100.0, 1.6)]),
                ],
            )],
            vec![
                ("a", JunctionType::DeadEnd, Pt2D::new(0.0, 0.0)),
                ("b", JunctionType::DeadEnd, Pt2D::new(100.0, 0.0)),
            ],
            Vec::new(),
        );
        let roadnet = convert(&network).unwrap();

        assert_eq!(roadnet.roads.len(), 1);
        let road = &roadnet.roads[0];
        assert_eq!(road.points, vec![Pt2D::new(0.0, 0.0), Pt2D::new(100.0, 0.0)]);
        assert_eq!(road.lanes.len(), 2);
        assert_eq!(road.lanes[0].width, 4.0);
        assert_eq!(road.lanes[0].max_speed, 11.111);
        assert_eq!(road.start_intersection.0, "a");
        assert_eq!(road.end_intersection.0, "b");
    }

    #[test]
    fn no_u_turn_road_links_anywhere() {
        let network = network(
            vec![
                ("ab", "a", "b", vec![lane(&[(0.0, 0.0), (95.0, 0.0)])]),
                ("ba", "b", "a", vec![lane(&[(95.0, 3.0), (0.0, 3.0)])]),
                ("bc", "b", "c", vec![lane(&[(105.0, 0.0), (200.0, 0.0)])]),
            ],
            vec![
                ("a", JunctionType::DeadEnd, Pt2D::new(0.0, 0.0)),
                ("b", JunctionType::Priority, Pt2D::new(100.0, 0.0)),
                ("c", JunctionType::DeadEnd, Pt2D::new(200.0, 0.0)),
            ],
            vec![
                ("ab", 0, "ba", 0, Direction::Turn),
                ("ab", 0, "bc", 0, Direction::Straight),
            ],
        );
        let roadnet = convert(&network).unwrap();

        for intersection in &roadnet.intersections {
            assert!(intersection
                .road_links
                .iter()
                .all(|link| link.movement != Movement::UTurn));
        }
    }
}
