//! Assigns every lane a stable intersection-local index and derives one synthetic entry per
//! outgoing connection. The results live in a side table owned by the conversion run; the input
//! network is never touched.

use std::collections::BTreeMap;

use anyhow::Result;

use sumo::{Connection, Edge, EdgeID, LaneID, Network};

use crate::Movement;

/// One synthetic lane entry: a lane paired with one of its outgoing connections, or with nothing
/// for a lane that dead-ends.
pub struct LaneContext {
    /// "sourceLane|destinationLane|movement", or just the source lane ID for dead ends
    pub lane_link_id: String,
    /// The lane's position in the reversed lane ordering of its road
    pub index: usize,
    pub movement: Movement,
    /// Position of the source lane in the road's native lane list, for geometry lookups
    pub source_lane: usize,
}

/// Synthetic lane entries for every road, built once before any intersection is assembled.
pub struct LaneOrdering {
    per_edge: BTreeMap<EdgeID, Vec<LaneContext>>,
}

impl LaneOrdering {
    pub fn new(network: &Network) -> LaneOrdering {
        let mut outgoing: BTreeMap<LaneID, Vec<&Connection>> = BTreeMap::new();
        for connection in &network.connections {
            outgoing
                .entry(connection.from_lane())
                .or_insert_with(Vec::new)
                .push(connection);
        }

        let mut per_edge = BTreeMap::new();
        for (id, edge) in &network.edges {
            per_edge.insert(id.clone(), order_edge_lanes(edge, &outgoing));
        }
        LaneOrdering { per_edge }
    }

    /// The road's entries, stored in segment-reversed order. Iterate in reverse to recover the
    /// order they were generated in.
    pub fn get(&self, edge: &EdgeID) -> &Vec<LaneContext> {
        &self.per_edge[edge]
    }

    /// Looks up the intersection-local index recorded for a synthetic lane entry. A missing entry
    /// means the grouping pass and the ordering pass disagree about the network, so the whole
    /// conversion aborts.
    pub fn index_of(&self, edge: &EdgeID, lane_link_id: &str) -> Result<usize> {
        for ctx in self.get(edge) {
            if ctx.lane_link_id == lane_link_id {
                return Ok(ctx.index);
            }
        }
        bail!("Lane link {} isn't in {}", lane_link_id, edge);
    }
}

fn order_edge_lanes(edge: &Edge, outgoing: &BTreeMap<LaneID, Vec<&Connection>>) -> Vec<LaneContext> {
    let mut contexts = Vec::new();
    for (index, lane) in edge.lanes_reversed().enumerate() {
        let source_lane = edge.lanes.len() - 1 - index;
        match outgoing.get(&lane.id) {
            Some(connections) => {
                for connection in connections {
                    let movement = Movement::from_direction(connection.dir);
                    contexts.push(LaneContext {
                        lane_link_id: format!("{}|{}|{}", lane.id, connection.to_lane(), movement),
                        index,
                        movement,
                        source_lane,
                    });
                }
            }
            None => {
                contexts.push(LaneContext {
                    lane_link_id: lane.id.0.clone(),
                    index,
                    movement: Movement::DeadEnd,
                    source_lane,
                });
            }
        }
    }
    contexts.reverse();
    contexts
}
