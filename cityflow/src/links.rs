//! Groups an intersection's lane-to-lane connections into road links.

use std::collections::HashMap;

use anyhow::Result;

use sumo::{Connection, EdgeID, Network};

use crate::lanes::LaneOrdering;
use crate::{LaneLink, Movement, RoadLink};

/// The connections between one pair of roads sharing a movement, in the order they were seen.
pub struct ConnectionGroup<'a> {
    pub start_road: EdgeID,
    pub end_road: EdgeID,
    pub movement: Movement,
    pub members: Vec<&'a Connection>,
}

/// Partitions connections by (start road, end road, movement). Groups come out in the order each
/// key first appears; road link indices downstream depend on that order, so don't sort.
pub fn group_connections<'a>(connections: &[&'a Connection]) -> Vec<ConnectionGroup<'a>> {
    let mut groups: Vec<ConnectionGroup> = Vec::new();
    let mut slots: HashMap<(EdgeID, EdgeID, Movement), usize> = HashMap::new();
    for connection in connections {
        let movement = Movement::from_direction(connection.dir);
        let key = (connection.from.clone(), connection.to.clone(), movement);
        match slots.get(&key) {
            Some(slot) => groups[*slot].members.push(connection),
            None => {
                slots.insert(key, groups.len());
                groups.push(ConnectionGroup {
                    start_road: connection.from.clone(),
                    end_road: connection.to.clone(),
                    movement,
                    members: vec![connection],
                });
            }
        }
    }
    groups
}

/// Builds one road link per group, skipping u-turns entirely. Every synthetic start lane matching
/// the group's movement is linked to every lane of the end road; this deliberately overcounts
/// rather than guessing which destination lane a driver would pick.
pub fn build_road_links(
    groups: &[ConnectionGroup],
    network: &Network,
    ordering: &LaneOrdering,
) -> Result<Vec<RoadLink>> {
    let mut road_links = Vec::new();
    for group in groups {
        if group.movement == Movement::UTurn {
            continue;
        }
        let start_edge = &network.edges[&group.start_road];
        let end_edge = &network.edges[&group.end_road];

        let mut lane_links = Vec::new();
        for ctx in ordering.get(&group.start_road).iter().rev() {
            if ctx.movement != group.movement {
                continue;
            }
            let start_pt = start_edge.lanes[ctx.source_lane].center_line.last_pt();
            for (end_lane_index, end_lane) in end_edge.lanes_reversed().enumerate() {
                lane_links.push(LaneLink {
                    start_lane_index: ordering.index_of(&group.start_road, &ctx.lane_link_id)?,
                    end_lane_index,
                    points: vec![start_pt, end_lane.center_line.first_pt()],
                });
            }
        }

        road_links.push(RoadLink {
            movement: group.movement,
            start_road: group.start_road.clone(),
            end_road: group.end_road.clone(),
            direction: 0,
            lane_links,
        });
    }
    Ok(road_links)
}
