//! Classifies road links by compass orientation and synthesizes a fixed signal program. The
//! classification is a heuristic that assumes streets run roughly north-south and east-west; it
//! makes no attempt to handle rotated grids or roundabouts.

use std::collections::BTreeSet;

use crate::{LightPhase, Movement, RoadLink};

/// How long the right-turns-only phase lasts, in seconds.
pub const RIGHT_TURN_PHASE_TIME: usize = 5;
/// How long each directional phase lasts, in seconds.
pub const MOVEMENT_PHASE_TIME: usize = 30;
/// How long the single phase of an unsignalized intersection lasts, in seconds.
pub const ALL_GREEN_PHASE_TIME: usize = 30;
/// A signalized intersection always gets exactly this many phases; intersections that can't
/// support them all get demoted to virtual instead.
pub const TRAFFIC_LIGHT_PHASE_COUNT: usize = 9;

/// Road link indices bucketed by geometric orientation. A link can land in several buckets; a
/// link with no lane links lands in none of the directional ones.
#[derive(Debug, Default, PartialEq)]
pub struct MovementBuckets {
    /// Right turns are compatible with everything, so they're allowed in every phase.
    pub right_turns: Vec<usize>,
    pub east_west_straight: Vec<usize>,
    pub north_south_straight: Vec<usize>,
    /// Left turns whose endpoint delta has dx*dy > 0; they move with east-west straights.
    pub east_west_left: Vec<usize>,
    pub north_south_left: Vec<usize>,
    pub eastbound: Vec<usize>,
    pub westbound: Vec<usize>,
    pub southbound: Vec<usize>,
    pub northbound: Vec<usize>,
}

/// Buckets each road link by the (dx, dy) between the two points of its FIRST lane link.
pub fn classify(road_links: &[RoadLink]) -> MovementBuckets {
    let mut buckets = MovementBuckets::default();
    for (index, link) in road_links.iter().enumerate() {
        if link.movement == Movement::Right {
            buckets.right_turns.push(index);
        }
        let (dx, dy) = match link.lane_links.first() {
            Some(ll) => (
                ll.points[1].x() - ll.points[0].x(),
                ll.points[1].y() - ll.points[0].y(),
            ),
            None => continue,
        };
        match link.movement {
            Movement::Straight => {
                if dx.abs() > dy.abs() {
                    buckets.east_west_straight.push(index);
                    if dx > 0.0 {
                        buckets.eastbound.push(index);
                    } else {
                        buckets.westbound.push(index);
                    }
                } else {
                    buckets.north_south_straight.push(index);
                    if dy > 0.0 {
                        buckets.northbound.push(index);
                    } else {
                        buckets.southbound.push(index);
                    }
                }
            }
            Movement::Left => {
                if dx * dy > 0.0 {
                    buckets.east_west_left.push(index);
                } else {
                    buckets.north_south_left.push(index);
                }
                if dx > 0.0 && dy > 0.0 {
                    buckets.eastbound.push(index);
                } else if dx > 0.0 && dy < 0.0 {
                    buckets.northbound.push(index);
                } else if dx < 0.0 && dy > 0.0 {
                    buckets.southbound.push(index);
                } else {
                    buckets.westbound.push(index);
                }
            }
            _ => {}
        }
    }
    buckets
}

/// The fixed program for a signalized intersection: a short right-turns-only phase, then one
/// phase per orientation bucket, with right turns allowed throughout. Always exactly
/// `TRAFFIC_LIGHT_PHASE_COUNT` phases, even when some buckets are empty.
pub fn traffic_light_phases(buckets: &MovementBuckets) -> Vec<LightPhase> {
    let mut phases = vec![phase(RIGHT_TURN_PHASE_TIME, &buckets.right_turns, &[])];
    for bucket in [
        &buckets.east_west_straight,
        &buckets.north_south_straight,
        &buckets.east_west_left,
        &buckets.north_south_left,
        &buckets.eastbound,
        &buckets.westbound,
        &buckets.southbound,
        &buckets.northbound,
    ] {
        phases.push(phase(MOVEMENT_PHASE_TIME, bucket, &buckets.right_turns));
    }
    phases
}

/// The whole-intersection green phase for unsignalized intersections.
pub fn all_green_phase(road_link_indices: &[usize]) -> LightPhase {
    LightPhase {
        time: ALL_GREEN_PHASE_TIME,
        available_road_links: road_link_indices.to_vec(),
    }
}

fn phase(time: usize, bucket: &[usize], right_turns: &[usize]) -> LightPhase {
    let available: BTreeSet<usize> = bucket.iter().chain(right_turns).copied().collect();
    LightPhase {
        time,
        available_road_links: available.into_iter().collect(),
    }
}
