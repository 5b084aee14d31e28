//! Hit-testing between trains, switches and stops.

use crate::layout::{Connection, Layout, Stop};
use crate::tracks::Track;

use super::types::{SwitchBoard, Train};

/// The connected switch that catches a train on `track` at `x`, if any. When
/// two are in range the nearer one wins.
pub fn diversion<'a>(
    layout: &'a Layout,
    board: &SwitchBoard,
    track: Track,
    x: f32,
    range: f32,
) -> Option<&'a Connection> {
    layout
        .connections_from(track)
        .filter(|c| board.is_connected(c.id) && (c.x - x).abs() < range)
        .min_by(|a, b| (a.x - x).abs().total_cmp(&(b.x - x).abs()))
}

/// A stop on the train's track within `range` that it has not halted at yet.
pub fn stop_hit<'a>(layout: &'a Layout, train: &Train, range: f32) -> Option<&'a Stop> {
    layout
        .stops_on(train.track)
        .find(|s| (s.x - train.x).abs() < range && !train.visited_stops.contains(&s.id))
}

/// First pair of trains on the same track closer than `length`, as indices
/// into `positions`.
pub fn first_overlap(positions: &[(Track, f32)], length: f32) -> Option<(usize, usize)> {
    let mut order: Vec<usize> = (0..positions.len()).collect();
    order.sort_by(|&a, &b| {
        positions[a]
            .0
            .cmp(&positions[b].0)
            .then(positions[a].1.total_cmp(&positions[b].1))
    });
    order.windows(2).find_map(|pair| {
        let (a, b) = (positions[pair[0]], positions[pair[1]]);
        (a.0 == b.0 && (b.1 - a.1).abs() < length).then_some((pair[0], pair[1]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ConnectionId, PlacementOrigin, StopId};

    fn layout() -> Layout {
        Layout::new(
            vec![Track::T2, Track::T3],
            vec![
                Connection {
                    id: ConnectionId(0),
                    source: Track::T2,
                    target: Track::T3,
                    x: 300.0,
                    origin: PlacementOrigin::Randomized,
                },
                Connection {
                    id: ConnectionId(1),
                    source: Track::T2,
                    target: Track::T3,
                    x: 350.0,
                    origin: PlacementOrigin::Randomized,
                },
            ],
            vec![Stop {
                id: StopId(0),
                track: Track::T3,
                x: 600.0,
                duration_ms: 1000.0,
            }],
            250.0,
        )
    }

    #[test]
    fn test_straight_switch_does_not_divert() {
        let layout = layout();
        let board = SwitchBoard::default();
        assert!(diversion(&layout, &board, Track::T2, 300.0, 40.0).is_none());
    }

    #[test]
    fn test_nearest_connected_switch_diverts() {
        let layout = layout();
        let mut board = SwitchBoard::default();
        board.toggle(ConnectionId(0));
        board.toggle(ConnectionId(1));
        let hit = diversion(&layout, &board, Track::T2, 330.0, 40.0).expect("two in range");
        assert_eq!(hit.id, ConnectionId(1));
        // Only the source track is caught.
        assert!(diversion(&layout, &board, Track::T3, 330.0, 40.0).is_none());
    }

    #[test]
    fn test_stop_hit_once() {
        let layout = layout();
        let mut train = Train::new(Track::T3, 590.0, 100.0, 1.0);
        let stop = stop_hit(&layout, &train, 30.0).expect("in range");
        train.visited_stops.push(stop.id);
        assert!(stop_hit(&layout, &train, 30.0).is_none());
    }

    #[test]
    fn test_overlap_only_on_same_track() {
        let positions = [
            (Track::T2, 100.0),
            (Track::T3, 120.0),
            (Track::T2, 400.0),
            (Track::T2, 150.0),
        ];
        assert_eq!(first_overlap(&positions, 60.0), Some((0, 3)));
        assert_eq!(first_overlap(&positions[..3], 60.0), None);
    }
}
