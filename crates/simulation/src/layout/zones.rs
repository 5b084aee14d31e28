//! Generation-time partition of the x-axis.

use crate::rail_params::LayoutParams;

/// Half-open x range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub index: usize,
    pub start: f32,
    pub end: f32,
}

impl Zone {
    pub fn contains(&self, x: f32) -> bool {
        x >= self.start && x < self.end
    }

    pub fn width(&self) -> f32 {
        self.end - self.start
    }
}

/// Split `[0, width)` into `count` equal zones.
pub fn partition(width: f32, count: usize) -> Vec<Zone> {
    let count = count.max(1);
    let step = width / count as f32;
    (0..count)
        .map(|i| Zone {
            index: i,
            start: step * i as f32,
            // Pin the last edge so rounding never leaves a gap at the end.
            end: if i + 1 == count {
                width
            } else {
                step * (i + 1) as f32
            },
        })
        .collect()
}

/// Preferred switch positions inside `zone`: evenly spaced interior points,
/// clamped to the placeable range and rounded to whole pixels. Points that
/// clamp out of the zone are dropped, so a zone may yield fewer candidates.
pub fn candidate_positions(zone: &Zone, params: &LayoutParams) -> Vec<f32> {
    let n = params.candidates_per_zone;
    let lo = params.ultra_early_min_x;
    let hi = params.max_switch_x();
    let mut out: Vec<f32> = (1..=n)
        .map(|k| (zone.start + zone.width() * k as f32 / (n + 1) as f32).round())
        .map(|x| x.clamp(lo, hi))
        .filter(|&x| zone.contains(x))
        .collect();
    out.dedup();
    out
}

/// The placeable part of `zone`: `[max(start, lo), min(end, hi)]`, or `None`
/// when the zone lies entirely outside the placeable range.
pub fn placeable_range(zone: &Zone, params: &LayoutParams) -> Option<(f32, f32)> {
    let lo = zone.start.max(params.ultra_early_min_x);
    // `end` is exclusive; keep one pixel inside.
    let hi = (zone.end - 1.0).min(params.max_switch_x());
    (lo <= hi).then_some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_width_without_gaps() {
        let zones = partition(1200.0, 5);
        assert_eq!(zones.len(), 5);
        assert_eq!(zones[0].start, 0.0);
        assert_eq!(zones[4].end, 1200.0);
        for pair in zones.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_partition_zero_count_is_single_zone() {
        let zones = partition(1200.0, 0);
        assert_eq!(zones.len(), 1);
        assert!(zones[0].contains(0.0));
        assert!(!zones[0].contains(1200.0));
    }

    #[test]
    fn test_candidates_stay_inside_zone_and_placeable_range() {
        let params = LayoutParams::default();
        for zone in partition(params.play_width, params.zone_count) {
            let candidates = candidate_positions(&zone, &params);
            assert!(!candidates.is_empty(), "zone {} has no candidates", zone.index);
            for x in candidates {
                assert!(zone.contains(x));
                assert!(x >= params.ultra_early_min_x);
                assert!(x <= params.max_switch_x());
            }
        }
    }

    #[test]
    fn test_placeable_range_of_last_zone_respects_edge_margin() {
        let params = LayoutParams::default();
        let zones = partition(params.play_width, params.zone_count);
        let (lo, hi) = placeable_range(&zones[4], &params).expect("last zone is placeable");
        assert_eq!(lo, 960.0);
        assert_eq!(hi, 1080.0);
    }
}
