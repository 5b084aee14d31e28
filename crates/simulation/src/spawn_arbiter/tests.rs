#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use crate::config::SPEED_VARIANTS;
    use crate::config_error::ConfigurationError;
    use crate::layout::{generate_layout, Connection, ConnectionId, Layout, PlacementOrigin, Stop, StopId};
    use crate::level_policy::{LevelSpec, Tier};
    use crate::rail_params::{LayoutParams, SpawnParams};
    use crate::tracks::Track;

    use super::super::decision::{
        choose_spawn, decide_spawn, global_admission_gate, passes_timing_check, preceding_train,
        required_gap,
    };
    use super::super::types::{DenyReason, SpawnDecision, TrainSnapshot};

    fn layout_with(tracks: &[Track], switches: &[(Track, Track, f32)], stops: &[(Track, f32)]) -> Layout {
        let connections = switches
            .iter()
            .enumerate()
            .map(|(i, &(source, target, x))| Connection {
                id: ConnectionId(i as u32),
                source,
                target,
                x,
                origin: PlacementOrigin::Randomized,
            })
            .collect();
        let stops = stops
            .iter()
            .enumerate()
            .map(|(i, &(track, x))| Stop {
                id: StopId(i as u32),
                track,
                x,
                duration_ms: 1000.0,
            })
            .collect();
        Layout::new(tracks.to_vec(), connections, stops, 250.0)
    }

    fn train(track: Track, x: f32, speed: f32) -> TrainSnapshot {
        TrainSnapshot { track, x, speed }
    }

    fn three_track_layout() -> Layout {
        layout_with(
            &[Track::T1, Track::T2, Track::T3],
            &[
                (Track::T1, Track::T2, 60.0),
                (Track::T2, Track::T3, 120.0),
                (Track::T3, Track::T2, 200.0),
            ],
            &[],
        )
    }

    // ====================================================================
    // Worked scenarios
    // ====================================================================

    #[test]
    fn test_empty_track_admits_any_variant() {
        let layout = three_track_layout();
        let params = SpawnParams::default();
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let others = [train(Track::T2, 500.0, 100.0)];
            let decision =
                decide_spawn(&layout, Track::T1, &others, &SPEED_VARIANTS, &params, &mut rng).unwrap();
            match decision {
                SpawnDecision::Admit { speed } => assert!(SPEED_VARIANTS.contains(&speed)),
                other => panic!("expected admit, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_fast_follower_reaches_early_switch_in_time() {
        let layout = layout_with(&[Track::T1, Track::T2], &[(Track::T1, Track::T2, 60.0)], &[]);
        let params = SpawnParams::default();
        let lead = train(Track::T1, 1000.0, 80.0);

        // ttc = 1100 / 60 ≈ 18.3 s, time to reach the switch = 160 / 140 ≈ 1.14 s.
        assert!(passes_timing_check(&layout, &lead, 140.0, &params));

        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let decision =
            decide_spawn(&layout, Track::T1, &[lead], &SPEED_VARIANTS, &params, &mut rng).unwrap();
        match decision {
            SpawnDecision::Admit { speed } => assert!(speed <= 120.0, "speed {speed} over headroom"),
            other => panic!("expected admit, got {other:?}"),
        }
    }

    #[test]
    fn test_equal_speeds_never_converge() {
        let bare = layout_with(&[Track::T1, Track::T2], &[], &[]);
        let params = SpawnParams::default();
        let lead = train(Track::T1, 300.0, 140.0);
        assert!(passes_timing_check(&bare, &lead, 140.0, &params));

        let layout = layout_with(&[Track::T1, Track::T2], &[(Track::T1, Track::T2, 60.0)], &[]);
        let lead = train(Track::T1, 1000.0, 140.0);
        let mut rng = StepRng::new(0, 0);
        let decision = decide_spawn(&layout, Track::T1, &[lead], &[140.0], &params, &mut rng).unwrap();
        assert_eq!(decision, SpawnDecision::Admit { speed: 140.0 });
    }

    #[test]
    fn test_track_without_switches_always_denied() {
        let layout = layout_with(
            &[Track::T1, Track::T2, Track::T3],
            &[(Track::T1, Track::T2, 60.0), (Track::T2, Track::T1, 150.0)],
            &[],
        );
        let params = SpawnParams::default();
        let configurations: Vec<Vec<TrainSnapshot>> = vec![
            vec![],
            vec![train(Track::T3, 1100.0, 80.0)],
            vec![train(Track::T3, 50.0, 140.0)],
            vec![train(Track::T1, 400.0, 100.0), train(Track::T3, 900.0, 120.0)],
        ];
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for trains in &configurations {
                let decision =
                    decide_spawn(&layout, Track::T3, trains, &SPEED_VARIANTS, &params, &mut rng)
                        .unwrap();
                assert_eq!(decision, SpawnDecision::Deny(DenyReason::NoConnections));
            }
        }
    }

    // ====================================================================
    // Decision steps
    // ====================================================================

    #[test]
    fn test_no_ultra_early_switch_denied() {
        let layout = layout_with(&[Track::T1, Track::T2], &[(Track::T1, Track::T2, 400.0)], &[]);
        let mut rng = StepRng::new(0, 0);
        let decision = decide_spawn(
            &layout,
            Track::T1,
            &[],
            &SPEED_VARIANTS,
            &SpawnParams::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(decision, SpawnDecision::Deny(DenyReason::NoUltraEarlyConnection));
    }

    #[test]
    fn test_close_lead_denied() {
        let layout = layout_with(&[Track::T1, Track::T2], &[(Track::T1, Track::T2, 60.0)], &[]);
        let lead = train(Track::T1, 100.0, 100.0);
        let mut rng = StepRng::new(0, 0);
        let decision = decide_spawn(
            &layout,
            Track::T1,
            &[lead],
            &SPEED_VARIANTS,
            &SpawnParams::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(decision, SpawnDecision::Deny(DenyReason::InsufficientGap));
    }

    #[test]
    fn test_nearly_enough_gap_with_switch_ahead_admits_slowest() {
        let layout = layout_with(
            &[Track::T1, Track::T2],
            &[(Track::T1, Track::T2, 60.0), (Track::T1, Track::T2, 500.0)],
            &[],
        );
        let params = SpawnParams::default();
        // Switch within reach ahead: gap = 200 + 3 * 100 = 500, and 450 > 0.8 * 500.
        let lead = train(Track::T1, 450.0, 100.0);
        assert!((required_gap(&layout, &lead, &params) - 500.0).abs() < 1e-3);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let decision =
            decide_spawn(&layout, Track::T1, &[lead], &SPEED_VARIANTS, &params, &mut rng).unwrap();
        assert_eq!(decision, SpawnDecision::Admit { speed: 80.0 });
    }

    #[test]
    fn test_required_gap_grows_with_distant_switch_and_stop() {
        let params = SpawnParams::default();
        let lead = train(Track::T1, 450.0, 100.0);

        let near = layout_with(&[Track::T1, Track::T2], &[(Track::T1, Track::T2, 500.0)], &[]);
        assert!((required_gap(&near, &lead, &params) - 500.0).abs() < 1e-3);

        let far = layout_with(&[Track::T1, Track::T2], &[(Track::T1, Track::T2, 800.0)], &[]);
        assert!((required_gap(&far, &lead, &params) - 575.0).abs() < 1e-3);

        let with_stop = layout_with(
            &[Track::T1, Track::T2],
            &[(Track::T1, Track::T2, 500.0)],
            &[(Track::T1, 900.0)],
        );
        assert!((required_gap(&with_stop, &lead, &params) - 650.0).abs() < 1e-3);

        // Stops behind the lead do not count.
        let stop_behind = layout_with(
            &[Track::T1, Track::T2],
            &[(Track::T1, Track::T2, 500.0)],
            &[(Track::T1, 300.0)],
        );
        assert!((required_gap(&stop_behind, &lead, &params) - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_no_timing_window_denied() {
        // Crawling lead: nothing fits the headroom, and the slowest variant
        // reaches the only switch too late to react.
        let layout = layout_with(&[Track::T1, Track::T2], &[(Track::T1, Track::T2, 200.0)], &[]);
        let lead = train(Track::T1, 300.0, 10.0);
        let mut rng = StepRng::new(0, 0);
        let decision = decide_spawn(
            &layout,
            Track::T1,
            &[lead],
            &[80.0, 100.0],
            &SpawnParams::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(decision, SpawnDecision::Deny(DenyReason::NoSafeTiming));
    }

    #[test]
    fn test_switch_reached_too_soon_does_not_count() {
        let layout = layout_with(&[Track::T1, Track::T2], &[(Track::T1, Track::T2, -50.0)], &[]);
        let lead = train(Track::T1, 1000.0, 80.0);
        // 50 px at 140 px/s is under the click floor.
        assert!(!passes_timing_check(&layout, &lead, 140.0, &SpawnParams::default()));
    }

    #[test]
    fn test_preceding_train_is_rightmost_on_track() {
        let trains = [
            train(Track::T1, 200.0, 80.0),
            train(Track::T1, 700.0, 100.0),
            train(Track::T2, 900.0, 120.0),
        ];
        let lead = preceding_train(&trains, Track::T1).expect("track has trains");
        assert!((lead.x - 700.0).abs() < f32::EPSILON);
        assert!(preceding_train(&trains, Track::T3).is_none());
    }

    // ====================================================================
    // Preconditions and tick scan
    // ====================================================================

    #[test]
    fn test_empty_variants_is_configuration_error() {
        let layout = three_track_layout();
        let mut rng = StepRng::new(0, 0);
        let params = SpawnParams::default();
        assert_eq!(
            decide_spawn(&layout, Track::T1, &[], &[], &params, &mut rng).unwrap_err(),
            ConfigurationError::EmptySpeedVariants
        );
        assert_eq!(
            choose_spawn(&layout, &[], &[], &params, &mut rng).unwrap_err(),
            ConfigurationError::EmptySpeedVariants
        );
    }

    #[test]
    fn test_empty_layout_is_configuration_error() {
        let mut rng = StepRng::new(0, 0);
        let err = choose_spawn(
            &Layout::default(),
            &[],
            &SPEED_VARIANTS,
            &SpawnParams::default(),
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyTrackSet);
    }

    #[test]
    fn test_gate_throttles_sparse_layouts() {
        let params = SpawnParams::default();
        let sparse = layout_with(
            &[Track::T1, Track::T2, Track::T3],
            &[(Track::T1, Track::T2, 60.0)],
            &[],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let passed = (0..1000)
            .filter(|_| global_admission_gate(&sparse, &params, &mut rng))
            .count();
        assert!((200..=400).contains(&passed), "passed {passed} of 1000");

        let dense = three_track_layout();
        assert!((0..100).all(|_| global_admission_gate(&dense, &params, &mut rng)));
    }

    #[test]
    fn test_choose_spawn_picks_active_track() {
        let params = SpawnParams::default();
        let layout = three_track_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let (track, speed) = choose_spawn(&layout, &[], &SPEED_VARIANTS, &params, &mut rng)
            .unwrap()
            .expect("empty line admits");
        assert!(layout.is_active(track));
        assert!(SPEED_VARIANTS.contains(&speed));
    }

    #[test]
    fn test_choose_spawn_skips_blocked_tracks() {
        let params = SpawnParams::default();
        let layout = three_track_layout();
        // T1 and T2 have a train right at the spawn; only T3 is open.
        let trains = [train(Track::T1, -40.0, 80.0), train(Track::T2, -40.0, 80.0)];
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (track, _) = choose_spawn(&layout, &trains, &SPEED_VARIANTS, &params, &mut rng)
                .unwrap()
                .expect("T3 is free");
            assert_eq!(track, Track::T3);
        }
    }

    // ====================================================================
    // Randomized property
    // ====================================================================

    #[test]
    fn test_faster_admits_always_have_a_timely_switch() {
        let layout_params = LayoutParams::default();
        let params = SpawnParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let tiers = [Tier::Beginner, Tier::Basic, Tier::Advanced];

        for round in 0..300 {
            let tier = tiers[round % tiers.len()];
            let spec = LevelSpec {
                tier,
                tracks: tier.tracks().to_vec(),
                stop_duration_scale: 1.0,
            };
            let layout = generate_layout(&spec, &layout_params, &mut rng).unwrap();
            let multiplier = 1.0 + 0.15 * rng.gen_range(0..=10) as f32;
            let variants: Vec<f32> = SPEED_VARIANTS.iter().map(|v| v * multiplier).collect();

            let trains: Vec<TrainSnapshot> = (0..rng.gen_range(1..8))
                .map(|_| {
                    let track = layout.tracks()[rng.gen_range(0..layout.tracks().len())];
                    let speed = variants[rng.gen_range(0..variants.len())];
                    train(track, rng.gen_range(-100.0..1200.0), speed)
                })
                .collect();

            for &track in layout.tracks() {
                let decision =
                    decide_spawn(&layout, track, &trains, &variants, &params, &mut rng).unwrap();
                let SpawnDecision::Admit { speed } = decision else {
                    continue;
                };
                let Some(lead) = preceding_train(&trains, track) else {
                    continue;
                };
                if speed <= lead.speed {
                    continue;
                }
                let ttc = (lead.x - params.spawn_x) / (speed - lead.speed);
                let timely = layout.connections_from(track).any(|c| {
                    let reach = (c.x - params.spawn_x) / speed;
                    reach >= params.min_click_floor_seconds
                        && reach < ttc - params.min_reaction_window_seconds
                });
                assert!(timely, "round {round}: admitted {speed} behind {lead:?} without a timely switch");
            }
        }
    }
}
