use approx::assert_abs_diff_eq;
use carousel::core::engine::{AlignmentOutcome, CarouselEngine};
use carousel::core::handle_spin::{handle_spin, DrawOpts};
use carousel::core::participant::Roster;
use carousel::core::slots::SlotAssignment;
use carousel::core::spin::SpinPhase;
use carousel::core::visibility::derive_visibility;
use carousel::post::draw_result::DrawEventKind;
use carousel::pre::carousel_pars::CarouselPars;
use helpers::angle::{resolve_front_step, wrap_index};
use std::collections::HashSet;

fn engine_with_ids(n: usize) -> CarouselEngine {
    let mut engine = CarouselEngine::new(CarouselPars::default()).unwrap();
    engine.update_roster(Roster::from_ids((1..=n).map(|i| i.to_string())));
    engine
}

/// Ticks the engine in steps of `interval_ms` until nothing is scheduled anymore. Returns the
/// last timestamp.
fn run_to_idle(engine: &mut CarouselEngine, t_start: f64, interval_ms: f64) -> f64 {
    let mut now = t_start;
    while engine.scheduled_frame().is_some() {
        engine.tick(now);
        now += interval_ms;
    }
    now
}

#[test]
fn slots_stay_bounded_and_distinct_during_spin() {
    let mut engine = engine_with_ids(20);
    engine.start_spin(3_000.0);

    let mut now = 0.0;
    while engine.scheduled_frame().is_some() {
        engine.tick(now);
        now += 16.0;

        let slots = engine.get_slots();
        assert_eq!(slots.len(), 8);

        let ids: HashSet<&str> = slots.iter().map(|s| s.participant.id.as_str()).collect();
        assert_eq!(ids.len(), 8, "a participant is shown twice at {}ms", now);
    }
}

#[test]
fn front_walks_through_the_roster_one_by_one() {
    let n = 13;
    let mut engine = engine_with_ids(n);
    engine.start_spin(10_000.0);

    let mut fronts: Vec<usize> = Vec::new();
    let mut now = 0.0;
    while engine.scheduled_frame().is_some() {
        engine.tick(now);
        now += 16.0;

        let front_idx = engine
            .front_participant()
            .and_then(|p| engine.roster().position(&p.id))
            .unwrap();
        let step = resolve_front_step(engine.current_rotation(), engine.angle_per_slot());
        assert_eq!(front_idx, wrap_index(step, n));

        if fronts.last() != Some(&front_idx) {
            fronts.push(front_idx);
        }
    }

    // 8 full turns of 8 slots each
    assert_eq!(fronts.len(), 65);
    for pair in fronts.windows(2) {
        assert_eq!(pair[1], (pair[0] + 1) % n);
    }
}

#[test]
fn reassignments_match_back_point_crossings() {
    let mut engine = engine_with_ids(20);
    engine.start_spin(2_000.0);
    run_to_idle(&mut engine, 0.0, 16.0);

    assert_abs_diff_eq!(engine.current_rotation(), -2880.0);

    // every slot passes the back point once per full turn
    assert_eq!(engine.slot_reassignments(), &[8; 8]);
}

#[test]
fn assignment_does_not_depend_on_tick_granularity() {
    let mut coarse = SlotAssignment::new(20, 8);
    let mut fine = SlotAssignment::new(20, 8);

    coarse.advance(0.0, -1_000.0);

    let mut rotation = 0.0;
    while rotation > -1_000.0 {
        let next = (rotation - 7.3_f64).max(-1_000.0);
        fine.advance(rotation, next);
        rotation = next;
    }

    assert_eq!(coarse.assignment(), fine.assignment());
    assert_eq!(coarse.range(), fine.range());
    assert_eq!(coarse.reassignments(), fine.reassignments());

    // turning back restores the initial window
    coarse.advance(-1_000.0, 0.0);
    assert_eq!(coarse.assignment(), SlotAssignment::new(20, 8).assignment());
}

#[test]
fn four_participants_winner_on_opposite_side() {
    let mut engine = engine_with_ids(4);
    engine.set_winner("3");
    engine.tick(0.0);

    assert_abs_diff_eq!(engine.current_rotation(), 180.0);
    assert_eq!(engine.front_participant().map(|p| p.id.as_str()), Some("3"));
}

#[test]
fn winner_arriving_mid_spin_is_aligned_after_landing() {
    let mut engine = engine_with_ids(12);
    engine.start_spin(1_000.0);
    engine.tick(0.0);
    engine.tick(400.0);

    engine.set_winner("9");
    assert!(engine.is_spinning());

    let mut now = 416.0;
    while engine.phase() == SpinPhase::Spinning {
        engine.tick(now);
        now += 16.0;
    }
    let landed_rotation = engine.current_rotation();
    assert_eq!(engine.phase(), SpinPhase::Aligning);

    engine.tick(now);
    assert_eq!(engine.phase(), SpinPhase::Idle);
    assert!((engine.current_rotation() - landed_rotation).abs() <= 180.0 + 1e-9);
    assert_eq!(engine.front_participant().map(|p| p.id.as_str()), Some("9"));

    let active: Vec<_> = engine
        .get_slots()
        .into_iter()
        .filter(|s| s.is_active)
        .map(|s| s.participant.id.clone())
        .collect();
    assert_eq!(active, vec!["9".to_owned()]);
}

#[test]
fn winner_outside_window_is_pinned_to_front() {
    let mut engine = engine_with_ids(20);
    engine.start_spin(2_000.0);
    run_to_idle(&mut engine, 0.0, 16.0);
    assert_eq!(engine.front_participant().map(|p| p.id.as_str()), Some("5"));

    engine.set_winner("14");
    engine.tick(5_000.0);

    match engine.last_alignment() {
        Some(AlignmentOutcome::Aligned {
            slot_idx, pinned, ..
        }) => {
            assert_eq!(slot_idx, 13 % 8);
            assert!(pinned);
        }
        other => panic!("unexpected alignment outcome {:?}", other),
    }
    assert_eq!(engine.front_participant().map(|p| p.id.as_str()), Some("14"));
}

#[test]
fn recycled_cards_are_hidden_when_they_change() {
    for &max_slots in [7, 8, 10].iter() {
        let pars = CarouselPars {
            max_slots,
            visibility_threshold: max_slots - 1,
            ..CarouselPars::default()
        };
        let mut engine = CarouselEngine::new(pars).unwrap();
        engine.update_roster(Roster::from_ids((1..=20).map(|i| i.to_string())));
        engine.start_spin(10_000.0);

        let mut shown: Vec<String> = engine
            .get_slots()
            .iter()
            .map(|s| s.participant.id.clone())
            .collect();
        let mut swaps = 0;
        let mut now = 0.0;

        while engine.scheduled_frame().is_some() {
            engine.tick(now);
            now += 16.0;

            for slot in engine.get_slots() {
                if shown[slot.slot_idx] != slot.participant.id {
                    assert!(
                        slot.is_hidden,
                        "slot {} of {} changed to {} while visible (opacity {})",
                        slot.slot_idx,
                        max_slots,
                        slot.participant.id,
                        slot.opacity
                    );
                    shown[slot.slot_idx] = slot.participant.id.clone();
                    swaps += 1;
                }
            }
        }

        assert_eq!(swaps, 8 * max_slots);
    }
}

#[test]
fn huge_rotation_is_applied_in_one_step() {
    let mut slots = SlotAssignment::new(20, 8);

    // one million turns move the window by 8 million positions, a multiple of the roster
    assert_eq!(slots.advance(0.0, -360.0e6), 8_000_000);
    assert_eq!(slots.reassignments(), &[1_000_000; 8]);
    assert_eq!(slots.range(), (8_000_000 - 3, 8_000_000 + 5));
    assert_eq!(slots.assignment(), SlotAssignment::new(20, 8).assignment());

    assert_eq!(slots.advance(-360.0e6, 0.0), 8_000_000);
    assert_eq!(slots.range(), (-3, 5));
}

#[test]
fn backward_turns_do_not_depend_on_tick_granularity() {
    let mut coarse = SlotAssignment::new(20, 8);
    let mut fine = SlotAssignment::new(20, 8);

    coarse.advance(-100.0, 1_234.5);

    let mut rotation = -100.0;
    while rotation < 1_234.5 {
        let next = (rotation + 11.1_f64).min(1_234.5);
        fine.advance(rotation, next);
        rotation = next;
    }

    assert_eq!(coarse.assignment(), fine.assignment());
    assert_eq!(coarse.range(), fine.range());
    assert_eq!(coarse.reassignments(), fine.reassignments());
}

#[test]
fn opacity_never_grows_with_distance_from_front() {
    let pars = CarouselPars::default();
    let angle_per_slot = 45.0;

    let mut rotation = -720.0;
    while rotation <= 720.0 {
        let mut vis: Vec<_> = (0..8)
            .map(|slot_idx| {
                derive_visibility(
                    slot_idx as f64 * angle_per_slot,
                    rotation,
                    angle_per_slot,
                    8,
                    false,
                    &pars,
                )
            })
            .collect();
        vis.sort_by(|a, b| a.steps_from_front.partial_cmp(&b.steps_from_front).unwrap());

        for pair in vis.windows(2) {
            assert!(pair[1].opacity <= pair[0].opacity + 1e-12);
        }
        // the back point is always hidden
        assert!(vis.last().unwrap().is_hidden);

        rotation += 3.7;
    }
}

#[test]
fn restarting_a_spin_replaces_the_running_one() {
    let mut engine = engine_with_ids(12);
    engine.start_spin(1_000.0);
    engine.tick(0.0);
    engine.tick(300.0);
    let rotation_restart = engine.current_rotation();
    let cancelled = engine.cancelled_frames();

    engine.start_spin(1_000.0);
    assert_eq!(engine.cancelled_frames(), cancelled + 1);
    assert!(engine.scheduled_frame().is_some());

    // the new spin starts where the old one was interrupted
    engine.tick(2_000.0);
    assert_abs_diff_eq!(engine.current_rotation(), rotation_restart);

    run_to_idle(&mut engine, 2_016.0, 16.0);
    assert_abs_diff_eq!(engine.current_rotation(), rotation_restart - 2880.0, epsilon = 1e-9);
}

#[test]
fn renderer_receives_snapshots_and_final_result() {
    let (tx, rx) = flume::unbounded();
    let (winner_tx, winner_rx) = flume::unbounded();
    winner_tx.send("7".to_owned()).unwrap();

    let opts = DrawOpts {
        spin_duration_ms: Some(300.0),
        max_winner_wait_ms: 100.0,
        realtime_factor: 1_000.0,
        seed: Some(3),
        ..DrawOpts::default()
    };

    let result = handle_spin(
        &Roster::from_ids((1..=12).map(|i| i.to_string())),
        &CarouselPars::default(),
        &opts,
        Some(&winner_rx),
        Some(&tx),
    )
    .unwrap();
    drop(tx);

    let states: Vec<_> = rx.iter().collect();
    assert!(states.len() >= 2);
    assert!(states[..states.len() - 1]
        .iter()
        .all(|s| s.final_result.is_none()));
    assert!(states
        .windows(2)
        .all(|pair| pair[1].time_ms >= pair[0].time_ms));

    let last = states.last().unwrap();
    assert_eq!(last.final_result.as_ref(), Some(&result));
    assert_eq!(last.front_participant_id.as_deref(), Some("7"));
    assert!(result.winner_in_front());
    assert!(result.has_event(DrawEventKind::Aligned));
}
