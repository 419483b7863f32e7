use crate::core::engine::{AlignmentOutcome, CarouselEngine};
use crate::core::frame_clock::FrameClock;
use crate::core::participant::Roster;
use crate::core::spin::SpinPhase;
use crate::interfaces::renderer_interface::{CarouselState, MAX_RENDER_UPDATE_FREQUENCY};
use crate::post::draw_result::{DrawEvent, DrawEventKind, DrawResult};
use crate::pre::carousel_pars::CarouselPars;
use crate::pre::sim_opts::SimOpts;
use anyhow::Context;
use flume::{Receiver, Sender, TryRecvError};
use helpers::general::InputValueError;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// * `frame_interval_ms` - (ms) Nominal time between two animation frames
/// * `frame_jitter_ms` - (ms) Standard deviation of the frame interval
/// * `spin_duration_ms` - (ms) Spin duration, overrides the value of the parameter file if set
/// * `max_winner_wait_ms` - (ms) How long the settled carousel waits for the winner
/// * `realtime_factor` - Speed-up of the real-time pacing (only used if a renderer is attached)
/// * `seed` - Seed of the frame jitter
/// * `print_debug` - Print progress information
#[derive(Debug, Clone)]
pub struct DrawOpts {
    pub frame_interval_ms: f64,
    pub frame_jitter_ms: f64,
    pub spin_duration_ms: Option<f64>,
    pub max_winner_wait_ms: f64,
    pub realtime_factor: f64,
    pub seed: Option<u64>,
    pub print_debug: bool,
}

impl Default for DrawOpts {
    fn default() -> Self {
        DrawOpts {
            frame_interval_ms: 16.0,
            frame_jitter_ms: 0.0,
            spin_duration_ms: None,
            max_winner_wait_ms: 5_000.0,
            realtime_factor: 1.0,
            seed: None,
            print_debug: false,
        }
    }
}

impl From<&SimOpts> for DrawOpts {
    fn from(sim_opts: &SimOpts) -> Self {
        DrawOpts {
            frame_interval_ms: sim_opts.frame_interval_ms,
            frame_jitter_ms: sim_opts.frame_jitter_ms,
            spin_duration_ms: sim_opts.spin_duration_ms,
            max_winner_wait_ms: sim_opts.max_winner_wait_ms,
            realtime_factor: sim_opts.realtime_factor,
            seed: sim_opts.seed,
            print_debug: sim_opts.debug,
        }
    }
}

/// handle_spin runs one complete draw: it creates an engine for the roster, spins it, feeds the
/// winner into it as soon as it arrives on `winner_rx` and ticks it until the carousel has
/// settled on the winner (or the winner did not arrive in time). If a sender is inserted, the
/// draw is paced in real time and snapshots are sent to the renderer.
pub fn handle_spin(
    roster: &Roster,
    pars: &CarouselPars,
    draw_opts: &DrawOpts,
    winner_rx: Option<&Receiver<String>>,
    tx: Option<&Sender<CarouselState>>,
) -> anyhow::Result<DrawResult> {
    if !(draw_opts.realtime_factor.is_finite() && draw_opts.realtime_factor > 0.0) {
        return Err(InputValueError::new(
            "realtime_factor",
            format!("must be positive, but is {}", draw_opts.realtime_factor),
        )
        .into());
    }

    let mut engine = CarouselEngine::new(pars.to_owned())?;
    engine.update_roster(roster.to_owned());

    let mut clock = FrameClock::new(
        0.0,
        draw_opts.frame_interval_ms,
        draw_opts.frame_jitter_ms,
        draw_opts.seed,
    )
    .context("Failed to set up frame clock!")?;

    let spin_duration_ms = draw_opts.spin_duration_ms.unwrap_or(pars.spin_duration_ms);
    let mut events: Vec<DrawEvent> = Vec::new();
    let mut frames: u32 = 0;

    if roster.is_empty() {
        println!("WARNING: Roster is empty, there is nothing to spin!");
    } else {
        engine.start_spin(spin_duration_ms);
        events.push(DrawEvent {
            kind: DrawEventKind::SpinStarted,
            frame: 0,
            time_ms: clock.now_ms(),
        });
    }

    // check if sender was inserted -> in that case use real-time pacing for the renderer
    let sim_realtime = tx.is_some();
    let mut winner_rx = winner_rx;
    let mut winner_received = false;
    let mut alignment_reported = false;
    let mut t_settled: Option<f64> = None;
    let mut t_update_print = 0.0;
    let mut t_update_render = f64::NEG_INFINITY;

    loop {
        let t_start = Instant::now();
        let t_prev = clock.now_ms();
        let now = clock.next_timestamp();
        frames += 1;

        // the winner may arrive at any time, independent of the spin
        if let Some(rx) = winner_rx {
            match rx.try_recv() {
                Ok(winner_id) => {
                    if draw_opts.print_debug {
                        println!("DEBUG: Winner {} received after {:.1}ms", winner_id, now);
                    }
                    engine.set_winner(winner_id);
                    winner_received = true;
                    winner_rx = None;
                    events.push(DrawEvent {
                        kind: DrawEventKind::WinnerReceived,
                        frame: frames,
                        time_ms: now,
                    });
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    if draw_opts.print_debug {
                        println!("DEBUG: Winner channel closed without a winner");
                    }
                    winner_rx = None;
                }
            }
        }

        let phase_prev = engine.phase();
        let phase = engine.tick(now);

        if phase_prev == SpinPhase::Spinning && phase != SpinPhase::Spinning {
            events.push(DrawEvent {
                kind: DrawEventKind::SpinLanded,
                frame: frames,
                time_ms: now,
            });
        }

        if !alignment_reported {
            if let Some(outcome) = engine.last_alignment() {
                alignment_reported = true;
                match outcome {
                    AlignmentOutcome::Aligned { pinned, .. } => {
                        events.push(DrawEvent {
                            kind: DrawEventKind::Aligned,
                            frame: frames,
                            time_ms: now,
                        });
                        if pinned {
                            events.push(DrawEvent {
                                kind: DrawEventKind::WinnerPinned,
                                frame: frames,
                                time_ms: now,
                            });
                        }
                    }
                    AlignmentOutcome::WinnerUnknown => {
                        println!(
                            "WARNING: Winner {} is not part of the roster, alignment skipped!",
                            engine.winner_id().unwrap_or("-")
                        );
                        events.push(DrawEvent {
                            kind: DrawEventKind::WinnerUnknown,
                            frame: frames,
                            time_ms: now,
                        });
                    }
                }
            }
        }

        if draw_opts.print_debug && now > t_update_print + 999.9 {
            println!(
                "DEBUG: Frame {} at {:.1}ms, rotation {:.2}deg, phase {:?}, front {}",
                frames,
                now,
                engine.current_rotation(),
                phase,
                engine.front_participant().map_or("-", |p| p.id.as_str())
            );
            t_update_print = now;
        }

        if let Some(tx) = tx {
            if now > t_update_render + 1000.0 / MAX_RENDER_UPDATE_FREQUENCY - 0.001 {
                tx.send(CarouselState::from_engine(&engine, now))
                    .context("Failed to send carousel state to renderer!")?;
                t_update_render = now;
            }
        }

        // check if the draw is settled
        if phase == SpinPhase::Idle && engine.scheduled_frame().is_none() {
            let t_idle = *t_settled.get_or_insert(now);

            if alignment_reported || roster.is_empty() {
                break;
            }
            if winner_rx.is_none() && !winner_received {
                break;
            }
            if now - t_idle >= draw_opts.max_winner_wait_ms {
                println!(
                    "WARNING: No winner received within {:.0}ms after the carousel settled!",
                    draw_opts.max_winner_wait_ms
                );
                events.push(DrawEvent {
                    kind: DrawEventKind::WinnerTimeout,
                    frame: frames,
                    time_ms: now,
                });
                break;
            }
        } else {
            t_settled = None;
        }

        // sleep until the frame is finished in real-time as well (calculation in ms)
        if sim_realtime {
            let t_sleep = ((now - t_prev) / draw_opts.realtime_factor) as i64
                - t_start.elapsed().as_millis() as i64;

            if t_sleep > 0 {
                sleep(Duration::from_millis(t_sleep as u64));
            } else if t_sleep < 0 {
                println!("WARNING: Could not keep up with real-time!")
            }
        }
    }

    let result = DrawResult {
        winner_id: engine.winner_id().map(|id| id.to_owned()),
        front_participant_id: engine.front_participant().map(|p| p.id.to_owned()),
        final_rotation: engine.current_rotation(),
        frames,
        spin_duration_ms,
        aligned: matches!(engine.last_alignment(), Some(AlignmentOutcome::Aligned { .. })),
        slot_reassignments: engine.slot_reassignments().to_vec(),
        events,
    };

    // after the loop finishes, send final state with the result once
    if let Some(tx) = tx {
        let mut final_state = CarouselState::from_engine(&engine, clock.now_ms());
        final_state.final_result = Some(result.to_owned());
        tx.send(final_state)
            .context("Failed to send final carousel state to renderer!")?;
    }

    if draw_opts.print_debug {
        println!(
            "DEBUG: Draw settled after {} frames, {} scheduled frames were cancelled",
            frames,
            engine.cancelled_frames()
        );
    }

    Ok(result)
}
