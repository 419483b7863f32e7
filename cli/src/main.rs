use carousel::core::handle_spin::{handle_spin, DrawOpts};
use carousel::core::participant::{Participant, Roster};
use carousel::interfaces::renderer_interface::CarouselState;
use carousel::post::draw_result::DrawResult;
use carousel::pre::carousel_pars::CarouselPars;
use carousel::pre::read_pars::{read_carousel_pars, read_roster};
use carousel::pre::sim_opts::SimOpts;
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::fmt::Write;
use std::thread;
use std::time::{Duration, Instant};

/// pick_winner returns the winner given on the command line or draws one at random. The
/// carousel itself never decides who wins.
fn pick_winner(roster: &Roster, winner: Option<&str>, rng: &mut StdRng) -> anyhow::Result<String> {
    if let Some(id) = winner {
        if roster.position(id).is_none() {
            println!("WARNING: Winner {} is not part of the roster!", id);
        }
        return Ok(id.to_owned());
    }

    roster
        .as_slice()
        .choose(rng)
        .map(|p| p.id.to_owned())
        .ok_or_else(|| anyhow::anyhow!("Cannot draw a winner from an empty roster!"))
}

fn display_name(participant: &Participant) -> &str {
    participant
        .payload
        .get("name")
        .and_then(|name| name.as_str())
        .unwrap_or(participant.id.as_str())
}

/// render_state_line renders the visible part of the carousel as one line of text.
fn render_state_line(state: &CarouselState) -> String {
    let mut line = String::new();
    let _ = write!(
        &mut line,
        "[{:8.1}ms] {:>10.2}deg {:<8} |",
        state.time_ms,
        state.rotation,
        format!("{:?}", state.phase)
    );

    for slot in state.visible_slots() {
        let marker = if slot.is_active {
            "*"
        } else if state.front_participant_id.as_deref() == Some(slot.participant.id.as_str()) {
            ">"
        } else {
            " "
        };
        let _ = write!(
            &mut line,
            " {}{} ({:.2})",
            marker,
            display_name(&slot.participant),
            slot.opacity
        );
    }
    line
}

fn print_result(result: &DrawResult, roster: &Roster) {
    result.print_summary();

    if let Some(winner) = result
        .winner_id
        .as_deref()
        .and_then(|id| roster.position(id))
        .and_then(|idx| roster.get(idx))
    {
        println!("RESULT: And the winner is... {}!", display_name(winner));
    }
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    println!("INFO: Reading roster from {:?}", sim_opts.roster_path);
    let roster = read_roster(&sim_opts.roster_path)?;
    if roster.is_empty() {
        anyhow::bail!(
            "Roster file {:?} contains no participants!",
            sim_opts.roster_path
        );
    }

    let pars = if let Some(parfile_path) = &sim_opts.parfile_path {
        println!("INFO: Reading carousel parameters from {:?}", parfile_path);
        read_carousel_pars(parfile_path)?
    } else {
        CarouselPars::default()
    };

    let draw_opts = DrawOpts::from(&sim_opts);

    println!(
        "INFO: Drawing among {} participants on {} slots, spin duration {:.0}ms, frame interval {:.1}ms",
        roster.len(),
        roster.len().min(pars.max_slots),
        draw_opts.spin_duration_ms.unwrap_or(pars.spin_duration_ms),
        draw_opts.frame_interval_ms
    );

    let mut rng = match sim_opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // EXECUTION -----------------------------------------------------------------------------------
    let last_result = if !sim_opts.live {
        // HEADLESS CASE - draws are run in simulated time, the winner is known from the start
        let no_draws = sim_opts.no_draws.max(1);
        let mut winners = Vec::with_capacity(no_draws as usize);
        for _ in 0..no_draws {
            winners.push(pick_winner(&roster, sim_opts.winner.as_deref(), &mut rng)?);
        }

        let t_start = Instant::now();
        let results = winners
            .into_par_iter()
            .enumerate()
            .map(|(i, winner_id)| {
                let (winner_tx, winner_rx) = flume::unbounded();
                winner_tx.send(winner_id)?;

                let mut draw_opts_run = draw_opts.clone();
                draw_opts_run.seed = draw_opts.seed.map(|seed| seed.wrapping_add(i as u64));
                handle_spin(&roster, &pars, &draw_opts_run, Some(&winner_rx), None)
            })
            .collect::<anyhow::Result<Vec<DrawResult>>>()?;

        println!(
            "INFO: Execution time for {} draw(s): {}ms",
            no_draws,
            t_start.elapsed().as_millis()
        );

        for result in results.iter() {
            print_result(result, &roster);
        }

        results
            .into_iter()
            .last()
            .ok_or_else(|| anyhow::anyhow!("No draw was run!"))?
    } else {
        // LIVE CASE - the draw runs in real time on its own thread, the winner arrives later
        println!("INFO: Starting live draw...");
        let winner_id = pick_winner(&roster, sim_opts.winner.as_deref(), &mut rng)?;

        let (tx, rx) = flume::unbounded();
        let (winner_tx, winner_rx) = flume::unbounded();

        let winner_delay = Duration::from_millis(
            (sim_opts.winner_delay_ms as f64 / sim_opts.realtime_factor.max(1e-3)) as u64,
        );
        let _ = thread::spawn(move || {
            thread::sleep(winner_delay);
            // the draw may already be over if the winner was too late
            let _ = winner_tx.send(winner_id);
        });

        let roster_thread = roster.clone();
        let pars_thread = pars.clone();
        let draw_opts_thread = draw_opts.clone();
        let draw_thread = thread::spawn(move || {
            handle_spin(
                &roster_thread,
                &pars_thread,
                &draw_opts_thread,
                Some(&winner_rx),
                Some(&tx),
            )
        });

        // render on the main thread until the draw thread drops its sender
        for state in rx.iter() {
            println!("{}", render_state_line(&state));
        }

        let result = draw_thread
            .join()
            .map_err(|_| anyhow::anyhow!("Draw thread panicked!"))??;
        print_result(&result, &roster);
        result
    };

    // POST-PROCESSING -----------------------------------------------------------------------------
    match last_result.write_to_file(sim_opts.output_path.as_deref()) {
        Ok(path) => println!("INFO: Draw result saved: {}", path),
        Err(e) => eprintln!("WARNING: Could not save draw result: {:#}", e),
    }

    Ok(())
}
