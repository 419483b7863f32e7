use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "carousel-cli",
    about = "Frame-driven carousel spin-to-winner engine for raffle draws"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing
    #[clap(short, long)]
    pub debug: bool,

    /// Activate live mode - the draw is run in real time and every frame is rendered as text
    #[clap(short, long)]
    pub live: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the roster file (JSON array of participants with an "id" each)
    #[clap(short, long, default_value = "input/rosters/demo.json")]
    pub roster_path: PathBuf,

    /// Set path to the carousel parameter file (OPTIONAL: built-in parameters if not set)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set the id of the winner (OPTIONAL: a random participant is drawn if not set)
    #[clap(short, long)]
    pub winner: Option<String>,

    /// Set delay in ms after which the winner is announced to the carousel
    #[clap(long, default_value = "1600")]
    pub winner_delay_ms: u64,

    /// Set the maximum time in ms the landed carousel waits for the winner
    #[clap(long, default_value = "5000")]
    pub max_winner_wait_ms: f64,

    /// Set spin duration in ms (OPTIONAL: taken from the parameter file if not set)
    #[clap(short, long)]
    pub spin_duration_ms: Option<f64>,

    /// Set frame interval in ms, should be in the range [1.0, 100.0]
    #[clap(short, long, default_value = "16.0")]
    pub frame_interval_ms: f64,

    /// Set standard deviation of the frame interval jitter in ms
    #[clap(short = 'j', long, default_value = "0.0")]
    pub frame_jitter_ms: f64,

    /// Set seed for the frame jitter and the winner selection (OPTIONAL)
    #[clap(long)]
    pub seed: Option<u64>,

    /// Set real-time factor (only relevant in live mode)
    #[clap(short = 't', long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set number of draws (only for non-live mode, ignored in live mode)
    #[clap(short, long, default_value = "1")]
    pub no_draws: u32,

    /// Set path of the JSON result file (OPTIONAL: output/last_draw.json if not set)
    #[clap(short, long)]
    pub output_path: Option<PathBuf>,
}
