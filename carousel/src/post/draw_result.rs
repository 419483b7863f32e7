use std::fmt::Write;
use std::io::Write as IoWrite;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum DrawEventKind {
    SpinStarted,
    SpinLanded,
    WinnerReceived,
    Aligned,
    WinnerPinned,
    WinnerUnknown,
    WinnerTimeout,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DrawEvent {
    pub kind: DrawEventKind,
    pub frame: u32,   // frame in which the event happened (0 = before the first frame)
    pub time_ms: f64, // frame timestamp
}

/// DrawResult contains all information about a finished draw that is required for
/// post-processing.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DrawResult {
    pub winner_id: Option<String>,
    pub front_participant_id: Option<String>,
    pub final_rotation: f64,
    pub frames: u32,
    pub spin_duration_ms: f64,
    pub aligned: bool,
    pub slot_reassignments: Vec<u32>,
    pub events: Vec<DrawEvent>,
}

impl DrawResult {
    /// winner_in_front returns true if the draw ended with the winner on the front slot.
    pub fn winner_in_front(&self) -> bool {
        self.aligned && self.winner_id.is_some() && self.winner_id == self.front_participant_id
    }

    pub fn has_event(&self, kind: DrawEventKind) -> bool {
        self.events.iter().any(|ev| ev.kind == kind)
    }

    /// write_to_file writes the result as JSON into output/ (or the given path). Returns the
    /// path to the written file.
    pub fn write_to_file(&self, path: Option<&std::path::Path>) -> anyhow::Result<String> {
        let out_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let out_dir = std::path::Path::new("output");
                std::fs::create_dir_all(out_dir).context("Failed to create output directory!")?;
                out_dir.join("last_draw.json")
            }
        };

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize draw result!")?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&out_path)
            .context(format!("Failed to open result file {}!", out_path.display()))?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        Ok(out_path.to_string_lossy().into_owned())
    }

    /// summary formats the draw result for console output.
    pub fn summary(&self) -> String {
        let mut tmp_string = String::new();

        // writing into a String cannot fail
        let _ = writeln!(
            &mut tmp_string,
            "winner: {}, front: {}, aligned: {}",
            self.winner_id.as_deref().unwrap_or("-"),
            self.front_participant_id.as_deref().unwrap_or("-"),
            self.aligned
        );
        let _ = writeln!(
            &mut tmp_string,
            "final rotation: {:.3}deg after {} frames (spin duration {:.0}ms)",
            self.final_rotation, self.frames, self.spin_duration_ms
        );

        let _ = write!(&mut tmp_string, "slot reassignments: ");
        for (i, count) in self.slot_reassignments.iter().enumerate() {
            if i < self.slot_reassignments.len() - 1 {
                let _ = write!(&mut tmp_string, "{}: {}, ", i, count);
            } else {
                let _ = write!(&mut tmp_string, "{}: {}", i, count);
            }
        }
        let _ = writeln!(&mut tmp_string);

        for ev in self.events.iter() {
            let _ = writeln!(
                &mut tmp_string,
                "event: {:?} in frame {} at {:.1}ms",
                ev.kind, ev.frame, ev.time_ms
            );
        }
        tmp_string
    }

    /// print_summary prints the draw result to the console output.
    pub fn print_summary(&self) {
        println!("RESULT: Draw");
        print!("{}", self.summary());
    }
}
