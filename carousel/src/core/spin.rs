use helpers::angle::{ease_out_cubic, FULL_TURN};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinPhase {
    Idle,
    Spinning,
    Aligning,
}

impl Default for SpinPhase {
    fn default() -> Self {
        SpinPhase::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Spin,
    Align,
}

/// FrameRequest is the handle of the one animation frame the engine waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    pub id: u64,
    pub kind: FrameKind,
}

/// SpinStep is the outcome of one spin frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinStep {
    pub rotation: f64,
    pub progress: f64,
    pub landed: bool,
}

/// SpinHandler is the state machine driving the spin animation (Idle -> Spinning -> Aligning ->
/// Idle). It owns at most one scheduled frame request. Scheduling a frame always cancels the
/// previous request first, so there can never be two animation loops for one carousel.
#[derive(Debug)]
pub struct SpinHandler {
    // parameters
    total_rotations: f64,

    // state machine
    phase: SpinPhase,
    duration_ms: f64,
    start_rotation: f64,
    t_start: Option<f64>,

    // frame bookkeeping
    frame: Option<FrameRequest>,
    next_frame_id: u64,
    cancelled_frames: u64,
}

impl SpinHandler {
    pub fn new(total_rotations: f64) -> SpinHandler {
        SpinHandler {
            total_rotations,
            phase: SpinPhase::Idle,
            duration_ms: 0.0,
            start_rotation: 0.0,
            t_start: None,
            frame: None,
            next_frame_id: 1,
            cancelled_frames: 0,
        }
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, SpinPhase::Spinning)
    }

    pub fn scheduled_frame(&self) -> Option<FrameRequest> {
        self.frame
    }

    /// cancelled_frames returns how many scheduled frames were dropped because a newer request
    /// replaced them.
    pub fn cancelled_frames(&self) -> u64 {
        self.cancelled_frames
    }

    /// start_spin (re)starts the spin animation from the given rotation. A running spin or a
    /// pending alignment is cancelled.
    pub fn start_spin(&mut self, start_rotation: f64, duration_ms: f64) {
        self.phase = SpinPhase::Spinning;
        self.duration_ms = if duration_ms.is_finite() {
            duration_ms.max(0.0)
        } else {
            0.0
        };
        self.start_rotation = start_rotation;
        self.t_start = None;
        self.schedule_frame(FrameKind::Spin);
    }

    /// request_alignment moves an idle carousel into the aligning state. While spinning the
    /// request is held back until the spin lands. Returns true if an alignment frame is pending
    /// afterwards.
    pub fn request_alignment(&mut self) -> bool {
        match self.phase {
            SpinPhase::Idle => {
                self.phase = SpinPhase::Aligning;
                self.schedule_frame(FrameKind::Align);
                true
            }
            SpinPhase::Aligning => true,
            SpinPhase::Spinning => false,
        }
    }

    /// take_frame consumes the scheduled frame request (if any) for the current tick.
    pub fn take_frame(&mut self) -> Option<FrameRequest> {
        self.frame.take()
    }

    /// advance_spin calculates the rotation for the given timestamp. The first timestamp of a
    /// spin serves as its zero reference. If the spin did not land yet, the next spin frame is
    /// scheduled.
    pub fn advance_spin(&mut self, now_ms: f64) -> SpinStep {
        let t_start = *self.t_start.get_or_insert(now_ms);
        let elapsed = (now_ms - t_start).max(0.0);

        let progress = if self.duration_ms > 0.0 {
            (elapsed / self.duration_ms).min(1.0)
        } else {
            1.0
        };
        let landed = elapsed >= self.duration_ms;

        if !landed {
            self.schedule_frame(FrameKind::Spin);
        }

        SpinStep {
            rotation: self.start_rotation
                - ease_out_cubic(progress) * self.total_rotations * FULL_TURN,
            progress,
            landed,
        }
    }

    /// land finishes the spin. If the winner is already known the alignment is scheduled right
    /// away, otherwise the carousel becomes idle and waits for it.
    pub fn land(&mut self, winner_known: bool) {
        if !matches!(self.phase, SpinPhase::Spinning) {
            return;
        }

        self.phase = SpinPhase::Idle;
        if winner_known {
            self.request_alignment();
        }
    }

    /// finish_alignment returns to the idle state after the correction was applied.
    pub fn finish_alignment(&mut self) {
        if matches!(self.phase, SpinPhase::Aligning) {
            self.phase = SpinPhase::Idle;
        }
    }

    /// reset cancels everything and returns to the idle state.
    pub fn reset(&mut self) {
        self.cancel_frame();
        self.phase = SpinPhase::Idle;
        self.duration_ms = 0.0;
        self.start_rotation = 0.0;
        self.t_start = None;
    }

    fn schedule_frame(&mut self, kind: FrameKind) {
        self.cancel_frame();
        self.frame = Some(FrameRequest {
            id: self.next_frame_id,
            kind,
        });
        self.next_frame_id += 1;
    }

    fn cancel_frame(&mut self) {
        if self.frame.take().is_some() {
            self.cancelled_frames += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn spin_follows_ease_out_curve() {
        let mut sh = SpinHandler::new(8.0);
        sh.start_spin(0.0, 10_000.0);
        assert!(sh.is_spinning());

        // first tick is the zero reference
        sh.take_frame();
        let step = sh.advance_spin(5_000.0);
        assert_abs_diff_eq!(step.rotation, 0.0);
        assert!(!step.landed);

        sh.take_frame();
        let step = sh.advance_spin(10_000.0);
        assert_abs_diff_eq!(step.progress, 0.5);
        assert_abs_diff_eq!(step.rotation, -0.875 * 8.0 * 360.0);

        // overshooting frame lands exactly on the end value
        sh.take_frame();
        let step = sh.advance_spin(15_250.0);
        assert!(step.landed);
        assert_abs_diff_eq!(step.rotation, -2880.0);
        assert_eq!(sh.scheduled_frame(), None);
    }

    #[test]
    fn spin_starts_from_current_rotation() {
        let mut sh = SpinHandler::new(2.0);
        sh.start_spin(180.0, 1_000.0);
        sh.advance_spin(0.0);
        let step = sh.advance_spin(1_000.0);
        assert_abs_diff_eq!(step.rotation, 180.0 - 720.0);
    }

    #[test]
    fn zero_duration_lands_on_first_frame() {
        let mut sh = SpinHandler::new(1.0);
        sh.start_spin(0.0, 0.0);
        let step = sh.advance_spin(42.0);
        assert!(step.landed);
        assert_abs_diff_eq!(step.rotation, -360.0);
    }

    #[test]
    fn new_request_cancels_pending_frame() {
        let mut sh = SpinHandler::new(8.0);
        sh.start_spin(0.0, 1_000.0);
        let first = sh.scheduled_frame().unwrap();

        sh.start_spin(0.0, 1_000.0);
        let second = sh.scheduled_frame().unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(second.kind, FrameKind::Spin);
        assert_eq!(sh.cancelled_frames(), 1);
    }

    #[test]
    fn alignment_is_held_while_spinning() {
        let mut sh = SpinHandler::new(8.0);
        sh.start_spin(0.0, 1_000.0);
        assert!(!sh.request_alignment());
        assert_eq!(sh.phase(), SpinPhase::Spinning);

        sh.take_frame();
        sh.advance_spin(0.0);
        sh.take_frame();
        let step = sh.advance_spin(1_000.0);
        assert!(step.landed);

        sh.land(true);
        assert_eq!(sh.phase(), SpinPhase::Aligning);
        assert_eq!(sh.scheduled_frame().map(|f| f.kind), Some(FrameKind::Align));

        sh.take_frame();
        sh.finish_alignment();
        assert_eq!(sh.phase(), SpinPhase::Idle);
        assert_eq!(sh.scheduled_frame(), None);
    }

    #[test]
    fn landing_without_winner_goes_idle() {
        let mut sh = SpinHandler::new(8.0);
        sh.start_spin(0.0, 0.0);
        sh.take_frame();
        sh.advance_spin(0.0);
        sh.land(false);
        assert_eq!(sh.phase(), SpinPhase::Idle);
        assert_eq!(sh.scheduled_frame(), None);
    }
}
