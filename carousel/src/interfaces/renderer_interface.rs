use crate::core::engine::{CarouselEngine, SlotView};
use crate::core::participant::Participant;
use crate::core::spin::SpinPhase;
use crate::post::draw_result::DrawResult;

pub const MAX_RENDER_UPDATE_FREQUENCY: f64 = 30.0;

/// SlotState is the owned version of a slot layout that can be sent to a renderer thread.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotState {
    pub participant: Participant,
    pub slot_idx: usize,
    pub angle: f64,
    pub effective_angle: f64,
    pub depth: f64,
    pub opacity: f64,
    pub is_active: bool,
    pub is_hidden: bool,
}

impl From<&SlotView<'_>> for SlotState {
    fn from(view: &SlotView<'_>) -> Self {
        SlotState {
            participant: view.participant.to_owned(),
            slot_idx: view.slot_idx,
            angle: view.angle,
            effective_angle: view.effective_angle,
            depth: view.depth,
            opacity: view.opacity,
            is_active: view.is_active,
            is_hidden: view.is_hidden,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CarouselState {
    pub time_ms: f64,
    pub rotation: f64,
    pub phase: SpinPhase,
    pub slots: Vec<SlotState>,
    pub front_participant_id: Option<String>,

    // final result payload (sent once when the draw is settled)
    pub final_result: Option<DrawResult>,
}

impl CarouselState {
    /// from_engine takes a snapshot of the current engine layout.
    pub fn from_engine(engine: &CarouselEngine, time_ms: f64) -> CarouselState {
        CarouselState {
            time_ms,
            rotation: engine.current_rotation(),
            phase: engine.phase(),
            slots: engine.get_slots().iter().map(SlotState::from).collect(),
            front_participant_id: engine.front_participant().map(|p| p.id.to_owned()),
            final_result: None,
        }
    }

    /// visible_slots returns the slots that are not hidden, ordered by their effective angle.
    pub fn visible_slots(&self) -> Vec<&SlotState> {
        let mut visible: Vec<&SlotState> = self.slots.iter().filter(|s| !s.is_hidden).collect();
        visible.sort_by(|a, b| {
            a.effective_angle
                .partial_cmp(&b.effective_angle)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        visible
    }
}
