use crate::core::participant::Roster;
use crate::core::slots::SlotAssignment;
use helpers::angle::{shortest_rotation, FULL_TURN};

/// WinnerSlot tells where the winner is (or will be) shown.
///
/// * `participant_idx` - Roster index of the winner
/// * `slot_idx` - Slot that must be brought to the front
/// * `materialized` - True if the slot already shows the winner, false if the slot was derived
/// from the raw roster index and the winner still has to be pinned into it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinnerSlot {
    pub participant_idx: usize,
    pub slot_idx: usize,
    pub materialized: bool,
}

/// Alignment is the result of the corrective rotation that brings the winner slot to the front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    pub target_angle: f64,
    pub current_angle: f64,
    pub delta: f64,
    pub rotation: f64,
}

/// resolve_winner_slot looks up the slot of the winner. The slot currently showing the winner is
/// preferred, otherwise the raw roster index is used (modulo the slot count, which addresses the
/// same angle). Returns None if the winner is not part of the roster.
pub fn resolve_winner_slot(
    roster: &Roster,
    slots: &SlotAssignment,
    winner_id: &str,
) -> Option<WinnerSlot> {
    let participant_idx = roster.position(winner_id)?;

    if slots.slot_count() == 0 {
        return None;
    }

    if let Some(slot_idx) = slots.slot_of(participant_idx) {
        return Some(WinnerSlot {
            participant_idx,
            slot_idx,
            materialized: true,
        });
    }

    Some(WinnerSlot {
        participant_idx,
        slot_idx: participant_idx % slots.slot_count(),
        materialized: false,
    })
}

/// align_to_slot calculates the shortest corrective rotation that brings the given slot to the
/// front position. The correction never exceeds half a turn.
pub fn align_to_slot(rotation: f64, slot_idx: usize, angle_per_slot: f64) -> Alignment {
    let target_angle = -(slot_idx as f64) * angle_per_slot;
    let current_angle = rotation % FULL_TURN;
    let delta = shortest_rotation(current_angle, target_angle);

    Alignment {
        target_angle,
        current_angle,
        delta,
        rotation: rotation + delta,
    }
}
