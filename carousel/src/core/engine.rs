use crate::core::alignment::{align_to_slot, resolve_winner_slot, Alignment};
use crate::core::participant::{Participant, Roster};
use crate::core::slots::{SlotAssignment, SpinDirection};
use crate::core::spin::{FrameKind, FrameRequest, SpinHandler, SpinPhase};
use crate::core::visibility::derive_visibility;
use crate::pre::carousel_pars::CarouselPars;
use anyhow::Context;
use helpers::angle::{resolve_front_step, wrap_index};

/// SlotView is the renderable layout of one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotView<'a> {
    pub participant: &'a Participant,
    pub slot_idx: usize,
    pub angle: f64,
    pub effective_angle: f64,
    pub depth: f64,
    pub opacity: f64,
    pub is_active: bool,
    pub is_hidden: bool,
}

/// AlignmentOutcome records what happened in the last alignment frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlignmentOutcome {
    Aligned {
        alignment: Alignment,
        participant_idx: usize,
        slot_idx: usize,
        pinned: bool,
    },
    WinnerUnknown,
}

/// CarouselEngine owns the rotation, the slot assignment and the animation frame handle of one
/// carousel. It is advanced exclusively by `tick`, scheduling of the ticks is up to the caller.
#[derive(Debug)]
pub struct CarouselEngine {
    pars: CarouselPars,
    roster: Roster,
    slots: SlotAssignment,
    rotation: f64,
    spin: SpinHandler,
    winner_id: Option<String>,
    last_alignment: Option<AlignmentOutcome>,
}

impl CarouselEngine {
    pub fn new(pars: CarouselPars) -> anyhow::Result<CarouselEngine> {
        pars.validate().context("Invalid carousel parameters!")?;

        Ok(CarouselEngine {
            slots: SlotAssignment::new(0, pars.max_slots),
            spin: SpinHandler::new(pars.total_rotations),
            pars,
            roster: Roster::default(),
            rotation: 0.0,
            winner_id: None,
            last_alignment: None,
        })
    }

    // ---------------------------------------------------------------------------------------------
    // INPUTS --------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// update_roster replaces the participants. If only entries are replaced (same roster size),
    /// rotation and slot assignment survive. Otherwise a fresh cycle begins: the animation is
    /// cancelled and rotation and assignment are reset.
    pub fn update_roster<R: Into<Roster>>(&mut self, participants: R) {
        let roster = participants.into();

        if roster.len() != self.roster.len() {
            self.spin.reset();
            self.rotation = 0.0;
            self.slots = SlotAssignment::new(roster.len(), self.pars.max_slots);
        }
        self.roster = roster;
        self.last_alignment = None;

        // a known winner has to be brought to the front again
        if self.winner_id.is_some() && !self.roster.is_empty() {
            self.spin.request_alignment();
        }
    }

    /// start_spin starts a new spin of the given duration from the current rotation. A running
    /// spin or a pending alignment is cancelled. Nothing happens for an empty roster.
    pub fn start_spin(&mut self, duration_ms: f64) {
        if self.roster.is_empty() {
            return;
        }

        self.last_alignment = None;
        self.spin.start_spin(self.rotation, duration_ms);
    }

    /// set_winner declares the winner. The alignment is scheduled for the next tick, or once the
    /// running spin has landed.
    pub fn set_winner<S: Into<String>>(&mut self, participant_id: S) {
        self.winner_id = Some(participant_id.into());
        self.last_alignment = None;

        if !self.roster.is_empty() {
            self.spin.request_alignment();
        }
    }

    /// tick advances the engine to the given timestamp and returns the resulting phase. Ticks
    /// without a scheduled frame leave the engine untouched.
    pub fn tick(&mut self, timestamp_ms: f64) -> SpinPhase {
        let frame = match self.spin.take_frame() {
            Some(frame) => frame,
            None => return self.spin.phase(),
        };

        match frame.kind {
            FrameKind::Spin => {
                let step = self.spin.advance_spin(timestamp_ms);
                self.apply_rotation(step.rotation);

                if step.landed {
                    self.spin.land(self.winner_id.is_some());
                }
            }
            FrameKind::Align => {
                self.align_winner();
                self.spin.finish_alignment();
            }
        }

        self.spin.phase()
    }

    /// reset discards the current cycle: animation, rotation, assignment and winner.
    pub fn reset(&mut self) {
        self.spin.reset();
        self.rotation = 0.0;
        self.slots = SlotAssignment::new(self.roster.len(), self.pars.max_slots);
        self.winner_id = None;
        self.last_alignment = None;
    }

    // ---------------------------------------------------------------------------------------------
    // OUTPUTS -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// get_slots returns the layout of all materialized slots in slot order.
    pub fn get_slots(&self) -> Vec<SlotView<'_>> {
        let slot_count = self.slots.slot_count();
        let spinning = self.spin.is_spinning();
        let mut views = Vec::with_capacity(slot_count);

        for slot_idx in 0..slot_count {
            let participant = match self
                .slots
                .participant_idx(slot_idx)
                .and_then(|idx| self.roster.get(idx))
            {
                Some(participant) => participant,
                None => continue,
            };

            let is_active = !spinning
                && self
                    .winner_id
                    .as_deref()
                    .map_or(false, |id| id == participant.id);

            let angle = self.slots.slot_angle(slot_idx);
            let vis = derive_visibility(
                angle,
                self.rotation,
                self.slots.angle_per_slot(),
                slot_count,
                is_active,
                &self.pars,
            );

            views.push(SlotView {
                participant,
                slot_idx,
                angle,
                effective_angle: vis.effective_angle,
                depth: vis.depth,
                opacity: vis.opacity,
                is_active: vis.is_active,
                is_hidden: vis.is_hidden,
            });
        }

        views
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.is_spinning()
    }

    pub fn current_rotation(&self) -> f64 {
        self.rotation
    }

    pub fn phase(&self) -> SpinPhase {
        self.spin.phase()
    }

    /// front_slot returns the slot nearest to the front position.
    pub fn front_slot(&self) -> Option<usize> {
        let slot_count = self.slots.slot_count();
        if slot_count == 0 {
            return None;
        }
        let step = resolve_front_step(self.rotation, self.slots.angle_per_slot());
        Some(wrap_index(step, slot_count))
    }

    pub fn front_participant(&self) -> Option<&Participant> {
        self.front_slot()
            .and_then(|slot_idx| self.slots.participant_idx(slot_idx))
            .and_then(|idx| self.roster.get(idx))
    }

    pub fn winner_id(&self) -> Option<&str> {
        self.winner_id.as_deref()
    }

    pub fn scheduled_frame(&self) -> Option<FrameRequest> {
        self.spin.scheduled_frame()
    }

    pub fn cancelled_frames(&self) -> u64 {
        self.spin.cancelled_frames()
    }

    pub fn last_alignment(&self) -> Option<AlignmentOutcome> {
        self.last_alignment
    }

    pub fn slot_count(&self) -> usize {
        self.slots.slot_count()
    }

    pub fn angle_per_slot(&self) -> f64 {
        self.slots.angle_per_slot()
    }

    pub fn slot_reassignments(&self) -> &[u32] {
        self.slots.reassignments()
    }

    pub fn direction(&self) -> SpinDirection {
        self.slots.direction()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    // ---------------------------------------------------------------------------------------------
    // HELPERS -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    fn apply_rotation(&mut self, rotation: f64) {
        if !rotation.is_finite() {
            return;
        }
        self.slots.advance(self.rotation, rotation);
        self.rotation = rotation;
    }

    fn align_winner(&mut self) {
        let winner_id = match self.winner_id.clone() {
            Some(id) => id,
            None => return,
        };

        let winner = match resolve_winner_slot(&self.roster, &self.slots, &winner_id) {
            Some(winner) => winner,
            None => {
                self.last_alignment = Some(AlignmentOutcome::WinnerUnknown);
                return;
            }
        };

        let alignment = align_to_slot(self.rotation, winner.slot_idx, self.slots.angle_per_slot());
        self.apply_rotation(alignment.rotation);

        // the slot may not show the winner yet (raw index fallback) or may have been recycled on
        // the way to the front
        let pinned = self.slots.participant_idx(winner.slot_idx) != Some(winner.participant_idx);
        if pinned {
            self.slots.pin(winner.slot_idx, winner.participant_idx);
        }

        self.last_alignment = Some(AlignmentOutcome::Aligned {
            alignment,
            participant_idx: winner.participant_idx,
            slot_idx: winner.slot_idx,
            pinned,
        });
    }
}
