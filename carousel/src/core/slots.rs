use helpers::angle::{wrap_index, FULL_TURN, HALF_TURN};
use std::convert::TryFrom;

/// SpinDirection describes in which direction the wheel moved in the last tick. Forward is the
/// direction of a spin (decreasing rotation), in which the front step increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinDirection {
    Forward,
    Backward,
}

impl Default for SpinDirection {
    fn default() -> Self {
        SpinDirection::Forward
    }
}

/// SlotAssignment decides which roster entry each of the materialized slots shows.
///
/// Slot `i` sits at the fixed angle `i * 360 / S`. If the roster fits into the slots, slot `i`
/// always shows participant `i`. Otherwise every slot holds a logical position of a moving window
/// `[range_start, range_end[` over the roster (wrapped modulo the roster length). Whenever a slot
/// passes the back point of the circle (half a turn away from the front) it is recycled: in
/// forward direction it receives `range_end`, in backward direction `range_start - 1`, and the
/// window moves by one position.
///
/// Initially the slots on the leading half of the circle (angle <= 180 deg) show participants
/// `0, 1, ...` and the trailing half shows the end of the roster, so that the slot contents always
/// form one contiguous window and no participant is shown twice.
#[derive(Debug, Clone)]
pub struct SlotAssignment {
    participant_count: usize,
    slot_count: usize,
    angle_per_slot: f64,
    positions: Vec<i64>,
    assignment: Vec<usize>,
    range_start: i64,
    range_end: i64,
    direction: SpinDirection,
    reassignments: Vec<u32>,
}

#[derive(Debug, Clone, Copy)]
struct Crossing {
    rotation: f64,
    slot_idx: usize,
}

impl SlotAssignment {
    pub fn new(participant_count: usize, max_slots: usize) -> SlotAssignment {
        let slot_count = participant_count.min(max_slots);
        let angle_per_slot = if slot_count > 0 {
            FULL_TURN / slot_count as f64
        } else {
            0.0
        };

        let mut slot_assignment = SlotAssignment {
            participant_count,
            slot_count,
            angle_per_slot,
            positions: Vec::with_capacity(slot_count),
            assignment: Vec::with_capacity(slot_count),
            range_start: 0,
            range_end: slot_count as i64,
            direction: SpinDirection::default(),
            reassignments: vec![0; slot_count],
        };

        for slot_idx in 0..slot_count {
            let position = if slot_assignment.is_virtualized() {
                slot_idx as i64 + slot_count as i64 * slot_assignment.turns_past_back(slot_idx, 0.0)
            } else {
                slot_idx as i64
            };
            slot_assignment.positions.push(position);
            slot_assignment
                .assignment
                .push(wrap_index(position, participant_count));
        }

        if let (Some(&first), Some(&last)) = (
            slot_assignment.positions.iter().min(),
            slot_assignment.positions.iter().max(),
        ) {
            slot_assignment.range_start = first;
            slot_assignment.range_end = last + 1;
        }

        slot_assignment
    }

    // ---------------------------------------------------------------------------------------------
    // GETTERS -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn angle_per_slot(&self) -> f64 {
        self.angle_per_slot
    }

    /// is_virtualized returns true if the roster is larger than the number of slots.
    pub fn is_virtualized(&self) -> bool {
        self.participant_count > self.slot_count
    }

    pub fn slot_angle(&self, slot_idx: usize) -> f64 {
        slot_idx as f64 * self.angle_per_slot
    }

    /// participant_idx returns the roster index shown by the given slot.
    pub fn participant_idx(&self, slot_idx: usize) -> Option<usize> {
        self.assignment.get(slot_idx).copied()
    }

    /// slot_of returns the slot currently showing the given roster index.
    pub fn slot_of(&self, participant_idx: usize) -> Option<usize> {
        self.assignment.iter().position(|&idx| idx == participant_idx)
    }

    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// range returns the logical window [range_start, range_end[ of the roster.
    pub fn range(&self) -> (i64, i64) {
        (self.range_start, self.range_end)
    }

    pub fn direction(&self) -> SpinDirection {
        self.direction
    }

    /// reassignments returns how often every slot was recycled so far.
    pub fn reassignments(&self) -> &[u32] {
        &self.reassignments
    }

    pub fn total_reassignments(&self) -> u32 {
        self.reassignments.iter().sum()
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// advance updates the assignment for a change of the wheel rotation from `rotation_prev` to
    /// `rotation_cur` and returns the number of recycled slots. Crossings of the back point are
    /// determined from both rotation values, such that every crossing recycles its slot exactly
    /// once no matter how far the wheel moved within one tick.
    pub fn advance(&mut self, rotation_prev: f64, rotation_cur: f64) -> usize {
        if rotation_cur < rotation_prev {
            self.direction = SpinDirection::Forward;
        } else if rotation_cur > rotation_prev {
            self.direction = SpinDirection::Backward;
        } else {
            return 0;
        }

        if !self.is_virtualized() || self.slot_count == 0 {
            return 0;
        }

        let turn_ranges: Vec<(i64, i64)> = (0..self.slot_count)
            .map(|slot_idx| {
                let turns_prev = self.turns_past_back(slot_idx, rotation_prev);
                let turns_cur = self.turns_past_back(slot_idx, rotation_cur);
                (turns_prev.min(turns_cur), turns_prev.max(turns_cur))
            })
            .collect();

        // every full turn recycles each slot once and moves the window by the slot count
        let full_turns = turn_ranges
            .iter()
            .map(|(lo, hi)| hi - lo)
            .min()
            .unwrap_or(0);
        if full_turns > 0 {
            self.shift_full_turns(full_turns);
        }

        // the remaining crossings are the latest ones, at most one per slot
        let mut crossings = Vec::with_capacity(self.slot_count);

        for (slot_idx, &(lo, hi)) in turn_ranges.iter().enumerate() {
            let (first, last) = match self.direction {
                SpinDirection::Forward => (lo + full_turns, hi),
                SpinDirection::Backward => (lo, hi - full_turns),
            };

            // a crossing from turn a to a + 1 happens at the rotation where the slot is exactly
            // at the back point
            for turn in first..last {
                crossings.push(Crossing {
                    rotation: HALF_TURN - self.slot_angle(slot_idx) - FULL_TURN * (turn + 1) as f64,
                    slot_idx,
                });
            }
        }

        // apply the crossings in the order in which the wheel reaches them
        match self.direction {
            SpinDirection::Forward => crossings.sort_by(|a, b| {
                b.rotation
                    .partial_cmp(&a.rotation)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.slot_idx.cmp(&b.slot_idx))
            }),
            SpinDirection::Backward => crossings.sort_by(|a, b| {
                a.rotation
                    .partial_cmp(&b.rotation)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.slot_idx.cmp(&b.slot_idx))
            }),
        }

        for crossing in crossings.iter() {
            self.recycle(crossing.slot_idx);
        }

        full_turns as usize * self.slot_count + crossings.len()
    }

    /// pin lets the given slot show the given roster index until the slot is recycled the next
    /// time.
    pub fn pin(&mut self, slot_idx: usize, participant_idx: usize) {
        if slot_idx >= self.slot_count || participant_idx >= self.participant_count {
            return;
        }
        self.assignment[slot_idx] = participant_idx;
    }

    /// shift_full_turns applies `turns` complete revolutions in the current direction. Each slot
    /// is recycled once per revolution, which moves its logical position by the slot count.
    fn shift_full_turns(&mut self, turns: i64) {
        let shift = match self.direction {
            SpinDirection::Forward => turns * self.slot_count as i64,
            SpinDirection::Backward => -turns * self.slot_count as i64,
        };
        let increment = u32::try_from(turns).unwrap_or(u32::MAX);

        self.range_start += shift;
        self.range_end += shift;

        for slot_idx in 0..self.slot_count {
            self.positions[slot_idx] += shift;
            self.assignment[slot_idx] =
                wrap_index(self.positions[slot_idx], self.participant_count);
            self.reassignments[slot_idx] = self.reassignments[slot_idx].saturating_add(increment);
        }
    }

    fn recycle(&mut self, slot_idx: usize) {
        let position = match self.direction {
            SpinDirection::Forward => {
                let position = self.range_end;
                self.range_start += 1;
                self.range_end += 1;
                position
            }
            SpinDirection::Backward => {
                self.range_start -= 1;
                self.range_end -= 1;
                self.range_start
            }
        };

        self.positions[slot_idx] = position;
        self.assignment[slot_idx] = wrap_index(position, self.participant_count);
        self.reassignments[slot_idx] = self.reassignments[slot_idx].saturating_add(1);
    }

    /// turns_past_back returns how often the slot passed the back point in forward direction
    /// when the wheel is rotated from 0 to `rotation`. A slot exactly at the back point counts as
    /// not yet passed.
    fn turns_past_back(&self, slot_idx: usize, rotation: f64) -> i64 {
        let turns = ((HALF_TURN - self.slot_angle(slot_idx) - rotation) / FULL_TURN).floor();
        if turns.is_finite() {
            turns as i64
        } else {
            0
        }
    }
}
