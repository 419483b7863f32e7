use crate::pre::carousel_pars::CarouselPars;
use helpers::angle::normalize_angle;
use helpers::general::lin_interp;

/// SlotVisibility contains everything a renderer needs to know about how prominent a slot is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotVisibility {
    pub effective_angle: f64,
    pub steps_from_front: f64,
    pub depth: f64,
    pub opacity: f64,
    pub is_active: bool,
    pub is_hidden: bool,
}

/// steps_from_front returns the distance of a slot from the front position in units of slots.
pub fn steps_from_front(slot_angle: f64, rotation: f64, angle_per_slot: f64) -> f64 {
    if angle_per_slot <= 0.0 {
        return 0.0;
    }
    normalize_angle(slot_angle + rotation).abs() / angle_per_slot
}

/// fade_factor returns 1.0 for fully visible slots, 0.0 for hidden slots and a linear fade in
/// between. Slots are only faded if there are more than `visibility_threshold` of them.
pub fn fade_factor(steps_from_front: f64, slot_count: usize, pars: &CarouselPars) -> f64 {
    if slot_count <= pars.visibility_threshold {
        return 1.0;
    }

    let fade_end = pars.fade_end();

    if steps_from_front <= pars.max_visible_step {
        1.0
    } else if steps_from_front >= fade_end {
        0.0
    } else {
        lin_interp(
            steps_from_front,
            &[pars.max_visible_step, fade_end],
            &[1.0, 0.0],
        )
    }
}

/// derive_visibility calculates depth, opacity and visibility flags of a single slot for the
/// current rotation.
pub fn derive_visibility(
    slot_angle: f64,
    rotation: f64,
    angle_per_slot: f64,
    slot_count: usize,
    is_active: bool,
    pars: &CarouselPars,
) -> SlotVisibility {
    let effective_angle = normalize_angle(slot_angle + rotation);
    let steps = steps_from_front(slot_angle, rotation, angle_per_slot);
    let factor = fade_factor(steps, slot_count, pars);

    let base_opacity = if is_active { 1.0 } else { pars.base_opacity };
    let depth = if is_active {
        pars.radius + pars.active_depth_boost
    } else {
        pars.radius
    };

    SlotVisibility {
        effective_angle,
        steps_from_front: steps,
        depth,
        opacity: (base_opacity * factor).clamp(0.0, 1.0),
        is_active,
        is_hidden: factor <= 0.0,
    }
}
