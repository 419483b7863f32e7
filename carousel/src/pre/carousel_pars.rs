use helpers::general::InputValueError;
use serde::{Deserialize, Serialize};

/// * `max_slots` - Virtualization cap, i.e. the maximum number of materialized card slots
/// * `visibility_threshold` - Slots are only faded/hidden if the slot count exceeds this value
/// * `max_visible_step` - (slots) Distance from the front up to which a slot is fully visible
/// * `fade_width` - (slots) Width of the band behind `max_visible_step` in which a slot fades out
/// * `base_opacity` - Opacity of every visible slot that is not the active winner slot
/// * `radius` - (px) Depth of a regular slot
/// * `active_depth_boost` - (px) Additional depth of the active winner slot
/// * `total_rotations` - Number of full turns during one spin
/// * `spin_duration_ms` - (ms) Nominal duration of one spin
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CarouselPars {
    pub max_slots: usize,
    pub visibility_threshold: usize,
    pub max_visible_step: f64,
    pub fade_width: f64,
    pub base_opacity: f64,
    pub radius: f64,
    pub active_depth_boost: f64,
    pub total_rotations: f64,
    pub spin_duration_ms: f64,
}

impl Default for CarouselPars {
    fn default() -> Self {
        CarouselPars {
            max_slots: 8,
            visibility_threshold: 7,
            max_visible_step: 2.0,
            fade_width: 1.0,
            base_opacity: 0.6,
            radius: 320.0,
            active_depth_boost: 30.0,
            total_rotations: 8.0,
            spin_duration_ms: 10_000.0,
        }
    }
}

impl CarouselPars {
    /// validate checks the parameters against the requirements of the engine. Slots are recycled
    /// at the back point of the circle (half a turn away from the front), which therefore has to
    /// be hidden whenever the slots are virtualized: fading must be active at `max_slots` and the
    /// fade band must end before the back point.
    pub fn validate(&self) -> Result<(), InputValueError> {
        if self.max_slots == 0 {
            return Err(InputValueError::new("max_slots", "must be at least 1"));
        }

        check_non_negative("max_visible_step", self.max_visible_step)?;
        check_non_negative("fade_width", self.fade_width)?;
        check_non_negative("radius", self.radius)?;
        check_non_negative("active_depth_boost", self.active_depth_boost)?;
        check_non_negative("total_rotations", self.total_rotations)?;
        check_non_negative("spin_duration_ms", self.spin_duration_ms)?;

        if !(0.0..=1.0).contains(&self.base_opacity) {
            return Err(InputValueError::new(
                "base_opacity",
                format!("must be in [0.0, 1.0], but is {:.3}", self.base_opacity),
            ));
        }

        // rosters larger than max_slots are virtualized, so fading must be active at that size
        if self.max_slots <= self.visibility_threshold {
            return Err(InputValueError::new(
                "visibility_threshold",
                format!(
                    "must be below max_slots ({}), but is {}",
                    self.max_slots, self.visibility_threshold
                ),
            ));
        }

        let half_circle_steps = self.max_slots as f64 / 2.0;
        if self.fade_end() >= half_circle_steps {
            return Err(InputValueError::new(
                "fade_width",
                format!(
                    "max_visible_step + fade_width must stay below {:.1} slots for {} slots, but is {:.3}",
                    half_circle_steps,
                    self.max_slots,
                    self.fade_end()
                ),
            ));
        }

        Ok(())
    }

    /// fade_end returns the distance from the front (in slots) behind which a slot is hidden.
    pub fn fade_end(&self) -> f64 {
        self.max_visible_step + self.fade_width
    }
}

fn check_non_negative(par: &'static str, value: f64) -> Result<(), InputValueError> {
    if !value.is_finite() || value < 0.0 {
        return Err(InputValueError::new(
            par,
            format!("must be finite and non-negative, but is {}", value),
        ));
    }
    Ok(())
}
