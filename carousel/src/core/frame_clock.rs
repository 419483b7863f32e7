use helpers::general::InputValueError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Smallest frame step as fraction of the nominal interval, keeps timestamps strictly increasing
/// even for large jitter.
const MIN_FRAME_STEP_FRAC: f64 = 0.1;

/// FrameClock produces the timestamps of simulated animation frames: a fixed interval, optionally
/// disturbed by Gaussian jitter.
#[derive(Debug)]
pub struct FrameClock {
    interval_ms: f64,
    jitter: Option<Normal<f64>>,
    rng: StdRng,
    now_ms: f64,
}

impl FrameClock {
    pub fn new(
        start_ms: f64,
        interval_ms: f64,
        jitter_ms: f64,
        seed: Option<u64>,
    ) -> anyhow::Result<FrameClock> {
        if !(interval_ms.is_finite() && interval_ms > 0.0) {
            return Err(InputValueError::new(
                "frame_interval_ms",
                format!("must be positive, but is {}", interval_ms),
            )
            .into());
        }

        let jitter = if jitter_ms > 0.0 {
            Some(Normal::new(0.0, jitter_ms)?)
        } else {
            None
        };

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(FrameClock {
            interval_ms,
            jitter,
            rng,
            now_ms: start_ms,
        })
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// next_timestamp advances the clock by one frame and returns the new timestamp.
    pub fn next_timestamp(&mut self) -> f64 {
        let noise = match &self.jitter {
            Some(jitter) => jitter.sample(&mut self.rng),
            None => 0.0,
        };
        self.now_ms += (self.interval_ms + noise).max(self.interval_ms * MIN_FRAME_STEP_FRAC);
        self.now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn steady_clock_without_jitter() {
        let mut clock = FrameClock::new(100.0, 16.0, 0.0, None).unwrap();
        assert_abs_diff_eq!(clock.next_timestamp(), 116.0);
        assert_abs_diff_eq!(clock.next_timestamp(), 132.0);
        assert_abs_diff_eq!(clock.now_ms(), 132.0);
    }

    #[test]
    fn jittered_clock_is_strictly_increasing() {
        let mut clock = FrameClock::new(0.0, 16.0, 40.0, Some(7)).unwrap();
        let mut prev = clock.now_ms();

        for _ in 0..1000 {
            let now = clock.next_timestamp();
            assert!(now >= prev + 1.6 - 1e-9);
            prev = now;
        }
    }

    #[test]
    fn invalid_interval_is_rejected() {
        assert!(FrameClock::new(0.0, 0.0, 0.0, None).is_err());
        assert!(FrameClock::new(0.0, f64::NAN, 0.0, None).is_err());
    }
}
