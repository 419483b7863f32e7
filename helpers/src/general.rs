use std::error::Error;
use std::fmt;

/// InputValueError is used if some carousel parameter or option does not fulfill the posed
/// requirements, e.g., a fade band that swallows the whole circle.
#[derive(Debug, Clone, PartialEq)]
pub struct InputValueError {
    pub par: &'static str,
    pub reason: String,
}

impl InputValueError {
    pub fn new(par: &'static str, reason: impl Into<String>) -> InputValueError {
        InputValueError {
            par,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for InputValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid input value for {}: {}", self.par, self.reason)
    }
}

impl Error for InputValueError {}

/// lin_interp returns the linearly interpolated value at x for given discrete data points xp, fp.
/// xp must be increasing and of the same length as fp. Values outside of xp are clamped to the
/// first or last entry of fp. Inspired by numpy.interp.
pub fn lin_interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    debug_assert_eq!(xp.len(), fp.len(), "Number of items in xp and fp must be equal!");

    let (first_x, first_f) = match (xp.first(), fp.first()) {
        (Some(&x0), Some(&f0)) => (x0, f0),
        _ => return 0.0,
    };

    if x <= first_x {
        return first_f;
    }

    for i in 1..xp.len().min(fp.len()) {
        if x <= xp[i] {
            let dx = xp[i] - xp[i - 1];
            if dx <= 0.0 {
                return fp[i];
            }
            return fp[i - 1] + (x - xp[i - 1]) * (fp[i] - fp[i - 1]) / dx;
        }
    }

    fp[xp.len().min(fp.len()) - 1]
}
