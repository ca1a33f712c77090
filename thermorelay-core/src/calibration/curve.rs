//! Piecewise-linear interpolant over strictly increasing knots

use heapless::Vec;

use super::table::MAX_CALIBRATION_POINTS;
use super::CalibrationError;

#[derive(Debug, Clone)]
pub(crate) struct Curve {
    /// Strictly increasing
    xs: Vec<f32, MAX_CALIBRATION_POINTS>,
    ys: Vec<f32, MAX_CALIBRATION_POINTS>,
}

impl Curve {
    /// Build from knots sorted by strictly increasing `x`
    ///
    /// Callers guarantee ordering, distinctness, and at most
    /// `MAX_CALIBRATION_POINTS` knots.
    pub(crate) fn from_sorted(knots: impl Iterator<Item = (f32, f32)>) -> Self {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for (x, y) in knots {
            let _ = xs.push(x);
            let _ = ys.push(y);
        }
        Self { xs, ys }
    }

    pub(crate) fn min(&self) -> f32 {
        self.xs[0]
    }

    pub(crate) fn max(&self) -> f32 {
        self.xs[self.xs.len() - 1]
    }

    /// Reject values outside `[min, max]`; NaN is always rejected
    pub(crate) fn check(&self, x: f32) -> Result<(), CalibrationError> {
        let (min, max) = (self.min(), self.max());
        if x >= min && x <= max {
            Ok(())
        } else {
            Err(CalibrationError::OutOfDomain {
                value: x,
                min,
                max,
            })
        }
    }

    pub(crate) fn eval(&self, x: f32) -> Result<f32, CalibrationError> {
        self.check(x)?;

        // First knot strictly above x
        let upper = self.xs.partition_point(|&k| k <= x);
        if upper == self.xs.len() {
            // x == max
            return Ok(self.ys[upper - 1]);
        }

        let lower = upper - 1;
        let (x0, x1) = (self.xs[lower], self.xs[upper]);
        let (y0, y1) = (self.ys[lower], self.ys[upper]);

        Ok(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> Curve {
        Curve::from_sorted([(0.0, 10.0), (10.0, 20.0), (20.0, 0.0)].into_iter())
    }

    #[test]
    fn test_knots_are_exact() {
        let c = curve();
        assert_eq!(c.eval(0.0).unwrap(), 10.0);
        assert_eq!(c.eval(10.0).unwrap(), 20.0);
        assert_eq!(c.eval(20.0).unwrap(), 0.0);
    }

    #[test]
    fn test_linear_between_knots() {
        let c = curve();
        assert!((c.eval(5.0).unwrap() - 15.0).abs() < 1e-6);
        assert!((c.eval(15.0).unwrap() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_extrapolation() {
        let c = curve();
        assert_eq!(
            c.eval(-0.1),
            Err(CalibrationError::OutOfDomain {
                value: -0.1,
                min: 0.0,
                max: 20.0
            })
        );
        assert!(c.eval(20.5).is_err());
        assert!(c.eval(f32::NAN).is_err());
        assert!(c.eval(f32::INFINITY).is_err());
    }
}
