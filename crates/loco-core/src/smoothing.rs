//! Display and ramp filters.
//!
//! These hold presentation state only (smoothed heat yield, displayed
//! evaporation rate, power ramp). Conserved quantities never pass through them.

/// Critically damped second-order follower.
///
/// Tracks a moving target without overshoot. `smooth_time` is roughly the
/// time needed to reach the target.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriticallyDamped {
    pub value: f64,
    pub velocity: f64,
}

impl CriticallyDamped {
    /// Minimum smoothing time; shorter requests are treated as this.
    pub const MIN_SMOOTH_TIME: f64 = 1e-4;

    pub fn new(value: f64) -> Self {
        Self {
            value,
            velocity: 0.0,
        }
    }

    /// Advance toward `target` by `dt` seconds and return the new value.
    ///
    /// Uses the closed-form spring step with a cubic approximation of
    /// `exp(-omega * dt)`. A non-positive `dt` leaves the state untouched.
    pub fn update(&mut self, target: f64, smooth_time: f64, dt: f64) -> f64 {
        if dt <= 0.0 {
            return self.value;
        }

        let smooth_time = smooth_time.max(Self::MIN_SMOOTH_TIME);
        let omega = 2.0 / smooth_time;
        let x = omega * dt;
        let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

        let change = self.value - target;
        let temp = (self.velocity + omega * change) * dt;
        self.velocity = (self.velocity - omega * temp) * decay;
        let mut output = target + (change + temp) * decay;

        // Never step past the target
        if (target - self.value > 0.0) == (output > target) {
            output = target;
            self.velocity = 0.0;
        }

        self.value = output;
        output
    }

    /// Jump straight to `value` and stop moving.
    pub fn reset(&mut self, value: f64) {
        self.value = value;
        self.velocity = 0.0;
    }
}

/// First-order exponential smoother: `dv/dt = (target - v) / tau`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exponential {
    pub value: f64,
}

impl Exponential {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    /// Advance toward `target`. A non-positive `tau` snaps to the target.
    pub fn update(&mut self, target: f64, tau: f64, dt: f64) -> f64 {
        if dt <= 0.0 {
            return self.value;
        }
        if tau <= 0.0 {
            self.value = target;
            return target;
        }
        let alpha = 1.0 - (-dt / tau).exp();
        self.value += (target - self.value) * alpha;
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critically_damped_converges_without_overshoot() {
        let mut f = CriticallyDamped::new(0.0);
        let mut prev = 0.0;
        for _ in 0..2000 {
            let v = f.update(100.0, 2.0, 0.01);
            assert!(v <= 100.0 + 1e-9);
            assert!(v >= prev - 1e-9);
            prev = v;
        }
        assert!((f.value - 100.0).abs() < 0.1);
    }

    #[test]
    fn critically_damped_decays_toward_zero() {
        let mut f = CriticallyDamped::new(50.0);
        for _ in 0..1000 {
            f.update(0.0, 1.0, 0.02);
        }
        assert!(f.value.abs() < 0.01);
        assert!(f.value >= 0.0);
    }

    #[test]
    fn critically_damped_ignores_non_positive_dt() {
        let mut f = CriticallyDamped::new(3.0);
        assert_eq!(f.update(10.0, 1.0, 0.0), 3.0);
        assert_eq!(f.update(10.0, 1.0, -1.0), 3.0);
        assert_eq!(f.velocity, 0.0);
    }

    #[test]
    fn critically_damped_at_rest_stays_at_rest() {
        let mut f = CriticallyDamped::new(7.0);
        f.update(7.0, 1.0, 0.1);
        assert_eq!(f.value, 7.0);
        assert_eq!(f.velocity, 0.0);
    }

    #[test]
    fn exponential_time_constant() {
        let mut f = Exponential::new(0.0);
        // One time constant in many small steps reaches ~63%.
        for _ in 0..1000 {
            f.update(1.0, 1.0, 0.001);
        }
        assert!((f.value - (1.0 - (-1.0_f64).exp())).abs() < 1e-9);
    }

    #[test]
    fn exponential_zero_tau_snaps() {
        let mut f = Exponential::new(0.0);
        assert_eq!(f.update(4.0, 0.0, 0.1), 4.0);
    }
}
