//! Semi-implicit Euler integration with speed clamping.
//!
//! ```text
//! v ← v + force·dt
//! v ← clamp(|v|, min_speed, max_speed) · v̂      (skipped when |v| ≈ 0)
//! p ← p + v·dt
//! orientation ← look_rotation(v̂, +Y)
//! ```

use flock_core::math::{look_rotation, normalize_or_skip};
use flock_core::{Params, Quat, Vec3};

/// Per-agent state for the optional max-speed ramp.
///
/// When `max_speed` changes mid-run the clamp moves toward it by at most
/// `speed_ramp_rate · dt` per tick instead of snapping.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SpeedRamp {
    /// How far the effective max speed moved during the last tick.
    pub additional_speed: f32,
    /// Effective max speed used by the last tick.
    pub prev_max_speed:   f32,
}

impl SpeedRamp {
    /// Ramp state already settled on `max_speed`.
    #[inline]
    pub fn settled(max_speed: f32) -> Self {
        Self { additional_speed: 0.0, prev_max_speed: max_speed }
    }
}

/// Turns accumulated force into motion for one parameter bundle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Integrator {
    min_speed: f32,
    max_speed: f32,
    ramp_rate: Option<f32>,
}

impl Integrator {
    pub fn new(params: &Params) -> Self {
        let (min_speed, max_speed) = params.speed_limits();
        Self {
            min_speed,
            max_speed,
            ramp_rate: params.rule_set().speed_ramp,
        }
    }

    #[inline]
    pub fn min_speed(&self) -> f32 {
        self.min_speed
    }

    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// `true` if integration goes through [`SpeedRamp`] state.
    #[inline]
    pub fn is_ramped(&self) -> bool {
        self.ramp_rate.is_some()
    }

    /// Advance one agent by `dt` using the configured max speed.
    ///
    /// Returns the new orientation.  The caller zeroes its force slot.
    #[inline]
    pub fn integrate(&self, position: &mut Vec3, velocity: &mut Vec3, force: Vec3, dt: f32) -> Quat {
        self.step(position, velocity, force, dt, self.max_speed)
    }

    /// Like [`integrate`](Self::integrate), but the max-speed clamp follows
    /// `ramp` toward the configured value.  Without a ramp rate this is
    /// identical to `integrate` and the ramp is kept settled.
    pub fn integrate_ramped(
        &self,
        position: &mut Vec3,
        velocity: &mut Vec3,
        force:    Vec3,
        dt:       f32,
        ramp:     &mut SpeedRamp,
    ) -> Quat {
        let max = self.advance_ramp(ramp, dt);
        self.step(position, velocity, force, dt, max)
    }

    /// Move `ramp` one tick toward the configured max speed and return the
    /// max speed to clamp with this tick.
    pub fn advance_ramp(&self, ramp: &mut SpeedRamp, dt: f32) -> f32 {
        let Some(rate) = self.ramp_rate else {
            *ramp = SpeedRamp::settled(self.max_speed);
            return self.max_speed;
        };
        let prev = ramp.prev_max_speed;
        let limit = rate * dt.max(0.0);
        let effective = (prev + (self.max_speed - prev).clamp(-limit, limit)).max(self.min_speed);
        ramp.additional_speed = effective - prev;
        ramp.prev_max_speed = effective;
        effective
    }

    #[inline]
    fn step(&self, position: &mut Vec3, velocity: &mut Vec3, force: Vec3, dt: f32, max_speed: f32) -> Quat {
        *velocity += force * dt;
        if let Some(dir) = normalize_or_skip(*velocity) {
            let speed = velocity.length();
            *velocity = dir * speed.clamp(self.min_speed, max_speed.max(self.min_speed));
        }
        *position += *velocity * dt;
        look_rotation(*velocity, Vec3::Y)
    }
}
