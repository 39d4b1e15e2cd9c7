//! Tunable flocking parameters and their validation.
//!
//! `Params` is owned by the simulation run and shared read-only by every
//! agent evaluation of a tick.  Hosts may replace it between ticks; the
//! simulation applies the new bundle at the next tick boundary.
//!
//! # Invalid values
//!
//! Bad values never fail a tick.  [`Params::rule_set`] turns each
//! non-positive radius, weight, or clamp into a disabled rule, and
//! [`Params::issues`] reports what was disabled so the host can log it once.

use std::fmt;

use glam::Vec3;

/// Per-run configuration bundle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Params {
    /// Velocity magnitude given to every agent at spawn.
    pub init_speed: f32,
    /// Lower bound of the post-integration speed clamp.
    pub min_speed: f32,
    /// Upper bound of the post-integration speed clamp.
    pub max_speed: f32,

    /// Sensing radius for neighbor discovery.
    pub neighbor_distance: f32,
    /// Per-rule sensing radii.  `None` uses `neighbor_distance`.
    pub separation_distance: Option<f32>,
    pub alignment_distance:  Option<f32>,
    pub cohesion_distance:   Option<f32>,
    /// Half-angle of the forward sensing cone, in degrees.  Values of 180 or
    /// more make agents omnidirectional.
    pub neighbor_fov: f32,

    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,

    /// Center of the containment box.
    pub wall_center: Vec3,
    /// Full edge length of the containment box (half-extent is `wall_scale / 2`).
    pub wall_scale: f32,
    /// Full edge length per axis.  `None` makes the box a cube of `wall_scale`.
    pub wall_size: Option<Vec3>,
    /// Distance from a face at which containment starts pushing inward.
    pub wall_distance: f32,
    pub wall_weight: f32,

    /// Obstacles farther than this contribute nothing.
    pub repel_radius: f32,
    pub repel_weight: f32,
    /// Falloff exponent: `(1 - d / repel_radius) ^ repel_sharpness`.
    pub repel_sharpness: f32,

    /// Clamp on the summed steering force.  `None`, zero, negative or NaN
    /// leave it unclamped.
    pub max_steer_force: Option<f32>,

    /// Rate (speed units per second) at which the effective max-speed clamp
    /// follows a changed `max_speed`.  `None` applies changes instantly.
    pub speed_ramp_rate: Option<f32>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            init_speed:        2.0,
            min_speed:         2.0,
            max_speed:         5.0,
            neighbor_distance: 1.0,
            neighbor_fov:      90.0,
            separation_distance: None,
            alignment_distance:  None,
            cohesion_distance:   None,
            separation_weight: 5.0,
            alignment_weight:  2.0,
            cohesion_weight:   3.0,
            wall_center:       Vec3::ZERO,
            wall_scale:        5.0,
            wall_size:         None,
            wall_distance:     3.0,
            wall_weight:       1.0,
            repel_radius:      3.0,
            repel_weight:      3.0,
            repel_sharpness:   2.0,
            max_steer_force:   Some(8.0),
            speed_ramp_rate:   None,
        }
    }
}

impl Params {
    /// The unclamped variant: no steering clamp, fixed quadratic obstacle
    /// falloff, instant max-speed changes.
    ///
    /// Kept for reproducing older runs; new runs should use `default()`.
    pub fn legacy_sequential() -> Self {
        Self {
            max_steer_force: None,
            repel_sharpness: 2.0,
            speed_ramp_rate: None,
            ..Self::default()
        }
    }

    /// Full edge lengths of the containment box.
    #[inline]
    pub fn wall_extents(&self) -> Vec3 {
        self.wall_size.unwrap_or(Vec3::splat(self.wall_scale))
    }

    /// Half-extents of the containment box.
    #[inline]
    pub fn wall_half_extents(&self) -> Vec3 {
        self.wall_extents() * 0.5
    }

    /// Sensing radius of each flocking rule.
    pub fn rule_radii(&self) -> RuleRadii {
        let fallback = self.neighbor_distance;
        RuleRadii {
            separation: self.separation_distance.unwrap_or(fallback),
            alignment:  self.alignment_distance.unwrap_or(fallback),
            cohesion:   self.cohesion_distance.unwrap_or(fallback),
        }
    }

    /// Effective `(min, max)` speed clamp.
    ///
    /// Negative minimums are raised to zero and an inverted range is repaired
    /// by raising `max` to `min`.
    pub fn speed_limits(&self) -> (f32, f32) {
        let min = finite_or(self.min_speed, 0.0).max(0.0);
        let max = finite_or(self.max_speed, min).max(min);
        (min, max)
    }

    /// Which rules are active for this bundle.
    pub fn rule_set(&self) -> RuleSet {
        let radii = self.rule_radii();
        let extents = self.wall_extents();
        RuleSet {
            separation: positive(radii.separation) && positive(self.separation_weight),
            alignment:  positive(radii.alignment) && positive(self.alignment_weight),
            cohesion:   positive(radii.cohesion) && positive(self.cohesion_weight),
            walls:      positive(extents.min_element())
                && positive(self.wall_distance)
                && positive(self.wall_weight),
            repulsion:  positive(self.repel_radius) && positive(self.repel_weight),
            steer_clamp: self.max_steer_force.filter(|&m| positive(m)),
            speed_ramp:  self.speed_ramp_rate.filter(|&r| positive(r)),
        }
    }

    /// Every value that was repaired or that disables a rule.
    pub fn issues(&self) -> Vec<ParamIssue> {
        let mut out = Vec::new();

        let uses_fallback = self.separation_distance.is_none()
            || self.alignment_distance.is_none()
            || self.cohesion_distance.is_none();
        if uses_fallback && !positive(self.neighbor_distance) {
            out.push(ParamIssue::RuleDisabled {
                field:    "neighbor_distance",
                value:    self.neighbor_distance,
                disables: "flocking rules without their own radius",
            });
        }
        let radii = [
            ("separation_distance", self.separation_distance, "separation"),
            ("alignment_distance",  self.alignment_distance,  "alignment"),
            ("cohesion_distance",   self.cohesion_distance,   "cohesion"),
        ];
        for (field, value, disables) in radii {
            if let Some(value) = value.filter(|&r| !positive(r)) {
                out.push(ParamIssue::RuleDisabled { field, value, disables });
            }
        }
        match self.wall_size {
            Some(size) if !positive(size.min_element()) => {
                out.push(ParamIssue::RuleDisabled {
                    field:    "wall_size",
                    value:    size.min_element(),
                    disables: "wall containment",
                });
            }
            Some(_) => {}
            None if !positive(self.wall_scale) => {
                out.push(ParamIssue::RuleDisabled {
                    field:    "wall_scale",
                    value:    self.wall_scale,
                    disables: "wall containment",
                });
            }
            None => {}
        }

        let checks: [(&'static str, f32, &'static str); 7] = [
            ("separation_weight", self.separation_weight, "separation"),
            ("alignment_weight",  self.alignment_weight,  "alignment"),
            ("cohesion_weight",   self.cohesion_weight,   "cohesion"),
            ("wall_distance",     self.wall_distance,     "wall containment"),
            ("wall_weight",       self.wall_weight,       "wall containment"),
            ("repel_radius",      self.repel_radius,      "obstacle repulsion"),
            ("repel_weight",      self.repel_weight,      "obstacle repulsion"),
        ];
        for (field, value, disables) in checks {
            if !positive(value) {
                out.push(ParamIssue::RuleDisabled { field, value, disables });
            }
        }

        if let Some(m) = self.max_steer_force.filter(|&m| !positive(m)) {
            out.push(ParamIssue::RuleDisabled {
                field:    "max_steer_force",
                value:    m,
                disables: "steering clamp",
            });
        }
        if let Some(r) = self.speed_ramp_rate.filter(|&r| !positive(r)) {
            out.push(ParamIssue::RuleDisabled {
                field:    "speed_ramp_rate",
                value:    r,
                disables: "max-speed ramp",
            });
        }

        if self.max_speed < self.min_speed {
            out.push(ParamIssue::SpeedRangeInverted {
                min: self.min_speed,
                max: self.max_speed,
            });
        }
        if !(self.repel_sharpness.is_finite() && self.repel_sharpness > 0.0) {
            out.push(ParamIssue::Repaired {
                field: "repel_sharpness",
                value: self.repel_sharpness,
                used:  2.0,
            });
        }
        out
    }

    /// Repulsion exponent actually used (falls back to quadratic).
    #[inline]
    pub fn effective_repel_sharpness(&self) -> f32 {
        if self.repel_sharpness.is_finite() && self.repel_sharpness > 0.0 {
            self.repel_sharpness
        } else {
            2.0
        }
    }
}

/// Sensing radius of each flocking rule.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RuleRadii {
    pub separation: f32,
    pub alignment:  f32,
    pub cohesion:   f32,
}

impl RuleRadii {
    /// Radius of the shared neighbor scan: the widest finite radius, or 0.
    pub fn scan(&self) -> f32 {
        [self.separation, self.alignment, self.cohesion]
            .into_iter()
            .filter(|r| r.is_finite())
            .fold(0.0, f32::max)
    }
}

/// Flags describing which force rules are active.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RuleSet {
    pub separation:  bool,
    pub alignment:   bool,
    pub cohesion:    bool,
    pub walls:       bool,
    pub repulsion:   bool,
    /// Magnitude clamp applied to the summed steering force, if any.
    pub steer_clamp: Option<f32>,
    /// Max-speed ramp rate, if smoothing is enabled.
    pub speed_ramp:  Option<f32>,
}

impl RuleSet {
    /// `true` if any rule needs a neighbor scan.
    #[inline]
    pub fn needs_neighbors(&self) -> bool {
        self.separation || self.alignment || self.cohesion
    }
}

/// A parameter value that was repaired or that switched a rule off.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamIssue {
    RuleDisabled {
        field:    &'static str,
        value:    f32,
        disables: &'static str,
    },
    SpeedRangeInverted {
        min: f32,
        max: f32,
    },
    Repaired {
        field: &'static str,
        value: f32,
        used:  f32,
    },
}

impl fmt::Display for ParamIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamIssue::RuleDisabled { field, value, disables } => {
                write!(f, "{field} = {value} is not positive; {disables} disabled")
            }
            ParamIssue::SpeedRangeInverted { min, max } => {
                write!(f, "max_speed {max} < min_speed {min}; max raised to {min}")
            }
            ParamIssue::Repaired { field, value, used } => {
                write!(f, "{field} = {value} is invalid; using {used}")
            }
        }
    }
}

#[inline]
fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

#[inline]
fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}
