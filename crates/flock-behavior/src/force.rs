//! Steering forces: separation, alignment, cohesion, wall containment, and
//! obstacle repulsion.
//!
//! Each rule is evaluated against the same pre-tick [`FlockContext`] and the
//! results are summed into one acceleration.  A rule whose inputs are
//! degenerate for this tick (no neighbors, zero-length direction) contributes
//! zero instead of NaN.

use flock_core::math::{clamp_length, normalize_or_skip};
use flock_core::{AgentId, Params, RuleSet, Vec3};

use crate::{FlockContext, NeighborQuery, ObstacleSet};

/// Lower bound on `d / wall_distance` in the containment force.  Keeps the
/// push finite at or beyond a face, where it is `wall_weight / WALL_RATIO_FLOOR`.
pub const WALL_RATIO_FLOOR: f32 = 1e-3;

/// Obstacles closer than this have no usable direction and are skipped.
pub const REPEL_MIN_DISTANCE: f32 = 1e-4;

/// Per-rule breakdown of one agent's steering force.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Contributions {
    pub separation: Vec3,
    pub alignment:  Vec3,
    pub cohesion:   Vec3,
    pub wall:       Vec3,
    pub repulsion:  Vec3,
    /// Size of the neighbor set the flocking rules averaged over.
    pub neighbors:  u32,
}

impl Contributions {
    /// Unclamped sum of every rule.
    #[inline]
    pub fn sum(&self) -> Vec3 {
        self.separation + self.alignment + self.cohesion + self.wall + self.repulsion
    }
}

/// The force handed to the integrator for one agent.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Steering {
    pub force:     Vec3,
    pub neighbors: u32,
}

/// Stateless force evaluator for one parameter bundle.
///
/// Built once per parameter change and shared by reference across every
/// agent (and thread) of a tick.
#[derive(Clone, Debug)]
pub struct ForceModel {
    params:    Params,
    rules:     RuleSet,
    query:     NeighborQuery,
    /// Squared separation, alignment, cohesion radii.
    radii_sq:  [f32; 3],
    half:      Vec3,
    sharpness: f32,
}

impl ForceModel {
    pub fn new(params: &Params) -> Self {
        Self {
            params:    params.clone(),
            rules:     params.rule_set(),
            query:     NeighborQuery::from_params(params),
            radii_sq:  {
                let r = params.rule_radii();
                [r.separation, r.alignment, r.cohesion].map(|r| r * r)
            },
            half:      params.wall_half_extents(),
            sharpness: params.effective_repel_sharpness(),
        }
    }

    #[inline]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[inline]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    #[inline]
    pub fn query(&self) -> &NeighborQuery {
        &self.query
    }

    /// Total steering force for `agent`, clamped when the bundle asks for it.
    #[inline]
    pub fn steer(&self, agent: AgentId, ctx: &FlockContext<'_>) -> Steering {
        let c = self.contributions(agent, ctx);
        let sum = c.sum();
        let force = match self.rules.steer_clamp {
            Some(max) => clamp_length(sum, max),
            None => sum,
        };
        Steering { force, neighbors: c.neighbors }
    }

    /// Evaluate every rule separately.
    pub fn contributions(&self, agent: AgentId, ctx: &FlockContext<'_>) -> Contributions {
        let position = ctx.flock.position(agent);
        let velocity = ctx.flock.velocity(agent);

        let mut out = Contributions::default();

        if self.rules.needs_neighbors() {
            self.flocking(agent, position, velocity, ctx, &mut out);
        }
        if self.rules.walls {
            out.wall = self.wall_force(position);
        }
        if self.rules.repulsion {
            out.repulsion = self.repulsion_force(position, ctx.obstacles);
        }
        out
    }

    /// Separation, alignment, and cohesion from a single neighbor scan.
    ///
    /// Each rule averages over the neighbors inside its own radius.
    fn flocking(
        &self,
        agent:    AgentId,
        position: Vec3,
        velocity: Vec3,
        ctx:      &FlockContext<'_>,
        out:      &mut Contributions,
    ) {
        let flock = &ctx.flock;
        let [sep_sq, align_sq, cohere_sq] = self.radii_sq;
        let mut away_sum = Vec3::ZERO;
        let mut vel_sum = Vec3::ZERO;
        let mut pos_sum = Vec3::ZERO;
        let mut counts = [0u32; 3];
        let mut scanned = 0u32;

        self.query.for_each_neighbor(agent, flock, |n| {
            let n_pos = flock.position(n);
            let dist_sq = (n_pos - position).length_squared();
            if dist_sq < sep_sq {
                if let Some(away) = normalize_or_skip(position - n_pos) {
                    away_sum += away;
                }
                counts[0] += 1;
            }
            if dist_sq < align_sq {
                vel_sum += flock.velocity(n);
                counts[1] += 1;
            }
            if dist_sq < cohere_sq {
                pos_sum += n_pos;
                counts[2] += 1;
            }
            scanned += 1;
        });

        out.neighbors = scanned;
        let p = &self.params;

        if self.rules.separation && counts[0] > 0 {
            out.separation = away_sum / counts[0] as f32 * p.separation_weight;
        }
        if self.rules.alignment && counts[1] > 0 {
            out.alignment = (vel_sum / counts[1] as f32 - velocity) * p.alignment_weight;
        }
        if self.rules.cohesion && counts[2] > 0 {
            out.cohesion = (pos_sum / counts[2] as f32 - position) * p.cohesion_weight;
        }
    }

    /// Inward push from each of the six box faces within `wall_distance`.
    ///
    /// Faces are independent, so an agent in a corner is pushed by every
    /// face it is close to.
    pub fn wall_force(&self, position: Vec3) -> Vec3 {
        if !self.rules.walls {
            return Vec3::ZERO;
        }
        let local = position - self.params.wall_center;

        let mut force = Vec3::ZERO;
        for (axis, normal) in [Vec3::X, Vec3::Y, Vec3::Z].into_iter().enumerate() {
            let coord = local[axis];
            let half = self.half[axis];
            // Signed distance inward from the negative face, then the positive one.
            force += self.face_push(coord + half, normal);
            force += self.face_push(half - coord, -normal);
        }
        force
    }

    #[inline]
    fn face_push(&self, inward_distance: f32, inward_normal: Vec3) -> Vec3 {
        let p = &self.params;
        if inward_distance >= p.wall_distance {
            return Vec3::ZERO;
        }
        let ratio = (inward_distance / p.wall_distance).max(WALL_RATIO_FLOOR);
        inward_normal * (p.wall_weight / ratio)
    }

    /// Push away from every obstacle within `repel_radius`, weighted by
    /// `(1 − d / repel_radius) ^ repel_sharpness`.
    pub fn repulsion_force(&self, position: Vec3, obstacles: &ObstacleSet) -> Vec3 {
        if !self.rules.repulsion || obstacles.is_empty() {
            return Vec3::ZERO;
        }
        let radius = self.params.repel_radius;

        let mut sum = Vec3::ZERO;
        for obstacle in obstacles {
            let away = position - obstacle.nearest_point(position);
            let dist = away.length();
            if dist <= REPEL_MIN_DISTANCE || dist >= radius {
                continue;
            }
            let t = 1.0 - (dist / radius).clamp(0.0, 1.0);
            sum += (away / dist) * t.powf(self.sharpness);
        }
        sum * self.params.repel_weight
    }
}
