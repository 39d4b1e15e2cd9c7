//! Small vector helpers on top of `glam`.
//!
//! Every normalization in the force model goes through [`normalize_or_skip`]
//! so that degenerate geometry (coincident agents, zero velocity) drops the
//! affected contribution instead of producing NaN.

use glam::{Mat3, Quat, Vec3};

/// Squared-length threshold below which a vector is treated as zero.
pub const EPSILON_SQ: f32 = 1e-12;

/// Normalize `v`, or return `None` if its length is (nearly) zero.
#[inline]
pub fn normalize_or_skip(v: Vec3) -> Option<Vec3> {
    let len_sq = v.length_squared();
    if len_sq <= EPSILON_SQ || !len_sq.is_finite() {
        None
    } else {
        Some(v / len_sq.sqrt())
    }
}

/// Clamp the magnitude of `v` to at most `max`.  Zero vectors pass through.
#[inline]
pub fn clamp_length(v: Vec3, max: f32) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq > max * max && len_sq > EPSILON_SQ {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Orientation whose local `+Z` axis points along `forward`.
///
/// Roll is chosen so the local `+Y` axis stays as close to `up` as possible.
/// When `forward` is parallel to `up` the shortest-arc rotation from `+Z` is
/// used instead; a zero `forward` yields the identity.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(z) = normalize_or_skip(forward) else {
        return Quat::IDENTITY;
    };
    match normalize_or_skip(up.cross(z)) {
        Some(x) => {
            let y = z.cross(x);
            Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
        }
        None => Quat::from_rotation_arc(Vec3::Z, z),
    }
}
