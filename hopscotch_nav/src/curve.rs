// Bezier curve sampling by repeated linear interpolation (de Casteljau).
//
// Used for jump profiles: `nav.rs` samples a three-point curve between two
// tile centres to test clearance, and `debug_edges()` returns the same
// samples for drawing. The driver may also sample its own curves for
// rendering a planned arc.
//
// See also: `nav.rs` (`jump_profile()`), `jump.rs` which produces the
// physically simulated trajectory the profile approximates.
//
// **Critical constraint: determinism.** Each sample's parameter is computed
// as `i / segments`, never accumulated, so the same inputs always yield
// bit-identical points and both endpoints are hit exactly.

use crate::types::WorldPos;

/// Evaluate the curve defined by `control` at `t` in `[0, 1]`.
///
/// Returns `None` for an empty control polygon. A single control point is
/// returned as-is regardless of `t`.
pub fn point_at(control: &[WorldPos], t: f32) -> Option<WorldPos> {
    match control {
        [] => None,
        [only] => Some(*only),
        [a, b] => Some(a.lerp(*b, t)),
        _ => {
            let mut scratch: Vec<WorldPos> = control.to_vec();
            let mut len = scratch.len();
            while len > 1 {
                for i in 0..len - 1 {
                    scratch[i] = scratch[i].lerp(scratch[i + 1], t);
                }
                len -= 1;
            }
            Some(scratch[0])
        }
    }
}

/// Sample `segments + 1` evenly parameterised points along the curve,
/// starting at the first control point and ending at the last.
///
/// `segments == 0` is treated as 1. An empty control polygon yields no
/// points and a single control point yields just that point.
pub fn sample(control: &[WorldPos], segments: usize) -> Vec<WorldPos> {
    match control {
        [] => Vec::new(),
        [only] => vec![*only],
        _ => {
            let segments = segments.max(1);
            (0..=segments)
                .filter_map(|i| point_at(control, i as f32 / segments as f32))
                .collect()
        }
    }
}
