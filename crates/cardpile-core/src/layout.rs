//! Closed-form placement of nodes along a symmetric parabola.

use cardpile_platform::NodeTransform;
use glam::Vec2;

use crate::config::{PileConfig, PileControls};

/// Parabola height per unit of curvature per x².
const CURVE_HEIGHT_SCALE: f32 = 0.001;
/// Degrees of roll per unit of curvature per unit of x.
const CURVE_ROLL_SCALE: f32 = 0.1;
/// Scale applied to `rotation_offset` per unit of x.
const ROTATION_OFFSET_SCALE: f32 = 0.01;

/// Sign of the curvature with an explicit zero, so a flat pile has no
/// rotation-offset roll. `f32::signum` would return 1.0 for +0.0.
///
/// The step at zero is kept as is: a tiny positive curvature and a tiny
/// negative one give opposite rotation-offset contributions.
pub fn curve_sign(curvature: f32) -> f32 {
    if curvature > 0.0 {
        1.0
    } else if curvature < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Total span of `count` nodes: `spacing * count`, raised to at least one
/// spacing unit, then capped at `max_width`. The cap wins if the two conflict.
pub fn line_width(spacing: f32, count: usize, max_width: f32) -> f32 {
    let width = spacing * count as f32;
    if width < spacing {
        spacing
    } else if width > max_width {
        max_width
    } else {
        width
    }
}

/// Per-pass layout state, derived once from config and controls for a given
/// node count and then applied to each index.
#[derive(Debug, Clone, Copy)]
pub struct PileLayout {
    count: usize,
    curvature: f32,
    line_width: f32,
    node_distance: f32,
    rotation_offset: f32,
    origin_offset: Vec2,
}

impl PileLayout {
    pub fn new(config: &PileConfig, controls: &PileControls, count: usize) -> Self {
        let curvature = config.max_curvature * controls.curvature_amount();
        let spacing = config.max_node_spacing * controls.node_spacing_amount();
        let line_width = line_width(spacing, count, config.max_width);
        let node_distance = if count >= 2 {
            line_width / (count - 1) as f32
        } else {
            0.0
        };
        Self {
            count,
            curvature,
            line_width,
            node_distance,
            rotation_offset: config.rotation_offset,
            origin_offset: config.origin_offset,
        }
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    pub fn node_distance(&self) -> f32 {
        self.node_distance
    }

    /// Transform of node `index` relative to `origin`, with its own `offset`
    /// layered on top.
    pub fn place(&self, index: usize, origin: Vec2, offset: Vec2) -> NodeTransform {
        if self.count == 1 {
            return NodeTransform::new(origin + self.origin_offset + offset, self.rotation_offset);
        }

        let x = -self.line_width / 2.0 + index as f32 * self.node_distance;
        let y = self.curvature * CURVE_HEIGHT_SCALE * x * x;
        let position = origin + Vec2::new(x, y) + self.origin_offset + offset;
        let rotation = x * CURVE_ROLL_SCALE * self.curvature
            + (x * self.rotation_offset * ROTATION_OFFSET_SCALE) * curve_sign(self.curvature);
        NodeTransform::new(position, rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_curve_sign_zero() {
        assert_eq!(curve_sign(0.0), 0.0);
        assert_eq!(curve_sign(-0.0), 0.0);
        assert_eq!(curve_sign(1e-9), 1.0);
        assert_eq!(curve_sign(-1e-9), -1.0);
    }

    #[test]
    fn test_line_width_bounds() {
        assert_eq!(line_width(100.0, 3, 800.0), 300.0);
        assert_eq!(line_width(100.0, 20, 800.0), 800.0);
        assert_eq!(line_width(100.0, 1, 800.0), 100.0);
        assert_eq!(line_width(100.0, 0, 800.0), 100.0);
        // cap beats the one-spacing floor
        assert_eq!(line_width(500.0, 1, 300.0), 300.0);
    }

    #[test]
    fn test_three_nodes_flat() {
        let config = PileConfig::default();
        let controls = PileControls::new(0.3, 1.0, 0.0);
        let layout = PileLayout::new(&config, &controls, 3);
        assert_eq!(layout.line_width(), 300.0);
        assert_eq!(layout.node_distance(), 150.0);

        let xs: Vec<f32> = (0..3)
            .map(|i| layout.place(i, Vec2::ZERO, Vec2::ZERO).position.x)
            .collect();
        assert_eq!(xs, vec![-150.0, 0.0, 150.0]);
    }

    #[test]
    fn test_curved_node_values() {
        let config = PileConfig {
            rotation_offset: 10.0,
            ..PileConfig::default()
        };
        let controls = PileControls::new(0.3, 1.0, 0.5);
        let layout = PileLayout::new(&config, &controls, 3);

        let right = layout.place(2, Vec2::ZERO, Vec2::ZERO);
        assert!(approx(right.position.x, 150.0));
        assert!(approx(right.position.y, 11.25), "got {}", right.position.y);
        // 150 * 0.1 * 0.5 + 150 * 10 * 0.01
        assert!(approx(right.rotation, 22.5), "got {}", right.rotation);

        let left = layout.place(0, Vec2::ZERO, Vec2::ZERO);
        assert!(approx(left.rotation, -22.5), "got {}", left.rotation);
        assert!(approx(left.position.y, 11.25));
    }

    #[test]
    fn test_single_node_ignores_curve() {
        let config = PileConfig {
            rotation_offset: 30.0,
            origin_offset: Vec2::new(1.0, 2.0),
            ..PileConfig::default()
        };
        let controls = PileControls::new(0.1, 1.0, 1.0);
        let layout = PileLayout::new(&config, &controls, 1);
        let t = layout.place(0, Vec2::new(5.0, 5.0), Vec2::new(3.0, 4.0));
        assert_eq!(t.position, Vec2::new(9.0, 11.0));
        assert_eq!(t.rotation, 30.0);
    }

    #[test]
    fn test_negative_curvature_opens_downward() {
        let config = PileConfig::default();
        let controls = PileControls::new(0.5, 1.0, -1.0);
        let layout = PileLayout::new(&config, &controls, 5);
        let edge = layout.place(0, Vec2::ZERO, Vec2::ZERO);
        let middle = layout.place(2, Vec2::ZERO, Vec2::ZERO);
        assert!(edge.position.y < 0.0);
        assert_eq!(middle.position.y, 0.0);
    }

    proptest! {
        #[test]
        fn test_line_width_stays_in_bounds(
            spacing in 0.0f32..200.0,
            count in 1usize..50,
            max_width in 0.0f32..2000.0,
        ) {
            let width = line_width(spacing, count, max_width);
            prop_assert!(width <= max_width, "{width} > {max_width}");
            if spacing <= max_width {
                prop_assert!(width >= spacing, "{width} < {spacing}");
            }
        }
    }
}
