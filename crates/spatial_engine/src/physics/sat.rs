//! Oriented-box separating axis test
//!
//! Implements the 15-axis OBB/OBB test: three face normals of each box plus
//! the nine pairwise edge cross products. The relative rotation is expressed
//! in box A's frame so every projection reduces to dot products and sums.
//!
//! Two variants are provided. [`SatVariant::Corrected`] is the textbook test.
//! [`SatVariant::Legacy`] keeps two arithmetic slips so recorded scenes
//! with rigid (unscaled) placements replay with the same outcomes. Scaled
//! placements differ under either variant, since scale is folded into the
//! box half-extents and the sphere radius. The slips:
//!
//! - the second term of box B's projected radius on A's face axes is added
//!   instead of multiplied (`e1 + |R[i][1]|` rather than `e1 * |R[i][1]|`),
//! - the face-axis-of-B test compares the *signed* projected separation, so
//!   boxes separated on the negative side of a B axis are missed.
//!
//! Both slips only ever widen the overlap region, so the legacy variant can
//! report a collision the corrected test rejects, never the reverse.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{transform_point, Mat3, Mat4, Vec3};

/// Which arithmetic the separating axis test uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SatVariant {
    /// Standard projected-radius formulas on every axis
    #[default]
    Corrected,
    /// Bug-compatible formulas (see module docs)
    Legacy,
}

/// The axis that proved two boxes disjoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeparatingAxis {
    /// Face normal `i` of box A
    FaceA(usize),
    /// Face normal `j` of box B
    FaceB(usize),
    /// Cross product `A_i x B_j`
    Cross(usize, usize),
}

/// A box in world space described by center, orthonormal axes and
/// half-extents along those axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// World-space center
    pub center: Vec3,
    /// Unit axes (columns of the rotation)
    pub axes: [Vec3; 3],
    /// Half-extent along each axis
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// Create a box from its parts
    pub fn new(center: Vec3, axes: [Vec3; 3], half_extents: Vec3) -> Self {
        Self { center, axes, half_extents }
    }

    /// Place a local box (center + half-widths in object space) with a model
    /// matrix.
    ///
    /// The upper-left 3x3 columns are normalised and their lengths fold any
    /// scale into the half-extents.
    pub fn from_model_matrix(model: &Mat4, local_center: &Vec3, local_half_width: &Vec3) -> Self {
        let center = transform_point(model, local_center);
        let mut axes = [Vec3::x(), Vec3::y(), Vec3::z()];
        let mut scale = Vec3::zeros();

        for (i, axis) in axes.iter_mut().enumerate() {
            let column: Vec3 = model.fixed_view::<3, 1>(0, i).into_owned();
            let length = column.norm();
            scale[i] = length;
            if length > f32::EPSILON {
                *axis = column / length;
            }
        }

        Self {
            center,
            axes,
            half_extents: local_half_width.component_mul(&scale),
        }
    }
}

/// Run the corrected separating axis test.
///
/// Returns `None` when no axis separates the boxes (they overlap).
pub fn separating_axis(a: &OrientedBox, b: &OrientedBox) -> Option<SeparatingAxis> {
    separating_axis_with(a, b, SatVariant::Corrected)
}

/// Run the separating axis test with the chosen arithmetic.
///
/// Axes are tested in the order A0..A2, B0..B2, A0xB0..A2xB2 and the first
/// separating one is returned.
pub fn separating_axis_with(
    a: &OrientedBox,
    b: &OrientedBox,
    variant: SatVariant,
) -> Option<SeparatingAxis> {
    let ea = a.half_extents;
    let eb = b.half_extents;

    // Rotation expressing B in A's frame
    let r = Mat3::from_fn(|i, j| a.axes[i].dot(&b.axes[j]));

    // Translation, in A's frame
    let offset = b.center - a.center;
    let t = Vec3::new(offset.dot(&a.axes[0]), offset.dot(&a.axes[1]), offset.dot(&a.axes[2]));

    // Epsilon keeps near-parallel edge pairs from producing a null cross axis
    let abs_r = r.map(|v| v.abs() + f32::EPSILON);

    for i in 0..3 {
        let ra = ea[i];
        let rb = match variant {
            SatVariant::Corrected => {
                eb[0] * abs_r[(i, 0)] + eb[1] * abs_r[(i, 1)] + eb[2] * abs_r[(i, 2)]
            }
            SatVariant::Legacy => eb[0] * abs_r[(i, 0)] + eb[1] + abs_r[(i, 1)] + eb[2] * abs_r[(i, 2)],
        };
        if t[i].abs() > ra + rb {
            return Some(SeparatingAxis::FaceA(i));
        }
    }

    for j in 0..3 {
        let ra = ea[0] * abs_r[(0, j)] + ea[1] * abs_r[(1, j)] + ea[2] * abs_r[(2, j)];
        let rb = eb[j];
        let projected = t[0] * r[(0, j)] + t[1] * r[(1, j)] + t[2] * r[(2, j)];
        let separation = match variant {
            SatVariant::Corrected => projected.abs(),
            SatVariant::Legacy => projected,
        };
        if separation > ra + rb {
            return Some(SeparatingAxis::FaceB(j));
        }
    }

    for i in 0..3 {
        let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
        for j in 0..3 {
            let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
            let ra = ea[i1] * abs_r[(i2, j)] + ea[i2] * abs_r[(i1, j)];
            let rb = eb[j1] * abs_r[(i, j2)] + eb[j2] * abs_r[(i, j1)];
            let separation = (t[i2] * r[(i1, j)] - t[i1] * r[(i2, j)]).abs();
            if separation > ra + rb {
                return Some(SeparatingAxis::Cross(i, j));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{constants::QUARTER_PI, Quat, Transform};

    fn unit_box(center: Vec3) -> OrientedBox {
        OrientedBox::new(center, [Vec3::x(), Vec3::y(), Vec3::z()], Vec3::new(0.5, 0.5, 0.5))
    }

    fn rotated_unit_box(center: Vec3, rotation: Quat) -> OrientedBox {
        let model = Transform::from_position_rotation(center, rotation).to_matrix();
        OrientedBox::from_model_matrix(&model, &Vec3::zeros(), &Vec3::new(0.5, 0.5, 0.5))
    }

    fn skew_rotation() -> Quat {
        Quat::from_axis_angle(&nalgebra::Unit::new_normalize(Vec3::new(1.0, 2.0, 3.0)), 0.7)
    }

    #[test]
    fn test_identity_boxes_separated_on_face_axis() {
        let a = unit_box(Vec3::zeros());
        let b = unit_box(Vec3::new(0.0, 1.5, 0.0));

        assert_eq!(separating_axis(&a, &b), Some(SeparatingAxis::FaceA(1)));
    }

    #[test]
    fn test_identical_boxes_overlap() {
        let a = rotated_unit_box(Vec3::new(3.0, -1.0, 2.0), skew_rotation());
        let b = a;

        assert_eq!(separating_axis(&a, &b), None);
    }

    #[test]
    fn test_overlapping_unit_cubes() {
        let a = unit_box(Vec3::zeros());
        let b = unit_box(Vec3::new(0.4, 0.0, 0.0));

        assert_eq!(separating_axis(&a, &b), None);
    }

    #[test]
    fn test_rotated_box_separated_despite_aabb_overlap() {
        // B's world AABB reaches x = 0.493 < 0.5, but its face normal
        // along the diagonal separates the boxes.
        let a = unit_box(Vec3::zeros());
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), QUARTER_PI);
        let b = rotated_unit_box(Vec3::new(1.2, 1.2, 0.0), rotation);

        assert_eq!(separating_axis(&a, &b), Some(SeparatingAxis::FaceB(0)));
    }

    #[test]
    fn test_result_is_symmetric() {
        let rotation = skew_rotation();
        for step in 0..30 {
            let offset = Vec3::new(-1.5 + step as f32 * 0.1, 0.3, -0.2);
            let a = unit_box(Vec3::zeros());
            let b = rotated_unit_box(offset, rotation);

            assert_eq!(
                separating_axis(&a, &b).is_none(),
                separating_axis(&b, &a).is_none(),
                "asymmetric at offset {offset:?}"
            );
        }
    }

    #[test]
    fn test_scaled_matrix_folds_scale_into_extents() {
        let model = Transform::from_position(Vec3::new(1.0, 0.0, 0.0))
            .with_scale(Vec3::new(4.0, 1.0, 1.0))
            .to_matrix();
        let obb = OrientedBox::from_model_matrix(&model, &Vec3::zeros(), &Vec3::new(0.5, 0.5, 0.5));

        assert_eq!(obb.half_extents, Vec3::new(2.0, 0.5, 0.5));
        assert_eq!(obb.axes[0], Vec3::x());
        // Stretched box now reaches a neighbour 2.4 units away
        assert_eq!(separating_axis(&obb, &unit_box(Vec3::new(3.4, 0.0, 0.0))), None);
    }

    #[test]
    fn test_legacy_addition_slip_misses_face_a_separation() {
        let a = unit_box(Vec3::zeros());
        let b = rotated_unit_box(Vec3::new(1.4, 0.0, 0.0), skew_rotation());

        assert_eq!(separating_axis(&a, &b), Some(SeparatingAxis::FaceA(0)));
        assert_eq!(separating_axis_with(&a, &b, SatVariant::Legacy), None);
    }

    #[test]
    fn test_legacy_signed_comparison_misses_negative_face_b_side() {
        let a = rotated_unit_box(Vec3::zeros(), skew_rotation());

        let negative = unit_box(Vec3::new(-1.4, 0.0, 0.0));
        assert_eq!(separating_axis(&a, &negative), Some(SeparatingAxis::FaceB(0)));
        assert_eq!(separating_axis_with(&a, &negative, SatVariant::Legacy), None);

        // Mirror image on the positive side is still caught
        let positive = unit_box(Vec3::new(1.4, 0.0, 0.0));
        assert_eq!(
            separating_axis_with(&a, &positive, SatVariant::Legacy),
            Some(SeparatingAxis::FaceB(0))
        );
    }

    #[test]
    fn test_variants_agree_on_clear_overlap() {
        let a = unit_box(Vec3::zeros());
        let b = rotated_unit_box(Vec3::new(0.9, 0.0, 0.0), skew_rotation());

        assert_eq!(separating_axis(&a, &b), None);
        assert_eq!(separating_axis_with(&a, &b, SatVariant::Legacy), None);
    }
}
