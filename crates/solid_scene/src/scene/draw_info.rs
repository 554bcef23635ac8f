//! Local-to-parent transform of a spatial node

use crate::foundation::math::{Mat4, Precision, Quat, Vec3};

/// A matrix together with its inverse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceDrawInfo {
    /// Local-to-parent matrix
    pub matrix: Mat4,
    /// Parent-to-local matrix
    pub matrix_inverse: Mat4,
}

impl Default for SpaceDrawInfo {
    fn default() -> Self {
        Self::new(Mat4::identity(), Mat4::identity())
    }
}

impl SpaceDrawInfo {
    /// Pair a matrix with a known inverse
    pub const fn new(matrix: Mat4, matrix_inverse: Mat4) -> Self {
        Self { matrix, matrix_inverse }
    }

    /// Build a transform from identity
    pub fn compose(translation: Vec3, scale: Vec3, rotation: Quat, origin: Vec3) -> Self {
        let mut info = Self::default();
        info.apply_transform(translation, scale, rotation, origin);
        info
    }

    /// Right-multiply the translation, rotation, scale and un-pivot steps, in
    /// that order, and left-multiply their inverses in the same order.
    ///
    /// Scale components smaller than [`Precision::FLOAT_EPSILON`] in magnitude
    /// are clamped to it so the result stays invertible.
    pub fn apply_transform(&mut self, translation: Vec3, scale: Vec3, rotation: Quat, origin: Vec3) {
        if translation != Vec3::zeros() {
            self.matrix *= Mat4::new_translation(&translation);
            self.matrix_inverse = Mat4::new_translation(&-translation) * self.matrix_inverse;
        }

        if rotation != Quat::identity() {
            self.matrix *= rotation.to_homogeneous();
            self.matrix_inverse = rotation.inverse().to_homogeneous() * self.matrix_inverse;
        }

        if scale != Vec3::new(1.0, 1.0, 1.0) {
            let scale = scale.map(Precision::clamp_magnitude);
            self.matrix *= Mat4::new_nonuniform_scaling(&scale);
            self.matrix_inverse = Mat4::new_nonuniform_scaling(&scale.map(f32::recip)) * self.matrix_inverse;
        }

        if origin != Vec3::zeros() {
            self.matrix *= Mat4::new_translation(&-origin);
            self.matrix_inverse = Mat4::new_translation(&origin) * self.matrix_inverse;
        }
    }

    /// Transform a point from local to parent space
    pub fn to_parent(&self, point: Vec3) -> Vec3 {
        self.matrix.transform_point(&point.into()).coords
    }

    /// Transform a point from parent to local space
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.matrix_inverse.transform_point(&point.into()).coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4Ext;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_sign(rng: &mut StdRng) -> f32 {
        if rng.gen_bool(0.5) {
            1.0
        } else {
            -1.0
        }
    }

    #[test]
    fn test_inverse_times_matrix_is_identity() {
        let mut rng = StdRng::seed_from_u64(0x5011d);

        for _ in 0..200 {
            let translation = Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );
            let scale = Vec3::new(
                rng.gen_range(0.25..4.0) * random_sign(&mut rng),
                rng.gen_range(0.25..4.0) * random_sign(&mut rng),
                rng.gen_range(0.25..4.0) * random_sign(&mut rng),
            );
            let rotation = Quat::from_euler_angles(
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
            );
            let origin = Vec3::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0));

            let info = SpaceDrawInfo::compose(translation, scale, rotation, origin);
            assert_relative_eq!(info.matrix_inverse * info.matrix, Mat4::identity(), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_zero_scale_stays_invertible() {
        for scale in [
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(2.0, 0.0, -3.0),
            Vec3::new(1.0, 1.0, -0.0),
        ] {
            let info = SpaceDrawInfo::compose(Vec3::new(1.0, 2.0, 3.0), scale, Quat::identity(), Vec3::new(0.5, 0.5, 0.5));

            assert!(info.matrix.all_finite());
            assert!(info.matrix_inverse.all_finite());
            assert!(info.matrix.determinant().abs() > 0.0);
            assert_relative_eq!(info.matrix_inverse * info.matrix, Mat4::identity(), epsilon = 1e-3);
        }
    }

    #[test]
    fn test_identity_components_are_skipped() {
        let info = SpaceDrawInfo::compose(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Quat::identity(), Vec3::zeros());
        assert_eq!(info, SpaceDrawInfo::default());
    }

    #[test]
    fn test_composition_order() {
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2);
        let info = SpaceDrawInfo::compose(
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(2.0, 2.0, 2.0),
            rotation,
            Vec3::new(1.0, 0.0, 0.0),
        );

        // The origin lands on the translation
        assert_relative_eq!(info.to_parent(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(10.0, 0.0, 0.0), epsilon = 1e-5);
        // One unit along local X: scaled to 2, rotated onto +Y, then translated
        assert_relative_eq!(info.to_parent(Vec3::new(2.0, 0.0, 0.0)), Vec3::new(10.0, 2.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(info.to_local(Vec3::new(10.0, 2.0, 0.0)), Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_apply_transform_composes_onto_existing() {
        let mut info = SpaceDrawInfo::compose(Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), Quat::identity(), Vec3::zeros());
        info.apply_transform(Vec3::new(0.0, 3.0, 0.0), Vec3::new(1.0, 1.0, 1.0), Quat::identity(), Vec3::zeros());

        assert_relative_eq!(info.to_parent(Vec3::zeros()), Vec3::new(5.0, 3.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(info.matrix_inverse * info.matrix, Mat4::identity(), epsilon = 1e-6);
    }
}
