//! Math type aliases and helper functions.
//!
//! All rendering math is `f32`. Matrices follow nalgebra's column-vector
//! convention, which matches glTF: a point is transformed as `M * p` and the
//! translation lives in the fourth column.

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
/// Use [`quat_from_xyzw`] or `Quaternion::new(w, x, y, z)` to construct.
pub type Quat = nalgebra::Quaternion<f32>;

/// Lengths below this are treated as zero when normalizing.
pub const EPSILON: f32 = 1e-12;

/// A transform split into translation, rotation, and (possibly non-uniform)
/// scale. Recomposes as `T * R * S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trs {
    /// Translation.
    pub translation: Vec3,
    /// Rotation quaternion.
    pub rotation: Quat,
    /// Scale per axis. A negative Z marks a reflection.
    pub scale: Vec3,
}

impl Trs {
    /// Identity transform: no translation, identity rotation, unit scale.
    pub fn identity() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Recompose into a matrix (`translation * rotation * scale`).
    pub fn to_matrix(&self) -> Mat4 {
        mat4_from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Decompose an affine matrix.
    ///
    /// Scale comes from the lengths of the first three columns. The rotation
    /// basis is orthonormalized with Gram-Schmidt; if it turns out to be a
    /// reflection (negative determinant) the Z scale and the third basis
    /// vector are negated so the rotation stays proper.
    pub fn from_matrix(m: &Mat4) -> Self {
        let translation = Vec3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
        let col0 = Vec3::new(m[(0, 0)], m[(1, 0)], m[(2, 0)]);
        let col1 = Vec3::new(m[(0, 1)], m[(1, 1)], m[(2, 1)]);
        let col2 = Vec3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]);
        let mut scale = Vec3::new(col0.norm(), col1.norm(), col2.norm());

        let x = col0.try_normalize(EPSILON).unwrap_or_else(Vec3::x);
        let y = (col1 - x * x.dot(&col1))
            .try_normalize(EPSILON)
            .unwrap_or_else(|| any_orthogonal(&x));
        let mut z = (col2 - x * x.dot(&col2) - y * y.dot(&col2))
            .try_normalize(EPSILON)
            .unwrap_or_else(|| x.cross(&y));

        if Mat3::from_columns(&[x, y, z]).determinant() < 0.0 {
            scale.z = -scale.z;
            z = -z;
        }

        let basis = Mat3::from_columns(&[x, y, z]);
        let rotation = nalgebra::UnitQuaternion::from_rotation_matrix(
            &nalgebra::Rotation3::from_matrix_unchecked(basis),
        )
        .into_inner();

        Self {
            translation,
            rotation,
            scale,
        }
    }
}

impl Default for Trs {
    fn default() -> Self {
        Self::identity()
    }
}

fn any_orthogonal(v: &Vec3) -> Vec3 {
    v.cross(&Vec3::z())
        .try_normalize(EPSILON)
        .unwrap_or_else(|| v.cross(&Vec3::y()).normalize())
}

/// Normalize a quaternion into a rotation. A zero quaternion maps to identity.
pub fn unit_rotation(q: Quat) -> nalgebra::UnitQuaternion<f32> {
    if q.norm_squared() <= EPSILON {
        nalgebra::UnitQuaternion::identity()
    } else {
        nalgebra::UnitQuaternion::from_quaternion(q)
    }
}

/// Build a 4x4 TRS matrix from scale, rotation (quaternion), and translation.
pub fn mat4_from_scale_rotation_translation(
    scale: Vec3,
    rotation: Quat,
    translation: Vec3,
) -> Mat4 {
    let m = unit_rotation(rotation).to_rotation_matrix();
    let rm = m.matrix();
    #[rustfmt::skip]
    let result = Mat4::new(
        rm[(0, 0)] * scale.x, rm[(0, 1)] * scale.y, rm[(0, 2)] * scale.z, translation.x,
        rm[(1, 0)] * scale.x, rm[(1, 1)] * scale.y, rm[(1, 2)] * scale.z, translation.y,
        rm[(2, 0)] * scale.x, rm[(2, 1)] * scale.y, rm[(2, 2)] * scale.z, translation.z,
        0.0,                  0.0,                  0.0,                  1.0,
    );
    result
}

/// Build a uniform scale matrix.
pub fn mat4_from_uniform_scale(s: f32) -> Mat4 {
    Mat4::new_scaling(s)
}

/// Build a matrix from 16 column-major values (glTF `node.matrix` order).
pub fn mat4_from_cols_array(a: &[f32; 16]) -> Mat4 {
    Mat4::from_column_slice(a)
}

/// Create a quaternion from x, y, z, w components.
pub fn quat_from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Quat {
    nalgebra::Quaternion::new(w, x, y, z)
}

/// Create a quaternion from a `[x, y, z, w]` array.
pub fn quat_from_array(a: [f32; 4]) -> Quat {
    nalgebra::Quaternion::new(a[3], a[0], a[1], a[2])
}
