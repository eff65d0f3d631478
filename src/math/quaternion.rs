//! Unit quaternion with the spline operations the interpolator needs.

use glam::{Mat3, Quat, Vec3};

/// Norm threshold below which an axis/vector counts as degenerate.
const DEGENERATE: f32 = 1e-10;

/// A unit quaternion representing a 3D rotation.
///
/// Immutable-style value type: every operation returns a new
/// quaternion, and every composition renormalizes so numerical drift
/// stays bounded across long gesture sequences.
///
/// Degenerate inputs never produce NaNs — a zero axis yields the
/// identity, aligned vectors in [`Quaternion::from_rotation_arc`]
/// fall back to an arbitrary orthogonal axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    /// X component of the vector part.
    pub x: f32,
    /// Y component of the vector part.
    pub y: f32,
    /// Z component of the vector part.
    pub z: f32,
    /// Scalar part.
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// The identity rotation.
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Build from raw components, normalizing the result.
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }.normalized()
    }

    /// Rotation of `angle` radians around `axis`.
    ///
    /// A (near-)zero axis yields the identity rather than NaNs.
    #[must_use]
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let norm = axis.length();
        if norm < DEGENERATE {
            return Self::IDENTITY;
        }
        let half = angle / 2.0;
        let sin_half = half.sin() / norm;
        Self {
            x: axis.x * sin_half,
            y: axis.y * sin_half,
            z: axis.z * sin_half,
            w: half.cos(),
        }
    }

    /// The rotation mapping direction `from` onto direction `to`.
    ///
    /// Anti-parallel inputs rotate by π around an arbitrary axis
    /// orthogonal to `from`; parallel or degenerate inputs yield the
    /// identity.
    #[must_use]
    pub fn from_rotation_arc(from: Vec3, to: Vec3) -> Self {
        let from_sq = from.length_squared();
        let to_sq = to.length_squared();
        if from_sq < DEGENERATE || to_sq < DEGENERATE {
            return Self::IDENTITY;
        }

        let mut axis = from.cross(to);
        let axis_sq = axis.length_squared();
        if axis_sq < DEGENERATE {
            if from.dot(to) >= 0.0 {
                return Self::IDENTITY;
            }
            // Opposed directions: any axis orthogonal to `from` works.
            axis = orthogonal_to(from);
            return Self::from_axis_angle(axis, std::f32::consts::PI);
        }

        let mut angle = (axis_sq / (from_sq * to_sq)).sqrt().clamp(-1.0, 1.0).asin();
        if from.dot(to) < 0.0 {
            angle = std::f32::consts::PI - angle;
        }
        Self::from_axis_angle(axis, angle)
    }

    /// Build from a 3×3 rotation matrix.
    ///
    /// Branches on the dominant diagonal term for numerical stability
    /// (standard quaternion-from-matrix extraction).
    #[must_use]
    pub fn from_rotation_matrix(m: &Mat3) -> Self {
        // glam is column-major: element (row, col) = col_axis[row].
        let e = |row: usize, col: usize| m.col(col)[row];

        let trace = e(0, 0) + e(1, 1) + e(2, 2);
        let (x, y, z, w);
        if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            w = 0.25 / s;
            x = (e(2, 1) - e(1, 2)) * s;
            y = (e(0, 2) - e(2, 0)) * s;
            z = (e(1, 0) - e(0, 1)) * s;
        } else if e(0, 0) > e(1, 1) && e(0, 0) > e(2, 2) {
            let s = 2.0 * (1.0 + e(0, 0) - e(1, 1) - e(2, 2)).sqrt();
            x = 0.25 * s;
            y = (e(0, 1) + e(1, 0)) / s;
            z = (e(0, 2) + e(2, 0)) / s;
            w = (e(2, 1) - e(1, 2)) / s;
        } else if e(1, 1) > e(2, 2) {
            let s = 2.0 * (1.0 + e(1, 1) - e(0, 0) - e(2, 2)).sqrt();
            x = (e(0, 1) + e(1, 0)) / s;
            y = 0.25 * s;
            z = (e(1, 2) + e(2, 1)) / s;
            w = (e(0, 2) - e(2, 0)) / s;
        } else {
            let s = 2.0 * (1.0 + e(2, 2) - e(0, 0) - e(1, 1)).sqrt();
            x = (e(0, 2) + e(2, 0)) / s;
            y = (e(1, 2) + e(2, 1)) / s;
            z = 0.25 * s;
            w = (e(1, 0) - e(0, 1)) / s;
        }
        Self { x, y, z, w }.normalized()
    }

    /// Build from three orthogonal basis vectors (the images of the
    /// world X/Y/Z axes under the rotation). Inputs are normalized.
    #[must_use]
    pub fn from_rotated_basis(x: Vec3, y: Vec3, z: Vec3) -> Self {
        let m = Mat3::from_cols(
            x.normalize_or_zero(),
            y.normalize_or_zero(),
            z.normalize_or_zero(),
        );
        Self::from_rotation_matrix(&m)
    }

    /// Apply the rotation to a vector using the expanded
    /// 3×3-equivalent formula (no matrix allocation).
    #[must_use]
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let (x, y, z, w) = (self.x, self.y, self.z, self.w);
        let t2 = w * x;
        let t3 = w * y;
        let t4 = w * z;
        let t5 = -x * x;
        let t6 = x * y;
        let t7 = x * z;
        let t8 = -y * y;
        let t9 = y * z;
        let t10 = -z * z;
        Vec3::new(
            2.0 * ((t8 + t10) * v.x + (t6 - t4) * v.y + (t3 + t7) * v.z) + v.x,
            2.0 * ((t4 + t6) * v.x + (t5 + t10) * v.y + (t9 - t2) * v.z) + v.y,
            2.0 * ((t7 - t3) * v.x + (t2 + t9) * v.y + (t5 + t8) * v.z) + v.z,
        )
    }

    /// Apply the inverse rotation to a vector.
    #[must_use]
    pub fn inverse_rotate(&self, v: Vec3) -> Vec3 {
        self.inverse().rotate(v)
    }

    /// The inverse rotation (conjugate, since the quaternion is unit).
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Component-wise negation. Represents the same rotation.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: -self.w,
        }
    }

    /// Four-component dot product.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Unit-length copy. A degenerate quaternion becomes the identity.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let norm = self.dot(self).sqrt();
        if norm < DEGENERATE {
            return Self::IDENTITY;
        }
        Self {
            x: self.x / norm,
            y: self.y / norm,
            z: self.z / norm,
            w: self.w / norm,
        }
    }

    /// The rotation axis. The sign is flipped when needed so that the
    /// associated [`angle`](Self::angle) lies in `[0, π]`.
    #[must_use]
    pub fn axis(&self) -> Vec3 {
        let mut axis = Vec3::new(self.x, self.y, self.z);
        let sinus = axis.length();
        if sinus > DEGENERATE {
            axis /= sinus;
        }
        if 2.0 * self.w.clamp(-1.0, 1.0).acos() > std::f32::consts::PI {
            -axis
        } else {
            axis
        }
    }

    /// The rotation angle, folded into `[0, π]` (see [`axis`](Self::axis)).
    #[must_use]
    pub fn angle(&self) -> f32 {
        let angle = 2.0 * self.w.clamp(-1.0, 1.0).acos();
        if angle > std::f32::consts::PI {
            2.0 * std::f32::consts::PI - angle
        } else {
            angle
        }
    }

    /// Quaternion logarithm (result has a zero scalar part).
    #[must_use]
    pub fn log(&self) -> Self {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if len < DEGENERATE {
            return Self {
                x: self.x,
                y: self.y,
                z: self.z,
                w: 0.0,
            };
        }
        let coef = self.w.clamp(-1.0, 1.0).acos() / len;
        Self {
            x: self.x * coef,
            y: self.y * coef,
            z: self.z * coef,
            w: 0.0,
        }
    }

    /// Quaternion exponential (inverse of [`log`](Self::log)).
    #[must_use]
    pub fn exp(&self) -> Self {
        let theta = (self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if theta < DEGENERATE {
            return Self {
                x: self.x,
                y: self.y,
                z: self.z,
                w: theta.cos(),
            };
        }
        let coef = theta.sin() / theta;
        Self {
            x: self.x * coef,
            y: self.y * coef,
            z: self.z * coef,
            w: theta.cos(),
        }
    }

    /// `log(a⁻¹ · b)` — the tangent-space difference between two
    /// rotations, used by [`squad_tangent`](Self::squad_tangent).
    #[must_use]
    pub fn ln_dif(a: &Self, b: &Self) -> Self {
        (a.inverse() * *b).log()
    }

    /// Spherical linear interpolation between `a` and `b`.
    ///
    /// Near-parallel quaternions fall back to a linear blend to avoid
    /// dividing by a vanishing sine. When `allow_flip` is set, `b` is
    /// negated when the dot product is negative so the interpolation
    /// takes the shorter arc.
    #[must_use]
    pub fn slerp(a: &Self, b: &Self, t: f32, allow_flip: bool) -> Self {
        let cos_angle = a.dot(b);

        let (mut c1, c2);
        if (1.0 - cos_angle.abs()) < 0.01 {
            // Nearly parallel: the spherical formula degenerates.
            c1 = 1.0 - t;
            c2 = t;
        } else {
            let angle = if allow_flip {
                cos_angle.abs().clamp(-1.0, 1.0).acos()
            } else {
                cos_angle.clamp(-1.0, 1.0).acos()
            };
            let sin_angle = angle.sin();
            c1 = (angle * (1.0 - t)).sin() / sin_angle;
            c2 = (angle * t).sin() / sin_angle;
        }

        if allow_flip && cos_angle < 0.0 {
            c1 = -c1;
        }

        Self {
            x: c1 * a.x + c2 * b.x,
            y: c1 * a.y + c2 * b.y,
            z: c1 * a.z + c2 * b.z,
            w: c1 * a.w + c2 * b.w,
        }
        .normalized()
    }

    /// Spherical quadrangle interpolation: a C1-continuous curve from
    /// `a` to `b` shaped by the tangent quaternions `tg_a` and `tg_b`.
    #[must_use]
    pub fn squad(a: &Self, tg_a: &Self, tg_b: &Self, b: &Self, t: f32) -> Self {
        let ab = Self::slerp(a, b, t, true);
        let tg = Self::slerp(tg_a, tg_b, t, false);
        Self::slerp(&ab, &tg, 2.0 * t * (1.0 - t), false)
    }

    /// Tangent quaternion at `center` given its spline neighbors:
    /// `center · exp(−¼(log(center⁻¹·before) + log(center⁻¹·after)))`.
    #[must_use]
    pub fn squad_tangent(before: &Self, center: &Self, after: &Self) -> Self {
        let l1 = Self::ln_dif(center, before);
        let l2 = Self::ln_dif(center, after);
        let e = Self {
            x: -0.25 * (l1.x + l2.x),
            y: -0.25 * (l1.y + l2.y),
            z: -0.25 * (l1.z + l2.z),
            w: -0.25 * (l1.w + l2.w),
        };
        *center * e.exp()
    }

    /// Convert to a `glam` quaternion (for matrix building).
    #[must_use]
    pub fn to_glam(&self) -> Quat {
        Quat::from_xyzw(self.x, self.y, self.z, self.w)
    }

    /// Convert from a `glam` quaternion.
    #[must_use]
    pub fn from_glam(q: Quat) -> Self {
        Self {
            x: q.x,
            y: q.y,
            z: q.z,
            w: q.w,
        }
        .normalized()
    }

    /// The equivalent 3×3 rotation matrix.
    #[must_use]
    pub fn to_mat3(&self) -> Mat3 {
        Mat3::from_quat(self.to_glam())
    }
}

impl std::ops::Mul for Quaternion {
    type Output = Self;

    /// Rotation composition: `a * b` applies `b` first, then `a`.
    /// The product is renormalized to bound drift.
    fn mul(self, rhs: Self) -> Self {
        Self {
            x: self.w * rhs.x + rhs.w * self.x + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y + rhs.w * self.y + self.z * rhs.x - self.x * rhs.z,
            z: self.w * rhs.z + rhs.w * self.z + self.x * rhs.y - self.y * rhs.x,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
        .normalized()
    }
}

/// Any unit vector orthogonal to `v` (which must be non-zero).
fn orthogonal_to(v: Vec3) -> Vec3 {
    // Cross with the axis v is least aligned with.
    let abs = v.abs();
    let other = if abs.x <= abs.y && abs.x <= abs.z {
        Vec3::X
    } else if abs.y <= abs.z {
        Vec3::Y
    } else {
        Vec3::Z
    };
    v.cross(other).normalize_or(Vec3::X)
}
