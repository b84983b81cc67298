// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

//! Math types used across the tracker.

use cgmath::{Decomposed, EuclideanSpace, Matrix4, Point3, Quaternion, Transform, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D vector of 64-bit floats.
pub type Vec3 = Vector3<f64>;

/// A 4x4 matrix of 64-bit floats (column-major, as cgmath stores it).
pub type Mat4 = Matrix4<f64>;

/// A unit quaternion of 64-bit floats.
pub type Quat = Quaternion<f64>;

/// Rigid transform plus uniform scale, as cgmath represents it.
pub type Isometry = Decomposed<Vec3, Quat>;

/// Placement of a physical object (the sensor, the screen) in world space.
///
/// This is the serializable form; [`Placement::to_decomposed`] produces the
/// cgmath transform used for the actual math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// World-space position of the local origin.
    pub translation: [f64; 3],
    /// Orientation as a quaternion: mind the order, `[w, x, y, z]`.
    pub rotation: [f64; 4],
    /// Uniform scale applied before rotation.
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl Placement {
    /// Create from components.
    pub fn new(translation: Vec3, rotation: Quat, scale: f64) -> Placement {
        Placement {
            translation: translation.into(),
            rotation: [rotation.s, rotation.v.x, rotation.v.y, rotation.v.z],
            scale,
        }
    }

    /// Return an identity placement at the world origin.
    pub fn identity() -> Placement {
        Placement {
            translation: [0.0; 3],
            rotation: [1.0, 0.0, 0.0, 0.0],
            scale: 1.0,
        }
    }

    /// A pure translation.
    pub fn from_translation(translation: Vec3) -> Placement {
        Placement {
            translation: translation.into(),
            ..Placement::identity()
        }
    }

    pub fn rotation(&self) -> Quat {
        let [w, x, y, z] = self.rotation;
        Quaternion::new(w, x, y, z)
    }

    pub fn translation(&self) -> Vec3 {
        self.translation.into()
    }

    /// Convert to a cgmath transform. The rotation is normalized here so a
    /// hand-written config does not have to be exact.
    pub fn to_decomposed(&self) -> Isometry {
        use cgmath::InnerSpace;
        Decomposed {
            scale: self.scale,
            rot: self.rotation().normalize(),
            disp: self.translation(),
        }
    }

    /// Map a point from this placement's local frame into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.to_decomposed()
            .transform_point(Point3::from_vec(local))
            .to_vec()
    }

    /// Whether every component is finite and the scale is positive.
    pub fn is_valid(&self) -> bool {
        self.translation.iter().all(|v| v.is_finite())
            && self.rotation.iter().all(|v| v.is_finite())
            && self.rotation.iter().any(|v| *v != 0.0)
            && self.scale.is_finite()
            && self.scale > 0.0
    }
}

impl Default for Placement {
    fn default() -> Self {
        Placement::identity()
    }
}

/// Whether all components of a vector are finite.
pub fn vec_is_finite(v: &Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// Whether all sixteen entries of a matrix are finite.
pub fn mat_is_finite(m: &Mat4) -> bool {
    let entries: &[f64; 16] = m.as_ref();
    entries.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rotation3};

    fn close(a: Vec3, b: Vec3) -> bool {
        use cgmath::InnerSpace;
        (a - b).magnitude() < 1e-9
    }

    #[test]
    fn identity_is_noop() {
        let p = Placement::identity();
        assert!(close(
            p.transform_point(Vec3::new(1.0, 2.0, 3.0)),
            Vec3::new(1.0, 2.0, 3.0)
        ));
    }

    #[test]
    fn rotate_then_translate() {
        let p = Placement::new(
            Vec3::new(10.0, 0.0, 0.0),
            Quaternion::from_angle_y(Deg(90.0)),
            2.0,
        );
        // +z rotated 90 degrees about y lands on +x, scaled by 2, then offset.
        assert!(close(
            p.transform_point(Vec3::new(0.0, 0.0, 1.0)),
            Vec3::new(12.0, 0.0, 0.0)
        ));
    }

    #[test]
    fn validity() {
        assert!(Placement::identity().is_valid());
        let mut p = Placement::identity();
        p.scale = 0.0;
        assert!(!p.is_valid());
        let mut p = Placement::identity();
        p.rotation = [0.0; 4];
        assert!(!p.is_valid());
    }

    #[test]
    fn finiteness() {
        assert!(vec_is_finite(&Vec3::new(0.0, 1.0, 2.0)));
        assert!(!vec_is_finite(&Vec3::new(0.0, f64::NAN, 2.0)));
        let mut m = Mat4::from_scale(1.0);
        assert!(mat_is_finite(&m));
        m.z.w = f64::INFINITY;
        assert!(!mat_is_finite(&m));
    }
}
