// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

//! Off-axis (asymmetric) frustum derivation for a planar screen.
//!
//! Given the screen's corners and the eye position, this produces a
//! projection and view matrix such that the screen rectangle maps exactly
//! onto the viewport, following the generalized perspective projection:
//!
//! 1. screen basis `vr` (right), `vu` (up), `vn` (normal, toward the eye);
//! 2. eye-to-corner vectors and the perpendicular eye-to-screen distance `d`;
//! 3. frustum extents on the near plane, `l, r, b, t`;
//! 4. `projection = frustum(l, r, b, t, n, f)`, `view = R(vr, vu, vn) * T(-eye)`.
//!
//! Matrices follow the OpenGL clip-space convention: the eye looks down its
//! local -z and depth maps to [-1, 1].

use crate::{
    error::{ConfigError, GeometryError},
    math::{mat_is_finite, vec_is_finite, Mat4, Placement, Quat, Vec3},
};
use cgmath::{InnerSpace, Matrix, Matrix3};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Eye-to-screen distances at or below this are treated as "on the plane".
const MIN_EYE_DISTANCE: f64 = 1e-9;

/// Relative tolerance for the rectangle checks.
const SHAPE_TOLERANCE: f64 = 1e-3;

/// Four world-space corners of the physical screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenQuad {
    pub bottom_left: Vec3,
    pub bottom_right: Vec3,
    pub top_left: Vec3,
    pub top_right: Vec3,
}

/// Orthonormal basis of a screen plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBasis {
    pub right: Vec3,
    pub up: Vec3,
    /// Points from the screen toward the viewing side.
    pub normal: Vec3,
}

/// Axis convention of the world the screen lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    /// The viewing side is `cross(right, up)`.
    Right,
    /// The viewing side is `-cross(right, up)`.
    Left,
}

impl Default for Handedness {
    fn default() -> Self {
        Handedness::Right
    }
}

impl ScreenQuad {
    pub fn new(bottom_left: Vec3, bottom_right: Vec3, top_left: Vec3, top_right: Vec3) -> ScreenQuad {
        ScreenQuad {
            bottom_left,
            bottom_right,
            top_left,
            top_right,
        }
    }

    /// The unit quad `(±0.5, ±0.5, 0)` mapped through a placement.
    ///
    /// Size the screen with the placement's scale, or build the corners
    /// directly with [`ScreenQuad::new`] for non-square screens.
    pub fn from_placement(placement: &Placement) -> ScreenQuad {
        let corner = |x: f64, y: f64| placement.transform_point(Vec3::new(x, y, 0.0));
        ScreenQuad {
            bottom_left: corner(-0.5, -0.5),
            bottom_right: corner(0.5, -0.5),
            top_left: corner(-0.5, 0.5),
            top_right: corner(0.5, 0.5),
        }
    }

    /// An axis-aligned screen facing +z, centered on `center`.
    pub fn axis_aligned(center: Vec3, width: f64, height: f64) -> ScreenQuad {
        let (hw, hh) = (width / 2.0, height / 2.0);
        ScreenQuad {
            bottom_left: center + Vec3::new(-hw, -hh, 0.0),
            bottom_right: center + Vec3::new(hw, -hh, 0.0),
            top_left: center + Vec3::new(-hw, hh, 0.0),
            top_right: center + Vec3::new(hw, hh, 0.0),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.bottom_right + self.top_left) * 0.5
    }

    pub fn width(&self) -> f64 {
        (self.bottom_right - self.bottom_left).magnitude()
    }

    pub fn height(&self) -> f64 {
        (self.top_left - self.bottom_left).magnitude()
    }

    /// Screen basis, from the bottom and left edges.
    pub fn basis(&self, handedness: Handedness) -> Result<ScreenBasis, GeometryError> {
        let corners = [
            self.bottom_left,
            self.bottom_right,
            self.top_left,
            self.top_right,
        ];
        if !corners.iter().all(vec_is_finite) {
            return Err(GeometryError::NonFinite("screen corners"));
        }
        let bottom = self.bottom_right - self.bottom_left;
        let left = self.top_left - self.bottom_left;
        let scale = bottom.magnitude().max(left.magnitude());
        if !(bottom.magnitude() > scale * SHAPE_TOLERANCE) {
            return Err(GeometryError::ZeroLengthEdge("bottom"));
        }
        if !(left.magnitude() > scale * SHAPE_TOLERANCE) {
            return Err(GeometryError::ZeroLengthEdge("left"));
        }
        let right = bottom.normalize();
        let up = left.normalize();
        let cosine = right.dot(up);
        if cosine.abs() > SHAPE_TOLERANCE {
            return Err(GeometryError::NonOrthogonalEdges { cosine });
        }
        let cross = right.cross(up).normalize();
        let normal = match handedness {
            Handedness::Right => cross,
            Handedness::Left => -cross,
        };
        Ok(ScreenBasis { right, up, normal })
    }

    /// Check the rectangle invariant, including the top-right corner that the
    /// projection itself never reads.
    pub fn validate(&self) -> Result<(), GeometryError> {
        self.basis(Handedness::Right)?;
        let expected = self.bottom_right + self.top_left - self.bottom_left;
        let offset = (self.top_right - expected).magnitude();
        let diagonal = (self.top_right - self.bottom_left).magnitude().max(f64::MIN_POSITIVE);
        if offset > diagonal * SHAPE_TOLERANCE {
            return Err(GeometryError::NotRectangular { offset });
        }
        Ok(())
    }
}

/// How the near plane distance is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NearPlane {
    Fixed { distance: f64 },
    /// Track the screen: `max(min_near, d + offset)`, so the near plane never
    /// crosses the eye as it approaches the screen.
    Adaptive { min_near: f64, offset: f64 },
}

impl Default for NearPlane {
    fn default() -> Self {
        NearPlane::Fixed { distance: 0.3 }
    }
}

impl NearPlane {
    /// Adaptive mode with the rig's usual constants.
    pub fn adaptive() -> NearPlane {
        NearPlane::Adaptive {
            min_near: 0.0001,
            offset: -0.01,
        }
    }

    fn distance(&self, eye_to_screen: f64) -> f64 {
        match *self {
            NearPlane::Fixed { distance } => distance,
            NearPlane::Adaptive { min_near, offset } => min_near.max(eye_to_screen + offset),
        }
    }
}

/// Tunables for [`FrustumBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrustumConfig {
    pub near: NearPlane,
    pub far: f64,
    pub handedness: Handedness,
    /// Also compute a camera orientation looking at the screen, for engines
    /// that cannot take an explicit projection matrix.
    pub estimate_orientation: bool,
}

impl Default for FrustumConfig {
    fn default() -> Self {
        FrustumConfig {
            near: NearPlane::default(),
            far: 1000.0,
            handedness: Handedness::Right,
            estimate_orientation: false,
        }
    }
}

impl FrustumConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.far.is_finite() && self.far > 0.0) {
            return Err(ConfigError::invalid("far", "must be positive"));
        }
        match self.near {
            NearPlane::Fixed { distance } if !(distance > 0.0 && distance < self.far) => Err(
                ConfigError::invalid("near.distance", "must be positive and less than far"),
            ),
            NearPlane::Adaptive { min_near, .. } if !(min_near > 0.0 && min_near < self.far) => {
                Err(ConfigError::invalid(
                    "near.min_near",
                    "must be positive and less than far",
                ))
            }
            NearPlane::Adaptive { offset, .. } if !offset.is_finite() => {
                Err(ConfigError::invalid("near.offset", "must be finite"))
            }
            _ => Ok(()),
        }
    }
}

/// One frame's frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumParams {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    pub near: f64,
    pub far: f64,
    /// Perpendicular distance from the eye to the screen plane.
    pub distance: f64,
    pub eye: Vec3,
    /// World to eye.
    pub view: Mat4,
    pub projection: Mat4,
    /// Camera-to-world rotation looking at the screen, in estimate mode.
    pub orientation: Option<Quat>,
}

impl FrustumParams {
    /// Horizontal skew of the frustum: zero when the eye is centered.
    pub fn horizontal_skew(&self) -> f64 {
        self.right + self.left
    }

    pub fn vertical_skew(&self) -> f64 {
        self.top + self.bottom
    }

    /// Project a world-space point to normalized device coordinates.
    ///
    /// `None` for points in the eye's plane.
    pub fn to_ndc(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.projection * self.view * world.extend(1.0);
        if clip.w.abs() <= f64::EPSILON {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }
}

/// The OpenGL-style asymmetric perspective matrix.
pub fn frustum_matrix(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Mat4 {
    let (l, r, b, t, n, f) = (left, right, bottom, top, near, far);
    // Column-major: each group of four is one column.
    Mat4::new(
        2.0 * n / (r - l),
        0.0,
        0.0,
        0.0,
        0.0,
        2.0 * n / (t - b),
        0.0,
        0.0,
        (r + l) / (r - l),
        (t + b) / (t - b),
        (f + n) / (n - f),
        -1.0,
        0.0,
        0.0,
        2.0 * f * n / (n - f),
        0.0,
    )
}

/// World-to-eye matrix: rotate into the screen basis after moving the eye
/// to the origin.
pub fn view_matrix(basis: &ScreenBasis, eye: Vec3) -> Mat4 {
    let rotation = Matrix3::from_cols(basis.right, basis.up, basis.normal).transpose();
    Mat4::from(rotation) * Mat4::from_translation(-eye)
}

/// Camera-to-world rotation looking from `eye` at `target` with `up` as up.
fn look_rotation(eye: Vec3, target: Vec3, up: Vec3, handedness: Handedness) -> Option<Quat> {
    let forward = target - eye;
    if forward.magnitude2() <= f64::EPSILON {
        return None;
    }
    let forward = forward.normalize();
    let cols = match handedness {
        Handedness::Right => {
            let side = forward.cross(up);
            if side.magnitude2() <= f64::EPSILON {
                return None;
            }
            let side = side.normalize();
            Matrix3::from_cols(side, side.cross(forward), -forward)
        }
        Handedness::Left => {
            let side = up.cross(forward);
            if side.magnitude2() <= f64::EPSILON {
                return None;
            }
            let side = side.normalize();
            Matrix3::from_cols(side, forward.cross(side), forward)
        }
    };
    Some(Quat::from(cols))
}

/// Derive the frustum for one frame. Pure: no fallback.
pub fn compute_frustum(
    quad: &ScreenQuad,
    eye: Vec3,
    config: &FrustumConfig,
) -> Result<FrustumParams, GeometryError> {
    if !vec_is_finite(&eye) {
        return Err(GeometryError::NonFinite("eye position"));
    }
    let basis = quad.basis(config.handedness)?;
    let va = quad.bottom_left - eye;
    let vb = quad.bottom_right - eye;
    let vc = quad.top_left - eye;

    let d = -va.dot(basis.normal);
    if !(d > MIN_EYE_DISTANCE) {
        return Err(GeometryError::EyeBehindScreen { distance: d });
    }

    let n = config.near.distance(d);
    let f = config.far;
    if !(n > 0.0 && n < f && f.is_finite()) {
        return Err(GeometryError::InvalidClipPlanes { near: n, far: f });
    }

    let scale = n / d;
    let l = basis.right.dot(va) * scale;
    let r = basis.right.dot(vb) * scale;
    let b = basis.up.dot(va) * scale;
    let t = basis.up.dot(vc) * scale;

    let projection = frustum_matrix(l, r, b, t, n, f);
    let view = view_matrix(&basis, eye);
    if !mat_is_finite(&projection) {
        return Err(GeometryError::NonFinite("projection matrix"));
    }
    if !mat_is_finite(&view) {
        return Err(GeometryError::NonFinite("view matrix"));
    }

    let orientation = if config.estimate_orientation {
        let target = (quad.bottom_right + quad.top_left) * 0.5;
        look_rotation(eye, target, basis.up, config.handedness)
    } else {
        None
    };

    Ok(FrustumParams {
        left: l,
        right: r,
        bottom: b,
        top: t,
        near: n,
        far: f,
        distance: d,
        eye,
        view,
        projection,
        orientation,
    })
}

/// Result of [`FrustumBuilder::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltFrustum {
    pub params: FrustumParams,
    /// Set when this frame's geometry was unusable and the previous valid
    /// frustum is being reused.
    pub reused: Option<GeometryError>,
}

/// Per-frame frustum builder that keeps the last valid result.
#[derive(Debug, Clone)]
pub struct FrustumBuilder {
    config: FrustumConfig,
    last_valid: Option<FrustumParams>,
}

impl FrustumBuilder {
    pub fn new(config: FrustumConfig) -> Result<FrustumBuilder, ConfigError> {
        config.validate()?;
        Ok(FrustumBuilder {
            config,
            last_valid: None,
        })
    }

    pub fn config(&self) -> &FrustumConfig {
        &self.config
    }

    pub fn last_valid(&self) -> Option<&FrustumParams> {
        self.last_valid.as_ref()
    }

    /// Compute this frame's frustum, falling back to the previous one if the
    /// geometry is degenerate. Errors only if there is nothing to fall back to.
    pub fn update(&mut self, quad: &ScreenQuad, eye: Vec3) -> Result<BuiltFrustum, GeometryError> {
        match compute_frustum(quad, eye, &self.config) {
            Ok(params) => {
                self.last_valid = Some(params);
                Ok(BuiltFrustum {
                    params,
                    reused: None,
                })
            }
            Err(e) => match self.last_valid {
                Some(params) => {
                    warn!(error = %e, "degenerate frustum, reusing previous frame");
                    Ok(BuiltFrustum {
                        params,
                        reused: Some(e),
                    })
                }
                None => {
                    warn!(error = %e, "degenerate frustum and no previous frame");
                    Err(e)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Quaternion, Rotation3};
    use proptest::prelude::*;

    fn unit_screen() -> ScreenQuad {
        ScreenQuad::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        )
    }

    fn config(near: f64) -> FrustumConfig {
        FrustumConfig {
            near: NearPlane::Fixed { distance: near },
            far: 100.0,
            ..FrustumConfig::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
        let v = *m * p.extend(1.0);
        v.truncate() / v.w
    }

    fn assert_ndc_corners(params: &FrustumParams, quad: &ScreenQuad) {
        let expected = [
            (quad.bottom_left, -1.0, -1.0),
            (quad.bottom_right, 1.0, -1.0),
            (quad.top_left, -1.0, 1.0),
            (quad.top_right, 1.0, 1.0),
        ];
        for (corner, x, y) in expected.iter() {
            let ndc = params.to_ndc(*corner).unwrap();
            assert!(close(ndc.x, *x), "corner {:?} -> {:?}", corner, ndc);
            assert!(close(ndc.y, *y), "corner {:?} -> {:?}", corner, ndc);
            assert!(ndc.z > -1.0 && ndc.z < 1.0);
        }
    }

    #[test]
    fn centered_eye_is_symmetric() {
        let params = compute_frustum(&unit_screen(), Vec3::new(0.0, 0.0, 2.0), &config(0.1)).unwrap();
        assert!(close(params.left, -params.right));
        assert!(close(params.bottom, -params.top));
        assert!(close(params.right, 0.05));
        assert!(close(params.distance, 2.0));
        assert!(close(params.horizontal_skew(), 0.0));
    }

    #[test]
    fn lateral_eye_is_asymmetric_and_fills_viewport() {
        let quad = unit_screen();
        let params = compute_frustum(&quad, Vec3::new(0.5, 0.0, 2.0), &config(0.1)).unwrap();
        assert!(!close(params.left, -params.right));
        assert!(close(params.left, -0.075));
        assert!(close(params.right, 0.025));
        assert!(close(params.bottom, -params.top));
        assert_ndc_corners(&params, &quad);
    }

    #[test]
    fn projection_rows_match_formula() {
        let m = frustum_matrix(-0.075, 0.025, -0.05, 0.05, 0.1, 100.0);
        // cgmath indexes m[column][row].
        assert!(close(m[0][0], 2.0 * 0.1 / 0.1));
        assert!(close(m[2][0], -0.05 / 0.1));
        assert!(close(m[1][1], 2.0 * 0.1 / 0.1));
        assert!(close(m[2][1], 0.0));
        assert!(close(m[2][2], 100.1 / -99.9));
        assert!(close(m[3][2], 2.0 * 100.0 * 0.1 / -99.9));
        assert_eq!(m[2][3], -1.0);
        assert_eq!(m[3][3], 0.0);
    }

    #[test]
    fn view_moves_eye_to_origin() {
        let eye = Vec3::new(0.3, -0.2, 1.5);
        let params = compute_frustum(&unit_screen(), eye, &config(0.1)).unwrap();
        let origin = transform_point(&params.view, eye);
        assert!(origin.magnitude() < 1e-12);
        // The screen lies d in front of the eye, along -z.
        let center = transform_point(&params.view, Vec3::new(0.3, -0.2, 0.0));
        assert!(close(center.z, -1.5));
    }

    #[test]
    fn eye_on_plane_reuses_previous() {
        let quad = unit_screen();
        let mut builder = FrustumBuilder::new(config(0.1)).unwrap();
        let good = builder.update(&quad, Vec3::new(0.0, 0.0, 2.0)).unwrap();
        assert_eq!(good.reused, None);

        let on_plane = builder.update(&quad, Vec3::new(0.2, 0.1, 0.0)).unwrap();
        assert!(matches!(
            on_plane.reused,
            Some(GeometryError::EyeBehindScreen { .. })
        ));
        assert_eq!(on_plane.params, good.params);
        assert!(mat_is_finite(&on_plane.params.projection));
        assert!(mat_is_finite(&on_plane.params.view));
    }

    #[test]
    fn no_previous_frame_is_an_error() {
        let mut builder = FrustumBuilder::new(config(0.1)).unwrap();
        let err = builder
            .update(&unit_screen(), Vec3::new(0.0, 0.0, 0.0))
            .unwrap_err();
        assert_eq!(err, GeometryError::EyeBehindScreen { distance: 0.0 });
        assert!(builder.last_valid().is_none());
        let behind = compute_frustum(&unit_screen(), Vec3::new(0.0, 0.0, -1.0), &config(0.1));
        assert!(matches!(behind, Err(GeometryError::EyeBehindScreen { .. })));
    }

    #[test]
    fn non_finite_eye_reuses_previous() {
        let quad = unit_screen();
        let mut builder = FrustumBuilder::new(config(0.1)).unwrap();
        builder.update(&quad, Vec3::new(0.0, 0.0, 1.0)).unwrap();
        let out = builder
            .update(&quad, Vec3::new(f64::NAN, 0.0, 1.0))
            .unwrap();
        assert_eq!(out.reused, Some(GeometryError::NonFinite("eye position")));
    }

    #[test]
    fn degenerate_quads() {
        let eye = Vec3::new(0.0, 0.0, 1.0);
        let p = Vec3::new(0.0, 0.0, 0.0);
        let collapsed = ScreenQuad::new(p, p, Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(
            compute_frustum(&collapsed, eye, &config(0.1)),
            Err(GeometryError::ZeroLengthEdge("bottom"))
        );
        let parallel = ScreenQuad::new(
            p,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        );
        assert!(matches!(
            compute_frustum(&parallel, eye, &config(0.1)),
            Err(GeometryError::NonOrthogonalEdges { .. })
        ));
        let mut bent = unit_screen();
        bent.top_right.z = 0.5;
        assert!(matches!(
            bent.validate(),
            Err(GeometryError::NotRectangular { .. })
        ));
        assert_eq!(unit_screen().validate(), Ok(()));
    }

    #[test]
    fn adaptive_near_tracks_screen() {
        let cfg = FrustumConfig {
            near: NearPlane::adaptive(),
            far: 100.0,
            ..FrustumConfig::default()
        };
        let quad = unit_screen();
        let params = compute_frustum(&quad, Vec3::new(0.0, 0.0, 2.0), &cfg).unwrap();
        assert!(close(params.near, 1.99));
        let params = compute_frustum(&quad, Vec3::new(0.0, 0.0, 0.005), &cfg).unwrap();
        assert!(close(params.near, 0.0001));
        assert_ndc_corners(&params, &quad);
    }

    #[test]
    fn left_handed_screen_faces_negative_z() {
        let cfg = FrustumConfig {
            handedness: Handedness::Left,
            ..config(0.1)
        };
        let quad = unit_screen();
        let params = compute_frustum(&quad, Vec3::new(0.5, 0.0, -2.0), &cfg).unwrap();
        assert!(close(params.distance, 2.0));
        assert!(compute_frustum(&quad, Vec3::new(0.0, 0.0, 2.0), &cfg).is_err());
    }

    #[test]
    fn screen_from_placement() {
        let placement = Placement::new(
            Vec3::new(0.0, 1.0, -3.0),
            Quaternion::from_angle_y(Deg(30.0)),
            2.0,
        );
        let quad = ScreenQuad::from_placement(&placement);
        assert_eq!(quad.validate(), Ok(()));
        assert!(close(quad.width(), 2.0));
        assert!(close(quad.height(), 2.0));
        assert!((quad.center() - Vec3::new(0.0, 1.0, -3.0)).magnitude() < 1e-12);
    }

    #[test]
    fn estimated_orientation_looks_at_screen() {
        let cfg = FrustumConfig {
            estimate_orientation: true,
            ..config(0.1)
        };
        let params = compute_frustum(&unit_screen(), Vec3::new(0.0, 0.0, 2.0), &cfg).unwrap();
        let q = params.orientation.unwrap();
        // Facing straight at the screen: the camera's -z maps to world -z.
        let forward = q * Vec3::new(0.0, 0.0, -1.0);
        assert!((forward - Vec3::new(0.0, 0.0, -1.0)).magnitude() < 1e-9);

        let params = compute_frustum(&unit_screen(), Vec3::new(2.0, 0.0, 2.0), &cfg).unwrap();
        let forward = params.orientation.unwrap() * Vec3::new(0.0, 0.0, -1.0);
        let expected = Vec3::new(-1.0, 0.0, -1.0).normalize();
        assert!((forward - expected).magnitude() < 1e-9);
        let up = params.orientation.unwrap() * Vec3::new(0.0, 1.0, 0.0);
        assert!((up - Vec3::new(0.0, 1.0, 0.0)).magnitude() < 1e-9);
    }

    #[test]
    fn config_validation() {
        assert!(FrustumConfig::default().validate().is_ok());
        assert!(config(200.0).validate().is_err());
        assert!(config(0.0).validate().is_err());
        assert!(FrustumBuilder::new(config(-1.0)).is_err());
    }

    proptest! {
        #[test]
        fn corners_always_fill_viewport(
            ex in -3.0f64..3.0,
            ey in -3.0f64..3.0,
            ez in 0.2f64..5.0,
            near in 0.01f64..0.15
        ) {
            let quad = unit_screen();
            let params = compute_frustum(&quad, Vec3::new(ex, ey, ez), &config(near)).unwrap();
            for (corner, x, y) in [
                (quad.bottom_left, -1.0, -1.0),
                (quad.bottom_right, 1.0, -1.0),
                (quad.top_left, -1.0, 1.0),
                (quad.top_right, 1.0, 1.0),
            ].iter() {
                let ndc = params.to_ndc(*corner).unwrap();
                prop_assert!((ndc.x - x).abs() < 1e-6);
                prop_assert!((ndc.y - y).abs() < 1e-6);
            }
        }

        #[test]
        fn never_non_finite(ex in -3.0f64..3.0, ey in -3.0f64..3.0, ez in -1.0f64..1.0) {
            let mut builder = FrustumBuilder::new(config(0.1)).unwrap();
            builder.update(&unit_screen(), Vec3::new(0.0, 0.0, 2.0)).unwrap();
            let out = builder.update(&unit_screen(), Vec3::new(ex, ey, ez)).unwrap();
            prop_assert!(mat_is_finite(&out.params.projection));
            prop_assert!(mat_is_finite(&out.params.view));
        }
    }
}
