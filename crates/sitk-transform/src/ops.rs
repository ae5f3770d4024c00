//! Point mapping for each parametric and dense transform kind.

use glam::{DMat3, DQuat, DVec3};

use crate::error::TransformError;
use crate::geometry::ImageGeometry;
use crate::kind::TransformKind;

/// Maps `point` through a non-composite transform.
///
/// `point` must already have the transform's dimension and the parameter
/// vectors the lengths of the kind's layout.
pub(crate) fn map_point(
    kind: TransformKind,
    params: &[f64],
    fixed: &[f64],
    compute_zyx: bool,
    point: &[f64],
) -> Result<Vec<f64>, TransformError> {
    let d = point.len();
    let mapped = match kind {
        TransformKind::Identity | TransformKind::Composite => point.to_vec(),
        TransformKind::Translation => point.iter().zip(params).map(|(p, t)| p + t).collect(),
        TransformKind::Scale => point.iter().zip(params).map(|(p, s)| p * s).collect(),
        TransformKind::ScaleLogarithmic => point
            .iter()
            .zip(params)
            .map(|(p, s)| p * s.exp())
            .collect(),
        TransformKind::Affine => {
            let (matrix, translation) = params.split_at(d * d);
            affine(matrix, translation, fixed, point)
        }
        TransformKind::Euler if d == 2 => {
            let (s, c) = params[0].sin_cos();
            affine(&[c, -s, s, c], &params[1..3], fixed, point)
        }
        TransformKind::Euler => {
            let rotation = euler_matrix(params[0], params[1], params[2], compute_zyx);
            rigid3(rotation, &params[3..6], fixed, point)
        }
        TransformKind::Similarity if d == 2 => {
            let scale = params[0];
            let (s, c) = params[1].sin_cos();
            let matrix = [scale * c, -scale * s, scale * s, scale * c];
            affine(&matrix, &params[2..4], fixed, point)
        }
        TransformKind::Similarity => {
            let rotation = DMat3::from_quat(versor(&params[0..3])) * params[6];
            rigid3(rotation, &params[3..6], fixed, point)
        }
        TransformKind::Versor => {
            let rotation = DMat3::from_quat(versor(params));
            rigid3(rotation, &[0.0; 3], fixed, point)
        }
        TransformKind::VersorRigid => {
            let rotation = DMat3::from_quat(versor(&params[0..3]));
            rigid3(rotation, &params[3..6], fixed, point)
        }
        TransformKind::QuaternionRigid => {
            let q = DQuat::from_xyzw(params[0], params[1], params[2], params[3]);
            let q = if q.length_squared() > 0.0 {
                q.normalize()
            } else {
                DQuat::IDENTITY
            };
            rigid3(DMat3::from_quat(q), &params[4..7], fixed, point)
        }
        TransformKind::DisplacementField => {
            let grid = ImageGeometry::from_fixed_parameters(d, fixed)?;
            let displacement = nearest_displacement(&grid, params, point);
            point.iter().zip(displacement).map(|(p, u)| p + u).collect()
        }
        TransformKind::BSpline => {
            let grid = ImageGeometry::from_fixed_parameters(d, fixed)?;
            let displacement = bspline_displacement(&grid, params, point);
            point.iter().zip(displacement).map(|(p, u)| p + u).collect()
        }
    };
    Ok(mapped)
}

/// `y = M (p - c) + c + t` with a row-major `M`.
fn affine(matrix: &[f64], translation: &[f64], center: &[f64], point: &[f64]) -> Vec<f64> {
    let d = point.len();
    (0..d)
        .map(|i| {
            let rotated: f64 = (0..d)
                .map(|j| matrix[i * d + j] * (point[j] - center[j]))
                .sum();
            rotated + center[i] + translation[i]
        })
        .collect()
}

fn rigid3(rotation: DMat3, translation: &[f64], center: &[f64], point: &[f64]) -> Vec<f64> {
    let c = DVec3::from_slice(center);
    let y = rotation * (DVec3::from_slice(point) - c) + c + DVec3::from_slice(translation);
    y.to_array().to_vec()
}

/// Rotation about x, y and z, applied as `Rz Rx Ry`, or `Rz Ry Rx` when
/// `compute_zyx` is set.
pub(crate) fn euler_matrix(ax: f64, ay: f64, az: f64, compute_zyx: bool) -> DMat3 {
    let (rx, ry, rz) = (
        DMat3::from_rotation_x(ax),
        DMat3::from_rotation_y(ay),
        DMat3::from_rotation_z(az),
    );
    if compute_zyx {
        rz * ry * rx
    } else {
        rz * rx * ry
    }
}

/// Unit quaternion from the vector part of a versor.
fn versor(v: &[f64]) -> DQuat {
    let norm2 = v[0] * v[0] + v[1] * v[1] + v[2] * v[2];
    let w = (1.0 - norm2).max(0.0).sqrt();
    DQuat::from_xyzw(v[0], v[1], v[2], w).normalize()
}

/// Displacement at the grid point nearest to `point`; zero outside the grid.
fn nearest_displacement(grid: &ImageGeometry, data: &[f64], point: &[f64]) -> Vec<f64> {
    let d = grid.dimension();
    let continuous = grid.physical_to_continuous_index(point);
    let mut index = Vec::with_capacity(d);
    for (u, &n) in continuous.iter().zip(grid.size()) {
        let i = u.round();
        if !(i >= 0.0 && i < n as f64) {
            return vec![0.0; d];
        }
        index.push(i as usize);
    }
    let offset = grid.flat_index(&index) * d;
    data[offset..offset + d].to_vec()
}

/// Uniform cubic B-spline weights for the four support points.
fn cubic_weights(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        (1.0 - t).powi(3) / 6.0,
        (3.0 * t3 - 6.0 * t2 + 4.0) / 6.0,
        (-3.0 * t3 + 3.0 * t2 + 3.0 * t + 1.0) / 6.0,
        t3 / 6.0,
    ]
}

/// Displacement of a cubic B-spline with coefficients stored axis by axis,
/// each axis holding one value per control point.
///
/// Zero where the support of the point leaves the control grid.
fn bspline_displacement(grid: &ImageGeometry, coefficients: &[f64], point: &[f64]) -> Vec<f64> {
    let d = grid.dimension();
    let n = grid.num_points();
    let continuous = grid.physical_to_continuous_index(point);

    let mut start = Vec::with_capacity(d);
    let mut weights = Vec::with_capacity(d);
    for (u, &size) in continuous.iter().zip(grid.size()) {
        let floor = u.floor();
        let first = floor - 1.0;
        if !(first >= 0.0 && first + 3.0 < size as f64) {
            return vec![0.0; d];
        }
        start.push(first as usize);
        weights.push(cubic_weights(u - floor));
    }

    let mut displacement = vec![0.0; d];
    let mut index = vec![0usize; d];
    for combo in 0..4usize.pow(d as u32) {
        let mut rest = combo;
        let mut weight = 1.0;
        for axis in 0..d {
            let k = rest % 4;
            rest /= 4;
            index[axis] = start[axis] + k;
            weight *= weights[axis][k];
        }
        let flat = grid.flat_index(&index);
        for (axis, value) in displacement.iter_mut().enumerate() {
            *value += weight * coefficients[axis * n + flat];
        }
    }
    displacement
}
