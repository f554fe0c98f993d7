use std::f64::consts::TAU;

use nalgebra::{Matrix3, Point3, Vector3};

use crate::types::Sphere;

/// Tolerance for the overlap tests that decide which balls are neighbours.
pub const EPSILON: f64 = 1e-10;

/// Epsilon-based floating point comparisons.
pub mod float_cmp {
    use super::EPSILON;

    #[inline]
    pub const fn lt(a: f64, b: f64) -> bool {
        a + EPSILON < b
    }
}

use float_cmp::lt;

/// Check if two spheres intersect (overlap)
#[inline]
pub fn sphere_intersects_sphere(a: &Sphere, b: &Sphere) -> bool {
    let sum_r = a.r + b.r;
    lt((b.center - a.center).norm_squared(), sum_r * sum_r)
}

#[inline]
pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (b - a).norm()
}

/// Power distance of `x` to the weighted point (`center`, `weight`).
///
/// For a ball weighted by its squared radius the power is negative inside,
/// zero on the boundary sphere and positive outside.
#[inline]
pub fn power(center: &Point3<f64>, weight: f64, x: &Point3<f64>) -> f64 {
    (x - center).norm_squared() - weight
}

/// Dihedral angle along the line `s`-`t` between the half-plane holding `u`
/// and the half-plane holding `v`, as a fraction of a full turn in `[0, 0.5]`.
pub fn angle_dihedral(s: &Point3<f64>, t: &Point3<f64>, u: &Point3<f64>, v: &Point3<f64>) -> f64 {
    let mu = (u - s).cross(&(u - t));
    let mv = (v - s).cross(&(v - t));

    let nu = mu.normalize();
    let nv = mv.normalize();

    nu.dot(&nv).clamp(-1.0, 1.0).acos() / TAU
}

/// Orientation of `d` relative to the plane through `a`, `b`, `c`.
///
/// Equals the determinant of the homogeneous 4x4 matrix whose rows are
/// `(a, 1)`, `(b, 1)`, `(c, 1)`, `(d, 1)`; zero when the four points are
/// coplanar.
#[inline]
pub fn plane_orientation(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    -(d - a).dot(&(b - a).cross(&(c - a)))
}

/// Orthocenter of two weighted points: the point on the line through both
/// centers with equal power to each of them.
pub fn edge_orthocenter(a: &Point3<f64>, wa: f64, b: &Point3<f64>, wb: f64) -> Point3<f64> {
    let d = b - a;
    let d2 = d.norm_squared();
    let t = 0.5 + (wa - wb) / (2.0 * d2);
    a + d * t
}

/// Orthocenter of three weighted points, lying in the plane of their centers.
///
/// Returns `None` when the centers are collinear.
pub fn triangle_orthocenter(
    a: &Point3<f64>,
    wa: f64,
    b: &Point3<f64>,
    wb: f64,
    c: &Point3<f64>,
    wc: f64,
) -> Option<Point3<f64>> {
    let db = b - a;
    let dc = c - a;
    let n = db.cross(&dc);

    let m = Matrix3::from_rows(&[
        (db * 2.0).transpose(),
        (dc * 2.0).transpose(),
        n.transpose(),
    ]);
    let rhs = Vector3::new(
        db.norm_squared() - wb + wa,
        dc.norm_squared() - wc + wa,
        0.0,
    );

    m.lu().solve(&rhs).map(|z| a + z)
}

/// Orthocenter of four weighted points: the unique point with equal power to
/// all of them.
///
/// Returns `None` when the centers are coplanar.
pub fn tetrahedron_orthocenter(
    a: &Point3<f64>,
    wa: f64,
    others: [(&Point3<f64>, f64); 3],
) -> Option<Point3<f64>> {
    let rows = others.map(|(p, _)| ((p - a) * 2.0).transpose());
    let rhs = Vector3::from_iterator(others.iter().map(|(p, w)| (*p - a).norm_squared() - w + wa));

    Matrix3::from_rows(&rows).lu().solve(&rhs).map(|z| a + z)
}
