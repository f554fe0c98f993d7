//! Exact area and volume of a union of balls from its dual complex.
//!
//! Both totals follow the inclusion-exclusion identity over the simplices of the
//! dual complex (Edelsbrunner and Fu, "Measuring space filling diagrams and
//! voids"):
//!
//! ```text
//! total = Σ balls - Σ edges + Σ triangles - Σ tetrahedra
//! ```
//!
//! Every intersection term is split along the radical planes into one piece per
//! participating sphere. The piece of sphere `i` is a spherical cap (edge), a
//! lens-shaped patch bounded by two cap circles (triangle) or a triangular
//! patch bounded by three cap circles (tetrahedron); its area follows from
//! Gauss-Bonnet and its volume from the cone decomposition over its boundary.

use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::complex::DualComplex;
use crate::geometry::{angle_dihedral, distance, plane_orientation};
use crate::types::Sphere;

/// Area and volume evaluator over a set of spheres and their dual complex.
///
/// The complex must have been built from the sphere centers weighted by the
/// squared radii in `spheres`.
pub struct SurfaceMeasure<'a, C: DualComplex + ?Sized> {
    spheres: &'a [Sphere],
    complex: &'a C,
}

impl<'a, C: DualComplex + ?Sized> SurfaceMeasure<'a, C> {
    #[must_use]
    pub const fn new(spheres: &'a [Sphere], complex: &'a C) -> Self {
        Self { spheres, complex }
    }

    /// Volume enclosed by the union of balls.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let complex = self.complex;

        let balls: f64 = complex
            .vertices()
            .par_iter()
            .map(|&i| self.ball_volume(i))
            .sum();
        let edges: f64 = complex
            .edges()
            .par_iter()
            .map(|&[i, j]| self.pair_intersection_volume(i, j))
            .sum();
        let triangles: f64 = complex
            .triangles()
            .par_iter()
            .map(|&[i, j, k]| self.triple_intersection_volume(i, j, k))
            .sum();
        let tetrahedra: f64 = complex
            .tetrahedra()
            .par_iter()
            .map(|&[i, j, k, l]| self.quad_intersection_volume(i, j, k, l))
            .sum();

        balls - edges + triangles - tetrahedra
    }

    /// Area of the boundary of the union of balls.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        let complex = self.complex;

        let balls: f64 = complex
            .vertices()
            .par_iter()
            .map(|&i| self.ball_area(i))
            .sum();
        let edges: f64 = complex
            .edges()
            .par_iter()
            .map(|&[i, j]| self.pair_intersection_area(i, j))
            .sum();
        let triangles: f64 = complex
            .triangles()
            .par_iter()
            .map(|&[i, j, k]| self.triple_intersection_area(i, j, k))
            .sum();
        let tetrahedra: f64 = complex
            .tetrahedra()
            .par_iter()
            .map(|&[i, j, k, l]| self.quad_intersection_area(i, j, k, l))
            .sum();

        balls - edges + triangles - tetrahedra
    }

    /// Area of the boundary of `B_i ∩ B_j`.
    #[must_use]
    pub fn pair_intersection_area(&self, i: usize, j: usize) -> f64 {
        2.0 * PI * self.radius(i).mul_add(
            self.cap_height(i, j),
            self.radius(j) * self.cap_height(j, i),
        )
    }

    /// Area of the boundary of `B_i ∩ B_j ∩ B_k`.
    #[must_use]
    pub fn triple_intersection_area(&self, i: usize, j: usize, k: usize) -> f64 {
        self.cap2_area(i, j, k) + self.cap2_area(j, i, k) + self.cap2_area(k, i, j)
    }

    /// Area of the boundary of `B_i ∩ B_j ∩ B_k ∩ B_l`.
    #[must_use]
    pub fn quad_intersection_area(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        self.cap3_area(i, j, k, l)
            + self.cap3_area(j, i, k, l)
            + self.cap3_area(k, i, j, l)
            + self.cap3_area(l, i, j, k)
    }

    /// Volume of the lens `B_i ∩ B_j`.
    #[must_use]
    pub fn pair_intersection_volume(&self, i: usize, j: usize) -> f64 {
        self.cap_volume(i, j) + self.cap_volume(j, i)
    }

    /// Volume of `B_i ∩ B_j ∩ B_k`.
    #[must_use]
    pub fn triple_intersection_volume(&self, i: usize, j: usize, k: usize) -> f64 {
        self.cap2_volume(i, j, k) + self.cap2_volume(j, i, k) + self.cap2_volume(k, i, j)
    }

    /// Volume of `B_i ∩ B_j ∩ B_k ∩ B_l`.
    #[must_use]
    pub fn quad_intersection_volume(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        self.cap3_volume(i, j, k, l)
            + self.cap3_volume(j, i, k, l)
            + self.cap3_volume(k, i, j, l)
            + self.cap3_volume(l, i, j, k)
    }

    /// Axial extent of the cap that the radical plane of (`i`, `j`) cuts from
    /// sphere `i` on the side of `j`.
    ///
    /// When the plane passes behind the center of `i` the cap is the major
    /// segment and its height exceeds the radius.
    #[must_use]
    pub fn cap_height(&self, i: usize, j: usize) -> f64 {
        let y = self.complex.edge_orthocenter(i, j);
        let d = distance(self.position(i), &y);

        if self.complex.vertex_attached(i, j) {
            self.radius(i) + d
        } else {
            self.radius(i) - d
        }
    }

    #[inline]
    fn position(&self, i: usize) -> &Point3<f64> {
        &self.spheres[i].center
    }

    #[inline]
    fn radius(&self, i: usize) -> f64 {
        self.spheres[i].r
    }

    fn ball_area(&self, i: usize) -> f64 {
        let r = self.radius(i);
        4.0 * PI * r * r
    }

    fn ball_volume(&self, i: usize) -> f64 {
        let r = self.radius(i);
        (4.0 / 3.0) * PI * r * r * r
    }

    fn cap_area(&self, i: usize, j: usize) -> f64 {
        2.0 * PI * self.radius(i) * self.cap_height(i, j)
    }

    fn cap_volume(&self, i: usize, j: usize) -> f64 {
        let r = self.radius(i);
        let s = r * self.cap_area(i, j);
        let c = (r - self.cap_height(i, j)) * self.disk_area(i, j);

        (s - c) / 3.0
    }

    /// Area of `∂B_i ∩ B_j ∩ B_k`: a two-cornered patch bounded by the cap
    /// circles of `j` and `k`.
    fn cap2_area(&self, i: usize, j: usize, k: usize) -> f64 {
        let pjk = self.triangle_dual(i, j, k);

        let lj = self.segment_angle(i, j, k);
        let lk = self.segment_angle(i, k, j);

        let s = self.position(i);
        let t = self.position(j);
        let u = self.position(k);

        let r = self.radius(i);
        let phi = 0.5 - angle_dihedral(s, &pjk, t, u);

        let a1 = self.ball_area(i) * phi;
        let a2 = 2.0 * PI * r * lj * (r - self.cap_height(i, j));
        let a3 = 2.0 * PI * r * lk * (r - self.cap_height(i, k));

        a1 - a2 - a3
    }

    fn cap2_volume(&self, i: usize, j: usize, k: usize) -> f64 {
        let r = self.radius(i);
        let s2 = r * self.cap2_area(i, j, k);
        let cj = (r - self.cap_height(i, j)) * self.segment_area(i, j, k);
        let ck = (r - self.cap_height(i, k)) * self.segment_area(i, k, j);

        (s2 - cj - ck) / 3.0
    }

    /// Area of `∂B_i ∩ B_j ∩ B_k ∩ B_l`: a three-cornered patch bounded by
    /// the cap circles of `j`, `k` and `l`.
    fn cap3_area(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        // corners must be picked on the side of the remaining center
        let (k, l) = if self.ccw(i, j, k, l) { (k, l) } else { (l, k) };

        let s = self.position(i);
        let t = self.position(j);
        let u = self.position(k);
        let v = self.position(l);

        let pkj = self.triangle_dual(i, k, j);
        let plk = self.triangle_dual(i, l, k);
        let pjl = self.triangle_dual(i, j, l);

        let lj = self.segment2_angle(i, j, k, l);
        let lk = self.segment2_angle(i, k, l, j);
        let ll = self.segment2_angle(i, l, j, k);

        let rho_kj = 0.5 - angle_dihedral(s, &pkj, u, t);
        let rho_lk = 0.5 - angle_dihedral(s, &plk, v, u);
        let rho_jl = 0.5 - angle_dihedral(s, &pjl, t, v);

        let r = self.radius(i);
        let a1 = 0.5 * self.ball_area(i) * (rho_kj + rho_lk + rho_jl - 0.5);
        let a2 = 2.0 * PI * r * lj * (r - self.cap_height(i, j));
        let a3 = 2.0 * PI * r * lk * (r - self.cap_height(i, k));
        let a4 = 2.0 * PI * r * ll * (r - self.cap_height(i, l));

        a1 - a2 - a3 - a4
    }

    fn cap3_volume(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        let r = self.radius(i);
        let s3 = r * self.cap3_area(i, j, k, l);
        let cj = (r - self.cap_height(i, j)) * self.segment2_area(i, j, k, l);
        let ck = (r - self.cap_height(i, k)) * self.segment2_area(i, k, j, l);
        let cl = (r - self.cap_height(i, l)) * self.segment2_area(i, l, j, k);

        (s3 - cj - ck - cl) / 3.0
    }

    fn disk_area(&self, i: usize, j: usize) -> f64 {
        0.5 * self.disk_radius(i, j) * self.disk_length(i, j)
    }

    fn disk_length(&self, i: usize, j: usize) -> f64 {
        2.0 * PI * self.disk_radius(i, j)
    }

    /// Radius of the circle where spheres `i` and `j` meet. Zero when the cap
    /// height leaves `[0, 2 r_i]`.
    fn disk_radius(&self, i: usize, j: usize) -> f64 {
        let h = self.cap_height(i, j);
        (h * (2.0f64.mul_add(self.radius(i), -h))).max(0.0).sqrt()
    }

    /// Point where the spheres `i`, `j` and `k` meet, on the side of the plane
    /// of their centers given by the right-handed normal of (`i`, `j`, `k`).
    fn triangle_dual(&self, i: usize, j: usize, k: usize) -> Point3<f64> {
        let y = self.complex.triangle_orthocenter(i, j, k);

        let s = self.position(i);
        let t = self.position(j);
        let u = self.position(k);

        let n: Vector3<f64> = (t - s).cross(&(u - s));
        let ys = y - s;

        let s1 = ys.dot(&n);
        let s2 = n.dot(&n);
        let s3 = ys.dot(&ys);

        let r = self.radius(i);
        let discriminant = (r * r).mul_add(s2, s1.mul_add(s1, -s3 * s2)).max(0.0);
        let xi = (-s1 + discriminant.sqrt()) / s2;

        y + n * xi
    }

    /// Area of the part of the (`i`, `j`) disk lying inside `B_k`.
    fn segment_area(&self, i: usize, j: usize, k: usize) -> f64 {
        let rij = self.disk_radius(i, j);
        let s = 0.5 * rij * self.segment_length(i, j, k);

        let pjk = self.triangle_dual(i, j, k);
        let pkj = self.triangle_dual(i, k, j);

        let h = rij - self.segment_height(i, j, k);
        let t = 0.5 * h * distance(&pjk, &pkj);

        s - t
    }

    /// Fraction of the (`i`, `j`) circle lying inside `B_k`.
    fn segment_angle(&self, i: usize, j: usize, k: usize) -> f64 {
        let pjk = self.triangle_dual(i, j, k);

        let s = self.position(i);
        let t = self.position(j);
        let u = self.position(k);

        2.0 * angle_dihedral(s, t, u, &pjk)
    }

    fn segment_length(&self, i: usize, j: usize, k: usize) -> f64 {
        self.segment_angle(i, j, k) * self.disk_length(i, j)
    }

    fn segment_height(&self, i: usize, j: usize, k: usize) -> f64 {
        let y2 = self.complex.edge_orthocenter(i, j);
        let y3 = self.complex.triangle_orthocenter(i, j, k);
        let d = distance(&y2, &y3);

        if self.complex.edge_attached(i, j, k) {
            self.disk_radius(i, j) + d
        } else {
            self.disk_radius(i, j) - d
        }
    }

    /// Area of the part of the (`i`, `j`) disk lying inside `B_k ∩ B_l`.
    fn segment2_area(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        let (k, l) = if self.ccw(i, j, k, l) { (k, l) } else { (l, k) };

        let pkj = self.triangle_dual(i, k, j);
        let pjl = self.triangle_dual(i, j, l);

        let y = self.complex.tetrahedron_orthocenter(i, j, k, l);

        let hk = self.segment_height(i, j, k);
        let hl = self.segment_height(i, j, l);

        let rij = self.disk_radius(i, j);

        let s = 0.5 * rij * self.segment2_length(i, j, k, l);
        let tk = 0.5 * (rij - hk) * distance(&pkj, &y);
        let tl = 0.5 * (rij - hl) * distance(&pjl, &y);

        s - tk - tl
    }

    /// Fraction of the (`i`, `j`) circle lying inside `B_k ∩ B_l`.
    fn segment2_angle(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        let pjl = self.triangle_dual(i, j, l);
        let pkj = self.triangle_dual(i, k, j);

        let s = self.position(i);
        let t = self.position(j);
        let u = self.position(k);
        let v = self.position(l);

        angle_dihedral(s, t, u, &pkj) + angle_dihedral(s, t, v, &pjl) - angle_dihedral(s, t, u, v)
    }

    fn segment2_length(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        self.segment2_angle(i, j, k, l) * self.disk_length(i, j)
    }

    fn ccw(&self, i: usize, j: usize, k: usize, l: usize) -> bool {
        plane_orientation(
            self.position(i),
            self.position(j),
            self.position(k),
            self.position(l),
        ) > 0.0
    }
}
