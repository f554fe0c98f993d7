//! Dual complex of a union of balls (the alpha shape at alpha = 0).
//!
//! A simplex belongs to the complex when the power cells of its vertices,
//! each clipped to its own ball, share a point. The test runs bottom-up:
//!
//! 1. a tetrahedron is kept when its orthocenter lies inside the balls and no
//!    other ball has smaller power there;
//! 2. a triangle, edge or vertex is kept when it passes the same test at its
//!    own orthocenter (the center, for a vertex), or when it is a face of a
//!    kept simplex one dimension up.
//!
//! Only balls that overlap can share a clipped cell point, so every candidate
//! is drawn from the neighbour lists of the spatial grid.

use std::collections::HashSet;

use log::debug;
use nalgebra::Point3;
use rayon::prelude::*;

use crate::complex::{ComplexBuilder, DualComplex, Edge, Tetrahedron, Triangle};
use crate::geometry::{edge_orthocenter, power, tetrahedron_orthocenter, triangle_orthocenter};
use crate::spheres_searcher::SpheresSearcher;
use crate::types::Sphere;

/// Relative size of the per-index weight perturbation that breaks exact
/// degeneracies (five or more balls sharing one orthocenter).
const PERTURBATION: f64 = 1e-10;

/// Deterministic value in `[0, 1)` for a sphere index (splitmix64 finalizer).
#[allow(clippy::cast_precision_loss)]
fn unit_jitter(index: usize) -> f64 {
    let mut z = (index as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}

fn perturbed_weight(weight: f64, index: usize) -> f64 {
    weight * PERTURBATION.mul_add(unit_jitter(index), 1.0)
}

#[inline]
fn is_neighbor(neighbors: &[usize], id: usize) -> bool {
    neighbors.binary_search(&id).is_ok()
}

/// Shared state for the power-cell tests.
struct PowerCells<'a> {
    points: &'a [Point3<f64>],
    weights: &'a [f64],
    /// Weights before perturbation.
    base_weights: &'a [f64],
    neighbors: &'a [Vec<usize>],
}

impl PowerCells<'_> {
    /// Whether `y`, a point of equal power to every sphere of `simplex`, lies
    /// strictly inside their balls and in none of the other power cells.
    fn is_free(&self, y: &Point3<f64>, simplex: &[usize]) -> bool {
        let i = simplex[0];
        let p = power(&self.points[i], self.weights[i], y);
        if p.is_nan() || p > 0.0 {
            return false;
        }
        // tangent contacts must not gain a simplex from the perturbation
        if power(&self.points[i], self.base_weights[i], y) >= 0.0 {
            return false;
        }
        self.neighbors[i]
            .iter()
            .filter(|&&m| !simplex.contains(&m))
            .all(|&m| power(&self.points[m], self.weights[m], y) >= p)
    }

    fn tetrahedra_from(&self, i: usize) -> Vec<Tetrahedron> {
        let ni = &self.neighbors[i];
        let mut found = Vec::new();

        for &j in ni.iter().filter(|&&j| j > i) {
            let nj = &self.neighbors[j];
            for &k in ni.iter().filter(|&&k| k > j && is_neighbor(nj, k)) {
                let nk = &self.neighbors[k];
                for &l in ni
                    .iter()
                    .filter(|&&l| l > k && is_neighbor(nj, l) && is_neighbor(nk, l))
                {
                    let w = self.weights;
                    let p = self.points;
                    let Some(y) = tetrahedron_orthocenter(
                        &p[i],
                        w[i],
                        [(&p[j], w[j]), (&p[k], w[k]), (&p[l], w[l])],
                    ) else {
                        continue;
                    };
                    if self.is_free(&y, &[i, j, k, l]) {
                        found.push([i, j, k, l]);
                    }
                }
            }
        }

        found
    }

    fn triangles_from(&self, i: usize, faces: &HashSet<Triangle>) -> Vec<Triangle> {
        let ni = &self.neighbors[i];
        let mut found = Vec::new();

        for &j in ni.iter().filter(|&&j| j > i) {
            let nj = &self.neighbors[j];
            for &k in ni.iter().filter(|&&k| k > j && is_neighbor(nj, k)) {
                let triangle = [i, j, k];
                if faces.contains(&triangle) {
                    found.push(triangle);
                    continue;
                }
                let (p, w) = (self.points, self.weights);
                let free = triangle_orthocenter(&p[i], w[i], &p[j], w[j], &p[k], w[k])
                    .is_some_and(|y| self.is_free(&y, &triangle));
                if free {
                    found.push(triangle);
                }
            }
        }

        found
    }

    fn edges_from(&self, i: usize, faces: &HashSet<Edge>) -> Vec<Edge> {
        self.neighbors[i]
            .iter()
            .filter(|&&j| j > i)
            .filter(|&&j| {
                faces.contains(&[i, j]) || {
                    let y = edge_orthocenter(
                        &self.points[i],
                        self.weights[i],
                        &self.points[j],
                        self.weights[j],
                    );
                    self.is_free(&y, &[i, j])
                }
            })
            .map(|&j| [i, j])
            .collect()
    }
}

/// Dual complex of a union of balls, built from centers weighted by squared
/// radius.
#[derive(Debug, Clone, Default)]
pub struct AlphaShape {
    points: Vec<Point3<f64>>,
    weights: Vec<f64>,
    vertices: Vec<usize>,
    edges: Vec<Edge>,
    triangles: Vec<Triangle>,
    tetrahedra: Vec<Tetrahedron>,
}

impl AlphaShape {
    /// Build the complex.
    ///
    /// # Panics
    ///
    /// Panics if `points` and `weights` differ in length.
    #[must_use]
    pub fn new(points: &[Point3<f64>], weights: &[f64]) -> Self {
        assert_eq!(
            points.len(),
            weights.len(),
            "one weight is required per point"
        );
        let n = points.len();
        let points = points.to_vec();
        let base_weights = weights;
        let weights: Vec<f64> = base_weights
            .iter()
            .enumerate()
            .map(|(i, &w)| perturbed_weight(w, i))
            .collect();

        // neighbours come from the exact radii so tangent balls stay apart
        let spheres: Vec<Sphere> = points
            .iter()
            .zip(base_weights)
            .map(|(p, &w)| Sphere::new(*p, w.max(0.0).sqrt()))
            .collect();
        let searcher = SpheresSearcher::new(&spheres);
        let neighbors: Vec<Vec<usize>> = (0..n)
            .into_par_iter()
            .map(|i| searcher.find_colliding_ids(i))
            .collect();

        let cells = PowerCells {
            points: &points,
            weights: &weights,
            base_weights,
            neighbors: &neighbors,
        };

        let tetrahedra: Vec<Tetrahedron> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| cells.tetrahedra_from(i))
            .collect();

        let triangle_faces: HashSet<Triangle> = tetrahedra
            .iter()
            .flat_map(|&[i, j, k, l]| [[i, j, k], [i, j, l], [i, k, l], [j, k, l]])
            .collect();
        let triangles: Vec<Triangle> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| cells.triangles_from(i, &triangle_faces))
            .collect();

        let edge_faces: HashSet<Edge> = triangles
            .iter()
            .flat_map(|&[i, j, k]| [[i, j], [i, k], [j, k]])
            .collect();
        let edges: Vec<Edge> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| cells.edges_from(i, &edge_faces))
            .collect();

        let mut on_edge = vec![false; n];
        for &[i, j] in &edges {
            on_edge[i] = true;
            on_edge[j] = true;
        }
        let vertices: Vec<usize> = (0..n)
            .filter(|&i| on_edge[i] || cells.is_free(&points[i], &[i]))
            .collect();

        debug!(
            "Dual complex of {n} balls: {} vertices, {} edges, {} triangles, {} tetrahedra",
            vertices.len(),
            edges.len(),
            triangles.len(),
            tetrahedra.len()
        );

        Self {
            points,
            weights,
            vertices,
            edges,
            triangles,
            tetrahedra,
        }
    }

    /// Number of weighted points the complex was built from.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl DualComplex for AlphaShape {
    fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn tetrahedra(&self) -> &[Tetrahedron] {
        &self.tetrahedra
    }

    fn edge_orthocenter(&self, i: usize, j: usize) -> Point3<f64> {
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        edge_orthocenter(
            &self.points[a],
            self.weights[a],
            &self.points[b],
            self.weights[b],
        )
    }

    fn triangle_orthocenter(&self, i: usize, j: usize, k: usize) -> Point3<f64> {
        let mut t = [i, j, k];
        t.sort_unstable();
        let [a, b, c] = t;
        let (p, w) = (&self.points, &self.weights);
        triangle_orthocenter(&p[a], w[a], &p[b], w[b], &p[c], w[c])
            .unwrap_or_else(|| Point3::new(f64::NAN, f64::NAN, f64::NAN))
    }

    fn tetrahedron_orthocenter(&self, i: usize, j: usize, k: usize, l: usize) -> Point3<f64> {
        let mut t = [i, j, k, l];
        t.sort_unstable();
        let [a, b, c, d] = t;
        let (p, w) = (&self.points, &self.weights);
        tetrahedron_orthocenter(&p[a], w[a], [(&p[b], w[b]), (&p[c], w[c]), (&p[d], w[d])])
            .unwrap_or_else(|| Point3::new(f64::NAN, f64::NAN, f64::NAN))
    }

    fn vertex_attached(&self, i: usize, j: usize) -> bool {
        let d2 = (self.points[j] - self.points[i]).norm_squared();
        d2 + self.weights[i] - self.weights[j] < 0.0
    }

    fn edge_attached(&self, i: usize, j: usize, k: usize) -> bool {
        let y2 = self.edge_orthocenter(i, j);
        let y3 = self.triangle_orthocenter(i, j, k);
        (y3 - y2).dot(&(self.points[k] - y2)) < 0.0
    }
}

/// Default [`ComplexBuilder`], producing an [`AlphaShape`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaShapeBuilder;

impl ComplexBuilder for AlphaShapeBuilder {
    type Complex = AlphaShape;

    fn build(&self, points: &[Point3<f64>], weights: &[f64]) -> AlphaShape {
        AlphaShape::new(points, weights)
    }
}
